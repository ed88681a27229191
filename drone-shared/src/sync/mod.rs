//! Synchronization primitives for the shared region.
//!
//! # Primitives
//!
//! - [`Semaphore`]: counting semaphore with timed waits; everything below is
//!   built from this one.
//! - [`SemRwLock<T>`]: reader/writer lock for the `action` field.
//! - [`DataMutex<T>`]: single-writer exclusive lock for `accel` and `pwm`.
//! - [`RingBuffer<N>`] / [`GpsRingBuffer`]: bounded producer/consumer buffer
//!   for the NMEA character stream.
//! - [`AtomicCharge`]: the battery's lock-free charge scalar.
//! - [`Heartbeats`]: per-actor liveness counters read by the watchdog.
//!
//! `Semaphore`, `SemRwLock`, `DataMutex`, and `RingBuffer` all expose a
//! `reset()` that reinitializes lock state in place while leaving wrapped
//! data untouched — what the supervisor calls after a watchdog-triggered
//! recovery.

mod charge;
mod heartbeat;
mod mutex;
mod ring_buffer;
mod rwlock;
mod semaphore;

pub use charge::AtomicCharge;
pub use heartbeat::{Heartbeats, HEARTBEAT_ROLES};
pub use mutex::DataMutex;
pub use ring_buffer::{GpsRingBuffer, RingBuffer, GPS_RING_CAPACITY};
pub use rwlock::SemRwLock;
pub use semaphore::Semaphore;
