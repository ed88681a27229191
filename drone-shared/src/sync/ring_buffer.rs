//! Bounded character ring buffer for NMEA sentence streaming.
//!
//! Classic bounded-buffer discipline over three semaphores: `mutex` (binary,
//! guards the indices and backing array), `empty` (counting, starts at `N`),
//! `full` (counting, starts at `0`). The GPS producer is the sole writer of
//! `write_idx`; telemetry, the sole consumer, is the sole writer of
//! `read_idx` — each index is only ever touched by its own side, enforcing
//! the invariant that producer and consumer each advance their own index
//! only.

use super::semaphore::Semaphore;
use std::cell::UnsafeCell;
use std::time::Duration;

/// A bounded ring buffer of `N` bytes with blocking-with-timeout push/pop.
pub struct RingBuffer<const N: usize> {
    mutex: Semaphore,
    empty: Semaphore,
    full: Semaphore,
    write_idx: UnsafeCell<usize>,
    read_idx: UnsafeCell<usize>,
    buf: UnsafeCell<[u8; N]>,
}

// SAFETY: `buf`, `write_idx`, `read_idx` are only touched while holding
// `mutex`, except that each index's *owning* side never needs `mutex` to
// observe values it wrote itself.
unsafe impl<const N: usize> Send for RingBuffer<N> {}
unsafe impl<const N: usize> Sync for RingBuffer<N> {}

impl<const N: usize> RingBuffer<N> {
    pub fn new() -> Self {
        assert!(N > 0, "ring buffer capacity must be non-zero");
        Self {
            mutex: Semaphore::new(1),
            empty: Semaphore::new(N as u32),
            full: Semaphore::new(0),
            write_idx: UnsafeCell::new(0),
            read_idx: UnsafeCell::new(0),
            buf: UnsafeCell::new([0u8; N]),
        }
    }

    /// Producer side: write one byte, waiting up to `timeout` for free
    /// space. Returns `false` on timeout, so the caller can abandon the
    /// current sample rather than block indefinitely.
    pub fn try_push(&self, byte: u8, timeout: Duration) -> bool {
        if !self.empty.wait_timeout(timeout) {
            return false;
        }
        self.mutex.wait();
        // SAFETY: `mutex` held exclusively.
        unsafe {
            let idx = *self.write_idx.get();
            (*self.buf.get())[idx] = byte;
            *self.write_idx.get() = (idx + 1) % N;
        }
        self.mutex.post();
        self.full.post();
        true
    }

    /// Consumer side: read one byte, waiting up to `timeout` for data.
    /// Returns `None` on timeout, letting the caller surface the stall
    /// (telemetry reports `NO FIX.` and aborts the flight) instead of
    /// blocking forever.
    pub fn try_pop(&self, timeout: Duration) -> Option<u8> {
        if !self.full.wait_timeout(timeout) {
            return None;
        }
        self.mutex.wait();
        // SAFETY: `mutex` held exclusively.
        let byte = unsafe {
            let idx = *self.read_idx.get();
            let b = (*self.buf.get())[idx];
            *self.read_idx.get() = (idx + 1) % N;
            b
        };
        self.mutex.post();
        self.empty.post();
        Some(byte)
    }

    /// Reinitialize the buffer's synchronization state and indices,
    /// discarding any pending (unread) bytes. See [`Semaphore::reset`]'s
    /// safety contract — only the supervisor, after stopping every actor,
    /// may call this.
    pub fn reset(&self) {
        self.mutex.reset(1);
        self.empty.reset(N as u32);
        self.full.reset(0);
        // SAFETY: caller guarantees no concurrent producer/consumer.
        unsafe {
            *self.write_idx.get() = 0;
            *self.read_idx.get() = 0;
        }
    }
}

impl<const N: usize> Default for RingBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Capacity of the shared region's GPS ring buffer, in characters.
pub const GPS_RING_CAPACITY: usize = 1280;

pub type GpsRingBuffer = RingBuffer<GPS_RING_CAPACITY>;
