//! The battery charge scalar: a single-writer atomic with acquire/release
//! ordering. No custom primitive is needed here — a raw `AtomicU8` already
//! gives the ordering guarantee a single writer with many readers needs,
//! and it has no lock state for the supervisor to reset.

use std::sync::atomic::{AtomicU8, Ordering};

/// Battery charge percentage, `0..=100`, written only by the battery actor.
pub struct AtomicCharge(AtomicU8);

impl AtomicCharge {
    pub fn new(initial: u8) -> Self {
        debug_assert!(initial <= 100);
        Self(AtomicU8::new(initial))
    }

    /// Acquire-ordered load, safe to call from any actor.
    pub fn load(&self) -> u8 {
        self.0.load(Ordering::Acquire)
    }

    /// Release-ordered store. Only the battery actor should call this.
    pub fn store(&self, value: u8) {
        debug_assert!(value <= 100);
        self.0.store(value, Ordering::Release)
    }

    /// Increment by one, saturating at 100. Returns the new value.
    pub fn saturating_increment(&self) -> u8 {
        let mut current = self.load();
        loop {
            let next = current.saturating_add(1).min(100);
            match self.0.compare_exchange_weak(
                current,
                next,
                Ordering::Release,
                Ordering::Acquire,
            ) {
                Ok(_) => return next,
                Err(observed) => current = observed,
            }
        }
    }

    /// Decrement by one, saturating at 0. Returns the new value.
    pub fn saturating_decrement(&self) -> u8 {
        let mut current = self.load();
        loop {
            let next = current.saturating_sub(1);
            match self.0.compare_exchange_weak(
                current,
                next,
                Ordering::Release,
                Ordering::Acquire,
            ) {
                Ok(_) => return next,
                Err(observed) => current = observed,
            }
        }
    }
}
