//! A counting semaphore with timed waits.
//!
//! This is the building block every other primitive in [`crate::sync`] is
//! expressed in terms of. It stands in for the POSIX named semaphores a
//! multi-process version of this system would use (`sem_wait`/`sem_post`/
//! `sem_timedwait`): same wait/post discipline, same ability to be reset in
//! place once every waiter has been evicted.

use std::sync::{Condvar, Mutex};
use std::time::{Duration, Instant};

/// A counting semaphore backed by a condition variable.
///
/// `wait` blocks until the count is positive, then decrements it. `post`
/// increments the count and wakes one waiter. `wait_timeout` is the bounded
/// variant used anywhere a timeout is required instead of an indefinite
/// block (the GPS producer's 1s empty-wait, telemetry's 5s full-wait).
pub struct Semaphore {
    count: Mutex<u32>,
    cond: Condvar,
}

impl Semaphore {
    /// Create a semaphore with the given initial count.
    pub fn new(initial: u32) -> Self {
        Self {
            count: Mutex::new(initial),
            cond: Condvar::new(),
        }
    }

    /// Decrement the count, blocking indefinitely while it is zero.
    pub fn wait(&self) {
        let mut count = self.count.lock().unwrap_or_else(|p| p.into_inner());
        while *count == 0 {
            count = self.cond.wait(count).unwrap_or_else(|p| p.into_inner());
        }
        *count -= 1;
    }

    /// Decrement the count, blocking for at most `timeout`.
    ///
    /// Returns `true` if the count was decremented, `false` on timeout.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut count = self.count.lock().unwrap_or_else(|p| p.into_inner());
        loop {
            if *count > 0 {
                *count -= 1;
                return true;
            }
            let remaining = match deadline.checked_duration_since(Instant::now()) {
                Some(d) if !d.is_zero() => d,
                _ => return false,
            };
            let (guard, result) = self
                .cond
                .wait_timeout(count, remaining)
                .unwrap_or_else(|p| p.into_inner());
            count = guard;
            if result.timed_out() && *count == 0 {
                return false;
            }
        }
    }

    /// Increment the count and wake one waiter.
    pub fn post(&self) {
        let mut count = self.count.lock().unwrap_or_else(|p| p.into_inner());
        *count += 1;
        self.cond.notify_one();
    }

    /// Reinitialize the semaphore to `initial`, discarding whatever count it
    /// held.
    ///
    /// # Safety contract
    ///
    /// Callers (the supervisor only) must guarantee no actor is currently
    /// blocked in [`wait`](Self::wait) or [`wait_timeout`](Self::wait_timeout)
    /// on this semaphore — synchronization primitives may only be
    /// reinitialized once every actor that could touch them has been
    /// terminated. Resetting while a waiter is parked leaves that waiter
    /// stuck until the next `post`.
    pub fn reset(&self, initial: u32) {
        let mut count = self.count.lock().unwrap_or_else(|p| p.into_inner());
        *count = initial;
        self.cond.notify_all();
    }

    /// Current count, for diagnostics/tests only.
    pub fn count(&self) -> u32 {
        *self.count.lock().unwrap_or_else(|p| p.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn wait_then_post_round_trips() {
        let sem = Semaphore::new(1);
        sem.wait();
        assert_eq!(sem.count(), 0);
        sem.post();
        assert_eq!(sem.count(), 1);
    }

    #[test]
    fn wait_timeout_expires_on_zero() {
        let sem = Semaphore::new(0);
        assert!(!sem.wait_timeout(Duration::from_millis(20)));
    }

    #[test]
    fn wait_timeout_succeeds_once_posted() {
        let sem = Arc::new(Semaphore::new(0));
        let sem2 = sem.clone();
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(10));
            sem2.post();
        });
        assert!(sem.wait_timeout(Duration::from_secs(1)));
        handle.join().unwrap();
    }

    #[test]
    fn reset_restores_initial_count() {
        let sem = Semaphore::new(1);
        sem.wait();
        sem.reset(3);
        assert_eq!(sem.count(), 3);
    }
}
