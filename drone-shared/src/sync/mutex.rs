//! Single-writer mutex for the shared region's `accel` and `pwm` fields.
//!
//! Mirrors the API shape of a hand-rolled exclusive lock (`lock`, `try_lock`,
//! RAII guard released on `Drop`) but blocks on a [`Semaphore`] instead of
//! spinning, since actors here are OS threads rather than a single-core
//! interrupt-driven target.

use super::semaphore::Semaphore;
use std::cell::UnsafeCell;

/// An exclusive lock over `T`, reset-able by the supervisor.
pub struct DataMutex<T> {
    sem: Semaphore,
    data: UnsafeCell<T>,
}

// SAFETY: all access to `data` is gated by `sem`, a binary semaphore.
unsafe impl<T: Send> Send for DataMutex<T> {}
unsafe impl<T: Send> Sync for DataMutex<T> {}

impl<T> DataMutex<T> {
    pub fn new(val: T) -> Self {
        Self {
            sem: Semaphore::new(1),
            data: UnsafeCell::new(val),
        }
    }

    /// Acquire the lock, blocking until it becomes available.
    pub fn lock(&self) -> DataGuard<'_, T> {
        self.sem.wait();
        DataGuard { mutex: self }
    }

    /// Try to acquire the lock without blocking.
    ///
    /// The telemetry actor uses this: the accel/pwm sections of its message
    /// are only emitted when the try-lock succeeds, so a busy writer never
    /// stalls the telemetry tick.
    pub fn try_lock(&self) -> Option<DataGuard<'_, T>> {
        if self.sem.wait_timeout(std::time::Duration::ZERO) {
            Some(DataGuard { mutex: self })
        } else {
            None
        }
    }

    /// Reinitialize the lock's synchronization state in place, preserving
    /// `data`. See [`Semaphore::reset`]'s safety contract.
    pub fn reset(&self) {
        self.sem.reset(1);
    }
}

pub struct DataGuard<'a, T> {
    mutex: &'a DataMutex<T>,
}

impl<T> std::ops::Deref for DataGuard<'_, T> {
    type Target = T;
    fn deref(&self) -> &T {
        // SAFETY: holding `sem` guarantees exclusive access.
        unsafe { &*self.mutex.data.get() }
    }
}

impl<T> std::ops::DerefMut for DataGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        // SAFETY: holding `sem` guarantees exclusive access.
        unsafe { &mut *self.mutex.data.get() }
    }
}

impl<T> Drop for DataGuard<'_, T> {
    fn drop(&mut self) {
        self.mutex.sem.post();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lock_then_mutate() {
        let m = DataMutex::new(vec![1, 2, 3]);
        m.lock().push(4);
        assert_eq!(*m.lock(), vec![1, 2, 3, 4]);
    }

    #[test]
    fn try_lock_fails_while_held() {
        let m = DataMutex::new(0u32);
        let guard = m.lock();
        assert!(m.try_lock().is_none());
        drop(guard);
        assert!(m.try_lock().is_some());
    }

    #[test]
    fn reset_releases_without_touching_data() {
        let m = DataMutex::new(5u32);
        let guard = m.lock();
        drop(guard);
        m.reset();
        assert_eq!(*m.lock(), 5);
    }
}
