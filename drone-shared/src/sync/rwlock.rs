//! A reader/writer lock built from two semaphores and a reader count.
//!
//! This reproduces a classic two-semaphore discipline rather than
//! delegating to `std::sync::RwLock`: two binary [`Semaphore`]s (`read`,
//! `write`, both initially 1) guard a plain reader count.
//!
//! - Reader acquire: wait(read); counter += 1; if counter == 1, wait(write); post(read).
//! - Reader release: wait(read); counter -= 1; if counter == 0, post(write); post(read).
//! - Writer acquire: wait(write). Writer release: post(write).
//!
//! Writers are mutually exclusive with everything; readers may run
//! concurrently; no starvation guarantee is made — writers may be deferred
//! while readers keep arriving. The one thing `std::sync::RwLock` can't
//! give us is a `reset()` the supervisor can call to clear a lock an actor
//! died while holding — that's the whole reason this type exists.

use super::semaphore::Semaphore;
use std::cell::UnsafeCell;

/// A reader/writer lock over `T`, reset-able by the supervisor.
pub struct SemRwLock<T> {
    data: UnsafeCell<T>,
    read_sem: Semaphore,
    write_sem: Semaphore,
    read_count: UnsafeCell<u32>,
}

// SAFETY: all access to `data` and `read_count` is gated by `read_sem` /
// `write_sem`, which enforce the reader/writer discipline documented above.
unsafe impl<T: Send> Send for SemRwLock<T> {}
unsafe impl<T: Send> Sync for SemRwLock<T> {}

impl<T> SemRwLock<T> {
    pub fn new(val: T) -> Self {
        Self {
            data: UnsafeCell::new(val),
            read_sem: Semaphore::new(1),
            write_sem: Semaphore::new(1),
            read_count: UnsafeCell::new(0),
        }
    }

    /// Acquire a read lock. Blocks only while a writer holds the lock.
    pub fn read(&self) -> ReadGuard<'_, T> {
        self.read_sem.wait();
        // SAFETY: holding `read_sem` serializes access to `read_count`.
        let first_reader = unsafe {
            let count = &mut *self.read_count.get();
            *count += 1;
            *count == 1
        };
        if first_reader {
            self.write_sem.wait();
        }
        self.read_sem.post();
        ReadGuard { lock: self }
    }

    /// Acquire the write lock, blocking until all readers and the current
    /// writer (if any) release it.
    pub fn write(&self) -> WriteGuard<'_, T> {
        self.write_sem.wait();
        WriteGuard { lock: self }
    }

    fn release_read(&self) {
        self.read_sem.wait();
        // SAFETY: holding `read_sem` serializes access to `read_count`.
        let last_reader = unsafe {
            let count = &mut *self.read_count.get();
            *count -= 1;
            *count == 0
        };
        if last_reader {
            self.write_sem.post();
        }
        self.read_sem.post();
    }

    fn release_write(&self) {
        self.write_sem.post();
    }

    /// Reinitialize the lock's synchronization state in place. `data` is
    /// left untouched — only the semaphores and reader count are reset.
    ///
    /// # Safety contract
    ///
    /// As with [`Semaphore::reset`], the caller must have already stopped
    /// every actor that might be waiting on or holding this lock.
    pub fn reset(&self) {
        self.read_sem.reset(1);
        self.write_sem.reset(1);
        // SAFETY: caller guarantees no concurrent reader/writer.
        unsafe {
            *self.read_count.get() = 0;
        }
    }
}

pub struct ReadGuard<'a, T> {
    lock: &'a SemRwLock<T>,
}

impl<T> std::ops::Deref for ReadGuard<'_, T> {
    type Target = T;
    fn deref(&self) -> &T {
        // SAFETY: a write lock cannot be held while any ReadGuard exists.
        unsafe { &*self.lock.data.get() }
    }
}

impl<T> Drop for ReadGuard<'_, T> {
    fn drop(&mut self) {
        self.lock.release_read();
    }
}

pub struct WriteGuard<'a, T> {
    lock: &'a SemRwLock<T>,
}

impl<T> std::ops::Deref for WriteGuard<'_, T> {
    type Target = T;
    fn deref(&self) -> &T {
        // SAFETY: holding `write_sem` guarantees exclusive access.
        unsafe { &*self.lock.data.get() }
    }
}

impl<T> std::ops::DerefMut for WriteGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        // SAFETY: holding `write_sem` guarantees exclusive access.
        unsafe { &mut *self.lock.data.get() }
    }
}

impl<T> Drop for WriteGuard<'_, T> {
    fn drop(&mut self) {
        self.lock.release_write();
    }
}
