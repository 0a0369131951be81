//! Lock-free atomic counter.
//!
//! Every `increment` is a single atomic read-modify-write, so concurrent
//! callers can never lose updates. All operations use relaxed ordering:
//! the counter synchronizes nothing beyond its own value and is not a
//! memory fence for unrelated locations.

use std::sync::atomic::{AtomicU64, Ordering};

/// A lock-free increment/get counter.
///
/// Aligned to a cache line so a hot counter does not false-share with
/// neighboring fields.
#[derive(Debug, Default)]
#[repr(align(64))]
pub struct AtomicCounter {
    value: AtomicU64,
}

impl AtomicCounter {
    /// Creates a counter starting at zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a counter starting at `value`.
    #[must_use]
    pub fn with_value(value: u64) -> Self {
        Self {
            value: AtomicU64::new(value),
        }
    }

    /// Atomically adds one and returns the new value.
    ///
    /// Wraps on overflow.
    pub fn increment(&self) -> u64 {
        self.value.fetch_add(1, Ordering::Relaxed).wrapping_add(1)
    }

    /// Atomically adds `n` and returns the new value.
    ///
    /// Wraps on overflow.
    pub fn add(&self, n: u64) -> u64 {
        self.value.fetch_add(n, Ordering::Relaxed).wrapping_add(n)
    }

    /// Returns the current value.
    ///
    /// Relaxed read: at least as fresh as any increment the calling thread
    /// has itself observed, with no ordering for unrelated memory.
    #[must_use]
    pub fn get(&self) -> u64 {
        self.value.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn increment_returns_new_value() {
        let counter = AtomicCounter::new();
        assert_eq!(counter.increment(), 1);
        assert_eq!(counter.increment(), 2);
        assert_eq!(counter.get(), 2);
    }

    #[test]
    fn add_accumulates() {
        let counter = AtomicCounter::with_value(10);
        assert_eq!(counter.add(5), 15);
        assert_eq!(counter.get(), 15);
    }

    #[test]
    fn concurrent_increments_are_not_lost() {
        const THREADS: u64 = 8;
        const PER_THREAD: u64 = 10_000;

        let counter = Arc::new(AtomicCounter::new());
        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                let counter = Arc::clone(&counter);
                std::thread::spawn(move || {
                    for _ in 0..PER_THREAD {
                        counter.increment();
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().expect("thread panicked");
        }
        assert_eq!(counter.get(), THREADS * PER_THREAD);
    }
}
