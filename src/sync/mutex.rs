//! Mutual-exclusion lock with explicit acquire/release and owner tracking.
//!
//! Unlike `std::sync::Mutex`, this lock carries no payload: it is a pure
//! coordination object. The holding thread is recorded, so a release from
//! any other thread is rejected with `NotOwner` instead of silently
//! corrupting the lock state.
//!
//! # Reentrancy
//!
//! The lock is **non-reentrant**: a second `acquire` by the current holder
//! blocks indefinitely. Use the timed variant if re-entry is a possibility
//! you need to detect.
//!
//! # Example
//!
//! ```
//! use synckit::{Interrupt, Mutex};
//!
//! let lock = Mutex::new();
//! let interrupt = Interrupt::new();
//!
//! lock.acquire(&interrupt)?;
//! // critical section
//! lock.release()?;
//! # Ok::<(), synckit::Error>(())
//! ```

use parking_lot::{Condvar, Mutex as ParkingMutex};
use std::marker::PhantomData;
use std::thread::{self, ThreadId};
use std::time::{Duration, Instant};

use crate::config::WaitConfig;
use crate::error::{Error, ErrorKind, Result};
use crate::interrupt::Interrupt;

/// Snapshot of lock contention metrics.
///
/// All fields are zero unless the `lock-metrics` feature is enabled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LockMetricsSnapshot {
    /// Total number of successful acquisitions.
    pub acquisitions: u64,
    /// Acquisitions that found the lock already held.
    pub contentions: u64,
    /// Cumulative nanoseconds spent waiting to acquire.
    pub wait_ns: u64,
    /// Maximum single wait in nanoseconds.
    pub max_wait_ns: u64,
}

#[cfg(feature = "lock-metrics")]
mod metrics {
    use super::LockMetricsSnapshot;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::time::Duration;

    #[derive(Debug, Default)]
    pub(super) struct Metrics {
        acquisitions: AtomicU64,
        contentions: AtomicU64,
        wait_ns: AtomicU64,
        max_wait_ns: AtomicU64,
    }

    impl Metrics {
        pub(super) fn record_acquire(&self, waited: Duration, contended: bool) {
            let wait_ns = u64::try_from(waited.as_nanos()).unwrap_or(u64::MAX);
            self.acquisitions.fetch_add(1, Ordering::Relaxed);
            self.wait_ns.fetch_add(wait_ns, Ordering::Relaxed);
            if contended {
                self.contentions.fetch_add(1, Ordering::Relaxed);
            }
            let mut old = self.max_wait_ns.load(Ordering::Relaxed);
            while wait_ns > old {
                match self.max_wait_ns.compare_exchange_weak(
                    old,
                    wait_ns,
                    Ordering::Relaxed,
                    Ordering::Relaxed,
                ) {
                    Ok(_) => break,
                    Err(actual) => old = actual,
                }
            }
        }

        pub(super) fn snapshot(&self) -> LockMetricsSnapshot {
            LockMetricsSnapshot {
                acquisitions: self.acquisitions.load(Ordering::Relaxed),
                contentions: self.contentions.load(Ordering::Relaxed),
                wait_ns: self.wait_ns.load(Ordering::Relaxed),
                max_wait_ns: self.max_wait_ns.load(Ordering::Relaxed),
            }
        }

        pub(super) fn reset(&self) {
            self.acquisitions.store(0, Ordering::Relaxed);
            self.contentions.store(0, Ordering::Relaxed);
            self.wait_ns.store(0, Ordering::Relaxed);
            self.max_wait_ns.store(0, Ordering::Relaxed);
        }
    }
}

#[derive(Debug)]
struct MutexState {
    owner: Option<ThreadId>,
}

/// A non-reentrant mutual-exclusion lock.
///
/// At most one thread holds the lock at any time; only the holder may
/// release it. See the [module docs](self) for the reentrancy contract.
#[derive(Debug)]
pub struct Mutex {
    state: ParkingMutex<MutexState>,
    cvar: Condvar,
    config: WaitConfig,
    #[cfg(feature = "lock-metrics")]
    metrics: metrics::Metrics,
}

impl Default for Mutex {
    fn default() -> Self {
        Self::new()
    }
}

impl Mutex {
    /// Creates an unheld lock with the default wait config.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: ParkingMutex::new(MutexState { owner: None }),
            cvar: Condvar::new(),
            config: WaitConfig::default(),
            #[cfg(feature = "lock-metrics")]
            metrics: metrics::Metrics::default(),
        }
    }

    /// Creates an unheld lock with a custom wait config.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` if the config fails validation.
    pub fn with_config(config: WaitConfig) -> Result<Self> {
        config.validate()?;
        let mut lock = Self::new();
        lock.config = config;
        Ok(lock)
    }

    /// Returns true if some thread currently holds the lock.
    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.state.lock().owner.is_some()
    }

    /// Returns true if the calling thread holds the lock.
    #[must_use]
    pub fn is_held_by_current_thread(&self) -> bool {
        self.state.lock().owner == Some(thread::current().id())
    }

    /// Blocks until the lock is free, then marks it held by the caller.
    ///
    /// # Errors
    ///
    /// Returns `Interrupted` if the token fires while waiting.
    pub fn acquire(&self, interrupt: &Interrupt) -> Result<()> {
        self.acquire_inner(interrupt, None)
    }

    /// Like [`acquire`](Self::acquire), but gives up after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns `TimedOut` on expiry, or `Interrupted` if the token fires
    /// first.
    pub fn acquire_for(&self, interrupt: &Interrupt, timeout: Duration) -> Result<()> {
        self.acquire_inner(interrupt, Some(Instant::now() + timeout))
    }

    /// Attempts to take the lock without blocking.
    ///
    /// Returns true on success.
    #[must_use]
    pub fn try_acquire(&self) -> bool {
        let mut state = self.state.lock();
        if state.owner.is_some() {
            return false;
        }
        state.owner = Some(thread::current().id());
        drop(state);
        #[cfg(feature = "lock-metrics")]
        self.metrics.record_acquire(Duration::ZERO, false);
        true
    }

    /// Releases the lock and wakes one blocked waiter, if any.
    ///
    /// # Errors
    ///
    /// Returns `NotOwner` if the calling thread does not hold the lock.
    pub fn release(&self) -> Result<()> {
        let mut state = self.state.lock();
        if state.owner != Some(thread::current().id()) {
            return Err(Error::with_context(ErrorKind::NotOwner, "mutex::release"));
        }
        state.owner = None;
        drop(state);
        self.cvar.notify_one();
        Ok(())
    }

    /// Acquires the lock and returns a guard that releases on drop.
    ///
    /// # Errors
    ///
    /// Returns `Interrupted` if the token fires while waiting.
    pub fn lock(&self, interrupt: &Interrupt) -> Result<MutexGuard<'_>> {
        self.acquire(interrupt)?;
        Ok(MutexGuard {
            mutex: self,
            _not_send: PhantomData,
        })
    }

    /// Returns a snapshot of contention metrics.
    #[cfg(feature = "lock-metrics")]
    #[must_use]
    pub fn metrics(&self) -> LockMetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Resets contention metrics to zero.
    #[cfg(feature = "lock-metrics")]
    pub fn reset_metrics(&self) {
        self.metrics.reset();
    }

    fn acquire_inner(&self, interrupt: &Interrupt, deadline: Option<Instant>) -> Result<()> {
        let me = thread::current().id();
        #[cfg(feature = "lock-metrics")]
        let start = Instant::now();
        let mut state = self.state.lock();
        #[cfg(feature = "lock-metrics")]
        let contended = state.owner.is_some();
        if state.owner.is_some() {
            tracing::trace!("mutex contended, parking waiter");
        }
        loop {
            if state.owner.is_none() {
                state.owner = Some(me);
                drop(state);
                #[cfg(feature = "lock-metrics")]
                self.metrics.record_acquire(start.elapsed(), contended);
                return Ok(());
            }
            interrupt.checkpoint()?;
            let park = match deadline {
                Some(deadline) => {
                    let now = Instant::now();
                    if now >= deadline {
                        return Err(Error::with_context(ErrorKind::TimedOut, "mutex::acquire"));
                    }
                    (deadline - now).min(self.config.poll_interval)
                }
                None => self.config.poll_interval,
            };
            let _ = self.cvar.wait_for(&mut state, park);
        }
    }
}

/// RAII guard returned by [`Mutex::lock`]; releases the lock on drop.
///
/// The guard is `!Send`, so it is always dropped on the thread that
/// acquired the lock and release cannot fail.
#[derive(Debug)]
pub struct MutexGuard<'a> {
    mutex: &'a Mutex,
    _not_send: PhantomData<*const ()>,
}

impl Drop for MutexGuard<'_> {
    fn drop(&mut self) {
        let _ = self.mutex.release();
    }
}
