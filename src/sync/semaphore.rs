//! Counting semaphore with a fixed capacity and optional FIFO fairness.
//!
//! A semaphore controls access to a finite number of resources through
//! permits. Acquiring consumes one permit, releasing returns one; the
//! permit count never exceeds the capacity fixed at construction, and a
//! release that would is rejected as `OverRelease`.
//!
//! # Fairness
//!
//! The default semaphore makes no promise about which waiter wins when a
//! permit frees up. [`Semaphore::fair`] builds a FIFO variant that admits
//! waiters strictly in arrival order using a ticket queue.
//!
//! # Example
//!
//! ```
//! use synckit::{Interrupt, Semaphore};
//!
//! let sem = Semaphore::new(2)?;
//! let interrupt = Interrupt::new();
//!
//! sem.acquire(&interrupt)?;
//! sem.release()?;
//! # Ok::<(), synckit::Error>(())
//! ```

use parking_lot::{Condvar, Mutex as ParkingMutex};
use std::collections::VecDeque;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use crate::config::WaitConfig;
use crate::error::{Error, ErrorKind, Result};
use crate::interrupt::Interrupt;

#[derive(Debug)]
struct SemaphoreState {
    permits: usize,
    /// FIFO admission queue of waiter tickets. Empty in the unfair variant.
    queue: VecDeque<u64>,
    next_ticket: u64,
}

/// A counting semaphore with a capacity fixed at construction.
#[derive(Debug)]
pub struct Semaphore {
    state: ParkingMutex<SemaphoreState>,
    cvar: Condvar,
    /// Lock-free shadow of available permits for read-heavy observers.
    permits_shadow: AtomicUsize,
    capacity: usize,
    fair: bool,
    config: WaitConfig,
}

impl Semaphore {
    /// Creates a semaphore with `capacity` permits, all available.
    ///
    /// Waiter wake order is unspecified; use [`fair`](Self::fair) for FIFO
    /// admission.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` if `capacity` is zero.
    pub fn new(capacity: usize) -> Result<Self> {
        Self::build(capacity, false, WaitConfig::default())
    }

    /// Creates a FIFO-fair semaphore with `capacity` permits.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` if `capacity` is zero.
    pub fn fair(capacity: usize) -> Result<Self> {
        Self::build(capacity, true, WaitConfig::default())
    }

    /// Creates a semaphore with a custom wait config.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` if `capacity` is zero or the config
    /// fails validation.
    pub fn with_config(capacity: usize, fair: bool, config: WaitConfig) -> Result<Self> {
        Self::build(capacity, fair, config)
    }

    fn build(capacity: usize, fair: bool, config: WaitConfig) -> Result<Self> {
        if capacity == 0 {
            return Err(Error::with_context(
                ErrorKind::InvalidConfiguration,
                "semaphore capacity must be at least 1",
            ));
        }
        config.validate()?;
        Ok(Self {
            state: ParkingMutex::new(SemaphoreState {
                permits: capacity,
                queue: VecDeque::new(),
                next_ticket: 0,
            }),
            cvar: Condvar::new(),
            permits_shadow: AtomicUsize::new(capacity),
            capacity,
            fair,
            config,
        })
    }

    /// Returns the number of currently available permits.
    ///
    /// Advisory only: the value may be stale by the time the caller acts
    /// on it.
    #[must_use]
    pub fn available_permits(&self) -> usize {
        self.permits_shadow.load(Ordering::Relaxed)
    }

    /// Returns the fixed capacity.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns true if this semaphore admits waiters in FIFO order.
    #[must_use]
    pub fn is_fair(&self) -> bool {
        self.fair
    }

    /// Blocks until a permit is available, then consumes it.
    ///
    /// The decrement is atomic with the wake/block decision: both happen
    /// under the internal state lock.
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

    /// Attempts to consume a permit without blocking.
    ///
    /// Returns true on success. In the fair variant this fails whenever
    /// waiters are queued, even if a permit is free.
    #[must_use]
    pub fn try_acquire(&self) -> bool {
        let mut state = self.state.lock();
        if state.permits == 0 || !state.queue.is_empty() {
            return false;
        }
        state.permits -= 1;
        self.permits_shadow.store(state.permits, Ordering::Relaxed);
        true
    }

    /// Returns one permit and wakes a waiter, if any.
    ///
    /// # Errors
    ///
    /// Returns `OverRelease` if the permit count is already at capacity;
    /// the count is left unchanged.
    pub fn release(&self) -> Result<()> {
        let mut state = self.state.lock();
        if state.permits == self.capacity {
            return Err(Error::with_context(
                ErrorKind::OverRelease,
                "semaphore::release",
            ));
        }
        state.permits += 1;
        self.permits_shadow.store(state.permits, Ordering::Relaxed);
        drop(state);
        if self.fair {
            // Only the front ticket may admit; everyone re-checks.
            self.cvar.notify_all();
        } else {
            self.cvar.notify_one();
        }
        Ok(())
    }

    /// Acquires a permit and returns a guard that releases it on drop.
    ///
    /// # Errors
    ///
    /// Returns `Interrupted` if the token fires while waiting.
    pub fn acquire_permit(&self, interrupt: &Interrupt) -> Result<SemaphorePermit<'_>> {
        self.acquire(interrupt)?;
        Ok(SemaphorePermit {
            semaphore: self,
            _not_send: PhantomData,
        })
    }

    fn acquire_inner(&self, interrupt: &Interrupt, deadline: Option<Instant>) -> Result<()> {
        let mut state = self.state.lock();

        let ticket = if self.fair {
            let ticket = state.next_ticket;
            state.next_ticket = state.next_ticket.wrapping_add(1);
            state.queue.push_back(ticket);
            Some(ticket)
        } else {
            None
        };

        loop {
            let eligible = match ticket {
                Some(ticket) => state.permits > 0 && state.queue.front() == Some(&ticket),
                None => state.permits > 0,
            };
            if eligible {
                if ticket.is_some() {
                    state.queue.pop_front();
                }
                state.permits -= 1;
                self.permits_shadow.store(state.permits, Ordering::Relaxed);
                return Ok(());
            }

            let abort = if interrupt.is_requested() {
                Some(Error::new(ErrorKind::Interrupted))
            } else if deadline.is_some_and(|deadline| Instant::now() >= deadline) {
                Some(Error::with_context(ErrorKind::TimedOut, "semaphore::acquire"))
            } else {
                None
            };
            if let Some(err) = abort {
                if let Some(ticket) = ticket {
                    if let Some(pos) = state.queue.iter().position(|&t| t == ticket) {
                        state.queue.remove(pos);
                    }
                    // A permit may be waiting on the ticket we just gave up.
                    if state.permits > 0 {
                        drop(state);
                        self.cvar.notify_all();
                    }
                }
                tracing::trace!("semaphore wait aborted: {err}");
                return Err(err);
            }

            let park = match deadline {
                Some(deadline) => deadline
                    .saturating_duration_since(Instant::now())
                    .min(self.config.poll_interval),
                None => self.config.poll_interval,
            };
            let _ = self.cvar.wait_for(&mut state, park);
        }
    }
}

/// RAII permit returned by [`Semaphore::acquire_permit`]; released on drop.
#[derive(Debug)]
pub struct SemaphorePermit<'a> {
    semaphore: &'a Semaphore,
    _not_send: PhantomData<*const ()>,
}

impl Drop for SemaphorePermit<'_> {
    fn drop(&mut self) {
        // The permit was acquired, so returning it cannot over-release.
        let _ = self.semaphore.release();
    }
}
