//! Reader/writer lock with writer-priority admission.
//!
//! Multiple readers may hold the lock concurrently; a writer holds it
//! exclusively. The lock is **writer-preferring**: once a writer is
//! queued, new read requests block until that writer has acquired and
//! released. This prevents writer starvation under heavy read load, at
//! the cost of possible reader starvation under continuous write
//! pressure.
//!
//! | Scenario                  | Behavior                                   |
//! |---------------------------|--------------------------------------------|
//! | No writers waiting        | Readers acquire immediately                |
//! | Writer waiting            | New readers blocked until writer completes |
//! | Existing readers + writer | Writer waits for all readers to release    |
//!
//! # Ownership
//!
//! Each side tracks who holds it: `release_read` from a thread with no
//! read hold, or `release_write` from a thread other than the writer, is
//! rejected with `NotOwner`.
//!
//! # No upgrade
//!
//! Upgrading read → write is unsupported: release the read hold, then
//! acquire write (other writers may interleave). A reader that re-acquires
//! read while a writer is queued will deadlock against that writer; take
//! each read hold once per thread.

use parking_lot::{Condvar, Mutex as ParkingMutex};
use std::collections::HashMap;
use std::marker::PhantomData;
use std::thread::{self, ThreadId};
use std::time::{Duration, Instant};

use crate::config::WaitConfig;
use crate::error::{Error, ErrorKind, Result};
use crate::interrupt::Interrupt;

#[derive(Debug, Default)]
struct RwState {
    /// Read holds per thread. Sum of values == total active read holds.
    reader_holds: HashMap<ThreadId, usize>,
    readers: usize,
    writer: Option<ThreadId>,
    writer_waiters: usize,
}

/// A writer-preferring reader/writer lock.
#[derive(Debug, Default)]
pub struct RwLock {
    state: ParkingMutex<RwState>,
    cvar: Condvar,
    config: WaitConfig,
}

impl RwLock {
    /// Creates an unheld lock with the default wait config.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an unheld lock with a custom wait config.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` if the config fails validation.
    pub fn with_config(config: WaitConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            ..Self::default()
        })
    }

    /// Returns the number of active read holds.
    #[must_use]
    pub fn reader_count(&self) -> usize {
        self.state.lock().readers
    }

    /// Returns true if a writer currently holds the lock.
    #[must_use]
    pub fn writer_active(&self) -> bool {
        self.state.lock().writer.is_some()
    }

    /// Acquires a read hold, blocking while a writer holds or is queued.
    ///
    /// # Errors
    ///
    /// Returns `Interrupted` if the token fires while waiting.
    pub fn acquire_read(&self, interrupt: &Interrupt) -> Result<()> {
        self.acquire_read_inner(interrupt, None)
    }

    /// Like [`acquire_read`](Self::acquire_read), but gives up after
    /// `timeout` with `TimedOut`.
    ///
    /// # Errors
    ///
    /// Returns `TimedOut` on expiry, or `Interrupted` if the token fires
    /// first.
    pub fn acquire_read_for(&self, interrupt: &Interrupt, timeout: Duration) -> Result<()> {
        self.acquire_read_inner(interrupt, Some(Instant::now() + timeout))
    }

    /// Releases one read hold taken by the calling thread.
    ///
    /// # Errors
    ///
    /// Returns `NotOwner` if the calling thread holds no read lock.
    pub fn release_read(&self) -> Result<()> {
        let me = thread::current().id();
        let mut state = self.state.lock();
        let Some(holds) = state.reader_holds.get_mut(&me) else {
            return Err(Error::with_context(
                ErrorKind::NotOwner,
                "rwlock::release_read",
            ));
        };
        *holds -= 1;
        if *holds == 0 {
            state.reader_holds.remove(&me);
        }
        state.readers -= 1;
        let last_reader = state.readers == 0;
        drop(state);
        if last_reader {
            // A queued writer is eligible now.
            self.cvar.notify_all();
        }
        Ok(())
    }

    /// Acquires the write side, blocking until all readers release and no
    /// other writer holds.
    ///
    /// # Errors
    ///
    /// Returns `Interrupted` if the token fires while waiting.
    pub fn acquire_write(&self, interrupt: &Interrupt) -> Result<()> {
        self.acquire_write_inner(interrupt, None)
    }

    /// Like [`acquire_write`](Self::acquire_write), but gives up after
    /// `timeout` with `TimedOut`.
    ///
    /// # Errors
    ///
    /// Returns `TimedOut` on expiry, or `Interrupted` if the token fires
    /// first.
    pub fn acquire_write_for(&self, interrupt: &Interrupt, timeout: Duration) -> Result<()> {
        self.acquire_write_inner(interrupt, Some(Instant::now() + timeout))
    }

    /// Releases the write side.
    ///
    /// # Errors
    ///
    /// Returns `NotOwner` if the calling thread is not the active writer.
    pub fn release_write(&self) -> Result<()> {
        let me = thread::current().id();
        let mut state = self.state.lock();
        if state.writer != Some(me) {
            return Err(Error::with_context(
                ErrorKind::NotOwner,
                "rwlock::release_write",
            ));
        }
        state.writer = None;
        drop(state);
        self.cvar.notify_all();
        Ok(())
    }

    /// Acquires a read hold and returns a guard that releases it on drop.
    ///
    /// # Errors
    ///
    /// Returns `Interrupted` if the token fires while waiting.
    pub fn read(&self, interrupt: &Interrupt) -> Result<RwReadGuard<'_>> {
        self.acquire_read(interrupt)?;
        Ok(RwReadGuard {
            lock: self,
            _not_send: PhantomData,
        })
    }

    /// Acquires the write side and returns a guard that releases it on drop.
    ///
    /// # Errors
    ///
    /// Returns `Interrupted` if the token fires while waiting.
    pub fn write(&self, interrupt: &Interrupt) -> Result<RwWriteGuard<'_>> {
        self.acquire_write(interrupt)?;
        Ok(RwWriteGuard {
            lock: self,
            _not_send: PhantomData,
        })
    }

    fn acquire_read_inner(&self, interrupt: &Interrupt, deadline: Option<Instant>) -> Result<()> {
        let me = thread::current().id();
        let mut state = self.state.lock();
        loop {
            if state.writer.is_none() && state.writer_waiters == 0 {
                *state.reader_holds.entry(me).or_insert(0) += 1;
                state.readers += 1;
                return Ok(());
            }
            interrupt.checkpoint()?;
            let park = match deadline {
                Some(deadline) => {
                    let remaining = deadline.saturating_duration_since(Instant::now());
                    if remaining.is_zero() {
                        return Err(Error::with_context(
                            ErrorKind::TimedOut,
                            "rwlock::acquire_read",
                        ));
                    }
                    remaining.min(self.config.poll_interval)
                }
                None => self.config.poll_interval,
            };
            let _ = self.cvar.wait_for(&mut state, park);
        }
    }

    fn acquire_write_inner(&self, interrupt: &Interrupt, deadline: Option<Instant>) -> Result<()> {
        let me = thread::current().id();
        let mut state = self.state.lock();
        if state.writer.is_some() || state.readers > 0 {
            tracing::trace!(
                readers = state.readers,
                "writer queued behind active holders"
            );
        }
        state.writer_waiters += 1;
        loop {
            if state.writer.is_none() && state.readers == 0 {
                state.writer = Some(me);
                state.writer_waiters -= 1;
                return Ok(());
            }

            let abort = if interrupt.is_requested() {
                Some(Error::new(ErrorKind::Interrupted))
            } else if deadline.is_some_and(|deadline| Instant::now() >= deadline) {
                Some(Error::with_context(
                    ErrorKind::TimedOut,
                    "rwlock::acquire_write",
                ))
            } else {
                None
            };
            if let Some(err) = abort {
                state.writer_waiters -= 1;
                let unblock_readers = state.writer_waiters == 0;
                drop(state);
                if unblock_readers {
                    // Readers held back by our queued write may proceed.
                    self.cvar.notify_all();
                }
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

/// RAII read hold returned by [`RwLock::read`]; released on drop.
#[derive(Debug)]
pub struct RwReadGuard<'a> {
    lock: &'a RwLock,
    _not_send: PhantomData<*const ()>,
}

impl Drop for RwReadGuard<'_> {
    fn drop(&mut self) {
        // !Send: drop runs on the acquiring thread, so release cannot fail.
        let _ = self.lock.release_read();
    }
}

/// RAII write hold returned by [`RwLock::write`]; released on drop.
#[derive(Debug)]
pub struct RwWriteGuard<'a> {
    lock: &'a RwLock,
    _not_send: PhantomData<*const ()>,
}

impl Drop for RwWriteGuard<'_> {
    fn drop(&mut self) {
        let _ = self.lock.release_write();
    }
}
