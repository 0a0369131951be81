//! Reusable cyclic barrier for N-way rendezvous.
//!
//! The barrier trips when `parties` callers have arrived in the current
//! generation. Exactly one caller per trip observes `is_leader = true`;
//! the leader runs the optional trip action before the other waiters are
//! released. A completed trip resets the arrival count and advances the
//! generation, so the barrier is immediately reusable.
//!
//! Waiters are tied to the generation they arrived in: a thread's `wait`
//! returns only when *its* generation has tripped, so a reset can never
//! release a stale waiter early.

use parking_lot::{Condvar, Mutex as ParkingMutex};
use std::fmt;
use std::time::{Duration, Instant};

use crate::config::WaitConfig;
use crate::error::{Error, ErrorKind, Result};
use crate::interrupt::Interrupt;

type BarrierAction = Box<dyn Fn() + Send + Sync>;

#[derive(Debug)]
struct BarrierState {
    arrived: usize,
    generation: u64,
}

/// Reusable barrier for a fixed party size, with an optional trip action.
pub struct Barrier {
    parties: usize,
    state: ParkingMutex<BarrierState>,
    cvar: Condvar,
    action: Option<BarrierAction>,
    config: WaitConfig,
}

impl fmt::Debug for Barrier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Barrier")
            .field("parties", &self.parties)
            .field("has_action", &self.action.is_some())
            .finish_non_exhaustive()
    }
}

impl Barrier {
    /// Creates a barrier that trips when `parties` callers have arrived.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` if `parties` is zero.
    pub fn new(parties: usize) -> Result<Self> {
        Self::build(parties, None, WaitConfig::default())
    }

    /// Creates a barrier whose leader runs `action` once per trip, before
    /// the waiters of that trip are released.
    ///
    /// The action runs with the barrier's internal lock held; it must not
    /// call back into this barrier.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` if `parties` is zero.
    pub fn with_action(parties: usize, action: impl Fn() + Send + Sync + 'static) -> Result<Self> {
        Self::build(parties, Some(Box::new(action)), WaitConfig::default())
    }

    /// Creates a barrier with a custom wait config.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` if `parties` is zero or the config
    /// fails validation.
    pub fn with_config(parties: usize, config: WaitConfig) -> Result<Self> {
        Self::build(parties, None, config)
    }

    fn build(parties: usize, action: Option<BarrierAction>, config: WaitConfig) -> Result<Self> {
        if parties == 0 {
            return Err(Error::with_context(
                ErrorKind::InvalidConfiguration,
                "barrier requires at least 1 party",
            ));
        }
        config.validate()?;
        Ok(Self {
            parties,
            state: ParkingMutex::new(BarrierState {
                arrived: 0,
                generation: 0,
            }),
            cvar: Condvar::new(),
            action,
            config,
        })
    }

    /// Returns the number of parties required to trip the barrier.
    #[must_use]
    pub fn parties(&self) -> usize {
        self.parties
    }

    /// Returns the number of completed trips.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.state.lock().generation
    }

    /// Waits for the barrier to trip.
    ///
    /// The last arrival becomes the leader: it runs the trip action, resets
    /// the arrival count, advances the generation, and releases the other
    /// waiters of this generation.
    ///
    /// # Errors
    ///
    /// Returns `Interrupted` if the token fires while waiting; the
    /// caller's arrival is withdrawn and the barrier remains usable.
    pub fn wait(&self, interrupt: &Interrupt) -> Result<BarrierWaitResult> {
        self.wait_inner(interrupt, None)
    }

    /// Like [`wait`](Self::wait), but gives up after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns `TimedOut` on expiry (withdrawing the arrival), or
    /// `Interrupted` if the token fires first.
    pub fn wait_timeout(
        &self,
        interrupt: &Interrupt,
        timeout: Duration,
    ) -> Result<BarrierWaitResult> {
        self.wait_inner(interrupt, Some(Instant::now() + timeout))
    }

    fn wait_inner(
        &self,
        interrupt: &Interrupt,
        deadline: Option<Instant>,
    ) -> Result<BarrierWaitResult> {
        let mut state = self.state.lock();
        let generation = state.generation;
        state.arrived += 1;

        if state.arrived == self.parties {
            // Trip: run the action before anyone is released, then reset.
            if let Some(action) = &self.action {
                action();
            }
            state.arrived = 0;
            state.generation = generation.wrapping_add(1);
            drop(state);
            tracing::trace!(generation, "barrier tripped");
            self.cvar.notify_all();
            return Ok(BarrierWaitResult { is_leader: true });
        }

        loop {
            if state.generation != generation {
                return Ok(BarrierWaitResult { is_leader: false });
            }

            let abort = if interrupt.is_requested() {
                Some(Error::new(ErrorKind::Interrupted))
            } else if deadline.is_some_and(|deadline| Instant::now() >= deadline) {
                Some(Error::with_context(ErrorKind::TimedOut, "barrier::wait"))
            } else {
                None
            };
            if let Some(err) = abort {
                // The trip may have completed while we were checking;
                // treat that as normal completion.
                if state.generation != generation {
                    return Ok(BarrierWaitResult { is_leader: false });
                }
                if state.arrived > 0 {
                    state.arrived -= 1;
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

/// Result of a barrier wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BarrierWaitResult {
    is_leader: bool,
}

impl BarrierWaitResult {
    /// Returns true for exactly one party (the leader) each trip.
    #[must_use]
    pub fn is_leader(&self) -> bool {
        self.is_leader
    }
}
