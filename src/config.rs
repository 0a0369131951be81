//! Wait-loop tuning for the blocking primitives.
//!
//! Every blocking wait in this crate is a condition-variable loop: the
//! caller re-checks eligibility, observes its interrupt token and any
//! deadline, then parks for at most one tick. [`WaitConfig`] controls that
//! tick. A shorter tick tightens interrupt/timeout latency at the cost of
//! more spurious wakeups; the default is a reasonable middle ground.

use std::time::Duration;

use crate::error::{Error, ErrorKind, Result};

/// Tuning for blocking wait loops.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitConfig {
    /// Upper bound on a single condition-variable park.
    ///
    /// Interrupt requests and timeouts are observed within one tick.
    pub poll_interval: Duration,
}

impl Default for WaitConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(1),
        }
    }
}

impl WaitConfig {
    /// Creates a config with the given poll interval.
    #[must_use]
    pub const fn new(poll_interval: Duration) -> Self {
        Self { poll_interval }
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::InvalidConfiguration`] if the poll interval is
    /// zero (a zero tick turns every wait into a busy loop).
    pub fn validate(&self) -> Result<()> {
        if self.poll_interval.is_zero() {
            return Err(Error::with_context(
                ErrorKind::InvalidConfiguration,
                "WaitConfig::poll_interval must be non-zero",
            ));
        }
        Ok(())
    }
}
