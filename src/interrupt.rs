//! Interruption token for blocking calls.
//!
//! Every blocking operation in this crate takes an explicit [`Interrupt`]
//! token instead of relying on ambient per-thread state. Requesting the
//! token makes every pending and future blocking call that observes it
//! return [`ErrorKind::Interrupted`](crate::error::ErrorKind::Interrupted)
//! promptly, bounded by the wait tick configured in
//! [`WaitConfig`](crate::config::WaitConfig), rather than hang forever.
//!
//! # Sharing
//!
//! `Interrupt` is cheaply clonable (it wraps an `Arc`). Clones share the
//! same flag, so a request made from one thread is visible to every blocked
//! call holding a clone.
//!
//! ```
//! use synckit::Interrupt;
//!
//! let interrupt = Interrupt::new();
//! assert!(interrupt.checkpoint().is_ok());
//!
//! interrupt.request();
//! assert!(interrupt.checkpoint().is_err());
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::{Error, ErrorKind, Result};

/// A shared cancellation flag observed by blocking calls.
///
/// The flag is sticky until [`clear`](Interrupt::clear) is called: once
/// requested, every checkpoint fails. Primitives never clear the flag
/// themselves; ownership of the token's lifecycle stays with the caller.
#[derive(Debug, Clone, Default)]
pub struct Interrupt {
    requested: Arc<AtomicBool>,
}

impl Interrupt {
    /// Creates a fresh token with no interruption requested.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests interruption.
    ///
    /// Blocked calls observing this token return
    /// [`ErrorKind::Interrupted`](crate::error::ErrorKind::Interrupted)
    /// within one wait tick.
    pub fn request(&self) {
        self.requested.store(true, Ordering::Release);
        tracing::trace!("interrupt requested");
    }

    /// Clears a previously requested interruption.
    pub fn clear(&self) {
        self.requested.store(false, Ordering::Release);
    }

    /// Returns true if interruption has been requested.
    #[must_use]
    pub fn is_requested(&self) -> bool {
        self.requested.load(Ordering::Acquire)
    }

    /// Checks for interruption, returning an error if requested.
    ///
    /// Convenient with the `?` operator inside wait loops.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::Interrupted`](crate::error::ErrorKind::Interrupted)
    /// if interruption is pending.
    pub fn checkpoint(&self) -> Result<()> {
        if self.is_requested() {
            Err(Error::new(ErrorKind::Interrupted))
        } else {
            Ok(())
        }
    }
}
