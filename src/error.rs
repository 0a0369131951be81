//! Error types and error handling strategy for synckit.
//!
//! Error handling follows these principles:
//!
//! - Errors are explicit and typed (no stringly-typed errors)
//! - Every error is surfaced synchronously to the caller of the offending
//!   operation; no primitive retries internally or swallows an error
//! - Caller misuse (releasing a lock you do not hold, over-releasing a
//!   semaphore) is reported, not repaired: primitives do not self-heal
//!
//! # Error Categories
//!
//! - **Misuse**: `NotOwner`, `OverRelease`, `InvalidConfiguration` —
//!   programming errors in the caller, recoverable but indicative of a bug
//! - **Cancellation**: `Interrupted` — a blocking call was cancelled via its
//!   [`Interrupt`](crate::interrupt::Interrupt) token
//! - **Timing**: `TimedOut` — a timed variant expired; distinct from both
//!   success and interruption

use core::fmt;

/// The kind of error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A lock (or lock side) was released by a thread that does not hold it.
    NotOwner,
    /// A semaphore release would push the permit count past its capacity.
    OverRelease,
    /// A blocking call was cancelled through its interrupt token.
    Interrupted,
    /// A timed acquire or wait expired before the primitive became available.
    TimedOut,
    /// A construction parameter was invalid (zero capacity, zero parties).
    InvalidConfiguration,
}

impl ErrorKind {
    /// Returns a short static description of the kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotOwner => "released by a thread that is not the holder",
            Self::OverRelease => "release would exceed semaphore capacity",
            Self::Interrupted => "blocking call interrupted",
            Self::TimedOut => "timed out waiting for the primitive",
            Self::InvalidConfiguration => "invalid construction parameter",
        }
    }

    /// Returns true for errors caused by caller misuse rather than by
    /// external cancellation or timing.
    #[must_use]
    pub const fn is_misuse(self) -> bool {
        matches!(
            self,
            Self::NotOwner | Self::OverRelease | Self::InvalidConfiguration
        )
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The crate-wide error type.
///
/// Carries an [`ErrorKind`] plus an optional static context string naming
/// the primitive and operation that failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Error {
    kind: ErrorKind,
    context: Option<&'static str>,
}

impl Error {
    /// Creates an error of the given kind.
    #[must_use]
    pub const fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            context: None,
        }
    }

    /// Creates an error with a static context string.
    #[must_use]
    pub const fn with_context(kind: ErrorKind, context: &'static str) -> Self {
        Self {
            kind,
            context: Some(context),
        }
    }

    /// Returns the error kind.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns true if this error is an interruption.
    #[must_use]
    pub const fn is_interrupted(&self) -> bool {
        matches!(self.kind, ErrorKind::Interrupted)
    }

    /// Returns true if this error is a timeout.
    #[must_use]
    pub const fn is_timed_out(&self) -> bool {
        matches!(self.kind, ErrorKind::TimedOut)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.context {
            Some(context) => write!(f, "{context}: {}", self.kind),
            None => write!(f, "{}", self.kind),
        }
    }
}

impl std::error::Error for Error {}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Self::new(kind)
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_classification() {
        assert!(ErrorKind::NotOwner.is_misuse());
        assert!(ErrorKind::OverRelease.is_misuse());
        assert!(ErrorKind::InvalidConfiguration.is_misuse());
        assert!(!ErrorKind::Interrupted.is_misuse());
        assert!(!ErrorKind::TimedOut.is_misuse());
    }

    #[test]
    fn display_includes_context() {
        let err = Error::with_context(ErrorKind::NotOwner, "mutex::release");
        let text = err.to_string();
        assert!(text.contains("mutex::release"));
        assert!(text.contains("not the holder"));
    }

    #[test]
    fn predicates_match_kind() {
        assert!(Error::new(ErrorKind::Interrupted).is_interrupted());
        assert!(Error::new(ErrorKind::TimedOut).is_timed_out());
        assert!(!Error::new(ErrorKind::TimedOut).is_interrupted());
    }
}
