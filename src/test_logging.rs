//! Test logging infrastructure for the primitive test suites.
//!
//! Captures typed, timestamped events (acquisitions, releases, latch
//! counts, barrier trips, interrupts) so a failing concurrency test can
//! print exactly what happened in what order.
//!
//! # Overview
//!
//! - [`TestLogLevel`]: configurable verbosity levels
//! - [`TestEvent`]: typed events for primitive operations
//! - [`TestLogger`]: captures and reports events with timestamps
//!
//! # Example
//!
//! ```
//! use synckit::test_logging::{TestEvent, TestLogLevel, TestLogger};
//!
//! let logger = TestLogger::new(TestLogLevel::Debug);
//! logger.log(TestEvent::BarrierTrip { generation: 0 });
//! println!("{}", logger.report());
//! ```

use std::fmt::Write as _;
use std::sync::Mutex;
use std::time::{Duration, Instant};

// ============================================================================
// TestLogLevel
// ============================================================================

/// Logging verbosity level for tests.
///
/// Levels are ordered from least to most verbose:
/// `Error < Warn < Info < Debug < Trace`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum TestLogLevel {
    /// Only errors and failures.
    Error,
    /// Warnings and above.
    Warn,
    /// General test progress.
    #[default]
    Info,
    /// Blocking and release decisions.
    Debug,
    /// Every acquire/release.
    Trace,
}

impl TestLogLevel {
    /// Returns a human-readable name for the level.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Error => "ERROR",
            Self::Warn => "WARN",
            Self::Info => "INFO",
            Self::Debug => "DEBUG",
            Self::Trace => "TRACE",
        }
    }

    /// Returns the level from the `TEST_LOG_LEVEL` environment variable.
    #[must_use]
    pub fn from_env() -> Self {
        std::env::var("TEST_LOG_LEVEL")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or_default()
    }
}

impl std::fmt::Display for TestLogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for TestLogLevel {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "error" => Ok(Self::Error),
            "warn" | "warning" => Ok(Self::Warn),
            "info" => Ok(Self::Info),
            "debug" => Ok(Self::Debug),
            "trace" => Ok(Self::Trace),
            _ => Err(()),
        }
    }
}

// ============================================================================
// TestEvent
// ============================================================================

/// Typed events for primitive operations under test.
#[derive(Debug, Clone)]
pub enum TestEvent {
    /// A thread acquired a primitive.
    Acquired {
        /// Primitive name ("mutex", "semaphore", "rwlock:read", ...).
        primitive: &'static str,
        /// Worker label chosen by the test.
        worker: usize,
    },
    /// A thread released a primitive.
    Released {
        /// Primitive name.
        primitive: &'static str,
        /// Worker label chosen by the test.
        worker: usize,
    },
    /// A blocking call found the primitive unavailable and parked.
    Blocked {
        /// Primitive name.
        primitive: &'static str,
        /// Worker label chosen by the test.
        worker: usize,
    },
    /// A latch count-down, with the remaining count after the call.
    LatchCount {
        /// Count remaining after the decrement.
        remaining: usize,
    },
    /// A barrier trip completing the given generation.
    BarrierTrip {
        /// Generation that just completed.
        generation: u64,
    },
    /// A blocking call returned `Interrupted`.
    Interrupted {
        /// Primitive name.
        primitive: &'static str,
    },
    /// Free-form progress event.
    Custom {
        /// Short category tag.
        category: &'static str,
        /// Formatted message.
        message: String,
    },
    /// Error event; [`TestLogger::assert_no_errors`] fails if any exist.
    Error {
        /// Short category tag.
        category: &'static str,
        /// Formatted message.
        message: String,
    },
    /// Warning event.
    Warn {
        /// Short category tag.
        category: &'static str,
        /// Formatted message.
        message: String,
    },
}

impl TestEvent {
    /// Returns the level at which this event is logged.
    #[must_use]
    pub const fn level(&self) -> TestLogLevel {
        match self {
            Self::Error { .. } => TestLogLevel::Error,
            Self::Warn { .. } => TestLogLevel::Warn,
            Self::Custom { .. } | Self::Interrupted { .. } => TestLogLevel::Info,
            Self::Blocked { .. } | Self::LatchCount { .. } | Self::BarrierTrip { .. } => {
                TestLogLevel::Debug
            }
            Self::Acquired { .. } | Self::Released { .. } => TestLogLevel::Trace,
        }
    }

    /// Returns a short category name for the event.
    #[must_use]
    pub const fn category(&self) -> &'static str {
        match self {
            Self::Acquired { .. } | Self::Released { .. } | Self::Blocked { .. } => "lock",
            Self::LatchCount { .. } => "latch",
            Self::BarrierTrip { .. } => "barrier",
            Self::Interrupted { .. } => "interrupt",
            Self::Custom { category, .. }
            | Self::Error { category, .. }
            | Self::Warn { category, .. } => category,
        }
    }
}

impl std::fmt::Display for TestEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Acquired { primitive, worker } => {
                write!(f, "acquired: primitive={primitive} worker={worker}")
            }
            Self::Released { primitive, worker } => {
                write!(f, "released: primitive={primitive} worker={worker}")
            }
            Self::Blocked { primitive, worker } => {
                write!(f, "blocked: primitive={primitive} worker={worker}")
            }
            Self::LatchCount { remaining } => write!(f, "latch count-down: remaining={remaining}"),
            Self::BarrierTrip { generation } => write!(f, "barrier trip: generation={generation}"),
            Self::Interrupted { primitive } => write!(f, "interrupted: primitive={primitive}"),
            Self::Custom { category, message } => write!(f, "[{category}] {message}"),
            Self::Error { category, message } => write!(f, "ERROR [{category}] {message}"),
            Self::Warn { category, message } => write!(f, "WARN [{category}] {message}"),
        }
    }
}

// ============================================================================
// TestLogger
// ============================================================================

/// A timestamped event record.
#[derive(Debug, Clone)]
pub struct LogRecord {
    /// Time since logger creation.
    pub elapsed: Duration,
    /// The event that occurred.
    pub event: TestEvent,
}

/// Captures typed events with timestamps and renders a report.
#[derive(Debug)]
pub struct TestLogger {
    level: TestLogLevel,
    events: Mutex<Vec<LogRecord>>,
    start_time: Instant,
    verbose: bool,
}

impl TestLogger {
    /// Creates a new logger with the specified level.
    #[must_use]
    pub fn new(level: TestLogLevel) -> Self {
        Self {
            level,
            events: Mutex::new(Vec::new()),
            start_time: Instant::now(),
            verbose: level >= TestLogLevel::Trace,
        }
    }

    /// Creates a logger using the `TEST_LOG_LEVEL` environment variable.
    #[must_use]
    pub fn from_env() -> Self {
        Self::new(TestLogLevel::from_env())
    }

    /// Sets whether to print events immediately.
    #[must_use]
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Returns the configured log level.
    #[must_use]
    pub fn level(&self) -> TestLogLevel {
        self.level
    }

    /// Logs an event if it meets the configured level.
    pub fn log(&self, event: TestEvent) {
        let event_level = event.level();
        if event_level > self.level {
            return;
        }

        let elapsed = self.start_time.elapsed();
        if self.verbose {
            eprintln!(
                "[{:>10.3}ms] [{:>5}] {}",
                elapsed.as_secs_f64() * 1000.0,
                event_level.name(),
                &event
            );
        }
        self.events
            .lock()
            .expect("lock poisoned")
            .push(LogRecord { elapsed, event });
    }

    /// Logs a custom event.
    pub fn custom(&self, category: &'static str, message: impl Into<String>) {
        self.log(TestEvent::Custom {
            category,
            message: message.into(),
        });
    }

    /// Logs an error event.
    pub fn error(&self, category: &'static str, message: impl Into<String>) {
        self.log(TestEvent::Error {
            category,
            message: message.into(),
        });
    }

    /// Logs a warning event.
    pub fn warn(&self, category: &'static str, message: impl Into<String>) {
        self.log(TestEvent::Warn {
            category,
            message: message.into(),
        });
    }

    /// Returns the number of captured events.
    #[must_use]
    pub fn event_count(&self) -> usize {
        self.events.lock().expect("lock poisoned").len()
    }

    /// Returns a snapshot of all captured events.
    #[must_use]
    pub fn events(&self) -> Vec<LogRecord> {
        self.events.lock().expect("lock poisoned").clone()
    }

    /// Generates a detailed report of all captured events.
    #[must_use]
    #[allow(clippy::significant_drop_tightening)]
    pub fn report(&self) -> String {
        let events = self.events.lock().expect("lock poisoned");
        let mut report = String::new();

        let _ = writeln!(report, "=== Test Event Log ({} events) ===", events.len());
        let _ = writeln!(report);
        for record in events.iter() {
            let _ = writeln!(
                report,
                "[{:>10.3}ms] [{:>5}] {:>9} | {}",
                record.elapsed.as_secs_f64() * 1000.0,
                record.event.level().name(),
                record.event.category(),
                record.event
            );
        }

        let count = |pred: fn(&TestEvent) -> bool| events.iter().filter(|r| pred(&r.event)).count();
        let _ = writeln!(report);
        let _ = writeln!(report, "=== Statistics ===");
        let _ = writeln!(
            report,
            "Acquired: {}",
            count(|e| matches!(e, TestEvent::Acquired { .. }))
        );
        let _ = writeln!(
            report,
            "Released: {}",
            count(|e| matches!(e, TestEvent::Released { .. }))
        );
        let _ = writeln!(
            report,
            "Barrier trips: {}",
            count(|e| matches!(e, TestEvent::BarrierTrip { .. }))
        );
        let _ = writeln!(
            report,
            "Interrupts: {}",
            count(|e| matches!(e, TestEvent::Interrupted { .. }))
        );
        let _ = writeln!(
            report,
            "Errors: {}",
            count(|e| matches!(e, TestEvent::Error { .. }))
        );
        let _ = writeln!(
            report,
            "Warnings: {}",
            count(|e| matches!(e, TestEvent::Warn { .. }))
        );
        if let Some(last) = events.last() {
            let _ = writeln!(report, "Total duration: {:?}", last.elapsed);
        }

        report
    }

    /// Asserts that no errors were logged.
    ///
    /// # Panics
    ///
    /// Panics if any error events were logged, printing the full report.
    pub fn assert_no_errors(&self) {
        let error_messages: Vec<String> = {
            let events = self.events.lock().expect("lock poisoned");
            events
                .iter()
                .filter(|r| matches!(r.event, TestEvent::Error { .. }))
                .map(|r| format!("  - {}", r.event))
                .collect()
        };

        assert!(
            error_messages.is_empty(),
            "Test logged {} errors:\n{}\n\nFull log:\n{}",
            error_messages.len(),
            error_messages.join("\n"),
            self.report()
        );
    }

    /// Clears all captured events.
    pub fn clear(&self) {
        self.events.lock().expect("lock poisoned").clear();
    }
}

impl Default for TestLogger {
    fn default() -> Self {
        Self::new(TestLogLevel::Info)
    }
}

// ============================================================================
// Macros
// ============================================================================

/// Log a custom event to a test logger.
///
/// ```ignore
/// test_log!(logger, "setup", "spawning {} workers", n);
/// ```
#[macro_export]
macro_rules! test_log {
    ($logger:expr, $cat:literal, $($arg:tt)*) => {
        $logger.log($crate::test_logging::TestEvent::Custom {
            category: $cat,
            message: format!($($arg)*),
        });
    };
}

/// Log an error event to a test logger.
#[macro_export]
macro_rules! test_error {
    ($logger:expr, $cat:literal, $($arg:tt)*) => {
        $logger.log($crate::test_logging::TestEvent::Error {
            category: $cat,
            message: format!($($arg)*),
        });
    };
}

/// Assert a condition, printing the full log on failure.
#[macro_export]
macro_rules! assert_log {
    ($logger:expr, $cond:expr) => {
        if !$cond {
            eprintln!("{}", $logger.report());
            panic!("assertion failed: {}", stringify!($cond));
        }
    };
    ($logger:expr, $cond:expr, $($arg:tt)*) => {
        if !$cond {
            eprintln!("{}", $logger.report());
            panic!($($arg)*);
        }
    };
}

/// Assert equality, printing the full log on failure.
#[macro_export]
macro_rules! assert_eq_log {
    ($logger:expr, $left:expr, $right:expr) => {
        if $left != $right {
            eprintln!("{}", $logger.report());
            panic!(
                "assertion failed: `(left == right)`\n  left: {:?}\n right: {:?}",
                $left, $right
            );
        }
    };
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_ordering() {
        assert!(TestLogLevel::Error < TestLogLevel::Warn);
        assert!(TestLogLevel::Warn < TestLogLevel::Info);
        assert!(TestLogLevel::Info < TestLogLevel::Debug);
        assert!(TestLogLevel::Debug < TestLogLevel::Trace);
    }

    #[test]
    fn level_from_str() {
        assert_eq!("error".parse(), Ok(TestLogLevel::Error));
        assert_eq!("WARN".parse(), Ok(TestLogLevel::Warn));
        assert_eq!("warning".parse(), Ok(TestLogLevel::Warn));
        assert_eq!("trace".parse(), Ok(TestLogLevel::Trace));
        assert_eq!("bogus".parse::<TestLogLevel>(), Err(()));
    }

    #[test]
    fn logger_filters_by_level() {
        let logger = TestLogger::new(TestLogLevel::Info);

        // Info level: captured.
        logger.log(TestEvent::Interrupted { primitive: "mutex" });
        // Trace level: filtered out.
        logger.log(TestEvent::Acquired {
            primitive: "mutex",
            worker: 0,
        });

        assert_eq!(logger.event_count(), 1);
    }

    #[test]
    fn report_includes_statistics() {
        let logger = TestLogger::new(TestLogLevel::Trace);
        logger.log(TestEvent::Acquired {
            primitive: "mutex",
            worker: 1,
        });
        logger.log(TestEvent::Released {
            primitive: "mutex",
            worker: 1,
        });
        logger.log(TestEvent::BarrierTrip { generation: 0 });

        let report = logger.report();
        assert!(report.contains("3 events"));
        assert!(report.contains("Acquired: 1"));
        assert!(report.contains("Barrier trips: 1"));
    }

    #[test]
    #[should_panic(expected = "Test logged 1 errors")]
    fn assert_no_errors_fails_on_error() {
        let logger = TestLogger::new(TestLogLevel::Error);
        logger.error("lock", "unexpected NotOwner");
        logger.assert_no_errors();
    }

    #[test]
    fn macros_capture_events() {
        let logger = TestLogger::new(TestLogLevel::Debug);
        test_log!(logger, "test", "message with arg: {}", 42);
        test_error!(logger, "lock", "error message");
        assert_eq!(logger.event_count(), 2);
    }
}
