//! One-shot countdown latch.
//!
//! A latch starts at a fixed count and releases every waiter, current and
//! future, once `count_down` has been called that many times. Zero is
//! terminal: the latch never resets, and counting down past zero is a
//! silent no-op rather than an error.
//!
//! A latch constructed with count 0 is already released.
//!
//! # Example
//!
//! ```
//! use synckit::{CountdownLatch, Interrupt};
//!
//! let latch = CountdownLatch::new(2);
//! latch.count_down();
//! latch.count_down();
//! latch.wait(&Interrupt::new())?; // returns immediately
//! # Ok::<(), synckit::Error>(())
//! ```

use parking_lot::{Condvar, Mutex as ParkingMutex};
use std::time::{Duration, Instant};

use crate::config::WaitConfig;
use crate::error::{Error, ErrorKind, Result};
use crate::interrupt::Interrupt;

/// A one-shot gate that opens after a fixed number of events.
#[derive(Debug)]
pub struct CountdownLatch {
    count: ParkingMutex<usize>,
    cvar: Condvar,
    config: WaitConfig,
}

impl CountdownLatch {
    /// Creates a latch that releases after `count` events.
    ///
    /// `count == 0` constructs an already-released latch.
    #[must_use]
    pub fn new(count: usize) -> Self {
        Self {
            count: ParkingMutex::new(count),
            cvar: Condvar::new(),
            config: WaitConfig::default(),
        }
    }

    /// Creates a latch with a custom wait config.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfiguration` if the config fails validation.
    pub fn with_config(count: usize, config: WaitConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            count: ParkingMutex::new(count),
            cvar: Condvar::new(),
            config,
        })
    }

    /// Returns the remaining count.
    #[must_use]
    pub fn count(&self) -> usize {
        *self.count.lock()
    }

    /// Returns true once the count has reached zero.
    #[must_use]
    pub fn is_released(&self) -> bool {
        self.count() == 0
    }

    /// Records one event, decrementing the count if it is positive.
    ///
    /// The call that reaches zero releases all waiters. Calls after zero
    /// are no-ops.
    pub fn count_down(&self) {
        let mut count = self.count.lock();
        match *count {
            0 => {}
            1 => {
                *count = 0;
                drop(count);
                tracing::trace!("latch released");
                self.cvar.notify_all();
            }
            _ => *count -= 1,
        }
    }

    /// Blocks until the count reaches zero.
    ///
    /// Returns immediately if the latch is already released.
    ///
    /// # Errors
    ///
    /// Returns `Interrupted` if the token fires while waiting.
    pub fn wait(&self, interrupt: &Interrupt) -> Result<()> {
        self.wait_inner(interrupt, None)
    }

    /// Like [`wait`](Self::wait), but gives up after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns `TimedOut` on expiry, or `Interrupted` if the token fires
    /// first.
    pub fn wait_for(&self, interrupt: &Interrupt, timeout: Duration) -> Result<()> {
        self.wait_inner(interrupt, Some(Instant::now() + timeout))
    }

    fn wait_inner(&self, interrupt: &Interrupt, deadline: Option<Instant>) -> Result<()> {
        let mut count = self.count.lock();
        loop {
            if *count == 0 {
                return Ok(());
            }
            interrupt.checkpoint()?;
            let park = match deadline {
                Some(deadline) => {
                    let remaining = deadline.saturating_duration_since(Instant::now());
                    if remaining.is_zero() {
                        return Err(Error::with_context(ErrorKind::TimedOut, "latch::wait"));
                    }
                    remaining.min(self.config.poll_interval)
                }
                None => self.config.poll_interval,
            };
            let _ = self.cvar.wait_for(&mut count, park);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn zero_count_is_already_released() {
        let latch = CountdownLatch::new(0);
        assert!(latch.is_released());
        latch.wait(&Interrupt::new()).expect("wait should not block");
    }

    #[test]
    fn count_down_past_zero_is_noop() {
        let latch = CountdownLatch::new(1);
        latch.count_down();
        latch.count_down();
        latch.count_down();
        assert_eq!(latch.count(), 0);
    }

    #[test]
    fn wait_blocks_until_final_count_down() {
        let latch = Arc::new(CountdownLatch::new(3));

        let latch2 = Arc::clone(&latch);
        let waiter = std::thread::spawn(move || {
            let interrupt = Interrupt::new();
            latch2.wait(&interrupt)
        });

        latch.count_down();
        latch.count_down();
        std::thread::sleep(Duration::from_millis(10));
        assert!(!waiter.is_finished());

        latch.count_down();
        waiter
            .join()
            .expect("thread panicked")
            .expect("wait should succeed after release");
        assert!(latch.is_released());
    }

    #[test]
    fn release_frees_all_waiters() {
        let latch = Arc::new(CountdownLatch::new(1));
        let waiters: Vec<_> = (0..4)
            .map(|_| {
                let latch = Arc::clone(&latch);
                std::thread::spawn(move || latch.wait(&Interrupt::new()))
            })
            .collect();

        std::thread::sleep(Duration::from_millis(10));
        latch.count_down();
        for waiter in waiters {
            waiter
                .join()
                .expect("thread panicked")
                .expect("all waiters released");
        }
    }

    #[test]
    fn timed_wait_reports_timeout() {
        let latch = CountdownLatch::new(1);
        let err = latch
            .wait_for(&Interrupt::new(), Duration::from_millis(20))
            .expect_err("latch never released");
        assert_eq!(err.kind(), ErrorKind::TimedOut);
    }

    #[test]
    fn interrupt_unblocks_waiter() {
        let latch = Arc::new(CountdownLatch::new(1));
        let interrupt = Interrupt::new();

        let latch2 = Arc::clone(&latch);
        let interrupt2 = interrupt.clone();
        let waiter = std::thread::spawn(move || latch2.wait(&interrupt2));

        std::thread::sleep(Duration::from_millis(10));
        interrupt.request();
        let err = waiter
            .join()
            .expect("thread panicked")
            .expect_err("waiter must observe interrupt");
        assert_eq!(err.kind(), ErrorKind::Interrupted);

        // The latch itself is unaffected by the interrupted waiter.
        assert_eq!(latch.count(), 1);
    }
}
