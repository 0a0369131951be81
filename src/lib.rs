//! synckit: blocking synchronization primitives for preemptive threads.
//!
//! A small toolkit of independent coordination objects: a mutual-exclusion
//! lock, a counting semaphore, a reader/writer lock, a one-shot countdown
//! latch, a reusable cyclic barrier, and a lock-free atomic counter.
//!
//! # Design
//!
//! - Each primitive owns its state behind a mutex-guarded condition
//!   variable; callers hold a shared reference (typically an `Arc`) and all
//!   mutation flows through the primitive's own entry points.
//! - Blocking operations take an explicit [`Interrupt`] token and return
//!   [`ErrorKind::Interrupted`](error::ErrorKind::Interrupted) promptly
//!   when it fires, instead of hanging forever.
//! - Timed variants (`acquire_for`, `wait_for`, ...) report expiry as a
//!   distinct `TimedOut` outcome.
//! - Misuse (release by a non-holder, over-release past capacity, zero
//!   capacity or parties) is a synchronous, typed error; primitives never
//!   retry or self-heal.
//!
//! The toolkit provides no thread-lifecycle management: callers spawn
//! workers, hand them clones of the shared primitive, and join them before
//! reading final shared state. Deadlock from acquiring multiple instances
//! in inconsistent order is a caller-composition hazard the primitives do
//! not attempt to prevent.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use synckit::{AtomicCounter, Interrupt, Mutex};
//!
//! let lock = Arc::new(Mutex::new());
//! let counter = Arc::new(AtomicCounter::new());
//!
//! let handles: Vec<_> = (0..4)
//!     .map(|_| {
//!         let lock = Arc::clone(&lock);
//!         let counter = Arc::clone(&counter);
//!         std::thread::spawn(move || {
//!             let interrupt = Interrupt::new();
//!             lock.acquire(&interrupt).unwrap();
//!             counter.increment();
//!             lock.release().unwrap();
//!         })
//!     })
//!     .collect();
//!
//! for handle in handles {
//!     handle.join().unwrap();
//! }
//! assert_eq!(counter.get(), 4);
//! ```

pub mod config;
pub mod error;
pub mod interrupt;
pub mod sync;
pub mod test_logging;

pub use config::WaitConfig;
pub use error::{Error, ErrorKind, Result};
pub use interrupt::Interrupt;
pub use sync::{
    AtomicCounter, Barrier, BarrierWaitResult, CountdownLatch, LockMetricsSnapshot, Mutex,
    MutexGuard, RwLock, RwReadGuard, RwWriteGuard, Semaphore, SemaphorePermit,
};
