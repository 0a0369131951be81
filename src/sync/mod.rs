//! Blocking synchronization primitives.
//!
//! Each primitive is an independent leaf component: it owns its internal
//! state behind a `parking_lot` mutex plus a condition variable, and all
//! mutation goes through its own entry points. No primitive depends on any
//! other, and no ordering is implied across instances.
//!
//! # Primitives
//!
//! - [`Mutex`]: exclusive-access lock with owner tracking
//! - [`Semaphore`]: bounded permit pool, optionally FIFO-fair
//! - [`RwLock`]: shared-read / exclusive-write with writer priority
//! - [`CountdownLatch`]: one-shot "wait until N events" gate
//! - [`Barrier`]: reusable N-party rendezvous with an optional trip action
//! - [`AtomicCounter`]: lock-free increment/get counter
//!
//! # Blocking and interruption
//!
//! Every blocking operation takes an [`Interrupt`](crate::Interrupt) token
//! and returns promptly with an error when the token fires. Timed variants
//! (`*_for`) report expiry as a distinct `TimedOut` outcome.
//!
//! # Caller responsibilities
//!
//! Deadlock from acquiring multiple instances in inconsistent order is a
//! caller-composition hazard; the primitives do not detect or prevent it.

mod barrier;
mod counter;
mod latch;
mod mutex;
mod rwlock;
mod semaphore;

pub use barrier::{Barrier, BarrierWaitResult};
pub use counter::AtomicCounter;
pub use latch::CountdownLatch;
pub use mutex::{LockMetricsSnapshot, Mutex, MutexGuard};
pub use rwlock::{RwLock, RwReadGuard, RwWriteGuard};
pub use semaphore::{Semaphore, SemaphorePermit};
