//! # Regsum Scheduler
//!
//! A FIFO executor that runs at most `N` tasks at a time and retries failed tasks
//! with a fixed delay.
//!
//! ```text
//! submit ──> queued ──> running ──> succeeded
//!                          │
//!                          ├──> retrying (delay) ──> running ...
//!                          │
//!                          └──> failed (attempts exhausted)
//! ```
//!
//! [`BoundedExecutor::run`] hands back one future per submission and is what callers
//! that keep their own bookkeeping use. [`TaskQueue`] layers fire-and-forget
//! submission and a completion barrier on top of the same executor.

mod error;
mod executor;
mod policy;
mod queue;

pub use error::{Result, SchedulerError, TaskFailure};
pub use executor::{BoundedExecutor, ExecutorSnapshot, MAX_CONCURRENCY};
pub use policy::RetryPolicy;
pub use queue::{TaskOutcome, TaskQueue};
