use crate::error::{Result, SchedulerError, TaskFailure};
use crate::policy::RetryPolicy;
use serde::Serialize;
use std::fmt::Display;
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Semaphore;

/// Upper bound accepted by [`BoundedExecutor::parse_concurrency`]
pub const MAX_CONCURRENCY: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ExecutorSnapshot {
    pub limit: usize,
    pub in_flight: usize,
    pub waiting: usize,
    pub peak_in_flight: usize,
}

#[derive(Debug)]
struct Inner {
    limit: usize,
    policy: RetryPolicy,
    semaphore: Semaphore,
    in_flight: AtomicUsize,
    waiting: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

/// FIFO executor running at most `limit` tasks at once.
///
/// A task keeps its slot for the whole retry cycle, delays included, so `limit`
/// bounds the number of tasks between first attempt and final outcome. Waiters are
/// admitted in submission order.
#[derive(Debug, Clone)]
pub struct BoundedExecutor {
    inner: Arc<Inner>,
}

struct WaitingGuard<'a>(&'a Inner);

impl<'a> WaitingGuard<'a> {
    fn new(inner: &'a Inner) -> Self {
        inner.waiting.fetch_add(1, Ordering::Relaxed);
        Self(inner)
    }
}

impl Drop for WaitingGuard<'_> {
    fn drop(&mut self) {
        self.0.waiting.fetch_sub(1, Ordering::Relaxed);
    }
}

struct RunningGuard<'a>(&'a Inner);

impl<'a> RunningGuard<'a> {
    fn new(inner: &'a Inner) -> Self {
        let now = inner.in_flight.fetch_add(1, Ordering::AcqRel) + 1;
        inner.peak_in_flight.fetch_max(now, Ordering::AcqRel);
        Self(inner)
    }
}

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        self.0.in_flight.fetch_sub(1, Ordering::AcqRel);
    }
}

impl BoundedExecutor {
    pub fn new(limit: usize, policy: RetryPolicy) -> Result<Self> {
        if limit == 0 {
            return Err(SchedulerError::InvalidConfig(
                "concurrency limit must be > 0".to_string(),
            ));
        }
        policy.validate().map_err(SchedulerError::InvalidConfig)?;

        Ok(Self {
            inner: Arc::new(Inner {
                limit,
                policy,
                semaphore: Semaphore::new(limit),
                in_flight: AtomicUsize::new(0),
                waiting: AtomicUsize::new(0),
                peak_in_flight: AtomicUsize::new(0),
            }),
        })
    }

    /// Parse a user-supplied limit, clamping into `1..=MAX_CONCURRENCY`
    #[must_use]
    pub fn parse_concurrency(raw: &str) -> Option<usize> {
        let value = raw.trim().parse::<usize>().ok()?;
        Some(value.clamp(1, MAX_CONCURRENCY))
    }

    #[must_use]
    pub fn limit(&self) -> usize {
        self.inner.limit
    }

    #[must_use]
    pub fn policy(&self) -> RetryPolicy {
        self.inner.policy
    }

    #[must_use]
    pub fn snapshot(&self) -> ExecutorSnapshot {
        ExecutorSnapshot {
            limit: self.inner.limit,
            in_flight: self.inner.in_flight.load(Ordering::Relaxed),
            waiting: self.inner.waiting.load(Ordering::Relaxed),
            peak_in_flight: self.inner.peak_in_flight.load(Ordering::Relaxed),
        }
    }

    /// Run `task` once a slot frees up, retrying per the executor's policy.
    ///
    /// `task` is called once per attempt. The error of the last attempt is reported
    /// in the returned [`TaskFailure`].
    pub async fn run<F, Fut, T, E>(&self, mut task: F) -> std::result::Result<T, TaskFailure>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = std::result::Result<T, E>>,
        E: Display,
    {
        let inner = &*self.inner;

        let waiting = WaitingGuard::new(inner);
        // The semaphore is owned by the executor and never closed.
        let Ok(_permit) = inner.semaphore.acquire().await else {
            return Err(TaskFailure {
                attempts: 0,
                message: "executor closed".to_string(),
            });
        };
        drop(waiting);
        let _running = RunningGuard::new(inner);

        let policy = inner.policy;
        let mut attempt = 0u32;
        loop {
            attempt += 1;
            match task().await {
                Ok(value) => return Ok(value),
                Err(err) if attempt < policy.max_attempts => {
                    log::warn!(
                        "Attempt {attempt}/{} failed: {err}; retrying in {:?}",
                        policy.max_attempts,
                        policy.delay()
                    );
                    tokio::time::sleep(policy.delay()).await;
                }
                Err(err) => {
                    log::warn!("Task failed after {attempt} attempt(s): {err}");
                    return Err(TaskFailure {
                        attempts: attempt,
                        message: err.to_string(),
                    });
                }
            }
        }
    }
}
