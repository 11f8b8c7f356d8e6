use crate::error::TaskFailure;
use crate::executor::BoundedExecutor;
use std::collections::HashMap;
use std::fmt::Display;
use std::future::Future;
use std::hash::Hash;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::watch;

/// Settled result of a queued task
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOutcome<T> {
    Fulfilled(T),
    Rejected(TaskFailure),
}

impl<T> TaskOutcome<T> {
    #[must_use]
    pub fn is_fulfilled(&self) -> bool {
        matches!(self, Self::Fulfilled(_))
    }

    #[must_use]
    pub fn into_result(self) -> Result<T, TaskFailure> {
        match self {
            Self::Fulfilled(value) => Ok(value),
            Self::Rejected(failure) => Err(failure),
        }
    }
}

impl<T> From<Result<T, TaskFailure>> for TaskOutcome<T> {
    fn from(result: Result<T, TaskFailure>) -> Self {
        match result {
            Ok(value) => Self::Fulfilled(value),
            Err(failure) => Self::Rejected(failure),
        }
    }
}

/// Keyed fire-and-forget submission over a [`BoundedExecutor`].
///
/// Tasks are spawned on the current tokio runtime as they are pushed. A failed task
/// never cancels its siblings; its failure is recorded under its key.
pub struct TaskQueue<K, T> {
    executor: BoundedExecutor,
    outcomes: Arc<Mutex<HashMap<K, TaskOutcome<T>>>>,
    pending: Arc<watch::Sender<usize>>,
}

struct PendingGuard(Arc<watch::Sender<usize>>);

impl Drop for PendingGuard {
    fn drop(&mut self) {
        self.0.send_modify(|pending| *pending = pending.saturating_sub(1));
    }
}

impl<K, T> TaskQueue<K, T>
where
    K: Eq + Hash + Send + 'static,
    T: Send + 'static,
{
    #[must_use]
    pub fn new(executor: BoundedExecutor) -> Self {
        let (pending, _) = watch::channel(0usize);
        Self {
            executor,
            outcomes: Arc::new(Mutex::new(HashMap::new())),
            pending: Arc::new(pending),
        }
    }

    #[must_use]
    pub fn executor(&self) -> &BoundedExecutor {
        &self.executor
    }

    /// Tasks pushed but not yet settled
    #[must_use]
    pub fn pending(&self) -> usize {
        *self.pending.borrow()
    }

    /// Submit `task` under `id`. Must be called from within a tokio runtime.
    pub fn push<F, Fut, E>(&self, id: K, task: F)
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
        E: Display + Send + 'static,
    {
        self.pending.send_modify(|pending| *pending += 1);
        let guard = PendingGuard(Arc::clone(&self.pending));
        let executor = self.executor.clone();
        let outcomes = Arc::clone(&self.outcomes);

        tokio::spawn(async move {
            let outcome = TaskOutcome::from(executor.run(task).await);
            outcomes
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .insert(id, outcome);
            drop(guard);
        });
    }

    /// Wait for every pushed task to settle and drain the accumulated outcomes
    pub async fn wait_until_all_done(&self) -> HashMap<K, TaskOutcome<T>> {
        let mut pending = self.pending.subscribe();
        if pending.wait_for(|count| *count == 0).await.is_err() {
            log::warn!("Task queue closed while waiting for pending tasks");
        }
        std::mem::take(&mut *self.outcomes.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::RetryPolicy;
    use std::time::Duration;

    #[tokio::test(start_paused = true)]
    async fn test_failures_do_not_abort_siblings() {
        let executor =
            BoundedExecutor::new(2, RetryPolicy::fixed(2, Duration::from_secs(1))).unwrap();
        let queue: TaskQueue<&'static str, u32> = TaskQueue::new(executor);

        queue.push("ok", || async { Ok::<_, String>(1) });
        queue.push("bad", || async { Err::<u32, _>("down".to_string()) });
        queue.push("slow", || async {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok::<_, String>(3)
        });

        let outcomes = queue.wait_until_all_done().await;
        assert_eq!(outcomes.len(), 3);
        assert_eq!(outcomes["ok"], TaskOutcome::Fulfilled(1));
        assert_eq!(outcomes["slow"], TaskOutcome::Fulfilled(3));
        match &outcomes["bad"] {
            TaskOutcome::Rejected(failure) => {
                assert_eq!(failure.attempts, 2);
                assert_eq!(failure.message, "down");
            }
            other => panic!("expected rejection, got {other:?}"),
        }
        assert_eq!(queue.pending(), 0);
    }

    #[tokio::test]
    async fn test_wait_on_empty_queue_returns_immediately() {
        let executor = BoundedExecutor::new(1, RetryPolicy::none()).unwrap();
        let queue: TaskQueue<u32, ()> = TaskQueue::new(executor);
        assert!(queue.wait_until_all_done().await.is_empty());
    }
}
