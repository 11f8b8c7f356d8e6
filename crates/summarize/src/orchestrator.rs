use crate::cache::SummaryCache;
use crate::error::{Result, SummarizeError};
use crate::service::{parse_summary, SummarizationService};
use futures::future::{join_all, BoxFuture, FutureExt};
use regsum_outline::{OutlineNode, SummaryOutcome};
use regsum_scheduler::BoundedExecutor;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

const BREADCRUMB_SEPARATOR: &str = " > ";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrchestratorConfig {
    /// Subtrees whose total text is at most this many characters are summarized in
    /// a single request
    pub threshold: usize,

    /// Also summarize the descendants of subtrees small enough for a direct summary
    pub summarize_every_node: bool,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            threshold: 10_000,
            summarize_every_node: false,
        }
    }
}

impl OrchestratorConfig {
    /// Validate configuration
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.threshold == 0 {
            return Err("threshold must be > 0".to_string());
        }
        Ok(())
    }
}

/// Counters for one orchestrator
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RunStats {
    pub summarized: usize,
    pub cache_hits: usize,
    /// Service calls, retries included
    pub remote_calls: usize,
    pub failures: usize,
    pub skipped: usize,
}

#[derive(Debug, Default)]
struct Counters {
    summarized: AtomicUsize,
    cache_hits: AtomicUsize,
    remote_calls: AtomicUsize,
    failures: AtomicUsize,
    skipped: AtomicUsize,
}

/// Post-order summarization walk over an outline.
///
/// Each node's summary is written once, after every child it depends on has
/// settled. Cache hits return without taking an executor slot.
pub struct Orchestrator {
    service: Arc<dyn SummarizationService>,
    cache: Arc<dyn SummaryCache>,
    executor: BoundedExecutor,
    config: OrchestratorConfig,
    counters: Counters,
}

impl Orchestrator {
    pub fn new(
        service: Arc<dyn SummarizationService>,
        cache: Arc<dyn SummaryCache>,
        executor: BoundedExecutor,
        config: OrchestratorConfig,
    ) -> Result<Self> {
        config.validate().map_err(SummarizeError::invalid_config)?;
        Ok(Self {
            service,
            cache,
            executor,
            config,
            counters: Counters::default(),
        })
    }

    #[must_use]
    pub fn executor(&self) -> &BoundedExecutor {
        &self.executor
    }

    #[must_use]
    pub fn stats(&self) -> RunStats {
        let c = &self.counters;
        RunStats {
            summarized: c.summarized.load(Ordering::Relaxed),
            cache_hits: c.cache_hits.load(Ordering::Relaxed),
            remote_calls: c.remote_calls.load(Ordering::Relaxed),
            failures: c.failures.load(Ordering::Relaxed),
            skipped: c.skipped.load(Ordering::Relaxed),
        }
    }

    /// Summarize `root` and, where needed, its descendants
    pub async fn summarize_tree(&self, root: &mut OutlineNode) {
        log::info!(
            "Summarizing {} nodes (threshold {} chars, concurrency {})",
            root.count(),
            self.config.threshold,
            self.executor.limit()
        );
        self.visit(root, Vec::new()).await;

        let stats = self.stats();
        log::info!(
            "Summarization finished: {} summarized, {} cache hits, {} remote calls, {} failed",
            stats.summarized,
            stats.cache_hits,
            stats.remote_calls,
            stats.failures
        );
    }

    fn visit<'a>(
        &'a self,
        node: &'a mut OutlineNode,
        mut trail: Vec<String>,
    ) -> BoxFuture<'a, ()> {
        async move {
            if !node.title.is_empty() {
                trail.push(node.title.clone());
            }
            let position = trail.join(BREADCRUMB_SEPARATOR);
            let total = node.total_text();

            let payload = if total.chars().count() <= self.config.threshold {
                if self.config.summarize_every_node {
                    self.visit_children(node, &trail).await;
                }
                total
            } else {
                self.visit_children(node, &trail).await;
                aggregate_payload(node, &trail)
            };

            if payload.trim().is_empty() {
                log::debug!("Skipping {position:?}: no text");
                self.counters.skipped.fetch_add(1, Ordering::Relaxed);
                return;
            }
            node.summary = Some(self.summarize_payload(&position, &payload).await);
        }
        .boxed()
    }

    async fn visit_children(&self, node: &mut OutlineNode, trail: &[String]) {
        join_all(
            node.children
                .iter_mut()
                .map(|child| self.visit(child, trail.to_vec())),
        )
        .await;
    }

    async fn summarize_payload(&self, position: &str, payload: &str) -> SummaryOutcome {
        if let Some(hit) = self.cache.get(payload).await {
            log::debug!("Cache hit for {position:?}");
            self.counters.cache_hits.fetch_add(1, Ordering::Relaxed);
            return SummaryOutcome::Completed(hit);
        }

        let service = &self.service;
        let calls = &self.counters.remote_calls;
        let response = self
            .executor
            .run(move || {
                calls.fetch_add(1, Ordering::Relaxed);
                service.summarize(position, payload)
            })
            .await;

        let raw = match response {
            Ok(raw) => raw,
            Err(failure) => {
                log::warn!("Summary for {position:?} failed: {failure}");
                self.counters.failures.fetch_add(1, Ordering::Relaxed);
                return SummaryOutcome::failed(failure.to_string());
            }
        };

        match parse_summary(&raw) {
            Ok(summary) => {
                if let Err(err) = self.cache.set(payload, &summary).await {
                    log::warn!("Cannot cache summary for {position:?}: {err}");
                }
                self.counters.summarized.fetch_add(1, Ordering::Relaxed);
                SummaryOutcome::Completed(summary)
            }
            Err(err) => {
                log::warn!("Discarding response for {position:?}: {err}");
                self.counters.failures.fetch_add(1, Ordering::Relaxed);
                SummaryOutcome::failed(err.to_string())
            }
        }
    }
}

/// `node.text` followed by each completed child summary, headed by its breadcrumb.
/// Failed and missing child summaries are left out.
fn aggregate_payload(node: &OutlineNode, trail: &[String]) -> String {
    let mut payload = node.text.clone();
    payload.push_str("\n\n");
    for child in &node.children {
        let Some(summary) = child.summary.as_ref().and_then(SummaryOutcome::summary) else {
            continue;
        };
        let label = trail
            .iter()
            .map(String::as_str)
            .chain((!child.title.is_empty()).then_some(child.title.as_str()))
            .collect::<Vec<_>>()
            .join(BREADCRUMB_SEPARATOR);
        payload.push('\n');
        payload.push_str(&format!("[{label}]\n"));
        payload.push_str(&summary.to_plain_text());
    }
    payload
}
