//! # Regsum Summarize
//!
//! Bottom-up summarization of an [`OutlineNode`](regsum_outline::OutlineNode) tree.
//!
//! ## Architecture
//!
//! ```text
//! OutlineNode tree
//!        │
//!        ▼
//! ┌──────────────┐  hit   ┌──────────────┐
//! │ Orchestrator │ ─────> │ SummaryCache │  (memory or JSON file)
//! └──────┬───────┘        └──────────────┘
//!        │ miss
//!        ▼
//! ┌─────────────────┐     ┌──────────────────────┐
//! │ BoundedExecutor │ ──> │ SummarizationService │  (OpenAI chat completions)
//! └─────────────────┘     └──────────────────────┘
//! ```
//!
//! Small subtrees are summarized in one request. Subtrees whose text exceeds the
//! configured threshold are summarized child by child, then once more over the
//! children's summaries.

mod cache;
mod error;
mod openai;
mod orchestrator;
mod prompt;
mod service;

pub use cache::{JsonFileCache, MemoryCache, SummaryCache};
pub use error::{Result, SummarizeError};
pub use openai::{OpenAiConfig, OpenAiSummarizer};
pub use orchestrator::{Orchestrator, OrchestratorConfig, RunStats};
pub use prompt::{user_prompt, SYSTEM_PROMPT};
pub use service::{parse_summary, SummarizationService};
