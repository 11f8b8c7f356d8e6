use anyhow::{anyhow, Context, Result};
use regsum_outline::{NormalizerConfig, ParserConfig};
use regsum_scheduler::{BoundedExecutor, RetryPolicy, MAX_CONCURRENCY};
use regsum_summarize::{OpenAiConfig, OrchestratorConfig};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const ENV_API_KEY: &str = "OPENAI_API_KEY";
pub const ENV_API_ORG: &str = "OPENAI_API_ORG";
pub const ENV_MODEL: &str = "REGSUM_MODEL";
pub const ENV_CONCURRENCY: &str = "REGSUM_CONCURRENCY";

const DEFAULT_CONCURRENCY: usize = 5;

/// Everything the binary can be configured with.
///
/// Precedence, lowest first: defaults, `--config` TOML file, environment, flags.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub concurrency: usize,
    pub cache_path: PathBuf,
    pub parser: ParserConfig,
    pub normalizer: NormalizerConfig,
    pub retry: RetryPolicy,
    pub orchestrator: OrchestratorConfig,
    pub openai: OpenAiConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            cache_path: PathBuf::from("summaryCache.json"),
            parser: ParserConfig::default(),
            normalizer: NormalizerConfig::default(),
            retry: RetryPolicy::default(),
            orchestrator: OrchestratorConfig::default(),
            openai: OpenAiConfig::default(),
        }
    }
}

impl Settings {
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Cannot read config {}", path.display()))?;
        let mut settings: Self = toml::from_str(&raw)
            .with_context(|| format!("Invalid config {}", path.display()))?;
        let limit = settings.concurrency.clamp(1, MAX_CONCURRENCY);
        if limit != settings.concurrency {
            log::warn!(
                "concurrency = {} in {} clamped to {limit}",
                settings.concurrency,
                path.display()
            );
            settings.concurrency = limit;
        }
        log::debug!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Overlay environment variables read through `lookup`
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(key) = lookup(ENV_API_KEY).filter(|v| !v.trim().is_empty()) {
            self.openai.api_key = Some(key);
        }
        if let Some(org) = lookup(ENV_API_ORG).filter(|v| !v.trim().is_empty()) {
            self.openai.organization = Some(org);
        }
        if let Some(model) = lookup(ENV_MODEL).filter(|v| !v.trim().is_empty()) {
            self.openai.model = model;
        }
        if let Some(raw) = lookup(ENV_CONCURRENCY) {
            match BoundedExecutor::parse_concurrency(&raw) {
                Some(limit) => self.concurrency = limit,
                None => log::warn!("Ignoring {ENV_CONCURRENCY}={raw:?}: not a number"),
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.concurrency == 0 {
            return Err(anyhow!("concurrency must be > 0"));
        }
        self.parser
            .validate()
            .map_err(|err| anyhow!("parser: {err}"))?;
        self.normalizer
            .validate()
            .map_err(|err| anyhow!("normalizer: {err}"))?;
        self.retry.validate().map_err(|err| anyhow!("retry: {err}"))?;
        self.orchestrator
            .validate()
            .map_err(|err| anyhow!("orchestrator: {err}"))?;
        self.openai
            .validate()
            .map_err(|err| anyhow!("openai: {err}"))?;
        Ok(())
    }
}
