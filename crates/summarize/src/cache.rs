use crate::error::{Result, SummarizeError};
use async_trait::async_trait;
use regsum_outline::Summary;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

/// Summary cache keyed by the exact payload sent to the service
#[async_trait]
pub trait SummaryCache: Send + Sync {
    async fn get(&self, key: &str) -> Option<Summary>;

    async fn set(&self, key: &str, value: &Summary) -> Result<()>;

    /// Number of cached entries
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Process-local cache, for tests and dry runs
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, Summary>>,
}

impl MemoryCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SummaryCache for MemoryCache {
    async fn get(&self, key: &str) -> Option<Summary> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    async fn set(&self, key: &str, value: &Summary) -> Result<()> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.clone());
        Ok(())
    }

    fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

/// Cache persisted as one JSON object mapping payload to summary.
///
/// The whole file is loaded on open and rewritten on every insert through a
/// temporary file and a rename, so readers never observe a half-written cache.
#[derive(Debug)]
pub struct JsonFileCache {
    path: PathBuf,
    entries: tokio::sync::Mutex<BTreeMap<String, Summary>>,
    // Mirrors `entries.len()` for the synchronous `len`.
    size: AtomicUsize,
}

impl JsonFileCache {
    /// Open the cache at `path`. A missing file starts empty; so does an unreadable
    /// one, with a warning.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let entries = match tokio::fs::read(&path).await {
            Ok(bytes) => match serde_json::from_slice::<BTreeMap<String, Summary>>(&bytes) {
                Ok(entries) => entries,
                Err(err) => {
                    log::warn!("Summary cache corrupted {}: {err}", path.display());
                    BTreeMap::new()
                }
            },
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(err) => return Err(err.into()),
        };
        log::debug!("Loaded {} cached summaries from {}", entries.len(), path.display());

        Ok(Self {
            path,
            size: AtomicUsize::new(entries.len()),
            entries: tokio::sync::Mutex::new(entries),
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn persist(&self, entries: &BTreeMap<String, Summary>) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let bytes = serde_json::to_vec_pretty(entries)?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, &bytes).await?;
        if let Err(err) = tokio::fs::rename(&tmp, &self.path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(SummarizeError::Cache(format!(
                "cannot replace {}: {err}",
                self.path.display()
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl SummaryCache for JsonFileCache {
    async fn get(&self, key: &str) -> Option<Summary> {
        self.entries.lock().await.get(key).cloned()
    }

    async fn set(&self, key: &str, value: &Summary) -> Result<()> {
        let mut entries = self.entries.lock().await;
        entries.insert(key.to_string(), value.clone());
        self.size.store(entries.len(), Ordering::Relaxed);
        self.persist(&entries).await
    }

    fn len(&self) -> usize {
        self.size.load(Ordering::Relaxed)
    }
}
