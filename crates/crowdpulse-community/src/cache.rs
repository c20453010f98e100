//! Session cache: at most one computed [`ResultSet`] per
//! `(source, trigger_time)` key.
//!
//! Entries are write-once. A second `put` for a populated key keeps the
//! first value and returns it, so concurrent writers converge.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;
use crowdpulse_core::SourceType;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::CommunityError;
use crate::types::ResultSet;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CacheKey {
    pub source: SourceType,
    /// Caller-chosen token (typically a timestamp) scoping the cache entry.
    pub trigger_time: String,
}

impl CacheKey {
    #[must_use]
    pub fn new(source: SourceType, trigger_time: impl Into<String>) -> Self {
        Self {
            source,
            trigger_time: trigger_time.into(),
        }
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@{}", self.source, self.trigger_time)
    }
}

#[async_trait]
pub trait SessionCache: Send + Sync {
    async fn get(&self, key: &CacheKey) -> Option<Arc<ResultSet>>;

    /// Store `value` unless `key` is already populated. Returns whichever
    /// value the cache holds afterwards.
    ///
    /// # Errors
    ///
    /// Returns [`CommunityError`] when a persistent backend cannot write.
    async fn put(&self, key: &CacheKey, value: ResultSet) -> Result<Arc<ResultSet>, CommunityError>;
}

/// Process-local cache. Entries live as long as the cache.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: RwLock<HashMap<CacheKey, Arc<ResultSet>>>,
}

impl MemoryCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn get_sync(&self, key: &CacheKey) -> Option<Arc<ResultSet>> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn insert_once(&self, key: &CacheKey, value: Arc<ResultSet>) -> Arc<ResultSet> {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(entries.entry(key.clone()).or_insert(value))
    }
}

#[async_trait]
impl SessionCache for MemoryCache {
    async fn get(&self, key: &CacheKey) -> Option<Arc<ResultSet>> {
        self.get_sync(key)
    }

    async fn put(&self, key: &CacheKey, value: ResultSet) -> Result<Arc<ResultSet>, CommunityError> {
        Ok(self.insert_once(key, Arc::new(value)))
    }
}

#[derive(Serialize, Deserialize)]
struct StoredEntry {
    key: CacheKey,
    result: ResultSet,
}

/// JSON files under `<root>/<source>/<sha256(trigger_time)>.json`, fronted
/// by a [`MemoryCache`] so repeat reads skip the disk.
///
/// Unreadable or corrupt files are treated as misses and logged.
#[derive(Debug)]
pub struct FileCache {
    root: PathBuf,
    memory: MemoryCache,
}

impl FileCache {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            memory: MemoryCache::new(),
        }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// File backing `key`.
    #[must_use]
    pub fn entry_path(&self, key: &CacheKey) -> PathBuf {
        let digest = Sha256::digest(key.trigger_time.as_bytes());
        let name: String = digest.iter().map(|b| format!("{b:02x}")).collect();
        self.root
            .join(key.source.as_str())
            .join(format!("{name}.json"))
    }

    async fn read_entry(&self, key: &CacheKey) -> Result<Option<ResultSet>, CommunityError> {
        let path = self.entry_path(key);
        let bytes = match tokio::fs::read(&path).await {
            Ok(b) => b,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(CommunityError::CacheIo {
                    path: path.display().to_string(),
                    source,
                })
            }
        };
        let stored: StoredEntry =
            serde_json::from_slice(&bytes).map_err(|source| CommunityError::CacheFormat {
                path: path.display().to_string(),
                source,
            })?;
        if stored.key != *key {
            return Err(CommunityError::CacheKeyMismatch {
                path: path.display().to_string(),
            });
        }
        Ok(Some(stored.result))
    }

    async fn write_entry(&self, key: &CacheKey, value: &ResultSet) -> Result<(), CommunityError> {
        let path = self.entry_path(key);
        let io_err = |source| CommunityError::CacheIo {
            path: path.display().to_string(),
            source,
        };
        if let Some(dir) = path.parent() {
            tokio::fs::create_dir_all(dir).await.map_err(io_err)?;
        }
        let stored = StoredEntry {
            key: key.clone(),
            result: value.clone(),
        };
        let json = serde_json::to_vec_pretty(&stored).map_err(|source| {
            CommunityError::CacheFormat {
                path: path.display().to_string(),
                source,
            }
        })?;
        // Write-then-rename so readers never see a partial file.
        let tmp = path.with_extension(format!("json.{}.tmp", uuid::Uuid::new_v4()));
        tokio::fs::write(&tmp, json).await.map_err(io_err)?;
        tokio::fs::rename(&tmp, &path).await.map_err(io_err)?;
        Ok(())
    }
}

#[async_trait]
impl SessionCache for FileCache {
    async fn get(&self, key: &CacheKey) -> Option<Arc<ResultSet>> {
        if let Some(hit) = self.memory.get_sync(key) {
            return Some(hit);
        }
        match self.read_entry(key).await {
            Ok(Some(result)) => Some(self.memory.insert_once(key, Arc::new(result))),
            Ok(None) => None,
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "ignoring unreadable cache entry");
                None
            }
        }
    }

    async fn put(&self, key: &CacheKey, value: ResultSet) -> Result<Arc<ResultSet>, CommunityError> {
        if let Some(existing) = self.get(key).await {
            return Ok(existing);
        }
        self.write_entry(key, &value).await?;
        Ok(self.memory.insert_once(key, Arc::new(value)))
    }
}
