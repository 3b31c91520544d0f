use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use log::{debug, warn};

use crate::cache::backend::CacheBackend;
use crate::kernel::error::{Error, Result};
use crate::storage::error::StorageSystemError;
use crate::storage::local::LocalStorageProvider;
use crate::storage::provider::StorageProvider;

/// A mutation recorded since the last flush
#[derive(Debug, Clone)]
enum Change {
    Set(String, String),
    Delete(String),
    DeletePrefix(String),
    Clear,
}

impl Change {
    fn apply(&self, entries: &mut BTreeMap<String, String>) {
        match self {
            Change::Set(key, value) => {
                entries.insert(key.clone(), value.clone());
            }
            Change::Delete(key) => {
                entries.remove(key);
            }
            Change::DeletePrefix(prefix) => entries.retain(|key, _| !key.starts_with(prefix.as_str())),
            Change::Clear => entries.clear(),
        }
    }
}

#[derive(Debug, Default)]
struct State {
    entries: BTreeMap<String, String>,
    pending: Vec<Change>,
}

/// Cache backend persisted as a single JSON document.
///
/// Mutations are buffered in memory and written by [`flush`](CacheBackend::flush),
/// which the discovery engine calls once per pass. A flush re-reads the
/// document and replays only this handle's changes on top of it, so entries
/// written by other handles or processes (other buckets included) survive.
/// Two flushes racing on the same key resolve as last-writer-wins. Pending
/// changes are flushed on drop.
#[derive(Debug)]
pub struct FileCacheBackend {
    provider: Box<dyn StorageProvider>,
    path: PathBuf,
    file_name: PathBuf,
    state: RwLock<State>,
}

impl FileCacheBackend {
    /// Open (or lazily create) the cache document at `path`.
    ///
    /// An unreadable or corrupt document is discarded with a warning; it
    /// only holds derived data.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file_name = path
            .file_name()
            .map(PathBuf::from)
            .ok_or_else(|| StorageSystemError::OperationFailed {
                operation: "open_cache".to_string(),
                path: Some(path.to_path_buf()),
                message: "cache path has no file name".to_string(),
            })?;
        let base = path.parent().map(Path::to_path_buf).unwrap_or_default();

        let backend = Self {
            provider: Box::new(LocalStorageProvider::new(base)),
            path: path.to_path_buf(),
            file_name,
            state: RwLock::new(State::default()),
        };
        let entries = backend.load()?;
        debug!("Loaded {} cache entries from {}", entries.len(), path.display());
        backend.lock_write("open")?.entries = entries;
        Ok(backend)
    }

    /// Location of the cache document
    pub fn path(&self) -> PathBuf {
        self.path.clone()
    }

    /// Number of changes not yet written to disk
    pub fn pending(&self) -> usize {
        self.state.read().map(|state| state.pending.len()).unwrap_or(0)
    }

    fn load(&self) -> Result<BTreeMap<String, String>> {
        if !self.provider.is_file(&self.file_name) {
            return Ok(BTreeMap::new());
        }
        let content = self.provider.read_to_string(&self.file_name)?;
        match serde_json::from_str::<BTreeMap<String, String>>(&content) {
            Ok(entries) => Ok(entries),
            Err(e) => {
                warn!("Discarding corrupt cache file {}: {}", self.path.display(), e);
                Ok(BTreeMap::new())
            }
        }
    }

    fn lock_write(&self, operation: &str) -> Result<std::sync::RwLockWriteGuard<'_, State>> {
        self.state
            .write()
            .map_err(|_| Error::Other(format!("file cache lock poisoned during {}", operation)))
    }

    fn record(&self, operation: &str, change: Change) -> Result<()> {
        let mut state = self.lock_write(operation)?;
        change.apply(&mut state.entries);
        state.pending.push(change);
        Ok(())
    }
}

impl CacheBackend for FileCacheBackend {
    fn name(&self) -> &str {
        "file"
    }

    fn get(&self, key: &str) -> Result<Option<String>> {
        let state = self
            .state
            .read()
            .map_err(|_| Error::Other("file cache lock poisoned during get".to_string()))?;
        Ok(state.entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: String) -> Result<()> {
        self.record("set", Change::Set(key.to_string(), value))
    }

    fn delete(&self, key: &str) -> Result<()> {
        self.record("delete", Change::Delete(key.to_string()))
    }

    fn delete_prefix(&self, prefix: &str) -> Result<()> {
        self.record("delete_prefix", Change::DeletePrefix(prefix.to_string()))
    }

    fn clear(&self) -> Result<()> {
        self.record("clear", Change::Clear)
    }

    fn flush(&self) -> Result<()> {
        let mut state = self.lock_write("flush")?;
        if state.pending.is_empty() {
            return Ok(());
        }

        let mut merged = self.load()?;
        for change in &state.pending {
            change.apply(&mut merged);
        }
        let content = serde_json::to_string_pretty(&merged)
            .map_err(|e| StorageSystemError::serialization("JSON", e))?;
        self.provider.write_string(&self.file_name, &content)?;

        debug!(
            "Flushed {} cache changes to {} via '{}' storage ({} entries)",
            state.pending.len(),
            self.path.display(),
            self.provider.name(),
            merged.len()
        );
        state.entries = merged;
        state.pending.clear();
        Ok(())
    }
}

impl Drop for FileCacheBackend {
    fn drop(&mut self) {
        if let Err(e) = self.flush() {
            warn!("Failed to flush cache file {}: {}", self.path.display(), e);
        }
    }
}
