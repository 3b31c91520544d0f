use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::cache::backend::CacheBackend;
use crate::definition::{PluginDefinition, TranslatableMarkup, Value};
use crate::discovery::error::DiscoveryError;
use crate::kernel::constants::{FILE_CACHE_BUCKET_PREFIX, NAMESPACE_SEPARATOR};
use crate::kernel::error::{Error, Result};
use crate::storage::error::StorageSystemError;

/// Externally tagged copy of [`Value`] used for cached content.
///
/// The plain `Value` encoding is untagged, so a declared map such as
/// `{"$markup": "x"}` would decode as markup. The tag keeps every variant
/// distinct across a cache round trip.
#[derive(Debug, Serialize, Deserialize)]
enum StoredValue {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    List(Vec<StoredValue>),
    Map(BTreeMap<String, StoredValue>),
    Markup(TranslatableMarkup),
}

impl From<&Value> for StoredValue {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => StoredValue::Null,
            Value::Bool(b) => StoredValue::Bool(*b),
            Value::Integer(i) => StoredValue::Integer(*i),
            Value::Float(x) => StoredValue::Float(*x),
            Value::String(s) => StoredValue::String(s.clone()),
            Value::List(items) => StoredValue::List(items.iter().map(StoredValue::from).collect()),
            Value::Map(entries) => StoredValue::Map(
                entries
                    .iter()
                    .map(|(key, value)| (key.clone(), StoredValue::from(value)))
                    .collect(),
            ),
            Value::Markup(markup) => StoredValue::Markup(markup.clone()),
        }
    }
}

impl From<StoredValue> for Value {
    fn from(value: StoredValue) -> Self {
        match value {
            StoredValue::Null => Value::Null,
            StoredValue::Bool(b) => Value::Bool(b),
            StoredValue::Integer(i) => Value::Integer(i),
            StoredValue::Float(x) => Value::Float(x),
            StoredValue::String(s) => Value::String(s),
            StoredValue::List(items) => Value::List(items.into_iter().map(Value::from).collect()),
            StoredValue::Map(entries) => Value::Map(
                entries
                    .into_iter()
                    .map(|(key, value)| (key, Value::from(value)))
                    .collect(),
            ),
            StoredValue::Markup(markup) => Value::Markup(markup),
        }
    }
}

/// Cached outcome of scanning one source file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum CacheEntry {
    /// Scanned, no plugin attribute of the wanted type
    Empty,
    /// Scanned, holds the plugin `id` and its serialized definition
    Found { id: String, content: String },
}

impl CacheEntry {
    /// Serialize a definition into a `Found` entry
    pub fn found(id: impl Into<String>, definition: &PluginDefinition) -> Result<Self> {
        let stored: BTreeMap<&str, StoredValue> = definition
            .iter()
            .map(|(key, value)| (key.as_str(), StoredValue::from(value)))
            .collect();
        let content = serde_json::to_string(&stored)
            .map_err(|e| StorageSystemError::serialization("JSON", e))?;
        Ok(CacheEntry::Found {
            id: id.into(),
            content,
        })
    }

    /// Rehydrate the definition of a `Found` entry.
    ///
    /// Every call deserializes again, so callers never share a definition
    /// they might mutate.
    pub fn definition(&self) -> Result<Option<PluginDefinition>> {
        match self {
            CacheEntry::Empty => Ok(None),
            CacheEntry::Found { content, .. } => {
                let stored: BTreeMap<String, StoredValue> = serde_json::from_str(content)
                    .map_err(|e| StorageSystemError::deserialization("JSON", e))?;
                let mut definition = PluginDefinition::new();
                for (key, value) in stored {
                    definition.insert(key, Value::from(value));
                }
                Ok(Some(definition))
            }
        }
    }

    pub fn id(&self) -> Option<&str> {
        match self {
            CacheEntry::Empty => None,
            CacheEntry::Found { id, .. } => Some(id),
        }
    }
}

/// Per-file scan results for one attribute type.
///
/// Entries are keyed by absolute source path inside a bucket derived from
/// the attribute type, so passes for different plugin kinds never see each
/// other's entries. Entries stay valid until explicitly invalidated; file
/// changes are not detected.
#[derive(Debug, Clone)]
pub struct FileScanCache {
    backend: Arc<dyn CacheBackend>,
    bucket: String,
}

impl FileScanCache {
    pub fn new(backend: Arc<dyn CacheBackend>, attribute: &str) -> Self {
        Self {
            backend,
            bucket: Self::bucket_name(attribute),
        }
    }

    /// Bucket name for an attribute type, e.g. `attribute_discovery:runner_Runner`
    pub fn bucket_name(attribute: &str) -> String {
        format!(
            "{}:{}",
            FILE_CACHE_BUCKET_PREFIX,
            attribute.replace(NAMESPACE_SEPARATOR, "_")
        )
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    pub fn backend(&self) -> &Arc<dyn CacheBackend> {
        &self.backend
    }

    /// Backend key for a source path
    pub fn key(&self, path: &Path) -> String {
        format!("{}:{}", self.bucket, path.display())
    }

    /// Look up the entry for `path`.
    ///
    /// An entry that no longer decodes is reported as a miss so the file is
    /// scanned again.
    pub fn get(&self, path: &Path) -> std::result::Result<Option<CacheEntry>, DiscoveryError> {
        let key = self.key(path);
        let Some(raw) = self.backend.get(&key).map_err(|e| unavailable("get", e))? else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(entry) => Ok(Some(entry)),
            Err(e) => {
                warn!("Ignoring undecodable cache entry '{}': {}", key, e);
                Ok(None)
            }
        }
    }

    /// Store the entry for `path`, replacing any previous one
    pub fn put(&self, path: &Path, entry: &CacheEntry) -> std::result::Result<(), DiscoveryError> {
        let raw = serde_json::to_string(entry).map_err(|e| DiscoveryError::CacheBackendUnavailable {
            operation: "encode".to_string(),
            message: e.to_string(),
        })?;
        self.backend
            .set(&self.key(path), raw)
            .map_err(|e| unavailable("set", e))
    }

    /// Drop the entry for a single path
    pub fn invalidate(&self, path: &Path) -> std::result::Result<(), DiscoveryError> {
        self.backend
            .delete(&self.key(path))
            .map_err(|e| unavailable("delete", e))?;
        self.flush()
    }

    /// Drop every entry of this bucket
    pub fn clear(&self) -> std::result::Result<(), DiscoveryError> {
        self.backend
            .delete_prefix(&format!("{}:", self.bucket))
            .map_err(|e| unavailable("clear", e))?;
        self.flush()
    }

    /// Write buffered entries through to the backend's store
    pub fn flush(&self) -> std::result::Result<(), DiscoveryError> {
        self.backend.flush().map_err(|e| unavailable("flush", e))
    }
}

fn unavailable(operation: &str, error: Error) -> DiscoveryError {
    DiscoveryError::CacheBackendUnavailable {
        operation: operation.to_string(),
        message: error.to_string(),
    }
}
