use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;

use crate::kernel::error::{Error, Result};

/// Key-value persistence supplied by the host.
///
/// Implementations decide where entries live (process memory, disk, a shared
/// service). There is no locking across callers: two writers on the same key
/// resolve as last-writer-wins.
pub trait CacheBackend: Send + Sync + Debug {
    /// Get the name of this backend
    fn name(&self) -> &str;

    /// Fetch the value stored under `key`
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, overwriting any previous value
    fn set(&self, key: &str, value: String) -> Result<()>;

    /// Remove a single key
    fn delete(&self, key: &str) -> Result<()>;

    /// Remove every key starting with `prefix`
    fn delete_prefix(&self, prefix: &str) -> Result<()>;

    /// Remove everything
    fn clear(&self) -> Result<()>;

    /// Make buffered mutations durable. Backends writing through need not
    /// override this.
    fn flush(&self) -> Result<()> {
        Ok(())
    }
}

/// Cache backend holding entries in process memory
#[derive(Debug)]
pub struct MemoryCacheBackend {
    entries: RwLock<HashMap<String, String>>,
    available: AtomicBool,
}

impl MemoryCacheBackend {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            available: AtomicBool::new(true),
        }
    }

    /// Simulate an outage: while unavailable every operation fails
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Number of stored keys
    pub fn len(&self) -> usize {
        self.entries.read().map(|entries| entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn check_available(&self, operation: &str) -> Result<()> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(Error::Other(format!("memory cache backend is unavailable ({})", operation)))
        }
    }
}

impl Default for MemoryCacheBackend {
    fn default() -> Self {
        Self::new()
    }
}

fn poisoned(operation: &str) -> Error {
    Error::Other(format!("memory cache lock poisoned during {}", operation))
}

impl CacheBackend for MemoryCacheBackend {
    fn name(&self) -> &str {
        "memory"
    }

    fn get(&self, key: &str) -> Result<Option<String>> {
        self.check_available("get")?;
        let entries = self.entries.read().map_err(|_| poisoned("get"))?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: String) -> Result<()> {
        self.check_available("set")?;
        let mut entries = self.entries.write().map_err(|_| poisoned("set"))?;
        entries.insert(key.to_string(), value);
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<()> {
        self.check_available("delete")?;
        let mut entries = self.entries.write().map_err(|_| poisoned("delete"))?;
        entries.remove(key);
        Ok(())
    }

    fn delete_prefix(&self, prefix: &str) -> Result<()> {
        self.check_available("delete_prefix")?;
        let mut entries = self.entries.write().map_err(|_| poisoned("delete_prefix"))?;
        entries.retain(|key, _| !key.starts_with(prefix));
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        self.check_available("clear")?;
        let mut entries = self.entries.write().map_err(|_| poisoned("clear"))?;
        entries.clear();
        Ok(())
    }
}
