use std::fmt::Debug;
use std::path::Path;

use crate::kernel::error::Result;

/// Backing store for documents such as the on-disk scan cache.
///
/// Paths are relative to whatever root the provider was opened on.
pub trait StorageProvider: Send + Sync + Debug {
    fn name(&self) -> &str;

    fn is_file(&self, path: &Path) -> bool;

    /// Missing files are reported as `StorageSystemError::FileNotFound`
    fn read_to_string(&self, path: &Path) -> Result<String>;

    /// Replace the document at `path`; readers never observe a partial write
    fn write_string(&self, path: &Path, contents: &str) -> Result<()>;
}
