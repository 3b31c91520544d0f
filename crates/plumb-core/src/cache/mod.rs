//! # Plumb Discovery Caches
//!
//! Persistence for per-file scan results.
//!
//! - **[`backend`]**: the injected [`CacheBackend`] key-value capability and
//!   the in-process [`MemoryCacheBackend`].
//! - **[`file`]**: [`FileCacheBackend`], a JSON document on disk written
//!   through a [`StorageProvider`](crate::storage::StorageProvider).
//! - **[`scan`]**: [`FileScanCache`], the per-attribute-type bucket keyed by
//!   absolute source path, and its [`CacheEntry`] values.
pub mod backend;
pub mod file;
pub mod scan;

pub use backend::{CacheBackend, MemoryCacheBackend};
pub use file::FileCacheBackend;
pub use scan::{CacheEntry, FileScanCache};
