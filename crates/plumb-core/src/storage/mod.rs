//! # Plumb Core Storage
//!
//! File-system access used by the on-disk cache backend and by configuration
//! and declaration parsing.
//!
//! - **[`provider`]**: the [`StorageProvider`] trait.
//! - **[`local`]**: [`LocalStorageProvider`], rooted at a base path, with
//!   atomic writes.
//! - **[`config`]**: [`ConfigFormat`] detection and parsing of JSON/TOML/YAML
//!   documents, plus the [`DiscoveryConfig`] consumed by the CLI.
//! - **[`error`]**: [`StorageSystemError`](error::StorageSystemError).
pub mod provider;
pub mod local;
pub mod config;
pub mod error;

/// Re-export key types
pub use provider::StorageProvider;
pub use local::LocalStorageProvider;
pub use config::{CacheBackendKind, CacheConfig, ConfigFormat, DiscoveryConfig, NamespaceConfig, AttributeTypeConfig};

// Test module declaration
#[cfg(test)]
mod tests;
