//! # Plumb Core Kernel Errors
//!
//! Defines the crate-wide error type.
//!
//! [`Error`] wraps the typed error of each subsystem (discovery, storage,
//! plugin manager) so callers can use a single `Result` alias while still
//! matching on the precise failure.
use std::path::PathBuf;
use std::result::Result as StdResult;

use thiserror::Error as ThisError;

use crate::discovery::error::DiscoveryError;
use crate::plugin_system::error::PluginSystemError;
use crate::storage::error::StorageSystemError;

/// Custom error type for Plumb
#[derive(Debug, ThisError)]
pub enum Error {
    /// Typed discovery error (class resolution, malformed definitions, cache backend)
    #[error("Discovery error: {0}")]
    Discovery(#[from] DiscoveryError),

    /// Typed plugin manager error
    #[error("Plugin system error: {0}")]
    PluginSystem(#[from] PluginSystemError),

    /// Typed storage and configuration error
    #[error("Storage system error: {0}")]
    StorageSystem(#[from] StorageSystemError),

    /// Generic error with message
    #[error("Error: {0}")]
    Other(String),
}

/// Shorthand for Result with our Error type
pub type Result<T> = StdResult<T, Error>;

impl From<&str> for Error {
    fn from(msg: &str) -> Self {
        Error::Other(msg.to_string())
    }
}

impl From<String> for Error {
    fn from(msg: String) -> Self {
        Error::Other(msg)
    }
}

impl Error {
    /// Create an I/O error with operation and path context
    pub fn io(source: std::io::Error, operation: impl Into<String>, path: PathBuf) -> Self {
        Error::StorageSystem(StorageSystemError::io(source, operation, path))
    }
}
