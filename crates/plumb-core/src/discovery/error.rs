//! # Plumb Discovery Errors
//!
//! [`DiscoveryError`] covers every failure a discovery pass can observe.
//! Class resolution and malformed definitions are recovered per file; every
//! other variant aborts the pass.
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum DiscoveryError {
    #[error("Class '{class}' could not be resolved from '{path}': {message}")]
    ClassResolution {
        class: String,
        path: PathBuf,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Malformed definition in '{path}': {message}")]
    MalformedDefinition {
        path: PathBuf,
        message: String,
    },

    #[error("Cache backend unavailable during '{operation}': {message}")]
    CacheBackendUnavailable {
        operation: String,
        message: String,
    },

    #[error("Attribute catalog error: {0}")]
    Catalog(String),

    #[error("Discovery pass exceeded its deadline of {0:?}")]
    DeadlineExceeded(Duration),

    #[error("Discovery task failed: {0}")]
    TaskFailed(String),
}

impl DiscoveryError {
    pub fn malformed(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        DiscoveryError::MalformedDefinition {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Whether the engine skips the file and keeps scanning
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            DiscoveryError::ClassResolution { .. } | DiscoveryError::MalformedDefinition { .. }
        )
    }
}
