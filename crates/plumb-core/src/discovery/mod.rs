//! # Plumb Discovery
//!
//! Finds plugin classes by walking namespace directories, reads the
//! attribute each declaration file carries and turns it into a canonical
//! [`PluginDefinition`](crate::definition::PluginDefinition).
//!
//! ## Key Submodules
//!
//! - **[`namespace`]**: the [`NamespaceMap`] of namespace prefixes to root
//!   directories and its plugin-subdirectory suffixing.
//! - **[`walker`]**: recursive, lazy enumeration of candidate files.
//! - **[`attribute`]**: the [`AttributeCatalog`] of attribute types, their
//!   inheritance and their defaults.
//! - **[`reader`]**: class resolution ([`ClassRef`]) and the
//!   [`AnnotationReader`] strategy, with the declaration-file reader.
//! - **[`normalizer`]**: defaults merge, deferred text and derived fields.
//! - **[`engine`]**: the [`DiscoveryEngine`] tying the above to the per-file
//!   cache.
//! - **[`report`]**: the registry plus skip diagnostics of one pass.
//! - **[`error`]**: [`DiscoveryError`].
pub mod attribute;
pub mod engine;
pub mod error;
pub mod namespace;
pub mod normalizer;
pub mod reader;
pub mod report;
pub mod walker;

use crate::kernel::constants::DEFAULT_VENDOR_PREFIX;
use crate::storage::config::ConfigFormat;

pub use attribute::{AttributeCatalog, AttributeType};
pub use engine::DiscoveryEngine;
pub use error::DiscoveryError;
pub use namespace::NamespaceMap;
pub use reader::{AnnotationReader, AttributeInstance, ClassAnnotations, ClassRef, DeclarationReader};
pub use report::{DiscoveryReport, ScanStats, SkippedFile};

/// What one engine looks for and where
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryOptions {
    /// Plugin subdirectory below every namespace root, e.g. `Plugin/Runner`
    pub subdir: String,
    /// Fully qualified attribute type a class must carry
    pub attribute: String,
    /// Top-level namespace segment preceding the provider
    pub vendor: String,
    /// File extensions treated as declaration files
    pub extensions: Vec<String>,
}

impl DiscoveryOptions {
    pub fn new(subdir: impl Into<String>, attribute: impl Into<String>) -> Self {
        Self {
            subdir: subdir.into(),
            attribute: attribute.into(),
            vendor: DEFAULT_VENDOR_PREFIX.to_string(),
            extensions: ConfigFormat::supported_extensions(),
        }
    }

    pub fn vendor(mut self, vendor: impl Into<String>) -> Self {
        self.vendor = vendor.into();
        self
    }

    pub fn extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extensions = extensions.into_iter().map(Into::into).collect();
        self
    }
}

#[cfg(test)]
mod tests;
