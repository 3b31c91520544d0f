use std::path::PathBuf;

use crate::definition::Registry;

/// A file the engine gave up on, kept for observability
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedFile {
    pub path: PathBuf,
    /// Class reference, when it could be resolved
    pub class: Option<String>,
    pub reason: String,
}

/// Counters for one discovery pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanStats {
    /// Candidate files yielded by the walker
    pub files_seen: usize,
    /// `Found` cache hits
    pub cache_hits: usize,
    /// `Empty` cache hits (known non-plugins)
    pub cache_empty_hits: usize,
    /// Files handed to the annotation reader
    pub parsed: usize,
    /// Parsed files without a matching attribute
    pub not_plugins: usize,
    /// Files skipped because of an error
    pub skipped: usize,
    /// Definitions replaced by a later file declaring the same id
    pub collisions: usize,
}

/// Outcome of a discovery pass: the registry plus diagnostics.
///
/// The registry alone cannot tell "no plugins" from "plugins failed to
/// load"; `skipped` can.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DiscoveryReport {
    pub definitions: Registry,
    pub skipped: Vec<SkippedFile>,
    pub stats: ScanStats,
}
