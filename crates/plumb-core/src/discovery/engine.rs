use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use log::{debug, info, warn};

use crate::cache::backend::CacheBackend;
use crate::cache::scan::{CacheEntry, FileScanCache};
use crate::definition::{PluginDefinition, Registry};
use crate::discovery::attribute::AttributeCatalog;
use crate::discovery::error::DiscoveryError;
use crate::discovery::namespace::NamespaceMap;
use crate::discovery::normalizer::MetadataNormalizer;
use crate::discovery::reader::{AnnotationReader, ClassRef, DeclarationReader};
use crate::discovery::report::{DiscoveryReport, SkippedFile};
use crate::discovery::walker::{DirectoryWalker, WalkEntry};
use crate::discovery::DiscoveryOptions;

/// Result of processing one walked file
enum FileOutcome {
    Definition(String, PluginDefinition),
    NotPlugin,
}

/// Finds plugin declarations below a namespace map and builds the registry.
///
/// One engine serves one plugin kind (its configured attribute type). A pass
/// runs synchronously to completion; [`discover_blocking`](Self::discover_blocking)
/// moves it to tokio's blocking pool and [`discover_within`](Self::discover_within)
/// additionally bounds it with a deadline.
#[derive(Debug)]
pub struct DiscoveryEngine {
    options: DiscoveryOptions,
    catalog: Arc<AttributeCatalog>,
    cache: FileScanCache,
    reader: Arc<dyn AnnotationReader>,
    normalizer: MetadataNormalizer,
    walker: DirectoryWalker,
}

impl DiscoveryEngine {
    /// Create an engine reading declaration files, caching in `backend`
    pub fn new(
        options: DiscoveryOptions,
        catalog: Arc<AttributeCatalog>,
        backend: Arc<dyn CacheBackend>,
    ) -> Self {
        let cache = FileScanCache::new(backend, &options.attribute);
        let reader = Arc::new(DeclarationReader::new(catalog.clone(), options.attribute.clone()));
        let normalizer = MetadataNormalizer::new(options.vendor.clone());
        let walker = DirectoryWalker::new(&options.extensions);
        Self {
            options,
            catalog,
            cache,
            reader,
            normalizer,
            walker,
        }
    }

    /// Replace the annotation reader strategy
    pub fn with_reader(mut self, reader: Arc<dyn AnnotationReader>) -> Self {
        self.reader = reader;
        self
    }

    pub fn options(&self) -> &DiscoveryOptions {
        &self.options
    }

    pub fn catalog(&self) -> &AttributeCatalog {
        &self.catalog
    }

    /// The per-file cache bucket used by this engine
    pub fn cache(&self) -> &FileScanCache {
        &self.cache
    }

    /// Run a pass and return only the registry
    pub fn discover(&self, namespaces: &NamespaceMap) -> Result<Registry, DiscoveryError> {
        self.discover_with_report(namespaces).map(|report| report.definitions)
    }

    /// Run a pass over the base namespace map.
    ///
    /// Files are processed in walk order and a later file declaring an
    /// existing id replaces the earlier definition. Files that fail to
    /// resolve or normalize are skipped and listed in the report; only a
    /// cache backend failure aborts the pass.
    ///
    /// The configured attribute must be a registered plugin attribute.
    /// Otherwise every file would be cached as "not a plugin", so the pass
    /// fails before touching the cache.
    pub fn discover_with_report(&self, namespaces: &NamespaceMap) -> Result<DiscoveryReport, DiscoveryError> {
        if !self.catalog.is_plugin_attribute(&self.options.attribute) {
            return Err(DiscoveryError::Catalog(format!(
                "'{}' is not a registered plugin attribute type",
                self.options.attribute
            )));
        }

        let plugin_namespaces = namespaces.with_suffix(&self.options.subdir);
        let mut report = DiscoveryReport::default();

        for entry in self.walker.walk(&plugin_namespaces) {
            report.stats.files_seen += 1;
            match self.process(&entry, &mut report) {
                Ok(FileOutcome::Definition(id, definition)) => {
                    if report.definitions.insert(id.clone(), definition).is_some() {
                        report.stats.collisions += 1;
                        debug!("Plugin id '{}' redefined by {}", id, entry.path.display());
                    }
                }
                Ok(FileOutcome::NotPlugin) => {}
                Err(e) if e.is_recoverable() => {
                    warn!("Skipping {}: {}", entry.path.display(), e);
                    report.stats.skipped += 1;
                    let class = match &e {
                        DiscoveryError::ClassResolution { class, .. } => Some(class.clone()),
                        _ => ClassRef::resolve(&entry.namespace, &entry.sub_path, &entry.path)
                            .ok()
                            .map(|class| class.path()),
                    };
                    report.skipped.push(SkippedFile {
                        path: entry.path.clone(),
                        class,
                        reason: e.to_string(),
                    });
                }
                Err(e) => return Err(e),
            }
        }
        self.cache.flush()?;

        info!(
            "Discovered {} '{}' plugins ({} files, {} cached, {} parsed, {} skipped)",
            report.definitions.len(),
            self.options.attribute,
            report.stats.files_seen,
            report.stats.cache_hits + report.stats.cache_empty_hits,
            report.stats.parsed,
            report.stats.skipped
        );
        Ok(report)
    }

    fn process(&self, entry: &WalkEntry, report: &mut DiscoveryReport) -> Result<FileOutcome, DiscoveryError> {
        if let Some(cached) = self.cache.get(&entry.path)? {
            match cached.definition() {
                Ok(Some(definition)) => {
                    report.stats.cache_hits += 1;
                    let id = cached.id().unwrap_or_default().to_string();
                    return Ok(FileOutcome::Definition(id, definition));
                }
                Ok(None) => {
                    report.stats.cache_empty_hits += 1;
                    return Ok(FileOutcome::NotPlugin);
                }
                Err(e) => {
                    warn!("Rescanning {}: cached definition unreadable: {}", entry.path.display(), e);
                }
            }
        }

        let class = ClassRef::resolve(&entry.namespace, &entry.sub_path, &entry.path)?;
        report.stats.parsed += 1;
        let annotations = self.reader.read(&class, &entry.path)?;

        let Some(attribute) = annotations.attribute else {
            report.stats.not_plugins += 1;
            self.cache.put(&entry.path, &CacheEntry::Empty)?;
            return Ok(FileOutcome::NotPlugin);
        };

        let definition = self.normalizer.normalize(
            &self.catalog,
            &attribute,
            annotations.translatable.as_ref(),
            &class,
            &entry.path,
        )?;
        let id = definition.id().unwrap_or_default().to_string();

        let cached = CacheEntry::found(id.clone(), &definition).map_err(|e| cache_encode_error(&entry.path, e))?;
        self.cache.put(&entry.path, &cached)?;
        debug!("Cached plugin '{}' from {}", id, entry.path.display());

        Ok(FileOutcome::Definition(id, definition))
    }

    /// Run a pass on tokio's blocking pool so the walk and file parsing
    /// never occupy an async worker thread.
    pub async fn discover_blocking(self: &Arc<Self>, namespaces: NamespaceMap) -> Result<DiscoveryReport, DiscoveryError> {
        let engine = Arc::clone(self);
        tokio::task::spawn_blocking(move || engine.discover_with_report(&namespaces))
            .await
            .map_err(|join_error| DiscoveryError::TaskFailed(join_error.to_string()))?
    }

    /// Run a pass on the blocking pool, failing once `deadline` elapses.
    ///
    /// The pass itself is not interrupted: a timed-out walk keeps running in
    /// the background and still fills the cache.
    pub async fn discover_within(
        self: &Arc<Self>,
        namespaces: NamespaceMap,
        deadline: Duration,
    ) -> Result<DiscoveryReport, DiscoveryError> {
        tokio::time::timeout(deadline, self.discover_blocking(namespaces))
            .await
            .map_err(|_| DiscoveryError::DeadlineExceeded(deadline))?
    }
}

fn cache_encode_error(path: &Path, error: crate::kernel::error::Error) -> DiscoveryError {
    DiscoveryError::CacheBackendUnavailable {
        operation: format!("encode {}", path.display()),
        message: error.to_string(),
    }
}
