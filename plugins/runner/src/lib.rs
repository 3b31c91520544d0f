//! # Plumb Runner Plugins
//!
//! The `runner::Runner` plugin kind: its attribute type, the bundled `Foo`
//! plugin, the `FooDeriver` and a ready-made manager wiring them together.
//! Declarations live under `src/Plugin/Runner`.
use std::path::PathBuf;
use std::sync::Arc;

use plumb_core::cache::CacheBackend;
use plumb_core::discovery::{AttributeCatalog, AttributeType, DiscoveryEngine, DiscoveryOptions, NamespaceMap};
use plumb_core::plugin_system::{ClassRegistry, DefaultPluginManager, DeriverRegistry};
use plumb_core::Result;

pub mod deriver;
pub mod plugin;

pub use deriver::FooDeriver;
pub use plugin::{Foo, RunnerPluginBase};

/// Attribute type every runner plugin declares
pub const RUNNER_ATTRIBUTE: &str = "runner::Runner";

/// Plugin sub-directory below each namespace root
pub const RUNNER_SUBDIR: &str = "Plugin/Runner";

/// Base namespace of this crate's plugins
pub const RUNNER_NAMESPACE: &str = "app::runner";

/// Name definitions use to request the [`FooDeriver`]
pub const FOO_DERIVER: &str = "runner::FooDeriver";

/// Attribute type for runner plugins; runners default to weight 0
pub fn runner_attribute() -> AttributeType {
    AttributeType::new(RUNNER_ATTRIBUTE).default_value("weight", 0i64)
}

/// Root directory of this crate's own plugin namespace
pub fn source_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("src")
}

/// Namespace map holding only this crate's plugins
pub fn namespaces() -> NamespaceMap {
    NamespaceMap::new().with(RUNNER_NAMESPACE, source_dir())
}

/// Add the runner attribute type to a catalog
pub fn register_attributes(catalog: &mut AttributeCatalog) -> Result<()> {
    catalog.register(runner_attribute())?;
    Ok(())
}

/// Register the constructors of every bundled runner class
pub fn register_classes(classes: &mut ClassRegistry) -> Result<()> {
    classes.register(Foo::CLASS, Foo::create)?;
    classes.register(plugin::NUMBERED_CLASS, Foo::create)?;
    Ok(())
}

pub fn register_derivers(derivers: &mut DeriverRegistry) -> Result<()> {
    derivers.register(FOO_DERIVER, Arc::new(FooDeriver::default()))?;
    Ok(())
}

/// Build a manager for runner plugins found under `namespaces`.
///
/// `catalog` must already contain the runner attribute type; hosts pass
/// their own so other plugin kinds can share it.
pub fn runner_plugin_manager(
    namespaces: NamespaceMap,
    catalog: Arc<AttributeCatalog>,
    backend: Arc<dyn CacheBackend>,
) -> Result<DefaultPluginManager> {
    let engine = DiscoveryEngine::new(
        DiscoveryOptions::new(RUNNER_SUBDIR, RUNNER_ATTRIBUTE),
        catalog,
        backend,
    );

    let mut classes = ClassRegistry::new();
    register_classes(&mut classes)?;
    let mut derivers = DeriverRegistry::new();
    register_derivers(&mut derivers)?;

    Ok(DefaultPluginManager::new(engine, namespaces)
        .with_classes(classes)
        .with_derivers(derivers))
}
