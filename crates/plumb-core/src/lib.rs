pub mod cache;
pub mod definition;
pub mod discovery;
pub mod kernel;
pub mod plugin_system;
pub mod storage;

// Re-export key public types for the binary and plugin crates
pub use cache::{CacheBackend, FileCacheBackend, MemoryCacheBackend};
pub use definition::{PluginDefinition, Registry, TranslatableMarkup, Translator, Value};
pub use discovery::{AttributeCatalog, AttributeType, DiscoveryEngine, DiscoveryOptions, DiscoveryReport, NamespaceMap};
pub use kernel::error::{Error as KernelError, Result};
pub use plugin_system::{ClassRegistry, DefaultPluginManager, Deriver, Plugin, PluginBase, PluginContext, PluginManager};
pub use storage::{DiscoveryConfig, StorageProvider};
