use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::thread::{self, ThreadId};
use std::time::Duration;

use tempfile::{tempdir, TempDir};

use crate::cache::backend::{CacheBackend, MemoryCacheBackend};
use crate::definition::{PluginDefinition, Value};
use crate::discovery::attribute::{AttributeCatalog, AttributeType};
use crate::discovery::engine::DiscoveryEngine;
use crate::discovery::error::DiscoveryError;
use crate::discovery::namespace::NamespaceMap;
use crate::discovery::reader::{AnnotationReader, ClassAnnotations, ClassRef, DeclarationReader};
use crate::discovery::DiscoveryOptions;
use crate::kernel::error::{Error, Result};
use crate::plugin_system::derivative::LabelVariantDeriver;
use crate::plugin_system::error::PluginSystemError;
use crate::plugin_system::manager::{DefaultPluginManager, PluginManager};
use crate::plugin_system::registry::ClassRegistry;
use crate::plugin_system::traits::{Plugin, PluginBase, PluginContext};

const ATTRIBUTE: &str = "runner::Runner";
const SUBDIR: &str = "Plugin/Runner";

#[derive(Debug)]
struct TestRunner {
    base: PluginBase,
}

impl Plugin for TestRunner {
    fn plugin_id(&self) -> &str {
        self.base.plugin_id()
    }

    fn definition(&self) -> &PluginDefinition {
        self.base.definition()
    }

    fn label(&self) -> String {
        self.base.label()
    }
}

/// Reader remembering which thread parsed each file
#[derive(Debug)]
struct ThreadRecordingReader {
    inner: DeclarationReader,
    threads: Arc<Mutex<Vec<ThreadId>>>,
}

impl AnnotationReader for ThreadRecordingReader {
    fn read(&self, class: &ClassRef, path: &Path) -> std::result::Result<ClassAnnotations, DiscoveryError> {
        if let Ok(mut threads) = self.threads.lock() {
            threads.push(thread::current().id());
        }
        self.inner.read(class, path)
    }
}

fn write_plugin(src: &Path, name: &str, content: &str) {
    let dir = src.join(SUBDIR);
    fs::create_dir_all(&dir).expect("Failed to create plugin directory");
    fs::write(dir.join(name), content).expect("Failed to write declaration");
}

fn bare_manager(src: &Path) -> DefaultPluginManager {
    let mut catalog = AttributeCatalog::new();
    catalog
        .register(AttributeType::new(ATTRIBUTE).default_value("weight", 0i64))
        .expect("register runner");
    let engine = DiscoveryEngine::new(
        DiscoveryOptions::new(SUBDIR, ATTRIBUTE),
        Arc::new(catalog),
        Arc::new(MemoryCacheBackend::new()) as Arc<dyn CacheBackend>,
    );
    DefaultPluginManager::new(engine, NamespaceMap::new().with("app::runner", src))
}

fn setup() -> (TempDir, PathBuf, DefaultPluginManager) {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let src = temp_dir.path().join("src");
    write_plugin(
        &src,
        "Foo.toml",
        r#"
[[attributes]]
type = "runner::Runner"
values = { id = "foo", label = "Foo", description = "This is a test plugin" }

[translatable]
label = []
description = []
"#,
    );
    write_plugin(
        &src,
        "Counted.toml",
        r#"
[[attributes]]
type = "runner::Runner"
values = { id = "counted", label = "Counted", deriver = "runner::CountDeriver" }

[translatable]
label = []
"#,
    );

    let mut classes = ClassRegistry::new();
    for class in ["app::runner::Plugin::Runner::Foo", "app::runner::Plugin::Runner::Counted"] {
        classes
            .register(class, |context: PluginContext| -> Result<Box<dyn Plugin>> {
                Ok(Box::new(TestRunner {
                    base: PluginBase::new(context),
                }))
            })
            .expect("register class");
    }

    let manager = bare_manager(&src)
        .with_classes(classes)
        .with_deriver("runner::CountDeriver", Arc::new(LabelVariantDeriver::new([1, 2])))
        .expect("register deriver");
    (temp_dir, src, manager)
}

#[tokio::test]
async fn test_definitions_expand_derivatives() -> Result<()> {
    let (_temp_dir, _src, manager) = setup();

    let definitions = manager.definitions().await?;
    let ids: Vec<&str> = definitions.keys().map(String::as_str).collect();
    assert_eq!(ids, vec!["counted:1", "counted:2", "foo"]);

    let derivative = definitions.get("counted:2").expect("derivative present");
    assert_eq!(derivative.id(), Some("counted"));
    assert_eq!(derivative.provider(), Some("runner"));
    assert!(manager.has_definition("foo").await?);
    assert!(!manager.has_definition("counted").await?);
    Ok(())
}

#[tokio::test]
async fn test_create_instance_renders_deferred_label() -> Result<()> {
    let (_temp_dir, _src, manager) = setup();

    let foo = manager.create_instance("foo", Value::Null).await?;
    assert_eq!(foo.plugin_id(), "foo");
    assert_eq!(foo.label(), "Foo");
    assert_eq!(foo.definition().get("weight"), Some(&Value::Integer(0)));

    let second = manager.create_instance("counted:2", Value::Null).await?;
    assert_eq!(second.label(), "Counted 2");
    assert_eq!(second.base_id(), "counted");
    assert_eq!(second.derivative_id(), Some("2"));
    Ok(())
}

#[tokio::test]
async fn test_create_instance_errors() {
    let (_temp_dir, src, manager) = setup();
    write_plugin(
        &src,
        "Unregistered.toml",
        "[[attributes]]\ntype = \"runner::Runner\"\nvalues = { id = \"unregistered\" }\n",
    );

    let missing = manager.create_instance("nope", Value::Null).await;
    assert!(matches!(
        missing,
        Err(Error::PluginSystem(PluginSystemError::PluginNotFound { .. }))
    ));

    let unregistered = manager.create_instance("unregistered", Value::Null).await;
    assert!(matches!(
        unregistered,
        Err(Error::PluginSystem(PluginSystemError::ClassNotRegistered { ref class, .. }))
            if class == "app::runner::Plugin::Runner::Unregistered"
    ));
}

#[tokio::test]
async fn test_unknown_deriver_is_an_error() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let src = temp_dir.path().join("src");
    write_plugin(
        &src,
        "Derived.toml",
        "[[attributes]]\ntype = \"runner::Runner\"\nvalues = { id = \"derived\", deriver = \"runner::Missing\" }\n",
    );
    let manager = bare_manager(&src);

    let result = manager.definitions().await;
    assert!(matches!(
        result,
        Err(Error::PluginSystem(PluginSystemError::DeriverNotRegistered { ref deriver, .. }))
            if deriver == "runner::Missing"
    ));
}

#[tokio::test]
async fn test_definitions_are_cached_until_cleared() -> Result<()> {
    let (_temp_dir, src, manager) = setup();
    assert_eq!(manager.definitions().await?.len(), 3);

    write_plugin(
        &src,
        "Late.toml",
        "[[attributes]]\ntype = \"runner::Runner\"\nvalues = { id = \"late\" }\n",
    );
    assert!(!manager.has_definition("late").await?);

    manager.clear_cached_definitions().await;
    assert!(manager.has_definition("late").await?);
    Ok(())
}

#[tokio::test]
async fn test_alter_hooks_run_in_order() -> Result<()> {
    let (_temp_dir, _src, manager) = setup();
    let manager = manager
        .with_alter_hook("drop_derivatives", |definitions| {
            definitions.retain(|id, _| !id.starts_with("counted:"));
        })
        .with_alter_hook("tag", |definitions| {
            for definition in definitions.values_mut() {
                definition.insert("altered", true);
            }
        });

    let definitions = manager.definitions().await?;
    assert_eq!(definitions.len(), 1);
    assert_eq!(
        definitions.get("foo").and_then(|definition| definition.get("altered")),
        Some(&Value::Bool(true))
    );
    Ok(())
}

#[tokio::test]
async fn test_last_report_and_deadline() -> Result<()> {
    let (_temp_dir, _src, manager) = setup();
    let manager = manager.with_deadline(Duration::from_secs(10));
    assert!(manager.last_report().await.is_none());

    manager.definitions().await?;
    let report = manager.last_report().await.expect("report recorded");
    assert_eq!(report.stats.files_seen, 2);
    assert_eq!(report.definitions.len(), 2);
    assert!(report.skipped.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_clear_file_cache_forces_rescan() -> Result<()> {
    let (_temp_dir, _src, manager) = setup();
    manager.definitions().await?;
    assert_eq!(manager.engine().cache().backend().name(), "memory");

    manager.clear_file_cache().await?;
    manager.definitions().await?;
    let report = manager.last_report().await.expect("report recorded");
    assert_eq!(report.stats.parsed, 2);
    assert_eq!(report.stats.cache_hits, 0);
    Ok(())
}

#[tokio::test]
async fn test_discovery_runs_off_the_async_thread() -> Result<()> {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let src = temp_dir.path().join("src");
    write_plugin(
        &src,
        "Foo.toml",
        "[[attributes]]\ntype = \"runner::Runner\"\nvalues = { id = \"foo\" }\n",
    );

    let mut catalog = AttributeCatalog::new();
    catalog
        .register(AttributeType::new(ATTRIBUTE))
        .expect("register runner");
    let catalog = Arc::new(catalog);
    let threads = Arc::new(Mutex::new(Vec::new()));
    let reader = ThreadRecordingReader {
        inner: DeclarationReader::new(catalog.clone(), ATTRIBUTE),
        threads: threads.clone(),
    };
    let engine = DiscoveryEngine::new(
        DiscoveryOptions::new(SUBDIR, ATTRIBUTE),
        catalog,
        Arc::new(MemoryCacheBackend::new()) as Arc<dyn CacheBackend>,
    )
    .with_reader(Arc::new(reader));
    let manager = DefaultPluginManager::new(engine, NamespaceMap::new().with("app::runner", &src));

    assert!(manager.definitions().await?.contains_key("foo"));

    let threads = threads.lock().expect("thread log").clone();
    assert_eq!(threads.len(), 1);
    assert_ne!(threads[0], thread::current().id(), "files must be parsed on the blocking pool");
    Ok(())
}
