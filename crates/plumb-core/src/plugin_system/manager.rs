use std::fmt::{self, Debug};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, info};
use tokio::sync::RwLock;

use crate::definition::{FormatTranslator, PluginDefinition, Registry, Translator, Value};
use crate::discovery::{DiscoveryEngine, DiscoveryReport, NamespaceMap};
use crate::kernel::constants::{DERIVATIVE_SEPARATOR, KEY_DERIVER};
use crate::kernel::error::Result;
use crate::plugin_system::derivative::Deriver;
use crate::plugin_system::error::PluginSystemError;
use crate::plugin_system::registry::{ClassRegistry, DeriverRegistry};
use crate::plugin_system::traits::{Plugin, PluginContext};

/// Hook allowed to rewrite the final registry of a plugin kind
pub type AlterHook = Arc<dyn Fn(&mut Registry) + Send + Sync>;

/// Host-facing access to the plugins of one kind
#[async_trait]
pub trait PluginManager: Send + Sync + Debug {
    fn name(&self) -> &'static str;

    /// All definitions, discovering them on first use
    async fn definitions(&self) -> Result<Registry>;

    /// A single definition by registry id
    async fn definition(&self, id: &str) -> Result<Option<PluginDefinition>>;

    /// Check whether a definition exists
    async fn has_definition(&self, id: &str) -> Result<bool>;

    /// Instantiate the plugin registered under `id`
    async fn create_instance(&self, id: &str, configuration: Value) -> Result<Box<dyn Plugin>>;

    /// Forget the cached definitions; the next access runs discovery again
    async fn clear_cached_definitions(&self);

    /// Diagnostics of the most recent discovery pass
    async fn last_report(&self) -> Option<DiscoveryReport>;
}

#[derive(Default)]
struct ManagerState {
    definitions: Option<Registry>,
    report: Option<DiscoveryReport>,
}

/// Plugin manager backed by a [`DiscoveryEngine`].
///
/// Derivers and alter hooks run on every discovery pass, after the engine
/// returns; their output is what [`definitions`](PluginManager::definitions)
/// caches.
#[derive(Clone)]
pub struct DefaultPluginManager {
    name: &'static str,
    engine: Arc<DiscoveryEngine>,
    namespaces: NamespaceMap,
    classes: ClassRegistry,
    derivers: DeriverRegistry,
    alter_hooks: Vec<(String, AlterHook)>,
    translator: Arc<dyn Translator>,
    deadline: Option<Duration>,
    state: Arc<RwLock<ManagerState>>,
}

impl DefaultPluginManager {
    pub fn new(engine: DiscoveryEngine, namespaces: NamespaceMap) -> Self {
        Self {
            name: "DefaultPluginManager",
            engine: Arc::new(engine),
            namespaces,
            classes: ClassRegistry::new(),
            derivers: DeriverRegistry::new(),
            alter_hooks: Vec::new(),
            translator: Arc::new(FormatTranslator),
            deadline: None,
            state: Arc::new(RwLock::new(ManagerState::default())),
        }
    }

    pub fn with_classes(mut self, classes: ClassRegistry) -> Self {
        self.classes = classes;
        self
    }

    pub fn with_derivers(mut self, derivers: DeriverRegistry) -> Self {
        self.derivers = derivers;
        self
    }

    /// Register one deriver by name
    pub fn with_deriver(mut self, name: impl Into<String>, deriver: Arc<dyn Deriver>) -> Result<Self> {
        self.derivers.register(name, deriver)?;
        Ok(self)
    }

    /// Add an alter hook; hooks run in the order they were added
    pub fn with_alter_hook<F>(mut self, name: impl Into<String>, hook: F) -> Self
    where
        F: Fn(&mut Registry) + Send + Sync + 'static,
    {
        self.alter_hooks.push((name.into(), Arc::new(hook)));
        self
    }

    pub fn with_translator(mut self, translator: Arc<dyn Translator>) -> Self {
        self.translator = translator;
        self
    }

    /// Bound every discovery pass by `deadline`
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn engine(&self) -> &Arc<DiscoveryEngine> {
        &self.engine
    }

    pub fn classes(&self) -> &ClassRegistry {
        &self.classes
    }

    pub fn translator(&self) -> &Arc<dyn Translator> {
        &self.translator
    }

    /// Drop every per-file scan result of this plugin kind, and the
    /// definitions built from them
    pub async fn clear_file_cache(&self) -> Result<()> {
        self.engine.cache().clear()?;
        self.clear_cached_definitions().await;
        Ok(())
    }

    async fn discover(&self) -> Result<DiscoveryReport> {
        let namespaces = self.namespaces.clone();
        let report = match self.deadline {
            Some(deadline) => self.engine.discover_within(namespaces, deadline).await?,
            None => self.engine.discover_blocking(namespaces).await?,
        };
        Ok(report)
    }

    /// Replace every definition naming a deriver with its derivatives
    fn expand_derivatives(&self, discovered: &Registry) -> Result<Registry> {
        let mut expanded = Registry::new();
        for (id, definition) in discovered {
            let Some(deriver_name) = definition.get_str(KEY_DERIVER) else {
                expanded.insert(id.clone(), definition.clone());
                continue;
            };
            let deriver = self
                .derivers
                .get(deriver_name)
                .ok_or_else(|| PluginSystemError::DeriverNotRegistered {
                    plugin_id: id.clone(),
                    deriver: deriver_name.to_string(),
                })?;
            let derivatives = deriver.derivative_definitions(definition);
            debug!("Deriver '{}' expanded '{}' into {} definitions", deriver_name, id, derivatives.len());
            for (key, derivative) in derivatives {
                expanded.insert(format!("{}{}{}", id, DERIVATIVE_SEPARATOR, key), derivative);
            }
        }
        Ok(expanded)
    }
}

impl Debug for DefaultPluginManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DefaultPluginManager")
            .field("name", &self.name)
            .field("attribute", &self.engine.options().attribute)
            .field("classes", &self.classes)
            .field("alter_hooks", &self.alter_hooks.len())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl PluginManager for DefaultPluginManager {
    fn name(&self) -> &'static str {
        self.name
    }

    async fn definitions(&self) -> Result<Registry> {
        if let Some(definitions) = &self.state.read().await.definitions {
            return Ok(definitions.clone());
        }

        let mut state = self.state.write().await;
        if let Some(definitions) = &state.definitions {
            return Ok(definitions.clone());
        }

        let report = self.discover().await?;
        let mut definitions = self.expand_derivatives(&report.definitions)?;
        for (hook_name, hook) in &self.alter_hooks {
            debug!("Running alter hook '{}'", hook_name);
            hook(&mut definitions);
        }
        info!(
            "{} holds {} '{}' definitions",
            self.name,
            definitions.len(),
            self.engine.options().attribute
        );

        state.definitions = Some(definitions.clone());
        state.report = Some(report);
        Ok(definitions)
    }

    async fn definition(&self, id: &str) -> Result<Option<PluginDefinition>> {
        Ok(self.definitions().await?.remove(id))
    }

    async fn has_definition(&self, id: &str) -> Result<bool> {
        Ok(self.definitions().await?.contains_key(id))
    }

    async fn create_instance(&self, id: &str, configuration: Value) -> Result<Box<dyn Plugin>> {
        let definition = self
            .definition(id)
            .await?
            .ok_or_else(|| PluginSystemError::not_found(id))?;
        let class = definition
            .class()
            .ok_or_else(|| PluginSystemError::instantiation(id, "definition has no class"))?
            .to_string();
        let constructor = self
            .classes
            .get(&class)
            .ok_or_else(|| PluginSystemError::ClassNotRegistered {
                plugin_id: id.to_string(),
                class: class.clone(),
            })?;

        let context = PluginContext::new(id, definition)
            .with_configuration(configuration)
            .with_translator(self.translator.clone());
        debug!("Instantiating plugin '{}' from class '{}'", id, class);
        constructor(context)
    }

    async fn clear_cached_definitions(&self) {
        let mut state = self.state.write().await;
        state.definitions = None;
    }

    async fn last_report(&self) -> Option<DiscoveryReport> {
        self.state.read().await.report.clone()
    }
}
