use std::fmt::{self, Debug};
use std::sync::Arc;

use crate::definition::{FormatTranslator, PluginDefinition, Translator, Value};
use crate::kernel::constants::DERIVATIVE_SEPARATOR;
use crate::kernel::error::Result;

/// Runtime contract of an instantiated plugin
pub trait Plugin: Send + Sync + Debug {
    /// Registry id, including the derivative suffix if any (`foo:1`)
    fn plugin_id(&self) -> &str;

    /// The definition the plugin was created from
    fn definition(&self) -> &PluginDefinition;

    /// Display label with deferred text rendered
    fn label(&self) -> String;

    /// Id of the base definition (`foo` for `foo:1`).
    ///
    /// Discovered ids never contain the separator, so the first one starts
    /// the derivative key.
    fn base_id(&self) -> &str {
        let id = self.plugin_id();
        id.split_once(DERIVATIVE_SEPARATOR).map_or(id, |(base, _)| base)
    }

    /// Derivative key, if this plugin is a derivative
    fn derivative_id(&self) -> Option<&str> {
        self.plugin_id()
            .split_once(DERIVATIVE_SEPARATOR)
            .map(|(_, derivative)| derivative)
    }
}

/// Everything a constructor receives to build one plugin instance
#[derive(Debug, Clone)]
pub struct PluginContext {
    pub plugin_id: String,
    pub definition: PluginDefinition,
    pub configuration: Value,
    pub translator: Arc<dyn Translator>,
}

impl PluginContext {
    pub fn new(plugin_id: impl Into<String>, definition: PluginDefinition) -> Self {
        Self {
            plugin_id: plugin_id.into(),
            definition,
            configuration: Value::Null,
            translator: Arc::new(FormatTranslator),
        }
    }

    pub fn with_configuration(mut self, configuration: Value) -> Self {
        self.configuration = configuration;
        self
    }

    pub fn with_translator(mut self, translator: Arc<dyn Translator>) -> Self {
        self.translator = translator;
        self
    }

    /// Render a definition value; deferred text goes through the translator
    pub fn render(&self, key: &str) -> Option<String> {
        self.definition.get(key)?.render(self.translator.as_ref())
    }
}

/// Constructor stored in the class table
pub type PluginConstructor = Arc<dyn Fn(PluginContext) -> Result<Box<dyn Plugin>> + Send + Sync>;

/// Reusable state for plugin implementations.
///
/// Plugins embed a `PluginBase` and delegate the [`Plugin`] accessors to it.
/// A missing label falls back to the plugin id.
#[derive(Clone)]
pub struct PluginBase {
    context: PluginContext,
}

impl PluginBase {
    pub fn new(context: PluginContext) -> Self {
        Self { context }
    }

    pub fn plugin_id(&self) -> &str {
        &self.context.plugin_id
    }

    pub fn definition(&self) -> &PluginDefinition {
        &self.context.definition
    }

    pub fn configuration(&self) -> &Value {
        &self.context.configuration
    }

    pub fn context(&self) -> &PluginContext {
        &self.context
    }

    pub fn label(&self) -> String {
        self.context
            .render(crate::kernel::constants::KEY_LABEL)
            .unwrap_or_else(|| self.context.plugin_id.clone())
    }
}

impl Debug for PluginBase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginBase")
            .field("plugin_id", &self.context.plugin_id)
            .finish_non_exhaustive()
    }
}
