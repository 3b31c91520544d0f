mod foo;

pub use foo::{Foo, NUMBERED_CLASS};

use plumb_core::definition::PluginDefinition;
use plumb_core::plugin_system::{PluginBase, PluginContext};

/// Shared state and accessors for runner plugins
#[derive(Debug, Clone)]
pub struct RunnerPluginBase {
    base: PluginBase,
}

impl RunnerPluginBase {
    pub fn new(context: PluginContext) -> Self {
        Self {
            base: PluginBase::new(context),
        }
    }

    pub fn plugin_id(&self) -> &str {
        self.base.plugin_id()
    }

    pub fn definition(&self) -> &PluginDefinition {
        self.base.definition()
    }

    /// Translated label
    pub fn label(&self) -> String {
        self.base.label()
    }

    /// Translated description, if the plugin declares one
    pub fn description(&self) -> Option<String> {
        self.base.context().render("description")
    }

    /// Ordering weight; lighter runners run first
    pub fn weight(&self) -> i64 {
        self.definition()
            .get("weight")
            .and_then(|weight| weight.as_i64())
            .unwrap_or_default()
    }
}
