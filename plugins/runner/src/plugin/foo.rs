use log::debug;

use plumb_core::definition::PluginDefinition;
use plumb_core::plugin_system::{Plugin, PluginContext};
use plumb_core::Result;

use crate::plugin::RunnerPluginBase;

/// Class declared by `Plugin/Runner/Numbered.toml`, built as a [`Foo`]
pub const NUMBERED_CLASS: &str = "app::runner::Plugin::Runner::Numbered";

/// Foo plugin.
#[derive(Debug)]
pub struct Foo {
    base: RunnerPluginBase,
}

impl Foo {
    pub const CLASS: &'static str = "app::runner::Plugin::Runner::Foo";

    pub fn create(context: PluginContext) -> Result<Box<dyn Plugin>> {
        debug!("Creating runner '{}'", context.plugin_id);
        Ok(Box::new(Self {
            base: RunnerPluginBase::new(context),
        }))
    }

    pub fn description(&self) -> Option<String> {
        self.base.description()
    }

    pub fn weight(&self) -> i64 {
        self.base.weight()
    }
}

impl Plugin for Foo {
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
