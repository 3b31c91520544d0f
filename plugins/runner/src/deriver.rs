use std::collections::BTreeMap;

use plumb_core::definition::PluginDefinition;
use plumb_core::plugin_system::{Deriver, LabelVariantDeriver};

/// Deriver for runner plugins: one variant per key, numbered label.
#[derive(Debug, Clone)]
pub struct FooDeriver {
    variants: LabelVariantDeriver,
}

impl FooDeriver {
    pub const KEYS: [u32; 2] = [1, 2];
}

impl Default for FooDeriver {
    fn default() -> Self {
        Self {
            variants: LabelVariantDeriver::new(Self::KEYS),
        }
    }
}

impl Deriver for FooDeriver {
    fn derivative_definitions(&self, base: &PluginDefinition) -> BTreeMap<String, PluginDefinition> {
        self.variants.derivative_definitions(base)
    }
}
