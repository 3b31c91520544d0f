use std::collections::BTreeMap;
use std::fmt::Debug;

use crate::definition::{PluginDefinition, TranslatableMarkup, Value};
use crate::kernel::constants::KEY_LABEL;

/// Expands one base definition into keyed derivative definitions.
///
/// Implementations are pure: no I/O, and the same base always yields the
/// same derivatives.
pub trait Deriver: Send + Sync + Debug {
    fn derivative_definitions(&self, base: &PluginDefinition) -> BTreeMap<String, PluginDefinition>;
}

/// Produces one derivative per key, with the key appended to the label.
///
/// Every other field, `id` included, is copied from the base unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelVariantDeriver {
    keys: Vec<String>,
}

impl LabelVariantDeriver {
    pub fn new<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: ToString,
    {
        Self {
            keys: keys.into_iter().map(|key| key.to_string()).collect(),
        }
    }

    pub fn keys(&self) -> &[String] {
        &self.keys
    }
}

impl Deriver for LabelVariantDeriver {
    fn derivative_definitions(&self, base: &PluginDefinition) -> BTreeMap<String, PluginDefinition> {
        self.keys
            .iter()
            .map(|key| {
                let mut derivative = base.clone();
                derivative.insert(KEY_LABEL, variant_label(base.label(), key));
                (key.clone(), derivative)
            })
            .collect()
    }
}

fn variant_label(label: Option<&Value>, key: &str) -> Value {
    match label {
        Some(Value::Markup(markup)) => {
            let mut arguments = markup.arguments.clone();
            arguments.insert("@key".to_string(), key.to_string());
            Value::Markup(TranslatableMarkup::with_arguments(
                format!("{} @key", markup.untranslated()),
                arguments,
            ))
        }
        Some(Value::String(text)) => Value::String(format!("{} {}", text, key)),
        Some(other) if !other.is_null() => Value::String(format!("{} {}", other, key)),
        _ => Value::String(key.to_string()),
    }
}
