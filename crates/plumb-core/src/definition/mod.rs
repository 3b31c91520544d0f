//! # Plumb Plugin Definitions
//!
//! The canonical metadata record produced by discovery.
//!
//! A [`PluginDefinition`] is a string-keyed mapping of [`Value`]s. Three keys
//! are always meaningful: `id` (chosen by the plugin author), `class` and
//! `provider` (both derived by the discovery engine). Everything else is
//! defined by the plugin kind. Deferred text is kept as
//! [`TranslatableMarkup`] until a [`Translator`] renders it.
pub mod markup;
pub mod value;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::kernel::constants::{KEY_CLASS, KEY_ID, KEY_LABEL, KEY_PROVIDER};

pub use markup::{format_placeholders, FormatTranslator, TranslatableMarkup, Translator};
pub use value::Value;

/// Identifier-to-definition registry produced by one discovery pass
pub type Registry = BTreeMap<String, PluginDefinition>;

/// Canonical metadata record describing one discoverable implementation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PluginDefinition {
    values: BTreeMap<String, Value>,
}

impl PluginDefinition {
    /// Create an empty definition
    pub fn new() -> Self {
        Self::default()
    }

    /// Plugin identifier, if set to a string
    pub fn id(&self) -> Option<&str> {
        self.get_str(KEY_ID)
    }

    /// Fully-qualified implementation class reference
    pub fn class(&self) -> Option<&str> {
        self.get_str(KEY_CLASS)
    }

    /// Owning module name
    pub fn provider(&self) -> Option<&str> {
        self.get_str(KEY_PROVIDER)
    }

    /// Raw label value (literal or deferred)
    pub fn label(&self) -> Option<&Value> {
        self.values.get(KEY_LABEL)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.values.get_mut(key)
    }

    /// Get a string value, ignoring non-string variants
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.values.get(key).and_then(Value::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Insert or replace a value, returning the previous one
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.values.insert(key.into(), value.into())
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.values.remove(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.values.iter()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Borrow the underlying mapping
    pub fn as_map(&self) -> &BTreeMap<String, Value> {
        &self.values
    }

    /// Consume the definition, returning the underlying mapping
    pub fn into_map(self) -> BTreeMap<String, Value> {
        self.values
    }
}

impl From<BTreeMap<String, Value>> for PluginDefinition {
    fn from(values: BTreeMap<String, Value>) -> Self {
        Self { values }
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for PluginDefinition {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }
}

// Test module declaration
#[cfg(test)]
mod tests;
