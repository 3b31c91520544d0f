use std::collections::{BTreeMap, HashMap, HashSet};

use log::debug;

use crate::definition::Value;
use crate::discovery::error::DiscoveryError;
use crate::discovery::normalizer::deep_merge;
use crate::kernel::constants::PLUGIN_ATTRIBUTE;

/// A kind of plugin attribute, with its parent type and declared defaults.
///
/// Attribute types stand in for annotation classes: a declaration names its
/// type, the type contributes default values, and types form a single
/// inheritance chain rooted at [`PLUGIN_ATTRIBUTE`].
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeType {
    name: String,
    parent: Option<String>,
    defaults: BTreeMap<String, Value>,
}

impl AttributeType {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent: None,
            defaults: BTreeMap::new(),
        }
    }

    /// Set the parent type; types without a parent extend the root attribute
    pub fn extends(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    /// Declare a default value. `Null` defaults are ignored during merging.
    pub fn default_value(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.defaults.insert(key.into(), value.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent(&self) -> Option<&str> {
        self.parent.as_deref()
    }

    pub fn defaults(&self) -> &BTreeMap<String, Value> {
        &self.defaults
    }
}

/// Registry of known attribute types
#[derive(Debug, Clone)]
pub struct AttributeCatalog {
    types: HashMap<String, AttributeType>,
}

impl AttributeCatalog {
    /// Create a catalog holding only the root plugin attribute
    pub fn new() -> Self {
        let mut types = HashMap::new();
        types.insert(PLUGIN_ATTRIBUTE.to_string(), AttributeType::new(PLUGIN_ATTRIBUTE));
        Self { types }
    }

    /// Register an attribute type, replacing any previous type of that name
    pub fn register(&mut self, mut attribute: AttributeType) -> Result<(), DiscoveryError> {
        if attribute.name == PLUGIN_ATTRIBUTE {
            return Err(DiscoveryError::Catalog(format!(
                "'{}' is the root attribute and cannot be redefined",
                PLUGIN_ATTRIBUTE
            )));
        }
        if attribute.name.trim().is_empty() {
            return Err(DiscoveryError::Catalog("Attribute type name must not be empty".into()));
        }
        if attribute.parent.is_none() {
            attribute.parent = Some(PLUGIN_ATTRIBUTE.to_string());
        }
        if self.types.contains_key(&attribute.name) {
            debug!("Replacing attribute type '{}'", attribute.name);
        }
        self.types.insert(attribute.name.clone(), attribute);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&AttributeType> {
        self.types.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    /// Type chain from `name` up to the root, most-derived first.
    ///
    /// Stops at an unknown parent or at the first repeated type.
    pub fn chain(&self, name: &str) -> Vec<&AttributeType> {
        let mut chain = Vec::new();
        let mut seen = HashSet::new();
        let mut next = Some(name);
        while let Some(current) = next {
            if !seen.insert(current) {
                break;
            }
            let Some(attribute) = self.types.get(current) else {
                break;
            };
            chain.push(attribute);
            next = attribute.parent.as_deref();
        }
        chain
    }

    /// Whether `name` is `ancestor` or transitively extends it
    pub fn is_subtype_of(&self, name: &str, ancestor: &str) -> bool {
        self.chain(name).iter().any(|attribute| attribute.name == ancestor)
    }

    /// Whether `name` is a known type that reaches the root plugin attribute
    pub fn is_plugin_attribute(&self, name: &str) -> bool {
        self.is_subtype_of(name, PLUGIN_ATTRIBUTE)
    }

    /// Effective defaults for a type: ancestors first, most-derived type wins.
    ///
    /// Top-level `Null` defaults are dropped so they never mask a value.
    pub fn defaults_for(&self, name: &str) -> BTreeMap<String, Value> {
        let mut merged = BTreeMap::new();
        for attribute in self.chain(name).into_iter().rev() {
            let defaults = attribute
                .defaults
                .iter()
                .filter(|(_, value)| !value.is_null())
                .map(|(key, value)| (key.clone(), value.clone()))
                .collect();
            deep_merge(&mut merged, defaults);
        }
        merged
    }
}

impl Default for AttributeCatalog {
    fn default() -> Self {
        Self::new()
    }
}
