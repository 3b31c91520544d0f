use std::collections::BTreeMap;
use std::path::Path;

use log::warn;

use crate::definition::{PluginDefinition, TranslatableMarkup, Value};
use crate::discovery::attribute::AttributeCatalog;
use crate::discovery::error::DiscoveryError;
use crate::discovery::reader::{AttributeInstance, ClassRef, TranslatableSpec};
use crate::kernel::constants::{DERIVATIVE_SEPARATOR, KEY_CLASS, KEY_ID, KEY_PROVIDER, NAMESPACE_SEPARATOR};

/// Turns raw attribute instances into canonical plugin definitions
#[derive(Debug, Clone)]
pub struct MetadataNormalizer {
    vendor: String,
}

impl MetadataNormalizer {
    /// `vendor` is the top-level namespace segment preceding the provider
    pub fn new(vendor: impl Into<String>) -> Self {
        Self {
            vendor: vendor.into(),
        }
    }

    /// Build the canonical definition for one class.
    ///
    /// Declared values are deep-merged over the attribute type's defaults,
    /// translatable fields become deferred text, and `class`/`provider` are
    /// injected last so declarations cannot override them.
    pub fn normalize(
        &self,
        catalog: &AttributeCatalog,
        instance: &AttributeInstance,
        translatable: Option<&TranslatableSpec>,
        class: &ClassRef,
        path: &Path,
    ) -> Result<PluginDefinition, DiscoveryError> {
        let declared: BTreeMap<String, Value> = instance
            .values
            .iter()
            .map(|(key, value)| (key.clone(), Value::from(value.clone())))
            .collect();

        let mut values = catalog.defaults_for(&instance.attribute_type);
        deep_merge(&mut values, declared);

        match values.get(KEY_ID) {
            Some(Value::String(id)) if id.contains(DERIVATIVE_SEPARATOR) => {
                // Reserved for derivative ids (`<base>:<key>`)
                return Err(DiscoveryError::malformed(
                    path,
                    format!("'{}' must not contain '{}': '{}'", KEY_ID, DERIVATIVE_SEPARATOR, id),
                ));
            }
            Some(Value::String(id)) if !id.trim().is_empty() => {}
            Some(other) => {
                return Err(DiscoveryError::malformed(
                    path,
                    format!("'{}' must be a non-empty string, got {}", KEY_ID, other.type_name()),
                ));
            }
            None => {
                return Err(DiscoveryError::malformed(path, format!("missing '{}'", KEY_ID)));
            }
        }

        if let Some(spec) = translatable {
            apply_translatable(&mut values, spec, path)?;
        }

        let class_path = class.path();
        values.insert(KEY_CLASS.to_string(), Value::String(class_path.clone()));
        match provider_from_namespace(&class_path, &self.vendor) {
            Some(provider) => {
                values.insert(KEY_PROVIDER.to_string(), Value::String(provider));
            }
            None => {
                values.remove(KEY_PROVIDER);
            }
        }

        Ok(PluginDefinition::from(values))
    }
}

fn apply_translatable(
    values: &mut BTreeMap<String, Value>,
    spec: &TranslatableSpec,
    path: &Path,
) -> Result<(), DiscoveryError> {
    for (key, arguments) in spec {
        match values.get_mut(key) {
            None => {
                warn!(
                    "{}: translatable field '{}' is not part of the definition, skipping",
                    path.display(),
                    key
                );
            }
            Some(value) => match value {
                Value::String(text) => {
                    let text = std::mem::take(text);
                    *value = Value::Markup(TranslatableMarkup::with_arguments(text, arguments.clone()));
                }
                Value::Markup(_) => {}
                other => {
                    return Err(DiscoveryError::malformed(
                        path,
                        format!(
                            "translatable field '{}' must be a string, got {}",
                            key,
                            other.type_name()
                        ),
                    ));
                }
            },
        }
    }
    Ok(())
}

/// Merge `overlay` into `base`, recursing into nested maps and lists.
///
/// Overlay values win at every level. Lists merge by index: an overlay
/// element replaces the base element at the same position and extra base
/// elements are kept.
pub fn deep_merge(base: &mut BTreeMap<String, Value>, overlay: BTreeMap<String, Value>) {
    for (key, value) in overlay {
        match base.get_mut(&key) {
            Some(existing) => merge_value(existing, value),
            None => {
                base.insert(key, value);
            }
        }
    }
}

fn merge_value(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Map(base_map), Value::Map(overlay_map)) => deep_merge(base_map, overlay_map),
        (Value::List(base_list), Value::List(overlay_list)) => {
            for (index, item) in overlay_list.into_iter().enumerate() {
                match base_list.get_mut(index) {
                    Some(existing) => merge_value(existing, item),
                    None => base_list.push(item),
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}

/// Extract the owning module from a class reference.
///
/// `app::runner::Plugin::Runner::Foo` with vendor `app` yields `runner`.
/// The segment must be followed by further segments and consist of word
/// characters; it is lower-cased.
pub fn provider_from_namespace(class: &str, vendor: &str) -> Option<String> {
    let rest = class.strip_prefix(vendor)?.strip_prefix(NAMESPACE_SEPARATOR)?;
    let (provider, _) = rest.split_once(NAMESPACE_SEPARATOR)?;
    if provider.is_empty() || !provider.chars().all(|c| c.is_alphanumeric() || c == '_') {
        return None;
    }
    Some(provider.to_lowercase())
}
