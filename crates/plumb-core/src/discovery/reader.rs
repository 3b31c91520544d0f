use std::collections::BTreeMap;
use std::fmt::{self, Debug};
use std::fs;
use std::path::{Component, Path};
use std::sync::Arc;

use log::debug;
use serde::Deserialize;

use crate::discovery::attribute::AttributeCatalog;
use crate::discovery::error::DiscoveryError;
use crate::kernel::constants::NAMESPACE_SEPARATOR;
use crate::storage::config::ConfigFormat;

/// Definition key -> placeholder arguments for deferred-render text
pub type TranslatableSpec = BTreeMap<String, BTreeMap<String, String>>;

/// Fully-qualified reference to a plugin implementation
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClassRef {
    namespace: String,
    name: String,
}

impl ClassRef {
    /// Build a reference from a plugin namespace, the file's directory
    /// relative to the namespace root, and the file stem.
    ///
    /// Every segment must be an identifier: `[A-Za-z_][A-Za-z0-9_]*`.
    pub fn resolve(namespace: &str, sub_path: &Path, file: &Path) -> Result<Self, DiscoveryError> {
        let name = file
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or_default()
            .to_string();

        let mut segments: Vec<String> = Vec::new();
        for component in sub_path.components() {
            match component {
                Component::Normal(part) => match part.to_str() {
                    Some(part) => segments.push(part.to_string()),
                    None => {
                        return Err(resolution_error(namespace, &name, file, "sub-path is not valid UTF-8"));
                    }
                },
                Component::CurDir => {}
                _ => {
                    return Err(resolution_error(
                        namespace,
                        &name,
                        file,
                        &format!("unexpected sub-path component in '{}'", sub_path.display()),
                    ));
                }
            }
        }

        let mut full_namespace = namespace.to_string();
        for segment in &segments {
            full_namespace.push_str(NAMESPACE_SEPARATOR);
            full_namespace.push_str(segment);
        }

        let invalid = full_namespace
            .split(NAMESPACE_SEPARATOR)
            .chain(std::iter::once(name.as_str()))
            .find(|segment| !is_identifier(segment));
        if let Some(segment) = invalid {
            return Err(resolution_error(
                namespace,
                &name,
                file,
                &format!("'{}' is not a valid identifier", segment),
            ));
        }

        Ok(Self {
            namespace: full_namespace,
            name,
        })
    }

    /// Namespace the class lives in
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Short class name (the file stem)
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Fully-qualified reference, e.g. `app::runner::Plugin::Runner::Foo`
    pub fn path(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ClassRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.namespace, NAMESPACE_SEPARATOR, self.name)
    }
}

fn is_identifier(segment: &str) -> bool {
    let mut chars = segment.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn resolution_error(namespace: &str, name: &str, path: &Path, message: &str) -> DiscoveryError {
    DiscoveryError::ClassResolution {
        class: format!("{}{}{}", namespace, NAMESPACE_SEPARATOR, name),
        path: path.to_path_buf(),
        message: message.to_string(),
        source: None,
    }
}

/// The plugin attribute attached to a class, before normalization
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeInstance {
    /// Declared attribute type name
    pub attribute_type: String,
    /// Declared values, in the parser's representation
    pub values: serde_json::Map<String, serde_json::Value>,
}

/// Everything a reader extracted from one class
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClassAnnotations {
    /// First plugin attribute of the configured type, if any
    pub attribute: Option<AttributeInstance>,
    /// Translatable fields declared alongside it
    pub translatable: Option<TranslatableSpec>,
}

/// Strategy that extracts plugin metadata from a class without running it
pub trait AnnotationReader: Send + Sync + Debug {
    fn read(&self, class: &ClassRef, path: &Path) -> Result<ClassAnnotations, DiscoveryError>;
}

#[derive(Deserialize, Debug)]
struct RawDeclaration {
    #[serde(default)]
    attributes: Vec<RawAttribute>,
    #[serde(default)]
    translatable: Option<BTreeMap<String, serde_json::Value>>,
}

#[derive(Deserialize, Debug)]
struct RawAttribute {
    #[serde(rename = "type")]
    attribute_type: String,
    #[serde(default)]
    values: serde_json::Map<String, serde_json::Value>,
}

/// Reads declaration files (JSON, TOML or YAML by extension).
///
/// The first attribute whose type is a known plugin attribute is the class's
/// plugin attribute; it only counts if it is, or extends, the configured type.
#[derive(Debug, Clone)]
pub struct DeclarationReader {
    catalog: Arc<AttributeCatalog>,
    attribute: String,
}

impl DeclarationReader {
    pub fn new(catalog: Arc<AttributeCatalog>, attribute: impl Into<String>) -> Self {
        Self {
            catalog,
            attribute: attribute.into(),
        }
    }

    fn parse(&self, class: &ClassRef, path: &Path) -> Result<RawDeclaration, DiscoveryError> {
        let format = ConfigFormat::from_path(path).ok_or_else(|| DiscoveryError::ClassResolution {
            class: class.path(),
            path: path.to_path_buf(),
            message: "unsupported declaration format".to_string(),
            source: None,
        })?;

        let content = fs::read_to_string(path).map_err(|e| DiscoveryError::ClassResolution {
            class: class.path(),
            path: path.to_path_buf(),
            message: "failed to read declaration".to_string(),
            source: Some(Box::new(e)),
        })?;

        format
            .parse::<RawDeclaration>(&content)
            .map_err(|e| DiscoveryError::ClassResolution {
                class: class.path(),
                path: path.to_path_buf(),
                message: format!("failed to parse {} declaration", format.name()),
                source: Some(Box::new(e)),
            })
    }
}

impl AnnotationReader for DeclarationReader {
    fn read(&self, class: &ClassRef, path: &Path) -> Result<ClassAnnotations, DiscoveryError> {
        let declaration = self.parse(class, path)?;

        let Some(raw) = declaration
            .attributes
            .into_iter()
            .find(|raw| self.catalog.is_plugin_attribute(&raw.attribute_type))
        else {
            return Ok(ClassAnnotations::default());
        };

        if !self.catalog.is_subtype_of(&raw.attribute_type, &self.attribute) {
            debug!(
                "{} declares '{}', which is not a '{}'",
                class, raw.attribute_type, self.attribute
            );
            return Ok(ClassAnnotations::default());
        }

        let translatable = declaration
            .translatable
            .map(|fields| translatable_spec(fields, path))
            .transpose()?;

        Ok(ClassAnnotations {
            attribute: Some(AttributeInstance {
                attribute_type: raw.attribute_type,
                values: raw.values,
            }),
            translatable,
        })
    }
}

// `label = []` and `label = {}` both mean "no arguments".
fn translatable_spec(
    fields: BTreeMap<String, serde_json::Value>,
    path: &Path,
) -> Result<TranslatableSpec, DiscoveryError> {
    let mut spec = TranslatableSpec::new();
    for (key, arguments) in fields {
        let arguments = match arguments {
            serde_json::Value::Null => BTreeMap::new(),
            serde_json::Value::Array(items) if items.is_empty() => BTreeMap::new(),
            serde_json::Value::Object(entries) => entries
                .into_iter()
                .map(|(placeholder, value)| {
                    let value = match value {
                        serde_json::Value::String(s) => s,
                        other => other.to_string(),
                    };
                    (placeholder, value)
                })
                .collect(),
            other => {
                return Err(DiscoveryError::malformed(
                    path,
                    format!("translatable arguments for '{}' must be a table, got {}", key, other),
                ));
            }
        };
        spec.insert(key, arguments);
    }
    Ok(spec)
}
