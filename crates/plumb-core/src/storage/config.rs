use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::definition::Value;
use crate::discovery::attribute::{AttributeCatalog, AttributeType};
use crate::discovery::namespace::NamespaceMap;
use crate::discovery::DiscoveryOptions;
use crate::kernel::constants::{DEFAULT_CACHE_FILE, DEFAULT_VENDOR_PREFIX};
use crate::kernel::error::{Error, Result};
use crate::storage::error::StorageSystemError;

/// Supported document formats for declarations and configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// JSON format (.json)
    Json,
    /// YAML format (.yaml, .yml) - requires "yaml-config" feature
    #[cfg(feature = "yaml-config")]
    Yaml,
    /// TOML format (.toml) - requires "toml-config" feature
    #[cfg(feature = "toml-config")]
    Toml,
}

impl ConfigFormat {
    /// Get the file extension for this format
    pub fn extension(&self) -> &'static str {
        match self {
            ConfigFormat::Json => "json",
            #[cfg(feature = "yaml-config")]
            ConfigFormat::Yaml => "yaml",
            #[cfg(feature = "toml-config")]
            ConfigFormat::Toml => "toml",
        }
    }

    /// Name used in error messages
    pub fn name(&self) -> &'static str {
        match self {
            ConfigFormat::Json => "JSON",
            #[cfg(feature = "yaml-config")]
            ConfigFormat::Yaml => "YAML",
            #[cfg(feature = "toml-config")]
            ConfigFormat::Toml => "TOML",
        }
    }

    /// Determine format from a bare extension (case-insensitive)
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "json" => Some(ConfigFormat::Json),
            #[cfg(feature = "yaml-config")]
            "yaml" | "yml" => Some(ConfigFormat::Yaml),
            #[cfg(feature = "toml-config")]
            "toml" => Some(ConfigFormat::Toml),
            _ => None,
        }
    }

    /// Determine format from file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }

    /// Every extension a declaration file may carry with the enabled features
    pub fn supported_extensions() -> Vec<String> {
        let mut extensions = vec!["json".to_string()];
        #[cfg(feature = "toml-config")]
        extensions.push("toml".to_string());
        #[cfg(feature = "yaml-config")]
        extensions.extend(["yaml".to_string(), "yml".to_string()]);
        extensions
    }

    /// Deserialize a document in this format
    pub fn parse<T: DeserializeOwned>(&self, data: &str) -> Result<T> {
        let parsed = match self {
            ConfigFormat::Json => serde_json::from_str(data)
                .map_err(|e| StorageSystemError::deserialization(self.name(), e)),
            #[cfg(feature = "yaml-config")]
            ConfigFormat::Yaml => serde_yaml::from_str(data)
                .map_err(|e| StorageSystemError::deserialization(self.name(), e)),
            #[cfg(feature = "toml-config")]
            ConfigFormat::Toml => toml::from_str(data)
                .map_err(|e| StorageSystemError::deserialization(self.name(), e)),
        };
        parsed.map_err(Error::from)
    }
}

/// Which cache backend the CLI should construct
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackendKind {
    /// Process memory; every CLI invocation starts cold
    Memory,
    /// JSON document on disk, shared across invocations
    #[default]
    File,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default)]
    pub backend: CacheBackendKind,
    /// Location of the on-disk cache; defaults to `.plumb-cache.json` next to the config
    #[serde(default)]
    pub path: Option<PathBuf>,
}

/// One base namespace with its root directories
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamespaceConfig {
    pub name: String,
    pub dirs: Vec<PathBuf>,
}

/// Attribute type declared in configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeTypeConfig {
    pub name: String,
    #[serde(default)]
    pub parent: Option<String>,
    #[serde(default)]
    pub defaults: BTreeMap<String, serde_json::Value>,
}

fn default_vendor() -> String {
    DEFAULT_VENDOR_PREFIX.to_string()
}

fn default_extensions() -> Vec<String> {
    ConfigFormat::supported_extensions()
}

/// Discovery settings consumed by the command-line host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscoveryConfig {
    /// Plugin sub-directory, e.g. `Plugin/Runner`
    pub subdir: String,
    /// Attribute type plugins of this kind must declare
    pub attribute: String,
    #[serde(default = "default_vendor")]
    pub vendor: String,
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
    #[serde(default)]
    pub deadline_ms: Option<u64>,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub namespaces: Vec<NamespaceConfig>,
    #[serde(default)]
    pub attribute_types: Vec<AttributeTypeConfig>,
}

impl DiscoveryConfig {
    /// Load a configuration file; the format follows its extension.
    ///
    /// Relative namespace directories and the cache path are resolved against
    /// the directory holding the file.
    pub fn load(path: &Path) -> Result<Self> {
        let format = ConfigFormat::from_path(path).ok_or_else(|| {
            StorageSystemError::UnsupportedConfigFormat(path.display().to_string())
        })?;
        let data = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                StorageSystemError::FileNotFound(path.to_path_buf()).into()
            } else {
                Error::io(e, "read_config", path.to_path_buf())
            }
        })?;
        let mut config: DiscoveryConfig = format.parse(&data)?;
        let base_dir = path.parent().unwrap_or_else(|| Path::new(""));
        config.resolve_relative_to(base_dir);
        config.validate()?;
        Ok(config)
    }

    fn resolve_relative_to(&mut self, base_dir: &Path) {
        for namespace in &mut self.namespaces {
            for dir in &mut namespace.dirs {
                if dir.is_relative() {
                    *dir = base_dir.join(&*dir);
                }
            }
        }
        let cache_path = self
            .cache
            .path
            .take()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CACHE_FILE));
        self.cache.path = Some(if cache_path.is_relative() {
            base_dir.join(cache_path)
        } else {
            cache_path
        });
    }

    fn validate(&self) -> Result<()> {
        if self.attribute.trim().is_empty() {
            return Err(StorageSystemError::InvalidConfig("'attribute' must not be empty".into()).into());
        }
        if self.extensions.is_empty() {
            return Err(StorageSystemError::InvalidConfig("'extensions' must list at least one extension".into()).into());
        }
        Ok(())
    }

    /// Ordered namespace map, before the plugin sub-directory suffix is applied
    pub fn namespace_map(&self) -> NamespaceMap {
        let mut map = NamespaceMap::new();
        for namespace in &self.namespaces {
            for dir in &namespace.dirs {
                map.insert(namespace.name.clone(), dir.clone());
            }
        }
        map
    }

    /// Engine options derived from this configuration
    pub fn options(&self) -> DiscoveryOptions {
        DiscoveryOptions::new(self.subdir.clone(), self.attribute.clone())
            .vendor(self.vendor.clone())
            .extensions(self.extensions.clone())
    }

    /// Optional deadline around a full discovery pass
    pub fn deadline(&self) -> Option<Duration> {
        self.deadline_ms.map(Duration::from_millis)
    }

    /// Build the attribute catalog declared by this configuration
    pub fn catalog(&self) -> Result<AttributeCatalog> {
        let mut catalog = AttributeCatalog::new();
        for declared in &self.attribute_types {
            let mut attribute = AttributeType::new(declared.name.clone());
            if let Some(parent) = &declared.parent {
                attribute = attribute.extends(parent.clone());
            }
            for (key, value) in &declared.defaults {
                attribute = attribute.default_value(key.clone(), Value::from(value.clone()));
            }
            catalog.register(attribute)?;
        }
        Ok(catalog)
    }
}
