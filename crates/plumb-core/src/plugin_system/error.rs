//! # Plumb Plugin System Errors
//!
//! [`PluginSystemError`] covers failures of the manager layer that sits on
//! top of discovery: unknown plugin ids, classes or derivers missing from
//! their registration tables, and constructors that refuse a configuration.
#[derive(Debug, thiserror::Error)]
pub enum PluginSystemError {
    #[error("Plugin '{plugin_id}' does not exist")]
    PluginNotFound { plugin_id: String },

    #[error("Plugin '{plugin_id}' uses class '{class}', which is not registered")]
    ClassNotRegistered { plugin_id: String, class: String },

    #[error("Plugin '{plugin_id}' uses deriver '{deriver}', which is not registered")]
    DeriverNotRegistered { plugin_id: String, deriver: String },

    #[error("Plugin registration error for '{name}': {message}")]
    RegistrationError { name: String, message: String },

    #[error("Failed to instantiate plugin '{plugin_id}': {message}")]
    InstantiationError {
        plugin_id: String,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl PluginSystemError {
    pub fn not_found(plugin_id: impl Into<String>) -> Self {
        PluginSystemError::PluginNotFound {
            plugin_id: plugin_id.into(),
        }
    }

    /// Instantiation failure without an underlying cause
    pub fn instantiation(plugin_id: impl Into<String>, message: impl Into<String>) -> Self {
        PluginSystemError::InstantiationError {
            plugin_id: plugin_id.into(),
            message: message.into(),
            source: None,
        }
    }
}
