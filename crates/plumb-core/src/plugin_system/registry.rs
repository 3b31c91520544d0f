use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::kernel::error::Result;
use crate::plugin_system::derivative::Deriver;
use crate::plugin_system::error::PluginSystemError;
use crate::plugin_system::traits::{Plugin, PluginConstructor, PluginContext};

/// Explicit table of class references to constructors.
///
/// Discovery only yields metadata; a plugin can be instantiated once its
/// crate has registered the class named in the definition's `class` key.
#[derive(Default, Clone)]
pub struct ClassRegistry {
    constructors: HashMap<String, PluginConstructor>,
}

impl ClassRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a constructor under a fully qualified class reference
    pub fn register<F>(&mut self, class: impl Into<String>, constructor: F) -> Result<()>
    where
        F: Fn(PluginContext) -> Result<Box<dyn Plugin>> + Send + Sync + 'static,
    {
        let class = class.into();
        if self.constructors.contains_key(&class) {
            return Err(PluginSystemError::RegistrationError {
                name: class,
                message: "Class already registered".to_string(),
            }
            .into());
        }
        self.constructors.insert(class, Arc::new(constructor));
        Ok(())
    }

    pub fn get(&self, class: &str) -> Option<&PluginConstructor> {
        self.constructors.get(class)
    }

    pub fn contains(&self, class: &str) -> bool {
        self.constructors.contains_key(class)
    }

    pub fn len(&self) -> usize {
        self.constructors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.constructors.is_empty()
    }

    /// Registered class references, sorted
    pub fn classes(&self) -> Vec<&str> {
        let mut classes: Vec<&str> = self.constructors.keys().map(String::as_str).collect();
        classes.sort_unstable();
        classes
    }
}

impl fmt::Debug for ClassRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassRegistry")
            .field("classes", &self.classes())
            .finish()
    }
}

/// Named derivers a definition can reference through its `deriver` key
#[derive(Debug, Default, Clone)]
pub struct DeriverRegistry {
    derivers: HashMap<String, Arc<dyn Deriver>>,
}

impl DeriverRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, name: impl Into<String>, deriver: Arc<dyn Deriver>) -> Result<()> {
        let name = name.into();
        if self.derivers.contains_key(&name) {
            return Err(PluginSystemError::RegistrationError {
                name,
                message: "Deriver already registered".to_string(),
            }
            .into());
        }
        self.derivers.insert(name, deriver);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Deriver>> {
        self.derivers.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.derivers.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.derivers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.derivers.is_empty()
    }
}
