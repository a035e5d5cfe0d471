//! Component registry.
//!
//! Maps component names to factories producing fresh, unconfigured
//! instances. Built once at startup and then only read.

use std::collections::BTreeMap;

use super::{Component, dex, flatcar_linux_update_operator, gangway};
use crate::error::RegistryError;

/// Produces a new, default-initialized component.
pub type ComponentFactory = fn() -> Box<dyn Component>;

/// Name → factory lookup.
#[derive(Default)]
pub struct ComponentRegistry {
    factories: BTreeMap<String, ComponentFactory>,
}

impl ComponentRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every component shipped in this crate.
    ///
    /// Fails if two builtins share a name.
    pub fn with_builtin_components() -> Result<Self, RegistryError> {
        Self::from_factories(&[
            (dex::NAME, dex::factory),
            (
                flatcar_linux_update_operator::NAME,
                flatcar_linux_update_operator::factory,
            ),
            (gangway::NAME, gangway::factory),
        ])
    }

    fn from_factories(entries: &[(&str, ComponentFactory)]) -> Result<Self, RegistryError> {
        let mut registry = Self::new();
        for &(name, factory) in entries {
            registry.register(name, factory)?;
        }
        Ok(registry)
    }

    /// Register `factory` under `name`.
    ///
    /// Registering a name twice is an error and keeps the first factory.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        factory: ComponentFactory,
    ) -> Result<(), RegistryError> {
        let name = name.into();
        if self.factories.contains_key(&name) {
            return Err(RegistryError::AlreadyRegistered(name));
        }
        log::debug!("Registered component {}", name);
        self.factories.insert(name, factory);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&ComponentFactory> {
        self.factories.get(name)
    }

    /// Fresh instance of the component called `name`.
    pub fn create(&self, name: &str) -> Result<Box<dyn Component>, RegistryError> {
        self.get(name)
            .map(|factory| factory())
            .ok_or_else(|| RegistryError::NotFound(name.to_string()))
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        self.factories.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

impl std::fmt::Debug for ComponentRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentRegistry")
            .field("components", &self.names())
            .finish()
    }
}
