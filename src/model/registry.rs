//! Model registry - runtime lookup of built model types by name
//!
//! Stores [`ModelType`] descriptors so the document store (and anything
//! else holding only a type name, such as a resolution target) can reach
//! the declarations.

use std::sync::Arc;

use dashmap::DashMap;
use tracing::debug;

use crate::error::{ModelError, ModelResult};
use crate::model::model_type::ModelType;

/// Thread-safe registry of built model types, keyed by name
#[derive(Debug, Clone, Default)]
pub struct ModelRegistry {
    models: Arc<DashMap<String, Arc<ModelType>>>,
}

impl ModelRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a built model type under its name. Registering the same
    /// name twice is a configuration error.
    pub fn register(&self, model: Arc<ModelType>) -> ModelResult<()> {
        let name = model.name().to_string();
        if self.models.contains_key(&name) {
            return Err(ModelError::Configuration(format!(
                "model '{}' is already registered",
                name
            )));
        }
        debug!(model = %name, "registered model type");
        self.models.insert(name, model);
        Ok(())
    }

    /// Look up a model type by name
    pub fn get(&self, name: &str) -> Option<Arc<ModelType>> {
        self.models.get(name).map(|entry| entry.clone())
    }

    /// Whether a model type is registered under the given name
    pub fn contains(&self, name: &str) -> bool {
        self.models.contains_key(name)
    }

    /// Names of all registered model types
    pub fn model_names(&self) -> Vec<String> {
        self.models.iter().map(|entry| entry.key().clone()).collect()
    }

    /// Number of registered model types
    pub fn len(&self) -> usize {
        self.models.len()
    }

    /// Whether the registry is empty
    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// Remove all registered model types
    pub fn clear(&self) {
        self.models.clear();
    }
}
