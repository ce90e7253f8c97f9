//! Document store boundary - the persistence collaborator
//!
//! The engine only needs two storage operations: resolve a document by id
//! and persist one. [`MemoryStore`] is the reference backend: per-model
//! attribute snapshots behind a `RefCell`, UUID string ids assigned on
//! first persist, rehydration through the model registry.

use std::cell::RefCell;
use std::collections::HashMap;

use serde_json::{Map, Value};
use tracing::trace;
use uuid::Uuid;

use crate::document::{Document, DocumentId};
use crate::error::{ModelError, ModelResult};
use crate::model::ModelRegistry;

/// Backend-level storage failures
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Model '{0}' is not registered with this store")]
    UnknownModel(String),

    #[error("No stored document '{id}' for model '{model}'")]
    MissingDocument { model: String, id: String },
}

impl From<StoreError> for ModelError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::UnknownModel(model) => {
                ModelError::Configuration(format!("model '{}' is not registered", model))
            }
            StoreError::MissingDocument { model, id } => ModelError::NotFound { model, id },
        }
    }
}

/// Synchronous storage operations the association engine consumes
pub trait DocumentStore {
    /// Resolve a stored document by model name and id
    fn get(&self, model: &str, id: &str) -> ModelResult<Document>;

    /// Persist a document, assigning an id on first save. Does not cascade;
    /// cascading is the saving document's post-persist concern.
    fn persist(&self, doc: &Document) -> ModelResult<()>;
}

/// In-memory document store backed by per-model snapshot maps
pub struct MemoryStore {
    registry: ModelRegistry,
    records: RefCell<HashMap<String, HashMap<DocumentId, Map<String, Value>>>>,
}

impl MemoryStore {
    /// Create an empty store resolving model types through the given registry
    pub fn new(registry: ModelRegistry) -> Self {
        Self {
            registry,
            records: RefCell::new(HashMap::new()),
        }
    }

    /// The registry this store resolves model types through
    pub fn registry(&self) -> &ModelRegistry {
        &self.registry
    }

    /// Whether a document is stored under the given model name and id
    pub fn contains(&self, model: &str, id: &str) -> bool {
        self.records
            .borrow()
            .get(model)
            .map(|docs| docs.contains_key(id))
            .unwrap_or(false)
    }

    /// Number of stored documents for a model
    pub fn count(&self, model: &str) -> usize {
        self.records
            .borrow()
            .get(model)
            .map(|docs| docs.len())
            .unwrap_or(0)
    }
}

impl DocumentStore for MemoryStore {
    fn get(&self, model: &str, id: &str) -> ModelResult<Document> {
        let model_type = self
            .registry
            .get(model)
            .ok_or_else(|| StoreError::UnknownModel(model.to_string()))?;
        let records = self.records.borrow();
        let attributes = records
            .get(model)
            .and_then(|docs| docs.get(id))
            .cloned()
            .ok_or_else(|| StoreError::MissingDocument {
                model: model.to_string(),
                id: id.to_string(),
            })?;
        trace!(model, id, "resolved stored document");
        Ok(Document::hydrate(&model_type, id.to_string(), attributes))
    }

    fn persist(&self, doc: &Document) -> ModelResult<()> {
        let model = doc.model_name();
        if !self.registry.contains(&model) {
            return Err(StoreError::UnknownModel(model).into());
        }
        let id = match doc.id() {
            Some(id) => id,
            None => {
                let id = Uuid::new_v4().to_string();
                doc.mark_persisted(id.clone());
                id
            }
        };
        trace!(model = %model, id = %id, "persisted document");
        self.records
            .borrow_mut()
            .entry(model)
            .or_default()
            .insert(id, doc.attributes());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ModelType, PropertyKind};

    fn store_with_pet_model() -> MemoryStore {
        let registry = ModelRegistry::new();
        ModelType::builder("Pet")
            .property("name", PropertyKind::String)
            .register(&registry)
            .unwrap();
        MemoryStore::new(registry)
    }

    #[test]
    fn test_persist_assigns_id_once() {
        let store = store_with_pet_model();
        let pet = Document::new(&store.registry().get("Pet").unwrap());
        pet.write_attribute("name", "rex").unwrap();

        assert!(pet.is_new());
        store.persist(&pet).unwrap();
        let id = pet.id().unwrap();
        assert!(!pet.is_new());
        assert!(store.contains("Pet", &id));

        store.persist(&pet).unwrap();
        assert_eq!(pet.id().unwrap(), id);
        assert_eq!(store.count("Pet"), 1);
    }

    #[test]
    fn test_get_rehydrates_attributes() {
        let store = store_with_pet_model();
        let pet = Document::new(&store.registry().get("Pet").unwrap());
        pet.write_attribute("name", "rex").unwrap();
        store.persist(&pet).unwrap();

        let loaded = store.get("Pet", &pet.id().unwrap()).unwrap();
        assert_eq!(loaded.attribute("name"), serde_json::json!("rex"));
        assert!(!loaded.is_new());
    }

    #[test]
    fn test_missing_document_is_not_found() {
        let store = store_with_pet_model();
        assert!(matches!(
            store.get("Pet", "nope"),
            Err(ModelError::NotFound { .. })
        ));
    }

    #[test]
    fn test_unknown_model_is_a_configuration_error() {
        let store = store_with_pet_model();
        assert!(matches!(
            store.get("Dragon", "d1"),
            Err(ModelError::Configuration(_))
        ));
    }
}
