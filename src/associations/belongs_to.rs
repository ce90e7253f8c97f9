//! Belongs-to accessors - lazy single-reference getter/setter pairs
//!
//! Accessors are built from the declared association descriptor instead of
//! synthesized at runtime: [`BelongsToAccessor`] binds one descriptor and
//! operates on any document of the declaring type. [`Document::related`]
//! and [`Document::set_related`] are the per-instance convenience surface.

use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use crate::associations::metadata::Association;
use crate::associations::{propagation, resolver};
use crate::document::{CachedRelation, Document};
use crate::error::{ModelError, ModelResult};
use crate::model::ModelType;
use crate::store::DocumentStore;

/// Getter/setter pair for one declared single-valued association
#[derive(Clone)]
pub struct BelongsToAccessor {
    association: Arc<Association>,
}

impl BelongsToAccessor {
    /// Build the accessor for a declared `belongs_to` attribute
    pub fn for_model(model: &ModelType, attribute: &str) -> ModelResult<Self> {
        let association = model
            .association(attribute)
            .ok_or_else(|| ModelError::UnknownAssociation {
                model: model.name().to_string(),
                attribute: attribute.to_string(),
            })?;
        if association.kind.is_collection() {
            return Err(ModelError::Configuration(format!(
                "association '{}' on model '{}' is a collection; use the collection accessor",
                attribute,
                model.name()
            )));
        }
        Ok(Self {
            association: association.clone(),
        })
    }

    /// The descriptor this accessor is bound to
    pub fn association(&self) -> &Association {
        &self.association
    }

    /// Resolve the referenced document. The cache is sticky: once a value
    /// (or an explicit clear) is materialized, reads return it without
    /// touching the store. An absent foreign key reads as `None` and is not
    /// cached, so a later direct foreign-key write is picked up.
    pub fn get(&self, doc: &Document, db: &dyn DocumentStore) -> ModelResult<Option<Document>> {
        if let Some(CachedRelation::Single(value)) = doc.cached_relation(&self.association.attribute)
        {
            return Ok(value);
        }
        let id = match doc.attribute(&self.association.foreign_key) {
            Value::String(id) => id,
            _ => return Ok(None),
        };
        let related = resolver::resolve(db, doc, &self.association, &id)?;
        doc.cache_relation(
            &self.association.attribute,
            CachedRelation::Single(Some(related.clone())),
        );
        Ok(Some(related))
    }

    /// Assign or clear the reference. Writes the stored foreign key,
    /// updates the reciprocal attribute on the affected related document,
    /// queues that document for cascade save, and caches the new value.
    /// Clearing propagates to the previously referenced document, which may
    /// require resolving it first.
    pub fn set(
        &self,
        doc: &Document,
        db: &dyn DocumentStore,
        value: Option<&Document>,
    ) -> ModelResult<()> {
        // resolve the outgoing reference before the foreign key is overwritten
        let old = match value {
            Some(_) => None,
            None => self.get(doc, db)?,
        };

        let foreign_key_value = match value.and_then(Document::id) {
            Some(id) => Value::String(id),
            None => Value::Null,
        };
        doc.write_attribute(&self.association.foreign_key, foreign_key_value)?;

        match value {
            Some(related) => {
                propagation::set_back_association(
                    related,
                    Some(doc),
                    &doc.model_name(),
                    self.association.reverse_association.as_deref(),
                )?;
                doc.enqueue_dirty(related);
            }
            None => {
                if let Some(old) = &old {
                    propagation::set_back_association(
                        old,
                        None,
                        &doc.model_name(),
                        self.association.reverse_association.as_deref(),
                    )?;
                    doc.enqueue_dirty(old);
                }
            }
        }

        debug!(
            model = %doc.model_name(),
            attribute = %self.association.attribute,
            cleared = value.is_none(),
            "belongs_to assigned"
        );
        doc.cache_relation(
            &self.association.attribute,
            CachedRelation::Single(value.cloned()),
        );
        Ok(())
    }
}

impl Document {
    /// Build the belongs-to accessor for a declared attribute on this
    /// document's model type
    pub fn belongs_to(&self, attribute: &str) -> ModelResult<BelongsToAccessor> {
        BelongsToAccessor::for_model(&self.model(), attribute)
    }

    /// Read a declared single-valued association, resolving lazily
    pub fn related(&self, db: &dyn DocumentStore, attribute: &str) -> ModelResult<Option<Document>> {
        self.belongs_to(attribute)?.get(self, db)
    }

    /// Assign or clear a declared single-valued association
    pub fn set_related(
        &self,
        db: &dyn DocumentStore,
        attribute: &str,
        value: Option<&Document>,
    ) -> ModelResult<()> {
        self.belongs_to(attribute)?.set(self, db, value)
    }
}
