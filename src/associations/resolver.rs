//! Reference resolution - turning stored foreign-key ids into documents
//!
//! A resolution target is either the related model type itself or a path
//! through the owning proxy document, for model types scoped by another
//! entity. Proxied targets require the owner reference to be set; the
//! fetch is then by model name and id. Lookup failures surface to the
//! caller; a dangling id is never masked.

use tracing::trace;

use crate::associations::metadata::{Association, ResolutionTarget};
use crate::document::Document;
use crate::error::{ModelError, ModelResult};
use crate::store::DocumentStore;

/// Fetch the document referenced by `id` according to the association's
/// resolution target. `owner` is the document the foreign key is stored
/// on; it is consulted only for proxied (`Through`) targets.
pub fn resolve(
    db: &dyn DocumentStore,
    owner: &Document,
    association: &Association,
    id: &str,
) -> ModelResult<Document> {
    match &association.resolution_target {
        ResolutionTarget::Model(model) => {
            trace!(model = %model, id, attribute = %association.attribute, "resolving reference");
            db.get(model, id)
        }
        ResolutionTarget::Through {
            owner_attribute,
            collection,
        } => {
            // the proxy owner reference must be set; the fetch itself is a
            // plain lookup by id, not scoped to the owner's collection
            if owner.related(db, owner_attribute)?.is_none() {
                return Err(ModelError::Configuration(format!(
                    "cannot resolve '{}' through '{}.{}': no '{}' set on this {}",
                    association.attribute,
                    owner_attribute,
                    collection,
                    owner_attribute,
                    owner.model_name()
                )));
            }
            trace!(
                collection = %collection,
                id,
                attribute = %association.attribute,
                "resolving reference through proxy owner"
            );
            db.get(&association.class_name, id)
        }
    }
}
