//! Document instances - attribute storage, relation cache, dirty queue
//!
//! A [`Document`] is a cheap cloneable handle over one in-memory record:
//! its model type, optional identifier, schema-less attribute map, the
//! per-attribute resolved-relation cache, and the queue of related
//! documents pending save. The engine is single-threaded by contract;
//! handles are `Rc`-based and callers serialize access.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};
use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::{debug, trace};

use crate::associations::collection::CollectionProxy;
use crate::associations::dirty::DirtyQueue;
use crate::error::{ModelError, ModelResult};
use crate::model::ModelType;
use crate::store::DocumentStore;

/// Document identifiers are opaque strings assigned by the store
pub type DocumentId = String;

/// The last-materialized value of one association attribute
#[derive(Clone)]
pub(crate) enum CachedRelation {
    Single(Option<Document>),
    Collection(CollectionProxy),
}

pub(crate) struct DocumentInner {
    model: Arc<ModelType>,
    id: Option<DocumentId>,
    attributes: Map<String, Value>,
    relations: std::collections::HashMap<String, CachedRelation>,
    dirty: DirtyQueue,
}

/// Handle to one in-memory document instance
#[derive(Clone)]
pub struct Document {
    inner: Rc<RefCell<DocumentInner>>,
}

impl Document {
    /// Create a new, unsaved document of the given model type
    pub fn new(model: &Arc<ModelType>) -> Self {
        Self::from_parts(model.clone(), None, Map::new())
    }

    /// Rebuild a persisted document from stored state. Intended for storage
    /// backends.
    pub fn hydrate(model: &Arc<ModelType>, id: DocumentId, attributes: Map<String, Value>) -> Self {
        Self::from_parts(model.clone(), Some(id), attributes)
    }

    fn from_parts(model: Arc<ModelType>, id: Option<DocumentId>, attributes: Map<String, Value>) -> Self {
        Self {
            inner: Rc::new(RefCell::new(DocumentInner {
                model,
                id,
                attributes,
                relations: std::collections::HashMap::new(),
                dirty: DirtyQueue::new(),
            })),
        }
    }

    /// The document's model type
    pub fn model(&self) -> Arc<ModelType> {
        self.inner.borrow().model.clone()
    }

    /// The document's model type name
    pub fn model_name(&self) -> String {
        self.inner.borrow().model.name().to_string()
    }

    /// The identifier assigned by the store, if the document was ever saved
    pub fn id(&self) -> Option<DocumentId> {
        self.inner.borrow().id.clone()
    }

    /// Whether the document has never been persisted
    pub fn is_new(&self) -> bool {
        self.inner.borrow().id.is_none()
    }

    /// Assign the store identifier after a first persist. Intended for
    /// storage backends.
    pub fn mark_persisted(&self, id: DocumentId) {
        self.inner.borrow_mut().id = Some(id);
    }

    /// Read a stored attribute value; absent attributes read as `Null`
    pub fn attribute(&self, name: &str) -> Value {
        self.inner
            .borrow()
            .attributes
            .get(name)
            .cloned()
            .unwrap_or(Value::Null)
    }

    /// Snapshot of the full attribute map. Intended for storage backends.
    pub fn attributes(&self) -> Map<String, Value> {
        self.inner.borrow().attributes.clone()
    }

    /// Write a declared attribute through the checked path: the property
    /// must exist, must not be readonly, and the value must match its
    /// declared shape. Writing an association's foreign key resets that
    /// association's relation cache so the next read re-resolves.
    pub fn write_attribute(&self, name: &str, value: impl Into<Value>) -> ModelResult<()> {
        let value = value.into();
        let model = self.model();
        let property = model
            .property(name)
            .ok_or_else(|| ModelError::UnknownProperty {
                model: model.name().to_string(),
                name: name.to_string(),
            })?;
        if property.readonly {
            return Err(ModelError::ReadonlyProperty {
                model: model.name().to_string(),
                name: name.to_string(),
            });
        }
        property.check_value(&value)?;

        let invalidated = model.association_for_foreign_key(name).map(|a| a.attribute.clone());
        let mut inner = self.inner.borrow_mut();
        if let Some(attribute) = invalidated {
            trace!(model = %model.name(), %attribute, "foreign key written, relation cache reset");
            inner.relations.remove(&attribute);
        }
        inner.attributes.insert(name.to_string(), value);
        Ok(())
    }

    /// Mutate a stored id-array in place. Bypasses the readonly check; the
    /// collection proxy and back-association propagation own id-array
    /// consistency. Does not touch the relation cache.
    pub(crate) fn with_fk_array<R>(&self, name: &str, f: impl FnOnce(&mut Vec<Value>) -> R) -> R {
        let mut inner = self.inner.borrow_mut();
        let mut items = match inner.attributes.remove(name) {
            Some(Value::Array(items)) => items,
            _ => Vec::new(),
        };
        let result = f(&mut items);
        inner.attributes.insert(name.to_string(), Value::Array(items));
        result
    }

    /// Replace a stored id-array wholesale. Used when a collection proxy is
    /// (re)built from an object sequence.
    pub(crate) fn replace_fk_array(&self, name: &str, ids: Vec<Value>) {
        self.inner
            .borrow_mut()
            .attributes
            .insert(name.to_string(), Value::Array(ids));
    }

    pub(crate) fn cached_relation(&self, attribute: &str) -> Option<CachedRelation> {
        self.inner.borrow().relations.get(attribute).cloned()
    }

    pub(crate) fn cache_relation(&self, attribute: &str, relation: CachedRelation) {
        self.inner
            .borrow_mut()
            .relations
            .insert(attribute.to_string(), relation);
    }

    /// Queue a related document for save when this document is next saved.
    /// Already-queued documents are not re-queued.
    pub fn enqueue_dirty(&self, related: &Document) {
        let mut inner = self.inner.borrow_mut();
        inner.dirty.enqueue(related.clone());
    }

    /// Number of related documents currently queued for cascade save
    pub fn pending_save_count(&self) -> usize {
        self.inner.borrow().dirty.len()
    }

    /// Persist this document, then drain the dirty-association queue:
    /// each queued related document is saved exactly once per drain, most
    /// recently queued first. A failing related save surfaces immediately
    /// and leaves the rest of the queue intact for a later attempt.
    pub fn save(&self, db: &dyn DocumentStore) -> ModelResult<()> {
        db.persist(self)?;
        loop {
            let next = {
                let mut inner = self.inner.borrow_mut();
                inner.dirty.pop()
            };
            match next {
                Some(related) => {
                    debug!(
                        model = %self.model_name(),
                        related = %related.model_name(),
                        "cascading save to dirty association"
                    );
                    related.save(db)?;
                }
                None => return Ok(()),
            }
        }
    }

    /// Whether two handles refer to the same document: the same in-memory
    /// instance, or the same persisted record of the same model
    pub fn is_same(&self, other: &Document) -> bool {
        if Rc::ptr_eq(&self.inner, &other.inner) {
            return true;
        }
        if self.model_name() != other.model_name() {
            return false;
        }
        matches!((self.id(), other.id()), (Some(a), Some(b)) if a == b)
    }

    pub(crate) fn downgrade(&self) -> Weak<RefCell<DocumentInner>> {
        Rc::downgrade(&self.inner)
    }

    pub(crate) fn from_inner(inner: Rc<RefCell<DocumentInner>>) -> Self {
        Self { inner }
    }
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // relation caches can be cyclic; print identity only
        f.debug_struct("Document")
            .field("model", &self.model_name())
            .field("id", &self.id())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ModelType, PropertyKind};
    use serde_json::json;

    fn husband_model() -> Arc<ModelType> {
        ModelType::builder("Husband")
            .property("name", PropertyKind::String)
            .belongs_to("wife")
            .collection_of("children")
            .build()
            .unwrap()
    }

    #[test]
    fn test_new_document_is_unsaved() {
        let doc = Document::new(&husband_model());
        assert!(doc.is_new());
        assert!(doc.id().is_none());
        assert_eq!(doc.attribute("name"), Value::Null);
    }

    #[test]
    fn test_checked_attribute_writes() {
        let doc = Document::new(&husband_model());
        doc.write_attribute("name", "father").unwrap();
        assert_eq!(doc.attribute("name"), json!("father"));

        assert!(matches!(
            doc.write_attribute("age", 7),
            Err(ModelError::UnknownProperty { .. })
        ));
        assert!(matches!(
            doc.write_attribute("name", 7),
            Err(ModelError::Validation(_))
        ));
    }

    #[test]
    fn test_id_array_foreign_key_is_readonly() {
        let doc = Document::new(&husband_model());
        assert!(matches!(
            doc.write_attribute("child_ids", json!(["1"])),
            Err(ModelError::ReadonlyProperty { .. })
        ));
    }

    #[test]
    fn test_foreign_key_write_resets_relation_cache() {
        let model = husband_model();
        let doc = Document::new(&model);
        let wife = Document::hydrate(
            &ModelType::builder("Wife").build().unwrap(),
            "w1".to_string(),
            Map::new(),
        );
        doc.cache_relation("wife", CachedRelation::Single(Some(wife)));
        doc.write_attribute("wife_id", "w2").unwrap();
        assert!(doc.cached_relation("wife").is_none());
    }

    #[test]
    fn test_is_same() {
        let model = husband_model();
        let a = Document::hydrate(&model, "h1".to_string(), Map::new());
        let b = Document::hydrate(&model, "h1".to_string(), Map::new());
        let c = Document::hydrate(&model, "h2".to_string(), Map::new());
        let fresh = Document::new(&model);

        assert!(a.is_same(&a));
        assert!(a.is_same(&b));
        assert!(!a.is_same(&c));
        assert!(!fresh.is_same(&Document::new(&model)));
        assert!(fresh.is_same(&fresh.clone()));
    }

    #[test]
    fn test_with_fk_array_initializes_missing_arrays() {
        let doc = Document::new(&husband_model());
        doc.with_fk_array("child_ids", |ids| ids.push(json!("k1")));
        assert_eq!(doc.attribute("child_ids"), json!(["k1"]));
    }
}
