//! Collection proxy - an object sequence kept in lockstep with its id-array
//!
//! Wraps the resolved documents of a `collection_of` association and
//! intercepts every mutating operation so the owner's stored id-array stays
//! synchronized and reciprocal attributes are propagated. Only the
//! operations below are exposed; anything broader would let the two
//! sequences drift.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};
use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use crate::associations::metadata::Association;
use crate::associations::{propagation, resolver};
use crate::document::{CachedRelation, Document, DocumentInner};
use crate::error::{ModelError, ModelResult};
use crate::store::DocumentStore;

#[derive(Clone, Copy)]
enum Slot {
    Last,
    First,
    At(usize),
}

struct ProxyState {
    association: Arc<Association>,
    owner: Weak<RefCell<DocumentInner>>,
    entries: Vec<Option<Document>>,
}

/// Synchronized wrapper around the resolved documents of one
/// `collection_of` attribute
#[derive(Clone)]
pub struct CollectionProxy {
    inner: Rc<RefCell<ProxyState>>,
}

impl CollectionProxy {
    /// Wrap an object sequence, replacing the owner's stored id-array with
    /// one rebuilt from the sequence. Every element must already be
    /// persisted.
    pub(crate) fn new(
        objects: Vec<Document>,
        association: Arc<Association>,
        owner: &Document,
    ) -> ModelResult<Self> {
        let mut ids = Vec::with_capacity(objects.len());
        for object in &objects {
            let id = object.id().ok_or_else(|| ModelError::UnsavedDocument {
                model: owner.model_name(),
                attribute: association.attribute.clone(),
            })?;
            ids.push(Value::String(id));
        }
        owner.replace_fk_array(&association.foreign_key, ids);
        Ok(Self {
            inner: Rc::new(RefCell::new(ProxyState {
                association,
                owner: owner.downgrade(),
                entries: objects.into_iter().map(Some).collect(),
            })),
        })
    }

    /// The attribute this proxy synchronizes
    pub fn attribute(&self) -> String {
        self.inner.borrow().association.attribute.clone()
    }

    /// Append a document at the end
    pub fn push(&self, object: &Document) -> ModelResult<()> {
        self.insert_with(object, Slot::Last)
    }

    /// Insert a document at the front
    pub fn unshift(&self, object: &Document) -> ModelResult<()> {
        self.insert_with(object, Slot::First)
    }

    /// Assign a document at an index, growing both sequences with empty
    /// slots when the index is beyond the current length
    pub fn set_at(&self, index: usize, object: &Document) -> ModelResult<()> {
        self.insert_with(object, Slot::At(index))
    }

    /// Remove and return the last document, clearing its reciprocal
    /// attribute and queuing it for cascade save. An empty proxy or an
    /// empty trailing slot yields `None`.
    pub fn pop(&self) -> ModelResult<Option<Document>> {
        let (association, owner) = self.parts()?;
        let entry = {
            let state = self.inner.borrow();
            match state.entries.last() {
                Some(entry) => entry.clone(),
                None => return Ok(None),
            }
        };
        owner.with_fk_array(&association.foreign_key, |ids| {
            ids.pop();
        });
        self.remove_propagate(&association, &owner, &entry)?;
        self.inner.borrow_mut().entries.pop();
        Ok(entry)
    }

    /// Remove and return the first document, clearing its reciprocal
    /// attribute and queuing it for cascade save
    pub fn shift(&self) -> ModelResult<Option<Document>> {
        let (association, owner) = self.parts()?;
        let entry = {
            let state = self.inner.borrow();
            match state.entries.first() {
                Some(entry) => entry.clone(),
                None => return Ok(None),
            }
        };
        owner.with_fk_array(&association.foreign_key, |ids| {
            if !ids.is_empty() {
                ids.remove(0);
            }
        });
        self.remove_propagate(&association, &owner, &entry)?;
        self.inner.borrow_mut().entries.remove(0);
        Ok(entry)
    }

    /// The document at an index, if the slot is occupied
    pub fn get(&self, index: usize) -> Option<Document> {
        self.inner
            .borrow()
            .entries
            .get(index)
            .and_then(Clone::clone)
    }

    /// Sequence length, counting empty slots
    pub fn len(&self) -> usize {
        self.inner.borrow().entries.len()
    }

    /// Whether the sequence is empty
    pub fn is_empty(&self) -> bool {
        self.inner.borrow().entries.is_empty()
    }

    /// The documents in order, skipping empty slots
    pub fn documents(&self) -> Vec<Document> {
        self.inner
            .borrow()
            .entries
            .iter()
            .filter_map(Clone::clone)
            .collect()
    }

    /// Whether the sequence contains a document referring to the same
    /// record
    pub fn contains(&self, object: &Document) -> bool {
        self.inner
            .borrow()
            .entries
            .iter()
            .flatten()
            .any(|entry| entry.is_same(object))
    }

    /// The identifiers of the occupied slots, in order
    pub fn ids(&self) -> Vec<String> {
        self.inner
            .borrow()
            .entries
            .iter()
            .flatten()
            .filter_map(Document::id)
            .collect()
    }

    fn insert_with(&self, object: &Document, slot: Slot) -> ModelResult<()> {
        let (association, owner) = self.parts()?;
        let id = object.id().ok_or_else(|| ModelError::UnsavedDocument {
            model: owner.model_name(),
            attribute: association.attribute.clone(),
        })?;

        owner.with_fk_array(&association.foreign_key, |ids| match slot {
            Slot::Last => ids.push(Value::String(id)),
            Slot::First => ids.insert(0, Value::String(id)),
            Slot::At(index) => {
                if index >= ids.len() {
                    ids.resize(index + 1, Value::Null);
                }
                ids[index] = Value::String(id);
            }
        });
        propagation::set_back_association(
            object,
            Some(&owner),
            &owner.model_name(),
            association.reverse_association.as_deref(),
        )?;
        owner.enqueue_dirty(object);
        debug!(
            owner = %owner.model_name(),
            attribute = %association.attribute,
            "added document to collection"
        );

        let mut state = self.inner.borrow_mut();
        match slot {
            Slot::Last => state.entries.push(Some(object.clone())),
            Slot::First => state.entries.insert(0, Some(object.clone())),
            Slot::At(index) => {
                if index >= state.entries.len() {
                    state.entries.resize_with(index + 1, || None);
                }
                state.entries[index] = Some(object.clone());
            }
        }
        Ok(())
    }

    fn remove_propagate(
        &self,
        association: &Arc<Association>,
        owner: &Document,
        entry: &Option<Document>,
    ) -> ModelResult<()> {
        if let Some(object) = entry {
            propagation::set_back_association(
                object,
                None,
                &owner.model_name(),
                association.reverse_association.as_deref(),
            )?;
            owner.enqueue_dirty(object);
            debug!(
                owner = %owner.model_name(),
                attribute = %association.attribute,
                "removed document from collection"
            );
        }
        Ok(())
    }

    fn parts(&self) -> ModelResult<(Arc<Association>, Document)> {
        let state = self.inner.borrow();
        let owner = state
            .owner
            .upgrade()
            .map(Document::from_inner)
            .ok_or_else(|| {
                ModelError::Configuration(format!(
                    "collection '{}' outlived its owning document",
                    state.association.attribute
                ))
            })?;
        Ok((state.association.clone(), owner))
    }
}

impl fmt::Debug for CollectionProxy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.borrow();
        f.debug_struct("CollectionProxy")
            .field("attribute", &state.association.attribute)
            .field("len", &state.entries.len())
            .finish()
    }
}

impl Document {
    /// Read a declared multi-valued association: the cached proxy when one
    /// exists, otherwise a proxy materialized by resolving every stored id
    pub fn collection(
        &self,
        db: &dyn DocumentStore,
        attribute: &str,
    ) -> ModelResult<CollectionProxy> {
        self.materialize_collection(db, attribute, false)
    }

    /// Re-derive the proxy from the current stored id-array, discarding any
    /// cached sequence that has drifted from it
    pub fn collection_reloaded(
        &self,
        db: &dyn DocumentStore,
        attribute: &str,
    ) -> ModelResult<CollectionProxy> {
        self.materialize_collection(db, attribute, true)
    }

    /// Replace the whole association with a new object sequence, wrapping
    /// it in a fresh proxy and rebuilding the stored id-array
    pub fn replace_collection(
        &self,
        attribute: &str,
        objects: Vec<Document>,
    ) -> ModelResult<CollectionProxy> {
        let association = self.collection_association(attribute)?;
        let proxy = CollectionProxy::new(objects, association, self)?;
        self.cache_relation(attribute, CachedRelation::Collection(proxy.clone()));
        Ok(proxy)
    }

    fn materialize_collection(
        &self,
        db: &dyn DocumentStore,
        attribute: &str,
        reload: bool,
    ) -> ModelResult<CollectionProxy> {
        let association = self.collection_association(attribute)?;
        if !reload {
            if let Some(CachedRelation::Collection(proxy)) = self.cached_relation(attribute) {
                return Ok(proxy);
            }
        }

        let mut objects = Vec::new();
        if let Value::Array(ids) = self.attribute(&association.foreign_key) {
            for value in ids {
                if let Value::String(id) = value {
                    objects.push(resolver::resolve(db, self, &association, &id)?);
                }
            }
        }
        let proxy = CollectionProxy::new(objects, association, self)?;
        self.cache_relation(attribute, CachedRelation::Collection(proxy.clone()));
        Ok(proxy)
    }

    fn collection_association(&self, attribute: &str) -> ModelResult<Arc<Association>> {
        let model = self.model();
        let association = model
            .association(attribute)
            .ok_or_else(|| ModelError::UnknownAssociation {
                model: model.name().to_string(),
                attribute: attribute.to_string(),
            })?;
        if !association.kind.is_collection() {
            return Err(ModelError::Configuration(format!(
                "association '{}' on model '{}' is not a collection",
                attribute,
                model.name()
            )));
        }
        Ok(association.clone())
    }
}
