//! # doclink: document associations for schema-less stores
//!
//! Emulates relational `belongs_to` / `collection_of` associations on top
//! of a document store with no native foreign keys or joins. Declaring an
//! association on a model type installs a stored foreign-key attribute and
//! accessor descriptors; reading an accessor lazily resolves the related
//! document(s) from stored ids; writing one keeps the forward id(s), the
//! reciprocal attribute on the related document, and the owner's
//! cascade-save queue consistent.
//!
//! Execution is single-threaded and synchronous: nothing here locks, and
//! concurrent access to one document instance must be serialized by the
//! caller. The two sides of a relationship are not updated transactionally;
//! a crash between the foreign-key write and the cascade save can leave one
//! side stale until it is re-saved.

pub mod associations;
pub mod document;
pub mod error;
pub mod inflection;
pub mod model;
pub mod store;

// Re-export core types
pub use associations::{
    set_back_association, Association, AssociationKind, AssociationOptions, BelongsToAccessor,
    CollectionProxy, ResolutionTarget,
};
pub use document::{Document, DocumentId};
pub use error::{ModelError, ModelResult};
pub use model::{ModelRegistry, ModelType, ModelTypeBuilder, Property, PropertyKind};
pub use store::{DocumentStore, MemoryStore, StoreError};
