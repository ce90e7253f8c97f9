//! Associations Module - the synchronization engine
//!
//! - `metadata`: association descriptors and default derivation
//! - `resolver`: foreign-key id -> document resolution
//! - `belongs_to`: single-reference accessors
//! - `collection`: the synchronized collection proxy
//! - `propagation`: reciprocal-attribute updates
//! - `dirty`: the per-document cascade-save queue

pub mod belongs_to;
pub mod collection;
pub mod dirty;
pub mod metadata;
pub mod propagation;
pub mod resolver;

pub use belongs_to::BelongsToAccessor;
pub use collection::CollectionProxy;
pub use dirty::DirtyQueue;
pub use metadata::{Association, AssociationKind, AssociationOptions, ResolutionTarget};
pub use propagation::set_back_association;
pub use resolver::resolve;
