//! Association descriptors and default derivation
//!
//! An [`Association`] is the immutable record of one declared edge between
//! model types. Descriptors are computed once at model-definition time;
//! everything the accessors, proxy, and propagation need at runtime is
//! derived here.

use serde::{Deserialize, Serialize};

use crate::inflection::{camelize, pluralize, singularize};

/// The kind of declared association
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssociationKind {
    /// Single-valued reference backed by a stored id attribute
    BelongsTo,
    /// Multi-valued reference backed by a stored id-array attribute
    CollectionOf,
}

impl AssociationKind {
    /// Returns true if this kind resolves to a collection of documents
    pub fn is_collection(self) -> bool {
        matches!(self, Self::CollectionOf)
    }
}

/// Where the resolver looks up a referenced document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResolutionTarget {
    /// Direct lookup by model type name
    Model(String),
    /// Lookup through the owning proxy document's collection, for model
    /// types that are themselves scoped by another entity
    Through {
        /// The belongs-to attribute on the declaring model that reaches the
        /// proxy owner
        owner_attribute: String,
        /// The proxy owner's collection accessor name
        collection: String,
    },
}

/// Immutable descriptor for one declared association
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Association {
    /// The kind of association
    pub kind: AssociationKind,
    /// Logical relation name (e.g. `wife`, `children`)
    pub attribute: String,
    /// Underlying stored attribute: a singular id, or a pluralized id-array
    pub foreign_key: String,
    /// Related model type name
    pub class_name: String,
    /// Collection accessor name used when resolving through a proxy owner
    pub proxy_name: String,
    /// Where to fetch referenced documents from
    pub resolution_target: ResolutionTarget,
    /// Explicit reciprocal attribute name on the related type, used to
    /// disambiguate when several associations point at the same type
    pub reverse_association: Option<String>,
}

/// Options accepted by `belongs_to` / `collection_of` declarations.
/// Everything left unset is derived from the attribute name.
#[derive(Debug, Clone, Default)]
pub struct AssociationOptions {
    class_name: Option<String>,
    foreign_key: Option<String>,
    proxy_name: Option<String>,
    reverse_association: Option<String>,
    target: Option<ResolutionTarget>,
}

impl AssociationOptions {
    /// Create an empty option set
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the related model type name
    pub fn class_name(mut self, name: impl Into<String>) -> Self {
        self.class_name = Some(name.into());
        self
    }

    /// Override the stored foreign-key attribute name
    pub fn foreign_key(mut self, name: impl Into<String>) -> Self {
        self.foreign_key = Some(name.into());
        self
    }

    /// Override the proxy collection accessor name
    pub fn proxy_name(mut self, name: impl Into<String>) -> Self {
        self.proxy_name = Some(name.into());
        self
    }

    /// Name the reciprocal attribute on the related type
    pub fn reverse_association(mut self, name: impl Into<String>) -> Self {
        self.reverse_association = Some(name.into());
        self
    }

    /// Override the computed resolution target
    pub fn target(mut self, target: ResolutionTarget) -> Self {
        self.target = Some(target);
        self
    }
}

impl Association {
    /// Compute a descriptor from an attribute name, explicit options, and
    /// the declaring model's proxy owner (if any).
    ///
    /// Defaults: the foreign key is the singularized attribute plus an id
    /// suffix (pluralized for collections), the class name is the
    /// camelized singular attribute, and the resolution target is the
    /// related type itself. When the declaring model is proxied by
    /// another entity, resolution instead routes through that owner's
    /// pluralized collection accessor. The association naming the proxy
    /// owner itself always resolves directly.
    pub(crate) fn build(
        kind: AssociationKind,
        attribute: &str,
        options: AssociationOptions,
        proxy_owner: Option<&str>,
    ) -> Self {
        let base = singularize(attribute);
        let class_name = options
            .class_name
            .map(|name| camelize(&singularize(&name)))
            .unwrap_or_else(|| camelize(&base));
        let mut foreign_key = options
            .foreign_key
            .unwrap_or_else(|| format!("{}_id", base));
        if kind.is_collection() {
            foreign_key = pluralize(&foreign_key);
        }
        let proxy_name = options
            .proxy_name
            .unwrap_or_else(|| pluralize(attribute));
        let resolution_target = options.target.unwrap_or_else(|| match proxy_owner {
            Some(owner) if owner != attribute => ResolutionTarget::Through {
                owner_attribute: owner.to_string(),
                collection: proxy_name.clone(),
            },
            _ => ResolutionTarget::Model(class_name.clone()),
        });

        Self {
            kind,
            attribute: attribute.to_string(),
            foreign_key,
            class_name,
            proxy_name,
            resolution_target,
            reverse_association: options.reverse_association,
        }
    }

    /// Returns true if the stored foreign key is an id-array
    pub fn has_collection_foreign_key(&self) -> bool {
        self.kind.is_collection()
    }
}
