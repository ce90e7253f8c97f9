//! Model type definitions and the declaration builder
//!
//! A [`ModelType`] is the immutable per-type record of declared properties
//! and associations, built once at definition time. The builder replaces
//! runtime accessor synthesis: every declared association yields a backing
//! foreign-key property here, and the accessors look descriptors up by
//! attribute name at call time.

use std::sync::Arc;

use tracing::debug;

use crate::associations::{Association, AssociationKind, AssociationOptions};
use crate::error::{ModelError, ModelResult};
use crate::model::property::{Property, PropertyKind};
use crate::model::registry::ModelRegistry;

/// Immutable description of one model type: its name, declared properties,
/// and declared associations.
#[derive(Debug)]
pub struct ModelType {
    name: String,
    proxy_owner: Option<String>,
    properties: Vec<Property>,
    associations: Vec<Arc<Association>>,
}

impl ModelType {
    /// Start declaring a new model type
    pub fn builder(name: impl Into<String>) -> ModelTypeBuilder {
        ModelTypeBuilder::new(name)
    }

    /// The model type name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The belongs-to attribute reaching this model's proxy owner, if the
    /// model is scoped by another entity
    pub fn proxy_owner(&self) -> Option<&str> {
        self.proxy_owner.as_deref()
    }

    /// All declared properties, including installed foreign keys
    pub fn properties(&self) -> &[Property] {
        &self.properties
    }

    /// Look up a declared property by name
    pub fn property(&self, name: &str) -> Option<&Property> {
        self.properties.iter().find(|p| p.name == name)
    }

    /// All declared associations, in declaration order
    pub fn associations(&self) -> &[Arc<Association>] {
        &self.associations
    }

    /// Look up a declared association by attribute name
    pub fn association(&self, attribute: &str) -> Option<&Arc<Association>> {
        self.associations.iter().find(|a| a.attribute == attribute)
    }

    /// Look up the association backed by a stored foreign-key attribute
    pub fn association_for_foreign_key(&self, foreign_key: &str) -> Option<&Arc<Association>> {
        self.associations
            .iter()
            .find(|a| a.foreign_key == foreign_key)
    }
}

enum Declaration {
    Property(Property),
    Association {
        kind: AssociationKind,
        attribute: String,
        options: AssociationOptions,
    },
}

/// Accumulates property and association declarations, then builds the
/// immutable [`ModelType`]. Redeclaring an attribute is a build-time error,
/// as is a collision with an installed foreign key.
pub struct ModelTypeBuilder {
    name: String,
    proxy_owner: Option<String>,
    declarations: Vec<Declaration>,
}

impl ModelTypeBuilder {
    /// Start declaring a model type with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            proxy_owner: None,
            declarations: Vec::new(),
        }
    }

    /// Declare a typed attribute
    pub fn property(mut self, name: impl Into<String>, kind: PropertyKind) -> Self {
        self.declarations
            .push(Declaration::Property(Property::new(name, kind)));
        self
    }

    /// Mark this model as scoped by another entity, reachable through the
    /// named belongs-to attribute. Associations declared on a proxied model
    /// resolve through the owner's collection accessors by default.
    pub fn proxied_by(mut self, owner_attribute: impl Into<String>) -> Self {
        self.proxy_owner = Some(owner_attribute.into());
        self
    }

    /// Declare a single-valued reference with derived defaults
    pub fn belongs_to(self, attribute: impl Into<String>) -> Self {
        self.belongs_to_with(attribute, AssociationOptions::new())
    }

    /// Declare a single-valued reference with explicit options
    pub fn belongs_to_with(
        mut self,
        attribute: impl Into<String>,
        options: AssociationOptions,
    ) -> Self {
        self.declarations.push(Declaration::Association {
            kind: AssociationKind::BelongsTo,
            attribute: attribute.into(),
            options,
        });
        self
    }

    /// Declare a multi-valued reference with derived defaults
    pub fn collection_of(self, attribute: impl Into<String>) -> Self {
        self.collection_of_with(attribute, AssociationOptions::new())
    }

    /// Declare a multi-valued reference with explicit options
    pub fn collection_of_with(
        mut self,
        attribute: impl Into<String>,
        options: AssociationOptions,
    ) -> Self {
        self.declarations.push(Declaration::Association {
            kind: AssociationKind::CollectionOf,
            attribute: attribute.into(),
            options,
        });
        self
    }

    /// Build the immutable model type, computing association descriptors and
    /// installing their backing foreign-key properties
    pub fn build(self) -> ModelResult<Arc<ModelType>> {
        let mut properties: Vec<Property> = Vec::new();
        let mut associations: Vec<Arc<Association>> = Vec::new();

        for declaration in self.declarations {
            match declaration {
                Declaration::Property(property) => {
                    Self::check_property_name(&self.name, &properties, &property.name)?;
                    properties.push(property);
                }
                Declaration::Association {
                    kind,
                    attribute,
                    options,
                } => {
                    if associations.iter().any(|a| a.attribute == attribute) {
                        return Err(ModelError::Configuration(format!(
                            "association '{}' is declared twice on model '{}'",
                            attribute, self.name
                        )));
                    }
                    let association =
                        Association::build(kind, &attribute, options, self.proxy_owner.as_deref());
                    Self::check_property_name(&self.name, &properties, &association.foreign_key)?;
                    let backing = if kind.is_collection() {
                        // only the collection proxy may edit the id-array
                        Property::readonly(&association.foreign_key, PropertyKind::StringList)
                    } else {
                        Property::new(&association.foreign_key, PropertyKind::String)
                    };
                    properties.push(backing);
                    debug!(
                        model = %self.name,
                        attribute = %association.attribute,
                        foreign_key = %association.foreign_key,
                        kind = ?association.kind,
                        "declared association"
                    );
                    associations.push(Arc::new(association));
                }
            }
        }

        Ok(Arc::new(ModelType {
            name: self.name,
            proxy_owner: self.proxy_owner,
            properties,
            associations,
        }))
    }

    /// Build the model type and register it under its name
    pub fn register(self, registry: &ModelRegistry) -> ModelResult<Arc<ModelType>> {
        let model = self.build()?;
        registry.register(model.clone())?;
        Ok(model)
    }

    fn check_property_name(
        model: &str,
        properties: &[Property],
        name: &str,
    ) -> ModelResult<()> {
        if properties.iter().any(|p| p.name == name) {
            return Err(ModelError::Configuration(format!(
                "property '{}' is declared twice on model '{}'",
                name, model
            )));
        }
        Ok(())
    }
}
