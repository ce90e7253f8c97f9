//! Error types for the association engine
//!
//! Provides error handling for document access, model declaration,
//! and association synchronization.

use std::fmt;

/// Result type alias for document and association operations
pub type ModelResult<T> = Result<T, ModelError>;

/// Error types for document and association operations
#[derive(Debug, Clone)]
pub enum ModelError {
    /// Storage backend failure
    Storage(String),
    /// Document not found in the store
    NotFound { model: String, id: String },
    /// Attribute is not declared on the model type
    UnknownProperty { model: String, name: String },
    /// Attribute is declared readonly and may only be mutated through the engine
    ReadonlyProperty { model: String, name: String },
    /// Attribute value does not match its declared property type
    Validation(String),
    /// Model or association declaration mistake
    Configuration(String),
    /// Attribute is not a declared association on the model type
    UnknownAssociation { model: String, attribute: String },
    /// An explicitly named reverse association does not exist on the target type
    UnknownReverseAssociation { model: String, name: String },
    /// A document must be saved before it can join a collection
    UnsavedDocument { model: String, attribute: String },
    /// Serialization/deserialization error
    Serialization(String),
}

impl fmt::Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelError::Storage(msg) => write!(f, "Storage error: {}", msg),
            ModelError::NotFound { model, id } => {
                write!(f, "Document '{}' not found for model '{}'", id, model)
            }
            ModelError::UnknownProperty { model, name } => {
                write!(f, "Property '{}' is not declared on model '{}'", name, model)
            }
            ModelError::ReadonlyProperty { model, name } => {
                write!(f, "Property '{}' on model '{}' is readonly", name, model)
            }
            ModelError::Validation(msg) => write!(f, "Validation error: {}", msg),
            ModelError::Configuration(msg) => write!(f, "Configuration error: {}", msg),
            ModelError::UnknownAssociation { model, attribute } => {
                write!(f, "No association '{}' declared on model '{}'", attribute, model)
            }
            ModelError::UnknownReverseAssociation { model, name } => {
                write!(f, "Cannot find reverse association '{}' on model '{}'", name, model)
            }
            ModelError::UnsavedDocument { model, attribute } => write!(
                f,
                "Document cannot be added to {}#{} collection unless saved",
                model, attribute
            ),
            ModelError::Serialization(msg) => write!(f, "Serialization error: {}", msg),
        }
    }
}

impl std::error::Error for ModelError {}

// Convert from serde_json errors
impl From<serde_json::Error> for ModelError {
    fn from(err: serde_json::Error) -> Self {
        ModelError::Serialization(err.to_string())
    }
}
