//! Model System - declarations for schema-less document types
//!
//! - `property`: typed attribute declarations with the readonly flag
//! - `model_type`: the `ModelType` descriptor and its builder
//! - `registry`: name -> model type lookup

pub mod model_type;
pub mod property;
pub mod registry;

pub use model_type::{ModelType, ModelTypeBuilder};
pub use property::{Property, PropertyKind};
pub use registry::ModelRegistry;
