//! Typed attribute declarations for schema-less documents
//!
//! Documents store `serde_json` values; properties give each declared
//! attribute a name, an expected shape, and a readonly flag. Foreign-key
//! id-arrays are installed readonly so they can only be mutated through the
//! collection proxy.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ModelError, ModelResult};

/// Expected value shape for a declared attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PropertyKind {
    /// A string value, including document identifiers
    String,
    /// A numeric value
    Number,
    /// A boolean value
    Bool,
    /// An array of string values, including identifier arrays
    StringList,
}

impl PropertyKind {
    /// Returns true if this kind holds multiple values
    pub fn is_list(self) -> bool {
        matches!(self, Self::StringList)
    }
}

/// A declared, typed attribute on a model type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    /// Attribute name as stored on the document
    pub name: String,
    /// Expected value shape
    pub kind: PropertyKind,
    /// Readonly attributes may only be written by the engine itself
    pub readonly: bool,
}

impl Property {
    /// Declare a writable property
    pub fn new(name: impl Into<String>, kind: PropertyKind) -> Self {
        Self {
            name: name.into(),
            kind,
            readonly: false,
        }
    }

    /// Declare a readonly property
    pub fn readonly(name: impl Into<String>, kind: PropertyKind) -> Self {
        Self {
            name: name.into(),
            kind,
            readonly: true,
        }
    }

    /// Check a candidate value against the declared shape. `Null` always
    /// passes; attributes are clearable regardless of kind.
    pub fn check_value(&self, value: &Value) -> ModelResult<()> {
        let ok = match (self.kind, value) {
            (_, Value::Null) => true,
            (PropertyKind::String, Value::String(_)) => true,
            (PropertyKind::Number, Value::Number(_)) => true,
            (PropertyKind::Bool, Value::Bool(_)) => true,
            (PropertyKind::StringList, Value::Array(items)) => items
                .iter()
                .all(|item| matches!(item, Value::String(_) | Value::Null)),
            _ => false,
        };
        if ok {
            Ok(())
        } else {
            Err(ModelError::Validation(format!(
                "value for property '{}' does not match {:?}",
                self.name, self.kind
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_check_value_accepts_matching_shapes() {
        let name = Property::new("name", PropertyKind::String);
        assert!(name.check_value(&json!("mummy")).is_ok());
        assert!(name.check_value(&Value::Null).is_ok());

        let ids = Property::readonly("child_ids", PropertyKind::StringList);
        assert!(ids.check_value(&json!(["a", "b"])).is_ok());
        assert!(ids.check_value(&json!(["a", null])).is_ok());
    }

    #[test]
    fn test_check_value_rejects_mismatches() {
        let name = Property::new("name", PropertyKind::String);
        assert!(name.check_value(&json!(42)).is_err());

        let ids = Property::new("child_ids", PropertyKind::StringList);
        assert!(ids.check_value(&json!("not-an-array")).is_err());
        assert!(ids.check_value(&json!([1, 2])).is_err());
    }

    #[test]
    fn test_readonly_flag() {
        assert!(!Property::new("name", PropertyKind::String).readonly);
        assert!(Property::readonly("pet_ids", PropertyKind::StringList).readonly);
    }
}
