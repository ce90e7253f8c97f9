//! Back-association propagation
//!
//! When one side of a relationship is mutated through an accessor, the
//! reciprocal attribute on the other document is updated here. The lookup
//! is typed: candidates are matched against the target model's declared
//! associations, never against raw property names. Associations need not
//! be mutual (a missing derived reverse is a no-op), but an explicitly
//! named reverse that does not exist is a configuration mistake and fails.

use std::sync::Arc;

use serde_json::Value;
use tracing::trace;

use crate::associations::metadata::Association;
use crate::document::Document;
use crate::error::{ModelError, ModelResult};
use crate::inflection::{pluralize, singularize, underscore};
use crate::model::ModelType;

/// Point `target`'s reciprocal attribute at `back_to` (or clear it when
/// `back_to` is `None`).
///
/// The reciprocal attribute is found by the explicit
/// `reverse_association` name when one was declared, otherwise by the
/// underscored name of the originating model. A reciprocal id-array gets
/// the identifier pushed in place (clears on the collection side belong to
/// the collection proxy, not here); a reciprocal single id is assigned or
/// cleared through the checked attribute path, resetting the target's
/// relation cache for that attribute.
pub fn set_back_association(
    target: &Document,
    back_to: Option<&Document>,
    origin_model: &str,
    reverse_association: Option<&str>,
) -> ModelResult<()> {
    let model = target.model();
    let association = match reverse_association {
        Some(name) => {
            Some(
                find_named(&model, name).ok_or_else(|| ModelError::UnknownReverseAssociation {
                    model: model.name().to_string(),
                    name: name.to_string(),
                })?,
            )
        }
        None => find_derived(&model, origin_model),
    };
    let Some(association) = association else {
        trace!(
            target = %model.name(),
            origin = %origin_model,
            "no reverse association declared, skipping propagation"
        );
        return Ok(());
    };

    if association.kind.is_collection() {
        // removal on the collection side is the proxy's job
        if let Some(id) = back_to.and_then(Document::id) {
            trace!(
                target = %model.name(),
                attribute = %association.attribute,
                "pushing reverse id onto collection foreign key"
            );
            target.with_fk_array(&association.foreign_key, |ids| ids.push(Value::String(id)));
        }
    } else {
        let value = match back_to.and_then(Document::id) {
            Some(id) => Value::String(id),
            None => Value::Null,
        };
        trace!(
            target = %model.name(),
            attribute = %association.attribute,
            cleared = back_to.is_none(),
            "assigning reverse foreign key"
        );
        target.write_attribute(&association.foreign_key, value)?;
    }
    Ok(())
}

/// Match an explicitly named reverse: by attribute name, or by the foreign
/// key the name would derive to.
fn find_named(model: &ModelType, name: &str) -> Option<Arc<Association>> {
    let singular = singularize(name);
    let id_key = format!("{}_id", singular);
    let ids_key = format!("{}_ids", singular);
    model
        .associations()
        .iter()
        .find(|a| a.attribute == name || a.foreign_key == id_key || a.foreign_key == ids_key)
        .cloned()
}

/// Match the default reverse derived from the originating model's name,
/// in singular or plural form.
fn find_derived(model: &ModelType, origin_model: &str) -> Option<Arc<Association>> {
    let singular = singularize(&underscore(origin_model));
    let plural = pluralize(&singular);
    let id_key = format!("{}_id", singular);
    let ids_key = format!("{}_ids", singular);
    model
        .associations()
        .iter()
        .find(|a| {
            a.attribute == singular
                || a.attribute == plural
                || a.foreign_key == id_key
                || a.foreign_key == ids_key
        })
        .cloned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::associations::AssociationOptions;
    use crate::model::{ModelType, PropertyKind};
    use serde_json::{json, Map};

    fn wife() -> Document {
        let model = ModelType::builder("Wife")
            .property("name", PropertyKind::String)
            .belongs_to("husband")
            .build()
            .unwrap();
        Document::hydrate(&model, "w1".to_string(), Map::new())
    }

    fn parent() -> Document {
        let model = ModelType::builder("Parent")
            .belongs_to_with(
                "wife",
                AssociationOptions::new()
                    .class_name("parent")
                    .reverse_association("husband"),
            )
            .collection_of_with("children", AssociationOptions::new().class_name("Kid"))
            .build()
            .unwrap();
        Document::hydrate(&model, "p1".to_string(), Map::new())
    }

    fn husband() -> Document {
        let model = ModelType::builder("Husband")
            .belongs_to("wife")
            .build()
            .unwrap();
        Document::hydrate(&model, "h1".to_string(), Map::new())
    }

    #[test]
    fn test_derived_reverse_assigns_single_foreign_key() {
        let wife = wife();
        let husband = husband();
        set_back_association(&wife, Some(&husband), "Husband", None).unwrap();
        assert_eq!(wife.attribute("husband_id"), json!("h1"));

        set_back_association(&wife, None, "Husband", None).unwrap();
        assert_eq!(wife.attribute("husband_id"), Value::Null);
    }

    #[test]
    fn test_missing_derived_reverse_is_a_no_op() {
        let wife = wife();
        let pet_model = ModelType::builder("Pet").build().unwrap();
        let pet = Document::hydrate(&pet_model, "x1".to_string(), Map::new());
        set_back_association(&wife, Some(&pet), "Pet", None).unwrap();
        assert_eq!(wife.attribute("pet_id"), Value::Null);
    }

    #[test]
    fn test_named_reverse_pushes_onto_collection_foreign_key() {
        let parent = parent();
        let kid_model = ModelType::builder("Kid").build().unwrap();
        let kid = Document::hydrate(&kid_model, "k1".to_string(), Map::new());
        set_back_association(&parent, Some(&kid), "Kid", Some("children")).unwrap();
        assert_eq!(parent.attribute("child_ids"), json!(["k1"]));

        // clears on the collection side are left to the proxy
        set_back_association(&parent, None, "Kid", Some("children")).unwrap();
        assert_eq!(parent.attribute("child_ids"), json!(["k1"]));
    }

    #[test]
    fn test_named_reverse_must_exist() {
        let wife = wife();
        let husband = husband();
        let result = set_back_association(&wife, Some(&husband), "Husband", Some("boss"));
        assert!(matches!(
            result,
            Err(ModelError::UnknownReverseAssociation { .. })
        ));
    }

    #[test]
    fn test_unsaved_origin_contributes_no_collection_id() {
        let parent = parent();
        let kid_model = ModelType::builder("Kid").build().unwrap();
        let kid = Document::new(&kid_model);
        set_back_association(&parent, Some(&kid), "Kid", Some("children")).unwrap();
        assert_eq!(parent.attribute("child_ids"), Value::Null);
    }
}
