//! English inflection helpers for derived association names
//!
//! Foreign keys, class names, and proxy names are derived from attribute
//! names, so the engine carries a small English-centric inflector plus the
//! irregular forms its own naming conventions run into.

/// Irregular singular/plural pairs the derivation rules cannot produce.
const IRREGULARS: &[(&str, &str)] = &[
    ("child", "children"),
    ("person", "people"),
    ("wife", "wives"),
    ("life", "lives"),
];

/// Pluralize a name (English-centric). Already-plural names are a fixed
/// point, so derived proxy names and stored id-array keys are never
/// pluralized twice.
pub fn pluralize(name: &str) -> String {
    for (singular, plural) in IRREGULARS {
        if name == *singular {
            return (*plural).to_string();
        }
        if name == *plural {
            return (*plural).to_string();
        }
    }
    let singular = singularize(name);
    if singular != name && plural_suffix(&singular) == name {
        return name.to_string();
    }
    plural_suffix(name)
}

fn plural_suffix(name: &str) -> String {
    if name.ends_with('y') && !ends_with_vowel_y(name) {
        format!("{}ies", &name[..name.len() - 1])
    } else if name.ends_with('s')
        || name.ends_with("sh")
        || name.ends_with("ch")
        || name.ends_with('x')
        || name.ends_with('z')
    {
        format!("{}es", name)
    } else {
        format!("{}s", name)
    }
}

/// Singularize a name (English-centric)
pub fn singularize(name: &str) -> String {
    for (singular, plural) in IRREGULARS {
        if name == *plural {
            return (*singular).to_string();
        }
        if name == *singular {
            return (*singular).to_string();
        }
    }
    if name.ends_with("ies") {
        format!("{}y", &name[..name.len() - 3])
    } else if name.ends_with("ses")
        || name.ends_with("ches")
        || name.ends_with("shes")
        || name.ends_with("xes")
        || name.ends_with("zes")
    {
        name[..name.len() - 2].to_string()
    } else if name.ends_with('s') && name.len() > 1 {
        name[..name.len() - 1].to_string()
    } else {
        name.to_string()
    }
}

/// Convert a snake_case name to CamelCase (e.g. `super_power` -> `SuperPower`).
/// Names that are already CamelCase pass through unchanged.
pub fn camelize(name: &str) -> String {
    let mut result = String::with_capacity(name.len());
    for part in name.split('_') {
        let mut chars = part.chars();
        if let Some(first) = chars.next() {
            result.extend(first.to_uppercase());
            result.extend(chars);
        }
    }
    result
}

/// Convert a CamelCase name to snake_case (e.g. `SuperPower` -> `super_power`)
pub fn underscore(name: &str) -> String {
    let mut result = String::with_capacity(name.len() + 4);
    for (i, c) in name.chars().enumerate() {
        if c.is_uppercase() {
            if i > 0 {
                result.push('_');
            }
            result.extend(c.to_lowercase());
        } else {
            result.push(c);
        }
    }
    result
}

fn ends_with_vowel_y(name: &str) -> bool {
    name.ends_with("ay")
        || name.ends_with("ey")
        || name.ends_with("iy")
        || name.ends_with("oy")
        || name.ends_with("uy")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pluralize() {
        assert_eq!(pluralize("group"), "groups");
        assert_eq!(pluralize("category"), "categories");
        assert_eq!(pluralize("box"), "boxes");
        assert_eq!(pluralize("child"), "children");
        assert_eq!(pluralize("children"), "children");
        assert_eq!(pluralize("wife"), "wives");
        assert_eq!(pluralize("day"), "days");
    }

    #[test]
    fn test_pluralize_is_idempotent() {
        assert_eq!(pluralize("pets"), "pets");
        assert_eq!(pluralize("groups"), "groups");
        assert_eq!(pluralize("categories"), "categories");
        assert_eq!(pluralize("boxes"), "boxes");
        assert_eq!(pluralize("group_ids"), "group_ids");
        assert_eq!(pluralize(&pluralize("pet")), "pets");
    }

    #[test]
    fn test_singularize() {
        assert_eq!(singularize("groups"), "group");
        assert_eq!(singularize("categories"), "category");
        assert_eq!(singularize("boxes"), "box");
        assert_eq!(singularize("children"), "child");
        assert_eq!(singularize("child"), "child");
        assert_eq!(singularize("wives"), "wife");
        assert_eq!(singularize("pets"), "pet");
    }

    #[test]
    fn test_camelize() {
        assert_eq!(camelize("super_power"), "SuperPower");
        assert_eq!(camelize("wife"), "Wife");
        assert_eq!(camelize("Kid"), "Kid");
        assert_eq!(camelize("SuperPower"), "SuperPower");
    }

    #[test]
    fn test_underscore() {
        assert_eq!(underscore("SuperPower"), "super_power");
        assert_eq!(underscore("Parent"), "parent");
        assert_eq!(underscore("kid"), "kid");
    }

    #[test]
    fn test_foreign_key_round_trip() {
        // derivation used by collection_of: singular + "_id", then pluralized
        let fk = format!("{}_id", singularize("children"));
        assert_eq!(pluralize(&fk), "child_ids");
    }
}
