use indexmap::IndexMap;
use lazy_static::lazy_static;
use serde::Deserialize;

use formgrid_schema::{Category, ElementConfig, PropertyMap};

use crate::registry::RegistryError;

const CATALOG_YAML: &str = include_str!("../data/catalog.yaml");

lazy_static! {
    /// The built-in catalog, parsed and expanded once.
    static ref BUILTIN_CATALOG: IndexMap<String, ElementConfig> =
        parse_catalog(CATALOG_YAML).expect("embedded element catalog is well-formed");
}

/// Fresh copy of the built-in catalog. Every registry instance owns its own
/// copy, so replacing one registry's catalog never affects another.
pub fn builtin_catalog() -> IndexMap<String, ElementConfig> {
    BUILTIN_CATALOG.clone()
}

/// Reusable block of definitions that element entries pull in by name.
#[derive(Debug, Clone, Default, Deserialize)]
struct Fragment {
    #[serde(default)]
    properties: PropertyMap,
    #[serde(default)]
    meta: PropertyMap,
    #[serde(default)]
    events: PropertyMap,
    #[serde(default)]
    alpine: PropertyMap,
}

/// Catalog entry as written in the data file: no `id` (the map key is the
/// id) plus an optional `include` list of fragment names.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawElement {
    html_tag: String,
    label: String,
    #[serde(default)]
    icon: String,
    category: Category,
    #[serde(default)]
    include: Vec<String>,
    #[serde(default)]
    properties: PropertyMap,
    #[serde(default)]
    meta: PropertyMap,
    #[serde(default)]
    events: PropertyMap,
    #[serde(default)]
    alpine: PropertyMap,
}

#[derive(Debug, Deserialize)]
struct RawCatalog {
    #[serde(default)]
    fragments: IndexMap<String, Fragment>,
    elements: IndexMap<String, RawElement>,
}

/// Parse a catalog document and expand every `include` reference. Fragment
/// sections are merged in include order; an entry's own keys win on clash.
pub(crate) fn parse_catalog(
    source: &str,
) -> Result<IndexMap<String, ElementConfig>, RegistryError> {
    let raw: RawCatalog =
        serde_yaml::from_str(source).map_err(|e| RegistryError::Parse(e.to_string()))?;
    let mut catalog = IndexMap::with_capacity(raw.elements.len());
    for (id, element) in raw.elements {
        let config = expand_element(&id, element, &raw.fragments)?;
        catalog.insert(id, config);
    }
    Ok(catalog)
}

fn expand_element(
    id: &str,
    raw: RawElement,
    fragments: &IndexMap<String, Fragment>,
) -> Result<ElementConfig, RegistryError> {
    let mut properties = PropertyMap::new();
    let mut meta = PropertyMap::new();
    let mut events = PropertyMap::new();
    let mut alpine = PropertyMap::new();

    for name in &raw.include {
        let fragment = fragments
            .get(name)
            .ok_or_else(|| RegistryError::InvalidEntry {
                id: id.to_string(),
                reason: format!("references unknown fragment '{name}'"),
            })?;
        merge_defs(&mut properties, &fragment.properties);
        merge_defs(&mut meta, &fragment.meta);
        merge_defs(&mut events, &fragment.events);
        merge_defs(&mut alpine, &fragment.alpine);
    }
    merge_defs(&mut properties, &raw.properties);
    merge_defs(&mut meta, &raw.meta);
    merge_defs(&mut events, &raw.events);
    merge_defs(&mut alpine, &raw.alpine);

    Ok(ElementConfig {
        id: id.to_string(),
        html_tag: raw.html_tag,
        label: raw.label,
        icon: raw.icon,
        category: raw.category,
        properties,
        meta,
        events,
        alpine,
    })
}

fn merge_defs(into: &mut PropertyMap, from: &PropertyMap) {
    for (key, def) in from {
        into.insert(key.clone(), def.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use formgrid_schema::PropertyType;

    #[test]
    fn test_builtin_catalog_expands() {
        let catalog = builtin_catalog();
        assert_eq!(catalog.len(), 46);
        let text_input = &catalog["text-input"];
        assert_eq!(text_input.html_tag, "input");
        assert_eq!(text_input.category, Category::Form);
        // Sections pulled in from fragments.
        assert!(text_input.meta.contains_key("validation"));
        assert!(text_input.alpine.contains_key("x-model"));
        assert_eq!(
            text_input.properties["type"].property_type,
            PropertyType::Fixed
        );
    }

    #[test]
    fn test_common_events_fragment_is_complete() {
        let catalog = builtin_catalog();
        let events: Vec<&str> = catalog["text-input"]
            .events
            .keys()
            .map(String::as_str)
            .collect();
        assert_eq!(
            events,
            ["change", "input", "focus", "blur", "click", "keydown", "keyup", "submit"]
        );
    }

    #[test]
    fn test_entry_without_includes_stays_bare() {
        let catalog = builtin_catalog();
        let hidden = &catalog["hidden-input"];
        assert!(hidden.meta.is_empty());
        assert!(hidden.events.is_empty());
        assert!(!hidden.has_extended_sections());
    }

    #[test]
    fn test_entry_keys_override_fragment_keys() {
        let source = r#"
fragments:
  shared:
    meta:
      label: { type: text, label: Label, defaultValue: generic }
elements:
  widget:
    htmlTag: div
    label: Widget
    category: content
    include: [shared]
    meta:
      label: { type: text, label: Label, defaultValue: special }
"#;
        let catalog = parse_catalog(source).unwrap();
        assert_eq!(
            catalog["widget"].meta["label"].default_value,
            serde_json::json!("special")
        );
    }

    #[test]
    fn test_unknown_fragment_is_an_error() {
        let source = r#"
elements:
  widget:
    htmlTag: div
    label: Widget
    category: content
    include: [does-not-exist]
"#;
        let err = parse_catalog(source).unwrap_err();
        match err {
            RegistryError::InvalidEntry { id, reason } => {
                assert_eq!(id, "widget");
                assert!(reason.contains("does-not-exist"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_every_category_is_populated() {
        let catalog = builtin_catalog();
        for category in Category::ALL {
            assert!(
                catalog.values().any(|c| c.category == category),
                "no entries for category {category}"
            );
        }
    }
}
