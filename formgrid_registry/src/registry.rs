use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use serde_json::Value;
use thiserror::Error;

use formgrid_schema::{Category, ElementConfig};

use crate::catalog::builtin_catalog;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("unknown element type '{0}'")]
    UnknownElement(String),
    #[error("invalid registry entry '{id}': {reason}")]
    InvalidEntry { id: String, reason: String },
    #[error("unsupported registry format '.{0}', expected .json, .yaml or .yml")]
    UnsupportedFormat(String),
    #[error("failed to read registry file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse registry data: {0}")]
    Parse(String),
}

/// Catalog of element types available to a builder instance.
///
/// A new registry starts with the built-in catalog; consumers can register
/// additional types or replace the whole catalog with a validated custom one.
pub struct ElementRegistry {
    elements: IndexMap<String, ElementConfig>,
}

impl Default for ElementRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ElementRegistry {
    /// Registry preloaded with the built-in catalog.
    pub fn new() -> Self {
        ElementRegistry {
            elements: builtin_catalog(),
        }
    }

    /// Registry with no entries at all.
    pub fn empty() -> Self {
        ElementRegistry {
            elements: IndexMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Insert or overwrite an entry under its own id.
    pub fn register(&mut self, config: ElementConfig) {
        self.elements.insert(config.id.clone(), config);
    }

    pub fn get(&self, id: &str) -> Option<&ElementConfig> {
        self.elements.get(id)
    }

    /// Lookup for operations that must abort when the type is missing.
    pub fn get_or_err(&self, id: &str) -> Result<&ElementConfig, RegistryError> {
        self.elements
            .get(id)
            .ok_or_else(|| RegistryError::UnknownElement(id.to_string()))
    }

    /// Every entry, in registration order.
    pub fn get_all(&self) -> Vec<&ElementConfig> {
        self.elements.values().collect()
    }

    pub fn get_by_category(&self, category: Category) -> Vec<&ElementConfig> {
        self.elements
            .values()
            .filter(|c| c.category == category)
            .collect()
    }

    /// Replace the whole catalog with `entries` after validating every one of
    /// them. On the first invalid entry the load aborts and the current
    /// catalog is left untouched.
    pub fn load_custom_registry(
        &mut self,
        entries: IndexMap<String, ElementConfig>,
    ) -> Result<(), RegistryError> {
        for (key, config) in &entries {
            validate_entry(key, config)?;
        }
        log::info!("replacing element catalog with {} custom entries", entries.len());
        self.elements = entries;
        Ok(())
    }

    /// Load a custom registry from a JSON or YAML file, picked by extension,
    /// then apply it with the same validation as [`Self::load_custom_registry`].
    pub fn load_custom_registry_file(&mut self, path: impl AsRef<Path>) -> Result<(), RegistryError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        let raw: IndexMap<String, Value> = match extension.as_str() {
            "json" => serde_json::from_str(&content)
                .map_err(|e| RegistryError::Parse(e.to_string()))?,
            "yaml" | "yml" => serde_yaml::from_str(&content)
                .map_err(|e| RegistryError::Parse(e.to_string()))?,
            other => return Err(RegistryError::UnsupportedFormat(other.to_string())),
        };
        log::debug!("read {} registry entries from {}", raw.len(), path.display());
        self.load_custom_registry(entries_from_values(raw)?)
    }
}

/// Shape-check raw entries before typed deserialization so errors name the
/// offending entry instead of a byte offset.
fn entries_from_values(
    raw: IndexMap<String, Value>,
) -> Result<IndexMap<String, ElementConfig>, RegistryError> {
    let mut entries = IndexMap::with_capacity(raw.len());
    for (id, value) in raw {
        if !value.is_object() {
            return Err(RegistryError::InvalidEntry {
                id,
                reason: "entry must be a map".to_string(),
            });
        }
        for section in ["properties", "meta", "events", "alpine"] {
            if let Some(section_value) = value.get(section) {
                if !section_value.is_object() {
                    return Err(RegistryError::InvalidEntry {
                        id,
                        reason: format!("'{section}' must be a map"),
                    });
                }
            }
        }
        let config: ElementConfig =
            serde_json::from_value(value).map_err(|e| RegistryError::InvalidEntry {
                id: id.clone(),
                reason: e.to_string(),
            })?;
        entries.insert(id, config);
    }
    Ok(entries)
}

fn validate_entry(key: &str, config: &ElementConfig) -> Result<(), RegistryError> {
    if config.id.trim().is_empty() {
        return Err(RegistryError::InvalidEntry {
            id: key.to_string(),
            reason: "missing id".to_string(),
        });
    }
    if config.id != key {
        return Err(RegistryError::InvalidEntry {
            id: key.to_string(),
            reason: format!("id '{}' does not match its registry key", config.id),
        });
    }
    if config.html_tag.trim().is_empty() {
        return Err(RegistryError::InvalidEntry {
            id: key.to_string(),
            reason: "missing htmlTag".to_string(),
        });
    }
    if config.label.trim().is_empty() {
        return Err(RegistryError::InvalidEntry {
            id: key.to_string(),
            reason: "missing label".to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    use formgrid_schema::{PropertyDef, PropertyType};
    use serde_json::json;

    fn custom_config(id: &str, tag: &str) -> ElementConfig {
        let mut properties = formgrid_schema::PropertyMap::new();
        properties.insert(
            "name".to_string(),
            PropertyDef::new(PropertyType::Text, "Name"),
        );
        ElementConfig {
            id: id.to_string(),
            html_tag: tag.to_string(),
            label: format!("Custom {id}"),
            icon: String::new(),
            category: Category::Form,
            properties,
            meta: formgrid_schema::PropertyMap::new(),
            events: formgrid_schema::PropertyMap::new(),
            alpine: formgrid_schema::PropertyMap::new(),
        }
    }

    #[test]
    fn test_new_registry_carries_builtin_catalog() {
        let registry = ElementRegistry::new();
        assert_eq!(registry.len(), 46);
        assert!(registry.get("text-input").is_some());
        assert!(registry.get("no-such-element").is_none());
    }

    #[test]
    fn test_custom_load_replaces_catalog_exactly() {
        let mut registry = ElementRegistry::new();
        let mut entries = IndexMap::new();
        entries.insert("badge-input".to_string(), custom_config("badge-input", "input"));
        entries.insert("rating".to_string(), custom_config("rating", "div"));

        registry.load_custom_registry(entries).unwrap();

        let ids: Vec<&str> = registry.get_all().iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, ["badge-input", "rating"]);
        assert!(registry.get("text-input").is_none());
    }

    #[test]
    fn test_invalid_entry_aborts_load_and_keeps_catalog() {
        let mut registry = ElementRegistry::new();
        let mut entries = IndexMap::new();
        entries.insert("good".to_string(), custom_config("good", "input"));
        entries.insert("bad".to_string(), custom_config("bad", ""));

        let err = registry.load_custom_registry(entries).unwrap_err();
        match err {
            RegistryError::InvalidEntry { id, reason } => {
                assert_eq!(id, "bad");
                assert!(reason.contains("htmlTag"));
            }
            other => panic!("unexpected error: {other}"),
        }
        // Previous catalog still readable, including the built-ins.
        assert_eq!(registry.len(), 46);
        assert!(registry.get("text-input").is_some());
        assert!(registry.get("good").is_none());
    }

    #[test]
    fn test_key_id_mismatch_is_rejected() {
        let mut registry = ElementRegistry::new();
        let mut entries = IndexMap::new();
        entries.insert("alias".to_string(), custom_config("real-id", "input"));

        let err = registry.load_custom_registry(entries).unwrap_err();
        match err {
            RegistryError::InvalidEntry { id, reason } => {
                assert_eq!(id, "alias");
                assert!(reason.contains("real-id"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_get_or_err_names_the_missing_type() {
        let registry = ElementRegistry::new();
        let err = registry.get_or_err("vanished").unwrap_err();
        assert!(err.to_string().contains("vanished"));
    }

    #[test]
    fn test_get_by_category_filters() {
        let registry = ElementRegistry::new();
        let media = registry.get_by_category(Category::Media);
        assert!(!media.is_empty());
        assert!(media.iter().all(|c| c.category == Category::Media));
        assert!(media.iter().any(|c| c.id == "image"));
    }

    #[test]
    fn test_register_overwrites_by_id() {
        let mut registry = ElementRegistry::empty();
        registry.register(custom_config("rating", "div"));
        registry.register(custom_config("rating", "span"));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("rating").unwrap().html_tag, "span");
    }

    #[test]
    fn test_load_registry_from_json_file() {
        let entries = json!({
            "rating": {
                "id": "rating",
                "htmlTag": "div",
                "label": "Rating",
                "category": "form",
                "properties": {
                    "stars": { "type": "number", "label": "Stars", "defaultValue": 5 }
                }
            }
        });
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, "{entries}").unwrap();

        let mut registry = ElementRegistry::new();
        registry.load_custom_registry_file(file.path()).unwrap();
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("rating").unwrap().label, "Rating");
    }

    #[test]
    fn test_load_registry_from_yaml_file() {
        let raw = r#"
rating:
  id: rating
  htmlTag: div
  label: Rating
  category: form
  properties:
    stars: { type: number, label: Stars, defaultValue: 5 }
"#;
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        write!(file, "{raw}").unwrap();

        let mut registry = ElementRegistry::new();
        registry.load_custom_registry_file(file.path()).unwrap();
        assert_eq!(registry.get("rating").unwrap().properties["stars"].default_value, json!(5));
    }

    #[test]
    fn test_unsupported_registry_extension() {
        let file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        let mut registry = ElementRegistry::new();
        let err = registry.load_custom_registry_file(file.path()).unwrap_err();
        assert!(matches!(err, RegistryError::UnsupportedFormat(ext) if ext == "toml"));
    }

    #[test]
    fn test_non_map_section_is_rejected_with_entry_id() {
        let raw = json!({
            "broken": {
                "id": "broken",
                "htmlTag": "div",
                "label": "Broken",
                "category": "form",
                "properties": "not-a-map"
            }
        });
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, "{raw}").unwrap();

        let mut registry = ElementRegistry::new();
        let err = registry.load_custom_registry_file(file.path()).unwrap_err();
        match err {
            RegistryError::InvalidEntry { id, reason } => {
                assert_eq!(id, "broken");
                assert!(reason.contains("properties"));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(registry.len(), 46);
    }
}
