use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Palette category an element type belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Layout,
    Form,
    Content,
    Media,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Layout,
        Category::Form,
        Category::Content,
        Category::Media,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Layout => "layout",
            Category::Form => "form",
            Category::Content => "content",
            Category::Media => "media",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How a property value is edited in the panel and serialized by renderers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum PropertyType {
    #[default]
    Text,
    Textarea,
    Number,
    Boolean,
    Select,
    Color,
    Event,
    Alpine,
    CssClasses,
    /// Read-only in the panel; renderers still emit the value.
    Fixed,
}

impl PropertyType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PropertyType::Text => "text",
            PropertyType::Textarea => "textarea",
            PropertyType::Number => "number",
            PropertyType::Boolean => "boolean",
            PropertyType::Select => "select",
            PropertyType::Color => "color",
            PropertyType::Event => "event",
            PropertyType::Alpine => "alpine",
            PropertyType::CssClasses => "css-classes",
            PropertyType::Fixed => "fixed",
        }
    }
}

impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The four editable sections of an element: plain HTML attributes, builder
/// metadata, event bindings, and Alpine directives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertySection {
    Properties,
    Meta,
    Events,
    Alpine,
}

impl PropertySection {
    pub const ALL: [PropertySection; 4] = [
        PropertySection::Properties,
        PropertySection::Meta,
        PropertySection::Events,
        PropertySection::Alpine,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PropertySection::Properties => "properties",
            PropertySection::Meta => "meta",
            PropertySection::Events => "events",
            PropertySection::Alpine => "alpine",
        }
    }
}

impl fmt::Display for PropertySection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Defines how one property key of an element type is edited and defaulted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyDef {
    #[serde(rename = "type")]
    pub property_type: PropertyType,
    pub label: String,
    #[serde(default)]
    pub default_value: Value,
    #[serde(default)]
    pub required: bool,
    /// Choices offered by a `select`-typed panel widget.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl PropertyDef {
    pub fn new(property_type: PropertyType, label: &str) -> Self {
        PropertyDef {
            property_type,
            label: label.to_string(),
            ..Default::default()
        }
    }

    pub fn with_default(mut self, value: Value) -> Self {
        self.default_value = value;
        self
    }
}

/// Ordered map of property key to its definition.
pub type PropertyMap = IndexMap<String, PropertyDef>;

/// Immutable catalog entry describing one element type.
///
/// `id` is the registry lookup key and must equal the key the entry is
/// registered under.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementConfig {
    pub id: String,
    pub html_tag: String,
    pub label: String,
    #[serde(default)]
    pub icon: String,
    pub category: Category,
    #[serde(default)]
    pub properties: PropertyMap,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub meta: PropertyMap,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub events: PropertyMap,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub alpine: PropertyMap,
}

impl ElementConfig {
    /// True when at least one of meta/events/alpine is defined.
    pub fn has_extended_sections(&self) -> bool {
        !self.meta.is_empty() || !self.events.is_empty() || !self.alpine.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_property_type_wire_names() {
        assert_eq!(
            serde_json::to_string(&PropertyType::CssClasses).unwrap(),
            "\"css-classes\""
        );
        let parsed: PropertyType = serde_json::from_str("\"textarea\"").unwrap();
        assert_eq!(parsed, PropertyType::Textarea);
    }

    #[test]
    fn test_category_round_trip() {
        for cat in Category::ALL {
            let s = serde_json::to_string(&cat).unwrap();
            let back: Category = serde_json::from_str(&s).unwrap();
            assert_eq!(back, cat);
        }
    }

    #[test]
    fn test_element_config_deserializes_with_defaults() {
        let raw = json!({
            "id": "text-input",
            "htmlTag": "input",
            "label": "Text Input",
            "category": "form",
            "properties": {
                "name": { "type": "text", "label": "Name" }
            }
        });
        let config: ElementConfig = serde_json::from_value(raw).unwrap();
        assert_eq!(config.html_tag, "input");
        assert!(config.meta.is_empty());
        assert!(config.events.is_empty());
        assert_eq!(config.properties["name"].property_type, PropertyType::Text);
        assert!(!config.has_extended_sections());
    }

    #[test]
    fn test_property_def_builder() {
        let def = PropertyDef::new(PropertyType::Number, "Width").with_default(json!(12));
        assert_eq!(def.label, "Width");
        assert_eq!(def.default_value, json!(12));
        assert!(!def.required);
    }
}
