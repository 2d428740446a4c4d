use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::ElementConfig;

/// Runtime a stored event binding is aimed at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum EventTarget {
    #[default]
    Vanilla,
    Alpine,
    Livewire,
}

/// What a DOM event should trigger. Stored and exported, never executed here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventBinding {
    pub action: String,
    #[serde(default)]
    pub target: EventTarget,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub parameters: IndexMap<String, Value>,
}

impl EventBinding {
    pub fn new(action: &str, target: EventTarget) -> Self {
        EventBinding {
            action: action.to_string(),
            target,
            parameters: IndexMap::new(),
        }
    }
}

/// A placed instance of an element type inside a column.
///
/// Created from an [`ElementConfig`]'s defaults; values diverge from the
/// config as the user edits them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    pub id: String,
    /// Legacy exports used a `type` key for the registry id.
    #[serde(alias = "type")]
    pub element_registry_id: String,
    /// Absent in legacy exports; backfilled from the registry on import.
    #[serde(default)]
    pub html_tag: String,
    #[serde(default)]
    pub properties: IndexMap<String, Value>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub meta: IndexMap<String, Value>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub events: IndexMap<String, EventBinding>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub alpine: IndexMap<String, String>,
}

impl Field {
    /// Instantiate a field from a catalog entry, seeding every property and
    /// meta key with its configured default. Event and alpine sections start
    /// empty; the panel fills them as the user binds things.
    pub fn from_config(id: &str, config: &ElementConfig) -> Self {
        let properties = config
            .properties
            .iter()
            .map(|(key, def)| (key.clone(), def.default_value.clone()))
            .collect();
        let meta = config
            .meta
            .iter()
            .map(|(key, def)| (key.clone(), def.default_value.clone()))
            .collect();
        Field {
            id: id.to_string(),
            element_registry_id: config.id.clone(),
            html_tag: config.html_tag.clone(),
            properties,
            meta,
            events: IndexMap::new(),
            alpine: IndexMap::new(),
        }
    }

    /// Current value of a property as a trimmed string, if it is non-empty.
    pub fn property_str(&self, key: &str) -> Option<&str> {
        match self.properties.get(key) {
            Some(Value::String(s)) if !s.trim().is_empty() => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn property_or(&self, key: &str, fallback: &Value) -> Value {
        self.properties.get(key).cloned().unwrap_or_else(|| fallback.clone())
    }
}

/// Layout cell; owns its fields exclusively.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    pub id: String,
    /// Grid units, 1..=12.
    pub width: u8,
    #[serde(default)]
    pub fields: Vec<Field>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub properties: IndexMap<String, Value>,
}

impl Column {
    pub fn new(id: &str, width: u8) -> Self {
        Column {
            id: id.to_string(),
            width,
            fields: Vec::new(),
            properties: IndexMap::new(),
        }
    }
}

/// Horizontal band of columns; owns its columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Row {
    pub id: String,
    #[serde(default)]
    pub columns: Vec<Column>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub properties: IndexMap<String, Value>,
}

impl Row {
    pub fn new(id: &str) -> Self {
        Row {
            id: id.to_string(),
            columns: Vec::new(),
            properties: IndexMap::new(),
        }
    }

    pub fn width_total(&self) -> u32 {
        self.columns.iter().map(|c| c.width as u32).sum()
    }
}

/// Optional singleton wrapper for the enclosing `<form>` element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormElement {
    pub id: String,
    #[serde(default)]
    pub properties: IndexMap<String, Value>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub meta: IndexMap<String, Value>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub events: IndexMap<String, EventBinding>,
}

impl FormElement {
    pub fn from_config(id: &str, config: &ElementConfig) -> Self {
        let properties = config
            .properties
            .iter()
            .map(|(key, def)| (key.clone(), def.default_value.clone()))
            .collect();
        let meta = config
            .meta
            .iter()
            .map(|(key, def)| (key.clone(), def.default_value.clone()))
            .collect();
        FormElement {
            id: id.to_string(),
            properties,
            meta,
            events: IndexMap::new(),
        }
    }
}

/// Classification of a selectable element within a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementKind {
    Row,
    Column,
    Field,
    Form,
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ElementKind::Row => "row",
            ElementKind::Column => "column",
            ElementKind::Field => "field",
            ElementKind::Form => "form",
        };
        write!(f, "{s}")
    }
}

/// The whole layout: at most one form wrapper plus the ordered row tree.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub form_element: Option<FormElement>,
    #[serde(default)]
    pub rows: Vec<Row>,
}

impl Document {
    pub fn new() -> Self {
        Document::default()
    }

    pub fn is_empty(&self) -> bool {
        self.form_element.is_none() && self.rows.is_empty()
    }

    pub fn clear(&mut self) {
        self.form_element = None;
        self.rows.clear();
    }

    /// Classify an id as row/column/field/form, if it exists in this tree.
    pub fn element_kind(&self, id: &str) -> Option<ElementKind> {
        if self.form_element.as_ref().is_some_and(|f| f.id == id) {
            return Some(ElementKind::Form);
        }
        for row in &self.rows {
            if row.id == id {
                return Some(ElementKind::Row);
            }
            for column in &row.columns {
                if column.id == id {
                    return Some(ElementKind::Column);
                }
                if column.fields.iter().any(|f| f.id == id) {
                    return Some(ElementKind::Field);
                }
            }
        }
        None
    }

    pub fn find_row(&self, id: &str) -> Option<&Row> {
        self.rows.iter().find(|r| r.id == id)
    }

    pub fn find_row_mut(&mut self, id: &str) -> Option<&mut Row> {
        self.rows.iter_mut().find(|r| r.id == id)
    }

    pub fn find_column(&self, id: &str) -> Option<&Column> {
        self.rows
            .iter()
            .flat_map(|r| r.columns.iter())
            .find(|c| c.id == id)
    }

    pub fn find_column_mut(&mut self, id: &str) -> Option<&mut Column> {
        self.rows
            .iter_mut()
            .flat_map(|r| r.columns.iter_mut())
            .find(|c| c.id == id)
    }

    pub fn find_field(&self, id: &str) -> Option<&Field> {
        self.rows
            .iter()
            .flat_map(|r| r.columns.iter())
            .flat_map(|c| c.fields.iter())
            .find(|f| f.id == id)
    }

    pub fn find_field_mut(&mut self, id: &str) -> Option<&mut Field> {
        self.rows
            .iter_mut()
            .flat_map(|r| r.columns.iter_mut())
            .flat_map(|c| c.fields.iter_mut())
            .find(|f| f.id == id)
    }

    /// Every element id in the tree, in document order.
    pub fn all_ids(&self) -> Vec<&str> {
        let mut ids = Vec::new();
        if let Some(form) = &self.form_element {
            ids.push(form.id.as_str());
        }
        for row in &self.rows {
            ids.push(row.id.as_str());
            for column in &row.columns {
                ids.push(column.id.as_str());
                for field in &column.fields {
                    ids.push(field.id.as_str());
                }
            }
        }
        ids
    }

    pub fn field_count(&self) -> usize {
        self.rows
            .iter()
            .flat_map(|r| r.columns.iter())
            .map(|c| c.fields.len())
            .sum()
    }
}
