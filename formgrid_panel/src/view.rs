use serde::Serialize;
use serde_json::Value;

use formgrid_schema::{
    Column, ElementConfig, ElementKind, EventBinding, EventTarget, Field, FormElement,
    PropertyDef, PropertySection, PropertyType, Row,
};

/// Which editor control the host should draw for a property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum WidgetKind {
    TextBox,
    TextArea,
    NumberBox,
    Checkbox,
    SelectBox,
    ColorPicker,
    EventEditor,
    AlpineEditor,
    ClassEditor,
    ReadOnly,
}

/// One widget per property type; `fixed` values stay visible but locked.
pub fn widget_for(property_type: PropertyType) -> WidgetKind {
    match property_type {
        PropertyType::Text => WidgetKind::TextBox,
        PropertyType::Textarea => WidgetKind::TextArea,
        PropertyType::Number => WidgetKind::NumberBox,
        PropertyType::Boolean => WidgetKind::Checkbox,
        PropertyType::Select => WidgetKind::SelectBox,
        PropertyType::Color => WidgetKind::ColorPicker,
        PropertyType::Event => WidgetKind::EventEditor,
        PropertyType::Alpine => WidgetKind::AlpineEditor,
        PropertyType::CssClasses => WidgetKind::ClassEditor,
        PropertyType::Fixed => WidgetKind::ReadOnly,
    }
}

/// One editable property, resolved against the live element: the instance
/// value when the element carries one, the schema default otherwise.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PanelWidget {
    pub key: String,
    pub widget: WidgetKind,
    pub label: String,
    pub value: Value,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PanelSection {
    pub section: PropertySection,
    pub widgets: Vec<PanelWidget>,
}

/// The reflected panel for one selected element, sections in fixed order.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PanelView {
    pub element_id: String,
    pub kind: ElementKind,
    pub title: String,
    pub sections: Vec<PanelSection>,
}

impl PanelView {
    pub fn section(&self, section: PropertySection) -> Option<&PanelSection> {
        self.sections.iter().find(|s| s.section == section)
    }
}

/// Borrowed current values of whichever element is selected. Layout elements
/// only carry plain properties, so their extended maps stay `None`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ElementValues<'a> {
    pub properties: Option<&'a indexmap::IndexMap<String, Value>>,
    pub meta: Option<&'a indexmap::IndexMap<String, Value>>,
    pub events: Option<&'a indexmap::IndexMap<String, EventBinding>>,
    pub alpine: Option<&'a indexmap::IndexMap<String, String>>,
}

impl<'a> From<&'a Field> for ElementValues<'a> {
    fn from(field: &'a Field) -> Self {
        ElementValues {
            properties: Some(&field.properties),
            meta: Some(&field.meta),
            events: Some(&field.events),
            alpine: Some(&field.alpine),
        }
    }
}

impl<'a> From<&'a FormElement> for ElementValues<'a> {
    fn from(form: &'a FormElement) -> Self {
        ElementValues {
            properties: Some(&form.properties),
            meta: Some(&form.meta),
            events: Some(&form.events),
            alpine: None,
        }
    }
}

impl<'a> From<&'a Row> for ElementValues<'a> {
    fn from(row: &'a Row) -> Self {
        ElementValues {
            properties: Some(&row.properties),
            ..ElementValues::default()
        }
    }
}

impl<'a> From<&'a Column> for ElementValues<'a> {
    fn from(column: &'a Column) -> Self {
        ElementValues {
            properties: Some(&column.properties),
            ..ElementValues::default()
        }
    }
}

/// Rows and columns are pure layout: no meta, no events, no Alpine, whatever
/// their config declares. Fields and the form wrapper get all four sections.
pub fn can_have_extended_properties(kind: ElementKind) -> bool {
    matches!(kind, ElementKind::Field | ElementKind::Form)
}

/// Reflect an element's schema and current values into a panel: sections in
/// the order properties, meta, events, alpine, each present only when its
/// config declares at least one property and the element kind supports it.
pub fn show_properties(
    element_id: &str,
    values: ElementValues<'_>,
    config: &ElementConfig,
    kind: ElementKind,
) -> PanelView {
    let mut sections = Vec::new();

    push_section(
        &mut sections,
        PropertySection::Properties,
        &config.properties,
        |key, def| resolve_value(values.properties, key, def),
    );

    if can_have_extended_properties(kind) {
        push_section(&mut sections, PropertySection::Meta, &config.meta, |key, def| {
            resolve_value(values.meta, key, def)
        });
        push_section(
            &mut sections,
            PropertySection::Events,
            &config.events,
            |key, def| resolve_event(values.events, key, def),
        );
        if kind != ElementKind::Form {
            push_section(
                &mut sections,
                PropertySection::Alpine,
                &config.alpine,
                |key, def| resolve_alpine(values.alpine, key, def),
            );
        }
    }

    PanelView {
        element_id: element_id.to_string(),
        kind,
        title: config.label.clone(),
        sections,
    }
}

fn push_section(
    sections: &mut Vec<PanelSection>,
    section: PropertySection,
    defs: &indexmap::IndexMap<String, PropertyDef>,
    mut resolve: impl FnMut(&str, &PropertyDef) -> Value,
) {
    if defs.is_empty() {
        return;
    }
    let widgets = defs
        .iter()
        .map(|(key, def)| PanelWidget {
            key: key.clone(),
            widget: widget_for(def.property_type),
            label: def.label.clone(),
            value: resolve(key, def),
            required: def.required,
            options: def.options.clone(),
            description: def.description.clone(),
        })
        .collect();
    sections.push(PanelSection { section, widgets });
}

fn resolve_value(
    current: Option<&indexmap::IndexMap<String, Value>>,
    key: &str,
    def: &PropertyDef,
) -> Value {
    current
        .and_then(|map| map.get(key))
        .cloned()
        .unwrap_or_else(|| def.default_value.clone())
}

/// A vanilla binding with no parameters edits as its bare action string; a
/// richer binding round-trips as the full object.
fn resolve_event(
    current: Option<&indexmap::IndexMap<String, EventBinding>>,
    key: &str,
    def: &PropertyDef,
) -> Value {
    match current.and_then(|map| map.get(key)) {
        Some(binding) => {
            if binding.target == EventTarget::Vanilla && binding.parameters.is_empty() {
                Value::String(binding.action.clone())
            } else {
                serde_json::to_value(binding).unwrap_or_default()
            }
        }
        None => def.default_value.clone(),
    }
}

fn resolve_alpine(
    current: Option<&indexmap::IndexMap<String, String>>,
    key: &str,
    def: &PropertyDef,
) -> Value {
    match current.and_then(|map| map.get(key)) {
        Some(expression) => Value::String(expression.clone()),
        None => def.default_value.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use formgrid_registry::ElementRegistry;
    use serde_json::json;

    fn registry() -> ElementRegistry {
        ElementRegistry::new()
    }

    #[test]
    fn test_every_property_type_has_a_widget() {
        assert_eq!(widget_for(PropertyType::Text), WidgetKind::TextBox);
        assert_eq!(widget_for(PropertyType::Boolean), WidgetKind::Checkbox);
        assert_eq!(widget_for(PropertyType::Select), WidgetKind::SelectBox);
        assert_eq!(widget_for(PropertyType::CssClasses), WidgetKind::ClassEditor);
        assert_eq!(widget_for(PropertyType::Fixed), WidgetKind::ReadOnly);
    }

    #[test]
    fn test_field_panel_reflects_schema_and_instance() {
        let registry = registry();
        let config = registry.get("text-input").unwrap();
        let mut field = Field::from_config("text-input-1", config);
        field
            .properties
            .insert("placeholder".to_string(), json!("Your name"));

        let view = show_properties(
            "text-input-1",
            ElementValues::from(&field),
            config,
            ElementKind::Field,
        );

        assert_eq!(view.title, "Text input");
        let order: Vec<PropertySection> = view.sections.iter().map(|s| s.section).collect();
        assert_eq!(
            order,
            [
                PropertySection::Properties,
                PropertySection::Meta,
                PropertySection::Events,
                PropertySection::Alpine,
            ]
        );

        let properties = view.section(PropertySection::Properties).unwrap();
        let placeholder = properties
            .widgets
            .iter()
            .find(|w| w.key == "placeholder")
            .unwrap();
        // The instance value wins over the schema default.
        assert_eq!(placeholder.value, json!("Your name"));

        // The fixed `type` property stays visible but read-only.
        let type_widget = properties.widgets.iter().find(|w| w.key == "type").unwrap();
        assert_eq!(type_widget.widget, WidgetKind::ReadOnly);
        assert_eq!(type_widget.value, json!("text"));
    }

    #[test]
    fn test_layout_elements_are_properties_only() {
        let registry = registry();
        let config = registry.get("row").unwrap();
        let row = Row::new("row-1");

        let view = show_properties("row-1", ElementValues::from(&row), config, ElementKind::Row);
        assert_eq!(view.sections.len(), 1);
        assert_eq!(view.sections[0].section, PropertySection::Properties);
        assert!(!can_have_extended_properties(ElementKind::Row));
        assert!(!can_have_extended_properties(ElementKind::Column));
        assert!(can_have_extended_properties(ElementKind::Field));
        assert!(can_have_extended_properties(ElementKind::Form));
    }

    #[test]
    fn test_select_widget_carries_options() {
        let registry = registry();
        let config = registry.get("heading").unwrap();
        let field = Field::from_config("heading-1", config);

        let view = show_properties(
            "heading-1",
            ElementValues::from(&field),
            config,
            ElementKind::Field,
        );
        let properties = view.section(PropertySection::Properties).unwrap();
        let level = properties.widgets.iter().find(|w| w.key == "level").unwrap();
        assert_eq!(level.widget, WidgetKind::SelectBox);
        assert_eq!(level.value, json!("2"));
        assert!(level
            .options
            .as_ref()
            .is_some_and(|o| o.contains(&"6".to_string())));
    }

    #[test]
    fn test_event_widget_shows_bound_action() {
        let registry = registry();
        let config = registry.get("text-input").unwrap();
        let mut field = Field::from_config("text-input-1", config);
        field.events.insert(
            "change".to_string(),
            EventBinding::new("validateEmail", EventTarget::Vanilla),
        );
        let mut rich = EventBinding::new("openModal", EventTarget::Alpine);
        rich.parameters.insert("modal".to_string(), json!("help"));
        field.events.insert("click".to_string(), rich);

        let view = show_properties(
            "text-input-1",
            ElementValues::from(&field),
            config,
            ElementKind::Field,
        );
        let events = view.section(PropertySection::Events).unwrap();

        let change = events.widgets.iter().find(|w| w.key == "change").unwrap();
        assert_eq!(change.widget, WidgetKind::EventEditor);
        assert_eq!(change.value, json!("validateEmail"));

        let click = events.widgets.iter().find(|w| w.key == "click").unwrap();
        assert_eq!(click.value["action"], json!("openModal"));
        assert_eq!(click.value["target"], json!("alpine"));
    }

    #[test]
    fn test_form_wrapper_has_no_alpine_section() {
        let registry = registry();
        let config = registry.get("form").unwrap();
        let form = FormElement::from_config("form-1", config);

        let view = show_properties(
            "form-1",
            ElementValues::from(&form),
            config,
            ElementKind::Form,
        );
        assert!(view.section(PropertySection::Properties).is_some());
        assert!(view.section(PropertySection::Alpine).is_none());
    }
}
