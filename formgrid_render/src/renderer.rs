use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::Value;
use thiserror::Error;

use formgrid_schema::{Column, Document, Field, FormElement, Row};

use crate::dispatch::{self, class_attr, push_attr};
use crate::options::{escape_html, RenderOptions};
use crate::style::{BasicStyle, BootstrapStyle, FrameworkStyle, PreviewStyle, TailwindStyle};

/// Framework names [`renderer_for`] accepts.
pub const FRAMEWORKS: [&str; 4] = ["basic", "bootstrap", "tailwind", "preview"];

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("unknown framework '{0}' (expected one of: {})", FRAMEWORKS.join(", "))]
    UnknownFramework(String),
}

/// Look up a renderer by framework name.
pub fn renderer_for(framework: &str) -> Result<Renderer, RenderError> {
    let style: Arc<dyn FrameworkStyle> = match framework {
        "basic" => Arc::new(BasicStyle),
        "bootstrap" => Arc::new(BootstrapStyle),
        "tailwind" => Arc::new(TailwindStyle),
        "preview" => Arc::new(PreviewStyle),
        other => return Err(RenderError::UnknownFramework(other.to_string())),
    };
    Ok(Renderer::new(style))
}

/// Walks a document top-down and renders it against one framework style.
///
/// All structure comes from here and the shared tag dispatch; the only
/// framework-specific part is the [`FrameworkStyle`] behind the `Arc`. Output
/// is deterministic: the same document renders to the same bytes.
pub struct Renderer {
    style: Arc<dyn FrameworkStyle>,
}

impl std::fmt::Debug for Renderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Renderer")
            .field("framework", &self.style.name())
            .finish()
    }
}

impl Renderer {
    pub fn new(style: Arc<dyn FrameworkStyle>) -> Self {
        Renderer { style }
    }

    pub fn framework(&self) -> &'static str {
        self.style.name()
    }

    pub fn render_field(&self, field: &Field) -> String {
        dispatch::render_field(field, self.style.as_ref())
    }

    pub fn render_column(&self, column: &Column) -> String {
        let open = format!(
            "<div{}{}>",
            class_attr(
                &self.style.column_class(column.width),
                custom_class(&column.properties),
            ),
            self.style.element_marker(&column.id),
        );
        if column.fields.is_empty() {
            return format!("{open}</div>");
        }
        let fields: Vec<String> = column
            .fields
            .iter()
            .map(|field| self.render_field(field))
            .collect();
        format!("{open}\n{}\n</div>", fields.join("\n"))
    }

    pub fn render_row(&self, row: &Row) -> String {
        let open = format!(
            "<div{}{}>",
            class_attr(self.style.row_class(), custom_class(&row.properties)),
            self.style.element_marker(&row.id),
        );
        if row.columns.is_empty() {
            return format!("{open}</div>");
        }
        let columns: Vec<String> = row
            .columns
            .iter()
            .map(|column| self.render_column(column))
            .collect();
        format!("{open}\n{}\n</div>", columns.join("\n"))
    }

    /// The row tree without the `<form>` wrapper or document shell.
    pub fn render_body(&self, document: &Document) -> String {
        let rows: Vec<String> = document
            .rows
            .iter()
            .map(|row| self.render_row(row))
            .collect();
        rows.join("\n")
    }

    fn render_form_tag(&self, form: Option<&FormElement>, body: &str) -> String {
        let mut attrs = String::new();
        if let Some(form) = form {
            attrs.push_str(&format!(" id=\"{}\"", escape_html(&form.id)));
            for (key, value) in &form.properties {
                if key == "class" {
                    continue;
                }
                push_attr(&mut attrs, key, value);
            }
        }
        let class = class_attr(
            self.style.form_class(),
            form.and_then(|f| custom_class(&f.properties)),
        );
        let marker = match form {
            Some(form) => self.style.element_marker(&form.id),
            None => String::new(),
        };
        if body.is_empty() {
            format!("<form{attrs}{class}{marker}></form>")
        } else {
            format!("<form{attrs}{class}{marker}>\n{body}\n</form>")
        }
    }

    /// A complete standalone HTML page for the document.
    pub fn render_form(&self, document: &Document, options: &RenderOptions) -> String {
        let body = self.render_body(document);
        let form = self.render_form_tag(document.form_element.as_ref(), &body);

        let mut head = String::new();
        head.push_str("<meta charset=\"utf-8\">\n");
        head.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
        head.push_str(&format!("<title>{}</title>", escape_html(&options.title)));
        if options.include_stylesheet {
            head.push('\n');
            head.push_str(self.style.stylesheet());
        }

        format!(
            "<!DOCTYPE html>\n<html lang=\"{}\">\n<head>\n{}\n</head>\n<body>\n{}\n</body>\n</html>\n",
            escape_html(&options.language),
            head,
            form,
        )
    }

    /// The editable fragment: no document shell, rows wrapped by the style's
    /// preview hook. Documents with a form element keep its tag so the canvas
    /// can select it.
    pub fn render_preview(&self, document: &Document) -> String {
        let body = self.render_body(document);
        let fragment = match document.form_element.as_ref() {
            Some(form) => self.render_form_tag(Some(form), &body),
            None => body,
        };
        self.style.wrap_preview(fragment)
    }
}

fn custom_class(properties: &IndexMap<String, Value>) -> Option<&str> {
    properties
        .get("class")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|class| !class.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use formgrid_registry::ElementRegistry;
    use formgrid_schema::Field;
    use serde_json::json;

    fn sample_document() -> Document {
        let registry = ElementRegistry::new();
        let text = Field::from_config("text-input-1", registry.get("text-input").unwrap());
        let mut button = Field::from_config(
            "submit-button-1",
            registry.get("submit-button").unwrap(),
        );
        button.properties.insert("text".to_string(), json!("Send"));

        let mut wide = Column::new("column-1", 8);
        wide.fields.push(text);
        let mut narrow = Column::new("column-2", 4);
        narrow.fields.push(button);
        let mut row = Row::new("row-1");
        row.columns.push(wide);
        row.columns.push(narrow);

        Document {
            form_element: None,
            rows: vec![row],
        }
    }

    #[test]
    fn test_render_form_is_a_full_document() {
        let doc = sample_document();
        let renderer = renderer_for("bootstrap").unwrap();
        let options = RenderOptions::default().with_title("Contact <us>");
        let html = renderer.render_form(&doc, &options);

        assert!(html.starts_with("<!DOCTYPE html>\n<html lang=\"en\">"));
        assert!(html.contains("<title>Contact &lt;us&gt;</title>"));
        assert!(html.contains("bootstrap@5.3.3"));
        assert!(html.contains("<form class=\"container\">"));
        assert!(html.contains("<div class=\"row\">"));
        assert!(html.contains("<div class=\"col-md-8\">"));
        assert!(html.contains("<div class=\"col-md-4\">"));
        assert!(html.ends_with("</html>\n"));
    }

    #[test]
    fn test_without_stylesheet_omits_the_link() {
        let doc = sample_document();
        let renderer = renderer_for("bootstrap").unwrap();
        let options = RenderOptions::default().without_stylesheet();
        let html = renderer.render_form(&doc, &options);
        assert!(!html.contains("cdn.jsdelivr.net"));
        assert!(html.contains("<form class=\"container\">"));
    }

    #[test]
    fn test_empty_document_renders_an_empty_form() {
        let doc = Document::new();
        let renderer = renderer_for("basic").unwrap();
        let html = renderer.render_form(&doc, &RenderOptions::default());
        assert!(html.contains("<form class=\"fg-form\"></form>"));
    }

    #[test]
    fn test_form_element_attributes_reach_the_form_tag() {
        let registry = ElementRegistry::new();
        let mut form = FormElement::from_config("form-1", registry.get("form").unwrap());
        form.properties.insert("name".to_string(), json!("contact"));
        form.properties
            .insert("action".to_string(), json!("/submit"));
        let doc = Document {
            form_element: Some(form),
            rows: vec![],
        };

        let renderer = renderer_for("basic").unwrap();
        let html = renderer.render_form(&doc, &RenderOptions::default());
        assert!(html.contains(
            "<form id=\"form-1\" name=\"contact\" action=\"/submit\" method=\"post\" enctype=\"application/x-www-form-urlencoded\" class=\"fg-form\"></form>"
        ));
    }

    #[test]
    fn test_rendering_is_deterministic() {
        let doc = sample_document();
        for framework in FRAMEWORKS {
            let renderer = renderer_for(framework).unwrap();
            let first = renderer.render_form(&doc, &RenderOptions::default());
            let second = renderer.render_form(&doc, &RenderOptions::default());
            assert_eq!(first, second, "{framework} output changed between runs");
        }
    }

    #[test]
    fn test_preview_wraps_and_marks_every_level() {
        let registry = ElementRegistry::new();
        let mut doc = sample_document();
        doc.form_element = Some(FormElement::from_config(
            "form-1",
            registry.get("form").unwrap(),
        ));

        let renderer = renderer_for("preview").unwrap();
        let html = renderer.render_preview(&doc);

        assert!(html.starts_with("<div class=\"fg-canvas\">"));
        assert!(html.contains("data-element-id=\"form-1\""));
        assert!(html.contains("data-element-id=\"row-1\""));
        assert!(html.contains("data-element-id=\"column-1\""));
        assert!(html.contains("data-element-id=\"text-input-1\""));
        assert!(html.ends_with("</div>"));
    }

    #[test]
    fn test_basic_preview_has_no_markers_outside_preview() {
        let doc = sample_document();
        let renderer = renderer_for("basic").unwrap();
        let html = renderer.render_form(&doc, &RenderOptions::default());
        assert!(!html.contains("data-element-id"));
    }

    #[test]
    fn test_unknown_framework_is_rejected() {
        let err = renderer_for("react").unwrap_err();
        let message = err.to_string();
        assert!(message.contains("unknown framework 'react'"));
        assert!(message.contains("bootstrap"));
    }

    #[test]
    fn test_custom_row_and_column_classes_merge() {
        let mut doc = sample_document();
        doc.rows[0]
            .properties
            .insert("class".to_string(), json!("intro"));
        doc.rows[0].columns[0]
            .properties
            .insert("class".to_string(), json!("left-pane"));

        let renderer = renderer_for("bootstrap").unwrap();
        let html = renderer.render_body(&doc);
        assert!(html.contains("<div class=\"row intro\">"));
        assert!(html.contains("<div class=\"col-md-8 left-pane\">"));
    }

    #[test]
    fn test_render_body_skips_the_shell() {
        let doc = sample_document();
        let renderer = renderer_for("basic").unwrap();
        let body = renderer.render_body(&doc);
        assert!(!body.contains("<!DOCTYPE"));
        assert!(!body.contains("<form"));
        assert!(body.starts_with("<div class=\"fg-row\">"));
    }
}
