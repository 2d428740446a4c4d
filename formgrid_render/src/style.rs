use crate::options::escape_html;

/// Per-target markup conventions consumed by the shared tag dispatch.
///
/// Every framework renders through the exact same dispatch table; only the
/// class names, wrappers, and head stylesheet differ. Adding a framework is
/// one more implementation of this trait, not another copy of the dispatch.
pub trait FrameworkStyle: Send + Sync {
    fn name(&self) -> &'static str;

    /// Head fragment pulling in the framework's CSS: a CDN link, a script,
    /// or an embedded style block.
    fn stylesheet(&self) -> &'static str;

    fn form_class(&self) -> &'static str;
    fn row_class(&self) -> &'static str;
    fn column_class(&self, width: u8) -> String;
    fn field_wrapper_class(&self) -> &'static str;
    fn label_class(&self) -> &'static str;
    fn input_class(&self) -> &'static str;
    fn select_class(&self) -> &'static str;
    fn textarea_class(&self) -> &'static str {
        self.input_class()
    }
    fn check_input_class(&self) -> &'static str;
    fn check_wrapper_class(&self, inline: bool) -> String;
    fn check_label_class(&self) -> &'static str;
    fn button_class(&self, button_type: &str) -> String;
    fn hint_class(&self) -> &'static str;
    fn card_class(&self) -> &'static str;

    /// Class for an alert/badge variant (`info`, `success`, `warning`,
    /// `danger`). `base` is `"alert"` or `"badge"`.
    fn variant_class(&self, base: &str, variant: &str) -> String;

    /// Alignment class for headings and paragraphs. `None` falls back to an
    /// inline `text-align` style.
    fn align_class(&self, align: &str) -> Option<String> {
        let _ = align;
        None
    }

    /// Extra attributes identifying an element in editable output. Only the
    /// preview style emits anything here.
    fn element_marker(&self, id: &str) -> String {
        let _ = id;
        String::new()
    }

    /// Wrap the form fragment for preview consumers; the default is the
    /// fragment unchanged.
    fn wrap_preview(&self, body: String) -> String {
        body
    }
}

/// Column width percentages for the 12-unit grid, emitted by the basic
/// stylesheet so plain output lays out without any framework.
const BASIC_STYLESHEET: &str = "<style>\n\
.fg-form{max-width:960px;margin:0 auto}\n\
.fg-row{display:flex;gap:1rem}\n\
.fg-col{min-width:0}\n\
.fg-col-1{flex-basis:8.3333%}\n\
.fg-col-2{flex-basis:16.6667%}\n\
.fg-col-3{flex-basis:25%}\n\
.fg-col-4{flex-basis:33.3333%}\n\
.fg-col-5{flex-basis:41.6667%}\n\
.fg-col-6{flex-basis:50%}\n\
.fg-col-7{flex-basis:58.3333%}\n\
.fg-col-8{flex-basis:66.6667%}\n\
.fg-col-9{flex-basis:75%}\n\
.fg-col-10{flex-basis:83.3333%}\n\
.fg-col-11{flex-basis:91.6667%}\n\
.fg-col-12{flex-basis:100%}\n\
.fg-field{margin-bottom:1rem}\n\
.fg-label{display:block;margin-bottom:.25rem}\n\
.fg-input,.fg-select,.fg-textarea{display:block;width:100%;padding:.375rem .5rem}\n\
.fg-check{display:flex;gap:.375rem;align-items:center}\n\
.fg-check-inline{display:inline-flex;margin-right:1rem}\n\
.fg-button{padding:.375rem .75rem}\n\
.fg-hint{font-size:.875em;color:#666}\n\
.fg-card{border:1px solid #ddd;border-radius:.25rem;padding:1rem}\n\
.fg-alert{border:1px solid;border-radius:.25rem;padding:.75rem}\n\
.fg-badge{border:1px solid;border-radius:.25rem;padding:.125rem .375rem;font-size:.75em}\n\
</style>";

/// Plain semantic markup with `fg-` classes and a minimal embedded
/// stylesheet. The output depends on nothing external.
pub struct BasicStyle;

impl FrameworkStyle for BasicStyle {
    fn name(&self) -> &'static str {
        "basic"
    }

    fn stylesheet(&self) -> &'static str {
        BASIC_STYLESHEET
    }

    fn form_class(&self) -> &'static str {
        "fg-form"
    }

    fn row_class(&self) -> &'static str {
        "fg-row"
    }

    fn column_class(&self, width: u8) -> String {
        format!("fg-col fg-col-{width}")
    }

    fn field_wrapper_class(&self) -> &'static str {
        "fg-field"
    }

    fn label_class(&self) -> &'static str {
        "fg-label"
    }

    fn input_class(&self) -> &'static str {
        "fg-input"
    }

    fn select_class(&self) -> &'static str {
        "fg-select"
    }

    fn textarea_class(&self) -> &'static str {
        "fg-textarea"
    }

    fn check_input_class(&self) -> &'static str {
        "fg-check-input"
    }

    fn check_wrapper_class(&self, inline: bool) -> String {
        if inline {
            "fg-check fg-check-inline".to_string()
        } else {
            "fg-check".to_string()
        }
    }

    fn check_label_class(&self) -> &'static str {
        "fg-check-label"
    }

    fn button_class(&self, _button_type: &str) -> String {
        "fg-button".to_string()
    }

    fn hint_class(&self) -> &'static str {
        "fg-hint"
    }

    fn card_class(&self) -> &'static str {
        "fg-card"
    }

    fn variant_class(&self, base: &str, variant: &str) -> String {
        format!("fg-{base} fg-{base}-{variant}")
    }
}

/// Bootstrap 5 conventions: `row`/`col-md-{n}` grid, `mb-3` field wrappers,
/// `form-control` inputs.
pub struct BootstrapStyle;

impl FrameworkStyle for BootstrapStyle {
    fn name(&self) -> &'static str {
        "bootstrap"
    }

    fn stylesheet(&self) -> &'static str {
        r#"<link href="https://cdn.jsdelivr.net/npm/bootstrap@5.3.3/dist/css/bootstrap.min.css" rel="stylesheet">"#
    }

    fn form_class(&self) -> &'static str {
        "container"
    }

    fn row_class(&self) -> &'static str {
        "row"
    }

    fn column_class(&self, width: u8) -> String {
        format!("col-md-{width}")
    }

    fn field_wrapper_class(&self) -> &'static str {
        "mb-3"
    }

    fn label_class(&self) -> &'static str {
        "form-label"
    }

    fn input_class(&self) -> &'static str {
        "form-control"
    }

    fn select_class(&self) -> &'static str {
        "form-select"
    }

    fn check_input_class(&self) -> &'static str {
        "form-check-input"
    }

    fn check_wrapper_class(&self, inline: bool) -> String {
        if inline {
            "form-check form-check-inline".to_string()
        } else {
            "form-check".to_string()
        }
    }

    fn check_label_class(&self) -> &'static str {
        "form-check-label"
    }

    fn button_class(&self, button_type: &str) -> String {
        match button_type {
            "submit" => "btn btn-primary".to_string(),
            "reset" => "btn btn-outline-secondary".to_string(),
            _ => "btn btn-secondary".to_string(),
        }
    }

    fn hint_class(&self) -> &'static str {
        "form-text"
    }

    fn card_class(&self) -> &'static str {
        "card card-body"
    }

    fn variant_class(&self, base: &str, variant: &str) -> String {
        match base {
            "badge" => format!("badge text-bg-{variant}"),
            _ => format!("alert alert-{variant}"),
        }
    }

    fn align_class(&self, align: &str) -> Option<String> {
        match align {
            "center" => Some("text-center".to_string()),
            "right" => Some("text-end".to_string()),
            "left" => Some("text-start".to_string()),
            _ => None,
        }
    }
}

/// Tailwind utility classes over a `grid grid-cols-12 gap-4` row grid.
pub struct TailwindStyle;

impl TailwindStyle {
    fn variant_color(variant: &str) -> &'static str {
        match variant {
            "success" => "green",
            "warning" => "yellow",
            "danger" => "red",
            _ => "blue",
        }
    }
}

impl FrameworkStyle for TailwindStyle {
    fn name(&self) -> &'static str {
        "tailwind"
    }

    fn stylesheet(&self) -> &'static str {
        r#"<script src="https://cdn.tailwindcss.com"></script>"#
    }

    fn form_class(&self) -> &'static str {
        "mx-auto max-w-4xl p-4"
    }

    fn row_class(&self) -> &'static str {
        "grid grid-cols-12 gap-4"
    }

    fn column_class(&self, width: u8) -> String {
        format!("col-span-{width}")
    }

    fn field_wrapper_class(&self) -> &'static str {
        "mb-4"
    }

    fn label_class(&self) -> &'static str {
        "block text-sm font-medium text-gray-700 mb-1"
    }

    fn input_class(&self) -> &'static str {
        "block w-full rounded-md border-gray-300 shadow-sm"
    }

    fn select_class(&self) -> &'static str {
        "block w-full rounded-md border-gray-300 shadow-sm"
    }

    fn check_input_class(&self) -> &'static str {
        "rounded border-gray-300"
    }

    fn check_wrapper_class(&self, inline: bool) -> String {
        if inline {
            "inline-flex items-center gap-2 mr-4".to_string()
        } else {
            "flex items-center gap-2".to_string()
        }
    }

    fn check_label_class(&self) -> &'static str {
        "text-sm text-gray-700"
    }

    fn button_class(&self, button_type: &str) -> String {
        match button_type {
            "submit" => "rounded-md bg-indigo-600 px-4 py-2 text-white hover:bg-indigo-500".to_string(),
            "reset" => "rounded-md border border-gray-300 px-4 py-2 text-gray-700".to_string(),
            _ => "rounded-md bg-gray-600 px-4 py-2 text-white hover:bg-gray-500".to_string(),
        }
    }

    fn hint_class(&self) -> &'static str {
        "mt-1 text-sm text-gray-500"
    }

    fn card_class(&self) -> &'static str {
        "rounded-lg border border-gray-200 p-4 shadow-sm"
    }

    fn variant_class(&self, base: &str, variant: &str) -> String {
        let color = Self::variant_color(variant);
        match base {
            "badge" => format!(
                "inline-flex items-center rounded-full bg-{color}-100 px-2 py-1 text-xs text-{color}-800"
            ),
            _ => format!("rounded-md bg-{color}-50 p-4 text-{color}-800"),
        }
    }

    fn align_class(&self, align: &str) -> Option<String> {
        match align {
            "center" => Some("text-center".to_string()),
            "right" => Some("text-right".to_string()),
            "left" => Some("text-left".to_string()),
            _ => None,
        }
    }
}

/// Basic markup annotated with `data-element-id` markers, for the live
/// editing canvas: the host resolves clicks and drops back to document
/// elements through the markers.
pub struct PreviewStyle;

impl FrameworkStyle for PreviewStyle {
    fn name(&self) -> &'static str {
        "preview"
    }

    fn stylesheet(&self) -> &'static str {
        BASIC_STYLESHEET
    }

    fn form_class(&self) -> &'static str {
        "fg-form"
    }

    fn row_class(&self) -> &'static str {
        "fg-row"
    }

    fn column_class(&self, width: u8) -> String {
        BasicStyle.column_class(width)
    }

    fn field_wrapper_class(&self) -> &'static str {
        "fg-field fg-element"
    }

    fn label_class(&self) -> &'static str {
        "fg-label"
    }

    fn input_class(&self) -> &'static str {
        "fg-input"
    }

    fn select_class(&self) -> &'static str {
        "fg-select"
    }

    fn textarea_class(&self) -> &'static str {
        "fg-textarea"
    }

    fn check_input_class(&self) -> &'static str {
        "fg-check-input"
    }

    fn check_wrapper_class(&self, inline: bool) -> String {
        BasicStyle.check_wrapper_class(inline)
    }

    fn check_label_class(&self) -> &'static str {
        "fg-check-label"
    }

    fn button_class(&self, button_type: &str) -> String {
        BasicStyle.button_class(button_type)
    }

    fn hint_class(&self) -> &'static str {
        "fg-hint"
    }

    fn card_class(&self) -> &'static str {
        "fg-card"
    }

    fn variant_class(&self, base: &str, variant: &str) -> String {
        BasicStyle.variant_class(base, variant)
    }

    fn element_marker(&self, id: &str) -> String {
        format!(" data-element-id=\"{}\"", escape_html(id))
    }

    fn wrap_preview(&self, body: String) -> String {
        format!("<div class=\"fg-canvas\">\n{body}\n</div>")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_classes_per_framework() {
        assert_eq!(BasicStyle.column_class(6), "fg-col fg-col-6");
        assert_eq!(BootstrapStyle.column_class(6), "col-md-6");
        assert_eq!(TailwindStyle.column_class(6), "col-span-6");
    }

    #[test]
    fn test_variant_classes() {
        assert_eq!(
            BootstrapStyle.variant_class("alert", "danger"),
            "alert alert-danger"
        );
        assert_eq!(
            BootstrapStyle.variant_class("badge", "info"),
            "badge text-bg-info"
        );
        assert!(TailwindStyle
            .variant_class("alert", "success")
            .contains("bg-green-50"));
        assert_eq!(
            BasicStyle.variant_class("badge", "warning"),
            "fg-badge fg-badge-warning"
        );
    }

    #[test]
    fn test_only_preview_emits_markers() {
        assert_eq!(BasicStyle.element_marker("row-1"), "");
        assert_eq!(BootstrapStyle.element_marker("row-1"), "");
        assert_eq!(
            PreviewStyle.element_marker("row-1"),
            " data-element-id=\"row-1\""
        );
    }

    #[test]
    fn test_marker_ids_are_escaped() {
        assert_eq!(
            PreviewStyle.element_marker("a\"b"),
            " data-element-id=\"a&quot;b\""
        );
    }

    #[test]
    fn test_button_classes_follow_type() {
        assert_eq!(BootstrapStyle.button_class("submit"), "btn btn-primary");
        assert_eq!(BootstrapStyle.button_class("button"), "btn btn-secondary");
        assert!(TailwindStyle.button_class("submit").contains("bg-indigo-600"));
    }
}
