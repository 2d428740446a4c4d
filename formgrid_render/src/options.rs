use serde_json::Value;

/// Document-level rendering knobs. Field/column/row output depends only on
/// the tree and the framework style, so the same options value renders the
/// same bytes every time.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// `<title>` of the generated document.
    pub title: String,
    /// Emit the framework's stylesheet link (or embedded style block) in the
    /// document head.
    pub include_stylesheet: bool,
    /// `lang` attribute of the `<html>` element.
    pub language: String,
}

impl Default for RenderOptions {
    fn default() -> Self {
        RenderOptions {
            title: "Form".to_string(),
            include_stylesheet: true,
            language: "en".to_string(),
        }
    }
}

impl RenderOptions {
    pub fn with_title(mut self, title: &str) -> Self {
        self.title = title.to_string();
        self
    }

    pub fn without_stylesheet(mut self) -> Self {
        self.include_stylesheet = false;
        self
    }
}

/// One parsed choice of a select/radio/checkbox-group option list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionItem {
    pub label: String,
    pub value: String,
}

/// Parse the `label|value` per-line option format. A line without a pipe
/// uses its whole text as both label and value; blank lines are skipped.
pub fn parse_option_lines(raw: &str) -> Vec<OptionItem> {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| match line.split_once('|') {
            Some((label, value)) => OptionItem {
                label: label.trim().to_string(),
                value: value.trim().to_string(),
            },
            None => OptionItem {
                label: line.to_string(),
                value: line.to_string(),
            },
        })
        .collect()
}

/// Minimal entity escaping for text nodes and double-quoted attributes.
pub fn escape_html(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Property value as display text: strings verbatim, null empty, the rest in
/// their JSON form.
pub(crate) fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
