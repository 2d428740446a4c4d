use serde::Serialize;
use serde_json::Value;

use crate::document::{Document, Field};

/// One parsed entry of a `required|min:3|regex:^\d+$` rule string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationRule {
    pub name: String,
    pub parameter: Option<String>,
}

/// A failed rule for a specific field. Issues are data, not errors: an
/// invalid document still exists and renders.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationIssue {
    pub field_id: String,
    pub rule: String,
    pub message: String,
}

/// Parse a pipe-separated rule string. Rules are `name` or `name:parameter`;
/// the parameter keeps everything after the first colon so regex patterns
/// may contain colons themselves. Empty segments are skipped.
pub fn parse_rules(raw: &str) -> Vec<ValidationRule> {
    raw.split('|')
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .map(|segment| match segment.split_once(':') {
            Some((name, parameter)) => ValidationRule {
                name: name.trim().to_string(),
                parameter: Some(parameter.to_string()),
            },
            None => ValidationRule {
                name: segment.to_string(),
                parameter: None,
            },
        })
        .collect()
}

fn value_as_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

/// What `min`/`max` measure: numbers and numeric strings compare
/// numerically, any other text by character count. `min:3` means "at least
/// 3" for a quantity and "at least 3 characters" for free text.
fn magnitude(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => match s.trim().parse::<f64>() {
            Ok(n) => n,
            Err(_) => s.chars().count() as f64,
        },
        other => value_as_text(other).chars().count() as f64,
    }
}

fn check_rule(rule: &ValidationRule, value: &Value, label: &str) -> Result<(), String> {
    match rule.name.as_str() {
        "required" => {
            if is_empty_value(value) {
                return Err(format!("{label} is required"));
            }
        }
        "min" => {
            let min: f64 = rule
                .parameter
                .as_deref()
                .and_then(|p| p.parse().ok())
                .ok_or_else(|| format!("{label}: invalid min parameter"))?;
            if !is_empty_value(value) && magnitude(value) < min {
                return Err(format!("{label} must be at least {min}"));
            }
        }
        "max" => {
            let max: f64 = rule
                .parameter
                .as_deref()
                .and_then(|p| p.parse().ok())
                .ok_or_else(|| format!("{label}: invalid max parameter"))?;
            if !is_empty_value(value) && magnitude(value) > max {
                return Err(format!("{label} must be at most {max}"));
            }
        }
        "regex" => {
            let pattern = rule
                .parameter
                .as_deref()
                .ok_or_else(|| format!("{label}: missing regex parameter"))?;
            let re = regex::Regex::new(pattern)
                .map_err(|_| format!("{label}: invalid regex pattern"))?;
            if !is_empty_value(value) && !re.is_match(&value_as_text(value)) {
                return Err(format!("{label} has invalid format"));
            }
        }
        // Unknown rule names are ignored so custom registries can carry
        // host-interpreted rules through this layer untouched.
        _ => {}
    }
    Ok(())
}

/// Check a field's current `value` property against its `validation` meta.
/// Fields without a validation rule string produce no issues.
pub fn validate_field(field: &Field) -> Vec<ValidationIssue> {
    let raw_rules = match field.meta.get("validation") {
        Some(Value::String(s)) if !s.trim().is_empty() => s.clone(),
        _ => return Vec::new(),
    };
    let label = match field.meta.get("label") {
        Some(Value::String(s)) if !s.trim().is_empty() => s.clone(),
        _ => field.id.clone(),
    };
    let value = field
        .properties
        .get("value")
        .cloned()
        .unwrap_or(Value::Null);

    let mut issues = Vec::new();
    for rule in parse_rules(&raw_rules) {
        if let Err(message) = check_rule(&rule, &value, &label) {
            issues.push(ValidationIssue {
                field_id: field.id.clone(),
                rule: rule.name.clone(),
                message,
            });
        }
    }
    issues
}

/// Validate every field in the document, in document order.
pub fn validate_document(document: &Document) -> Vec<ValidationIssue> {
    document
        .rows
        .iter()
        .flat_map(|row| row.columns.iter())
        .flat_map(|column| column.fields.iter())
        .flat_map(validate_field)
        .collect()
}
