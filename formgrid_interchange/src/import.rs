use serde_json::Value;
use thiserror::Error;

use formgrid_schema::{Document, Row};

use crate::envelope::{Envelope, EnvelopeMetadata, CURRENT_VERSION};

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("malformed payload: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid payload: {reason}")]
    Payload { reason: String },
    #[error("row {row}: {reason}")]
    Row { row: usize, reason: String },
    #[error("row {row}, column {column}: {reason}")]
    Column {
        row: usize,
        column: usize,
        reason: String,
    },
}

/// A successfully parsed payload. Legacy row arrays carry no version or
/// metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportResult {
    pub document: Document,
    pub version: Option<String>,
    pub metadata: Option<EnvelopeMetadata>,
}

/// Parse an exported document, either the versioned envelope or the legacy
/// bare row array.
///
/// The whole payload is structurally validated before anything is
/// deserialized into model types, so failures name the first offending row
/// (and column) and never yield a half-built document.
pub fn import(raw: &str) -> Result<ImportResult, ImportError> {
    let value: Value = serde_json::from_str(raw)?;
    match &value {
        Value::Array(rows) => {
            check_rows(rows)?;
            let rows: Vec<Row> = serde_json::from_value(value)?;
            log::debug!("imported legacy row-array payload ({} rows)", rows.len());
            Ok(ImportResult {
                document: Document {
                    form_element: None,
                    rows,
                },
                version: None,
                metadata: None,
            })
        }
        Value::Object(map) if map.contains_key("rows") => {
            match map.get("rows") {
                Some(Value::Array(rows)) => check_rows(rows)?,
                _ => {
                    return Err(ImportError::Payload {
                        reason: "rows is not an array".to_string(),
                    })
                }
            }
            let envelope: Envelope = serde_json::from_value(value)?;
            if envelope.version.is_empty() {
                log::warn!("import payload carries no version, assuming {CURRENT_VERSION}");
            } else if envelope.version != CURRENT_VERSION {
                log::warn!(
                    "import payload version {} differs from {CURRENT_VERSION}, loading anyway",
                    envelope.version
                );
            }
            let version = Some(envelope.version).filter(|v| !v.is_empty());
            Ok(ImportResult {
                document: Document {
                    form_element: envelope.form_element,
                    rows: envelope.rows,
                },
                version,
                metadata: envelope.metadata,
            })
        }
        _ => Err(ImportError::Payload {
            reason: "expected a versioned export object or a row array".to_string(),
        }),
    }
}

/// Walk the raw row array and verify the shape the model types expect:
/// string ids everywhere, `columns`/`fields` arrays, numeric widths, an
/// element type on every field.
fn check_rows(rows: &[Value]) -> Result<(), ImportError> {
    for (row_index, row) in rows.iter().enumerate() {
        let row_map = row.as_object().ok_or_else(|| ImportError::Row {
            row: row_index,
            reason: "not an object".to_string(),
        })?;
        if !has_string_id(row_map) {
            return Err(ImportError::Row {
                row: row_index,
                reason: "missing string id".to_string(),
            });
        }
        let columns = match row_map.get("columns") {
            Some(Value::Array(columns)) => columns,
            _ => {
                return Err(ImportError::Row {
                    row: row_index,
                    reason: "columns is not an array".to_string(),
                })
            }
        };
        for (column_index, column) in columns.iter().enumerate() {
            check_column(row_index, column_index, column)?;
        }
    }
    Ok(())
}

fn check_column(row: usize, column: usize, value: &Value) -> Result<(), ImportError> {
    let fail = |reason: &str| ImportError::Column {
        row,
        column,
        reason: reason.to_string(),
    };
    let map = value.as_object().ok_or_else(|| fail("not an object"))?;
    if !has_string_id(map) {
        return Err(fail("missing string id"));
    }
    // Range-check here: widths the model's u8 cannot hold would otherwise
    // surface as an unindexed deserialization error.
    match map.get("width").and_then(Value::as_u64) {
        Some(width) if width <= u8::MAX as u64 => {}
        Some(_) => return Err(fail("width is out of range")),
        None => return Err(fail("width is not a number")),
    }
    let fields = match map.get("fields") {
        Some(Value::Array(fields)) => fields,
        _ => return Err(fail("fields is not an array")),
    };
    for (field_index, field) in fields.iter().enumerate() {
        let field_map = field
            .as_object()
            .ok_or_else(|| fail(&format!("field {field_index} is not an object")))?;
        if !has_string_id(field_map) {
            return Err(fail(&format!("field {field_index} is missing a string id")));
        }
        let element_type = field_map
            .get("elementRegistryId")
            .or_else(|| field_map.get("type"));
        match element_type {
            Some(Value::String(id)) if !id.is_empty() => {}
            _ => return Err(fail(&format!("field {field_index} has no element type"))),
        }
    }
    Ok(())
}

fn has_string_id(map: &serde_json::Map<String, Value>) -> bool {
    matches!(map.get("id"), Some(Value::String(id)) if !id.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::envelope::{export, export_json, ExportMetadata};
    use formgrid_schema::{Column, Field};
    use serde_json::json;

    fn built_document() -> Document {
        let mut field = Field {
            id: "text-input-1".to_string(),
            element_registry_id: "text-input".to_string(),
            html_tag: "input".to_string(),
            properties: Default::default(),
            meta: Default::default(),
            events: Default::default(),
            alpine: Default::default(),
        };
        field
            .properties
            .insert("name".to_string(), json!("email-1"));

        let mut column = Column::new("column-1", 12);
        column.fields.push(field);
        let mut row = Row::new("row-1");
        row.columns.push(column);
        Document {
            form_element: None,
            rows: vec![row],
        }
    }

    #[test]
    fn test_round_trip_reproduces_the_document() {
        let document = built_document();
        let raw = export_json(&document, &ExportMetadata::default()).unwrap();
        let imported = import(&raw).unwrap();
        assert_eq!(imported.document, document);
        assert_eq!(imported.version.as_deref(), Some(CURRENT_VERSION));
        assert!(imported.metadata.is_some());
    }

    #[test]
    fn test_legacy_row_array_imports_and_reexports_versioned() {
        let raw = r#"[
            { "id": "row-1", "columns": [
                { "id": "column-1", "width": 12, "fields": [
                    { "id": "text-input-1", "type": "text-input", "properties": { "name": "email" } }
                ] }
            ] }
        ]"#;
        let imported = import(raw).unwrap();
        assert!(imported.version.is_none());
        assert_eq!(imported.document.rows.len(), 1);
        let field = &imported.document.rows[0].columns[0].fields[0];
        assert_eq!(field.element_registry_id, "text-input");
        // Legacy payloads carry no htmlTag.
        assert!(field.html_tag.is_empty());

        let envelope = export(&imported.document, &ExportMetadata::default());
        assert_eq!(envelope.version, CURRENT_VERSION);
    }

    #[test]
    fn test_malformed_columns_blames_row_zero() {
        let raw = r#"{ "rows": [ { "id": "row-1", "columns": "not-an-array" } ] }"#;
        let err = import(raw).unwrap_err();
        assert!(matches!(err, ImportError::Row { row: 0, .. }));
        assert_eq!(err.to_string(), "row 0: columns is not an array");
    }

    #[test]
    fn test_column_error_names_both_indices() {
        let raw = r#"{ "rows": [
            { "id": "row-1", "columns": [
                { "id": "column-1", "width": 6, "fields": [] },
                { "id": "column-2", "fields": [] }
            ] }
        ] }"#;
        let err = import(raw).unwrap_err();
        assert_eq!(err.to_string(), "row 0, column 1: width is not a number");
    }

    #[test]
    fn test_oversized_width_is_blamed_on_its_column() {
        let raw = r#"{ "rows": [
            { "id": "row-1", "columns": [
                { "id": "column-1", "width": 300, "fields": [] }
            ] }
        ] }"#;
        let err = import(raw).unwrap_err();
        assert!(matches!(
            err,
            ImportError::Column { row: 0, column: 0, .. }
        ));
        assert_eq!(err.to_string(), "row 0, column 0: width is out of range");
    }

    #[test]
    fn test_field_without_element_type_is_rejected() {
        let raw = r#"{ "rows": [
            { "id": "row-1", "columns": [
                { "id": "column-1", "width": 12, "fields": [ { "id": "orphan-1" } ] }
            ] }
        ] }"#;
        let err = import(raw).unwrap_err();
        assert_eq!(
            err.to_string(),
            "row 0, column 0: field 0 has no element type"
        );
    }

    #[test]
    fn test_unrecognized_payloads_are_rejected() {
        assert!(matches!(
            import("42").unwrap_err(),
            ImportError::Payload { .. }
        ));
        assert!(matches!(
            import(r#"{ "title": "no rows" }"#).unwrap_err(),
            ImportError::Payload { .. }
        ));
        assert!(matches!(import("{ not json").unwrap_err(), ImportError::Json(_)));
    }

    #[test]
    fn test_older_version_still_imports() {
        let raw = r#"{
            "version": "0.9",
            "rows": [],
            "metadata": { "created": "2024-01-01T00:00:00Z", "modified": "2024-01-01T00:00:00Z" }
        }"#;
        let imported = import(raw).unwrap();
        assert_eq!(imported.version.as_deref(), Some("0.9"));
        assert!(imported.document.rows.is_empty());
    }

    #[test]
    fn test_form_element_survives_the_round_trip() {
        let mut document = built_document();
        document.form_element = Some(formgrid_schema::FormElement {
            id: "form-1".to_string(),
            properties: Default::default(),
            meta: Default::default(),
            events: Default::default(),
        });
        let raw = export_json(&document, &ExportMetadata::default()).unwrap();
        let imported = import(&raw).unwrap();
        assert_eq!(
            imported.document.form_element.as_ref().map(|f| f.id.as_str()),
            Some("form-1")
        );
    }
}
