use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use formgrid_schema::{Document, FormElement, Row};

/// Version stamped into every export. Bump on wire-format changes.
pub const CURRENT_VERSION: &str = "1.0";

/// Caller-supplied description stamped into an export's metadata block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportMetadata {
    pub title: Option<String>,
    pub description: Option<String>,
}

impl ExportMetadata {
    pub fn titled(title: &str) -> Self {
        ExportMetadata {
            title: Some(title.to_string()),
            description: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvelopeMetadata {
    pub created: DateTime<Utc>,
    pub modified: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// The on-disk document format. Exports always carry `version` and
/// `metadata`; imports tolerate their absence so near-miss payloads still
/// load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    #[serde(default)]
    pub version: String,
    pub rows: Vec<Row>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub form_element: Option<FormElement>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<EnvelopeMetadata>,
}

/// Snapshot a document into a fresh envelope stamped with the current
/// version and timestamps.
pub fn export(document: &Document, metadata: &ExportMetadata) -> Envelope {
    let now = Utc::now();
    Envelope {
        version: CURRENT_VERSION.to_string(),
        rows: document.rows.clone(),
        form_element: document.form_element.clone(),
        metadata: Some(EnvelopeMetadata {
            created: now,
            modified: now,
            title: metadata.title.clone(),
            description: metadata.description.clone(),
        }),
    }
}

/// [`export`] straight to pretty-printed JSON.
pub fn export_json(document: &Document, metadata: &ExportMetadata) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&export(document, metadata))
}

#[cfg(test)]
mod tests {
    use super::*;
    use formgrid_schema::Column;

    fn two_row_document() -> Document {
        let mut first = Row::new("row-1");
        first.columns.push(Column::new("column-1", 6));
        first.columns.push(Column::new("column-2", 6));
        let mut second = Row::new("row-2");
        second.columns.push(Column::new("column-3", 12));
        Document {
            form_element: None,
            rows: vec![first, second],
        }
    }

    #[test]
    fn test_export_stamps_version_and_timestamps() {
        let envelope = export(&two_row_document(), &ExportMetadata::titled("Contact"));
        assert_eq!(envelope.version, CURRENT_VERSION);
        let metadata = envelope.metadata.expect("exports carry metadata");
        assert_eq!(metadata.created, metadata.modified);
        assert_eq!(metadata.title.as_deref(), Some("Contact"));
        assert!(metadata.description.is_none());
    }

    #[test]
    fn test_envelope_wire_names_are_camel_case() {
        let form = FormElement {
            id: "form-1".to_string(),
            properties: Default::default(),
            meta: Default::default(),
            events: Default::default(),
        };
        let mut document = two_row_document();
        document.form_element = Some(form);

        let raw = export_json(&document, &ExportMetadata::default()).unwrap();
        assert!(raw.contains("\"version\": \"1.0\""));
        assert!(raw.contains("\"formElement\""));
        assert!(raw.contains("\"created\""));
        // RFC 3339 timestamps: date, 'T', time.
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        let created = value["metadata"]["created"].as_str().unwrap();
        assert!(created.contains('T'));
    }

    #[test]
    fn test_missing_version_and_metadata_still_deserialize() {
        let raw = r#"{ "rows": [] }"#;
        let envelope: Envelope = serde_json::from_str(raw).unwrap();
        assert!(envelope.version.is_empty());
        assert!(envelope.metadata.is_none());
        assert!(envelope.form_element.is_none());
    }
}
