//! Export and import of form documents as JSON.
//!
//! Exports wrap the row tree in a versioned envelope with created/modified
//! timestamps. Imports accept that envelope and the legacy bare row array,
//! validate the payload shape up front, and report the first offending row
//! and column on failure.

pub mod envelope;
pub mod import;

pub use envelope::{export, export_json, Envelope, EnvelopeMetadata, ExportMetadata, CURRENT_VERSION};
pub use import::{import, ImportError, ImportResult};
