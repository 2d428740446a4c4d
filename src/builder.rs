use std::sync::Arc;

use anyhow::{Context, Result};
use serde_json::Value;
use uuid::Uuid;

use formgrid_document::{DocumentController, DocumentError, Selection};
use formgrid_events::{BuilderEvent, EventDispatcher};
use formgrid_interchange::{Envelope, ExportMetadata};
use formgrid_panel::{show_properties, ElementValues, PanelSession, PanelView};
use formgrid_registry::ElementRegistry;
use formgrid_render::{renderer_for, PreviewStyle, RenderOptions, Renderer};
use formgrid_schema::{validate_document, Document, ElementKind, PropertySection, ValidationIssue};

/// The assembled form builder: element catalog, document controller, event
/// dispatcher, and property panel behind one API.
///
/// Every mutation goes through here so hosts get the matching notifications:
/// a specific event (`elementCreated`, `elementDeleted`, ...) plus a
/// `formChanged` for anything that touched the tree.
pub struct FormBuilder {
    registry: ElementRegistry,
    controller: DocumentController,
    dispatcher: EventDispatcher,
    panel: PanelSession,
}

impl Default for FormBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl FormBuilder {
    /// Build with the built-in catalog and emit `builderReady`. Use
    /// [`FormBuilder::with_subscriber`] to observe that first event.
    pub fn new() -> Self {
        let mut builder = FormBuilder {
            registry: ElementRegistry::new(),
            controller: DocumentController::new(),
            dispatcher: EventDispatcher::new(),
            panel: PanelSession::new(),
        };
        builder.emit_ready();
        builder
    }

    /// Build with `callback` already subscribed, so it sees `builderReady`
    /// and everything after.
    pub fn with_subscriber(callback: impl FnMut(&BuilderEvent) + Send + 'static) -> Self {
        let mut builder = FormBuilder {
            registry: ElementRegistry::new(),
            controller: DocumentController::new(),
            dispatcher: EventDispatcher::new(),
            panel: PanelSession::new(),
        };
        builder.dispatcher.subscribe(callback);
        builder.emit_ready();
        builder
    }

    fn emit_ready(&mut self) {
        self.dispatcher.emit(BuilderEvent::BuilderReady {
            element_types: self.registry.len(),
        });
    }

    pub fn on_event(&mut self, callback: impl FnMut(&BuilderEvent) + Send + 'static) {
        self.dispatcher.subscribe(callback);
    }

    pub fn registry(&self) -> &ElementRegistry {
        &self.registry
    }

    /// Mutable catalog access, e.g. for loading a custom registry.
    pub fn registry_mut(&mut self) -> &mut ElementRegistry {
        &mut self.registry
    }

    pub fn document(&self) -> &Document {
        self.controller.document()
    }

    /// Ownership tag of this builder's document controller.
    pub fn scope(&self) -> Uuid {
        self.controller.scope()
    }

    fn changed(&mut self, reason: &str) {
        self.dispatcher.emit(BuilderEvent::FormChanged {
            reason: reason.to_string(),
        });
    }

    // --- structure -------------------------------------------------------

    pub fn add_row(&mut self) -> String {
        let id = self.controller.add_row();
        self.dispatcher.emit(BuilderEvent::ElementCreated {
            element_id: id.clone(),
            kind: ElementKind::Row,
            parent_id: None,
        });
        self.changed("row added");
        id
    }

    pub fn add_column(&mut self, row_id: &str) -> Result<String, DocumentError> {
        let id = self.controller.add_column(row_id)?;
        self.dispatcher.emit(BuilderEvent::ElementCreated {
            element_id: id.clone(),
            kind: ElementKind::Column,
            parent_id: Some(row_id.to_string()),
        });
        self.changed("column added");
        Ok(id)
    }

    pub fn add_field(&mut self, column_id: &str, registry_id: &str) -> Result<String, DocumentError> {
        let id = self
            .controller
            .add_field(column_id, registry_id, &self.registry)?;
        self.dispatcher.emit(BuilderEvent::ElementCreated {
            element_id: id.clone(),
            kind: ElementKind::Field,
            parent_id: Some(column_id.to_string()),
        });
        self.changed("field added");
        Ok(id)
    }

    pub fn create_form_element(&mut self) -> Result<String, DocumentError> {
        let id = self.controller.create_form_element(&self.registry)?;
        self.dispatcher.emit(BuilderEvent::ElementCreated {
            element_id: id.clone(),
            kind: ElementKind::Form,
            parent_id: None,
        });
        self.changed("form wrapper added");
        Ok(id)
    }

    /// Delete an element and its subtree. Stale ids are a silent no-op; a
    /// panel open on the element closes first.
    pub fn delete_element(&mut self, id: &str) {
        if self.panel.element_id() == Some(id) {
            self.panel.close();
        }
        if let Some(deleted) = self.controller.delete_element(id) {
            self.dispatcher.emit(BuilderEvent::ElementDeleted {
                element_id: deleted.element_id,
                kind: deleted.kind,
            });
            self.changed("element deleted");
        }
    }

    pub fn move_row(&mut self, row_id: &str, position: usize) {
        if let Some(final_position) = self.controller.move_row(row_id, position) {
            self.dispatcher.emit(BuilderEvent::ElementMoved {
                element_id: row_id.to_string(),
                kind: ElementKind::Row,
                parent_id: None,
                position: final_position,
            });
            self.changed("row moved");
        }
    }

    pub fn move_column(
        &mut self,
        column_id: &str,
        target_row_id: &str,
        position: usize,
    ) -> Result<(), DocumentError> {
        if let Some(final_position) = self
            .controller
            .move_column(column_id, target_row_id, position)?
        {
            self.dispatcher.emit(BuilderEvent::ElementMoved {
                element_id: column_id.to_string(),
                kind: ElementKind::Column,
                parent_id: Some(target_row_id.to_string()),
                position: final_position,
            });
            self.changed("column moved");
        }
        Ok(())
    }

    pub fn move_field(&mut self, field_id: &str, target_column_id: &str, position: usize) {
        if let Some(final_position) = self
            .controller
            .move_field(field_id, target_column_id, position)
        {
            self.dispatcher.emit(BuilderEvent::ElementMoved {
                element_id: field_id.to_string(),
                kind: ElementKind::Field,
                parent_id: Some(target_column_id.to_string()),
                position: final_position,
            });
            self.changed("field moved");
        }
    }

    // --- selection and panel ----------------------------------------------

    /// Select an element, open the property panel on it, and announce the
    /// selection. Unknown ids clear both selection and panel.
    pub fn select(&mut self, id: &str) -> Option<Selection> {
        match self.controller.select(id) {
            Some(selection) => {
                self.panel.open(&selection.element_id);
                self.dispatcher.emit(BuilderEvent::ElementSelected {
                    element_id: selection.element_id.clone(),
                    kind: selection.kind,
                });
                Some(selection)
            }
            None => {
                self.panel.close();
                None
            }
        }
    }

    pub fn selection(&self) -> Option<Selection> {
        self.controller.selection()
    }

    /// Panel model for the current selection: the element's schema reflected
    /// into sections and widgets, populated with its live values.
    pub fn panel_view(&self) -> Option<PanelView> {
        let selection = self.controller.selection()?;
        let config = self.registry.get(&selection.registry_id)?;
        let document = self.controller.document();
        let values = match selection.kind {
            ElementKind::Field => ElementValues::from(document.find_field(&selection.element_id)?),
            ElementKind::Row => ElementValues::from(document.find_row(&selection.element_id)?),
            ElementKind::Column => {
                ElementValues::from(document.find_column(&selection.element_id)?)
            }
            ElementKind::Form => ElementValues::from(document.form_element.as_ref()?),
        };
        Some(show_properties(
            &selection.element_id,
            values,
            config,
            selection.kind,
        ))
    }

    /// Stage a panel edit for the open element; nothing is written until
    /// [`FormBuilder::flush_properties`].
    pub fn stage_property(&mut self, section: PropertySection, key: &str, value: Value) {
        self.panel.stage(section, key, value);
    }

    /// Commit staged panel edits. Emits one `propertyChanged` per committed
    /// key and a single `formChanged` when anything was written.
    pub fn flush_properties(&mut self) -> Result<usize, DocumentError> {
        let committed = self.panel.flush(&mut self.controller, &mut self.dispatcher)?;
        if committed > 0 {
            self.changed("properties updated");
        }
        Ok(committed)
    }

    /// Delete whatever element the panel is open on.
    pub fn request_delete(&mut self) {
        if let Some(id) = self.panel.request_delete() {
            self.delete_element(&id);
        }
    }

    // --- interchange -------------------------------------------------------

    pub fn export(&mut self, metadata: &ExportMetadata) -> Envelope {
        let envelope = formgrid_interchange::export(self.controller.document(), metadata);
        self.dispatcher.emit(BuilderEvent::FormExported {
            version: envelope.version.clone(),
            row_count: envelope.rows.len(),
        });
        envelope
    }

    pub fn export_json(&mut self, metadata: &ExportMetadata) -> Result<String> {
        let envelope = self.export(metadata);
        serde_json::to_string_pretty(&envelope).context("serializing export envelope")
    }

    /// Replace the document with an imported payload (versioned envelope or
    /// legacy row array). On failure the current document is untouched.
    pub fn import_str(&mut self, raw: &str) -> Result<()> {
        let mut result = formgrid_interchange::import(raw).context("importing form document")?;

        // Legacy payloads carry no htmlTag; resolve it from the catalog so
        // the renderers can dispatch.
        for row in &mut result.document.rows {
            for column in &mut row.columns {
                for field in &mut column.fields {
                    if field.html_tag.is_empty() {
                        match self.registry.get(&field.element_registry_id) {
                            Some(config) => field.html_tag = config.html_tag.clone(),
                            None => log::warn!(
                                "imported field '{}' has element type '{}' not in the catalog",
                                field.id,
                                field.element_registry_id
                            ),
                        }
                    }
                }
            }
        }

        let row_count = result.document.rows.len();
        self.panel.close();
        self.controller.adopt(result.document);
        self.dispatcher.emit(BuilderEvent::FormImported {
            version: result.version,
            row_count,
        });
        self.changed("document imported");
        Ok(())
    }

    pub fn clear(&mut self) {
        self.panel.close();
        self.controller.clear();
        self.dispatcher.emit(BuilderEvent::FormCleared);
        self.changed("document cleared");
    }

    // --- output ------------------------------------------------------------

    /// Render the document as a standalone HTML page for `framework`
    /// (`basic`, `bootstrap`, `tailwind`, or `preview`).
    pub fn render(&self, framework: &str, options: &RenderOptions) -> Result<String> {
        let renderer = renderer_for(framework).context("selecting renderer")?;
        Ok(renderer.render_form(self.controller.document(), options))
    }

    /// Render the editing-canvas fragment with `data-element-id` markers.
    pub fn render_preview(&self) -> String {
        Renderer::new(Arc::new(PreviewStyle)).render_preview(self.controller.document())
    }

    /// Check every field's `validation` meta against its current value.
    pub fn validate(&self) -> Vec<ValidationIssue> {
        validate_document(self.controller.document())
    }
}
