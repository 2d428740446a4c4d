use serde_json::Value;
use thiserror::Error;
use uuid::Uuid;

use formgrid_registry::ElementRegistry;
use formgrid_schema::{
    Column, Document, ElementKind, EventBinding, EventTarget, Field, FormElement, PropertySection,
    Row,
};

use crate::allocator::IdAllocator;

/// Hard cap on columns per row; the grid has 12 units and every column is at
/// least one unit wide.
pub const MAX_COLUMNS_PER_ROW: usize = 12;

const GRID_UNITS: u8 = 12;

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("unknown element id '{0}'")]
    UnknownId(String),
    #[error("unknown element type '{0}'")]
    UnknownElementType(String),
    #[error("row '{row_id}' already holds the maximum of 12 columns")]
    ColumnLimit { row_id: String },
    #[error("the document already has a form wrapper '{0}'")]
    DuplicateFormElement(String),
    #[error("scope tag {presented} does not belong to this document (expected {expected})")]
    ForeignScope { presented: Uuid, expected: Uuid },
    #[error("{kind} elements have no {section} section")]
    SectionNotSupported {
        kind: ElementKind,
        section: PropertySection,
    },
    #[error("invalid event binding for '{key}': {reason}")]
    InvalidEventBinding { key: String, reason: String },
}

/// A resolved single selection: the element, what it is, and the registry id
/// its schema lives under. Rows, columns, and the form wrapper resolve to the
/// built-in layout entries of the same name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub element_id: String,
    pub kind: ElementKind,
    pub registry_id: String,
}

/// What `delete_element` removed, for host notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletedElement {
    pub element_id: String,
    pub kind: ElementKind,
}

/// Owns one document tree and everything needed to mutate it safely: the id
/// allocator, the single-selection state, and the instance's ownership tag.
///
/// All mutation is synchronous and validate-before-commit: a rejected
/// operation leaves the tree exactly as it was.
#[derive(Debug)]
pub struct DocumentController {
    document: Document,
    ids: IdAllocator,
    selection: Option<String>,
    tag: Uuid,
}

impl Default for DocumentController {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentController {
    pub fn new() -> Self {
        DocumentController {
            document: Document::new(),
            ids: IdAllocator::new(),
            selection: None,
            tag: Uuid::new_v4(),
        }
    }

    /// Take over a loaded document. Id counters are rebuilt from the ids
    /// already present in the tree, so generated ids never collide with
    /// loaded ones.
    pub fn adopt(&mut self, document: Document) {
        self.ids = IdAllocator::rebuild_from(&document);
        self.document = document;
        self.selection = None;
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Empty the tree. Counters keep running so ids stay unique across the
    /// whole session, cleared documents included.
    pub fn clear(&mut self) {
        self.document.clear();
        self.selection = None;
    }

    /// The ownership tag identifying this controller instance.
    pub fn scope(&self) -> Uuid {
        self.tag
    }

    /// Ownership/boundary gate: callers holding an element reference from
    /// some builder instance present that instance's tag here, and only get
    /// mutable access when it is this controller's own. Cross-instance
    /// operations are refused before they can touch the tree.
    pub fn scoped(&mut self, tag: Uuid) -> Result<&mut Self, DocumentError> {
        if tag != self.tag {
            return Err(DocumentError::ForeignScope {
                presented: tag,
                expected: self.tag,
            });
        }
        Ok(self)
    }

    // --- creation ------------------------------------------------------

    /// Append an empty row and return its generated id.
    pub fn add_row(&mut self) -> String {
        let id = self.ids.next_id("row");
        self.document.rows.push(Row::new(&id));
        id
    }

    /// Append a column to `row_id` and rebalance the row's widths to an
    /// equal split of the 12 grid units, remainder units going to the
    /// earliest columns.
    pub fn add_column(&mut self, row_id: &str) -> Result<String, DocumentError> {
        let row = self
            .document
            .find_row(row_id)
            .ok_or_else(|| DocumentError::UnknownId(row_id.to_string()))?;
        if row.columns.len() >= MAX_COLUMNS_PER_ROW {
            return Err(DocumentError::ColumnLimit {
                row_id: row_id.to_string(),
            });
        }
        let id = self.ids.next_id("column");
        let row = self
            .document
            .find_row_mut(row_id)
            .ok_or_else(|| DocumentError::UnknownId(row_id.to_string()))?;
        row.columns.push(Column::new(&id, GRID_UNITS));
        redistribute_widths(row);
        Ok(id)
    }

    /// Instantiate an element type from the registry inside `column_id`.
    /// An unresolved type aborts the operation without touching the tree.
    pub fn add_field(
        &mut self,
        column_id: &str,
        registry_id: &str,
        registry: &ElementRegistry,
    ) -> Result<String, DocumentError> {
        let Some(config) = registry.get(registry_id) else {
            log::warn!("cannot add field: unknown element type '{registry_id}'");
            return Err(DocumentError::UnknownElementType(registry_id.to_string()));
        };
        if self.document.find_column(column_id).is_none() {
            return Err(DocumentError::UnknownId(column_id.to_string()));
        }
        let id = self.ids.next_id(registry_id);
        let field = Field::from_config(&id, config);
        let column = self
            .document
            .find_column_mut(column_id)
            .ok_or_else(|| DocumentError::UnknownId(column_id.to_string()))?;
        column.fields.push(field);
        Ok(id)
    }

    /// Create the document's single `<form>` wrapper from the registry's
    /// `form` entry. Rejected while one already exists.
    pub fn create_form_element(
        &mut self,
        registry: &ElementRegistry,
    ) -> Result<String, DocumentError> {
        if let Some(existing) = &self.document.form_element {
            return Err(DocumentError::DuplicateFormElement(existing.id.clone()));
        }
        let Some(config) = registry.get("form") else {
            log::warn!("cannot create form wrapper: registry has no 'form' entry");
            return Err(DocumentError::UnknownElementType("form".to_string()));
        };
        let id = self.ids.next_id("form");
        self.document.form_element = Some(FormElement::from_config(&id, config));
        Ok(id)
    }

    // --- deletion ------------------------------------------------------

    /// Remove an element and everything it owns: a row takes its columns and
    /// their fields with it, a column its fields. Deleting the form wrapper
    /// leaves the rows untouched. Unknown ids are an idempotent no-op.
    pub fn delete_element(&mut self, id: &str) -> Option<DeletedElement> {
        let Some(kind) = self.document.element_kind(id) else {
            log::debug!("delete of unknown element '{id}' ignored");
            return None;
        };
        match kind {
            ElementKind::Form => {
                self.document.form_element = None;
            }
            ElementKind::Row => {
                self.document.rows.retain(|r| r.id != id);
            }
            ElementKind::Column => {
                for row in &mut self.document.rows {
                    let before = row.columns.len();
                    row.columns.retain(|c| c.id != id);
                    if row.columns.len() != before {
                        redistribute_widths(row);
                        break;
                    }
                }
            }
            ElementKind::Field => {
                'rows: for row in &mut self.document.rows {
                    for column in &mut row.columns {
                        if let Some(pos) = column.fields.iter().position(|f| f.id == id) {
                            column.fields.remove(pos);
                            break 'rows;
                        }
                    }
                }
            }
        }
        // A cascade may have taken the selected element with it.
        if let Some(selected) = &self.selection {
            if self.document.element_kind(selected).is_none() {
                self.selection = None;
            }
        }
        Some(DeletedElement {
            element_id: id.to_string(),
            kind,
        })
    }

    // --- moves ---------------------------------------------------------

    /// Move a row to `position` (clamped). Stale ids are a logged no-op.
    /// Returns the final position.
    pub fn move_row(&mut self, row_id: &str, position: usize) -> Option<usize> {
        let Some(from) = self.document.rows.iter().position(|r| r.id == row_id) else {
            log::debug!("move of unknown row '{row_id}' ignored");
            return None;
        };
        let row = self.document.rows.remove(from);
        let to = position.min(self.document.rows.len());
        self.document.rows.insert(to, row);
        Some(to)
    }

    /// Move a column into `target_row_id` at `position` (clamped), keeping
    /// ownership exclusive: the column leaves its old row in the same step.
    /// Both rows rebalance. Stale column or target ids are a logged no-op;
    /// a full target row is a capacity rejection.
    pub fn move_column(
        &mut self,
        column_id: &str,
        target_row_id: &str,
        position: usize,
    ) -> Result<Option<usize>, DocumentError> {
        let Some((source_row, source_pos)) = locate_column(&self.document, column_id) else {
            log::debug!("move of unknown column '{column_id}' ignored");
            return Ok(None);
        };
        let Some(target_row) = self
            .document
            .rows
            .iter()
            .position(|r| r.id == target_row_id)
        else {
            log::debug!("move of column '{column_id}' to unknown row '{target_row_id}' ignored");
            return Ok(None);
        };
        if source_row != target_row
            && self.document.rows[target_row].columns.len() >= MAX_COLUMNS_PER_ROW
        {
            return Err(DocumentError::ColumnLimit {
                row_id: target_row_id.to_string(),
            });
        }

        let column = self.document.rows[source_row].columns.remove(source_pos);
        let to = position.min(self.document.rows[target_row].columns.len());
        self.document.rows[target_row].columns.insert(to, column);

        redistribute_widths(&mut self.document.rows[target_row]);
        if source_row != target_row {
            redistribute_widths(&mut self.document.rows[source_row]);
        }
        Ok(Some(to))
    }

    /// Move a field into `target_column_id` at `position` (clamped). Stale
    /// field or target ids are a logged no-op. Returns the final position.
    pub fn move_field(
        &mut self,
        field_id: &str,
        target_column_id: &str,
        position: usize,
    ) -> Option<usize> {
        let Some((source_row, source_col, source_pos)) = locate_field(&self.document, field_id)
        else {
            log::debug!("move of unknown field '{field_id}' ignored");
            return None;
        };
        let Some((target_row, target_col)) = locate_column(&self.document, target_column_id)
        else {
            log::debug!(
                "move of field '{field_id}' to unknown column '{target_column_id}' ignored"
            );
            return None;
        };
        let field = self.document.rows[source_row].columns[source_col]
            .fields
            .remove(source_pos);
        let target = &mut self.document.rows[target_row].columns[target_col];
        let to = position.min(target.fields.len());
        target.fields.insert(to, field);
        Some(to)
    }

    // --- selection -----------------------------------------------------

    /// Track `id` as the current element and resolve what it is. Selecting
    /// an id that no longer exists clears the selection.
    pub fn select(&mut self, id: &str) -> Option<Selection> {
        match self.resolve(id) {
            Some(selection) => {
                self.selection = Some(selection.element_id.clone());
                Some(selection)
            }
            None => {
                log::debug!("selection of unknown element '{id}' cleared");
                self.selection = None;
                None
            }
        }
    }

    /// The current selection, re-resolved against the live tree.
    pub fn selection(&self) -> Option<Selection> {
        self.selection.as_deref().and_then(|id| self.resolve(id))
    }

    pub fn clear_selection(&mut self) {
        self.selection = None;
    }

    fn resolve(&self, id: &str) -> Option<Selection> {
        let kind = self.document.element_kind(id)?;
        let registry_id = match kind {
            ElementKind::Field => self.document.find_field(id)?.element_registry_id.clone(),
            ElementKind::Row => "row".to_string(),
            ElementKind::Column => "column".to_string(),
            ElementKind::Form => "form".to_string(),
        };
        Some(Selection {
            element_id: id.to_string(),
            kind,
            registry_id,
        })
    }

    // --- property write-back --------------------------------------------

    /// Write one edited value into the named section of a live element.
    /// Rows and columns only carry plain properties; the form wrapper has no
    /// alpine section. Event bindings with an empty action and empty alpine
    /// expressions remove the key instead of storing dead weight.
    pub fn set_property(
        &mut self,
        id: &str,
        section: PropertySection,
        key: &str,
        value: Value,
    ) -> Result<(), DocumentError> {
        let kind = self
            .document
            .element_kind(id)
            .ok_or_else(|| DocumentError::UnknownId(id.to_string()))?;

        match kind {
            ElementKind::Row => {
                if section != PropertySection::Properties {
                    return Err(DocumentError::SectionNotSupported { kind, section });
                }
                let row = self
                    .document
                    .find_row_mut(id)
                    .ok_or_else(|| DocumentError::UnknownId(id.to_string()))?;
                row.properties.insert(key.to_string(), value);
            }
            ElementKind::Column => {
                if section != PropertySection::Properties {
                    return Err(DocumentError::SectionNotSupported { kind, section });
                }
                let column = self
                    .document
                    .find_column_mut(id)
                    .ok_or_else(|| DocumentError::UnknownId(id.to_string()))?;
                column.properties.insert(key.to_string(), value);
            }
            ElementKind::Field => {
                let field = self
                    .document
                    .find_field_mut(id)
                    .ok_or_else(|| DocumentError::UnknownId(id.to_string()))?;
                match section {
                    PropertySection::Properties => {
                        field.properties.insert(key.to_string(), value);
                    }
                    PropertySection::Meta => {
                        field.meta.insert(key.to_string(), value);
                    }
                    PropertySection::Events => match binding_from_value(key, value)? {
                        Some(binding) => {
                            field.events.insert(key.to_string(), binding);
                        }
                        None => {
                            field.events.shift_remove(key);
                        }
                    },
                    PropertySection::Alpine => {
                        let expression = alpine_expression(value);
                        if expression.is_empty() {
                            field.alpine.shift_remove(key);
                        } else {
                            field.alpine.insert(key.to_string(), expression);
                        }
                    }
                }
            }
            ElementKind::Form => {
                let form = self
                    .document
                    .form_element
                    .as_mut()
                    .ok_or_else(|| DocumentError::UnknownId(id.to_string()))?;
                match section {
                    PropertySection::Properties => {
                        form.properties.insert(key.to_string(), value);
                    }
                    PropertySection::Meta => {
                        form.meta.insert(key.to_string(), value);
                    }
                    PropertySection::Events => match binding_from_value(key, value)? {
                        Some(binding) => {
                            form.events.insert(key.to_string(), binding);
                        }
                        None => {
                            form.events.shift_remove(key);
                        }
                    },
                    PropertySection::Alpine => {
                        return Err(DocumentError::SectionNotSupported { kind, section });
                    }
                }
            }
        }
        Ok(())
    }
}

/// Equal split of the 12 grid units across a row's columns, the `12 % n`
/// remainder units assigned to the earliest columns. Custom widths are
/// deliberately overwritten; redistribution is the documented behavior.
fn redistribute_widths(row: &mut Row) {
    let n = row.columns.len();
    if n == 0 {
        return;
    }
    // Divide in usize: imported rows can hold more columns than add_column
    // ever allows, and casting the count to u8 first would wrap at 256.
    let base = (GRID_UNITS as usize / n) as u8;
    let remainder = GRID_UNITS as usize % n;
    for (index, column) in row.columns.iter_mut().enumerate() {
        column.width = if index < remainder { base + 1 } else { base };
    }
}

fn locate_column(document: &Document, column_id: &str) -> Option<(usize, usize)> {
    for (row_index, row) in document.rows.iter().enumerate() {
        if let Some(col_index) = row.columns.iter().position(|c| c.id == column_id) {
            return Some((row_index, col_index));
        }
    }
    None
}

fn locate_field(document: &Document, field_id: &str) -> Option<(usize, usize, usize)> {
    for (row_index, row) in document.rows.iter().enumerate() {
        for (col_index, column) in row.columns.iter().enumerate() {
            if let Some(field_index) = column.fields.iter().position(|f| f.id == field_id) {
                return Some((row_index, col_index, field_index));
            }
        }
    }
    None
}

/// Panel event widgets hand over either a bare action string or a full
/// binding object. An empty action means "unbind".
fn binding_from_value(key: &str, value: Value) -> Result<Option<EventBinding>, DocumentError> {
    match value {
        Value::String(action) => {
            if action.trim().is_empty() {
                Ok(None)
            } else {
                Ok(Some(EventBinding::new(&action, EventTarget::Vanilla)))
            }
        }
        Value::Null => Ok(None),
        object @ Value::Object(_) => serde_json::from_value(object)
            .map(Some)
            .map_err(|e| DocumentError::InvalidEventBinding {
                key: key.to_string(),
                reason: e.to_string(),
            }),
        _ => Err(DocumentError::InvalidEventBinding {
            key: key.to_string(),
            reason: "expected an action string or a binding object".to_string(),
        }),
    }
}

fn alpine_expression(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
