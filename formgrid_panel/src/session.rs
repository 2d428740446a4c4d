use indexmap::IndexMap;
use serde_json::Value;

use formgrid_document::{DocumentController, DocumentError};
use formgrid_events::{BuilderEvent, EventDispatcher};
use formgrid_schema::PropertySection;

/// Staged property edits for the element the panel is showing.
///
/// Hosts debounce keystrokes by staging every change and flushing once the
/// user pauses; staging the same key twice keeps only the last value, so one
/// flush commits one write per property.
#[derive(Debug, Default)]
pub struct PanelSession {
    element_id: Option<String>,
    staged: IndexMap<(PropertySection, String), Value>,
}

impl PanelSession {
    pub fn new() -> Self {
        PanelSession::default()
    }

    /// Point the session at an element. Switching elements drops edits that
    /// were never flushed.
    pub fn open(&mut self, element_id: &str) {
        if self.element_id.as_deref() != Some(element_id) {
            if !self.staged.is_empty() {
                log::debug!(
                    "panel switched to '{element_id}' with {} unflushed edits dropped",
                    self.staged.len()
                );
            }
            self.staged.clear();
        }
        self.element_id = Some(element_id.to_string());
    }

    pub fn close(&mut self) {
        self.element_id = None;
        self.staged.clear();
    }

    pub fn element_id(&self) -> Option<&str> {
        self.element_id.as_deref()
    }

    pub fn pending(&self) -> usize {
        self.staged.len()
    }

    /// Stage one edit, coalescing with any earlier edit of the same key.
    /// Ignored while no element is open.
    pub fn stage(&mut self, section: PropertySection, key: &str, value: Value) {
        if self.element_id.is_none() {
            log::debug!("staged edit '{key}' ignored: no element open");
            return;
        }
        self.staged.insert((section, key.to_string()), value);
    }

    /// Commit every staged edit through the controller, emitting one
    /// `propertyChanged` per committed key. Returns how many were committed.
    /// An empty session flushes as a no-op; a session whose element has
    /// vanished drops its edits and closes.
    pub fn flush(
        &mut self,
        controller: &mut DocumentController,
        dispatcher: &mut EventDispatcher,
    ) -> Result<usize, DocumentError> {
        let Some(element_id) = self.element_id.clone() else {
            return Ok(0);
        };
        let staged = std::mem::take(&mut self.staged);
        let mut committed = 0;
        for ((section, key), value) in staged {
            match controller.set_property(&element_id, section, &key, value.clone()) {
                Ok(()) => {
                    committed += 1;
                    dispatcher.emit(BuilderEvent::PropertyChanged {
                        element_id: element_id.clone(),
                        property: key,
                        value,
                        section,
                    });
                }
                Err(DocumentError::UnknownId(_)) => {
                    log::debug!("flush dropped: element '{element_id}' no longer exists");
                    self.close();
                    return Ok(committed);
                }
                Err(other) => return Err(other),
            }
        }
        Ok(committed)
    }

    /// Hand back the open element's id for deletion and close the panel.
    pub fn request_delete(&mut self) -> Option<String> {
        self.staged.clear();
        self.element_id.take()
    }
}
