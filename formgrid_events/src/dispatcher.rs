use serde::Serialize;
use serde_json::Value;

use formgrid_schema::{ElementKind, PropertySection};

/// Everything the builder tells its host. Each payload carries enough to
/// reconstruct the change without re-querying builder state.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum BuilderEvent {
    BuilderReady {
        element_types: usize,
    },
    ElementSelected {
        element_id: String,
        kind: ElementKind,
    },
    ElementCreated {
        element_id: String,
        kind: ElementKind,
        parent_id: Option<String>,
    },
    ElementDeleted {
        element_id: String,
        kind: ElementKind,
    },
    ElementMoved {
        element_id: String,
        kind: ElementKind,
        parent_id: Option<String>,
        position: usize,
    },
    PropertyChanged {
        element_id: String,
        property: String,
        value: Value,
        section: PropertySection,
    },
    FormChanged {
        reason: String,
    },
    FormExported {
        version: String,
        row_count: usize,
    },
    FormImported {
        version: Option<String>,
        row_count: usize,
    },
    FormCleared,
}

impl BuilderEvent {
    /// Wire name of the event, matching the serialized `event` tag.
    pub fn name(&self) -> &'static str {
        match self {
            BuilderEvent::BuilderReady { .. } => "builderReady",
            BuilderEvent::ElementSelected { .. } => "elementSelected",
            BuilderEvent::ElementCreated { .. } => "elementCreated",
            BuilderEvent::ElementDeleted { .. } => "elementDeleted",
            BuilderEvent::ElementMoved { .. } => "elementMoved",
            BuilderEvent::PropertyChanged { .. } => "propertyChanged",
            BuilderEvent::FormChanged { .. } => "formChanged",
            BuilderEvent::FormExported { .. } => "formExported",
            BuilderEvent::FormImported { .. } => "formImported",
            BuilderEvent::FormCleared => "formCleared",
        }
    }
}

/// Callback invoked for every emitted event.
pub type EventCallback = Box<dyn FnMut(&BuilderEvent) + Send>;

/// Per-builder subscription list. Mutation handlers run to completion on the
/// calling thread, so emission is synchronous and ordered.
#[derive(Default)]
pub struct EventDispatcher {
    subscribers: Vec<EventCallback>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        EventDispatcher {
            subscribers: Vec::new(),
        }
    }

    pub fn subscribe(&mut self, callback: impl FnMut(&BuilderEvent) + Send + 'static) {
        self.subscribers.push(Box::new(callback));
    }

    pub fn emit(&mut self, event: BuilderEvent) {
        for subscriber in &mut self.subscribers {
            subscriber(&event);
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}

impl std::fmt::Debug for EventDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventDispatcher")
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}
