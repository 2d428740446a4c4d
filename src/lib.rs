//! Headless form builder: an element catalog, a row/column/field document
//! with safe mutation, a property-panel model, HTML renderers for several
//! CSS frameworks, and versioned JSON interchange. [`FormBuilder`] wires the
//! pieces together and notifies the host of every change.

pub mod builder;

pub use builder::FormBuilder;

pub use formgrid_document::{DocumentController, DocumentError, Selection, MAX_COLUMNS_PER_ROW};
pub use formgrid_events::{BuilderEvent, EventCallback, EventDispatcher};
pub use formgrid_interchange::{Envelope, ExportMetadata, ImportError, CURRENT_VERSION};
pub use formgrid_panel::{PanelSection, PanelView, PanelWidget, WidgetKind};
pub use formgrid_registry::{ElementRegistry, RegistryError};
pub use formgrid_render::{RenderError, RenderOptions, FRAMEWORKS};
pub use formgrid_schema::{
    Category, Column, Document, ElementConfig, ElementKind, Field, FormElement, PropertyDef,
    PropertyMap, PropertySection, PropertyType, Row, ValidationIssue,
};
