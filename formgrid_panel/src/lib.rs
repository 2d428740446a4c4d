//! Property panel model: reflects an element's schema into widget
//! descriptions and stages debounced edits until the host flushes them.

pub mod session;
pub mod view;

pub use session::PanelSession;
pub use view::{
    can_have_extended_properties, show_properties, widget_for, ElementValues, PanelSection,
    PanelView, PanelWidget, WidgetKind,
};
