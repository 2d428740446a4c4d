//! HTML renderers for form documents. One shared tag-dispatch table drives
//! every target; a [`FrameworkStyle`] supplies the per-framework classes and
//! wrappers for basic, Bootstrap, Tailwind, and editable preview output.

pub mod dispatch;
pub mod options;
pub mod renderer;
pub mod style;

pub use dispatch::{render_field, supported_tags};
pub use options::{escape_html, parse_option_lines, OptionItem, RenderOptions};
pub use renderer::{renderer_for, RenderError, Renderer, FRAMEWORKS};
pub use style::{BasicStyle, BootstrapStyle, FrameworkStyle, PreviewStyle, TailwindStyle};
