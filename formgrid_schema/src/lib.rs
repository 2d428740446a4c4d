pub mod config;
pub mod document;
pub mod validation;

pub use config::*;
pub use document::*;
pub use validation::*;
