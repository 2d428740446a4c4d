pub mod catalog;
pub mod registry;

pub use catalog::builtin_catalog;
pub use registry::{ElementRegistry, RegistryError};
