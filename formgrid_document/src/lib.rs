//! Mutation layer for form documents: structural edits, id allocation,
//! selection tracking, and the ownership boundary.

pub mod allocator;
pub mod controller;

pub use allocator::IdAllocator;
pub use controller::{
    DeletedElement, DocumentController, DocumentError, Selection, MAX_COLUMNS_PER_ROW,
};
