//! Form model operations
//!
//! The editing session ([`FormBuilder`]), interaction rules for rendered fields
//! ([`input`]) and metadata edits for a single field ([`editor`]).

pub mod builder;
pub mod editor;
pub mod input;

pub use builder::{FormBuilder, IdAllocator, SubmitOutcome, DEFAULT_TITLE};
pub use input::{apply, parse_tags, Interaction};
