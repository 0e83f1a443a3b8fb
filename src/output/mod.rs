//! Output writers and input readers for trace documents.

pub mod json;

// Re-export main functions
pub use json::{emit_json, read_json, write_json};
