//! Task record parsing and validation
//!
//! This module handles discovery of task YAML files and turns them into
//! validated [`TaskRecord`]s for the assembler.

pub mod parse;
pub mod schema;
pub mod types;

// Re-export main types
pub use parse::*;
pub use schema::*;
pub use types::*;
