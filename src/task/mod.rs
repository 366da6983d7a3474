//! Task graph engine
//!
//! This module holds the runtime task model, tag and stage filtering, graph
//! assembly from records and placeholder rendering into command lines.

pub mod assemble;
pub mod filter;
pub mod model;
pub mod render;
pub mod repository;

// Re-export main types
pub use assemble::*;
pub use filter::*;
pub use model::*;
pub use render::*;
pub use repository::*;
