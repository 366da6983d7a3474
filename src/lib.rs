//! rsdk - A declarative task automation SDK
//!
//! Tasks and task sets are declared in YAML records. At run time the engine
//! assembles them into a task graph, composes their lifecycle hooks, filters
//! task set members by tag and stage, and resolves placeholder values from
//! external input, settings, defaults or an interactive prompt.

// Public modules
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod resolver;
pub mod settings;
pub mod task;

// Re-export commonly used types
pub use error::{Result, SdkError};

/// Current version of rsdk
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
