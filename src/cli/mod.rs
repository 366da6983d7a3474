//! Command line interface

pub mod app;
pub mod output;

pub use app::{build_command, run};
