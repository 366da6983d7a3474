//! Diagnostic logging setup

use tracing_subscriber::EnvFilter;

/// Verbosity levels for output
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Verbosity {
    Silent = 0,
    Quiet = 1,
    Normal = 2,
    Verbose = 3,
}

impl Verbosity {
    /// Filter directive for this level
    pub fn directive(self) -> &'static str {
        match self {
            Verbosity::Silent => "error",
            Verbosity::Quiet => "warn",
            Verbosity::Normal => "info",
            Verbosity::Verbose => "debug",
        }
    }
}

/// Build the filter, letting a non-empty `RUST_LOG` win over the level
pub fn env_filter(verbosity: Verbosity) -> EnvFilter {
    match std::env::var("RUST_LOG") {
        Ok(v) if !v.trim().is_empty() => {
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(verbosity.directive()))
        }
        _ => EnvFilter::new(verbosity.directive()),
    }
}

/// Install the global subscriber writing to stderr
///
/// Calling it more than once is harmless; later calls are ignored.
pub fn init(verbosity: Verbosity) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter(verbosity))
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
