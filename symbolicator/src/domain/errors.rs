//! Structured error types for symbolicator
//!
//! Using thiserror for automatic Display implementation and error chaining.
//! Every variant of `SymbolicationError` is terminal for the job that raised it.

use super::types::Field;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SymbolicationError {
    #[error("Report is empty")]
    EmptyReport,

    #[error("Could not find {0} in the report")]
    MissingField(Field),

    #[error("No usable dSYM: none of the supplied bundles contain Contents/Resources/DWARF")]
    NoUsableSymbolBundle,

    #[error("Please find appropriate dSYM with:\n {expected}")]
    UuidMismatch { expected: String },

    #[error("Symbol resolver produced no output for {image}")]
    EmptyResolverOutput { image: String },

    #[error("Failed to write {}: {source}", .path.display())]
    PersistFailure { path: PathBuf, source: std::io::Error },

    #[error("Failed to read report {}: {source}", .path.display())]
    ReportUnreadable { path: PathBuf, source: std::io::Error },

    #[error(transparent)]
    Tool(#[from] ToolError),

    #[error("Symbolication worker has stopped")]
    WorkerStopped,
}

#[derive(Error, Debug)]
pub enum ToolError {
    #[error("Failed to launch {tool}: {source}")]
    Spawn { tool: String, source: std::io::Error },

    #[error("{tool} did not finish within {}s", .timeout.as_secs())]
    Timeout { tool: String, timeout: Duration },

    #[error("{tool} exited with {}: {stderr}", describe_status(.status))]
    NonZeroExit { tool: String, status: Option<i32>, stderr: String },

    #[error("I/O error while running {tool}: {source}")]
    Io { tool: String, source: std::io::Error },

    #[error("Native resolver failed: {0}")]
    Native(String),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Cannot determine the home directory; pass --output-dir")]
    NoHomeDirectory,

    #[error("--timeout must be at least one second")]
    ZeroTimeout,
}

#[allow(clippy::ref_option)]
fn describe_status(status: &Option<i32>) -> String {
    status.map_or_else(|| "a signal".to_string(), |code| format!("status {code}"))
}
