//! Domain model for symbolicator
//!
//! This module contains the value types that flow through one symbolication
//! run and the errors that can end it:
//! - Report-derived bindings (`ImageBinding`) and bundle lookups (`SymbolBundle`)
//! - Units of resolver work (`SymbolicationTask`) and their results (`ResolvedMapping`)
//! - Structured error handling

pub mod errors;
pub mod types;

// Re-export common types for convenience
pub use types::{
    uuid_matches, Dialect, Field, ImageBinding, ImageKind, ReportOutput, ResolvedMapping,
    Substitution, SymbolBundle, SymbolicationTask,
};

pub use errors::{ConfigError, SymbolicationError, ToolError};
