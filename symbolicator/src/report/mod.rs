//! # Report Input and Lexing
//!
//! A report is kept as the ordered list of its lines, split on `\n` only, so
//! joining them back with `\n` reproduces the file byte for byte (including a
//! trailing newline and any `\r` before it).
//!
//! ## Module Structure
//!
//! - **`dialect`**: decides once whether a report is a crash or a sample report
//! - **`lexer`**: ordered line classifiers and `parse`, which never fails
//! - **`crash`** / **`sample`**: the dialect-specific rule sets used by `lexer`

pub mod crash;
pub mod dialect;
pub mod lexer;
pub mod sample;

pub use dialect::detect_dialect;
pub use lexer::{parse, ParsedReport};

use crate::domain::SymbolicationError;
use std::fs;
use std::path::{Path, PathBuf};

/// Raw diagnostic report, immutable once read
#[derive(Debug, Clone)]
pub struct Report {
    path: Option<PathBuf>,
    lines: Vec<String>,
}

impl Report {
    /// Read a UTF-8 report from disk
    ///
    /// # Errors
    /// Returns `ReportUnreadable` if the file cannot be read or is not UTF-8
    pub fn read(path: &Path) -> Result<Self, SymbolicationError> {
        let text = fs::read_to_string(path).map_err(|source| {
            SymbolicationError::ReportUnreadable { path: path.to_path_buf(), source }
        })?;
        let mut report = Self::from_text(&text);
        report.path = Some(path.to_path_buf());
        Ok(report)
    }

    /// Build a report from in-memory text
    #[must_use]
    pub fn from_text(text: &str) -> Self {
        Self { path: None, lines: text.split('\n').map(str::to_owned).collect() }
    }

    #[must_use]
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// The report reassembled exactly as it was read
    #[must_use]
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }

    /// A report with nothing but whitespace carries no lines worth parsing
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.iter().all(|line| line.trim().is_empty())
    }

    /// Lowercased file extension of the report, if it was read from disk
    #[must_use]
    pub fn extension(&self) -> Option<String> {
        self.path
            .as_deref()
            .and_then(Path::extension)
            .map(|ext| ext.to_string_lossy().to_lowercase())
    }
}
