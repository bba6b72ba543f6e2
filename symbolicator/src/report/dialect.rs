//! Dialect detection
//!
//! Content markers decide first; the file extension breaks ties the way the
//! report picker mapped `.txt` to sample reports and `.crash` to crash reports.

use super::Report;
use crate::domain::Dialect;
use log::debug;

const SAMPLE_MARKERS: &[&str] = &["Call graph:", "Analysis of sampling", "Load Address:"];
const CRASH_MARKERS: &[&str] = &["Exception Type:", "Crashed Thread:", "Triggered by Thread:"];

/// Decide which rule set reads `report`
#[must_use]
pub fn detect_dialect(report: &Report) -> Dialect {
    if let Some(dialect) = from_content(report.lines()) {
        debug!("Dialect {dialect} detected from report content");
        return dialect;
    }

    let dialect = match report.extension().as_deref() {
        Some("txt") => Dialect::Sample,
        _ => Dialect::Crash,
    };
    debug!("Dialect {dialect} chosen from file extension");
    dialect
}

fn from_content(lines: &[String]) -> Option<Dialect> {
    for line in lines {
        let line = line.trim_start();
        if SAMPLE_MARKERS.iter().any(|m| line.starts_with(m)) {
            return Some(Dialect::Sample);
        }
        if CRASH_MARKERS.iter().any(|m| line.starts_with(m)) || is_crashed_thread_header(line) {
            return Some(Dialect::Crash);
        }
    }
    None
}

/// `Thread 0 Crashed:` / `Thread 3 Crashed:: Dispatch queue: ...`
fn is_crashed_thread_header(line: &str) -> bool {
    line.strip_prefix("Thread ").is_some_and(|rest| {
        let digits = rest.chars().take_while(char::is_ascii_digit).count();
        digits > 0 && rest[digits..].starts_with(" Crashed")
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_sample_markers() {
        let report = Report::from_text("Analysis of sampling Foo (pid 1)\nProcess: Foo [1]\n");
        assert_eq!(detect_dialect(&report), Dialect::Sample);
    }

    #[test]
    fn test_crash_markers() {
        let report = Report::from_text("Process: Foo [1]\nThread 0 Crashed:: main\n");
        assert_eq!(detect_dialect(&report), Dialect::Crash);

        let report = Report::from_text("Exception Type:  EXC_BAD_ACCESS (SIGSEGV)\n");
        assert_eq!(detect_dialect(&report), Dialect::Crash);
    }

    #[test]
    fn test_thread_header_needs_a_number() {
        assert!(is_crashed_thread_header("Thread 12 Crashed:"));
        assert!(!is_crashed_thread_header("Thread Crashed:"));
        assert!(!is_crashed_thread_header("Thread 1:"));
    }

    #[test]
    fn test_extension_fallback() {
        let dir = tempfile::tempdir().unwrap();

        let txt = dir.path().join("report.txt");
        fs::write(&txt, "Process: Foo [1]\n").unwrap();
        assert_eq!(detect_dialect(&Report::read(&txt).unwrap()), Dialect::Sample);

        let crash = dir.path().join("report.crash");
        fs::write(&crash, "Process: Foo [1]\n").unwrap();
        assert_eq!(detect_dialect(&Report::read(&crash).unwrap()), Dialect::Crash);
    }

    #[test]
    fn test_defaults_to_crash() {
        assert_eq!(detect_dialect(&Report::from_text("Identifier: com.x.y\n")), Dialect::Crash);
    }
}
