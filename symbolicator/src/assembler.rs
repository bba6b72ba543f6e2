//! Report assembler
//!
//! Writes resolved symbols back into the report text and persists the result.
//! Lines that carry none of a mapping's raw addresses come out byte for byte
//! as they went in.

use crate::domain::{ResolvedMapping, Substitution, SymbolicationError};
use log::{debug, warn};
use regex::{Captures, Regex};
use std::fs;
use std::path::{Path, PathBuf};

/// Suffix appended to the report's base name
pub const OUTPUT_SUFFIX: &str = "_Symbolicated-File.txt";

/// Apply every pair of `mapping` to `text`, in mapping order
#[must_use]
pub fn apply(text: &str, mapping: &ResolvedMapping) -> String {
    let mut text = text.to_string();
    for (raw, symbol) in &mapping.pairs {
        // An unresolved address comes back as itself; keep the original label
        if symbol.trim().is_empty() || symbol == raw {
            continue;
        }
        text = match mapping.substitution {
            Substitution::Literal => replace_literal(&text, &mapping.image, raw, symbol),
            Substitution::Compound => replace_compound(&text, &mapping.image, raw, symbol),
        };
    }
    text
}

/// Replace `raw` on every line that names `image`
fn replace_literal(text: &str, image: &str, raw: &str, symbol: &str) -> String {
    text.split('\n')
        .map(|line| {
            if line.contains(image) && line.contains(raw) {
                line.replace(raw, symbol)
            } else {
                line.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// `RAW  <0xLOAD|image> + <offset>` becomes `RAW  <symbol>`
fn replace_compound(text: &str, image: &str, raw: &str, symbol: &str) -> String {
    let source = format!(
        r"{}(\s+)(?:0x[0-9A-Fa-f]+|{})\s+\+\s+\d+",
        regex::escape(raw),
        regex::escape(image)
    );
    match Regex::new(&source) {
        Ok(label) => label
            .replace_all(text, |caps: &Captures<'_>| format!("{raw}{}{symbol}", &caps[1]))
            .into_owned(),
        Err(e) => {
            warn!("Cannot substitute {raw} in {image} frames: {e}");
            text.to_string()
        }
    }
}

/// `<report base name>_Symbolicated-File.txt`
#[must_use]
pub fn output_file_name(report_path: &Path) -> String {
    let stem = report_path
        .file_stem()
        .map_or_else(|| "report".to_string(), |stem| stem.to_string_lossy().into_owned());
    format!("{stem}{OUTPUT_SUFFIX}")
}

/// Write `contents` into `output_dir`, which must already exist.
///
/// An existing file of the same name is overwritten.
///
/// # Errors
/// Returns `PersistFailure` if the file cannot be written
pub fn persist(
    output_dir: &Path,
    report_path: &Path,
    contents: &[u8],
) -> Result<PathBuf, SymbolicationError> {
    let path = output_dir.join(output_file_name(report_path));
    debug!("Writing {} bytes to {}", contents.len(), path.display());
    fs::write(&path, contents)
        .map_err(|source| SymbolicationError::PersistFailure { path: path.clone(), source })?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapping(image: &str, substitution: Substitution, pairs: &[(&str, &str)]) -> ResolvedMapping {
        ResolvedMapping {
            image: image.to_string(),
            substitution,
            pairs: pairs.iter().map(|(r, s)| ((*r).to_string(), (*s).to_string())).collect(),
        }
    }

    const CRASH: &str = "\
Thread 0 Crashed:
0   com.acme.Foo   0x000000010e8c6f43 0x10e8c5000 + 7999
1   libdyld.dylib  0x00007fff2030af3d start + 1
2   Foo            0x000000010e8c7001 Foo + 8193
";

    #[test]
    fn test_compound_replaces_label_and_offset() {
        let m = mapping(
            "Foo",
            Substitution::Compound,
            &[
                ("0x000000010e8c6f43", "-[AppDelegate crash] (in Foo) (AppDelegate.m:42)"),
                ("0x000000010e8c7001", "main (in Foo) (main.m:12)"),
            ],
        );
        let out = apply(CRASH, &m);
        let lines: Vec<&str> = out.split('\n').collect();
        assert_eq!(
            lines[1],
            "0   com.acme.Foo   0x000000010e8c6f43 -[AppDelegate crash] (in Foo) (AppDelegate.m:42)"
        );
        assert_eq!(lines[3], "2   Foo            0x000000010e8c7001 main (in Foo) (main.m:12)");
    }

    #[test]
    fn test_untouched_lines_pass_through() {
        let m = mapping("Foo", Substitution::Compound, &[("0x000000010e8c6f43", "main")]);
        let out = apply(CRASH, &m);
        for (before, after) in CRASH.split('\n').zip(out.split('\n')) {
            if !before.contains("0x000000010e8c6f43") {
                assert_eq!(before, after);
            }
        }
        assert!(out.ends_with('\n'));
    }

    #[test]
    fn test_apply_is_idempotent() {
        let m = mapping("Foo", Substitution::Compound, &[("0x000000010e8c7001", "main (in Foo)")]);
        let once = apply(CRASH, &m);
        assert_eq!(apply(&once, &m), once);

        let text = "+ 1 ??? (in Foo) load address 0x10a1b0000 + 0x1234 [0x10a1b1234]\n";
        let m = mapping("Foo", Substitution::Literal, &[("0x10a1b1234", "main (in Foo)")]);
        let once = apply(text, &m);
        assert_eq!(once, "+ 1 ??? (in Foo) load address 0x10a1b0000 + 0x1234 [main (in Foo)]\n");
        assert_eq!(apply(&once, &m), once);
    }

    #[test]
    fn test_literal_is_scoped_to_lines_naming_the_image() {
        let text = "\
+ 1 ??? (in Foo) [0x10a1b1234]
Note: 0x10a1b1234 mentioned elsewhere
";
        let m = mapping("Foo", Substitution::Literal, &[("0x10a1b1234", "main")]);
        assert_eq!(apply(text, &m), "+ 1 ??? (in Foo) [main]\nNote: 0x10a1b1234 mentioned elsewhere\n");
    }

    #[test]
    fn test_unresolved_address_keeps_label() {
        let m = mapping("Foo", Substitution::Compound, &[("0x000000010e8c7001", "0x000000010e8c7001")]);
        assert_eq!(apply(CRASH, &m), CRASH);
    }

    #[test]
    fn test_symbol_with_dollar_sign_is_literal() {
        let m = mapping("Foo", Substitution::Compound, &[("0x000000010e8c7001", "$s3Foo4mainyyF")]);
        assert!(apply(CRASH, &m).contains("0x000000010e8c7001 $s3Foo4mainyyF"));
    }

    #[test]
    fn test_output_file_name() {
        assert_eq!(
            output_file_name(Path::new("/tmp/Foo_2024-01-01.crash")),
            "Foo_2024-01-01_Symbolicated-File.txt"
        );
        assert_eq!(output_file_name(Path::new("sample.txt")), "sample_Symbolicated-File.txt");
    }

    #[test]
    fn test_persist_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let report = Path::new("/reports/Foo.crash");
        persist(dir.path(), report, b"first").unwrap();
        let path = persist(dir.path(), report, b"second").unwrap();
        assert_eq!(path, dir.path().join("Foo_Symbolicated-File.txt"));
        assert_eq!(fs::read_to_string(path).unwrap(), "second");
    }

    #[test]
    fn test_persist_into_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let err = persist(&dir.path().join("missing"), Path::new("Foo.crash"), b"x").unwrap_err();
        assert!(matches!(err, SymbolicationError::PersistFailure { .. }));
    }
}
