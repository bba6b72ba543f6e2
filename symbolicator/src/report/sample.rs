//! Sample report rules
//!
//! Call-graph frames name their image with `(in <image>)` and carry the raw
//! address in brackets:
//!
//! ```text
//! +   2331 ???  (in Foo)  load address 0x10a1b0000 + 0x1234  [0x10a1b1234]
//! ```

use super::lexer::{static_regex, DialectRules};
use crate::domain::ImageKind;
use regex::Regex;
use std::sync::OnceLock;

pub struct SampleRules;

impl DialectRules for SampleRules {
    fn address_line(&self, _kind: ImageKind, name: &str, _bundle_id: &str) -> String {
        format!(r"\bin {}(?:\)|\s|$)", regex::escape(name))
    }

    fn address_token<'l>(&self, line: &'l str) -> Option<&'l str> {
        static RAW: OnceLock<Regex> = OnceLock::new();
        static_regex(&RAW, r"\[(0x[0-9A-Fa-f]+)\]")
            .captures(line)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
    }

    // Only `+`-marked image lines count: the header repeats the bundle id bare.
    fn app_image_line(&self, bundle_id: &str) -> String {
        format!(r"(?:^|\s)\+{}(?:\s|$)", regex::escape(bundle_id))
    }

    fn header_load_address(&self, lines: &[String]) -> Option<String> {
        lines
            .iter()
            .find_map(|line| line.strip_prefix("Load Address:"))
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    }
}
