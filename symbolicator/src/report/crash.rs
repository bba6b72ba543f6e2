//! Crash report rules
//!
//! Frames look like
//!
//! ```text
//! 0   com.acme.Foo              0x000000010e8c6f43 0x10e8c5000 + 7999
//! 1   Foo                       0x000000010e8c7001 Foo + 8193
//! 2   com.acme.Foo.Networking   0x000000010f001234 0x10f000000 + 4660
//! ```
//!
//! The raw address is the first `0x00...` token of a frame line. App frames
//! are annotated either with the bundle identifier or with `<process> +`.

use super::lexer::{static_regex, DialectRules};
use crate::domain::ImageKind;
use regex::Regex;
use std::sync::OnceLock;

pub struct CrashRules;

impl DialectRules for CrashRules {
    fn address_line(&self, kind: ImageKind, name: &str, bundle_id: &str) -> String {
        let name = regex::escape(name);
        match kind {
            ImageKind::App => format!(r"(?:^|\s){name}\s+\+"),
            ImageKind::AppBundle => format!(r"(?:^|\s)\+?{name}\s"),
            // Frames spell frameworks as `<bundle id>.<framework>`
            ImageKind::Framework => {
                format!(r"(?:^|\s)\+?{}\.{name}(?:\s|$)", regex::escape(bundle_id))
            }
        }
    }

    fn address_token<'l>(&self, line: &'l str) -> Option<&'l str> {
        static RAW: OnceLock<Regex> = OnceLock::new();
        static_regex(&RAW, r"\b0x00[0-9A-Fa-f]*").find(line).map(|m| m.as_str())
    }

    fn app_image_line(&self, bundle_id: &str) -> String {
        format!(r"(?:^|\s)\+?{}(?:\s|$)", regex::escape(bundle_id))
    }
}
