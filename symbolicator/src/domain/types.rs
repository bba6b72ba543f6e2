//! Value types for a single symbolication run
//!
//! Nothing here outlives the job that created it: bindings, bundles and tasks
//! are built from one report and discarded once the output file is written.

use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// Which family of report the lexer is reading.
///
/// The two dialects share their header lines (`Process:`, `Identifier:`) and
/// the `Binary Images:` section, but attribute raw addresses to images in
/// different ways.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dialect {
    /// Crash report: `<image>  0x00000001xxxxxxxx 0x1xxxxxxxx + <offset>` frames
    Crash,
    /// Sample report: `??? (in <image>) load address ... [0x1xxxxxxxx]` frames
    Sample,
}

impl Dialect {
    /// How resolved symbols are written back into this dialect's frame lines
    #[must_use]
    pub fn substitution(self) -> Substitution {
        match self {
            Dialect::Crash => Substitution::Compound,
            Dialect::Sample => Substitution::Literal,
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dialect::Crash => write!(f, "crash"),
            Dialect::Sample => write!(f, "sample"),
        }
    }
}

/// A report field required before any resolver is invoked
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    LoadAddress,
    BundleIdentifier,
    Uuid,
    ProcessName,
    RawAddresses,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Field::LoadAddress => "load address",
            Field::BundleIdentifier => "bundle identifier",
            Field::Uuid => "UUID",
            Field::ProcessName => "process name",
            Field::RawAddresses => "raw addresses",
        };
        f.write_str(name)
    }
}

/// The view of the report an image binding was collected under.
///
/// App frames can be annotated with either the process name or the bundle
/// identifier, so the app yields two bindings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Framework,
    App,
    AppBundle,
}

/// One binary image referenced by the report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageBinding {
    pub name: String,
    pub kind: ImageKind,
    /// Canonical (fixed-width prefix) load address, empty when not found
    pub load_address: String,
    /// Raw addresses in report order, duplicates preserved
    pub raw_addresses: Vec<String>,
    /// UUID printed on the image's `Binary Images:` line, if any
    pub uuid: Option<String>,
}

impl ImageBinding {
    /// Whether this binding carries enough to become a resolver task
    #[must_use]
    pub fn is_resolvable(&self) -> bool {
        !self.load_address.is_empty() && !self.raw_addresses.is_empty()
    }
}

/// A dSYM directory whose embedded debug binary was located and identified
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolBundle {
    pub dir: PathBuf,
    pub binary_path: PathBuf,
    /// Free-text output of the UUID extractor run against `binary_path`
    pub uuid_output: String,
}

impl SymbolBundle {
    /// Whether the embedded binary reports `uuid`
    #[must_use]
    pub fn satisfies(&self, uuid: &str) -> bool {
        uuid_matches(&self.uuid_output, uuid)
    }

    /// Whether the embedded binary's path names `image` as a dotted component
    /// (`Foo` matches `.../Foo.app.dSYM/...`).
    ///
    /// This is substring membership: `Net` also matches `Net.framework` inside
    /// `Networking.Net.framework.dSYM`.
    #[must_use]
    pub fn mentions(&self, image: &str) -> bool {
        !image.is_empty() && self.binary_path.to_string_lossy().contains(&format!("{image}."))
    }
}

/// Containment test between extractor output and a report UUID.
///
/// Crash reports print UUIDs lowercase without dashes while dwarfdump prints
/// them uppercase with dashes, so both sides are compared with dashes removed
/// and case folded.
#[must_use]
pub fn uuid_matches(haystack: &str, uuid: &str) -> bool {
    let needle = normalize_uuid(uuid);
    !needle.is_empty() && normalize_uuid(haystack).contains(&needle)
}

fn normalize_uuid(text: &str) -> String {
    text.chars().filter(|c| *c != '-').flat_map(char::to_uppercase).collect()
}

/// How a mapping's symbols are written into the report text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Substitution {
    /// Replace the raw address literal itself
    Literal,
    /// Keep the raw address and replace the `<hex|image> +` label after it
    Compound,
}

/// Unit of work for the address resolver
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolicationTask {
    pub image: String,
    pub binary_path: PathBuf,
    pub load_address: String,
    pub raw_addresses: Vec<String>,
    pub substitution: Substitution,
}

/// Raw addresses of one task zipped with the resolver's output lines
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedMapping {
    pub image: String,
    pub substitution: Substitution,
    pub pairs: Vec<(String, String)>,
}

/// Completion payload of a successful job
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportOutput {
    pub output_path: PathBuf,
    pub uuids: Vec<String>,
    pub images: Vec<String>,
}

impl ReportOutput {
    #[must_use]
    pub fn output_path(&self) -> &Path {
        &self.output_path
    }
}
