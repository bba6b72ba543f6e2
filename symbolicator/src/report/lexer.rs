//! Report lexer
//!
//! Field extraction is an ordered set of line classifiers. Each classifier is
//! a pure `line -> Option<_>` function; `parse` walks the report once per field
//! and keeps the first hit. Anchoring `Process:` at the start of the line is
//! what keeps `Parent Process:` from ever being taken as the process name.
//!
//! Parsing never fails. Anything that cannot be found comes back empty and the
//! validation gate decides whether the run can continue.

use super::crash::CrashRules;
use super::sample::SampleRules;
use super::Report;
use crate::domain::{Dialect, ImageBinding, ImageKind};
use log::{debug, warn};
use regex::Regex;
use std::sync::OnceLock;

/// Width of a canonical load address; longer tokens are truncated
pub const LOAD_ADDRESS_WIDTH: usize = 12;

/// Rule set for one report dialect
pub trait DialectRules: Sync {
    /// Pattern selecting the lines whose raw addresses belong to an image.
    ///
    /// `bundle_id` is the app's bundle identifier; framework images are
    /// qualified by it where the dialect spells them out in full.
    fn address_line(&self, kind: ImageKind, name: &str, bundle_id: &str) -> String;

    /// The raw address carried by a selected line
    fn address_token<'l>(&self, line: &'l str) -> Option<&'l str>;

    /// Pattern selecting binary-image lines of the app itself
    fn app_image_line(&self, bundle_id: &str) -> String;

    /// App load address from the report header, used when no image line has one
    fn header_load_address(&self, _lines: &[String]) -> Option<String> {
        None
    }
}

/// Fields recovered from one report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedReport {
    pub dialect: Dialect,
    pub process_name: String,
    pub bundle_identifier: String,
    /// Distinct UUIDs of the app and its frameworks, app first
    pub uuids: Vec<String>,
    /// Distinct framework names shipped under the app's bundle identifier
    pub frameworks: Vec<String>,
    /// Every candidate image in discovery order, resolvable or not
    pub images: Vec<ImageBinding>,
}

impl ParsedReport {
    /// Candidates with both a load address and raw addresses
    pub fn bindings(&self) -> impl Iterator<Item = &ImageBinding> {
        self.images.iter().filter(|image| image.is_resolvable())
    }

    /// Whether any candidate collected raw addresses
    #[must_use]
    pub fn has_raw_addresses(&self) -> bool {
        self.images.iter().any(|image| !image.raw_addresses.is_empty())
    }
}

fn rules_for(dialect: Dialect) -> &'static dyn DialectRules {
    match dialect {
        Dialect::Crash => &CrashRules,
        Dialect::Sample => &SampleRules,
    }
}

/// Recover process metadata, image load addresses and raw addresses
#[must_use]
pub fn parse(report: &Report, dialect: Dialect) -> ParsedReport {
    let rules = rules_for(dialect);
    let lines = report.lines();

    let process_name = first_match(lines, process_name).unwrap_or_default();
    let bundle_identifier = first_match(lines, bundle_identifier).unwrap_or_default();
    let uuids = report_uuids(lines, &bundle_identifier);
    let frameworks = associated_frameworks(lines, &bundle_identifier);

    let mut images: Vec<ImageBinding> = frameworks
        .iter()
        .map(|framework| framework_binding(lines, rules, &bundle_identifier, framework))
        .collect();

    let app_load_address = app_load_address(lines, rules, &bundle_identifier);
    let app_uuid = image_uuid(lines, &image_line(&bundle_identifier, None));
    for (kind, name) in
        [(ImageKind::App, &process_name), (ImageKind::AppBundle, &bundle_identifier)]
    {
        if name.is_empty() {
            continue;
        }
        images.push(ImageBinding {
            name: name.clone(),
            kind,
            load_address: app_load_address.clone(),
            raw_addresses: raw_addresses(lines, rules, kind, name, &bundle_identifier),
            uuid: app_uuid.clone(),
        });
    }

    debug!(
        "Parsed {dialect} report: process={process_name:?} bundle={bundle_identifier:?} \
         uuids={uuids:?} frameworks={frameworks:?}"
    );
    for image in &images {
        debug!(
            "  image {:?} ({:?}): load={:?}, {} raw addresses",
            image.name,
            image.kind,
            image.load_address,
            image.raw_addresses.len()
        );
    }

    ParsedReport { dialect, process_name, bundle_identifier, uuids, frameworks, images }
}

fn framework_binding(
    lines: &[String],
    rules: &dyn DialectRules,
    bundle_id: &str,
    framework: &str,
) -> ImageBinding {
    let line = image_line(bundle_id, Some(framework));
    ImageBinding {
        name: framework.to_string(),
        kind: ImageKind::Framework,
        load_address: load_address(lines, &line).unwrap_or_default(),
        raw_addresses: raw_addresses(lines, rules, ImageKind::Framework, framework, bundle_id),
        uuid: image_uuid(lines, &line),
    }
}

fn app_load_address(lines: &[String], rules: &dyn DialectRules, bundle_id: &str) -> String {
    let from_image_line = if bundle_id.is_empty() {
        None
    } else {
        load_address(lines, &LinePattern::new(&rules.app_image_line(bundle_id)))
    };
    from_image_line.or_else(|| rules.header_load_address(lines)).unwrap_or_default()
}

/// `Process:  Foo [4821]` -> `Foo`
#[must_use]
pub fn process_name(line: &str) -> Option<String> {
    let rest = line.strip_prefix("Process:")?;
    let name = rest.split('[').next().unwrap_or_default();
    Some(name.trim().to_string())
}

/// `Identifier:  com.acme.Foo` -> `com.acme.Foo`
#[must_use]
pub fn bundle_identifier(line: &str) -> Option<String> {
    line.strip_prefix("Identifier:").map(|rest| rest.trim().to_string())
}

/// The angle-bracket token of a binary-image line
#[must_use]
pub fn uuid_token(line: &str) -> Option<&str> {
    static UUID: OnceLock<Regex> = OnceLock::new();
    static_regex(&UUID, r"<([0-9A-Fa-f][0-9A-Fa-f-]*)>")
        .captures(line)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .filter(|token| !is_artifact(token))
}

/// First `0x1...` token of a line, cut to the canonical width
#[must_use]
pub fn load_address_token(line: &str) -> Option<String> {
    static LOAD: OnceLock<Regex> = OnceLock::new();
    static_regex(&LOAD, r"\b0x1[0-9A-Fa-f]*")
        .find(line)
        .map(|m| m.as_str().chars().take(LOAD_ADDRESS_WIDTH).collect())
}

/// Empty matches and stringified empty lists never reach the resolver
#[must_use]
pub fn is_artifact(token: &str) -> bool {
    token.is_empty() || token == "[]"
}

fn first_match(lines: &[String], classify: fn(&str) -> Option<String>) -> Option<String> {
    lines.iter().find_map(|line| classify(line))
}

fn report_uuids(lines: &[String], bundle_id: &str) -> Vec<String> {
    if bundle_id.is_empty() {
        return Vec::new();
    }
    // The bundle id itself or one of its frameworks, never a longer identifier
    let mentions =
        LinePattern::new(&format!(r"(?:^|\s)\+?{}(?:[\s.(]|$)", regex::escape(bundle_id)));
    let mut uuids: Vec<String> = Vec::new();
    for line in lines.iter().filter(|line| mentions.is_match(line)) {
        if let Some(uuid) = uuid_token(line) {
            if !uuids.iter().any(|known| known == uuid) {
                uuids.push(uuid.to_string());
            }
        }
    }
    uuids
}

fn associated_frameworks(lines: &[String], bundle_id: &str) -> Vec<String> {
    if bundle_id.is_empty() {
        return Vec::new();
    }
    let declared =
        LinePattern::new(&format!(r"(?:^|\s)\+?{}\.([^\s(]+)\s*\(", regex::escape(bundle_id)));
    let mut frameworks: Vec<String> = Vec::new();
    for line in lines {
        if let Some(name) = declared.capture(line) {
            if !is_artifact(name) && name != bundle_id && !frameworks.iter().any(|f| f == name) {
                frameworks.push(name.to_string());
            }
        }
    }
    frameworks
}

fn raw_addresses(
    lines: &[String],
    rules: &dyn DialectRules,
    kind: ImageKind,
    name: &str,
    bundle_id: &str,
) -> Vec<String> {
    let selected = LinePattern::new(&rules.address_line(kind, name, bundle_id));
    lines
        .iter()
        .filter(|line| selected.is_match(line))
        .filter_map(|line| rules.address_token(line))
        .filter(|token| !is_artifact(token))
        .map(str::to_owned)
        .collect()
}

fn load_address(lines: &[String], image_line: &LinePattern) -> Option<String> {
    lines
        .iter()
        .filter(|line| image_line.is_match(line))
        .find_map(|line| load_address_token(line))
}

fn image_uuid(lines: &[String], image_line: &LinePattern) -> Option<String> {
    lines
        .iter()
        .filter(|line| image_line.is_match(line))
        .find_map(|line| uuid_token(line))
        .map(str::to_owned)
}

/// Lines naming `<bundleId>` or `<bundleId>.<framework>` as a whole token,
/// with or without the `+` marking a non-system image
fn image_line(bundle_id: &str, framework: Option<&str>) -> LinePattern {
    if bundle_id.is_empty() {
        return LinePattern::never();
    }
    let name = match framework {
        Some(framework) => format!("{bundle_id}.{framework}"),
        None => bundle_id.to_string(),
    };
    LinePattern::new(&format!(r"(?:^|\s)\+?{}(?:\s|\(|$)", regex::escape(&name)))
}

/// A per-report pattern; a pattern that fails to compile matches nothing
pub(crate) struct LinePattern(Option<Regex>);

impl LinePattern {
    pub(crate) fn new(source: &str) -> Self {
        match Regex::new(source) {
            Ok(regex) => Self(Some(regex)),
            Err(e) => {
                warn!("Ignoring line pattern {source:?}: {e}");
                Self(None)
            }
        }
    }

    fn never() -> Self {
        Self(None)
    }

    pub(crate) fn is_match(&self, line: &str) -> bool {
        self.0.as_ref().is_some_and(|regex| regex.is_match(line))
    }

    fn capture<'l>(&self, line: &'l str) -> Option<&'l str> {
        self.0.as_ref()?.captures(line)?.get(1).map(|m| m.as_str())
    }
}

pub(crate) fn static_regex(cell: &'static OnceLock<Regex>, source: &str) -> &'static Regex {
    cell.get_or_init(|| Regex::new(source).expect("static pattern compiles"))
}
