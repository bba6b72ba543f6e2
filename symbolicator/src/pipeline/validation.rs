//! Pre-flight checks on a parsed report
//!
//! Everything checkable from the report text alone is checked here, before any
//! external tool runs. The bundle-side UUID check follows in
//! `ImageResolver::resolve`.

use crate::domain::{Field, SymbolicationError};
use crate::report::{ParsedReport, Report};

/// Fail with the first missing piece, in the order a user would fix them
///
/// # Errors
/// Returns `EmptyReport` or `MissingField` naming the first field that is absent
pub fn check_report(report: &Report, parsed: &ParsedReport) -> Result<(), SymbolicationError> {
    if report.is_empty() {
        return Err(SymbolicationError::EmptyReport);
    }
    if parsed.process_name.is_empty() {
        return Err(SymbolicationError::MissingField(Field::ProcessName));
    }
    if parsed.bundle_identifier.is_empty() {
        return Err(SymbolicationError::MissingField(Field::BundleIdentifier));
    }
    if !parsed.has_raw_addresses() {
        return Err(SymbolicationError::MissingField(Field::RawAddresses));
    }
    if parsed.bindings().next().is_none() {
        return Err(SymbolicationError::MissingField(Field::LoadAddress));
    }
    if parsed.uuids.is_empty() {
        return Err(SymbolicationError::MissingField(Field::Uuid));
    }
    Ok(())
}
