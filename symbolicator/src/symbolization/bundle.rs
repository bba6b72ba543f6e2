//! Image resolver: bundle directories in, identified symbol bundles out

use super::SymbolTools;
use crate::domain::{SymbolBundle, SymbolicationError};
use log::{debug, info, warn};
use std::fs;
use std::path::{Path, PathBuf};

/// Location of the debug binary inside a dSYM bundle
pub const DWARF_SUBPATH: &str = "Contents/Resources/DWARF";

/// The debug binary embedded in `bundle_dir`, if the bundle has one.
///
/// A bundle normally holds exactly one file under `DWARF_SUBPATH`; when it
/// holds several, the first by name wins so the choice is stable.
#[must_use]
pub fn embedded_binary(bundle_dir: &Path) -> Option<PathBuf> {
    let entries = fs::read_dir(bundle_dir.join(DWARF_SUBPATH)).ok()?;
    let mut files: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_ok_and(|t| t.is_file()))
        .map(|entry| entry.path())
        .collect();
    files.sort();
    files.into_iter().next()
}

/// Finds the embedded binary of each bundle and identifies it by UUID
pub struct ImageResolver<'a, T> {
    tools: &'a T,
}

impl<'a, T: SymbolTools> ImageResolver<'a, T> {
    #[must_use]
    pub fn new(tools: &'a T) -> Self {
        Self { tools }
    }

    /// Qualify `bundle_dirs` and keep the bundles whose UUID is one of `required_uuids`.
    ///
    /// A kept bundle may satisfy only some of the required UUIDs; binding it to
    /// the right image is left to task construction.
    ///
    /// # Errors
    /// - `NoUsableSymbolBundle` if no directory has an embedded debug binary
    /// - `UuidMismatch` if no embedded binary carries a required UUID
    /// - `Tool` if the UUID extractor fails
    pub async fn resolve(
        &self,
        bundle_dirs: &[PathBuf],
        required_uuids: &[String],
    ) -> Result<Vec<SymbolBundle>, SymbolicationError> {
        let qualifying: Vec<(PathBuf, PathBuf)> = bundle_dirs
            .iter()
            .filter_map(|dir| match embedded_binary(dir) {
                Some(binary) => Some((dir.clone(), binary)),
                None => {
                    warn!("Skipping {}: no debug binary under {DWARF_SUBPATH}", dir.display());
                    None
                }
            })
            .collect();

        if qualifying.is_empty() {
            return Err(SymbolicationError::NoUsableSymbolBundle);
        }

        let mut bundles = Vec::new();
        for (dir, binary_path) in qualifying {
            let uuid_output = self.tools.extract_uuid(&binary_path).await?;
            let bundle = SymbolBundle { dir, binary_path, uuid_output };

            if required_uuids.iter().any(|uuid| bundle.satisfies(uuid)) {
                info!("Using symbol bundle {}", bundle.dir.display());
                debug!("  {}", bundle.uuid_output.trim());
                bundles.push(bundle);
            } else {
                warn!(
                    "Rejecting symbol bundle {}: {}",
                    bundle.dir.display(),
                    bundle.uuid_output.trim()
                );
            }
        }

        if bundles.is_empty() {
            return Err(SymbolicationError::UuidMismatch { expected: required_uuids.join(", ") });
        }
        Ok(bundles)
    }
}
