//! Task construction: which bundle resolves which image

use crate::domain::{ImageBinding, SymbolBundle, SymbolicationTask};
use crate::report::ParsedReport;
use log::{debug, warn};

/// One task per resolvable image and bundle that binds it, in image discovery order
#[must_use]
pub fn build_tasks(parsed: &ParsedReport, bundles: &[SymbolBundle]) -> Vec<SymbolicationTask> {
    let substitution = parsed.dialect.substitution();
    let mut tasks = Vec::new();

    for image in parsed.bindings() {
        let before = tasks.len();
        for bundle in bundles.iter().filter(|bundle| binds(image, bundle)) {
            debug!(
                "Task: {} ({:?}) -> {}, {} addresses",
                image.name,
                image.kind,
                bundle.binary_path.display(),
                image.raw_addresses.len()
            );
            tasks.push(SymbolicationTask {
                image: image.name.clone(),
                binary_path: bundle.binary_path.clone(),
                load_address: image.load_address.clone(),
                raw_addresses: image.raw_addresses.clone(),
                substitution,
            });
        }
        if tasks.len() == before {
            warn!("No symbol bundle matches image {}", image.name);
        }
    }
    tasks
}

/// An image with a known UUID takes only bundles carrying it; otherwise the
/// bundle's binary path must name the image as a dotted component.
#[must_use]
pub fn binds(image: &ImageBinding, bundle: &SymbolBundle) -> bool {
    match &image.uuid {
        Some(uuid) => bundle.satisfies(uuid),
        None => bundle.mentions(&image.name),
    }
}
