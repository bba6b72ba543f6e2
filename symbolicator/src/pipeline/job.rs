//! One symbolication job, end to end

use super::orchestrator::Orchestrator;
use super::tasks::build_tasks;
use super::validation::check_report;
use crate::assembler;
use crate::domain::{Dialect, ReportOutput, SymbolicationError};
use crate::report::{detect_dialect, parse, Report};
use crate::symbolization::{ImageResolver, SymbolTools};
use log::{info, warn};
use std::path::PathBuf;

/// What the caller submits: a report and the bundles to resolve it against
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobRequest {
    pub report: PathBuf,
    pub bundles: Vec<PathBuf>,
    /// Forced dialect; detected from the report when `None`
    pub dialect: Option<Dialect>,
}

/// The symbolication engine, bound to one resolver backend and output directory
pub struct Symbolicator<T> {
    tools: T,
    output_dir: PathBuf,
}

impl<T: SymbolTools> Symbolicator<T> {
    #[must_use]
    pub fn new(tools: T, output_dir: PathBuf) -> Self {
        Self { tools, output_dir }
    }

    /// Parse, validate, resolve, assemble and persist.
    ///
    /// Nothing is written unless every step succeeds.
    ///
    /// # Errors
    /// The first failing step ends the job; see `SymbolicationError`
    pub async fn symbolicate(
        &self,
        request: &JobRequest,
    ) -> Result<ReportOutput, SymbolicationError> {
        let report = Report::read(&request.report)?;
        let dialect = request.dialect.unwrap_or_else(|| detect_dialect(&report));
        info!("Symbolicating {} as a {dialect} report", request.report.display());

        let parsed = parse(&report, dialect);
        check_report(&report, &parsed)?;

        let bundles =
            ImageResolver::new(&self.tools).resolve(&request.bundles, &parsed.uuids).await?;
        let tasks = build_tasks(&parsed, &bundles);
        if tasks.is_empty() {
            warn!("No image could be bound to a symbol bundle; the report is written unchanged");
        }

        let mappings = Orchestrator::new(&self.tools).run(&tasks).await?;
        // Each mapping applies on top of the text the previous ones produced
        let text = mappings
            .iter()
            .fold(report.text(), |text, mapping| assembler::apply(&text, mapping));

        let output_path = assembler::persist(&self.output_dir, &request.report, text.as_bytes())?;
        info!("Symbolicated report written to {}", output_path.display());

        let mut images: Vec<String> = Vec::new();
        for task in &tasks {
            if !images.contains(&task.image) {
                images.push(task.image.clone());
            }
        }
        Ok(ReportOutput { output_path, uuids: parsed.uuids, images })
    }
}
