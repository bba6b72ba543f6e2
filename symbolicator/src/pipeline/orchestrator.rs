//! Symbolication orchestrator
//!
//! Runs one resolver call per task, strictly in task order, and pairs each
//! task's raw addresses with the resolver's output lines index for index.

use crate::domain::{ResolvedMapping, SymbolicationError, SymbolicationTask};
use crate::symbolization::SymbolTools;
use log::{info, warn};

pub struct Orchestrator<'a, T> {
    tools: &'a T,
}

impl<'a, T: SymbolTools> Orchestrator<'a, T> {
    #[must_use]
    pub fn new(tools: &'a T) -> Self {
        Self { tools }
    }

    /// Resolve every task, one after another
    ///
    /// # Errors
    /// Stops at the first task whose resolver call fails or returns nothing
    pub async fn run(
        &self,
        tasks: &[SymbolicationTask],
    ) -> Result<Vec<ResolvedMapping>, SymbolicationError> {
        let mut mappings = Vec::with_capacity(tasks.len());
        for task in tasks {
            mappings.push(self.resolve(task).await?);
        }
        Ok(mappings)
    }

    /// Resolve a single task
    ///
    /// # Errors
    /// - `Tool` if the resolver fails
    /// - `EmptyResolverOutput` if it prints no symbol lines
    pub async fn resolve(
        &self,
        task: &SymbolicationTask,
    ) -> Result<ResolvedMapping, SymbolicationError> {
        info!(
            "Resolving {} addresses of {} against {}",
            task.raw_addresses.len(),
            task.image,
            task.binary_path.display()
        );
        let output = self
            .tools
            .symbolicate(&task.binary_path, &task.load_address, &task.raw_addresses)
            .await?;

        let lines = split_output(&output);
        if lines.iter().all(|line| line.trim().is_empty()) {
            return Err(SymbolicationError::EmptyResolverOutput { image: task.image.clone() });
        }
        if lines.len() < task.raw_addresses.len() {
            warn!(
                "Resolver returned {} lines for {} addresses of {}; the rest stay unresolved",
                lines.len(),
                task.raw_addresses.len(),
                task.image
            );
        }

        Ok(ResolvedMapping {
            image: task.image.clone(),
            substitution: task.substitution,
            pairs: zip_output(&task.raw_addresses, &lines),
        })
    }
}

/// Resolver output lines, without the empty element after the final newline
#[must_use]
pub fn split_output(output: &str) -> Vec<&str> {
    let mut lines: Vec<&str> = output.split('\n').collect();
    if lines.last().is_some_and(|line| line.is_empty()) {
        lines.pop();
    }
    lines
}

/// Pair addresses with output lines in order; surplus on either side is dropped
#[must_use]
pub fn zip_output(addresses: &[String], lines: &[&str]) -> Vec<(String, String)> {
    addresses
        .iter()
        .zip(lines)
        .map(|(raw, line)| (raw.clone(), line.trim().to_string()))
        .collect()
}
