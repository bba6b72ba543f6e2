//! # Symbolication Pipeline
//!
//! A job runs to completion in a fixed order, and the first failure ends it:
//!
//! ```text
//! read report ─> detect dialect ─> parse ─> validation gate
//!                                              │
//!      persist <─ assemble <─ orchestrate <─ build tasks <─ resolve bundles
//! ```
//!
//! ## Module Structure
//!
//! - **`validation`**: checks that need only the report text
//! - **`tasks`**: binds images to symbol bundles
//! - **`orchestrator`**: one resolver call per task, in order
//! - **`job`**: `Symbolicator`, which strings the steps together
//! - **`worker`**: runs jobs one at a time on a background task
//!
//! ## Ordering
//!
//! Resolver calls never overlap. Each mapping is applied on top of the text
//! produced by the mappings before it, so tasks keep the order in which their
//! images were discovered: frameworks first, then the app under its process
//! name, then the app under its bundle identifier.

pub mod job;
pub mod orchestrator;
pub mod tasks;
pub mod validation;
pub mod worker;

pub use job::{JobRequest, Symbolicator};
pub use orchestrator::{split_output, zip_output, Orchestrator};
pub use tasks::{binds, build_tasks};
pub use validation::check_report;
pub use worker::{JobResult, Worker};
