//! # symbolicator - Crash and Sample Report Symbolication
//!
//! symbolicator turns the raw instruction addresses in a macOS crash report or
//! sample report back into function names, files and line numbers, using the
//! dSYM bundles built alongside the app and its frameworks. The result is the
//! same report, line for line, with only the address labels rewritten.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//! │ Report file  │   │ dSYM bundles │   │  atos /      │
//! │ (.crash/.txt)│   │  (one/image) │   │  dwarfdump   │
//! └──────┬───────┘   └──────┬───────┘   └──────┬───────┘
//!        │                  │                  │
//!        ▼                  ▼                  ▼
//! ┌─────────────────────────────────────────────────────────┐
//! │  report::parse ─▶ ImageResolver ─▶ Orchestrator          │
//! │    (lexer)        (UUID check)     (one call per image)  │
//! │                                          │               │
//! │                                          ▼               │
//! │                               assembler::apply/persist   │
//! └──────────────────────────────────────────┬──────────────┘
//!                                            ▼
//!                             <report>_Symbolicated-File.txt
//! ```
//!
//! ## Module Structure
//!
//! - [`report`]: report reading, dialect detection and the line-classifier lexer
//! - [`symbolization`]: resolver backends (`atos`/`dwarfdump` or built-in) and bundle lookup
//! - [`pipeline`]: validation gate, task construction, orchestration, background worker
//! - [`assembler`]: substitution of resolved symbols and output persistence
//! - [`domain`]: value types and errors shared by every stage
//! - [`cli`] / [`config`]: command-line arguments and the validated configuration
//!
//! ## Report Dialects
//!
//! - **crash**: frames print `<image> <raw address> <load address|image> + <offset>`;
//!   the label after the raw address is replaced by the symbol
//! - **sample**: call-graph frames print `(in <image>) ... [<raw address>]`;
//!   the raw address itself is replaced
//!
//! ## Typical Usage
//!
//! ```bash
//! # Resolve with the Xcode command-line tools
//! symbolicator MyApp_2024-05-01.crash --dsym MyApp.app.dSYM
//!
//! # Resolve off macOS with the built-in DWARF reader
//! symbolicator MyApp.txt --dsym MyApp.app.dSYM --backend native -o .
//! ```

pub mod assembler;
pub mod cli;
pub mod config;
pub mod domain;
pub mod pipeline;
pub mod report;
pub mod symbolization;
