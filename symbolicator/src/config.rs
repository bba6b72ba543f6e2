//! Validated run configuration
//!
//! `cli::Args` is what the user typed; `SymbolicatorConfig` is what the engine
//! runs with. Defaults that depend on the environment (the home directory) are
//! resolved here, once.

use crate::cli::{Args, BackendArg, DialectArg};
use crate::domain::{ConfigError, Dialect};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_ATOS: &str = "/usr/bin/atos";
pub const DEFAULT_DWARFDUMP: &str = "/usr/bin/dwarfdump";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Which `SymbolTools` implementation answers resolver requests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    /// `atos` and `dwarfdump` child processes
    Tools,
    /// In-process DWARF reader
    Native,
}

/// Settings for the external resolver tools
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolsConfig {
    pub atos: PathBuf,
    pub dwarfdump: PathBuf,
    /// Architecture slice passed to `atos -arch`
    pub arch: Option<String>,
    /// Upper bound on every tool invocation
    pub timeout: Duration,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            atos: PathBuf::from(DEFAULT_ATOS),
            dwarfdump: PathBuf::from(DEFAULT_DWARFDUMP),
            arch: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolicatorConfig {
    pub report: PathBuf,
    pub bundles: Vec<PathBuf>,
    /// Forced dialect; detected from the report when `None`
    pub dialect: Option<Dialect>,
    pub output_dir: PathBuf,
    pub backend: Backend,
    pub tools: ToolsConfig,
}

impl SymbolicatorConfig {
    /// # Errors
    /// - `ZeroTimeout` if `--timeout 0` was given
    /// - `NoHomeDirectory` if no output directory was given and `~` is unknown
    pub fn from_args(args: &Args) -> Result<Self, ConfigError> {
        if args.timeout == 0 {
            return Err(ConfigError::ZeroTimeout);
        }

        let output_dir = match &args.output_dir {
            Some(dir) => dir.clone(),
            None => default_output_dir()?,
        };

        Ok(Self {
            report: args.report.clone(),
            bundles: args.dsym.clone(),
            dialect: args.dialect.map(|dialect| match dialect {
                DialectArg::Crash => Dialect::Crash,
                DialectArg::Sample => Dialect::Sample,
            }),
            output_dir,
            backend: match args.backend {
                BackendArg::Tools => Backend::Tools,
                BackendArg::Native => Backend::Native,
            },
            tools: ToolsConfig {
                atos: args.atos.clone(),
                dwarfdump: args.dwarfdump.clone(),
                arch: args.arch.clone(),
                timeout: Duration::from_secs(args.timeout),
            },
        })
    }
}

/// `~/Desktop`, where finished reports have always been dropped
///
/// # Errors
/// Returns `NoHomeDirectory` if the home directory cannot be determined
pub fn default_output_dir() -> Result<PathBuf, ConfigError> {
    home::home_dir().map(|home| home.join("Desktop")).ok_or(ConfigError::NoHomeDirectory)
}
