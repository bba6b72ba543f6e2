//! CLI argument definitions

use crate::config::{DEFAULT_ATOS, DEFAULT_DWARFDUMP, DEFAULT_TIMEOUT_SECS};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "symbolicator",
    version,
    about = "Symbolicate macOS crash and sample reports against dSYM bundles",
    after_help = "\
EXAMPLES:
    symbolicator Foo.crash --dsym Foo.app.dSYM
    symbolicator Foo.txt --dsym Foo.app.dSYM --dsym Networking.framework.dSYM
    symbolicator Foo.crash --dsym Foo.app.dSYM --backend native --output-dir ."
)]
pub struct Args {
    /// Crash (.crash, .ips) or sample (.txt) report to symbolicate
    #[arg(value_name = "REPORT")]
    pub report: PathBuf,

    /// dSYM bundle directory (repeat for frameworks)
    #[arg(short, long, value_name = "DIR", required = true)]
    pub dsym: Vec<PathBuf>,

    /// Report dialect (detected from the report when omitted)
    #[arg(long, value_enum)]
    pub dialect: Option<DialectArg>,

    /// Directory the symbolicated report is written to [default: ~/Desktop]
    #[arg(short, long, value_name = "DIR", env = "SYMBOLICATOR_OUTPUT_DIR")]
    pub output_dir: Option<PathBuf>,

    /// Address resolver tool
    #[arg(long, value_name = "PATH", default_value = DEFAULT_ATOS)]
    pub atos: PathBuf,

    /// UUID extractor tool
    #[arg(long, value_name = "PATH", default_value = DEFAULT_DWARFDUMP)]
    pub dwarfdump: PathBuf,

    /// Architecture slice to resolve against (e.g. arm64, x86_64)
    #[arg(long)]
    pub arch: Option<String>,

    /// Give up on a resolver tool after N seconds
    #[arg(long, value_name = "SECS", default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout: u64,

    /// Resolver implementation
    #[arg(long, value_enum, default_value_t = BackendArg::Tools)]
    pub backend: BackendArg,

    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,

    /// Open the symbolicated report when done
    #[arg(long)]
    pub open: bool,

    /// Suppress non-essential output
    #[arg(short, long)]
    pub quiet: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum DialectArg {
    Crash,
    Sample,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum BackendArg {
    /// atos and dwarfdump
    Tools,
    /// Built-in DWARF reader
    Native,
}
