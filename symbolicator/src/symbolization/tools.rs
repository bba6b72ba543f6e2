//! Address resolver client
//!
//! The engine never parses debug information itself. It asks a `SymbolTools`
//! implementation two questions: which UUIDs does this binary carry, and what
//! symbols live at these addresses when the binary is loaded at this base.

use crate::config::ToolsConfig;
use crate::domain::ToolError;
use log::debug;
use std::ffi::OsString;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

/// Request/response access to an address → symbol resolver and a UUID extractor
pub trait SymbolTools: Send + Sync {
    /// Resolve `addresses` against `binary` loaded at `load_address`.
    ///
    /// Returns newline-delimited text, one line per address in input order,
    /// terminated by a trailing newline.
    fn symbolicate(
        &self,
        binary: &Path,
        load_address: &str,
        addresses: &[String],
    ) -> impl Future<Output = Result<String, ToolError>> + Send;

    /// Free text naming the UUID(s) of `binary`
    fn extract_uuid(&self, binary: &Path) -> impl Future<Output = Result<String, ToolError>> + Send;
}

/// `atos` and `dwarfdump`, run as child processes with a bounded wait
#[derive(Debug, Clone)]
pub struct CommandLineTools {
    atos: PathBuf,
    dwarfdump: PathBuf,
    arch: Option<String>,
    timeout: Duration,
}

impl CommandLineTools {
    #[must_use]
    pub fn new(config: &ToolsConfig) -> Self {
        Self {
            atos: config.atos.clone(),
            dwarfdump: config.dwarfdump.clone(),
            arch: config.arch.clone(),
            timeout: config.timeout,
        }
    }

    async fn run(&self, program: &Path, args: Vec<OsString>) -> Result<String, ToolError> {
        let tool = program.display().to_string();
        debug!("Running {tool} with {} arguments", args.len());

        let child = Command::new(program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| ToolError::Spawn { tool: tool.clone(), source })?;

        // Dropping the child on timeout kills it
        let output = tokio::time::timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| ToolError::Timeout { tool: tool.clone(), timeout: self.timeout })?
            .map_err(|source| ToolError::Io { tool: tool.clone(), source })?;

        if !output.status.success() {
            return Err(ToolError::NonZeroExit {
                tool,
                status: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl SymbolTools for CommandLineTools {
    async fn symbolicate(
        &self,
        binary: &Path,
        load_address: &str,
        addresses: &[String],
    ) -> Result<String, ToolError> {
        let args = atos_args(binary, load_address, addresses, self.arch.as_deref());
        self.run(&self.atos, args).await
    }

    async fn extract_uuid(&self, binary: &Path) -> Result<String, ToolError> {
        let args = vec![OsString::from("--uuid"), binary.as_os_str().to_owned()];
        self.run(&self.dwarfdump, args).await
    }
}

/// `-o <binary> [-arch <arch>] -l <load> <addr>...`
#[must_use]
pub fn atos_args(
    binary: &Path,
    load_address: &str,
    addresses: &[String],
    arch: Option<&str>,
) -> Vec<OsString> {
    let mut args = vec![OsString::from("-o"), binary.as_os_str().to_owned()];
    if let Some(arch) = arch {
        args.push("-arch".into());
        args.push(arch.into());
    }
    args.push("-l".into());
    args.push(load_address.into());
    args.extend(addresses.iter().map(OsString::from));
    args
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tools(atos: &str, timeout: Duration) -> CommandLineTools {
        CommandLineTools::new(&ToolsConfig {
            atos: PathBuf::from(atos),
            dwarfdump: PathBuf::from("/nonexistent/dwarfdump"),
            arch: None,
            timeout,
        })
    }

    #[test]
    fn test_atos_args_order() {
        let addresses = vec!["0x1".to_string(), "0x2".to_string()];
        let args = atos_args(Path::new("/d/Foo"), "0x100000000", &addresses, Some("arm64"));
        let args: Vec<_> = args.iter().map(|a| a.to_string_lossy().into_owned()).collect();
        assert_eq!(args, ["-o", "/d/Foo", "-arch", "arm64", "-l", "0x100000000", "0x1", "0x2"]);
    }

    #[test]
    fn test_atos_args_without_arch() {
        let args = atos_args(Path::new("/d/Foo"), "0x1", &[], None);
        assert_eq!(args.len(), 4);
        assert_eq!(args[2], "-l");
    }

    #[tokio::test]
    async fn test_missing_tool_is_spawn_error() {
        let err = tools("/nonexistent/dwarfdump", Duration::from_secs(5))
            .extract_uuid(Path::new("/bin/sh"))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::Spawn { .. }));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_tool_output_is_returned() {
        let output = tools("/bin/echo", Duration::from_secs(5))
            .symbolicate(Path::new("/d/Foo"), "0x1000", &["0x1010".to_string()])
            .await
            .unwrap();
        assert_eq!(output, "-o /d/Foo -l 0x1000 0x1010\n");
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_non_zero_exit_is_an_error() {
        let err = tools("/bin/false", Duration::from_secs(5))
            .symbolicate(Path::new("/d/Foo"), "0x1000", &[])
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::NonZeroExit { status: Some(1), .. }));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_slow_tool_times_out() {
        let tools = tools("/nonexistent/atos", Duration::from_millis(200));
        let err = tools.run(Path::new("/bin/sleep"), vec!["5".into()]).await.unwrap_err();
        assert!(matches!(err, ToolError::Timeout { .. }));
    }
}
