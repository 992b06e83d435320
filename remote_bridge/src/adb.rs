use std::path::{Path, PathBuf};

use async_process::Command;
use async_trait::async_trait;
use core_types::RemotePath;

use crate::{BridgeError, RemoteBridgeOps};

const NOT_FOUND_MARKER: &str = "No such file or directory";

/// Remote bridge that drives the `adb` executable.
///
/// Every operation is a single adb invocation; there is no retry.
#[derive(Debug, Clone)]
pub struct AdbBridge {
    adb_path: PathBuf,
    serial: Option<String>,
}

impl Default for AdbBridge {
    fn default() -> Self {
        Self::new("adb")
    }
}

impl AdbBridge {
    /// # Arguments
    /// * `adb_path` - Executable name (if on system PATH) or full path to adb
    pub fn new(adb_path: impl Into<PathBuf>) -> Self {
        Self {
            adb_path: adb_path.into(),
            serial: None,
        }
    }

    /// Target a specific device when more than one is connected.
    pub fn with_serial(mut self, serial: impl Into<String>) -> Self {
        self.serial = Some(serial.into());
        self
    }

    fn device_args(&self) -> Vec<String> {
        match &self.serial {
            Some(serial) => vec!["-s".to_string(), serial.clone()],
            None => Vec::new(),
        }
    }

    fn shell_args(&self, command: &str) -> Vec<String> {
        let mut args = self.device_args();
        args.push("shell".to_string());
        args.push(command.to_string());
        args
    }

    async fn run(&self, args: Vec<String>, missing: MissingPath<'_>) -> Result<String, BridgeError> {
        tracing::debug!("Running {} {:?}", self.adb_path.display(), args);

        let output = Command::new(&self.adb_path)
            .args(&args)
            .output()
            .await
            .map_err(|e| BridgeError::Io(format!("Failed to run adb: {}", e)))?;

        classify_output(
            &args,
            CommandOutput {
                success: output.status.success(),
                status: output.status.to_string(),
                stdout: String::from_utf8_lossy(&output.stdout).to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            },
            missing,
        )
    }
}

/// Where a "No such file or directory" diagnostic means the path is missing.
#[derive(Debug, Clone, Copy)]
pub(crate) enum MissingPath<'a> {
    /// Never, the command does not touch an existing path.
    Ignore,
    /// Only when the command failed. Used for listings, whose successful
    /// output is file names that may contain any text.
    OnFailure(&'a str),
    /// Also on success. `rm` prints nothing when it works, and older adb
    /// versions exit with 0 even when the device command failed.
    Always(&'a str),
}

#[derive(Debug)]
pub(crate) struct CommandOutput {
    pub success: bool,
    pub status: String,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    fn mentions_missing(&self) -> bool {
        self.stderr.contains(NOT_FOUND_MARKER) || self.stdout.contains(NOT_FOUND_MARKER)
    }
}

/// Maps a finished adb invocation to its stdout or a `BridgeError`.
pub(crate) fn classify_output(
    args: &[String],
    output: CommandOutput,
    missing: MissingPath<'_>,
) -> Result<String, BridgeError> {
    let missing_path = match missing {
        MissingPath::OnFailure(path) if !output.success => Some(path),
        MissingPath::Always(path) => Some(path),
        _ => None,
    };
    if let Some(path) = missing_path {
        if output.mentions_missing() {
            return Err(BridgeError::NotFound {
                path: path.to_string(),
            });
        }
    }

    if !output.success {
        let message = if output.stderr.trim().is_empty() {
            format!("adb exited with {}: {}", output.status, output.stdout.trim())
        } else {
            output.stderr.trim().to_string()
        };
        return Err(BridgeError::CommandFailed {
            command: args.join(" "),
            message,
        });
    }

    Ok(output.stdout)
}

/// Quotes an argument for the device shell.
pub(crate) fn quote_shell_arg(arg: &str) -> String {
    format!("'{}'", arg.replace('\'', r"'\''"))
}

/// Parses the output of `find <dir> -maxdepth 1 -type f` into sorted absolute paths.
pub(crate) fn parse_file_listing(output: &str) -> Vec<RemotePath> {
    let mut files: Vec<RemotePath> = output
        .lines()
        .map(|line| line.trim_end_matches('\r').trim())
        .filter(|line| !line.is_empty())
        .map(|line| line.to_string())
        .collect();
    files.sort();
    files
}

#[async_trait]
impl RemoteBridgeOps for AdbBridge {
    async fn create_directory(&self, path: &str) -> Result<(), BridgeError> {
        let command = format!("mkdir -p {}", quote_shell_arg(path));
        self.run(self.shell_args(&command), MissingPath::Ignore).await?;
        Ok(())
    }

    async fn list_directory_files(&self, path: &str) -> Result<Vec<RemotePath>, BridgeError> {
        let command = format!(
            "find {} -maxdepth 1 -type f",
            quote_shell_arg(path.trim_end_matches('/'))
        );
        let output = self
            .run(self.shell_args(&command), MissingPath::OnFailure(path))
            .await?;
        Ok(parse_file_listing(&output))
    }

    async fn upload_file(&self, local_path: &Path, remote_path: &str) -> Result<(), BridgeError> {
        let mut args = self.device_args();
        args.push("push".to_string());
        args.push(local_path.to_string_lossy().to_string());
        args.push(remote_path.to_string());
        self.run(args, MissingPath::Ignore).await?;
        Ok(())
    }

    async fn delete_file(&self, remote_path: &str) -> Result<(), BridgeError> {
        let command = format!("rm {}", quote_shell_arg(remote_path));
        self.run(self.shell_args(&command), MissingPath::Always(remote_path))
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_shell_arg() {
        assert_eq!(quote_shell_arg("/sdcard/hats"), "'/sdcard/hats'");
        assert_eq!(quote_shell_arg("/sdcard/it's"), r"'/sdcard/it'\''s'");
    }

    #[test]
    fn test_shell_args_with_serial() {
        let bridge = AdbBridge::new("adb").with_serial("1WMHH000000000");
        assert_eq!(
            bridge.shell_args("ls"),
            vec!["-s", "1WMHH000000000", "shell", "ls"]
        );
    }

    #[test]
    fn test_shell_args_without_serial() {
        let bridge = AdbBridge::default();
        assert_eq!(bridge.shell_args("ls"), vec!["shell", "ls"]);
    }

    #[test]
    fn test_parse_file_listing() {
        let output = "/sdcard/hats/b.hat\r\n/sdcard/hats/a.hat\n\n";
        assert_eq!(
            parse_file_listing(output),
            vec!["/sdcard/hats/a.hat", "/sdcard/hats/b.hat"]
        );
    }

    #[test]
    fn test_parse_empty_listing() {
        assert!(parse_file_listing("").is_empty());
    }

    fn output(success: bool, stdout: &str, stderr: &str) -> CommandOutput {
        CommandOutput {
            success,
            status: if success { "exit status: 0" } else { "exit status: 1" }.to_string(),
            stdout: stdout.to_string(),
            stderr: stderr.to_string(),
        }
    }

    fn args(command: &str) -> Vec<String> {
        AdbBridge::default().shell_args(command)
    }

    #[test]
    fn test_listing_with_marker_in_file_name_succeeds() {
        let stdout = "/sdcard/hats/a.png\n/sdcard/hats/No such file or directory.png\n";
        let result = classify_output(
            &args("find '/sdcard/hats' -maxdepth 1 -type f"),
            output(true, stdout, ""),
            MissingPath::OnFailure("/sdcard/hats"),
        );

        let files = parse_file_listing(&result.unwrap());
        assert_eq!(
            files,
            vec![
                "/sdcard/hats/No such file or directory.png",
                "/sdcard/hats/a.png"
            ]
        );
    }

    #[test]
    fn test_failed_listing_of_missing_directory_is_not_found() {
        let result = classify_output(
            &args("find '/sdcard/gone' -maxdepth 1 -type f"),
            output(false, "", "find: '/sdcard/gone': No such file or directory\n"),
            MissingPath::OnFailure("/sdcard/gone"),
        );
        assert_eq!(
            result,
            Err(BridgeError::NotFound {
                path: "/sdcard/gone".to_string()
            })
        );
    }

    #[test]
    fn test_rm_of_missing_file_is_not_found() {
        let result = classify_output(
            &args("rm '/sdcard/hats/a.png'"),
            output(false, "", "rm: /sdcard/hats/a.png: No such file or directory\n"),
            MissingPath::Always("/sdcard/hats/a.png"),
        );
        assert!(result.unwrap_err().is_not_found());
    }

    #[test]
    fn test_rm_reporting_missing_file_with_zero_exit_is_not_found() {
        let result = classify_output(
            &args("rm '/sdcard/hats/a.png'"),
            output(true, "rm: /sdcard/hats/a.png: No such file or directory\n", ""),
            MissingPath::Always("/sdcard/hats/a.png"),
        );
        assert!(result.unwrap_err().is_not_found());
    }

    #[test]
    fn test_other_failure_is_command_failed_with_stderr() {
        let result = classify_output(
            &args("rm '/sdcard/hats/a.png'"),
            output(false, "", "rm: /sdcard/hats/a.png: Permission denied\n"),
            MissingPath::Always("/sdcard/hats/a.png"),
        );
        assert_eq!(
            result,
            Err(BridgeError::CommandFailed {
                command: "shell rm '/sdcard/hats/a.png'".to_string(),
                message: "rm: /sdcard/hats/a.png: Permission denied".to_string(),
            })
        );
    }

    #[test]
    fn test_failure_without_stderr_reports_status_and_stdout() {
        let result = classify_output(
            &args("mkdir -p '/sdcard/hats'"),
            output(false, "error: no devices/emulators found", ""),
            MissingPath::Ignore,
        );
        match result {
            Err(BridgeError::CommandFailed { message, .. }) => {
                assert_eq!(message, "adb exited with exit status: 1: error: no devices/emulators found");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_marker_is_ignored_when_command_has_no_missing_path() {
        let result = classify_output(
            &args("mkdir -p '/sdcard/hats'"),
            output(false, "", "mkdir: No such file or directory"),
            MissingPath::Ignore,
        );
        assert!(matches!(result, Err(BridgeError::CommandFailed { .. })));
    }

    #[async_std::test]
    async fn test_missing_adb_executable_is_io_error() {
        let bridge = AdbBridge::new("/nonexistent/path/to/adb");
        let result = bridge.create_directory("/sdcard/hats").await;
        assert!(matches!(result, Err(BridgeError::Io(_))));
    }
}
