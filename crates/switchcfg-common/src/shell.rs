//! External command execution for switch configuration managers.
//!
//! Commands are spawned directly (no intermediate shell) with their
//! arguments passed as a vector, so structured arguments such as JSON
//! extra-vars reach the program byte for byte. Standard output and standard
//! error are drained concurrently while the process runs, which keeps a
//! chatty process from blocking on a full pipe that nobody reads.
//!
//! # Example
//!
//! ```ignore
//! use switchcfg_common::shell::{self, CommandInvocation};
//!
//! let invocation = CommandInvocation::new("ansible-playbook")
//!     .arg("-e")
//!     .arg(r#"{"team_numbers":[254]}"#)
//!     .arg("config_dhcp.yaml");
//! let output = shell::exec_or_fail(&invocation).await?;
//! ```

use once_cell::sync::Lazy;
use regex::Regex;
use std::io;
use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;

use crate::error::{SwitchCfgError, SwitchCfgResult};

/// Regex for characters that need escaping in shell double-quotes.
/// Matches: $, `, ", \, and newline
static SHELL_ESCAPE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"([$`"\\\n])"#).expect("Invalid regex pattern"));

/// Arguments made only of these characters are printed without quotes.
static SHELL_SAFE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_./=:,+@%-]+$").expect("Invalid regex pattern"));

/// Size of each read from a child's output pipe.
const READ_CHUNK_SIZE: usize = 8192;

/// Quotes a string for safe use in shell commands.
///
/// This function wraps the string in double quotes and escapes any
/// characters that have special meaning inside double quotes:
/// - `$` (variable expansion)
/// - `` ` `` (command substitution)
/// - `"` (quote termination)
/// - `\` (escape character)
/// - newline (command termination)
///
/// # Example
///
/// ```
/// use switchcfg_common::shell::shellquote;
///
/// assert_eq!(shellquote("simple"), "\"simple\"");
/// assert_eq!(shellquote("with$var"), "\"with\\$var\"");
/// assert_eq!(shellquote("with\"quote"), "\"with\\\"quote\"");
/// ```
pub fn shellquote(s: &str) -> String {
    let escaped = SHELL_ESCAPE_RE.replace_all(s, r"\$1");
    format!("\"{}\"", escaped)
}

/// Renders one argument for a copy-pasteable command line, quoting only
/// when the argument contains characters the shell would interpret.
pub fn display_arg(s: &str) -> String {
    if SHELL_SAFE_RE.is_match(s) {
        s.to_string()
    } else {
        shellquote(s)
    }
}

/// One external program execution: program, ordered arguments and the
/// environment it runs in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandInvocation {
    /// Program name or path.
    pub program: String,
    /// Ordered argument list.
    pub args: Vec<String>,
    /// Working directory, if different from the caller's.
    pub working_dir: Option<PathBuf>,
    /// Upper bound on process run time.
    pub timeout: Option<Duration>,
}

impl CommandInvocation {
    /// Creates an invocation of `program` with no arguments.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            working_dir: None,
            timeout: None,
        }
    }

    /// Appends one argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Appends several arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Runs the program in `dir`.
    pub fn working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    /// Kills the program if it runs longer than `timeout`.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Returns the command line as it would be typed into a shell.
    pub fn command_line(&self) -> String {
        std::iter::once(display_arg(&self.program))
            .chain(self.args.iter().map(|a| display_arg(a)))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Result of an external command execution.
#[derive(Debug, Clone)]
pub struct ExecResult {
    /// The exit code of the command (0 = success, -1 = killed by signal).
    pub exit_code: i32,
    /// The captured stdout output.
    pub stdout: String,
    /// The captured stderr output.
    pub stderr: String,
}

impl ExecResult {
    /// Returns true if the command succeeded (exit code 0).
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Returns the combined output (stdout + stderr).
    pub fn combined_output(&self) -> String {
        if self.stderr.is_empty() {
            self.stdout.clone()
        } else if self.stdout.is_empty() {
            self.stderr.clone()
        } else {
            format!("{}\n{}", self.stdout, self.stderr)
        }
    }
}

/// Reads `reader` to EOF, appending to `buf` chunk by chunk so that output
/// read before a cancellation is kept.
async fn drain<R: AsyncRead + Unpin>(reader: Option<R>, buf: &mut Vec<u8>) -> io::Result<()> {
    let Some(mut reader) = reader else {
        return Ok(());
    };
    let mut chunk = [0u8; READ_CHUNK_SIZE];
    loop {
        let n = reader.read(&mut chunk).await?;
        if n == 0 {
            return Ok(());
        }
        buf.extend_from_slice(&chunk[..n]);
    }
}

fn lossy(buf: &[u8]) -> String {
    String::from_utf8_lossy(buf).trim_end().to_string()
}

/// Executes an external command and captures its output.
///
/// Returns `Ok` for any process that ran to completion, whatever its exit
/// code; use [`exec_or_fail`] to turn a non-zero exit into an error.
///
/// # Returns
///
/// * `Ok(ExecResult)` - The command execution result
/// * `Err(SwitchCfgError::Spawn)` - If the command could not be started
/// * `Err(SwitchCfgError::Timeout)` - If the invocation's timeout expired
pub async fn exec(invocation: &CommandInvocation) -> SwitchCfgResult<ExecResult> {
    let command_line = invocation.command_line();

    if invocation.program.is_empty() {
        return Err(SwitchCfgError::invalid_config(
            "program",
            "command program must not be empty",
        ));
    }

    tracing::debug!(command = %command_line, "Executing command");

    let mut cmd = Command::new(&invocation.program);
    cmd.args(&invocation.args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    if let Some(dir) = &invocation.working_dir {
        cmd.current_dir(dir);
    }

    let spawn_err = |source: io::Error| SwitchCfgError::Spawn {
        command: command_line.clone(),
        source,
    };

    let mut child = cmd.spawn().map_err(spawn_err)?;
    let stdout_pipe = child.stdout.take();
    let stderr_pipe = child.stderr.take();

    let mut stdout_buf = Vec::new();
    let mut stderr_buf = Vec::new();

    let run = async {
        let (out, err) = tokio::join!(
            drain(stdout_pipe, &mut stdout_buf),
            drain(stderr_pipe, &mut stderr_buf),
        );
        out?;
        err?;
        child.wait().await
    };

    // `None` means the time limit expired before the process finished.
    let outcome: Option<io::Result<ExitStatus>> = match invocation.timeout {
        Some(limit) => tokio::time::timeout(limit, run).await.ok(),
        None => Some(run.await),
    };

    let Some(status) = outcome else {
        let limit = invocation.timeout.unwrap_or_default();
        if let Err(e) = child.kill().await {
            tracing::warn!(command = %command_line, error = %e, "Failed to kill timed out command");
        }
        tracing::warn!(
            command = %command_line,
            timeout_secs = limit.as_secs(),
            "Command timed out"
        );
        return Err(SwitchCfgError::Timeout {
            command: command_line,
            timeout_secs: limit.as_secs(),
            stdout: lossy(&stdout_buf),
            stderr: lossy(&stderr_buf),
        });
    };

    let exit_code = status.map_err(spawn_err)?.code().unwrap_or(-1);

    let result = ExecResult {
        exit_code,
        stdout: lossy(&stdout_buf),
        stderr: lossy(&stderr_buf),
    };

    if result.success() {
        tracing::trace!(command = %command_line, exit_code = exit_code, "Command succeeded");
    } else {
        tracing::warn!(
            command = %command_line,
            exit_code = exit_code,
            stderr = %result.stderr,
            "Command failed"
        );
    }

    Ok(result)
}

/// Executes an external command and returns an error on non-zero exit.
///
/// # Returns
///
/// * `Ok(String)` - The combined output on success
/// * `Err(SwitchCfgError)` - If the command fails to start, times out or
///   returns non-zero; the error carries the full captured output
pub async fn exec_or_fail(invocation: &CommandInvocation) -> SwitchCfgResult<String> {
    let result = exec(invocation).await?;
    if result.success() {
        Ok(result.combined_output())
    } else {
        Err(SwitchCfgError::CommandFailed {
            command: invocation.command_line(),
            exit_code: result.exit_code,
            stdout: result.stdout,
            stderr: result.stderr,
        })
    }
}
