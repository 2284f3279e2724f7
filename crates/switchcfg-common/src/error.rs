//! Error types for switch configuration operations.
//!
//! All errors implement `std::error::Error` via `thiserror`. External tool
//! failures always carry the captured stdout and stderr of the failing
//! command, since that output is the only diagnostic the operator gets.

use std::io;
use thiserror::Error;

/// Result type alias for switch configuration operations.
pub type SwitchCfgResult<T> = Result<T, SwitchCfgError>;

/// Errors that can occur during switch configuration operations.
#[derive(Debug, Error)]
pub enum SwitchCfgError {
    /// Failed to start an external command.
    #[error("Failed to execute command '{command}': {source}")]
    Spawn {
        /// The command line that failed to start.
        command: String,
        /// The underlying IO error.
        #[source]
        source: io::Error,
    },

    /// External command returned a non-zero exit code.
    #[error(
        "Command failed: '{command}' (exit code {exit_code})\n--- stdout ---\n{stdout}\n--- stderr ---\n{stderr}"
    )]
    CommandFailed {
        /// The command line that failed.
        command: String,
        /// The exit code, or -1 if the process was killed by a signal.
        exit_code: i32,
        /// Captured standard output.
        stdout: String,
        /// Captured standard error.
        stderr: String,
    },

    /// External command did not finish within its time limit.
    #[error(
        "Command timed out after {timeout_secs}s: '{command}'\n--- stdout ---\n{stdout}\n--- stderr ---\n{stderr}"
    )]
    Timeout {
        /// The command line that timed out.
        command: String,
        /// The time limit in seconds.
        timeout_secs: u64,
        /// Standard output captured before the process was killed.
        stdout: String,
        /// Standard error captured before the process was killed.
        stderr: String,
    },

    /// Team list could not be encoded into the automation tool's variables.
    #[error("Failed to encode playbook variables: {0}")]
    Encoding(#[from] serde_json::Error),

    /// Configuration validation error.
    #[error("Invalid configuration for {field}: {message}")]
    InvalidConfig {
        /// The field that failed validation.
        field: String,
        /// Error message.
        message: String,
    },
}

impl SwitchCfgError {
    /// Creates an invalid configuration error.
    pub fn invalid_config(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Returns true if the automation tool failed to start, exited
    /// non-zero, or timed out.
    pub fn is_external_tool_failure(&self) -> bool {
        matches!(
            self,
            SwitchCfgError::Spawn { .. }
                | SwitchCfgError::CommandFailed { .. }
                | SwitchCfgError::Timeout { .. }
        )
    }

    /// Returns the output captured from the failing command, if any.
    pub fn captured_output(&self) -> Option<(&str, &str)> {
        match self {
            SwitchCfgError::CommandFailed { stdout, stderr, .. }
            | SwitchCfgError::Timeout { stdout, stderr, .. } => {
                Some((stdout.as_str(), stderr.as_str()))
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_failed_display_includes_output() {
        let err = SwitchCfgError::CommandFailed {
            command: "ansible-playbook create_vlans.yaml".to_string(),
            exit_code: 2,
            stdout: "PLAY RECAP failed=1".to_string(),
            stderr: "ERROR! could not reach switch".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("ansible-playbook create_vlans.yaml"));
        assert!(msg.contains("exit code 2"));
        assert!(msg.contains("PLAY RECAP failed=1"));
        assert!(msg.contains("ERROR! could not reach switch"));
    }

    #[test]
    fn test_timeout_display() {
        let err = SwitchCfgError::Timeout {
            command: "ansible-playbook config_dhcp.yaml".to_string(),
            timeout_secs: 30,
            stdout: "TASK [vlan]".to_string(),
            stderr: String::new(),
        };
        assert!(err.to_string().contains("timed out after 30s"));
        assert!(err.to_string().contains("TASK [vlan]"));
    }

    #[test]
    fn test_invalid_config() {
        let err = SwitchCfgError::invalid_config("playbook.program", "must not be empty");
        assert_eq!(
            err.to_string(),
            "Invalid configuration for playbook.program: must not be empty"
        );
    }

    #[test]
    fn test_is_external_tool_failure() {
        let failed = SwitchCfgError::CommandFailed {
            command: "false".to_string(),
            exit_code: 1,
            stdout: String::new(),
            stderr: String::new(),
        };
        assert!(failed.is_external_tool_failure());

        let spawn = SwitchCfgError::Spawn {
            command: "missing".to_string(),
            source: io::Error::new(io::ErrorKind::NotFound, "not found"),
        };
        assert!(spawn.is_external_tool_failure());

        assert!(!SwitchCfgError::invalid_config("x", "y").is_external_tool_failure());
    }

    #[test]
    fn test_captured_output() {
        let err = SwitchCfgError::CommandFailed {
            command: "false".to_string(),
            exit_code: 1,
            stdout: "out".to_string(),
            stderr: "err".to_string(),
        };
        assert_eq!(err.captured_output(), Some(("out", "err")));
        assert_eq!(
            SwitchCfgError::invalid_config("x", "y").captured_output(),
            None
        );
    }
}
