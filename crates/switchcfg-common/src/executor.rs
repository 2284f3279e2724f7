//! Command executor abstraction.
//!
//! Managers never spawn processes directly; they go through a
//! [`CommandExecutor`] so that the step sequencing can be exercised against
//! a recording fake while production runs real processes.

use async_trait::async_trait;

use crate::error::SwitchCfgResult;
use crate::shell::{self, CommandInvocation};

/// Runs one external command to completion.
///
/// Implementations must return `Ok` with the captured output only when the
/// command exited successfully, and otherwise an error that carries the
/// captured stdout and stderr.
#[async_trait]
pub trait CommandExecutor: Send + Sync {
    /// Executes `invocation` and returns its combined output.
    async fn run(&self, invocation: &CommandInvocation) -> SwitchCfgResult<String>;
}

/// Executor that spawns real processes via [`shell::exec_or_fail`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessExecutor;

impl ProcessExecutor {
    /// Creates a new process executor.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CommandExecutor for ProcessExecutor {
    async fn run(&self, invocation: &CommandInvocation) -> SwitchCfgResult<String> {
        shell::exec_or_fail(invocation).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SwitchCfgError;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_process_executor_success() {
        let executor = ProcessExecutor::new();
        let output = executor
            .run(&CommandInvocation::new("echo").arg("ok"))
            .await
            .unwrap();
        assert_eq!(output, "ok");
    }

    #[tokio::test]
    async fn test_process_executor_as_trait_object() {
        let executor: Arc<dyn CommandExecutor> = Arc::new(ProcessExecutor);
        let result = executor
            .run(&CommandInvocation::new("/bin/sh").args(["-c", "echo nope >&2; exit 3"]))
            .await;
        match result {
            Err(SwitchCfgError::CommandFailed {
                exit_code, stderr, ..
            }) => {
                assert_eq!(exit_code, 3);
                assert_eq!(stderr, "nope");
            }
            other => panic!("Expected CommandFailed error, got {:?}", other),
        }
    }
}
