//! Recording executor used in place of the automation tool
//!
//! Records every invocation it receives, answers with scripted outcomes and
//! tracks how many commands were in flight at once so tests can check that
//! configuration steps never overlap.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use switchcfg_common::{CommandExecutor, CommandInvocation, SwitchCfgError, SwitchCfgResult};

/// Outcome returned for a matching invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptedOutcome {
    /// Exit 0 with the given output
    Succeed(String),
    /// Exit non-zero with the given output
    Fail {
        exit_code: i32,
        stdout: String,
        stderr: String,
    },
    /// Hit the time limit with the given partial output
    TimedOut { stdout: String },
}

impl ScriptedOutcome {
    /// Failure with exit code 2 and the given stderr, the way
    /// `ansible-playbook` reports an unreachable host
    pub fn fail(stderr: impl Into<String>) -> Self {
        ScriptedOutcome::Fail {
            exit_code: 2,
            stdout: String::new(),
            stderr: stderr.into(),
        }
    }

    fn into_result(self, invocation: &CommandInvocation) -> SwitchCfgResult<String> {
        match self {
            ScriptedOutcome::Succeed(output) => Ok(output),
            ScriptedOutcome::Fail {
                exit_code,
                stdout,
                stderr,
            } => Err(SwitchCfgError::CommandFailed {
                command: invocation.command_line(),
                exit_code,
                stdout,
                stderr,
            }),
            ScriptedOutcome::TimedOut { stdout } => Err(SwitchCfgError::Timeout {
                command: invocation.command_line(),
                timeout_secs: invocation.timeout.map(|t| t.as_secs()).unwrap_or_default(),
                stdout,
                stderr: String::new(),
            }),
        }
    }
}

#[derive(Default)]
struct Recorded {
    invocations: Vec<CommandInvocation>,
    /// (substring of the command line, outcome); first match wins
    rules: Vec<(String, ScriptedOutcome)>,
}

/// Fake [`CommandExecutor`] that records invocations instead of running them
#[derive(Default)]
pub struct RecordingExecutor {
    recorded: Mutex<Recorded>,
    command_delay: Duration,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl RecordingExecutor {
    /// Create an executor where every command succeeds immediately
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every command take `delay` before completing
    pub fn with_command_delay(mut self, delay: Duration) -> Self {
        self.command_delay = delay;
        self
    }

    /// Answer invocations whose command line contains `pattern` with `outcome`
    pub fn with_outcome(self, pattern: impl Into<String>, outcome: ScriptedOutcome) -> Self {
        self.lock().rules.push((pattern.into(), outcome));
        self
    }

    /// Replace all scripted outcomes, so later calls can behave differently
    pub fn set_outcomes(&self, rules: Vec<(String, ScriptedOutcome)>) {
        self.lock().rules = rules;
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Recorded> {
        self.recorded.lock().expect("recording lock poisoned")
    }

    /// All invocations received so far, in arrival order
    pub fn invocations(&self) -> Vec<CommandInvocation> {
        self.lock().invocations.clone()
    }

    /// Number of invocations whose command line contains `pattern`
    pub fn count_matching(&self, pattern: &str) -> usize {
        self.lock()
            .invocations
            .iter()
            .filter(|inv| inv.command_line().contains(pattern))
            .count()
    }

    /// Highest number of commands that were executing at the same time
    pub fn max_concurrent(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CommandExecutor for RecordingExecutor {
    async fn run(&self, invocation: &CommandInvocation) -> SwitchCfgResult<String> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        let outcome = {
            let mut recorded = self.lock();
            recorded.invocations.push(invocation.clone());
            let line = invocation.command_line();
            recorded
                .rules
                .iter()
                .find(|(pattern, _)| line.contains(pattern.as_str()))
                .map(|(_, outcome)| outcome.clone())
                .unwrap_or_else(|| ScriptedOutcome::Succeed("ok".to_string()))
        };
        tracing::debug!(command = %invocation.command_line(), ?outcome, "Recorded invocation");

        if !self.command_delay.is_zero() {
            tokio::time::sleep(self.command_delay).await;
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        outcome.into_result(invocation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_records_and_succeeds_by_default() {
        let executor = RecordingExecutor::new();
        let inv = CommandInvocation::new("ansible-playbook").arg("create_vlans.yaml");

        assert_eq!(executor.run(&inv).await.unwrap(), "ok");
        assert_eq!(executor.invocations(), vec![inv]);
        assert_eq!(executor.count_matching("create_vlans.yaml"), 1);
        assert_eq!(executor.max_concurrent(), 1);
    }

    #[tokio::test]
    async fn test_scripted_failure() {
        let executor = RecordingExecutor::new()
            .with_outcome("config_dhcp.yaml", ScriptedOutcome::fail("unreachable"));

        let ok = CommandInvocation::new("ansible-playbook").arg("create_vlans.yaml");
        assert!(executor.run(&ok).await.is_ok());

        let bad = CommandInvocation::new("ansible-playbook").arg("config_dhcp.yaml");
        match executor.run(&bad).await {
            Err(SwitchCfgError::CommandFailed { stderr, .. }) => assert_eq!(stderr, "unreachable"),
            other => panic!("Expected CommandFailed, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_set_outcomes_replaces_rules() {
        let executor =
            RecordingExecutor::new().with_outcome("create_vlans", ScriptedOutcome::fail("x"));
        executor.set_outcomes(Vec::new());

        let inv = CommandInvocation::new("ansible-playbook").arg("create_vlans.yaml");
        assert!(executor.run(&inv).await.is_ok());
    }
}
