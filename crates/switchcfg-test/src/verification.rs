//! Verification helpers for testing switch configuration managers
//!
//! Provides assertion helpers over the invocations a [`RecordingExecutor`]
//! captured.

use serde::Deserialize;
use switchcfg_common::CommandInvocation;
use thiserror::Error;

use crate::RecordingExecutor;

/// Verification error types
#[derive(Error, Debug)]
pub enum VerificationError {
    #[error("Invocation {index} missing: only {actual} invocations recorded")]
    MissingInvocation { index: usize, actual: usize },

    #[error("Invocation {index} mismatch: expected '{expected}', got '{actual}'")]
    InvocationMismatch {
        index: usize,
        expected: String,
        actual: String,
    },

    #[error("Expected {expected} invocations, found {actual}")]
    CountMismatch { expected: usize, actual: usize },

    #[error("Invocation '{command}' has no -e extra-vars argument")]
    MissingExtraVars { command: String },

    #[error("Malformed extra-vars: {0}")]
    MalformedExtraVars(#[from] serde_json::Error),
}

/// Result type for verification operations
pub type VerifyResult<T> = Result<T, VerificationError>;

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct TeamVars {
    team_numbers: Vec<u32>,
}

/// Extract the `team_numbers` list from an apply invocation's `-e` argument
pub fn team_numbers_from(invocation: &CommandInvocation) -> VerifyResult<Vec<u32>> {
    let vars = invocation
        .args
        .iter()
        .position(|a| a == "-e")
        .and_then(|i| invocation.args.get(i + 1))
        .ok_or_else(|| VerificationError::MissingExtraVars {
            command: invocation.command_line(),
        })?;
    let parsed: TeamVars = serde_json::from_str(vars)?;
    Ok(parsed.team_numbers)
}

/// Invocation sequence verifier
pub struct InvocationVerifier<'a> {
    executor: &'a RecordingExecutor,
}

impl<'a> InvocationVerifier<'a> {
    /// Create a new verifier over `executor`'s recorded invocations
    pub fn new(executor: &'a RecordingExecutor) -> Self {
        Self { executor }
    }

    /// Verify the exact number of recorded invocations
    pub fn assert_count(&self, expected: usize) -> VerifyResult<()> {
        let actual = self.executor.invocations().len();
        if actual != expected {
            return Err(VerificationError::CountMismatch { expected, actual });
        }
        Ok(())
    }

    /// Verify that invocation `index` has exactly `program` and `args`
    pub fn assert_invocation(&self, index: usize, program: &str, args: &[&str]) -> VerifyResult<()> {
        let invocations = self.executor.invocations();
        let actual = invocations
            .get(index)
            .ok_or(VerificationError::MissingInvocation {
                index,
                actual: invocations.len(),
            })?;
        let expected = CommandInvocation::new(program).args(args.iter().copied());
        if actual.program != expected.program || actual.args != expected.args {
            return Err(VerificationError::InvocationMismatch {
                index,
                expected: expected.command_line(),
                actual: actual.command_line(),
            });
        }
        Ok(())
    }

    /// Verify that invocation `index` applies exactly `teams`
    pub fn assert_applied_teams(&self, index: usize, teams: &[u32]) -> VerifyResult<()> {
        let invocations = self.executor.invocations();
        let actual = invocations
            .get(index)
            .ok_or(VerificationError::MissingInvocation {
                index,
                actual: invocations.len(),
            })?;
        let applied = team_numbers_from(actual)?;
        if applied != teams {
            return Err(VerificationError::InvocationMismatch {
                index,
                expected: format!("{:?}", teams),
                actual: format!("{:?}", applied),
            });
        }
        Ok(())
    }
}
