//! Test infrastructure for arena switch configuration managers
//!
//! Provides:
//! - A recording executor that stands in for the automation tool
//! - Scripted command outcomes (success, failure, slow commands)
//! - Team slot fixtures for common arena layouts
//! - Invocation verification helpers

pub mod fixtures;
mod recording;
mod verification;

pub use fixtures::*;
pub use recording::{RecordingExecutor, ScriptedOutcome};
pub use verification::*;
