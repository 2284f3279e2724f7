//! Common infrastructure for arena switch configuration managers.
//!
//! This crate provides the pieces every switch configuration manager needs
//! regardless of which switch or VLAN layout it drives:
//!
//! - [`shell`]: External command execution with full output capture
//! - [`CommandExecutor`]: The seam through which managers run commands,
//!   so sequencing logic can be tested against a fake
//! - [`error`]: Error types for switch configuration operations
//!
//! # Example
//!
//! ```ignore
//! use switchcfg_common::{
//!     shell::CommandInvocation, CommandExecutor, ProcessExecutor, SwitchCfgResult,
//! };
//!
//! async fn reset_vlans(executor: &dyn CommandExecutor) -> SwitchCfgResult<()> {
//!     let invocation = CommandInvocation::new("ansible-playbook").arg("create_vlans.yaml");
//!     executor.run(&invocation).await?;
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod executor;
pub mod shell;

// Re-export commonly used items at crate root
pub use error::{SwitchCfgError, SwitchCfgResult};
pub use executor::{CommandExecutor, ProcessExecutor};
pub use shell::{CommandInvocation, ExecResult};
