//! teamvlanmgrd - team VLAN configuration manager for the arena switch
//!
//! Gives every team on the field its own wired network by driving the
//! automation tool through a teardown/apply sequence, one configuration
//! at a time.

mod commands;
mod config;
mod network;
mod switch_cfg;
mod types;

pub use commands::*;
pub use config::*;
pub use network::*;
pub use switch_cfg::SwitchCfg;
pub use types::*;
