//! teamvlanmgrd - Team VLAN Configuration Manager
//!
//! Entry point for the teamvlanmgrd command.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use std::str::FromStr;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use arena_teamvlanmgrd::{
    station_plan, SwitchCfg, SwitchCfgConfig, TeamSlotAssignment, DEFAULT_CONFIG_PATH,
    TEAM_SLOT_COUNT,
};

/// One team slot on the command line: a team number, or `-`/`0` for empty
#[derive(Debug, Clone, Copy)]
struct SlotArg(Option<u32>);

impl FromStr for SlotArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "-" {
            return Ok(SlotArg(None));
        }
        let team: u32 = s
            .parse()
            .map_err(|_| format!("'{}' is not a team number or '-'", s))?;
        Ok(SlotArg((team != 0).then_some(team)))
    }
}

#[derive(Parser, Debug)]
#[command(name = "teamvlanmgrd", version, about = "Configure arena switch VLANs for the teams on the field")]
struct Cli {
    /// Configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Reconfigure the switch for six stations (R1 R2 R3 B1 B2 B3)
    Configure {
        #[arg(num_args = TEAM_SLOT_COUNT, required = true, allow_hyphen_values = true)]
        slots: Vec<SlotArg>,
    },
    /// Show the VLAN and subnet each station would get, without touching the switch
    Plan {
        #[arg(num_args = TEAM_SLOT_COUNT, required = true, allow_hyphen_values = true)]
        slots: Vec<SlotArg>,
    },
}

fn to_assignment(slots: &[SlotArg]) -> Result<TeamSlotAssignment> {
    let slots: [Option<u32>; TEAM_SLOT_COUNT] = slots
        .iter()
        .map(|s| s.0)
        .collect::<Vec<_>>()
        .try_into()
        .map_err(|v: Vec<_>| {
            anyhow::anyhow!("expected {} team slots, got {}", TEAM_SLOT_COUNT, v.len())
        })?;
    Ok(TeamSlotAssignment::new(slots))
}

/// Initializes tracing/logging subsystem
fn init_logging() -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber).context("Failed to set tracing subscriber")
}

fn print_plan(assignments: &TeamSlotAssignment) {
    println!("{:<8} {:<6} {:<7} {:<18} GATEWAY", "STATION", "VLAN", "TEAM", "SUBNET");
    for slot in station_plan(assignments) {
        let team = slot.team.map(|t| t.to_string()).unwrap_or_else(|| "-".to_string());
        let (subnet, gateway) = match slot.network {
            Some(net) => (net.cidr(), net.gateway.to_string()),
            None => ("-".to_string(), "-".to_string()),
        };
        println!(
            "{:<8} {:<6} {:<7} {:<18} {}",
            slot.station, slot.vlan_id, team, subnet, gateway
        );
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = SwitchCfgConfig::load_or_default(&cli.config)
        .with_context(|| format!("Failed to load config from {}", cli.config.display()))?;

    match cli.command {
        Command::Plan { slots } => {
            print_plan(&to_assignment(&slots)?);
            Ok(())
        }
        Command::Configure { slots } => {
            let assignments = to_assignment(&slots)?;
            if config.switch.credential.is_empty() {
                warn!("No switch credential configured");
            }

            let switch = SwitchCfg::new(&config);
            info!(switch = %switch.address(), teams = ?assignments.team_numbers(), "Configuring team VLANs");

            switch
                .configure_teams(&assignments)
                .await
                .context("Team VLAN configuration failed")?;

            println!("{}", switch.status());
            Ok(())
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_logging() {
        eprintln!("{:#}", e);
        return ExitCode::FAILURE;
    }

    info!("--- Starting teamvlanmgrd ---");

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %format!("{:#}", e), "teamvlanmgrd failed");
            eprintln!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_arg_parse() {
        assert_eq!(SlotArg::from_str("254").unwrap().0, Some(254));
        assert_eq!(SlotArg::from_str("-").unwrap().0, None);
        assert_eq!(SlotArg::from_str("0").unwrap().0, None);
        assert!(SlotArg::from_str("red").is_err());
    }

    #[test]
    fn test_cli_configure() {
        let cli = Cli::try_parse_from([
            "teamvlanmgrd", "configure", "101", "102", "103", "104", "-", "106",
        ])
        .unwrap();
        let Command::Configure { slots } = cli.command else {
            panic!("Expected configure subcommand");
        };
        let assignments = to_assignment(&slots).unwrap();
        assert_eq!(assignments.team_numbers(), vec![101, 102, 103, 104, 106]);
        assert_eq!(cli.config, PathBuf::from(DEFAULT_CONFIG_PATH));
    }

    #[test]
    fn test_cli_requires_six_slots() {
        assert!(Cli::try_parse_from(["teamvlanmgrd", "plan", "254", "1114"]).is_err());
    }

    #[test]
    fn test_cli_config_flag() {
        let cli = Cli::try_parse_from([
            "teamvlanmgrd", "--config", "/tmp/arena.toml", "plan", "-", "-", "-", "-", "-", "-",
        ])
        .unwrap();
        assert_eq!(cli.config, PathBuf::from("/tmp/arena.toml"));
    }
}
