//! SwitchCfg - team VLAN configuration for one arena switch

use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Mutex};
use tracing::{debug, error, info, instrument, warn};

use switchcfg_common::{CommandExecutor, ProcessExecutor, SwitchCfgResult};

use crate::commands::{build_apply_invocation, build_teardown_invocation, encode_team_vars};
use crate::config::{PlaybookConfig, SwitchCfgConfig};
use crate::network::station_plan;
use crate::types::{Credential, SwitchStatus, TeamSlotAssignment};

/// SwitchCfg reconfigures the team VLANs of one switch
///
/// Configuration flow, all under one lock:
/// 1. Teardown playbook removes every team VLAN
/// 2. Wait `settle_delay`
/// 3. Apply playbook creates VLANs for the populated slots (skipped if none)
/// 4. Wait `backoff_delay`
///
/// Concurrent callers queue on the lock; the next teardown starts only after
/// the previous attempt's backoff has elapsed.
pub struct SwitchCfg {
    address: String,
    credential: Credential,
    playbook: PlaybookConfig,
    settle_delay: Duration,
    backoff_delay: Duration,
    executor: Arc<dyn CommandExecutor>,

    /// Held for the whole configuration sequence, delays included
    config_lock: Mutex<()>,

    /// Latest status; readable without the lock
    status_tx: watch::Sender<SwitchStatus>,
}

/// Marks the attempt failed if it is dropped before finishing, so a
/// cancelled caller never leaves the status at CONFIGURING.
struct AttemptGuard<'a> {
    status_tx: &'a watch::Sender<SwitchStatus>,
    finished: bool,
}

impl<'a> AttemptGuard<'a> {
    fn begin(status_tx: &'a watch::Sender<SwitchStatus>) -> Self {
        status_tx.send_replace(SwitchStatus::Configuring);
        Self {
            status_tx,
            finished: false,
        }
    }

    fn finish(mut self, status: SwitchStatus) {
        self.status_tx.send_replace(status);
        self.finished = true;
    }
}

impl Drop for AttemptGuard<'_> {
    fn drop(&mut self) {
        if !self.finished {
            warn!("Configuration attempt abandoned, switch state unknown");
            self.status_tx.send_replace(SwitchStatus::Error);
        }
    }
}

impl SwitchCfg {
    /// Creates a SwitchCfg that runs the real automation tool
    pub fn new(config: &SwitchCfgConfig) -> Self {
        Self::with_executor(config, Arc::new(ProcessExecutor::new()))
    }

    /// Creates a SwitchCfg that runs commands through `executor`
    pub fn with_executor(config: &SwitchCfgConfig, executor: Arc<dyn CommandExecutor>) -> Self {
        let (status_tx, _) = watch::channel(SwitchStatus::Unknown);
        Self {
            address: config.switch.address.clone(),
            credential: config.switch.credential.clone(),
            playbook: config.playbook.clone(),
            settle_delay: config.timing.settle_delay(),
            backoff_delay: config.timing.backoff_delay(),
            executor,
            config_lock: Mutex::new(()),
            status_tx,
        }
    }

    /// Switch address
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Current status
    ///
    /// Does not wait for an in-flight configuration; reads CONFIGURING for
    /// as long as one is running.
    pub fn status(&self) -> SwitchStatus {
        *self.status_tx.borrow()
    }

    /// Receiver notified on every status change
    pub fn subscribe(&self) -> watch::Receiver<SwitchStatus> {
        self.status_tx.subscribe()
    }

    /// Sets up wired networks for the given team slots
    ///
    /// Waits for any configuration already in progress. Returns once the
    /// status is ACTIVE or ERROR; on error the switch state is unknown until
    /// the next successful call, whose teardown resets it.
    #[instrument(skip(self, assignments), fields(switch = %self.address))]
    pub async fn configure_teams(&self, assignments: &TeamSlotAssignment) -> SwitchCfgResult<()> {
        let _lock = self.config_lock.lock().await;
        let attempt = AttemptGuard::begin(&self.status_tx);

        match self.run_sequence(assignments).await {
            Ok(()) => {
                attempt.finish(SwitchStatus::Active);
                info!("Team VLAN configuration active");
                Ok(())
            }
            Err(e) => {
                attempt.finish(SwitchStatus::Error);
                error!(error = %e, "Team VLAN configuration failed");
                Err(e)
            }
        }
    }

    async fn run_sequence(&self, assignments: &TeamSlotAssignment) -> SwitchCfgResult<()> {
        // Remove old team VLANs to reset the switch state
        let teardown = build_teardown_invocation(&self.playbook);
        info!(command = %teardown.command_line(), "Removing team VLANs");
        self.executor.run(&teardown).await?;

        debug!(delay_ms = self.settle_delay.as_millis() as u64, "Waiting for teardown to settle");
        tokio::time::sleep(self.settle_delay).await;

        let team_numbers = assignments.team_numbers();
        if team_numbers.is_empty() {
            info!("No teams assigned, skipping VLAN creation");
            return Ok(());
        }

        for slot in station_plan(assignments) {
            match (slot.team, slot.network) {
                (Some(team), Some(net)) => info!(
                    station = %slot.station,
                    vlan = slot.vlan_id,
                    team,
                    subnet = %net.cidr(),
                    gateway = %net.gateway,
                    "Planned team network"
                ),
                (Some(team), None) => warn!(
                    station = %slot.station,
                    vlan = slot.vlan_id,
                    team,
                    "Team number has no address plan"
                ),
                (None, _) => debug!(station = %slot.station, "Station empty"),
            }
        }

        let team_vars = encode_team_vars(&team_numbers)?;
        let apply = build_apply_invocation(&self.playbook, &team_vars);
        info!(command = %apply.command_line(), teams = ?team_numbers, "Creating team VLANs");
        self.executor.run(&apply).await?;

        // Give the switch time to converge before another configuration
        debug!(delay_ms = self.backoff_delay.as_millis() as u64, "Backing off");
        tokio::time::sleep(self.backoff_delay).await;

        Ok(())
    }
}

impl fmt::Debug for SwitchCfg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SwitchCfg")
            .field("address", &self.address)
            .field("credential", &self.credential)
            .field("status", &self.status())
            .field("settle_delay", &self.settle_delay)
            .field("backoff_delay", &self.backoff_delay)
            .finish()
    }
}
