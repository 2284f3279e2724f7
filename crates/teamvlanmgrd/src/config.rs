//! Configuration file support for teamvlanmgrd
//!
//! Loads and validates configuration from a TOML file.
//! Default location: /etc/arena/teamvlanmgrd.toml

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use switchcfg_common::{SwitchCfgError, SwitchCfgResult};
use tracing::info;

use crate::commands::{DEFAULT_APPLY_PLAYBOOK, DEFAULT_PROGRAM, DEFAULT_TEARDOWN_PLAYBOOK};
use crate::types::Credential;

/// Default configuration file path
pub const DEFAULT_CONFIG_PATH: &str = "/etc/arena/teamvlanmgrd.toml";

/// Switch identity
#[derive(Debug, Clone, Deserialize)]
pub struct SwitchSection {
    /// Network address of the switch
    #[serde(default = "default_switch_address")]
    pub address: String,

    /// Secret used by the automation tool
    #[serde(default)]
    pub credential: Credential,
}

/// Automation tool invocation settings
#[derive(Debug, Clone, Deserialize)]
pub struct PlaybookConfig {
    /// Program to run
    #[serde(default = "default_program")]
    pub program: String,

    /// Directory containing the playbooks
    #[serde(default)]
    pub working_dir: Option<PathBuf>,

    /// Playbook that removes all team VLANs
    #[serde(default = "default_teardown_playbook")]
    pub teardown: String,

    /// Playbook that creates team VLANs and DHCP scopes
    #[serde(default = "default_apply_playbook")]
    pub apply: String,

    /// Upper bound on one playbook run, in seconds (0 = no limit)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Settling delays around the switch reconfiguration
#[derive(Debug, Clone, Deserialize)]
pub struct TimingConfig {
    /// Pause after teardown before apply, in milliseconds
    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,

    /// Pause after apply before the next configuration may start, in milliseconds
    #[serde(default = "default_backoff_delay_ms")]
    pub backoff_delay_ms: u64,
}

/// Complete teamvlanmgrd configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SwitchCfgConfig {
    #[serde(default)]
    pub switch: SwitchSection,

    #[serde(default)]
    pub playbook: PlaybookConfig,

    #[serde(default)]
    pub timing: TimingConfig,
}

// Default functions
fn default_switch_address() -> String {
    "10.0.100.2".to_string()
}

fn default_program() -> String {
    DEFAULT_PROGRAM.to_string()
}

fn default_teardown_playbook() -> String {
    DEFAULT_TEARDOWN_PLAYBOOK.to_string()
}

fn default_apply_playbook() -> String {
    DEFAULT_APPLY_PLAYBOOK.to_string()
}

fn default_timeout_secs() -> u64 {
    300
}

fn default_settle_delay_ms() -> u64 {
    2_000
}

fn default_backoff_delay_ms() -> u64 {
    5_000
}

impl Default for SwitchSection {
    fn default() -> Self {
        Self {
            address: default_switch_address(),
            credential: Credential::default(),
        }
    }
}

impl Default for PlaybookConfig {
    fn default() -> Self {
        Self {
            program: default_program(),
            working_dir: None,
            teardown: default_teardown_playbook(),
            apply: default_apply_playbook(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            settle_delay_ms: default_settle_delay_ms(),
            backoff_delay_ms: default_backoff_delay_ms(),
        }
    }
}

impl PlaybookConfig {
    /// Per-run time limit, `None` when disabled
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }
}

impl TimingConfig {
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn backoff_delay(&self) -> Duration {
        Duration::from_millis(self.backoff_delay_ms)
    }

    /// No waiting at all; for tests
    pub fn immediate() -> Self {
        Self {
            settle_delay_ms: 0,
            backoff_delay_ms: 0,
        }
    }
}

impl SwitchCfgConfig {
    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> SwitchCfgResult<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| SwitchCfgError::invalid_config("config", e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> SwitchCfgResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            SwitchCfgError::invalid_config(path.display().to_string(), e.to_string())
        })?;
        Self::from_toml_str(&content)
    }

    /// Load configuration, falling back to defaults if the file is absent
    pub fn load_or_default(path: impl AsRef<Path>) -> SwitchCfgResult<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::load(path)
        } else {
            info!(path = %path.display(), "Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> SwitchCfgResult<()> {
        let non_empty = [
            ("switch.address", &self.switch.address),
            ("playbook.program", &self.playbook.program),
            ("playbook.teardown", &self.playbook.teardown),
            ("playbook.apply", &self.playbook.apply),
        ];
        for (field, value) in non_empty {
            if value.trim().is_empty() {
                return Err(SwitchCfgError::invalid_config(field, "must not be empty"));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = SwitchCfgConfig::default();
        assert_eq!(config.switch.address, "10.0.100.2");
        assert!(config.switch.credential.is_empty());
        assert_eq!(config.playbook.program, "ansible-playbook");
        assert_eq!(config.playbook.teardown, "create_vlans.yaml");
        assert_eq!(config.playbook.apply, "config_dhcp.yaml");
        assert_eq!(config.playbook.timeout(), Some(Duration::from_secs(300)));
        assert_eq!(config.timing.settle_delay(), Duration::from_secs(2));
        assert_eq!(config.timing.backoff_delay(), Duration::from_secs(5));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = SwitchCfgConfig::from_toml_str(
            r#"
            [switch]
            address = "10.0.100.3"
            credential = "s3cret"

            [timing]
            settle_delay_ms = 500
            "#,
        )
        .unwrap();

        assert_eq!(config.switch.address, "10.0.100.3");
        assert!(!config.switch.credential.is_empty());
        assert_eq!(config.timing.settle_delay(), Duration::from_millis(500));
        assert_eq!(config.timing.backoff_delay(), Duration::from_secs(5));
        assert_eq!(config.playbook.apply, "config_dhcp.yaml");
    }

    #[test]
    fn test_playbook_section() {
        let config = SwitchCfgConfig::from_toml_str(
            r#"
            [playbook]
            program = "/usr/local/bin/ansible-playbook"
            working_dir = "/opt/arena/ansible"
            timeout_secs = 0
            "#,
        )
        .unwrap();

        assert_eq!(config.playbook.program, "/usr/local/bin/ansible-playbook");
        assert_eq!(
            config.playbook.working_dir,
            Some(PathBuf::from("/opt/arena/ansible"))
        );
        assert_eq!(config.playbook.timeout(), None);
    }

    #[test]
    fn test_empty_program_rejected() {
        let result = SwitchCfgConfig::from_toml_str("[playbook]\nprogram = \"\"\n");
        match result {
            Err(SwitchCfgError::InvalidConfig { field, .. }) => {
                assert_eq!(field, "playbook.program")
            }
            other => panic!("Expected InvalidConfig, got {:?}", other),
        }
    }

    #[test]
    fn test_malformed_toml_rejected() {
        assert!(SwitchCfgConfig::from_toml_str("[timing]\nsettle_delay_ms = \"soon\"").is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[timing]\nbackoff_delay_ms = 100").unwrap();

        let config = SwitchCfgConfig::load(file.path()).unwrap();
        assert_eq!(config.timing.backoff_delay(), Duration::from_millis(100));
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let config =
            SwitchCfgConfig::load_or_default("/nonexistent/teamvlanmgrd.toml").unwrap();
        assert_eq!(config.playbook.program, "ansible-playbook");
    }

    #[test]
    fn test_credential_not_in_debug() {
        let config =
            SwitchCfgConfig::from_toml_str("[switch]\ncredential = \"hunter2\"\n").unwrap();
        assert!(!format!("{:?}", config).contains("hunter2"));
    }
}
