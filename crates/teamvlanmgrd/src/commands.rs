//! Automation tool invocation builders for team VLAN operations

use switchcfg_common::{CommandInvocation, SwitchCfgResult};

use crate::config::PlaybookConfig;
use crate::types::TeamVlanVars;

/// Default automation tool
pub const DEFAULT_PROGRAM: &str = "ansible-playbook";

/// Default playbook that removes every team VLAN from the switch
pub const DEFAULT_TEARDOWN_PLAYBOOK: &str = "create_vlans.yaml";

/// Default playbook that creates team VLANs and their DHCP scopes
pub const DEFAULT_APPLY_PLAYBOOK: &str = "config_dhcp.yaml";

/// Flag introducing playbook extra-vars
pub const EXTRA_VARS_FLAG: &str = "-e";

/// Extra-var holding the list of team numbers
pub const TEAM_NUMBERS_VAR: &str = "team_numbers";

/// Encode populated team numbers as compact JSON extra-vars
///
/// `[254, 1114]` becomes `{"team_numbers":[254,1114]}`.
pub fn encode_team_vars(team_numbers: &[u32]) -> SwitchCfgResult<String> {
    Ok(serde_json::to_string(&TeamVlanVars { team_numbers })?)
}

fn base_invocation(playbook: &PlaybookConfig) -> CommandInvocation {
    let mut invocation = CommandInvocation::new(&playbook.program);
    if let Some(dir) = &playbook.working_dir {
        invocation = invocation.working_dir(dir.clone());
    }
    if let Some(timeout) = playbook.timeout() {
        invocation = invocation.timeout(timeout);
    }
    invocation
}

/// Build the teardown invocation
///
/// Takes no variables; the playbook resets all team VLAN state.
pub fn build_teardown_invocation(playbook: &PlaybookConfig) -> CommandInvocation {
    base_invocation(playbook).arg(&playbook.teardown)
}

/// Build the apply invocation for already-encoded team vars
pub fn build_apply_invocation(playbook: &PlaybookConfig, team_vars: &str) -> CommandInvocation {
    base_invocation(playbook)
        .arg(EXTRA_VARS_FLAG)
        .arg(team_vars)
        .arg(&playbook.apply)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::time::Duration;

    #[test]
    fn test_encode_team_vars() {
        assert_eq!(
            encode_team_vars(&[101, 102, 103, 104, 106]).unwrap(),
            r#"{"team_numbers":[101,102,103,104,106]}"#
        );
        assert!(encode_team_vars(&[254]).unwrap().contains(TEAM_NUMBERS_VAR));
    }

    #[test]
    fn test_encode_empty_list() {
        assert_eq!(encode_team_vars(&[]).unwrap(), r#"{"team_numbers":[]}"#);
    }

    #[test]
    fn test_build_teardown_invocation() {
        let inv = build_teardown_invocation(&PlaybookConfig::default());
        assert_eq!(inv.program, "ansible-playbook");
        assert_eq!(inv.args, vec!["create_vlans.yaml"]);
        assert_eq!(inv.timeout, Some(Duration::from_secs(300)));
        assert_eq!(inv.working_dir, None);
    }

    #[test]
    fn test_build_apply_invocation() {
        let vars = encode_team_vars(&[254, 1114]).unwrap();
        let inv = build_apply_invocation(&PlaybookConfig::default(), &vars);
        assert_eq!(inv.program, "ansible-playbook");
        assert_eq!(
            inv.args,
            vec!["-e", r#"{"team_numbers":[254,1114]}"#, "config_dhcp.yaml"]
        );
    }

    #[test]
    fn test_invocations_follow_config() {
        let playbook = PlaybookConfig {
            program: "/opt/venv/bin/ansible-playbook".to_string(),
            working_dir: Some(PathBuf::from("/opt/arena/ansible")),
            teardown: "reset.yaml".to_string(),
            apply: "teams.yaml".to_string(),
            timeout_secs: 0,
        };

        let teardown = build_teardown_invocation(&playbook);
        assert_eq!(teardown.program, "/opt/venv/bin/ansible-playbook");
        assert_eq!(teardown.args, vec!["reset.yaml"]);
        assert_eq!(
            teardown.working_dir,
            Some(PathBuf::from("/opt/arena/ansible"))
        );
        assert_eq!(teardown.timeout, None);

        let apply = build_apply_invocation(&playbook, "{}");
        assert_eq!(apply.args.last().map(String::as_str), Some("teams.yaml"));
    }
}
