//! Type definitions for teamvlanmgrd

use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of team slots (alliance stations) on the field
pub const TEAM_SLOT_COUNT: usize = 6;

/// Operator-visible configuration status of a switch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SwitchStatus {
    /// No configuration attempted yet
    #[default]
    Unknown,
    /// A configuration attempt is in flight
    Configuring,
    /// The last attempt completed
    Active,
    /// The last attempt failed; switch state is unknown
    Error,
}

impl SwitchStatus {
    /// Convert to string
    pub fn as_str(&self) -> &'static str {
        match self {
            SwitchStatus::Unknown => "UNKNOWN",
            SwitchStatus::Configuring => "CONFIGURING",
            SwitchStatus::Active => "ACTIVE",
            SwitchStatus::Error => "ERROR",
        }
    }

    /// Returns true for the states a finished attempt leaves behind
    pub fn is_terminal(&self) -> bool {
        matches!(self, SwitchStatus::Active | SwitchStatus::Error)
    }
}

impl fmt::Display for SwitchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered team slots for one configuration request
///
/// Slot order is alliance station order. A slot holding team number 0 is
/// treated as empty, since team numbers are positive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TeamSlotAssignment {
    slots: [Option<u32>; TEAM_SLOT_COUNT],
}

impl TeamSlotAssignment {
    /// Create an assignment from six optional team numbers
    pub fn new(slots: [Option<u32>; TEAM_SLOT_COUNT]) -> Self {
        Self { slots }
    }

    /// Team number in `index`, or `None` if the slot is empty
    pub fn slot(&self, index: usize) -> Option<u32> {
        self.slots.get(index).copied().flatten().filter(|&t| t != 0)
    }

    /// Iterate over all six slots in order
    pub fn slots(&self) -> impl Iterator<Item = Option<u32>> + '_ {
        (0..TEAM_SLOT_COUNT).map(|i| self.slot(i))
    }

    /// Populated team numbers in slot order, empty slots dropped
    pub fn team_numbers(&self) -> Vec<u32> {
        self.slots().flatten().collect()
    }

    /// Returns true if no slot holds a team
    pub fn is_empty(&self) -> bool {
        self.slots().all(|s| s.is_none())
    }
}

impl From<[Option<u32>; TEAM_SLOT_COUNT]> for TeamSlotAssignment {
    fn from(slots: [Option<u32>; TEAM_SLOT_COUNT]) -> Self {
        Self::new(slots)
    }
}

/// Playbook variables for the apply step
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TeamVlanVars<'a> {
    /// Populated team numbers in slot order
    pub team_numbers: &'a [u32],
}

/// Opaque secret handed to the automation tool; never printed
#[derive(Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct Credential(String);

impl Credential {
    /// Wrap a secret value
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    /// Returns true if no secret was configured
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(<redacted>)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_switch_status_strings() {
        assert_eq!(SwitchStatus::default(), SwitchStatus::Unknown);
        assert_eq!(SwitchStatus::Unknown.to_string(), "UNKNOWN");
        assert_eq!(SwitchStatus::Configuring.as_str(), "CONFIGURING");
        assert_eq!(SwitchStatus::Active.as_str(), "ACTIVE");
        assert_eq!(SwitchStatus::Error.as_str(), "ERROR");
    }

    #[test]
    fn test_switch_status_terminal() {
        assert!(SwitchStatus::Active.is_terminal());
        assert!(SwitchStatus::Error.is_terminal());
        assert!(!SwitchStatus::Configuring.is_terminal());
        assert!(!SwitchStatus::Unknown.is_terminal());
    }

    #[test]
    fn test_switch_status_serde() {
        assert_eq!(
            serde_json::to_string(&SwitchStatus::Configuring).unwrap(),
            "\"CONFIGURING\""
        );
    }

    #[test]
    fn test_team_numbers_drop_empty_slots() {
        let slots =
            TeamSlotAssignment::new([Some(101), Some(102), Some(103), Some(104), None, Some(106)]);
        assert_eq!(slots.team_numbers(), vec![101, 102, 103, 104, 106]);
        assert!(!slots.is_empty());
        assert_eq!(slots.slot(4), None);
        assert_eq!(slots.slot(5), Some(106));
        assert_eq!(slots.slot(6), None);
    }

    #[test]
    fn test_team_zero_is_empty() {
        let slots = TeamSlotAssignment::from([Some(0), None, None, None, None, Some(0)]);
        assert!(slots.is_empty());
        assert!(slots.team_numbers().is_empty());
    }

    #[test]
    fn test_team_vlan_vars_json() {
        let vars = TeamVlanVars {
            team_numbers: &[254, 1114],
        };
        assert_eq!(
            serde_json::to_string(&vars).unwrap(),
            r#"{"team_numbers":[254,1114]}"#
        );
    }

    #[test]
    fn test_credential_redacted() {
        let cred = Credential::new("hunter2");
        assert!(!cred.is_empty());
        assert!(Credential::default().is_empty());
        assert!(!format!("{:?}", cred).contains("hunter2"));
    }
}
