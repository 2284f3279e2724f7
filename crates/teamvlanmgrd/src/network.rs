//! Team network addressing for the arena switch
//!
//! Every alliance station has a fixed VLAN, and every team gets a /24 whose
//! middle octets spell out its team number, so a team's gateway is known
//! before it ever plugs in.

use serde::Serialize;
use std::fmt;
use std::net::Ipv4Addr;

use crate::types::{TeamSlotAssignment, TEAM_SLOT_COUNT};

/// Host octet of the team gateway on each team subnet
pub const TEAM_GATEWAY_HOST: u8 = 4;

/// First host octet handed out by DHCP
pub const DHCP_RANGE_START_HOST: u8 = 20;

/// Last host octet handed out by DHCP
pub const DHCP_RANGE_END_HOST: u8 = 199;

/// Prefix length of every team subnet
pub const TEAM_SUBNET_PREFIX_LEN: u8 = 24;

/// One team slot on the field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum AllianceStation {
    Red1,
    Red2,
    Red3,
    Blue1,
    Blue2,
    Blue3,
}

impl AllianceStation {
    /// All stations in slot order
    pub const ALL: [AllianceStation; TEAM_SLOT_COUNT] = [
        AllianceStation::Red1,
        AllianceStation::Red2,
        AllianceStation::Red3,
        AllianceStation::Blue1,
        AllianceStation::Blue2,
        AllianceStation::Blue3,
    ];

    /// VLAN carrying this station's team network
    pub fn vlan_id(&self) -> u16 {
        match self {
            AllianceStation::Red1 => 10,
            AllianceStation::Red2 => 20,
            AllianceStation::Red3 => 30,
            AllianceStation::Blue1 => 40,
            AllianceStation::Blue2 => 50,
            AllianceStation::Blue3 => 60,
        }
    }

    /// Short display name
    pub fn as_str(&self) -> &'static str {
        match self {
            AllianceStation::Red1 => "R1",
            AllianceStation::Red2 => "R2",
            AllianceStation::Red3 => "R3",
            AllianceStation::Blue1 => "B1",
            AllianceStation::Blue2 => "B2",
            AllianceStation::Blue3 => "B3",
        }
    }
}

impl fmt::Display for AllianceStation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Addressing plan for one team's wired network
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TeamNetwork {
    pub team: u32,
    pub network: Ipv4Addr,
    pub gateway: Ipv4Addr,
    pub dhcp_start: Ipv4Addr,
    pub dhcp_end: Ipv4Addr,
    pub broadcast: Ipv4Addr,
}

impl TeamNetwork {
    /// Derive the subnet `10.A.B.0/24` for `team`
    ///
    /// Up to three digits go in the third octet (`254` → `10.0.254`). Four
    /// digits split two and two (`1678` → `10.16.78`), five digits split
    /// three and two (`12345` → `10.123.45`). Zero, six or more digits, or
    /// an octet above 255 have no plan.
    pub fn for_team(team: u32) -> Option<Self> {
        let (second, third) = match team {
            0 => return None,
            1..=999 => (0, team),
            1_000..=99_999 => (team / 100, team % 100),
            _ => return None,
        };
        let second = u8::try_from(second).ok()?;
        let third = u8::try_from(third).ok()?;
        let host = |last: u8| Ipv4Addr::new(10, second, third, last);

        Some(Self {
            team,
            network: host(0),
            gateway: host(TEAM_GATEWAY_HOST),
            dhcp_start: host(DHCP_RANGE_START_HOST),
            dhcp_end: host(DHCP_RANGE_END_HOST),
            broadcast: host(255),
        })
    }

    /// Subnet in CIDR notation
    pub fn cidr(&self) -> String {
        format!("{}/{}", self.network, TEAM_SUBNET_PREFIX_LEN)
    }
}

/// What one station will look like after configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StationPlan {
    pub station: AllianceStation,
    pub vlan_id: u16,
    pub team: Option<u32>,
    pub network: Option<TeamNetwork>,
}

/// Per-station plan for `assignments`, in slot order
pub fn station_plan(assignments: &TeamSlotAssignment) -> Vec<StationPlan> {
    AllianceStation::ALL
        .iter()
        .zip(assignments.slots())
        .map(|(&station, team)| StationPlan {
            station,
            vlan_id: station.vlan_id(),
            team,
            network: team.and_then(TeamNetwork::for_team),
        })
        .collect()
}
