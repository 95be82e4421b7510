//! Platform-effect intents.
//!
//! The engine never touches the chat platform. It describes what should
//! happen there and an external binding applies it.

use crate::models::{Team, TeamName, UserId};
use serde::{Deserialize, Serialize};

/// Role a participant can be granted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "team", rename_all = "snake_case")]
pub enum RoleKind {
    /// Verified event participant
    Participant,
    /// Member of some team
    TeamAssigned,
    /// Member of this particular team
    SpecificTeam(TeamName),
}

/// A requested change on the chat platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "effect", rename_all = "snake_case")]
pub enum Effect {
    GrantRole { user: UserId, role: RoleKind },
    RevokeRole { user: UserId, role: RoleKind },
    ProvisionTeamSpace { team: TeamName, number: u64 },
    DeprovisionIfEmpty { team: TeamName },
}

impl Effect {
    /// Grants for a user joining `team`.
    pub fn join(user: &UserId, team: &TeamName) -> [Effect; 2] {
        [
            Effect::GrantRole {
                user: user.clone(),
                role: RoleKind::TeamAssigned,
            },
            Effect::GrantRole {
                user: user.clone(),
                role: RoleKind::SpecificTeam(team.clone()),
            },
        ]
    }

    /// Revocations for a user leaving `team`.
    pub fn leave(user: &UserId, team: &TeamName) -> [Effect; 2] {
        [
            Effect::RevokeRole {
                user: user.clone(),
                role: RoleKind::TeamAssigned,
            },
            Effect::RevokeRole {
                user: user.clone(),
                role: RoleKind::SpecificTeam(team.clone()),
            },
        ]
    }
}

/// Names of the platform objects backing a team.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TeamSpace {
    pub role: String,
    pub category: String,
    pub text_channel: String,
    pub voice_channel: String,
}

impl TeamSpace {
    /// Derive the names for a team and its number.
    pub fn new(team: &TeamName, number: u64) -> Self {
        let name = team.as_str();
        Self {
            role: format!("Team: {}", name),
            category: format!("Team {} - {}", number, name),
            text_channel: format!("{}-text", name.replace(' ', "-")),
            voice_channel: format!("{} Voice", name),
        }
    }

    /// Names for an existing team.
    pub fn for_team(team: &Team) -> Self {
        Self::new(&team.name, team.sequence)
    }
}
