//! Team model.

use super::ids::UserId;
use crate::config::EngineConfig;
use crate::error::{NameProblem, Rejection};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// A validated team display name.
///
/// Uniqueness is case-insensitive (see [`TeamName::key`]) while the display
/// form keeps the creator's casing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TeamName(String);

impl TeamName {
    /// Validate a requested name against the configured rules.
    pub fn parse(raw: &str, config: &EngineConfig) -> Result<Self, Rejection> {
        let name = raw.trim();
        if name.is_empty() {
            return Err(Rejection::InvalidName(NameProblem::Empty));
        }
        if let Some(c) = name.chars().find(|c| config.illegal_name_chars.contains(*c)) {
            return Err(Rejection::InvalidName(NameProblem::IllegalCharacter(c)));
        }
        if name.chars().count() > config.max_name_len {
            return Err(Rejection::InvalidName(NameProblem::TooLong {
                max: config.max_name_len,
            }));
        }
        Ok(Self(name.to_string()))
    }

    /// Comparison key used for uniqueness.
    pub fn key(&self) -> String {
        Self::key_of(&self.0)
    }

    /// Comparison key for an unvalidated name.
    pub fn key_of(raw: &str) -> String {
        raw.trim().to_lowercase()
    }

    /// Display form, as typed by the creator.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TeamName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An active team.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    /// Display name
    pub name: TeamName,

    /// Current members (never empty while the team exists)
    pub members: BTreeSet<UserId>,

    /// Creation ordinal, strictly increasing and never reused
    pub sequence: u64,
}

impl Team {
    /// Number of members.
    pub fn size(&self) -> usize {
        self.members.len()
    }

    /// Check membership.
    pub fn contains(&self, user: &UserId) -> bool {
        self.members.contains(user)
    }
}
