//! Team registry.
//!
//! Owns the lifecycle of every team: `Nonexistent → Active → Disbanded`.
//! A team is disbanded, and forgotten, when its last member leaves.
//!
//! Invariants held after every call, successful or not:
//! - a user belongs to at most one team
//! - no two teams share a case-insensitive name
//! - sequence numbers strictly increase and are never reused

use crate::config::EngineConfig;
use crate::error::Rejection;
use crate::identity::IdentityLedger;
use crate::models::{Team, TeamName, UserId};
use std::collections::{BTreeSet, HashMap};

/// Result of removing a member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Departure {
    /// Team the member left
    pub team: TeamName,
    /// That team's sequence number
    pub sequence: u64,
    /// True if the member was the last one and the team is gone
    pub disbanded: bool,
}

/// Active teams, keyed by lowercased name.
#[derive(Debug, Clone, Default)]
pub struct TeamRegistry {
    teams: HashMap<String, Team>,
    membership: HashMap<UserId, String>,
    last_sequence: u64,
}

impl TeamRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from stored teams.
    pub fn from_parts(teams: impl IntoIterator<Item = Team>, last_sequence: u64) -> Self {
        let mut registry = Self {
            last_sequence,
            ..Self::default()
        };
        for team in teams {
            let key = team.name.key();
            for member in &team.members {
                registry.membership.insert(member.clone(), key.clone());
            }
            registry.last_sequence = registry.last_sequence.max(team.sequence);
            registry.teams.insert(key, team);
        }
        registry
    }

    /// Check if an active team has this name, ignoring case.
    pub fn exists(&self, name: &str) -> bool {
        self.teams.contains_key(&TeamName::key_of(name))
    }

    /// Get a team by name, ignoring case.
    pub fn get(&self, name: &str) -> Option<&Team> {
        self.teams.get(&TeamName::key_of(name))
    }

    /// The team a user belongs to.
    pub fn team_of(&self, user: &UserId) -> Option<&Team> {
        self.membership
            .get(user)
            .and_then(|key| self.teams.get(key))
    }

    /// All active teams in creation order.
    pub fn teams(&self) -> Vec<&Team> {
        let mut teams: Vec<&Team> = self.teams.values().collect();
        teams.sort_by_key(|t| t.sequence);
        teams
    }

    /// Number of active teams.
    pub fn len(&self) -> usize {
        self.teams.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.teams.is_empty()
    }

    /// Highest sequence number handed out so far (0 if none).
    pub fn last_sequence(&self) -> u64 {
        self.last_sequence
    }

    /// Create a team with the given founding members.
    ///
    /// Checks, in order: name validity, name uniqueness, verification of
    /// every founder, founders not already teamed, and team size.
    pub fn create(
        &mut self,
        name: &str,
        founders: &BTreeSet<UserId>,
        identities: &IdentityLedger,
        config: &EngineConfig,
    ) -> Result<Team, Rejection> {
        let name = TeamName::parse(name, config)?;
        if founders.is_empty() {
            return Err(Rejection::NoMembers);
        }
        if self.teams.contains_key(&name.key()) {
            return Err(Rejection::NameTaken(name.as_str().to_string()));
        }
        self.check_candidates(founders, identities)?;
        if founders.len() > config.max_team_size {
            return Err(Rejection::CapacityExceeded {
                max: config.max_team_size,
                requested: founders.len(),
            });
        }

        self.last_sequence += 1;
        let team = Team {
            name,
            members: founders.clone(),
            sequence: self.last_sequence,
        };
        let key = team.name.key();
        for member in founders {
            self.membership.insert(member.clone(), key.clone());
        }
        self.teams.insert(key, team.clone());
        Ok(team)
    }

    /// Add members to an existing team.
    ///
    /// Checks, in order: the team exists, the result fits, every new member
    /// is verified, and none is already on a team (including this one).
    pub fn add_members(
        &mut self,
        name: &str,
        new_members: &BTreeSet<UserId>,
        identities: &IdentityLedger,
        config: &EngineConfig,
    ) -> Result<Team, Rejection> {
        if new_members.is_empty() {
            return Err(Rejection::NoMembers);
        }
        let key = TeamName::key_of(name);
        let current = self
            .teams
            .get(&key)
            .ok_or_else(|| Rejection::TeamNotFound(name.to_string()))?
            .size();

        let requested = current + new_members.len();
        if requested > config.max_team_size {
            return Err(Rejection::CapacityExceeded {
                max: config.max_team_size,
                requested,
            });
        }
        self.check_candidates(new_members, identities)?;

        let team = self
            .teams
            .get_mut(&key)
            .ok_or_else(|| Rejection::TeamNotFound(name.to_string()))?;
        for member in new_members {
            team.members.insert(member.clone());
            self.membership.insert(member.clone(), key.clone());
        }
        Ok(team.clone())
    }

    /// Remove a user from their team, disbanding it if they were the last.
    pub fn remove_member(&mut self, user: &UserId) -> Result<Departure, Rejection> {
        let key = self.membership.remove(user).ok_or(Rejection::NotInTeam)?;
        let team = self.teams.get_mut(&key).ok_or(Rejection::NotInTeam)?;
        team.members.remove(user);

        let departure = Departure {
            team: team.name.clone(),
            sequence: team.sequence,
            disbanded: team.members.is_empty(),
        };
        if departure.disbanded {
            self.teams.remove(&key);
        }
        Ok(departure)
    }

    /// Report every unverified candidate, then every already-teamed one.
    fn check_candidates(
        &self,
        candidates: &BTreeSet<UserId>,
        identities: &IdentityLedger,
    ) -> Result<(), Rejection> {
        let unverified: Vec<UserId> = candidates
            .iter()
            .filter(|u| !identities.is_verified(u))
            .cloned()
            .collect();
        if !unverified.is_empty() {
            return Err(Rejection::MemberUnverified(unverified));
        }

        let teamed: Vec<UserId> = candidates
            .iter()
            .filter(|u| self.membership.contains_key(*u))
            .cloned()
            .collect();
        if !teamed.is_empty() {
            return Err(Rejection::MemberAlreadyTeamed(teamed));
        }
        Ok(())
    }
}
