//! Team formation engine.
//!
//! Owns the two shared structures and serializes every mutation:
//! - the roster, behind a `RwLock` (push ingestion writes, verification reads)
//! - the formation state (identity ledger + team registry), behind one
//!   `Mutex` so membership checks across teams are atomic
//!
//! Lock order is always formation → roster. Single-record roster writes
//! take only the roster lock; bulk loads take both, in that order.
//!
//! Every mutation is applied to a clone of the guarded value, the clone is
//! persisted, and only then swapped in. A failed write leaves memory as it was.

use crate::config::EngineConfig;
use crate::effects::{Effect, RoleKind};
use crate::error::{Error, Rejection, Result};
use crate::identity::IdentityLedger;
use crate::models::{Email, Handle, RegistrantRecord, Team, UserId, VerifiedIdentity};
use crate::persist::{FormationSnapshot, Persistence, Snapshot};
use crate::registry::{Departure, TeamRegistry};
use crate::roster::{RosterStore, UpsertOutcome};
use serde::Serialize;
use std::collections::BTreeSet;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

/// Identity ledger and team registry, guarded together.
#[derive(Debug, Clone, Default)]
pub struct FormationState {
    pub identities: IdentityLedger,
    pub registry: TeamRegistry,
}

impl FormationState {
    /// Rebuild from a persisted snapshot.
    pub fn from_snapshot(snapshot: FormationSnapshot) -> Self {
        Self {
            identities: IdentityLedger::from_identities(snapshot.identities),
            registry: TeamRegistry::from_parts(snapshot.teams, snapshot.last_sequence),
        }
    }

    /// Capture for persistence.
    pub fn snapshot(&self) -> FormationSnapshot {
        FormationSnapshot {
            identities: self.identities.identities(),
            teams: self.registry.teams().into_iter().cloned().collect(),
            last_sequence: self.registry.last_sequence(),
        }
    }
}

/// Successful verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verified {
    pub identity: VerifiedIdentity,
    pub effects: Vec<Effect>,
}

/// Successful team creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamCreated {
    pub team: Team,
    pub effects: Vec<Effect>,
}

/// Successful member addition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MembersAdded {
    pub team: Team,
    pub added: Vec<UserId>,
    pub effects: Vec<Effect>,
}

/// Successful departure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamLeft {
    pub departure: Departure,
    pub effects: Vec<Effect>,
}

/// One row of the organizer export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParticipantRow {
    pub handle: String,
    pub email: String,
    pub user_id: Option<String>,
    pub team: Option<String>,
}

/// The engine. Share it behind an `Arc`.
pub struct FormationEngine {
    config: EngineConfig,
    roster: RwLock<RosterStore>,
    formation: Mutex<FormationState>,
    persistence: Arc<dyn Persistence>,
}

impl FormationEngine {
    /// Create an engine, restoring whatever `persistence` holds.
    pub fn new(config: EngineConfig, persistence: Arc<dyn Persistence>) -> Result<Self> {
        let stored = persistence.restore()?;
        let roster = RosterStore::from_snapshot(stored.roster);
        let formation = FormationState::from_snapshot(stored.formation);
        tracing::info!(
            registrants = roster.len(),
            verified = formation.identities.len(),
            teams = formation.registry.len(),
            "Formation engine restored"
        );
        Ok(Self {
            config,
            roster: RwLock::new(roster),
            formation: Mutex::new(formation),
            persistence,
        })
    }

    /// Active configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    // --- Roster ---

    /// Insert or correct one registrant. Durable before it returns.
    pub async fn upsert_registrant(&self, email: Email, handle: Handle) -> Result<UpsertOutcome> {
        let mut roster = self.roster.write().await;
        let mut next = roster.clone();
        let outcome = next
            .upsert(email.clone(), handle.clone())
            .map_err(|r| rejected("Participant Records", email.as_str(), r))?;

        if outcome.is_change() {
            self.persist(Snapshot::Roster(next.snapshot()), "Participant Records")?;
            *roster = next;
            tracing::info!("[Participant Records] {} <{}> saved ({:?})", handle, email, outcome);
        }
        Ok(outcome)
    }

    /// Seed the roster from a registration export (later rows win).
    ///
    /// Rows that would displace a registration already linked to an account
    /// are skipped. Returns the number of rows applied.
    pub async fn bulk_load(&self, records: Vec<RegistrantRecord>) -> Result<usize> {
        let formation = self.formation.lock().await;
        let mut roster = self.roster.write().await;
        let mut next = roster.clone();
        let report = next.bulk_load(records, |email| formation.identities.claimant(email).is_some());
        for record in &report.skipped {
            tracing::warn!(
                "[Participant Records] skipped {} <{}>: handle belongs to a verified registration",
                record.handle,
                record.email
            );
        }
        self.persist(Snapshot::Roster(next.snapshot()), "Participant Records")?;
        *roster = next;
        tracing::info!(
            "[Participant Records] loaded {} records ({} registrants)",
            report.applied,
            roster.len()
        );
        Ok(report.applied)
    }

    /// Look up a registrant by email.
    pub async fn lookup_registrant(&self, email: &Email) -> Option<RegistrantRecord> {
        self.roster.read().await.lookup(email).cloned()
    }

    /// Number of registrants.
    pub async fn registrant_count(&self) -> usize {
        self.roster.read().await.len()
    }

    // --- Identity ---

    /// Link `user` to the registrant identified by `email`, if `handle` matches.
    pub async fn verify(&self, user: UserId, handle: Handle, email: Email) -> Result<Verified> {
        let mut formation = self.formation.lock().await;
        let mut next = formation.clone();
        let identity = {
            let roster = self.roster.read().await;
            next.identities
                .verify(&roster, user.clone(), &handle, &email)
                .map_err(|r| rejected("Verification", user.as_str(), r))?
        };

        self.commit(&mut formation, next, "Verification")?;
        tracing::info!("[Verification] {} verified as <{}>", user, identity.email);

        Ok(Verified {
            effects: vec![Effect::GrantRole {
                user,
                role: RoleKind::Participant,
            }],
            identity,
        })
    }

    /// The verified identity of a user.
    pub async fn identity(&self, user: &UserId) -> Option<VerifiedIdentity> {
        self.formation.lock().await.identities.get(user).cloned()
    }

    // --- Teams ---

    /// Create a team founded by `founder` with `invitees`.
    ///
    /// The founder is always a member: N distinct invitees yield N + 1 members.
    pub async fn create_team(
        &self,
        founder: UserId,
        name: &str,
        invitees: Vec<UserId>,
    ) -> Result<TeamCreated> {
        let mut members: BTreeSet<UserId> = invitees.into_iter().collect();
        members.insert(founder.clone());

        let mut formation = self.formation.lock().await;
        let mut next = formation.clone();
        let team = next
            .registry
            .create(name, &members, &next.identities, &self.config)
            .map_err(|r| rejected("Create Team", founder.as_str(), r))?;

        self.commit(&mut formation, next, "Create Team")?;
        tracing::info!(
            "[Create Team] Team {} ({}) created by {} with {} members",
            team.sequence,
            team.name,
            founder,
            team.size()
        );

        let mut effects = vec![Effect::ProvisionTeamSpace {
            team: team.name.clone(),
            number: team.sequence,
        }];
        for member in &team.members {
            effects.extend(Effect::join(member, &team.name));
        }
        Ok(TeamCreated { team, effects })
    }

    /// Add `invitees` to the caller's team.
    pub async fn add_members(&self, caller: UserId, invitees: Vec<UserId>) -> Result<MembersAdded> {
        let new_members: BTreeSet<UserId> = invitees.into_iter().collect();

        let mut formation = self.formation.lock().await;
        let team_name = formation
            .registry
            .team_of(&caller)
            .map(|t| t.name.clone())
            .ok_or_else(|| rejected("Add Team Member", caller.as_str(), Rejection::NotInTeam))?;

        let mut next = formation.clone();
        let team = next
            .registry
            .add_members(team_name.as_str(), &new_members, &next.identities, &self.config)
            .map_err(|r| rejected("Add Team Member", caller.as_str(), r))?;

        self.commit(&mut formation, next, "Add Team Member")?;

        let added: Vec<UserId> = new_members.into_iter().collect();
        tracing::info!(
            "[Add Team Member] {} added {} to {}",
            caller,
            added.iter().map(UserId::as_str).collect::<Vec<_>>().join(", "),
            team.name
        );

        let effects = added
            .iter()
            .flat_map(|member| Effect::join(member, &team.name))
            .collect();
        Ok(MembersAdded { team, added, effects })
    }

    /// Remove the caller from their team.
    pub async fn leave_team(&self, caller: UserId) -> Result<TeamLeft> {
        let mut formation = self.formation.lock().await;
        let mut next = formation.clone();
        let departure = next
            .registry
            .remove_member(&caller)
            .map_err(|r| rejected("Leave Team", caller.as_str(), r))?;

        self.commit(&mut formation, next, "Leave Team")?;
        tracing::info!("[Leave Team] {} left {}", caller, departure.team);

        let mut effects: Vec<Effect> = Effect::leave(&caller, &departure.team).into();
        if departure.disbanded {
            tracing::info!("[Leave Team] {} disbanded", departure.team);
            effects.push(Effect::DeprovisionIfEmpty {
                team: departure.team.clone(),
            });
        }
        Ok(TeamLeft { departure, effects })
    }

    /// Check if an active team has this name, ignoring case.
    pub async fn team_exists(&self, name: &str) -> bool {
        self.formation.lock().await.registry.exists(name)
    }

    /// The team a user belongs to.
    pub async fn team_of(&self, user: &UserId) -> Option<Team> {
        self.formation.lock().await.registry.team_of(user).cloned()
    }

    /// All active teams in creation order.
    pub async fn teams(&self) -> Vec<Team> {
        self.formation
            .lock()
            .await
            .registry
            .teams()
            .into_iter()
            .cloned()
            .collect()
    }

    /// One row per registrant with their linked account and team, by email.
    pub async fn export_participants(&self) -> Vec<ParticipantRow> {
        let formation = self.formation.lock().await;
        let roster = self.roster.read().await;

        let mut rows: Vec<ParticipantRow> = roster
            .records()
            .map(|record| {
                let user = formation.identities.claimant(&record.email);
                ParticipantRow {
                    handle: record.handle.to_string(),
                    email: record.email.to_string(),
                    user_id: user.map(|u| u.to_string()),
                    team: user
                        .and_then(|u| formation.registry.team_of(u))
                        .map(|t| t.name.to_string()),
                }
            })
            .collect();
        rows.sort_by(|a, b| a.email.cmp(&b.email));
        rows
    }

    fn commit(
        &self,
        current: &mut FormationState,
        next: FormationState,
        op: &str,
    ) -> Result<()> {
        self.persist(Snapshot::Formation(next.snapshot()), op)?;
        *current = next;
        Ok(())
    }

    // Runs the durable write inline while the caller's lock is held.
    fn persist(&self, snapshot: Snapshot, op: &str) -> Result<()> {
        self.persistence.persist(&snapshot).map_err(|e| {
            tracing::error!("[{}] durable write failed, change discarded: {}", op, e);
            Error::Persistence(e)
        })
    }
}

fn rejected(op: &str, actor: &str, rejection: Rejection) -> Error {
    tracing::warn!("[{}] Failure: {} ({})", op, actor, rejection);
    Error::Rejected(rejection)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::persist::MemoryPersistence;

    async fn engine_with(store: Arc<MemoryPersistence>) -> FormationEngine {
        FormationEngine::new(EngineConfig::default(), store).unwrap()
    }

    /// Register and verify `users`, each as `<user>@x.com` / `<user>#1`.
    async fn verified_engine(users: &[&str]) -> (FormationEngine, Arc<MemoryPersistence>) {
        let store = Arc::new(MemoryPersistence::new());
        let engine = engine_with(store.clone()).await;
        for user in users {
            let email = Email::new(&format!("{}@x.com", user));
            let handle = Handle::new(format!("{}#1", user));
            engine.upsert_registrant(email.clone(), handle.clone()).await.unwrap();
            engine.verify(UserId::new(*user), handle, email).await.unwrap();
        }
        (engine, store)
    }

    fn ids(users: &[&str]) -> Vec<UserId> {
        users.iter().map(|u| UserId::new(*u)).collect()
    }

    #[tokio::test]
    async fn verify_after_push() {
        let store = Arc::new(MemoryPersistence::new());
        let engine = engine_with(store.clone()).await;
        engine
            .upsert_registrant(Email::new("a@x.com"), Handle::new("Alice#1"))
            .await
            .unwrap();

        let verified = engine
            .verify(UserId::new("user1"), Handle::new("Alice#1"), Email::new("a@x.com"))
            .await
            .unwrap();

        assert_eq!(
            verified.identity,
            VerifiedIdentity {
                user: UserId::new("user1"),
                email: Email::new("a@x.com"),
            }
        );
        assert_eq!(
            verified.effects,
            vec![Effect::GrantRole {
                user: UserId::new("user1"),
                role: RoleKind::Participant,
            }]
        );
    }

    #[tokio::test]
    async fn second_account_cannot_claim_email() {
        let (engine, _) = verified_engine(&[]).await;
        engine
            .upsert_registrant(Email::new("a@x.com"), Handle::new("Alice#1"))
            .await
            .unwrap();

        let first = engine
            .verify(UserId::new("user1"), Handle::new("Alice#1"), Email::new("a@x.com"))
            .await;
        let second = engine
            .verify(UserId::new("user2"), Handle::new("Alice#1"), Email::new("a@x.com"))
            .await;

        assert!(first.is_ok());
        assert_eq!(second.unwrap_err(), Error::Rejected(Rejection::EmailClaimed));
        assert!(engine.identity(&UserId::new("user2")).await.is_none());
    }

    #[tokio::test]
    async fn repeated_upsert_does_not_write_again() {
        let (engine, store) = verified_engine(&[]).await;
        engine
            .upsert_registrant(Email::new("a@x.com"), Handle::new("Alice#1"))
            .await
            .unwrap();
        let writes = store.writes();
        let before = store.stored().unwrap();

        let outcome = engine
            .upsert_registrant(Email::new("A@X.com"), Handle::new("Alice#1"))
            .await
            .unwrap();

        assert_eq!(outcome, UpsertOutcome::Unchanged);
        assert_eq!(store.writes(), writes);
        assert_eq!(store.stored().unwrap(), before);
    }

    #[tokio::test]
    async fn unverified_founder_blocks_creation() {
        let (engine, _) = verified_engine(&["founder"]).await;

        let err = engine
            .create_team(UserId::new("founder"), "Falcons", ids(&["userA"]))
            .await
            .unwrap_err();

        assert_eq!(
            err,
            Error::Rejected(Rejection::MemberUnverified(ids(&["userA"])))
        );
        assert!(!engine.team_exists("Falcons").await);
    }

    #[tokio::test]
    async fn create_team_includes_founder() {
        let (engine, _) = verified_engine(&["f", "a", "b", "c", "g"]).await;

        let created = engine
            .create_team(UserId::new("f"), "Falcons", ids(&["a", "b", "c"]))
            .await
            .unwrap();
        assert_eq!(created.team.size(), 4);
        assert_eq!(created.team.sequence, 1);
        assert_eq!(
            created.effects[0],
            Effect::ProvisionTeamSpace {
                team: created.team.name.clone(),
                number: 1,
            }
        );
        // Provision + two grants per member
        assert_eq!(created.effects.len(), 1 + 2 * 4);

        let err = engine
            .create_team(UserId::new("g"), "falcons", vec![])
            .await
            .unwrap_err();
        assert_eq!(err, Error::Rejected(Rejection::NameTaken("falcons".into())));
    }

    #[tokio::test]
    async fn full_team_refuses_more_members() {
        let (engine, _) = verified_engine(&["f", "a", "b", "c", "d"]).await;
        engine
            .create_team(UserId::new("f"), "Falcons", ids(&["a", "b", "c"]))
            .await
            .unwrap();

        let err = engine
            .add_members(UserId::new("a"), ids(&["d"]))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Capacity);
        assert_eq!(engine.team_of(&UserId::new("f")).await.unwrap().size(), 4);
        assert!(engine.team_of(&UserId::new("d")).await.is_none());
    }

    #[tokio::test]
    async fn add_members_targets_callers_team() {
        let (engine, _) = verified_engine(&["f", "a", "b"]).await;
        engine
            .create_team(UserId::new("f"), "Falcons", vec![])
            .await
            .unwrap();

        let added = engine
            .add_members(UserId::new("f"), ids(&["a", "b"]))
            .await
            .unwrap();
        assert_eq!(added.team.size(), 3);
        assert_eq!(added.added, ids(&["a", "b"]));
        assert_eq!(added.effects.len(), 4);

        let err = engine
            .add_members(UserId::new("nobody"), ids(&["a"]))
            .await
            .unwrap_err();
        assert_eq!(err, Error::Rejected(Rejection::NotInTeam));
    }

    #[tokio::test]
    async fn last_member_leaving_disbands_team() {
        let (engine, _) = verified_engine(&["f"]).await;
        engine
            .create_team(UserId::new("f"), "Falcons", vec![])
            .await
            .unwrap();

        let left = engine.leave_team(UserId::new("f")).await.unwrap();
        assert!(left.departure.disbanded);
        assert!(!engine.team_exists("Falcons").await);
        assert_eq!(
            left.effects.last(),
            Some(&Effect::DeprovisionIfEmpty {
                team: left.departure.team.clone(),
            })
        );

        let err = engine.leave_team(UserId::new("f")).await.unwrap_err();
        assert_eq!(err, Error::Rejected(Rejection::NotInTeam));
    }

    #[tokio::test]
    async fn failed_write_rolls_back() {
        let (engine, store) = verified_engine(&["f", "a"]).await;
        store.fail_writes(true);

        let err = engine
            .create_team(UserId::new("f"), "Falcons", ids(&["a"]))
            .await
            .unwrap_err();
        assert!(err.is_retryable());
        assert!(!engine.team_exists("Falcons").await);
        assert!(engine.team_of(&UserId::new("a")).await.is_none());

        let err = engine
            .upsert_registrant(Email::new("z@x.com"), Handle::new("Zed#1"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Persistence);
        assert!(engine.lookup_registrant(&Email::new("z@x.com")).await.is_none());

        // The sequence number was never handed out, so the next team gets 1
        store.fail_writes(false);
        let created = engine
            .create_team(UserId::new("f"), "Falcons", ids(&["a"]))
            .await
            .unwrap();
        assert_eq!(created.team.sequence, 1);
    }

    #[tokio::test]
    async fn restart_restores_everything() {
        let (engine, store) = verified_engine(&["f", "a", "b"]).await;
        engine
            .create_team(UserId::new("f"), "Falcons", ids(&["a"]))
            .await
            .unwrap();
        engine
            .create_team(UserId::new("b"), "Owls", vec![])
            .await
            .unwrap();
        engine.leave_team(UserId::new("b")).await.unwrap();

        let restored = engine_with(store.clone()).await;
        assert_eq!(restored.teams().await, engine.teams().await);
        assert_eq!(restored.registrant_count().await, 3);
        assert!(restored.identity(&UserId::new("a")).await.is_some());

        // Owls (2) is gone but its number is still burned
        let created = restored
            .create_team(UserId::new("b"), "Owls", vec![])
            .await
            .unwrap();
        assert_eq!(created.team.sequence, 3);
    }

    #[tokio::test]
    async fn export_lists_links_and_teams() {
        let (engine, _) = verified_engine(&["f"]).await;
        engine
            .upsert_registrant(Email::new("z@x.com"), Handle::new("Zed#1"))
            .await
            .unwrap();
        engine
            .create_team(UserId::new("f"), "Falcons", vec![])
            .await
            .unwrap();

        let rows = engine.export_participants().await;
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].email, "f@x.com");
        assert_eq!(rows[0].user_id.as_deref(), Some("f"));
        assert_eq!(rows[0].team.as_deref(), Some("Falcons"));
        assert_eq!(rows[1].user_id, None);
    }

    #[tokio::test]
    async fn import_cannot_displace_verified_registration() {
        let (engine, store) = verified_engine(&["f"]).await;
        engine
            .create_team(UserId::new("f"), "Falcons", vec![])
            .await
            .unwrap();

        let applied = engine
            .bulk_load(vec![
                RegistrantRecord::new("c@x.com", "f#1"),
                RegistrantRecord::new("F@x.com", "f#2"),
                RegistrantRecord::new("z@x.com", "Zed#1"),
            ])
            .await
            .unwrap();
        assert_eq!(applied, 2);

        let record = engine.lookup_registrant(&Email::new("f@x.com")).await.unwrap();
        assert_eq!(record.handle, Handle::new("f#2"));
        assert!(engine.lookup_registrant(&Email::new("c@x.com")).await.is_none());
        assert_eq!(store.stored().unwrap().roster.records.len(), 2);

        let rows = engine.export_participants().await;
        let row = rows.iter().find(|r| r.email == "f@x.com").unwrap();
        assert_eq!(row.user_id.as_deref(), Some("f"));
        assert_eq!(row.team.as_deref(), Some("Falcons"));
        assert!(rows.iter().all(|r| r.email != "c@x.com"));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_creates_with_same_name() {
        let users: Vec<String> = (0..16).map(|i| format!("u{}", i)).collect();
        let refs: Vec<&str> = users.iter().map(String::as_str).collect();
        let (engine, _) = verified_engine(&refs).await;
        let engine = Arc::new(engine);

        let mut handles = Vec::new();
        for (i, user) in users.iter().enumerate() {
            let engine = Arc::clone(&engine);
            let user = UserId::new(user.as_str());
            let name = if i % 2 == 0 { "Falcons" } else { "FALCONS" };
            handles.push(tokio::spawn(async move {
                engine.create_team(user, name, vec![]).await
            }));
        }

        let mut wins = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => wins += 1,
                Err(e) => assert!(matches!(e, Error::Rejected(Rejection::NameTaken(_)))),
            }
        }
        assert_eq!(wins, 1);
        assert_eq!(engine.teams().await.len(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_adds_never_overflow() {
        let users: Vec<String> = (0..11).map(|i| format!("u{}", i)).collect();
        let refs: Vec<&str> = users.iter().map(String::as_str).collect();
        let (engine, _) = verified_engine(&refs).await;
        engine
            .create_team(UserId::new("u0"), "Falcons", vec![])
            .await
            .unwrap();
        let engine = Arc::new(engine);

        let mut handles = Vec::new();
        for pair in users[1..].chunks(2) {
            let engine = Arc::clone(&engine);
            let invitees: Vec<UserId> = pair.iter().map(|u| UserId::new(u.as_str())).collect();
            handles.push(tokio::spawn(async move {
                engine.add_members(UserId::new("u0"), invitees).await
            }));
        }
        for handle in handles {
            let _ = handle.await.unwrap();
        }

        let team = engine.team_of(&UserId::new("u0")).await.unwrap();
        assert!(team.size() <= 4);
        // 1 founder + 2 from exactly one pair; a second pair would overflow
        assert_eq!(team.size(), 3);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_verifications_of_one_email() {
        let (engine, _) = verified_engine(&[]).await;
        engine
            .upsert_registrant(Email::new("a@x.com"), Handle::new("Alice#1"))
            .await
            .unwrap();
        let engine = Arc::new(engine);

        let mut handles = Vec::new();
        for i in 0..8 {
            let engine = Arc::clone(&engine);
            handles.push(tokio::spawn(async move {
                engine
                    .verify(
                        UserId::new(format!("user{}", i)),
                        Handle::new("Alice#1"),
                        Email::new("a@x.com"),
                    )
                    .await
            }));
        }

        let mut wins = 0;
        for handle in handles {
            if handle.await.unwrap().is_ok() {
                wins += 1;
            }
        }
        assert_eq!(wins, 1);
    }
}
