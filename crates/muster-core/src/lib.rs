//! Muster Core - Participant Identity Reconciliation & Team Formation
//!
//! Links event registrants to their chat-platform accounts and lets verified
//! participants form small, uniquely named teams, under concurrent and
//! unordered commands.
//!
//! # Architecture
//!
//! - **Roster**: Authoritative email → handle mapping, refreshed by push
//! - **Identity**: Verification of accounts against the roster
//! - **Registry**: Team lifecycle, membership and capacity
//! - **Engine**: Serialized, durable orchestration of the above
//! - **Command**: Chat command surface producing messages and effects
//! - **Persist**: The durable storage boundary
//!
//! # Example
//!
//! ```no_run
//! use muster_core::{Email, EngineConfig, FormationEngine, Handle, MemoryPersistence, UserId};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let engine = FormationEngine::new(EngineConfig::default(), Arc::new(MemoryPersistence::new()))?;
//!     engine.upsert_registrant(Email::new("a@x.com"), Handle::new("Alice#1")).await?;
//!     engine.verify(UserId::new("42"), Handle::new("Alice#1"), Email::new("a@x.com")).await?;
//!     let created = engine.create_team(UserId::new("42"), "Falcons", vec![]).await?;
//!     println!("Team {} is number {}", created.team.name, created.team.sequence);
//!     Ok(())
//! }
//! ```

pub mod command;
pub mod config;
pub mod effects;
pub mod engine;
pub mod error;
pub mod identity;
pub mod models;
pub mod persist;
pub mod registry;
pub mod roster;

pub use command::{dispatch, Caller, Command, CommandOutcome, Status};
pub use config::EngineConfig;
pub use effects::{Effect, RoleKind, TeamSpace};
pub use engine::{
    FormationEngine, FormationState, MembersAdded, ParticipantRow, TeamCreated, TeamLeft, Verified,
};
pub use error::{Error, ErrorKind, NameProblem, PersistError, Rejection, Result};
pub use identity::IdentityLedger;
pub use models::{Email, Handle, RegistrantRecord, Team, TeamName, UserId, VerifiedIdentity};
pub use persist::{
    FormationSnapshot, MemoryPersistence, Persistence, RosterSnapshot, Snapshot, StoredState,
};
pub use registry::{Departure, TeamRegistry};
pub use roster::{BulkLoad, RosterStore, UpsertOutcome};
