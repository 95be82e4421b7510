//! Durable persistence boundary.
//!
//! The engine only needs two primitives: write a snapshot of one of its
//! shared structures, and read everything back at startup. Storage
//! technology is the implementor's business.

use crate::error::PersistError;
use crate::models::{RegistrantRecord, Team, VerifiedIdentity};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

/// Persisted roster contents.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterSnapshot {
    pub records: Vec<RegistrantRecord>,
}

/// Persisted identity ledger and team registry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormationSnapshot {
    pub identities: Vec<VerifiedIdentity>,
    pub teams: Vec<Team>,
    /// Highest team sequence number ever handed out
    pub last_sequence: u64,
}

/// One section of engine state to make durable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "section", rename_all = "snake_case")]
pub enum Snapshot {
    Roster(RosterSnapshot),
    Formation(FormationSnapshot),
}

/// Everything restored at startup. Empty sections default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredState {
    pub roster: RosterSnapshot,
    pub formation: FormationSnapshot,
}

/// Durable store used by the engine.
///
/// `persist` must not return until the snapshot is durable; an `Err` means
/// the engine discards the change it was about to commit.
pub trait Persistence: Send + Sync {
    /// Replace the stored section with `snapshot`.
    fn persist(&self, snapshot: &Snapshot) -> Result<(), PersistError>;

    /// Read back all stored sections.
    fn restore(&self) -> Result<StoredState, PersistError>;
}

/// In-process store for tests and ephemeral runs.
#[derive(Debug, Default)]
pub struct MemoryPersistence {
    state: Mutex<StoredState>,
    fail_writes: AtomicBool,
    writes: AtomicUsize,
}

impl MemoryPersistence {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-loaded with state.
    pub fn with_state(state: StoredState) -> Self {
        Self {
            state: Mutex::new(state),
            ..Self::default()
        }
    }

    /// Make every subsequent write fail (or succeed again).
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of successful writes so far.
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Copy of the stored state.
    pub fn stored(&self) -> Result<StoredState, PersistError> {
        self.restore()
    }
}

impl Persistence for MemoryPersistence {
    fn persist(&self, snapshot: &Snapshot) -> Result<(), PersistError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(PersistError::Write("injected write failure".into()));
        }
        let mut state = self
            .state
            .lock()
            .map_err(|_| PersistError::Write("memory store poisoned".into()))?;
        match snapshot {
            Snapshot::Roster(roster) => state.roster = roster.clone(),
            Snapshot::Formation(formation) => state.formation = formation.clone(),
        }
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn restore(&self) -> Result<StoredState, PersistError> {
        self.state
            .lock()
            .map(|state| state.clone())
            .map_err(|_| PersistError::Read("memory store poisoned".into()))
    }
}
