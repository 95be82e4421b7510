//! Persistent storage using RocksDB.
//!
//! Key layout:
//! - `registrant:{email}` → [`RegistrantRecord`]
//! - `identity:{user}` → [`VerifiedIdentity`]
//! - `team:{lowercased name}` → [`Team`]
//! - `meta:last_sequence` → highest team number handed out
//!
//! Each snapshot section is written as a single synced batch, so a section
//! is either fully replaced or untouched.

use crate::error::{Error, Result};
use muster_core::{
    FormationSnapshot, PersistError, Persistence, RegistrantRecord, RosterSnapshot, Snapshot,
    StoredState, Team, VerifiedIdentity,
};
use rocksdb::{Options, WriteBatch, WriteOptions, DB};
use serde::de::DeserializeOwned;
use std::path::Path;

const REGISTRANT_PREFIX: &str = "registrant:";
const IDENTITY_PREFIX: &str = "identity:";
const TEAM_PREFIX: &str = "team:";
const LAST_SEQUENCE_KEY: &[u8] = b"meta:last_sequence";

/// Storage backend for node state.
pub struct Storage {
    db: DB,
}

impl Storage {
    /// Open or create storage at the given path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        let db = DB::open(&opts, path)?;
        Ok(Self { db })
    }

    // --- Roster ---

    /// Replace every stored registrant with `snapshot`.
    pub fn write_roster(&self, snapshot: &RosterSnapshot) -> Result<()> {
        let mut batch = WriteBatch::default();
        self.delete_prefix(&mut batch, REGISTRANT_PREFIX)?;
        for record in &snapshot.records {
            let key = format!("{}{}", REGISTRANT_PREFIX, record.email);
            batch.put(key.as_bytes(), serde_json::to_vec(record)?);
        }
        self.write(batch)
    }

    /// All stored registrants.
    pub fn list_registrants(&self) -> Result<Vec<RegistrantRecord>> {
        self.list(REGISTRANT_PREFIX)
    }

    // --- Identities and teams ---

    /// Replace stored identities, teams and the sequence counter.
    pub fn write_formation(&self, snapshot: &FormationSnapshot) -> Result<()> {
        let mut batch = WriteBatch::default();
        self.delete_prefix(&mut batch, IDENTITY_PREFIX)?;
        self.delete_prefix(&mut batch, TEAM_PREFIX)?;

        for identity in &snapshot.identities {
            let key = format!("{}{}", IDENTITY_PREFIX, identity.user);
            batch.put(key.as_bytes(), serde_json::to_vec(identity)?);
        }
        for team in &snapshot.teams {
            let key = format!("{}{}", TEAM_PREFIX, team.name.key());
            batch.put(key.as_bytes(), serde_json::to_vec(team)?);
        }
        batch.put(LAST_SEQUENCE_KEY, serde_json::to_vec(&snapshot.last_sequence)?);
        self.write(batch)
    }

    /// All stored identities.
    pub fn list_identities(&self) -> Result<Vec<VerifiedIdentity>> {
        self.list(IDENTITY_PREFIX)
    }

    /// All stored teams.
    pub fn list_teams(&self) -> Result<Vec<Team>> {
        self.list(TEAM_PREFIX)
    }

    /// Highest team number ever handed out.
    pub fn last_sequence(&self) -> Result<u64> {
        match self.db.get(LAST_SEQUENCE_KEY)? {
            Some(data) => Ok(serde_json::from_slice(&data)?),
            None => Ok(0),
        }
    }

    /// Read back everything.
    pub fn read_state(&self) -> Result<StoredState> {
        Ok(StoredState {
            roster: RosterSnapshot {
                records: self.list_registrants()?,
            },
            formation: FormationSnapshot {
                identities: self.list_identities()?,
                teams: self.list_teams()?,
                last_sequence: self.last_sequence()?,
            },
        })
    }

    fn write(&self, batch: WriteBatch) -> Result<()> {
        let mut opts = WriteOptions::default();
        opts.set_sync(true);
        self.db.write_opt(batch, &opts)?;
        Ok(())
    }

    fn delete_prefix(&self, batch: &mut WriteBatch, prefix: &str) -> Result<()> {
        let iter = self.db.prefix_iterator(prefix.as_bytes());
        for item in iter {
            let (key, _) = item?;
            if key.starts_with(prefix.as_bytes()) {
                batch.delete(key);
            } else {
                break;
            }
        }
        Ok(())
    }

    fn list<T: DeserializeOwned>(&self, prefix: &str) -> Result<Vec<T>> {
        let mut items = Vec::new();

        let iter = self.db.prefix_iterator(prefix.as_bytes());
        for item in iter {
            let (key, value) = item?;
            if key.starts_with(prefix.as_bytes()) {
                items.push(serde_json::from_slice(&value)?);
            } else {
                break;
            }
        }

        Ok(items)
    }
}

impl Persistence for Storage {
    fn persist(&self, snapshot: &Snapshot) -> std::result::Result<(), PersistError> {
        let result = match snapshot {
            Snapshot::Roster(roster) => self.write_roster(roster),
            Snapshot::Formation(formation) => self.write_formation(formation),
        };
        result.map_err(|e| PersistError::Write(e.to_string()))
    }

    fn restore(&self) -> std::result::Result<StoredState, PersistError> {
        self.read_state().map_err(|e| match e {
            Error::Serialization(e) => PersistError::Corrupt(e.to_string()),
            other => PersistError::Read(other.to_string()),
        })
    }
}
