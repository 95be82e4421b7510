//! Registration roster: the authoritative email → handle mapping.
//!
//! Seeded once from the registration export and refreshed one record at a
//! time by push ingestion. Emails are unique keys; handles are unique too.

use crate::error::Rejection;
use crate::models::{Email, Handle, RegistrantRecord};
use crate::persist::RosterSnapshot;
use std::collections::HashMap;

/// What an upsert did to the roster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpsertOutcome {
    /// New registrant
    Inserted,
    /// Existing registrant, handle corrected
    Updated { previous: Handle },
    /// Identical record already present
    Unchanged,
}

impl UpsertOutcome {
    /// True if the roster changed.
    pub fn is_change(&self) -> bool {
        !matches!(self, UpsertOutcome::Unchanged)
    }
}

/// Result of a bulk load.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BulkLoad {
    /// Rows written to the roster
    pub applied: usize,
    /// Rows refused because their handle belongs to a claimed registration
    pub skipped: Vec<RegistrantRecord>,
}

/// In-memory roster.
#[derive(Debug, Clone, Default)]
pub struct RosterStore {
    records: HashMap<Email, RegistrantRecord>,
    handles: HashMap<Handle, Email>,
}

impl RosterStore {
    /// Create an empty roster.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from a persisted snapshot.
    pub fn from_snapshot(snapshot: RosterSnapshot) -> Self {
        let mut roster = Self::new();
        roster.bulk_load(snapshot.records, |_| false);
        roster
    }

    /// Insert or replace the record for `email`.
    ///
    /// Idempotent. A handle already registered under a different email is
    /// refused with [`Rejection::HandleTaken`] and nothing changes.
    pub fn upsert(&mut self, email: Email, handle: Handle) -> Result<UpsertOutcome, Rejection> {
        if let Some(holder) = self.handles.get(&handle) {
            if *holder != email {
                return Err(Rejection::HandleTaken);
            }
        }

        match self.records.get_mut(&email) {
            Some(record) if record.handle == handle => Ok(UpsertOutcome::Unchanged),
            Some(record) => {
                let previous = std::mem::replace(&mut record.handle, handle.clone());
                self.handles.remove(&previous);
                self.handles.insert(handle, email);
                Ok(UpsertOutcome::Updated { previous })
            }
            None => {
                self.handles.insert(handle.clone(), email.clone());
                self.records
                    .insert(email.clone(), RegistrantRecord { email, handle });
                Ok(UpsertOutcome::Inserted)
            }
        }
    }

    /// Seed from a registration export.
    ///
    /// Later records win: a repeated email replaces the earlier row, and a
    /// repeated handle evicts the earlier holder. A row that would evict a
    /// record for which `is_claimed` holds is skipped and reported instead.
    pub fn bulk_load(
        &mut self,
        records: impl IntoIterator<Item = RegistrantRecord>,
        is_claimed: impl Fn(&Email) -> bool,
    ) -> BulkLoad {
        let mut report = BulkLoad::default();
        for record in records {
            let holder = self
                .handles
                .get(&record.handle)
                .filter(|holder| **holder != record.email)
                .cloned();
            if let Some(holder) = holder {
                if is_claimed(&holder) {
                    report.skipped.push(record);
                    continue;
                }
                self.records.remove(&holder);
            }
            if let Some(old) = self.records.get(&record.email) {
                self.handles.remove(&old.handle);
            }
            self.handles
                .insert(record.handle.clone(), record.email.clone());
            self.records.insert(record.email.clone(), record);
            report.applied += 1;
        }
        report
    }

    /// Look up a registrant by email.
    pub fn lookup(&self, email: &Email) -> Option<&RegistrantRecord> {
        self.records.get(email)
    }

    /// All records, in no particular order.
    pub fn records(&self) -> impl Iterator<Item = &RegistrantRecord> {
        self.records.values()
    }

    /// Number of registrants.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Capture the roster for persistence, ordered by email.
    pub fn snapshot(&self) -> RosterSnapshot {
        let mut records: Vec<RegistrantRecord> = self.records.values().cloned().collect();
        records.sort_by(|a, b| a.email.cmp(&b.email));
        RosterSnapshot { records }
    }
}
