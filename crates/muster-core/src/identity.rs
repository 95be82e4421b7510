//! Identity reconciliation.
//!
//! Links a platform account to a roster entry once the caller proves they
//! know both the registration email and the handle recorded for it.

use crate::error::Rejection;
use crate::models::{Email, Handle, UserId, VerifiedIdentity};
use crate::roster::RosterStore;
use std::collections::HashMap;

/// Every verified identity, indexed both ways.
///
/// A user maps to at most one identity and an email to at most one user.
#[derive(Debug, Clone, Default)]
pub struct IdentityLedger {
    by_user: HashMap<UserId, VerifiedIdentity>,
    by_email: HashMap<Email, UserId>,
}

impl IdentityLedger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from stored identities.
    pub fn from_identities(identities: impl IntoIterator<Item = VerifiedIdentity>) -> Self {
        let mut ledger = Self::new();
        for identity in identities {
            ledger.insert(identity);
        }
        ledger
    }

    /// Reconcile a caller against the roster.
    ///
    /// Checks, in order: the account is not yet verified, the email is on
    /// the roster, the recorded handle equals `claimed_handle` exactly, and
    /// no other account has claimed the email.
    pub fn verify(
        &mut self,
        roster: &RosterStore,
        user: UserId,
        claimed_handle: &Handle,
        claimed_email: &Email,
    ) -> Result<VerifiedIdentity, Rejection> {
        if self.by_user.contains_key(&user) {
            return Err(Rejection::AlreadyVerified);
        }

        let record = roster
            .lookup(claimed_email)
            .ok_or(Rejection::EmailNotFound)?;

        if record.handle != *claimed_handle {
            return Err(Rejection::HandleMismatch);
        }

        if self.by_email.contains_key(&record.email) {
            return Err(Rejection::EmailClaimed);
        }

        let identity = VerifiedIdentity {
            user,
            email: record.email.clone(),
        };
        self.insert(identity.clone());
        Ok(identity)
    }

    fn insert(&mut self, identity: VerifiedIdentity) {
        self.by_email
            .insert(identity.email.clone(), identity.user.clone());
        self.by_user.insert(identity.user.clone(), identity);
    }

    /// Check if a user is verified.
    pub fn is_verified(&self, user: &UserId) -> bool {
        self.by_user.contains_key(user)
    }

    /// The identity held by a user.
    pub fn get(&self, user: &UserId) -> Option<&VerifiedIdentity> {
        self.by_user.get(user)
    }

    /// The account that claimed an email.
    pub fn claimant(&self, email: &Email) -> Option<&UserId> {
        self.by_email.get(email)
    }

    /// All identities, ordered by user id.
    pub fn identities(&self) -> Vec<VerifiedIdentity> {
        let mut all: Vec<VerifiedIdentity> = self.by_user.values().cloned().collect();
        all.sort_by(|a, b| a.user.cmp(&b.user));
        all
    }

    /// Number of verified accounts.
    pub fn len(&self) -> usize {
        self.by_user.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.by_user.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roster() -> RosterStore {
        let mut roster = RosterStore::new();
        roster
            .upsert(Email::new("a@x.com"), Handle::new("Alice#1"))
            .unwrap();
        roster
    }

    #[test]
    fn matching_caller_is_verified() {
        let roster = roster();
        let mut ledger = IdentityLedger::new();

        let identity = ledger
            .verify(&roster, UserId::new("user1"), &Handle::new("Alice#1"), &Email::new("A@x.com"))
            .unwrap();

        assert_eq!(identity.user, UserId::new("user1"));
        assert_eq!(identity.email, Email::new("a@x.com"));
        assert!(ledger.is_verified(&UserId::new("user1")));
        assert_eq!(ledger.claimant(&Email::new("a@x.com")), Some(&UserId::new("user1")));
    }

    #[test]
    fn unknown_email() {
        let roster = roster();
        let mut ledger = IdentityLedger::new();
        let err = ledger
            .verify(&roster, UserId::new("u"), &Handle::new("Alice#1"), &Email::new("z@x.com"))
            .unwrap_err();
        assert_eq!(err, Rejection::EmailNotFound);
        assert!(ledger.is_empty());
    }

    #[test]
    fn handle_must_match_exactly() {
        let roster = roster();
        let mut ledger = IdentityLedger::new();
        let err = ledger
            .verify(&roster, UserId::new("u"), &Handle::new("alice#1"), &Email::new("a@x.com"))
            .unwrap_err();
        assert_eq!(err, Rejection::HandleMismatch);
    }

    #[test]
    fn second_verification_of_same_account() {
        let roster = roster();
        let mut ledger = IdentityLedger::new();
        let user = UserId::new("user1");
        ledger
            .verify(&roster, user.clone(), &Handle::new("Alice#1"), &Email::new("a@x.com"))
            .unwrap();
        let err = ledger
            .verify(&roster, user, &Handle::new("Alice#1"), &Email::new("a@x.com"))
            .unwrap_err();
        assert_eq!(err, Rejection::AlreadyVerified);
    }

    #[test]
    fn email_claimed_by_another_account() {
        let roster = roster();
        let mut ledger = IdentityLedger::new();
        ledger
            .verify(&roster, UserId::new("user1"), &Handle::new("Alice#1"), &Email::new("a@x.com"))
            .unwrap();
        let err = ledger
            .verify(&roster, UserId::new("user2"), &Handle::new("Alice#1"), &Email::new("a@x.com"))
            .unwrap_err();
        assert_eq!(err, Rejection::EmailClaimed);
        assert_eq!(ledger.len(), 1);
    }
}
