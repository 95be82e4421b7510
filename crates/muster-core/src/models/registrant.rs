//! Registrant and verified-identity records.

use super::ids::{Email, Handle, UserId};
use serde::{Deserialize, Serialize};

/// A person who signed up through the registration system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrantRecord {
    /// Registration email (unique key)
    pub email: Email,

    /// External handle given at registration (unique)
    pub handle: Handle,
}

impl RegistrantRecord {
    /// Create a record from raw values.
    pub fn new(email: impl Into<Email>, handle: impl Into<Handle>) -> Self {
        Self {
            email: email.into(),
            handle: handle.into(),
        }
    }
}

/// Proven linkage between a registrant and a platform account.
///
/// Created once and never removed for the lifetime of the event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifiedIdentity {
    /// Platform account that proved ownership
    pub user: UserId,

    /// Registrant email it was matched against
    pub email: Email,
}
