//! Error types for the formation engine.

use crate::models::UserId;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Failure categories exposed to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Malformed input, rejected before any state is read
    Validation,
    /// Request collides with existing state
    Conflict,
    /// Referenced record does not exist
    NotFound,
    /// Team would exceed its size limit
    Capacity,
    /// Durable write failed; nothing changed, safe to retry
    Persistence,
}

/// Why a team name was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NameProblem {
    #[error("name is empty")]
    Empty,

    #[error("name contains the prohibited character '{0}'")]
    IllegalCharacter(char),

    #[error("name is longer than {max} characters")]
    TooLong { max: usize },
}

/// A caller-fault refusal. Returning one never mutates state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    /// Team name failed validation
    #[error("invalid team name: {0}")]
    InvalidName(NameProblem),

    /// A team operation named no members at all
    #[error("no members given")]
    NoMembers,

    /// Another active team already uses this name (case-insensitive)
    #[error("a team called `{0}` already exists")]
    NameTaken(String),

    /// These users already belong to a team
    #[error("already in a team: {}", join(.0))]
    MemberAlreadyTeamed(Vec<UserId>),

    /// These users have not verified their identity
    #[error("not verified: {}", join(.0))]
    MemberUnverified(Vec<UserId>),

    /// The resulting team would be larger than allowed
    #[error("team size {requested} exceeds the maximum of {max}")]
    CapacityExceeded { max: usize, requested: usize },

    /// No active team has this name
    #[error("no team called `{0}`")]
    TeamNotFound(String),

    /// The user is not on any team
    #[error("not in a team")]
    NotInTeam,

    /// The account already holds a verified identity
    #[error("account already verified")]
    AlreadyVerified,

    /// The email is not in the roster
    #[error("email not found in roster")]
    EmailNotFound,

    /// Roster handle and claimed handle differ
    #[error("provided values do not match records")]
    HandleMismatch,

    /// The registrant record is already linked to a different account
    #[error("registration already linked to another account")]
    EmailClaimed,

    /// The handle is registered under a different email
    #[error("handle already registered under another email")]
    HandleTaken,
}

impl Rejection {
    /// Taxonomy category.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Rejection::InvalidName(_) | Rejection::NoMembers => ErrorKind::Validation,
            Rejection::NameTaken(_)
            | Rejection::MemberAlreadyTeamed(_)
            | Rejection::MemberUnverified(_)
            | Rejection::AlreadyVerified
            | Rejection::HandleMismatch
            | Rejection::EmailClaimed
            | Rejection::HandleTaken => ErrorKind::Conflict,
            Rejection::TeamNotFound(_) | Rejection::NotInTeam | Rejection::EmailNotFound => {
                ErrorKind::NotFound
            }
            Rejection::CapacityExceeded { .. } => ErrorKind::Capacity,
        }
    }

    /// Stable machine-readable code.
    pub fn code(&self) -> &'static str {
        match self {
            Rejection::InvalidName(_) => "invalid_name",
            Rejection::NoMembers => "no_members",
            Rejection::NameTaken(_) => "name_taken",
            Rejection::MemberAlreadyTeamed(_) => "member_already_teamed",
            Rejection::MemberUnverified(_) => "member_unverified",
            Rejection::CapacityExceeded { .. } => "capacity_exceeded",
            Rejection::TeamNotFound(_) => "team_not_found",
            Rejection::NotInTeam => "not_in_team",
            Rejection::AlreadyVerified => "already_verified",
            Rejection::EmailNotFound => "email_not_found",
            Rejection::HandleMismatch => "handle_mismatch",
            Rejection::EmailClaimed => "email_claimed",
            Rejection::HandleTaken => "handle_taken",
        }
    }
}

fn join(users: &[UserId]) -> String {
    users
        .iter()
        .map(UserId::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Failure at the durable persistence boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PersistError {
    /// Snapshot could not be written
    #[error("persist failed: {0}")]
    Write(String),

    /// Stored state could not be read
    #[error("restore failed: {0}")]
    Read(String),

    /// Stored state was unreadable
    #[error("stored state is corrupt: {0}")]
    Corrupt(String),
}

/// Errors returned by engine operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// The caller's request was refused
    #[error(transparent)]
    Rejected(#[from] Rejection),

    /// The durable write failed and the change was rolled back
    #[error(transparent)]
    Persistence(#[from] PersistError),
}

impl Error {
    /// Taxonomy category.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Rejected(r) => r.kind(),
            Error::Persistence(_) => ErrorKind::Persistence,
        }
    }

    /// The rejection, if this is a caller-fault error.
    pub fn rejection(&self) -> Option<&Rejection> {
        match self {
            Error::Rejected(r) => Some(r),
            Error::Persistence(_) => None,
        }
    }

    /// Only persistence failures are worth retrying unchanged.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::Persistence(_))
    }
}
