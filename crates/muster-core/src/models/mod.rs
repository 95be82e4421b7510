//! Data model for the event roster and its teams.
//!
//! # Identifiers
//!
//! - [`UserId`] - Opaque platform account identifier
//! - [`Email`] - Registrant email, always lowercase
//! - [`Handle`] - External platform handle, compared exactly
//!
//! # Records
//!
//! - [`RegistrantRecord`] - One row of the registration roster
//! - [`VerifiedIdentity`] - Proven link between a registrant and an account
//! - [`Team`] - A named, capacity-bounded group of verified participants

mod ids;
mod registrant;
mod team;

pub use ids::{Email, Handle, UserId};
pub use registrant::{RegistrantRecord, VerifiedIdentity};
pub use team::{Team, TeamName};
