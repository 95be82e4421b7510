//! Identifier newtypes.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable platform account identifier.
///
/// The engine never inspects its contents; it is only compared and hashed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Wrap a raw platform id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The raw id.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Chat mention form used in user-facing messages.
    pub fn mention(&self) -> String {
        format!("<@{}>", self.0)
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UserId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for UserId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Registrant email address.
///
/// Emails are case-insensitive everywhere: construction trims and lowercases,
/// including when deserializing stored records.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Email(String);

impl Email {
    /// Normalize a raw address.
    pub fn new(raw: &str) -> Self {
        Self(raw.trim().to_lowercase())
    }

    /// The normalized address.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True if nothing but whitespace was supplied.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for Email {
    fn from(raw: String) -> Self {
        Self::new(&raw)
    }
}

impl From<&str> for Email {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<Email> for String {
    fn from(email: Email) -> Self {
        email.0
    }
}

/// External platform handle as recorded at registration (e.g. `alice#0001`).
///
/// Never normalized: a difference in case or discriminator means a
/// different account.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Handle(String);

impl Handle {
    /// Wrap a raw handle.
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// The handle exactly as supplied.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True for an empty handle.
    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Handle {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<String> for Handle {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}
