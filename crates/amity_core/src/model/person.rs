//! Person domain model.
//!
//! # Responsibility
//! - Define the person record and role taxonomy.
//! - Normalize display names into their stored form.
//!
//! # Invariants
//! - `id` is unique within one `AllocationSystem` lifetime.
//! - A person is immutable once created; there is no removal path.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid ws regex"));

/// Stable identifier for one person.
///
/// Wraps the textual form used in listings, persisted rows and CLI input.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PersonId(String);

impl PersonId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl Display for PersonId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PersonId {
    fn from(value: &str) -> Self {
        Self::new(value.trim())
    }
}

/// Role of a person within the facility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Eligible for an office and, on request, a living space.
    Fellow,
    /// Eligible for an office only.
    Staff,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Fellow => "fellow",
            Self::Staff => "staff",
        }
    }
}

impl Display for Role {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Role text did not name a known role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseRoleError(pub String);

impl Display for ParseRoleError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown role `{}`; expected fellow|staff", self.0)
    }
}

impl Error for ParseRoleError {}

impl FromStr for Role {
    type Err = ParseRoleError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "fellow" => Ok(Self::Fellow),
            "staff" => Ok(Self::Staff),
            _ => Err(ParseRoleError(value.trim().to_string())),
        }
    }
}

/// Canonical person record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    pub id: PersonId,
    /// Normalized display name, see [`normalize_person_name`].
    pub name: String,
    pub role: Role,
}

impl Person {
    pub fn new(id: PersonId, name: &str, role: Role) -> Self {
        Self {
            id,
            name: normalize_person_name(name),
            role,
        }
    }
}

/// Normalizes a display name to its stored form.
///
/// Trims, collapses inner whitespace runs to one space and upper-cases.
pub fn normalize_person_name(value: &str) -> String {
    WHITESPACE_RE
        .replace_all(value.trim(), " ")
        .to_uppercase()
}
