//! Room domain model.
//!
//! # Responsibility
//! - Define room categories, their fixed capacities and the room record.
//!
//! # Invariants
//! - `occupants.len() <= category.capacity()`.
//! - `occupants` never holds the same id twice.
//! - `name` is stored upper-cased.

use crate::model::person::PersonId;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

pub const OFFICE_CAPACITY: usize = 6;
pub const LIVING_SPACE_CAPACITY: usize = 4;

/// Room category. Also names the allocation axis a room belongs to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Workspace shared by fellows and staff.
    #[default]
    Office,
    /// Accommodation, fellows only.
    LivingSpace,
}

impl Category {
    pub fn capacity(self) -> usize {
        match self {
            Self::Office => OFFICE_CAPACITY,
            Self::LivingSpace => LIVING_SPACE_CAPACITY,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Office => "office",
            Self::LivingSpace => "living_space",
        }
    }

    /// Resolves an optional category flag, defaulting to `Office` when absent.
    pub fn from_flag(flag: Option<&str>) -> Result<Self, ParseCategoryError> {
        match flag {
            None => Ok(Self::default()),
            Some(value) => value.parse(),
        }
    }
}

impl Display for Category {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Office => f.write_str("office"),
            Self::LivingSpace => f.write_str("living space"),
        }
    }
}

/// Category text did not name a known category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseCategoryError(pub String);

impl Display for ParseCategoryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "unknown room category `{}`; expected office|livingspace",
            self.0
        )
    }
}

impl Error for ParseCategoryError {}

impl FromStr for Category {
    type Err = ParseCategoryError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value
            .trim()
            .trim_start_matches('-')
            .to_ascii_lowercase()
            .replace(['-', '_', ' '], "");
        match normalized.as_str() {
            "office" | "o" => Ok(Self::Office),
            "livingspace" | "ls" => Ok(Self::LivingSpace),
            _ => Err(ParseCategoryError(value.trim().to_string())),
        }
    }
}

/// Canonical room record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Room {
    pub name: String,
    pub category: Category,
    pub occupants: Vec<PersonId>,
}

impl Room {
    /// Creates an empty room; the name is upper-cased.
    pub fn new(name: &str, category: Category) -> Self {
        Self {
            name: normalize_room_name(name),
            category,
            occupants: Vec::new(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.category.capacity()
    }

    pub fn has_vacancy(&self) -> bool {
        self.occupants.len() < self.capacity()
    }

    pub fn is_empty(&self) -> bool {
        self.occupants.is_empty()
    }

    pub fn contains(&self, id: &PersonId) -> bool {
        self.occupants.iter().any(|occupant| occupant == id)
    }
}

/// Normalizes a room name to its stored upper-case form.
pub fn normalize_room_name(value: &str) -> String {
    value.trim().to_uppercase()
}
