//! Domain error for allocation use-cases.
//!
//! # Responsibility
//! - Name every recoverable failure of the allocation core.
//! - Carry enough context for callers to render a status line.
//!
//! # Invariants
//! - No allocation path panics; failures surface as `AllocationError`.

use crate::model::person::{ParseRoleError, PersonId, Role};
use crate::model::room::{Category, ParseCategoryError};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type AllocationResult<T> = Result<T, AllocationError>;

/// Recoverable allocation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AllocationError {
    /// A room with this name already exists in either category.
    DuplicateRoomName(String),
    /// Category flag is neither office nor living space.
    InvalidCategory(String),
    /// Role text is neither fellow nor staff.
    InvalidRole(String),
    /// Person name is empty after trimming.
    InvalidName(String),
    /// No room of any category exists yet.
    NoRoomsExist,
    /// Every room of the category is at capacity.
    NoVacancy(Category),
    /// Named room is not registered.
    RoomNotFound(String),
    /// Role may not occupy rooms of the category.
    RoleIneligible { role: Role, category: Category },
    /// Person already occupies the destination room.
    AlreadyThere { person_id: PersonId, room: String },
    /// Person id or name is not registered.
    PersonNotFound(String),
    /// Bulk input line could not be parsed.
    MalformedInputLine { line: usize, reason: String },
}

impl Display for AllocationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DuplicateRoomName(name) => {
                write!(f, "the room {name} already exists; duplicate rooms cannot be created")
            }
            Self::InvalidCategory(value) => write!(
                f,
                "invalid room category `{value}`; use office (--o) or living space (--ls)"
            ),
            Self::InvalidRole(value) => {
                write!(f, "invalid role `{value}`; expected fellow or staff")
            }
            Self::InvalidName(_) => write!(f, "person name must not be empty"),
            Self::NoRoomsExist => write!(f, "the system has no rooms"),
            Self::NoVacancy(category) => write!(f, "the system has no vacant {category}"),
            Self::RoomNotFound(name) => write!(f, "the room {name} does not exist"),
            Self::RoleIneligible { role, category } => {
                write!(f, "{role} may not be allocated a {category}")
            }
            Self::AlreadyThere { person_id, room } => {
                write!(f, "person {person_id} is already allocated to {room}")
            }
            Self::PersonNotFound(key) => write!(f, "person not found: {key}"),
            Self::MalformedInputLine { line, reason } => {
                write!(f, "malformed input on line {line}: {reason}")
            }
        }
    }
}

impl Error for AllocationError {}

impl From<ParseRoleError> for AllocationError {
    fn from(value: ParseRoleError) -> Self {
        Self::InvalidRole(value.0)
    }
}

impl From<ParseCategoryError> for AllocationError {
    fn from(value: ParseCategoryError) -> Self {
        Self::InvalidCategory(value.0)
    }
}
