//! Domain model for people, rooms and allocation axes.
//!
//! # Responsibility
//! - Define the canonical records owned by the registries.
//! - Keep role and category branching in exhaustive enums.
//!
//! # Invariants
//! - Every person is identified by a stable `PersonId` that is never reused.
//! - Room names are stored upper-cased; capacity derives from the category.

pub mod person;
pub mod room;
