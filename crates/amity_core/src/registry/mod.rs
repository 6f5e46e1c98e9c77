//! In-memory registries owned by `AllocationSystem`.
//!
//! # Responsibility
//! - Hold rooms and people with deterministic iteration order.
//! - Issue person identifiers that are never reused.
//!
//! # Invariants
//! - Room names are unique across both categories.
//! - Every issued `PersonId` is absent from the registry at issue time.

pub mod ids;
pub mod people;
pub mod rooms;
