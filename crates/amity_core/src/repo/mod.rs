//! Repository layer for persisted allocation state.
//!
//! # Responsibility
//! - Define the save/load contract for named snapshots.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - A save is all-or-nothing: the blob and its inspection rows commit together.
//! - Loads read the blob only, never the inspection rows.

pub mod state_repo;
