//! Use-case services.
//!
//! # Responsibility
//! - Orchestrate engine and repository calls into command-level APIs.
//! - Keep CLI callers decoupled from model and storage details.

pub mod allocation_service;
pub mod bulk_load;
pub mod report;
