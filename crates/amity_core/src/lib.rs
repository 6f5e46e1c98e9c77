//! Core domain logic for the Amity room allocation system.
//! This crate is the single source of truth for allocation invariants.

pub mod db;
pub mod engine;
pub mod error;
pub mod logging;
pub mod model;
pub mod registry;
pub mod repo;
pub mod service;
pub mod snapshot;

pub use engine::placement::{FirstVacancy, PlacementStrategy, UniformPlacement};
pub use engine::{
    AllocationOutcome, AllocationSystem, AxisResolution, OnboardingReport, Relocation,
    UnallocatedEntry, UnallocatedList,
};
pub use error::{AllocationError, AllocationResult};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::person::{Person, PersonId, Role};
pub use model::room::{Category, Room};
pub use registry::ids::{IdGenerator, SequentialIdGenerator};
pub use registry::rooms::CreationReport;
pub use repo::state_repo::{
    SnapshotSummary, SqliteStateRepository, StateRepoError, StateRepoResult, StateRepository,
};
pub use service::allocation_service::{AllocationService, PersonLookup};
pub use service::bulk_load::BulkLoadReport;
pub use service::report::{ReportError, RoomListing};
pub use snapshot::{Snapshot, SnapshotError, SNAPSHOT_VERSION};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
