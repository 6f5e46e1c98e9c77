//! Allocation use-case service.
//!
//! # Responsibility
//! - Provide the entry points used by the CLI and batch callers.
//! - Translate loose inputs (flags, names, text files) into typed engine calls.
//! - Bridge the in-memory system and a `StateRepository`.
//!
//! # Invariants
//! - Service APIs never bypass engine transitions to mutate the model.
//! - A failed state load leaves the in-memory system unchanged.

use crate::engine::{AllocationSystem, OnboardingReport, Relocation};
use crate::error::{AllocationError, AllocationResult};
use crate::model::person::{PersonId, Role};
use crate::model::room::Category;
use crate::registry::rooms::CreationReport;
use crate::repo::state_repo::{StateRepoError, StateRepoResult, StateRepository};
use crate::service::bulk_load::{parse_person_line, BulkLoadReport};
use crate::service::report::{self, ReportError, RoomListing};
use log::{info, warn};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Result of resolving a display name to a person.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonLookup {
    pub id: PersonId,
    pub role: Role,
    pub name: String,
}

/// Use-case facade over one `AllocationSystem`.
pub struct AllocationService {
    system: AllocationSystem,
}

impl AllocationService {
    pub fn new(system: AllocationSystem) -> Self {
        Self { system }
    }

    pub fn system(&self) -> &AllocationSystem {
        &self.system
    }

    pub fn into_inner(self) -> AllocationSystem {
        self.system
    }

    /// Creates rooms from a category flag; a missing flag means office.
    pub fn create_rooms<S: AsRef<str>>(
        &mut self,
        names: &[S],
        category_flag: Option<&str>,
    ) -> AllocationResult<CreationReport> {
        let category = Category::from_flag(category_flag)?;
        Ok(self
            .system
            .create_rooms(names.iter().map(|name| name.as_ref()), category))
    }

    /// Adds one person and applies the onboarding policy.
    pub fn add_person(
        &mut self,
        role: Role,
        name: &str,
        wants_accommodation: bool,
    ) -> AllocationResult<OnboardingReport> {
        if name.trim().is_empty() {
            return Err(AllocationError::InvalidName(name.to_string()));
        }
        Ok(self.system.onboard(role, name, wants_accommodation))
    }

    pub fn reallocate(&mut self, person_id: &str, room: &str) -> AllocationResult<Relocation> {
        self.system.reallocate(&PersonId::from(person_id), room)
    }

    /// Onboards every line of `input`; malformed lines are collected, not fatal.
    pub fn load_people<R: BufRead>(&mut self, input: R) -> BulkLoadReport {
        let mut report = BulkLoadReport::default();
        for (index, line) in input.lines().enumerate() {
            let line_no = index + 1;
            let text = match line {
                Ok(text) => text,
                Err(err) => {
                    report.failures.push(AllocationError::MalformedInputLine {
                        line: line_no,
                        reason: format!("unreadable line: {err}"),
                    });
                    continue;
                }
            };
            if text.trim().is_empty() {
                continue;
            }

            match parse_person_line(line_no, &text) {
                Ok(parsed) => report.onboarded.push(self.system.onboard(
                    parsed.role,
                    &parsed.name,
                    parsed.wants_accommodation,
                )),
                Err(err) => {
                    warn!(
                        "event=people_load module=service status=skipped line={}",
                        line_no
                    );
                    report.failures.push(err);
                }
            }
        }

        info!(
            "event=people_load module=service status=ok onboarded={} failed={}",
            report.onboarded.len(),
            report.failures.len()
        );
        report
    }

    /// Reads `path` and onboards its lines as in [`Self::load_people`].
    pub fn load_people_file(&mut self, path: impl AsRef<Path>) -> Result<BulkLoadReport, ReportError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| ReportError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(self.load_people(BufReader::new(file)))
    }

    pub fn person_id_by_name(&self, name: &str) -> AllocationResult<PersonLookup> {
        self.system
            .people()
            .lookup_by_name(name)
            .map(|person| PersonLookup {
                id: person.id.clone(),
                role: person.role,
                name: person.name.clone(),
            })
            .ok_or_else(|| AllocationError::PersonNotFound(name.trim().to_string()))
    }

    pub fn room_occupants(&self, room: &str) -> RoomListing {
        report::room_occupants(&self.system, room)
    }

    /// Allocation listing, also written to `output` when given.
    pub fn allocations_report(&self, output: Option<&Path>) -> Result<String, ReportError> {
        let listing = report::allocations_report(&self.system);
        if let Some(path) = output {
            report::write_report(path, &listing)?;
        }
        Ok(listing)
    }

    /// Unallocated listing, also written to `output` when given.
    pub fn unallocated_report(&self, output: Option<&Path>) -> Result<String, ReportError> {
        let listing = report::unallocated_report(&self.system);
        if let Some(path) = output {
            report::write_report(path, &listing)?;
        }
        Ok(listing)
    }

    pub fn save_state<R: StateRepository>(&self, repo: &R, name: &str) -> StateRepoResult<()> {
        repo.save_snapshot(name, &self.system.snapshot())
    }

    /// Replaces the in-memory system with the state saved under `name`.
    ///
    /// # Errors
    /// - `SnapshotNotFound` when nothing is saved under `name`.
    /// - `CorruptState` when the payload does not decode or is inconsistent.
    pub fn load_state<R: StateRepository>(&mut self, repo: &R, name: &str) -> StateRepoResult<()> {
        let snapshot = repo.load_snapshot(name)?;
        self.system
            .restore(snapshot)
            .map_err(StateRepoError::CorruptState)
    }
}

impl Default for AllocationService {
    fn default() -> Self {
        Self::new(AllocationSystem::new())
    }
}
