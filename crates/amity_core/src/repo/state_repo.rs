//! Named snapshot repository and SQLite implementation.
//!
//! # Responsibility
//! - Persist `Snapshot` values under a name, replacing any previous save.
//! - Mirror rooms, people, occupancy and unallocated axes into row tables.
//! - Load snapshots back from the stored JSON blob.
//!
//! # Invariants
//! - Save runs in one immediate transaction; readers never observe a
//!   snapshot whose rows and blob disagree.
//! - A payload that fails to decode is reported as `CorruptState`.

use crate::db::migrations::latest_version;
use crate::db::DbError;
use crate::snapshot::{Snapshot, SnapshotError};
use log::{error, info};
use rusqlite::{params, Connection, OptionalExtension, Transaction, TransactionBehavior};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

pub type StateRepoResult<T> = Result<T, StateRepoError>;

/// Errors from snapshot persistence.
#[derive(Debug)]
pub enum StateRepoError {
    /// Underlying SQLite/bootstrap error.
    Db(DbError),
    /// No snapshot is stored under this name.
    SnapshotNotFound(String),
    /// Stored payload cannot be decoded into a snapshot.
    CorruptState(SnapshotError),
    /// Snapshot name is empty after trimming.
    InvalidName(String),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
}

impl Display for StateRepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::SnapshotNotFound(name) => write!(f, "no saved state named `{name}`"),
            Self::CorruptState(err) => write!(f, "saved state is corrupt: {err}"),
            Self::InvalidName(name) => write!(f, "invalid state name `{name}`"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "state repository requires schema version {expected_version}, got {actual_version}"
            ),
        }
    }
}

impl Error for StateRepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::CorruptState(err) => Some(err),
            Self::SnapshotNotFound(_) => None,
            Self::InvalidName(_) => None,
            Self::UninitializedConnection { .. } => None,
        }
    }
}

impl From<DbError> for StateRepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StateRepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Listing row for one saved snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotSummary {
    pub name: String,
    pub version: u32,
    /// Epoch ms of the last save.
    pub saved_at: i64,
    pub room_count: u32,
    pub person_count: u32,
}

/// Repository interface for named snapshots.
pub trait StateRepository {
    /// Saves `snapshot` under `name`, replacing any earlier save.
    fn save_snapshot(&self, name: &str, snapshot: &Snapshot) -> StateRepoResult<()>;
    /// Loads the snapshot saved under `name`.
    fn load_snapshot(&self, name: &str) -> StateRepoResult<Snapshot>;
    /// Lists saved snapshots ordered by name.
    fn list_snapshots(&self) -> StateRepoResult<Vec<SnapshotSummary>>;
    /// Removes the snapshot and its inspection rows.
    fn delete_snapshot(&self, name: &str) -> StateRepoResult<()>;
}

/// SQLite-backed snapshot repository.
pub struct SqliteStateRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteStateRepository<'conn> {
    /// Creates repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> StateRepoResult<Self> {
        let expected_version = latest_version();
        let actual_version: u32 =
            conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
        if actual_version != expected_version {
            return Err(StateRepoError::UninitializedConnection {
                expected_version,
                actual_version,
            });
        }
        Ok(Self { conn })
    }
}

impl StateRepository for SqliteStateRepository<'_> {
    fn save_snapshot(&self, name: &str, snapshot: &Snapshot) -> StateRepoResult<()> {
        let name = normalize_snapshot_name(name)?;
        let started_at = Instant::now();
        let payload = snapshot.to_json().map_err(StateRepoError::CorruptState)?;

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        if let Err(err) = write_snapshot_rows(&tx, name.as_str(), snapshot, &payload) {
            error!(
                "event=state_save module=repo status=error name={} duration_ms={} error={}",
                name,
                started_at.elapsed().as_millis(),
                err
            );
            return Err(err);
        }
        tx.commit()?;

        info!(
            "event=state_save module=repo status=ok name={} rooms={} people={} bytes={} duration_ms={}",
            name,
            snapshot.rooms.len(),
            snapshot.people.len(),
            payload.len(),
            started_at.elapsed().as_millis()
        );
        Ok(())
    }

    fn load_snapshot(&self, name: &str) -> StateRepoResult<Snapshot> {
        let name = normalize_snapshot_name(name)?;
        let payload: Option<Vec<u8>> = self
            .conn
            .query_row(
                "SELECT payload FROM snapshots WHERE name = ?1;",
                [name.as_str()],
                |row| row.get(0),
            )
            .optional()?;

        let Some(payload) = payload else {
            info!(
                "event=state_load module=repo status=not_found name={}",
                name
            );
            return Err(StateRepoError::SnapshotNotFound(name));
        };

        match Snapshot::from_json(&payload) {
            Ok(snapshot) => {
                info!(
                    "event=state_load module=repo status=ok name={} bytes={}",
                    name,
                    payload.len()
                );
                Ok(snapshot)
            }
            Err(err) => {
                error!(
                    "event=state_load module=repo status=error name={} error_code=corrupt_state error={}",
                    name, err
                );
                Err(StateRepoError::CorruptState(err))
            }
        }
    }

    fn list_snapshots(&self) -> StateRepoResult<Vec<SnapshotSummary>> {
        let mut stmt = self.conn.prepare(
            "SELECT
                s.name,
                s.version,
                s.saved_at,
                (SELECT COUNT(*) FROM rooms r WHERE r.snapshot_name = s.name),
                (SELECT COUNT(*) FROM people p WHERE p.snapshot_name = s.name)
             FROM snapshots s
             ORDER BY s.name ASC;",
        )?;
        let mut rows = stmt.query([])?;
        let mut summaries = Vec::new();
        while let Some(row) = rows.next()? {
            summaries.push(SnapshotSummary {
                name: row.get(0)?,
                version: row.get(1)?,
                saved_at: row.get(2)?,
                room_count: row.get(3)?,
                person_count: row.get(4)?,
            });
        }
        Ok(summaries)
    }

    fn delete_snapshot(&self, name: &str) -> StateRepoResult<()> {
        let name = normalize_snapshot_name(name)?;
        let changed = self
            .conn
            .execute("DELETE FROM snapshots WHERE name = ?1;", [name.as_str()])?;
        if changed == 0 {
            return Err(StateRepoError::SnapshotNotFound(name));
        }
        info!("event=state_delete module=repo status=ok name={}", name);
        Ok(())
    }
}

fn write_snapshot_rows(
    tx: &Transaction<'_>,
    name: &str,
    snapshot: &Snapshot,
    payload: &[u8],
) -> StateRepoResult<()> {
    tx.execute("DELETE FROM snapshots WHERE name = ?1;", [name])?;
    tx.execute(
        "INSERT INTO snapshots (name, version, payload) VALUES (?1, ?2, ?3);",
        params![name, snapshot.version, payload],
    )?;

    for person in &snapshot.people {
        tx.execute(
            "INSERT INTO people (snapshot_name, person_id, name, role)
             VALUES (?1, ?2, ?3, ?4);",
            params![name, person.id.as_str(), person.name.as_str(), person.role.as_str()],
        )?;
    }

    for room in &snapshot.rooms {
        tx.execute(
            "INSERT INTO rooms (snapshot_name, room_name, category, capacity)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                name,
                room.name.as_str(),
                room.category.as_str(),
                room.category.capacity() as i64,
            ],
        )?;
        for (position, occupant) in room.occupants.iter().enumerate() {
            tx.execute(
                "INSERT INTO occupancy (snapshot_name, room_name, person_id, position)
                 VALUES (?1, ?2, ?3, ?4);",
                params![name, room.name.as_str(), occupant.as_str(), position as i64],
            )?;
        }
    }

    for entry in &snapshot.unallocated {
        tx.execute(
            "INSERT INTO unallocated (snapshot_name, person_id, axis) VALUES (?1, ?2, ?3);",
            params![name, entry.person_id.as_str(), entry.axis.as_str()],
        )?;
    }

    Ok(())
}

fn normalize_snapshot_name(name: &str) -> StateRepoResult<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(StateRepoError::InvalidName(name.to_string()));
    }
    Ok(trimmed.to_string())
}
