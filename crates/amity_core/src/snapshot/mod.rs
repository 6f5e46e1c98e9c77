//! Versioned, self-contained capture of an `AllocationSystem`.
//!
//! # Responsibility
//! - Define the persisted schema for rooms, people and unallocated axes.
//! - Encode/decode the schema as JSON.
//! - Restore a system from a snapshot as one total overwrite.
//!
//! # Invariants
//! - Restore validates the whole snapshot before touching the live model; a
//!   rejected snapshot leaves the system unchanged.
//! - Id generator state is not persisted; ids embedded in the snapshot are
//!   avoided by later registrations.

use crate::engine::{AllocationSystem, UnallocatedList};
use crate::model::person::{Person, PersonId, Role};
use crate::model::room::{Category, Room};
use crate::registry::rooms::RoomRegistry;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Schema version written by this binary.
pub const SNAPSHOT_VERSION: u32 = 1;

pub type SnapshotResult<T> = Result<T, SnapshotError>;

/// Snapshot could not be decoded or does not describe a valid system.
#[derive(Debug)]
pub enum SnapshotError {
    /// Payload is not valid JSON for the schema.
    Corrupt(serde_json::Error),
    /// Payload was written by a newer or unknown schema.
    UnsupportedVersion { found: u32, supported: u32 },
    /// Payload decodes but breaks a model invariant.
    Inconsistent(String),
}

impl Display for SnapshotError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Corrupt(err) => write!(f, "snapshot payload is corrupt: {err}"),
            Self::UnsupportedVersion { found, supported } => write!(
                f,
                "snapshot schema version {found} is not supported (expected {supported})"
            ),
            Self::Inconsistent(message) => write!(f, "snapshot is inconsistent: {message}"),
        }
    }
}

impl Error for SnapshotError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Corrupt(err) => Some(err),
            Self::UnsupportedVersion { .. } => None,
            Self::Inconsistent(_) => None,
        }
    }
}

impl From<serde_json::Error> for SnapshotError {
    fn from(value: serde_json::Error) -> Self {
        Self::Corrupt(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonRecord {
    pub id: PersonId,
    pub name: String,
    pub role: Role,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomRecord {
    pub name: String,
    pub category: Category,
    pub occupants: Vec<PersonId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnallocatedRecord {
    pub person_id: PersonId,
    pub axis: Category,
}

/// Full system capture.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Snapshot {
    pub version: u32,
    pub rooms: Vec<RoomRecord>,
    pub people: Vec<PersonRecord>,
    pub unallocated: Vec<UnallocatedRecord>,
}

impl Snapshot {
    pub fn to_json(&self) -> SnapshotResult<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Decodes a payload and checks its schema version.
    pub fn from_json(payload: &[u8]) -> SnapshotResult<Self> {
        let snapshot: Self = serde_json::from_slice(payload)?;
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(SnapshotError::UnsupportedVersion {
                found: snapshot.version,
                supported: SNAPSHOT_VERSION,
            });
        }
        Ok(snapshot)
    }

    /// Order-insensitive view used to compare two snapshots.
    pub fn canonical(&self) -> CanonicalSnapshot {
        CanonicalSnapshot {
            rooms: self
                .rooms
                .iter()
                .map(|room| {
                    let mut occupants = room.occupants.clone();
                    occupants.sort();
                    (room.name.clone(), room.category, occupants)
                })
                .collect(),
            people: self
                .people
                .iter()
                .map(|person| (person.id.clone(), person.name.clone(), person.role))
                .collect(),
            unallocated: self
                .unallocated
                .iter()
                .map(|entry| (entry.person_id.clone(), entry.axis))
                .collect(),
        }
    }
}

/// Set-based projection of a snapshot; equal when the systems are observably equal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalSnapshot {
    pub rooms: HashSet<(String, Category, Vec<PersonId>)>,
    pub people: HashSet<(PersonId, String, Role)>,
    pub unallocated: HashSet<(PersonId, Category)>,
}

impl AllocationSystem {
    /// Captures rooms, people and unallocated axes.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            version: SNAPSHOT_VERSION,
            rooms: self
                .rooms
                .iter()
                .map(|room| RoomRecord {
                    name: room.name.clone(),
                    category: room.category,
                    occupants: room.occupants.clone(),
                })
                .collect(),
            people: self
                .people
                .iter()
                .map(|person| PersonRecord {
                    id: person.id.clone(),
                    name: person.name.clone(),
                    role: person.role,
                })
                .collect(),
            unallocated: self
                .unallocated
                .iter()
                .map(|entry| UnallocatedRecord {
                    person_id: entry.person_id.clone(),
                    axis: entry.axis,
                })
                .collect(),
        }
    }

    /// Replaces the whole model with `snapshot`.
    ///
    /// # Errors
    /// - `UnsupportedVersion` for a foreign schema version.
    /// - `Inconsistent` when the snapshot violates a model invariant. The
    ///   live model is untouched in both cases.
    pub fn restore(&mut self, snapshot: Snapshot) -> SnapshotResult<()> {
        let validated = match validate(snapshot) {
            Ok(validated) => validated,
            Err(err) => {
                warn!(
                    "event=state_restore module=snapshot status=error error={}",
                    err
                );
                return Err(err);
            }
        };

        let (rooms, people, unallocated) = validated;
        info!(
            "event=state_restore module=snapshot status=ok rooms={} people={} unallocated={}",
            rooms.len(),
            people.len(),
            unallocated.len()
        );
        self.rooms = rooms;
        self.people.replace_all(people);
        self.unallocated = unallocated;
        Ok(())
    }
}

fn validate(snapshot: Snapshot) -> SnapshotResult<(RoomRegistry, Vec<Person>, UnallocatedList)> {
    if snapshot.version != SNAPSHOT_VERSION {
        return Err(SnapshotError::UnsupportedVersion {
            found: snapshot.version,
            supported: SNAPSHOT_VERSION,
        });
    }

    let mut roles: HashMap<PersonId, Role> = HashMap::new();
    let mut people = Vec::with_capacity(snapshot.people.len());
    for record in snapshot.people {
        if roles.insert(record.id.clone(), record.role).is_some() {
            return Err(SnapshotError::Inconsistent(format!(
                "person id {} appears more than once",
                record.id
            )));
        }
        people.push(Person {
            id: record.id,
            name: record.name,
            role: record.role,
        });
    }

    let mut rooms = RoomRegistry::new();
    let mut holders: HashSet<(PersonId, Category)> = HashSet::new();
    for record in snapshot.rooms {
        let mut room = Room::new(&record.name, record.category);
        if room.name.is_empty() {
            return Err(SnapshotError::Inconsistent("room name is empty".to_string()));
        }
        if record.occupants.len() > room.capacity() {
            return Err(SnapshotError::Inconsistent(format!(
                "room {} holds {} occupants over capacity {}",
                room.name,
                record.occupants.len(),
                room.capacity()
            )));
        }
        for occupant in record.occupants {
            let role = roles.get(&occupant).copied().ok_or_else(|| {
                SnapshotError::Inconsistent(format!(
                    "room {} references unknown person {occupant}",
                    room.name
                ))
            })?;
            if role == Role::Staff && room.category == Category::LivingSpace {
                return Err(SnapshotError::Inconsistent(format!(
                    "staff {occupant} occupies living space {}",
                    room.name
                )));
            }
            if !holders.insert((occupant.clone(), room.category)) {
                return Err(SnapshotError::Inconsistent(format!(
                    "person {occupant} holds more than one {}",
                    room.category
                )));
            }
            room.occupants.push(occupant);
        }
        rooms
            .insert(room)
            .map_err(|err| SnapshotError::Inconsistent(err.to_string()))?;
    }

    let mut unallocated = UnallocatedList::new();
    for record in snapshot.unallocated {
        if !roles.contains_key(&record.person_id) {
            return Err(SnapshotError::Inconsistent(format!(
                "unallocated list references unknown person {}",
                record.person_id
            )));
        }
        if holders.contains(&(record.person_id.clone(), record.axis)) {
            return Err(SnapshotError::Inconsistent(format!(
                "person {} is both allocated and unallocated for {}",
                record.person_id, record.axis
            )));
        }
        unallocated.push(record.person_id, record.axis);
    }

    Ok((rooms, people, unallocated))
}

#[cfg(test)]
mod tests {
    use super::{PersonRecord, RoomRecord, Snapshot, SnapshotError, SNAPSHOT_VERSION};
    use crate::engine::placement::FirstVacancy;
    use crate::engine::AllocationSystem;
    use crate::model::person::{PersonId, Role};
    use crate::model::room::Category;

    fn populated() -> AllocationSystem {
        let mut system = AllocationSystem::with_placement(Box::new(FirstVacancy));
        system.create_rooms(["mars"], Category::Office);
        system.create_rooms(["earth"], Category::LivingSpace);
        system.onboard(Role::Fellow, "Luffy Monkey", true);
        system.onboard(Role::Staff, "Kuzan Aokiji", true);
        system
    }

    #[test]
    fn restore_of_saved_snapshot_is_lossless() {
        let source = populated();
        let saved = source.snapshot();

        let mut target = AllocationSystem::with_placement(Box::new(FirstVacancy));
        target.create_rooms(["stale"], Category::Office);
        target.restore(saved.clone()).unwrap();

        assert_eq!(target.snapshot().canonical(), saved.canonical());
        assert!(target.rooms().room("stale").is_none());

        target.restore(target.snapshot()).unwrap();
        assert_eq!(target.snapshot().canonical(), saved.canonical());
    }

    #[test]
    fn json_roundtrip_preserves_snapshot() {
        let saved = populated().snapshot();
        let payload = saved.to_json().unwrap();
        assert_eq!(Snapshot::from_json(&payload).unwrap(), saved);
    }

    #[test]
    fn malformed_payload_is_corrupt() {
        assert!(matches!(
            Snapshot::from_json(b"{\"rooms\": 3}"),
            Err(SnapshotError::Corrupt(_))
        ));
        let mut value = serde_json::to_value(populated().snapshot()).unwrap();
        value["version"] = serde_json::json!(SNAPSHOT_VERSION + 1);
        let payload = serde_json::to_vec(&value).unwrap();
        assert!(matches!(
            Snapshot::from_json(&payload),
            Err(SnapshotError::UnsupportedVersion { .. })
        ));
    }

    #[test]
    fn inconsistent_snapshot_leaves_system_untouched() {
        let mut system = populated();
        let before = system.snapshot();

        let broken = Snapshot {
            version: SNAPSHOT_VERSION,
            rooms: vec![RoomRecord {
                name: "VENUS".to_string(),
                category: Category::LivingSpace,
                occupants: vec![PersonId::new("P0001")],
            }],
            people: vec![PersonRecord {
                id: PersonId::new("P0001"),
                name: "MONKEY GARP".to_string(),
                role: Role::Staff,
            }],
            unallocated: Vec::new(),
        };
        let err = system.restore(broken).unwrap_err();
        assert!(matches!(err, SnapshotError::Inconsistent(_)));
        assert_eq!(system.snapshot(), before);
    }

    #[test]
    fn ids_issued_after_restore_never_collide() {
        let saved = populated().snapshot();
        let mut fresh = AllocationSystem::with_placement(Box::new(FirstVacancy));
        fresh.restore(saved).unwrap();

        let id = fresh.add_person(Role::Fellow, "Franky");
        assert_eq!(fresh.people().len(), 3);
        assert_eq!(
            fresh.people().iter().filter(|person| person.id == id).count(),
            1
        );
    }
}
