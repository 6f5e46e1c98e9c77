//! Allocation aggregate and its engines.
//!
//! # Responsibility
//! - Own the room registry, person registry and unallocated list as one
//!   explicitly passed value.
//! - Host the allocation, reallocation and onboarding transitions.
//!
//! # Invariants
//! - Occupancy never exceeds room capacity.
//! - A person holds at most one room per axis.
//! - Staff never occupy a living space.
//! - Every id referenced by a room or the unallocated list is registered.
//! - Each transition takes `&mut self`, so compound read-modify-write steps
//!   are never observed half-applied.

mod allocation;
pub mod placement;
mod reallocation;

pub use allocation::{AllocationOutcome, AxisResolution, OnboardingReport};
pub use reallocation::Relocation;

use crate::model::person::{PersonId, Role};
use crate::model::room::Category;
use crate::registry::ids::IdGenerator;
use crate::registry::people::PersonRegistry;
use crate::registry::rooms::{CreationReport, RoomRegistry};
use log::{debug, info};
use placement::{PlacementStrategy, UniformPlacement};
use serde::{Deserialize, Serialize};

/// One failed allocation axis for one person.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UnallocatedEntry {
    pub person_id: PersonId,
    pub axis: Category,
}

/// Insertion-ordered set of unallocated `(person, axis)` pairs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnallocatedList {
    entries: Vec<UnallocatedEntry>,
}

impl UnallocatedList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `id` as unallocated on `axis`; repeated pushes are ignored.
    pub fn push(&mut self, person_id: PersonId, axis: Category) -> bool {
        if self.contains(&person_id, axis) {
            return false;
        }
        self.entries.push(UnallocatedEntry { person_id, axis });
        true
    }

    /// Clears the entry for `id` on `axis`, returning whether one existed.
    pub fn remove(&mut self, person_id: &PersonId, axis: Category) -> bool {
        let before = self.entries.len();
        self.entries
            .retain(|entry| !(entry.person_id == *person_id && entry.axis == axis));
        before != self.entries.len()
    }

    pub fn contains(&self, person_id: &PersonId, axis: Category) -> bool {
        self.entries
            .iter()
            .any(|entry| entry.person_id == *person_id && entry.axis == axis)
    }

    pub fn contains_person(&self, person_id: &PersonId) -> bool {
        self.entries.iter().any(|entry| entry.person_id == *person_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &UnallocatedEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Complete allocation model: rooms, people and unallocated axes.
pub struct AllocationSystem {
    pub(crate) rooms: RoomRegistry,
    pub(crate) people: PersonRegistry,
    pub(crate) unallocated: UnallocatedList,
    placement: Box<dyn PlacementStrategy>,
}

impl AllocationSystem {
    /// Empty system with uniform random placement and sequential ids.
    pub fn new() -> Self {
        Self::with_placement(Box::new(UniformPlacement::new()))
    }

    pub fn with_placement(placement: Box<dyn PlacementStrategy>) -> Self {
        Self {
            rooms: RoomRegistry::new(),
            people: PersonRegistry::new(),
            unallocated: UnallocatedList::new(),
            placement,
        }
    }

    pub fn with_parts(ids: Box<dyn IdGenerator>, placement: Box<dyn PlacementStrategy>) -> Self {
        Self {
            rooms: RoomRegistry::new(),
            people: PersonRegistry::with_generator(ids),
            unallocated: UnallocatedList::new(),
            placement,
        }
    }

    /// Creates empty rooms of `category`; existing names are reported, not replaced.
    pub fn create_rooms<I, S>(&mut self, names: I, category: Category) -> CreationReport
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let report = self.rooms.create_rooms(names, category);
        info!(
            "event=room_create module=engine status=ok category={} created={} duplicates={}",
            category.as_str(),
            report.created.len(),
            report.duplicates.len()
        );
        for duplicate in &report.duplicates {
            debug!(
                "event=room_create module=engine status=skipped room={} reason=duplicate",
                duplicate
            );
        }
        report
    }

    /// Registers a person without attempting any allocation.
    pub fn add_person(&mut self, role: Role, name: &str) -> PersonId {
        let id = self.people.add_person(role, name);
        info!(
            "event=person_add module=engine status=ok person_id={} role={}",
            id,
            role.as_str()
        );
        id
    }

    pub fn rooms(&self) -> &RoomRegistry {
        &self.rooms
    }

    pub fn people(&self) -> &PersonRegistry {
        &self.people
    }

    pub fn unallocated(&self) -> &UnallocatedList {
        &self.unallocated
    }

    pub fn set_placement(&mut self, placement: Box<dyn PlacementStrategy>) {
        self.placement = placement;
    }
}

impl Default for AllocationSystem {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::UnallocatedList;
    use crate::model::person::PersonId;
    use crate::model::room::Category;

    #[test]
    fn unallocated_list_tracks_axes_independently() {
        let mut list = UnallocatedList::new();
        let id = PersonId::new("P0001");
        assert!(list.push(id.clone(), Category::LivingSpace));
        assert!(!list.push(id.clone(), Category::LivingSpace));
        assert!(list.contains(&id, Category::LivingSpace));
        assert!(!list.contains(&id, Category::Office));

        assert!(list.push(id.clone(), Category::Office));
        assert!(list.remove(&id, Category::Office));
        assert!(!list.remove(&id, Category::Office));
        assert_eq!(list.len(), 1);
        assert!(list.contains_person(&id));
    }
}
