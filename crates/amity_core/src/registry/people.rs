//! Person registry.
//!
//! # Responsibility
//! - Register people under ids issued by an `IdGenerator`.
//! - Resolve ids by display name and roles by id.
//!
//! # Invariants
//! - Ids are unique; a generator candidate that collides is discarded.
//! - Issuing an id always terminates, even with a generator stuck on a
//!   registered id.
//! - Iteration and name lookup follow insertion order, so the first
//!   registered person wins when names collide.

use crate::model::person::{normalize_person_name, Person, PersonId, Role};
use crate::registry::ids::{IdGenerator, SequentialIdGenerator};
use log::warn;
use std::collections::HashMap;

const MAX_GENERATOR_ATTEMPTS: usize = 64;

pub struct PersonRegistry {
    people: Vec<Person>,
    index: HashMap<PersonId, usize>,
    ids: Box<dyn IdGenerator>,
}

impl PersonRegistry {
    pub fn new() -> Self {
        Self::with_generator(Box::new(SequentialIdGenerator::new()))
    }

    pub fn with_generator(ids: Box<dyn IdGenerator>) -> Self {
        Self {
            people: Vec::new(),
            index: HashMap::new(),
            ids,
        }
    }

    /// Registers a new person and returns the issued id.
    pub fn add_person(&mut self, role: Role, name: &str) -> PersonId {
        let id = self.fresh_id();
        self.index.insert(id.clone(), self.people.len());
        self.people.push(Person::new(id.clone(), name, role));
        id
    }

    /// Re-registers a person restored from persisted state.
    ///
    /// Returns `false` without changes when the id is already present.
    pub(crate) fn insert_existing(&mut self, person: Person) -> bool {
        if self.index.contains_key(&person.id) {
            return false;
        }
        self.index.insert(person.id.clone(), self.people.len());
        self.people.push(person);
        true
    }

    /// Returns the first-registered person whose stored name matches `name`.
    ///
    /// The query is normalized the same way stored names are.
    pub fn lookup_by_name(&self, name: &str) -> Option<&Person> {
        let normalized = normalize_person_name(name);
        self.people.iter().find(|person| person.name == normalized)
    }

    pub fn role_of(&self, id: &PersonId) -> Option<Role> {
        self.get(id).map(|person| person.role)
    }

    pub fn get(&self, id: &PersonId) -> Option<&Person> {
        self.index.get(id).map(|position| &self.people[*position])
    }

    pub fn contains(&self, id: &PersonId) -> bool {
        self.index.contains_key(id)
    }

    /// Display name for `id`, or the id itself when unknown.
    pub fn display_name(&self, id: &PersonId) -> String {
        self.get(id)
            .map(|person| person.name.clone())
            .unwrap_or_else(|| id.to_string())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Person> {
        self.people.iter()
    }

    pub fn iter_role(&self, role: Role) -> impl Iterator<Item = &Person> {
        self.people.iter().filter(move |person| person.role == role)
    }

    pub fn len(&self) -> usize {
        self.people.len()
    }

    pub fn is_empty(&self) -> bool {
        self.people.is_empty()
    }

    fn fresh_id(&mut self) -> PersonId {
        let mut candidate = self.ids.next_id();
        for _ in 1..MAX_GENERATOR_ATTEMPTS {
            if !self.index.contains_key(&candidate) {
                return candidate;
            }
            candidate = self.ids.next_id();
        }
        if !self.index.contains_key(&candidate) {
            return candidate;
        }

        warn!(
            "event=person_add module=registry status=fallback_id attempts={} last_candidate={}",
            MAX_GENERATOR_ATTEMPTS, candidate
        );
        // At most `len` suffixed ids can be taken, so one of `len + 1` is free.
        let fallback = (1..=self.people.len() + 1)
            .map(|suffix| PersonId::new(format!("{candidate}-{suffix}")))
            .find(|id| !self.index.contains_key(id));
        fallback.unwrap_or(candidate)
    }

    /// Replaces every registered person, keeping the id generator state.
    ///
    /// Callers validate id uniqueness beforehand.
    pub(crate) fn replace_all(&mut self, people: Vec<Person>) {
        self.people.clear();
        self.index.clear();
        for person in people {
            self.insert_existing(person);
        }
    }
}

impl Default for PersonRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::PersonRegistry;
    use crate::model::person::{Person, PersonId, Role};
    use crate::registry::ids::{IdGenerator, SequentialIdGenerator};

    struct StuckGenerator;

    impl IdGenerator for StuckGenerator {
        fn next_id(&mut self) -> PersonId {
            PersonId::new("P0001")
        }
    }

    #[test]
    fn add_person_issues_distinct_ids_for_shared_names() {
        let mut registry = PersonRegistry::new();
        let first = registry.add_person(Role::Fellow, "Nico Robin");
        let second = registry.add_person(Role::Staff, "nico robin");

        assert_ne!(first, second);
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.role_of(&second), Some(Role::Staff));
    }

    #[test]
    fn lookup_by_name_prefers_first_inserted() {
        let mut registry = PersonRegistry::new();
        let first = registry.add_person(Role::Fellow, "Nico Robin");
        registry.add_person(Role::Staff, "Nico Robin");

        let found = registry.lookup_by_name("nico  robin").unwrap();
        assert_eq!(found.id, first);
        assert!(registry.lookup_by_name("Franky").is_none());
    }

    #[test]
    fn generator_collisions_with_restored_ids_are_skipped() {
        let mut registry =
            PersonRegistry::with_generator(Box::new(SequentialIdGenerator::starting_at(1)));
        assert!(registry.insert_existing(Person::new(
            PersonId::new("P0001"),
            "Monkey Garp",
            Role::Staff
        )));

        let issued = registry.add_person(Role::Fellow, "Portgas Ace");
        assert_eq!(issued.as_str(), "P0002");
        assert!(!registry.insert_existing(Person::new(
            PersonId::new("P0002"),
            "Duplicate",
            Role::Fellow
        )));
    }

    #[test]
    fn stuck_generator_still_issues_unique_ids() {
        let mut registry = PersonRegistry::with_generator(Box::new(StuckGenerator));
        let first = registry.add_person(Role::Fellow, "Nico Robin");
        let second = registry.add_person(Role::Fellow, "Tony Chopper");
        let third = registry.add_person(Role::Staff, "Brook Soul");

        assert_eq!(first.as_str(), "P0001");
        assert_eq!(second.as_str(), "P0001-1");
        assert_eq!(third.as_str(), "P0001-2");
        assert_eq!(registry.len(), 3);
    }
}
