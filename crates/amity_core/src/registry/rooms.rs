//! Room registry.
//!
//! # Responsibility
//! - Create rooms, reject duplicate names and answer vacancy queries.
//! - Provide occupant mutation primitives used by the engines.
//!
//! # Invariants
//! - Iteration follows insertion order.
//! - A name maps to exactly one room regardless of category.

use crate::error::{AllocationError, AllocationResult};
use crate::model::person::PersonId;
use crate::model::room::{normalize_room_name, Category, Room};
use std::collections::HashMap;

/// Outcome of one `create_rooms` batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreationReport {
    pub category: Category,
    /// Upper-cased names of rooms created by this batch, in input order.
    pub created: Vec<String>,
    /// Upper-cased names rejected because they already existed.
    pub duplicates: Vec<String>,
}

impl CreationReport {
    pub fn created_count(&self) -> usize {
        self.created.len()
    }
}

#[derive(Debug, Clone, Default)]
pub struct RoomRegistry {
    rooms: Vec<Room>,
    index: HashMap<String, usize>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates one empty room per name; names already present are skipped.
    pub fn create_rooms<I, S>(&mut self, names: I, category: Category) -> CreationReport
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut report = CreationReport {
            category,
            ..CreationReport::default()
        };

        for name in names {
            let name = name.as_ref();
            if name.trim().is_empty() {
                continue;
            }
            let room = Room::new(name, category);
            let room_name = room.name.clone();
            match self.insert(room) {
                Ok(()) => report.created.push(room_name),
                Err(_) => report.duplicates.push(room_name),
            }
        }

        report
    }

    /// Inserts a fully built room, rejecting a name already in use.
    pub fn insert(&mut self, room: Room) -> AllocationResult<()> {
        if self.index.contains_key(room.name.as_str()) {
            return Err(AllocationError::DuplicateRoomName(room.name));
        }
        self.index.insert(room.name.clone(), self.rooms.len());
        self.rooms.push(room);
        Ok(())
    }

    /// Names of rooms in `category` with spare capacity, in insertion order.
    pub fn vacancies(&self, category: Category) -> Vec<String> {
        self.rooms
            .iter()
            .filter(|room| room.category == category && room.has_vacancy())
            .map(|room| room.name.clone())
            .collect()
    }

    /// Looks up a room by name, case-insensitively.
    pub fn room(&self, name: &str) -> Option<&Room> {
        self.index
            .get(normalize_room_name(name).as_str())
            .map(|position| &self.rooms[*position])
    }

    pub(crate) fn room_mut(&mut self, name: &str) -> Option<&mut Room> {
        match self.index.get(normalize_room_name(name).as_str()) {
            Some(position) => Some(&mut self.rooms[*position]),
            None => None,
        }
    }

    /// Name of the room on `axis` currently holding `id`, if any.
    pub fn holder_of(&self, id: &PersonId, axis: Category) -> Option<&str> {
        self.rooms
            .iter()
            .find(|room| room.category == axis && room.contains(id))
            .map(|room| room.name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Room> {
        self.rooms.iter()
    }

    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }
}
