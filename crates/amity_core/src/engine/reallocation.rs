//! Moving a registered person into a named room.

use super::allocation::ensure_eligible;
use super::AllocationSystem;
use crate::error::{AllocationError, AllocationResult};
use crate::model::person::PersonId;
use crate::model::room::{normalize_room_name, Category};
use log::{info, warn};
use std::fmt::{Display, Formatter};

/// Completed move of one person on one axis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relocation {
    pub person_id: PersonId,
    pub axis: Category,
    /// Previous room on the same axis; `None` when the person had none.
    pub from: Option<String>,
    pub to: String,
}

impl Display for Relocation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.from {
            Some(from) => write!(
                f,
                "{} has been successfully moved from {} to {}",
                self.person_id, from, self.to
            ),
            None => write!(
                f,
                "{} has been successfully moved to {}",
                self.person_id, self.to
            ),
        }
    }
}

impl AllocationSystem {
    /// Moves `id` into `destination`, vacating their room on the same axis.
    ///
    /// Checks run in order: room exists, person exists, role may use the
    /// category, person not already in the room, room has capacity. Nothing
    /// is mutated unless every check passes; removal and insertion then
    /// happen under the same exclusive borrow.
    ///
    /// A person unallocated on the destination axis is simply placed and
    /// their unallocated entry for that axis is cleared.
    pub fn reallocate(&mut self, id: &PersonId, destination: &str) -> AllocationResult<Relocation> {
        let room_name = normalize_room_name(destination);
        let (axis, already_there, has_vacancy) = match self.rooms.room(&room_name) {
            Some(room) => (room.category, room.contains(id), room.has_vacancy()),
            None => {
                warn!(
                    "event=reallocate module=engine status=error person_id={} room={} error_code=room_not_found",
                    id, room_name
                );
                return Err(AllocationError::RoomNotFound(room_name));
            }
        };

        let role = self
            .people
            .role_of(id)
            .ok_or_else(|| AllocationError::PersonNotFound(id.to_string()))?;
        ensure_eligible(role, axis)?;

        if already_there {
            return Err(AllocationError::AlreadyThere {
                person_id: id.clone(),
                room: room_name,
            });
        }
        if !has_vacancy {
            return Err(AllocationError::NoVacancy(axis));
        }

        let from = self.rooms.holder_of(id, axis).map(str::to_string);
        if let Some(previous) = from.as_deref().and_then(|name| self.rooms.room_mut(name)) {
            previous.occupants.retain(|occupant| occupant != id);
        }
        if let Some(target) = self.rooms.room_mut(&room_name) {
            target.occupants.push(id.clone());
        }
        self.unallocated.remove(id, axis);

        info!(
            "event=reallocate module=engine status=ok person_id={} axis={} from={} to={}",
            id,
            axis.as_str(),
            from.as_deref().unwrap_or("none"),
            room_name
        );

        Ok(Relocation {
            person_id: id.clone(),
            axis,
            from,
            to: room_name,
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::engine::placement::FirstVacancy;
    use crate::engine::AllocationSystem;
    use crate::error::AllocationError;
    use crate::model::person::{PersonId, Role};
    use crate::model::room::Category;

    fn system() -> AllocationSystem {
        AllocationSystem::with_placement(Box::new(FirstVacancy))
    }

    fn occupants(system: &AllocationSystem, room: &str) -> Vec<String> {
        system
            .rooms()
            .room(room)
            .unwrap()
            .occupants
            .iter()
            .map(|id| id.to_string())
            .collect()
    }

    #[test]
    fn moves_between_rooms_of_the_same_axis() {
        let mut system = system();
        system.create_rooms(["mars", "venus"], Category::Office);
        system.create_rooms(["earth"], Category::LivingSpace);
        let report = system.onboard(Role::Fellow, "Nami", true);
        let id = report.person.id.clone();

        let moved = system.reallocate(&id, "venus").unwrap();
        assert_eq!(moved.from.as_deref(), Some("MARS"));
        assert_eq!(moved.to, "VENUS");
        assert_eq!(moved.axis, Category::Office);
        assert!(occupants(&system, "MARS").is_empty());
        assert_eq!(occupants(&system, "VENUS"), vec![id.to_string()]);
        assert_eq!(occupants(&system, "EARTH"), vec![id.to_string()]);
    }

    #[test]
    fn staff_cannot_move_into_living_space() {
        let mut system = system();
        system.create_rooms(["venus"], Category::LivingSpace);
        let staff = system.add_person(Role::Staff, "Daniel Sumba");

        let err = system.reallocate(&staff, "venus").unwrap_err();
        assert!(matches!(err, AllocationError::RoleIneligible { .. }));
        assert!(occupants(&system, "VENUS").is_empty());
    }

    #[test]
    fn reallocating_to_current_room_is_already_there() {
        let mut system = system();
        system.create_rooms(["mars"], Category::Office);
        let report = system.onboard(Role::Staff, "Monkey Garp", false);

        let err = system.reallocate(&report.person.id, "Mars").unwrap_err();
        assert!(matches!(err, AllocationError::AlreadyThere { .. }));
        assert_eq!(occupants(&system, "MARS"), vec![report.person.id.to_string()]);
    }

    #[test]
    fn unknown_room_and_person_are_reported() {
        let mut system = system();
        system.create_rooms(["mars"], Category::Office);
        assert_eq!(
            system.reallocate(&PersonId::new("P0001"), "saturn").unwrap_err(),
            AllocationError::RoomNotFound("SATURN".to_string())
        );
        assert_eq!(
            system.reallocate(&PersonId::new("P0001"), "mars").unwrap_err(),
            AllocationError::PersonNotFound("P0001".to_string())
        );
    }

    #[test]
    fn full_destination_is_no_vacancy() {
        let mut system = system();
        system.create_rooms(["earth"], Category::LivingSpace);
        for name in ["A A", "B B", "C C", "D D"] {
            system.onboard(Role::Fellow, name, true);
        }
        system.create_rooms(["moon"], Category::LivingSpace);
        let late = system.onboard(Role::Fellow, "E E", true);
        assert_eq!(late.living_space.as_ref().unwrap().room(), Some("MOON"));

        let err = system.reallocate(&late.person.id, "earth").unwrap_err();
        assert_eq!(err, AllocationError::NoVacancy(Category::LivingSpace));
        assert_eq!(occupants(&system, "EARTH").len(), 4);
        assert_eq!(occupants(&system, "MOON"), vec![late.person.id.to_string()]);
    }

    #[test]
    fn unallocated_person_is_placed_and_cleared() {
        let mut system = system();
        let report = system.onboard(Role::Fellow, "Tony Chopper", true);
        assert_eq!(system.unallocated().len(), 2);

        system.create_rooms(["earth"], Category::LivingSpace);
        let moved = system.reallocate(&report.person.id, "earth").unwrap();
        assert_eq!(moved.from, None);
        assert!(!system
            .unallocated()
            .contains(&report.person.id, Category::LivingSpace));
        assert!(system
            .unallocated()
            .contains(&report.person.id, Category::Office));
    }
}
