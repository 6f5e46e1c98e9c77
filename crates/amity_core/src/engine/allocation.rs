//! Vacancy placement and the onboarding policy built on it.

use super::AllocationSystem;
use crate::error::{AllocationError, AllocationResult};
use crate::model::person::{Person, PersonId, Role};
use crate::model::room::Category;
use log::{info, warn};
use std::fmt::{Display, Formatter};

/// Result of one placement attempt on one axis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AllocationOutcome {
    /// Person appended to the named room.
    Placed(String),
    /// The system has no rooms of any category.
    NoRoomsExist,
    /// Every room of the requested category is full.
    NoVacancy,
}

/// How one requested axis ended up for a newly added person.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AxisResolution {
    Placed(String),
    /// Recorded in the unallocated list for this axis.
    Unallocated(AllocationError),
}

impl AxisResolution {
    pub fn room(&self) -> Option<&str> {
        match self {
            Self::Placed(room) => Some(room.as_str()),
            Self::Unallocated(_) => None,
        }
    }

    pub fn is_unallocated(&self) -> bool {
        matches!(self, Self::Unallocated(_))
    }
}

/// Summary of adding one person and resolving each requested axis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OnboardingReport {
    pub person: Person,
    pub office: AxisResolution,
    /// `None` when no accommodation was requested.
    pub living_space: Option<AxisResolution>,
}

impl OnboardingReport {
    /// True when at least one requested axis landed in the unallocated list.
    pub fn has_unallocated_axis(&self) -> bool {
        self.office.is_unallocated()
            || self
                .living_space
                .as_ref()
                .is_some_and(AxisResolution::is_unallocated)
    }

    /// Human-readable status lines, one per notable event.
    pub fn lines(&self) -> Vec<String> {
        let name = self.person.name.as_str();
        let mut lines = Vec::new();

        for (axis, resolution) in [
            (Category::Office, Some(&self.office)),
            (Category::LivingSpace, self.living_space.as_ref()),
        ] {
            match resolution {
                Some(AxisResolution::Placed(room)) => {
                    lines.push(format!("{name} has been allocated the {axis}: {room}"))
                }
                Some(AxisResolution::Unallocated(AllocationError::RoleIneligible { .. })) => {
                    lines.push("staff may not receive living-space accommodation".to_string())
                }
                Some(AxisResolution::Unallocated(reason)) => {
                    lines.push(format!("{name} could not be allocated: {reason}"))
                }
                None => {}
            }
        }

        if self.has_unallocated_axis() {
            lines.push(format!("{name} has been added to the unallocated list"));
        }
        lines.push(format!(
            "The {} {name} has been added successfully with id {}",
            self.person.role, self.person.id
        ));
        lines
    }
}

impl Display for OnboardingReport {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.lines().join("\n"))
    }
}

impl AllocationSystem {
    /// Places a registered person into a random vacant room of `category`.
    ///
    /// # Errors
    /// - `PersonNotFound` when `id` is not registered.
    /// - `RoleIneligible` for staff and living spaces.
    /// - `AlreadyThere` when the person already holds a room on this axis.
    ///
    /// `NoRoomsExist` and `NoVacancy` are outcomes, not errors; recording the
    /// person as unallocated is left to the caller.
    pub fn allocate(
        &mut self,
        id: &PersonId,
        category: Category,
    ) -> AllocationResult<AllocationOutcome> {
        let role = self
            .people
            .role_of(id)
            .ok_or_else(|| AllocationError::PersonNotFound(id.to_string()))?;
        ensure_eligible(role, category)?;
        if let Some(room) = self.rooms.holder_of(id, category) {
            return Err(AllocationError::AlreadyThere {
                person_id: id.clone(),
                room: room.to_string(),
            });
        }
        Ok(self.place(id, category))
    }

    /// Adds a person and resolves office and, if requested, living space.
    ///
    /// Every person is offered an office. Fellows asking for accommodation
    /// are offered a living space; staff asking for it are refused. Each
    /// requested axis that is not placed is recorded as unallocated.
    pub fn onboard(&mut self, role: Role, name: &str, wants_accommodation: bool) -> OnboardingReport {
        let id = self.add_person(role, name);
        let office = self.resolve_axis(&id, Category::Office);

        let living_space = if !wants_accommodation {
            None
        } else {
            match ensure_eligible(role, Category::LivingSpace) {
                Ok(()) => Some(self.resolve_axis(&id, Category::LivingSpace)),
                Err(refusal) => {
                    warn!(
                        "event=allocate module=engine status=refused person_id={} axis=living_space reason=role_ineligible",
                        id
                    );
                    self.unallocated.push(id.clone(), Category::LivingSpace);
                    Some(AxisResolution::Unallocated(refusal))
                }
            }
        };

        let person = self
            .people
            .get(&id)
            .cloned()
            .unwrap_or_else(|| Person::new(id.clone(), name, role));

        OnboardingReport {
            person,
            office,
            living_space,
        }
    }

    fn resolve_axis(&mut self, id: &PersonId, axis: Category) -> AxisResolution {
        match self.place(id, axis) {
            AllocationOutcome::Placed(room) => AxisResolution::Placed(room),
            AllocationOutcome::NoRoomsExist => {
                self.unallocated.push(id.clone(), axis);
                AxisResolution::Unallocated(AllocationError::NoRoomsExist)
            }
            AllocationOutcome::NoVacancy => {
                self.unallocated.push(id.clone(), axis);
                AxisResolution::Unallocated(AllocationError::NoVacancy(axis))
            }
        }
    }

    /// Category-agnostic placement primitive; eligibility is checked by callers.
    pub(crate) fn place(&mut self, id: &PersonId, category: Category) -> AllocationOutcome {
        if self.rooms.is_empty() {
            info!(
                "event=allocate module=engine status=unallocated person_id={} axis={} reason=no_rooms",
                id,
                category.as_str()
            );
            return AllocationOutcome::NoRoomsExist;
        }

        let vacancies = self.rooms.vacancies(category);
        let chosen = if vacancies.is_empty() {
            None
        } else {
            self.placement
                .choose(&vacancies)
                .and_then(|choice| vacancies.get(choice))
                .cloned()
        };
        let Some(room_name) = chosen else {
            info!(
                "event=allocate module=engine status=unallocated person_id={} axis={} reason=no_vacancy",
                id,
                category.as_str()
            );
            return AllocationOutcome::NoVacancy;
        };

        match self.rooms.room_mut(&room_name) {
            Some(room) => room.occupants.push(id.clone()),
            None => return AllocationOutcome::NoVacancy,
        }
        self.unallocated.remove(id, category);

        info!(
            "event=allocate module=engine status=ok person_id={} axis={} room={}",
            id,
            category.as_str(),
            room_name
        );
        AllocationOutcome::Placed(room_name)
    }
}

pub(crate) fn ensure_eligible(role: Role, category: Category) -> AllocationResult<()> {
    match (role, category) {
        (Role::Staff, Category::LivingSpace) => Err(AllocationError::RoleIneligible {
            role,
            category,
        }),
        (Role::Staff, Category::Office)
        | (Role::Fellow, Category::Office)
        | (Role::Fellow, Category::LivingSpace) => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::{AllocationOutcome, AxisResolution};
    use crate::engine::placement::{FirstVacancy, PlacementStrategy};
    use crate::engine::AllocationSystem;
    use crate::error::AllocationError;
    use crate::model::person::{PersonId, Role};
    use crate::model::room::Category;

    fn system() -> AllocationSystem {
        AllocationSystem::with_placement(Box::new(FirstVacancy))
    }

    #[test]
    fn fellow_with_accommodation_gets_both_axes() {
        let mut system = system();
        system.create_rooms(["mars"], Category::Office);
        system.create_rooms(["earth"], Category::LivingSpace);

        let report = system.onboard(Role::Fellow, "Luffy Monkey", true);
        assert_eq!(report.office.room(), Some("MARS"));
        assert_eq!(
            report.living_space.as_ref().and_then(AxisResolution::room),
            Some("EARTH")
        );
        assert!(system.unallocated().is_empty());
        assert!(report.to_string().contains("added successfully"));
    }

    #[test]
    fn staff_without_rooms_is_unallocated() {
        let mut system = system();
        let report = system.onboard(Role::Staff, "Kuzan Aokiji", false);

        assert_eq!(
            report.office,
            AxisResolution::Unallocated(AllocationError::NoRoomsExist)
        );
        assert!(system
            .unallocated()
            .contains(&report.person.id, Category::Office));
        assert!(report.to_string().contains("unallocated"));
    }

    #[test]
    fn staff_requesting_accommodation_is_refused_and_recorded() {
        let mut system = system();
        system.create_rooms(["pluto"], Category::LivingSpace);
        system.create_rooms(["jupiter"], Category::Office);

        let report = system.onboard(Role::Staff, "Sakazuki Akainu", true);
        assert_eq!(report.office.room(), Some("JUPITER"));
        assert!(matches!(
            report.living_space,
            Some(AxisResolution::Unallocated(AllocationError::RoleIneligible { .. }))
        ));
        assert!(system.rooms().room("pluto").unwrap().is_empty());
        assert!(system
            .unallocated()
            .contains(&report.person.id, Category::LivingSpace));
        assert!(!system
            .unallocated()
            .contains(&report.person.id, Category::Office));
        assert!(report
            .to_string()
            .contains("staff may not receive living-space accommodation"));
    }

    #[test]
    fn office_full_after_six_staff() {
        let mut system = system();
        system.create_rooms(["jupiter"], Category::Office);
        for name in [
            "Monkey Garp",
            "Kuzan Aokiji",
            "Bosalino Kizaru",
            "Monkey Dragon",
            "Sakazuki Akainu",
            "Shem Ogumbe",
        ] {
            let report = system.onboard(Role::Staff, name, false);
            assert_eq!(report.office.room(), Some("JUPITER"));
        }

        let seventh = system.onboard(Role::Staff, "Nico Robin", false);
        assert_eq!(
            seventh.office,
            AxisResolution::Unallocated(AllocationError::NoVacancy(Category::Office))
        );
        assert_eq!(system.rooms().room("jupiter").unwrap().occupants.len(), 6);
        assert!(system
            .unallocated()
            .contains(&seventh.person.id, Category::Office));
    }

    #[test]
    fn allocate_enforces_registration_role_and_axis_uniqueness() {
        let mut system = system();
        system.create_rooms(["venus"], Category::LivingSpace);
        system.create_rooms(["mars"], Category::Office);

        let missing = system.allocate(&PersonId::new("P9999"), Category::Office);
        assert!(matches!(missing, Err(AllocationError::PersonNotFound(_))));

        let staff = system.add_person(Role::Staff, "Monkey Garp");
        assert!(matches!(
            system.allocate(&staff, Category::LivingSpace),
            Err(AllocationError::RoleIneligible { .. })
        ));

        let fellow = system.add_person(Role::Fellow, "Portgas Ace");
        assert_eq!(
            system.allocate(&fellow, Category::Office).unwrap(),
            AllocationOutcome::Placed("MARS".to_string())
        );
        assert!(matches!(
            system.allocate(&fellow, Category::Office),
            Err(AllocationError::AlreadyThere { .. })
        ));
    }

    #[test]
    fn allocate_reports_no_vacancy_when_only_other_category_exists() {
        let mut system = system();
        system.create_rooms(["venus"], Category::LivingSpace);
        let fellow = system.add_person(Role::Fellow, "Roronoa Zoro");
        assert_eq!(
            system.allocate(&fellow, Category::Office).unwrap(),
            AllocationOutcome::NoVacancy
        );
        assert!(system.unallocated().is_empty());
    }

    #[test]
    fn successful_allocation_clears_unallocated_axis() {
        let mut system = system();
        system.create_rooms(["venus"], Category::LivingSpace);
        let report = system.onboard(Role::Fellow, "Roronoa Zoro", false);
        assert!(system
            .unallocated()
            .contains(&report.person.id, Category::Office));

        system.create_rooms(["mars"], Category::Office);
        system.allocate(&report.person.id, Category::Office).unwrap();
        assert!(system.unallocated().is_empty());
    }

    struct FixedIndex(usize);

    impl PlacementStrategy for FixedIndex {
        fn choose(&mut self, _vacancies: &[String]) -> Option<usize> {
            Some(self.0)
        }
    }

    #[test]
    fn strategy_picking_from_an_empty_list_yields_no_vacancy() {
        let mut system = AllocationSystem::with_placement(Box::new(FixedIndex(0)));
        system.create_rooms(["earth"], Category::LivingSpace);

        let report = system.onboard(Role::Staff, "Borsalino Kizaru", false);
        assert_eq!(
            report.office,
            AxisResolution::Unallocated(AllocationError::NoVacancy(Category::Office))
        );
        assert!(system
            .unallocated()
            .contains(&report.person.id, Category::Office));
    }

    #[test]
    fn out_of_range_strategy_choice_places_nobody() {
        let mut system = AllocationSystem::with_placement(Box::new(FixedIndex(9)));
        system.create_rooms(["mars"], Category::Office);

        let report = system.onboard(Role::Fellow, "Jinbe Knight", false);
        assert!(report.office.is_unallocated());
        assert!(system.rooms().room("mars").unwrap().is_empty());
    }
}
