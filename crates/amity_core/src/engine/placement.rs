//! Room selection strategies for vacancy placement.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Picks one room out of a non-empty vacancy list.
///
/// Returns the chosen index, or `None` when `vacancies` is empty. An index
/// outside `vacancies` is treated as no vacancy.
pub trait PlacementStrategy: Send {
    fn choose(&mut self, vacancies: &[String]) -> Option<usize>;
}

/// Uniform random choice over the vacancy list.
pub struct UniformPlacement {
    rng: StdRng,
}

impl UniformPlacement {
    /// Seeds from operating system entropy.
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Reproducible sequence of choices for a given seed.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for UniformPlacement {
    fn default() -> Self {
        Self::new()
    }
}

impl PlacementStrategy for UniformPlacement {
    fn choose(&mut self, vacancies: &[String]) -> Option<usize> {
        if vacancies.is_empty() {
            return None;
        }
        Some(self.rng.gen_range(0..vacancies.len()))
    }
}

/// Always picks the earliest-created vacant room.
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstVacancy;

impl PlacementStrategy for FirstVacancy {
    fn choose(&mut self, vacancies: &[String]) -> Option<usize> {
        if vacancies.is_empty() {
            None
        } else {
            Some(0)
        }
    }
}
