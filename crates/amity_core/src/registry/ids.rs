//! Person identifier generation.

use crate::model::person::PersonId;

/// Source of candidate person identifiers.
///
/// Generators only propose ids; `PersonRegistry` rejects any candidate that
/// is already registered and asks again a bounded number of times before
/// deriving a suffixed id, so uniqueness never depends on the generator alone.
pub trait IdGenerator: Send {
    fn next_id(&mut self) -> PersonId;
}

/// Monotonic counter producing `P0001`, `P0002`, ...
#[derive(Debug, Clone)]
pub struct SequentialIdGenerator {
    next: u64,
}

impl SequentialIdGenerator {
    pub fn new() -> Self {
        Self::starting_at(1)
    }

    pub fn starting_at(next: u64) -> Self {
        Self { next }
    }
}

impl Default for SequentialIdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl IdGenerator for SequentialIdGenerator {
    fn next_id(&mut self) -> PersonId {
        let id = PersonId::new(format!("P{:04}", self.next));
        self.next = self.next.saturating_add(1);
        id
    }
}
