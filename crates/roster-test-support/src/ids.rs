//! Test ids: deterministic `IdGenerator` implementation for tests.

use std::sync::Mutex;

use roster_core::id::IdGenerator;
use uuid::Uuid;

/// An id generator that hands out a predetermined sequence of UUIDs. Panics
/// if the sequence is exhausted.
#[derive(Debug)]
pub struct SequenceIds {
    values: Vec<Uuid>,
    index: Mutex<usize>,
}

impl SequenceIds {
    /// Create a new `SequenceIds` with the given values.
    #[must_use]
    pub fn new(values: Vec<Uuid>) -> Self {
        Self {
            values,
            index: Mutex::new(0),
        }
    }

    /// Create a generator yielding `count` ids derived from `1..=count`, so
    /// tests can name them with `Uuid::from_u128(n)`.
    #[must_use]
    pub fn counting(count: u128) -> Self {
        Self::new((1..=count).map(Uuid::from_u128).collect())
    }
}

impl IdGenerator for SequenceIds {
    fn next_id(&self) -> Uuid {
        let mut index = self.index.lock().unwrap();
        let id = self.values[*index];
        *index += 1;
        id
    }
}
