//! Shared test mocks and utilities for the Roster employee event pipeline.

mod clock;
mod ids;
mod log_store;
mod queue;

pub use clock::FixedClock;
pub use ids::SequenceIds;
pub use log_store::{FailingLogStore, FlakyLogStore, RecordingLogStore};
pub use queue::{FaultyQueue, InMemoryQueue};
