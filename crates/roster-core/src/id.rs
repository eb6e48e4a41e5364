//! Identifier generation abstraction for determinism.
//!
//! In production, this hands out random UUIDs. In tests, a fixed sequence
//! is injected so generated record ids can be asserted on.

use uuid::Uuid;

/// Abstraction over fresh identifier generation.
pub trait IdGenerator: Send + Sync {
    /// Returns a new identifier.
    fn next_id(&self) -> Uuid;
}

/// Production generator backed by random (v4) UUIDs.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomIds;

impl IdGenerator for RandomIds {
    fn next_id(&self) -> Uuid {
        Uuid::new_v4()
    }
}
