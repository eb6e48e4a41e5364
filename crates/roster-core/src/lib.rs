//! Roster Core: shared domain types and ports.
//!
//! This crate defines the event and log record types exchanged between the
//! employee write path and the logger, plus the traits (ports) both sides use
//! to reach the queue and the log store. It contains no infrastructure code.

pub mod clock;
pub mod error;
pub mod event;
pub mod id;
pub mod log_entry;
pub mod log_store;
pub mod queue;
