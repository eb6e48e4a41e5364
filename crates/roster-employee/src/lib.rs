//! Roster: employee write path.
//!
//! Registers employees and, once the write succeeds, publishes an
//! `employee.created` event onto the durable queue for the logger.

pub mod application;
pub mod domain;
