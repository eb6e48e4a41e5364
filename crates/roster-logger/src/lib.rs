//! Roster: logger context.
//!
//! Drains the employee event queue, records one log entry per successfully
//! processed delivery, and acknowledges the delivery. Anything not
//! acknowledged is redelivered by the queue after its visibility timeout.

pub mod application;
pub mod domain;
