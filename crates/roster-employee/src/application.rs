//! Application layer for the employee context.

pub mod command_handlers;
pub mod publisher;
