//! Domain layer for the employee context.

pub mod commands;
pub mod employee;
pub mod ports;
