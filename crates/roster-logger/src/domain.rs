//! Domain layer for the logger context.

pub mod ports;
