//! Application layer for the logger context.

pub mod consumer;
pub mod processor;
pub mod query_handlers;
