//! Roster: logger service.
//!
//! Wires the Postgres adapters into the logger's consumer loops and serves a
//! small ops HTTP surface next to them.

pub mod app;
pub mod config;
pub mod consumers;
pub mod error;
pub mod routes;
pub mod state;
pub mod telemetry;
