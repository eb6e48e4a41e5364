//! Route modules for the ops surface.

pub mod employees;
pub mod health;
pub mod logs;
