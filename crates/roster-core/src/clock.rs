//! Time sources and the wire timestamp format.
//!
//! Events carry their timestamps as RFC3339 text (second precision, `Z`
//! suffix). Formatting and parsing live here so producer and consumer agree
//! on one representation.

use chrono::{DateTime, SecondsFormat, Utc};

/// Abstraction over system time for deterministic behavior.
pub trait Clock: Send + Sync {
    /// Returns the current time.
    fn now(&self) -> DateTime<Utc>;
}

/// Production clock that delegates to the system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Formats a timestamp in the wire format, e.g. `2024-01-01T00:00:00Z`.
#[must_use]
pub fn format_wire_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Parses a wire timestamp. Any RFC3339 offset is accepted and normalized to UTC.
///
/// # Errors
///
/// Returns the underlying parse error if `raw` is not RFC3339.
pub fn parse_wire_timestamp(raw: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(raw).map(|at| at.with_timezone(&Utc))
}
