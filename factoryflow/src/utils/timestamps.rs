//! Timestamp utilities.

use chrono::{DateTime, Utc};

/// Represents a timestamp that can be serialized/deserialized.
pub type Timestamp = DateTime<Utc>;

/// Format used by the `/time` endpoint.
pub const CLOCK_FORMAT: &str = "%Y/%m/%d-%H:%M:%S";

/// Returns the current UTC timestamp.
#[must_use]
pub fn now_utc() -> Timestamp {
    Utc::now()
}

/// Returns the current UTC time formatted with [`CLOCK_FORMAT`].
///
/// # Examples
///
/// ```
/// use factoryflow::utils::clock_time;
///
/// let now = clock_time();
/// assert_eq!(now.len(), "2024/01/01-00:00:00".len());
/// ```
#[must_use]
pub fn clock_time() -> String {
    format_clock(&now_utc())
}

/// Formats a timestamp with [`CLOCK_FORMAT`].
#[must_use]
pub fn format_clock(ts: &Timestamp) -> String {
    ts.format(CLOCK_FORMAT).to_string()
}
