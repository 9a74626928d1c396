//! Utility functions for timestamp handling.

pub mod timestamps;

pub use timestamps::{clock_time, now_utc, Timestamp, CLOCK_FORMAT};
