//! Utility functions.

pub mod format;
pub mod time;

pub use format::{format_energy, format_money};
pub use time::parse_utc;
