//! wattvault - incremental home energy consumption collector.
//!
//! Fetches interval consumption data from a GraphQL metering API into a
//! local SQLite store, resuming from the newest stored interval, and
//! maintains daily and monthly aggregate tables on top of it.

// Note: deny (not forbid) to allow #[allow(unsafe_code)] in test helpers for env var manipulation
#![deny(unsafe_code)]
#![warn(clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod api;
pub mod cli;
pub mod core;
pub mod error;
pub mod storage;
pub mod util;

/// Test utilities module - included in test builds or when test-utils feature is enabled.
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use error::{ExitCode, Result, WattError};

// Re-export test utilities for external test crates
#[cfg(any(test, feature = "test-utils"))]
pub use test_utils::*;
