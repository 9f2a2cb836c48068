//! Test utilities for wattvault.
//!
//! Provides shared record factories, GraphQL response fixtures, and a
//! temporary-directory helper for use across all test modules.
//!
//! # Usage
//!
//! ```rust,ignore
//! use wattvault::test_utils::*;
//!
//! let start = utc(2024, 3, 9, 10);
//! let page = consumption_page_json(&hourly_nodes(start, 3, 1.0), false, None);
//! let dir = TestDir::new();
//! let db = dir.db_path();
//! ```

use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, TimeZone, Utc};
use serde_json::{Value, json};

use crate::core::models::ConsumptionRecord;

// =============================================================================
// Timestamps
// =============================================================================

/// Build a UTC timestamp on the hour.
///
/// # Panics
///
/// Panics if the components do not name a valid timestamp.
#[must_use]
pub fn utc(year: i32, month: u32, day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, 0, 0)
        .single()
        .expect("valid timestamp")
}

// =============================================================================
// Record Factories
// =============================================================================

/// Create a one-hour consumption record starting at `from`.
///
/// `consumption` of `None` models an interval the meter has not settled
/// yet; unit, cost, and currency follow it.
#[must_use]
pub fn make_test_record(from: DateTime<Utc>, consumption: Option<f64>) -> ConsumptionRecord {
    ConsumptionRecord {
        from_time: from,
        to_time: from + Duration::hours(1),
        consumption,
        consumption_unit: consumption.map(|_| "kWh".to_string()),
        cost: consumption.map(|c| c * 0.5),
        unit_price: Some(0.5),
        unit_price_vat: Some(0.125),
        currency: Some("NOK".to_string()),
    }
}

// =============================================================================
// GraphQL Response Fixtures
// =============================================================================

/// JSON for a single consumption edge node.
#[must_use]
pub fn consumption_node_json(from: DateTime<Utc>, consumption: Option<f64>) -> Value {
    json!({
        "from": from.to_rfc3339(),
        "to": (from + Duration::hours(1)).to_rfc3339(),
        "consumption": consumption,
        "consumptionUnit": consumption.map(|_| "kWh"),
        "cost": consumption.map(|c| c * 0.5),
        "unitPrice": 0.5,
        "unitPriceVAT": 0.125,
        "currency": "NOK",
    })
}

/// A run of hourly edge nodes in chronological order.
#[must_use]
pub fn hourly_nodes(start: DateTime<Utc>, count: usize, consumption: f64) -> Vec<Value> {
    (0..count)
        .map(|i| {
            consumption_node_json(
                start + Duration::hours(i64::try_from(i).expect("small count")),
                Some(consumption),
            )
        })
        .collect()
}

/// A full consumption response envelope for the given edge nodes.
#[must_use]
pub fn consumption_page_json(nodes: &[Value], has_next_page: bool, end_cursor: Option<&str>) -> Value {
    let edges: Vec<Value> = nodes.iter().map(|node| json!({ "node": node })).collect();
    json!({
        "data": {
            "viewer": {
                "home": {
                    "consumption": {
                        "pageInfo": {
                            "hasNextPage": has_next_page,
                            "endCursor": end_cursor,
                        },
                        "edges": edges,
                    }
                }
            }
        }
    })
}

/// A homes discovery response envelope for the given home ids.
#[must_use]
pub fn homes_response_json(ids: &[&str]) -> Value {
    let homes: Vec<Value> = ids
        .iter()
        .map(|id| {
            json!({
                "id": id,
                "appNickname": "Test Home",
                "address": { "address1": "Testgata 1" },
            })
        })
        .collect();
    json!({ "data": { "viewer": { "homes": homes } } })
}

// =============================================================================
// Filesystem Fixtures
// =============================================================================

/// An isolated temporary directory, removed on drop.
pub struct TestDir {
    inner: tempfile::TempDir,
}

impl TestDir {
    /// Create a new isolated temporary directory.
    ///
    /// # Panics
    ///
    /// Panics if the temporary directory cannot be created.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: tempfile::tempdir().expect("Failed to create temp directory"),
        }
    }

    /// Get the path to the temporary directory.
    #[must_use]
    pub fn path(&self) -> &Path {
        self.inner.path()
    }

    /// Path for a consumption database inside this directory.
    #[must_use]
    pub fn db_path(&self) -> PathBuf {
        self.inner.path().join("consumption.sqlite")
    }

    /// Create a file in the temporary directory with the given content.
    ///
    /// # Panics
    ///
    /// Panics if the file cannot be created or written.
    pub fn create_file(&self, name: &str, content: &str) -> PathBuf {
        let path = self.inner.path().join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directories");
        }
        std::fs::write(&path, content).expect("Failed to write file");
        path
    }
}

impl Default for TestDir {
    fn default() -> Self {
        Self::new()
    }
}
