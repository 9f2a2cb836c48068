//! Core data models for metered consumption.
//!
//! These are the storage-shaped types the engine passes between its
//! stages. Wire-shaped types live in [`crate::api::types`] and are
//! converted at the API boundary.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

// =============================================================================
// Consumption Record
// =============================================================================

/// One metered interval, keyed by `(from_time, to_time)`.
///
/// # Fields
/// - `from_time`/`to_time`: interval bounds, UTC, `from_time < to_time`.
/// - `consumption`: energy drawn in the interval; null until the meter
///   reports, which routinely lags the most recent hours.
/// - `cost`, `unit_price`, `unit_price_vat`: billing figures, null until
///   priced.
///
/// Re-delivery of the same interval overwrites the stored row
/// (last-write-wins); records are never deleted by the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsumptionRecord {
    pub from_time: DateTime<Utc>,
    pub to_time: DateTime<Utc>,
    pub consumption: Option<f64>,
    pub consumption_unit: Option<String>,
    pub cost: Option<f64>,
    pub unit_price: Option<f64>,
    pub unit_price_vat: Option<f64>,
    pub currency: Option<String>,
}

// =============================================================================
// Resolution
// =============================================================================

/// Time-bucket granularity of requested data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Resolution {
    Hourly,
    Daily,
    Weekly,
    Monthly,
    Annual,
}

impl Resolution {
    /// All resolutions the upstream API accepts.
    pub const ALL: [Self; 5] = [
        Self::Hourly,
        Self::Daily,
        Self::Weekly,
        Self::Monthly,
        Self::Annual,
    ];

    /// The literal the API query embeds.
    #[must_use]
    pub const fn api_name(&self) -> &'static str {
        match self {
            Self::Hourly => "HOURLY",
            Self::Daily => "DAILY",
            Self::Weekly => "WEEKLY",
            Self::Monthly => "MONTHLY",
            Self::Annual => "ANNUAL",
        }
    }

    /// The name used on the command line.
    #[must_use]
    pub const fn cli_name(&self) -> &'static str {
        match self {
            Self::Hourly => "hourly",
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Annual => "annual",
        }
    }

    /// Parse a CLI name, case-insensitive.
    #[must_use]
    pub fn from_cli_name(name: &str) -> Option<Self> {
        let lower = name.to_lowercase();
        Self::ALL.into_iter().find(|r| r.cli_name() == lower)
    }
}

impl Default for Resolution {
    fn default() -> Self {
        Self::Hourly
    }
}

impl std::fmt::Display for Resolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.cli_name())
    }
}

// =============================================================================
// Aggregates
// =============================================================================

/// Derived rollup for one calendar day.
///
/// Sums exclude records with null consumption; `avg_unit_price` is an
/// unweighted mean; `currency` is the maximum code in the group, a
/// deterministic tie-break rather than a multi-currency guarantee.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyAggregate {
    pub date: NaiveDate,
    pub total_consumption: f64,
    pub total_cost: Option<f64>,
    pub avg_unit_price: Option<f64>,
    pub currency: Option<String>,
}

/// Derived rollup for one calendar month, same derivation as the daily one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyAggregate {
    pub year: i32,
    pub month: u32,
    pub total_consumption: f64,
    pub total_cost: Option<f64>,
    pub avg_unit_price: Option<f64>,
    pub currency: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolution_round_trips_cli_names() {
        for res in Resolution::ALL {
            assert_eq!(Resolution::from_cli_name(res.cli_name()), Some(res));
        }
    }

    #[test]
    fn resolution_parsing_is_case_insensitive() {
        assert_eq!(Resolution::from_cli_name("HOURLY"), Some(Resolution::Hourly));
        assert_eq!(Resolution::from_cli_name("Monthly"), Some(Resolution::Monthly));
    }

    #[test]
    fn resolution_rejects_unknown_names() {
        assert_eq!(Resolution::from_cli_name("minutely"), None);
    }

    #[test]
    fn api_names_match_upstream_enum() {
        assert_eq!(Resolution::Hourly.api_name(), "HOURLY");
        assert_eq!(Resolution::Annual.api_name(), "ANNUAL");
    }
}
