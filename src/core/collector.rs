//! Incremental collection pipeline.
//!
//! Wires credential, transport, range resolution, pagination, and storage
//! into one collection run: resolve the home, work out the window still
//! missing from the store, walk the paginated source, merge what came back,
//! and refresh the aggregate tables when anything changed.

use std::path::PathBuf;

use chrono::{DateTime, Utc};

use crate::api::{self, Transport};
use crate::core::config::EngineConfig;
use crate::core::models::Resolution;
use crate::core::range;
use crate::core::walker::{PageWalker, StopReason};
use crate::error::Result;
use crate::storage::store::ConsumptionStore;

/// One collection run, fully specified.
#[derive(Debug, Clone)]
pub struct CollectRequest {
    /// API access token.
    pub token: String,
    /// Home to collect for; discovered from the account when `None`.
    pub home_id: Option<String>,
    /// Interval resolution to request.
    pub resolution: Resolution,
    /// Explicit lower bound, overriding the incremental default.
    pub since: Option<DateTime<Utc>>,
    /// Explicit upper bound, overriding "now".
    pub until: Option<DateTime<Utc>>,
    /// Stop fetching once this many records are accumulated.
    pub max_records: Option<usize>,
    /// Database location.
    pub db_path: PathBuf,
}

/// What a completed run did.
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// Home the run collected for.
    pub home_id: String,
    /// Resolved lower bound of the window.
    pub since: DateTime<Utc>,
    /// Resolved upper bound of the window.
    pub until: DateTime<Utc>,
    /// Pages fetched from the source.
    pub pages: u32,
    /// Records fetched after clipping to the window.
    pub fetched: usize,
    /// Records written to the store.
    pub merged: usize,
    /// Records in the store after the run.
    pub total_stored: i64,
    /// Why the walk stopped.
    pub stop: StopReason,
}

/// Run a single incremental collection pass.
///
/// Aggregates are refreshed only when the merge wrote at least one record,
/// so a run that finds nothing new leaves the aggregate tables untouched.
///
/// # Errors
///
/// Returns [`WattError::TransportExhausted`] when the source stays
/// unreachable through all retries, [`WattError::NoHomeFound`] when the
/// account has no home to collect for, and
/// [`WattError::StorageUnavailable`] when the database cannot be opened or
/// written.
///
/// [`WattError::TransportExhausted`]: crate::error::WattError::TransportExhausted
/// [`WattError::NoHomeFound`]: crate::error::WattError::NoHomeFound
/// [`WattError::StorageUnavailable`]: crate::error::WattError::StorageUnavailable
pub async fn run(request: &CollectRequest, config: &EngineConfig) -> Result<RunSummary> {
    let transport = Transport::new(
        config.api_url.as_str(),
        request.token.as_str(),
        config.http_timeout(),
        config.retry_policy(),
    )?;

    let home_id = match &request.home_id {
        Some(id) => id.clone(),
        None => api::discover_home(&transport).await?.id,
    };

    let mut store = ConsumptionStore::open(&request.db_path)?;

    let high_water = store.high_water_mark()?;
    let range = range::resolve(
        request.since,
        request.until,
        high_water,
        config.lookback_days,
        Utc::now(),
    );

    tracing::info!(
        home_id = %home_id,
        since = %range.since,
        until = %range.until,
        resolution = %request.resolution,
        "starting collection"
    );

    let mut walker = PageWalker::new(&transport, &home_id, request.resolution)
        .with_page_size(config.page_size)
        .with_page_delay(config.page_delay());
    if let Some(cap) = request.max_records {
        walker = walker.with_max_records(cap);
    }

    let outcome = walker.walk(range).await?;

    let merged = store.merge(&outcome.records)?;
    if merged > 0 {
        store.refresh_aggregates()?;
    }

    let total_stored = store.record_count()?;

    let summary = RunSummary {
        home_id,
        since: range.since,
        until: range.until,
        pages: outcome.pages,
        fetched: outcome.records.len(),
        merged,
        total_stored,
        stop: outcome.stop,
    };

    tracing::info!(
        pages = summary.pages,
        fetched = summary.fetched,
        merged = summary.merged,
        total_stored = summary.total_stored,
        stop = summary.stop.as_str(),
        "collection finished"
    );

    Ok(summary)
}
