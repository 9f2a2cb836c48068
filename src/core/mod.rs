//! Core engine: configuration, range resolution, pagination, collection.

pub mod collector;
pub mod config;
pub mod logging;
pub mod models;
pub mod range;
pub mod walker;

pub use collector::{CollectRequest, RunSummary};
pub use config::{DEFAULT_API_URL, EngineConfig, RetrySettings};
pub use models::{ConsumptionRecord, DailyAggregate, MonthlyAggregate, Resolution};
pub use range::FetchRange;
pub use walker::{PageWalker, StopReason, WalkOutcome};
