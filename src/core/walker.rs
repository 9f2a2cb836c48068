//! Reverse-chronological pagination.
//!
//! Drives repeated transport calls following the source's cursor
//! protocol: a tail fetch for the newest records first, then forward
//! cursor pages that return strictly older data, until the resolved
//! window's lower bound is reached or the source runs dry. The whole
//! result is buffered before storage is touched, so a failed walk merges
//! nothing.

use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::api::{self, ConsumptionPage, PageRequest, Transport};
use crate::core::models::{ConsumptionRecord, Resolution};
use crate::core::range::FetchRange;
use crate::error::{Result, WattError};

/// Why the walk stopped issuing page requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// A page reached below the window's lower bound.
    RangeSatisfied,
    /// The source ran out of data (empty page or no continuation).
    Exhausted,
    /// The record cap was reached before the source ran dry.
    CapReached,
    /// A malformed page truncated the walk; earlier pages are kept.
    Truncated,
}

impl StopReason {
    /// Stable lowercase label for logs and run summaries.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::RangeSatisfied => "range satisfied",
            Self::Exhausted => "source exhausted",
            Self::CapReached => "record cap reached",
            Self::Truncated => "truncated",
        }
    }
}

/// Walk state between page requests.
#[derive(Debug)]
enum WalkState {
    /// Issue the described request next.
    Fetching(PageRequest),
    /// Terminal: the walk stopped for the given reason.
    Done(StopReason),
    /// Terminal: the walk failed and the run must abort.
    Failed(WattError),
}

/// Decision for one fetched page, evaluated in stop-condition order.
#[derive(Debug, Clone, PartialEq, Eq)]
enum PageVerdict {
    /// No more data at the source: keep the page, stop.
    Exhausted,
    /// The page crossed `since`: keep only records inside, stop.
    RangeSatisfied,
    /// Keep the page, continue from this cursor.
    Continue { cursor: String },
}

/// Evaluate a fetched page against the window's lower bound.
///
/// Order matters: an empty page wins over everything; a page that crosses
/// `since` stops the walk even when the source advertises more pages,
/// because advancing the cursor only yields older records.
fn page_verdict(page: &ConsumptionPage, since: DateTime<Utc>) -> PageVerdict {
    if page.records.is_empty() {
        return PageVerdict::Exhausted;
    }

    let oldest = page.records.iter().map(|r| r.from_time).min();
    if oldest.is_some_and(|t| t < since) {
        return PageVerdict::RangeSatisfied;
    }

    if !page.has_next_page {
        return PageVerdict::Exhausted;
    }

    // A continuation flag without a cursor is a protocol violation; treat
    // the source as exhausted rather than looping on a broken page.
    match &page.end_cursor {
        Some(cursor) => PageVerdict::Continue {
            cursor: cursor.clone(),
        },
        None => PageVerdict::Exhausted,
    }
}

/// Everything a completed walk produced.
#[derive(Debug)]
pub struct WalkOutcome {
    pub records: Vec<ConsumptionRecord>,
    pub pages: u32,
    pub stop: StopReason,
}

/// Walks the paginated consumption endpoint for one home.
pub struct PageWalker<'a> {
    transport: &'a Transport,
    home_id: &'a str,
    resolution: Resolution,
    page_size: u32,
    page_delay: Duration,
    max_records: Option<usize>,
}

impl<'a> PageWalker<'a> {
    /// Create a walker with default paging behavior.
    #[must_use]
    pub const fn new(transport: &'a Transport, home_id: &'a str, resolution: Resolution) -> Self {
        Self {
            transport,
            home_id,
            resolution,
            page_size: 1000,
            page_delay: Duration::from_millis(300),
            max_records: None,
        }
    }

    /// Records requested per page.
    #[must_use]
    pub const fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size;
        self
    }

    /// Courtesy pause between page requests.
    #[must_use]
    pub const fn with_page_delay(mut self, delay: Duration) -> Self {
        self.page_delay = delay;
        self
    }

    /// Stop issuing requests once this many records are accumulated.
    #[must_use]
    pub const fn with_max_records(mut self, cap: usize) -> Self {
        self.max_records = Some(cap);
        self
    }

    /// Walk the source until the window is satisfied or the source is
    /// exhausted, returning the records clipped to `[since, until]`.
    ///
    /// # Errors
    ///
    /// Propagates [`WattError::TransportExhausted`]; a malformed page is
    /// absorbed as a truncating stop instead, preserving earlier pages.
    pub async fn walk(&self, range: FetchRange) -> Result<WalkOutcome> {
        let mut records: Vec<ConsumptionRecord> = Vec::new();
        let mut pages: u32 = 0;
        let mut state = WalkState::Fetching(PageRequest::Tail {
            last: self.page_size,
        });

        let stop = loop {
            match state {
                WalkState::Fetching(request) => {
                    if self.max_records.is_some_and(|cap| records.len() >= cap) {
                        tracing::info!(
                            total = records.len(),
                            cap = self.max_records,
                            "record cap reached, not requesting further pages"
                        );
                        state = WalkState::Done(StopReason::CapReached);
                        continue;
                    }

                    if pages > 0 {
                        tokio::time::sleep(self.page_delay).await;
                    }

                    state = match api::fetch_consumption_page(
                        self.transport,
                        self.home_id,
                        self.resolution,
                        &request,
                    )
                    .await
                    {
                        Ok(page) => {
                            pages += 1;
                            self.absorb(page, &mut records, pages, range.since)
                        }
                        Err(e) if e.is_recoverable() => {
                            tracing::warn!(
                                error = %e,
                                pages,
                                total = records.len(),
                                "pagination truncated by malformed response, keeping partial progress"
                            );
                            WalkState::Done(StopReason::Truncated)
                        }
                        Err(e) => WalkState::Failed(e),
                    };
                }
                WalkState::Done(reason) => break reason,
                WalkState::Failed(e) => return Err(e),
            }
        };

        // Defensive clip against source skew: nothing outside the window
        // survives, whatever the pages contained.
        records.retain(|r| r.from_time >= range.since && r.from_time <= range.until);

        tracing::debug!(
            records = records.len(),
            pages,
            stop = ?stop,
            "pagination finished"
        );

        Ok(WalkOutcome {
            records,
            pages,
            stop,
        })
    }

    /// Fold one fetched page into the accumulator and pick the next state.
    fn absorb(
        &self,
        page: ConsumptionPage,
        records: &mut Vec<ConsumptionRecord>,
        page_number: u32,
        since: DateTime<Utc>,
    ) -> WalkState {
        let fetched = page.records.len();
        let verdict = page_verdict(&page, since);

        let next = match verdict {
            PageVerdict::Exhausted => {
                records.extend(page.records);
                WalkState::Done(StopReason::Exhausted)
            }
            PageVerdict::RangeSatisfied => {
                records.extend(page.records.into_iter().filter(|r| r.from_time >= since));
                WalkState::Done(StopReason::RangeSatisfied)
            }
            PageVerdict::Continue { cursor } => {
                records.extend(page.records);
                WalkState::Fetching(PageRequest::Forward {
                    first: self.page_size,
                    after: cursor,
                })
            }
        };

        tracing::info!(
            page = page_number,
            fetched,
            total = records.len(),
            "fetched page"
        );

        next
    }
}
