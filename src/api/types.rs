//! Wire types for the upstream GraphQL API.
//!
//! Every level of the envelope is optional so that a syntactically valid
//! but structurally wrong payload decodes instead of erroring; extraction
//! then reports precisely which field was missing. The pagination walker
//! relies on that to keep partial progress when the source misbehaves.

use serde::Deserialize;

use crate::core::models::ConsumptionRecord;
use crate::error::{Result, WattError};
use crate::util::time::parse_utc;

// =============================================================================
// Envelope
// =============================================================================

/// Top-level GraphQL response envelope.
///
/// `errors` may accompany `data`; embedded errors are surfaced in logs but
/// do not fail the request.
#[derive(Debug, Clone, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct GraphQlResponse<T> {
    #[serde(default)]
    pub data: Option<T>,
    #[serde(default)]
    pub errors: Vec<ApiErrorEntry>,
}

/// One entry of a GraphQL `errors` array.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorEntry {
    #[serde(default)]
    pub message: String,
}

// =============================================================================
// Consumption query payload
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct ConsumptionData {
    #[serde(default)]
    pub viewer: Option<ConsumptionViewer>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConsumptionViewer {
    #[serde(default)]
    pub home: Option<ConsumptionHome>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConsumptionHome {
    #[serde(default)]
    pub consumption: Option<ConsumptionConnection>,
}

/// The paginated connection: edges plus cursor bookkeeping.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsumptionConnection {
    #[serde(default)]
    pub page_info: Option<PageInfo>,
    #[serde(default)]
    pub edges: Option<Vec<ConsumptionEdge>>,
}

/// Continuation marker for cursor pagination.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    #[serde(default)]
    pub has_next_page: bool,
    #[serde(default)]
    pub end_cursor: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConsumptionEdge {
    #[serde(default)]
    pub node: Option<ConsumptionNode>,
}

/// One metered interval as the API reports it.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsumptionNode {
    #[serde(default)]
    pub from: Option<String>,
    #[serde(default)]
    pub to: Option<String>,
    #[serde(default)]
    pub consumption: Option<f64>,
    #[serde(default)]
    pub consumption_unit: Option<String>,
    #[serde(default)]
    pub cost: Option<f64>,
    #[serde(default)]
    pub unit_price: Option<f64>,
    // The API spells this one with VAT fully capitalized.
    #[serde(default, rename = "unitPriceVAT")]
    pub unit_price_vat: Option<f64>,
    #[serde(default)]
    pub currency: Option<String>,
}

impl ConsumptionNode {
    /// Convert the wire node into a storage record.
    ///
    /// # Errors
    ///
    /// Returns [`WattError::UnexpectedResponseShape`] when the interval
    /// bounds are absent or not ISO-8601.
    pub fn into_record(self) -> Result<ConsumptionRecord> {
        let from_raw = self
            .from
            .ok_or_else(|| WattError::UnexpectedResponseShape("edge missing 'from'".to_string()))?;
        let to_raw = self
            .to
            .ok_or_else(|| WattError::UnexpectedResponseShape("edge missing 'to'".to_string()))?;

        let from_time = parse_utc(&from_raw).map_err(|_| {
            WattError::UnexpectedResponseShape(format!("unparseable 'from' timestamp: {from_raw}"))
        })?;
        let to_time = parse_utc(&to_raw).map_err(|_| {
            WattError::UnexpectedResponseShape(format!("unparseable 'to' timestamp: {to_raw}"))
        })?;

        Ok(ConsumptionRecord {
            from_time,
            to_time,
            consumption: self.consumption,
            consumption_unit: self.consumption_unit,
            cost: self.cost,
            unit_price: self.unit_price,
            unit_price_vat: self.unit_price_vat,
            currency: self.currency,
        })
    }
}

// =============================================================================
// Decoded page
// =============================================================================

/// How a page of consumption data is requested.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageRequest {
    /// First request of a run: the newest `last` records.
    Tail { last: u32 },
    /// Subsequent requests: `first` records after the given cursor.
    Forward { first: u32, after: String },
}

/// One fully decoded page, ready for the walker.
#[derive(Debug, Clone)]
pub struct ConsumptionPage {
    pub records: Vec<ConsumptionRecord>,
    pub has_next_page: bool,
    pub end_cursor: Option<String>,
}

impl GraphQlResponse<ConsumptionData> {
    /// Extract the page from the envelope.
    ///
    /// # Errors
    ///
    /// Returns [`WattError::UnexpectedResponseShape`] naming the first
    /// missing level; the walker converts that into a truncating stop.
    pub fn into_page(self) -> Result<ConsumptionPage> {
        let connection = self
            .data
            .ok_or_else(shape_error("data"))?
            .viewer
            .ok_or_else(shape_error("viewer"))?
            .home
            .ok_or_else(shape_error("home"))?
            .consumption
            .ok_or_else(shape_error("consumption"))?;

        let page_info = connection.page_info.ok_or_else(shape_error("pageInfo"))?;
        let edges = connection.edges.ok_or_else(shape_error("edges"))?;

        let mut records = Vec::with_capacity(edges.len());
        for edge in edges {
            let node = edge.node.ok_or_else(shape_error("edge node"))?;
            records.push(node.into_record()?);
        }

        Ok(ConsumptionPage {
            records,
            has_next_page: page_info.has_next_page,
            end_cursor: page_info.end_cursor,
        })
    }
}

fn shape_error(field: &'static str) -> impl Fn() -> WattError {
    move || WattError::UnexpectedResponseShape(format!("response missing '{field}'"))
}

// =============================================================================
// Homes query payload
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct HomesData {
    #[serde(default)]
    pub viewer: Option<HomesViewer>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HomesViewer {
    #[serde(default)]
    pub homes: Option<Vec<Home>>,
}

/// One home attached to the account.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Home {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub app_nickname: Option<String>,
    #[serde(default)]
    pub address: Option<HomeAddress>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct HomeAddress {
    #[serde(default)]
    pub address1: Option<String>,
}
