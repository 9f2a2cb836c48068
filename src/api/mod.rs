//! Upstream API integration.
//!
//! Query construction, the retrying transport, and account home
//! discovery. The consumption query is issued in two forms: a tail fetch
//! (`last: N`) for the first page of a run, then forward cursor pages
//! (`first: N, after: <cursor>`), because the source only walks forward
//! from a cursor while the collector wants the newest data first.

pub mod retry;
pub mod transport;
pub mod types;

pub use transport::Transport;
pub use types::{ConsumptionPage, PageRequest};

use serde_json::json;

use crate::core::models::Resolution;
use crate::error::{Result, WattError};
use types::{ConsumptionData, GraphQlResponse, HomesData};

const CONSUMPTION_QUERY: &str = "\
query ($homeId: ID!, $resolution: EnergyResolution!, $first: Int, $after: String, $last: Int) {
  viewer {
    home(id: $homeId) {
      consumption(resolution: $resolution, first: $first, after: $after, last: $last) {
        pageInfo { hasNextPage endCursor }
        edges {
          node { from to consumption consumptionUnit cost unitPrice unitPriceVAT currency }
        }
      }
    }
  }
}";

const HOMES_QUERY: &str = "\
{
  viewer {
    homes {
      id
      appNickname
      address { address1 }
    }
  }
}";

/// Build the payload for one consumption page.
#[must_use]
pub fn consumption_payload(
    home_id: &str,
    resolution: Resolution,
    page: &PageRequest,
) -> serde_json::Value {
    let mut variables = json!({
        "homeId": home_id,
        "resolution": resolution.api_name(),
    });
    match page {
        PageRequest::Tail { last } => {
            variables["last"] = (*last).into();
        }
        PageRequest::Forward { first, after } => {
            variables["first"] = (*first).into();
            variables["after"] = after.as_str().into();
        }
    }
    json!({ "query": CONSUMPTION_QUERY, "variables": variables })
}

/// Build the payload listing the account's homes.
#[must_use]
pub fn homes_payload() -> serde_json::Value {
    json!({ "query": HOMES_QUERY })
}

/// Fetch and decode one page of consumption data.
///
/// # Errors
///
/// Propagates [`WattError::TransportExhausted`] from the transport and
/// [`WattError::UnexpectedResponseShape`] from envelope extraction.
pub async fn fetch_consumption_page(
    transport: &Transport,
    home_id: &str,
    resolution: Resolution,
    page: &PageRequest,
) -> Result<ConsumptionPage> {
    let payload = consumption_payload(home_id, resolution, page);
    let envelope: GraphQlResponse<ConsumptionData> = transport.execute(&payload).await?;
    envelope.into_page()
}

/// A home resolved for collection, id guaranteed present.
#[derive(Debug, Clone)]
pub struct DiscoveredHome {
    pub id: String,
    pub nickname: Option<String>,
    pub address: Option<String>,
}

/// Look up the account's homes and pick the first one.
///
/// # Errors
///
/// Returns [`WattError::NoHomeFound`] when the account has no homes, and
/// [`WattError::UnexpectedResponseShape`] when the response is missing
/// the homes list or the chosen home has no id.
pub async fn discover_home(transport: &Transport) -> Result<DiscoveredHome> {
    let envelope: GraphQlResponse<HomesData> = transport.execute(&homes_payload()).await?;
    let homes = envelope
        .data
        .and_then(|d| d.viewer)
        .and_then(|v| v.homes)
        .ok_or_else(|| WattError::UnexpectedResponseShape("response missing 'homes'".to_string()))?;

    if homes.len() > 1 {
        tracing::info!(count = homes.len(), "multiple homes found, using the first one");
    }

    let home = homes.into_iter().next().ok_or(WattError::NoHomeFound)?;
    let id = home
        .id
        .ok_or_else(|| WattError::UnexpectedResponseShape("home missing 'id'".to_string()))?;
    let address = home.address.and_then(|a| a.address1);

    tracing::info!(
        home_id = %id,
        nickname = home.app_nickname.as_deref().unwrap_or("-"),
        address = address.as_deref().unwrap_or("-"),
        "discovered home"
    );

    Ok(DiscoveredHome {
        id,
        nickname: home.app_nickname,
        address,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tail_payload_carries_last_only() {
        let payload = consumption_payload("home-1", Resolution::Hourly, &PageRequest::Tail {
            last: 1000,
        });
        let vars = &payload["variables"];
        assert_eq!(vars["homeId"], "home-1");
        assert_eq!(vars["resolution"], "HOURLY");
        assert_eq!(vars["last"], 1000);
        assert!(vars.get("after").is_none());
        assert!(vars.get("first").is_none());
    }

    #[test]
    fn forward_payload_carries_cursor() {
        let payload = consumption_payload("home-1", Resolution::Daily, &PageRequest::Forward {
            first: 500,
            after: "cursor-xyz".to_string(),
        });
        let vars = &payload["variables"];
        assert_eq!(vars["resolution"], "DAILY");
        assert_eq!(vars["first"], 500);
        assert_eq!(vars["after"], "cursor-xyz");
        assert!(vars.get("last").is_none());
    }

    #[test]
    fn consumption_query_asks_for_every_record_field() {
        for field in [
            "from",
            "to",
            "consumption",
            "consumptionUnit",
            "cost",
            "unitPrice",
            "unitPriceVAT",
            "currency",
            "hasNextPage",
            "endCursor",
        ] {
            assert!(
                CONSUMPTION_QUERY.contains(field),
                "query missing field {field}"
            );
        }
    }

    #[test]
    fn homes_payload_is_a_bare_query() {
        let payload = homes_payload();
        assert!(payload["query"].as_str().unwrap().contains("appNickname"));
        assert!(payload.get("variables").is_none());
    }
}
