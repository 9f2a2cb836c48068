//! GraphQL transport with bounded retries.
//!
//! Issues a single API call and hands back the decoded envelope. Knows
//! nothing about pagination or domain semantics; retry pacing comes from
//! the injected [`RetryPolicy`]. A success status is final even when the
//! envelope embeds partial GraphQL errors; those are logged and passed
//! through untouched.

use std::time::Duration;

use reqwest::{Client, ClientBuilder};
use serde::de::DeserializeOwned;

use super::retry::{FailureClass, RetryPolicy};
use super::types::GraphQlResponse;
use crate::error::{Result, WattError};

/// Build a configured HTTP client.
///
/// # Errors
///
/// Returns error if client construction fails.
pub fn build_client(timeout: Duration) -> Result<Client> {
    ClientBuilder::new()
        .timeout(timeout)
        .user_agent(format!("wattvault/{}", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| WattError::Other(anyhow::anyhow!("failed to build HTTP client: {e}")))
}

/// One attempt's failure, classified for the retry schedule.
struct AttemptFailure {
    class: FailureClass,
    message: String,
}

/// Executes GraphQL requests against a single endpoint.
pub struct Transport {
    client: Client,
    url: String,
    token: String,
    timeout: Duration,
    policy: RetryPolicy,
}

impl Transport {
    /// Create a transport for the given endpoint and credential.
    ///
    /// # Errors
    ///
    /// Returns error if the underlying HTTP client cannot be built.
    pub fn new(
        url: impl Into<String>,
        token: impl Into<String>,
        timeout: Duration,
        policy: RetryPolicy,
    ) -> Result<Self> {
        Ok(Self {
            client: build_client(timeout)?,
            url: url.into(),
            token: token.into(),
            timeout,
            policy,
        })
    }

    /// The endpoint this transport talks to.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Execute one query payload with bounded retries.
    ///
    /// HTTP 429/504 back off exponentially; other failures pause briefly;
    /// a success returns the envelope as-is, embedded errors included.
    ///
    /// # Errors
    ///
    /// Returns [`WattError::TransportExhausted`] with the last observed
    /// error once every attempt has failed.
    pub async fn execute<T: DeserializeOwned>(
        &self,
        payload: &serde_json::Value,
    ) -> Result<GraphQlResponse<T>> {
        let mut last_error = String::from("no attempts made");

        for attempt in 0..self.policy.max_attempts {
            match self.try_once::<T>(payload).await {
                Ok(envelope) => {
                    for entry in &envelope.errors {
                        tracing::warn!(
                            message = %entry.message,
                            "upstream embedded a GraphQL error in a successful response"
                        );
                    }
                    return Ok(envelope);
                }
                Err(failure) => {
                    last_error = failure.message;

                    match self.policy.delay_after(attempt, failure.class) {
                        Some(delay) => {
                            tracing::warn!(
                                attempt = attempt + 1,
                                max_attempts = self.policy.max_attempts,
                                error = %last_error,
                                delay_ms = delay.as_millis() as u64,
                                "request failed, retrying"
                            );
                            tokio::time::sleep(delay).await;
                        }
                        None => break,
                    }
                }
            }
        }

        Err(WattError::TransportExhausted {
            attempts: self.policy.max_attempts,
            last_error,
        })
    }

    async fn try_once<T: DeserializeOwned>(
        &self,
        payload: &serde_json::Value,
    ) -> std::result::Result<GraphQlResponse<T>, AttemptFailure> {
        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.token)
            .json(payload)
            .send()
            .await
            .map_err(|e| AttemptFailure {
                class: FailureClass::Transient,
                message: if e.is_timeout() {
                    format!("request timed out after {}s", self.timeout.as_secs())
                } else {
                    e.to_string()
                },
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(AttemptFailure {
                class: FailureClass::from_status(status),
                message: format!("HTTP {} from {}", status, self.url),
            });
        }

        response.json().await.map_err(|e| AttemptFailure {
            class: FailureClass::Transient,
            message: format!("failed to decode response body: {e}"),
        })
    }
}
