//! Engine configuration.
//!
//! All tunables the collection engine consumes live here, constructed once
//! at startup and passed in explicitly. Business logic never reads the
//! process environment; env fallbacks are handled at the CLI boundary.
//!
//! ## Precedence
//!
//! 1. Values from the TOML file named by `--config`/`WATTVAULT_CONFIG`
//! 2. Built-in defaults
//!
//! Credentials and the target home never come from the config file; those
//! are flags/env only.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::api::retry::RetryPolicy;
use crate::error::{Result, WattError};

/// Default upstream GraphQL endpoint.
pub const DEFAULT_API_URL: &str = "https://api.tibber.com/v1-beta/gql";

/// Tunables for the collection engine.
///
/// Missing keys in the config file fall back to these defaults, so a file
/// overriding a single knob stays a one-liner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Upstream GraphQL endpoint URL.
    pub api_url: String,
    /// Records requested per page.
    pub page_size: u32,
    /// Courtesy pause between page requests, in milliseconds.
    pub page_delay_ms: u64,
    /// Per-request HTTP timeout, in seconds.
    pub http_timeout_secs: u64,
    /// Window size when the store is empty, in days.
    pub lookback_days: i64,
    /// Retry behavior for individual requests.
    pub retry: RetrySettings,
}

/// Retry knobs, converted into a [`RetryPolicy`] for the transport.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RetrySettings {
    /// Attempts per request before giving up.
    pub max_attempts: u32,
    /// Base for the exponential schedule on rate-limit/gateway-timeout, ms.
    pub backoff_base_ms: u64,
    /// Fixed pause for other retryable failures, ms.
    pub flat_delay_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            page_size: 1000,
            page_delay_ms: 300,
            http_timeout_secs: 60,
            lookback_days: 90,
            retry: RetrySettings::default(),
        }
    }
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff_base_ms: 1000,
            flat_delay_ms: 1000,
        }
    }
}

impl EngineConfig {
    /// Load configuration, overlaying the file at `path` when given.
    ///
    /// # Errors
    ///
    /// Returns [`WattError::ConfigParse`] when the file cannot be read or
    /// is not valid TOML, and [`WattError::Config`] when a value fails
    /// validation.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            None => Self::default(),
            Some(path) => {
                let raw = fs::read_to_string(path).map_err(|e| WattError::ConfigParse {
                    path: path.display().to_string(),
                    message: e.to_string(),
                })?;
                toml::from_str(&raw).map_err(|e| WattError::ConfigParse {
                    path: path.display().to_string(),
                    message: e.to_string(),
                })?
            }
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate value ranges.
    ///
    /// # Errors
    ///
    /// Returns [`WattError::Config`] describing the first bad value.
    pub fn validate(&self) -> Result<()> {
        if self.api_url.is_empty() {
            return Err(WattError::Config("api_url must not be empty".to_string()));
        }
        if self.page_size == 0 {
            return Err(WattError::Config("page_size must be at least 1".to_string()));
        }
        if self.lookback_days <= 0 {
            return Err(WattError::Config(
                "lookback_days must be at least 1".to_string(),
            ));
        }
        if self.retry.max_attempts == 0 {
            return Err(WattError::Config(
                "retry.max_attempts must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Per-request HTTP timeout.
    #[must_use]
    pub const fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    /// Courtesy pause between page requests.
    #[must_use]
    pub const fn page_delay(&self) -> Duration {
        Duration::from_millis(self.page_delay_ms)
    }

    /// The retry policy the transport should apply.
    #[must_use]
    pub const fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.retry.max_attempts,
            backoff_base: Duration::from_millis(self.retry.backoff_base_ms),
            flat_delay: Duration::from_millis(self.retry.flat_delay_ms),
        }
    }
}
