//! Error types for wattvault.
//!
//! Uses `thiserror` for structured error types that map to exit codes.
//!
//! ## Error Taxonomy
//!
//! - **Network**: the upstream API stayed unreachable through every retry
//! - **Api**: the upstream answered with a payload we do not recognize
//! - **Account**: the account has no home to collect for
//! - **Storage**: the SQLite store cannot be opened or written
//! - **Configuration**: bad flags, bad timestamps, bad config file
//! - **Internal**: unexpected errors, bugs, or unclassified issues
//!
//! Each error has a stable error code (e.g., `WATT-N001`) for programmatic
//! handling. Transient HTTP conditions are retried inside the transport and
//! never surface here; anything that does surface aborts the run before any
//! partial aggregate state can be written. The one exception is
//! [`WattError::UnexpectedResponseShape`], which the pagination walker
//! catches to truncate the walk while preserving accumulated records.

use thiserror::Error;

// =============================================================================
// Error Categories
// =============================================================================

/// High-level error categories for classification and routing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Network issues (retries exhausted against the upstream API).
    Network,
    /// Upstream payload issues (missing fields, unrecognized envelope).
    Api,
    /// Account issues (no home available to collect for).
    Account,
    /// Storage issues (open, migrate, read, or write failures).
    Storage,
    /// Configuration issues (flags, timestamps, config file).
    Configuration,
    /// Internal errors (bugs, unexpected state, unclassified).
    Internal,
}

impl ErrorCategory {
    /// Returns a human-readable description of the category.
    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            Self::Network => "Network error",
            Self::Api => "API error",
            Self::Account => "Account error",
            Self::Storage => "Storage error",
            Self::Configuration => "Configuration error",
            Self::Internal => "Internal error",
        }
    }

    /// Returns a short code prefix for this category.
    #[must_use]
    pub const fn code_prefix(&self) -> &'static str {
        match self {
            Self::Network => "N",
            Self::Api => "A",
            Self::Account => "H",
            Self::Storage => "S",
            Self::Configuration => "C",
            Self::Internal => "X",
        }
    }
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.description())
    }
}

// =============================================================================
// Exit Codes
// =============================================================================

/// Process exit codes for fatal collector failures.
///
/// Stable so that cron wrappers and alerting can distinguish "the API was
/// down" from "the database is broken" without parsing log output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ExitCode {
    /// Success
    Success = 0,
    /// Unexpected failure
    GeneralError = 1,
    /// Every transport attempt failed
    TransportExhausted = 2,
    /// Account has no home to collect for
    NoHomeFound = 3,
    /// Store could not be opened or written
    StorageError = 4,
    /// Bad flags, timestamps, or config file
    ConfigError = 5,
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code as i32
    }
}

/// Main error type for wattvault operations.
///
/// Each variant has:
/// - A stable error code (e.g., `WATT-N001`)
/// - A category for classification
/// - An exit code for the process boundary
#[derive(Error, Debug)]
pub enum WattError {
    // ==========================================================================
    // Network errors (Category: Network)
    // ==========================================================================
    /// Every transport attempt failed; carries the last observed error.
    #[error("transport exhausted after {attempts} attempts: {last_error}")]
    TransportExhausted {
        attempts: u32,
        last_error: String,
    },

    // ==========================================================================
    // API errors (Category: Api)
    // ==========================================================================
    /// The response decoded but is missing fields the protocol promises.
    ///
    /// Recoverable: the pagination walker stops early and keeps what it has.
    #[error("unexpected response shape: {0}")]
    UnexpectedResponseShape(String),

    // ==========================================================================
    // Account errors (Category: Account)
    // ==========================================================================
    /// The account exposes no homes, so there is nothing to collect.
    #[error("no homes found in the account")]
    NoHomeFound,

    // ==========================================================================
    // Storage errors (Category: Storage)
    // ==========================================================================
    /// The SQLite store failed to open, migrate, read, or write.
    #[error("storage unavailable: {source}")]
    StorageUnavailable {
        #[from]
        source: rusqlite::Error,
    },

    // ==========================================================================
    // Configuration errors (Category: Configuration)
    // ==========================================================================
    /// Generic configuration error (bad flag combinations, missing values).
    #[error("configuration error: {0}")]
    Config(String),

    /// Error parsing the engine config file.
    #[error("config parse error at {path}: {message}")]
    ConfigParse {
        path: String,
        message: String,
    },

    /// A `--since`/`--until` value that is not ISO-8601.
    #[error("invalid timestamp '{value}': expected ISO-8601, e.g. 2024-03-10T00:00:00Z")]
    InvalidTimestamp {
        value: String,
    },

    // ==========================================================================
    // I/O errors (Category: Internal)
    // ==========================================================================
    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // ==========================================================================
    // Generic wrapper (Category: Internal)
    // ==========================================================================
    /// Catch-all for other errors.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl WattError {
    /// Map error to the process exit code.
    #[must_use]
    pub const fn exit_code(&self) -> ExitCode {
        match self {
            Self::TransportExhausted { .. } => ExitCode::TransportExhausted,

            Self::NoHomeFound => ExitCode::NoHomeFound,

            Self::StorageUnavailable { .. } => ExitCode::StorageError,

            Self::Config(_)
            | Self::ConfigParse { .. }
            | Self::InvalidTimestamp { .. } => ExitCode::ConfigError,

            // Shape trouble that escapes the walker, plus everything else
            Self::UnexpectedResponseShape(_)
            | Self::Io(_)
            | Self::Json(_)
            | Self::Other(_) => ExitCode::GeneralError,
        }
    }

    /// Returns the error category for classification and routing.
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::TransportExhausted { .. } => ErrorCategory::Network,

            Self::UnexpectedResponseShape(_) => ErrorCategory::Api,

            Self::NoHomeFound => ErrorCategory::Account,

            Self::StorageUnavailable { .. } => ErrorCategory::Storage,

            Self::Config(_)
            | Self::ConfigParse { .. }
            | Self::InvalidTimestamp { .. } => ErrorCategory::Configuration,

            Self::Io(_)
            | Self::Json(_)
            | Self::Other(_) => ErrorCategory::Internal,
        }
    }

    /// Returns a stable error code for programmatic handling.
    ///
    /// Format: `WATT-{category}{number}` where the category letter comes
    /// from [`ErrorCategory::code_prefix`].
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::TransportExhausted { .. } => "WATT-N001",

            Self::UnexpectedResponseShape(_) => "WATT-A001",

            Self::NoHomeFound => "WATT-H001",

            Self::StorageUnavailable { .. } => "WATT-S001",

            Self::Config(_) => "WATT-C001",
            Self::ConfigParse { .. } => "WATT-C002",
            Self::InvalidTimestamp { .. } => "WATT-C003",

            Self::Io(_) => "WATT-X001",
            Self::Json(_) => "WATT-X002",
            Self::Other(_) => "WATT-X099",
        }
    }

    /// Whether the pagination walker may absorb this error and keep the
    /// records accumulated so far. Only payload-shape trouble qualifies;
    /// everything else aborts the run.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::UnexpectedResponseShape(_))
    }
}

/// Convenience result type for wattvault operations.
pub type Result<T> = std::result::Result<T, WattError>;
