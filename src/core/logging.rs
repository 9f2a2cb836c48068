//! Structured logging to stderr or a file.
//!
//! The collector's only interactive output is its progress log, so the
//! default level is `info`; `--verbose` or `WATTVAULT_LOG` lower it
//! further. JSON format is for machine consumption (cron, alerting).

use std::fs::OpenOptions;
use std::path::PathBuf;

use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::writer::BoxMakeWriter;

const LOG_LEVEL_ENV: &str = "WATTVAULT_LOG";
const LOG_FORMAT_ENV: &str = "WATTVAULT_LOG_FORMAT";
const LOG_FILE_ENV: &str = "WATTVAULT_LOG_FILE";

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable logs.
    #[default]
    Human,
    /// JSON logs (one event per line).
    Json,
}

impl LogFormat {
    /// Parse from a flag or env value, case-insensitive.
    #[must_use]
    pub fn from_arg(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "human" | "text" => Some(Self::Human),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Log verbosity threshold.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Parse from a flag or env value, case-insensitive.
    #[must_use]
    pub fn from_arg(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "trace" => Some(Self::Trace),
            "verbose" | "debug" => Some(Self::Debug),
            "info" => Some(Self::Info),
            "warn" | "warning" => Some(Self::Warn),
            "error" => Some(Self::Error),
            _ => None,
        }
    }

    /// The directive this level contributes to the env filter.
    #[must_use]
    pub const fn as_filter(self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

fn env_value(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Log level from the `WATTVAULT_LOG` env var, when set and recognized.
#[must_use]
pub fn level_from_env() -> Option<LogLevel> {
    env_value(LOG_LEVEL_ENV).and_then(|value| LogLevel::from_arg(&value))
}

/// Log format from the `WATTVAULT_LOG_FORMAT` env var, when set and recognized.
#[must_use]
pub fn format_from_env() -> Option<LogFormat> {
    env_value(LOG_FORMAT_ENV).and_then(|value| LogFormat::from_arg(&value))
}

/// Log file path from the `WATTVAULT_LOG_FILE` env var, when set.
#[must_use]
pub fn log_file_from_env() -> Option<PathBuf> {
    env_value(LOG_FILE_ENV).map(PathBuf::from)
}

/// Initialize the global subscriber.
///
/// `RUST_LOG` wins when set; otherwise only this crate logs, at the
/// resolved level. An unwritable log file falls back to stderr rather
/// than silencing the run.
pub fn init(level: LogLevel, format: LogFormat, log_file: Option<PathBuf>, verbose: bool) {
    let level = if verbose && matches!(level, LogLevel::Info) {
        LogLevel::Debug
    } else {
        level
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("wattvault={}", level.as_filter())));

    let writer = log_file
        .and_then(|path| {
            OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .ok()
        })
        .map_or_else(
            || BoxMakeWriter::new(std::io::stderr),
            BoxMakeWriter::new,
        );

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer);

    match format {
        LogFormat::Json => {
            builder.json().try_init().ok();
        }
        LogFormat::Human => {
            builder.with_target(false).without_time().try_init().ok();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    static ENV_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());

    #[allow(unsafe_code)]
    fn with_env_var(key: &str, value: &str, f: impl FnOnce()) {
        let _guard = ENV_LOCK.lock().unwrap();
        let prior = std::env::var(key).ok();
        unsafe {
            std::env::set_var(key, value);
        }
        f();
        match prior {
            Some(val) => unsafe {
                std::env::set_var(key, val);
            },
            None => unsafe {
                std::env::remove_var(key);
            },
        }
    }

    #[test]
    fn level_env_var_parses() {
        with_env_var(LOG_LEVEL_ENV, "trace", || {
            assert_eq!(level_from_env(), Some(LogLevel::Trace));
        });

        with_env_var(LOG_LEVEL_ENV, "WARN", || {
            assert_eq!(level_from_env(), Some(LogLevel::Warn));
        });

        with_env_var(LOG_LEVEL_ENV, "shout", || {
            assert_eq!(level_from_env(), None);
        });
    }

    #[test]
    fn format_env_var_parses() {
        with_env_var(LOG_FORMAT_ENV, "json", || {
            assert_eq!(format_from_env(), Some(LogFormat::Json));
        });

        with_env_var(LOG_FORMAT_ENV, "", || {
            assert_eq!(format_from_env(), None);
        });
    }

    #[test]
    fn default_level_is_info() {
        assert_eq!(LogLevel::default(), LogLevel::Info);
    }
}
