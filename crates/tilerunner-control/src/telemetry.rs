//! Logging initialisation.
//!
//! Call [`init_tracing`] once at process startup.
//!
//! # Environment variables
//!
//! | Variable | Effect |
//! |---|---|
//! | `RUST_LOG` | Log filter (default `"info"`).  `tilerunner::diagnostics=trace` shows every loop status line. |
//! | `TILERUNNER_LOG_FORMAT=json` | Emit newline-delimited JSON logs. |
//!
//! # Example
//!
//! ```rust,no_run
//! tilerunner_control::telemetry::init_tracing();
//! ```

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Environment variable selecting the log output format.
pub const LOG_FORMAT_VAR: &str = "TILERUNNER_LOG_FORMAT";

/// Output format of the global subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

impl LogFormat {
    /// Parse the value of [`LOG_FORMAT_VAR`]; anything but `json` is compact.
    pub fn from_env_value(value: Option<&str>) -> Self {
        match value {
            Some(v) if v.eq_ignore_ascii_case("json") => LogFormat::Json,
            _ => LogFormat::Compact,
        }
    }

    pub fn from_env() -> Self {
        Self::from_env_value(std::env::var(LOG_FORMAT_VAR).ok().as_deref())
    }
}

/// Initialise the global `tracing` subscriber.
///
/// A second call is ignored rather than panicking, so tests and embedders
/// may call it freely.
pub fn init_tracing() {
    let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    let result = match LogFormat::from_env() {
        LogFormat::Json => tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .try_init(),
        LogFormat::Compact => tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().compact())
            .try_init(),
    };

    if let Err(e) = result {
        eprintln!("[tilerunner] tracing already initialised: {e}");
    }
}
