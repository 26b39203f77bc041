//! Logging setup shared by the Pagecast binaries
//!
//! Both binaries initialize logging the same way: the format and level come
//! from `PAGECAST_LOG_FORMAT` and `PAGECAST_LOG_LEVEL`, and the `--verbose`
//! flag forces the level to `debug`. `RUST_LOG` still wins when set, so
//! per-module filters work as usual.
//!
//! # Examples
//!
//! ```no_run
//! use libpagecast::logging::LoggingConfig;
//!
//! LoggingConfig::from_env(false).init();
//! ```

use std::str::FromStr;

use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable text output (no colors, for cron mail and piping)
    Text,
    /// Machine-parseable JSON (one JSON object per line)
    Json,
    /// Pretty-printed with colors (for development)
    Pretty,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            "pretty" => Ok(LogFormat::Pretty),
            _ => Err(format!(
                "Invalid log format: '{}'. Valid options: text, json, pretty",
                s
            )),
        }
    }
}

impl std::fmt::Display for LogFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogFormat::Text => write!(f, "text"),
            LogFormat::Json => write!(f, "json"),
            LogFormat::Pretty => write!(f, "pretty"),
        }
    }
}

/// Resolved logging settings for one process
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    pub format: LogFormat,
    pub level: String,
}

impl LoggingConfig {
    /// Resolve logging settings from the environment and the `--verbose`
    /// flag.
    ///
    /// `PAGECAST_LOG_FORMAT` selects the format (unparsable values fall back
    /// to text). The level is `debug` when `verbose` is set, otherwise
    /// `PAGECAST_LOG_LEVEL`, otherwise `info`.
    pub fn from_env(verbose: bool) -> Self {
        let format = std::env::var("PAGECAST_LOG_FORMAT")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(LogFormat::Text);

        let level = if verbose {
            "debug".to_string()
        } else {
            std::env::var("PAGECAST_LOG_LEVEL").unwrap_or_else(|_| "info".to_string())
        };

        Self { format, level }
    }

    /// Install the global subscriber.
    ///
    /// # Panics
    ///
    /// Panics if a subscriber has already been initialized in this process.
    pub fn init(self) {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.level));
        let builder = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr);

        match self.format {
            LogFormat::Json => builder
                .json()
                .flatten_event(true)
                .with_current_span(true)
                .with_span_list(true)
                .init(),
            LogFormat::Pretty => builder.pretty().init(),
            LogFormat::Text => builder.with_target(false).init(),
        }
    }
}
