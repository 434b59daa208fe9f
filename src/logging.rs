//! Logging setup
//!
//! The library only emits `tracing` events. Binaries build a [`Dispatch`]
//! here and hand it to the compiler or scope it around their own work; no
//! global subscriber is installed.

use std::io::IsTerminal;

use serde::{Deserialize, Serialize};
use tracing::Dispatch;
use tracing_subscriber::fmt::time::ChronoUtc;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::{fmt, layer::SubscriberExt, EnvFilter, Registry};

/// Environment variable overriding the configured filter.
pub const LOG_ENV: &str = "PROFILE_COMPILE_LOG";

/// Accepted `logging.level` values.
pub const LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error", "off"];

/// Accepted `logging.format` values.
pub const FORMATS: &[&str] = &["text", "json"];

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error, off
    #[serde(default = "default_level")]
    pub level: String,

    /// Output format: text, json
    #[serde(default = "default_format")]
    pub format: String,
}

fn default_level() -> String {
    "warn".to_string()
}

fn default_format() -> String {
    "text".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            format: default_format(),
        }
    }
}

/// Logging errors
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("invalid log level: {0} (must be one of trace, debug, info, warn, error, off)")]
    InvalidLevel(String),

    #[error("invalid log format: {0} (must be 'text' or 'json')")]
    InvalidFormat(String),

    #[error("invalid log filter: {0}")]
    Filter(String),
}

/// Build a dispatch writing to stderr.
pub fn build_dispatch(config: &LoggingConfig) -> Result<Dispatch, LoggingError> {
    let ansi = std::io::stderr().is_terminal();
    build_dispatch_with_writer(config, std::io::stderr, ansi)
}

/// Build a dispatch writing to `writer`.
///
/// `PROFILE_COMPILE_LOG`, when set to a valid filter, takes precedence over
/// `config.level`.
pub fn build_dispatch_with_writer<W>(
    config: &LoggingConfig,
    writer: W,
    ansi: bool,
) -> Result<Dispatch, LoggingError>
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let filter = build_env_filter(config)?;
    let base = Registry::default().with(filter);

    let dispatch = match config.format.as_str() {
        "json" => Dispatch::new(
            base.with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_timer(ChronoUtc::rfc_3339())
                    .with_writer(writer),
            ),
        ),
        "text" => Dispatch::new(
            base.with(
                fmt::layer()
                    .with_target(true)
                    .with_timer(ChronoUtc::rfc_3339())
                    .with_ansi(ansi)
                    .with_writer(writer),
            ),
        ),
        other => return Err(LoggingError::InvalidFormat(other.to_string())),
    };
    Ok(dispatch)
}

fn build_env_filter(config: &LoggingConfig) -> Result<EnvFilter, LoggingError> {
    if let Ok(filter) = EnvFilter::try_from_env(LOG_ENV) {
        return Ok(filter);
    }
    if !LEVELS.contains(&config.level.as_str()) {
        return Err(LoggingError::InvalidLevel(config.level.clone()));
    }
    EnvFilter::try_new(&config.level).map_err(|e| LoggingError::Filter(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Buffer(Arc<Mutex<Vec<u8>>>);

    impl Write for Buffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl Buffer {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    fn emit(config: &LoggingConfig) -> String {
        let buffer = Buffer::default();
        let writer = buffer.clone();
        let dispatch = build_dispatch_with_writer(config, move || writer.clone(), false).unwrap();
        tracing::dispatcher::with_default(&dispatch, || {
            tracing::debug!("debug event");
            tracing::warn!(agent = "ghost", "warn event");
        });
        buffer.contents()
    }

    #[test]
    fn test_default_logging_config() {
        let config = LoggingConfig::default();
        assert_eq!(config.level, "warn");
        assert_eq!(config.format, "text");
    }

    #[test]
    fn test_text_output_respects_level() {
        let output = emit(&LoggingConfig::default());
        assert!(output.contains("warn event"));
        assert!(output.contains("agent=\"ghost\""));
        assert!(!output.contains("debug event"));
    }

    #[test]
    fn test_json_output() {
        let config = LoggingConfig {
            level: "debug".to_string(),
            format: "json".to_string(),
        };
        let output = emit(&config);
        let lines: Vec<serde_json::Value> = output
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1]["fields"]["message"], "warn event");
        assert_eq!(lines[1]["fields"]["agent"], "ghost");
    }

    #[test]
    fn test_off_emits_nothing() {
        let config = LoggingConfig {
            level: "off".to_string(),
            format: "text".to_string(),
        };
        assert!(emit(&config).is_empty());
    }

    #[test]
    fn test_invalid_format() {
        let config = LoggingConfig {
            level: "info".to_string(),
            format: "xml".to_string(),
        };
        let err = build_dispatch_with_writer(&config, std::io::sink, false).unwrap_err();
        assert!(matches!(err, LoggingError::InvalidFormat(_)));
    }
}
