//! Logging setup for the API process.
//!
//! Request spans come from `TraceLayer` and carry the trace ID, so JSON lines
//! can be grouped per request.

use tracing_subscriber::{
    filter::ParseError,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer,
};

use crate::config::LoggingConfig;

/// Targets held at `warn` unless the configured level names them.
/// sqlx logs every statement at `info`.
const QUIET_TARGETS: &[&str] = &["sqlx", "hyper", "h2", "reqwest"];

/// Output format selected by `logging.format`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Pretty,
}

impl LogFormat {
    /// Parses `logging.format`; `None` for an unknown value.
    pub fn from_config(format: &str) -> Option<Self> {
        match format.trim().to_ascii_lowercase().as_str() {
            "json" => Some(LogFormat::Json),
            "" | "pretty" | "text" => Some(LogFormat::Pretty),
            _ => None,
        }
    }
}

/// Expands `logging.level` into filter directives.
fn filter_directives(level: &str) -> String {
    let level = match level.trim() {
        "" => "info",
        level => level,
    };

    let mut directives = vec![level.to_string()];
    directives.extend(
        QUIET_TARGETS
            .iter()
            .filter(|target| !level.contains(&format!("{}=", target)))
            .map(|target| format!("{}=warn", target)),
    );
    directives.join(",")
}

fn config_filter(level: &str) -> Result<EnvFilter, ParseError> {
    EnvFilter::try_new(filter_directives(level))
}

/// Installs the global subscriber.
///
/// `RUST_LOG` replaces `logging.level` entirely when set. An unusable level
/// or format falls back to `info` and pretty output with a warning.
pub fn init_logging(config: &LoggingConfig) {
    let format = LogFormat::from_config(&config.format);

    let (filter, rejected_level) = match EnvFilter::try_from_default_env() {
        Ok(filter) => (filter, None),
        Err(_) => match config_filter(&config.level) {
            Ok(filter) => (filter, None),
            Err(err) => (EnvFilter::new(filter_directives("info")), Some(err)),
        },
    };

    let output = match format.unwrap_or(LogFormat::Pretty) {
        LogFormat::Json => fmt::layer()
            .json()
            .flatten_event(true)
            .with_current_span(true)
            .with_span_list(false)
            .with_span_events(FmtSpan::CLOSE)
            .boxed(),
        LogFormat::Pretty => fmt::layer().pretty().with_target(true).boxed(),
    };

    tracing_subscriber::registry().with(filter).with(output).init();

    if format.is_none() {
        tracing::warn!(format = %config.format, "Unknown logging format, using pretty output");
    }
    if let Some(err) = rejected_level {
        tracing::warn!(level = %config.level, error = %err, "Invalid logging level, using info");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_format_from_config() {
        assert_eq!(LogFormat::from_config("json"), Some(LogFormat::Json));
        assert_eq!(LogFormat::from_config(" JSON "), Some(LogFormat::Json));
        assert_eq!(LogFormat::from_config("pretty"), Some(LogFormat::Pretty));
        assert_eq!(LogFormat::from_config(""), Some(LogFormat::Pretty));
        assert_eq!(LogFormat::from_config("xml"), None);
    }

    #[test]
    fn test_filter_quiets_noisy_targets() {
        assert_eq!(
            filter_directives("debug"),
            "debug,sqlx=warn,hyper=warn,h2=warn,reqwest=warn"
        );
        assert!(filter_directives("  ").starts_with("info,"));
    }

    #[test]
    fn test_filter_keeps_explicit_target_level() {
        let directives = filter_directives("info,sqlx=debug");
        assert!(directives.starts_with("info,sqlx=debug,"));
        assert!(!directives.contains("sqlx=warn"));
        assert!(directives.contains("hyper=warn"));
    }

    #[test]
    fn test_config_filter_rejects_bad_level() {
        assert!(config_filter("fleet_booking_api=debug").is_ok());
        assert!(config_filter("sqlx=loud").is_err());
    }
}
