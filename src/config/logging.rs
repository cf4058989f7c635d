//! Logging configuration.

use super::parse::env_or;
use super::ConfigError;

/// Output format for log lines.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogFormat {
    /// One JSON object per line.
    Json,
    /// Human-readable `tracing-subscriber` output.
    Text,
}

/// Logging configuration loaded from environment.
#[derive(Clone, Debug)]
pub struct LoggingConfig {
    /// Log level filter (from LOG_LEVEL or RUST_LOG).
    pub filter: String,
    /// Service name for structured logging.
    pub service_name: String,
    pub format: LogFormat,
}

impl LoggingConfig {
    /// Load configuration from environment variables.
    ///
    /// Priority: LOG_LEVEL > RUST_LOG > default
    ///
    /// LOG_LEVEL accepts simple values: trace, debug, info, warn, error
    /// RUST_LOG accepts full tracing filter syntax: charset_filter=debug,hyper=warn
    pub fn from_env() -> Result<Self, ConfigError> {
        let format = match env_or("LOG_FORMAT", "json").to_ascii_lowercase().as_str() {
            "json" => LogFormat::Json,
            "text" => LogFormat::Text,
            other => {
                return Err(ConfigError::Invalid {
                    key: "LOG_FORMAT".into(),
                    message: format!("expected json or text, got '{}'", other),
                })
            }
        };

        Ok(Self {
            filter: Self::resolve_log_filter(),
            service_name: env_or("SERVICE_NAME", "charset_filter"),
            format,
        })
    }

    /// Resolve log filter from environment.
    fn resolve_log_filter() -> String {
        if let Ok(level) = std::env::var("LOG_LEVEL") {
            let level = level.to_lowercase();
            match level.as_str() {
                "trace" | "debug" | "info" | "warn" | "error" => {
                    return format!("charset_filter={}", level);
                }
                _ => {
                    // Invalid level, fall through to RUST_LOG
                    eprintln!(
                        "Warning: Invalid LOG_LEVEL '{}', expected: trace, debug, info, warn, error",
                        level
                    );
                }
            }
        }

        if let Ok(filter) = std::env::var("RUST_LOG") {
            return filter;
        }

        "charset_filter=info".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    #[test]
    fn test_log_level_priority() {
        env::remove_var("LOG_LEVEL");
        env::remove_var("RUST_LOG");

        assert_eq!(LoggingConfig::resolve_log_filter(), "charset_filter=info");

        env::set_var("RUST_LOG", "charset_filter=warn,hyper=debug");
        assert_eq!(
            LoggingConfig::resolve_log_filter(),
            "charset_filter=warn,hyper=debug"
        );

        // LOG_LEVEL takes priority over RUST_LOG
        env::set_var("LOG_LEVEL", "DEBUG");
        assert_eq!(LoggingConfig::resolve_log_filter(), "charset_filter=debug");

        env::remove_var("LOG_LEVEL");
        env::remove_var("RUST_LOG");
    }
}
