//! Configuration loaded from environment variables.
//!
//! # Example
//!
//! ```rust,no_run
//! use charset_filter::config::Config;
//!
//! let config = Config::from_env()?;
//! println!("Encoding: {}", config.encoding.character_encoding);
//! # Ok::<(), charset_filter::config::ConfigError>(())
//! ```

mod encoding;
mod error;
mod logging;
mod parse;

pub use encoding::{parse_methods, EncodingConfig, DEFAULT_MAX_PARAMETER_COUNT, DEFAULT_MAX_POST_SIZE};
pub use error::ConfigError;
pub use logging::{LogFormat, LoggingConfig};

/// Complete application configuration.
#[derive(Clone, Debug)]
pub struct Config {
    /// Encoding filter configuration.
    pub encoding: EncodingConfig,
    /// Logging configuration.
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            encoding: EncodingConfig::from_env()?,
            logging: LoggingConfig::from_env()?,
        })
    }

    /// Print configuration summary to log.
    pub fn log_summary(&self) {
        use tracing::info;

        let encoding = &self.encoding;
        info!("Configuration loaded:");
        info!("  Character encoding: {}", encoding.character_encoding);

        match encoding.max_parameter_count {
            Some(limit) => info!("  Max parameters: {}", limit),
            None => info!("  Max parameters: unlimited"),
        }
        match encoding.max_post_size {
            Some(limit) => info!("  Max POST size: {} bytes", limit),
            None => info!("  Max POST size: unlimited"),
        }

        let methods: Vec<&str> = encoding.parse_body_methods.iter().map(|m| m.as_str()).collect();
        info!("  Body methods: {}", methods.join(","));

        if let Some(fallback) = encoding.path_fallback_encoding {
            info!("  Path fallback: {}", fallback);
        }
        if encoding.response_encoding {
            info!("  Response encoding: enabled");
        }
        if encoding.reparse_host_parameters {
            info!("  Host parameter re-decoding: enabled");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        for key in [
            "CHARACTER_ENCODING",
            "RESPONSE_ENCODING",
            "MAX_PARAMETER_COUNT",
            "MAX_POST_SIZE",
            "PARSE_BODY_METHODS",
            "PATH_FALLBACK_ENCODING",
            "REPARSE_HOST_PARAMETERS",
            "LOG_FORMAT",
        ] {
            std::env::remove_var(key);
        }

        let config = Config::from_env().expect("Should load config");

        assert_eq!(config.encoding.character_encoding, "UTF-8");
        assert_eq!(config.encoding.max_parameter_count, Some(10_000));
        assert_eq!(config.encoding.parse_body_methods, vec![http::Method::POST]);
        assert!(config.encoding.path_fallback_encoding.is_none());
        assert_eq!(config.logging.format, LogFormat::Json);
    }
}
