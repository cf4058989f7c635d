//! Encoding filter configuration.

use http::Method;

use super::parse::{env_bool, env_opt, env_or, env_parse};
use super::ConfigError;
use crate::charset::{self, CharsetHandle};

/// Default cap on parameters per request.
pub const DEFAULT_MAX_PARAMETER_COUNT: i64 = 10_000;

/// Default cap on form body size (2 MiB).
pub const DEFAULT_MAX_POST_SIZE: i64 = 2 * 1024 * 1024;

/// Encoding filter configuration loaded from environment.
#[derive(Clone, Debug)]
pub struct EncodingConfig {
    /// Charset for bodies, query strings and path correction.
    pub character_encoding: String,
    /// Append `charset=` to response Content-Type headers.
    pub response_encoding: bool,
    /// Maximum parameters per request (None = unlimited).
    pub max_parameter_count: Option<usize>,
    /// Maximum form body size in bytes (None = unlimited).
    pub max_post_size: Option<usize>,
    /// Methods whose urlencoded bodies are parsed.
    pub parse_body_methods: Vec<Method>,
    /// Last candidate for path correction.
    pub path_fallback_encoding: Option<CharsetHandle>,
    /// Re-decode host-parsed parameters instead of tokenizing raw bytes.
    pub reparse_host_parameters: bool,
}

impl Default for EncodingConfig {
    fn default() -> Self {
        Self {
            character_encoding: CharsetHandle::UTF_8.name().to_string(),
            response_encoding: false,
            max_parameter_count: non_negative(DEFAULT_MAX_PARAMETER_COUNT),
            max_post_size: positive(DEFAULT_MAX_POST_SIZE),
            parse_body_methods: vec![Method::POST],
            path_fallback_encoding: None,
            reparse_host_parameters: false,
        }
    }
}

impl EncodingConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        let character_encoding = env_or("CHARACTER_ENCODING", CharsetHandle::UTF_8.name());
        if charset::lookup(Some(character_encoding.as_str())).is_none() {
            return Err(ConfigError::Invalid {
                key: "CHARACTER_ENCODING".into(),
                message: format!("unsupported charset '{}'", character_encoding),
            });
        }

        let path_fallback_encoding = match env_opt("PATH_FALLBACK_ENCODING") {
            Some(name) => Some(charset::lookup(Some(name.as_str())).ok_or_else(|| {
                ConfigError::Invalid {
                    key: "PATH_FALLBACK_ENCODING".into(),
                    message: format!("unsupported charset '{}'", name),
                }
            })?),
            None => None,
        };

        let methods = env_or("PARSE_BODY_METHODS", "POST");

        Ok(Self {
            character_encoding,
            response_encoding: env_bool("RESPONSE_ENCODING", false),
            max_parameter_count: non_negative(env_parse(
                "MAX_PARAMETER_COUNT",
                DEFAULT_MAX_PARAMETER_COUNT,
            )?),
            max_post_size: positive(env_parse("MAX_POST_SIZE", DEFAULT_MAX_POST_SIZE)?),
            parse_body_methods: parse_methods(&methods).map_err(|message| {
                ConfigError::Invalid {
                    key: "PARSE_BODY_METHODS".into(),
                    message,
                }
            })?,
            path_fallback_encoding,
            reparse_host_parameters: env_bool("REPARSE_HOST_PARAMETERS", false),
        })
    }

    /// Whether bodies of requests with `method` are parsed.
    pub fn parses_body_for(&self, method: &Method) -> bool {
        self.parse_body_methods.contains(method)
    }
}

/// Parse a comma-separated method list. TRACE is never allowed.
pub fn parse_methods(list: &str) -> Result<Vec<Method>, String> {
    let mut methods = Vec::new();
    for token in list.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        let method = Method::from_bytes(token.to_ascii_uppercase().as_bytes())
            .map_err(|_| format!("invalid method '{}'", token))?;
        if method == Method::TRACE {
            return Err("TRACE bodies cannot be parsed".to_string());
        }
        if !methods.contains(&method) {
            methods.push(method);
        }
    }
    Ok(methods)
}

/// Negative means unlimited.
fn non_negative(value: i64) -> Option<usize> {
    usize::try_from(value).ok()
}

/// Zero or negative means unlimited.
fn positive(value: i64) -> Option<usize> {
    usize::try_from(value).ok().filter(|&v| v > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EncodingConfig::default();
        assert_eq!(config.character_encoding, "UTF-8");
        assert_eq!(config.max_parameter_count, Some(10_000));
        assert_eq!(config.max_post_size, Some(2 * 1024 * 1024));
        assert!(config.parses_body_for(&Method::POST));
        assert!(!config.parses_body_for(&Method::PUT));
        assert!(!config.response_encoding);
    }

    #[test]
    fn test_parse_methods() {
        assert_eq!(
            parse_methods("post, put,POST").unwrap(),
            vec![Method::POST, Method::PUT]
        );
        assert!(parse_methods("").unwrap().is_empty());
        assert!(parse_methods("POST,TRACE").is_err());
        assert!(parse_methods("P O S T").is_err());
    }

    #[test]
    fn test_limits() {
        assert_eq!(non_negative(-1), None);
        assert_eq!(non_negative(0), Some(0));
        assert_eq!(positive(0), None);
        assert_eq!(positive(-5), None);
        assert_eq!(positive(512), Some(512));
    }
}
