//! Request encoding filter.
//!
//! [`EncodingFilter`] is the integration point a server uses per request:
//! it decides whether a body should be read, reads it within the size cap,
//! wraps the host request in an [`EncodingRequest`] that parses parameters
//! and corrects paths with the configured charset, and optionally stamps
//! the charset on responses.
//!
//! # Example
//!
//! ```rust
//! use charset_filter::config::EncodingConfig;
//! use charset_filter::core::Request;
//! use charset_filter::filter::EncodingFilter;
//!
//! let filter = EncodingFilter::new(EncodingConfig::default());
//! let http_req = http::Request::get("/caf%C3%A9?q=%C3%BC").body(()).unwrap();
//!
//! let mut req = filter.wrap(Request::from(http_req));
//! assert_eq!(req.parameter("q"), Some("ü"));
//! assert_eq!(req.servlet_path(), Some("/café"));
//! ```

mod request;

use std::borrow::Cow;
use std::fmt;

use http::header::CONTENT_TYPE;
use http::{HeaderMap, HeaderValue, Method};
use hyper::body::Body;
use tracing::debug;

use crate::body::{self, FormBody};
use crate::codec;
use crate::config::EncodingConfig;
use crate::core::HostRequest;
use crate::path::EncodingCorrector;

pub use request::EncodingRequest;

/// Per-process filter state, shared by all requests.
#[derive(Debug, Clone)]
pub struct EncodingFilter {
    config: EncodingConfig,
    corrector: EncodingCorrector,
}

impl EncodingFilter {
    pub fn new(config: EncodingConfig) -> Self {
        let corrector = EncodingCorrector::new().with_fallback(config.path_fallback_encoding);
        Self { config, corrector }
    }

    #[inline]
    pub fn config(&self) -> &EncodingConfig {
        &self.config
    }

    #[inline]
    pub fn corrector(&self) -> &EncodingCorrector {
        &self.corrector
    }

    /// Wrap a host request for the duration of one request.
    pub fn wrap<R: HostRequest>(&self, request: R) -> EncodingRequest<'_, R> {
        EncodingRequest::new(self, request)
    }

    /// Whether bodies of `method` requests are parsed.
    #[inline]
    pub fn is_parse_body_method(&self, method: &Method) -> bool {
        self.config.parses_body_for(method)
    }

    /// Whether the body should be read before wrapping.
    pub fn should_read_body(&self, method: &Method, headers: &HeaderMap) -> bool {
        self.is_parse_body_method(method)
            && headers
                .get(CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .map(body::is_form_urlencoded)
                .unwrap_or(false)
    }

    /// Read a form body within the configured size cap.
    pub async fn read_body<B>(&self, headers: &HeaderMap, body: B) -> FormBody
    where
        B: Body + Unpin,
        B::Error: fmt::Display,
    {
        body::collect_form_body(headers, body, self.config.max_post_size).await
    }

    /// Append `charset=` to the response Content-Type when enabled and no
    /// charset is declared yet.
    pub fn apply_response_encoding(&self, headers: &mut HeaderMap) {
        if !self.config.response_encoding {
            return;
        }
        let Some(current) = headers.get(CONTENT_TYPE).and_then(|v| v.to_str().ok()) else {
            return;
        };
        if has_charset_param(current) {
            return;
        }

        let value = format!("{}; charset={}", current.trim_end(), self.config.character_encoding);
        match HeaderValue::try_from(value) {
            Ok(value) => {
                headers.insert(CONTENT_TYPE, value);
            }
            Err(e) => debug!(error = %e, "response content type left unchanged"),
        }
    }

    /// Percent-encode non-ASCII characters of a URL for redirects and links.
    #[inline]
    pub fn encode_url<'a>(&self, url: &'a str) -> Cow<'a, str> {
        codec::encode_url(url)
    }
}

fn has_charset_param(content_type: &str) -> bool {
    content_type.split(';').skip(1).any(|param| {
        param
            .split_once('=')
            .map(|(key, _)| key.trim().eq_ignore_ascii_case("charset"))
            .unwrap_or(false)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use http_body_util::Full;

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(*name, HeaderValue::from_static(*value));
        }
        map
    }

    #[test]
    fn test_should_read_body() {
        let filter = EncodingFilter::new(EncodingConfig::default());
        let form = headers(&[("content-type", "application/x-www-form-urlencoded; charset=UTF-8")]);
        let json = headers(&[("content-type", "application/json")]);

        assert!(filter.should_read_body(&Method::POST, &form));
        assert!(!filter.should_read_body(&Method::PUT, &form));
        assert!(!filter.should_read_body(&Method::POST, &json));
        assert!(!filter.should_read_body(&Method::POST, &HeaderMap::new()));
    }

    #[test]
    fn test_response_encoding_disabled_by_default() {
        let filter = EncodingFilter::new(EncodingConfig::default());
        let mut h = headers(&[("content-type", "text/html")]);
        filter.apply_response_encoding(&mut h);
        assert_eq!(h.get(CONTENT_TYPE).unwrap(), "text/html");
    }

    #[test]
    fn test_response_encoding_appends_charset() {
        let filter = EncodingFilter::new(EncodingConfig {
            response_encoding: true,
            character_encoding: "Shift_JIS".to_string(),
            ..EncodingConfig::default()
        });

        let mut h = headers(&[("content-type", "text/html")]);
        filter.apply_response_encoding(&mut h);
        assert_eq!(h.get(CONTENT_TYPE).unwrap(), "text/html; charset=Shift_JIS");

        let mut h = headers(&[("content-type", "text/plain; Charset=UTF-8")]);
        filter.apply_response_encoding(&mut h);
        assert_eq!(h.get(CONTENT_TYPE).unwrap(), "text/plain; Charset=UTF-8");

        let mut h = HeaderMap::new();
        filter.apply_response_encoding(&mut h);
        assert!(h.get(CONTENT_TYPE).is_none());
    }

    #[test]
    fn test_encode_url() {
        let filter = EncodingFilter::new(EncodingConfig::default());
        assert_eq!(filter.encode_url("/docs/é"), "/docs/%C3%A9");
    }

    #[tokio::test]
    async fn test_read_body_respects_cap() {
        let filter = EncodingFilter::new(EncodingConfig {
            max_post_size: Some(4),
            ..EncodingConfig::default()
        });
        let h = headers(&[("content-length", "7")]);
        let body = filter.read_body(&h, Full::new(Bytes::from_static(b"a=1&b=2"))).await;
        assert!(body.is_rejected());
    }
}
