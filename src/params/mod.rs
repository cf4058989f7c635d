//! Request parameter parsing.
//!
//! [`Parameters`] carries the per-request encoding state (body and query
//! string encodings, parameter limit, sticky failure flag) together with the
//! resulting [`ParameterMap`]. Raw query strings and form bodies are fed in
//! as bytes and tokenized in place; malformed fields are skipped, never
//! fatal.
//!
//! # Example
//!
//! ```rust
//! use charset_filter::charset::CharsetHandle;
//! use charset_filter::codec::ByteWindow;
//! use charset_filter::params;
//!
//! let mut raw = b"q=caf%C3%A9&page=2&page=3".to_vec();
//! let (map, failed) = params::parse(ByteWindow::new(&mut raw), CharsetHandle::UTF_8, None);
//!
//! assert!(!failed);
//! assert_eq!(map.get("q"), Some("café"));
//! assert_eq!(map.get_all("page").unwrap(), ["2", "3"]);
//! ```

mod map;
mod tokenizer;

use tracing::{debug, warn};

use crate::charset::{self, CharsetHandle};
use crate::codec::ByteWindow;
use crate::core::{Error, Result};
use crate::path;

pub use map::ParameterMap;

use tokenizer::{decode_span, Scanned, Scanner};

/// Per-request parameter state.
#[derive(Debug, Default)]
pub struct Parameters {
    map: ParameterMap,
    /// Body encoding name, resolved lazily.
    encoding: Option<String>,
    /// Query string encoding name, resolved lazily.
    query_string_encoding: Option<String>,
    /// Maximum number of parameters (None = unlimited).
    limit: Option<usize>,
    parameter_count: usize,
    /// Set when any field failed; cleared only by `recycle`.
    parse_failed: bool,
}

impl Parameters {
    /// Empty parameters with no limit and UTF-8 defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style limit setter.
    pub fn with_limit(mut self, limit: Option<usize>) -> Self {
        self.limit = limit;
        self
    }

    /// Set the maximum parameter count (`None` = unlimited).
    pub fn set_limit(&mut self, limit: Option<usize>) {
        self.limit = limit;
    }

    /// Maximum parameter count.
    #[inline]
    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    /// Set the body charset name; resolved when the body is parsed.
    pub fn set_encoding(&mut self, encoding: Option<&str>) {
        self.encoding = encoding.map(str::to_owned);
    }

    /// Body charset name as set.
    #[inline]
    pub fn encoding(&self) -> Option<&str> {
        self.encoding.as_deref()
    }

    /// Set the query string charset name.
    pub fn set_query_string_encoding(&mut self, encoding: Option<&str>) {
        self.query_string_encoding = encoding.map(str::to_owned);
    }

    /// Query string charset name as set.
    #[inline]
    pub fn query_string_encoding(&self) -> Option<&str> {
        self.query_string_encoding.as_deref()
    }

    /// Whether any field was skipped or the limit was hit.
    #[inline]
    pub fn parse_failed(&self) -> bool {
        self.parse_failed
    }

    /// Flag the parse as failed. The flag is sticky.
    #[inline]
    pub fn mark_parse_failed(&mut self) {
        self.parse_failed = true;
    }

    /// Number of parameters accepted or rejected so far.
    #[inline]
    pub fn parameter_count(&self) -> usize {
        self.parameter_count
    }

    /// Parameters collected so far.
    #[inline]
    pub fn map(&self) -> &ParameterMap {
        &self.map
    }

    /// Consume into the collected map.
    pub fn into_map(self) -> ParameterMap {
        self.map
    }

    /// Reset for reuse by another request.
    pub fn recycle(&mut self) {
        self.map.clear();
        self.encoding = None;
        self.query_string_encoding = None;
        self.parameter_count = 0;
        self.parse_failed = false;
    }

    /// Add one decoded pair, enforcing the limit.
    pub fn add_parameter(&mut self, name: String, value: String) -> Result<()> {
        self.parameter_count += 1;
        if let Some(limit) = self.limit {
            if self.parameter_count > limit {
                self.parse_failed = true;
                return Err(Error::ParameterLimitExceeded { limit });
            }
        }
        self.map.insert(name, value);
        Ok(())
    }

    /// Tokenize a raw (still percent-encoded) query string.
    pub fn handle_query_string(&mut self, query: &str) {
        if query.is_empty() {
            return;
        }
        let charset = charset::resolve(self.query_string_encoding.as_deref());
        let mut bytes = query.as_bytes().to_vec();
        self.process_parameters(&mut bytes, charset);
    }

    /// Tokenize an `application/x-www-form-urlencoded` body in place.
    pub fn process_body(&mut self, bytes: &mut [u8]) {
        let charset = charset::resolve(self.encoding.as_deref());
        self.process_parameters(bytes, charset);
    }

    /// Tokenize `bytes`, decoding every field with `charset`.
    ///
    /// Fields are decoded in place, so `bytes` is garbage afterwards.
    pub fn process_parameters(&mut self, bytes: &mut [u8], charset: CharsetHandle) {
        let mut scanner = Scanner::new(0, bytes.len());

        while let Some(scanned) = scanner.next_field(bytes) {
            let field = match scanned {
                Scanned::Empty => continue,
                Scanned::MissingName => {
                    debug!(error = %Error::MalformedField, "skipping parameter");
                    self.parse_failed = true;
                    continue;
                }
                Scanned::Field(field) => field,
            };

            let decoded = decode_span(bytes, field.name.clone(), field.decode_name, charset)
                .and_then(|name| {
                    let value = match field.value.clone() {
                        Some(span) => decode_span(bytes, span, field.decode_value, charset)?,
                        None => String::new(),
                    };
                    Ok((name, value))
                });

            let (name, value) = match decoded {
                Ok(pair) => pair,
                Err(e) => {
                    debug!(error = %e, "skipping parameter");
                    self.parse_failed = true;
                    continue;
                }
            };

            if let Err(e) = self.add_parameter(name, value) {
                warn!(error = %e, "parameter limit reached, ignoring the rest");
                break;
            }
        }
    }

    /// Import pairs the host already decoded as ISO-8859-1, re-decoding
    /// names and values with `target`.
    pub fn import_decoded(&mut self, pairs: &[(String, String)], target: CharsetHandle) {
        for (name, value) in pairs {
            let name = path::redecode(name, target).into_owned();
            let value = path::redecode(value, target).into_owned();
            if let Err(e) = self.add_parameter(name, value) {
                warn!(error = %e, "parameter limit reached, ignoring the rest");
                break;
            }
        }
    }
}

/// Tokenize one window into a fresh map.
///
/// Returns the map and whether any field failed or the limit was hit.
pub fn parse(
    mut window: ByteWindow<'_>,
    charset: CharsetHandle,
    limit: Option<usize>,
) -> (ParameterMap, bool) {
    let mut params = Parameters::new().with_limit(limit);
    let (start, end) = (window.start(), window.end());
    params.process_parameters(&mut window.buffer_mut()[start..end], charset);
    let failed = params.parse_failed();
    (params.into_map(), failed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_str(input: &str, limit: Option<usize>) -> (ParameterMap, bool) {
        let mut bytes = input.as_bytes().to_vec();
        parse(ByteWindow::new(&mut bytes), CharsetHandle::UTF_8, limit)
    }

    #[test]
    fn test_simple_pair() {
        let (map, failed) = parse_str("name=value", None);
        assert!(!failed);
        assert_eq!(map.get("name"), Some("value"));
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_repeated_name() {
        let (map, failed) = parse_str("a=1&a=2", None);
        assert!(!failed);
        assert_eq!(map.get("a"), Some("1"));
        assert_eq!(map.get_all("a").unwrap(), ["1", "2"]);
    }

    #[test]
    fn test_name_order_is_first_seen() {
        let (map, _) = parse_str("b=1&a=2&b=3&c", None);
        assert_eq!(map.names().collect::<Vec<_>>(), ["b", "a", "c"]);
        assert_eq!(map.get("c"), Some(""));
    }

    #[test]
    fn test_empty_fields_are_not_errors() {
        let (map, failed) = parse_str("&&", None);
        assert!(map.is_empty());
        assert!(!failed);

        let (map, failed) = parse_str("&a=1&&b=2&", None);
        assert_eq!(map.len(), 2);
        assert!(!failed);
    }

    #[test]
    fn test_empty_name_with_value_fails() {
        let (map, failed) = parse_str("=foo&", None);
        assert!(failed);
        assert!(map.is_empty());

        // Siblings are still parsed
        let (map, failed) = parse_str("a=1&=foo&b=2", None);
        assert!(failed);
        assert_eq!(map.get("a"), Some("1"));
        assert_eq!(map.get("b"), Some("2"));
    }

    #[test]
    fn test_limit_stops_scan() {
        let (map, failed) = parse_str("a=1&b=2&c=3", Some(2));
        assert!(failed);
        assert_eq!(map.len(), 2);
        assert!(!map.contains("c"));
    }

    #[test]
    fn test_limit_not_reached() {
        let (map, failed) = parse_str("a=1&b=2", Some(2));
        assert!(!failed);
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn test_percent_and_plus_decoding() {
        let (map, failed) = parse_str("first+name=J%C3%BCrgen&q=a%26b%3Dc", None);
        assert!(!failed);
        assert_eq!(map.get("first name"), Some("Jürgen"));
        assert_eq!(map.get("q"), Some("a&b=c"));
    }

    #[test]
    fn test_bad_escape_skips_only_that_field() {
        let (map, failed) = parse_str("a=%zz&b=%4&c=ok", None);
        assert!(failed);
        assert!(!map.contains("a"));
        assert!(!map.contains("b"));
        assert_eq!(map.get("c"), Some("ok"));
    }

    #[test]
    fn test_undecodable_bytes_skip_field() {
        let (map, failed) = parse_str("a=%FF&b=2", None);
        assert!(failed);
        assert!(!map.contains("a"));
        assert_eq!(map.get("b"), Some("2"));
    }

    #[test]
    fn test_charset_is_applied() {
        let mut bytes = b"name=%E9t%E9".to_vec();
        let (map, failed) = parse(ByteWindow::new(&mut bytes), CharsetHandle::ISO_8859_1, None);
        assert!(!failed);
        assert_eq!(map.get("name"), Some("été"));
    }

    #[test]
    fn test_window_bounds_respected() {
        let mut bytes = b"xx&a=1&yy".to_vec();
        let (map, _) = parse(ByteWindow::with_range(&mut bytes, 3, 6), CharsetHandle::UTF_8, None);
        assert_eq!(map.names().collect::<Vec<_>>(), ["a"]);
    }

    #[test]
    fn test_round_trip_plain_pairs() {
        for (name, value) in [("x", "1"), ("long_name", "some-value.txt"), ("k", "")] {
            let (map, failed) = parse_str(&format!("{}={}", name, value), None);
            assert!(!failed);
            assert_eq!(map.get_all(name).unwrap(), [value]);
        }
    }

    #[test]
    fn test_query_then_body_share_limit() {
        let mut params = Parameters::new().with_limit(Some(3));
        params.set_query_string_encoding(Some("UTF-8"));
        params.set_encoding(Some("UTF-8"));
        params.handle_query_string("a=1&b=2");

        let mut body = b"c=3&d=4".to_vec();
        params.process_body(&mut body);

        assert!(params.parse_failed());
        assert_eq!(params.map().len(), 3);
        assert!(params.map().contains("c"));
    }

    #[test]
    fn test_recycle_clears_sticky_flag() {
        let mut params = Parameters::new();
        params.handle_query_string("=x");
        assert!(params.parse_failed());

        params.recycle();
        assert!(!params.parse_failed());
        assert!(params.map().is_empty());
        assert_eq!(params.parameter_count(), 0);
    }

    #[test]
    fn test_settings_accessors() {
        let mut params = Parameters::new();
        assert_eq!(params.limit(), None);
        assert_eq!(params.encoding(), None);

        params.set_limit(Some(2));
        params.set_encoding(Some("Shift_JIS"));
        params.set_query_string_encoding(Some("ISO-8859-1"));
        assert_eq!(params.limit(), Some(2));
        assert_eq!(params.encoding(), Some("Shift_JIS"));
        assert_eq!(params.query_string_encoding(), Some("ISO-8859-1"));

        params.handle_query_string("a=1&b=2&c=3");
        assert!(params.parse_failed());
        assert_eq!(params.into_map().len(), 2);
    }

    #[test]
    fn test_import_decoded_redecodes_latin1() {
        // "ü" as UTF-8 bytes read by the host as Latin-1
        let host = vec![("n\u{c3}\u{bc}".to_string(), "\u{c3}\u{bc}ber".to_string())];
        let mut params = Parameters::new();
        params.import_decoded(&host, CharsetHandle::UTF_8);
        assert_eq!(params.map().get("nü"), Some("über"));
    }
}
