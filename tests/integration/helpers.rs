//! Test helpers and utilities

use bytes::Bytes;
use charset_filter::config::EncodingConfig;
use charset_filter::core::Request;
use charset_filter::filter::EncodingFilter;
use http_body_util::Full;

pub const FORM: &str = "application/x-www-form-urlencoded";

/// Filter with default configuration.
pub fn default_filter() -> EncodingFilter {
    EncodingFilter::new(EncodingConfig::default())
}

/// Build a host request the way a server would: headers from the `http`
/// request, body read through the filter.
pub fn host_request(filter: &EncodingFilter, req: http::Request<Bytes>) -> Request {
    let should_read = filter.should_read_body(req.method(), req.headers());
    let mut host = Request::from_http(&req);
    if should_read {
        let (parts, body) = req.into_parts();
        let form = tokio_test::block_on(filter.read_body(&parts.headers, Full::new(body)));
        host.set_form_body(form);
    }
    host
}

/// POST a urlencoded body with Content-Length framing.
pub fn form_post(uri: &str, body: &'static str) -> http::Request<Bytes> {
    http::Request::post(uri)
        .header("content-type", FORM)
        .header("content-length", body.len().to_string())
        .body(Bytes::from_static(body.as_bytes()))
        .expect("valid request")
}

/// Decode the UTF-8 bytes of `s` as ISO-8859-1.
pub fn latin1_mojibake(s: &str) -> String {
    s.bytes().map(char::from).collect()
}
