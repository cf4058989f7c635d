//! Path correction through the filter.

use crate::helpers::*;
use bytes::Bytes;
use charset_filter::charset;
use charset_filter::config::EncodingConfig;
use charset_filter::core::{HostRequest, Request};
use charset_filter::filter::EncodingFilter;
use http::{Method, Uri};

#[test]
fn test_servlet_path_from_uri() {
    let filter = default_filter();
    let req = http::Request::get("/docs/%C3%BCbersicht/caf%C3%A9.html")
        .body(Bytes::new())
        .unwrap();
    let host = host_request(&filter, req);
    assert_eq!(
        host.servlet_path(),
        Some(latin1_mojibake("/docs/übersicht/café.html").as_str())
    );

    let mut wrapped = filter.wrap(host);
    assert_eq!(wrapped.servlet_path(), Some("/docs/übersicht/café.html"));
    // Repeated reads are stable
    assert_eq!(wrapped.servlet_path(), Some("/docs/übersicht/café.html"));
}

#[test]
fn test_ascii_paths_untouched() {
    let filter = default_filter();
    let inner = Request::builder(Method::GET, Uri::from_static("/"))
        .servlet_path("/plain/ascii")
        .path_translated("/var/www/plain")
        .build();
    let mut wrapped = filter.wrap(inner);

    assert_eq!(wrapped.servlet_path(), Some("/plain/ascii"));
    assert_eq!(wrapped.path_translated(), Some("/var/www/plain"));
    assert_eq!(wrapped.path_info(), None);
}

#[test]
fn test_configured_fallback_charset() {
    let filter = EncodingFilter::new(EncodingConfig {
        path_fallback_encoding: charset::lookup(Some("Shift_JIS")),
        ..EncodingConfig::default()
    });
    // "/日本" in Shift_JIS, read as Latin-1
    let garbled: String = [b'/', 0x93, 0xFA, 0x96, 0x7B]
        .iter()
        .map(|&b| char::from(b))
        .collect();
    let inner = Request::builder(Method::GET, Uri::from_static("/"))
        .path_info(garbled)
        .build();
    let mut wrapped = filter.wrap(inner);

    assert_eq!(wrapped.path_info(), Some("/日本"));
}

#[test]
fn test_unrecoverable_path_returned_as_is() {
    let filter = default_filter();
    let inner = Request::builder(Method::GET, Uri::from_static("/"))
        .servlet_path("/\u{ff}\u{fe}")
        .build();
    let mut wrapped = filter.wrap(inner);
    assert_eq!(wrapped.servlet_path(), Some("/\u{ff}\u{fe}"));
}
