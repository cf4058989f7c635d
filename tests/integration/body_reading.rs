//! Body assembly feeding the parser.

use crate::helpers::*;
use bytes::Bytes;
use charset_filter::body::{BodyError, FormBody};
use charset_filter::config::EncodingConfig;
use charset_filter::core::HostRequest;
use charset_filter::filter::EncodingFilter;

#[test]
fn test_oversized_body_is_rejected() {
    let filter = EncodingFilter::new(EncodingConfig {
        max_post_size: Some(8),
        ..EncodingConfig::default()
    });
    let req = host_request(&filter, form_post("/x?q=1", "field=far-too-long"));
    assert_eq!(
        req.form_body(),
        &FormBody::Rejected(BodyError::TooLarge { limit: 8 })
    );

    let mut wrapped = filter.wrap(req);
    assert_eq!(wrapped.parameter("q"), Some("1"));
    assert!(wrapped.parameter("field").is_none());
    assert!(wrapped.parse_failed());
}

#[test]
fn test_non_form_body_not_read() {
    let filter = default_filter();
    let req = http::Request::post("/x")
        .header("content-type", "application/json")
        .header("content-length", "7")
        .body(Bytes::from_static(b"{\"a\":1}"))
        .unwrap();
    let host = host_request(&filter, req);
    assert_eq!(host.form_body(), &FormBody::Empty);
}

#[test]
fn test_get_body_not_read() {
    let filter = default_filter();
    let req = http::Request::get("/x")
        .header("content-type", FORM)
        .header("content-length", "3")
        .body(Bytes::from_static(b"a=1"))
        .unwrap();
    let mut wrapped = filter.wrap(host_request(&filter, req));
    assert!(wrapped.parameter_map().is_empty());
}

#[test]
fn test_chunked_body() {
    let filter = default_filter();
    let req = http::Request::post("/x")
        .header("content-type", FORM)
        .header("transfer-encoding", "chunked")
        .body(Bytes::from_static(b"a=%E2%82%AC"))
        .unwrap();
    let mut wrapped = filter.wrap(host_request(&filter, req));
    assert_eq!(wrapped.parameter("a"), Some("€"));
}
