//! Parameter parsing through the filter.

use crate::helpers::*;
use bytes::Bytes;
use charset_filter::charset::{self, CharsetHandle};
use charset_filter::codec::ByteWindow;
use charset_filter::config::EncodingConfig;
use charset_filter::filter::EncodingFilter;
use charset_filter::params;

#[test]
fn test_query_and_body_merge() {
    let filter = default_filter();
    let req = host_request(&filter, form_post("/search?q=caf%C3%A9&page=1", "page=2&lang=de"));
    let mut wrapped = filter.wrap(req);

    assert_eq!(wrapped.parameter("q"), Some("café"));
    assert_eq!(wrapped.parameter_values("page").unwrap(), ["1", "2"]);
    assert_eq!(wrapped.parameter_names(), ["q", "page", "lang"]);
    assert!(!wrapped.parse_failed());
}

#[test]
fn test_partial_results_on_bad_fields() {
    let filter = default_filter();
    let req = host_request(&filter, form_post("/x", "ok=1&=orphan&bad=%G1&tail=%2&last=yes"));
    let mut wrapped = filter.wrap(req);

    assert_eq!(wrapped.parameter_names(), ["ok", "last"]);
    assert!(wrapped.parse_failed());
}

#[test]
fn test_parameter_limit_across_sources() {
    let filter = EncodingFilter::new(EncodingConfig {
        max_parameter_count: Some(2),
        ..EncodingConfig::default()
    });
    let req = host_request(&filter, form_post("/x?a=1&b=2", "c=3"));
    let mut wrapped = filter.wrap(req);

    assert_eq!(wrapped.parameter_map().len(), 2);
    assert!(wrapped.parameter("c").is_none());
    assert!(wrapped.parse_failed());
}

#[test]
fn test_unlimited_parameters() {
    let filter = EncodingFilter::new(EncodingConfig {
        max_parameter_count: None,
        ..EncodingConfig::default()
    });
    let query: String = (0..500).map(|i| format!("k{}=v&", i)).collect();
    let req = http::Request::get(format!("/x?{}", query))
        .body(Bytes::new())
        .unwrap();
    let mut wrapped = filter.wrap(host_request(&filter, req));

    assert_eq!(wrapped.parameter_map().len(), 500);
    assert!(!wrapped.parse_failed());
}

#[test]
fn test_unknown_charset_falls_back_to_utf8() {
    let filter = default_filter();
    let req = host_request(&filter, form_post("/x", "n=%C3%BC"));
    let mut wrapped = filter.wrap(req);
    wrapped.set_character_encoding("definitely-not-a-charset");

    assert_eq!(wrapped.parameter("n"), Some("ü"));
    assert_eq!(charset::resolve(Some("definitely-not-a-charset")), CharsetHandle::UTF_8);
}

#[test]
fn test_parameter_map_serializes_in_order() {
    let mut raw = b"z=1&a=2&z=3".to_vec();
    let (map, _) = params::parse(ByteWindow::new(&mut raw), CharsetHandle::UTF_8, None);
    let json = serde_json::to_string(&map).unwrap();
    assert_eq!(json, r#"{"z":["1","3"],"a":["2"]}"#);
}
