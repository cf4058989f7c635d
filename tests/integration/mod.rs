//! Integration tests for charset_filter
//!
//! These drive the public API end to end: `http` requests in, body
//! assembly, filter wrapping, parameters and corrected paths out.
//! Run with: cargo test --test integration

mod helpers;

mod body_reading;
mod parameters;
mod paths;
