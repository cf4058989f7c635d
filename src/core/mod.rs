//! Core types shared by the parsing layers.
//!
//! - [`HostRequest`] - what the filter needs from the hosting server
//! - [`Request`] - concrete host request on top of `http` types
//! - [`Error`] - per-field and per-request error types

mod error;
mod request;

pub use error::{Error, Result};
pub use request::{HostRequest, Request, RequestBuilder};
