//! charset_filter - request parameter and path charset recovery.
//!
//! Hosts often decode query strings, form bodies and request paths with a
//! fixed charset no matter what the client sent. This crate re-parses
//! parameters from the raw bytes with a configurable charset and repairs
//! paths that were decoded as ISO-8859-1.
//!
//! # Features
//!
//! - **In-place tokenizing**: `&`/`=` state machine with lazy percent decoding
//! - **Charset cache**: bounded process-wide cache of resolved charset names
//! - **Path correction**: UTF-8, request charset, then a configured fallback
//! - **Form bodies**: Content-Length and chunked bodies read under a size cap
//! - **Structured logging**: JSON lines via tracing
//!
//! # Example
//!
//! ```rust
//! use charset_filter::charset::CharsetHandle;
//! use charset_filter::codec::ByteWindow;
//! use charset_filter::path::EncodingCorrector;
//!
//! let mut raw = b"city=M%C3%BCnchen&city=K%C3%B6ln".to_vec();
//! let (map, failed) = charset_filter::params::parse(ByteWindow::new(&mut raw), CharsetHandle::UTF_8, None);
//! assert!(!failed);
//! assert_eq!(map.get_all("city").unwrap(), ["München", "Köln"]);
//!
//! // "/café" as UTF-8 bytes, decoded by the host as Latin-1
//! let corrected = EncodingCorrector::new().correct("/caf\u{c3}\u{a9}", None);
//! assert_eq!(corrected, "/café");
//! ```

/// Package version from Cargo.toml
pub const PKG_VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod body;
pub mod charset;
pub mod codec;
pub mod config;
pub mod core;
pub mod filter;
pub mod logging;
pub mod params;
pub mod path;

// Re-exports for convenience
pub use charset::CharsetHandle;
pub use config::Config;
pub use filter::{EncodingFilter, EncodingRequest};
pub use params::{ParameterMap, Parameters};
pub use path::{CorrectionMemo, EncodingCorrector};
