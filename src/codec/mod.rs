//! Byte-level codecs for URL components.
//!
//! - [`ByteWindow`] - mutable view over a byte buffer with start/end cursors
//! - [`decode_in_place`] - `%HH` and `+` decoding that shrinks the window
//! - [`encode_url`] - percent-encode non-ASCII characters for outgoing URLs

mod encoder;
mod percent;
mod window;

pub use encoder::encode_url;
pub use percent::{decode_in_place, DecodeError};
pub use window::ByteWindow;
