//! Outgoing URL encoding.

use std::borrow::Cow;

use percent_encoding::{utf8_percent_encode, CONTROLS};

/// Percent-encode the non-ASCII (and control) characters of `url` as UTF-8.
///
/// Reserved ASCII such as `/`, `?` and `%` passes through, so an already
/// encoded URL is not double-encoded. Used for redirect locations that
/// contain raw non-ASCII path segments.
#[inline]
pub fn encode_url(url: &str) -> Cow<'_, str> {
    if url.bytes().all(|b| b.is_ascii() && !b.is_ascii_control()) {
        return Cow::Borrowed(url);
    }
    utf8_percent_encode(url, CONTROLS).into()
}
