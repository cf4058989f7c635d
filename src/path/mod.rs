//! Recovery of path strings decoded with the wrong charset.
//!
//! Many hosts percent-decode the request path as ISO-8859-1 no matter what
//! the client sent. Browsers send non-ASCII path segments as UTF-8, so a
//! request for `/café` arrives as `/cafÃ©`. Re-encoding such a string as
//! Latin-1 gives back the original bytes, which can then be decoded with
//! the right charset.
//!
//! This is a heuristic: a string that happens to be valid both ways is
//! taken as UTF-8.

mod memo;

use std::borrow::Cow;

use encoding_rs::mem::{encode_latin1_lossy, is_str_latin1};
use tracing::trace;

use crate::charset::{self, CharsetHandle};

pub use memo::CorrectionMemo;

/// Picks the first candidate charset that decodes a path cleanly.
///
/// Candidates in order: UTF-8, the caller's hint, then the optional
/// fallback. Duplicates and unresolvable hints are skipped.
#[derive(Debug, Clone, Copy, Default)]
pub struct EncodingCorrector {
    fallback: Option<CharsetHandle>,
}

impl EncodingCorrector {
    /// Corrector trying UTF-8 and the hint only.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a last-resort candidate tried after UTF-8 and the hint.
    pub fn with_fallback(mut self, fallback: Option<CharsetHandle>) -> Self {
        self.fallback = fallback;
        self
    }

    /// Last-resort candidate, if any.
    #[inline]
    pub fn fallback(&self) -> Option<CharsetHandle> {
        self.fallback
    }

    /// Re-decode `path` if it looks like Latin-1 mojibake.
    ///
    /// Returns `path` unchanged when it is ASCII, contains characters beyond
    /// U+00FF (it was not naively decoded), or no candidate fits.
    pub fn correct<'a>(&self, path: &'a str, hint: Option<&str>) -> Cow<'a, str> {
        if path.is_ascii() || !is_str_latin1(path) {
            return Cow::Borrowed(path);
        }

        let bytes = encode_latin1_lossy(path);
        let mut tried: [Option<CharsetHandle>; 3] = [None; 3];

        let candidates = [
            Some(CharsetHandle::UTF_8),
            charset::lookup(hint),
            self.fallback,
        ];
        for (slot, candidate) in candidates.into_iter().enumerate() {
            let Some(candidate) = candidate else {
                continue;
            };
            if tried.contains(&Some(candidate)) {
                continue;
            }
            tried[slot] = Some(candidate);

            if let Some(decoded) = candidate.decode(&bytes) {
                trace!(charset = candidate.name(), "path re-decoded");
                return Cow::Owned(decoded.into_owned());
            }
        }

        Cow::Borrowed(path)
    }
}

/// Re-decode a string the host decoded as ISO-8859-1 using `target`.
///
/// Returns `value` unchanged when `target` is Latin-1, the string holds
/// non-Latin-1 characters, or the bytes are invalid in `target`.
pub fn redecode(value: &str, target: CharsetHandle) -> Cow<'_, str> {
    if target == CharsetHandle::ISO_8859_1 || value.is_ascii() || !is_str_latin1(value) {
        return Cow::Borrowed(value);
    }
    let bytes = encode_latin1_lossy(value);
    match target.decode(&bytes) {
        Some(decoded) => Cow::Owned(decoded.into_owned()),
        None => Cow::Borrowed(value),
    }
}
