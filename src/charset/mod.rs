//! Character set resolution.
//!
//! Encoding names arrive from headers, request attributes and configuration,
//! so they may be misspelled, aliased or hostile. Resolution never fails:
//! anything that cannot be resolved degrades to a fallback handle.
//!
//! # Example
//!
//! ```rust
//! use charset_filter::charset::{self, CharsetHandle};
//!
//! assert_eq!(charset::resolve(Some("utf8")), CharsetHandle::UTF_8);
//! assert_eq!(charset::resolve(Some("definitely-not-a-charset")), CharsetHandle::UTF_8);
//! assert_eq!(
//!     charset::resolve_or(Some("bogus"), CharsetHandle::ISO_8859_1),
//!     CharsetHandle::ISO_8859_1
//! );
//! ```

mod registry;

use std::borrow::Cow;
use std::fmt;
use std::sync::LazyLock;

use encoding_rs::Encoding;

pub use registry::{CharsetRegistry, REGISTRY_CAPACITY};

/// Resolved character set.
///
/// ISO-8859-1 is kept apart from `encoding_rs`, which follows WHATWG and
/// treats every Latin-1 label as windows-1252. Recovering bytes from a
/// string a host decoded as Latin-1 needs the strict byte == code point
/// mapping.
#[derive(Clone, Copy)]
pub enum CharsetHandle {
    /// ISO-8859-1: every byte maps to the code point of the same value.
    Latin1,
    Utf8,
    /// Any other encoding known to `encoding_rs`.
    Encoding(&'static Encoding),
}

impl CharsetHandle {
    pub const UTF_8: Self = Self::Utf8;
    pub const ISO_8859_1: Self = Self::Latin1;

    /// Canonical name.
    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Latin1 => "ISO-8859-1",
            Self::Utf8 => "UTF-8",
            Self::Encoding(encoding) => encoding.name(),
        }
    }

    #[inline]
    pub fn is_utf8(&self) -> bool {
        matches!(self, Self::Utf8)
    }

    /// Strict decode. Returns `None` when `bytes` contain a sequence that is
    /// malformed or unmappable in this charset.
    pub fn decode<'a>(&self, bytes: &'a [u8]) -> Option<Cow<'a, str>> {
        match self {
            Self::Latin1 => Some(encoding_rs::mem::decode_latin1(bytes)),
            Self::Utf8 => std::str::from_utf8(bytes).ok().map(Cow::Borrowed),
            Self::Encoding(encoding) => {
                encoding.decode_without_bom_handling_and_without_replacement(bytes)
            }
        }
    }

    /// Decode with U+FFFD substituted for malformed sequences.
    pub fn decode_lossy<'a>(&self, bytes: &'a [u8]) -> Cow<'a, str> {
        match self {
            Self::Latin1 => encoding_rs::mem::decode_latin1(bytes),
            Self::Utf8 => String::from_utf8_lossy(bytes),
            Self::Encoding(encoding) => encoding.decode_without_bom_handling(bytes).0,
        }
    }

    /// Resolve a label without consulting any cache.
    fn for_label(label: &str) -> Option<Self> {
        let trimmed = label.trim();
        if is_latin1_label(trimmed) {
            return Some(Self::Latin1);
        }
        Encoding::for_label_no_replacement(trimmed.as_bytes()).map(|encoding| {
            if encoding == encoding_rs::UTF_8 {
                Self::Utf8
            } else {
                Self::Encoding(encoding)
            }
        })
    }
}

impl PartialEq for CharsetHandle {
    fn eq(&self, other: &Self) -> bool {
        self.name() == other.name()
    }
}

impl Eq for CharsetHandle {}

impl fmt::Debug for CharsetHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CharsetHandle({})", self.name())
    }
}

impl fmt::Display for CharsetHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Default for CharsetHandle {
    fn default() -> Self {
        Self::UTF_8
    }
}

fn is_latin1_label(label: &str) -> bool {
    const LABELS: [&str; 10] = [
        "iso-8859-1",
        "iso8859-1",
        "iso88591",
        "iso_8859-1",
        "iso-ir-100",
        "latin1",
        "l1",
        "cp819",
        "ibm819",
        "csisolatin1",
    ];
    LABELS.iter().any(|l| l.eq_ignore_ascii_case(label))
}

static REGISTRY: LazyLock<CharsetRegistry> = LazyLock::new(CharsetRegistry::new);

/// Process-wide registry shared by all requests.
#[inline]
pub fn registry() -> &'static CharsetRegistry {
    &REGISTRY
}

/// Resolve `name` through the shared registry, `None` when unsupported.
#[inline]
pub fn lookup(name: Option<&str>) -> Option<CharsetHandle> {
    REGISTRY.lookup(name)
}

/// Resolve `name`, falling back to UTF-8.
#[inline]
pub fn resolve(name: Option<&str>) -> CharsetHandle {
    REGISTRY.resolve(name)
}

/// Resolve `name`, falling back to `fallback`.
#[inline]
pub fn resolve_or(name: Option<&str>, fallback: CharsetHandle) -> CharsetHandle {
    REGISTRY.resolve_or(name, fallback)
}
