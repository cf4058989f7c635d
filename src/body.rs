//! Form body assembly.
//!
//! Reads an `application/x-www-form-urlencoded` body into one contiguous
//! buffer before parameter parsing. A declared Content-Length is read in
//! full; a chunked body is accumulated frame by frame. Both are bounded by
//! the configured maximum POST size.

use std::fmt;

use bytes::{Buf, Bytes, BytesMut};
use http::header::{CONTENT_LENGTH, TRANSFER_ENCODING};
use http::HeaderMap;
use http_body_util::BodyExt;
use hyper::body::Body;
use tracing::debug;

/// Media type parsed from form bodies.
pub const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";

/// Initial buffer size for chunked bodies.
const CHUNKED_INITIAL_CAPACITY: usize = 256;

/// Upper bound on the up-front allocation for a declared Content-Length.
/// Larger bodies grow the buffer as frames arrive.
const FIXED_MAX_PREALLOC: usize = 64 * 1024;

/// Why a body could not be assembled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BodyError {
    /// Body is larger than the configured maximum.
    TooLarge { limit: usize },
    /// Stream ended before Content-Length bytes arrived.
    Incomplete { expected: usize, received: usize },
    /// Underlying stream failed (client disconnect and similar).
    Read(String),
}

impl fmt::Display for BodyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BodyError::TooLarge { limit } => write!(f, "body exceeds {} bytes", limit),
            BodyError::Incomplete { expected, received } => {
                write!(f, "body ended after {} of {} bytes", received, expected)
            }
            BodyError::Read(msg) => write!(f, "body read failed: {}", msg),
        }
    }
}

impl std::error::Error for BodyError {}

/// Outcome of reading a form body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FormBody {
    /// No body, or not one that should be parsed.
    #[default]
    Empty,
    /// Complete body bytes.
    Data(Bytes),
    /// Body was present but unusable; parameter parsing marks itself failed.
    Rejected(BodyError),
}

impl FormBody {
    #[inline]
    pub fn is_rejected(&self) -> bool {
        matches!(self, FormBody::Rejected(_))
    }

    #[inline]
    pub fn data(&self) -> Option<&Bytes> {
        match self {
            FormBody::Data(bytes) => Some(bytes),
            _ => None,
        }
    }
}

/// Check whether a Content-Type header denotes a urlencoded form.
/// Parameters after `;` are ignored.
pub fn is_form_urlencoded(content_type: &str) -> bool {
    let media_type = content_type.split(';').next().unwrap_or_default().trim();
    media_type.eq_ignore_ascii_case(FORM_URLENCODED)
}

/// Declared Content-Length, if present and valid.
pub fn content_length(headers: &HeaderMap) -> Option<usize> {
    headers
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse().ok())
}

/// Whether the final transfer coding is `chunked`.
pub fn is_chunked(headers: &HeaderMap) -> bool {
    headers
        .get(TRANSFER_ENCODING)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.rsplit(',').next())
        .map(|coding| coding.trim().eq_ignore_ascii_case("chunked"))
        .unwrap_or(false)
}

/// Read the request body according to its framing headers.
///
/// `max_post_size` of `None` means unlimited.
pub async fn collect_form_body<B>(headers: &HeaderMap, body: B, max_post_size: Option<usize>) -> FormBody
where
    B: Body + Unpin,
    B::Error: fmt::Display,
{
    let result = match content_length(headers) {
        Some(len) if len > 0 => read_fixed(body, len, max_post_size).await,
        _ if is_chunked(headers) => read_chunked(body, max_post_size).await,
        _ => Ok(None),
    };

    match result {
        Ok(Some(bytes)) => FormBody::Data(bytes),
        Ok(None) => FormBody::Empty,
        Err(e) => {
            debug!(error = %e, "form body rejected");
            FormBody::Rejected(e)
        }
    }
}

async fn read_fixed<B>(mut body: B, len: usize, max: Option<usize>) -> Result<Option<Bytes>, BodyError>
where
    B: Body + Unpin,
    B::Error: fmt::Display,
{
    if let Some(limit) = max {
        if len > limit {
            return Err(BodyError::TooLarge { limit });
        }
    }

    let mut buf = BytesMut::with_capacity(len.min(FIXED_MAX_PREALLOC));
    while buf.len() < len {
        let Some(frame) = body.frame().await else {
            break;
        };
        let frame = frame.map_err(|e| BodyError::Read(e.to_string()))?;
        if let Ok(mut data) = frame.into_data() {
            let chunk = data.copy_to_bytes(data.remaining());
            let take = chunk.len().min(len - buf.len());
            buf.extend_from_slice(&chunk[..take]);
        }
    }

    if buf.len() < len {
        return Err(BodyError::Incomplete {
            expected: len,
            received: buf.len(),
        });
    }
    Ok(Some(buf.freeze()))
}

async fn read_chunked<B>(mut body: B, max: Option<usize>) -> Result<Option<Bytes>, BodyError>
where
    B: Body + Unpin,
    B::Error: fmt::Display,
{
    let mut buf = BytesMut::with_capacity(CHUNKED_INITIAL_CAPACITY);
    while let Some(frame) = body.frame().await {
        let frame = frame.map_err(|e| BodyError::Read(e.to_string()))?;
        if let Ok(mut data) = frame.into_data() {
            let chunk = data.copy_to_bytes(data.remaining());
            if let Some(limit) = max {
                if buf.len() + chunk.len() > limit {
                    return Err(BodyError::TooLarge { limit });
                }
            }
            buf.extend_from_slice(&chunk);
        }
    }

    if buf.is_empty() {
        return Ok(None);
    }
    Ok(Some(buf.freeze()))
}
