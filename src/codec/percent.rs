//! In-place percent decoding.

use std::fmt;

use super::ByteWindow;

/// Percent-decoding failure. Both kinds only affect the field being decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
    /// `%` followed by fewer than two bytes.
    UnexpectedEndOfData,
    /// `%` followed by something other than two hex digits.
    InvalidHexDigit,
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::UnexpectedEndOfData => write!(f, "unexpected end of data after '%'"),
            DecodeError::InvalidHexDigit => write!(f, "invalid hex digit after '%'"),
        }
    }
}

impl std::error::Error for DecodeError {}

/// Decode `%HH` escapes and `+` (space) inside the window, in place.
///
/// Windows without `%` or `+` are left untouched. Otherwise bytes are
/// compacted towards the start and the window's end moves back by two for
/// every escape. On error the window keeps its original end; bytes before
/// the first special character are never modified.
pub fn decode_in_place(window: &mut ByteWindow<'_>) -> Result<(), DecodeError> {
    let start = window.start();
    let end = window.end();

    let first = match window
        .as_bytes()
        .iter()
        .position(|&b| b == b'%' || b == b'+')
    {
        Some(offset) => start + offset,
        None => return Ok(()),
    };

    let buf = window.buffer_mut();
    let mut idx = first;
    let mut j = first;
    while j < end {
        match buf[j] {
            b'+' => buf[idx] = b' ',
            b'%' => {
                if j + 2 >= end {
                    return Err(DecodeError::UnexpectedEndOfData);
                }
                let (hi, lo) = match (hex_value(buf[j + 1]), hex_value(buf[j + 2])) {
                    (Some(hi), Some(lo)) => (hi, lo),
                    _ => return Err(DecodeError::InvalidHexDigit),
                };
                buf[idx] = (hi << 4) | lo;
                j += 2;
            }
            b => buf[idx] = b,
        }
        idx += 1;
        j += 1;
    }

    window.truncate(idx);
    Ok(())
}

#[inline]
fn hex_value(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}
