//! Field scanner for `&`/`=` delimited parameter bytes.

use std::ops::Range;

use crate::charset::CharsetHandle;
use crate::codec::{decode_in_place, ByteWindow};
use crate::core::{Error, Result};

/// Byte spans of one `name[=value]` field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct FieldSpan {
    pub name: Range<usize>,
    /// `None` when the field had no `=`.
    pub value: Option<Range<usize>>,
    /// Name contains `%` or `+`.
    pub decode_name: bool,
    /// Value contains `%` or `+`.
    pub decode_value: bool,
}

/// Result of scanning one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Scanned {
    /// Empty field between two `&` (or at either end). Not an error.
    Empty,
    /// `=` present but the name is empty, e.g. `=foo`.
    MissingName,
    Field(FieldSpan),
}

/// Cursor over a parameter buffer.
///
/// The scanner does not hold the buffer, so callers may decode a returned
/// span in place before asking for the next one: decoding only rewrites
/// bytes inside that field.
pub(crate) struct Scanner {
    pos: usize,
    end: usize,
}

impl Scanner {
    pub fn new(start: usize, end: usize) -> Self {
        Self { pos: start, end }
    }

    /// Scan the next field, or `None` at the end of input.
    pub fn next_field(&mut self, bytes: &[u8]) -> Option<Scanned> {
        if self.pos >= self.end {
            return None;
        }

        let name_start = self.pos;
        let mut name_end = None;
        let mut value_start = None;
        let mut value_end = None;
        let mut parsing_name = true;
        let mut decode_name = false;
        let mut decode_value = false;

        let mut pos = self.pos;
        while pos < self.end {
            match bytes[pos] {
                b'=' if parsing_name => {
                    name_end = Some(pos);
                    parsing_name = false;
                    value_start = Some(pos + 1);
                }
                b'&' => {
                    if parsing_name {
                        name_end = Some(pos);
                    } else {
                        value_end = Some(pos);
                    }
                    pos += 1;
                    break;
                }
                b'%' | b'+' => {
                    if parsing_name {
                        decode_name = true;
                    } else {
                        decode_value = true;
                    }
                }
                _ => {}
            }
            pos += 1;
        }
        self.pos = pos;

        // Unterminated last field
        let name_end = name_end.unwrap_or(pos);
        let value = value_start.map(|start| start..value_end.unwrap_or(pos));

        if name_end <= name_start {
            return Some(match value {
                None => Scanned::Empty,
                Some(_) => Scanned::MissingName,
            });
        }

        Some(Scanned::Field(FieldSpan {
            name: name_start..name_end,
            value,
            decode_name,
            decode_value,
        }))
    }
}

/// Percent-decode (when flagged) and charset-decode one span of `bytes`.
pub(crate) fn decode_span(
    bytes: &mut [u8],
    span: Range<usize>,
    percent: bool,
    charset: CharsetHandle,
) -> Result<String> {
    let mut window = ByteWindow::with_range(bytes, span.start, span.end);
    if percent {
        decode_in_place(&mut window)?;
    }
    charset
        .decode(window.as_bytes())
        .map(|s| s.into_owned())
        .ok_or(Error::Undecodable {
            charset: charset.name(),
        })
}
