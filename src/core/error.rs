//! Core error types.

use std::fmt;

use crate::body::BodyError;
use crate::codec::DecodeError;

/// Problems met while turning raw request data into parameters.
///
/// None of these abort request handling: parameter parsing records them
/// in the sticky parse-failed flag and keeps whatever could be decoded.
#[derive(Debug)]
pub enum Error {
    /// Malformed `%HH` escape in a field.
    Decode(DecodeError),

    /// Field bytes are not valid in the selected charset.
    Undecodable { charset: &'static str },

    /// Field with `=` but an empty name, e.g. `=foo`.
    MalformedField,

    /// More parameters than the configured limit.
    ParameterLimitExceeded { limit: usize },

    /// Encoding name that could not be resolved.
    UnsupportedEncoding(String),

    /// Request body could not be assembled.
    Body(BodyError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Decode(e) => write!(f, "decode error: {}", e),
            Error::Undecodable { charset } => write!(f, "bytes not valid {}", charset),
            Error::MalformedField => write!(f, "parameter with empty name"),
            Error::ParameterLimitExceeded { limit } => {
                write!(f, "more than {} parameters", limit)
            }
            Error::UnsupportedEncoding(name) => write!(f, "unsupported encoding: {}", name),
            Error::Body(e) => write!(f, "body error: {}", e),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Decode(e) => Some(e),
            Error::Body(e) => Some(e),
            _ => None,
        }
    }
}

impl From<DecodeError> for Error {
    fn from(e: DecodeError) -> Self {
        Error::Decode(e)
    }
}

impl From<BodyError> for Error {
    fn from(e: BodyError) -> Self {
        Error::Body(e)
    }
}

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, Error>;
