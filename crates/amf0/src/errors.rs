use std::io;

use super::define::Amf0Marker;

/// Errors that can occur when decoding AMF0 data.
#[derive(Debug, thiserror::Error)]
pub enum Amf0ReadError {
    /// An unknown marker was encountered.
    #[error("unknown marker: {0}")]
    UnknownMarker(u8),
    /// A marker this decoder does not model was encountered.
    #[error("unsupported type: {0:?}")]
    UnsupportedType(Amf0Marker),
    /// A string parse error occurred.
    #[error("string parse error: {0}")]
    StringParseError(#[from] std::str::Utf8Error),
    /// The input ended in the middle of a value.
    #[error("truncated input: {0}")]
    TruncatedInput(io::Error),
    /// An IO error occurred.
    #[error("io error: {0}")]
    Io(io::Error),
}

impl From<io::Error> for Amf0ReadError {
    fn from(err: io::Error) -> Self {
        if err.kind() == io::ErrorKind::UnexpectedEof {
            Self::TruncatedInput(err)
        } else {
            Self::Io(err)
        }
    }
}

/// Errors that can occur when encoding AMF0 data.
#[derive(Debug, thiserror::Error)]
pub enum Amf0WriteError {
    /// A string or property key was longer than a 16-bit length allows.
    #[error("normal string too long")]
    NormalStringTooLong,
    /// A collection held more entries than a 32-bit count allows.
    #[error("too many elements: {0}")]
    TooManyElements(usize),
    /// The underlying writer failed.
    #[error("write failure: {0}")]
    WriteFailure(#[from] io::Error),
}
