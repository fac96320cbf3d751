use std::io;

use amf0::{Amf0ReadError, Amf0WriteError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FlvError {
    #[error("Truncated input: {0}")]
    TruncatedInput(io::Error),
    #[error("Write failure: {0}")]
    WriteFailure(io::Error),
    #[error("I/O error: {0}")]
    Io(io::Error),
    #[error("Invalid FLV signature: {0:02x?}")]
    InvalidSignature([u8; 3]),
    #[error("Invalid FLV header size: {0}")]
    InvalidHeaderOffset(u32),
    #[error("Invalid first previous tag size: {0}")]
    InvalidPrevLength(u32),
    #[error("Inconsistent tag size at offset {offset}: expected {expected}, found {found}")]
    InconsistentTagSize { offset: u64, expected: u32, found: u32 },
    #[error("Corrupt tag at offset {offset}: {reason}")]
    CorruptTag { offset: u64, reason: String },
    #[error("Invalid script data: {0}")]
    InvalidScriptData(String),
    #[error("Timestamp does not fit in 24 bits: {0}")]
    TimestampOverflow(u32),
    #[error("Tag data size too large: {0}")]
    TagTooLarge(usize),
    #[error("AMF0 read error: {0}")]
    Amf0Read(Amf0ReadError),
    #[error("AMF0 write error: {0}")]
    Amf0Write(Amf0WriteError),
}

impl From<io::Error> for FlvError {
    fn from(err: io::Error) -> Self {
        if err.kind() == io::ErrorKind::UnexpectedEof {
            Self::TruncatedInput(err)
        } else {
            Self::Io(err)
        }
    }
}

impl From<Amf0ReadError> for FlvError {
    fn from(err: Amf0ReadError) -> Self {
        match err {
            Amf0ReadError::TruncatedInput(err) => Self::TruncatedInput(err),
            err => Self::Amf0Read(err),
        }
    }
}

impl From<Amf0WriteError> for FlvError {
    fn from(err: Amf0WriteError) -> Self {
        match err {
            Amf0WriteError::WriteFailure(err) => Self::WriteFailure(err),
            err => Self::Amf0Write(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_errors_split_on_eof() {
        let eof = io::Error::new(io::ErrorKind::UnexpectedEof, "short");
        assert!(matches!(FlvError::from(eof), FlvError::TruncatedInput(_)));

        let other = io::Error::other("denied");
        assert!(matches!(FlvError::from(other), FlvError::Io(_)));
    }

    #[test]
    fn amf0_errors_are_flattened() {
        let read = Amf0ReadError::from(io::Error::new(io::ErrorKind::UnexpectedEof, "short"));
        assert!(matches!(FlvError::from(read), FlvError::TruncatedInput(_)));

        let read = Amf0ReadError::UnknownMarker(0x42);
        assert!(matches!(
            FlvError::from(read),
            FlvError::Amf0Read(Amf0ReadError::UnknownMarker(0x42))
        ));

        let write = Amf0WriteError::WriteFailure(io::Error::other("closed"));
        assert!(matches!(FlvError::from(write), FlvError::WriteFailure(_)));

        let write = Amf0WriteError::NormalStringTooLong;
        assert!(matches!(
            FlvError::from(write),
            FlvError::Amf0Write(Amf0WriteError::NormalStringTooLong)
        ));
    }

    #[test]
    fn display() {
        assert_eq!(
            FlvError::InvalidSignature(*b"XYZ").to_string(),
            "Invalid FLV signature: [58, 59, 5a]"
        );
        assert_eq!(
            FlvError::InconsistentTagSize {
                offset: 13,
                expected: 20,
                found: 21
            }
            .to_string(),
            "Inconsistent tag size at offset 13: expected 20, found 21"
        );
    }
}
