//! # Shared byte source
//!
//! Tag payloads are not kept in memory. A parsed tag remembers where its
//! opaque bytes live in the file it came from and reads them back when they
//! are displayed or written out. [`SharedSource`] is the reference-counted
//! handle to that file; every [`Payload::Source`] holds a clone, so the reader
//! stays open for as long as any tag still points into it, even after the
//! tag has been moved into another stream.

use std::fmt;
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::sync::Arc;

use bytes::Bytes;
use parking_lot::{Mutex, MutexGuard};

use crate::error::FlvError;

/// A seekable reader that can back a [`SharedSource`].
pub trait ReadSeek: Read + Seek + Send {}

impl<T: Read + Seek + Send> ReadSeek for T {}

/// Reference-counted, seekable, read-only byte source.
#[derive(Clone)]
pub struct SharedSource {
    inner: Arc<Mutex<Box<dyn ReadSeek>>>,
}

impl SharedSource {
    pub fn new<R: ReadSeek + 'static>(reader: R) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Box::new(reader))),
        }
    }

    /// Locks the underlying reader. The parser holds this while it walks the
    /// file; it must be released before any payload is read back.
    pub(crate) fn lock(&self) -> MutexGuard<'_, Box<dyn ReadSeek>> {
        self.inner.lock()
    }

    /// Reads exactly `len` bytes starting at absolute `offset`.
    pub fn read_range(&self, offset: u64, len: usize) -> io::Result<Bytes> {
        let mut reader = self.inner.lock();
        reader.seek(SeekFrom::Start(offset))?;

        let mut buf = vec![0; len];
        reader.read_exact(&mut buf)?;
        Ok(Bytes::from(buf))
    }

    /// Whether both handles refer to the same reader.
    pub fn same_source(&self, other: &SharedSource) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for SharedSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedSource")
            .field("handles", &Arc::strong_count(&self.inner))
            .finish()
    }
}

/// Opaque tag bytes: either a range of a [`SharedSource`] or bytes owned in
/// memory (synthesized tags and tests).
#[derive(Debug, Clone)]
pub enum Payload {
    Source {
        source: SharedSource,
        offset: u64,
        len: usize,
    },
    Owned(Bytes),
}

impl Payload {
    pub fn empty() -> Self {
        Payload::Owned(Bytes::new())
    }

    pub fn len(&self) -> usize {
        match self {
            Payload::Source { len, .. } => *len,
            Payload::Owned(bytes) => bytes.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Source offset of the first byte, `None` for owned bytes.
    pub fn offset(&self) -> Option<u64> {
        match self {
            Payload::Source { offset, .. } => Some(*offset),
            Payload::Owned(_) => None,
        }
    }

    /// Materializes the bytes, reading them back from the source if needed.
    pub fn bytes(&self) -> Result<Bytes, FlvError> {
        match self {
            Payload::Source {
                source,
                offset,
                len,
            } => Ok(source.read_range(*offset, *len)?),
            Payload::Owned(bytes) => Ok(bytes.clone()),
        }
    }

    /// Reads up to `len` leading bytes.
    pub fn head(&self, len: usize) -> Result<Bytes, FlvError> {
        let len = len.min(self.len());
        match self {
            Payload::Source { source, offset, .. } => Ok(source.read_range(*offset, len)?),
            Payload::Owned(bytes) => Ok(bytes.slice(..len)),
        }
    }

    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<(), FlvError> {
        if self.is_empty() {
            return Ok(());
        }

        let bytes = self.bytes()?;
        writer.write_all(&bytes).map_err(FlvError::WriteFailure)
    }
}

impl From<Bytes> for Payload {
    fn from(bytes: Bytes) -> Self {
        Payload::Owned(bytes)
    }
}

impl From<Vec<u8>> for Payload {
    fn from(bytes: Vec<u8>) -> Self {
        Payload::Owned(Bytes::from(bytes))
    }
}

/// Source ranges compare by identity, owned bytes by content.
impl PartialEq for Payload {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (
                Payload::Source {
                    source: a,
                    offset: ao,
                    len: al,
                },
                Payload::Source {
                    source: b,
                    offset: bo,
                    len: bl,
                },
            ) => a.same_source(b) && ao == bo && al == bl,
            (Payload::Owned(a), Payload::Owned(b)) => a == b,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    #[test]
    fn read_range_seeks() {
        let source = SharedSource::new(Cursor::new((0u8..32).collect::<Vec<_>>()));

        assert_eq!(source.read_range(4, 3).unwrap().as_ref(), &[4, 5, 6]);
        assert_eq!(source.read_range(0, 2).unwrap().as_ref(), &[0, 1]);
        assert_eq!(
            source.read_range(30, 4).unwrap_err().kind(),
            io::ErrorKind::UnexpectedEof
        );
    }

    #[test]
    fn payload_reads_back_lazily() {
        let source = SharedSource::new(Cursor::new(b"..hello..".to_vec()));
        let payload = Payload::Source {
            source: source.clone(),
            offset: 2,
            len: 5,
        };

        assert_eq!(payload.len(), 5);
        assert_eq!(payload.offset(), Some(2));
        assert_eq!(payload.bytes().unwrap().as_ref(), b"hello");
        assert_eq!(payload.head(2).unwrap().as_ref(), b"he");
        assert_eq!(payload.head(64).unwrap().as_ref(), b"hello");

        let mut out = Vec::new();
        payload.write_to(&mut out).unwrap();
        assert_eq!(out, b"hello");
    }

    #[test]
    fn payload_keeps_source_alive() {
        let payload = {
            let source = SharedSource::new(Cursor::new(vec![1, 2, 3]));
            Payload::Source {
                source,
                offset: 1,
                len: 2,
            }
        };

        assert_eq!(payload.bytes().unwrap().as_ref(), &[2, 3]);
    }

    #[test]
    fn payload_truncated_source() {
        let source = SharedSource::new(Cursor::new(vec![1, 2, 3]));
        let payload = Payload::Source {
            source,
            offset: 2,
            len: 4,
        };

        assert!(matches!(payload.bytes(), Err(FlvError::TruncatedInput(_))));
    }

    #[test]
    fn payload_equality() {
        let source = SharedSource::new(Cursor::new(vec![0; 8]));
        let other = SharedSource::new(Cursor::new(vec![0; 8]));
        let range = |source: &SharedSource| Payload::Source {
            source: source.clone(),
            offset: 1,
            len: 2,
        };

        assert_eq!(range(&source), range(&source));
        assert_ne!(range(&source), range(&other));
        assert_eq!(Payload::from(vec![1, 2]), Payload::from(Bytes::from_static(&[1, 2])));
        assert_ne!(range(&source), Payload::from(vec![0, 0]));
    }
}
