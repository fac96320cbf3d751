use std::io::{Seek, SeekFrom};

use tracing::trace;

use crate::error::FlvError;
use crate::header::FlvHeader;
use crate::source::SharedSource;
use crate::tag::FlvTag;

/// Walks an FLV file held by a [`SharedSource`], one tag at a time.
///
/// Every tag is checked against its own declared size before the next one
/// is read: tag boundaries are only known from the previous tag, so the first
/// inconsistency aborts the walk.
pub struct FlvParser {
    source: SharedSource,
    position: u64,
}

impl FlvParser {
    pub fn new(source: SharedSource) -> Self {
        Self {
            source,
            position: 0,
        }
    }

    /// Offset of the next tag.
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Parses the file header from the start of the source.
    pub fn parse_header(&mut self) -> Result<FlvHeader, FlvError> {
        let mut reader = self.source.lock();
        reader.seek(SeekFrom::Start(0))?;

        let header = FlvHeader::parse(&mut *reader)?;
        self.position = reader.stream_position()?;
        Ok(header)
    }

    /// Parses the next tag, `Ok(None)` at the end of the file.
    pub fn parse_tag(&mut self) -> Result<Option<FlvTag>, FlvError> {
        let start = self.position;

        let (tag, end) = {
            let mut reader = self.source.lock();
            reader.seek(SeekFrom::Start(start))?;

            let Some(tag) = FlvTag::decode(&mut *reader, &self.source)? else {
                return Ok(None);
            };
            (tag, reader.stream_position()?)
        };

        // The reader has moved over header, declared length and trailer, so
        // this also holds the rebuilt tag to its declared length.
        let consumed = end - start;
        if tag.encoded_size() != consumed {
            return Err(FlvError::CorruptTag {
                offset: start,
                reason: format!(
                    "re-encodes to {} bytes but occupies {consumed}",
                    tag.encoded_size()
                ),
            });
        }

        trace!(offset = start, size = consumed, "parsed {:?} tag", tag.tag_type());
        self.position = end;
        Ok(Some(tag))
    }
}

impl Iterator for FlvParser {
    type Item = Result<FlvTag, FlvError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.parse_tag().transpose()
    }
}
