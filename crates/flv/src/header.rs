use std::fmt::Display;
use std::io::{self, Read, Write};

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use bytes::Bytes;

use crate::error::FlvError;

pub const FLV_SIGNATURE: [u8; 3] = *b"FLV";
/// Size of the fixed part of the header, before any extension bytes.
pub const FLV_HEADER_SIZE: u32 = 9;
/// Size of the previous-tag-size field following the header and every tag.
pub const FLV_PREVIOUS_TAG_SIZE: u32 = 4;

pub const FLV_FLAG_VIDEO: u8 = 0b0000_0001;
pub const FLV_FLAG_AUDIO: u8 = 0b0000_0100;

// Struct representing the FLV header, 9 bytes plus any extension
#[derive(Debug, Clone, PartialEq)]
pub struct FlvHeader {
    // The version of the FLV file format, 1 byte, usually 0x01
    pub version: u8,
    // Raw flags byte, bit 0 is video and bit 2 is audio
    pub flags: u8,
    // Header bytes beyond the standard 9, carried through untouched
    pub extension: Bytes,
}

impl Default for FlvHeader {
    fn default() -> Self {
        Self::new(false, false)
    }
}

impl Display for FlvHeader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Header v:{} flags: {}", self.version, self.flags)?;

        match (self.has_video(), self.has_audio()) {
            (true, true) => write!(f, " (Video+Audio)")?,
            (true, false) => write!(f, " (Video)")?,
            (false, true) => write!(f, " (Audio)")?,
            (false, false) => {}
        }

        write!(f, " offset:{}", self.data_offset())
    }
}

impl FlvHeader {
    /// A version 1 header with no extension bytes.
    pub fn new(has_audio: bool, has_video: bool) -> Self {
        let mut header = Self {
            version: 1,
            flags: 0,
            extension: Bytes::new(),
        };
        header.set_has_audio(has_audio);
        header.set_has_video(has_video);
        header
    }

    pub fn has_audio(&self) -> bool {
        self.flags & FLV_FLAG_AUDIO != 0
    }

    pub fn has_video(&self) -> bool {
        self.flags & FLV_FLAG_VIDEO != 0
    }

    pub fn set_has_audio(&mut self, has_audio: bool) {
        if has_audio {
            self.flags |= FLV_FLAG_AUDIO;
        } else {
            self.flags &= !FLV_FLAG_AUDIO;
        }
    }

    pub fn set_has_video(&mut self, has_video: bool) {
        if has_video {
            self.flags |= FLV_FLAG_VIDEO;
        } else {
            self.flags &= !FLV_FLAG_VIDEO;
        }
    }

    /// Value of the header size field.
    pub fn data_offset(&self) -> u32 {
        FLV_HEADER_SIZE + self.extension.len() as u32
    }

    /// Bytes occupied on the wire, including the zero previous-tag-size
    /// field. This is where the first tag starts.
    pub fn size(&self) -> u64 {
        (self.data_offset() + FLV_PREVIOUS_TAG_SIZE) as u64
    }

    /// Parses the FLV header and the zero previous-tag-size field after it.
    ///
    /// The reader is left at the first tag.
    pub fn parse<R: Read>(reader: &mut R) -> Result<Self, FlvError> {
        let mut signature = [0u8; 3];
        reader.read_exact(&mut signature)?;
        if signature != FLV_SIGNATURE {
            return Err(FlvError::InvalidSignature(signature));
        }

        // Version is a 1-byte value
        let version = reader.read_u8()?;
        // Flags is a 1-byte value
        let flags = reader.read_u8()?;

        // Data offset is a 4-byte value
        let data_offset = reader.read_u32::<BigEndian>()?;
        if data_offset < FLV_HEADER_SIZE {
            return Err(FlvError::InvalidHeaderOffset(data_offset));
        }

        let extension_len = (data_offset - FLV_HEADER_SIZE) as u64;
        let mut extension = Vec::new();
        reader.by_ref().take(extension_len).read_to_end(&mut extension)?;
        if extension.len() as u64 != extension_len {
            return Err(FlvError::TruncatedInput(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("header extension of {extension_len} bytes is cut short"),
            )));
        }

        let previous_tag_size = reader.read_u32::<BigEndian>()?;
        if previous_tag_size != 0 {
            return Err(FlvError::InvalidPrevLength(previous_tag_size));
        }

        Ok(FlvHeader {
            version,
            flags,
            extension: Bytes::from(extension),
        })
    }

    /// Writes the header followed by the zero previous-tag-size field.
    pub fn encode<W: Write>(&self, writer: &mut W) -> Result<(), FlvError> {
        let mut buf = Vec::with_capacity(self.size() as usize);
        buf.extend_from_slice(&FLV_SIGNATURE);
        buf.push(self.version);
        buf.push(self.flags);
        buf.write_u32::<BigEndian>(self.data_offset())?;
        buf.extend_from_slice(&self.extension);
        buf.write_u32::<BigEndian>(0)?;

        writer.write_all(&buf).map_err(FlvError::WriteFailure)
    }
}
