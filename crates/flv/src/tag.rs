use std::fmt;
use std::io::{Read, Seek, SeekFrom, Write};

use byteorder::{BigEndian, ReadBytesExt};
use bytes_util::{U24_MAX, range_check};

use crate::audio::AudioTag;
use crate::error::FlvError;
use crate::header::FLV_PREVIOUS_TAG_SIZE;
use crate::script::MetaTag;
use crate::source::{Payload, SharedSource};
use crate::video::VideoTag;

/// Size of the tag header: type, data size, timestamp and 4 reserved bytes.
pub const FLV_TAG_HEADER_SIZE: u32 = 11;

/// An FLV Tag
///
/// Tags have different types and thus different data structures. To accommodate
/// this the [`FlvTagData`] enum is used.
///
/// Defined by:
/// - video_file_format_spec_v10.pdf (Chapter 1 - The FLV File Format - FLV
///   tags)
///
/// The timestamp is the 24-bit field only. The 4 bytes after it (extended
/// timestamp and stream id) are kept as opaque reserved bytes and written back
/// unchanged.
#[derive(Debug, Clone, PartialEq)]
pub struct FlvTag {
    /// Offset of the tag in the file it was parsed from, `None` when built in
    /// memory
    pub offset: Option<u64>,
    /// A timestamp in milliseconds
    pub timestamp_ms: u32,
    pub reserved: [u8; 4],
    pub data: FlvTagData,
}

/// FLV Tag Type
///
/// This is the type of the tag.
///
/// Defined by:
/// - video_file_format_spec_v10.pdf (Chapter 1 - The FLV File Format - FLV tags)
///
/// The 3 types that are supported are:
/// - Audio(8)
/// - Video(9)
/// - ScriptData(18)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlvTagType {
    Audio,
    Video,
    ScriptData,
    Unknown(u8),
}

impl From<u8> for FlvTagType {
    fn from(value: u8) -> Self {
        match value {
            8 => FlvTagType::Audio,
            9 => FlvTagType::Video,
            18 => FlvTagType::ScriptData,
            _ => FlvTagType::Unknown(value),
        }
    }
}

impl From<FlvTagType> for u8 {
    fn from(value: FlvTagType) -> Self {
        match value {
            FlvTagType::Audio => 8,
            FlvTagType::Video => 9,
            FlvTagType::ScriptData => 18,
            FlvTagType::Unknown(value) => value,
        }
    }
}

/// A tag of a type we don't interpret, kept with its raw type byte.
#[derive(Debug, Clone, PartialEq)]
pub struct UndefinedTag {
    pub tag_type: u8,
    pub data: Payload,
}

/// FLV Tag Data
///
/// This enum contains the body of the different types of tags.
#[derive(Debug, Clone, PartialEq)]
pub enum FlvTagData {
    /// When the FlvTagType is Audio(8)
    Audio(AudioTag),
    /// When the FlvTagType is Video(9)
    Video(VideoTag),
    /// When the FlvTagType is ScriptData(18) and the body decodes
    Meta(MetaTag),
    /// Any other tag, including script tags too short to hold a name
    Undefined(UndefinedTag),
}

impl FlvTag {
    pub fn new(timestamp_ms: u32, data: FlvTagData) -> Self {
        Self {
            offset: None,
            timestamp_ms,
            reserved: [0; 4],
            data,
        }
    }

    pub fn tag_type(&self) -> FlvTagType {
        match &self.data {
            FlvTagData::Audio(_) => FlvTagType::Audio,
            FlvTagData::Video(_) => FlvTagType::Video,
            FlvTagData::Meta(_) => FlvTagType::ScriptData,
            FlvTagData::Undefined(tag) => FlvTagType::from(tag.tag_type),
        }
    }

    /// Length of the body, as written in the data size field.
    pub fn data_size(&self) -> usize {
        match &self.data {
            FlvTagData::Audio(tag) => tag.data_size(),
            FlvTagData::Video(tag) => tag.data_size(),
            FlvTagData::Meta(tag) => tag.data_size(),
            FlvTagData::Undefined(tag) => tag.data.len(),
        }
    }

    /// Bytes the tag occupies on the wire, trailing size field included.
    pub fn encoded_size(&self) -> u64 {
        self.data_size() as u64 + (FLV_TAG_HEADER_SIZE + FLV_PREVIOUS_TAG_SIZE) as u64
    }

    pub fn is_video_tag(&self) -> bool {
        matches!(self.data, FlvTagData::Video(_))
    }

    pub fn is_audio_tag(&self) -> bool {
        matches!(self.data, FlvTagData::Audio(_))
    }

    pub fn is_script_tag(&self) -> bool {
        matches!(self.data, FlvTagData::Meta(_))
    }

    pub fn is_keyframe(&self) -> bool {
        match &self.data {
            FlvTagData::Video(video) => video.is_keyframe(),
            _ => false,
        }
    }

    /// Decodes the tag at the reader's position.
    ///
    /// Returns `Ok(None)` when the reader is at the end of input. Opaque
    /// payloads are skipped over and recorded as ranges of `source`, which
    /// must be the reader's own source.
    pub fn decode<R: Read + Seek>(
        reader: &mut R,
        source: &SharedSource,
    ) -> Result<Option<Self>, FlvError> {
        let offset = reader.stream_position()?;

        let mut tag_type = [0u8; 1];
        if reader.read(&mut tag_type)? == 0 {
            return Ok(None);
        }
        let tag_type = tag_type[0];

        let data_size = reader.read_u24::<BigEndian>()?;
        let timestamp_ms = reader.read_u24::<BigEndian>()?;
        let mut reserved = [0u8; 4];
        reader.read_exact(&mut reserved)?;

        let body_offset = offset + FLV_TAG_HEADER_SIZE as u64;
        let body_len = data_size as usize;

        let data = match FlvTagType::from(tag_type) {
            FlvTagType::Audio => {
                let (flags, data) = Self::demux_opaque(reader, source, body_offset, body_len)?;
                FlvTagData::Audio(AudioTag { flags, data })
            }
            FlvTagType::Video => {
                let (info, data) = Self::demux_opaque(reader, source, body_offset, body_len)?;
                FlvTagData::Video(VideoTag { info, data })
            }
            FlvTagType::ScriptData if body_len >= 2 => {
                let mut body = vec![0u8; body_len];
                reader.read_exact(&mut body)?;

                let (mut meta, consumed) = MetaTag::demux(&body)?;
                if !meta.extra.is_empty() {
                    meta.extra = Payload::Source {
                        source: source.clone(),
                        offset: body_offset + consumed as u64,
                        len: body_len - consumed,
                    };
                }
                FlvTagData::Meta(meta)
            }
            _ => {
                let data = Self::skip_payload(reader, source, body_offset, body_len)?;
                FlvTagData::Undefined(UndefinedTag { tag_type, data })
            }
        };

        let previous_tag_size = reader.read_u32::<BigEndian>()?;
        let expected = data_size + FLV_TAG_HEADER_SIZE;
        if previous_tag_size != expected {
            return Err(FlvError::InconsistentTagSize {
                offset,
                expected,
                found: previous_tag_size,
            });
        }

        Ok(Some(FlvTag {
            offset: Some(offset),
            timestamp_ms,
            reserved,
            data,
        }))
    }

    /// Reads the leading byte of an audio or video body and records the rest
    /// as a source range.
    fn demux_opaque<R: Read + Seek>(
        reader: &mut R,
        source: &SharedSource,
        body_offset: u64,
        body_len: usize,
    ) -> Result<(Option<u8>, Payload), FlvError> {
        if body_len == 0 {
            return Ok((None, Payload::empty()));
        }

        let first = reader.read_u8()?;
        let data = Self::skip_payload(reader, source, body_offset + 1, body_len - 1)?;
        Ok((Some(first), data))
    }

    fn skip_payload<R: Seek>(
        reader: &mut R,
        source: &SharedSource,
        offset: u64,
        len: usize,
    ) -> Result<Payload, FlvError> {
        if len == 0 {
            return Ok(Payload::empty());
        }

        reader.seek(SeekFrom::Current(len as i64))?;
        Ok(Payload::Source {
            source: source.clone(),
            offset,
            len,
        })
    }

    /// Writes the tag and its trailing size field.
    ///
    /// Source-backed payloads are read back as they are written.
    pub fn encode<W: Write>(&self, writer: &mut W) -> Result<(), FlvError> {
        let data_size = self.data_size();
        if data_size > U24_MAX as usize {
            return Err(FlvError::TagTooLarge(data_size));
        }
        let timestamp_ms = self.timestamp_ms;
        range_check!(timestamp_ms, 0, U24_MAX)
            .map_err(|_| FlvError::TimestampOverflow(timestamp_ms))?;

        let data_size = data_size as u32;
        let mut header = [0u8; FLV_TAG_HEADER_SIZE as usize];
        header[0] = self.tag_type().into();
        header[1..4].copy_from_slice(&data_size.to_be_bytes()[1..]);
        header[4..7].copy_from_slice(&timestamp_ms.to_be_bytes()[1..]);
        header[7..].copy_from_slice(&self.reserved);
        writer.write_all(&header).map_err(FlvError::WriteFailure)?;

        match &self.data {
            FlvTagData::Audio(AudioTag { flags: first, data })
            | FlvTagData::Video(VideoTag { info: first, data }) => {
                if let Some(first) = first {
                    writer.write_all(&[*first]).map_err(FlvError::WriteFailure)?;
                }
                data.write_to(writer)?;
            }
            FlvTagData::Meta(meta) => meta.mux(writer)?,
            FlvTagData::Undefined(tag) => tag.data.write_to(writer)?,
        }

        writer
            .write_all(&(data_size + FLV_TAG_HEADER_SIZE).to_be_bytes())
            .map_err(FlvError::WriteFailure)
    }
}

impl fmt::Display for FlvTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (time, length) = (self.timestamp_ms, self.data_size());
        match &self.data {
            FlvTagData::Audio(audio) => write!(f, "AudioTag time:{time} length:{length} {audio}"),
            FlvTagData::Video(video) => write!(f, "VideoTag time:{time} length:{length} {video}"),
            FlvTagData::Meta(meta) => write!(f, "MetaTag time:{time} length:{length}\n{meta}"),
            FlvTagData::Undefined(tag) => write!(
                f,
                "UndefinedTag type:{} time:{time} length:{length}",
                tag.tag_type
            ),
        }
    }
}
