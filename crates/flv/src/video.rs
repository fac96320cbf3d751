//! # FLV Video Module
//!
//! Video tags are kept as their leading info byte (frame type in the high
//! nibble, codec id in the low nibble) plus an opaque remainder.
//!
//! Picture dimensions are not stored. They are read on demand from the
//! payload, and only for Sorenson H.263, whose picture header has a fixed
//! bit layout:
//!
//! ```text
//! | picture start code | version | temporal reference | picture size |
//! |      17 bits       |  5 bits |       8 bits       |    3 bits    |
//! ```
//!
//! Every other codec reports 0x0.
//!
//! ## Specifications
//!
//! - [Flash Video File Format Specification v10](https://www.adobe.com/content/dam/acom/en/devnet/flv/video_file_format_spec_v10.pdf)

use std::fmt;

use bytes_util::read_bits_at;

use crate::error::FlvError;
use crate::source::Payload;

/// Represents the type of video frame in an FLV video tag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VideoFrameType {
    /// Key frame, a valid cut and splice point
    KeyFrame,

    /// Inter frame
    InterFrame,

    /// Disposable inter frame, H.263 only
    DisposableInterFrame,

    /// Generated key frame, reserved for server use only
    GeneratedKeyFrame,

    /// Video info/command frame
    VideoInfoFrame,

    Unknown(u8),
}

impl From<u8> for VideoFrameType {
    fn from(value: u8) -> Self {
        match value {
            1 => Self::KeyFrame,
            2 => Self::InterFrame,
            3 => Self::DisposableInterFrame,
            4 => Self::GeneratedKeyFrame,
            5 => Self::VideoInfoFrame,
            _ => Self::Unknown(value),
        }
    }
}

impl fmt::Display for VideoFrameType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::KeyFrame => write!(f, "Keyframe"),
            Self::InterFrame => write!(f, "Interframe"),
            Self::DisposableInterFrame => write!(f, "Disposable interframe"),
            Self::GeneratedKeyFrame => write!(f, "Generated keyframe"),
            Self::VideoInfoFrame => write!(f, "Info frame"),
            Self::Unknown(value) => write!(f, "Unknown({value})"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VideoCodecId {
    /// Sorenson H.263
    SorensonH263,

    /// Screen video
    ScreenVideo,

    /// On2 VP6
    On2VP6,

    /// On2 VP6 with alpha channel
    On2VP6Alpha,

    /// Screen video version 2
    ScreenVideo2,

    /// AVC (H.264)
    Avc,

    Unknown(u8),
}

impl From<u8> for VideoCodecId {
    fn from(value: u8) -> Self {
        match value {
            2 => Self::SorensonH263,
            3 => Self::ScreenVideo,
            4 => Self::On2VP6,
            5 => Self::On2VP6Alpha,
            6 => Self::ScreenVideo2,
            7 => Self::Avc,
            _ => Self::Unknown(value),
        }
    }
}

impl From<VideoCodecId> for u8 {
    fn from(value: VideoCodecId) -> Self {
        match value {
            VideoCodecId::SorensonH263 => 2,
            VideoCodecId::ScreenVideo => 3,
            VideoCodecId::On2VP6 => 4,
            VideoCodecId::On2VP6Alpha => 5,
            VideoCodecId::ScreenVideo2 => 6,
            VideoCodecId::Avc => 7,
            VideoCodecId::Unknown(value) => value,
        }
    }
}

impl fmt::Display for VideoCodecId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SorensonH263 => write!(f, "Sorenson H.263"),
            Self::ScreenVideo => write!(f, "Screen video"),
            Self::On2VP6 => write!(f, "On2 VP6"),
            Self::On2VP6Alpha => write!(f, "On2 VP6 alpha"),
            Self::ScreenVideo2 => write!(f, "Screen video 2"),
            Self::Avc => write!(f, "AVC"),
            Self::Unknown(value) => write!(f, "Unknown({value})"),
        }
    }
}

/// Picture dimensions in pixels. `0x0` means unknown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub const fn is_known(&self) -> bool {
        self.width != 0 && self.height != 0
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Sorenson picture header bit positions, counted from the byte after the
/// info byte.
const H263_PICTURE_SIZE_BIT: usize = 30;
const H263_WIDTH_BIT: usize = 33;

/// Canned sizes for picture size codes 2 to 6.
const H263_PICTURE_SIZES: [Resolution; 5] = [
    Resolution::new(352, 288), // CIF
    Resolution::new(176, 144), // QCIF
    Resolution::new(128, 96),  // SQCIF
    Resolution::new(320, 240),
    Resolution::new(160, 120),
];

/// Enough of a Sorenson header to cover the 16-bit dimension form.
const H263_HEADER_LEN: usize = 9;

#[derive(Debug, Clone, PartialEq)]
pub struct VideoTag {
    /// Info byte, absent only for an empty payload
    pub info: Option<u8>,
    /// Payload after the info byte
    pub data: Payload,
}

impl VideoTag {
    pub fn new(frame_type: u8, codec_id: u8, data: impl Into<Payload>) -> Self {
        Self {
            info: Some((frame_type << 4) | (codec_id & 0x0F)),
            data: data.into(),
        }
    }

    /// Length of the tag body as declared on the wire.
    pub fn data_size(&self) -> usize {
        self.info.is_some() as usize + self.data.len()
    }

    pub fn frame_type(&self) -> Option<VideoFrameType> {
        self.info.map(|info| VideoFrameType::from(info >> 4))
    }

    pub fn codec_id(&self) -> Option<VideoCodecId> {
        self.info.map(|info| VideoCodecId::from(info & 0x0F))
    }

    pub fn is_keyframe(&self) -> bool {
        self.frame_type() == Some(VideoFrameType::KeyFrame)
    }

    /// Picture dimensions read from the payload.
    ///
    /// Reads back from the source for Sorenson H.263 tags; a payload too
    /// short for its picture header is [`FlvError::TruncatedInput`].
    pub fn resolution(&self) -> Result<Resolution, FlvError> {
        if self.codec_id() != Some(VideoCodecId::SorensonH263) {
            return Ok(Resolution::default());
        }

        let header = self.data.head(H263_HEADER_LEN)?;
        let resolution = match read_bits_at(&header, H263_PICTURE_SIZE_BIT, 3)? {
            0 => Resolution::new(
                read_bits_at(&header, H263_WIDTH_BIT, 8)?,
                read_bits_at(&header, H263_WIDTH_BIT + 8, 8)?,
            ),
            1 => Resolution::new(
                read_bits_at(&header, H263_WIDTH_BIT, 16)?,
                read_bits_at(&header, H263_WIDTH_BIT + 16, 16)?,
            ),
            code @ 2..=6 => H263_PICTURE_SIZES[code as usize - 2],
            _ => Resolution::default(),
        };

        Ok(resolution)
    }
}

impl fmt::Display for VideoTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (Some(frame_type), Some(codec)) = (self.frame_type(), self.codec_id()) else {
            return write!(f, "empty");
        };

        write!(f, "type:{frame_type} codec:{codec}")?;
        if frame_type == VideoFrameType::KeyFrame {
            match self.resolution() {
                Ok(resolution) => write!(
                    f,
                    "\n\twidth:{} height:{}",
                    resolution.width, resolution.height
                )?,
                Err(e) => write!(f, "\n\tdimensions unavailable: {e}")?,
            }
        }
        Ok(())
    }
}
