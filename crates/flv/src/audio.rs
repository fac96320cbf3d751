//! # FLV Audio Module
//!
//! Audio tags are kept as their leading flags byte plus an opaque remainder.
//! The flags byte packs the sound format (high nibble), the sample rate
//! code (bits 2-3), the sample size (bit 1) and the channel layout (bit 0).
//!
//! ## Specifications
//!
//! - [Flash Video File Format Specification v10](https://www.adobe.com/content/dam/acom/en/devnet/flv/video_file_format_spec_v10.pdf)

use std::fmt;

use crate::source::Payload;

#[derive(Debug, Clone, PartialEq, Eq, Copy, Hash)]
pub enum SoundFormat {
    /// Uncompressed PCM audio
    Pcm,
    /// ADPCM compressed audio
    AdPcm,
    Mp3,
    PcmLe,
    Nellymoser16khzMono,
    Nellymoser8khzMono,
    Nellymoser,
    G711ALaw,
    G711MuLaw,
    Aac,
    Speex,
    Mp38k,
    DeviceSpecific,
    /// Reserved or extended formats, kept as their raw nibble
    Unknown(u8),
}

impl From<u8> for SoundFormat {
    fn from(value: u8) -> Self {
        match value {
            0 => SoundFormat::Pcm,
            1 => SoundFormat::AdPcm,
            2 => SoundFormat::Mp3,
            3 => SoundFormat::PcmLe,
            4 => SoundFormat::Nellymoser16khzMono,
            5 => SoundFormat::Nellymoser8khzMono,
            6 => SoundFormat::Nellymoser,
            7 => SoundFormat::G711ALaw,
            8 => SoundFormat::G711MuLaw,
            10 => SoundFormat::Aac,
            11 => SoundFormat::Speex,
            14 => SoundFormat::Mp38k,
            15 => SoundFormat::DeviceSpecific,
            _ => SoundFormat::Unknown(value),
        }
    }
}

impl From<SoundFormat> for u8 {
    fn from(value: SoundFormat) -> Self {
        match value {
            SoundFormat::Pcm => 0,
            SoundFormat::AdPcm => 1,
            SoundFormat::Mp3 => 2,
            SoundFormat::PcmLe => 3,
            SoundFormat::Nellymoser16khzMono => 4,
            SoundFormat::Nellymoser8khzMono => 5,
            SoundFormat::Nellymoser => 6,
            SoundFormat::G711ALaw => 7,
            SoundFormat::G711MuLaw => 8,
            SoundFormat::Aac => 10,
            SoundFormat::Speex => 11,
            SoundFormat::Mp38k => 14,
            SoundFormat::DeviceSpecific => 15,
            SoundFormat::Unknown(value) => value,
        }
    }
}

impl fmt::Display for SoundFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SoundFormat::Pcm => write!(f, "Uncompressed"),
            SoundFormat::AdPcm => write!(f, "ADPCM"),
            SoundFormat::Mp3 => write!(f, "MP3"),
            SoundFormat::PcmLe => write!(f, "PCM-LE"),
            SoundFormat::Nellymoser16khzMono => write!(f, "Nellymoser 16kHz mono"),
            SoundFormat::Nellymoser8khzMono => write!(f, "Nellymoser 8kHz mono"),
            SoundFormat::Nellymoser => write!(f, "Nellymoser"),
            SoundFormat::G711ALaw => write!(f, "G.711 A-law"),
            SoundFormat::G711MuLaw => write!(f, "G.711 mu-law"),
            SoundFormat::Aac => write!(f, "AAC"),
            SoundFormat::Speex => write!(f, "Speex"),
            SoundFormat::Mp38k => write!(f, "MP3 8kHz"),
            SoundFormat::DeviceSpecific => write!(f, "Device specific"),
            SoundFormat::Unknown(value) => write!(f, "Unknown({value})"),
        }
    }
}

/// Sample rates indexed by the 2-bit rate code.
const SAMPLE_RATES_HZ: [u32; 4] = [5500, 11000, 22000, 44000];

#[derive(Debug, Clone, PartialEq)]
pub struct AudioTag {
    /// Flags byte, absent only for an empty payload
    pub flags: Option<u8>,
    /// Payload after the flags byte
    pub data: Payload,
}

impl AudioTag {
    pub fn new(flags: u8, data: impl Into<Payload>) -> Self {
        Self {
            flags: Some(flags),
            data: data.into(),
        }
    }

    /// Length of the tag body as declared on the wire.
    pub fn data_size(&self) -> usize {
        self.flags.is_some() as usize + self.data.len()
    }

    pub fn sound_format(&self) -> Option<SoundFormat> {
        self.flags.map(|flags| SoundFormat::from(flags >> 4))
    }

    pub fn sample_rate_hz(&self) -> Option<u32> {
        self.flags
            .map(|flags| SAMPLE_RATES_HZ[((flags & 0x0C) >> 2) as usize])
    }

    pub fn sample_size_bits(&self) -> Option<u8> {
        self.flags
            .map(|flags| if flags & 0x02 != 0 { 16 } else { 8 })
    }

    pub fn channels(&self) -> Option<u8> {
        self.flags.map(|flags| if flags & 0x01 != 0 { 2 } else { 1 })
    }
}

impl fmt::Display for AudioTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (Some(format), Some(rate), Some(bits), Some(channels)) = (
            self.sound_format(),
            self.sample_rate_hz(),
            self.sample_size_bits(),
            self.channels(),
        ) else {
            return write!(f, "empty");
        };

        let layout = if channels == 2 { "stereo" } else { "mono" };
        write!(f, "{layout} {bits}bit {}khz {format}", rate as f64 / 1000.0)
    }
}
