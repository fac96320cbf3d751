//! Builders for in-memory tags and files shared by the tests.

use std::io::Cursor;

use flv::audio::AudioTag;
use flv::script::{AMF0_ON_METADATA, MetaTag};
use flv::video::VideoTag;
use flv::{FlvHeader, FlvTag, FlvTagData};

use crate::{FlvStream, StreamConfig};

/// Initialize tracing for tests with appropriate settings
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt::fmt()
        .with_max_level(tracing::Level::TRACE)
        .with_test_writer()
        .try_init();
}

/// Sorenson H.263 picture header with one of the canned size codes (2 to 6).
pub fn h263_payload(size_code: u8) -> Vec<u8> {
    let mut bits: u64 = 1; // 17-bit start code
    bits <<= 5; // version
    bits = (bits << 8) | 0x2A; // temporal reference
    bits = (bits << 3) | size_code as u64;
    bits <<= 64 - 33;
    bits.to_be_bytes().to_vec()
}

/// Sorenson keyframe; size code 5 is 320x240, 3 is 176x144.
pub fn h263_keyframe(timestamp_ms: u32, size_code: u8) -> FlvTag {
    FlvTag::new(
        timestamp_ms,
        FlvTagData::Video(VideoTag::new(1, 2, h263_payload(size_code))),
    )
}

/// Sorenson inter frame with a filler payload.
pub fn inter_frame(timestamp_ms: u32) -> FlvTag {
    FlvTag::new(
        timestamp_ms,
        FlvTagData::Video(VideoTag::new(2, 2, vec![0xAB; 12])),
    )
}

/// Keyframe of another codec, On2 VP6.
pub fn vp6_keyframe(timestamp_ms: u32) -> FlvTag {
    FlvTag::new(
        timestamp_ms,
        FlvTagData::Video(VideoTag::new(1, 4, vec![0xCD; 16])),
    )
}

/// MP3, 44kHz, 16 bit, stereo.
pub fn audio_tag(timestamp_ms: u32) -> FlvTag {
    FlvTag::new(
        timestamp_ms,
        FlvTagData::Audio(AudioTag::new(0x2F, vec![0x11; 7])),
    )
}

pub fn meta_tag(timestamp_ms: u32) -> FlvTag {
    FlvTag::new(
        timestamp_ms,
        FlvTagData::Meta(MetaTag::new(AMF0_ON_METADATA)),
    )
}

/// Encodes a complete file.
pub fn flv_file(tags: &[FlvTag]) -> Vec<u8> {
    let mut out = Vec::new();
    FlvHeader::new(true, true).encode(&mut out).unwrap();
    for tag in tags {
        tag.encode(&mut out).unwrap();
    }
    out
}

/// Loads `tags` back through the parser, so payloads are source ranges.
pub fn loaded_stream(tags: &[FlvTag]) -> FlvStream {
    FlvStream::from_reader(Cursor::new(flv_file(tags)), &StreamConfig::default()).unwrap()
}

pub fn timestamps(stream: &FlvStream) -> Vec<u32> {
    stream.tags().iter().map(|tag| tag.timestamp_ms).collect()
}
