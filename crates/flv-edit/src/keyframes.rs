use flv::{FlvHeader, FlvTag};
use tracing::trace;

/// A seek point: a video keyframe and where its tag starts in the written
/// file.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Keyframe {
    pub timestamp_s: f64,
    pub file_position: u64,
}

/// Lays the tags out after `header` and records every video keyframe.
///
/// Positions are those the tags will have when written, not the offsets
/// they were parsed from.
pub fn find_keyframes(header: &FlvHeader, tags: &[FlvTag]) -> Vec<Keyframe> {
    let mut keyframes = Vec::new();
    let mut position = header.size();

    for tag in tags {
        if tag.is_keyframe() {
            let keyframe = Keyframe {
                timestamp_s: tag.timestamp_ms as f64 / 1000.0,
                file_position: position,
            };
            trace!(
                timestamp_s = keyframe.timestamp_s,
                position, "keyframe"
            );
            keyframes.push(keyframe);
        }
        position += tag.encoded_size();
    }

    keyframes
}
