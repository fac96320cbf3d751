use std::fmt;

use flv::audio::SoundFormat;
use flv::video::{Resolution, VideoCodecId};
use flv::{FlvError, FlvTag, FlvTagData};

/// Figures derived from a stream's tags.
///
/// Codecs and resolution are the first ones seen: the video codec and the
/// resolution come from the first keyframe that has them, the audio codec
/// from the first non-empty audio tag.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StreamStats {
    pub video_tags: u32,
    pub audio_tags: u32,
    pub meta_tags: u32,
    pub undefined_tags: u32,
    pub keyframes: u32,

    pub resolution: Resolution,
    pub video_codec: Option<VideoCodecId>,
    pub audio_codec: Option<SoundFormat>,

    /// Timestamp of the first tag
    pub start_ms: u32,
    /// Timestamp of the last tag
    pub end_ms: u32,
}

impl StreamStats {
    /// Walks every tag once. Sorenson keyframes are read back from their
    /// source until a resolution is known.
    pub fn compute(tags: &[FlvTag]) -> Result<Self, FlvError> {
        let mut stats = Self::default();
        for tag in tags {
            stats.add_tag(tag)?;
        }

        if let (Some(first), Some(last)) = (tags.first(), tags.last()) {
            stats.start_ms = first.timestamp_ms;
            stats.end_ms = last.timestamp_ms;
        }
        Ok(stats)
    }

    fn add_tag(&mut self, tag: &FlvTag) -> Result<(), FlvError> {
        match &tag.data {
            FlvTagData::Audio(audio) => {
                self.audio_tags += 1;
                if self.audio_codec.is_none() {
                    self.audio_codec = audio.sound_format();
                }
            }
            FlvTagData::Video(video) => {
                self.video_tags += 1;
                if video.is_keyframe() {
                    self.keyframes += 1;

                    if !self.resolution.is_known() {
                        self.resolution = video.resolution()?;
                    }
                    if self.video_codec.is_none() {
                        self.video_codec = video.codec_id();
                    }
                }
            }
            FlvTagData::Meta(_) => self.meta_tags += 1,
            FlvTagData::Undefined(_) => self.undefined_tags += 1,
        }
        Ok(())
    }

    pub fn tag_count(&self) -> u32 {
        self.video_tags + self.audio_tags + self.meta_tags + self.undefined_tags
    }

    pub fn duration_ms(&self) -> u32 {
        self.end_ms.saturating_sub(self.start_ms)
    }

    pub fn duration_s(&self) -> f64 {
        self.duration_ms() as f64 / 1000.0
    }

    /// Video tags per second, 0 for a stream without duration.
    pub fn fps(&self) -> f64 {
        let duration = self.duration_s();
        if duration > 0.0 {
            self.video_tags as f64 / duration
        } else {
            0.0
        }
    }

    /// Average seconds between keyframes, 0 without keyframes.
    pub fn keyframe_interval_s(&self) -> f64 {
        if self.keyframes > 0 {
            self.duration_s() / self.keyframes as f64
        } else {
            0.0
        }
    }
}

impl fmt::Display for StreamStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Stream Info")?;
        self.fmt_tag_info(f)?;
        self.fmt_media_info(f)?;
        self.fmt_timing_info(f)
    }
}

impl StreamStats {
    fn fmt_tag_info(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Tags Video: {}, Audio: {}, Meta: {}, Undefined: {}",
            self.video_tags, self.audio_tags, self.meta_tags, self.undefined_tags
        )
    }

    fn fmt_media_info(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(codec) = self.video_codec {
            writeln!(
                f,
                "Video: {codec} {}, Keyframes: {}",
                self.resolution, self.keyframes
            )?;
        }
        if let Some(codec) = self.audio_codec {
            writeln!(f, "Audio: {codec}")?;
        }
        Ok(())
    }

    fn fmt_timing_info(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Start: {:.3}s, End: {:.3}s, Duration: {:.3}s @ {:.2}fps, Keyframe interval: {:.3}s",
            self.start_ms as f64 / 1000.0,
            self.end_ms as f64 / 1000.0,
            self.duration_s(),
            self.fps(),
            self.keyframe_interval_s()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{audio_tag, h263_keyframe, inter_frame, meta_tag};

    #[test]
    fn test_compute() {
        let tags = vec![
            meta_tag(0),
            h263_keyframe(0, 5),
            audio_tag(0),
            inter_frame(500),
            h263_keyframe(1000, 3),
            audio_tag(1000),
            inter_frame(2000),
        ];

        let stats = StreamStats::compute(&tags).unwrap();
        assert_eq!(stats.video_tags, 4);
        assert_eq!(stats.audio_tags, 2);
        assert_eq!(stats.meta_tags, 1);
        assert_eq!(stats.undefined_tags, 0);
        assert_eq!(stats.keyframes, 2);
        assert_eq!(stats.tag_count(), 7);

        // first keyframe wins
        assert_eq!(stats.resolution, Resolution::new(320, 240));
        assert_eq!(stats.video_codec, Some(VideoCodecId::SorensonH263));
        assert_eq!(stats.audio_codec, Some(SoundFormat::Mp3));

        assert_eq!(stats.start_ms, 0);
        assert_eq!(stats.end_ms, 2000);
        assert_eq!(stats.duration_ms(), 2000);
        assert_eq!(stats.fps(), 2.0);
        assert_eq!(stats.keyframe_interval_s(), 1.0);
    }

    #[test]
    fn test_empty() {
        let stats = StreamStats::compute(&[]).unwrap();
        assert_eq!(stats, StreamStats::default());
        assert_eq!(stats.fps(), 0.0);
        assert_eq!(stats.keyframe_interval_s(), 0.0);
    }

    #[test]
    fn test_display() {
        let tags = vec![h263_keyframe(0, 5), audio_tag(0), inter_frame(2000)];
        let stats = StreamStats::compute(&tags).unwrap();

        assert_eq!(
            stats.to_string(),
            "Stream Info\n\
             Tags Video: 2, Audio: 1, Meta: 0, Undefined: 0\n\
             Video: Sorenson H.263 320x240, Keyframes: 1\n\
             Audio: MP3\n\
             Start: 0.000s, End: 2.000s, Duration: 2.000s @ 1.00fps, Keyframe interval: 2.000s"
        );
    }
}
