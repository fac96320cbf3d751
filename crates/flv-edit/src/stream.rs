//! # FLV Stream
//!
//! [`FlvStream`] holds a file header and its tags in timestamp order, and
//! performs the edits: cropping to a time window, appending other streams,
//! and writing a keyframe index plus summary properties into the
//! `onMetaData` tag.
//!
//! Loaded tags keep their payloads in the file they were parsed from, so
//! loading a large file only costs memory for the tag headers and the
//! metadata tree. Payloads are read back when the stream is saved.
//!
//! ## Example
//!
//! ```no_run
//! use flv_edit::{FlvStream, StreamConfig};
//!
//! fn main() -> Result<(), flv_edit::EditError> {
//!     let config = StreamConfig::default();
//!     let mut stream = FlvStream::open("input.flv", &config)?;
//!
//!     stream.crop(10_000, 20_000)?;
//!     stream.add_metadata();
//!     stream.add_index();
//!     stream.save("output.flv")?;
//!     Ok(())
//! }
//! ```

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use amf0::{Amf0Map, Amf0Value};
use flv::audio::SoundFormat;
use flv::script::{AMF0_ON_METADATA, MetaTag};
use flv::source::ReadSeek;
use flv::video::{Resolution, VideoCodecId};
use flv::{FlvError, FlvHeader, FlvParser, FlvTag, FlvTagData, FlvWriter, SharedSource};
use tracing::{debug, info, warn};

use crate::config::StreamConfig;
use crate::constants::{
    KEYFRAMES_FILEPOSITIONS, KEYFRAMES_TIMES, METADATA_DURATION, METADATA_KEYFRAMES,
    METADATA_LASTTIMESTAMP, METADATA_METADATACREATOR,
};
use crate::error::EditError;
use crate::keyframes::{Keyframe, find_keyframes};
use crate::stats::StreamStats;

/// Where a stream's tags came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamOrigin {
    /// Built in memory, tags come from appended streams
    Blank,
    /// Parsed from a file or reader
    Loaded,
}

#[derive(Debug)]
pub struct FlvStream {
    header: FlvHeader,
    tags: Vec<FlvTag>,
    origin: StreamOrigin,
    stats: StreamStats,
    /// Index of the first Meta tag
    meta_index: Option<usize>,
    config: StreamConfig,
}

impl Default for FlvStream {
    fn default() -> Self {
        Self::new()
    }
}

impl FlvStream {
    /// An empty stream to append into: version 1, no flags, a 9 byte header.
    pub fn new() -> Self {
        Self::with_config(StreamConfig::default())
    }

    pub fn with_config(config: StreamConfig) -> Self {
        Self {
            header: FlvHeader::default(),
            tags: Vec::new(),
            origin: StreamOrigin::Blank,
            stats: StreamStats::default(),
            meta_index: None,
            config,
        }
    }

    /// Loads the file at `path`. The file stays open until every tag parsed
    /// from it has been dropped.
    pub fn open(path: impl AsRef<Path>, config: &StreamConfig) -> Result<Self, EditError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(FlvError::from)?;
        info!(path = %path.display(), "opening FLV file");

        Self::from_reader(BufReader::new(file), config)
    }

    /// Loads a stream from any seekable reader.
    ///
    /// Tags are read until the end of input, or until one is later than
    /// `config.end_ms`, in which case the stream is then cropped to
    /// `[0, end_ms]`.
    pub fn from_reader<R: ReadSeek + 'static>(
        reader: R,
        config: &StreamConfig,
    ) -> Result<Self, EditError> {
        let mut parser = FlvParser::new(SharedSource::new(reader));
        let header = parser.parse_header()?;
        debug!("{header}");

        let mut tags = Vec::new();
        while let Some(tag) = parser.parse_tag()? {
            if let Some(end_ms) = config.end_ms {
                if tag.timestamp_ms > end_ms {
                    debug!(
                        timestamp_ms = tag.timestamp_ms,
                        end_ms, "stopping load past the end bound"
                    );
                    break;
                }
            }

            debug!("{} {tag}", tag.offset.unwrap_or_default());
            tags.push(tag);
        }

        let mut stream = Self {
            header,
            tags,
            origin: StreamOrigin::Loaded,
            stats: StreamStats::default(),
            meta_index: None,
            config: config.clone(),
        };
        stream.refresh_stats()?;
        info!(
            tags = stream.tags.len(),
            duration_ms = stream.duration_ms(),
            "loaded FLV stream"
        );

        if let Some(end_ms) = config.end_ms {
            stream.crop(0, end_ms)?;
        }
        Ok(stream)
    }

    /// Keeps the tags between `start_ms` and `end_ms`, starting on the last
    /// video keyframe at or before `start_ms`, and rebases the result so it
    /// starts at 0.
    ///
    /// Tags that share the start keyframe's timestamp and come right before
    /// it are kept too. The metadata tag is kept only if it falls within the
    /// window. Without a keyframe before `start_ms` the crop starts on the
    /// first keyframe in the window, and a window holding video but no
    /// keyframe crops to nothing.
    pub fn crop(&mut self, start_ms: u32, end_ms: u32) -> Result<(), EditError> {
        if end_ms <= start_ms {
            return Err(EditError::InvalidRange {
                start: start_ms,
                end: end_ms,
            });
        }

        let mut start_index = None;
        let mut end_index = self.tags.len();
        for (index, tag) in self.tags.iter().enumerate() {
            if tag.timestamp_ms <= start_ms && tag.is_keyframe() {
                start_index = Some(index);
            }
            if tag.timestamp_ms > end_ms {
                end_index = index;
                break;
            }
        }

        let window = &self.tags[..end_index];
        let keyframe = match start_index {
            Some(index) => Some(index),
            None => {
                let next = window.iter().position(|tag| tag.is_keyframe());
                if !window.is_empty() {
                    warn!(
                        start_ms,
                        next_keyframe_ms = ?next.map(|index| window[index].timestamp_ms),
                        "no keyframe before the crop start, starting on the next one"
                    );
                }
                next
            }
        };

        let first = match keyframe {
            Some(mut first) => {
                // playback starts on the keyframe, which may be earlier than asked
                let keyframe_ms = self.tags[first].timestamp_ms;
                while first > 0 {
                    let previous = &self.tags[first - 1];
                    if previous.is_video_tag() && !previous.is_keyframe() {
                        break;
                    }
                    if previous.timestamp_ms < keyframe_ms {
                        break;
                    }
                    first -= 1;
                }
                first
            }
            // audio only, nothing to align on
            None if !window.iter().any(|tag| tag.is_video_tag()) => 0,
            None => end_index,
        };

        debug!(
            start_ms,
            end_ms,
            first,
            end_index,
            dropped = self.tags.len() - (end_index - first),
            "crop window"
        );

        self.tags.truncate(end_index);
        self.tags.drain(..first);

        if let Some(base) = self.tags.first().map(|tag| tag.timestamp_ms) {
            // audio muxed behind the keyframe can carry an earlier time
            for tag in &mut self.tags {
                tag.timestamp_ms = tag.timestamp_ms.saturating_sub(base);
            }
        }

        self.meta_index = None;
        self.recompute()?;
        info!(
            start_ms,
            end_ms,
            tags = self.tags.len(),
            "cropped stream"
        );
        Ok(())
    }

    /// Moves the tags of `other` to the end of this stream.
    ///
    /// Metadata tags of `other` are dropped, as are its video tags before
    /// its first keyframe. The first tag taken lands on this stream's last
    /// timestamp and the rest keep their spacing.
    pub fn append(&mut self, other: FlvStream) -> Result<(), EditError> {
        if self.origin == StreamOrigin::Loaded {
            return Err(EditError::UnsupportedAppend);
        }
        if !self.tags.is_empty() {
            self.check_compatible(&other)?;
        }

        let end_ms = self.stats.end_ms;
        let mut offset: Option<i64> = None;
        let mut seen_keyframe = false;
        let mut appended = 0usize;

        for mut tag in other.tags {
            match &tag.data {
                FlvTagData::Meta(_) => continue,
                FlvTagData::Video(video) if !seen_keyframe => {
                    if !video.is_keyframe() {
                        continue;
                    }
                    seen_keyframe = true;
                }
                _ => {}
            }

            let offset = *offset.get_or_insert(end_ms as i64 - tag.timestamp_ms as i64);
            tag.timestamp_ms = (tag.timestamp_ms as i64 + offset).max(0) as u32;
            tag.offset = None;
            self.tags.push(tag);
            appended += 1;
        }

        self.recompute()?;
        info!(
            appended,
            offset = offset.unwrap_or_default(),
            tags = self.tags.len(),
            "appended stream"
        );
        Ok(())
    }

    fn check_compatible(&self, other: &FlvStream) -> Result<(), EditError> {
        let (ours, theirs) = (&self.stats, &other.stats);

        if ours.video_codec != theirs.video_codec {
            return Err(EditError::CodecMismatch {
                media: "video",
                receiver: describe(ours.video_codec),
                donor: describe(theirs.video_codec),
            });
        }
        if ours.audio_codec != theirs.audio_codec {
            return Err(EditError::CodecMismatch {
                media: "audio",
                receiver: describe(ours.audio_codec),
                donor: describe(theirs.audio_codec),
            });
        }
        if ours.resolution != theirs.resolution {
            return Err(EditError::ResolutionMismatch {
                receiver: ours.resolution,
                donor: theirs.resolution,
            });
        }
        Ok(())
    }

    /// Writes a `keyframes` object with parallel `times` (seconds) and
    /// `filepositions` (bytes) arrays into the metadata tag, creating the tag
    /// if needed.
    ///
    /// Positions are computed twice: once to size the index, then again
    /// with the index in place. Both arrays hold plain numbers, so the second
    /// pass does not change the metadata size for a stream whose keyframes
    /// don't change in between.
    pub fn add_index(&mut self) {
        self.with_meta_tag(|_| ());

        let keyframes = find_keyframes(&self.header, &self.tags);
        let mut index = Amf0Map::new();
        index.set(KEYFRAMES_TIMES, keyframe_times(&keyframes));
        index.set(KEYFRAMES_FILEPOSITIONS, keyframe_positions(&keyframes));
        self.with_meta_tag(|meta| meta.set(METADATA_KEYFRAMES, Amf0Value::Object(index)));

        let keyframes = find_keyframes(&self.header, &self.tags);
        self.with_meta_tag(|meta| {
            if let Some(index) = meta
                .metadata
                .get_mut(METADATA_KEYFRAMES)
                .and_then(Amf0Value::as_map_mut)
            {
                index.set(KEYFRAMES_FILEPOSITIONS, keyframe_positions(&keyframes));
            }
        });

        info!(keyframes = keyframes.len(), "added keyframe index");
    }

    /// Sets `duration`, `lasttimestamp` and `metadatacreator` in the metadata
    /// tag, creating the tag if needed.
    pub fn add_metadata(&mut self) {
        self.with_meta_tag(|_| ());

        let (first_ms, last_ms) = match (self.tags.first(), self.tags.last()) {
            (Some(first), Some(last)) => (first.timestamp_ms, last.timestamp_ms),
            _ => (0, 0),
        };
        let duration_s = last_ms.saturating_sub(first_ms) as f64 / 1000.0;
        let creator = self.config.metadata_creator.clone();

        self.with_meta_tag(|meta| {
            meta.set(METADATA_DURATION, Amf0Value::Number(duration_s));
            meta.set(METADATA_LASTTIMESTAMP, Amf0Value::Number(last_ms as f64));
            meta.set(METADATA_METADATACREATOR, Amf0Value::String(creator));
        });

        debug!(duration_s, last_ms, "added metadata");
    }

    /// Runs `f` on the metadata tag, inserting an empty `onMetaData` tag at
    /// the head of the stream first if there is none.
    fn with_meta_tag<T>(&mut self, f: impl FnOnce(&mut MetaTag) -> T) -> T {
        if let Some(index) = self.meta_index {
            if let Some(FlvTagData::Meta(meta)) = self.tags.get_mut(index).map(|tag| &mut tag.data)
            {
                return f(meta);
            }
        }

        let mut meta = MetaTag::new(AMF0_ON_METADATA);
        let result = f(&mut meta);

        self.tags.insert(0, FlvTag::new(0, FlvTagData::Meta(meta)));
        self.meta_index = Some(0);
        self.stats.meta_tags += 1;
        debug!("inserted {AMF0_ON_METADATA} tag at the head of the stream");

        result
    }

    /// Writes the stream to a new file at `path`.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), EditError> {
        let path = path.as_ref();
        let file = File::create(path).map_err(FlvError::WriteFailure)?;

        let bytes = self.write_to(BufWriter::new(file))?;
        info!(path = %path.display(), bytes, "saved FLV file");
        Ok(())
    }

    /// Writes the header and every tag to `writer`, returning the number of
    /// bytes written.
    pub fn write_to<W: Write>(&self, writer: W) -> Result<u64, EditError> {
        let mut writer = FlvWriter::new(writer);
        writer.write_header(&self.header)?;
        for tag in &self.tags {
            writer.write_tag(tag)?;
        }
        writer.flush()?;

        Ok(writer.bytes_written())
    }

    /// Recomputes the statistics and sets the header's audio and video flags
    /// from them.
    fn recompute(&mut self) -> Result<(), EditError> {
        self.refresh_stats()?;
        self.header.set_has_audio(self.stats.audio_tags > 0);
        self.header.set_has_video(self.stats.video_tags > 0);
        Ok(())
    }

    fn refresh_stats(&mut self) -> Result<(), EditError> {
        self.stats = StreamStats::compute(&self.tags)?;
        self.meta_index = self.tags.iter().position(FlvTag::is_script_tag);
        Ok(())
    }

    pub fn header(&self) -> &FlvHeader {
        &self.header
    }

    pub fn tags(&self) -> &[FlvTag] {
        &self.tags
    }

    pub fn stats(&self) -> &StreamStats {
        &self.stats
    }

    pub fn origin(&self) -> StreamOrigin {
        self.origin
    }

    pub fn config(&self) -> &StreamConfig {
        &self.config
    }

    pub fn tag_count(&self) -> usize {
        self.tags.len()
    }

    pub fn has_audio(&self) -> bool {
        self.header.has_audio()
    }

    pub fn has_video(&self) -> bool {
        self.header.has_video()
    }

    pub fn version(&self) -> u8 {
        self.header.version
    }

    pub fn resolution(&self) -> Resolution {
        self.stats.resolution
    }

    pub fn width(&self) -> u32 {
        self.stats.resolution.width
    }

    pub fn height(&self) -> u32 {
        self.stats.resolution.height
    }

    pub fn video_codec(&self) -> Option<VideoCodecId> {
        self.stats.video_codec
    }

    pub fn audio_codec(&self) -> Option<SoundFormat> {
        self.stats.audio_codec
    }

    pub fn duration_ms(&self) -> u32 {
        self.stats.duration_ms()
    }

    pub fn fps(&self) -> f64 {
        self.stats.fps()
    }

    /// The first metadata tag, if any.
    pub fn meta_tag(&self) -> Option<&MetaTag> {
        match &self.tags.get(self.meta_index?)?.data {
            FlvTagData::Meta(meta) => Some(meta),
            _ => None,
        }
    }

    /// Keyframes at the positions they will have once written.
    pub fn keyframes(&self) -> Vec<Keyframe> {
        find_keyframes(&self.header, &self.tags)
    }
}

fn describe<T: std::fmt::Display>(codec: Option<T>) -> String {
    codec.map_or_else(|| "none".to_string(), |codec| codec.to_string())
}

fn keyframe_times(keyframes: &[Keyframe]) -> Amf0Value {
    Amf0Value::StrictArray(
        keyframes
            .iter()
            .map(|keyframe| Amf0Value::Number(keyframe.timestamp_s))
            .collect(),
    )
}

fn keyframe_positions(keyframes: &[Keyframe]) -> Amf0Value {
    Amf0Value::StrictArray(
        keyframes
            .iter()
            .map(|keyframe| Amf0Value::Number(keyframe.file_position as f64))
            .collect(),
    )
}
