use flv::FlvError;
use flv::video::Resolution;
use thiserror::Error;

/// Errors raised while loading, editing or saving a stream.
#[derive(Debug, Error)]
pub enum EditError {
    #[error("End time must be larger than start time ({start}ms vs {end}ms)")]
    InvalidRange { start: u32, end: u32 },

    #[error("Cannot append to a stream that was loaded from a file")]
    UnsupportedAppend,

    /// `media` is "audio" or "video"; codecs are rendered for display.
    #[error("Cannot append, {media} codecs differ: {receiver} vs {donor}")]
    CodecMismatch {
        media: &'static str,
        receiver: String,
        donor: String,
    },

    #[error("Cannot append, resolutions differ: {receiver} vs {donor}")]
    ResolutionMismatch {
        receiver: Resolution,
        donor: Resolution,
    },

    #[error(transparent)]
    Flv(#[from] FlvError),
}
