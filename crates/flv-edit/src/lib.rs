//! Editing of whole FLV files: loading, cropping to a time window, joining
//! streams, and writing a keyframe seek index into the `onMetaData` tag.

pub mod config;
pub mod constants;
pub mod error;
pub mod keyframes;
pub mod stats;
pub mod stream;

#[cfg(test)]
mod test_utils;

pub use config::{StreamConfig, StreamConfigBuilder};
pub use error::EditError;
pub use keyframes::{Keyframe, find_keyframes};
pub use stats::StreamStats;
pub use stream::{FlvStream, StreamOrigin};
