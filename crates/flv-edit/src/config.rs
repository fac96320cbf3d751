use std::fmt::Display;

use crate::constants::DEFAULT_CREATOR;

#[derive(Debug, Clone, PartialEq)]
pub struct StreamConfig {
    /// Tags past this timestamp are not loaded, and the stream is cropped to
    /// `[0, end_ms]` once loaded
    pub end_ms: Option<u32>,

    /// Value of the `metadatacreator` property
    pub metadata_creator: String,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            end_ms: None,
            metadata_creator: DEFAULT_CREATOR.to_string(),
        }
    }
}

impl Display for StreamConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let end_display = match self.end_ms {
            Some(end_ms) => format!("{:.3}s", end_ms as f64 / 1000.0),
            None => "unbounded".to_string(),
        };

        write!(
            f,
            "StreamConfig {{ end: {}, metadata_creator: {:?} }}",
            end_display, self.metadata_creator
        )
    }
}

impl StreamConfig {
    pub fn builder() -> StreamConfigBuilder {
        StreamConfigBuilder::default()
    }
}

#[derive(Debug, Clone, Default)]
pub struct StreamConfigBuilder {
    config: StreamConfig,
}

impl StreamConfigBuilder {
    pub fn end_ms(mut self, end_ms: u32) -> Self {
        self.config.end_ms = Some(end_ms);
        self
    }

    /// Load end bound in seconds; non-positive values leave the stream
    /// unbounded.
    pub fn end_s(mut self, end_s: f64) -> Self {
        if end_s > 0.0 {
            self.config.end_ms = Some((end_s * 1000.0).round() as u32);
        }
        self
    }

    pub fn metadata_creator(mut self, creator: impl Into<String>) -> Self {
        self.config.metadata_creator = creator.into();
        self
    }

    pub fn build(self) -> StreamConfig {
        self.config
    }
}
