//! # FLV Script Module
//!
//! Script tags carry an event name followed by an AMF0 object or ECMA array,
//! in practice `onMetaData` with the file's metadata properties.
//!
//! A [`MetaTag`] owns the decoded tree. Bytes found after the two values
//! ("slack") are not interpreted but kept as a [`Payload`] so they are written
//! back verbatim. The declared length is never stored: it is recomputed from
//! the tree, so editing the metadata always keeps it exact.
//!
//! ## Specifications
//!
//! - [Flash Video File Format Specification v10](https://www.adobe.com/content/dam/acom/en/devnet/flv/video_file_format_spec_v10.pdf)
//! - [Action Message Format -- AMF 0](https://www.adobe.com/content/dam/acom/en/devnet/pdf/amf0-file-format-specification.pdf)

use std::fmt;
use std::io::Write;

use amf0::{Amf0Decoder, Amf0Encoder, Amf0Map, Amf0Value};
use bytes::Bytes;

use crate::error::FlvError;
use crate::source::Payload;

pub const AMF0_ON_METADATA: &str = "onMetaData";

#[derive(Debug, Clone, PartialEq)]
pub struct MetaTag {
    /// The event name
    pub event: String,
    /// The metadata properties
    pub metadata: Amf0Map,
    /// Whether the properties are encoded as an anonymous object rather than
    /// an ECMA array
    pub is_object: bool,
    /// Undecoded bytes after the metadata
    pub extra: Payload,
}

impl MetaTag {
    /// A tag with no properties, encoded as an ECMA array.
    ///
    /// # Example
    ///
    /// ```
    /// use flv::script::MetaTag;
    ///
    /// let tag = MetaTag::new("onMetaData");
    /// assert_eq!(tag.event, "onMetaData");
    /// assert!(tag.metadata.is_empty());
    /// ```
    pub fn new(event: impl Into<String>) -> Self {
        Self {
            event: event.into(),
            metadata: Amf0Map::new(),
            is_object: false,
            extra: Payload::empty(),
        }
    }

    /// Decodes the event name and properties from a script tag body.
    ///
    /// Trailing bytes are returned as owned `extra`; the second value is the
    /// number of bytes the two AMF0 values took.
    pub fn demux(data: &[u8]) -> Result<(Self, usize), FlvError> {
        let mut amf0_reader = Amf0Decoder::new(data);

        let event = match amf0_reader.decode()? {
            Amf0Value::String(event) => event,
            other => {
                return Err(FlvError::InvalidScriptData(format!(
                    "expected a string event name, got {:?}",
                    other.marker()
                )));
            }
        };

        let (metadata, is_object) = match amf0_reader.decode()? {
            Amf0Value::Object(map) => (map, true),
            Amf0Value::EcmaArray(map) => (map, false),
            other => {
                return Err(FlvError::InvalidScriptData(format!(
                    "expected object or ECMA array metadata, got {:?}",
                    other.marker()
                )));
            }
        };

        let consumed = amf0_reader.position();
        let extra = Bytes::copy_from_slice(&data[consumed..]);

        Ok((
            Self {
                event,
                metadata,
                is_object,
                extra: Payload::Owned(extra),
            },
            consumed,
        ))
    }

    /// Length of the tag body as declared on the wire.
    pub fn data_size(&self) -> usize {
        let container = if self.is_object { 1 } else { 1 + 4 };
        3 + self.event.len() + container + self.metadata.encoded_size() + self.extra.len()
    }

    pub fn get(&self, key: &str) -> Option<&Amf0Value> {
        self.metadata.get(key)
    }

    pub fn set(&mut self, key: impl Into<String>, value: Amf0Value) {
        self.metadata.set(key, value);
    }

    pub fn remove(&mut self, key: &str) -> bool {
        self.metadata.remove(key)
    }

    pub fn mux<W: Write>(&self, writer: &mut W) -> Result<(), FlvError> {
        Amf0Encoder::encode_string(writer, &self.event)?;
        if self.is_object {
            Amf0Encoder::encode_object(writer, &self.metadata)?;
        } else {
            Amf0Encoder::encode_ecma_array(writer, &self.metadata)?;
        }
        self.extra.write_to(writer)
    }
}

impl fmt::Display for MetaTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\t{}{}", self.event, self.metadata)
    }
}
