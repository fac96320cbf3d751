//! FLV container model: file header, tags, and the shared byte source their
//! payloads are read back from.
//!
//! Parsing keeps only what editing needs in memory. Audio and video tags
//! decode their leading byte, script tags decode their AMF0 tree, and every
//! other byte is a range of the [`SharedSource`] copied through verbatim on
//! write.

pub mod audio;
pub mod error;
pub mod header;
pub mod parser;
pub mod script;
pub mod source;
pub mod tag;
pub mod video;
pub mod writer;

pub use error::FlvError;
pub use header::FlvHeader;
pub use parser::FlvParser;
pub use source::{Payload, SharedSource};
pub use tag::{FlvTag, FlvTagData, FlvTagType};
pub use writer::FlvWriter;
