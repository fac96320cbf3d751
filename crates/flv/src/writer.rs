//! # FLV Writer Module
//!
//! Writes a header followed by tags to any [`Write`] sink. Output is
//! produced incrementally: if a write fails midway, whatever was written so
//! far stays in the sink.
//!
//! ## Usage
//!
//! ```no_run
//! use flv::header::FlvHeader;
//! use flv::writer::FlvWriter;
//! use std::fs::File;
//! use std::io::BufWriter;
//!
//! fn main() -> Result<(), flv::error::FlvError> {
//!     let file = File::create("output.flv").map_err(flv::error::FlvError::WriteFailure)?;
//!     let mut writer = FlvWriter::new(BufWriter::new(file));
//!
//!     writer.write_header(&FlvHeader::new(true, true))?;
//!     // writer.write_tag(&tag)?;
//!     writer.flush()?;
//!     Ok(())
//! }
//! ```

use std::io::Write;

use crate::error::FlvError;
use crate::header::FlvHeader;
use crate::tag::FlvTag;

/// FLV Writer for creating FLV files
pub struct FlvWriter<W: Write> {
    writer: W,
    bytes_written: u64,
}

impl<W: Write> FlvWriter<W> {
    /// Creates a new FLV writer with the specified output writer
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            bytes_written: 0,
        }
    }

    pub fn write_header(&mut self, header: &FlvHeader) -> Result<(), FlvError> {
        header.encode(&mut self.writer)?;
        self.bytes_written += header.size();
        Ok(())
    }

    /// Writes an FLV tag, reading its payload back from its source if needed
    pub fn write_tag(&mut self, tag: &FlvTag) -> Result<(), FlvError> {
        tag.encode(&mut self.writer)?;
        self.bytes_written += tag.encoded_size();
        Ok(())
    }

    pub fn flush(&mut self) -> Result<(), FlvError> {
        self.writer.flush().map_err(FlvError::WriteFailure)
    }

    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }
}
