//! A pure-rust implementation of the AMF0 subset used by FLV script data.
//!
//! Values own their data. Objects and ECMA arrays are backed by an ordered
//! [`Amf0Map`], so encoding is deterministic and [`Amf0Value::encoded_size`]
//! can be computed without writing anything.
//!
//! # Examples
//!
//! ```rust
//! # fn test() -> Result<(), Box<dyn std::error::Error>> {
//! use amf0::Amf0Decoder;
//! use amf0::Amf0Encoder;
//! # let bytes = &[0x01, 0x01];
//! # let mut writer = Vec::new();
//!
//! // Create a new decoder
//! let mut reader = Amf0Decoder::new(bytes);
//! let value = reader.decode()?;
//!
//! // .. do something with the value
//!
//! // Encode a value into a writer
//! Amf0Encoder::encode(&mut writer, &value)?;
//!
//! # assert_eq!(writer, bytes);
//! # Ok(())
//! # }
//! # test().expect("test failed");
//! ```
#![cfg_attr(all(coverage_nightly, test), feature(coverage_attribute))]
#![deny(missing_docs)]
#![deny(unsafe_code)]

mod decode;
mod define;
mod encode;
mod errors;

pub use crate::decode::Amf0Decoder;
pub use crate::define::{AMF0_DATE_SIZE, Amf0Map, Amf0Marker, Amf0Value};
pub use crate::encode::Amf0Encoder;
pub use crate::errors::{Amf0ReadError, Amf0WriteError};
