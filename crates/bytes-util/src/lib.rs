//! Bit and byte level helpers shared by the AMF0 and FLV codecs.
//!
//! Fixed-width big-endian integers and doubles are read and written through
//! [`byteorder`]; this crate adds what it lacks: random-access bit-field
//! extraction for picture headers, and a range guard for values that must
//! fit a narrower wire field.
//!
//! ## License
//!
//! This project is licensed under the [MIT](./LICENSE.MIT) or [Apache-2.0](./LICENSE.Apache-2.0) license.
//! You can choose between one of them if you use this work.
//!
//! `SPDX-License-Identifier: MIT OR Apache-2.0`
#![cfg_attr(all(coverage_nightly, test), feature(coverage_attribute))]
#![deny(missing_docs)]
#![deny(unsafe_code)]

mod bit_read;
mod range_check;

pub use bit_read::{BitReader, read_bits_at};

/// Largest value representable by a 24-bit wire field.
pub const U24_MAX: u32 = 0x00FF_FFFF;
