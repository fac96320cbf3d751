use std::io;

use byteorder::{BigEndian, WriteBytesExt};

use super::define::{AMF0_DATE_SIZE, Amf0Map, Amf0Marker};
use super::{Amf0Value, Amf0WriteError};

/// A macro to encode an AMF property key into a buffer
#[macro_export]
macro_rules! write_amf_property_key {
    ($buffer:expr, $key:expr) => {
        if $key.len() > (u16::MAX as usize) {
            return Err($crate::Amf0WriteError::NormalStringTooLong);
        }
        // write key length (u16 in big endian)
        $buffer.write_u16::<BigEndian>($key.len() as u16)?;
        // write key string bytes
        $buffer.write_all($key.as_bytes())?;
    };
}

/// AMF0 encoder.
///
/// Allows for encoding an AMF0 to some writer.
pub struct Amf0Encoder;

impl Amf0Encoder {
    /// Encode a generic AMF0 value
    pub fn encode(writer: &mut impl io::Write, value: &Amf0Value) -> Result<(), Amf0WriteError> {
        match value {
            Amf0Value::Boolean(val) => Self::encode_bool(writer, *val),
            Amf0Value::Number(val) => Self::encode_number(writer, *val),
            Amf0Value::String(val) => Self::encode_string(writer, val),
            Amf0Value::Object(val) => Self::encode_object(writer, val),
            Amf0Value::EcmaArray(val) => Self::encode_ecma_array(writer, val),
            Amf0Value::StrictArray(val) => Self::encode_strict_array(writer, val),
            Amf0Value::Date(val) => Self::encode_date(writer, val),
        }
    }

    /// Write object end marker to signify the end of an AMF0 object
    pub fn object_eof(writer: &mut impl io::Write) -> Result<(), Amf0WriteError> {
        writer.write_u24::<BigEndian>(Amf0Marker::ObjectEnd as u32)?;
        Ok(())
    }

    /// Encode an AMF0 number
    pub fn encode_number(writer: &mut impl io::Write, value: f64) -> Result<(), Amf0WriteError> {
        writer.write_u8(Amf0Marker::Number as u8)?;
        writer.write_f64::<BigEndian>(value)?;
        Ok(())
    }

    /// Encode an AMF0 boolean
    pub fn encode_bool(writer: &mut impl io::Write, value: bool) -> Result<(), Amf0WriteError> {
        writer.write_u8(Amf0Marker::Boolean as u8)?;
        writer.write_u8(value as u8)?;
        Ok(())
    }

    /// Encode an AMF0 string
    pub fn encode_string(writer: &mut impl io::Write, value: &str) -> Result<(), Amf0WriteError> {
        writer.write_u8(Amf0Marker::String as u8)?;
        write_amf_property_key!(writer, value);
        Ok(())
    }

    fn encode_properties(
        writer: &mut impl io::Write,
        properties: &Amf0Map,
    ) -> Result<(), Amf0WriteError> {
        for (key, value) in properties {
            write_amf_property_key!(writer, key);
            Self::encode(writer, value)?;
        }

        Self::object_eof(writer)
    }

    /// Encode an AMF0 object
    pub fn encode_object(
        writer: &mut impl io::Write,
        properties: &Amf0Map,
    ) -> Result<(), Amf0WriteError> {
        writer.write_u8(Amf0Marker::Object as u8)?;
        Self::encode_properties(writer, properties)
    }

    /// Encode an AMF0 ECMA array, its count being the number of properties
    pub fn encode_ecma_array(
        writer: &mut impl io::Write,
        properties: &Amf0Map,
    ) -> Result<(), Amf0WriteError> {
        let count = u32::try_from(properties.len())
            .map_err(|_| Amf0WriteError::TooManyElements(properties.len()))?;

        writer.write_u8(Amf0Marker::EcmaArray as u8)?;
        writer.write_u32::<BigEndian>(count)?;
        Self::encode_properties(writer, properties)
    }

    /// Encode an AMF0 strict array
    pub fn encode_strict_array(
        writer: &mut impl io::Write,
        values: &[Amf0Value],
    ) -> Result<(), Amf0WriteError> {
        let count = u32::try_from(values.len())
            .map_err(|_| Amf0WriteError::TooManyElements(values.len()))?;

        writer.write_u8(Amf0Marker::StrictArray as u8)?;
        writer.write_u32::<BigEndian>(count)?;
        for value in values {
            Self::encode(writer, value)?;
        }
        Ok(())
    }

    /// Encode an AMF0 date from its raw bytes
    pub fn encode_date(
        writer: &mut impl io::Write,
        value: &[u8; AMF0_DATE_SIZE],
    ) -> Result<(), Amf0WriteError> {
        writer.write_u8(Amf0Marker::Date as u8)?;
        writer.write_all(value)?;
        Ok(())
    }
}
