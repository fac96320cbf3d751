use std::io::{self, Cursor};

use byteorder::{BigEndian, ReadBytesExt};
use num_traits::FromPrimitive;

use super::define::{AMF0_DATE_SIZE, Amf0Map};
use super::{Amf0Marker, Amf0ReadError, Amf0Value};

/// An AMF0 Decoder.
///
/// This decoder takes a reference to a byte slice and reads AMF0 values from
/// it one after another. Decoded values own their data, so they outlive the
/// buffer.
pub struct Amf0Decoder<'a> {
    cursor: Cursor<&'a [u8]>,
}

impl<'a> Amf0Decoder<'a> {
    /// Create a new AMF0 decoder.
    pub const fn new(buff: &'a [u8]) -> Self {
        Self {
            cursor: Cursor::new(buff),
        }
    }

    /// Check if the decoder has reached the end of the AMF0 data.
    pub const fn is_empty(&self) -> bool {
        self.cursor.get_ref().len() <= self.cursor.position() as usize
    }

    /// Number of bytes consumed so far.
    pub const fn position(&self) -> usize {
        self.cursor.position() as usize
    }

    fn read_bytes(&mut self, len: usize) -> Result<&'a [u8], Amf0ReadError> {
        let buf: &'a [u8] = *self.cursor.get_ref();
        let pos = self.cursor.position() as usize;
        let bytes = pos
            .checked_add(len)
            .and_then(|end| buf.get(pos..end))
            .ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    format!("wanted {len} bytes at offset {pos}"),
                )
            })?;

        self.cursor.set_position((pos + len) as u64);
        Ok(bytes)
    }

    /// Read the next encoded value from the decoder.
    pub fn decode(&mut self) -> Result<Amf0Value, Amf0ReadError> {
        let marker = self.cursor.read_u8()?;
        let marker = Amf0Marker::from_u8(marker).ok_or(Amf0ReadError::UnknownMarker(marker))?;

        match marker {
            Amf0Marker::Number => Ok(Amf0Value::Number(self.read_number()?)),
            Amf0Marker::Boolean => Ok(Amf0Value::Boolean(self.read_bool()?)),
            Amf0Marker::String => Ok(Amf0Value::String(self.read_string()?)),
            Amf0Marker::Object => Ok(Amf0Value::Object(self.read_object()?)),
            Amf0Marker::EcmaArray => Ok(Amf0Value::EcmaArray(self.read_ecma_array()?)),
            Amf0Marker::StrictArray => Ok(Amf0Value::StrictArray(self.read_strict_array()?)),
            Amf0Marker::Date => Ok(Amf0Value::Date(self.read_date()?)),
            _ => Err(Amf0ReadError::UnsupportedType(marker)),
        }
    }

    fn read_number(&mut self) -> Result<f64, Amf0ReadError> {
        Ok(self.cursor.read_f64::<BigEndian>()?)
    }

    fn read_bool(&mut self) -> Result<bool, Amf0ReadError> {
        Ok(self.cursor.read_u8()? > 0)
    }

    fn read_string(&mut self) -> Result<String, Amf0ReadError> {
        let l = self.cursor.read_u16::<BigEndian>()?;
        let bytes = self.read_bytes(l as usize)?;

        Ok(std::str::from_utf8(bytes)?.to_owned())
    }

    /// Reads `key, value` pairs up to the empty key, then swallows the single
    /// end marker byte that follows it without checking it.
    fn read_properties(&mut self) -> Result<Amf0Map, Amf0ReadError> {
        let mut properties = Amf0Map::new();

        loop {
            let key = self.read_string()?;
            if key.is_empty() {
                self.cursor.read_u8()?;
                return Ok(properties);
            }

            let value = self.decode()?;
            properties.set(key, value);
        }
    }

    fn read_object(&mut self) -> Result<Amf0Map, Amf0ReadError> {
        self.read_properties()
    }

    fn read_ecma_array(&mut self) -> Result<Amf0Map, Amf0ReadError> {
        // associative-count, unreliable in the wild
        let _ = self.cursor.read_u32::<BigEndian>()?;
        self.read_properties()
    }

    fn read_strict_array(&mut self) -> Result<Vec<Amf0Value>, Amf0ReadError> {
        let size = self.cursor.read_u32::<BigEndian>()? as usize;

        // every element is at least one byte, don't let a bogus count allocate
        let pos = self.cursor.position() as usize;
        let remaining = self.cursor.get_ref().len().saturating_sub(pos);
        let mut results = Vec::with_capacity(size.min(remaining));
        for _ in 0..size {
            results.push(self.decode()?);
        }
        Ok(results)
    }

    fn read_date(&mut self) -> Result<[u8; AMF0_DATE_SIZE], Amf0ReadError> {
        let mut date = [0; AMF0_DATE_SIZE];
        date.copy_from_slice(self.read_bytes(AMF0_DATE_SIZE)?);
        Ok(date)
    }
}

#[cfg(test)]
#[cfg_attr(all(test, coverage_nightly), coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn test_reader_bool() {
        let amf0_bool = vec![0x01, 0x01]; // true
        let mut amf_reader = Amf0Decoder::new(&amf0_bool);
        let value = amf_reader.decode().unwrap();
        assert_eq!(value, Amf0Value::Boolean(true));
        assert!(amf_reader.is_empty());
    }

    #[test]
    fn test_reader_number() {
        let mut amf0_number = vec![0x00];
        amf0_number.extend_from_slice(&772.161_f64.to_be_bytes());

        let mut amf_reader = Amf0Decoder::new(&amf0_number);
        let value = amf_reader.decode().unwrap();
        assert_eq!(value, Amf0Value::Number(772.161));
        assert_eq!(amf_reader.position(), 9);
    }

    #[test]
    fn test_reader_string() {
        let amf0_string = [0x02, 0x00, 0x03, b'a', b'b', b'c'];

        let mut amf_reader = Amf0Decoder::new(&amf0_string);
        let value = amf_reader.decode().unwrap();
        assert_eq!(value, Amf0Value::String("abc".to_string()));
        assert_eq!(amf_reader.position(), 6);
    }

    #[test]
    fn test_reader_string_invalid_utf8() {
        let amf0_string = [0x02, 0x00, 0x02, 0xFF, 0xFF];

        let mut amf_reader = Amf0Decoder::new(&amf0_string);
        assert!(matches!(
            amf_reader.decode(),
            Err(Amf0ReadError::StringParseError(_))
        ));
    }

    #[test]
    fn test_reader_object() {
        let mut amf0_object = vec![0x03, 0x00, 0x04];
        amf0_object.extend_from_slice(b"test");
        amf0_object.extend_from_slice(&[0x05]);
        amf0_object.extend_from_slice(&[0x00, 0x00, 0x09]);

        // null is not modelled
        let mut amf_reader = Amf0Decoder::new(&amf0_object);
        assert!(matches!(
            amf_reader.decode(),
            Err(Amf0ReadError::UnsupportedType(Amf0Marker::Null))
        ));

        let mut amf0_object = vec![0x03, 0x00, 0x04];
        amf0_object.extend_from_slice(b"test");
        amf0_object.extend_from_slice(&[0x01, 0x00]);
        amf0_object.extend_from_slice(&[0x00, 0x00, 0x09]);

        let mut amf_reader = Amf0Decoder::new(&amf0_object);
        let value = amf_reader.decode().unwrap();

        let expected: Amf0Map = [("test", Amf0Value::Boolean(false))].into_iter().collect();
        assert_eq!(value, Amf0Value::Object(expected));
        assert!(amf_reader.is_empty());
    }

    #[test]
    fn test_reader_object_end_byte_not_checked() {
        let amf0_object = [0x03, 0x00, 0x00, 0x42, 0x01, 0x01];

        let mut amf_reader = Amf0Decoder::new(&amf0_object);
        assert_eq!(amf_reader.decode().unwrap(), Amf0Value::Object(Amf0Map::new()));
        assert_eq!(amf_reader.decode().unwrap(), Amf0Value::Boolean(true));
    }

    #[test]
    fn test_reader_ecma_array_ignores_count() {
        let mut amf0_object = vec![0x08, 0x00, 0x00, 0x00, 0x63];
        amf0_object.extend_from_slice(&[0x00, 0x01, b'a']);
        amf0_object.extend_from_slice(&[0x02, 0x00, 0x01, b'b']);
        amf0_object.extend_from_slice(&[0x00, 0x00, 0x09]);

        let mut amf_reader = Amf0Decoder::new(&amf0_object);
        let value = amf_reader.decode().unwrap();

        let expected: Amf0Map = [("a", Amf0Value::String("b".into()))].into_iter().collect();
        assert_eq!(value, Amf0Value::EcmaArray(expected));
        assert!(amf_reader.is_empty());
    }

    #[test]
    fn test_reader_ecma_array_duplicate_key_keeps_last() {
        let mut amf0_object = vec![0x08, 0x00, 0x00, 0x00, 0x02];
        amf0_object.extend_from_slice(&[0x00, 0x01, b'a', 0x01, 0x00]);
        amf0_object.extend_from_slice(&[0x00, 0x01, b'a', 0x01, 0x01]);
        amf0_object.extend_from_slice(&[0x00, 0x00, 0x09]);

        let value = Amf0Decoder::new(&amf0_object).decode().unwrap();
        let map = value.as_map().unwrap();
        assert_eq!(map.len(), 1);
        assert_eq!(map.get("a"), Some(&Amf0Value::Boolean(true)));
    }

    #[test]
    fn test_reader_strict_array() {
        let mut amf0_array = vec![0x0a, 0x00, 0x00, 0x00, 0x02];
        amf0_array.push(0x00);
        amf0_array.extend_from_slice(&1.5_f64.to_be_bytes());
        amf0_array.extend_from_slice(&[0x01, 0x01]);

        let mut amf_reader = Amf0Decoder::new(&amf0_array);
        let value = amf_reader.decode().unwrap();
        assert_eq!(
            value,
            Amf0Value::StrictArray(vec![Amf0Value::Number(1.5), Amf0Value::Boolean(true)])
        );
    }

    #[test]
    fn test_reader_strict_array_bogus_count() {
        let amf0_array = [0x0a, 0xFF, 0xFF, 0xFF, 0xFF, 0x01, 0x01];

        let mut amf_reader = Amf0Decoder::new(&amf0_array);
        assert!(matches!(
            amf_reader.decode(),
            Err(Amf0ReadError::TruncatedInput(_))
        ));
    }

    #[test]
    fn test_reader_date() {
        let amf0_date = [0x0b, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10];

        let value = Amf0Decoder::new(&amf0_date).decode().unwrap();
        assert_eq!(value, Amf0Value::Date([1, 2, 3, 4, 5, 6, 7, 8, 9, 10]));
    }

    #[test]
    fn test_reader_truncated() {
        let cases: [&[u8]; 5] = [
            &[],
            &[0x00, 0x40, 0x00],
            &[0x02, 0x00, 0x05, b'a'],
            &[0x03, 0x00, 0x01, b'a'],
            &[0x0b, 0x00],
        ];

        for bytes in cases {
            let mut amf_reader = Amf0Decoder::new(bytes);
            assert!(
                matches!(amf_reader.decode(), Err(Amf0ReadError::TruncatedInput(_))),
                "{bytes:?}"
            );
        }
    }

    #[test]
    fn test_reader_unknown_marker() {
        let mut amf_reader = Amf0Decoder::new(&[0x42]);
        assert!(matches!(
            amf_reader.decode(),
            Err(Amf0ReadError::UnknownMarker(0x42))
        ));
    }

    #[test]
    fn test_reader_sequence() {
        // values read back to back through the same decoder
        let mut amf0 = vec![0x0a, 0x00, 0x00, 0x00, 0x01, 0x02, 0x00, 0x01, b'x'];
        amf0.extend_from_slice(&[0x02, 0x00, 0x02, b'y', b'z']);
        amf0.extend_from_slice(&[0x0b, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]);

        let mut amf_reader = Amf0Decoder::new(&amf0);
        assert_eq!(
            amf_reader.decode().unwrap(),
            Amf0Value::StrictArray(vec![Amf0Value::String("x".into())])
        );
        assert_eq!(amf_reader.position(), 9);
        assert_eq!(amf_reader.decode().unwrap(), Amf0Value::String("yz".into()));
        assert_eq!(amf_reader.decode().unwrap(), Amf0Value::Date([0; 10]));
        assert!(amf_reader.is_empty());
    }
}
