use std::collections::{BTreeMap, btree_map};
use std::fmt;

use num_derive::FromPrimitive;

/// AMF0 marker types.
/// Defined in amf0_spec_121207.pdf section 2.1
#[derive(Debug, PartialEq, Eq, Clone, Copy, FromPrimitive)]
#[repr(u8)]
pub enum Amf0Marker {
    /// number-marker
    Number = 0x00,
    /// boolean-marker
    Boolean = 0x01,
    /// string-marker
    String = 0x02,
    /// object-marker
    Object = 0x03,
    /// movieclip-marker
    ///
    /// reserved, not supported
    MovieClipMarker = 0x04,
    /// null-marker
    Null = 0x05,
    /// undefined-marker
    Undefined = 0x06,
    /// reference-marker
    Reference = 0x07,
    /// ecma-array-marker
    EcmaArray = 0x08,
    /// object-end-marker
    ObjectEnd = 0x09,
    /// strict-array-marker
    StrictArray = 0x0a,
    /// date-marker
    Date = 0x0b,
    /// long-string-marker
    LongString = 0x0c,
    /// unsupported-marker
    Unsupported = 0x0d,
    /// recordset-marker
    ///
    /// reserved, not supported
    Recordset = 0x0e,
    /// xml-document-marker
    XmlDocument = 0x0f,
    /// typed-object-marker
    TypedObject = 0x10,
    /// avmplus-object-marker
    ///
    /// AMF3 marker
    AVMPlusObject = 0x11,
}

/// Number of raw bytes carried by a date value (8-byte double plus a 2-byte
/// time zone).
pub const AMF0_DATE_SIZE: usize = 10;

/// AMF0 values as found in FLV script data.
///
/// Only the kinds FLV metadata actually uses are modelled. Maps own their
/// values and arrays own their elements, so a value always has exactly one
/// owner.
#[derive(PartialEq, Clone, Debug)]
pub enum Amf0Value {
    /// Number (IEEE-754 double) defined section 2.2
    Number(f64),
    /// Boolean defined section 2.3
    Boolean(bool),
    /// String with a 16-bit length prefix, defined section 2.4
    String(String),
    /// Anonymous object defined section 2.5
    Object(Amf0Map),
    /// ECMA ("mixed") array defined section 2.10. The wire form carries an
    /// element count that is written on encode and ignored on decode.
    EcmaArray(Amf0Map),
    /// Strict array defined section 2.12
    StrictArray(Vec<Amf0Value>),
    /// Date defined section 2.13, kept as its raw bytes
    Date([u8; AMF0_DATE_SIZE]),
}

impl Amf0Value {
    /// Get the marker of the value.
    pub fn marker(&self) -> Amf0Marker {
        match self {
            Self::Number(_) => Amf0Marker::Number,
            Self::Boolean(_) => Amf0Marker::Boolean,
            Self::String(_) => Amf0Marker::String,
            Self::Object(_) => Amf0Marker::Object,
            Self::EcmaArray(_) => Amf0Marker::EcmaArray,
            Self::StrictArray(_) => Amf0Marker::StrictArray,
            Self::Date(_) => Amf0Marker::Date,
        }
    }

    /// Exact number of bytes [`crate::Amf0Encoder::encode`] writes for this
    /// value, marker byte included. No I/O is performed.
    pub fn encoded_size(&self) -> usize {
        1 + match self {
            Self::Number(_) => 8,
            Self::Boolean(_) => 1,
            Self::String(s) => 2 + s.len(),
            Self::Object(map) => map.encoded_size(),
            Self::EcmaArray(map) => 4 + map.encoded_size(),
            Self::StrictArray(values) => 4 + values.iter().map(Self::encoded_size).sum::<usize>(),
            Self::Date(_) => AMF0_DATE_SIZE,
        }
    }

    /// Returns the number if this is a [`Amf0Value::Number`].
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the string slice if this is a [`Amf0Value::String`].
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the properties of an object or ECMA array.
    pub fn as_map(&self) -> Option<&Amf0Map> {
        match self {
            Self::Object(map) | Self::EcmaArray(map) => Some(map),
            _ => None,
        }
    }

    /// Returns the properties of an object or ECMA array, mutably.
    pub fn as_map_mut(&mut self) -> Option<&mut Amf0Map> {
        match self {
            Self::Object(map) | Self::EcmaArray(map) => Some(map),
            _ => None,
        }
    }

    fn fmt_indented(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Boolean(b) => write!(f, "{b}"),
            Self::String(s) => write!(f, "\"{s}\""),
            Self::Object(map) | Self::EcmaArray(map) => map.fmt_indented(f, depth),
            Self::StrictArray(values) => {
                write!(f, "[")?;
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    value.fmt_indented(f, depth + 1)?;
                }
                write!(f, "]")
            }
            Self::Date(_) => write!(f, "<date>"),
        }
    }
}

impl fmt::Display for Amf0Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_indented(f, 1)
    }
}

/// Properties of an AMF0 object or ECMA array.
///
/// Keys are unique and iterate in ascending byte order, which is also the
/// order they are encoded in.
#[derive(PartialEq, Clone, Debug, Default)]
pub struct Amf0Map(BTreeMap<String, Amf0Value>);

impl Amf0Map {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `key` to `value`, dropping any value previously stored under it.
    pub fn set(&mut self, key: impl Into<String>, value: Amf0Value) {
        self.0.insert(key.into(), value);
    }

    /// Remove `key`, reporting whether it was present.
    pub fn remove(&mut self, key: &str) -> bool {
        self.0.remove(key).is_some()
    }

    /// Get the value stored under `key`.
    pub fn get(&self, key: &str) -> Option<&Amf0Value> {
        self.0.get(key)
    }

    /// Get the value stored under `key`, mutably.
    pub fn get_mut(&mut self, key: &str) -> Option<&mut Amf0Value> {
        self.0.get_mut(key)
    }

    /// Number of properties.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the map has no properties.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over the properties in key order.
    pub fn iter(&self) -> btree_map::Iter<'_, String, Amf0Value> {
        self.0.iter()
    }

    /// Encoded size of the properties and the end marker, without the
    /// leading marker byte of the enclosing object or array.
    pub fn encoded_size(&self) -> usize {
        self.0
            .iter()
            .map(|(key, value)| 2 + key.len() + value.encoded_size())
            .sum::<usize>()
            + 3
    }

    fn fmt_indented(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        for (key, value) in &self.0 {
            writeln!(f)?;
            write!(f, "{:width$}\"{key}\": ", "", width = depth * 2)?;
            value.fmt_indented(f, depth + 1)?;
        }
        Ok(())
    }
}

impl fmt::Display for Amf0Map {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_indented(f, 1)
    }
}

impl<'a> IntoIterator for &'a Amf0Map {
    type Item = (&'a String, &'a Amf0Value);
    type IntoIter = btree_map::Iter<'a, String, Amf0Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl<K: Into<String>> FromIterator<(K, Amf0Value)> for Amf0Map {
    fn from_iter<T: IntoIterator<Item = (K, Amf0Value)>>(iter: T) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

#[cfg(test)]
#[cfg_attr(all(test, coverage_nightly), coverage(off))]
mod tests {
    use num_traits::FromPrimitive;

    use super::*;

    #[test]
    fn test_marker() {
        let cases = [
            (Amf0Value::Number(1.0), Amf0Marker::Number),
            (Amf0Value::Boolean(true), Amf0Marker::Boolean),
            (Amf0Value::String("test".into()), Amf0Marker::String),
            (Amf0Value::Object(Amf0Map::new()), Amf0Marker::Object),
            (Amf0Value::EcmaArray(Amf0Map::new()), Amf0Marker::EcmaArray),
            (Amf0Value::StrictArray(vec![]), Amf0Marker::StrictArray),
            (Amf0Value::Date([0; 10]), Amf0Marker::Date),
        ];

        for (value, marker) in cases {
            assert_eq!(value.marker(), marker);
        }
    }

    #[test]
    fn test_marker_primitive() {
        let cases = [
            (Amf0Marker::Number, 0x00),
            (Amf0Marker::Boolean, 0x01),
            (Amf0Marker::String, 0x02),
            (Amf0Marker::Object, 0x03),
            (Amf0Marker::Null, 0x05),
            (Amf0Marker::EcmaArray, 0x08),
            (Amf0Marker::ObjectEnd, 0x09),
            (Amf0Marker::StrictArray, 0x0a),
            (Amf0Marker::Date, 0x0b),
            (Amf0Marker::LongString, 0x0c),
            (Amf0Marker::AVMPlusObject, 0x11),
        ];

        for (marker, value) in cases {
            assert_eq!(marker as u8, value);
            assert_eq!(Amf0Marker::from_u8(value), Some(marker));
        }

        assert!(Amf0Marker::from_u8(0x12).is_none());
    }

    #[test]
    fn test_map_set_replaces() {
        let mut map = Amf0Map::new();
        map.set("width", Amf0Value::Number(320.0));
        map.set("width", Amf0Value::Number(640.0));

        assert_eq!(map.len(), 1);
        assert_eq!(map.get("width"), Some(&Amf0Value::Number(640.0)));
    }

    #[test]
    fn test_map_remove() {
        let mut map: Amf0Map = [("stereo", Amf0Value::Boolean(true))].into_iter().collect();

        assert!(map.remove("stereo"));
        assert!(!map.remove("stereo"));
        assert!(map.is_empty());
    }

    #[test]
    fn test_map_key_order() {
        let map: Amf0Map = [
            ("width", Amf0Value::Number(1.0)),
            ("duration", Amf0Value::Number(2.0)),
            ("Zeta", Amf0Value::Number(3.0)),
        ]
        .into_iter()
        .collect();

        let keys: Vec<_> = map.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, ["Zeta", "duration", "width"]);
    }

    #[test]
    fn test_encoded_size() {
        let cases = [
            (Amf0Value::Number(1.0), 9),
            (Amf0Value::Boolean(false), 2),
            (Amf0Value::String("abc".into()), 6),
            (Amf0Value::String(String::new()), 3),
            (Amf0Value::Object(Amf0Map::new()), 4),
            (Amf0Value::EcmaArray(Amf0Map::new()), 8),
            (Amf0Value::StrictArray(vec![]), 5),
            (
                Amf0Value::StrictArray(vec![Amf0Value::Number(1.0), Amf0Value::Boolean(true)]),
                16,
            ),
            (Amf0Value::Date([0; 10]), 11),
            (
                // marker + "ab" key (4) + number (9) + end (3)
                Amf0Value::Object([("ab", Amf0Value::Number(0.0))].into_iter().collect()),
                17,
            ),
        ];

        for (value, size) in cases {
            assert_eq!(value.encoded_size(), size, "{value:?}");
        }
    }

    #[test]
    fn test_accessors() {
        let mut value = Amf0Value::EcmaArray(Amf0Map::new());
        value
            .as_map_mut()
            .unwrap()
            .set("duration", Amf0Value::Number(1.5));

        assert_eq!(
            value.as_map().and_then(|m| m.get("duration")).and_then(Amf0Value::as_number),
            Some(1.5)
        );
        assert_eq!(Amf0Value::String("x".into()).as_str(), Some("x"));
        assert!(Amf0Value::Boolean(true).as_map().is_none());
    }

    #[test]
    fn test_display() {
        let value = Amf0Value::Object(
            [
                ("duration", Amf0Value::Number(1.5)),
                (
                    "times",
                    Amf0Value::StrictArray(vec![Amf0Value::Number(0.0), Amf0Value::Number(2.0)]),
                ),
            ]
            .into_iter()
            .collect(),
        );

        assert_eq!(
            value.to_string(),
            "\n  \"duration\": 1.5\n  \"times\": [0, 2]"
        );
    }
}
