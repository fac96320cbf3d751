use std::io;

use crate::range_check;

/// A reader that pulls individual bits, most significant first, out of a
/// borrowed byte buffer.
#[derive(Debug, Clone)]
#[must_use]
pub struct BitReader<'a> {
    data: &'a [u8],
    bit_pos: usize,
}

impl<'a> BitReader<'a> {
    /// Create a new BitReader positioned at the first bit of `data`
    pub const fn new(data: &'a [u8]) -> Self {
        Self { data, bit_pos: 0 }
    }

    /// Returns the current position in bits from the start of the buffer
    #[inline(always)]
    #[must_use]
    pub const fn bit_position(&self) -> usize {
        self.bit_pos
    }

    /// Returns the number of bits left to read
    #[inline(always)]
    #[must_use]
    pub const fn remaining_bits(&self) -> usize {
        (self.data.len() * 8).saturating_sub(self.bit_pos)
    }

    /// Reads a single bit
    pub fn read_bit(&mut self) -> io::Result<bool> {
        let byte = self
            .data
            .get(self.bit_pos / 8)
            .copied()
            .ok_or_else(|| eof(1, 0))?;

        let bit = (byte >> (7 - (self.bit_pos % 8))) & 1;
        self.bit_pos += 1;

        Ok(bit == 1)
    }

    /// Reads up to 32 bits as a big-endian unsigned value.
    ///
    /// Nothing is consumed when the buffer holds fewer than `count` bits.
    pub fn read_bits(&mut self, count: u8) -> io::Result<u32> {
        range_check!(count, 1, 32)?;

        let available = self.remaining_bits();
        if (count as usize) > available {
            return Err(eof(count as usize, available));
        }

        let mut bits = 0u32;
        for _ in 0..count {
            bits = (bits << 1) | self.read_bit()? as u32;
        }

        Ok(bits)
    }

    /// Moves the reader forward by `count` bits
    pub fn skip_bits(&mut self, count: usize) -> io::Result<()> {
        let available = self.remaining_bits();
        if count > available {
            return Err(eof(count, available));
        }

        self.bit_pos += count;
        Ok(())
    }
}

/// Reads `bits` (1 to 32) bits starting `bit_offset` bits into `data`.
///
/// This is the random-access form used for fixed picture-header layouts,
/// where every field sits at a known bit offset.
pub fn read_bits_at(data: &[u8], bit_offset: usize, bits: u8) -> io::Result<u32> {
    let mut reader = BitReader::new(data);
    reader.skip_bits(bit_offset)?;
    reader.read_bits(bits)
}

fn eof(wanted: usize, available: usize) -> io::Error {
    io::Error::new(
        io::ErrorKind::UnexpectedEof,
        format!("wanted {wanted} bits but only {available} remain"),
    )
}

#[cfg(test)]
#[cfg_attr(all(test, coverage_nightly), coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn test_bit_reader() {
        let binary = 0b10101010110011001111000101010101u32.to_be_bytes();

        let mut reader = BitReader::new(&binary);
        for i in 0..32 {
            assert_eq!(
                reader.read_bit().unwrap(),
                (0b10101010110011001111000101010101u32 >> (31 - i)) & 1 == 1,
                "bit {i} is not correct"
            );
        }

        assert!(reader.read_bit().is_err(), "there shouldnt be any bits left");
    }

    #[test]
    fn test_bit_reader_read_bits() {
        let binary = 0b10101010110011001111000101010101u32.to_be_bytes();
        let mut reader = BitReader::new(&binary);

        let cases = [
            (3, 0b101),
            (4, 0b0101),
            (3, 0b011),
            (3, 0b001),
            (3, 0b100),
            (3, 0b111),
            (5, 0b10001),
            (1, 0b0),
            (7, 0b1010101),
        ];

        for (i, (count, expected)) in cases.into_iter().enumerate() {
            assert_eq!(
                reader.read_bits(count).ok(),
                Some(expected),
                "reading {count} bits ({i}) are not correct",
            );
        }

        assert_eq!(reader.remaining_bits(), 0);
    }

    #[test]
    fn test_read_bits_full_width() {
        let data = [0xDE, 0xAD, 0xBE, 0xEF, 0x80];
        let mut reader = BitReader::new(&data);
        assert_eq!(reader.read_bits(32).unwrap(), 0xDEADBEEF);
        assert!(reader.read_bit().unwrap());
    }

    #[test]
    fn test_read_bits_rejects_bad_width() {
        let data = [0xFF; 8];
        let mut reader = BitReader::new(&data);
        assert_eq!(
            reader.read_bits(0).unwrap_err().kind(),
            io::ErrorKind::InvalidData
        );
        assert_eq!(
            reader.read_bits(33).unwrap_err().kind(),
            io::ErrorKind::InvalidData
        );
        assert_eq!(reader.bit_position(), 0);
    }

    #[test]
    fn test_read_bits_short_buffer_consumes_nothing() {
        let data = [0b1100_0000];
        let mut reader = BitReader::new(&data);
        reader.skip_bits(4).unwrap();

        let err = reader.read_bits(5).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
        assert_eq!(reader.bit_position(), 4);
        assert_eq!(reader.read_bits(4).unwrap(), 0);
    }

    #[test]
    fn test_read_bits_at_unaligned() {
        // 0x12345678 -> 0001 0010 0011 0100 0101 0110 0111 1000
        let data = 0x12345678u32.to_be_bytes();

        assert_eq!(read_bits_at(&data, 0, 4).unwrap(), 0x1);
        assert_eq!(read_bits_at(&data, 4, 8).unwrap(), 0x23);
        assert_eq!(read_bits_at(&data, 3, 5).unwrap(), 0b10010);
        assert_eq!(read_bits_at(&data, 12, 16).unwrap(), 0x4567);
        assert_eq!(read_bits_at(&data, 31, 1).unwrap(), 0);
    }

    #[test]
    fn test_read_bits_at_past_end() {
        let data = [0xFF, 0xFF];
        assert_eq!(
            read_bits_at(&data, 12, 8).unwrap_err().kind(),
            io::ErrorKind::UnexpectedEof
        );
        assert_eq!(
            read_bits_at(&data, 17, 1).unwrap_err().kind(),
            io::ErrorKind::UnexpectedEof
        );
    }
}
