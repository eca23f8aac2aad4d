//! Byte-level helpers shared by the framer, the records and the patch scanner.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{Error, Result};

/// Lowest printable ASCII byte accepted in names.
const PRINTABLE_MIN: u8 = 32;
/// Highest printable ASCII byte accepted in names.
const PRINTABLE_MAX: u8 = 126;

/// Read-only view over a byte buffer with bounds-checked typed reads.
///
/// `base` is the offset of this view inside the buffer it was sliced from, so
/// errors report positions in the outermost buffer.
#[derive(Debug, Clone, Copy)]
pub struct Data<'a> {
    bytes: &'a [u8],
    base: usize,
}

impl<'a> Data<'a> {
    /// Wrap a buffer.
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, base: 0 }
    }

    /// Number of bytes in the view.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// True when the view holds no bytes.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// The underlying bytes.
    pub fn as_bytes(&self) -> &'a [u8] {
        self.bytes
    }

    fn range(&self, offset: usize, length: usize) -> Result<&'a [u8]> {
        offset
            .checked_add(length)
            .and_then(|end| self.bytes.get(offset..end))
            .ok_or(Error::Truncated {
                offset: self.base + offset,
                length,
                available: self.bytes.len().saturating_sub(offset),
            })
    }

    /// Single byte at `offset`.
    pub fn byte(&self, offset: usize) -> Result<u8> {
        Ok(self.range(offset, 1)?[0])
    }

    /// Big-endian signed 16-bit value at `offset`.
    pub fn read_short(&self, offset: usize) -> Result<i16> {
        let b = self.range(offset, 2)?;
        Ok(i16::from_be_bytes([b[0], b[1]]))
    }

    /// Sub-view of `length` bytes starting at `offset`.
    pub fn slice(&self, offset: usize, length: usize) -> Result<Data<'a>> {
        Ok(Data {
            bytes: self.range(offset, length)?,
            base: self.base + offset,
        })
    }

    /// Decode `length` bytes as printable ASCII, one character per byte.
    pub fn read_string(&self, offset: usize, length: usize) -> Result<String> {
        if length == 0 {
            return Ok(String::new());
        }
        let bytes = self.range(offset, length)?;
        let mut result = String::with_capacity(length);
        for (i, &c) in bytes.iter().enumerate() {
            if !(PRINTABLE_MIN..=PRINTABLE_MAX).contains(&c) {
                return Err(Error::MalformedText {
                    byte: c,
                    offset: self.base + offset + i,
                });
            }
            result.push(char::from(c));
        }
        Ok(result)
    }

    /// Hex dump of the buffer, one `offset  value  hex  char` line per byte.
    pub fn dump(&self) -> String {
        let mut out = String::new();
        for (i, &c) in self.bytes.iter().enumerate() {
            let ch = if (PRINTABLE_MIN..=PRINTABLE_MAX).contains(&c) {
                char::from(c)
            } else {
                ' '
            };
            out.push_str(&format!("{}:\t{}\t0x{:02x}\t{}\n", self.base + i, c, c, ch));
        }
        out
    }
}

/// Sequential reader used to decode one record body in a single pass.
pub struct Reader<'a> {
    data: Data<'a>,
    pos: usize,
}

impl<'a> Reader<'a> {
    /// Start reading at the first byte of `data`.
    pub fn new(data: Data<'a>) -> Self {
        Self { data, pos: 0 }
    }

    /// Next byte.
    pub fn u8(&mut self) -> Result<u8> {
        let value = self.data.byte(self.pos)?;
        self.pos += 1;
        Ok(value)
    }

    /// Next big-endian signed 16-bit value.
    pub fn i16(&mut self) -> Result<i16> {
        let value = self.data.read_short(self.pos)?;
        self.pos += 2;
        Ok(value)
    }

    /// Look at the next byte without consuming it.
    pub fn peek(&self) -> Result<u8> {
        self.data.byte(self.pos)
    }

    /// Length-prefixed raw blob.
    ///
    /// Blob bytes are opaque MIDI data and are never checked for printable
    /// characters, unlike names.
    pub fn blob(&mut self) -> Result<Blob> {
        let length = usize::from(self.u8()?);
        let bytes = self.data.slice(self.pos, length)?;
        self.pos += length;
        Ok(Blob(bytes.as_bytes().to_vec()))
    }

    /// Next `length` bytes as a printable ASCII string.
    pub fn string(&mut self, length: usize) -> Result<String> {
        let value = self.data.read_string(self.pos, length)?;
        self.pos += length;
        Ok(value)
    }

    /// Fails unless every byte of the view was consumed.
    pub fn finish(self) -> Result<()> {
        if self.pos != self.data.len() {
            return Err(Error::SizeMismatch {
                declared: self.data.len() as i32,
                actual: self.pos,
            });
        }
        Ok(())
    }
}

/// Combine a high and a low nibble into one byte.
pub fn nibbles_to_byte(hi: u8, lo: u8) -> u8 {
    (hi << 4) | (lo & 0x0f)
}

/// Split a byte into its (high, low) nibbles.
pub fn byte_to_nibbles(b: u8) -> (u8, u8) {
    (b >> 4, b & 0x0f)
}

/// Ids 1-16 whose bit is set; `lo` covers ids 1-8 and `hi` ids 9-16.
pub fn bitmap_ids(lo: u8, hi: u8) -> BTreeSet<u8> {
    let bits = u16::from_le_bytes([lo, hi]);
    (0..16u8).filter(|i| (bits >> i) & 1 == 1).map(|i| i + 1).collect()
}

/// Inverse of [`bitmap_ids`], returning `[lo, hi]`.
pub fn ids_to_bitmap<'a>(
    field: &'static str,
    ids: impl IntoIterator<Item = &'a u8>,
) -> Result<[u8; 2]> {
    let mut bits = 0u16;
    for &id in ids {
        if !(1..=16).contains(&id) {
            return Err(Error::InvalidValue {
                field,
                value: format!("id {} outside 1-16", id),
            });
        }
        bits |= 1 << (id - 1);
    }
    Ok(bits.to_le_bytes())
}

/// Raw embedded sysex bytes, serialized as a lowercase hex string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Blob(pub Vec<u8>);

impl Blob {
    /// The raw bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// True for a zero-length blob.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Lowercase hex, two digits per byte.
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{:02x}", b)).collect()
    }

    /// Parse an even-length hex string, either case.
    pub fn from_hex(s: &str) -> Result<Self> {
        let invalid = || Error::InvalidValue {
            field: "hex string",
            value: s.to_string(),
        };
        if s.len() % 2 != 0 || !s.bytes().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid());
        }
        (0..s.len())
            .step_by(2)
            .map(|i| u8::from_str_radix(&s[i..i + 2], 16).map_err(|_| invalid()))
            .collect::<Result<Vec<u8>>>()
            .map(Blob)
    }
}

impl fmt::Display for Blob {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for Blob {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Blob {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Blob::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_short_is_signed_big_endian() {
        let data = Data::new(&[0x01, 0x02, 0xff, 0xfe]);
        assert_eq!(data.read_short(0).unwrap(), 0x0102);
        assert_eq!(data.read_short(2).unwrap(), -2);
        assert!(matches!(data.read_short(3), Err(Error::Truncated { .. })));
    }

    #[test]
    fn test_read_string() {
        let data = Data::new(b"\x00Vol");
        assert_eq!(data.read_string(1, 3).unwrap(), "Vol");
        assert_eq!(data.read_string(0, 0).unwrap(), "");
        // zero length never touches the buffer
        assert_eq!(data.read_string(100, 0).unwrap(), "");
    }

    #[test]
    fn test_read_string_rejects_unprintable() {
        let data = Data::new(b"ab\x7fc");
        match data.read_string(0, 4) {
            Err(Error::MalformedText { byte, offset }) => {
                assert_eq!(byte, 0x7f);
                assert_eq!(offset, 2);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_slice_reports_absolute_offsets() {
        let data = Data::new(b"xxxx\x01ab");
        let sub = data.slice(4, 3).unwrap();
        assert_eq!(sub.byte(0).unwrap(), 1);
        match sub.read_string(0, 1) {
            Err(Error::MalformedText { offset, .. }) => assert_eq!(offset, 4),
            other => panic!("unexpected {:?}", other),
        }
        assert!(data.slice(5, 3).is_err());
    }

    #[test]
    fn test_reader_finish_detects_leftover_bytes() {
        let mut reader = Reader::new(Data::new(&[1, 2, 3]));
        reader.u8().unwrap();
        assert!(matches!(reader.finish(), Err(Error::SizeMismatch { .. })));

        let mut reader = Reader::new(Data::new(&[2, 0xf0, 0xf7]));
        assert_eq!(reader.blob().unwrap().as_bytes(), &[0xf0, 0xf7]);
        reader.finish().unwrap();
    }

    #[test]
    fn test_nibbles() {
        assert_eq!(nibbles_to_byte(4, 1), 0x41);
        assert_eq!(byte_to_nibbles(0x41), (4, 1));
    }

    #[test]
    fn test_bitmap_master_example() {
        let ids: BTreeSet<u8> = [1, 2, 9].into_iter().collect();
        assert_eq!(ids_to_bitmap("faders", &ids).unwrap(), [0b0000_0011, 0b0000_0001]);
        assert_eq!(bitmap_ids(0b0000_0011, 0b0000_0001), ids);
    }

    #[test]
    fn test_bitmap_symmetry_over_all_subsets() {
        for bits in 0..=u16::MAX {
            let [lo, hi] = bits.to_le_bytes();
            let ids = bitmap_ids(lo, hi);
            assert_eq!(ids_to_bitmap("faders", &ids).unwrap(), [lo, hi]);
        }
    }

    #[test]
    fn test_bitmap_rejects_out_of_range_ids() {
        assert!(ids_to_bitmap("channels", &[0]).is_err());
        assert!(ids_to_bitmap("channels", &[17]).is_err());
    }

    #[test]
    fn test_blob_hex() {
        let blob = Blob::from_hex("f0417f").unwrap();
        assert_eq!(blob.as_bytes(), &[0xf0, 0x41, 0x7f]);
        assert_eq!(blob.to_hex(), "f0417f");
        assert!(Blob::from_hex("f04").is_err());
        assert!(Blob::from_hex("zz").is_err());
    }
}
