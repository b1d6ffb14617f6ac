//! BitBuffer: the packed bit container used by every stage of symhuff.
//!
//! Bits are stored most significant bit first. Bit 0 of a buffer is the high bit of byte 0,
//! bit 7 is the low bit of byte 0, bit 8 is the high bit of byte 1, and so on. Any bits past
//! the logical length in the final byte are always zero, which lets equality and hashing work
//! directly on the stored bytes.
//!
//! Two flavors share the read side through the `BitRead` trait:
//! - `BitBuffer` owns its bytes and can grow (encoding, symbols, codes, headers).
//! - `BitView` borrows a byte slice read-only (decoding a large compressed file without a copy).
//!
use std::fmt::{Display, Formatter};

use crate::error::{HuffError, Result};

/// Read side shared by owned and borrowed bit buffers.
pub trait BitRead {
    /// The packed bytes backing the bits.
    fn as_bytes(&self) -> &[u8];

    /// Number of valid bits.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Return the bit at `index`, or an Index error if `index` is past the end.
    fn bit_at(&self, index: usize) -> Result<bool> {
        if index >= self.len() {
            return Err(HuffError::Index {
                index,
                len: self.len(),
            });
        }
        Ok(bit_of(self.as_bytes(), index))
    }

    /// Iterate over the bits in `[from, to)`.
    fn bits(&self, from: usize, to: usize) -> Result<Bits<'_>> {
        check_range(from, to, self.len())?;
        Ok(Bits {
            bytes: self.as_bytes(),
            pos: from,
            end: to,
        })
    }

    /// Copy the bits in `[from, to)` into a new BitBuffer.
    fn slice(&self, from: usize, to: usize) -> Result<BitBuffer> {
        check_range(from, to, self.len())?;
        let count = to - from;
        let start = from / 8;
        let shift = from % 8;
        let src = self.as_bytes();

        // Each output byte is stitched together from (at most) two neighboring input bytes.
        let out_len = (count + 7) / 8;
        let mut bytes = Vec::with_capacity(out_len);
        for k in 0..out_len {
            let hi = src[start + k] << shift;
            let lo = if shift > 0 {
                src.get(start + k + 1).map_or(0, |b| b >> (8 - shift))
            } else {
                0
            };
            bytes.push(hi | lo);
        }
        let mut slice = BitBuffer { bytes, len: count };
        slice.clear_tail();
        Ok(slice)
    }

    /// Read `width` (<= 32) bits starting at `from` as an unsigned number, most significant bit first.
    fn value_at(&self, from: usize, width: u8) -> Result<u32> {
        debug_assert!(width <= 32);
        let value = self
            .bits(from, from + width as usize)?
            .fold(0_u32, |acc, bit| (acc << 1) | bit as u32);
        Ok(value)
    }
}

/// Growable, packed, append-only bit sequence.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct BitBuffer {
    bytes: Vec<u8>,
    len: usize,
}

impl BitBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty buffer with room for `bits` bits before reallocating.
    pub fn with_capacity(bits: usize) -> Self {
        Self {
            bytes: Vec::with_capacity((bits + 7) / 8),
            len: 0,
        }
    }

    /// Copy a byte slice into a new buffer of `8 * bytes.len()` bits.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self {
            bytes: bytes.to_vec(),
            len: bytes.len() * 8,
        }
    }

    /// Wrap a byte slice read-only without copying it.
    pub fn borrow(bytes: &[u8]) -> BitView<'_> {
        BitView { bytes }
    }

    /// Build a buffer holding the low `width` bits of `value`.
    pub fn from_value(value: u32, width: u8) -> Self {
        let mut buffer = Self::with_capacity(width as usize);
        buffer.append_value(value, width);
        buffer
    }

    /// Parse a string of '0' and '1' characters. Returns None on any other character.
    pub fn from_bit_str(s: &str) -> Option<Self> {
        let mut buffer = Self::with_capacity(s.len());
        for c in s.chars() {
            match c {
                '0' => buffer.append_bit(false),
                '1' => buffer.append_bit(true),
                _ => return None,
            };
        }
        Some(buffer)
    }

    /// Append a single bit.
    #[inline]
    pub fn append_bit(&mut self, bit: bool) -> &mut Self {
        let offset = self.len % 8;
        if offset == 0 {
            self.bytes.push(0);
        }
        if bit {
            let last = self.bytes.len() - 1;
            self.bytes[last] |= 0x80 >> offset;
        }
        self.len += 1;
        self
    }

    /// Append the low `width` (<= 32) bits of `value`, most significant bit first.
    pub fn append_value(&mut self, value: u32, width: u8) -> &mut Self {
        debug_assert!(width <= 32);
        for i in (0..width).rev() {
            self.append_bit((value >> i) & 1 == 1);
        }
        self
    }

    /// Append `count` zero bits.
    pub fn append_zeros(&mut self, count: usize) -> &mut Self {
        for _ in 0..count {
            self.append_bit(false);
        }
        self
    }

    /// Append all bits of `other` to the end of this buffer.
    pub fn concat<B: BitRead + ?Sized>(&mut self, other: &B) -> &mut Self {
        let count = other.len();
        let src = &other.as_bytes()[..(count + 7) / 8];
        let shift = self.len % 8;
        if shift == 0 {
            // Byte aligned: a straight copy.
            self.bytes.extend_from_slice(src);
        } else {
            for &b in src {
                let last = self.bytes.len() - 1;
                self.bytes[last] |= b >> shift;
                self.bytes.push(b << (8 - shift));
            }
        }
        self.len += count;
        self.bytes.truncate((self.len + 7) / 8);
        self.clear_tail();
        self
    }

    /// Shorten the buffer to `len` bits. Does nothing if it is already that short.
    pub fn truncate(&mut self, len: usize) {
        if len < self.len {
            self.len = len;
            self.bytes.truncate((len + 7) / 8);
            self.clear_tail();
        }
    }

    pub fn clear(&mut self) {
        self.bytes.clear();
        self.len = 0;
    }

    /// Packed bytes, with the final byte zero padded.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.bytes.clone()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// Zero any bits in the final byte that lie past the logical length.
    fn clear_tail(&mut self) {
        let rem = self.len % 8;
        if rem != 0 {
            let last = self.bytes.len() - 1;
            self.bytes[last] &= 0xff << (8 - rem);
        }
    }
}

impl BitRead for BitBuffer {
    fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    fn len(&self) -> usize {
        self.len
    }
}

impl Display for BitBuffer {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for i in 0..self.len {
            write!(f, "{}", bit_of(&self.bytes, i) as u8)?;
        }
        Ok(())
    }
}

/// Read-only view over borrowed bytes. Once borrowed the bits cannot be changed.
#[derive(Clone, Copy, Debug)]
pub struct BitView<'a> {
    bytes: &'a [u8],
}

impl BitRead for BitView<'_> {
    fn as_bytes(&self) -> &[u8] {
        self.bytes
    }

    fn len(&self) -> usize {
        self.bytes.len() * 8
    }
}

/// Iterator over a range of bits, returned by `BitRead::bits`.
#[derive(Debug)]
pub struct Bits<'a> {
    bytes: &'a [u8],
    pos: usize,
    end: usize,
}

impl Iterator for Bits<'_> {
    type Item = bool;

    #[inline]
    fn next(&mut self) -> Option<bool> {
        if self.pos >= self.end {
            return None;
        }
        let bit = bit_of(self.bytes, self.pos);
        self.pos += 1;
        Some(bit)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.end - self.pos;
        (left, Some(left))
    }
}

impl ExactSizeIterator for Bits<'_> {}

#[inline(always)]
fn bit_of(bytes: &[u8], index: usize) -> bool {
    (bytes[index / 8] >> (7 - index % 8)) & 1 == 1
}

fn check_range(from: usize, to: usize, len: usize) -> Result<()> {
    if from > to || to > len {
        return Err(HuffError::Range { from, to, len });
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use super::{BitBuffer, BitRead};
    use crate::error::HuffError;

    fn bits(s: &str) -> BitBuffer {
        BitBuffer::from_bit_str(s).unwrap()
    }

    #[test]
    fn append_and_read_test() {
        let mut bb = BitBuffer::new();
        bb.append_bit(true).append_bit(false).append_bit(true);
        assert_eq!(bb.len(), 3);
        assert_eq!(bb.to_bytes(), vec![0b1010_0000]);
        assert!(bb.bit_at(0).unwrap());
        assert!(!bb.bit_at(1).unwrap());
        assert!(bb.bit_at(2).unwrap());
        assert!(matches!(
            bb.bit_at(3),
            Err(HuffError::Index { index: 3, len: 3 })
        ));
    }

    #[test]
    fn msb_first_order_test() {
        let bytes = [0b1000_0001_u8, 0b0100_0000];
        let bb = BitBuffer::from_bytes(&bytes);
        let expected = "1000000101000000";
        for (i, c) in expected.chars().enumerate() {
            assert_eq!(bb.bit_at(i).unwrap(), c == '1');
        }
        assert_eq!(bb.to_string(), expected);
    }

    #[test]
    fn borrowed_reads_match_owned_test() {
        let bytes = "Hello, world!".as_bytes();
        let owned = BitBuffer::from_bytes(bytes);
        let view = BitBuffer::borrow(bytes);
        assert_eq!(owned.len(), view.len());
        for i in 0..owned.len() {
            assert_eq!(owned.bit_at(i).unwrap(), view.bit_at(i).unwrap());
        }
        assert_eq!(owned.slice(3, 61).unwrap(), view.slice(3, 61).unwrap());
    }

    #[test]
    fn slice_test() {
        let bb = bits("1101001110");
        assert_eq!(bb.slice(2, 7).unwrap(), bits("01001"));
        assert_eq!(bb.slice(0, 10).unwrap(), bb);
        assert_eq!(bb.slice(4, 4).unwrap(), BitBuffer::new());
        assert!(matches!(bb.slice(5, 4), Err(HuffError::Range { .. })));
        assert!(matches!(bb.slice(0, 11), Err(HuffError::Range { .. })));
    }

    #[test]
    fn slice_keeps_padding_clean_test() {
        // Slicing from the middle of 0xFF bytes must not leak set bits into the padding.
        let bb = BitBuffer::from_bytes(&[0xff, 0xff]);
        let s = bb.slice(1, 4).unwrap();
        assert_eq!(s.to_bytes(), vec![0b1110_0000]);
        assert_eq!(s, bits("111"));
    }

    #[test]
    fn slice_identity_law_test() {
        let bb = BitBuffer::from_bytes(&[0xde, 0xad, 0xbe, 0xef]);
        assert_eq!(bb.slice(0, bb.len()).unwrap().to_bytes(), bb.to_bytes());
    }

    #[test]
    fn concat_unaligned_test() {
        let mut a = bits("101");
        a.concat(&bits("11110000111"));
        assert_eq!(a, bits("10111110000111"));
        assert_eq!(a.len(), 14);
    }

    #[test]
    fn concat_aligned_test() {
        let mut a = BitBuffer::from_bytes(&[0xaa]);
        a.concat(&bits("01"));
        assert_eq!(a.to_bytes(), vec![0xaa, 0b0100_0000]);
        a.concat(&BitBuffer::borrow(&[0x0f]));
        assert_eq!(a, bits("101010100100001111"));
    }

    #[test]
    fn concat_associative_test() {
        let (x, y, z) = (bits("1"), bits("0110011"), bits("111000111"));
        let mut left = x.clone();
        left.concat(&y).concat(&z);
        let mut yz = y.clone();
        yz.concat(&z);
        let mut right = x.clone();
        right.concat(&yz);
        assert_eq!(left, right);
    }

    #[test]
    fn value_round_trip_test() {
        let mut bb = BitBuffer::new();
        bb.append_value(19, 5).append_value(3, 3).append_value(0, 3).append_value(4094, 13);
        assert_eq!(bb.len(), 24);
        assert_eq!(bb.value_at(0, 5).unwrap(), 19);
        assert_eq!(bb.value_at(5, 3).unwrap(), 3);
        assert_eq!(bb.value_at(8, 3).unwrap(), 0);
        assert_eq!(bb.value_at(11, 13).unwrap(), 4094);
        assert!(bb.value_at(20, 5).is_err());
    }

    #[test]
    fn truncate_test() {
        let mut bb = BitBuffer::from_bytes(&[0xff, 0xff]);
        bb.truncate(9);
        assert_eq!(bb.len(), 9);
        assert_eq!(bb.to_bytes(), vec![0xff, 0x80]);
        bb.truncate(20);
        assert_eq!(bb.len(), 9);
    }

    #[test]
    fn equality_is_structural_test() {
        // Same bytes, different bit counts are different symbols.
        assert_ne!(bits("1"), bits("10"));
        assert_eq!(BitBuffer::from_value(0x41, 8), BitBuffer::from_bytes(b"A"));
        assert!(BitBuffer::from_bit_str("10x").is_none());
    }
}
