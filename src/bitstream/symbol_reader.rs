//! SymbolReader: A module for symhuff.
//!
//! Splits any I/O source that supports the read() call into consecutive fixed width symbols,
//! crossing byte boundaries as needed. Input is pulled through a bounded buffer, so the size of
//! the source does not matter.
//!
//! Both the frequency count and the encoder use this reader, which guarantees that they agree on
//! where each symbol starts and how the final partial symbol is padded.
//!

use std::io::{ErrorKind, Read};

use crate::bitstream::bitbuffer::{BitBuffer, BitRead};
use crate::error::Result;

/// Default read buffer size (64 MiB).
pub const READ_BUFFER_SIZE: usize = 64 * 1024 * 1024;

/// Reads fixed width symbols from a byte source.
#[derive(Debug)]
pub struct SymbolReader<R> {
    buffer: Vec<u8>,
    filled: usize,
    cursor: usize,
    bit_index: usize,
    width: u8,
    symbols: u64,
    source: R,
}

impl<R: Read> SymbolReader<R> {
    /// Creates a new SymbolReader producing `width` bit symbols, reading at most `buffer_size`
    /// bytes from the source at a time.
    pub fn new(source: R, width: u8, buffer_size: usize) -> Self {
        let size = buffer_size.max(1);
        Self {
            buffer: vec![0; size],
            filled: 0,
            cursor: 0,
            bit_index: 0,
            width,
            symbols: 0,
            source,
        }
    }

    /// Check (and refill) buffer. Returns true if we have data, false if there is no more
    fn have_data(&mut self) -> Result<bool> {
        if self.cursor == self.filled {
            let size = loop {
                match self.source.read(&mut self.buffer) {
                    Ok(size) => break size,
                    Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                    Err(e) => return Err(e.into()),
                }
            };
            if size == 0 {
                return Ok(false);
            }
            self.filled = size;
            self.cursor = 0;
            self.bit_index = 0;
        }
        Ok(true)
    }

    /// Return the next bit, or None if there is no more data to read
    #[inline]
    fn bit(&mut self) -> Result<Option<bool>> {
        if self.bit_index == 0 && !self.have_data()? {
            return Ok(None);
        }
        let bit = (self.buffer[self.cursor] >> (7 - self.bit_index)) & 1 == 1;
        self.bit_index += 1;
        if self.bit_index == 8 {
            self.bit_index = 0;
            self.cursor += 1;
        }
        Ok(Some(bit))
    }

    /// Fill `symbol` with the next symbol. Returns None once the source is exhausted, otherwise
    /// the number of zero bits that were appended to complete a final partial symbol (0 for
    /// every full symbol).
    ///
    /// A trailing remainder of any size, even a single bit, becomes one padded symbol.
    pub fn read_symbol(&mut self, symbol: &mut BitBuffer) -> Result<Option<u8>> {
        symbol.clear();
        while symbol.len() < self.width as usize {
            match self.bit()? {
                Some(bit) => symbol.append_bit(bit),
                None => break,
            };
        }
        if symbol.is_empty() {
            return Ok(None);
        }
        let pad = self.width as usize - symbol.len();
        symbol.append_zeros(pad);
        self.symbols += 1;
        Ok(Some(pad as u8))
    }

    /// Number of symbols returned so far.
    pub fn symbols_read(&self) -> u64 {
        self.symbols
    }
}

#[cfg(test)]
mod test {
    use super::SymbolReader;
    use crate::bitstream::bitbuffer::BitBuffer;

    fn collect(data: &[u8], width: u8, buffer_size: usize) -> Vec<(String, u8)> {
        let mut sr = SymbolReader::new(data, width, buffer_size);
        let mut symbol = BitBuffer::new();
        let mut out = vec![];
        while let Some(pad) = sr.read_symbol(&mut symbol).unwrap() {
            out.push((symbol.to_string(), pad));
        }
        out
    }

    #[test]
    fn byte_symbols_test() {
        let out = collect(b"AB", 8, 1024);
        assert_eq!(
            out,
            vec![("01000001".to_string(), 0), ("01000010".to_string(), 0)]
        );
    }

    #[test]
    fn crosses_byte_boundaries_test() {
        // 0b1010_1100 0b0011_1111 split into 5 bit symbols: 10101 10000 11111 1(pad 4)
        let out = collect(&[0b1010_1100, 0b0011_1111], 5, 1024);
        assert_eq!(
            out,
            vec![
                ("10101".to_string(), 0),
                ("10000".to_string(), 0),
                ("11111".to_string(), 0),
                ("10000".to_string(), 4),
            ]
        );
    }

    #[test]
    fn single_bit_remainder_is_kept_test() {
        // 8 bits at width 7 leave one bit over, which must still become a symbol.
        let out = collect(&[0xff], 7, 1024);
        assert_eq!(
            out,
            vec![("1111111".to_string(), 0), ("1000000".to_string(), 6)]
        );
    }

    #[test]
    fn tiny_buffer_matches_large_buffer_test() {
        let data = "The quick brown fox jumps over the lazy dog".as_bytes();
        for width in [1, 3, 8, 13, 31] {
            assert_eq!(collect(data, width, 1), collect(data, width, 4096));
            assert_eq!(collect(data, width, 7), collect(data, width, 4096));
        }
    }

    #[test]
    fn empty_source_test() {
        let mut sr = SymbolReader::new(b"".as_slice(), 8, 16);
        let mut symbol = BitBuffer::new();
        assert_eq!(sr.read_symbol(&mut symbol).unwrap(), None);
        assert_eq!(sr.symbols_read(), 0);
    }
}
