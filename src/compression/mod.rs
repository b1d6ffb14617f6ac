//! The compression module holds the two entry points of symhuff, `compress` and `decompress`.
//!
//! Compression happens in the following passes:
//! - Frequency count (adaptive only): split the input into fixed width symbols and measure them.
//! - Huffman tree: merge the two least likely nodes until all probability mass is in one tree.
//! - Code table: walk the tree once to find the bit code of every symbol.
//! - Encode: read the input again, replacing each symbol with its code.
//! - Header (adaptive only): describe the tree shape and leaf symbols ahead of the payload.
//!
//! Decompression is the inverse: rebuild the tree (from the header, or from the same probability
//! table), then walk it bit by bit over the payload.
//!
//! Stream layout:
//!
//! ```text
//! adaptive:  [header + pre pad][payload][post pad][tail byte]
//! a-priori:                    [payload][post pad][tail byte]
//! ```
//!
//! The tail byte is `[symbol pad:5][post pad:3]`. Symbol pad counts the zero bits that completed
//! the final partial symbol, so the decoder can drop them again. Empty input compresses to an
//! empty stream.
//!
//! The tail byte is also written after adaptive streams, which already carry the post pad in their
//! header. Without it the final partial symbol cannot be told apart from data whenever the width
//! does not divide the input length. An adaptive stream that ends right after its post pad (no
//! tail byte) is therefore not readable by this decoder: its last payload byte would be taken for
//! the tail byte.
//!

use std::path::Path;

use crate::error::Result;
use crate::huffman_coding::probability::ProbabilityTable;
use crate::tools::priori_table::read_priori_file;

pub mod compress;
pub mod decompress;

/// Symbol width used in a-priori mode: one byte per symbol.
pub const PRIORI_SYMBOL_WIDTH: u8 = 8;

/// Where the code table comes from.
#[derive(Debug, Clone)]
pub enum Model {
    /// Measure the input itself and embed the tree in a header. Decompression reads the width
    /// back from the header, so `symbol_width` only matters when compressing.
    Adaptive { symbol_width: u8 },
    /// Use a fixed probability table shared by both sides. No header is written.
    Priori(ProbabilityTable),
}

impl Model {
    pub fn adaptive(symbol_width: u8) -> Self {
        Model::Adaptive { symbol_width }
    }

    /// Load an a-priori model from a probability file.
    pub fn priori_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Model::Priori(read_priori_file(path)?))
    }

    pub fn symbol_width(&self) -> u8 {
        match self {
            Model::Adaptive { symbol_width } => *symbol_width,
            Model::Priori(_) => PRIORI_SYMBOL_WIDTH,
        }
    }
}

/// Last byte of every non-empty compressed stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tail {
    pub symbol_pad: u8,
    pub post_pad: u8,
}

impl Tail {
    pub fn to_byte(self) -> u8 {
        (self.symbol_pad << 3) | (self.post_pad & 0b111)
    }

    pub fn from_byte(byte: u8) -> Self {
        Tail {
            symbol_pad: byte >> 3,
            post_pad: byte & 0b111,
        }
    }
}

#[cfg(test)]
mod test {
    use super::{Model, Tail};
    use crate::compression::compress::compress;
    use crate::compression::decompress::decompress;
    use crate::huffman_coding::header::Header;

    #[test]
    fn tail_byte_test() {
        let tail = Tail {
            symbol_pad: 30,
            post_pad: 7,
        };
        assert_eq!(tail.to_byte(), 0b11110_111);
        assert_eq!(Tail::from_byte(0b11110_111), tail);
        assert_eq!(Tail::from_byte(5), Tail { symbol_pad: 0, post_pad: 5 });
    }

    #[test]
    fn adaptive_stream_ends_with_tail_test() {
        // 5 bytes at width 12: three full symbols plus 4 bits padded with 8 zeros.
        let out = compress(b"tails", &Model::adaptive(12)).unwrap();
        let header = Header::parse(&out).unwrap();
        let tail = Tail::from_byte(out[out.len() - 1]);
        assert_eq!(tail.post_pad, header.post_pad);
        assert_eq!(tail.symbol_pad, 8);
        // Header, at least one payload byte, then the tail byte.
        assert!(header.payload_start() / 8 + 1 < out.len());
        // Without its tail byte the stream no longer decodes to the input.
        let untailed = decompress(&out[..out.len() - 1], &Model::adaptive(12));
        assert!(untailed.map_or(true, |back| back != b"tails".to_vec()));
    }
}
