//! Huffman compression over fixed width symbols.
//!
//! The input is read as a stream of `L` bit symbols (1 <= L <= 31), not bytes. Two models are
//! supported:
//!
//! - Adaptive: symbol frequencies are measured from the input, and the resulting tree is written
//!   into a header in front of the payload.
//! - A-priori: a probability table shared by compressor and decompressor supplies the tree. No
//!   header is written and symbols are always one byte wide.
//!
//! Basic usage to compress a file is as follows:
//!
//! `$> symhuff -z -w 12 test.txt`
//!
//! This will compress the file with 12 bit symbols and create the file test.txt.huf.
//! The original file will be deleted unless `-k` is given.
//!
//! From code:
//!
//! ```
//! use symhuff::{compress, decompress, Model};
//!
//! let model = Model::adaptive(8);
//! let packed = compress(b"abracadabra", &model).unwrap();
//! assert_eq!(decompress(&packed, &model).unwrap(), b"abracadabra");
//! ```
//!
pub mod bitstream;
pub mod compression;
pub mod error;
pub mod huffman_coding;
pub mod tools;

pub use compression::compress::{compress, compress_file};
pub use compression::decompress::{decompress, decompress_file};
pub use compression::Model;
pub use error::{HuffError, Result};
pub use huffman_coding::probability::ProbabilityTable;
