//! The bitstream module forms the I/O subsystem for symhuff.
//!
//! Symbols, Huffman codes, headers and payloads are all sequences of bits that rarely line up
//! with byte boundaries. Everything here works in most-significant-bit-first order.
//!
//! - bitbuffer: the packed, growable BitBuffer plus the borrowed, read-only BitView.
//! - symbol_reader: pulls fixed width symbols out of any `Read` source through a bounded buffer.
//!
pub mod bitbuffer;
pub mod symbol_reader;
