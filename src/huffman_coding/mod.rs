//! The huffman_coding module turns symbol probabilities into codes and back.
//!
//! - probability: the symbol to probability table both modes start from.
//! - huffman: builds the Huffman tree by repeatedly merging the two least likely nodes.
//! - code_table: walks the tree once to map each symbol to its bit code.
//! - header: stores the tree shape and leaf symbols in front of an adaptive payload, and rebuilds
//!   the tree from them.
//!
//! Ties between equal weights are broken by insertion order, so the same table always gives the
//! same tree. Decoding an a-priori stream depends on this.
//!

pub mod code_table;
pub mod header;
pub mod huffman;
pub mod probability;
