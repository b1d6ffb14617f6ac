//! The tools module provides helper functions around the symhuff codec.
//!
//! The tools are:
//! - cli: Command line interface for symhuff.
//! - freq_count: Frequency count of fixed width symbols (adaptive mode).
//! - priori_table: Probability file parser (a-priori mode).
//!
pub mod cli;
pub mod freq_count;
pub mod priori_table;
