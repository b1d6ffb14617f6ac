//! Error kinds for the symhuff library.
//!
//! Every failure in the codec is returned to the caller as a `HuffError`. Nothing below the
//! command line interface logs-and-continues.

use thiserror::Error;

/// Result type alias used throughout the crate.
pub type Result<T> = std::result::Result<T, HuffError>;

#[derive(Error, Debug)]
pub enum HuffError {
    /// A bit range was requested outside of the buffer (or with from > to).
    #[error("Invalid bit range [{from}, {to}) for a buffer of {len} bits")]
    Range { from: usize, to: usize, len: usize },

    /// A single bit was requested past the end of the buffer.
    #[error("Bit index {index} out of bounds for a buffer of {len} bits")]
    Index { index: usize, len: usize },

    /// The probability file is missing, malformed or has an unparsable number.
    #[error("Probability file error at line {line}: {reason}")]
    ProbabilityFile { line: usize, reason: String },

    /// The probabilities never reached full mass, so no tree root exists.
    #[error("Probabilities sum to {sum}, a Huffman tree cannot be built")]
    ProbabilitySum { sum: f64 },

    /// Underlying read/write failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Symbol width {0} is outside 1..=31")]
    InvalidSymbolWidth(u8),

    /// The tree has more structure than the 13 bit header field can describe.
    #[error("Tree needs {structural_bits} structural bits, the header holds at most 8191")]
    HeaderOverflow { structural_bits: usize },

    /// The compressed header (or tail byte) is inconsistent.
    #[error("Corrupt header: {0}")]
    Header(String),

    /// The encoder met a symbol that has no code.
    #[error("Symbol {0} is not in the code table")]
    SymbolNotInTable(String),

    /// The payload ended in the middle of a code.
    #[error("Payload ended inside a code after {consumed} bits")]
    TruncatedPayload { consumed: usize },
}
