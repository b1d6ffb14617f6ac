//! Parse an a-priori probability table.
//!
//! The file is text. The first line holds the number of entries (a capacity hint only), then
//! every line is `<token><whitespace><probability>`:
//!
//! ```text
//! 3
//! e 0.5
//! t 0.3
//!  0.2
//! ```
//!
//! A line that starts with whitespace has an empty token, which stands for the space character.
//! Each token's bytes form one symbol, so multi-byte tokens are keys of their own.

use std::fs;
use std::path::Path;

use log::{debug, warn};

use crate::bitstream::bitbuffer::BitBuffer;
use crate::error::{HuffError, Result};
use crate::huffman_coding::probability::ProbabilityTable;

fn file_error(line: usize, reason: impl Into<String>) -> HuffError {
    HuffError::ProbabilityFile {
        line,
        reason: reason.into(),
    }
}

/// Read and parse a probability file.
pub fn read_priori_file<P: AsRef<Path>>(path: P) -> Result<ProbabilityTable> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)
        .map_err(|e| file_error(0, format!("cannot read {}: {}", path.display(), e)))?;
    parse_priori(&text)
}

/// Parse the text of a probability file.
pub fn parse_priori(text: &str) -> Result<ProbabilityTable> {
    let mut lines = text.lines().enumerate().map(|(i, l)| (i + 1, l));

    let (_, first) = lines
        .next()
        .ok_or_else(|| file_error(1, "file is empty"))?;
    let declared: usize = first
        .trim()
        .parse()
        .map_err(|e| file_error(1, format!("bad entry count {:?}: {}", first, e)))?;

    let mut table = ProbabilityTable::with_capacity(declared);
    for (line_no, line) in lines {
        let (token, rest) = line
            .split_once(char::is_whitespace)
            .ok_or_else(|| file_error(line_no, format!("no probability in {:?}", line)))?;
        let probability: f64 = rest
            .trim()
            .parse()
            .map_err(|e| file_error(line_no, format!("bad probability {:?}: {}", rest, e)))?;
        if !(0.0..=1.0).contains(&probability) {
            return Err(file_error(
                line_no,
                format!("probability {} is outside [0, 1]", probability),
            ));
        }
        let symbol = if token.is_empty() {
            BitBuffer::from_bytes(b" ")
        } else {
            BitBuffer::from_bytes(token.as_bytes())
        };
        table.insert(symbol, probability);
    }

    if table.len() != declared {
        warn!(
            "Probability file declares {} entries but holds {}.",
            declared,
            table.len()
        );
    }
    debug!(
        "Read {} a-priori probabilities summing to {}.",
        table.len(),
        table.sum()
    );
    Ok(table)
}
