use std::fs::{self, File};
use std::io::Read;
use std::path::Path;

use log::{debug, info};

use super::{Model, Tail, PRIORI_SYMBOL_WIDTH};
use crate::bitstream::bitbuffer::{BitBuffer, BitRead};
use crate::bitstream::symbol_reader::SymbolReader;
use crate::error::{HuffError, Result};
use crate::huffman_coding::code_table::CodeTable;
use crate::huffman_coding::header::{write_header, MAX_STRUCTURAL_BITS, MAX_SYMBOL_WIDTH};
use crate::huffman_coding::huffman::build_tree;
use crate::tools::freq_count::freqs;

/// Output of the encode pass.
#[derive(Debug)]
pub struct Encoded {
    /// Concatenated Huffman codes.
    pub payload: BitBuffer,
    /// Zero bits that completed the final partial symbol.
    pub symbol_pad: u8,
    /// Zero bits needed to bring the payload to a whole byte.
    pub post_pad: u8,
    pub symbols: u64,
}

/// Replace every `width` bit symbol of the source with its code.
pub fn encode<R: Read>(
    source: R,
    width: u8,
    codes: &CodeTable,
    buffer_size: usize,
) -> Result<Encoded> {
    let mut reader = SymbolReader::new(source, width, buffer_size);
    let mut payload = BitBuffer::new();
    let mut symbol = BitBuffer::with_capacity(width as usize);
    let mut symbol_pad = 0;

    while let Some(pad) = reader.read_symbol(&mut symbol)? {
        let code = codes
            .get(&symbol)
            .ok_or_else(|| HuffError::SymbolNotInTable(symbol.to_string()))?;
        payload.concat(code);
        symbol_pad = pad;
    }

    let post_pad = ((8 - payload.len() % 8) % 8) as u8;
    debug!(
        "Encoded {} symbols into {} bits (symbol pad {}, post pad {}).",
        reader.symbols_read(),
        payload.len(),
        symbol_pad,
        post_pad
    );
    Ok(Encoded {
        payload,
        symbol_pad,
        post_pad,
        symbols: reader.symbols_read(),
    })
}

/// Read buffer cap for in-memory input. The bytes are already resident, so a large buffer would
/// only duplicate them.
pub const SLICE_BUFFER_SIZE: usize = 64 * 1024;

/// Compress `input` with the given model.
pub fn compress(input: &[u8], model: &Model) -> Result<Vec<u8>> {
    if input.is_empty() {
        return Ok(Vec::new());
    }
    compress_with(|| Ok(input), model, slice_buffer_size(input.len()))
}

fn slice_buffer_size(len: usize) -> usize {
    len.min(SLICE_BUFFER_SIZE)
}

/// Compress a file without loading it into memory. The file is read twice (adaptive mode) through
/// a buffer of at most `buffer_size` bytes.
pub fn compress_file<P: AsRef<Path>>(path: P, model: &Model, buffer_size: usize) -> Result<Vec<u8>> {
    let path = path.as_ref();
    let size = fs::metadata(path)?.len();
    if size == 0 {
        return Ok(Vec::new());
    }
    let buffer_size = buffer_size.min(size.min(usize::MAX as u64) as usize).max(1);
    info!("Compressing {} ({} bytes).", path.display(), size);
    compress_with(|| Ok(File::open(path)?), model, buffer_size)
}

/// Shared driver. `open` must return a fresh reader positioned at the start of the input each
/// time it is called.
fn compress_with<R, F>(mut open: F, model: &Model, buffer_size: usize) -> Result<Vec<u8>>
where
    R: Read,
    F: FnMut() -> Result<R>,
{
    match model {
        Model::Adaptive { symbol_width } => {
            let width = *symbol_width;
            if width == 0 || width > MAX_SYMBOL_WIDTH {
                return Err(HuffError::InvalidSymbolWidth(width));
            }
            let table = freqs(open()?, width, buffer_size)?;
            if table.is_empty() {
                return Ok(Vec::new());
            }
            // Fail before the encode pass if the tree cannot fit in the header.
            let structural_bits = 2 * (table.len().max(2) - 1);
            if structural_bits > MAX_STRUCTURAL_BITS {
                return Err(HuffError::HeaderOverflow { structural_bits });
            }

            let tree = build_tree(&table)?;
            let codes = CodeTable::from_tree(&tree);
            info!(
                "{} distinct {} bit symbols, {:.3} bits per symbol on average.",
                codes.len(),
                width,
                codes.average_length(table.iter())
            );
            let encoded = encode(open()?, width, &codes, buffer_size)?;
            let (_, header) = write_header(&tree, width, encoded.post_pad)?;
            Ok(frame(Some(header), encoded))
        }
        Model::Priori(table) => {
            let tree = build_tree(table)?;
            let codes = CodeTable::from_tree(&tree);
            let encoded = encode(open()?, PRIORI_SYMBOL_WIDTH, &codes, buffer_size)?;
            if encoded.symbols == 0 {
                return Ok(Vec::new());
            }
            Ok(frame(None, encoded))
        }
    }
}

/// Lay out `[header][payload + post pad][tail byte]`. The header is already byte aligned, and the
/// payload's final byte is zero padded, which supplies the post pad bits.
fn frame(header: Option<BitBuffer>, encoded: Encoded) -> Vec<u8> {
    let tail = Tail {
        symbol_pad: encoded.symbol_pad,
        post_pad: encoded.post_pad,
    };
    let mut out = header.map(BitBuffer::into_bytes).unwrap_or_default();
    let header_len = out.len();
    out.extend_from_slice(encoded.payload.as_bytes());
    out.push(tail.to_byte());
    info!(
        "Wrote {} header bytes and {} payload bytes.",
        header_len,
        out.len() - header_len - 1
    );
    out
}

#[cfg(test)]
mod test {
    use super::{compress, compress_with, encode, slice_buffer_size, SLICE_BUFFER_SIZE};
    use crate::bitstream::bitbuffer::{BitBuffer, BitRead};
    use crate::compression::Model;
    use crate::error::HuffError;
    use crate::huffman_coding::code_table::CodeTable;
    use crate::huffman_coding::header::Header;
    use crate::huffman_coding::huffman::build_tree;
    use crate::tools::freq_count::freqs;
    use crate::tools::priori_table::parse_priori;

    #[test]
    fn aab_payload_test() {
        let table = freqs("AAB".as_bytes(), 8, 16).unwrap();
        let codes = CodeTable::from_tree(&build_tree(&table).unwrap());
        let encoded = encode("AAB".as_bytes(), 8, &codes, 16).unwrap();
        assert_eq!(encoded.payload.len(), 3);
        assert_eq!(encoded.symbols, 3);
        assert_eq!(encoded.symbol_pad, 0);
        assert_eq!(encoded.post_pad, 5);
        // A and B each get one bit, and the two codes differ.
        let a = encoded.payload.bit_at(0).unwrap();
        assert_eq!(encoded.payload.bit_at(1).unwrap(), a);
        assert_ne!(encoded.payload.bit_at(2).unwrap(), a);
    }

    #[test]
    fn aab_stream_test() {
        let out = compress(b"AAB", &Model::adaptive(8)).unwrap();
        // 6 header bytes, 1 payload byte, 1 tail byte.
        assert_eq!(out.len(), 8);
        let header = Header::parse(&out).unwrap();
        assert_eq!(header.symbol_width, 8);
        assert_eq!(header.structural_bits, 2);
        assert_eq!(header.leaf_count(), 2);
        assert_eq!(header.post_pad, 5);
        assert_eq!(header.payload_start(), 48);
        // B is the lighter symbol, so it took the left (0) branch and A the right (1).
        assert_eq!(out[6], 0b1100_0000);
        assert_eq!(out[7], 5);
    }

    #[test]
    fn final_symbol_pad_is_recorded_test() {
        // 24 bits at width 7 leaves 3 bits over, padded with 4 zeros.
        let table = freqs([1_u8, 2, 3].as_slice(), 7, 16).unwrap();
        let codes = CodeTable::from_tree(&build_tree(&table).unwrap());
        let encoded = encode([1_u8, 2, 3].as_slice(), 7, &codes, 16).unwrap();
        assert_eq!(encoded.symbols, 4);
        assert_eq!(encoded.symbol_pad, 4);
    }

    #[test]
    fn slice_buffer_is_capped_test() {
        assert_eq!(slice_buffer_size(100), 100);
        assert_eq!(slice_buffer_size(64 * 1024 * 1024), SLICE_BUFFER_SIZE);

        // Input several times the cap gives the same stream as one whole-input buffer.
        let data: Vec<u8> = (0..3 * SLICE_BUFFER_SIZE as u32 + 7)
            .map(|i| (i % 251) as u8 ^ (i >> 12) as u8)
            .collect();
        for model in [Model::adaptive(11), Model::adaptive(8)] {
            let capped = compress(&data, &model).unwrap();
            let whole = compress_with(|| Ok(data.as_slice()), &model, data.len()).unwrap();
            assert_eq!(capped, whole);
        }
    }

    #[test]
    fn empty_input_test() {
        assert!(compress(b"", &Model::adaptive(8)).unwrap().is_empty());
        let table = parse_priori("2\na 0.5\nb 0.5").unwrap();
        assert!(compress(b"", &Model::Priori(table)).unwrap().is_empty());
    }

    #[test]
    fn invalid_width_test() {
        assert!(matches!(
            compress(b"abc", &Model::adaptive(0)),
            Err(HuffError::InvalidSymbolWidth(0))
        ));
        assert!(matches!(
            compress(b"abc", &Model::adaptive(32)),
            Err(HuffError::InvalidSymbolWidth(32))
        ));
    }

    #[test]
    fn header_overflow_test() {
        // 3000 distinct 16 bit symbols need 5998 structural bits (fits); 5000 need 9998 (does not).
        let fits: Vec<u8> = (0..3000_u16).flat_map(|v| v.to_be_bytes()).collect();
        assert!(compress(&fits, &Model::adaptive(16)).is_ok());
        let overflow: Vec<u8> = (0..5000_u16).flat_map(|v| v.to_be_bytes()).collect();
        assert!(matches!(
            compress(&overflow, &Model::adaptive(16)),
            Err(HuffError::HeaderOverflow { .. })
        ));
    }

    #[test]
    fn priori_symbol_not_in_table_test() {
        let table = parse_priori("2\na 0.5\nb 0.5").unwrap();
        match compress(b"abc", &Model::Priori(table)) {
            Err(HuffError::SymbolNotInTable(s)) => {
                assert_eq!(s, BitBuffer::from_bytes(b"c").to_string())
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn priori_bad_sum_test() {
        let table = parse_priori("2\na 0.25\nb 0.25").unwrap();
        assert!(matches!(
            compress(b"ab", &Model::Priori(table)),
            Err(HuffError::ProbabilitySum { .. })
        ));
    }
}
