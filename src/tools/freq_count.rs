use std::io::Read;

use log::debug;
use rustc_hash::FxHashMap;

use crate::bitstream::bitbuffer::BitBuffer;
use crate::bitstream::symbol_reader::SymbolReader;
use crate::error::Result;
use crate::huffman_coding::probability::ProbabilityTable;

/// Returns the probability of every distinct `width` bit symbol in the source, in order of first
/// appearance. The source is read through a buffer of at most `buffer_size` bytes.
pub fn freqs<R: Read>(source: R, width: u8, buffer_size: usize) -> Result<ProbabilityTable> {
    let mut reader = SymbolReader::new(source, width, buffer_size);
    let mut index: FxHashMap<BitBuffer, usize> = FxHashMap::default();
    let mut counts: Vec<(BitBuffer, u64)> = vec![];
    let mut symbol = BitBuffer::with_capacity(width as usize);

    while reader.read_symbol(&mut symbol)?.is_some() {
        match index.get(&symbol) {
            Some(&i) => counts[i].1 += 1,
            None => {
                index.insert(symbol.clone(), counts.len());
                counts.push((symbol.clone(), 1));
            }
        }
    }

    let total = reader.symbols_read() as f64;
    debug!(
        "Counted {} symbols of {} bits, {} distinct.",
        reader.symbols_read(),
        width,
        counts.len()
    );
    let mut table = ProbabilityTable::with_capacity(counts.len());
    for (symbol, count) in counts {
        table.insert(symbol, count as f64 / total);
    }
    Ok(table)
}
