use std::fs;
use std::path::Path;
use std::ptr;

use log::{debug, info, warn};

use super::{Model, Tail};
use crate::bitstream::bitbuffer::{BitBuffer, BitRead};
use crate::error::{HuffError, Result};
use crate::huffman_coding::header::read_header;
use crate::huffman_coding::huffman::{build_tree, Node, NodeData};

/// Walk the tree over bits `[start, stop)`, emitting the symbol of every leaf reached.
pub fn decode<B: BitRead + ?Sized>(
    bits: &B,
    root: &Node,
    start: usize,
    stop: usize,
) -> Result<BitBuffer> {
    if root.is_leaf() {
        return Err(HuffError::Header("tree root is a leaf".to_string()));
    }
    let mut out = BitBuffer::new();
    let mut node = root;
    for bit in bits.bits(start, stop)? {
        if let NodeData::Internal(left, right) = &node.node_data {
            node = if bit { right.as_ref() } else { left.as_ref() };
        }
        if let NodeData::Leaf(symbol) = &node.node_data {
            out.concat(symbol);
            node = root;
        }
    }
    if !ptr::eq(node, root) {
        return Err(HuffError::TruncatedPayload {
            consumed: stop - start,
        });
    }
    Ok(out)
}

/// Decompress a stream produced by `compress` with the same kind of model. In adaptive mode the
/// symbol width stored in the header wins over the one in `model`.
pub fn decompress(compressed: &[u8], model: &Model) -> Result<Vec<u8>> {
    let (&tail_byte, _) = match compressed.split_last() {
        Some(split) => split,
        None => return Ok(Vec::new()),
    };
    let tail = Tail::from_byte(tail_byte);
    let bits = BitBuffer::borrow(compressed);
    let body_end = bits.len() - 8;

    let (root, start, post_pad, width) = match model {
        Model::Adaptive { .. } => {
            let (header, root) = read_header(&bits)?;
            if header.post_pad != tail.post_pad {
                return Err(HuffError::Header(format!(
                    "post pad is {} in the header but {} in the tail byte",
                    header.post_pad, tail.post_pad
                )));
            }
            debug!("Adaptive header {:?}", header);
            (root, header.payload_start(), header.post_pad, header.symbol_width)
        }
        Model::Priori(table) => (build_tree(table)?, 0, tail.post_pad, model.symbol_width()),
    };
    if tail.symbol_pad >= width {
        return Err(HuffError::Header(format!(
            "symbol pad {} is not smaller than the symbol width {}",
            tail.symbol_pad, width
        )));
    }

    let stop = body_end
        .checked_sub(post_pad as usize)
        .filter(|&stop| stop >= start)
        .ok_or_else(|| {
            HuffError::Header(format!(
                "payload would start at bit {} but the stream body ends at {}",
                start, body_end
            ))
        })?;

    let mut out = decode(&bits, &root, start, stop)?;
    let symbol_pad = tail.symbol_pad as usize;
    if out.len() < symbol_pad {
        return Err(HuffError::Header(format!(
            "{} decoded bits cannot hold a symbol pad of {}",
            out.len(),
            symbol_pad
        )));
    }
    out.truncate(out.len() - symbol_pad);

    if out.len() % 8 != 0 {
        warn!(
            "Decoded {} bits, the last byte is zero filled.",
            out.len()
        );
    }
    info!(
        "Decoded {} payload bits into {} bytes.",
        stop - start,
        out.as_bytes().len()
    );
    Ok(out.into_bytes())
}

/// Read a compressed file and decompress it.
pub fn decompress_file<P: AsRef<Path>>(path: P, model: &Model) -> Result<Vec<u8>> {
    let path = path.as_ref();
    let compressed = fs::read(path)?;
    info!("Decompressing {} ({} bytes).", path.display(), compressed.len());
    decompress(&compressed, model)
}
