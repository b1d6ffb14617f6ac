//! The header module serializes the shape of an adaptive Huffman tree into the compressed stream
//! and rebuilds the tree from it.
//!
//! Header layout, most significant bit first:
//!
//! ```text
//! [symbol width:5][pre pad:3][post pad:3][structural bit count:13]   24 bit field block
//! [structural bits]                                                  2 per internal node
//! [leaf symbols]                                                     (count/2 + 1) * width
//! [pre pad zeros]                                                    aligns the payload start
//! ```
//!
//! Structural bits come from a pre-order walk: a 0 each time we step down to a left child, a 1
//! each time we step down to a right child. Leaves emit no structural bit. Their symbols are
//! written afterwards in the order the walk met them.
//!

use std::collections::VecDeque;

use log::{debug, trace};

use super::huffman::{Node, NodeData};
use crate::bitstream::bitbuffer::{BitBuffer, BitRead};
use crate::error::{HuffError, Result};

/// Width of the fixed field block.
pub const FIELD_BLOCK_BITS: usize = 24;
/// Largest structural bit count the 13 bit field can hold.
pub const MAX_STRUCTURAL_BITS: usize = (1 << 13) - 1;
/// Largest symbol width the 5 bit field can hold.
pub const MAX_SYMBOL_WIDTH: u8 = 31;

/// Parameters carried by the field block of an adaptive header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub symbol_width: u8,
    /// Zero bits between the leaf symbols and the payload.
    pub pre_pad: u8,
    /// Zero bits after the payload.
    pub post_pad: u8,
    pub structural_bits: usize,
}

impl Header {
    pub fn leaf_count(&self) -> usize {
        self.structural_bits / 2 + 1
    }

    /// Bits used by the field block, structural bits and leaf symbols (pre pad excluded).
    pub fn tree_bits(&self) -> usize {
        FIELD_BLOCK_BITS + self.structural_bits + self.leaf_count() * self.symbol_width as usize
    }

    /// Bit offset of the first payload bit.
    pub fn payload_start(&self) -> usize {
        self.tree_bits() + self.pre_pad as usize
    }

    /// Parse the field block at the start of a compressed stream.
    pub fn parse(compressed: &[u8]) -> Result<Header> {
        Header::read_fields(&BitBuffer::borrow(compressed))
    }

    /// Parse and check the 24 bit field block.
    pub fn read_fields<B: BitRead + ?Sized>(bits: &B) -> Result<Header> {
        if bits.len() < FIELD_BLOCK_BITS {
            return Err(HuffError::Header(format!(
                "{} bits is too short for the field block",
                bits.len()
            )));
        }
        let header = Header {
            symbol_width: bits.value_at(0, 5)? as u8,
            pre_pad: bits.value_at(5, 3)? as u8,
            post_pad: bits.value_at(8, 3)? as u8,
            structural_bits: bits.value_at(11, 13)? as usize,
        };
        if header.symbol_width == 0 {
            return Err(HuffError::Header("symbol width is zero".to_string()));
        }
        if header.structural_bits == 0 || header.structural_bits % 2 != 0 {
            return Err(HuffError::Header(format!(
                "structural bit count {} is not a positive even number",
                header.structural_bits
            )));
        }
        if (header.tree_bits() + header.pre_pad as usize) % 8 != 0 {
            return Err(HuffError::Header(format!(
                "pre pad {} does not align a {} bit header",
                header.pre_pad,
                header.tree_bits()
            )));
        }
        if header.payload_start() > bits.len() {
            return Err(HuffError::Header(format!(
                "header needs {} bits but the stream has {}",
                header.payload_start(),
                bits.len()
            )));
        }
        Ok(header)
    }

    fn write_fields(&self, out: &mut BitBuffer) {
        out.append_value(self.symbol_width as u32, 5)
            .append_value(self.pre_pad as u32, 3)
            .append_value(self.post_pad as u32, 3)
            .append_value(self.structural_bits as u32, 13);
    }
}

/// Tree topology as produced by the pre-order walk.
#[derive(Debug)]
pub struct TreeShape<'a> {
    pub structural: BitBuffer,
    pub leaves: VecDeque<&'a BitBuffer>,
}

#[derive(Clone, Copy)]
enum Visit {
    Fresh,
    LeftDone,
    Done,
}

/// Walk the tree with an explicit stack, recording structural bits and leaves in visit order.
pub fn describe_tree(root: &Node) -> TreeShape<'_> {
    let mut structural = BitBuffer::new();
    let mut leaves = VecDeque::new();
    let mut stack: Vec<(&Node, Visit)> = vec![(root, Visit::Fresh)];

    while let Some(top) = stack.last_mut() {
        let (node, visit) = *top;
        match &node.node_data {
            NodeData::Leaf(symbol) => {
                leaves.push_back(symbol);
                stack.pop();
            }
            NodeData::Internal(left, right) => match visit {
                Visit::Fresh => {
                    top.1 = Visit::LeftDone;
                    structural.append_bit(false);
                    stack.push((left.as_ref(), Visit::Fresh));
                }
                Visit::LeftDone => {
                    top.1 = Visit::Done;
                    structural.append_bit(true);
                    stack.push((right.as_ref(), Visit::Fresh));
                }
                Visit::Done => {
                    stack.pop();
                }
            },
        }
    }
    TreeShape { structural, leaves }
}

/// Build the complete header for `root`, including the pre pad that byte aligns the payload.
/// `post_pad` is the number of zero bits that will follow the payload.
pub fn write_header(root: &Node, symbol_width: u8, post_pad: u8) -> Result<(Header, BitBuffer)> {
    if symbol_width == 0 || symbol_width > MAX_SYMBOL_WIDTH {
        return Err(HuffError::InvalidSymbolWidth(symbol_width));
    }
    let shape = describe_tree(root);
    if shape.structural.len() > MAX_STRUCTURAL_BITS {
        return Err(HuffError::HeaderOverflow {
            structural_bits: shape.structural.len(),
        });
    }
    if let Some(odd) = shape
        .leaves
        .iter()
        .find(|s| s.len() != symbol_width as usize)
    {
        return Err(HuffError::Header(format!(
            "leaf {} is not {} bits wide",
            odd, symbol_width
        )));
    }

    let mut header = Header {
        symbol_width,
        pre_pad: 0,
        post_pad,
        structural_bits: shape.structural.len(),
    };
    header.pre_pad = ((8 - header.tree_bits() % 8) % 8) as u8;

    let mut out = BitBuffer::with_capacity(header.payload_start());
    header.write_fields(&mut out);
    out.concat(&shape.structural);
    for symbol in shape.leaves {
        out.concat(symbol);
    }
    out.append_zeros(header.pre_pad as usize);
    debug!(
        "Header is {} bytes ({} structural bits, {} leaves).",
        out.len() / 8,
        header.structural_bits,
        header.leaf_count()
    );
    Ok((header, out))
}

/// Tree node under construction while reading a header.
enum Slot {
    Internal {
        left: Option<usize>,
        right: Option<usize>,
    },
    Leaf(BitBuffer),
}

/// Point the `right` (or left) child of `parent` at `child`.
fn fill(arena: &mut [Slot], parent: usize, right: bool, child: usize) -> Result<()> {
    match &mut arena[parent] {
        Slot::Internal { left: l, right: r } => {
            let slot = if right { r } else { l };
            if slot.is_some() {
                return Err(HuffError::Header("a child slot was filled twice".to_string()));
            }
            *slot = Some(child);
            Ok(())
        }
        Slot::Leaf(_) => Err(HuffError::Header("a leaf cannot have children".to_string())),
    }
}

/// Parse the header at the start of `bits` and rebuild the Huffman tree it describes.
///
/// The stack holds internal nodes that still have an empty child slot. The previous structural
/// bit says which slot is pending (0 = left, 1 = right). A 1 fills the pending slot with the next
/// leaf, a 0 fills it with a new internal node that becomes the top of the stack. A node whose
/// right slot gets filled is finished and leaves the stack. The final leaf symbol has no
/// structural bit of its own and fills whatever slot is still pending at the end.
pub fn read_header<B: BitRead + ?Sized>(bits: &B) -> Result<(Header, Node)> {
    let header = Header::read_fields(bits)?;
    let width = header.symbol_width as usize;
    let leaf_start = FIELD_BLOCK_BITS + header.structural_bits;
    let leaf_count = header.leaf_count();
    trace!("Read header {:?}", header);

    let mut next_leaf = 0;
    let mut take_leaf = |arena: &mut Vec<Slot>| -> Result<usize> {
        if next_leaf >= leaf_count {
            return Err(HuffError::Header("structure needs more leaves than declared".to_string()));
        }
        let from = leaf_start + next_leaf * width;
        next_leaf += 1;
        arena.push(Slot::Leaf(bits.slice(from, from + width)?));
        Ok(arena.len() - 1)
    };

    let mut arena = vec![Slot::Internal {
        left: None,
        right: None,
    }];
    let mut stack = vec![0_usize];
    let mut structure = bits.bits(FIELD_BLOCK_BITS, leaf_start)?;
    let mut prev = structure.next().unwrap_or(false);

    for curr in structure {
        let head = *stack
            .last()
            .ok_or_else(|| HuffError::Header("structure climbs above the root".to_string()))?;
        if curr {
            let leaf = take_leaf(&mut arena)?;
            fill(&mut arena, head, prev, leaf)?;
            if prev {
                stack.pop();
            }
        } else {
            arena.push(Slot::Internal {
                left: None,
                right: None,
            });
            let node = arena.len() - 1;
            fill(&mut arena, head, prev, node)?;
            if prev {
                stack.pop();
            }
            stack.push(node);
        }
        prev = curr;
    }

    // The last leaf closes the slot that is still pending.
    let head = *stack
        .last()
        .ok_or_else(|| HuffError::Header("no node is waiting for the last leaf".to_string()))?;
    let leaf = take_leaf(&mut arena)?;
    fill(&mut arena, head, prev, leaf)?;

    Ok((header, assemble(arena)?))
}

/// Turn the arena into an owned tree. Children are always created after their parent, so a
/// reverse sweep has every child ready before its parent needs it.
fn assemble(arena: Vec<Slot>) -> Result<Node> {
    let mut built: Vec<Option<Node>> = (0..arena.len()).map(|_| None).collect();
    for (i, slot) in arena.into_iter().enumerate().rev() {
        let node = match slot {
            Slot::Leaf(symbol) => Node::leaf(symbol, 0.0),
            Slot::Internal {
                left: Some(l),
                right: Some(r),
            } => {
                let missing = || HuffError::Header("child used twice or out of order".to_string());
                let left = built[l].take().ok_or_else(missing)?;
                let right = built[r].take().ok_or_else(missing)?;
                Node::internal(left, right, 0.0)
            }
            Slot::Internal { .. } => {
                return Err(HuffError::Header(
                    "an internal node is missing a child".to_string(),
                ))
            }
        };
        built[i] = Some(node);
    }
    built
        .first_mut()
        .and_then(Option::take)
        .ok_or_else(|| HuffError::Header("empty tree".to_string()))
}
