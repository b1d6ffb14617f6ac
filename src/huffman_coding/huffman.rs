use log::{debug, trace, warn};

use super::probability::ProbabilityTable;
use crate::bitstream::bitbuffer::BitBuffer;
use crate::error::{HuffError, Result};
use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// Combined weight at which a merge is taken to be the root. Probabilities are floating point,
/// so "sums to one" means "sums to at least this".
pub const APPROXIMATION: f64 = 0.999999;

#[derive(PartialEq, Debug, Clone)]
pub enum NodeData {
    Internal(Box<Node>, Box<Node>),
    Leaf(BitBuffer),
}
#[derive(PartialEq, Debug, Clone)]
pub struct Node {
    pub weight: f64,
    pub node_data: NodeData,
}
impl Node {
    pub fn leaf(symbol: BitBuffer, weight: f64) -> Node {
        Node {
            weight,
            node_data: NodeData::Leaf(symbol),
        }
    }

    pub fn internal(left: Node, right: Node, weight: f64) -> Node {
        Node {
            weight,
            node_data: NodeData::Internal(Box::new(left), Box::new(right)),
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self.node_data, NodeData::Leaf(_))
    }
}

/// Priority queue entry. BinaryHeap is a max-heap, so the ordering is reversed: the lightest
/// weight ranks highest, and among equal weights the earliest inserted.
struct Ranked {
    weight: f64,
    seq: usize,
    node: Node,
}
impl Ord for Ranked {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .weight
            .total_cmp(&self.weight)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}
impl PartialOrd for Ranked {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl PartialEq for Ranked {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}
impl Eq for Ranked {}

/// Build a Huffman tree from a probability table by repeatedly merging the two lightest nodes.
///
/// The first merged node whose weight reaches APPROXIMATION is returned as the root. If the queue
/// runs dry first, the probabilities did not sum to one and a ProbabilitySum error is returned.
///
/// A one-entry table with full mass produces a root whose two children are both that symbol, so
/// the root is always an internal node and the symbol gets the one bit code `0`.
pub fn build_tree(table: &ProbabilityTable) -> Result<Node> {
    if table.len() == 1 {
        let (symbol, p) = table.iter().next().map(|(s, p)| (s.clone(), p)).unwrap_or_default();
        if p >= APPROXIMATION {
            warn!("Only one distinct symbol, coding it with a single bit.");
            return Ok(Node::internal(
                Node::leaf(symbol.clone(), p),
                Node::leaf(symbol, 0.0),
                p,
            ));
        }
        return Err(HuffError::ProbabilitySum { sum: p });
    }

    let mut heap = BinaryHeap::with_capacity(table.len());
    for (seq, (symbol, p)) in table.iter().enumerate() {
        heap.push(Ranked {
            weight: p,
            seq,
            node: Node::leaf(symbol.clone(), p),
        });
    }

    // Merged nodes queue behind any existing node of the same weight.
    let mut seq = table.len();
    while let Some(first) = heap.pop() {
        let Some(second) = heap.pop() else {
            break;
        };
        let weight = first.weight + second.weight;
        trace!(
            "Merging weights {} and {} into {}",
            first.weight,
            second.weight,
            weight
        );
        let node = Node::internal(first.node, second.node, weight);
        if weight >= APPROXIMATION {
            debug!(
                "Built Huffman tree over {} symbols ({} left unmerged).",
                table.len(),
                heap.len()
            );
            return Ok(node);
        }
        heap.push(Ranked { weight, seq, node });
        seq += 1;
    }
    Err(HuffError::ProbabilitySum { sum: table.sum() })
}
