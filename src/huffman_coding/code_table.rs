//! Walk a finished Huffman tree once and record the bit code of every leaf.
//!
//! Only the encoder uses this table. The decoder walks the tree bit by bit instead.

use log::trace;
use rustc_hash::FxHashMap;

use super::huffman::{Node, NodeData};
use crate::bitstream::bitbuffer::{BitBuffer, BitRead};

/// Symbol to Huffman code mapping.
#[derive(Debug, Default)]
pub struct CodeTable {
    codes: FxHashMap<BitBuffer, BitBuffer>,
}

impl CodeTable {
    /// Build the table with a depth first walk. Left edges add a 0 bit, right edges a 1 bit.
    /// If the same symbol sits in two leaves, the first one visited keeps its code.
    pub fn from_tree(root: &Node) -> CodeTable {
        let mut codes = FxHashMap::default();
        let mut stack: Vec<(&Node, BitBuffer)> = vec![(root, BitBuffer::new())];

        while let Some((node, code)) = stack.pop() {
            match &node.node_data {
                NodeData::Internal(left, right) => {
                    let mut right_code = code.clone();
                    right_code.append_bit(true);
                    let mut left_code = code;
                    left_code.append_bit(false);
                    // Push right first so the left subtree is visited first.
                    stack.push((right.as_ref(), right_code));
                    stack.push((left.as_ref(), left_code));
                }
                NodeData::Leaf(symbol) => {
                    trace!("Code for {} is {}", symbol, code);
                    codes.entry(symbol.clone()).or_insert(code);
                }
            }
        }
        CodeTable { codes }
    }

    pub fn get(&self, symbol: &BitBuffer) -> Option<&BitBuffer> {
        self.codes.get(symbol)
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    /// Expected code length in bits per symbol, weighted by the given probabilities.
    pub fn average_length<'a>(&self, probabilities: impl Iterator<Item = (&'a BitBuffer, f64)>) -> f64 {
        probabilities
            .filter_map(|(s, p)| self.codes.get(s).map(|c| c.len() as f64 * p))
            .sum()
    }
}

#[cfg(test)]
mod test {
    use super::CodeTable;
    use crate::bitstream::bitbuffer::BitBuffer;
    use crate::huffman_coding::huffman::build_tree;
    use crate::huffman_coding::probability::ProbabilityTable;

    fn sym(s: &str) -> BitBuffer {
        BitBuffer::from_bytes(s.as_bytes())
    }

    fn code(s: &str) -> BitBuffer {
        BitBuffer::from_bit_str(s).unwrap()
    }

    #[test]
    fn dyadic_codes_test() {
        let mut pt = ProbabilityTable::new();
        pt.insert(sym("a"), 0.5);
        pt.insert(sym("b"), 0.25);
        pt.insert(sym("c"), 0.125);
        pt.insert(sym("d"), 0.125);
        let table = CodeTable::from_tree(&build_tree(&pt).unwrap());
        assert_eq!(table.len(), 4);
        assert_eq!(table.get(&sym("a")), Some(&code("0")));
        assert_eq!(table.get(&sym("b")), Some(&code("10")));
        assert_eq!(table.get(&sym("c")), Some(&code("110")));
        assert_eq!(table.get(&sym("d")), Some(&code("111")));
        assert!((table.average_length(pt.iter()) - 1.75).abs() < 1e-12);
    }

    #[test]
    fn prefix_free_test() {
        let mut pt = ProbabilityTable::new();
        let weights = [5.0, 9.0, 12.0, 13.0, 16.0, 45.0];
        let total: f64 = weights.iter().sum();
        for (i, w) in weights.iter().enumerate() {
            pt.insert(BitBuffer::from_value(i as u32, 3), w / total);
        }
        let table = CodeTable::from_tree(&build_tree(&pt).unwrap());
        let codes: Vec<String> = (0..6)
            .map(|i| table.get(&BitBuffer::from_value(i, 3)).unwrap().to_string())
            .collect();
        for (i, a) in codes.iter().enumerate() {
            for (j, b) in codes.iter().enumerate() {
                if i != j {
                    assert!(!b.starts_with(a.as_str()), "{} is a prefix of {}", a, b);
                }
            }
        }
    }

    #[test]
    fn single_symbol_gets_zero_test() {
        let mut pt = ProbabilityTable::new();
        pt.insert(sym("q"), 1.0);
        let table = CodeTable::from_tree(&build_tree(&pt).unwrap());
        assert_eq!(table.len(), 1);
        assert_eq!(table.get(&sym("q")), Some(&code("0")));
    }
}
