use rustc_hash::FxHashMap;

use crate::bitstream::bitbuffer::BitBuffer;

/// Mapping of fixed width symbol to probability.
///
/// Entries keep their insertion order. The tree builder visits them in that order, so two tables
/// built the same way always produce the same tree (the a-priori decoder depends on this).
#[derive(Clone, Debug, Default)]
pub struct ProbabilityTable {
    entries: Vec<(BitBuffer, f64)>,
    index: FxHashMap<BitBuffer, usize>,
}

impl ProbabilityTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            index: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
        }
    }

    /// Set the probability of `symbol`. A symbol already present keeps its position and takes the
    /// new value.
    pub fn insert(&mut self, symbol: BitBuffer, probability: f64) {
        match self.index.get(&symbol) {
            Some(&i) => self.entries[i].1 = probability,
            None => {
                self.index.insert(symbol.clone(), self.entries.len());
                self.entries.push((symbol, probability));
            }
        }
    }

    pub fn get(&self, symbol: &BitBuffer) -> Option<f64> {
        self.index.get(symbol).map(|&i| self.entries[i].1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&BitBuffer, f64)> {
        self.entries.iter().map(|(s, p)| (s, *p))
    }

    /// Total probability mass.
    pub fn sum(&self) -> f64 {
        self.entries.iter().map(|(_, p)| p).sum()
    }
}
