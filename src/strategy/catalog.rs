use crate::error::{Error, Result};

use super::Strategy;

/// Selection bookkeeping of a catalog: weights and per-entry selection counts.
///
/// Entries are selected in strict insertion order, cycling back to the first
/// entry after the last one. The recorded weights are reported back through
/// [`weights`](Self::weights) and [`total_weight`](Self::total_weight) but do
/// not bias selection.
#[derive(Debug, Clone, Default)]
pub struct RoundRobin {
    weights: Vec<f64>,
    total_weight: f64,
    occurrences: Vec<u64>,
    total_occurrences: u64,
}

impl RoundRobin {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new entry with the given weight and returns its index.
    pub fn register(&mut self, weight: f64) -> usize {
        self.weights.push(weight);
        self.occurrences.push(0);
        self.total_weight += weight;
        self.weights.len() - 1
    }

    /// Number of registered entries.
    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// Sum of every registered weight.
    pub fn total_weight(&self) -> f64 {
        self.total_weight
    }

    /// How many times each entry has been selected, in insertion order.
    pub fn occurrence(&self) -> &[u64] {
        &self.occurrences
    }

    /// Selections made since the last reset. Determines the next entry.
    pub fn total_occurrences(&self) -> u64 {
        self.total_occurrences
    }
}

impl Strategy for RoundRobin {
    type Handle = usize;

    fn next_token(&mut self) -> Result<usize> {
        if self.is_empty() {
            return Err(Error::EmptyCatalog);
        }
        let index = (self.total_occurrences % self.len() as u64) as usize;
        self.occurrences[index] += 1;
        self.total_occurrences += 1;
        Ok(index)
    }

    /// Restarts the cycle at the first entry. Per-entry counts are kept.
    fn reset(&mut self) {
        self.total_occurrences = 0;
    }
}
