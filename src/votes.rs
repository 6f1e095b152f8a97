use rayon::prelude::*;

use crate::conditions::candidates;
use crate::{CrackerConfig, KeySchedule, Sample};

/// Vote counts for every possible value of one key byte.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrequencyTable {
    counts: Vec<usize>,
}

impl FrequencyTable {
    pub fn new(key_space: usize) -> Self {
        Self {
            counts: vec![0; key_space],
        }
    }

    pub fn vote(&mut self, candidate: usize) {
        self.counts[candidate] += 1;
    }

    pub fn count(&self, candidate: usize) -> usize {
        self.counts[candidate]
    }

    pub fn counts(&self) -> &[usize] {
        &self.counts
    }

    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }

    /// Add the votes of `other` into this table.
    pub fn merge(mut self, other: Self) -> Self {
        for (a, b) in self.counts.iter_mut().zip(other.counts) {
            *a += b;
        }
        self
    }

    /// Every candidate, most votes first. Equal counts rank the larger value
    /// first.
    pub fn ranked(&self) -> Vec<usize> {
        let mut order: Vec<(usize, usize)> = self
            .counts
            .iter()
            .enumerate()
            .map(|(value, &count)| (count, value))
            .collect();
        // Ascending on (count, value), then read from the tail.
        order.sort_unstable_by(|a, b| a.0.cmp(&b.0).then(a.1.cmp(&b.1)));
        order.into_iter().rev().map(|(_, value)| value).collect()
    }

    /// The `n` best ranked candidates.
    pub fn top(&self, n: usize) -> Vec<usize> {
        let mut ranked = self.ranked();
        ranked.truncate(n);
        ranked
    }
}

/// Collect votes for key byte `c` from every sample.
///
/// `key` holds the key bytes already fixed (`c - iv_size` of them). Each
/// sample's IV is prepended, the schedule is run for `c` rounds and every
/// candidate below `max_key_value` gets a vote.
pub fn tally(samples: &[Sample], key: &[u8], c: usize, config: &CrackerConfig) -> FrequencyTable {
    debug_assert_eq!(key.len() + config.iv_size, c);
    samples
        .par_iter()
        .fold(
            || (FrequencyTable::new(config.key_space), Vec::with_capacity(c)),
            |(mut table, mut known), sample| {
                known.clear();
                known.extend_from_slice(sample.iv());
                known.extend_from_slice(key);
                let schedule = KeySchedule::partial(&known, c, config.key_space);
                for (_, candidate) in candidates(sample, c, &schedule) {
                    if candidate < config.max_key_value {
                        table.vote(candidate);
                    }
                }
                (table, known)
            },
        )
        .map(|(table, _)| table)
        .reduce(|| FrequencyTable::new(config.key_space), FrequencyTable::merge)
}
