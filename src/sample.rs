use std::collections::HashMap;
use std::hash::{Hash, Hasher};

use crate::Error;

/// One observed (IV, first keystream byte) pair.
///
/// Samples are identified by their IV: two samples with the same IV compare
/// equal whatever their output byte.
#[derive(Debug, Clone)]
pub struct Sample {
    iv: Vec<u8>,
    output: u8,
}

impl Sample {
    pub fn new(iv: &[u8], output: u8) -> Self {
        Self {
            iv: iv.to_vec(),
            output,
        }
    }

    /// Parse a raw capture record: `iv_size` IV bytes followed by the output
    /// byte.
    pub fn from_record(record: &[u8], iv_size: usize) -> Result<Self, Error> {
        if record.len() != iv_size + 1 {
            return Err(Error::SampleLength {
                expected: iv_size + 1,
                got: record.len(),
            });
        }
        Ok(Self::new(&record[..iv_size], record[iv_size]))
    }

    pub fn iv(&self) -> &[u8] {
        &self.iv
    }

    pub fn output(&self) -> u8 {
        self.output
    }
}

impl PartialEq for Sample {
    fn eq(&self, other: &Self) -> bool {
        self.iv == other.iv
    }
}

impl Eq for Sample {}

impl Hash for Sample {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.iv.hash(state);
    }
}

/// Samples keyed by IV, iterated in first-insertion order.
///
/// Re-inserting an IV keeps its original position but replaces the output
/// byte, so the collection never holds two samples with the same IV.
#[derive(Debug, Clone, Default)]
pub struct SampleSet {
    samples: Vec<Sample>,
    positions: HashMap<Vec<u8>, usize>,
}

impl SampleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a sample, returning `true` if its IV was not already present.
    pub fn insert(&mut self, sample: Sample) -> bool {
        match self.positions.get(sample.iv()) {
            Some(&pos) => {
                self.samples[pos] = sample;
                false
            }
            None => {
                self.positions.insert(sample.iv.clone(), self.samples.len());
                self.samples.push(sample);
                true
            }
        }
    }

    pub fn get(&self, iv: &[u8]) -> Option<&Sample> {
        self.positions.get(iv).map(|&pos| &self.samples[pos])
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Sample> {
        self.samples.iter()
    }

    pub fn as_slice(&self) -> &[Sample] {
        &self.samples
    }
}

impl FromIterator<Sample> for SampleSet {
    fn from_iter<T: IntoIterator<Item = Sample>>(iter: T) -> Self {
        let mut set = SampleSet::new();
        for sample in iter {
            set.insert(sample);
        }
        set
    }
}

impl<'a> IntoIterator for &'a SampleSet {
    type Item = &'a Sample;
    type IntoIter = std::slice::Iter<'a, Sample>;

    fn into_iter(self) -> Self::IntoIter {
        self.samples.iter()
    }
}
