use tracing::trace;

use crate::{KeySchedule, Sample};

/// Decide whether `key` (secret bytes only) produced the samples.
///
/// Samples are replayed in order. The key is accepted as soon as more than
/// `threshold` of them in a row reproduce their output byte, and rejected at
/// the first one that does not. A collection with too few samples to exceed
/// the threshold never accepts.
pub fn validate(samples: &[Sample], key: &[u8], key_space: usize, threshold: usize) -> bool {
    let mut full_key = Vec::with_capacity(key.len() + 8);
    let mut correct = 0;
    for sample in samples {
        full_key.clear();
        full_key.extend_from_slice(sample.iv());
        full_key.extend_from_slice(key);
        let output = KeySchedule::full(&full_key, key_space).first_output_byte();
        if output != sample.output() as usize {
            trace!(?key, correct, "key rejected");
            return false;
        }
        correct += 1;
        if correct > threshold {
            return true;
        }
    }
    false
}
