use tracing::{debug, info};

use crate::votes::tally;
use crate::{validate, CrackerConfig, Error, Sample, SampleSet};

/// The secret key bytes recovered so far. Unset bytes are `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyBuffer {
    bytes: Vec<Option<u8>>,
}

impl KeyBuffer {
    pub fn new(len: usize) -> Self {
        Self {
            bytes: vec![None; len],
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn get(&self, pos: usize) -> Option<u8> {
        self.bytes[pos]
    }

    pub fn set(&mut self, pos: usize, value: u8) {
        self.bytes[pos] = Some(value);
    }

    pub fn clear(&mut self, pos: usize) {
        self.bytes[pos] = None;
    }

    /// The first `len` bytes, all of which must be set.
    pub fn prefix(&self, len: usize) -> Vec<u8> {
        self.bytes[..len].iter().map_while(|b| *b).collect()
    }

    /// The complete key, if every byte is set.
    pub fn to_key(&self) -> Option<Vec<u8>> {
        self.bytes.iter().copied().collect()
    }
}

/// Recursive key recovery over a fixed collection of samples.
///
/// Key bytes are recovered in order. For each byte every sample votes through
/// the attack conditions; the `key_bound` best candidates are tried in turn,
/// recursing into the next byte, until a full key passes validation. The last
/// `brute_force_len` bytes are enumerated exhaustively instead of voted on.
pub struct KeySearch<'a> {
    samples: &'a [Sample],
    config: CrackerConfig,
    total_key_length: usize,
    key: KeyBuffer,
}

impl<'a> KeySearch<'a> {
    /// Fails if the configuration cannot search for a key of
    /// `total_key_length` bytes or a sample's IV has the wrong length.
    pub fn new(
        samples: &'a [Sample],
        total_key_length: usize,
        config: CrackerConfig,
    ) -> Result<Self, Error> {
        config.check(total_key_length)?;
        if let Some(bad) = samples.iter().find(|s| s.iv().len() != config.iv_size) {
            return Err(Error::IvLength {
                expected: config.iv_size,
                got: bad.iv().len(),
            });
        }
        Ok(Self {
            samples,
            config,
            total_key_length,
            key: KeyBuffer::new(total_key_length - config.iv_size),
        })
    }

    pub fn key(&self) -> &KeyBuffer {
        &self.key
    }

    /// Search from the first secret key byte; the IV is always known.
    pub fn guess_key(&mut self) -> bool {
        self.guess_byte(self.config.iv_size)
    }

    /// Recover key byte `c` (counted from the start of the IV) and every
    /// byte after it.
    fn guess_byte(&mut self, c: usize) -> bool {
        let brute_force_from =
            self.total_key_length - self.config.tail_len(self.total_key_length);
        if c == brute_force_from {
            return self.brute_force_tail(c);
        }

        let pos = c - self.config.iv_size;
        let known = self.key.prefix(pos);
        let table = tally(self.samples, &known, c, &self.config);
        let top = table.top(self.config.key_bound);
        let votes: Vec<(usize, usize)> = top.iter().map(|&k| (k, table.count(k))).collect();
        debug!(byte = c, candidates = ?votes, "ranked key byte");

        for candidate in top {
            self.key.set(pos, candidate as u8);
            if self.guess_byte(c + 1) {
                return true;
            }
        }
        self.key.clear(pos);
        false
    }

    fn brute_force_tail(&mut self, c: usize) -> bool {
        let prefix = self.key.prefix(c - self.config.iv_size);
        let tail = self.total_key_length - c;
        let samples = self.samples;
        let config = self.config;
        let found = enumerate_tail(&prefix, tail, config.max_key_value, |candidate| {
            validate(samples, candidate, config.key_space, config.threshold)
        });
        match found {
            Some(key) => {
                for (pos, &b) in key.iter().enumerate().skip(prefix.len()) {
                    self.key.set(pos, b);
                }
                true
            }
            None => false,
        }
    }
}

/// Try every assignment of `tail` bytes in `[0, max_value)` after `prefix`,
/// first tail byte slowest, and return the first full key `accept` takes.
pub fn enumerate_tail<F>(
    prefix: &[u8],
    tail: usize,
    max_value: usize,
    mut accept: F,
) -> Option<Vec<u8>>
where
    F: FnMut(&[u8]) -> bool,
{
    let mut candidate = prefix.to_vec();
    candidate.resize(prefix.len() + tail, 0);
    loop {
        if accept(&candidate) {
            return Some(candidate);
        }
        // Advance like an odometer, last byte fastest.
        let mut pos = candidate.len();
        loop {
            if pos == prefix.len() {
                return None;
            }
            pos -= 1;
            let next = candidate[pos] as usize + 1;
            if next < max_value {
                candidate[pos] = next as u8;
                break;
            }
            candidate[pos] = 0;
        }
    }
}

/// Recover the secret part of a key of `total_key_length` bytes (IV
/// included) from `samples`.
///
/// Returns `Ok(None)` when the search is exhausted without a key passing
/// validation. Errors are reserved for inconsistent input.
pub fn crack(
    samples: &SampleSet,
    total_key_length: usize,
    config: &CrackerConfig,
) -> Result<Option<Vec<u8>>, Error> {
    let mut search = KeySearch::new(samples.as_slice(), total_key_length, *config)?;
    if search.guess_key() {
        let key = search.key().to_key();
        info!(?key, "key found");
        Ok(key)
    } else {
        info!(samples = samples.len(), "search exhausted without a valid key");
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::synth::{observe, random_samples, weak_samples};
    use crate::KeySchedule;
    use rand::{rngs::StdRng, SeedableRng};

    const KEY: [u8; 5] = [17, 42, 5, 88, 63];

    #[test]
    fn key_buffer_starts_unset() {
        let mut key = KeyBuffer::new(3);

        assert_eq!(key.to_key(), None);
        key.set(0, 4);
        key.set(1, 8);
        assert_eq!(key.prefix(2), vec![4, 8]);
        key.set(2, 15);
        assert_eq!(key.to_key(), Some(vec![4, 8, 15]));
        key.clear(1);
        assert_eq!(key.get(1), None);
        assert_eq!(key.to_key(), None);
    }

    #[test]
    fn enumerate_tail_visits_every_combination() {
        let mut calls = 0;

        let found = enumerate_tail(&[1, 2], 3, 90, |_| {
            calls += 1;
            false
        });

        assert_eq!(found, None);
        assert_eq!(calls, 90 * 90 * 90);
    }

    #[test]
    fn enumerate_tail_returns_first_accepted_in_order() {
        let mut seen = Vec::new();

        let found = enumerate_tail(&[7], 2, 3, |candidate| {
            seen.push(candidate.to_vec());
            candidate[1] + candidate[2] == 3
        });

        assert_eq!(found, Some(vec![7, 1, 2]));
        assert_eq!(
            seen,
            vec![
                vec![7, 0, 0],
                vec![7, 0, 1],
                vec![7, 0, 2],
                vec![7, 1, 0],
                vec![7, 1, 1],
                vec![7, 1, 2],
            ]
        );
    }

    #[test]
    fn enumerate_tail_without_tail_checks_the_prefix_once() {
        let mut calls = 0;

        let found = enumerate_tail(&[1, 2, 3], 0, 90, |_| {
            calls += 1;
            true
        });

        assert_eq!(found, Some(vec![1, 2, 3]));
        assert_eq!(calls, 1);
    }

    #[test]
    fn enumerate_tail_handles_full_byte_range() {
        let found = enumerate_tail(&[], 1, 256, |candidate| candidate[0] == 255);

        assert_eq!(found, Some(vec![255]));
    }

    #[test]
    fn crack_recovers_key_from_weak_iv_samples() {
        let config = CrackerConfig::default().with_brute_force_len(2);
        let samples = weak_samples(&KEY, &config).unwrap();

        let key = crack(&samples, 8, &config).unwrap();

        assert_eq!(key, Some(KEY.to_vec()));
    }

    #[test]
    fn crack_recovers_second_key_from_weak_iv_samples() {
        let key = [0, 89, 45, 12, 7];
        let config = CrackerConfig::default().with_brute_force_len(2);
        let samples = weak_samples(&key, &config).unwrap();

        assert_eq!(crack(&samples, 8, &config).unwrap(), Some(key.to_vec()));
    }

    #[test]
    fn crack_recovers_key_with_default_configuration() {
        let config = CrackerConfig::default();
        let samples = weak_samples(&KEY, &config).unwrap();

        assert_eq!(crack(&samples, 8, &config).unwrap(), Some(KEY.to_vec()));
    }

    #[test]
    fn short_keys_are_brute_forced_entirely() {
        let key = [2, 0, 1];
        let config = CrackerConfig::default();
        let samples = random_samples(&key, 30, &config, &mut StdRng::seed_from_u64(7));

        assert_eq!(crack(&samples, 6, &config).unwrap(), Some(key.to_vec()));
    }

    #[test]
    fn too_few_samples_is_reported_as_not_found() {
        let config = CrackerConfig::default().with_brute_force_len(1);
        let samples: SampleSet = (0..10u8)
            .map(|x| observe(&[x, 1, 2], &[5, 6], &config))
            .collect();

        assert_eq!(crack(&samples, 5, &config).unwrap(), None);
    }

    #[test]
    fn mismatched_iv_length_is_an_error() {
        let config = CrackerConfig::default();
        let samples: SampleSet = [Sample::new(&[1, 2], 0)].into_iter().collect();

        assert!(matches!(
            crack(&samples, 8, &config),
            Err(Error::IvLength { expected: 3, got: 2 })
        ));
    }

    #[test]
    fn invalid_key_length_is_an_error() {
        let config = CrackerConfig::default();

        assert!(matches!(
            crack(&SampleSet::new(), 2, &config),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn search_rejects_key_shorter_than_iv() {
        let result = KeySearch::new(&[], 2, CrackerConfig::default());

        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn search_rejects_key_longer_than_key_space() {
        let config = CrackerConfig::default();
        let samples = [Sample::new(&[1, 2, 3], 0)];

        assert!(matches!(
            KeySearch::new(&samples, 161, config),
            Err(Error::Config(_))
        ));
    }

    // FMS-weak IVs for byte 3, outside the (C, N - 1, x) family, whose output
    // byte resolves to `value` under the FMS formula.
    fn fms_votes_for(value: usize, count: usize) -> Vec<Sample> {
        let mut samples = Vec::with_capacity(count);
        for a in 0..=255u8 {
            for b in 0..=255u8 {
                if b == 159 && (3..8).contains(&a) {
                    continue;
                }
                for x in 0..=255u8 {
                    let schedule = KeySchedule::partial(&[a, b, x], 3, 160);
                    let s = schedule.state();
                    if s[1] + s[s[1]] != 3 {
                        continue;
                    }
                    let idx = (value + s[3] + schedule.trace()[2]) % 160;
                    samples.push(Sample::new(&[a, b, x], s[idx] as u8));
                    if samples.len() == count {
                        return samples;
                    }
                }
            }
        }
        samples
    }

    #[test]
    fn crack_backtracks_from_a_wrong_top_candidate() {
        let config = CrackerConfig::default().with_brute_force_len(2);
        let mut samples = weak_samples(&KEY, &config).unwrap();
        for sample in fms_votes_for(60, 400) {
            assert!(samples.insert(sample));
        }

        let table = tally(samples.as_slice(), &[], 3, &config);
        assert_eq!(table.top(2), vec![60, 17]);
        // Following only the best candidate runs into 60 and fails.
        assert_eq!(crack(&samples, 8, &config.with_key_bound(1)).unwrap(), None);
        assert_eq!(crack(&samples, 8, &config).unwrap(), Some(KEY.to_vec()));
    }

    #[test]
    fn failed_search_leaves_key_unset() {
        let config = CrackerConfig::default().with_brute_force_len(1);
        let samples: Vec<Sample> = (0..10u8)
            .map(|x| observe(&[x, 1, 2], &[5, 6], &config))
            .collect();
        let mut search = KeySearch::new(&samples, 5, config).unwrap();

        assert!(!search.guess_key());
        assert_eq!(search.key(), &KeyBuffer::new(2));
    }
}
