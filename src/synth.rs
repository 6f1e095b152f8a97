// Generate captures for a known key: the samples a device keyed with `key`
// would emit for chosen or random IVs.
use rand::Rng;

use crate::{CrackerConfig, Error, KeySchedule, Sample, SampleSet};

/// The sample produced by `iv` under the secret `key`.
pub fn observe(iv: &[u8], key: &[u8], config: &CrackerConfig) -> Sample {
    let full_key = [iv, key].concat();
    let output = KeySchedule::full(&full_key, config.key_space).first_output_byte();
    Sample::new(iv, output as u8)
}

/// IVs of the form `(c, N - 1, x, 0, ...)` for every byte `x`.
///
/// The first two rounds of key scheduling swap `c` into position 0 and then 0
/// into position 1, so `S[1] + S[S[1]] == c` after round `c` unless one of the
/// intervening rounds disturbs positions 0 or 1.
pub fn weak_ivs(c: usize, config: &CrackerConfig) -> Result<Vec<Vec<u8>>, Error> {
    if config.iv_size < 3 {
        return Err(Error::Config(format!(
            "weak IVs need at least 3 IV bytes, got {}",
            config.iv_size
        )));
    }
    if c >= config.key_space || config.key_space > 256 {
        return Err(Error::Config(format!(
            "key byte {c} is outside a key space of {}",
            config.key_space
        )));
    }
    Ok((0..=255u8)
        .map(|x| {
            let mut iv = vec![0; config.iv_size];
            iv[0] = c as u8;
            iv[1] = (config.key_space - 1) as u8;
            iv[2] = x;
            iv
        })
        .collect())
}

/// Samples for the weak IVs of every secret key byte of `key`.
pub fn weak_samples(key: &[u8], config: &CrackerConfig) -> Result<SampleSet, Error> {
    let mut samples = SampleSet::new();
    for c in config.iv_size..config.iv_size + key.len() {
        for iv in weak_ivs(c, config)? {
            samples.insert(observe(&iv, key, config));
        }
    }
    Ok(samples)
}

/// Samples for `count` uniformly random IVs, as ordinary traffic would give.
pub fn random_samples<R: Rng>(
    key: &[u8],
    count: usize,
    config: &CrackerConfig,
    rng: &mut R,
) -> SampleSet {
    let mut iv = vec![0u8; config.iv_size];
    (0..count)
        .map(|_| {
            rng.fill(iv.as_mut_slice());
            observe(&iv, key, config)
        })
        .collect()
}
