use crate::Error;

/// Size of the cipher's internal permutation (the `N` of RC4).
pub const KEY_SPACE: usize = 160;
/// Number of public IV bytes prepended to every key.
pub const IV_SIZE: usize = 3;
/// Exclusive upper bound of every secret key byte.
pub const MAX_KEY_VALUE: usize = 90;
/// Number of top-ranked candidates explored at each byte position.
pub const KEY_BOUND: usize = 2;
/// Number of trailing key bytes recovered by exhaustive enumeration.
pub const BRUTE_FORCE_LEN: usize = 3;
/// Consecutive matching samples a key needs to exceed to be accepted.
pub const THRESHOLD: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrackerConfig {
    pub key_space: usize,
    pub iv_size: usize,
    pub max_key_value: usize,
    pub key_bound: usize,
    pub brute_force_len: usize,
    pub threshold: usize,
}

impl Default for CrackerConfig {
    fn default() -> Self {
        Self {
            key_space: KEY_SPACE,
            iv_size: IV_SIZE,
            max_key_value: MAX_KEY_VALUE,
            key_bound: KEY_BOUND,
            brute_force_len: BRUTE_FORCE_LEN,
            threshold: THRESHOLD,
        }
    }
}

impl CrackerConfig {
    pub fn with_key_space(mut self, key_space: usize) -> Self {
        self.key_space = key_space;
        self
    }

    pub fn with_iv_size(mut self, iv_size: usize) -> Self {
        self.iv_size = iv_size;
        self
    }

    pub fn with_max_key_value(mut self, max_key_value: usize) -> Self {
        self.max_key_value = max_key_value;
        self
    }

    pub fn with_key_bound(mut self, key_bound: usize) -> Self {
        self.key_bound = key_bound;
        self
    }

    pub fn with_brute_force_len(mut self, brute_force_len: usize) -> Self {
        self.brute_force_len = brute_force_len;
        self
    }

    pub fn with_threshold(mut self, threshold: usize) -> Self {
        self.threshold = threshold;
        self
    }

    /// Check that a key of `total_key_length` bytes (IV included) can be
    /// searched for with this configuration.
    pub fn check(&self, total_key_length: usize) -> Result<(), Error> {
        if !(3..=256).contains(&self.key_space) {
            return Err(Error::Config(format!(
                "key space {} must lie in [3, 256]",
                self.key_space
            )));
        }
        if self.iv_size == 0 {
            return Err(Error::Config("IV size must be at least 1".to_string()));
        }
        if total_key_length < self.iv_size || total_key_length > self.key_space {
            return Err(Error::Config(format!(
                "total key length {total_key_length} must lie in [{}, {}]",
                self.iv_size, self.key_space
            )));
        }
        if self.max_key_value == 0 || self.max_key_value > self.key_space {
            return Err(Error::Config(format!(
                "max key value {} must lie in [1, {}]",
                self.max_key_value, self.key_space
            )));
        }
        if self.key_bound == 0 {
            return Err(Error::Config("key bound must be at least 1".to_string()));
        }
        Ok(())
    }

    /// Number of trailing key bytes left to exhaustive enumeration for a key
    /// of `total_key_length` bytes.
    pub fn tail_len(&self, total_key_length: usize) -> usize {
        self.brute_force_len
            .min(total_key_length.saturating_sub(self.iv_size))
    }
}
