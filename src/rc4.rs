/// RC4 key scheduling over a configurable state size, keeping the mixing
/// index `j` of every round.
///
/// The attack needs the permutation part-way through scheduling (after the
/// IV and already-recovered key bytes have been mixed in) as well as the
/// fully scheduled permutation used to check candidate keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeySchedule {
    state: Vec<usize>,
    trace: Vec<usize>,
}

impl KeySchedule {
    /// Run the first `rounds` rounds of key scheduling with `known` as the
    /// key, indexed cyclically.
    ///
    /// `known` is the IV followed by the key bytes fixed so far and `rounds`
    /// is normally its length.
    pub fn partial(known: &[u8], rounds: usize, key_space: usize) -> Self {
        debug_assert!(rounds <= key_space);
        debug_assert!(rounds == 0 || !known.is_empty());
        let mut schedule = Self::identity(key_space, rounds);
        schedule.mix(known, rounds);
        schedule
    }

    /// Run all `key_space` rounds of key scheduling with `key` (IV included).
    pub fn full(key: &[u8], key_space: usize) -> Self {
        debug_assert!(!key.is_empty());
        let mut schedule = Self::identity(key_space, key_space);
        schedule.mix(key, key_space);
        schedule
    }

    fn identity(key_space: usize, rounds: usize) -> Self {
        Self {
            state: (0..key_space).collect(),
            trace: Vec::with_capacity(rounds),
        }
    }

    fn mix(&mut self, key: &[u8], rounds: usize) {
        let n = self.state.len();
        let mut j = 0;
        for i in 0..rounds {
            j = (j + self.state[i] + key[i % key.len()] as usize) % n;
            self.trace.push(j);
            self.state.swap(i, j);
        }
    }

    /// The permutation `S`.
    pub fn state(&self) -> &[usize] {
        &self.state
    }

    /// `j` after each completed round; `trace()[i]` is the value used to swap
    /// `S[i]`.
    pub fn trace(&self) -> &[usize] {
        &self.trace
    }

    pub fn key_space(&self) -> usize {
        self.state.len()
    }

    /// First keystream byte: `S[S[1] + S[S[1]]]` with `i = 1, j = S[1]`.
    ///
    /// The generator's `S[i] <-> S[j]` swap is not applied before reading the
    /// output. The attack conditions are derived against this exact output
    /// function, so samples and key checks must both go through it.
    pub fn first_output_byte(&self) -> usize {
        let n = self.state.len();
        let j = self.state[1] % n;
        self.state[(self.state[1] + self.state[j]) % n]
    }

    /// Position of `value` in the permutation (`S^-1[value]`).
    pub fn find_index(&self, value: usize) -> Option<usize> {
        self.state.iter().position(|&v| v == value)
    }
}
