// Statistical attacks on the RC4 key schedule.
//
// After the first `C` rounds of key scheduling the attacker knows the
// permutation `S` and the mixing index `j[C-1]` exactly, because they depend
// only on the public IV and the key bytes recovered so far. Round `C` then
// computes
//
//     j[C] = j[C-1] + S[C] + K[C]
//
// and swaps `S[C]` with `S[j[C]]`. If the first output byte can be tied to
// `j[C]` (or to the value swapped into position `C`) with better than random
// probability, then solving for `K[C]` gives a vote for the next key byte.
//
// The FMS condition ties the output to `S[C]` after the swap when
// `S[1] + S[S[1]] == C`: if none of positions 1, `S[1]` and `C` are touched by
// the remaining rounds (about e^-3 of the time) the output is read from
// position `C`, so `j[C] = S^-1[out]`. The Korek conditions are refinements
// that cover other configurations of the first few permutation entries.

use crate::{KeySchedule, Sample};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Condition {
    Fms,
    Korek1,
    Korek2,
    Korek3,
    Korek4,
    Korek5,
    Korek6,
    Korek7,
    Korek8,
}

impl Condition {
    pub const ALL: [Condition; 9] = [
        Condition::Fms,
        Condition::Korek1,
        Condition::Korek2,
        Condition::Korek3,
        Condition::Korek4,
        Condition::Korek5,
        Condition::Korek6,
        Condition::Korek7,
        Condition::Korek8,
    ];

    /// Evaluate the condition for key byte `c` against a schedule that has
    /// been run for exactly `c` rounds.
    ///
    /// Returns the candidate for `K[c]` in `[0, key_space)` if the guard
    /// holds, `None` otherwise.
    pub fn candidate(self, sample: &Sample, c: usize, schedule: &KeySchedule) -> Option<usize> {
        let s = schedule.state();
        let n = s.len();
        let out = sample.output() as usize;
        let one_minus_c = (n + 1 - c % n) % n;
        // K[c] = x - S[c] - j[c-1]
        let solve = |x: usize| -> usize {
            (x as isize - s[c] as isize - schedule.trace()[c - 1] as isize).rem_euclid(n as isize)
                as usize
        };

        match self {
            Condition::Fms => {
                if s[1] + s[s[1]] != c {
                    return None;
                }
                schedule.find_index(out).map(solve)
            }
            Condition::Korek1 => {
                if s[1] < c && (s[1] + s[s[1]]) % n == c && s[1] != out && s[s[s[1]]] != out {
                    schedule.find_index(out).map(solve)
                } else {
                    None
                }
            }
            Condition::Korek2 => {
                if s[1] == c && out == c {
                    schedule.find_index(0).map(solve)
                } else {
                    None
                }
            }
            Condition::Korek3 => {
                if s[1] == c && out == one_minus_c {
                    schedule.find_index(out).map(solve)
                } else {
                    None
                }
            }
            Condition::Korek4 => {
                if s[1] != c || out == one_minus_c || out == c {
                    return None;
                }
                let out_idx = schedule.find_index(out)?;
                if out_idx >= c {
                    return None;
                }
                let t = (out_idx + n - c) % n;
                if s[1] == t {
                    return None;
                }
                schedule.find_index(t).map(solve)
            }
            Condition::Korek5 => (s[2] == out && s[c] == 1).then(|| solve(1)),
            Condition::Korek6 => (s[c] == c && s[1] == 0 && out == c).then(|| solve(1)),
            Condition::Korek7 => {
                (s[c] == c && s[1] == out && s[1] == one_minus_c).then(|| solve(1))
            }
            Condition::Korek8 => {
                if s[c] != c || s[1] < n - c {
                    return None;
                }
                let t = (schedule.find_index(out)? + n - c) % n;
                (s[1] == t && s[1] != out).then(|| solve(1))
            }
        }
    }
}

/// Every candidate emitted for `sample` at key byte `c`, in `Condition::ALL`
/// order.
pub fn candidates(sample: &Sample, c: usize, schedule: &KeySchedule) -> Vec<(Condition, usize)> {
    Condition::ALL
        .iter()
        .filter_map(|&cond| cond.candidate(sample, c, schedule).map(|k| (cond, k)))
        .collect()
}
