mod capture;
mod conditions;
mod config;
mod error;
mod rc4;
mod sample;
mod search;
pub mod synth;
mod validate;
mod votes;

pub use capture::{read_capture, write_capture, Capture};
pub use conditions::{candidates, Condition};
pub use config::{
    CrackerConfig, BRUTE_FORCE_LEN, IV_SIZE, KEY_BOUND, KEY_SPACE, MAX_KEY_VALUE, THRESHOLD,
};
pub use error::Error;
pub use rc4::KeySchedule;
pub use sample::{Sample, SampleSet};
pub use search::{crack, enumerate_tail, KeyBuffer, KeySearch};
pub use validate::validate;
pub use votes::{tally, FrequencyTable};
