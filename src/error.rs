#[derive(thiserror::Error)]
pub enum Error {
    // std errors
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    // crate errors
    #[error("sample record is {got} bytes, expected {expected}")]
    SampleLength { expected: usize, got: usize },

    #[error("sample IV is {got} bytes but the cracker expects {expected}")]
    IvLength { expected: usize, got: usize },

    #[error("capture declares {declared} samples but only {read} could be read")]
    SampleCount { declared: usize, read: usize },

    #[error("capture declares an invalid key length of {0}")]
    KeyLength(i32),

    #[error("capture declares an invalid sample count of {0}")]
    Count(i32),

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl std::fmt::Debug for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(self, f)
    }
}
