use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ShuffleError {
    #[error("shuffle count must be nonzero")]
    ZeroCount,

    #[error("index {index} out of bounds for count {count}")]
    IndexOutOfBounds { index: u64, count: u64 },
}
