use thiserror::Error;

/// Failures raised by the collaborators around the comparator (loading,
/// decoding, configuration). Comparison itself is infallible.
#[derive(Error, Debug)]
pub enum TCompareError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("File size {size} bytes exceeds the limit of {limit} bytes")]
    FileTooLarge { size: u64, limit: u64 },

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

pub type Result<T> = std::result::Result<T, TCompareError>;
