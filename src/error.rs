//! Error types for simbank.

use thiserror::Error;

use crate::params::MAX_NUM_HYPERPLANES;

/// Errors that can occur during construction, indexing, searching or deletion.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LshError {
    /// Fewer than one hyperplane requested.
    #[error("invalid number of hyperplanes, must be at least 1")]
    InvalidNumHyperplanes,

    /// More hyperplanes requested than a bucket code can encode.
    #[error("number of hyperplanes exceeded max of, {MAX_NUM_HYPERPLANES}")]
    ExceededMaxNumHyperplanes,

    /// Fewer than one table requested.
    #[error("invalid number of tables, must be at least 1")]
    InvalidNumTables,

    /// Vector length must be at least 1.
    #[error("invalid vector length, must be at least 1")]
    InvalidVectorLength,

    /// Sample period must be at least 1.
    #[error("invalid sample period, must be at least 1")]
    InvalidSamplePeriod,

    /// Row size must be at least 1.
    #[error("invalid row size, must be at least 1")]
    InvalidRowSize,

    /// Document vector length does not match the configured vector length.
    #[error("vector length does not match with the configured options")]
    InvalidDocument,

    /// Document vector has zero standard deviation, so correlation against it
    /// is undefined.
    #[error("vector does not have enough complexity with a standard deviation of 0")]
    NoVectorComplexity,

    /// Search must return at least one result.
    #[error("invalid num_to_return, must be at least 1")]
    InvalidNumToReturn,

    /// Threshold must lie in [0, 1].
    #[error("invalid threshold, must be between 0 and 1 inclusive")]
    InvalidThreshold,

    /// Deletion of a uid that is not indexed.
    #[error("document id is not stored")]
    DocumentNotStored,

    /// The reverse index references a bucket that no longer exists. Indicates
    /// index corruption rather than caller error.
    #[error("hash not found in table")]
    HashNotFound,

    /// An empty vector was handed to the hasher.
    #[error("no vector provided")]
    NoVector,

    /// A vector of the wrong length was handed to the hasher.
    #[error("vector length mismatch, has length {got} when expecting length, {want}")]
    VectorLengthMismatch { got: usize, want: usize },

    /// The plane count exceeds the bit width of the requested bucket code.
    #[error("number of hyperplanes exceeds available bits to encode vector")]
    NumHyperplanesExceedHashBits,

    /// The operation observed a cancelled [`CancelToken`](crate::CancelToken).
    #[error("operation cancelled")]
    Cancelled,
}

/// Result type alias for simbank operations.
pub type Result<T> = std::result::Result<T, LshError>;
