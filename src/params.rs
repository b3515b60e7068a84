//! Index construction parameters.
//!
//! The two knobs that matter are `num_hyperplanes` and `num_tables`: more
//! hyperplanes sharpen each bucket (fewer direct comparisons, more false
//! negatives), more tables recover recall at the cost of memory and extra
//! comparisons. [`Statistics`](crate::stats::Statistics) reports the
//! resulting false-negative probabilities for a range of thresholds.

use crate::error::{LshError, Result};
use crate::similarity;

/// Bucket codes are stored as `u16`, so a table can use at most 16 planes.
pub const MAX_NUM_HYPERPLANES: usize = 16;

/// Pure transform applied to every vector on index and on search.
pub type TransformFn = fn(&mut [f64]);

/// Parameters for building an [`LSHIndex`](crate::lsh::LSHIndex).
#[derive(Debug, Clone)]
pub struct LSHParams {
    /// Hyperplanes per table, at most [`MAX_NUM_HYPERPLANES`].
    pub num_hyperplanes: usize,
    /// Number of independently hashed tables.
    pub num_tables: usize,
    /// Expected length of every indexed and queried vector.
    pub vector_length: usize,
    /// Time between consecutive samples within a vector.
    pub sample_period: i64,
    /// Width of each time-row shard. Larger rows hold more uids per bucket.
    pub row_size: i64,
    /// Vector transform applied on index and search, defaults to L2
    /// normalization.
    pub transform: TransformFn,
}

impl Default for LSHParams {
    fn default() -> Self {
        Self {
            num_hyperplanes: 8,
            num_tables: 128,
            vector_length: 3,
            sample_period: 60,
            // with second-resolution time indexes this is a 2h shard
            row_size: 7200,
            transform: similarity::l2_normalize,
        }
    }
}

impl LSHParams {
    /// Validate the parameter set, returning the first violation found.
    pub fn validate(&self) -> Result<()> {
        if self.num_hyperplanes < 1 {
            return Err(LshError::InvalidNumHyperplanes);
        }
        if self.num_hyperplanes > MAX_NUM_HYPERPLANES {
            return Err(LshError::ExceededMaxNumHyperplanes);
        }
        if self.num_tables < 1 {
            return Err(LshError::InvalidNumTables);
        }
        if self.vector_length < 1 {
            return Err(LshError::InvalidVectorLength);
        }
        if self.sample_period < 1 {
            return Err(LshError::InvalidSamplePeriod);
        }
        if self.row_size < 1 {
            return Err(LshError::InvalidRowSize);
        }
        Ok(())
    }
}
