//! Index self-reporting.

use serde::{Deserialize, Serialize};

/// A snapshot of index size plus the false-negative probabilities implied by
/// the configured hyperplane and table counts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Statistics {
    pub num_docs: usize,
    pub false_negative_errors: Vec<FalseNegativeError>,
}

/// Probability that a true match at `threshold` similarity is missed by every
/// table's bucket filter. Near zero means the configuration rarely drops
/// matches at that threshold; near one means most are never scored.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FalseNegativeError {
    pub threshold: f64,
    pub probability: f64,
}
