//! Documents: the unit of indexing.

use serde::{Deserialize, Serialize};

/// A timestamped vector with a caller-assigned identifier.
///
/// `index` is the time of the first sample in `vector`; consecutive samples
/// are `sample_period` apart. The engine stores an owned copy, so re-indexing
/// the same uid at a later `index` extends the stored series rather than
/// replacing it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub uid: u64,
    /// Time of the first sample of `vector`.
    pub index: i64,
    pub vector: Vec<f64>,
}

impl Document {
    pub fn new(uid: u64, index: i64, vector: Vec<f64>) -> Self {
        Self { uid, index, vector }
    }
}
