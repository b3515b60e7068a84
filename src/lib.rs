//! simbank: sign-random-projection LSH for correlated vector search.
//!
//! An in-memory approximate nearest-neighbor index for real-valued vectors
//! under cosine/Pearson similarity. Vectors carry a time index, and the
//! posting lists are sharded by coarse time rows, so a query can be
//! restricted to matches within a configurable lag window — the original use
//! case is finding metrics whose recent samples correlate with a query
//! waveform.
//!
//! # Algorithm
//!
//! Each of `num_tables` tables hashes a vector against its own set of
//! `num_hyperplanes` random unit normals; the projection signs pack into a
//! bucket code. Vectors at angle `theta` collide in one bucket with
//! probability `(1 - theta/pi)^num_hyperplanes`, and a candidate survives if
//! any table buckets it with the query. Candidates are then re-scored
//! exactly with Pearson correlation and ranked through a bounded top-N heap.
//! [`LSHIndex::stats`] reports the resulting false-negative probabilities so
//! the two knobs can be tuned against a target threshold.
//!
//! # Usage
//!
//! ```rust
//! use simbank::{Document, LSHIndex, LSHParams, SearchOptions, SignFilter};
//!
//! # fn main() -> Result<(), simbank::LshError> {
//! let index = LSHIndex::new(LSHParams::default())?;
//!
//! index.index(Document::new(0, 0, vec![0.0, 0.1, 3.0]))?;
//! index.index(Document::new(1, 0, vec![0.0, -0.1, -4.0]))?;
//!
//! let opts = SearchOptions {
//!     threshold: 0.65,
//!     sign_filter: SignFilter::Pos,
//!     ..SearchOptions::default()
//! };
//! let (scores, num_scored) = index.search(&Document::new(0, 0, vec![0.0, 0.0, 0.1]), &opts)?;
//! assert_eq!(scores.uids(), vec![0]);
//! assert!(num_scored >= 1);
//! # Ok(())
//! # }
//! ```
//!
//! # References
//!
//! - Charikar (2002): "Similarity estimation techniques from rounding
//!   algorithms"
//! - Indyk & Motwani (1998): "Approximate nearest neighbors: towards
//!   removing the curse of dimensionality"

pub mod bitmap;
pub mod cancel;
pub mod document;
pub mod error;
pub mod forward;
pub mod hyperplanes;
pub mod lsh;
pub mod options;
pub mod params;
pub mod results;
pub mod similarity;
pub mod stats;
pub mod table;

// Re-exports
pub use cancel::CancelToken;
pub use document::Document;
pub use error::{LshError, Result};
pub use hyperplanes::Hyperplanes;
pub use lsh::LSHIndex;
pub use options::{SearchOptions, ALL_LAGS};
pub use params::{LSHParams, TransformFn, MAX_NUM_HYPERPLANES};
pub use results::{Score, Scores, SignFilter};
pub use stats::{FalseNegativeError, Statistics};
