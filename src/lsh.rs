//! The LSH engine: a bank of tables plus the forward index.
//!
//! # Search pipeline
//!
//! 1. **Filter**: every table hashes the query and unions the posting lists
//!    of the matching bucket within the lag window, in parallel. With a sign
//!    filter of `Any` or `Neg` the pass repeats with the query negated,
//!    since cosine is sign-symmetric.
//! 2. **Score**: each candidate `(uid, position)` pair is re-scored exactly
//!    with Pearson correlation against the slice the forward index stores at
//!    that position, and offered to a bounded top-N collector.
//!
//! A search may run concurrently with indexing; it can observe a document in
//! some tables but not yet others, which only lowers recall for that
//! document. A candidate deleted between the two phases simply has no
//! forward entry and is skipped.

use std::collections::HashSet;
use std::f64::consts::PI;

use parking_lot::Mutex;
use rayon::prelude::*;
use tracing::{debug, trace};

use crate::cancel::CancelToken;
use crate::document::Document;
use crate::error::{LshError, Result};
use crate::forward::ForwardIndex;
use crate::hyperplanes::Hyperplanes;
use crate::options::SearchOptions;
use crate::params::LSHParams;
use crate::results::{Results, Score, Scores, SignFilter};
use crate::similarity;
use crate::stats::{FalseNegativeError, Statistics};
use crate::table::{Candidates, Table};

/// A sign-random-projection LSH index over timestamped vectors.
///
/// All operations take `&self`; the index is safe to share across threads.
#[derive(Debug)]
pub struct LSHIndex {
    params: LSHParams,
    tables: Vec<Table>,
    forward: ForwardIndex,
}

impl LSHIndex {
    /// Build an index with `params.num_tables` independently hashed tables.
    pub fn new(params: LSHParams) -> Result<Self> {
        params.validate()?;
        let tables = (0..params.num_tables)
            .map(|_| {
                let hyperplanes =
                    Hyperplanes::new(params.num_hyperplanes, params.vector_length)?;
                Ok(Table::new(hyperplanes, &params))
            })
            .collect::<Result<Vec<_>>>()?;
        let forward = ForwardIndex::new(&params);
        debug!(
            num_tables = params.num_tables,
            num_hyperplanes = params.num_hyperplanes,
            vector_length = params.vector_length,
            "created lsh index"
        );
        Ok(Self {
            params,
            tables,
            forward,
        })
    }

    pub fn params(&self) -> &LSHParams {
        &self.params
    }

    /// Index a document, extending the stored series when the uid is already
    /// present at an earlier time.
    ///
    /// Tables store the transformed vector; the forward index keeps the
    /// original so scoring can transform fresh slices at query time.
    pub fn index(&self, doc: Document) -> Result<()> {
        if doc.vector.len() != self.params.vector_length {
            return Err(LshError::InvalidDocument);
        }
        if similarity::std_dev(&doc.vector) == 0.0 {
            return Err(LshError::NoVectorComplexity);
        }

        let original = doc.clone();
        let mut doc = doc;
        (self.params.transform)(&mut doc.vector);

        for table in &self.tables {
            table.index(&doc)?;
        }
        self.forward.index(original);
        trace!(uid = doc.uid, index = doc.index, "indexed document");
        Ok(())
    }

    /// Remove `uid` from every table and the forward index.
    ///
    /// Every table is attempted regardless of individual failures; the last
    /// error observed is returned.
    pub fn delete(&self, uid: u64) -> Result<()> {
        let mut last_err = None;
        for table in &self.tables {
            if let Err(e) = table.delete(uid) {
                last_err = Some(e);
            }
        }
        self.forward.delete(uid);
        debug!(uid, "deleted document");
        match last_err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Find the stored vectors most correlated with `doc.vector`, returning
    /// the ranked scores and the number of candidates scored exactly.
    pub fn search(&self, doc: &Document, opts: &SearchOptions) -> Result<(Scores, usize)> {
        self.search_with_cancel(doc, opts, &CancelToken::new())
    }

    /// Like [`LSHIndex::search`], aborting with
    /// [`LshError::Cancelled`] once `cancel` is observed.
    pub fn search_with_cancel(
        &self,
        doc: &Document,
        opts: &SearchOptions,
        cancel: &CancelToken,
    ) -> Result<(Scores, usize)> {
        if doc.vector.len() != self.params.vector_length {
            return Err(LshError::InvalidDocument);
        }
        opts.validate()?;

        // correlation against a zero-variance query is undefined
        if similarity::std_dev(&doc.vector) == 0.0 {
            return Ok((Scores::default(), 0));
        }

        let mut query = doc.clone();
        (self.params.transform)(&mut query.vector);
        let max_lag = opts.effective_max_lag();

        let mut candidates = Candidates::new();
        if matches!(opts.sign_filter, SignFilter::Any | SignFilter::Pos) {
            merge_candidates(
                &mut candidates,
                self.filter_by_lag(&query, max_lag, cancel)?,
            );
        }
        if matches!(opts.sign_filter, SignFilter::Any | SignFilter::Neg) {
            let mut negated = query.clone();
            for x in negated.vector.iter_mut() {
                *x = -*x;
            }
            merge_candidates(
                &mut candidates,
                self.filter_by_lag(&negated, max_lag, cancel)?,
            );
        }
        trace!(
            num_candidates = candidates.len(),
            max_lag,
            "filter phase complete"
        );

        let mut results = Results::new(opts.num_to_return, opts.threshold, opts.sign_filter);
        self.score(&query, &candidates, &mut results, cancel)?;
        Ok((results.fetch(), results.num_scored()))
    }

    /// Fan the bucket filter out across all tables and merge the candidate
    /// maps under a single mutex.
    fn filter_by_lag(
        &self,
        query: &Document,
        max_lag: i64,
        cancel: &CancelToken,
    ) -> Result<Candidates> {
        let merged = Mutex::new(Candidates::new());
        self.tables.par_iter().try_for_each(|table| {
            if cancel.is_cancelled() {
                return Err(LshError::Cancelled);
            }
            let found = table.filter(query, max_lag)?;
            merge_candidates(&mut merged.lock(), found);
            Ok(())
        })?;
        Ok(merged.into_inner())
    }

    /// Score every candidate position against the query and stream the
    /// results into the collector. Candidates deleted since the filter phase
    /// are skipped.
    fn score(
        &self,
        query: &Document,
        candidates: &Candidates,
        results: &mut Results,
        cancel: &CancelToken,
    ) -> Result<()> {
        for (&uid, positions) in candidates {
            for &position in positions {
                if cancel.is_cancelled() {
                    return Err(LshError::Cancelled);
                }
                let Some(mut stored) = self.forward.get_vector(uid, position) else {
                    continue;
                };
                (self.params.transform)(&mut stored);
                let score = similarity::pearson(&query.vector, &stored);
                results.update(Score {
                    uid,
                    index: position,
                    score,
                });
            }
        }
        Ok(())
    }

    /// Report the current document count and the false-negative probability
    /// of the configured table bank at a range of similarity thresholds.
    ///
    /// Two vectors at angle `theta` land in the same bucket of one table with
    /// probability `p_same^num_hyperplanes`; a match is lost only when every
    /// table misses it.
    pub fn stats(&self) -> Statistics {
        let false_negative_errors = (0..8)
            .map(|i| {
                let threshold = 0.60 + 0.05 * i as f64;
                let p_diff = 2.0 / PI * threshold.acos();
                let p_same = 1.0 - p_diff;
                let probability = (1.0 - p_same.powi(self.params.num_hyperplanes as i32))
                    .powi(self.params.num_tables as i32);
                FalseNegativeError {
                    threshold,
                    probability,
                }
            })
            .collect();
        Statistics {
            num_docs: self.forward.size(),
            false_negative_errors,
        }
    }
}

fn merge_candidates(into: &mut Candidates, from: Candidates) {
    for (uid, positions) in from {
        into.entry(uid)
            .or_insert_with(HashSet::new)
            .extend(positions);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_rejects_invalid_params() {
        let params = LSHParams {
            num_tables: 0,
            ..LSHParams::default()
        };
        assert_eq!(LSHIndex::new(params).unwrap_err(), LshError::InvalidNumTables);
    }

    #[test]
    fn new_builds_configured_table_count() {
        let index = LSHIndex::new(LSHParams::default()).unwrap();
        assert_eq!(index.tables.len(), 128);
    }

    #[test]
    fn stats_follows_the_collision_formula() {
        let index = LSHIndex::new(LSHParams::default()).unwrap();
        let stats = index.stats();
        assert_eq!(stats.num_docs, 0);
        assert_eq!(stats.false_negative_errors.len(), 8);
        for fne in &stats.false_negative_errors {
            let p_same = 1.0 - 2.0 / PI * fne.threshold.acos();
            let want = (1.0 - p_same.powi(8)).powi(128);
            assert!((fne.probability - want).abs() < 1e-12);
        }
    }
}
