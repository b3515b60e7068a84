//! A single LSH table: one hyperplane set plus its posting lists.
//!
//! Posting lists are sharded by a coarse time row (`floor(t / row_size) *
//! row_size`), so a candidate lookup can be restricted to the rows that
//! overlap a query's lag window. A reverse index records every `(row,
//! bucket)` a uid was stored under; the bucket map and the reverse index are
//! exact inverses of each other.
//!
//! Lock order: the table locks protect map shape only. A bitmap reference is
//! cloned out under the read guard and its own lock is taken after the guard
//! is dropped.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use parking_lot::RwLock;
use roaring::RoaringTreemap;
use smallvec::SmallVec;

use crate::bitmap::SafeBitmap;
use crate::document::Document;
use crate::error::{LshError, Result};
use crate::hyperplanes::Hyperplanes;
use crate::params::LSHParams;

/// Bucket locations per uid. One or two rows is the common case.
type Locations = SmallVec<[(i64, u16); 4]>;

/// Candidate uids mapped to the row positions they were found at.
pub type Candidates = HashMap<u64, HashSet<i64>>;

#[derive(Debug)]
pub struct Table {
    hyperplanes: Hyperplanes,
    vector_length: usize,
    sample_period: i64,
    row_size: i64,
    /// row index -> bucket code -> posting list
    rows: RwLock<HashMap<i64, HashMap<u16, Arc<SafeBitmap>>>>,
    /// uid -> every (row, bucket) it was stored under
    locations: RwLock<HashMap<u64, Locations>>,
}

impl Table {
    pub fn new(hyperplanes: Hyperplanes, params: &LSHParams) -> Self {
        Self {
            hyperplanes,
            vector_length: params.vector_length,
            sample_period: params.sample_period,
            row_size: params.row_size,
            rows: RwLock::new(HashMap::new()),
            locations: RwLock::new(HashMap::new()),
        }
    }

    fn row_index(&self, t: i64) -> i64 {
        t.div_euclid(self.row_size) * self.row_size
    }

    /// Add `doc` to the posting list of its bucket within its time row.
    ///
    /// The same uid may be indexed again at a later time; each call records
    /// one more `(row, bucket)` location for it.
    pub fn index(&self, doc: &Document) -> Result<()> {
        let hash = self.hyperplanes.hash16(&doc.vector)?;
        let row = self.row_index(doc.index);

        let bitmap = {
            let mut rows = self.rows.write();
            Arc::clone(
                rows.entry(row)
                    .or_default()
                    .entry(hash)
                    .or_insert_with(|| Arc::new(SafeBitmap::new())),
            )
        };
        bitmap.add(doc.uid);

        let mut locations = self.locations.write();
        let locs = locations.entry(doc.uid).or_default();
        if !locs.contains(&(row, hash)) {
            locs.push((row, hash));
        }
        Ok(())
    }

    /// Collect candidate uids whose bucket matches `doc`'s, together with the
    /// row positions to score them at.
    ///
    /// A negative `max_lag` scans every row. Otherwise rows from
    /// `row(t - max_lag)` through `row(t + vector_length * sample_period +
    /// max_lag)` are scanned, and only positions within the lag window
    /// `[row(t - max_lag), row(t + max_lag)]` are reported.
    pub fn filter(&self, doc: &Document, max_lag: i64) -> Result<Candidates> {
        let hash = self.hyperplanes.hash16(&doc.vector)?;

        let buckets: Vec<(i64, Arc<SafeBitmap>)> = {
            let rows = self.rows.read();
            if max_lag < 0 {
                rows.iter()
                    .filter_map(|(&row, buckets)| {
                        buckets.get(&hash).map(|bm| (row, Arc::clone(bm)))
                    })
                    .collect()
            } else {
                let span = self.vector_length as i64 * self.sample_period;
                let start_row = self.row_index(doc.index - max_lag);
                let end_row = self.row_index(doc.index + span + max_lag);
                let last_position = self.row_index(doc.index + max_lag);
                let mut hits = Vec::new();
                let mut row = start_row;
                while row <= end_row {
                    if row <= last_position {
                        if let Some(bm) = rows.get(&row).and_then(|buckets| buckets.get(&hash)) {
                            hits.push((row, Arc::clone(bm)));
                        }
                    }
                    row += self.row_size;
                }
                hits
            }
        };

        let mut candidates = Candidates::new();
        let mut ids = RoaringTreemap::new();
        for (row, bitmap) in buckets {
            ids.clear();
            bitmap.union_into(&mut ids);
            for uid in ids.iter() {
                candidates.entry(uid).or_default().insert(row);
            }
        }
        Ok(candidates)
    }

    /// Remove every posting-list entry for `uid` and drop its reverse-index
    /// record. Buckets left empty are removed from the table.
    pub fn delete(&self, uid: u64) -> Result<()> {
        let locs = self
            .locations
            .write()
            .remove(&uid)
            .ok_or(LshError::DocumentNotStored)?;

        let mut err = None;
        for (row, hash) in locs {
            let bitmap = {
                let rows = self.rows.read();
                rows.get(&row).and_then(|buckets| buckets.get(&hash)).map(Arc::clone)
            };
            let Some(bitmap) = bitmap else {
                err = Some(LshError::HashNotFound);
                continue;
            };
            bitmap.checked_remove(uid);
            if bitmap.is_empty() {
                let mut rows = self.rows.write();
                if let Some(buckets) = rows.get_mut(&row) {
                    buckets.remove(&hash);
                    if buckets.is_empty() {
                        rows.remove(&row);
                    }
                }
            }
        }
        match err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    #[cfg(test)]
    fn num_locations(&self, uid: u64) -> usize {
        self.locations
            .read()
            .get(&uid)
            .map_or(0, |locs| locs.len())
    }
}
