//! Forward index: uid to stored vector, used for exact re-scoring.
//!
//! The stored entry for a uid is a single series anchored at the time it was
//! first indexed. Re-indexing the uid at a later time writes the new samples
//! at their offset within that series, growing it as needed, so one document
//! can be scored at many positions in time. Samples that would land before
//! the anchor are dropped; past updates are not supported.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use parking_lot::RwLock;

use crate::document::Document;
use crate::params::LSHParams;

#[derive(Debug)]
pub struct ForwardIndex {
    sample_period: i64,
    vector_length: usize,
    docs: RwLock<HashMap<u64, Document>>,
}

impl ForwardIndex {
    pub fn new(params: &LSHParams) -> Self {
        Self {
            sample_period: params.sample_period,
            vector_length: params.vector_length,
            docs: RwLock::new(HashMap::new()),
        }
    }

    /// Number of stored uids.
    pub fn size(&self) -> usize {
        self.docs.read().len()
    }

    pub fn contains(&self, uid: u64) -> bool {
        self.docs.read().contains_key(&uid)
    }

    /// Store `doc`, extending any existing entry for its uid.
    ///
    /// The incoming samples are placed `(doc.index / sample_period) -
    /// (stored.index / sample_period)` positions into the stored vector,
    /// overwriting where they overlap and zero-padding any gap. The stored
    /// anchor time never changes.
    pub fn index(&self, doc: Document) {
        let mut docs = self.docs.write();
        let current = match docs.entry(doc.uid) {
            Entry::Vacant(entry) => {
                entry.insert(doc);
                return;
            }
            Entry::Occupied(entry) => entry.into_mut(),
        };

        let offset = doc.index / self.sample_period - current.index / self.sample_period;
        if offset <= 0 {
            return;
        }
        let offset = offset as usize;
        for (i, &sample) in doc.vector.iter().enumerate() {
            let at = i + offset;
            if at < current.vector.len() {
                current.vector[at] = sample;
            } else {
                current.vector.resize(at, 0.0);
                current.vector.push(sample);
            }
        }
    }

    /// Copy out the `vector_length` window of `uid`'s series starting at time
    /// `at`. Positions outside the stored series read as zero. Returns `None`
    /// for unknown uids.
    pub fn get_vector(&self, uid: u64, at: i64) -> Option<Vec<f64>> {
        let docs = self.docs.read();
        let doc = docs.get(&uid)?;

        let start = (at - doc.index) / self.sample_period;
        let mut buffer = vec![0.0; self.vector_length];
        for (i, slot) in buffer.iter_mut().enumerate() {
            let src = start + i as i64;
            if src >= 0 && (src as usize) < doc.vector.len() {
                *slot = doc.vector[src as usize];
            }
        }
        Some(buffer)
    }

    pub fn delete(&self, uid: u64) {
        self.docs.write().remove(&uid);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_index() -> ForwardIndex {
        ForwardIndex::new(&LSHParams {
            vector_length: 3,
            sample_period: 60,
            ..LSHParams::default()
        })
    }

    #[test]
    fn first_index_stores_copy() {
        let fwd = small_index();
        fwd.index(Document::new(1, 0, vec![1.0, 2.0, 3.0]));
        assert_eq!(fwd.size(), 1);
        assert!(fwd.contains(1));
        assert_eq!(fwd.get_vector(1, 0), Some(vec![1.0, 2.0, 3.0]));
        assert_eq!(fwd.get_vector(2, 0), None);
    }

    #[test]
    fn reindex_extends_in_time() {
        let fwd = small_index();
        fwd.index(Document::new(1, 0, vec![0.0, 1.0, 3.0]));
        fwd.index(Document::new(1, 60, vec![1.0, 3.0, 3.0]));
        fwd.index(Document::new(1, 120, vec![3.0, 3.0, 0.0]));
        fwd.index(Document::new(1, 180, vec![3.0, 0.0, 1.0]));

        assert_eq!(fwd.get_vector(1, 0), Some(vec![0.0, 1.0, 3.0]));
        assert_eq!(fwd.get_vector(1, 60), Some(vec![1.0, 3.0, 3.0]));
        assert_eq!(fwd.get_vector(1, 120), Some(vec![3.0, 3.0, 0.0]));
        assert_eq!(fwd.get_vector(1, 180), Some(vec![3.0, 0.0, 1.0]));
    }

    #[test]
    fn reindex_with_gap_zero_pads() {
        let fwd = small_index();
        fwd.index(Document::new(1, 0, vec![1.0, 1.0, 1.0]));
        // skips positions 3 and 4
        fwd.index(Document::new(1, 300, vec![2.0, 2.0, 2.0]));
        assert_eq!(fwd.get_vector(1, 120), Some(vec![1.0, 0.0, 0.0]));
        assert_eq!(fwd.get_vector(1, 300), Some(vec![2.0, 2.0, 2.0]));
    }

    #[test]
    fn past_updates_are_ignored() {
        let fwd = small_index();
        fwd.index(Document::new(1, 600, vec![1.0, 2.0, 3.0]));
        fwd.index(Document::new(1, 540, vec![9.0, 9.0, 9.0]));
        fwd.index(Document::new(1, 600, vec![9.0, 9.0, 9.0]));
        assert_eq!(fwd.get_vector(1, 600), Some(vec![1.0, 2.0, 3.0]));
    }

    #[test]
    fn window_past_the_tail_reads_zero() {
        let fwd = small_index();
        fwd.index(Document::new(1, 0, vec![1.0, 2.0, 3.0]));
        assert_eq!(fwd.get_vector(1, 60), Some(vec![2.0, 3.0, 0.0]));
        assert_eq!(fwd.get_vector(1, 600), Some(vec![0.0, 0.0, 0.0]));
    }

    #[test]
    fn window_before_the_anchor_reads_zero() {
        let fwd = small_index();
        fwd.index(Document::new(1, 600, vec![1.0, 2.0, 3.0]));
        assert_eq!(fwd.get_vector(1, 480), Some(vec![0.0, 0.0, 1.0]));
    }

    #[test]
    fn delete_removes_entry() {
        let fwd = small_index();
        fwd.index(Document::new(1, 0, vec![1.0, 2.0, 3.0]));
        fwd.delete(1);
        assert_eq!(fwd.size(), 0);
        assert_eq!(fwd.get_vector(1, 0), None);
        // deleting again is a no-op
        fwd.delete(1);
    }
}
