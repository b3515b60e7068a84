//! Bounded top-N score collection.
//!
//! Candidates stream through [`Results::update`] one at a time; a min-heap
//! keyed by absolute score keeps only the strongest `top_n`, so search cost
//! stays proportional to the candidate count rather than a full sort.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use serde::{Deserialize, Serialize};

/// Restricts search results by the sign of the correlation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SignFilter {
    /// Both positively and negatively correlated matches.
    #[default]
    Any,
    /// Positively correlated matches only.
    Pos,
    /// Negatively correlated matches only.
    Neg,
}

/// One scored match.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Score {
    pub uid: u64,
    /// Time position the stored vector was scored at.
    pub index: i64,
    /// Pearson correlation in [-1, 1].
    pub score: f64,
}

/// Ranked scores, strongest first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scores(pub Vec<Score>);

impl Scores {
    pub fn uids(&self) -> Vec<u64> {
        self.0.iter().map(|s| s.uid).collect()
    }

    pub fn scores(&self) -> Vec<f64> {
        self.0.iter().map(|s| s.score).collect()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Score> {
        self.0.iter()
    }
}

impl IntoIterator for Scores {
    type Item = Score;
    type IntoIter = std::vec::IntoIter<Score>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl std::ops::Index<usize> for Scores {
    type Output = Score;

    fn index(&self, i: usize) -> &Score {
        &self.0[i]
    }
}

/// Heap entry ordered by (|score|, index, uid) ascending, so the weakest
/// entry with the smallest tie-break keys is evicted first.
#[derive(Debug, Clone, Copy)]
struct Ranked(Score);

impl Ranked {
    fn key(&self) -> (f64, i64, u64) {
        (self.0.score.abs(), self.0.index, self.0.uid)
    }
}

impl PartialEq for Ranked {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Ranked {}

impl PartialOrd for Ranked {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Ranked {
    fn cmp(&self, other: &Self) -> Ordering {
        let (a, ai, au) = self.key();
        let (b, bi, bu) = other.key();
        // reversed so that BinaryHeap's max is the weakest entry
        b.total_cmp(&a)
            .then(bi.cmp(&ai))
            .then(bu.cmp(&au))
    }
}

/// Streaming top-N collector with threshold and sign filtering.
#[derive(Debug)]
pub struct Results {
    top_n: usize,
    threshold: f64,
    sign_filter: SignFilter,
    heap: BinaryHeap<Ranked>,
    num_scored: usize,
}

impl Results {
    pub fn new(top_n: usize, threshold: f64, sign_filter: SignFilter) -> Self {
        Self {
            top_n,
            threshold,
            sign_filter,
            heap: BinaryHeap::with_capacity(top_n),
            num_scored: 0,
        }
    }

    /// Number of candidates offered via [`Results::update`].
    pub fn num_scored(&self) -> usize {
        self.num_scored
    }

    /// NaN scores fail the threshold comparison and are dropped.
    fn passed(&self, s: &Score) -> bool {
        s.score.abs() >= self.threshold
            && match self.sign_filter {
                SignFilter::Any => true,
                SignFilter::Pos => s.score > 0.0,
                SignFilter::Neg => s.score < 0.0,
            }
    }

    /// Offer one candidate score.
    pub fn update(&mut self, s: Score) {
        self.num_scored += 1;
        if !self.passed(&s) {
            return;
        }
        if self.heap.len() == self.top_n {
            let weakest = match self.heap.peek() {
                Some(w) => w.0.score.abs(),
                None => return, // top_n == 0
            };
            if s.score.abs() > weakest {
                self.heap.pop();
                self.heap.push(Ranked(s));
            }
        } else {
            self.heap.push(Ranked(s));
        }
    }

    /// Drain the collected scores, strongest first; ties order by (index,
    /// uid) ascending.
    pub fn fetch(&mut self) -> Scores {
        let mut out: Vec<Score> = self.heap.drain().map(|r| r.0).collect();
        out.sort_by(|a, b| {
            b.score
                .abs()
                .total_cmp(&a.score.abs())
                .then(a.index.cmp(&b.index))
                .then(a.uid.cmp(&b.uid))
        });
        Scores(out)
    }
}
