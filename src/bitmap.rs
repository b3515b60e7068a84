//! Concurrency-safe posting lists.

use parking_lot::Mutex;
use roaring::RoaringTreemap;

/// A mutex-guarded roaring bitmap of document uids.
///
/// Posting lists are sparse over the full 64-bit uid space, so a compressed
/// bitmap keeps them cheap. Each bitmap guards only its own membership; the
/// owning table guards the map that holds it.
#[derive(Debug, Default)]
pub struct SafeBitmap {
    rb: Mutex<RoaringTreemap>,
}

impl SafeBitmap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, uid: u64) {
        self.rb.lock().insert(uid);
    }

    /// Remove `uid`, reporting whether it was present.
    pub fn checked_remove(&self, uid: u64) -> bool {
        self.rb.lock().remove(uid)
    }

    pub fn contains(&self, uid: u64) -> bool {
        self.rb.lock().contains(uid)
    }

    pub fn is_empty(&self) -> bool {
        self.rb.lock().is_empty()
    }

    pub fn len(&self) -> u64 {
        self.rb.lock().len()
    }

    /// Union this bitmap into `acc`, holding the lock only for the copy.
    pub fn union_into(&self, acc: &mut RoaringTreemap) {
        let rb = self.rb.lock();
        *acc |= &*rb;
    }
}
