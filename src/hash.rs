//! The key-addressed backing store for hash nodes.
//!
//! Entries live at `digest % capacity` in the same slot representation the
//! array layer uses. There are no buckets and no probing: any collision
//! grows the table by doubling until every computed index is free, so a
//! lookup is a single slot inspection. The trade-off is simplicity against
//! poor worst-case growth under adversarial keys; see [`HashStore`].

use crate::error::Error;
use crate::mur32;
use crate::node::Node;
use crate::slots::Slots;
use tracing::debug;

/// Hard ceiling on table capacity. Growth past this fails with
/// [`Error::AllocFailed`] rather than doubling forever when no
/// collision-free layout exists.
const MAX_CAPACITY: usize = 1 << 26;

#[derive(Debug)]
struct Entry {
    /// Raw digest of `key`, cached so growth re-folds the same value.
    digest: u32,
    key: String,
    child: Box<Node>,
}

/// The key-addressed backing store behind a hash node.
///
/// Collision handling is resize-only: two keys folding to the same slot
/// force the table to double until they separate, even when it is nearly
/// empty. Capacity is therefore monotonically non-decreasing and can grow
/// far beyond the entry count for unlucky key sets. Inserting a key that is
/// already resident can never separate from itself and fails with
/// [`Error::AllocFailed`], leaving the table unchanged.
#[derive(Debug)]
pub struct HashStore {
    slots: Slots<Entry>,
    used: usize,
}

impl HashStore {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            slots: Slots::with_capacity(capacity),
            used: 0,
        }
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.used
    }

    /// True when the store holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.used == 0
    }

    /// Current table capacity.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.slots.capacity()
    }

    fn index_of(&self, digest: u32) -> usize {
        digest as usize % self.slots.capacity()
    }

    /// The child stored under `key`, if any.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Node> {
        let entry = self.slots.get(self.index_of(mur32::digest(key.as_bytes())))?;
        (entry.key == key).then_some(&*entry.child)
    }

    /// Place `child` under `key`, growing the table when its slot is taken.
    ///
    /// Either fully completes (including any growth) or fails with the child
    /// handed back and the table untouched.
    pub(crate) fn insert(
        &mut self,
        key: &str,
        child: Box<Node>,
    ) -> Result<(), (Error, Box<Node>)> {
        let digest = mur32::digest(key.as_bytes());
        let idx = self.index_of(digest);
        if self.slots.get(idx).is_none() {
            self.slots.put(
                idx,
                Entry {
                    digest,
                    key: key.to_owned(),
                    child,
                },
            );
            self.used += 1;
            return Ok(());
        }

        // Bucket contention. Find the first doubled capacity where every
        // resident digest plus the pending one maps to its own slot, then
        // move each entry across exactly once. The old backing run is
        // dropped shallowly: entries now belong to the new one.
        let Some(capacity) = self.plan_growth(digest) else {
            return Err((Error::AllocFailed, child));
        };
        debug!(
            from = self.capacity(),
            to = capacity,
            entries = self.used,
            "growing hash store"
        );
        let mut grown = Slots::with_capacity(capacity);
        for entry in self.slots.drain() {
            let slot = entry.digest as usize % capacity;
            grown.put(slot, entry);
        }
        grown.put(
            digest as usize % capacity,
            Entry {
                digest,
                key: key.to_owned(),
                child,
            },
        );
        self.slots = grown;
        self.used += 1;
        Ok(())
    }

    /// Remove and return the child stored under `key`.
    ///
    /// The slot occupant's key is compared before eviction; a vacant slot or
    /// a mismatch reports [`Error::NotFound`].
    pub(crate) fn remove(&mut self, key: &str) -> Result<Box<Node>, Error> {
        let idx = self.index_of(mur32::digest(key.as_bytes()));
        match self.slots.take(idx) {
            Some(entry) if entry.key == key => {
                self.used -= 1;
                Ok(entry.child)
            }
            Some(entry) => {
                self.slots.put(idx, entry);
                Err(Error::NotFound)
            }
            None => Err(Error::NotFound),
        }
    }

    /// Smallest doubled capacity at which all stored digests and `pending`
    /// occupy distinct slots, if one exists below the ceiling.
    fn plan_growth(&self, pending: u32) -> Option<usize> {
        let digests: Vec<u32> = self
            .slots
            .occupied()
            .map(|entry| entry.digest)
            .chain(std::iter::once(pending))
            .collect();

        let mut capacity = self.capacity().checked_mul(2)?;
        while capacity <= MAX_CAPACITY {
            let mut taken: Vec<usize> = digests.iter().map(|&d| d as usize % capacity).collect();
            taken.sort_unstable();
            if taken.windows(2).all(|pair| pair[0] != pair[1]) {
                return Some(capacity);
            }
            capacity = capacity.checked_mul(2)?;
        }
        None
    }

    /// Move every entry out, leaving the store empty.
    pub(crate) fn drain(&mut self) -> impl Iterator<Item = (String, Box<Node>)> + '_ {
        self.used = 0;
        self.slots.drain().map(|entry| (entry.key, entry.child))
    }
}
