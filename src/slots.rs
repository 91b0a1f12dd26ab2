// Raw slot storage shared by the array and hash layers: a fixed run of
// optional slots, rescaled explicitly by its owner. Dense or sparse use is
// the owner's discipline; this layer only moves values around.

use std::mem;

#[derive(Debug)]
pub(crate) struct Slots<T> {
    buf: Box<[Option<T>]>,
}

impl<T> Slots<T> {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        let mut buf = Vec::new();
        buf.resize_with(capacity, || None);
        Self {
            buf: buf.into_boxed_slice(),
        }
    }

    pub(crate) fn capacity(&self) -> usize {
        self.buf.len()
    }

    /// Reallocate to `capacity`, preserving contents. Slots cut off by a
    /// shrink must already be vacant.
    pub(crate) fn rescale(&mut self, capacity: usize) {
        let mut buf = mem::take(&mut self.buf).into_vec();
        if capacity < buf.len() {
            debug_assert!(buf[capacity..].iter().all(Option::is_none));
        }
        buf.resize_with(capacity, || None);
        self.buf = buf.into_boxed_slice();
    }

    pub(crate) fn get(&self, idx: usize) -> Option<&T> {
        self.buf.get(idx).and_then(Option::as_ref)
    }

    /// Occupy `idx`, handing back any previous occupant.
    pub(crate) fn put(&mut self, idx: usize, value: T) -> Option<T> {
        self.buf[idx].replace(value)
    }

    /// Vacate `idx`.
    pub(crate) fn take(&mut self, idx: usize) -> Option<T> {
        self.buf[idx].take()
    }

    /// Shift `idx..used` one slot right and place `value` at `idx`. The slot
    /// at `used` must be vacant.
    pub(crate) fn place_shifting(&mut self, idx: usize, used: usize, value: T) {
        debug_assert!(idx <= used && used < self.buf.len());
        for i in (idx..used).rev() {
            self.buf[i + 1] = self.buf[i].take();
        }
        self.buf[idx] = Some(value);
    }

    /// Vacate `idx` and compact `idx+1..used` one slot left.
    pub(crate) fn take_compacting(&mut self, idx: usize, used: usize) -> Option<T> {
        let out = self.buf[idx].take();
        for i in idx + 1..used {
            self.buf[i - 1] = self.buf[i].take();
        }
        out
    }

    /// Index of the first occupied slot below `used` whose value matches.
    pub(crate) fn scan<F>(&self, used: usize, mut pred: F) -> Option<usize>
    where
        F: FnMut(&T) -> bool,
    {
        self.buf[..used]
            .iter()
            .position(|slot| slot.as_ref().is_some_and(|value| pred(value)))
    }

    /// Borrow every occupied slot in index order.
    pub(crate) fn occupied(&self) -> impl Iterator<Item = &T> {
        self.buf.iter().filter_map(Option::as_ref)
    }

    /// Move every occupied slot out, leaving the storage vacant.
    pub(crate) fn drain(&mut self) -> impl Iterator<Item = T> + '_ {
        self.buf.iter_mut().filter_map(Option::take)
    }
}
