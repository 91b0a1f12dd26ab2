//! The ordered backing store for array nodes.
//!
//! Children occupy a dense prefix of a slot run; vacant headroom above the
//! prefix is managed by a capacity [`Policy`] evaluated before every placing
//! insert. Children are boxed so each has a stable address that
//! [`NodeRef`](crate::NodeRef) tokens can name.

use crate::error::Error;
use crate::node::Node;
use crate::slots::Slots;
use tracing::trace;

/// How a store acquires headroom when an insert finds none.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Growth {
    /// Fixed-step growth: keep at least `delta` vacant slots, growing by
    /// `delta` at a time. Memory use is tight and predictable, but total
    /// copying across `n` sequential appends is quadratic.
    Linear {
        /// Step size; zero is treated as one.
        delta: usize,
    },
    /// Double the capacity whenever headroom runs out; appends are
    /// amortized-constant at the price of up to half the store sitting
    /// vacant.
    Doubling,
}

/// Capacity plan evaluated before every placing insert.
///
/// The default reproduces the historical behavior: linear growth in steps of
/// two, shrinking by eight whenever that still leaves full headroom.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Policy {
    /// Growth mode.
    pub growth: Growth,
    /// Shrink the store by this many slots whenever the remainder still
    /// covers the occupied prefix plus growth headroom. Zero disables
    /// shrinking.
    pub overshoot: usize,
}

impl Default for Policy {
    fn default() -> Self {
        Self {
            growth: Growth::Linear { delta: 2 },
            overshoot: 8,
        }
    }
}

impl Policy {
    /// The capacity a store at `capacity` holding `used` entries should move
    /// to, or `None` to stay put.
    fn plan(self, capacity: usize, used: usize) -> Option<usize> {
        let (reserve, step) = match self.growth {
            Growth::Linear { delta } => (delta.max(1), delta.max(1)),
            Growth::Doubling => (1, capacity.max(1)),
        };
        if self.overshoot > 0 && capacity >= used + reserve + self.overshoot {
            Some(capacity - self.overshoot)
        } else if used + reserve >= capacity {
            Some(capacity + step)
        } else {
            None
        }
    }
}

/// The resizable sequence of owned children behind an array node.
///
/// Slots below `used` hold children in insertion order; storage above it is
/// vacant headroom. Mutation goes through [`Node`](crate::Node) operations;
/// this type exposes read access only.
#[derive(Debug)]
pub struct ArrayStore {
    slots: Slots<Box<Node>>,
    used: usize,
    policy: Policy,
}

impl ArrayStore {
    pub(crate) fn new(capacity: usize, policy: Policy) -> Self {
        Self {
            slots: Slots::with_capacity(capacity),
            used: 0,
            policy,
        }
    }

    /// Number of children.
    #[must_use]
    pub fn len(&self) -> usize {
        self.used
    }

    /// True when the store holds no children.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.used == 0
    }

    /// Current slot capacity, vacant headroom included.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.slots.capacity()
    }

    /// The capacity policy in force.
    #[must_use]
    pub fn policy(&self) -> Policy {
        self.policy
    }

    /// The child at `idx`, if occupied.
    #[must_use]
    pub fn get(&self, idx: usize) -> Option<&Node> {
        if idx < self.used {
            self.slots.get(idx).map(|child| &**child)
        } else {
            None
        }
    }

    fn rescale(&mut self) {
        if let Some(capacity) = self.policy.plan(self.capacity(), self.used) {
            trace!(
                from = self.capacity(),
                to = capacity,
                used = self.used,
                "rescaling array store"
            );
            self.slots.rescale(capacity);
        }
    }

    pub(crate) fn append(&mut self, child: Box<Node>) -> *const Node {
        self.rescale();
        let id = &*child as *const Node;
        self.slots.put(self.used, child);
        self.used += 1;
        id
    }

    /// Place `child` at `idx`, shifting `idx..used` right. Hands the child
    /// back when `idx` does not address an occupied slot.
    pub(crate) fn insert(&mut self, idx: usize, child: Box<Node>) -> Result<*const Node, Box<Node>> {
        if idx >= self.used {
            return Err(child);
        }
        self.rescale();
        let id = &*child as *const Node;
        self.slots.place_shifting(idx, self.used, child);
        self.used += 1;
        Ok(id)
    }

    /// Overwrite the slot at `idx` in place, returning the previous
    /// occupant. No rescale runs. Hands the child back when `idx` is out of
    /// bounds, leaving the store untouched.
    pub(crate) fn swap(&mut self, idx: usize, child: Box<Node>) -> Result<Box<Node>, Box<Node>> {
        if idx >= self.used {
            return Err(child);
        }
        let old = self.slots.put(idx, child);
        Ok(old.expect("slot below used is occupied"))
    }

    pub(crate) fn remove_at(&mut self, idx: usize) -> Result<Box<Node>, Error> {
        if idx >= self.used {
            return Err(Error::InvalidParams);
        }
        let child = self
            .slots
            .take_compacting(idx, self.used)
            .expect("slot below used is occupied");
        self.used -= 1;
        Ok(child)
    }

    /// Remove the first child whose address matches `target`, compacting the
    /// tail left.
    pub(crate) fn remove_target(&mut self, target: *const Node) -> Result<Box<Node>, Error> {
        let idx = self
            .slots
            .scan(self.used, |child| std::ptr::eq(&**child, target))
            .ok_or(Error::NotFound)?;
        self.remove_at(idx)
    }

    /// Move every child out in index order, leaving the store empty.
    pub(crate) fn drain(&mut self) -> impl Iterator<Item = Box<Node>> + '_ {
        self.used = 0;
        self.slots.drain()
    }
}
