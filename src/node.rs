//! The node dispatcher: one tagged type for every container shape.
//!
//! Every mutation enters through [`Node`], which either rejects the call
//! (wrong kind) or forwards it to the matching backing store. Destruction
//! starts at a node and cascades depth-first through every owned child.

use crate::array::{ArrayStore, Policy};
use crate::error::{Error, Rejected, Result};
use crate::hash::HashStore;
use crate::leaf::Scalar;
use tracing::trace;

const ARRAY_START_CAPACITY: usize = 2;
const HASH_START_CAPACITY: usize = 24;

/// The shape a node is allocated with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    /// A terminal scalar payload.
    Leaf,
    /// An ordered sequence of children.
    Array,
    /// A key-addressed map of children.
    Hash,
    /// Declared but unimplemented; allocation and every operation fail with
    /// [`Error::InvalidState`].
    Linked,
}

/// A generic container node.
///
/// A node holds a scalar leaf value, an ordered sequence of child nodes, or
/// a key-addressed map of child nodes, and composes recursively into trees.
/// Children are owned exclusively by their slot: they move into the tree on
/// insert and move back out on removal, so sharing a child between parents
/// is unrepresentable.
///
/// Matching on the variants gives read access; mutation goes through the
/// operations below, which reject kinds they do not apply to.
#[derive(Debug)]
pub enum Node {
    /// A scalar payload; `None` until a value is supplied.
    Leaf(Option<Scalar>),
    /// An ordered sequence of children.
    Array(ArrayStore),
    /// A key-addressed map of children.
    Hash(HashStore),
    /// The unimplemented linked kind.
    Linked,
}

/// Identity token for a child placed in an array node.
///
/// The token names the child by address and is never dereferenced: it is
/// only ever compared against the addresses of resident children, so a
/// token whose child has left the tree simply stops matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeRef(*const Node);

impl NodeRef {
    /// The token naming a child currently borrowed from a tree.
    #[must_use]
    pub fn of(node: &Node) -> Self {
        Self(node as *const Node)
    }
}

/// Aggregated outcome of a cascading release.
///
/// The cascade never stops early: a failing node is counted and the rest of
/// the subtree is still torn down, so siblings of a failure are released
/// rather than leaked.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Teardown {
    /// Nodes visited and released, failed ones included.
    pub released: usize,
    /// Nodes whose release reported an error.
    pub failed: usize,
    /// The first error encountered, if any.
    pub first_error: Option<Error>,
}

impl Teardown {
    fn record(&mut self, error: Error) {
        self.failed += 1;
        if self.first_error.is_none() {
            self.first_error = Some(error);
        }
    }

    /// `Ok` with the released count, or the first recorded error.
    pub fn into_result(self) -> Result<usize> {
        match self.first_error {
            None => Ok(self.released),
            Some(error) => Err(error),
        }
    }
}

impl Node {
    /// Allocate an empty node of `kind`.
    ///
    /// `Array` and `Hash` nodes eagerly allocate their backing stores at
    /// their start capacities. A `Leaf` starts without a payload; use
    /// [`Node::leaf`] to build one with a value. `Linked` is recognized but
    /// unimplemented and fails with [`Error::InvalidState`].
    pub fn alloc(kind: Kind) -> Result<Self> {
        match kind {
            Kind::Leaf => Ok(Node::Leaf(None)),
            Kind::Array => Ok(Node::Array(ArrayStore::new(
                ARRAY_START_CAPACITY,
                Policy::default(),
            ))),
            Kind::Hash => Ok(Node::Hash(HashStore::new(HASH_START_CAPACITY))),
            Kind::Linked => Err(Error::InvalidState),
        }
    }

    /// An empty array node with an explicit capacity policy.
    #[must_use]
    pub fn array_with(policy: Policy) -> Self {
        Node::Array(ArrayStore::new(ARRAY_START_CAPACITY, policy))
    }

    /// A leaf node holding `value`.
    #[must_use]
    pub fn leaf(value: impl Into<Scalar>) -> Self {
        Node::Leaf(Some(value.into()))
    }

    /// This node's kind tag.
    #[must_use]
    pub fn kind(&self) -> Kind {
        match self {
            Node::Leaf(_) => Kind::Leaf,
            Node::Array(_) => Kind::Array,
            Node::Hash(_) => Kind::Hash,
            Node::Linked => Kind::Linked,
        }
    }

    /// Number of children; zero for leaves.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Node::Array(store) => store.len(),
            Node::Hash(store) => store.len(),
            _ => 0,
        }
    }

    /// True when the node holds no children.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The scalar payload of a leaf that has one.
    #[must_use]
    pub fn scalar(&self) -> Option<&Scalar> {
        match self {
            Node::Leaf(scalar) => scalar.as_ref(),
            _ => None,
        }
    }

    /// The child at `idx` of an array node.
    #[must_use]
    pub fn get(&self, idx: usize) -> Option<&Node> {
        match self {
            Node::Array(store) => store.get(idx),
            _ => None,
        }
    }

    /// The child stored under `key` in a hash node.
    #[must_use]
    pub fn get_key(&self, key: &str) -> Option<&Node> {
        match self {
            Node::Hash(store) => store.get(key),
            _ => None,
        }
    }

    /// Append `child` at the end of an array node, returning its identity
    /// token.
    pub fn append(&mut self, child: Node) -> Result<NodeRef, Rejected> {
        match self {
            Node::Array(store) => Ok(NodeRef(store.append(Box::new(child)))),
            Node::Leaf(_) => Err(Rejected::new(Error::InvalidParams, child)),
            _ => Err(Rejected::new(Error::InvalidState, child)),
        }
    }

    /// Place `child` at `idx` of an array node, shifting `idx..len` one slot
    /// right. `idx` must address an occupied slot.
    pub fn insert_at(&mut self, idx: usize, child: Node) -> Result<NodeRef, Rejected> {
        match self {
            Node::Array(store) => match store.insert(idx, Box::new(child)) {
                Ok(id) => Ok(NodeRef(id)),
                Err(child) => Err(Rejected::new(Error::InvalidParams, *child)),
            },
            Node::Leaf(_) => Err(Rejected::new(Error::InvalidParams, child)),
            _ => Err(Rejected::new(Error::InvalidState, child)),
        }
    }

    /// Overwrite the occupied slot at `idx` of an array node, returning the
    /// previous occupant. Out of bounds, nothing is mutated and the child
    /// comes back inside the error.
    pub fn swap_at(&mut self, idx: usize, child: Node) -> Result<Node, Rejected> {
        match self {
            Node::Array(store) => match store.swap(idx, Box::new(child)) {
                Ok(old) => Ok(*old),
                Err(child) => Err(Rejected::new(Error::InvalidParams, *child)),
            },
            Node::Leaf(_) => Err(Rejected::new(Error::InvalidParams, child)),
            _ => Err(Rejected::new(Error::InvalidState, child)),
        }
    }

    /// Remove the first child of an array node matching `target` by
    /// identity, compacting the tail left. The removed child returns to the
    /// caller.
    pub fn remove_value(&mut self, target: NodeRef) -> Result<Node> {
        match self {
            Node::Array(store) => store.remove_target(target.0).map(|child| *child),
            Node::Leaf(_) => Err(Error::InvalidParams),
            _ => Err(Error::InvalidState),
        }
    }

    /// Remove and return the child at `idx` of an array node, compacting the
    /// tail left.
    pub fn remove_at(&mut self, idx: usize) -> Result<Node> {
        match self {
            Node::Array(store) => store.remove_at(idx).map(|child| *child),
            Node::Leaf(_) => Err(Error::InvalidParams),
            _ => Err(Error::InvalidState),
        }
    }

    /// Place `child` under `key` in a hash node.
    ///
    /// Growth triggered by a slot collision either fully completes or fails
    /// outright with the child handed back; see [`HashStore`] for the
    /// resize-only collision policy and its sharp edges.
    pub fn insert_key(&mut self, key: &str, child: Node) -> Result<(), Rejected> {
        match self {
            Node::Hash(store) => store
                .insert(key, Box::new(child))
                .map_err(|(error, child)| Rejected::new(error, *child)),
            _ => Err(Rejected::new(Error::InvalidParams, child)),
        }
    }

    /// Remove and return the child stored under `key` in a hash node. The
    /// slot occupant's key is compared first; a vacant slot or a mismatch
    /// reports [`Error::NotFound`].
    pub fn remove_key(&mut self, key: &str) -> Result<Node> {
        match self {
            Node::Hash(store) => store.remove(key).map(|child| *child),
            Node::Leaf(_) => Err(Error::InvalidParams),
            _ => Err(Error::InvalidState),
        }
    }

    /// Release this node and every child it owns, depth-first.
    ///
    /// Consuming `self` makes a second release or a use-after-release
    /// unrepresentable. A failure in one child does not abort the cascade:
    /// the remaining subtree is still torn down and the failures are
    /// aggregated in the returned [`Teardown`]. Dropping a node frees the
    /// same memory without the report.
    pub fn release(self) -> Teardown {
        let mut report = Teardown::default();
        self.teardown(&mut report);
        trace!(
            released = report.released,
            failed = report.failed,
            "teardown complete"
        );
        report
    }

    // The report is threaded through the recursion explicitly, so nothing
    // is shared between runs.
    fn teardown(self, report: &mut Teardown) {
        report.released += 1;
        match self {
            // An owned literal drops with the scalar; a raw pointer is the
            // caller's to free.
            Node::Leaf(_) => {}
            Node::Array(mut store) => {
                for child in store.drain() {
                    child.teardown(report);
                }
            }
            Node::Hash(mut store) => {
                for (key, child) in store.drain() {
                    drop(key);
                    child.teardown(report);
                }
            }
            Node::Linked => report.record(Error::InvalidState),
        }
    }
}
