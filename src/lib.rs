//! # burl
//!
//! Recursively composable tree containers: a single [`Node`] type holds a
//! scalar leaf, an ordered sequence of children, or a key-addressed map of
//! children, so tree-shaped data (configuration trees, ad-hoc records) needs
//! no bespoke struct per shape.
//!
//! ## Example
//!
//! ```rust
//! use burl::{Kind, Node};
//!
//! let mut root = Node::alloc(Kind::Hash)?;
//! root.insert_key("name", Node::leaf("segfault"))?;
//! root.insert_key("port", Node::leaf(8080_i64))?;
//!
//! assert_eq!(root.len(), 2);
//! let port = root.remove_key("port")?;
//! assert_eq!(port.scalar().and_then(|s| s.as_integer()), Some(8080));
//!
//! let report = root.release();
//! assert_eq!(report.into_result()?, 2); // hash node + remaining leaf
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Architecture
//!
//! - **Node dispatcher** ([`node`]): the tagged union routing every
//!   operation to the backing store matching its kind.
//! - **Array store** ([`array`]): a dense slot run of owned children with a
//!   configurable grow/shrink [`Policy`].
//! - **Hash layer** ([`hash`]): string keys folded onto the same slot
//!   representation; collisions are resolved by doubling the table, never by
//!   chaining or probing.
//! - **Leaf data** ([`leaf`]): the scalar payloads, including caller-managed
//!   raw pointers that are stored but never freed.
//!
//! Ownership is strictly single-parent: children move into the tree and move
//! back out on removal, and [`Node::release`] tears a whole tree down
//! depth-first, aggregating failures instead of stopping at the first one.
//! The crate is single-threaded by design; callers needing concurrency must
//! serialize access externally.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod array;
pub mod error;
pub mod hash;
pub mod leaf;
pub mod node;

mod mur32;
mod slots;

pub use array::{ArrayStore, Growth, Policy};
pub use error::{Error, Rejected, Result};
pub use hash::HashStore;
pub use leaf::Scalar;
pub use node::{Kind, Node, NodeRef, Teardown};

#[cfg(test)]
mod proptests;
