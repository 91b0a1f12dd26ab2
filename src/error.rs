//! The closed error set shared by every container operation.

use crate::node::Node;
use thiserror::Error;

/// Result alias for container operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Everything a container operation can report.
///
/// The set is closed on purpose: collaborators dispatch on these codes and
/// nothing else. Propagation is purely by return value; library code never
/// panics on a caller mistake.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Error {
    /// Unspecified failure.
    #[error("operation failed")]
    Failure,
    /// The call names behavior the API declares but does not provide.
    #[error("not implemented")]
    NotImplemented,
    /// A rejected argument, or an operation the node's kind does not support.
    #[error("invalid parameters")]
    InvalidParams,
    /// No admissible storage capacity exists for the requested operation.
    #[error("allocation failed")]
    AllocFailed,
    /// The node is the unimplemented linked kind, or its backing store is
    /// inconsistent.
    #[error("invalid state")]
    InvalidState,
    /// The key or value was absent.
    #[error("not found")]
    NotFound,
}

/// A child handed back from an operation that refused to take it.
///
/// Inserts consume their child, so a failed insert would otherwise destroy
/// caller data; instead the child rides back to the caller alongside the
/// error code.
#[derive(Debug, Error)]
#[error("{error}")]
pub struct Rejected {
    /// Why the child was refused.
    pub error: Error,
    /// The child, returned untouched.
    pub child: Node,
}

impl Rejected {
    pub(crate) fn new(error: Error, child: Node) -> Self {
        Self { error, child }
    }
}
