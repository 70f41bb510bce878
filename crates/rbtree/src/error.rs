use thiserror::Error;

use crate::list::Position;
use crate::node::NodeId;

/// Errors reported by the fallible container operations.
///
/// Lookup misses are not errors: `find` and the bounds return the end
/// position, and `erase` by key returns the number of removed elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Error {
    #[error("no element matches the requested key")]
    KeyNotFound,

    #[error("position {0:?} does not refer to a live element")]
    InvalidPosition(Position),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// A broken red-black or search-tree property, as found by
/// [`RbTree::validate`](crate::RbTree::validate).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Violation {
    #[error("the root is red")]
    RedRoot,

    #[error("red node {0:?} has a red child")]
    RedRed(NodeId),

    #[error("black height differs below {node:?}: left {left}, right {right}")]
    BlackHeight {
        node: NodeId,
        left: usize,
        right: usize,
    },

    #[error("node {0:?} does not point back at its parent")]
    BrokenLink(NodeId),

    #[error("in-order traversal goes backwards at {0:?}")]
    Unordered(NodeId),

    #[error("{reachable} nodes are reachable but the tree reports {len}")]
    Length { reachable: usize, len: usize },

    #[error("list position {0:?} is out of step with the tree")]
    Unindexed(Position),
}
