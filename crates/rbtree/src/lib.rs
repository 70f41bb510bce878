//! Red-black tree and the ordered associative containers built on it.
//!
//! - [`RbTree`] is the balancing engine. It takes its ordering per call.
//! - [`TreeSet`], [`TreeMultiSet`], [`TreeMap`] and [`TreeMultiMap`] keep
//!   their elements in a linked list in key order and index the list
//!   positions with the tree. A [`Position`] stays valid until its own
//!   element is removed.
//! - [`cursor`] holds the traversal contracts shared with slices.

mod arena;
mod container;
pub mod cursor;
mod error;
mod keyed;
mod list;
mod map;
mod node;
mod policy;
mod tree;

pub use container::{
    Positions, TreeContainer, TreeCursor, TreeMap, TreeMultiMap, TreeMultiSet, TreeSet,
};
pub use error::{Error, Result, Violation};
pub use keyed::{KeyedTree, MultiMapTree, MultiSetTree, UniqueMapTree, UniqueSetTree};
pub use list::{ElementList, IntoIter, Iter, Position};
pub use node::{Color, NodeId};
pub use policy::{Compare, KeyOf, MapKey, Multi, Natural, SetKey, Unique, Uniqueness};
pub use tree::{Bias, Iter as TreeIter, RbTree};
