//! B+tree index over fixed-size pages.
//!
//! # Components
//! - [`LeafNode`] - Sorted `(key, RecordId)` entries plus a next-leaf pointer
//! - [`InternalNode`] - Separator keys routing to child pages
//! - [`BTreeIndex`] - Insert with split propagation, lookup, range scans
//! - [`IndexCursor`] / [`RangeScan`] - Ordered iteration along the leaf chain
//! - [`TreeStats`] - Result of the whole-tree integrity check

mod btree_index;
mod cursor;
mod header;
mod internal_node;
mod leaf_node;
mod verify;

pub use btree_index::{BTreeIndex, OpenMode};
pub use cursor::{IndexCursor, RangeScan};
pub use header::TreeHeader;
pub use internal_node::InternalNode;
pub use leaf_node::{LeafEntry, LeafNode};
pub use verify::TreeStats;
