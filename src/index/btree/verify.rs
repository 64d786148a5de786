//! Whole-tree integrity check.

use std::collections::HashSet;

use crate::common::{Error, PageId, Result};
use crate::index::btree::BTreeIndex;
use crate::storage::PageStore;

/// Shape of a tree that passed [`BTreeIndex::verify`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TreeStats {
    pub height: u32,
    pub internal_pages: usize,
    pub leaf_pages: usize,
    pub entries: usize,
}

/// Walk state shared by the recursive descent.
struct Walk {
    stats: TreeStats,
    visited: HashSet<PageId>,
    /// Leaves in left-to-right tree order.
    leaves: Vec<PageId>,
}

impl<S: PageStore> BTreeIndex<S> {
    /// Check every reachable page against the tree invariants.
    ///
    /// Checked: every node decodes (type, checksum, capacity); keys are
    /// sorted within each node and lie within the bounds set by the
    /// separators above; all leaves sit at the same depth; no page is
    /// reachable twice; the leaf chain visits exactly the leaves in tree
    /// order and ends with no next pointer.
    ///
    /// Pages allocated by an insert that failed before committing are not
    /// reachable and are ignored.
    ///
    /// # Errors
    /// Returns `Error::Corrupted` describing the first violation found, or
    /// the page store's error.
    pub fn verify(&mut self) -> Result<TreeStats> {
        let height = self.height();
        if height == 0 {
            return Ok(TreeStats::default());
        }

        let mut walk = Walk {
            stats: TreeStats {
                height,
                ..TreeStats::default()
            },
            visited: HashSet::new(),
            leaves: Vec::new(),
        };
        self.verify_subtree(self.root_page_id(), 1, None, None, &mut walk)?;
        self.verify_leaf_chain(&walk.leaves)?;

        tracing::debug!(stats = ?walk.stats, "index verified");
        Ok(walk.stats)
    }

    fn verify_subtree(
        &mut self,
        page_id: PageId,
        depth: u32,
        lower: Option<i32>,
        upper: Option<i32>,
        walk: &mut Walk,
    ) -> Result<()> {
        if page_id == PageId::HEADER || !page_id.is_valid() {
            return Err(Error::corrupted(
                page_id.0,
                format!("invalid node pointer at depth {}", depth),
            ));
        }
        if !walk.visited.insert(page_id) {
            return Err(Error::corrupted(page_id.0, "page reachable more than once"));
        }

        if depth == walk.stats.height {
            let leaf = self.read_leaf(page_id)?;
            if leaf.is_empty() {
                return Err(Error::corrupted(page_id.0, "empty leaf"));
            }
            let keys: Vec<i32> = leaf.entries().iter().map(|e| e.key).collect();
            check_keys(page_id, &keys, lower, upper)?;

            walk.stats.leaf_pages += 1;
            walk.stats.entries += leaf.key_count();
            walk.leaves.push(page_id);
            return Ok(());
        }

        let node = self.read_internal(page_id)?;
        if node.key_count() == 0 {
            return Err(Error::corrupted(page_id.0, "internal node without keys"));
        }
        check_keys(page_id, node.keys(), lower, upper)?;
        walk.stats.internal_pages += 1;

        let keys = node.keys();
        for (i, &child) in node.children().iter().enumerate() {
            let child_lower = if i == 0 { lower } else { Some(keys[i - 1]) };
            let child_upper = keys.get(i).copied().or(upper);
            self.verify_subtree(child, depth + 1, child_lower, child_upper, walk)?;
        }
        Ok(())
    }

    fn verify_leaf_chain(&mut self, leaves: &[PageId]) -> Result<()> {
        let mut previous_max: Option<i32> = None;

        for (i, &page_id) in leaves.iter().enumerate() {
            let leaf = self.read_leaf(page_id)?;

            if let (Some(max), Some(first)) = (previous_max, leaf.first_key()) {
                if first < max {
                    return Err(Error::corrupted(
                        page_id.0,
                        format!("leaf starts at {} after a leaf ending at {}", first, max),
                    ));
                }
            }
            previous_max = leaf.last_key();

            let expected = leaves.get(i + 1).copied();
            if leaf.next_leaf() != expected {
                return Err(Error::corrupted(
                    page_id.0,
                    format!(
                        "next leaf is {:?}, tree order expects {:?}",
                        leaf.next_leaf(),
                        expected
                    ),
                ));
            }
        }
        Ok(())
    }
}

/// Keys sorted and within `[lower, upper]`.
fn check_keys(page_id: PageId, keys: &[i32], lower: Option<i32>, upper: Option<i32>) -> Result<()> {
    if keys.windows(2).any(|pair| pair[0] > pair[1]) {
        return Err(Error::corrupted(page_id.0, "keys out of order"));
    }
    if let (Some(lower), Some(&first)) = (lower, keys.first()) {
        if first < lower {
            return Err(Error::corrupted(
                page_id.0,
                format!("key {} below separator {}", first, lower),
            ));
        }
    }
    if let (Some(upper), Some(&last)) = (upper, keys.last()) {
        if last > upper {
            return Err(Error::corrupted(
                page_id.0,
                format!("key {} above separator {}", last, upper),
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::{IndexConfig, RecordId};
    use crate::index::btree::{LeafNode, OpenMode};
    use crate::storage::MemoryPageStore;

    fn populated(count: i32) -> BTreeIndex<MemoryPageStore> {
        let config = IndexConfig::default()
            .with_leaf_capacity(4)
            .with_internal_capacity(3);
        let mut index =
            BTreeIndex::with_store(MemoryPageStore::new(), OpenMode::Write, config).unwrap();
        for key in 0..count {
            index.insert((key * 37) % 101, RecordId::new(0, key)).unwrap();
        }
        index
    }

    #[test]
    fn test_verify_empty() {
        let mut index = populated(0);
        assert_eq!(index.verify().unwrap(), TreeStats::default());
    }

    #[test]
    fn test_verify_counts() {
        let mut index = populated(100);
        let stats = index.verify().unwrap();

        assert_eq!(stats.entries, 100);
        assert_eq!(stats.height, index.height());
        assert!(stats.leaf_pages >= 100 / 4);
        assert!(stats.internal_pages >= 1);
    }

    #[test]
    fn test_verify_detects_broken_chain() {
        let mut index = populated(20);
        let first = index.first().unwrap().page_id;

        let mut leaf = index.read_leaf(first).unwrap();
        leaf.set_next_leaf(None);
        index.store_mut().write_page(first, &leaf.to_page()).unwrap();

        assert!(matches!(index.verify(), Err(Error::Corrupted { .. })));
    }

    #[test]
    fn test_verify_detects_misplaced_key() {
        let mut index = populated(20);
        let first = index.first().unwrap().page_id;

        // Rewrite the first leaf with a key far above its separator
        let old = index.read_leaf(first).unwrap();
        let mut leaf = LeafNode::new(4);
        leaf.insert(1000, RecordId::default()).unwrap();
        leaf.set_next_leaf(old.next_leaf());
        index.store_mut().write_page(first, &leaf.to_page()).unwrap();

        let err = index.verify().unwrap_err();
        assert!(matches!(err, Error::Corrupted { page_id, .. } if page_id == first.0));
    }
}
