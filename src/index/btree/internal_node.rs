//! B+tree internal (non-leaf) node.
//!
//! An internal node with `n` separator keys routes to `n + 1` children:
//!
//! ```text
//!        keys:      k0      k1      k2
//!    children:  c0      c1      c2      c3
//!
//!    c0: key < k0     c1: k0 <= key < k1     c3: key >= k2
//! ```
//!
//! When a run of duplicate keys straddles a split, copies of a separator can
//! remain on its left side, so lookups use [`InternalNode::leftmost_child_index`]
//! while insertions use the half-open [`InternalNode::child_index`].

use crate::common::config::{INTERNAL_ENTRY_SIZE, MAX_INTERNAL_CAPACITY, NODE_HEADER_SIZE};
use crate::common::{Error, PageId, Result};
use crate::storage::page::{Page, PageHeader, PageType};

/// Decoded internal page.
///
/// # Page Layout
/// ```text
/// Offset          Size   Field
/// ------          ----   -----
/// 0               8      PageHeader (type = BTreeInternal, checksum)
/// 8               4      key_count
/// 12              4      children[0]
/// 16 + 8*i        4      keys[i]
/// 20 + 8*i        4      children[i + 1]
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InternalNode {
    keys: Vec<i32>,
    children: Vec<PageId>,
    capacity: usize,
}

impl InternalNode {
    const OFFSET_COUNT: usize = NODE_HEADER_SIZE;
    const OFFSET_FIRST_CHILD: usize = Self::OFFSET_COUNT + 4;
    const OFFSET_PAIRS: usize = Self::OFFSET_FIRST_CHILD + 4;

    /// Create an empty node (no keys, no children) holding at most
    /// `capacity` keys once filled.
    ///
    /// `capacity` is clamped to what fits in a page.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.min(MAX_INTERNAL_CAPACITY);
        Self {
            keys: Vec::with_capacity(capacity),
            children: Vec::with_capacity(capacity + 1),
            capacity,
        }
    }

    /// Build a one-key root over `left` and `right`.
    pub fn new_root(capacity: usize, left: PageId, key: i32, right: PageId) -> Self {
        let mut node = Self::new(capacity);
        node.initialize_root(left, key, right);
        node
    }

    /// Reset this node to `[left] key [right]`.
    pub fn initialize_root(&mut self, left: PageId, key: i32, right: PageId) {
        self.keys.clear();
        self.children.clear();
        self.keys.push(key);
        self.children.push(left);
        self.children.push(right);
    }

    /// Decode an internal node from `page`.
    ///
    /// # Errors
    /// Returns `Error::Corrupted` if the page is not an internal node, fails
    /// its checksum, stores more keys than `capacity`, or points a child at
    /// the header page.
    pub fn from_page(page_id: PageId, page: &Page, capacity: usize) -> Result<Self> {
        let header = page.header();
        if header.page_type != PageType::BTreeInternal {
            return Err(Error::corrupted(
                page_id.0,
                format!("expected internal page, found {:?}", header.page_type),
            ));
        }
        if !header.verify_checksum(page.as_slice()) {
            tracing::warn!(%page_id, "internal page failed checksum verification");
            return Err(Error::corrupted(page_id.0, "checksum mismatch"));
        }

        let capacity = capacity.min(MAX_INTERNAL_CAPACITY);
        let count = page.read_u32(Self::OFFSET_COUNT) as usize;
        if count > capacity {
            return Err(Error::corrupted(
                page_id.0,
                format!("internal node holds {} keys, capacity is {}", count, capacity),
            ));
        }

        let mut keys = Vec::with_capacity(capacity);
        let mut children = Vec::with_capacity(capacity + 1);
        children.push(PageId::new(page.read_u32(Self::OFFSET_FIRST_CHILD)));
        for i in 0..count {
            let offset = Self::pair_offset(i);
            keys.push(page.read_i32(offset));
            children.push(PageId::new(page.read_u32(offset + 4)));
        }

        if children.contains(&PageId::HEADER) {
            return Err(Error::corrupted(page_id.0, "child pointer to header page"));
        }

        Ok(Self {
            keys,
            children,
            capacity,
        })
    }

    /// Encode this node into a fresh page with a valid checksum.
    pub fn to_page(&self) -> Page {
        let mut page = Page::new();
        page.set_header(&PageHeader::new(PageType::BTreeInternal));
        page.write_u32(Self::OFFSET_COUNT, self.keys.len() as u32);

        if let Some(first) = self.children.first() {
            page.write_u32(Self::OFFSET_FIRST_CHILD, first.0);
        }
        for (i, (key, child)) in self.keys.iter().zip(self.children.iter().skip(1)).enumerate() {
            let offset = Self::pair_offset(i);
            page.write_i32(offset, *key);
            page.write_u32(offset + 4, child.0);
        }

        page.update_checksum();
        page
    }

    #[inline]
    fn pair_offset(i: usize) -> usize {
        Self::OFFSET_PAIRS + i * INTERNAL_ENTRY_SIZE
    }

    #[inline]
    pub fn key_count(&self) -> usize {
        self.keys.len()
    }

    /// True for a freshly constructed node with no children.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty() && self.children.is_empty()
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.keys.len() >= self.capacity
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    pub fn keys(&self) -> &[i32] {
        &self.keys
    }

    #[inline]
    pub fn children(&self) -> &[PageId] {
        &self.children
    }

    /// Child pointer at `index`.
    ///
    /// # Panics
    /// Panics if `index > key_count`.
    #[inline]
    pub fn child_at(&self, index: usize) -> PageId {
        self.children[index]
    }

    /// Index of the child whose half-open range holds `search_key`: the number
    /// of separators `<= search_key`.
    pub fn child_index(&self, search_key: i32) -> usize {
        self.keys.partition_point(|&k| k <= search_key)
    }

    /// Child pointer whose half-open range holds `search_key`.
    pub fn locate_child_ptr(&self, search_key: i32) -> PageId {
        self.children[self.child_index(search_key)]
    }

    /// Index of the leftmost child that may hold `search_key`: the number of
    /// separators `< search_key`.
    pub fn leftmost_child_index(&self, search_key: i32) -> usize {
        self.keys.partition_point(|&k| k < search_key)
    }

    /// Insert separator `key` at its sorted position with `child` directly to
    /// its right.
    ///
    /// # Errors
    /// Returns `Error::NodeFull` if the node is at capacity. The node is left
    /// unchanged.
    pub fn insert(&mut self, key: i32, child: PageId) -> Result<()> {
        self.insert_at(self.child_index(key), key, child)
    }

    /// Insert separator `key` as `keys[index]` with `child` as
    /// `children[index + 1]`.
    ///
    /// After child `index` splits, `insert_at(index, promoted, new_page)` puts
    /// the new page directly right of the child it came from, even when equal
    /// separators make the sorted position ambiguous.
    ///
    /// # Errors
    /// Returns `Error::NodeFull` if the node is at capacity, or
    /// `Error::InvalidState` if `index > key_count`. The node is left
    /// unchanged on error.
    pub fn insert_at(&mut self, index: usize, key: i32, child: PageId) -> Result<()> {
        if self.is_full() {
            return Err(Error::NodeFull);
        }
        self.check_index(index)?;

        self.keys.insert(index, key);
        self.children.insert(index + 1, child);
        Ok(())
    }

    /// Split this node with an empty `sibling` and insert `(key, child)` at its
    /// sorted position.
    ///
    /// Returns the promoted middle key; see [`InternalNode::insert_and_split_at`].
    pub fn insert_and_split(
        &mut self,
        key: i32,
        child: PageId,
        sibling: &mut InternalNode,
    ) -> Result<i32> {
        self.insert_and_split_at(self.child_index(key), key, child, sibling)
    }

    /// Split this node with an empty `sibling`, then insert `(key, child)` at
    /// position `index` (numbered as in [`InternalNode::insert_at`] before the
    /// split).
    ///
    /// With `n` keys and `mid = n / 2`, `keys[mid]` is promoted and kept in
    /// neither half. This node keeps `keys[..mid]` and `children[..=mid]`; the
    /// sibling takes `keys[mid + 1..]` and `children[mid + 1..]`. The new pair
    /// then goes left when `index <= mid`, right otherwise.
    ///
    /// # Errors
    /// Returns `Error::InvalidState` if `sibling` is not empty, this node has
    /// fewer than three keys, or `index > key_count`.
    pub fn insert_and_split_at(
        &mut self,
        index: usize,
        key: i32,
        child: PageId,
        sibling: &mut InternalNode,
    ) -> Result<i32> {
        if !sibling.is_empty() {
            return Err(Error::InvalidState(
                "internal split sibling must be empty".to_string(),
            ));
        }
        if self.keys.len() < 3 {
            return Err(Error::InvalidState(format!(
                "cannot split an internal node with {} keys",
                self.keys.len()
            )));
        }
        self.check_index(index)?;

        let mid = self.keys.len() / 2;
        sibling.keys = self.keys.split_off(mid + 1);
        sibling.children = self.children.split_off(mid + 1);
        let mid_key = self.keys.pop().ok_or_else(|| {
            Error::InvalidState("internal split lost its middle key".to_string())
        })?;

        if index <= mid {
            self.keys.insert(index, key);
            self.children.insert(index + 1, child);
        } else {
            let index = index - mid - 1;
            sibling.keys.insert(index, key);
            sibling.children.insert(index + 1, child);
        }

        Ok(mid_key)
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index > self.keys.len() {
            return Err(Error::InvalidState(format!(
                "separator index {} out of range for {} keys",
                index,
                self.keys.len()
            )));
        }
        Ok(())
    }
}
