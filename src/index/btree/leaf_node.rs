//! B+tree leaf node.
//!
//! A leaf holds `(key, RecordId)` entries in key order plus a pointer to the
//! next leaf, so that all leaves form one ordered chain.

use crate::common::config::{LEAF_ENTRY_SIZE, MAX_LEAF_CAPACITY, NODE_HEADER_SIZE};
use crate::common::{Error, PageId, RecordId, Result};
use crate::storage::page::{Page, PageHeader, PageType};

/// One `(key, RecordId)` pair stored in a leaf.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeafEntry {
    pub key: i32,
    pub rid: RecordId,
}

impl LeafEntry {
    pub fn new(key: i32, rid: RecordId) -> Self {
        Self { key, rid }
    }
}

/// Decoded leaf page.
///
/// # Page Layout
/// ```text
/// Offset           Size   Field
/// ------           ----   -----
/// 0                8      PageHeader (type = BTreeLeaf, checksum)
/// 8                4      entry_count
/// 12 + 12*i        8      entries[i].rid  (page_id, slot_id)
/// 20 + 12*i        4      entries[i].key
/// 4092             4      next_leaf (0 = last leaf)
/// ```
///
/// The entry region is sized for [`MAX_LEAF_CAPACITY`] regardless of the
/// configured capacity, so `next_leaf` always sits at the same offset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeafNode {
    entries: Vec<LeafEntry>,
    next_leaf: Option<PageId>,
    capacity: usize,
}

impl LeafNode {
    const OFFSET_COUNT: usize = NODE_HEADER_SIZE;
    const OFFSET_ENTRIES: usize = Self::OFFSET_COUNT + 4;
    const OFFSET_NEXT_LEAF: usize = Self::OFFSET_ENTRIES + MAX_LEAF_CAPACITY * LEAF_ENTRY_SIZE;

    /// Create an empty leaf holding at most `capacity` entries.
    ///
    /// `capacity` is clamped to what fits in a page.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.min(MAX_LEAF_CAPACITY);
        Self {
            entries: Vec::with_capacity(capacity),
            next_leaf: None,
            capacity,
        }
    }

    /// Decode a leaf from `page`.
    ///
    /// # Errors
    /// Returns `Error::Corrupted` if the page is not a leaf, fails its
    /// checksum, or stores more entries than `capacity`.
    pub fn from_page(page_id: PageId, page: &Page, capacity: usize) -> Result<Self> {
        let header = page.header();
        if header.page_type != PageType::BTreeLeaf {
            return Err(Error::corrupted(
                page_id.0,
                format!("expected leaf page, found {:?}", header.page_type),
            ));
        }
        if !header.verify_checksum(page.as_slice()) {
            tracing::warn!(%page_id, "leaf page failed checksum verification");
            return Err(Error::corrupted(page_id.0, "checksum mismatch"));
        }

        let capacity = capacity.min(MAX_LEAF_CAPACITY);
        let count = page.read_u32(Self::OFFSET_COUNT) as usize;
        if count > capacity {
            return Err(Error::corrupted(
                page_id.0,
                format!("leaf holds {} entries, capacity is {}", count, capacity),
            ));
        }

        let entries = (0..count)
            .map(|slot| {
                let offset = Self::entry_offset(slot);
                let rid = RecordId::from_bytes(&page.as_slice()[offset..]);
                let key = page.read_i32(offset + RecordId::SIZE);
                LeafEntry::new(key, rid)
            })
            .collect();

        let next = page.read_u32(Self::OFFSET_NEXT_LEAF);
        let next_leaf = (next != 0).then_some(PageId::new(next));

        Ok(Self {
            entries,
            next_leaf,
            capacity,
        })
    }

    /// Encode this leaf into a fresh page with a valid checksum.
    pub fn to_page(&self) -> Page {
        let mut page = Page::new();
        page.set_header(&PageHeader::new(PageType::BTreeLeaf));
        page.write_u32(Self::OFFSET_COUNT, self.entries.len() as u32);

        for (slot, entry) in self.entries.iter().enumerate() {
            let offset = Self::entry_offset(slot);
            entry.rid.write_to(&mut page.as_mut_slice()[offset..]);
            page.write_i32(offset + RecordId::SIZE, entry.key);
        }

        page.write_u32(
            Self::OFFSET_NEXT_LEAF,
            self.next_leaf.map_or(0, |next| next.0),
        );
        page.update_checksum();
        page
    }

    #[inline]
    fn entry_offset(slot: usize) -> usize {
        Self::OFFSET_ENTRIES + slot * LEAF_ENTRY_SIZE
    }

    /// Number of entries stored.
    #[inline]
    pub fn key_count(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.entries.len() >= self.capacity
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Entries in key order.
    #[inline]
    pub fn entries(&self) -> &[LeafEntry] {
        &self.entries
    }

    /// Smallest key, if any.
    pub fn first_key(&self) -> Option<i32> {
        self.entries.first().map(|e| e.key)
    }

    /// Largest key, if any.
    pub fn last_key(&self) -> Option<i32> {
        self.entries.last().map(|e| e.key)
    }

    /// Ordered search for `search_key`.
    ///
    /// Returns `Ok(slot)` for the first slot whose key is `>= search_key`, or
    /// `Err(key_count)` when every stored key is smaller.
    pub fn search(&self, search_key: i32) -> std::result::Result<usize, usize> {
        let slot = self.entries.partition_point(|e| e.key < search_key);
        if slot < self.entries.len() {
            Ok(slot)
        } else {
            Err(slot)
        }
    }

    /// First slot whose key is `>= search_key`.
    ///
    /// # Errors
    /// Returns `Error::NotFound` when every stored key is smaller.
    pub fn locate(&self, search_key: i32) -> Result<usize> {
        self.search(search_key).map_err(|_| Error::NotFound)
    }

    /// Insert an entry in key order.
    ///
    /// Equal keys stay in insertion order: the new entry goes after any
    /// existing entries with the same key.
    ///
    /// # Errors
    /// Returns `Error::NodeFull` if the leaf is at capacity. The leaf is left
    /// unchanged.
    pub fn insert(&mut self, key: i32, rid: RecordId) -> Result<()> {
        if self.is_full() {
            return Err(Error::NodeFull);
        }
        self.insert_entry(LeafEntry::new(key, rid));
        Ok(())
    }

    fn insert_entry(&mut self, entry: LeafEntry) {
        let slot = match self.search(entry.key) {
            // Skip past the run of equal keys
            Ok(first) => first + self.entries[first..].partition_point(|e| e.key <= entry.key),
            Err(end) => end,
        };
        self.entries.insert(slot, entry);
    }

    /// Split this leaf with an empty `sibling` and insert `(key, rid)`.
    ///
    /// Entries from `key_count / 2` onward move to `sibling`, which takes over
    /// this leaf's next pointer; this leaf then points at `sibling_page_id`.
    /// The new entry lands in the sibling when `key >= sibling.first_key()`,
    /// otherwise here.
    ///
    /// Returns the sibling's first key, the separator for the parent.
    ///
    /// # Errors
    /// Returns `Error::InvalidState` if `sibling` is not empty or this leaf
    /// has fewer than two entries.
    pub fn insert_and_split(
        &mut self,
        key: i32,
        rid: RecordId,
        sibling: &mut LeafNode,
        sibling_page_id: PageId,
    ) -> Result<i32> {
        if !sibling.is_empty() {
            return Err(Error::InvalidState(
                "leaf split sibling must be empty".to_string(),
            ));
        }
        if self.entries.len() < 2 {
            return Err(Error::InvalidState(format!(
                "cannot split a leaf with {} entries",
                self.entries.len()
            )));
        }

        let mid = self.entries.len() / 2;
        sibling.entries = self.entries.split_off(mid);
        sibling.next_leaf = self.next_leaf;
        self.next_leaf = Some(sibling_page_id);

        let entry = LeafEntry::new(key, rid);
        if key >= sibling.entries[0].key {
            sibling.insert_entry(entry);
        } else {
            self.insert_entry(entry);
        }

        Ok(sibling.entries[0].key)
    }

    /// Entry at `slot`.
    ///
    /// # Errors
    /// Returns `Error::NotFound` if `slot >= key_count`.
    pub fn read_entry(&self, slot: usize) -> Result<(i32, RecordId)> {
        self.entries
            .get(slot)
            .map(|e| (e.key, e.rid))
            .ok_or(Error::NotFound)
    }

    /// Next leaf in key order, `None` for the last leaf.
    #[inline]
    pub fn next_leaf(&self) -> Option<PageId> {
        self.next_leaf
    }

    #[inline]
    pub fn set_next_leaf(&mut self, next: Option<PageId>) {
        self.next_leaf = next;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rid(n: i32) -> RecordId {
        RecordId::new(1, n)
    }

    fn leaf_with(capacity: usize, keys: &[i32]) -> LeafNode {
        let mut leaf = LeafNode::new(capacity);
        for (i, &k) in keys.iter().enumerate() {
            leaf.insert(k, rid(i as i32)).unwrap();
        }
        leaf
    }

    fn keys(leaf: &LeafNode) -> Vec<i32> {
        leaf.entries().iter().map(|e| e.key).collect()
    }

    #[test]
    fn test_insert_keeps_order() {
        let leaf = leaf_with(8, &[30, 10, 20, 40, 5]);
        assert_eq!(keys(&leaf), vec![5, 10, 20, 30, 40]);
        assert_eq!(leaf.key_count(), 5);
        assert_eq!(leaf.first_key(), Some(5));
        assert_eq!(leaf.last_key(), Some(40));
    }

    #[test]
    fn test_duplicates_keep_insertion_order() {
        let mut leaf = LeafNode::new(8);
        leaf.insert(7, rid(0)).unwrap();
        leaf.insert(3, rid(1)).unwrap();
        leaf.insert(7, rid(2)).unwrap();
        leaf.insert(7, rid(3)).unwrap();

        let slots: Vec<(i32, i32)> = leaf.entries().iter().map(|e| (e.key, e.rid.slot_id)).collect();
        assert_eq!(slots, vec![(3, 1), (7, 0), (7, 2), (7, 3)]);
    }

    #[test]
    fn test_insert_full_leaves_node_unchanged() {
        let mut leaf = leaf_with(3, &[1, 2, 3]);
        let before = leaf.clone();

        assert!(matches!(leaf.insert(0, rid(9)), Err(Error::NodeFull)));
        assert_eq!(leaf, before);
    }

    #[test]
    fn test_locate() {
        let leaf = leaf_with(8, &[10, 20, 20, 30]);

        assert_eq!(leaf.locate(5).unwrap(), 0);
        assert_eq!(leaf.locate(10).unwrap(), 0);
        assert_eq!(leaf.locate(15).unwrap(), 1);
        assert_eq!(leaf.locate(20).unwrap(), 1);
        assert_eq!(leaf.locate(30).unwrap(), 3);
        assert!(matches!(leaf.locate(31), Err(Error::NotFound)));
        assert_eq!(leaf.search(31), Err(4));
        assert_eq!(LeafNode::new(4).search(1), Err(0));
    }

    #[test]
    fn test_read_entry() {
        let leaf = leaf_with(4, &[10, 20]);
        assert_eq!(leaf.read_entry(1).unwrap(), (20, rid(1)));
        assert!(matches!(leaf.read_entry(2), Err(Error::NotFound)));
    }

    #[test]
    fn test_split_new_key_goes_right() {
        let mut leaf = leaf_with(4, &[10, 20, 30, 40]);
        leaf.set_next_leaf(Some(PageId::new(9)));
        let mut sibling = LeafNode::new(4);

        let separator = leaf
            .insert_and_split(50, rid(4), &mut sibling, PageId::new(5))
            .unwrap();

        assert_eq!(separator, 30);
        assert_eq!(keys(&leaf), vec![10, 20]);
        assert_eq!(keys(&sibling), vec![30, 40, 50]);
        assert_eq!(leaf.next_leaf(), Some(PageId::new(5)));
        assert_eq!(sibling.next_leaf(), Some(PageId::new(9)));
    }

    #[test]
    fn test_split_new_key_goes_left() {
        let mut leaf = leaf_with(4, &[10, 20, 30, 40]);
        let mut sibling = LeafNode::new(4);

        let separator = leaf
            .insert_and_split(15, rid(4), &mut sibling, PageId::new(5))
            .unwrap();

        assert_eq!(separator, 30);
        assert_eq!(keys(&leaf), vec![10, 15, 20]);
        assert_eq!(keys(&sibling), vec![30, 40]);
        assert_eq!(sibling.next_leaf(), None);
    }

    #[test]
    fn test_split_key_equal_to_separator_goes_right() {
        let mut leaf = leaf_with(5, &[1, 2, 3, 4, 5]);
        let mut sibling = LeafNode::new(5);

        let separator = leaf
            .insert_and_split(3, rid(9), &mut sibling, PageId::new(2))
            .unwrap();

        assert_eq!(separator, 3);
        assert_eq!(keys(&leaf), vec![1, 2]);
        assert_eq!(keys(&sibling), vec![3, 3, 4, 5]);
        // The new duplicate follows the existing 3
        assert_eq!(sibling.entries()[1].rid, rid(9));
    }

    #[test]
    fn test_split_preserves_all_entries() {
        let original = [2, 4, 6, 8, 10, 12, 14];
        let mut leaf = leaf_with(7, &original);
        let mut sibling = LeafNode::new(7);

        leaf.insert_and_split(9, rid(100), &mut sibling, PageId::new(3))
            .unwrap();

        let mut all = keys(&leaf);
        all.extend(keys(&sibling));
        assert_eq!(all, vec![2, 4, 6, 8, 9, 10, 12, 14]);
        assert!(leaf.last_key() < sibling.first_key());
    }

    #[test]
    fn test_split_requires_empty_sibling() {
        let mut leaf = leaf_with(2, &[1, 2]);
        let mut sibling = leaf_with(2, &[7]);

        let result = leaf.insert_and_split(3, rid(3), &mut sibling, PageId::new(4));
        assert!(matches!(result, Err(Error::InvalidState(_))));
        assert_eq!(keys(&leaf), vec![1, 2]);
    }

    #[test]
    fn test_page_roundtrip() {
        let mut leaf = leaf_with(6, &[-3, 0, 7, i32::MAX, i32::MIN]);
        leaf.set_next_leaf(Some(PageId::new(42)));

        let page = leaf.to_page();
        assert_eq!(page.page_type(), PageType::BTreeLeaf);
        assert!(page.verify_checksum());

        let decoded = LeafNode::from_page(PageId::new(1), &page, 6).unwrap();
        assert_eq!(decoded, leaf);

        let mut last = LeafNode::new(6);
        last.insert(1, rid(1)).unwrap();
        let decoded = LeafNode::from_page(PageId::new(1), &last.to_page(), 6).unwrap();
        assert_eq!(decoded.next_leaf(), None);
    }

    #[test]
    fn test_page_layout_offsets() {
        let mut leaf = LeafNode::new(4);
        leaf.insert(0x11, RecordId::new(0x22, 0x33)).unwrap();
        leaf.set_next_leaf(Some(PageId::new(0x44)));
        let page = leaf.to_page();

        assert_eq!(page.read_u32(8), 1); // entry_count
        assert_eq!(page.read_i32(12), 0x22); // rid.page_id
        assert_eq!(page.read_i32(16), 0x33); // rid.slot_id
        assert_eq!(page.read_i32(20), 0x11); // key
        assert_eq!(page.read_u32(4092), 0x44); // next_leaf
    }

    #[test]
    fn test_decode_rejects_bad_pages() {
        let leaf = leaf_with(4, &[1, 2, 3]);

        // Zero page: wrong type
        let err = LeafNode::from_page(PageId::new(2), &Page::new(), 4).unwrap_err();
        assert!(matches!(err, Error::Corrupted { page_id: 2, .. }));

        // Flipped byte: checksum
        let mut page = leaf.to_page();
        page.as_mut_slice()[20] ^= 0xFF;
        assert!(matches!(
            LeafNode::from_page(PageId::new(2), &page, 4),
            Err(Error::Corrupted { .. })
        ));

        // More entries than the configured capacity
        let page = leaf.to_page();
        assert!(matches!(
            LeafNode::from_page(PageId::new(2), &page, 2),
            Err(Error::Corrupted { .. })
        ));
    }
}
