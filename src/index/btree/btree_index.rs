//! The B+tree index: insertion with split propagation, lookup, and scans.

use std::ops::{Bound, RangeBounds};
use std::path::Path;

use crate::common::{Error, IndexConfig, PageId, RecordId, Result};
use crate::index::btree::cursor::{IndexCursor, RangeScan};
use crate::index::btree::header::TreeHeader;
use crate::index::btree::internal_node::InternalNode;
use crate::index::btree::leaf_node::LeafNode;
use crate::storage::page::Page;
use crate::storage::{DiskManager, PageStore};

/// How an index is opened.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum OpenMode {
    /// Lookups only; mutation fails with `Error::ReadOnly`.
    Read,
    /// Lookups and inserts; a missing file is created.
    #[default]
    Write,
}

/// Result of inserting into a subtree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InsertOutcome {
    /// The subtree absorbed the entry.
    Inserted,
    /// The subtree's root split; `right` must be linked into the parent
    /// directly after the child that was descended into.
    Split { promoted_key: i32, right: PageId },
}

/// Pages modified by one insert.
///
/// Nothing reaches the page store until the whole promotion chain is known.
/// Pages allocated by this insert are written first; until one of the
/// existing pages is overwritten, nothing reachable from the header has
/// changed. Existing pages follow, children before parents, header last.
#[derive(Default)]
struct WriteBatch {
    allocated: Vec<(PageId, Page)>,
    overwritten: Vec<(PageId, Page)>,
}

impl WriteBatch {
    /// Queue a page allocated by this insert.
    fn push_new(&mut self, page_id: PageId, page: Page) {
        self.allocated.push((page_id, page));
    }

    /// Queue a page that is already part of the tree, or the header.
    fn push_existing(&mut self, page_id: PageId, page: Page) {
        self.overwritten.push((page_id, page));
    }
}

/// A single-key B+tree over a [`PageStore`].
///
/// # Architecture
/// ```text
///   page 0: header { root, height }
///
///              [ internal ]                 height 3
///             /     |      \
///      [internal] [internal] [internal]     height 2
///       /   \       /   \       /   \
///    [leaf]→[leaf]→[leaf]→[leaf]→[leaf]→... leaves, chained in key order
/// ```
///
/// Height 0 is an empty tree, height 1 means the root is a leaf. Height grows
/// only when the root splits, by exactly one level.
///
/// # Usage
/// ```
/// use pagetree::{BTreeIndex, IndexConfig, MemoryPageStore, OpenMode, RecordId};
///
/// let mut index = BTreeIndex::with_store(
///     MemoryPageStore::new(),
///     OpenMode::Write,
///     IndexConfig::default(),
/// )?;
/// index.insert(20, RecordId::new(1, 0))?;
/// index.insert(10, RecordId::new(1, 1))?;
///
/// let mut cursor = index.locate(15)?;
/// assert_eq!(index.read_forward(&mut cursor)?, (20, RecordId::new(1, 0)));
/// # Ok::<(), pagetree::Error>(())
/// ```
pub struct BTreeIndex<S: PageStore = DiskManager> {
    store: S,
    config: IndexConfig,
    mode: OpenMode,
    root: PageId,
    height: u32,
    /// An insert failed while overwriting existing pages; the pages on the
    /// store may no longer match `root`/`height`.
    poisoned: bool,
}

impl BTreeIndex<DiskManager> {
    /// Open the index file at `path`.
    ///
    /// In `Write` mode the file is created if it does not exist. In `Read`
    /// mode it must exist.
    ///
    /// Node capacities are fixed when the file is created and recorded in the
    /// header page; `config` must use the same `leaf_capacity` and
    /// `internal_capacity` on every later open.
    ///
    /// # Errors
    /// Returns an error if the file cannot be opened, the config is invalid
    /// or differs from the recorded capacities, or the header page is
    /// corrupted.
    pub fn open<P: AsRef<Path>>(path: P, mode: OpenMode, config: IndexConfig) -> Result<Self> {
        let store = match mode {
            OpenMode::Read => DiskManager::open_read_only(&path)?,
            OpenMode::Write => {
                let mut dm = DiskManager::open_or_create(&path)?;
                dm.set_sync_on_write(config.sync_on_write);
                dm
            }
        };
        tracing::info!(path = %path.as_ref().display(), ?mode, "opening index file");
        Self::with_store(store, mode, config)
    }
}

impl<S: PageStore> BTreeIndex<S> {
    /// Open an index over an existing page store.
    ///
    /// An empty store in `Write` mode gets a fresh header page recording the
    /// config's node capacities. A non-empty store has its root and height
    /// restored from page 0, and its recorded capacities must match `config`.
    ///
    /// # Errors
    /// Returns `Error::InvalidConfig` for a bad or mismatched config, or an
    /// error reading or writing the header page.
    pub fn with_store(mut store: S, mode: OpenMode, config: IndexConfig) -> Result<Self> {
        config.validate()?;

        let header = if store.page_count() == 0 {
            let header = TreeHeader::EMPTY.with_capacities(&config);
            if mode == OpenMode::Write {
                let page_id = store.allocate_page()?;
                if page_id != PageId::HEADER {
                    return Err(Error::corrupted(
                        page_id.0,
                        "empty store did not allocate the header page first",
                    ));
                }
                store.write_page(PageId::HEADER, &header.to_page())?;
            }
            header
        } else {
            let header = TreeHeader::from_page(&store.read_page(PageId::HEADER)?)?;
            header.check_config(&config)?;
            header
        };

        if header.height > 0 && header.root.0 >= store.page_count() {
            return Err(Error::corrupted(
                PageId::HEADER.0,
                format!("root {} beyond end of store", header.root),
            ));
        }

        tracing::info!(root = %header.root, height = header.height, "index opened");
        Ok(Self {
            store,
            config,
            mode,
            root: header.root,
            height: header.height,
            poisoned: false,
        })
    }

    /// Rewrite the header, flush the store, and close the index.
    pub fn close(self) -> Result<()> {
        self.into_store().map(drop)
    }

    /// Rewrite the header, flush, and hand back the page store.
    pub fn into_store(mut self) -> Result<S> {
        self.flush()?;
        tracing::info!(root = %self.root, height = self.height, "index closed");
        Ok(self.store)
    }

    /// Rewrite the header page and make all writes durable.
    pub fn flush(&mut self) -> Result<()> {
        if self.mode == OpenMode::Write {
            self.store
                .write_page(PageId::HEADER, &self.header().to_page())?;
        }
        self.store.flush()
    }

    /// Number of levels from root to leaf; 0 for an empty tree.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Page id of the root, or `PageId::INVALID` for an empty tree.
    #[inline]
    pub fn root_page_id(&self) -> PageId {
        self.root
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.height == 0
    }

    #[inline]
    pub fn config(&self) -> &IndexConfig {
        &self.config
    }

    #[inline]
    pub fn mode(&self) -> OpenMode {
        self.mode
    }

    /// Whether an earlier insert failed after it began overwriting existing
    /// pages. A poisoned index rejects further inserts; reopen the file and
    /// run [`verify`](Self::verify) to inspect it.
    #[inline]
    pub fn is_poisoned(&self) -> bool {
        self.poisoned
    }

    /// The underlying page store.
    #[inline]
    pub fn store(&self) -> &S {
        &self.store
    }

    #[cfg(test)]
    pub(crate) fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    fn header(&self) -> TreeHeader {
        self.header_for(self.root, self.height)
    }

    fn header_for(&self, root: PageId, height: u32) -> TreeHeader {
        TreeHeader::new(root, height).with_capacities(&self.config)
    }

    /// Write `batch`: allocated pages first, then existing pages.
    ///
    /// A failure among the allocated pages leaves the tree untouched. A
    /// failure once existing pages are being overwritten poisons the index.
    fn commit(&mut self, batch: WriteBatch) -> Result<()> {
        for (page_id, page) in &batch.allocated {
            self.store.write_page(*page_id, page)?;
        }
        for (page_id, page) in &batch.overwritten {
            if let Err(e) = self.store.write_page(*page_id, page) {
                self.poisoned = true;
                tracing::error!(
                    page = %page_id,
                    error = %e,
                    "insert failed while overwriting tree pages; index poisoned"
                );
                return Err(e);
            }
        }
        Ok(())
    }

    pub(super) fn read_leaf(&mut self, page_id: PageId) -> Result<LeafNode> {
        let page = self.store.read_page(page_id)?;
        LeafNode::from_page(page_id, &page, self.config.leaf_capacity)
    }

    pub(super) fn read_internal(&mut self, page_id: PageId) -> Result<InternalNode> {
        let page = self.store.read_page(page_id)?;
        InternalNode::from_page(page_id, &page, self.config.internal_capacity)
    }

    // ========================================================================
    // Insert
    // ========================================================================

    /// Insert `(key, rid)`.
    ///
    /// Duplicate keys are allowed; equal keys are returned by scans in
    /// insertion order. Every page the insert touches is written before this
    /// returns, and the in-memory root and height only change once all of
    /// those writes have succeeded.
    ///
    /// If a write fails before any existing page is overwritten, the tree is
    /// unchanged and later inserts proceed normally. If it fails afterwards,
    /// the index is poisoned.
    ///
    /// # Errors
    /// Returns `Error::ReadOnly` in `Read` mode, `Error::InvalidState` once
    /// the index is poisoned, or the page store's error if a read,
    /// allocation, or write fails.
    pub fn insert(&mut self, key: i32, rid: RecordId) -> Result<()> {
        if self.mode == OpenMode::Read {
            return Err(Error::ReadOnly);
        }
        if self.poisoned {
            return Err(Error::InvalidState(
                "index poisoned by an interrupted insert".to_string(),
            ));
        }

        let mut batch = WriteBatch::default();

        if self.height == 0 {
            let page_id = self.store.allocate_page()?;
            let mut leaf = LeafNode::new(self.config.leaf_capacity);
            leaf.insert(key, rid)?;
            batch.push_new(page_id, leaf.to_page());
            batch.push_existing(PageId::HEADER, self.header_for(page_id, 1).to_page());
            self.commit(batch)?;

            tracing::debug!(root = %page_id, "created leaf root");
            self.root = page_id;
            self.height = 1;
            return Ok(());
        }

        let (root, height) = match self.insert_into(self.root, 1, key, rid, &mut batch)? {
            InsertOutcome::Inserted => (self.root, self.height),
            InsertOutcome::Split {
                promoted_key,
                right,
            } => {
                let new_root = self.store.allocate_page()?;
                let node = InternalNode::new_root(
                    self.config.internal_capacity,
                    self.root,
                    promoted_key,
                    right,
                );
                batch.push_new(new_root, node.to_page());
                batch.push_existing(
                    PageId::HEADER,
                    self.header_for(new_root, self.height + 1).to_page(),
                );
                tracing::info!(
                    old_root = %self.root,
                    new_root = %new_root,
                    promoted_key,
                    height = self.height + 1,
                    "root split"
                );
                (new_root, self.height + 1)
            }
        };

        self.commit(batch)?;
        self.root = root;
        self.height = height;
        Ok(())
    }

    /// Insert into the subtree rooted at `page_id`, which sits at `depth`
    /// (1 = root, `height` = leaf level).
    fn insert_into(
        &mut self,
        page_id: PageId,
        depth: u32,
        key: i32,
        rid: RecordId,
        batch: &mut WriteBatch,
    ) -> Result<InsertOutcome> {
        if depth == self.height {
            return self.insert_into_leaf(page_id, key, rid, batch);
        }

        let mut node = self.read_internal(page_id)?;
        let index = node.child_index(key);
        let child = node.child_at(index);

        let (promoted_key, right) = match self.insert_into(child, depth + 1, key, rid, batch)? {
            InsertOutcome::Inserted => return Ok(InsertOutcome::Inserted),
            InsertOutcome::Split {
                promoted_key,
                right,
            } => (promoted_key, right),
        };

        match node.insert_at(index, promoted_key, right) {
            Ok(()) => {
                batch.push_existing(page_id, node.to_page());
                Ok(InsertOutcome::Inserted)
            }
            Err(Error::NodeFull) => {
                let sibling_id = self.store.allocate_page()?;
                let mut sibling = InternalNode::new(self.config.internal_capacity);
                let mid_key =
                    node.insert_and_split_at(index, promoted_key, right, &mut sibling)?;

                tracing::debug!(
                    page = %page_id,
                    sibling = %sibling_id,
                    mid_key,
                    depth,
                    "internal node split"
                );
                batch.push_new(sibling_id, sibling.to_page());
                batch.push_existing(page_id, node.to_page());
                Ok(InsertOutcome::Split {
                    promoted_key: mid_key,
                    right: sibling_id,
                })
            }
            Err(e) => Err(e),
        }
    }

    fn insert_into_leaf(
        &mut self,
        page_id: PageId,
        key: i32,
        rid: RecordId,
        batch: &mut WriteBatch,
    ) -> Result<InsertOutcome> {
        let mut leaf = self.read_leaf(page_id)?;

        match leaf.insert(key, rid) {
            Ok(()) => {
                batch.push_existing(page_id, leaf.to_page());
                Ok(InsertOutcome::Inserted)
            }
            Err(Error::NodeFull) => {
                let sibling_id = self.store.allocate_page()?;
                let mut sibling = LeafNode::new(self.config.leaf_capacity);
                let separator = leaf.insert_and_split(key, rid, &mut sibling, sibling_id)?;

                tracing::debug!(
                    page = %page_id,
                    sibling = %sibling_id,
                    separator,
                    "leaf split"
                );
                batch.push_new(sibling_id, sibling.to_page());
                batch.push_existing(page_id, leaf.to_page());
                Ok(InsertOutcome::Split {
                    promoted_key: separator,
                    right: sibling_id,
                })
            }
            Err(e) => Err(e),
        }
    }

    // ========================================================================
    // Lookup
    // ========================================================================

    /// Cursor at the first entry whose key is `>= search_key`.
    ///
    /// Among equal keys the cursor lands on the earliest inserted one.
    ///
    /// # Errors
    /// Returns `Error::NotFound` if the tree is empty (without reading any
    /// page) or every key is smaller than `search_key`.
    pub fn locate(&mut self, search_key: i32) -> Result<IndexCursor> {
        if self.height == 0 {
            return Err(Error::NotFound);
        }

        let mut page_id = self.root;
        for _ in 1..self.height {
            let node = self.read_internal(page_id)?;
            page_id = node.child_at(node.leftmost_child_index(search_key));
        }

        let leaf = self.read_leaf(page_id)?;
        match leaf.search(search_key) {
            Ok(slot) => Ok(IndexCursor::new(page_id, slot)),
            // Everything here is smaller; the next leaf starts at or above
            // the separator that routed us left
            Err(_) => leaf
                .next_leaf()
                .map(|next| IndexCursor::new(next, 0))
                .ok_or(Error::NotFound),
        }
    }

    /// Cursor at the smallest entry.
    ///
    /// # Errors
    /// Returns `Error::NotFound` if the tree is empty.
    pub fn first(&mut self) -> Result<IndexCursor> {
        self.locate(i32::MIN)
    }

    /// Read the entry under `cursor` and advance it.
    ///
    /// Past the last slot of a leaf the cursor moves to slot 0 of the next
    /// leaf, and past the last leaf it becomes [`IndexCursor::END`].
    ///
    /// # Errors
    /// Returns `Error::NotFound` if the cursor is at the end or its slot is
    /// out of range, or the page store's error.
    pub fn read_forward(&mut self, cursor: &mut IndexCursor) -> Result<(i32, RecordId)> {
        if cursor.is_end() {
            return Err(Error::NotFound);
        }

        let leaf = self.read_leaf(cursor.page_id)?;
        let entry = leaf.read_entry(cursor.slot)?;

        cursor.slot += 1;
        if cursor.slot >= leaf.key_count() {
            *cursor = leaf
                .next_leaf()
                .map_or(IndexCursor::END, |next| IndexCursor::new(next, 0));
        }

        Ok(entry)
    }

    /// Iterate over the entries whose keys fall in `range`, in key order.
    ///
    /// ```
    /// # use pagetree::{BTreeIndex, IndexConfig, MemoryPageStore, OpenMode, RecordId};
    /// # let mut index = BTreeIndex::with_store(MemoryPageStore::new(), OpenMode::Write, IndexConfig::default())?;
    /// for key in [5, 1, 9, 3] {
    ///     index.insert(key, RecordId::new(0, key))?;
    /// }
    /// let keys: Vec<i32> = index
    ///     .scan(2..9)?
    ///     .map(|entry| entry.map(|(key, _)| key))
    ///     .collect::<pagetree::Result<_>>()?;
    /// assert_eq!(keys, vec![3, 5]);
    /// # Ok::<(), pagetree::Error>(())
    /// ```
    ///
    /// # Errors
    /// Returns the page store's error while positioning the scan.
    pub fn scan<R: RangeBounds<i32>>(&mut self, range: R) -> Result<RangeScan<'_, S>> {
        let start = match range.start_bound() {
            Bound::Included(&key) => Some(key),
            Bound::Excluded(&key) => key.checked_add(1),
            Bound::Unbounded => Some(i32::MIN),
        };
        let end = range.end_bound().cloned();

        let cursor = match start {
            Some(key) => match self.locate(key) {
                Ok(cursor) => cursor,
                Err(Error::NotFound) => IndexCursor::END,
                Err(e) => return Err(e),
            },
            None => IndexCursor::END,
        };

        Ok(RangeScan::new(self, cursor, end))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryPageStore;

    fn small_index(leaf: usize, internal: usize) -> BTreeIndex<MemoryPageStore> {
        let config = IndexConfig::default()
            .with_leaf_capacity(leaf)
            .with_internal_capacity(internal);
        BTreeIndex::with_store(MemoryPageStore::new(), OpenMode::Write, config).unwrap()
    }

    fn all_keys(index: &mut BTreeIndex<MemoryPageStore>) -> Vec<i32> {
        index
            .scan(..)
            .unwrap()
            .map(|e| e.unwrap().0)
            .collect()
    }

    #[test]
    fn test_new_index_is_empty() {
        let index = small_index(4, 3);
        assert!(index.is_empty());
        assert_eq!(index.height(), 0);
        assert_eq!(index.root_page_id(), PageId::INVALID);
        // Header page only
        assert_eq!(index.store().page_count(), 1);
    }

    #[test]
    fn test_first_insert_creates_leaf_root() {
        let mut index = small_index(4, 3);
        index.insert(7, RecordId::new(1, 1)).unwrap();

        assert_eq!(index.height(), 1);
        assert_eq!(index.root_page_id(), PageId::new(1));

        let mut cursor = index.locate(7).unwrap();
        assert_eq!(cursor, IndexCursor::new(PageId::new(1), 0));
        assert_eq!(index.read_forward(&mut cursor).unwrap(), (7, RecordId::new(1, 1)));
        assert!(cursor.is_end());
        assert!(matches!(index.read_forward(&mut cursor), Err(Error::NotFound)));
    }

    #[test]
    fn test_leaf_root_split_grows_height() {
        let mut index = small_index(4, 3);
        for (i, key) in [10, 20, 30, 40, 50].into_iter().enumerate() {
            index.insert(key, RecordId::new(1, i as i32)).unwrap();
        }

        assert_eq!(index.height(), 2);
        let root = index.root_page_id();
        let node = index.read_internal(root).unwrap();
        assert_eq!(node.keys(), &[30]);

        let left = index.read_leaf(node.child_at(0)).unwrap();
        let right = index.read_leaf(node.child_at(1)).unwrap();
        assert_eq!(left.next_leaf(), Some(node.child_at(1)));
        assert_eq!(right.first_key(), Some(30));
        assert_eq!(right.key_count(), 3);
    }

    #[test]
    fn test_internal_split_propagates_to_new_root() {
        let mut index = small_index(2, 3);
        let mut last_height = 0;
        for key in 0..64 {
            index.insert(key, RecordId::new(0, key)).unwrap();
            assert!(index.height() >= last_height);
            assert!(index.height() <= last_height + 1);
            last_height = index.height();
        }

        assert!(index.height() >= 4);
        assert_eq!(all_keys(&mut index), (0..64).collect::<Vec<_>>());
    }

    #[test]
    fn test_locate_past_leaf_end_moves_to_next_leaf() {
        let mut index = small_index(4, 3);
        for key in [10, 20, 30, 40, 50] {
            index.insert(key, RecordId::default()).unwrap();
        }

        // 25 routes to the left leaf [10, 20] which has nothing >= 25
        let mut cursor = index.locate(25).unwrap();
        assert_eq!(cursor.slot, 0);
        assert_eq!(index.read_forward(&mut cursor).unwrap().0, 30);

        assert!(matches!(index.locate(51), Err(Error::NotFound)));
    }

    #[test]
    fn test_locate_empty_tree_reads_nothing() {
        let mut index = small_index(4, 3);
        let reads = index.store().reads();

        assert!(matches!(index.locate(1), Err(Error::NotFound)));
        assert!(matches!(index.first(), Err(Error::NotFound)));
        assert_eq!(index.store().reads(), reads);
        assert_eq!(index.scan(..).unwrap().count(), 0);
    }

    #[test]
    fn test_insert_without_split_writes_only_the_leaf() {
        let mut index = small_index(4, 3);
        for key in [10, 20, 30, 40, 50] {
            index.insert(key, RecordId::default()).unwrap();
        }

        let writes = index.store().writes();
        index.insert(15, RecordId::default()).unwrap();
        assert_eq!(index.store().writes(), writes + 1);
    }

    /// Four keys in a capacity-4 root leaf; the next insert splits it and
    /// writes sibling, new root, leaf, header in that order.
    fn full_root_leaf() -> BTreeIndex<MemoryPageStore> {
        let mut index = small_index(4, 3);
        for key in [10, 20, 30, 40] {
            index.insert(key, RecordId::default()).unwrap();
        }
        index
    }

    #[test]
    fn test_failed_write_of_new_pages_leaves_tree_intact() {
        let mut index = full_root_leaf();
        let root = index.root_page_id();

        // Sibling lands, new root fails; no existing page was touched
        index.store.fail_writes_after(1);
        let err = index.insert(50, RecordId::default()).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
        assert_eq!(index.height(), 1);
        assert_eq!(index.root_page_id(), root);
        assert!(!index.is_poisoned());

        index.store.clear_write_failures();
        index.insert(60, RecordId::default()).unwrap();

        assert_eq!(all_keys(&mut index), vec![10, 20, 30, 40, 60]);
        let stats = index.verify().unwrap();
        assert_eq!(stats.entries, 5);
        assert_eq!(stats.height, 2);
    }

    #[test]
    fn test_failed_overwrite_poisons_index() {
        let mut index = full_root_leaf();
        let root = index.root_page_id();

        // Both new pages land, the overwrite of the old leaf fails
        index.store.fail_writes_after(2);
        assert!(matches!(
            index.insert(50, RecordId::default()),
            Err(Error::Io(_))
        ));
        assert!(index.is_poisoned());
        assert_eq!(index.height(), 1);
        assert_eq!(index.root_page_id(), root);

        index.store.clear_write_failures();
        assert!(matches!(
            index.insert(60, RecordId::default()),
            Err(Error::InvalidState(_))
        ));

        // The failed write never reached the store, so the old tree still reads back
        assert_eq!(all_keys(&mut index), vec![10, 20, 30, 40]);
        index.verify().unwrap();
    }

    #[test]
    fn test_half_written_split_is_caught_by_verify() {
        let mut index = full_root_leaf();

        // New pages and the old leaf land, the header does not
        index.store.fail_writes_after(3);
        assert!(index.insert(50, RecordId::default()).is_err());
        assert!(index.is_poisoned());
        assert_eq!(index.height(), 1);

        index.store.clear_write_failures();
        assert!(matches!(
            index.insert(60, RecordId::default()),
            Err(Error::InvalidState(_))
        ));
        assert!(matches!(index.verify(), Err(Error::Corrupted { .. })));
    }

    #[test]
    fn test_reopen_with_other_capacity_rejected() {
        let mut index = small_index(4, 3);
        index.insert(1, RecordId::default()).unwrap();
        let store = index.into_store().unwrap();

        let config = IndexConfig::default()
            .with_leaf_capacity(8)
            .with_internal_capacity(3);
        let result = BTreeIndex::with_store(store, OpenMode::Read, config);
        assert!(matches!(result, Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_read_mode_rejects_insert() {
        let mut index = small_index(4, 3);
        index.insert(1, RecordId::default()).unwrap();
        let store = index.into_store().unwrap();

        let config = IndexConfig::default()
            .with_leaf_capacity(4)
            .with_internal_capacity(3);
        let mut index = BTreeIndex::with_store(store, OpenMode::Read, config).unwrap();
        assert_eq!(index.height(), 1);
        assert!(matches!(
            index.insert(2, RecordId::default()),
            Err(Error::ReadOnly)
        ));
        assert_eq!(all_keys(&mut index), vec![1]);
    }

    #[test]
    fn test_read_mode_on_empty_store() {
        let index =
            BTreeIndex::with_store(MemoryPageStore::new(), OpenMode::Read, IndexConfig::default())
                .unwrap();
        assert!(index.is_empty());
        assert_eq!(index.store().page_count(), 0);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = IndexConfig::default().with_leaf_capacity(1);
        let result = BTreeIndex::with_store(MemoryPageStore::new(), OpenMode::Write, config);
        assert!(matches!(result, Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_scan_bounds() {
        let mut index = small_index(3, 3);
        for key in (0..30).rev() {
            index.insert(key, RecordId::new(0, key)).unwrap();
        }

        fn collect(scan: RangeScan<'_, MemoryPageStore>) -> Vec<i32> {
            scan.map(|e| e.unwrap().0).collect()
        }
        assert_eq!(collect(index.scan(5..9).unwrap()), vec![5, 6, 7, 8]);
        assert_eq!(collect(index.scan(5..=9).unwrap()), vec![5, 6, 7, 8, 9]);
        assert_eq!(collect(index.scan(27..).unwrap()), vec![27, 28, 29]);
        assert_eq!(collect(index.scan(..2).unwrap()), vec![0, 1]);
        assert_eq!(
            collect(index.scan((Bound::Excluded(28), Bound::Unbounded)).unwrap()),
            vec![29]
        );
        assert!(collect(index.scan(40..).unwrap()).is_empty());
        assert!(
            collect(index.scan((Bound::Excluded(i32::MAX), Bound::Unbounded)).unwrap()).is_empty()
        );
    }
}
