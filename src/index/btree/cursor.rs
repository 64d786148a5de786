//! Cursor positions and range scans over the leaf chain.

use std::ops::Bound;

use crate::common::{Error, PageId, RecordId, Result};
use crate::index::btree::BTreeIndex;
use crate::storage::PageStore;

/// Position of one leaf entry: `(leaf page, slot)`.
///
/// A cursor owns nothing and is only meaningful while the tree is not
/// modified. Once the last entry has been read it becomes [`IndexCursor::END`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexCursor {
    pub page_id: PageId,
    pub slot: usize,
}

impl IndexCursor {
    /// Past the last entry of the tree.
    pub const END: IndexCursor = IndexCursor {
        page_id: PageId::INVALID,
        slot: 0,
    };

    pub fn new(page_id: PageId, slot: usize) -> Self {
        Self { page_id, slot }
    }

    #[inline]
    pub fn is_end(&self) -> bool {
        !self.page_id.is_valid()
    }
}

/// Iterator over `(key, RecordId)` pairs in key order, up to an end bound.
///
/// Created by [`BTreeIndex::scan`]. Yields each entry once; after an error
/// or the end bound it yields nothing more.
pub struct RangeScan<'a, S: PageStore> {
    index: &'a mut BTreeIndex<S>,
    cursor: IndexCursor,
    end: Bound<i32>,
    done: bool,
}

impl<'a, S: PageStore> RangeScan<'a, S> {
    pub(crate) fn new(index: &'a mut BTreeIndex<S>, cursor: IndexCursor, end: Bound<i32>) -> Self {
        Self {
            index,
            done: cursor.is_end(),
            cursor,
            end,
        }
    }

    /// Where the next call to `next` will read.
    pub fn cursor(&self) -> IndexCursor {
        self.cursor
    }

    fn within_end(&self, key: i32) -> bool {
        match self.end {
            Bound::Included(end) => key <= end,
            Bound::Excluded(end) => key < end,
            Bound::Unbounded => true,
        }
    }
}

impl<S: PageStore> Iterator for RangeScan<'_, S> {
    type Item = Result<(i32, RecordId)>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        match self.index.read_forward(&mut self.cursor) {
            Ok((key, rid)) if self.within_end(key) => {
                self.done = self.cursor.is_end();
                Some(Ok((key, rid)))
            }
            Ok(_) | Err(Error::NotFound) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}
