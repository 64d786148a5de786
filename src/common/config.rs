//! Configuration for pagetree.
//!
//! Page geometry is fixed at compile time. Node capacities are chosen per
//! index through [`IndexConfig`], bounded above by what fits in a page.

use crate::common::{Error, Result};

/// Size of a page in bytes (4KB).
///
/// # Memory Layout
/// Page ids are stored as u32 in node pages but the header keeps the root as
/// a signed i32, so every page id must fit in `0..=i32::MAX - 1`:
/// - Max pages: 2^31 - 1 = 2,147,483,647 pages
/// - Max index file size: just under 2^31 × 4KB = 8TB
pub const PAGE_SIZE: usize = 4096;

/// Maximum number of pages a store may hold. Allocation past this fails
/// with `Error::StoreFull`.
pub const MAX_PAGES: u32 = i32::MAX as u32;

/// Maximum index file size in bytes.
pub const MAX_DB_SIZE_BYTES: u64 = MAX_PAGES as u64 * PAGE_SIZE as u64;

/// Bytes of one leaf entry: record page id, record slot id, key.
pub const LEAF_ENTRY_SIZE: usize = 12;

/// Bytes of one internal entry: key, right child page id.
pub const INTERNAL_ENTRY_SIZE: usize = 8;

/// Node page header (type + reserved + checksum).
pub const NODE_HEADER_SIZE: usize = 8;

/// Most leaf entries a page can hold.
///
/// ```text
/// (4096 - 8 header - 4 count - 4 next leaf) / 12 = 340
/// ```
pub const MAX_LEAF_CAPACITY: usize = (PAGE_SIZE - NODE_HEADER_SIZE - 4 - 4) / LEAF_ENTRY_SIZE;

/// Most separator keys an internal page can hold.
///
/// ```text
/// (4096 - 8 header - 4 count - 4 first child) / 8 = 510
/// ```
pub const MAX_INTERNAL_CAPACITY: usize =
    (PAGE_SIZE - NODE_HEADER_SIZE - 4 - 4) / INTERNAL_ENTRY_SIZE;

/// Smallest usable leaf capacity. Each half of a split keeps at least one entry.
pub const MIN_LEAF_CAPACITY: usize = 2;

/// Smallest usable internal capacity. Each half of a split keeps at least one key.
pub const MIN_INTERNAL_CAPACITY: usize = 3;

/// Runtime settings for one index.
///
/// # Example
/// ```
/// use pagetree::IndexConfig;
///
/// let config = IndexConfig::default().with_leaf_capacity(4);
/// assert!(config.validate().is_ok());
/// assert_eq!(config.leaf_capacity, 4);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexConfig {
    /// Entries per leaf before it splits.
    pub leaf_capacity: usize,
    /// Separator keys per internal node before it splits.
    pub internal_capacity: usize,
    /// `fsync` after every page write. When off, durability comes from
    /// `flush()` / `close()`.
    pub sync_on_write: bool,
}

impl IndexConfig {
    /// Set the leaf capacity.
    pub fn with_leaf_capacity(mut self, capacity: usize) -> Self {
        self.leaf_capacity = capacity;
        self
    }

    /// Set the internal node capacity.
    pub fn with_internal_capacity(mut self, capacity: usize) -> Self {
        self.internal_capacity = capacity;
        self
    }

    /// Enable or disable `fsync` on every write.
    pub fn with_sync_on_write(mut self, sync: bool) -> Self {
        self.sync_on_write = sync;
        self
    }

    /// Check capacities against the page layout.
    ///
    /// # Errors
    /// Returns `Error::InvalidConfig` if a capacity is out of range.
    pub fn validate(&self) -> Result<()> {
        if !(MIN_LEAF_CAPACITY..=MAX_LEAF_CAPACITY).contains(&self.leaf_capacity) {
            return Err(Error::InvalidConfig(format!(
                "leaf capacity {} outside {}..={}",
                self.leaf_capacity, MIN_LEAF_CAPACITY, MAX_LEAF_CAPACITY
            )));
        }
        if !(MIN_INTERNAL_CAPACITY..=MAX_INTERNAL_CAPACITY).contains(&self.internal_capacity) {
            return Err(Error::InvalidConfig(format!(
                "internal capacity {} outside {}..={}",
                self.internal_capacity, MIN_INTERNAL_CAPACITY, MAX_INTERNAL_CAPACITY
            )));
        }
        Ok(())
    }
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            leaf_capacity: MAX_LEAF_CAPACITY,
            internal_capacity: MAX_INTERNAL_CAPACITY,
            sync_on_write: true,
        }
    }
}
