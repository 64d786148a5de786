//! pagetree - a single-key B+tree index over fixed-size disk pages.
//!
//! # Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                            pagetree                             │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  ┌─────────────────────────────────────────────────────────┐   │
//! │  │              Index Layer (index/btree/)                  │   │
//! │  │   BTreeIndex: insert / locate / read_forward / scan      │   │
//! │  │   LeafNode + InternalNode encode/decode, split/promote   │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! │                              ↓                                  │
//! │  ┌─────────────────────────────────────────────────────────┐   │
//! │  │           Storage Layer (storage/)                       │   │
//! │  │   PageStore trait: DiskManager | MemoryPageStore         │   │
//! │  │   Page + PageHeader (type tag, CRC32 checksum)           │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//! - [`common`] - Shared primitives (PageId, RecordId, Error, config)
//! - [`storage`] - Page stores and page formats
//! - [`index`] - The B+tree
//!
//! # Quick Start
//! ```no_run
//! use pagetree::{BTreeIndex, IndexConfig, OpenMode, RecordId};
//!
//! let mut index = BTreeIndex::open("table.idx", OpenMode::Write, IndexConfig::default())?;
//! index.insert(42, RecordId::new(3, 1))?;
//!
//! let mut cursor = index.locate(40)?;
//! let (key, rid) = index.read_forward(&mut cursor)?;
//! assert_eq!((key, rid), (42, RecordId::new(3, 1)));
//!
//! index.close()?;
//! # Ok::<(), pagetree::Error>(())
//! ```

pub mod common;
pub mod index;
pub mod storage;

// Re-export commonly used items at crate root for convenience
pub use common::config::PAGE_SIZE;
pub use common::{Error, IndexConfig, PageId, RecordId, Result};

pub use index::btree::{BTreeIndex, IndexCursor, OpenMode, RangeScan, TreeStats};
pub use storage::page::{Page, PageHeader, PageType};
pub use storage::{DiskManager, MemoryPageStore, PageStore};
