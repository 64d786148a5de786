//! Disk Manager - low-level file I/O for index pages.
//!
//! The [`DiskManager`] handles all direct file operations:
//! - Reading and writing pages
//! - Allocating new pages
//! - Managing the index file

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;

use crate::common::config::{MAX_PAGES, PAGE_SIZE};
use crate::common::{Error, PageId, Result};
use crate::storage::page::Page;
use crate::storage::PageStore;

/// Manages disk I/O for a single index file.
///
/// # File Layout
/// The index is stored as a single file with pages laid out sequentially:
/// ```text
/// ┌─────────┬─────────┬─────────┬─────────┬─────────┐
/// │ Page 0  │ Page 1  │ Page 2  │  ...    │ Page N  │
/// │ header  │ (4KB)   │ (4KB)   │         │ (4KB)   │
/// └─────────┴─────────┴─────────┴─────────┴─────────┘
/// Offset:  0      4096     8192    ...    N×4096
/// ```
///
/// Page N is located at file offset `N × PAGE_SIZE`.
///
/// # Durability
/// By default every write and allocation is followed by `fsync()`. With
/// `set_sync_on_write(false)` writes are only synced by [`PageStore::flush`].
pub struct DiskManager {
    file: File,
    /// Number of pages in the file.
    page_count: u32,
    /// Opened without write access.
    read_only: bool,
    sync_on_write: bool,
}

impl DiskManager {
    /// Create a new index file.
    ///
    /// # Errors
    /// Returns an error if the file already exists or cannot be created.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create_new(true)
            .open(path)?;

        Ok(Self {
            file,
            page_count: 0,
            read_only: false,
            sync_on_write: true,
        })
    }

    /// Open an existing index file for reading and writing.
    ///
    /// # Errors
    /// Returns an error if the file doesn't exist or cannot be opened.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = OpenOptions::new().read(true).write(true).open(&path)?;
        Self::from_file(file, false)
    }

    /// Open an existing index file without write access.
    ///
    /// Writes and allocations fail with `Error::ReadOnly`.
    ///
    /// # Errors
    /// Returns an error if the file doesn't exist or cannot be opened.
    pub fn open_read_only<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = OpenOptions::new().read(true).open(&path)?;
        Self::from_file(file, true)
    }

    /// Open an existing index file, or create if it doesn't exist.
    pub fn open_or_create<P: AsRef<Path>>(path: P) -> Result<Self> {
        if path.as_ref().exists() {
            Self::open(path)
        } else {
            Self::create(path)
        }
    }

    fn from_file(file: File, read_only: bool) -> Result<Self> {
        // Calculate page count from file size; a torn trailing page is ignored
        let file_size = file.metadata()?.len();
        let page_count = (file_size / PAGE_SIZE as u64) as u32;

        Ok(Self {
            file,
            page_count,
            read_only,
            sync_on_write: true,
        })
    }

    /// Choose whether every write is followed by `fsync()`.
    pub fn set_sync_on_write(&mut self, sync: bool) {
        self.sync_on_write = sync;
    }

    /// Whether the file was opened without write access.
    #[inline]
    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    /// Get the total size of the index file in bytes.
    #[inline]
    pub fn file_size(&self) -> u64 {
        (self.page_count as u64) * (PAGE_SIZE as u64)
    }

    fn check_writable(&self) -> Result<()> {
        if self.read_only {
            return Err(Error::ReadOnly);
        }
        Ok(())
    }
}

impl PageStore for DiskManager {
    fn read_page(&mut self, page_id: PageId) -> Result<Page> {
        if page_id.0 >= self.page_count {
            return Err(Error::PageNotFound(page_id.0));
        }

        let offset = (page_id.0 as u64) * (PAGE_SIZE as u64);
        self.file.seek(SeekFrom::Start(offset))?;

        let mut page = Page::new();
        self.file.read_exact(page.as_mut_slice())?;

        Ok(page)
    }

    fn write_page(&mut self, page_id: PageId, page: &Page) -> Result<()> {
        self.check_writable()?;
        if page_id.0 >= self.page_count {
            return Err(Error::PageNotFound(page_id.0));
        }

        let offset = (page_id.0 as u64) * (PAGE_SIZE as u64);
        self.file.seek(SeekFrom::Start(offset))?;
        self.file.write_all(page.as_slice())?;
        if self.sync_on_write {
            self.file.sync_all()?;
        }

        Ok(())
    }

    fn allocate_page(&mut self) -> Result<PageId> {
        self.check_writable()?;
        if self.page_count >= MAX_PAGES {
            return Err(Error::StoreFull(self.page_count));
        }
        let page_id = PageId::new(self.page_count);

        // Extend file with a zeroed page
        let offset = (page_id.0 as u64) * (PAGE_SIZE as u64);
        self.file.seek(SeekFrom::Start(offset))?;

        let zeros = [0u8; PAGE_SIZE];
        self.file.write_all(&zeros)?;
        if self.sync_on_write {
            self.file.sync_all()?;
        }

        self.page_count += 1;
        tracing::trace!(%page_id, "allocated page");
        Ok(page_id)
    }

    #[inline]
    fn page_count(&self) -> u32 {
        self.page_count
    }

    fn flush(&mut self) -> Result<()> {
        if !self.read_only {
            self.file.sync_all()?;
        }
        Ok(())
    }
}
