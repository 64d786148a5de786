//! In-memory page storage.

use crate::common::config::MAX_PAGES;
use crate::common::{Error, PageId, Result};
use crate::storage::page::Page;
use crate::storage::PageStore;

/// A [`PageStore`] that keeps every page in RAM.
///
/// Page ids map directly to `Vec` indices. Reads and writes are counted so
/// callers can observe how much I/O an operation performed, and writes can
/// be made to fail to exercise error paths.
#[derive(Default)]
pub struct MemoryPageStore {
    pages: Vec<Box<Page>>,
    reads: u64,
    writes: u64,
    /// Remaining successful writes before every write fails; `None` = never fail.
    writes_before_failure: Option<u64>,
}

impl MemoryPageStore {
    /// Creates a new empty page store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `read_page` calls served so far.
    #[inline]
    pub fn reads(&self) -> u64 {
        self.reads
    }

    /// Number of `write_page` calls served so far.
    #[inline]
    pub fn writes(&self) -> u64 {
        self.writes
    }

    /// Let `count` more writes succeed, then fail every write with an I/O error.
    pub fn fail_writes_after(&mut self, count: u64) {
        self.writes_before_failure = Some(count);
    }

    /// Stop injecting write failures.
    pub fn clear_write_failures(&mut self) {
        self.writes_before_failure = None;
    }
}

impl PageStore for MemoryPageStore {
    fn read_page(&mut self, page_id: PageId) -> Result<Page> {
        let page = self
            .pages
            .get(page_id.0 as usize)
            .ok_or(Error::PageNotFound(page_id.0))?;
        self.reads += 1;
        Ok(Page::from_bytes(page.as_slice()))
    }

    fn write_page(&mut self, page_id: PageId, page: &Page) -> Result<()> {
        if let Some(remaining) = self.writes_before_failure.as_mut() {
            if *remaining == 0 {
                return Err(Error::Io(std::io::Error::other("injected write failure")));
            }
            *remaining -= 1;
        }

        let slot = self
            .pages
            .get_mut(page_id.0 as usize)
            .ok_or(Error::PageNotFound(page_id.0))?;
        slot.as_mut_slice().copy_from_slice(page.as_slice());
        self.writes += 1;
        Ok(())
    }

    fn allocate_page(&mut self) -> Result<PageId> {
        let count = self.page_count();
        if count >= MAX_PAGES {
            return Err(Error::StoreFull(count));
        }
        let page_id = PageId::new(count);
        self.pages.push(Box::new(Page::new()));
        Ok(page_id)
    }

    #[inline]
    fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}
