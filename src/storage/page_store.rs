//! The page store contract the index is written against.

use crate::common::{PageId, Result};
use crate::storage::page::Page;

/// Fixed-size page I/O addressed by [`PageId`].
///
/// Page ids start at 0 and grow by one with every [`allocate_page`] call;
/// a freshly allocated page reads back as zeros. Implementations are
/// single-threaded: the index holds its store exclusively.
///
/// [`allocate_page`]: PageStore::allocate_page
pub trait PageStore {
    /// Read a page.
    ///
    /// # Errors
    /// Returns `Error::PageNotFound` if the page was never allocated, or an
    /// I/O error from the backing storage.
    fn read_page(&mut self, page_id: PageId) -> Result<Page>;

    /// Overwrite a previously allocated page.
    ///
    /// # Errors
    /// Returns `Error::PageNotFound` if the page was never allocated, or an
    /// I/O error from the backing storage.
    fn write_page(&mut self, page_id: PageId, page: &Page) -> Result<()>;

    /// Append a zeroed page and return its id.
    fn allocate_page(&mut self) -> Result<PageId>;

    /// Number of allocated pages.
    fn page_count(&self) -> u32;

    /// Make every completed write durable.
    fn flush(&mut self) -> Result<()>;
}
