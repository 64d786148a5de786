//! Storage layer - page stores and page formats.
//!
//! This module handles persistent storage:
//! - [`PageStore`] - The page I/O contract the index is written against
//! - [`DiskManager`] - File-backed page store
//! - [`MemoryPageStore`] - In-memory page store
//! - [`page`] - Page types and layouts

mod disk_manager;
mod memory_store;
pub mod page;
mod page_store;

pub use disk_manager::DiskManager;
pub use memory_store::MemoryPageStore;
pub use page_store::PageStore;
