//! Error types for pagetree.

use thiserror::Error;

/// Convenient Result type alias.
///
/// Instead of writing `Result<T, Error>` everywhere, we can write `Result<T>`.
pub type Result<T> = std::result::Result<T, Error>;

/// All possible errors in pagetree.
///
/// `NodeFull` is a split signal between a node and the tree; it never reaches
/// a caller of [`BTreeIndex::insert`](crate::BTreeIndex::insert). `NotFound`
/// is an expected outcome of lookups. Everything else aborts the current
/// operation.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error from the page store.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Requested page does not exist in the page store.
    #[error("Page {0} not found")]
    PageNotFound(u32),

    /// A leaf or internal node is at capacity.
    #[error("Node is full")]
    NodeFull,

    /// No entry at or after the search key, or the cursor is exhausted.
    #[error("No such entry")]
    NotFound,

    /// A page failed to decode or the tree failed an integrity check.
    #[error("Page {page_id} corrupted: {reason}")]
    Corrupted { page_id: u32, reason: String },

    /// A caller broke an API precondition.
    ///
    /// This indicates a bug in the caller, not a runtime condition.
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// The index was opened read-only.
    #[error("Index is open read-only")]
    ReadOnly,

    /// Node capacities do not fit the page layout, or differ from the ones
    /// recorded in an existing index file.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The page store has used up the page id space.
    #[error("Page store is full ({0} pages)")]
    StoreFull(u32),
}

impl Error {
    pub(crate) fn corrupted(page_id: u32, reason: impl Into<String>) -> Self {
        Error::Corrupted {
            page_id,
            reason: reason.into(),
        }
    }
}
