//! Page identifier type.

use std::fmt;

/// Identifies a page in an index file.
///
/// Using `u32` allows for 4 billion pages:
/// - 4,294,967,296 pages × 4KB = 16TB maximum index size
///
/// Page 0 is always the tree header, so no node ever lives there. Leaf
/// pages use that fact to encode "no next leaf" as 0 on disk.
///
/// # Example
/// ```
/// use pagetree::PageId;
///
/// let page_id = PageId::new(42);
/// assert!(page_id.is_valid());
/// assert_eq!(page_id.0, 42);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PageId(pub u32);

impl PageId {
    /// Invalid/sentinel page ID.
    ///
    /// Used to represent "no page": an empty tree's root, an exhausted cursor.
    /// Stored as `-1` in the 4-byte signed header field.
    pub const INVALID: PageId = PageId(u32::MAX);

    /// The reserved tree header page.
    pub const HEADER: PageId = PageId(0);

    /// Create a new PageId.
    #[inline]
    pub fn new(id: u32) -> Self {
        PageId(id)
    }

    /// Check if this page ID is valid (not the sentinel value).
    #[inline]
    pub fn is_valid(&self) -> bool {
        *self != Self::INVALID
    }

    /// Reinterpret a signed on-disk page id; negative values map to INVALID.
    #[inline]
    pub fn from_i32(raw: i32) -> Self {
        if raw < 0 {
            Self::INVALID
        } else {
            PageId(raw as u32)
        }
    }

    /// Signed on-disk form. INVALID becomes `-1`.
    #[inline]
    pub fn to_i32(self) -> i32 {
        self.0 as i32
    }
}

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self == Self::INVALID {
            write!(f, "Page(INVALID)")
        } else {
            write!(f, "Page({})", self.0)
        }
    }
}
