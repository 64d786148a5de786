//! Tree header page (page 0).

use crate::common::{Error, IndexConfig, PageId, Result};
use crate::storage::page::Page;

/// Root location, height, and the node capacities the tree was built with,
/// persisted in page 0.
///
/// # Layout
/// ```text
/// Offset  Size  Field
/// ------  ----  -----
/// 0       4     root page id (i32, -1 = none)
/// 4       4     height (i32)
/// 8       4     leaf capacity (u32, 0 = not recorded)
/// 12      4     internal capacity (u32, 0 = not recorded)
/// 16      ...   zero
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreeHeader {
    pub root: PageId,
    pub height: u32,
    pub leaf_capacity: u32,
    pub internal_capacity: u32,
}

impl TreeHeader {
    const OFFSET_ROOT: usize = 0;
    const OFFSET_HEIGHT: usize = 4;
    const OFFSET_LEAF_CAPACITY: usize = 8;
    const OFFSET_INTERNAL_CAPACITY: usize = 12;

    /// Header of a tree with no entries and no recorded capacities.
    pub const EMPTY: TreeHeader = TreeHeader {
        root: PageId::INVALID,
        height: 0,
        leaf_capacity: 0,
        internal_capacity: 0,
    };

    pub fn new(root: PageId, height: u32) -> Self {
        Self {
            root,
            height,
            ..Self::EMPTY
        }
    }

    /// Record the node capacities of `config`.
    pub fn with_capacities(mut self, config: &IndexConfig) -> Self {
        self.leaf_capacity = config.leaf_capacity as u32;
        self.internal_capacity = config.internal_capacity as u32;
        self
    }

    /// Check that `config` uses the capacities this file was built with.
    /// Capacities that were never recorded accept any config.
    ///
    /// # Errors
    /// Returns `Error::InvalidConfig` on a mismatch.
    pub fn check_config(&self, config: &IndexConfig) -> Result<()> {
        let recorded = [
            ("leaf", self.leaf_capacity, config.leaf_capacity),
            ("internal", self.internal_capacity, config.internal_capacity),
        ];
        for (kind, stored, requested) in recorded {
            if stored != 0 && stored as usize != requested {
                return Err(Error::InvalidConfig(format!(
                    "index was built with {} capacity {}, config asks for {}",
                    kind, stored, requested
                )));
            }
        }
        Ok(())
    }

    /// Decode page 0.
    ///
    /// # Errors
    /// Returns `Error::Corrupted` for a negative height, or a non-empty tree
    /// whose root is missing or is the header page itself.
    pub fn from_page(page: &Page) -> Result<Self> {
        let root = PageId::from_i32(page.read_i32(Self::OFFSET_ROOT));
        let height = page.read_i32(Self::OFFSET_HEIGHT);

        if height < 0 {
            return Err(Error::corrupted(
                PageId::HEADER.0,
                format!("negative tree height {}", height),
            ));
        }
        if height > 0 && (!root.is_valid() || root == PageId::HEADER) {
            return Err(Error::corrupted(
                PageId::HEADER.0,
                format!("tree of height {} has no root", height),
            ));
        }

        Ok(Self {
            root: if height == 0 { PageId::INVALID } else { root },
            height: height as u32,
            leaf_capacity: page.read_u32(Self::OFFSET_LEAF_CAPACITY),
            internal_capacity: page.read_u32(Self::OFFSET_INTERNAL_CAPACITY),
        })
    }

    /// Encode into a fresh page.
    pub fn to_page(&self) -> Page {
        let mut page = Page::new();
        page.write_i32(Self::OFFSET_ROOT, self.root.to_i32());
        page.write_i32(Self::OFFSET_HEIGHT, self.height as i32);
        page.write_u32(Self::OFFSET_LEAF_CAPACITY, self.leaf_capacity);
        page.write_u32(Self::OFFSET_INTERNAL_CAPACITY, self.internal_capacity);
        page
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_layout() {
        let page = TreeHeader::new(PageId::new(7), 3).to_page();
        assert_eq!(page.read_i32(0), 7);
        assert_eq!(page.read_i32(4), 3);
        assert!(page.as_slice()[8..].iter().all(|&b| b == 0));

        let empty = TreeHeader::EMPTY.to_page();
        assert_eq!(empty.read_i32(0), -1);
        assert_eq!(empty.read_i32(4), 0);
    }

    #[test]
    fn test_header_roundtrip() {
        let header = TreeHeader::new(PageId::new(12), 2);
        assert_eq!(TreeHeader::from_page(&header.to_page()).unwrap(), header);
        assert_eq!(
            TreeHeader::from_page(&TreeHeader::EMPTY.to_page()).unwrap(),
            TreeHeader::EMPTY
        );
    }

    #[test]
    fn test_header_records_capacities() {
        let config = IndexConfig::default()
            .with_leaf_capacity(8)
            .with_internal_capacity(5);
        let header = TreeHeader::new(PageId::new(4), 2).with_capacities(&config);

        let page = header.to_page();
        assert_eq!(page.read_u32(8), 8);
        assert_eq!(page.read_u32(12), 5);

        let decoded = TreeHeader::from_page(&page).unwrap();
        assert_eq!(decoded, header);
        assert!(decoded.check_config(&config).is_ok());
        assert!(matches!(
            decoded.check_config(&config.with_leaf_capacity(4)),
            Err(Error::InvalidConfig(_))
        ));
        assert!(matches!(
            decoded.check_config(&config.with_internal_capacity(6)),
            Err(Error::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_header_without_capacities_accepts_any_config() {
        let decoded = TreeHeader::from_page(&TreeHeader::new(PageId::new(4), 1).to_page()).unwrap();
        assert_eq!(decoded.leaf_capacity, 0);
        assert!(decoded
            .check_config(&IndexConfig::default().with_leaf_capacity(3))
            .is_ok());
    }

    #[test]
    fn test_header_rejects_garbage() {
        let mut page = Page::new();
        page.write_i32(4, -2);
        assert!(matches!(
            TreeHeader::from_page(&page),
            Err(Error::Corrupted { .. })
        ));

        // Height 1 with root 0 (the header page itself)
        let mut page = Page::new();
        page.write_i32(4, 1);
        assert!(TreeHeader::from_page(&page).is_err());

        let mut page = Page::new();
        page.write_i32(0, -1);
        page.write_i32(4, 2);
        assert!(TreeHeader::from_page(&page).is_err());
    }
}
