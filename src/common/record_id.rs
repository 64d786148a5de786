//! Record identifier type.

use std::fmt;

/// Locates a tuple in the table's record file.
///
/// The index never looks inside a record; it stores `RecordId`s as leaf
/// payload and hands them back on lookup. Entries are ordered by key, not by
/// `RecordId`; the derived ordering exists so callers can sort and compare
/// locators.
///
/// # Example
/// ```
/// use pagetree::RecordId;
///
/// let rid = RecordId::new(3, 7);
/// assert_eq!(rid.page_id, 3);
/// assert_eq!(rid.slot_id, 7);
/// ```
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordId {
    /// Page of the record file holding the tuple.
    pub page_id: i32,
    /// Slot of the tuple within that page.
    pub slot_id: i32,
}

impl RecordId {
    /// Size of a `RecordId` on disk (two 4-byte integers).
    pub const SIZE: usize = 8;

    /// Create a new RecordId.
    #[inline]
    pub fn new(page_id: i32, slot_id: i32) -> Self {
        RecordId { page_id, slot_id }
    }

    /// Read from the first 8 bytes of `data`, little-endian.
    ///
    /// # Panics
    /// Panics if `data.len() < RecordId::SIZE`.
    pub fn from_bytes(data: &[u8]) -> Self {
        assert!(data.len() >= Self::SIZE, "buffer too small for RecordId");

        let page_id = i32::from_le_bytes([data[0], data[1], data[2], data[3]]);
        let slot_id = i32::from_le_bytes([data[4], data[5], data[6], data[7]]);
        Self { page_id, slot_id }
    }

    /// Write into the first 8 bytes of `data`, little-endian.
    ///
    /// # Panics
    /// Panics if `data.len() < RecordId::SIZE`.
    pub fn write_to(&self, data: &mut [u8]) {
        assert!(data.len() >= Self::SIZE, "buffer too small for RecordId");

        data[0..4].copy_from_slice(&self.page_id.to_le_bytes());
        data[4..8].copy_from_slice(&self.slot_id.to_le_bytes());
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Record({}, {})", self.page_id, self.slot_id)
    }
}
