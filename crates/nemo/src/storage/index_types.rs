//! Arena index types for type-safe indexing.

/// A compact 32-bit index into an [`EntryTree`](super::EntryTree) arena.
///
/// Using u32 limits a single snapshot to ~4 billion entries, which is
/// sufficient for directory indexing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(transparent)]
pub struct EntryIndex(u32);

impl EntryIndex {
    /// The root entry always occupies the first arena slot.
    pub const ROOT: Self = Self(0);

    /// Creates a new EntryIndex from a usize.
    ///
    /// # Panics
    /// Panics if `index > u32::MAX`.
    #[inline]
    pub fn new(index: usize) -> Self {
        assert!(
            index <= u32::MAX as usize,
            "entry index must fit in 32 bits"
        );
        Self(index as u32)
    }

    /// Returns the index as a usize.
    #[inline]
    pub fn get(&self) -> usize {
        self.0 as usize
    }
}
