//! Item addressing.

use std::fmt;

/// Position of an item: a section index plus the offset within that
/// section.
///
/// Ordering is section-major, matching display order on a scrolling
/// surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ItemIndex {
    /// Zero-based section index.
    pub section: usize,
    /// Zero-based position within the section.
    pub item: usize,
}

impl ItemIndex {
    /// Creates an index from a section and an item position.
    #[inline]
    pub const fn new(section: usize, item: usize) -> Self {
        Self { section, item }
    }
}

impl fmt::Display for ItemIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.section, self.item)
    }
}

impl From<(usize, usize)> for ItemIndex {
    fn from((section, item): (usize, usize)) -> Self {
        Self::new(section, item)
    }
}
