//! Error types for the binding layer.

use thiserror::Error;

use crate::layout::SupplementarySlot;
use crate::model::ItemIndex;

/// Errors surfaced while servicing host callbacks.
///
/// Debug builds fail fast on the same conditions before an error value
/// is ever built; release builds return these so a stale query from the
/// host cannot take the process down.
#[derive(Error, Debug)]
pub enum BindError {
    /// A section index from the host is out of range.
    #[error("section index {index} out of range ({count} sections)")]
    SectionOutOfRange { index: usize, count: usize },

    /// An item index from the host does not resolve to a descriptor.
    #[error("no item at {index}")]
    ItemOutOfRange { index: ItemIndex },

    /// A header or footer was requested for a section that has none.
    #[error("section {section} has no {slot}")]
    HeaderFooterMissing {
        slot: SupplementarySlot,
        section: usize,
    },

    /// No view factory has been registered under this reuse identifier.
    #[error("no view registered for reuse identifier {0:?}")]
    UnregisteredReuseId(String),
}

/// Result type for binding operations.
pub type BindResult<T> = Result<T, BindError>;
