use thiserror::Error;

/// Errors returned by [`CountedTreeMap`](crate::CountedTreeMap),
/// [`CountedTreeSet`](crate::CountedTreeSet) and their range views.
///
/// All of them are local, synchronous failures of the call that triggered them.
/// The tree is left unchanged whenever one is returned.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Error)]
pub enum TreeError {
    /// The container (or the addressed range) holds no entries.
    #[error("container is empty")]
    EmptyContainer,
    /// An ordinal outside `[0, len)`.
    #[error("ordinal {ordinal} is out of range for length {len}")]
    OutOfRange {
        /// The requested ordinal.
        ordinal: usize,
        /// The number of entries addressable at the time of the call.
        len: usize,
    },
    /// The key cannot be ordered under the container's comparator.
    #[error("key is not comparable under the active ordering")]
    TypeMismatch,
    /// The key or bound lies outside the window of a range view.
    #[error("key lies outside the bounds of the range view")]
    IllegalBound,
    /// The mutation is not meaningful in the current state.
    #[error("unsupported mutation: {0}")]
    UnsupportedMutation(&'static str),
}
