/// A zero-based position in the sort order of a map, set or range view.
///
/// Used to index a container by position rather than by key.
///
/// # Examples
///
/// ```
/// use counted_tree::{CountedTreeMap, Ordinal};
///
/// let mut map = CountedTreeMap::new();
/// map.insert("b", 20).unwrap();
/// map.insert("a", 10).unwrap();
///
/// assert_eq!(map[Ordinal(0)], 10);
/// assert_eq!(map[Ordinal(1)], 20);
/// ```
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Ordinal(pub usize);

impl From<usize> for Ordinal {
    fn from(ordinal: usize) -> Self {
        Self(ordinal)
    }
}

impl From<Ordinal> for usize {
    fn from(ordinal: Ordinal) -> Self {
        ordinal.0
    }
}
