use core::ops::{Index, IndexMut};

use super::CountedTreeMap;
use crate::comparator::Comparator;
use crate::error::TreeError;
use crate::Ordinal;

impl<K, V, C> CountedTreeMap<K, V, C> {
    /// Returns the entry at position `ordinal` in key order.
    ///
    /// # Errors
    ///
    /// [`TreeError::EmptyContainer`] if the map is empty, otherwise
    /// [`TreeError::OutOfRange`] if `ordinal >= len()`.
    ///
    /// # Complexity
    ///
    /// O(log n)
    ///
    /// # Examples
    ///
    /// ```
    /// use counted_tree::{CountedTreeMap, TreeError};
    ///
    /// let map = CountedTreeMap::from([("a", 10), ("c", 30), ("b", 20)]);
    /// assert_eq!(map.get_by_ordinal(1), Ok((&"b", &20)));
    /// assert_eq!(map.get_by_ordinal(3), Err(TreeError::OutOfRange { ordinal: 3, len: 3 }));
    /// ```
    pub fn get_by_ordinal(&self, ordinal: usize) -> Result<(&K, &V), TreeError> {
        self.raw.get_by_ordinal(ordinal)
    }

    /// Returns the key and a mutable reference to the value at position `ordinal`.
    ///
    /// # Errors
    ///
    /// Same as [`get_by_ordinal`](Self::get_by_ordinal).
    pub fn get_by_ordinal_mut(&mut self, ordinal: usize) -> Result<(&K, &mut V), TreeError> {
        self.raw.get_by_ordinal_mut(ordinal)
    }

    /// Removes and returns the entry at position `ordinal`.
    ///
    /// # Errors
    ///
    /// Same as [`get_by_ordinal`](Self::get_by_ordinal); the map is left unchanged.
    ///
    /// # Complexity
    ///
    /// O(log n)
    ///
    /// # Examples
    ///
    /// ```
    /// use counted_tree::CountedTreeMap;
    ///
    /// let mut map = CountedTreeMap::from([(5, 'e'), (1, 'a'), (3, 'c')]);
    /// assert_eq!(map.remove_by_ordinal(1), Ok((3, 'c')));
    /// assert_eq!(map.keys().copied().collect::<Vec<_>>(), [1, 5]);
    /// ```
    pub fn remove_by_ordinal(&mut self, ordinal: usize) -> Result<(K, V), TreeError> {
        self.raw.remove_by_ordinal(ordinal)
    }
}

impl<K, V, C: Comparator<K>> CountedTreeMap<K, V, C> {
    /// Returns the position of `key`: its ordinal when present, otherwise the number
    /// of keys ordered below it (where it would be inserted).
    ///
    /// # Errors
    ///
    /// [`TreeError::TypeMismatch`] if `key` cannot be ordered against the stored keys.
    ///
    /// # Examples
    ///
    /// ```
    /// use counted_tree::CountedTreeMap;
    ///
    /// let map = CountedTreeMap::from([(10, ()), (20, ()), (30, ())]);
    /// assert_eq!(map.ordinal_of_key(&20), Ok(1));
    /// assert_eq!(map.ordinal_of_key(&25), Ok(2));
    /// assert_eq!(map.ordinal_of_key(&99), Ok(3));
    /// ```
    pub fn ordinal_of_key(&self, key: &K) -> Result<usize, TreeError> {
        self.raw.ordinal_of_key(key)
    }

    /// Returns the ordinal of `key`, or `None` if it is absent.
    ///
    /// # Errors
    ///
    /// [`TreeError::TypeMismatch`] if `key` cannot be ordered against the stored keys.
    pub fn rank_of(&self, key: &K) -> Result<Option<usize>, TreeError> {
        self.raw.rank_of(key)
    }
}

/// Indexes the values by position.
///
/// # Panics
///
/// Panics if the ordinal is out of range.
impl<K, V, C> Index<Ordinal> for CountedTreeMap<K, V, C> {
    type Output = V;

    fn index(&self, ordinal: Ordinal) -> &V {
        match self.get_by_ordinal(ordinal.0) {
            Ok((_, value)) => value,
            Err(error) => panic!("{error}"),
        }
    }
}

/// # Panics
///
/// Panics if the ordinal is out of range.
///
/// # Examples
///
/// ```
/// use counted_tree::{CountedTreeMap, Ordinal};
///
/// let mut map = CountedTreeMap::from([("a", 1), ("b", 2)]);
/// map[Ordinal(1)] = 5;
/// assert_eq!(map.get(&"b"), Ok(Some(&5)));
/// ```
impl<K, V, C> IndexMut<Ordinal> for CountedTreeMap<K, V, C> {
    fn index_mut(&mut self, ordinal: Ordinal) -> &mut V {
        match self.get_by_ordinal_mut(ordinal.0) {
            Ok((_, value)) => value,
            Err(error) => panic!("{error}"),
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn empty_map_reports_empty_container() {
        let mut map: CountedTreeMap<i32, i32> = CountedTreeMap::new();
        assert_eq!(map.get_by_ordinal(0), Err(TreeError::EmptyContainer));
        assert_eq!(map.remove_by_ordinal(0), Err(TreeError::EmptyContainer));
        assert_eq!(map.ordinal_of_key(&7), Ok(0));
        assert_eq!(map.rank_of(&7), Ok(None));
    }

    #[test]
    fn rank_round_trip() {
        let mut map = CountedTreeMap::with_order(2);
        for key in (0..300).rev() {
            map.insert(key * 7 % 301, key).unwrap();
        }
        for ordinal in 0..map.len() {
            let (key, _) = map.get_by_ordinal(ordinal).unwrap();
            assert_eq!(map.ordinal_of_key(key), Ok(ordinal));
        }
    }

    #[test]
    #[should_panic(expected = "ordinal 2 is out of range for length 2")]
    fn index_out_of_range_panics() {
        let map = CountedTreeMap::from([(1, 'a'), (2, 'b')]);
        let _ = map[Ordinal(2)];
    }
}
