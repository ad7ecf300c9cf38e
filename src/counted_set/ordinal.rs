use core::ops::Index;

use super::CountedTreeSet;
use crate::comparator::Comparator;
use crate::error::TreeError;
use crate::Ordinal;

impl<T, C> CountedTreeSet<T, C> {
    /// Returns the element at position `ordinal`.
    ///
    /// # Errors
    ///
    /// [`TreeError::EmptyContainer`] if the set is empty, otherwise
    /// [`TreeError::OutOfRange`] if `ordinal >= len()`.
    ///
    /// # Complexity
    ///
    /// O(log n)
    ///
    /// # Examples
    ///
    /// ```
    /// use counted_tree::CountedTreeSet;
    ///
    /// let set = CountedTreeSet::from([30, 10, 20]);
    /// assert_eq!(set.get_by_ordinal(2), Ok(&30));
    /// ```
    pub fn get_by_ordinal(&self, ordinal: usize) -> Result<&T, TreeError> {
        self.map.get_by_ordinal(ordinal).map(|(element, ())| element)
    }

    /// Removes and returns the element at position `ordinal`.
    ///
    /// # Errors
    ///
    /// Same as [`get_by_ordinal`](Self::get_by_ordinal).
    pub fn remove_by_ordinal(&mut self, ordinal: usize) -> Result<T, TreeError> {
        self.map.remove_by_ordinal(ordinal).map(|(element, ())| element)
    }
}

impl<T, C: Comparator<T>> CountedTreeSet<T, C> {
    /// Returns the ordinal of `element` if present, otherwise the number of elements
    /// below it.
    ///
    /// # Errors
    ///
    /// [`TreeError::TypeMismatch`] if `element` cannot be ordered.
    pub fn ordinal_of(&self, element: &T) -> Result<usize, TreeError> {
        self.map.ordinal_of_key(element)
    }

    /// Returns the ordinal of `element`, or `None` if it is absent.
    ///
    /// # Errors
    ///
    /// [`TreeError::TypeMismatch`] if `element` cannot be ordered.
    pub fn rank_of(&self, element: &T) -> Result<Option<usize>, TreeError> {
        self.map.rank_of(element)
    }
}

/// Indexes the elements by position.
///
/// # Panics
///
/// Panics if the ordinal is out of range.
///
/// # Examples
///
/// ```
/// use counted_tree::{CountedTreeSet, Ordinal};
///
/// let set = CountedTreeSet::from(["b", "a"]);
/// assert_eq!(set[Ordinal(0)], "a");
/// ```
impl<T, C> Index<Ordinal> for CountedTreeSet<T, C> {
    type Output = T;

    fn index(&self, ordinal: Ordinal) -> &T {
        match self.get_by_ordinal(ordinal.0) {
            Ok(element) => element,
            Err(error) => panic!("{error}"),
        }
    }
}
