use core::fmt;
use core::hash::{Hash, Hasher};
use core::iter::FusedIterator;

use crate::comparator::{Comparator, NaturalOrder};
use crate::counted_map::{self, CountedTreeMap, EntriesMut, Keys};
use crate::error::TreeError;

mod config;
mod ordinal;
mod range_view;

pub use crate::Ordinal;
pub use range_view::{SetView, SubSet, SubSetMut};

/// A sorted set that also answers positional queries in logarithmic time.
///
/// Implemented as a [`CountedTreeMap`] with `()` values: every operation of the set
/// is the map operation of the same name applied to the keys.
///
/// # Examples
///
/// ```
/// use counted_tree::{CountedTreeSet, TreeError};
///
/// let mut books = CountedTreeSet::new();
/// books.insert("Pride and Prejudice")?;
/// books.insert("A Dance With Dragons")?;
/// books.insert("The Odyssey")?;
///
/// assert!(books.contains(&"The Odyssey")?);
/// assert_eq!(books.get_by_ordinal(0)?, &"A Dance With Dragons");
/// assert_eq!(books.rank_of(&"The Odyssey")?, Some(2));
/// assert!(!books.insert("The Odyssey")?);
/// # Ok::<(), TreeError>(())
/// ```
pub struct CountedTreeSet<T, C = NaturalOrder> {
    map: CountedTreeMap<T, (), C>,
}

/// An iterator over the elements of a [`CountedTreeSet`] or of a set view, in order.
///
/// [`ordinal`](Iter::ordinal) reports the position of the element returned last.
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Iter<'a, T, C> {
    inner: Keys<'a, T, (), C>,
}

/// An owning iterator over the elements of a [`CountedTreeSet`], in order.
pub struct IntoIter<T> {
    inner: counted_map::IntoIter<T, ()>,
}

/// A mutating cursor over the elements of a [`CountedTreeSet`] or of a mutable set
/// view, able to remove the element returned last.
///
/// # Examples
///
/// ```
/// use counted_tree::CountedTreeSet;
///
/// let mut set: CountedTreeSet<i32> = (0..6).collect();
/// let mut elements = set.elements_mut();
/// while let Some(&element) = elements.next() {
///     if element % 2 == 1 {
///         assert_eq!(elements.remove(), Ok(element));
///     }
/// }
/// assert!(set.iter().eq(&[0, 2, 4]));
/// ```
pub struct ElementsMut<'a, T, C> {
    inner: EntriesMut<'a, T, (), C>,
}

impl<T, C> CountedTreeSet<T, C> {
    pub fn clear(&mut self) {
        self.map.clear();
    }

    /// Returns the number of elements.
    ///
    /// # Complexity
    ///
    /// O(1)
    #[must_use]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Returns the smallest element.
    ///
    /// # Errors
    ///
    /// [`TreeError::EmptyContainer`] if the set is empty.
    pub fn first(&self) -> Result<&T, TreeError> {
        self.map.first_key()
    }

    /// Returns the largest element.
    ///
    /// # Errors
    ///
    /// [`TreeError::EmptyContainer`] if the set is empty.
    pub fn last(&self) -> Result<&T, TreeError> {
        self.map.last_key()
    }

    pub fn pop_first(&mut self) -> Option<T> {
        self.map.pop_first().map(|(element, ())| element)
    }

    pub fn pop_last(&mut self) -> Option<T> {
        self.map.pop_last().map(|(element, ())| element)
    }

    /// Returns an iterator over the elements in order.
    pub fn iter(&self) -> Iter<'_, T, C> {
        Iter { inner: self.map.keys() }
    }

    /// Returns a mutating cursor over all elements in order.
    pub fn elements_mut(&mut self) -> ElementsMut<'_, T, C> {
        ElementsMut {
            inner: self.map.entries_mut(),
        }
    }

    /// Keeps only the elements for which `keep` returns `true`.
    ///
    /// # Examples
    ///
    /// ```
    /// use counted_tree::CountedTreeSet;
    ///
    /// let mut set: CountedTreeSet<i32> = (1..=6).collect();
    /// set.retain(|&k| k % 3 == 0);
    /// assert!(set.into_iter().eq([3, 6]));
    /// ```
    pub fn retain<F>(&mut self, mut keep: F)
    where
        F: FnMut(&T) -> bool,
    {
        self.map.retain(|element, ()| keep(element));
    }
}

impl<T, C: Comparator<T>> CountedTreeSet<T, C> {
    /// Adds `element`, returning whether it was newly inserted.
    ///
    /// An element equal to one already present is not stored again; the existing one
    /// is kept.
    ///
    /// # Errors
    ///
    /// [`TreeError::TypeMismatch`] if the comparator cannot order `element`.
    pub fn insert(&mut self, element: T) -> Result<bool, TreeError> {
        Ok(self.map.insert(element, ())?.is_none())
    }

    /// # Errors
    ///
    /// [`TreeError::TypeMismatch`] if `element` cannot be ordered against the stored
    /// elements.
    pub fn contains(&self, element: &T) -> Result<bool, TreeError> {
        self.map.contains_key(element)
    }

    /// Returns the stored element equal to `element`.
    ///
    /// # Errors
    ///
    /// [`TreeError::TypeMismatch`] if `element` cannot be ordered.
    pub fn get(&self, element: &T) -> Result<Option<&T>, TreeError> {
        Ok(self.map.get_key_value(element)?.map(|(element, ())| element))
    }

    /// Removes `element`, returning whether it was present.
    ///
    /// # Errors
    ///
    /// [`TreeError::TypeMismatch`] if `element` cannot be ordered.
    pub fn remove(&mut self, element: &T) -> Result<bool, TreeError> {
        Ok(self.map.remove(element)?.is_some())
    }

    /// Removes and returns the stored element equal to `element`.
    ///
    /// # Errors
    ///
    /// [`TreeError::TypeMismatch`] if `element` cannot be ordered.
    pub fn take(&mut self, element: &T) -> Result<Option<T>, TreeError> {
        Ok(self.map.remove_entry(element)?.map(|(element, ())| element))
    }

    /// The smallest element greater than or equal to `element`.
    ///
    /// # Errors
    ///
    /// [`TreeError::TypeMismatch`] if `element` cannot be ordered.
    pub fn ceiling(&self, element: &T) -> Result<Option<&T>, TreeError> {
        Ok(self.map.ceiling_key_value(element)?.map(|(element, ())| element))
    }

    /// The largest element strictly less than `element`.
    ///
    /// # Errors
    ///
    /// [`TreeError::TypeMismatch`] if `element` cannot be ordered.
    pub fn lower(&self, element: &T) -> Result<Option<&T>, TreeError> {
        Ok(self.map.lower_key_value(element)?.map(|(element, ())| element))
    }
}

impl<T: Clone, C: Clone> Clone for CountedTreeSet<T, C> {
    fn clone(&self) -> Self {
        CountedTreeSet { map: self.map.clone() }
    }
}

impl<T: Hash, C> Hash for CountedTreeSet<T, C> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.map.hash(state);
    }
}

impl<T: PartialEq, C> PartialEq for CountedTreeSet<T, C> {
    fn eq(&self, other: &Self) -> bool {
        self.map == other.map
    }
}

impl<T: Eq, C> Eq for CountedTreeSet<T, C> {}

impl<T: fmt::Debug, C> fmt::Debug for CountedTreeSet<T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<T, C: Default> Default for CountedTreeSet<T, C> {
    fn default() -> Self {
        CountedTreeSet {
            map: CountedTreeMap::default(),
        }
    }
}

/// # Panics
///
/// Panics if an element cannot be ordered (e.g. `f64::NAN`).
impl<T: PartialOrd> FromIterator<T> for CountedTreeSet<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut set = CountedTreeSet::new();
        set.extend(iter);
        set
    }
}

/// # Panics
///
/// Panics if an element cannot be ordered under the set's comparator.
impl<T, C: Comparator<T>> Extend<T> for CountedTreeSet<T, C> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        self.map.extend(iter.into_iter().map(|element| (element, ())));
    }
}

impl<'a, T: Copy + 'a, C: Comparator<T>> Extend<&'a T> for CountedTreeSet<T, C> {
    fn extend<I: IntoIterator<Item = &'a T>>(&mut self, iter: I) {
        self.extend(iter.into_iter().copied());
    }
}

impl<T: PartialOrd, const N: usize> From<[T; N]> for CountedTreeSet<T> {
    fn from(arr: [T; N]) -> Self {
        arr.into_iter().collect()
    }
}

impl<'a, T, C> IntoIterator for &'a CountedTreeSet<T, C> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T, C>;

    fn into_iter(self) -> Iter<'a, T, C> {
        self.iter()
    }
}

impl<T, C> IntoIterator for CountedTreeSet<T, C> {
    type Item = T;
    type IntoIter = IntoIter<T>;

    fn into_iter(self) -> IntoIter<T> {
        IntoIter {
            inner: self.map.into_iter(),
        }
    }
}

impl<T, C> Iter<'_, T, C> {
    /// Position of the element returned last, or `None` before the first call.
    #[must_use]
    pub fn ordinal(&self) -> Option<usize> {
        self.inner.ordinal()
    }
}

impl<'a, T, C> Iterator for Iter<'a, T, C> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<T, C> DoubleEndedIterator for Iter<'_, T, C> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back()
    }
}

impl<T, C> ExactSizeIterator for Iter<'_, T, C> {
    fn len(&self) -> usize {
        self.inner.len()
    }
}

impl<T, C> FusedIterator for Iter<'_, T, C> {}

impl<T, C> Clone for Iter<'_, T, C> {
    fn clone(&self) -> Self {
        Iter {
            inner: self.inner.clone(),
        }
    }
}

impl<T: fmt::Debug, C> fmt::Debug for Iter<'_, T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

impl<T> Iterator for IntoIter<T> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        self.inner.next().map(|(element, ())| element)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<T> DoubleEndedIterator for IntoIter<T> {
    fn next_back(&mut self) -> Option<T> {
        self.inner.next_back().map(|(element, ())| element)
    }
}

impl<T> ExactSizeIterator for IntoIter<T> {
    fn len(&self) -> usize {
        self.inner.len()
    }
}

impl<T> FusedIterator for IntoIter<T> {}

impl<T: fmt::Debug> fmt::Debug for IntoIter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IntoIter").field("len", &self.inner.len()).finish()
    }
}

impl<T, C> ElementsMut<'_, T, C> {
    /// Advances to the next element.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Option<&T> {
        self.inner.next().map(|(element, _)| element)
    }

    /// Position of the element returned last, or `None` before the first call to
    /// `next` and after a `remove`.
    #[must_use]
    pub fn ordinal(&self) -> Option<usize> {
        self.inner.ordinal()
    }

    #[must_use]
    pub fn remaining(&self) -> usize {
        self.inner.remaining()
    }

    /// Removes the element returned last by [`next`](ElementsMut::next).
    ///
    /// # Errors
    ///
    /// [`TreeError::UnsupportedMutation`] if there is no current element.
    pub fn remove(&mut self) -> Result<T, TreeError> {
        self.inner.remove().map(|(element, ())| element)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use alloc::vec::Vec;
    use pretty_assertions::assert_eq;

    #[test]
    fn insert_reports_novelty() {
        let mut set = CountedTreeSet::new();
        assert_eq!(set.insert(3), Ok(true));
        assert_eq!(set.insert(3), Ok(false));
        assert_eq!(set.len(), 1);
        assert_eq!(set.take(&3), Ok(Some(3)));
        assert_eq!(set.remove(&3), Ok(false));
    }

    #[test]
    fn nan_is_rejected() {
        let mut set = CountedTreeSet::new();
        set.insert(1.5).unwrap();
        assert_eq!(set.insert(f64::NAN), Err(TreeError::TypeMismatch));
        assert_eq!(set.contains(&f64::NAN), Err(TreeError::TypeMismatch));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn iter_ordinals_and_neighbours() {
        let set: CountedTreeSet<i32> = (0..40).map(|k| k * 5).collect();
        let mut iter = set.iter();
        assert_eq!(iter.nth(3), Some(&15));
        assert_eq!(iter.ordinal(), Some(3));
        assert_eq!(set.ceiling(&16), Ok(Some(&20)));
        assert_eq!(set.lower(&0), Ok(None));
        assert_eq!(set.iter().rev().take(2).copied().collect::<Vec<_>>(), [195, 190]);
    }

    #[test]
    fn debug_and_equality() {
        let a = CountedTreeSet::from([3, 1, 2]);
        let b: CountedTreeSet<i32> = [1, 2, 3].iter().copied().collect();
        assert_eq!(a, b);
        assert_eq!(alloc::format!("{a:?}"), "{1, 2, 3}");
    }
}
