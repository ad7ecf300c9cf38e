use core::fmt;
use core::hash::{Hash, Hasher};
use core::iter::FusedIterator;
use core::ops::Index;

use crate::comparator::{Comparator, NaturalOrder};
use crate::error::TreeError;
use crate::raw::{Cursor, RawTree};

mod config;
mod entries_mut;
mod ordinal;
mod range_view;

pub use crate::Ordinal;
pub use config::DEFAULT_ORDER;
pub use entries_mut::EntriesMut;
pub use range_view::{RangeView, SubMap, SubMapMut};

/// A sorted map that also answers positional queries in logarithmic time.
///
/// Entries are kept in key order under a [`Comparator`] (the key type's natural
/// ordering by default). On top of the usual sorted-map operations the map can
/// return the entry at a given position ([`get_by_ordinal`]) and the position of a
/// key ([`ordinal_of_key`]) in O(log n), because every node of the underlying
/// B-tree counts the entries below it.
///
/// Every operation that compares keys returns a `Result`: a key that the comparator
/// cannot order (such as `f64::NAN` under [`NaturalOrder`]) yields
/// [`TreeError::TypeMismatch`] and leaves the map untouched.
///
/// # Examples
///
/// ```
/// use counted_tree::{CountedTreeMap, TreeError};
///
/// let mut scores = CountedTreeMap::new();
/// scores.insert("carol", 92)?;
/// scores.insert("alice", 100)?;
/// scores.insert("bob", 85)?;
///
/// assert_eq!(scores.get(&"bob")?, Some(&85));
/// assert_eq!(scores.get_by_ordinal(1)?, (&"bob", &85));
/// assert_eq!(scores.ordinal_of_key(&"carol")?, 2);
///
/// // Position of a missing key: the number of keys below it.
/// assert_eq!(scores.ordinal_of_key(&"bert")?, 1);
/// # Ok::<(), TreeError>(())
/// ```
///
/// [`get_by_ordinal`]: CountedTreeMap::get_by_ordinal
/// [`ordinal_of_key`]: CountedTreeMap::ordinal_of_key
pub struct CountedTreeMap<K, V, C = NaturalOrder> {
    raw: RawTree<K, V, C>,
}

/// An iterator over the entries of a [`CountedTreeMap`] or of a range view, in key
/// order.
///
/// [`ordinal`](Iter::ordinal) reports the position of the entry returned last,
/// counted from the start of the map or view the iterator was created from.
///
/// # Examples
///
/// ```
/// use counted_tree::CountedTreeMap;
///
/// let map = CountedTreeMap::from([(1, "a"), (2, "b"), (3, "c")]);
/// let mut iter = map.iter();
/// assert_eq!(iter.ordinal(), None);
/// assert_eq!(iter.next(), Some((&1, &"a")));
/// assert_eq!(iter.next_back(), Some((&3, &"c")));
/// assert_eq!(iter.ordinal(), Some(2));
/// assert_eq!(iter.next(), Some((&2, &"b")));
/// assert_eq!(iter.next(), None);
/// ```
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Iter<'a, K, V, C> {
    tree: &'a RawTree<K, V, C>,
    front: Option<Cursor>,
    back: Option<Cursor>,
    // Absolute ordinal of the entry under `front`.
    front_ordinal: usize,
    remaining: usize,
    base: usize,
    last_ordinal: Option<usize>,
}

/// An owning iterator over the entries of a [`CountedTreeMap`], in key order.
pub struct IntoIter<K, V> {
    inner: alloc::vec::IntoIter<(K, V)>,
}

/// An iterator over the keys of a [`CountedTreeMap`], in order.
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Keys<'a, K, V, C> {
    inner: Iter<'a, K, V, C>,
}

/// An iterator over the values of a [`CountedTreeMap`], in key order.
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Values<'a, K, V, C> {
    inner: Iter<'a, K, V, C>,
}

impl<K, V, C> CountedTreeMap<K, V, C> {
    /// Removes every entry.
    ///
    /// # Examples
    ///
    /// ```
    /// use counted_tree::{CountedTreeMap, TreeError};
    ///
    /// let mut map = CountedTreeMap::from([(1, "a"), (2, "b")]);
    /// map.clear();
    /// assert!(map.is_empty());
    /// assert_eq!(map.first_key(), Err(TreeError::EmptyContainer));
    /// ```
    pub fn clear(&mut self) {
        self.raw.clear();
    }

    /// Returns the number of entries.
    ///
    /// # Complexity
    ///
    /// O(1)
    #[must_use]
    pub fn len(&self) -> usize {
        self.raw.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Returns the first entry in key order.
    ///
    /// # Errors
    ///
    /// [`TreeError::EmptyContainer`] if the map is empty.
    pub fn first_key_value(&self) -> Result<(&K, &V), TreeError> {
        let cursor = self.raw.first()?;
        Ok(self.raw.entry_at(&cursor))
    }

    /// Returns the last entry in key order.
    ///
    /// # Errors
    ///
    /// [`TreeError::EmptyContainer`] if the map is empty.
    pub fn last_key_value(&self) -> Result<(&K, &V), TreeError> {
        let cursor = self.raw.last()?;
        Ok(self.raw.entry_at(&cursor))
    }

    /// Returns the smallest key.
    ///
    /// # Errors
    ///
    /// [`TreeError::EmptyContainer`] if the map is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use counted_tree::CountedTreeMap;
    ///
    /// let map = CountedTreeMap::from([(3, 'c'), (1, 'a')]);
    /// assert_eq!(map.first_key(), Ok(&1));
    /// assert_eq!(map.last_key(), Ok(&3));
    /// ```
    pub fn first_key(&self) -> Result<&K, TreeError> {
        self.first_key_value().map(|(key, _)| key)
    }

    /// Returns the largest key.
    ///
    /// # Errors
    ///
    /// [`TreeError::EmptyContainer`] if the map is empty.
    pub fn last_key(&self) -> Result<&K, TreeError> {
        self.last_key_value().map(|(key, _)| key)
    }

    /// Removes and returns the first entry, or `None` if the map is empty.
    pub fn pop_first(&mut self) -> Option<(K, V)> {
        self.raw.remove_by_ordinal(0).ok()
    }

    /// Removes and returns the last entry, or `None` if the map is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use counted_tree::CountedTreeMap;
    ///
    /// let mut map = CountedTreeMap::from([(1, "a"), (2, "b")]);
    /// assert_eq!(map.pop_last(), Some((2, "b")));
    /// assert_eq!(map.pop_last(), Some((1, "a")));
    /// assert_eq!(map.pop_last(), None);
    /// ```
    pub fn pop_last(&mut self) -> Option<(K, V)> {
        let last = self.len().checked_sub(1)?;
        self.raw.remove_by_ordinal(last).ok()
    }

    /// Returns an iterator over the entries in key order.
    ///
    /// # Examples
    ///
    /// ```
    /// use counted_tree::CountedTreeMap;
    ///
    /// let map = CountedTreeMap::from([(3, "c"), (1, "a"), (2, "b")]);
    /// let keys: Vec<_> = map.iter().map(|(k, _)| *k).collect();
    /// assert_eq!(keys, [1, 2, 3]);
    /// ```
    pub fn iter(&self) -> Iter<'_, K, V, C> {
        Iter::new(&self.raw, 0, self.len())
    }

    pub fn keys(&self) -> Keys<'_, K, V, C> {
        Keys { inner: self.iter() }
    }

    pub fn values(&self) -> Values<'_, K, V, C> {
        Values { inner: self.iter() }
    }
}

impl<K, V, C: Comparator<K>> CountedTreeMap<K, V, C> {
    /// Inserts a key-value pair, returning the previous value of an existing key.
    ///
    /// Overwriting does not change the length or the key's position.
    ///
    /// # Errors
    ///
    /// [`TreeError::TypeMismatch`] if the comparator cannot order `key`, even against
    /// itself.
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
    /// let mut map = CountedTreeMap::new();
    /// assert_eq!(map.insert(37, "a"), Ok(None));
    /// assert_eq!(map.insert(37, "b"), Ok(Some("a")));
    /// assert_eq!(map.len(), 1);
    ///
    /// let mut floats = CountedTreeMap::new();
    /// assert_eq!(floats.insert(f64::NAN, ()), Err(TreeError::TypeMismatch));
    /// ```
    pub fn insert(&mut self, key: K, value: V) -> Result<Option<V>, TreeError> {
        self.raw.insert(key, value)
    }

    /// Returns the value stored under `key`.
    ///
    /// # Errors
    ///
    /// [`TreeError::TypeMismatch`] if `key` cannot be ordered against the stored keys.
    pub fn get(&self, key: &K) -> Result<Option<&V>, TreeError> {
        Ok(self.raw.get(key)?.map(|(_, value)| value))
    }

    /// Returns the stored key and value for `key`.
    ///
    /// # Errors
    ///
    /// [`TreeError::TypeMismatch`] if `key` cannot be ordered against the stored keys.
    pub fn get_key_value(&self, key: &K) -> Result<Option<(&K, &V)>, TreeError> {
        self.raw.get(key)
    }

    /// Returns a mutable reference to the value stored under `key`.
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
    /// let mut map = CountedTreeMap::from([(1, "a")]);
    /// if let Some(value) = map.get_mut(&1).unwrap() {
    ///     *value = "b";
    /// }
    /// assert_eq!(map.get(&1), Ok(Some(&"b")));
    /// ```
    pub fn get_mut(&mut self, key: &K) -> Result<Option<&mut V>, TreeError> {
        self.raw.get_mut(key)
    }

    /// # Errors
    ///
    /// [`TreeError::TypeMismatch`] if `key` cannot be ordered against the stored keys.
    pub fn contains_key(&self, key: &K) -> Result<bool, TreeError> {
        Ok(self.raw.get(key)?.is_some())
    }

    /// Removes `key`, returning its value if it was present.
    ///
    /// # Errors
    ///
    /// [`TreeError::TypeMismatch`] if `key` cannot be ordered against the stored keys.
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn remove(&mut self, key: &K) -> Result<Option<V>, TreeError> {
        Ok(self.raw.remove(key)?.map(|(_, value)| value))
    }

    /// Removes `key`, returning the stored key and value if it was present.
    ///
    /// # Errors
    ///
    /// [`TreeError::TypeMismatch`] if `key` cannot be ordered against the stored keys.
    pub fn remove_entry(&mut self, key: &K) -> Result<Option<(K, V)>, TreeError> {
        self.raw.remove(key)
    }

    /// Returns the entry with the smallest key greater than or equal to `key`.
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
    /// let map = CountedTreeMap::from([(10, 'a'), (20, 'b')]);
    /// assert_eq!(map.ceiling_key_value(&15), Ok(Some((&20, &'b'))));
    /// assert_eq!(map.lower_key_value(&15), Ok(Some((&10, &'a'))));
    /// assert_eq!(map.ceiling_key_value(&21), Ok(None));
    /// ```
    pub fn ceiling_key_value(&self, key: &K) -> Result<Option<(&K, &V)>, TreeError> {
        Ok(self.raw.ceiling(key)?.map(|cursor| self.raw.entry_at(&cursor)))
    }

    /// Returns the entry with the largest key strictly less than `key`.
    ///
    /// # Errors
    ///
    /// [`TreeError::TypeMismatch`] if `key` cannot be ordered against the stored keys.
    pub fn lower_key_value(&self, key: &K) -> Result<Option<(&K, &V)>, TreeError> {
        Ok(self.raw.lower(key)?.map(|cursor| self.raw.entry_at(&cursor)))
    }
}

impl<K: Clone, V: Clone, C: Clone> Clone for CountedTreeMap<K, V, C> {
    fn clone(&self) -> Self {
        CountedTreeMap { raw: self.raw.clone() }
    }
}

impl<K: Hash, V: Hash, C> Hash for CountedTreeMap<K, V, C> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.len().hash(state);
        for (k, v) in self {
            k.hash(state);
            v.hash(state);
        }
    }
}

impl<K: PartialEq, V: PartialEq, C> PartialEq for CountedTreeMap<K, V, C> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().zip(other.iter()).all(|(a, b)| a == b)
    }
}

impl<K: Eq, V: Eq, C> Eq for CountedTreeMap<K, V, C> {}

impl<K: fmt::Debug, V: fmt::Debug, C> fmt::Debug for CountedTreeMap<K, V, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K, V, C: Default> Default for CountedTreeMap<K, V, C> {
    fn default() -> Self {
        CountedTreeMap::with_order_and_comparator(DEFAULT_ORDER, C::default())
    }
}

/// # Panics
///
/// Panics if a key cannot be ordered (e.g. `f64::NAN`).
impl<K: PartialOrd, V> FromIterator<(K, V)> for CountedTreeMap<K, V> {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut map = CountedTreeMap::new();
        map.extend(iter);
        map
    }
}

/// # Panics
///
/// Panics if a key cannot be ordered under the map's comparator.
impl<K, V, C: Comparator<K>> Extend<(K, V)> for CountedTreeMap<K, V, C> {
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        for (k, v) in iter {
            if let Err(error) = self.insert(k, v) {
                panic!("`CountedTreeMap::extend()` - {error}");
            }
        }
    }
}

impl<'a, K: Copy, V: Copy, C: Comparator<K>> Extend<(&'a K, &'a V)> for CountedTreeMap<K, V, C> {
    fn extend<T: IntoIterator<Item = (&'a K, &'a V)>>(&mut self, iter: T) {
        self.extend(iter.into_iter().map(|(&k, &v)| (k, v)));
    }
}

impl<K: PartialOrd, V, const N: usize> From<[(K, V); N]> for CountedTreeMap<K, V> {
    fn from(arr: [(K, V); N]) -> Self {
        arr.into_iter().collect()
    }
}

impl<'a, K, V, C> IntoIterator for &'a CountedTreeMap<K, V, C> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V, C>;

    fn into_iter(self) -> Iter<'a, K, V, C> {
        self.iter()
    }
}

impl<K, V, C> IntoIterator for CountedTreeMap<K, V, C> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;

    /// Moves the entries out in key order.
    ///
    /// # Examples
    ///
    /// ```
    /// use counted_tree::CountedTreeMap;
    ///
    /// let map = CountedTreeMap::from([(2, "b"), (1, "a")]);
    /// let entries: Vec<_> = map.into_iter().collect();
    /// assert_eq!(entries, [(1, "a"), (2, "b")]);
    /// ```
    fn into_iter(mut self) -> IntoIter<K, V> {
        IntoIter {
            inner: self.raw.drain_sorted().into_iter(),
        }
    }
}

/// Looks up a value by key.
///
/// # Panics
///
/// Panics if the key is absent or cannot be ordered.
impl<K, V, C: Comparator<K>> Index<&K> for CountedTreeMap<K, V, C> {
    type Output = V;

    fn index(&self, key: &K) -> &V {
        match self.get(key) {
            Ok(Some(value)) => value,
            Ok(None) => panic!("no entry found for key"),
            Err(error) => panic!("{error}"),
        }
    }
}

impl<'a, K, V, C> Iter<'a, K, V, C> {
    /// Iterates over the absolute ordinals `start..end` of `tree`.
    pub(crate) fn new(tree: &'a RawTree<K, V, C>, start: usize, end: usize) -> Self {
        let (front, back) = if start < end {
            (tree.cursor_at(start).ok(), tree.cursor_at(end - 1).ok())
        } else {
            (None, None)
        };
        let remaining = if front.is_some() && back.is_some() { end - start } else { 0 };
        Iter {
            tree,
            front,
            back,
            front_ordinal: start,
            remaining,
            base: start,
            last_ordinal: None,
        }
    }

    /// Position of the entry returned last by `next` or `next_back`, or `None` before
    /// the first call.
    #[must_use]
    pub fn ordinal(&self) -> Option<usize> {
        self.last_ordinal.map(|ordinal| ordinal - self.base)
    }
}

impl<'a, K, V, C> Iterator for Iter<'a, K, V, C> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let tree = self.tree;
        let cursor = self.front.as_mut()?;
        let entry = tree.entry_at(cursor);
        self.last_ordinal = Some(self.front_ordinal);
        self.front_ordinal += 1;
        self.remaining -= 1;
        if self.remaining > 0 {
            let moved = cursor.forward(tree);
            debug_assert!(moved, "Iter::next: entries left but no successor");
            debug_assert!(
                self.back.as_ref().is_none_or(|back| cursor.position_cmp(back).is_le()),
                "Iter::next: front cursor passed back cursor"
            );
        }
        Some(entry)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V, C> DoubleEndedIterator for Iter<'_, K, V, C> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let tree = self.tree;
        let cursor = self.back.as_mut()?;
        let entry = tree.entry_at(cursor);
        self.last_ordinal = Some(self.front_ordinal + self.remaining - 1);
        self.remaining -= 1;
        if self.remaining > 0 {
            let moved = cursor.backward(tree);
            debug_assert!(moved, "Iter::next_back: entries left but no predecessor");
        }
        Some(entry)
    }
}

impl<K, V, C> ExactSizeIterator for Iter<'_, K, V, C> {
    fn len(&self) -> usize {
        self.remaining
    }
}

impl<K, V, C> FusedIterator for Iter<'_, K, V, C> {}

impl<K, V, C> Clone for Iter<'_, K, V, C> {
    fn clone(&self) -> Self {
        Iter {
            tree: self.tree,
            front: self.front.clone(),
            back: self.back.clone(),
            front_ordinal: self.front_ordinal,
            remaining: self.remaining,
            base: self.base,
            last_ordinal: self.last_ordinal,
        }
    }
}

impl<K: fmt::Debug, V: fmt::Debug, C> fmt::Debug for Iter<'_, K, V, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

impl<K, V> Iterator for IntoIter<K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for IntoIter<K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back()
    }
}

impl<K, V> ExactSizeIterator for IntoIter<K, V> {
    fn len(&self) -> usize {
        self.inner.len()
    }
}

impl<K, V> FusedIterator for IntoIter<K, V> {}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for IntoIter<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IntoIter").field("len", &self.inner.len()).finish()
    }
}

impl<K, V, C> Keys<'_, K, V, C> {
    /// Position of the key returned last.
    #[must_use]
    pub fn ordinal(&self) -> Option<usize> {
        self.inner.ordinal()
    }
}

impl<'a, K, V, C> Iterator for Keys<'a, K, V, C> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, _)| k)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V, C> DoubleEndedIterator for Keys<'_, K, V, C> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(k, _)| k)
    }
}

impl<K, V, C> ExactSizeIterator for Keys<'_, K, V, C> {
    fn len(&self) -> usize {
        self.inner.len()
    }
}

impl<K, V, C> FusedIterator for Keys<'_, K, V, C> {}

impl<K, V, C> Clone for Keys<'_, K, V, C> {
    fn clone(&self) -> Self {
        Keys {
            inner: self.inner.clone(),
        }
    }
}

impl<K: fmt::Debug, V, C> fmt::Debug for Keys<'_, K, V, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

impl<K, V, C> Values<'_, K, V, C> {
    /// Position of the value returned last.
    #[must_use]
    pub fn ordinal(&self) -> Option<usize> {
        self.inner.ordinal()
    }
}

impl<'a, K, V, C> Iterator for Values<'a, K, V, C> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, v)| v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V, C> DoubleEndedIterator for Values<'_, K, V, C> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(_, v)| v)
    }
}

impl<K, V, C> ExactSizeIterator for Values<'_, K, V, C> {
    fn len(&self) -> usize {
        self.inner.len()
    }
}

impl<K, V, C> FusedIterator for Values<'_, K, V, C> {}

impl<K, V, C> Clone for Values<'_, K, V, C> {
    fn clone(&self) -> Self {
        Values {
            inner: self.inner.clone(),
        }
    }
}

impl<K, V: fmt::Debug, C> fmt::Debug for Values<'_, K, V, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}
