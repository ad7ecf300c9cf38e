//! Bounded windows over a [`CountedTreeMap`].
//!
//! A view never copies entries. It keeps a borrow of the map together with an
//! inclusive lower and an exclusive upper key bound, and translates every call into
//! a call on the whole map: keys are filtered against the bounds and ordinals are
//! shifted by the ordinal of the lower bound, computed afresh on each call.

use core::cmp::Ordering;
use core::fmt;
use core::marker::PhantomData;
use core::ops::{Deref, DerefMut};

use super::{CountedTreeMap, EntriesMut, Iter, Keys, Values};
use crate::comparator::{Comparator, NaturalOrder};
use crate::error::TreeError;

/// A window `[from, to)` over the keys of a map.
///
/// `R` is the borrow of the underlying map: `&CountedTreeMap` for a read-only view
/// ([`SubMap`]) or `&mut CountedTreeMap` for a view that can also insert and remove
/// ([`SubMapMut`]). A missing bound leaves that side open.
///
/// # Examples
///
/// ```
/// use counted_tree::{CountedTreeMap, TreeError};
///
/// let mut map: CountedTreeMap<i32, i32> = (1..=100).map(|k| (k, k)).collect();
///
/// let view = map.sub_map(10, 20)?;
/// assert_eq!(view.len()?, 10);
/// assert_eq!(view.ordinal_of_key(&15)?, 5);
/// assert_eq!(view.first_key()?, &10);
/// assert_eq!(view.last_key()?, &19);
///
/// let mut tail = map.tail_map_mut(90)?;
/// assert_eq!(tail.insert(5, 0), Err(TreeError::IllegalBound));
/// tail.clear()?;
/// assert_eq!(map.len(), 89);
/// # Ok::<(), TreeError>(())
/// ```
pub struct RangeView<K, V, C, R> {
    map: R,
    from: Option<K>,
    to: Option<K>,
    // Names `V` and `C` so that a borrow of the view bounds their lifetimes.
    marker: PhantomData<fn() -> (V, C)>,
}

/// A read-only view over a borrowed map.
pub type SubMap<'a, K, V, C = NaturalOrder> = RangeView<K, V, C, &'a CountedTreeMap<K, V, C>>;

/// A mutable view over a borrowed map.
pub type SubMapMut<'a, K, V, C = NaturalOrder> = RangeView<K, V, C, &'a mut CountedTreeMap<K, V, C>>;

impl<K, V, C, R> RangeView<K, V, C, R>
where
    R: Deref<Target = CountedTreeMap<K, V, C>>,
    C: Comparator<K>,
{
    pub(crate) fn new(map: R, from: Option<K>, to: Option<K>) -> Result<Self, TreeError> {
        let view = RangeView {
            map,
            from,
            to,
            marker: PhantomData,
        };
        let raw = &view.map.raw;
        for bound in [&view.from, &view.to].into_iter().flatten() {
            if raw.compare(bound, bound)? != Ordering::Equal {
                return Err(TreeError::TypeMismatch);
            }
        }
        if let (Some(from), Some(to)) = (&view.from, &view.to)
            && raw.compare(from, to)? == Ordering::Greater
        {
            return Err(TreeError::IllegalBound);
        }
        Ok(view)
    }

    /// The inclusive lower bound, if any.
    #[must_use]
    pub fn from_key(&self) -> Option<&K> {
        self.from.as_ref()
    }

    /// The exclusive upper bound, if any.
    #[must_use]
    pub fn to_key(&self) -> Option<&K> {
        self.to.as_ref()
    }

    /// Whether `key` lies within `[from, to)`.
    ///
    /// # Errors
    ///
    /// [`TreeError::TypeMismatch`] if `key` cannot be ordered against the bounds.
    pub fn in_range(&self, key: &K) -> Result<bool, TreeError> {
        let raw = &self.map.raw;
        if let Some(from) = &self.from
            && raw.compare(key, from)? == Ordering::Less
        {
            return Ok(false);
        }
        if let Some(to) = &self.to
            && raw.compare(key, to)? != Ordering::Less
        {
            return Ok(false);
        }
        Ok(true)
    }

    // Absolute ordinals of the first entry in the window and of the first one past it.
    fn window(&self) -> Result<(usize, usize), TreeError> {
        let raw = &self.map.raw;
        let start = match &self.from {
            Some(from) => raw.ordinal_of_key(from)?,
            None => 0,
        };
        let end = match &self.to {
            Some(to) => raw.ordinal_of_key(to)?,
            None => raw.len(),
        };
        Ok((start, end.max(start)))
    }

    // Absolute ordinal of `ordinal` within the window.
    fn absolute(&self, ordinal: usize) -> Result<usize, TreeError> {
        let (start, end) = self.window()?;
        let len = end - start;
        if len == 0 {
            return Err(TreeError::EmptyContainer);
        }
        if ordinal >= len {
            return Err(TreeError::OutOfRange { ordinal, len });
        }
        Ok(start + ordinal)
    }

    /// Number of entries inside the window.
    ///
    /// # Errors
    ///
    /// [`TreeError::TypeMismatch`] if a bound cannot be ordered against the stored keys.
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn len(&self) -> Result<usize, TreeError> {
        let (start, end) = self.window()?;
        Ok(end - start)
    }

    /// # Errors
    ///
    /// Same as [`len`](Self::len).
    pub fn is_empty(&self) -> Result<bool, TreeError> {
        Ok(self.len()? == 0)
    }

    /// Returns the value of `key`; keys outside the window are reported absent.
    ///
    /// # Errors
    ///
    /// [`TreeError::TypeMismatch`] if `key` cannot be ordered.
    pub fn get(&self, key: &K) -> Result<Option<&V>, TreeError> {
        Ok(self.get_key_value(key)?.map(|(_, value)| value))
    }

    /// # Errors
    ///
    /// [`TreeError::TypeMismatch`] if `key` cannot be ordered.
    pub fn get_key_value(&self, key: &K) -> Result<Option<(&K, &V)>, TreeError> {
        if !self.in_range(key)? {
            return Ok(None);
        }
        self.map.get_key_value(key)
    }

    /// # Errors
    ///
    /// [`TreeError::TypeMismatch`] if `key` cannot be ordered.
    pub fn contains_key(&self, key: &K) -> Result<bool, TreeError> {
        Ok(self.get_key_value(key)?.is_some())
    }

    /// Returns the entry at position `ordinal` within the window.
    ///
    /// # Errors
    ///
    /// [`TreeError::EmptyContainer`] if the window is empty, otherwise
    /// [`TreeError::OutOfRange`] if `ordinal` is not below the window length.
    pub fn get_by_ordinal(&self, ordinal: usize) -> Result<(&K, &V), TreeError> {
        let absolute = self.absolute(ordinal)?;
        self.map.get_by_ordinal(absolute)
    }

    /// Position of `key` relative to the window start.
    ///
    /// Keys below the window map to `0` and keys at or above its upper bound to
    /// `len()`.
    ///
    /// # Errors
    ///
    /// [`TreeError::TypeMismatch`] if `key` cannot be ordered.
    pub fn ordinal_of_key(&self, key: &K) -> Result<usize, TreeError> {
        let (start, end) = self.window()?;
        Ok(self.map.ordinal_of_key(key)?.clamp(start, end) - start)
    }

    /// Position of `key` relative to the window start, or `None` when the key is
    /// absent or outside the window.
    ///
    /// # Errors
    ///
    /// [`TreeError::TypeMismatch`] if `key` cannot be ordered.
    pub fn rank_of(&self, key: &K) -> Result<Option<usize>, TreeError> {
        if !self.in_range(key)? {
            return Ok(None);
        }
        let (start, _) = self.window()?;
        Ok(self.map.rank_of(key)?.map(|rank| rank - start))
    }

    /// The first entry at or above the lower bound, if it is below the upper bound.
    ///
    /// # Errors
    ///
    /// [`TreeError::EmptyContainer`] if the window is empty.
    pub fn first_key_value(&self) -> Result<(&K, &V), TreeError> {
        let raw = &self.map.raw;
        let cursor = match &self.from {
            Some(from) => raw.ceiling(from)?,
            None => raw.first().ok(),
        };
        let entry = cursor.map(|cursor| raw.entry_at(&cursor)).ok_or(TreeError::EmptyContainer)?;
        if let Some(to) = &self.to
            && raw.compare(entry.0, to)? != Ordering::Less
        {
            return Err(TreeError::EmptyContainer);
        }
        Ok(entry)
    }

    /// The last entry below the upper bound, if it is at or above the lower bound.
    ///
    /// # Errors
    ///
    /// [`TreeError::EmptyContainer`] if the window is empty.
    pub fn last_key_value(&self) -> Result<(&K, &V), TreeError> {
        let raw = &self.map.raw;
        let cursor = match &self.to {
            Some(to) => raw.lower(to)?,
            None => raw.last().ok(),
        };
        let entry = cursor.map(|cursor| raw.entry_at(&cursor)).ok_or(TreeError::EmptyContainer)?;
        if let Some(from) = &self.from
            && raw.compare(entry.0, from)? == Ordering::Less
        {
            return Err(TreeError::EmptyContainer);
        }
        Ok(entry)
    }

    /// # Errors
    ///
    /// [`TreeError::EmptyContainer`] if the window is empty.
    pub fn first_key(&self) -> Result<&K, TreeError> {
        self.first_key_value().map(|(key, _)| key)
    }

    /// # Errors
    ///
    /// [`TreeError::EmptyContainer`] if the window is empty.
    pub fn last_key(&self) -> Result<&K, TreeError> {
        self.last_key_value().map(|(key, _)| key)
    }

    /// Iterates over the entries of the window; [`Iter::ordinal`] counts from the
    /// window start.
    ///
    /// # Errors
    ///
    /// [`TreeError::TypeMismatch`] if a bound cannot be ordered against the stored keys.
    pub fn iter(&self) -> Result<Iter<'_, K, V, C>, TreeError> {
        let (start, end) = self.window()?;
        Ok(Iter::new(&self.map.raw, start, end))
    }

    /// # Errors
    ///
    /// Same as [`iter`](Self::iter).
    pub fn keys(&self) -> Result<Keys<'_, K, V, C>, TreeError> {
        Ok(Keys { inner: self.iter()? })
    }

    /// # Errors
    ///
    /// Same as [`iter`](Self::iter).
    pub fn values(&self) -> Result<Values<'_, K, V, C>, TreeError> {
        Ok(Values { inner: self.iter()? })
    }

    // Bounds of a nested view; each given bound must lie in the closed range
    // `[from, to]` of this view and a missing one is inherited.
    fn narrow(&self, from: Option<K>, to: Option<K>) -> Result<(Option<K>, Option<K>), TreeError>
    where
        K: Clone,
    {
        let raw = &self.map.raw;
        for bound in [&from, &to].into_iter().flatten() {
            let below = match &self.from {
                Some(lower) => raw.compare(bound, lower)? == Ordering::Less,
                None => false,
            };
            let above = match &self.to {
                Some(upper) => raw.compare(bound, upper)? == Ordering::Greater,
                None => false,
            };
            if below || above {
                return Err(TreeError::IllegalBound);
            }
        }
        Ok((from.or_else(|| self.from.clone()), to.or_else(|| self.to.clone())))
    }

    /// A read-only view of `[from, to)` inside this one.
    ///
    /// # Errors
    ///
    /// [`TreeError::IllegalBound`] if a bound lies outside this view or `from > to`,
    /// [`TreeError::TypeMismatch`] if a bound cannot be ordered.
    pub fn sub_map(&self, from: K, to: K) -> Result<SubMap<'_, K, V, C>, TreeError>
    where
        K: Clone,
    {
        let (from, to) = self.narrow(Some(from), Some(to))?;
        RangeView::new(&*self.map, from, to)
    }

    /// A read-only view of the keys below `to` inside this one.
    ///
    /// # Errors
    ///
    /// Same as [`sub_map`](Self::sub_map).
    pub fn head_map(&self, to: K) -> Result<SubMap<'_, K, V, C>, TreeError>
    where
        K: Clone,
    {
        let (from, to) = self.narrow(None, Some(to))?;
        RangeView::new(&*self.map, from, to)
    }

    /// A read-only view of the keys at or above `from` inside this one.
    ///
    /// # Errors
    ///
    /// Same as [`sub_map`](Self::sub_map).
    pub fn tail_map(&self, from: K) -> Result<SubMap<'_, K, V, C>, TreeError>
    where
        K: Clone,
    {
        let (from, to) = self.narrow(Some(from), None)?;
        RangeView::new(&*self.map, from, to)
    }
}

impl<K, V, C, R> RangeView<K, V, C, R>
where
    R: DerefMut<Target = CountedTreeMap<K, V, C>>,
    C: Comparator<K>,
{
    /// Inserts into the underlying map.
    ///
    /// # Errors
    ///
    /// [`TreeError::IllegalBound`] if `key` lies outside the window,
    /// [`TreeError::TypeMismatch`] if it cannot be ordered.
    pub fn insert(&mut self, key: K, value: V) -> Result<Option<V>, TreeError> {
        if !self.in_range(&key)? {
            return Err(TreeError::IllegalBound);
        }
        self.map.insert(key, value)
    }

    /// # Errors
    ///
    /// [`TreeError::TypeMismatch`] if `key` cannot be ordered.
    pub fn get_mut(&mut self, key: &K) -> Result<Option<&mut V>, TreeError> {
        if !self.in_range(key)? {
            return Ok(None);
        }
        self.map.get_mut(key)
    }

    /// Removes `key` if it is inside the window; keys outside are left alone and
    /// reported absent.
    ///
    /// # Errors
    ///
    /// [`TreeError::TypeMismatch`] if `key` cannot be ordered.
    pub fn remove(&mut self, key: &K) -> Result<Option<V>, TreeError> {
        if !self.in_range(key)? {
            return Ok(None);
        }
        self.map.remove(key)
    }

    /// # Errors
    ///
    /// Same as [`get_by_ordinal`](Self::get_by_ordinal).
    pub fn get_by_ordinal_mut(&mut self, ordinal: usize) -> Result<(&K, &mut V), TreeError> {
        let absolute = self.absolute(ordinal)?;
        self.map.get_by_ordinal_mut(absolute)
    }

    /// Removes the entry at position `ordinal` within the window.
    ///
    /// # Errors
    ///
    /// Same as [`get_by_ordinal`](Self::get_by_ordinal).
    pub fn remove_by_ordinal(&mut self, ordinal: usize) -> Result<(K, V), TreeError> {
        let absolute = self.absolute(ordinal)?;
        self.map.remove_by_ordinal(absolute)
    }

    /// Removes and returns the first entry of the window, or `None` if it is empty.
    ///
    /// # Errors
    ///
    /// [`TreeError::TypeMismatch`] if a bound cannot be ordered against the stored keys.
    pub fn pop_first(&mut self) -> Result<Option<(K, V)>, TreeError> {
        match self.remove_by_ordinal(0) {
            Ok(entry) => Ok(Some(entry)),
            Err(TreeError::EmptyContainer) => Ok(None),
            Err(error) => Err(error),
        }
    }

    /// Removes and returns the last entry of the window, or `None` if it is empty.
    ///
    /// # Errors
    ///
    /// [`TreeError::TypeMismatch`] if a bound cannot be ordered against the stored keys.
    pub fn pop_last(&mut self) -> Result<Option<(K, V)>, TreeError> {
        let Some(last) = self.len()?.checked_sub(1) else {
            return Ok(None);
        };
        self.remove_by_ordinal(last).map(Some)
    }

    /// Removes every entry inside the window from the underlying map.
    ///
    /// # Errors
    ///
    /// [`TreeError::TypeMismatch`] if a bound cannot be ordered against the stored keys.
    pub fn clear(&mut self) -> Result<(), TreeError> {
        let (start, end) = self.window()?;
        for _ in start..end {
            self.map.raw.remove_by_ordinal(start)?;
        }
        Ok(())
    }

    /// A mutating cursor over the entries of the window.
    ///
    /// # Errors
    ///
    /// [`TreeError::TypeMismatch`] if a bound cannot be ordered against the stored keys.
    pub fn entries_mut(&mut self) -> Result<EntriesMut<'_, K, V, C>, TreeError> {
        let (start, end) = self.window()?;
        Ok(EntriesMut::new(&mut self.map.raw, start, end))
    }

    /// A mutable view of `[from, to)` inside this one.
    ///
    /// # Errors
    ///
    /// Same as [`sub_map`](Self::sub_map).
    pub fn sub_map_mut(&mut self, from: K, to: K) -> Result<SubMapMut<'_, K, V, C>, TreeError>
    where
        K: Clone,
    {
        let (from, to) = self.narrow(Some(from), Some(to))?;
        RangeView::new(&mut *self.map, from, to)
    }

    /// # Errors
    ///
    /// Same as [`sub_map`](Self::sub_map).
    pub fn head_map_mut(&mut self, to: K) -> Result<SubMapMut<'_, K, V, C>, TreeError>
    where
        K: Clone,
    {
        let (from, to) = self.narrow(None, Some(to))?;
        RangeView::new(&mut *self.map, from, to)
    }

    /// # Errors
    ///
    /// Same as [`sub_map`](Self::sub_map).
    pub fn tail_map_mut(&mut self, from: K) -> Result<SubMapMut<'_, K, V, C>, TreeError>
    where
        K: Clone,
    {
        let (from, to) = self.narrow(Some(from), None)?;
        RangeView::new(&mut *self.map, from, to)
    }
}

impl<K, V, C, R> fmt::Debug for RangeView<K, V, C, R>
where
    K: fmt::Debug,
    V: fmt::Debug,
    R: Deref<Target = CountedTreeMap<K, V, C>>,
    C: Comparator<K>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.iter() {
            Ok(iter) => f.debug_map().entries(iter).finish(),
            Err(_) => f.debug_struct("RangeView").finish_non_exhaustive(),
        }
    }
}

impl<K, V, C: Comparator<K>> CountedTreeMap<K, V, C> {
    /// A read-only view of the keys in `[from, to)`.
    ///
    /// # Errors
    ///
    /// [`TreeError::IllegalBound`] if `from > to`, [`TreeError::TypeMismatch`] if a
    /// bound cannot be ordered.
    pub fn sub_map(&self, from: K, to: K) -> Result<SubMap<'_, K, V, C>, TreeError> {
        RangeView::new(self, Some(from), Some(to))
    }

    /// A read-only view of the keys below `to`.
    ///
    /// # Errors
    ///
    /// [`TreeError::TypeMismatch`] if `to` cannot be ordered.
    pub fn head_map(&self, to: K) -> Result<SubMap<'_, K, V, C>, TreeError> {
        RangeView::new(self, None, Some(to))
    }

    /// A read-only view of the keys at or above `from`.
    ///
    /// # Errors
    ///
    /// [`TreeError::TypeMismatch`] if `from` cannot be ordered.
    pub fn tail_map(&self, from: K) -> Result<SubMap<'_, K, V, C>, TreeError> {
        RangeView::new(self, Some(from), None)
    }

    /// A mutable view of the keys in `[from, to)`.
    ///
    /// # Errors
    ///
    /// Same as [`sub_map`](Self::sub_map).
    pub fn sub_map_mut(&mut self, from: K, to: K) -> Result<SubMapMut<'_, K, V, C>, TreeError> {
        RangeView::new(self, Some(from), Some(to))
    }

    /// # Errors
    ///
    /// Same as [`head_map`](Self::head_map).
    pub fn head_map_mut(&mut self, to: K) -> Result<SubMapMut<'_, K, V, C>, TreeError> {
        RangeView::new(self, None, Some(to))
    }

    /// # Errors
    ///
    /// Same as [`tail_map`](Self::tail_map).
    pub fn tail_map_mut(&mut self, from: K) -> Result<SubMapMut<'_, K, V, C>, TreeError> {
        RangeView::new(self, Some(from), None)
    }
}
