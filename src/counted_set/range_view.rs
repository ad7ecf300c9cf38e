use core::fmt;
use core::ops::{Deref, DerefMut};

use super::{CountedTreeSet, ElementsMut, Iter};
use crate::comparator::{Comparator, NaturalOrder};
use crate::counted_map::{CountedTreeMap, RangeView};
use crate::error::TreeError;

/// A window `[from, to)` over the elements of a set.
///
/// Thin wrapper around the map's [`RangeView`] over the set's backing map; see there
/// for how bounds, ordinals and out-of-window keys are handled.
///
/// # Examples
///
/// ```
/// use counted_tree::{CountedTreeSet, TreeError};
///
/// let mut set: CountedTreeSet<i32> = (1..=100).collect();
/// {
///     let mut teens = set.sub_set_mut(13, 20)?;
///     assert_eq!(teens.len()?, 7);
///     assert_eq!(teens.insert(21), Err(TreeError::IllegalBound));
///     assert!(teens.remove(&13)?);
/// }
/// assert_eq!(set.len(), 99);
/// assert_eq!(set.head_set(10)?.last()?, &9);
/// # Ok::<(), TreeError>(())
/// ```
pub struct SetView<T, C, R> {
    inner: RangeView<T, (), C, R>,
}

/// A read-only view over a borrowed set.
pub type SubSet<'a, T, C = NaturalOrder> = SetView<T, C, &'a CountedTreeMap<T, (), C>>;

/// A mutable view over a borrowed set.
pub type SubSetMut<'a, T, C = NaturalOrder> = SetView<T, C, &'a mut CountedTreeMap<T, (), C>>;

impl<T, C, R> SetView<T, C, R>
where
    R: Deref<Target = CountedTreeMap<T, (), C>>,
    C: Comparator<T>,
{
    /// Number of elements inside the window.
    ///
    /// # Errors
    ///
    /// [`TreeError::TypeMismatch`] if a bound cannot be ordered against the elements.
    pub fn len(&self) -> Result<usize, TreeError> {
        self.inner.len()
    }

    /// # Errors
    ///
    /// Same as [`len`](Self::len).
    pub fn is_empty(&self) -> Result<bool, TreeError> {
        self.inner.is_empty()
    }

    /// Whether `element` is in the set and inside the window.
    ///
    /// # Errors
    ///
    /// [`TreeError::TypeMismatch`] if `element` cannot be ordered.
    pub fn contains(&self, element: &T) -> Result<bool, TreeError> {
        self.inner.contains_key(element)
    }

    /// # Errors
    ///
    /// [`TreeError::EmptyContainer`] if the window is empty.
    pub fn first(&self) -> Result<&T, TreeError> {
        self.inner.first_key()
    }

    /// # Errors
    ///
    /// [`TreeError::EmptyContainer`] if the window is empty.
    pub fn last(&self) -> Result<&T, TreeError> {
        self.inner.last_key()
    }

    /// # Errors
    ///
    /// [`TreeError::EmptyContainer`] if the window is empty, otherwise
    /// [`TreeError::OutOfRange`] if `ordinal` is not below the window length.
    pub fn get_by_ordinal(&self, ordinal: usize) -> Result<&T, TreeError> {
        self.inner.get_by_ordinal(ordinal).map(|(element, ())| element)
    }

    /// Position of `element` relative to the window start, clamped to `0..=len()`.
    ///
    /// # Errors
    ///
    /// [`TreeError::TypeMismatch`] if `element` cannot be ordered.
    pub fn ordinal_of(&self, element: &T) -> Result<usize, TreeError> {
        self.inner.ordinal_of_key(element)
    }

    /// # Errors
    ///
    /// [`TreeError::TypeMismatch`] if `element` cannot be ordered.
    pub fn rank_of(&self, element: &T) -> Result<Option<usize>, TreeError> {
        self.inner.rank_of(element)
    }

    /// # Errors
    ///
    /// [`TreeError::TypeMismatch`] if a bound cannot be ordered against the elements.
    pub fn iter(&self) -> Result<Iter<'_, T, C>, TreeError> {
        Ok(Iter {
            inner: self.inner.keys()?,
        })
    }

    /// # Errors
    ///
    /// [`TreeError::IllegalBound`] if a bound lies outside this view or `from > to`.
    pub fn sub_set(&self, from: T, to: T) -> Result<SubSet<'_, T, C>, TreeError>
    where
        T: Clone,
    {
        Ok(SetView {
            inner: self.inner.sub_map(from, to)?,
        })
    }

    /// # Errors
    ///
    /// Same as [`sub_set`](Self::sub_set).
    pub fn head_set(&self, to: T) -> Result<SubSet<'_, T, C>, TreeError>
    where
        T: Clone,
    {
        Ok(SetView {
            inner: self.inner.head_map(to)?,
        })
    }

    /// # Errors
    ///
    /// Same as [`sub_set`](Self::sub_set).
    pub fn tail_set(&self, from: T) -> Result<SubSet<'_, T, C>, TreeError>
    where
        T: Clone,
    {
        Ok(SetView {
            inner: self.inner.tail_map(from)?,
        })
    }
}

impl<T, C, R> SetView<T, C, R>
where
    R: DerefMut<Target = CountedTreeMap<T, (), C>>,
    C: Comparator<T>,
{
    /// Adds `element` to the underlying set.
    ///
    /// # Errors
    ///
    /// [`TreeError::IllegalBound`] if `element` lies outside the window.
    pub fn insert(&mut self, element: T) -> Result<bool, TreeError> {
        Ok(self.inner.insert(element, ())?.is_none())
    }

    /// Removes `element` if it is inside the window.
    ///
    /// # Errors
    ///
    /// [`TreeError::TypeMismatch`] if `element` cannot be ordered.
    pub fn remove(&mut self, element: &T) -> Result<bool, TreeError> {
        Ok(self.inner.remove(element)?.is_some())
    }

    /// # Errors
    ///
    /// Same as [`get_by_ordinal`](Self::get_by_ordinal).
    pub fn remove_by_ordinal(&mut self, ordinal: usize) -> Result<T, TreeError> {
        self.inner.remove_by_ordinal(ordinal).map(|(element, ())| element)
    }

    /// # Errors
    ///
    /// [`TreeError::TypeMismatch`] if a bound cannot be ordered against the elements.
    pub fn pop_first(&mut self) -> Result<Option<T>, TreeError> {
        Ok(self.inner.pop_first()?.map(|(element, ())| element))
    }

    /// # Errors
    ///
    /// Same as [`pop_first`](Self::pop_first).
    pub fn pop_last(&mut self) -> Result<Option<T>, TreeError> {
        Ok(self.inner.pop_last()?.map(|(element, ())| element))
    }

    /// Removes every element inside the window.
    ///
    /// # Errors
    ///
    /// [`TreeError::TypeMismatch`] if a bound cannot be ordered against the elements.
    pub fn clear(&mut self) -> Result<(), TreeError> {
        self.inner.clear()
    }

    /// # Errors
    ///
    /// [`TreeError::TypeMismatch`] if a bound cannot be ordered against the elements.
    pub fn elements_mut(&mut self) -> Result<ElementsMut<'_, T, C>, TreeError> {
        Ok(ElementsMut {
            inner: self.inner.entries_mut()?,
        })
    }

    /// # Errors
    ///
    /// Same as [`sub_set`](Self::sub_set).
    pub fn sub_set_mut(&mut self, from: T, to: T) -> Result<SubSetMut<'_, T, C>, TreeError>
    where
        T: Clone,
    {
        Ok(SetView {
            inner: self.inner.sub_map_mut(from, to)?,
        })
    }

    /// # Errors
    ///
    /// Same as [`sub_set`](Self::sub_set).
    pub fn head_set_mut(&mut self, to: T) -> Result<SubSetMut<'_, T, C>, TreeError>
    where
        T: Clone,
    {
        Ok(SetView {
            inner: self.inner.head_map_mut(to)?,
        })
    }

    /// # Errors
    ///
    /// Same as [`sub_set`](Self::sub_set).
    pub fn tail_set_mut(&mut self, from: T) -> Result<SubSetMut<'_, T, C>, TreeError>
    where
        T: Clone,
    {
        Ok(SetView {
            inner: self.inner.tail_map_mut(from)?,
        })
    }
}

impl<T, C, R> fmt::Debug for SetView<T, C, R>
where
    T: fmt::Debug,
    R: Deref<Target = CountedTreeMap<T, (), C>>,
    C: Comparator<T>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.iter() {
            Ok(iter) => f.debug_set().entries(iter).finish(),
            Err(_) => f.debug_struct("SetView").finish_non_exhaustive(),
        }
    }
}

impl<T, C: Comparator<T>> CountedTreeSet<T, C> {
    /// A read-only view of the elements in `[from, to)`.
    ///
    /// # Errors
    ///
    /// [`TreeError::IllegalBound`] if `from > to`, [`TreeError::TypeMismatch`] if a
    /// bound cannot be ordered.
    pub fn sub_set(&self, from: T, to: T) -> Result<SubSet<'_, T, C>, TreeError> {
        Ok(SetView {
            inner: self.map.sub_map(from, to)?,
        })
    }

    /// A read-only view of the elements below `to`.
    ///
    /// # Errors
    ///
    /// [`TreeError::TypeMismatch`] if `to` cannot be ordered.
    pub fn head_set(&self, to: T) -> Result<SubSet<'_, T, C>, TreeError> {
        Ok(SetView {
            inner: self.map.head_map(to)?,
        })
    }

    /// A read-only view of the elements at or above `from`.
    ///
    /// # Errors
    ///
    /// [`TreeError::TypeMismatch`] if `from` cannot be ordered.
    pub fn tail_set(&self, from: T) -> Result<SubSet<'_, T, C>, TreeError> {
        Ok(SetView {
            inner: self.map.tail_map(from)?,
        })
    }

    /// # Errors
    ///
    /// Same as [`sub_set`](Self::sub_set).
    pub fn sub_set_mut(&mut self, from: T, to: T) -> Result<SubSetMut<'_, T, C>, TreeError> {
        Ok(SetView {
            inner: self.map.sub_map_mut(from, to)?,
        })
    }

    /// # Errors
    ///
    /// Same as [`head_set`](Self::head_set).
    pub fn head_set_mut(&mut self, to: T) -> Result<SubSetMut<'_, T, C>, TreeError> {
        Ok(SetView {
            inner: self.map.head_map_mut(to)?,
        })
    }

    /// # Errors
    ///
    /// Same as [`tail_set`](Self::tail_set).
    pub fn tail_set_mut(&mut self, from: T) -> Result<SubSetMut<'_, T, C>, TreeError> {
        Ok(SetView {
            inner: self.map.tail_map_mut(from)?,
        })
    }
}
