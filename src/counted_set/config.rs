use super::CountedTreeSet;
use crate::counted_map::{CountedTreeMap, DEFAULT_ORDER};

impl<T> CountedTreeSet<T> {
    /// Creates an empty set ordered by the elements' [`PartialOrd`] implementation.
    ///
    /// # Examples
    ///
    /// ```
    /// use counted_tree::CountedTreeSet;
    ///
    /// let set: CountedTreeSet<u32> = CountedTreeSet::new();
    /// assert!(set.is_empty());
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self::with_order(DEFAULT_ORDER)
    }

    /// Creates an empty, naturally ordered set whose nodes hold between `order` and
    /// `2 * order` elements.
    ///
    /// # Panics
    ///
    /// Panics if `order` is zero.
    #[must_use]
    pub fn with_order(order: usize) -> Self {
        CountedTreeSet {
            map: CountedTreeMap::with_order(order),
        }
    }
}

impl<T, C> CountedTreeSet<T, C> {
    /// Creates an empty set ordered by `comparator`.
    ///
    /// # Examples
    ///
    /// ```
    /// use counted_tree::{CountedTreeSet, OrderBy};
    ///
    /// let mut set = CountedTreeSet::with_comparator(OrderBy(|a: &i32, b: &i32| b.cmp(a)));
    /// set.extend([1, 3, 2]);
    /// assert!(set.iter().eq(&[3, 2, 1]));
    /// ```
    #[must_use]
    pub fn with_comparator(comparator: C) -> Self {
        CountedTreeSet {
            map: CountedTreeMap::with_comparator(comparator),
        }
    }

    /// # Panics
    ///
    /// Panics if `order` is zero.
    #[must_use]
    pub fn with_order_and_comparator(order: usize, comparator: C) -> Self {
        CountedTreeSet {
            map: CountedTreeMap::with_order_and_comparator(order, comparator),
        }
    }

    #[must_use]
    pub fn order(&self) -> usize {
        self.map.order()
    }

    #[must_use]
    pub fn comparator(&self) -> &C {
        self.map.comparator()
    }
}
