use super::CountedTreeMap;
use crate::comparator::NaturalOrder;
use crate::raw::RawTree;

/// Order used by [`CountedTreeMap::new`]: non-root nodes hold 16 to 32 keys.
pub const DEFAULT_ORDER: usize = 16;

impl<K, V> CountedTreeMap<K, V> {
    /// Creates an empty map ordered by the keys' [`PartialOrd`] implementation.
    ///
    /// # Examples
    ///
    /// ```
    /// use counted_tree::CountedTreeMap;
    ///
    /// let map: CountedTreeMap<i32, &str> = CountedTreeMap::new();
    /// assert!(map.is_empty());
    /// assert_eq!(map.order(), counted_tree::DEFAULT_ORDER);
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self::with_order(DEFAULT_ORDER)
    }

    /// Creates an empty, naturally ordered map whose nodes hold between `order` and
    /// `2 * order` keys.
    ///
    /// Small orders make deep trees and are mostly useful for testing.
    ///
    /// # Panics
    ///
    /// Panics if `order` is zero.
    #[must_use]
    pub fn with_order(order: usize) -> Self {
        Self::with_order_and_comparator(order, NaturalOrder)
    }
}

impl<K, V, C> CountedTreeMap<K, V, C> {
    /// Creates an empty map ordered by `comparator`.
    ///
    /// # Examples
    ///
    /// ```
    /// use counted_tree::{CountedTreeMap, OrderBy};
    ///
    /// let by_len = OrderBy(|a: &&str, b: &&str| a.len().cmp(&b.len()));
    /// let mut map = CountedTreeMap::with_comparator(by_len);
    /// map.insert("ccc", 3).unwrap();
    /// map.insert("a", 1).unwrap();
    /// // Same length: same key under this ordering.
    /// assert_eq!(map.insert("b", 2), Ok(Some(1)));
    /// assert_eq!(map.first_key(), Ok(&"a"));
    /// ```
    #[must_use]
    pub fn with_comparator(comparator: C) -> Self {
        Self::with_order_and_comparator(DEFAULT_ORDER, comparator)
    }

    /// # Panics
    ///
    /// Panics if `order` is zero.
    #[must_use]
    pub fn with_order_and_comparator(order: usize, comparator: C) -> Self {
        CountedTreeMap {
            raw: RawTree::new(order, comparator),
        }
    }

    /// Returns the order the map was created with.
    #[must_use]
    pub fn order(&self) -> usize {
        self.raw.order()
    }

    /// Returns the comparator ordering the keys.
    #[must_use]
    pub fn comparator(&self) -> &C {
        self.raw.comparator()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::OrderBy;

    #[test]
    #[should_panic(expected = "`RawTree::new()` - `order` must be positive!")]
    fn zero_order_panics() {
        let _ = CountedTreeMap::<u8, u8>::with_order(0);
    }

    #[test]
    fn order_is_reported() {
        let map = CountedTreeMap::<u8, u8, _>::with_order_and_comparator(3, OrderBy(|a: &u8, b: &u8| b.cmp(a)));
        assert_eq!(map.order(), 3);
        let default: CountedTreeMap<u8, u8> = CountedTreeMap::default();
        assert_eq!(default.order(), DEFAULT_ORDER);
    }
}
