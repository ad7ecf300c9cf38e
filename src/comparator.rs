use core::cmp::Ordering;
use core::fmt;

/// An ordering over keys of type `K`.
///
/// Returning `None` means the two keys cannot be ordered against each other; the
/// tree reports this as [`TreeError::TypeMismatch`](crate::TreeError::TypeMismatch)
/// instead of guessing a position.
///
/// # Examples
///
/// ```
/// use core::cmp::Ordering;
/// use counted_tree::{Comparator, NaturalOrder, OrderBy};
///
/// assert_eq!(NaturalOrder.compare(&1, &2), Some(Ordering::Less));
/// assert_eq!(NaturalOrder.compare(&f64::NAN, &1.0), None);
///
/// let by_len = OrderBy(|a: &&str, b: &&str| a.len().cmp(&b.len()));
/// assert_eq!(by_len.compare(&"abc", &"z"), Some(Ordering::Greater));
/// ```
pub trait Comparator<K: ?Sized> {
    /// Compares `a` with `b`.
    fn compare(&self, a: &K, b: &K) -> Option<Ordering>;
}

/// The natural ordering of the key type, via [`PartialOrd`].
///
/// Keys whose `partial_cmp` yields `None` (such as `f64::NAN`) are rejected.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub struct NaturalOrder;

impl<K: ?Sized + PartialOrd> Comparator<K> for NaturalOrder {
    #[inline]
    fn compare(&self, a: &K, b: &K) -> Option<Ordering> {
        a.partial_cmp(b)
    }
}

/// Adapts a total ordering closure into a [`Comparator`].
///
/// # Examples
///
/// ```
/// use counted_tree::{CountedTreeMap, OrderBy};
///
/// let mut map = CountedTreeMap::with_comparator(OrderBy(|a: &i32, b: &i32| b.cmp(a)));
/// map.insert(1, "one").unwrap();
/// map.insert(2, "two").unwrap();
/// assert_eq!(map.first_key(), Ok(&2));
/// ```
#[derive(Clone, Copy, Default)]
pub struct OrderBy<F>(pub F);

impl<K: ?Sized, F> Comparator<K> for OrderBy<F>
where
    F: Fn(&K, &K) -> Ordering,
{
    #[inline]
    fn compare(&self, a: &K, b: &K) -> Option<Ordering> {
        Some((self.0)(a, b))
    }
}

impl<F> fmt::Debug for OrderBy<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("OrderBy").finish_non_exhaustive()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn natural_order_rejects_nan() {
        assert_eq!(NaturalOrder.compare(&1.0, &f64::NAN), None);
        assert_eq!(NaturalOrder.compare(&f64::NAN, &f64::NAN), None);
        assert_eq!(NaturalOrder.compare(&1.5, &1.5), Some(Ordering::Equal));
    }

    #[test]
    fn order_by_is_total() {
        let reverse = OrderBy(|a: &u8, b: &u8| b.cmp(a));
        assert_eq!(reverse.compare(&1, &2), Some(Ordering::Greater));
        assert_eq!(reverse.compare(&2, &2), Some(Ordering::Equal));
    }
}
