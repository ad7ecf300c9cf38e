use super::CountedTreeMap;
use crate::error::TreeError;
use crate::raw::{Cursor, RawTree};

/// A mutating cursor over the entries of a [`CountedTreeMap`] or of a mutable range
/// view, in key order.
///
/// This is a lending iterator: [`next`](EntriesMut::next) hands out a mutable
/// reference to the value that lives until the following call, and
/// [`remove`](EntriesMut::remove) deletes the entry returned last without
/// disturbing the walk.
///
/// # Examples
///
/// ```
/// use counted_tree::CountedTreeMap;
///
/// let mut map: CountedTreeMap<i32, i32> = (0..10).map(|k| (k, k * 10)).collect();
/// let mut entries = map.entries_mut();
/// while let Some((key, value)) = entries.next() {
///     if key % 3 == 0 {
///         entries.remove().unwrap();
///     } else {
///         *value += 1;
///     }
/// }
/// assert_eq!(map.keys().copied().collect::<Vec<_>>(), [1, 2, 4, 5, 7, 8]);
/// assert_eq!(map.get(&4), Ok(Some(&41)));
/// ```
pub struct EntriesMut<'a, K, V, C> {
    tree: &'a mut RawTree<K, V, C>,
    // Cursor at `next_ordinal`, dropped whenever the tree changes shape.
    cursor: Option<Cursor>,
    next_ordinal: usize,
    end: usize,
    base: usize,
    current: Option<usize>,
}

impl<'a, K, V, C> EntriesMut<'a, K, V, C> {
    /// Walks the absolute ordinals `start..end` of `tree`.
    pub(crate) fn new(tree: &'a mut RawTree<K, V, C>, start: usize, end: usize) -> Self {
        EntriesMut {
            tree,
            cursor: None,
            next_ordinal: start,
            end,
            base: start,
            current: None,
        }
    }

    /// Advances to the next entry.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Option<(&K, &mut V)> {
        if self.next_ordinal >= self.end {
            return None;
        }
        let cursor = match self.cursor.take() {
            Some(cursor) => cursor,
            None => self.tree.cursor_at(self.next_ordinal).ok()?,
        };
        if self.next_ordinal + 1 < self.end {
            let mut following = cursor.clone();
            if following.forward(self.tree) {
                self.cursor = Some(following);
            }
        }
        self.current = Some(self.next_ordinal);
        self.next_ordinal += 1;
        Some(self.tree.entry_mut_at(&cursor))
    }

    /// Position of the entry returned last, or `None` before the first call to
    /// `next` and after a `remove`.
    #[must_use]
    pub fn ordinal(&self) -> Option<usize> {
        self.current.map(|ordinal| ordinal - self.base)
    }

    /// Number of entries not yet visited.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.end - self.next_ordinal
    }

    /// Removes the entry returned last by [`next`](EntriesMut::next).
    ///
    /// The walk continues with the entry that followed the removed one.
    ///
    /// # Errors
    ///
    /// [`TreeError::UnsupportedMutation`] if there is no current entry: `next` has not
    /// been called yet, or the current entry was already removed.
    pub fn remove(&mut self) -> Result<(K, V), TreeError> {
        let ordinal = self
            .current
            .ok_or(TreeError::UnsupportedMutation("no current entry to remove"))?;
        let entry = self.tree.remove_by_ordinal(ordinal)?;
        self.current = None;
        // Rebalancing may have moved any node; the next call re-derives the cursor.
        self.cursor = None;
        self.next_ordinal -= 1;
        self.end -= 1;
        Ok(entry)
    }
}

impl<K, V, C> CountedTreeMap<K, V, C> {
    /// Returns a mutating cursor over all entries in key order.
    pub fn entries_mut(&mut self) -> EntriesMut<'_, K, V, C> {
        let len = self.len();
        EntriesMut::new(&mut self.raw, 0, len)
    }

    /// Keeps only the entries for which `keep` returns `true`, visiting them in key
    /// order.
    ///
    /// # Examples
    ///
    /// ```
    /// use counted_tree::CountedTreeMap;
    ///
    /// let mut map: CountedTreeMap<i32, i32> = (0..8).map(|k| (k, k * 10)).collect();
    /// map.retain(|&k, _| k % 2 == 0);
    /// assert!(map.into_iter().eq([(0, 0), (2, 20), (4, 40), (6, 60)]));
    /// ```
    pub fn retain<F>(&mut self, mut keep: F)
    where
        F: FnMut(&K, &mut V) -> bool,
    {
        let mut entries = self.entries_mut();
        while let Some((key, value)) = entries.next() {
            if !keep(key, value) {
                let removed = entries.remove();
                debug_assert!(removed.is_ok(), "`retain()` - the visited entry is current");
            }
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use alloc::vec::Vec;

    #[test]
    fn remove_requires_a_current_entry() {
        let mut map: CountedTreeMap<i32, ()> = (0..5).map(|k| (k, ())).collect();
        let mut entries = map.entries_mut();
        assert!(matches!(entries.remove(), Err(TreeError::UnsupportedMutation(_))));
        entries.next();
        assert_eq!(entries.remove(), Ok((0, ())));
        assert!(matches!(entries.remove(), Err(TreeError::UnsupportedMutation(_))));
        assert_eq!(entries.ordinal(), None);
        assert_eq!(entries.next().map(|(k, _)| *k), Some(1));
        assert_eq!(entries.ordinal(), Some(0));
        assert_eq!(entries.remaining(), 3);
    }

    #[test]
    fn removing_everything_while_walking() {
        let mut map = CountedTreeMap::with_order(2);
        map.extend((0..200).map(|k| (k, k)));
        let mut entries = map.entries_mut();
        let mut visited = Vec::new();
        while let Some((key, _)) = entries.next() {
            visited.push(*key);
            entries.remove().unwrap();
        }
        assert_eq!(visited, (0..200).collect::<Vec<_>>());
        assert!(map.is_empty());
    }

    #[test]
    fn remove_after_exhaustion_removes_last_entry() {
        let mut map = CountedTreeMap::from([(1, 'a'), (2, 'b')]);
        let mut entries = map.entries_mut();
        while entries.next().is_some() {}
        assert_eq!(entries.remove(), Ok((2, 'b')));
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn retain_with_small_order() {
        let mut map = CountedTreeMap::with_order(1);
        map.extend((0..100).map(|k| (k, k)));
        map.retain(|k, v| {
            *v += 1;
            k % 5 != 0
        });
        assert_eq!(map.len(), 80);
        assert_eq!(map.get(&7), Ok(Some(&8)));
        assert_eq!(map.get(&10), Ok(None));
    }
}
