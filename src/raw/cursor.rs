//! Root-to-node paths through the tree.
//!
//! A [`Cursor`] stores node ids only, never references, so it can be kept while the
//! tree is borrowed elsewhere. Any structural mutation (split, rotation, fusion)
//! invalidates every cursor over that tree; callers re-derive one from the root
//! with [`Cursor::search`] or [`Cursor::by_ordinal`].

use core::cmp::Ordering;

use smallvec::SmallVec;

use super::handle::NodeId;
use super::node::SearchResult;
use super::raw_tree::RawTree;
use crate::comparator::Comparator;
use crate::error::TreeError;

/// A branch on the path and the child the path continues into.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct MidStep {
    pub(crate) node: NodeId,
    pub(crate) child: usize,
}

/// The node the path ends at and the position within it.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct FinalStep {
    pub(crate) node: NodeId,
    pub(crate) pos: usize,
    /// `false` when `pos` is only an insertion point in a leaf.
    pub(crate) found: bool,
}

pub(crate) type Path = SmallVec<[MidStep; 16]>;

#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct Cursor {
    path: Path,
    last: FinalStep,
}

impl Cursor {
    /// Descends from `from` towards `key`.
    ///
    /// Stops at the first node holding `key`, or at the leaf insertion point.
    pub(crate) fn search<K, V, C>(tree: &RawTree<K, V, C>, from: NodeId, key: &K) -> Result<Self, TreeError>
    where
        C: Comparator<K>,
    {
        let mut path = Path::new();
        let mut current = from;
        loop {
            let node = tree.node(current);
            match node.search(key, tree.comparator())? {
                SearchResult::Found(pos) => {
                    return Ok(Self {
                        path,
                        last: FinalStep {
                            node: current,
                            pos,
                            found: true,
                        },
                    });
                }
                SearchResult::NotFound(pos) if node.is_leaf() => {
                    return Ok(Self {
                        path,
                        last: FinalStep {
                            node: current,
                            pos,
                            found: false,
                        },
                    });
                }
                SearchResult::NotFound(child) => {
                    path.push(MidStep { node: current, child });
                    current = node.child(child);
                }
            }
        }
    }

    /// The smallest key in the subtree at `from`.
    pub(crate) fn first<K, V, C>(tree: &RawTree<K, V, C>, from: NodeId) -> Result<Self, TreeError> {
        if tree.node(from).load() == 0 {
            return Err(TreeError::EmptyContainer);
        }
        let mut cursor = Self::at(from);
        cursor.descend_first(tree, from);
        Ok(cursor)
    }

    /// The largest key in the subtree at `from`.
    pub(crate) fn last<K, V, C>(tree: &RawTree<K, V, C>, from: NodeId) -> Result<Self, TreeError> {
        if tree.node(from).load() == 0 {
            return Err(TreeError::EmptyContainer);
        }
        let mut cursor = Self::at(from);
        cursor.descend_last(tree, from);
        Ok(cursor)
    }

    /// The entry with the given zero-based rank within the subtree at `from`.
    pub(crate) fn by_ordinal<K, V, C>(tree: &RawTree<K, V, C>, from: NodeId, ordinal: usize) -> Result<Self, TreeError> {
        let len = tree.node(from).load();
        if len == 0 {
            return Err(TreeError::EmptyContainer);
        }
        if ordinal >= len {
            return Err(TreeError::OutOfRange { ordinal, len });
        }

        let mut path = Path::new();
        let mut current = from;
        let mut remaining = ordinal;
        'descend: loop {
            let node = tree.node(current);
            if node.is_leaf() {
                return Ok(Self {
                    path,
                    last: FinalStep {
                        node: current,
                        pos: remaining,
                        found: true,
                    },
                });
            }
            for (index, &child) in node.children().iter().enumerate() {
                let covered = tree.node(child).load();
                if remaining < covered {
                    path.push(MidStep { node: current, child: index });
                    current = child;
                    continue 'descend;
                }
                remaining -= covered;
                if index < node.len() {
                    if remaining == 0 {
                        return Ok(Self {
                            path,
                            last: FinalStep {
                                node: current,
                                pos: index,
                                found: true,
                            },
                        });
                    }
                    remaining -= 1;
                }
            }
            debug_assert!(false, "by_ordinal: load invariant violated - ordinal {ordinal} not covered (load {len})");
            return Err(TreeError::OutOfRange { ordinal, len });
        }
    }

    /// The smallest entry whose key is `>= key`, if any.
    pub(crate) fn ceiling<K, V, C>(tree: &RawTree<K, V, C>, from: NodeId, key: &K) -> Result<Option<Self>, TreeError>
    where
        C: Comparator<K>,
    {
        let mut cursor = Self::search(tree, from, key)?;
        if cursor.last.found || cursor.forward(tree) {
            Ok(Some(cursor))
        } else {
            Ok(None)
        }
    }

    /// The largest entry whose key is `< key`, if any.
    pub(crate) fn lower<K, V, C>(tree: &RawTree<K, V, C>, from: NodeId, key: &K) -> Result<Option<Self>, TreeError>
    where
        C: Comparator<K>,
    {
        let mut cursor = Self::search(tree, from, key)?;
        Ok(cursor.backward(tree).then_some(cursor))
    }

    fn at(node: NodeId) -> Self {
        Self {
            path: Path::new(),
            last: FinalStep {
                node,
                pos: 0,
                found: false,
            },
        }
    }

    fn descend_first<K, V, C>(&mut self, tree: &RawTree<K, V, C>, from: NodeId) {
        let mut current = from;
        loop {
            let node = tree.node(current);
            if node.is_leaf() {
                self.last = FinalStep {
                    node: current,
                    pos: 0,
                    found: node.len() > 0,
                };
                return;
            }
            self.path.push(MidStep { node: current, child: 0 });
            current = node.child(0);
        }
    }

    fn descend_last<K, V, C>(&mut self, tree: &RawTree<K, V, C>, from: NodeId) {
        let mut current = from;
        loop {
            let node = tree.node(current);
            if node.is_leaf() {
                self.last = FinalStep {
                    node: current,
                    pos: node.len().saturating_sub(1),
                    found: node.len() > 0,
                };
                return;
            }
            self.path.push(MidStep {
                node: current,
                child: node.len(),
            });
            current = node.child(node.len());
        }
    }

    /// Moves to the in-order successor. Returns `false`, leaving the cursor
    /// untouched, when there is none.
    ///
    /// From an insertion point this lands on the entry at that point.
    pub(crate) fn forward<K, V, C>(&mut self, tree: &RawTree<K, V, C>) -> bool {
        if self.at_end(tree) {
            return false;
        }
        let FinalStep { node: id, pos, found } = self.last;
        let node = tree.node(id);
        if !node.is_leaf() {
            self.path.push(MidStep { node: id, child: pos + 1 });
            self.descend_first(tree, node.child(pos + 1));
            return true;
        }

        let next = if found { pos + 1 } else { pos };
        if next < node.len() {
            self.last = FinalStep {
                node: id,
                pos: next,
                found: true,
            };
            return true;
        }
        while let Some(MidStep { node, child }) = self.path.pop() {
            if child < tree.node(node).len() {
                self.last = FinalStep {
                    node,
                    pos: child,
                    found: true,
                };
                return true;
            }
        }
        unreachable!("forward: a cursor not at the end has a successor")
    }

    /// Moves to the in-order predecessor. Returns `false`, leaving the cursor
    /// untouched, when there is none.
    pub(crate) fn backward<K, V, C>(&mut self, tree: &RawTree<K, V, C>) -> bool {
        if self.at_beginning(tree) {
            return false;
        }
        let FinalStep { node: id, pos, .. } = self.last;
        let node = tree.node(id);
        if !node.is_leaf() {
            self.path.push(MidStep { node: id, child: pos });
            self.descend_last(tree, node.child(pos));
            return true;
        }

        if pos > 0 {
            self.last = FinalStep {
                node: id,
                pos: pos - 1,
                found: true,
            };
            return true;
        }
        while let Some(MidStep { node, child }) = self.path.pop() {
            if child > 0 {
                self.last = FinalStep {
                    node,
                    pos: child - 1,
                    found: true,
                };
                return true;
            }
        }
        unreachable!("backward: a cursor not at the beginning has a predecessor")
    }

    /// Number of entries ordered before the cursor position.
    ///
    /// For an entry this is its rank; for an insertion point it is the number of
    /// keys less than the probe.
    pub(crate) fn ordinal<K, V, C>(&self, tree: &RawTree<K, V, C>) -> usize {
        let left_of = |id: NodeId, children: usize| -> usize {
            tree.node(id).children()[..children]
                .iter()
                .map(|&child| tree.node(child).load())
                .sum()
        };

        let mut ordinal = 0;
        for step in &self.path {
            ordinal += step.child + left_of(step.node, step.child);
        }
        ordinal += self.last.pos;
        if !tree.node(self.last.node).is_leaf() {
            ordinal += left_of(self.last.node, self.last.pos + 1);
        }
        ordinal
    }

    /// True when nothing is ordered before the cursor position.
    pub(crate) fn at_beginning<K, V, C>(&self, tree: &RawTree<K, V, C>) -> bool {
        tree.node(self.last.node).is_leaf() && self.last.pos == 0 && self.path.iter().all(|step| step.child == 0)
    }

    /// True when nothing is ordered after the cursor position.
    pub(crate) fn at_end<K, V, C>(&self, tree: &RawTree<K, V, C>) -> bool {
        let node = tree.node(self.last.node);
        let next = if self.last.found { self.last.pos + 1 } else { self.last.pos };
        node.is_leaf()
            && next >= node.len()
            && self.path.iter().all(|step| step.child == tree.node(step.node).len())
    }

    /// Orders two cursors over the same tree by position.
    ///
    /// A mid step into child `c` sits between the entries `c - 1` and `c` of its
    /// node, and so does an insertion point at `c`.
    pub(crate) fn position_cmp(&self, other: &Self) -> Ordering {
        let mut left = self.steps();
        let mut right = other.steps();
        loop {
            match (left.next(), right.next()) {
                (Some(a), Some(b)) => match a.cmp(&b) {
                    Ordering::Equal => {}
                    unequal => return unequal,
                },
                (None, None) => return Ordering::Equal,
                (Some(_), None) | (None, Some(_)) => {
                    debug_assert!(false, "position_cmp: cursors over different trees");
                    return Ordering::Equal;
                }
            }
        }
    }

    // Each step as a slot number within its node: children at even, keys at odd slots.
    fn steps(&self) -> impl Iterator<Item = usize> + '_ {
        let last = if self.last.found {
            2 * self.last.pos + 1
        } else {
            2 * self.last.pos
        };
        self.path
            .iter()
            .map(|step| 2 * step.child)
            .chain(core::iter::once(last))
    }

    pub(crate) fn is_found(&self) -> bool {
        self.last.found
    }

    pub(crate) fn final_step(&self) -> FinalStep {
        self.last
    }

    pub(crate) fn into_parts(self) -> (Path, FinalStep) {
        (self.path, self.last)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::comparator::NaturalOrder;
    use alloc::vec::Vec;
    use proptest::prelude::*;

    fn tree_of(order: usize, keys: impl IntoIterator<Item = i32>) -> RawTree<i32, i32, NaturalOrder> {
        let mut tree = RawTree::new(order, NaturalOrder);
        for key in keys {
            tree.insert(key, key * 10).expect("integer keys are comparable");
        }
        tree
    }

    fn key_at(tree: &RawTree<i32, i32, NaturalOrder>, cursor: &Cursor) -> i32 {
        *tree.entry_at(cursor).0
    }

    #[test]
    fn empty_tree_has_no_extremes() {
        let tree = tree_of(2, []);
        assert_eq!(Cursor::first(&tree, tree.root()), Err(TreeError::EmptyContainer));
        assert_eq!(Cursor::last(&tree, tree.root()), Err(TreeError::EmptyContainer));
        assert_eq!(Cursor::by_ordinal(&tree, tree.root(), 0), Err(TreeError::EmptyContainer));
    }

    #[test]
    fn search_stops_at_branch_keys() {
        let tree = tree_of(1, 0..20);
        let mut found_in_branch = false;
        for key in 0..20 {
            let cursor = Cursor::search(&tree, tree.root(), &key).unwrap();
            assert!(cursor.is_found());
            assert_eq!(key_at(&tree, &cursor), key);
            assert_eq!(cursor.ordinal(&tree), usize::try_from(key).unwrap());
            found_in_branch |= !tree.node(cursor.final_step().node).is_leaf();
        }
        assert!(found_in_branch);
    }

    #[test]
    fn insertion_point_ordinal_counts_smaller_keys() {
        let tree = tree_of(2, (0..50).map(|k| k * 2));
        for probe in (-1..101).step_by(2) {
            let cursor = Cursor::search(&tree, tree.root(), &probe).unwrap();
            assert!(!cursor.is_found());
            let expected = (0..50).filter(|k| k * 2 < probe).count();
            assert_eq!(cursor.ordinal(&tree), expected, "probe {probe}");
        }
    }

    #[test]
    fn ceiling_and_lower() {
        let tree = tree_of(2, (0..40).map(|k| k * 3));
        let ceiling = |probe: i32| Cursor::ceiling(&tree, tree.root(), &probe).unwrap().map(|c| key_at(&tree, &c));
        let lower = |probe: i32| Cursor::lower(&tree, tree.root(), &probe).unwrap().map(|c| key_at(&tree, &c));

        assert_eq!(ceiling(-5), Some(0));
        assert_eq!(ceiling(30), Some(30));
        assert_eq!(ceiling(31), Some(33));
        assert_eq!(ceiling(117), Some(117));
        assert_eq!(ceiling(118), None);

        assert_eq!(lower(0), None);
        assert_eq!(lower(1), Some(0));
        assert_eq!(lower(30), Some(27));
        assert_eq!(lower(1_000), Some(117));
    }

    #[test]
    fn stepping_stops_at_the_ends() {
        let tree = tree_of(2, 0..30);
        let mut cursor = Cursor::last(&tree, tree.root()).unwrap();
        assert!(cursor.at_end(&tree));
        let before = cursor.clone();
        assert!(!cursor.forward(&tree));
        assert_eq!(cursor, before);

        let mut cursor = Cursor::first(&tree, tree.root()).unwrap();
        assert!(cursor.at_beginning(&tree));
        assert!(!cursor.backward(&tree));
        assert_eq!(key_at(&tree, &cursor), 0);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(50))]

        #[test]
        fn forward_walk_visits_keys_in_order(
            order in 1usize..5,
            keys in prop::collection::btree_set(-500i32..500, 1..300),
        ) {
            let tree = tree_of(order, keys.iter().copied());
            let mut cursor = Cursor::first(&tree, tree.root()).unwrap();
            let mut walked = Vec::new();
            loop {
                walked.push(key_at(&tree, &cursor));
                prop_assert_eq!(cursor.ordinal(&tree), walked.len() - 1);
                let previous = cursor.clone();
                if !cursor.forward(&tree) {
                    break;
                }
                prop_assert_eq!(previous.position_cmp(&cursor), Ordering::Less);
                prop_assert_eq!(cursor.position_cmp(&previous), Ordering::Greater);
            }
            prop_assert!(cursor.at_end(&tree));
            prop_assert_eq!(walked, keys.iter().copied().collect::<Vec<_>>());
        }

        #[test]
        fn backward_walk_visits_keys_in_reverse(
            order in 1usize..5,
            keys in prop::collection::btree_set(-500i32..500, 1..300),
        ) {
            let tree = tree_of(order, keys.iter().copied());
            let mut cursor = Cursor::last(&tree, tree.root()).unwrap();
            let mut walked = Vec::new();
            loop {
                walked.push(key_at(&tree, &cursor));
                if !cursor.backward(&tree) {
                    break;
                }
            }
            walked.reverse();
            prop_assert_eq!(walked, keys.iter().copied().collect::<Vec<_>>());
        }

        #[test]
        fn by_ordinal_inverts_ordinal(
            order in 1usize..5,
            keys in prop::collection::btree_set(-500i32..500, 1..300),
        ) {
            let tree = tree_of(order, keys.iter().copied());
            for (rank, key) in keys.iter().enumerate() {
                let cursor = Cursor::by_ordinal(&tree, tree.root(), rank).unwrap();
                prop_assert_eq!(key_at(&tree, &cursor), *key);
                prop_assert_eq!(cursor.ordinal(&tree), rank);
                let searched = Cursor::search(&tree, tree.root(), key).unwrap();
                prop_assert_eq!(searched.position_cmp(&cursor), Ordering::Equal);
            }
            prop_assert_eq!(
                Cursor::by_ordinal(&tree, tree.root(), keys.len()),
                Err(TreeError::OutOfRange { ordinal: keys.len(), len: keys.len() })
            );
        }
    }
}
