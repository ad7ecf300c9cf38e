use alloc::vec::Vec;
use core::cmp::Ordering;
use core::mem;

use super::arena::Arena;
use super::cursor::{Cursor, MidStep, Path};
use super::handle::NodeId;
use super::node::Node;
use crate::comparator::Comparator;
use crate::error::TreeError;

/// The order-statistic B-tree backing `CountedTreeMap`.
///
/// Every node except the root holds between `order` and `2 * order` keys. Each node
/// caches its subtree load so that ranks resolve in one root-to-leaf descent.
#[derive(Clone)]
pub(crate) struct RawTree<K, V, C> {
    nodes: Arena<Node<K, V>>,
    root: NodeId,
    order: usize,
    comparator: C,
}

impl<K, V, C> RawTree<K, V, C> {
    /// Creates an empty tree: a single leaf root with no keys.
    pub(crate) fn new(order: usize, comparator: C) -> Self {
        assert!(order > 0, "`RawTree::new()` - `order` must be positive!");
        let mut nodes = Arena::new();
        let root = nodes.alloc(Node::new_leaf(order));
        Self {
            nodes,
            root,
            order,
            comparator,
        }
    }

    pub(crate) fn order(&self) -> usize {
        self.order
    }

    pub(crate) fn comparator(&self) -> &C {
        &self.comparator
    }

    /// Number of entries, read from the root load.
    pub(crate) fn len(&self) -> usize {
        self.node(self.root).load()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[cfg(test)]
    pub(crate) fn root(&self) -> NodeId {
        self.root
    }

    #[inline]
    pub(crate) fn node(&self, id: NodeId) -> &Node<K, V> {
        self.nodes.get(id)
    }

    /// Drops every entry and starts over with an empty root.
    pub(crate) fn clear(&mut self) {
        #[cfg(feature = "tracing")]
        tracing::trace!(entries = self.len(), nodes = self.nodes.len(), "clearing tree");
        self.nodes.clear();
        self.root = self.nodes.alloc(Node::new_leaf(self.order));
    }

    /// The entry a found cursor points at.
    pub(crate) fn entry_at(&self, cursor: &Cursor) -> (&K, &V) {
        let step = cursor.final_step();
        debug_assert!(step.found, "entry_at: cursor is an insertion point");
        self.node(step.node).entry(step.pos)
    }

    pub(crate) fn entry_mut_at(&mut self, cursor: &Cursor) -> (&K, &mut V) {
        let step = cursor.final_step();
        debug_assert!(step.found, "entry_mut_at: cursor is an insertion point");
        self.nodes.get_mut(step.node).entry_mut(step.pos)
    }

    pub(crate) fn first(&self) -> Result<Cursor, TreeError> {
        Cursor::first(self, self.root)
    }

    pub(crate) fn last(&self) -> Result<Cursor, TreeError> {
        Cursor::last(self, self.root)
    }

    pub(crate) fn cursor_at(&self, ordinal: usize) -> Result<Cursor, TreeError> {
        Cursor::by_ordinal(self, self.root, ordinal)
    }

    pub(crate) fn get_by_ordinal(&self, ordinal: usize) -> Result<(&K, &V), TreeError> {
        let cursor = self.cursor_at(ordinal)?;
        Ok(self.entry_at(&cursor))
    }

    pub(crate) fn get_by_ordinal_mut(&mut self, ordinal: usize) -> Result<(&K, &mut V), TreeError> {
        let cursor = self.cursor_at(ordinal)?;
        Ok(self.entry_mut_at(&cursor))
    }

    /// Removes the entry with the given rank.
    pub(crate) fn remove_by_ordinal(&mut self, ordinal: usize) -> Result<(K, V), TreeError> {
        let cursor = self.cursor_at(ordinal)?;
        Ok(self.remove_at(cursor))
    }

    /// Moves every entry out in key order, leaving an empty tree.
    pub(crate) fn drain_sorted(&mut self) -> Vec<(K, V)> {
        let mut out = Vec::with_capacity(self.len());
        self.drain_node(self.root, &mut out);
        self.nodes.clear();
        self.root = self.nodes.alloc(Node::new_leaf(self.order));
        out
    }

    fn drain_node(&mut self, id: NodeId, out: &mut Vec<(K, V)>) {
        let (keys, values, children) = self.nodes.take(id).into_parts();
        let mut children = children.into_iter();
        for entry in keys.into_iter().zip(values) {
            if let Some(child) = children.next() {
                self.drain_node(child, out);
            }
            out.push(entry);
        }
        if let Some(child) = children.next() {
            self.drain_node(child, out);
        }
    }

    /// Computes a node's load from its own keys and its children's cached loads.
    fn calc_load(&self, id: NodeId) -> usize {
        let node = self.node(id);
        node.len() + node.children().iter().map(|&child| self.node(child).load()).sum::<usize>()
    }

    /// Refreshes a node's cached load. Returns whether it changed.
    fn update_load(&mut self, id: NodeId) -> bool {
        let load = self.calc_load(id);
        let node = self.nodes.get_mut(id);
        let changed = node.load() != load;
        node.set_load(load);
        changed
    }

    /// Refreshes loads from the innermost path step outwards.
    ///
    /// Stops at the first unchanged node: a load is a sum, so everything above it is
    /// unchanged as well.
    fn update_path_loads(&mut self, path: &[MidStep]) {
        for step in path.iter().rev() {
            if !self.update_load(step.node) {
                break;
            }
        }
    }

    /// Removes the entry a found cursor points at.
    ///
    /// An entry held by a branch is replaced by its predecessor (the largest key of
    /// its left subtree), so the physical removal always happens in a leaf.
    fn remove_at(&mut self, mut cursor: Cursor) -> (K, V) {
        debug_assert!(cursor.is_found(), "remove_at: cursor is an insertion point");
        let hit = cursor.final_step();
        if self.node(hit.node).is_leaf() {
            let (path, _) = cursor.into_parts();
            let (key, value, _) = self.nodes.get_mut(hit.node).delete(hit.pos);
            self.rebalance(hit.node, path);
            return (key, value);
        }

        let moved = cursor.backward(self);
        debug_assert!(moved, "remove_at: a branch key always has a predecessor");
        let (path, leaf) = cursor.into_parts();
        let (predecessor_key, predecessor_value, _) = self.nodes.get_mut(leaf.node).delete(leaf.pos);
        let removed = self.nodes.get_mut(hit.node).replace_entry(hit.pos, predecessor_key, predecessor_value);
        self.rebalance(leaf.node, path);
        removed
    }

    /// Restores occupancy bottom-up after `node` lost an entry.
    fn rebalance(&mut self, mut node: NodeId, mut path: Path) {
        loop {
            self.update_load(node);
            let Some(MidStep { node: parent, child }) = path.pop() else {
                self.collapse_root();
                return;
            };
            if !self.node(node).is_underfull(self.order) {
                path.push(MidStep { node: parent, child });
                self.update_path_loads(&path);
                return;
            }

            let siblings = self.node(parent).len();
            debug_assert!(siblings > 0, "rebalance: parent branch without keys");
            let sibling_len = |tree: &Self, index: usize| tree.node(tree.node(parent).child(index)).len();
            let take_right = if child == 0 {
                true
            } else if child == siblings {
                false
            } else {
                sibling_len(self, child + 1) > sibling_len(self, child - 1)
            };
            let separator = if take_right { child } else { child - 1 };
            let left = self.node(parent).child(separator);
            let right = self.node(parent).child(separator + 1);

            let total = self.node(left).len() + self.node(right).len();
            if total / 2 >= self.order {
                #[cfg(feature = "tracing")]
                tracing::trace!(left = self.node(left).len(), right = self.node(right).len(), "rotating siblings");
                let [parent_node, left_node, right_node] = self.nodes.get_disjoint_mut([parent, left, right]);
                Node::redistribute(left_node, right_node, parent_node.separator_mut(separator), total / 2);
                self.update_load(left);
                self.update_load(right);
                path.push(MidStep { node: parent, child });
                self.update_path_loads(&path);
                return;
            }

            #[cfg(feature = "tracing")]
            tracing::trace!(left = self.node(left).len(), right = self.node(right).len(), "fusing siblings");
            let right_node = self.nodes.take(right);
            let (key, value, removed) = self.nodes.get_mut(parent).delete(separator);
            debug_assert_eq!(removed, Some(right));
            self.nodes.get_mut(left).fuse(key, value, right_node);
            self.update_load(left);
            node = parent;
        }
    }

    /// Replaces a branch root left without keys by its only child.
    fn collapse_root(&mut self) {
        let root = self.node(self.root);
        if root.len() == 0 && !root.is_leaf() {
            let child = root.child(0);
            self.nodes.free(self.root);
            self.root = child;
            #[cfg(feature = "tracing")]
            tracing::trace!("root collapsed, tree height decreased");
        }
    }
}

impl<K, V, C: Comparator<K>> RawTree<K, V, C> {
    /// Compares two keys under the tree's ordering.
    pub(crate) fn compare(&self, a: &K, b: &K) -> Result<Ordering, TreeError> {
        self.comparator.compare(a, b).ok_or(TreeError::TypeMismatch)
    }

    pub(crate) fn search(&self, key: &K) -> Result<Cursor, TreeError> {
        Cursor::search(self, self.root, key)
    }

    pub(crate) fn get(&self, key: &K) -> Result<Option<(&K, &V)>, TreeError> {
        let cursor = self.search(key)?;
        Ok(cursor.is_found().then(|| self.entry_at(&cursor)))
    }

    pub(crate) fn get_mut(&mut self, key: &K) -> Result<Option<&mut V>, TreeError> {
        let cursor = self.search(key)?;
        if !cursor.is_found() {
            return Ok(None);
        }
        Ok(Some(self.entry_mut_at(&cursor).1))
    }

    /// Rank of `key` if present, otherwise the number of keys below it.
    pub(crate) fn ordinal_of_key(&self, key: &K) -> Result<usize, TreeError> {
        Ok(self.search(key)?.ordinal(self))
    }

    /// Rank of `key`, only if present.
    pub(crate) fn rank_of(&self, key: &K) -> Result<Option<usize>, TreeError> {
        let cursor = self.search(key)?;
        Ok(cursor.is_found().then(|| cursor.ordinal(self)))
    }

    pub(crate) fn ceiling(&self, key: &K) -> Result<Option<Cursor>, TreeError> {
        Cursor::ceiling(self, self.root, key)
    }

    pub(crate) fn lower(&self, key: &K) -> Result<Option<Cursor>, TreeError> {
        Cursor::lower(self, self.root, key)
    }

    /// Inserts a key-value pair. Returns the old value if the key was already present.
    ///
    /// A full leaf splits and the median moves up, splitting ancestors as long as they
    /// are full too; a split root is replaced by a new one-key root.
    pub(crate) fn insert(&mut self, key: K, value: V) -> Result<Option<V>, TreeError> {
        // A key that cannot be ordered against itself is rejected even in an empty tree.
        if self.compare(&key, &key)? != Ordering::Equal {
            return Err(TreeError::TypeMismatch);
        }
        let (mut path, last) = self.search(&key)?.into_parts();
        if last.found {
            let slot = self.nodes.get_mut(last.node).value_mut(last.pos);
            return Ok(Some(mem::replace(slot, value)));
        }

        let order = self.order;
        let (mut node, mut pos) = (last.node, last.pos);
        let (mut key, mut value, mut right_child) = (key, value, None);
        loop {
            let target = self.nodes.get_mut(node);
            if !target.is_full(order) {
                target.insert(pos, key, value, right_child);
                self.update_load(node);
                self.update_path_loads(&path);
                return Ok(None);
            }

            let (median_key, median_value, sibling) = target.split(pos, key, value, right_child, order);
            let sibling = self.nodes.alloc(sibling);
            self.update_load(node);
            self.update_load(sibling);
            #[cfg(feature = "tracing")]
            tracing::trace!(left = ?node, right = ?sibling, "split node");

            let Some(step) = path.pop() else {
                let root = self.nodes.alloc(Node::new_root(order, median_key, median_value, node, sibling));
                self.root = root;
                self.update_load(root);
                #[cfg(feature = "tracing")]
                tracing::trace!(root = ?root, "root split, tree height increased");
                return Ok(None);
            };
            (node, pos) = (step.node, step.child);
            (key, value, right_child) = (median_key, median_value, Some(sibling));
        }
    }

    /// Removes a key, returning its entry if it was present.
    pub(crate) fn remove(&mut self, key: &K) -> Result<Option<(K, V)>, TreeError> {
        let cursor = self.search(key)?;
        if !cursor.is_found() {
            return Ok(None);
        }
        Ok(Some(self.remove_at(cursor)))
    }
}

#[cfg(test)]
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap,
    clippy::cast_sign_loss
)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::comparator::{NaturalOrder, OrderBy};
    use alloc::collections::BTreeMap;
    use alloc::string::String;
    use alloc::vec;
    use proptest::prelude::*;

    impl<K, V, C: Comparator<K>> RawTree<K, V, C> {
        /// Checks every structural invariant and panics with a description of all
        /// violations found.
        pub(crate) fn validate_invariants(&self) {
            let mut errors: Vec<String> = Vec::new();
            let mut leaf_depth = None;
            let mut reachable = 0;
            let load = self.validate_node(self.root, 0, &mut leaf_depth, &mut reachable, &mut errors);
            if load != self.len() {
                errors.push(alloc::format!("root load {} != counted entries {load}", self.len()));
            }
            if reachable != self.nodes.len() {
                errors.push(alloc::format!("{} live nodes but {reachable} reachable", self.nodes.len()));
            }
            let root = self.node(self.root);
            if !root.is_leaf() && root.len() == 0 {
                errors.push("branch root without keys".into());
            }
            assert!(errors.is_empty(), "Tree invariant violations:\n{}", errors.join("\n"));
        }

        // Returns the recomputed subtree load.
        fn validate_node(
            &self,
            id: NodeId,
            depth: usize,
            leaf_depth: &mut Option<usize>,
            reachable: &mut usize,
            errors: &mut Vec<String>,
        ) -> usize {
            *reachable += 1;
            let node = self.node(id);
            if id != self.root && (node.len() < self.order || node.len() > 2 * self.order) {
                errors.push(alloc::format!("node {id:?} holds {} keys with order {}", node.len(), self.order));
            }
            if node.len() > 2 * self.order {
                errors.push(alloc::format!("node {id:?} overflows with {} keys", node.len()));
            }
            for pair in node.keys().windows(2) {
                if self.compare(&pair[0], &pair[1]) != Ok(Ordering::Less) {
                    errors.push(alloc::format!("keys not strictly increasing in node {id:?}"));
                }
            }

            let mut load = node.len();
            if node.is_leaf() {
                match *leaf_depth {
                    None => *leaf_depth = Some(depth),
                    Some(expected) if expected != depth => {
                        errors.push(alloc::format!("leaf {id:?} at depth {depth}, expected {expected}"));
                    }
                    Some(_) => {}
                }
            } else {
                if node.children().len() != node.len() + 1 {
                    errors.push(alloc::format!("branch {id:?} has {} children", node.children().len()));
                }
                for (index, &child) in node.children().iter().enumerate() {
                    let child_node = self.node(child);
                    if index > 0
                        && let Some(first) = child_node.keys().first()
                        && self.compare(node.key(index - 1), first) != Ok(Ordering::Less)
                    {
                        errors.push(alloc::format!("separator {} of {id:?} not below its right child", index - 1));
                    }
                    if index < node.len()
                        && let Some(last) = child_node.keys().last()
                        && self.compare(last, node.key(index)) != Ok(Ordering::Less)
                    {
                        errors.push(alloc::format!("separator {index} of {id:?} not above its left child"));
                    }
                    load += self.validate_node(child, depth + 1, leaf_depth, reachable, errors);
                }
            }
            if node.load() != load {
                errors.push(alloc::format!("node {id:?} caches load {} but holds {load}", node.load()));
            }
            load
        }

        fn height(&self) -> usize {
            let mut height = 1;
            let mut current = self.root;
            while !self.node(current).is_leaf() {
                current = self.node(current).child(0);
                height += 1;
            }
            height
        }
    }

    #[derive(Clone, Debug)]
    enum Op {
        Insert(i32),
        Remove(i32),
        RemoveOrdinal(usize),
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            4 => (0i32..1000).prop_map(Op::Insert),
            2 => (0i32..1000).prop_map(Op::Remove),
            1 => any::<usize>().prop_map(Op::RemoveOrdinal),
        ]
    }

    fn tree_of(order: usize, keys: impl IntoIterator<Item = i32>) -> RawTree<i32, i32, NaturalOrder> {
        let mut tree = RawTree::new(order, NaturalOrder);
        for key in keys {
            tree.insert(key, key * 2).unwrap();
        }
        tree
    }

    #[test]
    #[should_panic(expected = "`RawTree::new()` - `order` must be positive!")]
    fn zero_order_panics() {
        let _ = RawTree::<i32, i32, NaturalOrder>::new(0, NaturalOrder);
    }

    #[test]
    fn ascending_split_produces_two_minimal_children() {
        for order in 1..6 {
            let tree = tree_of(order, 0..(2 * order as i32 + 1));
            tree.validate_invariants();
            let root = tree.node(tree.root());
            assert_eq!(root.len(), 1, "order {order}");
            assert_eq!(root.children().len(), 2);
            assert_eq!(*root.key(0), order as i32);
            for &child in root.children() {
                assert_eq!(tree.node(child).len(), order);
                assert!(tree.node(child).is_leaf());
            }
        }
    }

    #[test]
    fn overwrite_keeps_structure() {
        let mut tree = tree_of(2, 0..20);
        let nodes = tree.nodes.len();
        assert_eq!(tree.insert(7, 700), Ok(Some(14)));
        assert_eq!(tree.len(), 20);
        assert_eq!(tree.nodes.len(), nodes);
        assert_eq!(tree.get(&7), Ok(Some((&7, &700))));
        tree.validate_invariants();
    }

    #[test]
    fn incomparable_key_is_rejected_even_when_empty() {
        let mut tree: RawTree<f64, (), NaturalOrder> = RawTree::new(2, NaturalOrder);
        assert_eq!(tree.insert(f64::NAN, ()), Err(TreeError::TypeMismatch));
        assert!(tree.is_empty());
        tree.insert(1.0, ()).unwrap();
        assert_eq!(tree.get(&f64::NAN), Err(TreeError::TypeMismatch));
        assert_eq!(tree.remove(&f64::NAN), Err(TreeError::TypeMismatch));
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn branch_removal_substitutes_predecessor() {
        let mut tree = tree_of(1, 0..7);
        tree.validate_invariants();
        let root_key = *tree.node(tree.root()).key(0);
        assert_eq!(tree.remove(&root_key), Ok(Some((root_key, root_key * 2))));
        tree.validate_invariants();
        // The separator is now the old separator's predecessor.
        let root = tree.node(tree.root());
        assert!(root.keys().contains(&(root_key - 1)));
        assert_eq!(tree.rank_of(&root_key), Ok(None));
    }

    #[test]
    fn removing_everything_collapses_to_an_empty_leaf() {
        let mut tree = tree_of(2, 0..200);
        assert!(tree.height() > 2);
        for key in (0..200).rev() {
            assert_eq!(tree.remove(&key), Ok(Some((key, key * 2))));
            tree.validate_invariants();
        }
        assert!(tree.is_empty());
        assert_eq!(tree.height(), 1);
        assert_eq!(tree.nodes.len(), 1);
        assert_eq!(tree.remove(&3), Ok(None));
    }

    #[test]
    fn rotation_leaves_siblings_balanced() {
        // Order 2: a root with children [0, 1] and [3, 4, 5, 6].
        let mut tree = tree_of(2, [0, 1, 2, 3, 4]);
        tree.insert(5, 10).unwrap();
        tree.insert(6, 12).unwrap();
        tree.validate_invariants();
        assert_eq!(tree.height(), 2);
        tree.remove(&0).unwrap();
        tree.validate_invariants();
        let root = tree.node(tree.root());
        assert_eq!(root.len(), 1);
        let (left, right) = (tree.node(root.child(0)), tree.node(root.child(1)));
        assert_eq!(left.keys(), &[1, 2]);
        assert_eq!(*root.key(0), 3);
        assert_eq!(right.keys(), &[4, 5, 6]);
    }

    fn child_keys(tree: &RawTree<i32, i32, NaturalOrder>) -> Vec<Vec<i32>> {
        let root = tree.node(tree.root());
        root.children().iter().map(|&child| tree.node(child).keys().to_vec()).collect()
    }

    #[test]
    fn middle_child_borrows_from_the_larger_right_sibling() {
        // Order 2: root [2, 5] over [0, 1], [3, 4], [6, 7, 8].
        let mut tree = tree_of(2, 0..9);
        assert_eq!(tree.node(tree.root()).keys(), &[2, 5]);
        assert_eq!(child_keys(&tree), [vec![0, 1], vec![3, 4], vec![6, 7, 8]]);

        // The left sibling could only fuse; the larger right one lends a key.
        tree.remove(&3).unwrap();
        tree.validate_invariants();
        assert_eq!(tree.node(tree.root()).keys(), &[2, 6]);
        assert_eq!(child_keys(&tree), [vec![0, 1], vec![4, 5], vec![7, 8]]);
    }

    #[test]
    fn middle_child_borrows_from_the_left_sibling_on_a_tie() {
        // Order 2: root [2, 5] over [-1, 0, 1], [3, 4], [6, 7, 8].
        let mut tree = tree_of(2, 0..9);
        tree.insert(-1, -2).unwrap();
        assert_eq!(child_keys(&tree), [vec![-1, 0, 1], vec![3, 4], vec![6, 7, 8]]);

        tree.remove(&3).unwrap();
        tree.validate_invariants();
        assert_eq!(tree.node(tree.root()).keys(), &[1, 5]);
        assert_eq!(child_keys(&tree), [vec![-1, 0], vec![2, 4], vec![6, 7, 8]]);
        assert_eq!(tree.get(&2), Ok(Some((&2, &4))));
    }

    #[test]
    fn fusion_shrinks_height() {
        let mut tree = tree_of(2, 0..5);
        assert_eq!(tree.height(), 2);
        tree.remove(&0).unwrap();
        tree.validate_invariants();
        assert_eq!(tree.height(), 1);
        assert_eq!(tree.node(tree.root()).keys(), &[1, 2, 3, 4]);
    }

    #[test]
    fn custom_comparator_orders_descending() {
        let mut tree = RawTree::new(2, OrderBy(|a: &i32, b: &i32| b.cmp(a)));
        for key in 0..50 {
            tree.insert(key, ()).unwrap();
        }
        tree.validate_invariants();
        assert_eq!(tree.get_by_ordinal(0).map(|(k, ())| *k), Ok(49));
        assert_eq!(tree.ordinal_of_key(&10), Ok(39));
    }

    #[test]
    fn drain_sorted_empties_the_tree() {
        let mut tree = tree_of(3, (0..100).rev());
        let drained = tree.drain_sorted();
        assert_eq!(drained, (0..100).map(|k| (k, k * 2)).collect::<Vec<_>>());
        assert!(tree.is_empty());
        tree.validate_invariants();
        tree.insert(1, 1).unwrap();
        tree.validate_invariants();
    }

    #[test]
    fn clear_resets_to_empty_root() {
        let mut tree = tree_of(2, 0..100);
        tree.clear();
        tree.validate_invariants();
        assert_eq!(tree.len(), 0);
        assert_eq!(tree.first().err(), Some(TreeError::EmptyContainer));
        assert_eq!(tree.get_by_ordinal(0), Err(TreeError::EmptyContainer));
    }

    #[test]
    fn get_by_ordinal_mut_modifies_value() {
        let mut tree = tree_of(2, 0..10);
        *tree.get_by_ordinal_mut(5).unwrap().1 = 999;
        assert_eq!(tree.get(&5), Ok(Some((&5, &999))));
        assert_eq!(tree.get_by_ordinal(4), Ok((&4, &8)));
        assert_eq!(
            tree.get_by_ordinal_mut(10).map(|(k, _)| *k),
            Err(TreeError::OutOfRange { ordinal: 10, len: 10 })
        );
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(50))]

        #[test]
        fn invariants_hold_after_every_operation(
            order in 1usize..6,
            ops in prop::collection::vec(op_strategy(), 0..400),
        ) {
            let mut tree = RawTree::new(order, NaturalOrder);
            let mut expected: BTreeMap<i32, i32> = BTreeMap::new();

            for op in ops {
                match op {
                    Op::Insert(key) => {
                        prop_assert_eq!(tree.insert(key, key * 2), Ok(expected.insert(key, key * 2)));
                    }
                    Op::Remove(key) => {
                        prop_assert_eq!(tree.remove(&key), Ok(expected.remove_entry(&key)));
                    }
                    Op::RemoveOrdinal(which) => {
                        if expected.is_empty() {
                            prop_assert_eq!(tree.remove_by_ordinal(which), Err(TreeError::EmptyContainer));
                            continue;
                        }
                        let ordinal = which % expected.len();
                        let key = *expected.keys().nth(ordinal).unwrap();
                        let removed = expected.remove_entry(&key).unwrap();
                        prop_assert_eq!(tree.remove_by_ordinal(ordinal), Ok(removed));
                    }
                }
                tree.validate_invariants();
                prop_assert_eq!(tree.len(), expected.len());
            }
        }

        #[test]
        fn ordinals_match_sorted_order(
            order in 1usize..6,
            keys in prop::collection::vec(0i32..500, 1..200),
        ) {
            let tree = tree_of(order, keys.iter().copied());
            let mut sorted = keys.clone();
            sorted.sort_unstable();
            sorted.dedup();

            for (rank, key) in sorted.iter().enumerate() {
                prop_assert_eq!(tree.get_by_ordinal(rank), Ok((key, &(key * 2))));
                prop_assert_eq!(tree.rank_of(key), Ok(Some(rank)));
                prop_assert_eq!(tree.ordinal_of_key(key), Ok(rank));
            }
            prop_assert_eq!(tree.rank_of(&-1), Ok(None));
            prop_assert_eq!(tree.ordinal_of_key(&1_000), Ok(sorted.len()));
        }
    }

    #[test]
    fn loads_survive_interleaved_rebalancing() {
        let mut tree = tree_of(3, 0..300);
        for key in (0..300).step_by(3) {
            tree.remove(&key).unwrap();
            tree.validate_invariants();
        }
        let remaining: Vec<i32> = (0..300).filter(|k| k % 3 != 0).collect();
        for (rank, key) in remaining.iter().enumerate() {
            assert_eq!(tree.rank_of(key), Ok(Some(rank)));
        }
        assert_eq!(tree.drain_sorted().len(), remaining.len());
    }
}
