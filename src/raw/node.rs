use alloc::vec::Vec;
use core::cmp::Ordering;
use core::mem;

use super::handle::NodeId;
use crate::comparator::Comparator;
use crate::error::TreeError;

/// Leaf or branch. Branches own `len() + 1` child ids.
#[derive(Clone, Debug)]
pub(crate) enum NodeKind {
    Leaf,
    Branch(Vec<NodeId>),
}

/// A tree node: sorted keys, parallel values and the cached subtree load.
///
/// The node never updates `load` itself. A branch load depends on the loads of
/// its children, which live elsewhere in the arena, so `RawTree::update_load`
/// recomputes it after every structural change.
#[derive(Clone, Debug)]
pub(crate) struct Node<K, V> {
    keys: Vec<K>,
    values: Vec<V>,
    // Number of entries in the subtree rooted at this node.
    load: usize,
    kind: NodeKind,
}

/// Result of searching for a key in a node.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum SearchResult {
    /// Key was found at the given index.
    Found(usize),
    /// Key was not found; index is where it would be inserted.
    NotFound(usize),
}

impl<K, V> Node<K, V> {
    /// Creates an empty leaf sized for `order`.
    pub(crate) fn new_leaf(order: usize) -> Self {
        Self::empty(order, NodeKind::Leaf)
    }

    /// Creates a one-key branch that becomes the root after the old root split.
    pub(crate) fn new_root(order: usize, key: K, value: V, left: NodeId, right: NodeId) -> Self {
        let mut children = Vec::with_capacity(2 * order + 2);
        children.push(left);
        children.push(right);
        let mut root = Self::empty(order, NodeKind::Branch(children));
        root.keys.push(key);
        root.values.push(value);
        root
    }

    // One spare slot lets `split` insert before cutting.
    fn empty(order: usize, kind: NodeKind) -> Self {
        Self {
            keys: Vec::with_capacity(2 * order + 1),
            values: Vec::with_capacity(2 * order + 1),
            load: 0,
            kind,
        }
    }

    /// Number of keys held by this node (`nKeys`).
    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.keys.len()
    }

    pub(crate) fn is_leaf(&self) -> bool {
        matches!(self.kind, NodeKind::Leaf)
    }

    pub(crate) fn is_full(&self, order: usize) -> bool {
        self.keys.len() >= 2 * order
    }

    /// Returns true if this node is below minimum occupancy (ignored for the root).
    pub(crate) fn is_underfull(&self, order: usize) -> bool {
        self.keys.len() < order
    }

    #[inline]
    pub(crate) fn load(&self) -> usize {
        self.load
    }

    pub(crate) fn set_load(&mut self, load: usize) {
        self.load = load;
    }

    #[cfg(test)]
    pub(crate) fn key(&self, index: usize) -> &K {
        &self.keys[index]
    }

    #[cfg(test)]
    pub(crate) fn keys(&self) -> &[K] {
        &self.keys
    }

    #[inline]
    pub(crate) fn entry(&self, index: usize) -> (&K, &V) {
        (&self.keys[index], &self.values[index])
    }

    /// The key stays shared: changing it would break the ordering invariant.
    #[inline]
    pub(crate) fn entry_mut(&mut self, index: usize) -> (&K, &mut V) {
        (&self.keys[index], &mut self.values[index])
    }

    pub(crate) fn value_mut(&mut self, index: usize) -> &mut V {
        &mut self.values[index]
    }

    /// Child ids, empty for a leaf.
    #[inline]
    pub(crate) fn children(&self) -> &[NodeId] {
        match &self.kind {
            NodeKind::Leaf => &[],
            NodeKind::Branch(children) => children,
        }
    }

    #[inline]
    pub(crate) fn child(&self, index: usize) -> NodeId {
        self.children()[index]
    }

    /// Binary search for `key` under `comparator`.
    pub(crate) fn search<C>(&self, key: &K, comparator: &C) -> Result<SearchResult, TreeError>
    where
        C: Comparator<K>,
    {
        let (mut low, mut high) = (0, self.keys.len());
        while low < high {
            let mid = low + (high - low) / 2;
            match comparator.compare(&self.keys[mid], key).ok_or(TreeError::TypeMismatch)? {
                Ordering::Less => low = mid + 1,
                Ordering::Greater => high = mid,
                Ordering::Equal => return Ok(SearchResult::Found(mid)),
            }
        }
        Ok(SearchResult::NotFound(low))
    }

    /// Inserts an entry at `index`; a branch also takes the child to the right of it.
    ///
    /// The caller checks [`is_full`](Self::is_full) first, except from `split`.
    pub(crate) fn insert(&mut self, index: usize, key: K, value: V, right_child: Option<NodeId>) {
        self.keys.insert(index, key);
        self.values.insert(index, value);
        match (&mut self.kind, right_child) {
            (NodeKind::Branch(children), Some(child)) => children.insert(index + 1, child),
            (NodeKind::Leaf, None) => {}
            _ => unreachable!("branch inserts carry a right child, leaf inserts never do"),
        }
    }

    /// Removes the entry at `index`, and for a branch the child to its right.
    pub(crate) fn delete(&mut self, index: usize) -> (K, V, Option<NodeId>) {
        let key = self.keys.remove(index);
        let value = self.values.remove(index);
        let child = match &mut self.kind {
            NodeKind::Leaf => None,
            NodeKind::Branch(children) => Some(children.remove(index + 1)),
        };
        (key, value, child)
    }

    /// Swaps the entry at `index` for another, returning the old one.
    pub(crate) fn replace_entry(&mut self, index: usize, key: K, value: V) -> (K, V) {
        let old_key = mem::replace(&mut self.keys[index], key);
        let old_value = mem::replace(&mut self.values[index], value);
        (old_key, old_value)
    }

    /// The separator between children `index` and `index + 1`.
    pub(crate) fn separator_mut(&mut self, index: usize) -> (&mut K, &mut V) {
        (&mut self.keys[index], &mut self.values[index])
    }

    /// Splits a full node while inserting one more entry.
    ///
    /// The `2 * order + 1` entries (and for a branch the `2 * order + 2` children) are cut
    /// so that this node keeps the first `order` entries, the entry at position `order`
    /// becomes the returned median and the rest move into the returned right node. When
    /// `index == order` the inserted entry itself is the median.
    pub(crate) fn split(
        &mut self,
        index: usize,
        key: K,
        value: V,
        right_child: Option<NodeId>,
        order: usize,
    ) -> (K, V, Self) {
        debug_assert_eq!(self.keys.len(), 2 * order, "only full nodes split");
        self.insert(index, key, value, right_child);

        let mut right = match &mut self.kind {
            NodeKind::Leaf => Self::new_leaf(order),
            NodeKind::Branch(children) => {
                let mut right_children = Vec::with_capacity(2 * order + 2);
                right_children.extend(children.drain(order + 1..));
                Self::empty(order, NodeKind::Branch(right_children))
            }
        };
        right.keys.extend(self.keys.drain(order + 1..));
        right.values.extend(self.values.drain(order + 1..));

        let median_key = self.keys.remove(order);
        let median_value = self.values.remove(order);
        (median_key, median_value, right)
    }

    /// Appends the separator and every entry and child of `right` to this node.
    pub(crate) fn fuse(&mut self, key: K, value: V, right: Self) {
        let Self {
            keys,
            values,
            kind,
            ..
        } = right;
        self.keys.push(key);
        self.keys.extend(keys);
        self.values.push(value);
        self.values.extend(values);
        match (&mut self.kind, kind) {
            (NodeKind::Branch(children), NodeKind::Branch(right_children)) => children.extend(right_children),
            (NodeKind::Leaf, NodeKind::Leaf) => {}
            _ => unreachable!("siblings are always at the same depth"),
        }
    }

    /// Rotates entries between two siblings through their separator until `left`
    /// holds `left_len` keys.
    pub(crate) fn redistribute(left: &mut Self, right: &mut Self, separator: (&mut K, &mut V), left_len: usize) {
        let (separator_key, separator_value) = separator;
        match left_len.cmp(&left.keys.len()) {
            Ordering::Greater => {
                // Pull from the front of `right`; the separator comes down first.
                let moved = left_len - left.keys.len();
                let key = right.keys.remove(moved - 1);
                let value = right.values.remove(moved - 1);
                left.keys.push(mem::replace(separator_key, key));
                left.values.push(mem::replace(separator_value, value));
                left.keys.extend(right.keys.drain(..moved - 1));
                left.values.extend(right.values.drain(..moved - 1));
                if let (NodeKind::Branch(children), NodeKind::Branch(right_children)) = (&mut left.kind, &mut right.kind)
                {
                    children.extend(right_children.drain(..moved));
                }
            }
            Ordering::Less => {
                // Push the tail of `left` onto the front of `right`, followed by the separator.
                let mut keys = Vec::with_capacity(right.keys.capacity());
                let mut values = Vec::with_capacity(right.values.capacity());
                keys.extend(left.keys.drain(left_len + 1..));
                values.extend(left.values.drain(left_len + 1..));
                let key = left.keys.remove(left_len);
                let value = left.values.remove(left_len);
                keys.push(mem::replace(separator_key, key));
                values.push(mem::replace(separator_value, value));
                keys.append(&mut right.keys);
                values.append(&mut right.values);
                right.keys = keys;
                right.values = values;
                if let (NodeKind::Branch(children), NodeKind::Branch(right_children)) = (&mut left.kind, &mut right.kind)
                {
                    let mut moved = Vec::with_capacity(right_children.capacity());
                    moved.extend(children.drain(left_len + 1..));
                    moved.append(right_children);
                    *right_children = moved;
                }
            }
            Ordering::Equal => {}
        }
    }

    /// Dismantles the node into its entries and (for a branch) children.
    pub(crate) fn into_parts(self) -> (Vec<K>, Vec<V>, Vec<NodeId>) {
        let children = match self.kind {
            NodeKind::Leaf => Vec::new(),
            NodeKind::Branch(children) => children,
        };
        (self.keys, self.values, children)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::comparator::{NaturalOrder, OrderBy};
    use alloc::vec;

    const ORDER: usize = 2;

    fn id(index: usize) -> NodeId {
        NodeId::from_index(index)
    }

    fn leaf(keys: &[i32]) -> Node<i32, i32> {
        let mut node = Node::new_leaf(ORDER);
        for (index, &key) in keys.iter().enumerate() {
            node.insert(index, key, key * 10, None);
        }
        node
    }

    // Keys as given, children numbered from `first_child`.
    fn branch(keys: &[i32], first_child: usize) -> Node<i32, i32> {
        let mut node = Node::new_root(ORDER, keys[0], keys[0] * 10, id(first_child), id(first_child + 1));
        for (index, &key) in keys.iter().enumerate().skip(1) {
            node.insert(index, key, key * 10, Some(id(first_child + index + 1)));
        }
        node
    }

    fn child_indices(node: &Node<i32, i32>) -> Vec<usize> {
        node.children().iter().map(|child| child.to_index()).collect()
    }

    #[test]
    fn search_finds_keys_and_insertion_points() {
        let node = leaf(&[10, 20, 30]);
        assert_eq!(node.search(&20, &NaturalOrder), Ok(SearchResult::Found(1)));
        assert_eq!(node.search(&5, &NaturalOrder), Ok(SearchResult::NotFound(0)));
        assert_eq!(node.search(&25, &NaturalOrder), Ok(SearchResult::NotFound(2)));
        assert_eq!(node.search(&35, &NaturalOrder), Ok(SearchResult::NotFound(3)));
    }

    #[test]
    fn search_honors_custom_comparator() {
        let mut node: Node<i32, ()> = Node::new_leaf(ORDER);
        for (index, key) in [30, 20, 10].into_iter().enumerate() {
            node.insert(index, key, (), None);
        }
        let reverse = OrderBy(|a: &i32, b: &i32| b.cmp(a));
        assert_eq!(node.search(&10, &reverse), Ok(SearchResult::Found(2)));
        assert_eq!(node.search(&25, &reverse), Ok(SearchResult::NotFound(1)));
    }

    #[test]
    fn search_reports_incomparable_keys() {
        let mut node: Node<f64, ()> = Node::new_leaf(ORDER);
        node.insert(0, 1.0, (), None);
        assert_eq!(node.search(&f64::NAN, &NaturalOrder), Err(TreeError::TypeMismatch));
    }

    #[test]
    fn leaf_split_below_median() {
        let mut left = leaf(&[10, 20, 30, 40]);
        let (key, value, right) = left.split(0, 5, 50, None, ORDER);
        assert_eq!(left.keys(), &[5, 10]);
        assert_eq!((key, value), (20, 200));
        assert_eq!(right.keys(), &[30, 40]);
        assert_eq!(right.values, vec![300, 400]);
        assert!(right.is_leaf());
    }

    #[test]
    fn leaf_split_at_median_promotes_new_entry() {
        let mut left = leaf(&[10, 20, 30, 40]);
        let (key, value, right) = left.split(ORDER, 25, 250, None, ORDER);
        assert_eq!(left.keys(), &[10, 20]);
        assert_eq!((key, value), (25, 250));
        assert_eq!(right.keys(), &[30, 40]);
    }

    #[test]
    fn leaf_split_above_median() {
        let mut left = leaf(&[10, 20, 30, 40]);
        let (key, _, right) = left.split(4, 45, 450, None, ORDER);
        assert_eq!(left.keys(), &[10, 20]);
        assert_eq!(key, 30);
        assert_eq!(right.keys(), &[40, 45]);
        assert_eq!(right.values, vec![400, 450]);
    }

    #[test]
    fn branch_split_at_median_keeps_new_child_right() {
        let mut left = branch(&[10, 20, 30, 40], 0);
        let (key, _, right) = left.split(ORDER, 25, 250, Some(id(99)), ORDER);
        assert_eq!(key, 25);
        assert_eq!(left.keys(), &[10, 20]);
        assert_eq!(child_indices(&left), vec![0, 1, 2]);
        assert_eq!(right.keys(), &[30, 40]);
        assert_eq!(child_indices(&right), vec![99, 3, 4]);
    }

    #[test]
    fn branch_split_below_median() {
        let mut left = branch(&[10, 20, 30, 40], 0);
        let (key, _, right) = left.split(0, 5, 50, Some(id(99)), ORDER);
        assert_eq!(key, 20);
        assert_eq!(left.keys(), &[5, 10]);
        assert_eq!(child_indices(&left), vec![0, 99, 1]);
        assert_eq!(right.keys(), &[30, 40]);
        assert_eq!(child_indices(&right), vec![2, 3, 4]);
    }

    #[test]
    fn branch_split_above_median() {
        let mut left = branch(&[10, 20, 30, 40], 0);
        let (key, _, right) = left.split(4, 45, 450, Some(id(99)), ORDER);
        assert_eq!(key, 30);
        assert_eq!(child_indices(&left), vec![0, 1, 2]);
        assert_eq!(right.keys(), &[40, 45]);
        assert_eq!(child_indices(&right), vec![3, 4, 99]);
    }

    #[test]
    fn delete_removes_right_child() {
        let mut node = branch(&[10, 20], 0);
        assert_eq!(node.delete(0), (10, 100, Some(id(1))));
        assert_eq!(node.keys(), &[20]);
        assert_eq!(child_indices(&node), vec![0, 2]);

        let mut node = leaf(&[10, 20]);
        assert_eq!(node.delete(1), (20, 200, None));
    }

    #[test]
    fn fuse_concatenates_through_separator() {
        let mut left = branch(&[10], 0);
        let right = branch(&[30], 2);
        left.fuse(20, 200, right);
        assert_eq!(left.keys(), &[10, 20, 30]);
        assert_eq!(child_indices(&left), vec![0, 1, 2, 3]);
    }

    #[test]
    fn redistribute_pulls_from_right() {
        let mut left = branch(&[10], 0);
        let mut right = branch(&[30, 40, 50, 60], 2);
        let (mut key, mut value) = (20, 200);
        Node::redistribute(&mut left, &mut right, (&mut key, &mut value), 3);
        assert_eq!(left.keys(), &[10, 20, 30]);
        assert_eq!(child_indices(&left), vec![0, 1, 2, 3]);
        assert_eq!((key, value), (40, 400));
        assert_eq!(right.keys(), &[50, 60]);
        assert_eq!(child_indices(&right), vec![4, 5, 6]);
    }

    #[test]
    fn redistribute_pushes_to_right() {
        let mut left = leaf(&[10, 20, 30, 40]);
        let mut right = leaf(&[60]);
        let (mut key, mut value) = (50, 500);
        Node::redistribute(&mut left, &mut right, (&mut key, &mut value), 2);
        assert_eq!(left.keys(), &[10, 20]);
        assert_eq!((key, value), (30, 300));
        assert_eq!(right.keys(), &[40, 50, 60]);
        assert_eq!(right.values, vec![400, 500, 600]);
    }

    #[test]
    fn redistribute_pushes_children_to_right() {
        let mut left = branch(&[10, 20, 30], 0);
        let mut right = branch(&[50], 10);
        let (mut key, mut value) = (40, 400);
        Node::redistribute(&mut left, &mut right, (&mut key, &mut value), 1);
        assert_eq!(left.keys(), &[10]);
        assert_eq!(child_indices(&left), vec![0, 1]);
        assert_eq!(key, 20);
        assert_eq!(right.keys(), &[30, 40, 50]);
        assert_eq!(child_indices(&right), vec![2, 3, 10, 11]);
    }
}
