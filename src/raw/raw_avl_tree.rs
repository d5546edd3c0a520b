use core::borrow::Borrow;
use core::cmp::Ordering;
use core::ops::Bound;

use alloc::vec::Vec;

use super::arena::Arena;
use super::handle::Handle;
use super::node::{Node, Side};
use crate::compare::Compare;

/// The core AVL tree backing `AvlTreeMap`.
pub(crate) struct RawAvlTree<K, V, C> {
    /// Arena owning every node; links between nodes are handles into it.
    nodes: Arena<Node<K>>,
    /// Arena owning every value, addressed by the handle stored in its node.
    values: Arena<V>,
    /// Handle to the root node, if the tree is non-empty.
    root: Option<Handle>,
    /// Total number of key-value pairs in the tree.
    len: usize,
    /// The order keys are kept in.
    comparator: C,
}

impl<K, V, C> RawAvlTree<K, V, C> {
    /// Creates a new, empty tree ordered by `comparator`.
    pub(crate) const fn new(comparator: C) -> Self {
        Self {
            nodes: Arena::new(),
            values: Arena::new(),
            root: None,
            len: 0,
            comparator,
        }
    }

    /// Returns the number of key-value pairs in the tree.
    pub(crate) const fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the tree contains no elements.
    pub(crate) const fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub(crate) fn comparator(&self) -> &C {
        &self.comparator
    }

    #[cfg(test)]
    pub(crate) fn root(&self) -> Option<Handle> {
        self.root
    }

    /// Height of the whole tree; zero when empty.
    pub(crate) fn height(&self) -> u8 {
        self.height_of(self.root)
    }

    /// Releases every node and value.
    pub(crate) fn clear(&mut self) {
        self.nodes.clear();
        self.values.clear();
        self.root = None;
        self.len = 0;
    }

    #[inline]
    pub(crate) fn key(&self, handle: Handle) -> &K {
        self.nodes.get(handle).key()
    }

    #[inline]
    pub(crate) fn value(&self, handle: Handle) -> &V {
        self.values.get(self.nodes.get(handle).value())
    }

    #[inline]
    pub(crate) fn value_mut(&mut self, handle: Handle) -> &mut V {
        self.values.get_mut(self.nodes.get(handle).value())
    }

    #[inline]
    pub(crate) fn key_value(&self, handle: Handle) -> (&K, &V) {
        let node = self.nodes.get(handle);
        (node.key(), self.values.get(node.value()))
    }

    #[inline]
    pub(crate) fn key_value_mut(&mut self, handle: Handle) -> (&K, &mut V) {
        let node = self.nodes.get(handle);
        (node.key(), self.values.get_mut(node.value()))
    }

    /// Returns the key and a mutable value reference of a node from a raw pointer.
    ///
    /// Keys are read through the node arena and values reached through the value arena, each
    /// borrowing only the one slot involved. Mutable references handed out earlier for other
    /// nodes stay valid.
    ///
    /// # Safety
    /// - `ptr` must point to a valid, allocated `RawAvlTree<K, V, C>`.
    /// - The caller must have logical exclusive access to the value at `handle` for `'a`, and
    ///   must not hand out the same node twice.
    pub(crate) unsafe fn key_value_mut_ptr<'a>(ptr: *mut Self, handle: Handle) -> (&'a K, &'a mut V) {
        // SAFETY: Guaranteed by the caller. The two fields are reached separately with
        // `&raw`, so neither borrow covers the other arena.
        unsafe {
            let node = Arena::get_ptr(&raw const (*ptr).nodes, handle);
            let value = Arena::get_mut_ptr(&raw mut (*ptr).values, node.value());
            (node.key(), value)
        }
    }

    #[inline]
    fn height_of(&self, handle: Option<Handle>) -> u8 {
        handle.map_or(0, |h| self.nodes.get(h).height())
    }

    /// `height(left) - height(right)` of the node.
    pub(crate) fn balance_factor(&self, handle: Handle) -> i16 {
        let node = self.nodes.get(handle);
        i16::from(self.height_of(node.left())) - i16::from(self.height_of(node.right()))
    }

    fn update_height(&mut self, handle: Handle) {
        let node = self.nodes.get(handle);
        let height = 1 + self.height_of(node.left()).max(self.height_of(node.right()));
        self.nodes.get_mut(handle).set_height(height);
    }

    /// Returns true if the subtree on `side` of the node is strictly taller than the other one.
    fn leans(&self, handle: Handle, side: Side) -> bool {
        let node = self.nodes.get(handle);
        self.height_of(node.child(side)) > self.height_of(node.child(side.opposite()))
    }

    /// Walks from `from` to the outermost node on `side` (`Left` gives the minimum).
    pub(crate) fn extreme(&self, from: Handle, side: Side) -> Handle {
        let mut current = from;
        while let Some(child) = self.nodes.get(current).child(side) {
            current = child;
        }
        current
    }

    /// The first node in order.
    pub(crate) fn first(&self) -> Option<Handle> {
        self.root.map(|root| self.extreme(root, Side::Left))
    }

    /// The last node in order.
    pub(crate) fn last(&self) -> Option<Handle> {
        self.root.map(|root| self.extreme(root, Side::Right))
    }

    /// In-order neighbour of `from` in direction `toward` (`Right` is the successor).
    ///
    /// Uses only the tree shape: descend into the `toward` subtree if there is one, otherwise
    /// climb until arriving from the opposite side. `None` is the end sentinel.
    pub(crate) fn step(&self, from: Handle, toward: Side) -> Option<Handle> {
        if let Some(child) = self.nodes.get(from).child(toward) {
            return Some(self.extreme(child, toward.opposite()));
        }
        let mut current = from;
        let mut parent = self.nodes.get(current).parent();
        while let Some(p) = parent {
            let node = self.nodes.get(p);
            if node.child(toward) != Some(current) {
                break;
            }
            current = p;
            parent = node.parent();
        }
        parent
    }

    #[inline]
    pub(crate) fn next(&self, from: Handle) -> Option<Handle> {
        self.step(from, Side::Right)
    }

    #[inline]
    pub(crate) fn prev(&self, from: Handle) -> Option<Handle> {
        self.step(from, Side::Left)
    }

    /// Points the link that referenced `old` (a child slot of `parent`, or the root) at `new`.
    fn replace_child(&mut self, parent: Option<Handle>, old: Handle, new: Option<Handle>) {
        match parent {
            None => self.root = new,
            Some(p) => {
                let node = self.nodes.get_mut(p);
                let side = node.side_of(old).expect("`RawAvlTree::replace_child()` - `old` is not a child of `parent`!");
                node.set_child(side, new);
            }
        }
    }

    /// Rotates the subtree rooted at `head` toward `direction` and returns the new subtree root.
    ///
    /// The child of `head` on the opposite side is lifted into `head`'s place, `head` becomes its
    /// child on `direction`, and the lifted node's inner subtree moves across to `head`. In-order
    /// sequence and `len` are unchanged.
    fn rotate(&mut self, head: Handle, direction: Side) -> Handle {
        let lifted_side = direction.opposite();
        let pivot = self.nodes.get(head).child(lifted_side).expect("`RawAvlTree::rotate()` - nothing to lift!");
        let inner = self.nodes.get(pivot).child(direction);
        let parent = self.nodes.get(head).parent();

        self.nodes.get_mut(head).set_child(lifted_side, inner);
        if let Some(inner) = inner {
            self.nodes.get_mut(inner).set_parent(Some(head));
        }

        self.nodes.get_mut(pivot).set_child(direction, Some(head));
        self.nodes.get_mut(head).set_parent(Some(pivot));

        self.nodes.get_mut(pivot).set_parent(parent);
        self.replace_child(parent, head, Some(pivot));

        self.update_height(head);
        self.update_height(pivot);

        tracing::trace!(?direction, "rotated subtree");
        pivot
    }

    /// Restores the balance of a node whose `heavy` subtree is two levels taller.
    fn rebalance_node(&mut self, handle: Handle, heavy: Side) -> Handle {
        let child = self.nodes.get(handle).child(heavy).expect("`RawAvlTree::rebalance_node()` - heavy side is empty!");
        if self.leans(child, heavy.opposite()) {
            // Inner grandchild is the tall one: straighten it out first.
            self.rotate(child, heavy);
        }
        self.rotate(handle, heavy.opposite())
    }

    /// Recomputes heights and rotates where needed on every node from `from` up to the root.
    fn rebalance_upward(&mut self, from: Option<Handle>) {
        let mut current = from;
        while let Some(handle) = current {
            self.update_height(handle);
            let balance = self.balance_factor(handle);
            let subtree_root = if balance < -1 {
                self.rebalance_node(handle, Side::Right)
            } else if balance > 1 {
                self.rebalance_node(handle, Side::Left)
            } else {
                handle
            };
            current = self.nodes.get(subtree_root).parent();
        }
    }

    /// Detaches the node at `target`, splices the tree back together, rebalances and returns the
    /// removed pair.
    pub(crate) fn remove_node(&mut self, target: Handle) -> (K, V) {
        let (left, right, parent) = {
            let node = self.nodes.get(target);
            (node.left(), node.right(), node.parent())
        };

        let rebalance_from = match (left, right) {
            (None, None) => {
                self.replace_child(parent, target, None);
                parent
            }
            (Some(child), None) | (None, Some(child)) => {
                self.replace_child(parent, target, Some(child));
                self.nodes.get_mut(child).set_parent(parent);
                parent
            }
            (Some(left), Some(right)) => {
                let successor = self.extreme(right, Side::Left);
                let changed = if successor == right {
                    successor
                } else {
                    // Lift the successor out; its right subtree takes its place.
                    let successor_parent = self.nodes.get(successor).parent().expect("`RawAvlTree::remove_node()` - successor has no parent!");
                    let successor_right = self.nodes.get(successor).right();
                    self.nodes.get_mut(successor_parent).set_child(Side::Left, successor_right);
                    if let Some(r) = successor_right {
                        self.nodes.get_mut(r).set_parent(Some(successor_parent));
                    }
                    self.nodes.get_mut(successor).set_child(Side::Right, Some(right));
                    self.nodes.get_mut(right).set_parent(Some(successor));
                    successor_parent
                };
                self.nodes.get_mut(successor).set_child(Side::Left, Some(left));
                self.nodes.get_mut(left).set_parent(Some(successor));
                self.nodes.get_mut(successor).set_parent(parent);
                self.replace_child(parent, target, Some(successor));
                Some(changed)
            }
        };

        self.len -= 1;
        let node = self.nodes.take(target);
        let value = self.values.take(node.value());
        debug_assert_eq!(self.nodes.len(), self.len, "`RawAvlTree::remove_node()` - arena and len disagree!");
        self.rebalance_upward(rebalance_from);
        tracing::trace!(len = self.len, "removed node");
        (node.into_key(), value)
    }

    /// Removes every node, returning the pairs in order.
    pub(crate) fn drain_to_vec(&mut self) -> Vec<(K, V)> {
        let mut order = Vec::with_capacity(self.len);
        let mut current = self.first();
        while let Some(handle) = current {
            order.push(handle);
            current = self.next(handle);
        }

        let result: Vec<(K, V)> = order
            .into_iter()
            .map(|handle| {
                let node = self.nodes.take(handle);
                let value = self.values.take(node.value());
                (node.into_key(), value)
            })
            .collect();
        self.clear();
        result
    }
}

impl<K, V, C> RawAvlTree<K, V, C> {
    #[inline]
    fn compare<Q: ?Sized>(&self, a: &Q, b: &Q) -> Ordering
    where
        C: Compare<Q>,
    {
        self.comparator.compare(a, b)
    }

    /// Finds the node holding `key`.
    pub(crate) fn search<Q>(&self, key: &Q) -> Option<Handle>
    where
        K: Borrow<Q>,
        C: Compare<Q>,
        Q: ?Sized,
    {
        let mut current = self.root;
        while let Some(handle) = current {
            let node = self.nodes.get(handle);
            current = match self.compare(key, node.key().borrow()) {
                Ordering::Equal => return Some(handle),
                Ordering::Less => node.left(),
                Ordering::Greater => node.right(),
            };
        }
        None
    }

    /// Removes the pair with `key`.
    pub(crate) fn remove<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        C: Compare<Q>,
        Q: ?Sized,
    {
        let handle = self.search(key)?;
        Some(self.remove_node(handle))
    }

    /// Removes nodes in order starting at `from` for as long as their keys lie inside the `end`
    /// bound. Returns how many were removed and the first node left after the removed run.
    pub(crate) fn remove_run<Q>(&mut self, from: Option<Handle>, end: Bound<&Q>) -> (usize, Option<Handle>)
    where
        K: Borrow<Q>,
        C: Compare<Q>,
        Q: ?Sized,
    {
        let mut removed = 0;
        let mut current = from;
        while let Some(handle) = current {
            let inside = match end {
                Bound::Included(key) => self.compare(self.key(handle).borrow(), key) != Ordering::Greater,
                Bound::Excluded(key) => self.compare(self.key(handle).borrow(), key) == Ordering::Less,
                Bound::Unbounded => true,
            };
            if !inside {
                break;
            }
            // The successor keeps its handle through the splice.
            current = self.next(handle);
            self.remove_node(handle);
            removed += 1;
        }
        tracing::trace!(removed, "removed run");
        (removed, current)
    }

    /// First node whose key is greater than `key`, or equal to it when `inclusive`.
    pub(crate) fn first_after<Q>(&self, key: &Q, inclusive: bool) -> Option<Handle>
    where
        K: Borrow<Q>,
        C: Compare<Q>,
        Q: ?Sized,
    {
        let mut candidate = None;
        let mut current = self.root;
        while let Some(handle) = current {
            let node = self.nodes.get(handle);
            let keep = match self.compare(node.key().borrow(), key) {
                Ordering::Greater => true,
                Ordering::Equal => inclusive,
                Ordering::Less => false,
            };
            current = if keep {
                candidate = Some(handle);
                node.left()
            } else {
                node.right()
            };
        }
        candidate
    }

    /// Last node whose key is less than `key`, or equal to it when `inclusive`.
    pub(crate) fn last_before<Q>(&self, key: &Q, inclusive: bool) -> Option<Handle>
    where
        K: Borrow<Q>,
        C: Compare<Q>,
        Q: ?Sized,
    {
        let mut candidate = None;
        let mut current = self.root;
        while let Some(handle) = current {
            let node = self.nodes.get(handle);
            let keep = match self.compare(node.key().borrow(), key) {
                Ordering::Less => true,
                Ordering::Equal => inclusive,
                Ordering::Greater => false,
            };
            current = if keep {
                candidate = Some(handle);
                node.right()
            } else {
                node.left()
            };
        }
        candidate
    }

    /// First node not less than `key`, by descent.
    pub(crate) fn lower_bound<Q>(&self, key: &Q) -> Option<Handle>
    where
        K: Borrow<Q>,
        C: Compare<Q>,
        Q: ?Sized,
    {
        self.first_after(key, true)
    }

    /// First node strictly greater than `key`, by descent.
    pub(crate) fn upper_bound<Q>(&self, key: &Q) -> Option<Handle>
    where
        K: Borrow<Q>,
        C: Compare<Q>,
        Q: ?Sized,
    {
        self.first_after(key, false)
    }

    /// Linear in-order scan from the first node for the first node matching `accept`.
    fn scan<Q>(&self, mut accept: impl FnMut(Ordering) -> bool, key: &Q) -> Option<Handle>
    where
        K: Borrow<Q>,
        C: Compare<Q>,
        Q: ?Sized,
    {
        let mut current = self.first();
        while let Some(handle) = current {
            if accept(self.compare(self.key(handle).borrow(), key)) {
                return Some(handle);
            }
            current = self.next(handle);
        }
        None
    }

    /// [`lower_bound`](Self::lower_bound) by linear scan.
    pub(crate) fn lower_bound_scan<Q>(&self, key: &Q) -> Option<Handle>
    where
        K: Borrow<Q>,
        C: Compare<Q>,
        Q: ?Sized,
    {
        self.scan(|ordering| ordering != Ordering::Less, key)
    }

    /// [`upper_bound`](Self::upper_bound) by linear scan.
    pub(crate) fn upper_bound_scan<Q>(&self, key: &Q) -> Option<Handle>
    where
        K: Borrow<Q>,
        C: Compare<Q>,
        Q: ?Sized,
    {
        self.scan(|ordering| ordering == Ordering::Greater, key)
    }

    /// First node inside a range's start bound.
    pub(crate) fn front_of<Q>(&self, bound: Bound<&Q>) -> Option<Handle>
    where
        K: Borrow<Q>,
        C: Compare<Q>,
        Q: ?Sized,
    {
        match bound {
            Bound::Included(key) => self.first_after(key, true),
            Bound::Excluded(key) => self.first_after(key, false),
            Bound::Unbounded => self.first(),
        }
    }

    /// Last node inside a range's end bound.
    pub(crate) fn back_of<Q>(&self, bound: Bound<&Q>) -> Option<Handle>
    where
        K: Borrow<Q>,
        C: Compare<Q>,
        Q: ?Sized,
    {
        match bound {
            Bound::Included(key) => self.last_before(key, true),
            Bound::Excluded(key) => self.last_before(key, false),
            Bound::Unbounded => self.last(),
        }
    }
}

impl<K, V, C: Compare<K>> RawAvlTree<K, V, C> {
    /// Inserts a pair. An existing key keeps its node and gets the new value, with no structural
    /// change; the old value is returned. Otherwise a leaf is spliced in and the path to the root
    /// rebalanced.
    pub(crate) fn insert(&mut self, key: K, value: V) -> (Handle, Option<V>) {
        let mut parent = None;
        let mut side = Side::Left;
        let mut current = self.root;

        while let Some(handle) = current {
            side = match self.compare(&key, self.key(handle)) {
                Ordering::Equal => {
                    let old = core::mem::replace(self.value_mut(handle), value);
                    return (handle, Some(old));
                }
                Ordering::Less => Side::Left,
                Ordering::Greater => Side::Right,
            };
            parent = Some(handle);
            current = self.nodes.get(handle).child(side);
        }

        let mut node = Node::new(key, self.values.alloc(value));
        node.set_parent(parent);
        let handle = self.nodes.alloc(node);
        match parent {
            None => self.root = Some(handle),
            Some(p) => self.nodes.get_mut(p).set_child(side, Some(handle)),
        }
        self.len += 1;

        self.rebalance_upward(parent);
        (handle, None)
    }
}
