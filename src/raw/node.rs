use super::handle::Handle;

/// Which child slot of a node, or which way a rotation turns.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Side {
    Left,
    Right,
}

impl Side {
    #[inline]
    pub(crate) const fn opposite(self) -> Self {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }

    #[inline]
    const fn index(self) -> usize {
        match self {
            Side::Left => 0,
            Side::Right => 1,
        }
    }
}

/// A single tree entry.
///
/// Each child is owned by the slot that references it; `parent` is only a back-link used for
/// traversal and rebalancing. The value lives in a separate arena so that mutable value
/// references never overlap the links a traversal reads.
pub(crate) struct Node<K> {
    key: K,
    value: Handle,
    children: [Option<Handle>; 2],
    parent: Option<Handle>,
    // Height of the subtree rooted here; a lone node is 1, an absent child counts as 0.
    height: u8,
}

impl<K> Node<K> {
    /// Creates a detached leaf.
    pub(crate) const fn new(key: K, value: Handle) -> Self {
        Self {
            key,
            value,
            children: [None, None],
            parent: None,
            height: 1,
        }
    }

    #[inline]
    pub(crate) fn key(&self) -> &K {
        &self.key
    }

    /// Handle of the value in the tree's value arena.
    #[inline]
    pub(crate) fn value(&self) -> Handle {
        self.value
    }

    pub(crate) fn into_key(self) -> K {
        self.key
    }

    #[inline]
    pub(crate) fn child(&self, side: Side) -> Option<Handle> {
        self.children[side.index()]
    }

    #[inline]
    pub(crate) fn left(&self) -> Option<Handle> {
        self.child(Side::Left)
    }

    #[inline]
    pub(crate) fn right(&self) -> Option<Handle> {
        self.child(Side::Right)
    }

    #[inline]
    pub(crate) fn set_child(&mut self, side: Side, child: Option<Handle>) {
        self.children[side.index()] = child;
    }

    /// Returns the side on which `child` hangs off this node, if it is a child at all.
    pub(crate) fn side_of(&self, child: Handle) -> Option<Side> {
        if self.left() == Some(child) {
            Some(Side::Left)
        } else if self.right() == Some(child) {
            Some(Side::Right)
        } else {
            None
        }
    }

    #[inline]
    pub(crate) fn parent(&self) -> Option<Handle> {
        self.parent
    }

    #[inline]
    pub(crate) fn set_parent(&mut self, parent: Option<Handle>) {
        self.parent = parent;
    }

    #[inline]
    pub(crate) fn height(&self) -> u8 {
        self.height
    }

    #[inline]
    pub(crate) fn set_height(&mut self, height: u8) {
        self.height = height;
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn new_node_is_a_detached_leaf() {
        let node = Node::new(7, Handle::from_index(2));
        assert_eq!(node.key(), &7);
        assert_eq!(node.value(), Handle::from_index(2));
        assert_eq!(node.height(), 1);
        assert!(node.left().is_none());
        assert!(node.right().is_none());
        assert!(node.parent().is_none());
    }

    #[test]
    fn children_are_addressed_by_side() {
        let mut node = Node::new(1, Handle::from_index(0));
        let left = Handle::from_index(3);
        let right = Handle::from_index(4);
        node.set_child(Side::Left, Some(left));
        node.set_child(Side::Right.opposite().opposite(), Some(right));

        assert_eq!(node.child(Side::Left), Some(left));
        assert_eq!(node.child(Side::Right), Some(right));
        assert_eq!(node.side_of(left), Some(Side::Left));
        assert_eq!(node.side_of(right), Some(Side::Right));
        assert_eq!(node.side_of(Handle::from_index(9)), None);
    }

    #[test]
    fn relinking_keeps_key_and_value_handle() {
        let mut node = Node::new("k", Handle::from_index(5));
        node.set_parent(Some(Handle::from_index(1)));
        node.set_height(3);
        assert_eq!(node.value(), Handle::from_index(5));
        assert_eq!(node.into_key(), "k");
    }
}
