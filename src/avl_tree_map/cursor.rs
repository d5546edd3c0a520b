use core::borrow::Borrow;
use core::fmt;
use core::ops::Bound;
use core::ptr;

use crate::compare::{Compare, Natural};
use crate::raw::{Handle, RawAvlTree};

/// A position in an `AvlTreeMap`: either an entry or the end sentinel one past the last entry.
///
/// Cursors are created by [`cursor_front`], [`cursor_end`], [`find`], [`lower_bound`] and
/// [`upper_bound`]. They step in both directions using only the tree's parent and child links.
/// Two cursors are equal when they refer to the same map and the same position.
///
/// # Examples
///
/// ```
/// use avl_tree_map::AvlTreeMap;
///
/// let map = AvlTreeMap::from([(1, "a"), (2, "b"), (3, "c")]);
///
/// let mut cursor = map.cursor_end();
/// cursor.move_prev();
/// assert_eq!(cursor.key(), Some(&3));
///
/// let mut cursor = map.find(&1);
/// cursor.move_prev();
/// assert!(cursor.is_end());
/// ```
///
/// [`cursor_front`]: crate::AvlTreeMap::cursor_front
/// [`cursor_end`]: crate::AvlTreeMap::cursor_end
/// [`find`]: crate::AvlTreeMap::find
/// [`lower_bound`]: crate::AvlTreeMap::lower_bound
/// [`upper_bound`]: crate::AvlTreeMap::upper_bound
pub struct Cursor<'a, K, V, C = Natural> {
    tree: &'a RawAvlTree<K, V, C>,
    current: Option<Handle>,
}

/// A position in an `AvlTreeMap` that can modify the value at that position or remove its
/// entry.
///
/// Created by [`cursor_front_mut`], [`cursor_end_mut`], [`find_mut`], [`insert_cursor`] and
/// the `_mut` bound queries.
///
/// [`cursor_front_mut`]: crate::AvlTreeMap::cursor_front_mut
/// [`cursor_end_mut`]: crate::AvlTreeMap::cursor_end_mut
/// [`find_mut`]: crate::AvlTreeMap::find_mut
/// [`insert_cursor`]: crate::AvlTreeMap::insert_cursor
pub struct CursorMut<'a, K, V, C = Natural> {
    tree: &'a mut RawAvlTree<K, V, C>,
    current: Option<Handle>,
}

impl<'a, K, V, C> Cursor<'a, K, V, C> {
    pub(crate) fn new(tree: &'a RawAvlTree<K, V, C>, current: Option<Handle>) -> Self {
        Self { tree, current }
    }

    /// Returns `true` if the cursor is at the end sentinel.
    #[must_use]
    pub fn is_end(&self) -> bool {
        self.current.is_none()
    }

    /// Returns the key at the cursor, or `None` at the end sentinel.
    #[must_use]
    pub fn key(&self) -> Option<&'a K> {
        self.key_value().map(|(k, _)| k)
    }

    /// Returns the value at the cursor, or `None` at the end sentinel.
    #[must_use]
    pub fn value(&self) -> Option<&'a V> {
        self.key_value().map(|(_, v)| v)
    }

    /// Returns the entry at the cursor, or `None` at the end sentinel.
    #[must_use]
    pub fn key_value(&self) -> Option<(&'a K, &'a V)> {
        let tree = self.tree;
        self.current.map(|h| tree.key_value(h))
    }

    /// Advances to the in-order successor. Stepping from the last entry reaches the end sentinel.
    ///
    /// # Panics
    ///
    /// Panics if the cursor is already at the end sentinel.
    pub fn move_next(&mut self) {
        let current = self.current.expect("`Cursor::move_next()` - cursor is at the end!");
        self.current = self.tree.next(current);
    }

    /// Steps back to the in-order predecessor.
    ///
    /// From the end sentinel this reaches the last entry. From the first entry it reaches the end
    /// sentinel.
    ///
    /// # Panics
    ///
    /// Panics if the cursor is at the end sentinel of an empty map.
    pub fn move_prev(&mut self) {
        self.current = step_back(self.tree, self.current, "`Cursor::move_prev()` - map is empty!");
    }

    /// Returns the entry after the cursor without moving it.
    #[must_use]
    pub fn peek_next(&self) -> Option<(&'a K, &'a V)> {
        let tree = self.tree;
        self.current.and_then(|h| tree.next(h)).map(|h| tree.key_value(h))
    }

    /// Returns the entry before the cursor without moving it. At the end sentinel this is the
    /// last entry.
    #[must_use]
    pub fn peek_prev(&self) -> Option<(&'a K, &'a V)> {
        let tree = self.tree;
        match self.current {
            Some(h) => tree.prev(h),
            None => tree.last(),
        }
        .map(|h| tree.key_value(h))
    }
}

fn step_back<K, V, C>(tree: &RawAvlTree<K, V, C>, current: Option<Handle>, empty: &str) -> Option<Handle> {
    match current {
        Some(h) => tree.prev(h),
        None => {
            assert!(!tree.is_empty(), "{empty}");
            tree.last()
        }
    }
}

impl<K, V, C> Clone for Cursor<'_, K, V, C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K, V, C> Copy for Cursor<'_, K, V, C> {}

impl<K, V, C> PartialEq for Cursor<'_, K, V, C> {
    fn eq(&self, other: &Self) -> bool {
        ptr::eq(self.tree, other.tree) && self.current == other.current
    }
}

impl<K, V, C> Eq for Cursor<'_, K, V, C> {}

impl<K: fmt::Debug, V: fmt::Debug, C> fmt::Debug for Cursor<'_, K, V, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Cursor").field(&self.key_value()).finish()
    }
}

impl<'a, K, V, C> CursorMut<'a, K, V, C> {
    pub(crate) fn new(tree: &'a mut RawAvlTree<K, V, C>, current: Option<Handle>) -> Self {
        Self { tree, current }
    }

    /// Returns `true` if the cursor is at the end sentinel.
    #[must_use]
    pub fn is_end(&self) -> bool {
        self.current.is_none()
    }

    /// Returns the key at the cursor, or `None` at the end sentinel.
    #[must_use]
    pub fn key(&self) -> Option<&K> {
        self.current.map(|h| self.tree.key(h))
    }

    /// Returns the value at the cursor, or `None` at the end sentinel.
    #[must_use]
    pub fn value(&self) -> Option<&V> {
        self.current.map(|h| self.tree.value(h))
    }

    /// Returns a mutable reference to the value at the cursor, or `None` at the end sentinel.
    ///
    /// ```
    /// use avl_tree_map::AvlTreeMap;
    ///
    /// let mut map = AvlTreeMap::from([(1, 10)]);
    /// if let Some(value) = map.find_mut(&1).value_mut() {
    ///     *value += 5;
    /// }
    /// assert_eq!(map[&1], 15);
    /// ```
    pub fn value_mut(&mut self) -> Option<&mut V> {
        self.current.map(|h| self.tree.value_mut(h))
    }

    /// Returns the key and a mutable value reference at the cursor.
    pub fn key_value_mut(&mut self) -> Option<(&K, &mut V)> {
        self.current.map(|h| self.tree.key_value_mut(h))
    }

    /// Advances to the in-order successor.
    ///
    /// # Panics
    ///
    /// Panics if the cursor is already at the end sentinel.
    pub fn move_next(&mut self) {
        let current = self.current.expect("`CursorMut::move_next()` - cursor is at the end!");
        self.current = self.tree.next(current);
    }

    /// Steps back to the in-order predecessor, with the same end sentinel rules as
    /// [`Cursor::move_prev`].
    ///
    /// # Panics
    ///
    /// Panics if the cursor is at the end sentinel of an empty map.
    pub fn move_prev(&mut self) {
        self.current = step_back(self.tree, self.current, "`CursorMut::move_prev()` - map is empty!");
    }

    /// Removes the entry at the cursor and moves to its in-order successor, which is the end
    /// sentinel when the last entry was removed. Returns `None` without doing anything at the end
    /// sentinel.
    ///
    /// # Examples
    ///
    /// ```
    /// use avl_tree_map::AvlTreeMap;
    ///
    /// let mut map: AvlTreeMap<i32, ()> = (1..=5).map(|k| (k, ())).collect();
    /// let mut cursor = map.find_mut(&2);
    /// assert_eq!(cursor.remove_current(), Some((2, ())));
    /// assert_eq!(cursor.key(), Some(&3));
    /// assert_eq!(map.len(), 4);
    /// ```
    pub fn remove_current(&mut self) -> Option<(K, V)> {
        let current = self.current?;
        let next = self.tree.next(current);
        let removed = self.tree.remove_node(current);
        // The successor keeps its handle through the splice.
        self.current = next;
        Some(removed)
    }

    /// Removes the run of entries from the cursor up to, but not including, the first entry whose
    /// key is not less than `key`, and leaves the cursor at that entry (or at the end sentinel).
    /// Returns how many entries were removed.
    ///
    /// Nothing is removed when the cursor is at the end sentinel or its key is already not less
    /// than `key`.
    ///
    /// # Examples
    ///
    /// ```
    /// use avl_tree_map::AvlTreeMap;
    ///
    /// let mut map: AvlTreeMap<i32, ()> = [1, 3, 5, 7, 9].into_iter().map(|k| (k, ())).collect();
    /// let mut cursor = map.find_mut(&3);
    /// assert_eq!(cursor.remove_until(&8), 3);
    /// assert_eq!(cursor.key(), Some(&9));
    /// assert_eq!(map.keys().copied().collect::<Vec<_>>(), [1, 9]);
    /// ```
    pub fn remove_until<Q>(&mut self, key: &Q) -> usize
    where
        K: Borrow<Q>,
        C: Compare<Q>,
        Q: ?Sized,
    {
        let (removed, next) = self.tree.remove_run(self.current, Bound::Excluded(key));
        self.current = next;
        removed
    }

    /// Returns a read-only cursor at the same position, borrowing this one.
    #[must_use]
    pub fn as_cursor(&self) -> Cursor<'_, K, V, C> {
        Cursor::new(self.tree, self.current)
    }
}

impl<K: fmt::Debug, V: fmt::Debug, C> fmt::Debug for CursorMut<'_, K, V, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("CursorMut").field(&self.current.map(|h| self.tree.key_value(h))).finish()
    }
}
