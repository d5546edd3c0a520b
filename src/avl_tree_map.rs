use core::borrow::Borrow;
use core::cmp::Ordering;
use core::fmt;
use core::hash::{Hash, Hasher};
use core::iter::FusedIterator;
use core::marker::PhantomData;
use core::ops::{Bound, Index, RangeBounds};

use alloc::vec::Vec;

use crate::compare::{Compare, Natural};
use crate::error::{Error, Result};
use crate::raw::{Handle, RawAvlTree};

mod cursor;
mod entry;

pub use cursor::{Cursor, CursorMut};
pub use entry::{Entry, OccupiedEntry, VacantEntry};

/// Panics if the start bound lies after the end bound, or if both are the same excluded key.
fn validate_range_bounds<T, C, R>(comparator: &C, range: &R)
where
    T: ?Sized,
    C: Compare<T>,
    R: RangeBounds<T>,
{
    if let (Bound::Included(start) | Bound::Excluded(start), Bound::Included(end) | Bound::Excluded(end)) =
        (range.start_bound(), range.end_bound())
    {
        let ordering = comparator.compare(start, end);
        let valid =
            if matches!(range.start_bound(), Bound::Excluded(_)) && matches!(range.end_bound(), Bound::Excluded(_)) {
                ordering == Ordering::Less
            } else {
                ordering != Ordering::Greater
            };
        assert!(valid, "range start is greater than range end in AvlTreeMap");
    }
}

/// An ordered map based on an [AVL tree].
///
/// Keys are kept in the order defined by the comparator `C`, which defaults to [`Natural`] (the
/// key's [`Ord`] implementation). Every node stores one entry; after each insertion or removal
/// the heights of any node's two subtrees differ by at most one, so lookups, insertions and
/// removals take O(log n) time.
///
/// Besides the usual iterators the map offers positional [`Cursor`]s with an end sentinel, the
/// bound queries [`lower_bound`](Self::lower_bound) and [`upper_bound`](Self::upper_bound), and the
/// set combinators [`union`](Self::union), [`intersection`](Self::intersection) and
/// [`complement`](Self::complement).
///
/// Inserting a key that is already present overwrites its value and leaves the tree shape
/// untouched.
///
/// # Examples
///
/// ```
/// use avl_tree_map::AvlTreeMap;
///
/// let mut planets = AvlTreeMap::new();
/// planets.insert(3, "Earth");
/// planets.insert(1, "Mercury");
/// planets.insert(2, "Venus");
///
/// assert_eq!(planets.get(&2), Some(&"Venus"));
/// assert_eq!(planets.len(), 3);
///
/// // Iteration is in key order.
/// let names: Vec<_> = planets.values().copied().collect();
/// assert_eq!(names, ["Mercury", "Venus", "Earth"]);
///
/// // Overwriting keeps the size.
/// assert_eq!(planets.insert(3, "Terra"), Some("Earth"));
/// assert_eq!(planets.len(), 3);
///
/// planets.remove(&1);
/// assert_eq!(planets.first_key_value(), Some((&2, &"Venus")));
/// ```
///
/// A map with a known list of items can be initialized from an array:
///
/// ```
/// use avl_tree_map::AvlTreeMap;
///
/// let solar_distance = AvlTreeMap::from([
///     ("Mercury", 0.4),
///     ("Venus", 0.7),
///     ("Earth", 1.0),
///     ("Mars", 1.5),
/// ]);
/// assert_eq!(solar_distance[&"Earth"], 1.0);
/// ```
///
/// # Borrowing
///
/// Iterators and cursors borrow the map, so a map can have one mutator or any number of readers,
/// never both at the same time.
///
/// [AVL tree]: https://en.wikipedia.org/wiki/AVL_tree
pub struct AvlTreeMap<K, V, C = Natural> {
    pub(crate) raw: RawAvlTree<K, V, C>,
}

/// An iterator over the entries of an `AvlTreeMap`.
///
/// This `struct` is created by the [`iter`] method on [`AvlTreeMap`].
///
/// # Examples
///
/// ```
/// use avl_tree_map::AvlTreeMap;
///
/// let map = AvlTreeMap::from([(1, "a"), (2, "b")]);
/// let mut iter = map.iter();
/// assert_eq!(iter.next(), Some((&1, &"a")));
/// assert_eq!(iter.next_back(), Some((&2, &"b")));
/// assert_eq!(iter.next(), None);
/// ```
///
/// [`iter`]: AvlTreeMap::iter
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Iter<'a, K, V, C = Natural> {
    tree: &'a RawAvlTree<K, V, C>,
    front: Option<Handle>,
    back: Option<Handle>,
    remaining: usize,
}

/// A mutable iterator over the entries of an `AvlTreeMap`.
///
/// This `struct` is created by the [`iter_mut`] method on [`AvlTreeMap`].
///
/// [`iter_mut`]: AvlTreeMap::iter_mut
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct IterMut<'a, K: 'a, V: 'a, C = Natural> {
    tree: *mut RawAvlTree<K, V, C>,
    front: Option<Handle>,
    back: Option<Handle>,
    remaining: usize,
    _marker: PhantomData<&'a mut (K, V, C)>,
}

// SAFETY: IterMut behaves as &mut RawAvlTree<K, V, C>, so it is Send when K, V and C are Send.
// It is NOT Sync because mutable iterators should not be shared across threads.
unsafe impl<K: Send, V: Send, C: Send> Send for IterMut<'_, K, V, C> {}

/// An owning iterator over the entries of an `AvlTreeMap`, sorted by key.
///
/// This `struct` is created by the [`into_iter`] method on [`AvlTreeMap`]
/// (provided by the [`IntoIterator`] trait).
///
/// [`into_iter`]: IntoIterator::into_iter
pub struct IntoIter<K, V> {
    inner: alloc::vec::IntoIter<(K, V)>,
}

/// An iterator over the keys of an `AvlTreeMap`.
///
/// This `struct` is created by the [`keys`] method on [`AvlTreeMap`].
///
/// [`keys`]: AvlTreeMap::keys
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Keys<'a, K, V, C = Natural> {
    inner: Iter<'a, K, V, C>,
}

/// An iterator over the values of an `AvlTreeMap`.
///
/// This `struct` is created by the [`values`] method on [`AvlTreeMap`].
///
/// [`values`]: AvlTreeMap::values
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Values<'a, K, V, C = Natural> {
    inner: Iter<'a, K, V, C>,
}

/// A mutable iterator over the values of an `AvlTreeMap`.
///
/// This `struct` is created by the [`values_mut`] method on [`AvlTreeMap`].
///
/// [`values_mut`]: AvlTreeMap::values_mut
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct ValuesMut<'a, K, V, C = Natural> {
    inner: IterMut<'a, K, V, C>,
}

/// An iterator over a sub-range of entries in an `AvlTreeMap`.
///
/// This `struct` is created by the [`range`] method on [`AvlTreeMap`].
///
/// [`range`]: AvlTreeMap::range
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Range<'a, K, V, C = Natural> {
    tree: &'a RawAvlTree<K, V, C>,
    // Both ends are inclusive; both `None` once exhausted.
    front: Option<Handle>,
    back: Option<Handle>,
}

impl<K, V> AvlTreeMap<K, V> {
    /// Makes a new, empty `AvlTreeMap` ordered by [`Ord`].
    ///
    /// Does not allocate anything on its own.
    ///
    /// # Examples
    ///
    /// ```
    /// use avl_tree_map::AvlTreeMap;
    ///
    /// let mut map = AvlTreeMap::new();
    /// map.insert(1, "a");
    /// ```
    #[must_use]
    pub const fn new() -> Self {
        Self::with_comparator(Natural)
    }
}

impl<K, V, C> AvlTreeMap<K, V, C> {
    /// Makes a new, empty `AvlTreeMap` ordered by `comparator`.
    ///
    /// # Examples
    ///
    /// ```
    /// use avl_tree_map::{AvlTreeMap, Reversed};
    ///
    /// let mut map = AvlTreeMap::with_comparator(Reversed);
    /// map.insert(1, "a");
    /// map.insert(2, "b");
    /// assert_eq!(map.keys().copied().collect::<Vec<_>>(), [2, 1]);
    /// ```
    #[must_use]
    pub const fn with_comparator(comparator: C) -> Self {
        Self {
            raw: RawAvlTree::new(comparator),
        }
    }

    /// Returns a reference to the map's comparator.
    pub fn comparator(&self) -> &C {
        self.raw.comparator()
    }

    /// Returns the number of elements in the map.
    ///
    /// # Examples
    ///
    /// ```
    /// use avl_tree_map::AvlTreeMap;
    ///
    /// let mut a = AvlTreeMap::new();
    /// assert_eq!(a.len(), 0);
    /// a.insert(1, "a");
    /// assert_eq!(a.len(), 1);
    /// ```
    #[must_use]
    pub const fn len(&self) -> usize {
        self.raw.len()
    }

    /// Returns `true` if the map contains no elements.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Returns the height of the tree: 0 for an empty map, 1 for a single entry.
    ///
    /// The height never exceeds about 1.44 log<sub>2</sub>(n + 2).
    ///
    /// ```
    /// use avl_tree_map::AvlTreeMap;
    ///
    /// let map: AvlTreeMap<_, _> = (0..7).map(|k| (k, ())).collect();
    /// assert_eq!(map.height(), 3);
    /// ```
    #[must_use]
    pub fn height(&self) -> usize {
        usize::from(self.raw.height())
    }

    /// Clears the map, removing all elements.
    ///
    /// # Examples
    ///
    /// ```
    /// use avl_tree_map::AvlTreeMap;
    ///
    /// let mut a = AvlTreeMap::new();
    /// a.insert(1, "a");
    /// a.clear();
    /// assert!(a.is_empty());
    /// ```
    pub fn clear(&mut self) {
        self.raw.clear();
    }

    /// Returns the first key-value pair in the map, the one with the minimum key.
    #[must_use]
    pub fn first_key_value(&self) -> Option<(&K, &V)> {
        self.raw.first().map(|h| self.raw.key_value(h))
    }

    /// Returns the last key-value pair in the map, the one with the maximum key.
    #[must_use]
    pub fn last_key_value(&self) -> Option<(&K, &V)> {
        self.raw.last().map(|h| self.raw.key_value(h))
    }

    /// Removes and returns the first element in the map.
    ///
    /// # Examples
    ///
    /// ```
    /// use avl_tree_map::AvlTreeMap;
    ///
    /// let mut map = AvlTreeMap::from([(1, "a"), (2, "b")]);
    /// assert_eq!(map.pop_first(), Some((1, "a")));
    /// assert_eq!(map.pop_first(), Some((2, "b")));
    /// assert_eq!(map.pop_first(), None);
    /// ```
    pub fn pop_first(&mut self) -> Option<(K, V)> {
        let first = self.raw.first()?;
        Some(self.raw.remove_node(first))
    }

    /// Removes and returns the last element in the map.
    pub fn pop_last(&mut self) -> Option<(K, V)> {
        let last = self.raw.last()?;
        Some(self.raw.remove_node(last))
    }

    /// Retains only the elements specified by the predicate.
    ///
    /// The predicate visits entries in ascending key order.
    ///
    /// # Examples
    ///
    /// ```
    /// use avl_tree_map::AvlTreeMap;
    ///
    /// let mut map: AvlTreeMap<i32, i32> = (0..8).map(|x| (x, x * 10)).collect();
    /// map.retain(|&k, _| k % 2 == 0);
    /// assert!(map.into_iter().eq(vec![(0, 0), (2, 20), (4, 40), (6, 60)]));
    /// ```
    pub fn retain<F>(&mut self, mut f: F)
    where
        F: FnMut(&K, &mut V) -> bool,
    {
        let mut order = Vec::with_capacity(self.raw.len());
        let mut current = self.raw.first();
        while let Some(handle) = current {
            order.push(handle);
            current = self.raw.next(handle);
        }
        // Removal relinks nodes without moving them, so the collected handles stay valid.
        for handle in order {
            let (key, value) = self.raw.key_value_mut(handle);
            if !f(key, value) {
                self.raw.remove_node(handle);
            }
        }
    }

    /// Gets an iterator over the entries of the map, sorted by key.
    ///
    /// # Examples
    ///
    /// ```
    /// use avl_tree_map::AvlTreeMap;
    ///
    /// let map = AvlTreeMap::from([(3, "c"), (2, "b"), (1, "a")]);
    /// let (first_key, first_value) = map.iter().next().unwrap();
    /// assert_eq!((*first_key, *first_value), (1, "a"));
    /// ```
    pub fn iter(&self) -> Iter<'_, K, V, C> {
        Iter {
            tree: &self.raw,
            front: self.raw.first(),
            back: self.raw.last(),
            remaining: self.raw.len(),
        }
    }

    /// Gets a mutable iterator over the entries of the map, sorted by key.
    ///
    /// # Examples
    ///
    /// ```
    /// use avl_tree_map::AvlTreeMap;
    ///
    /// let mut map = AvlTreeMap::from([("a", 1), ("b", 2), ("c", 3)]);
    /// for (key, value) in map.iter_mut() {
    ///     if key != &"a" {
    ///         *value += 10;
    ///     }
    /// }
    /// assert_eq!(map.values().copied().collect::<Vec<_>>(), [1, 12, 13]);
    /// ```
    pub fn iter_mut(&mut self) -> IterMut<'_, K, V, C> {
        IterMut {
            front: self.raw.first(),
            back: self.raw.last(),
            remaining: self.raw.len(),
            tree: &raw mut self.raw,
            _marker: PhantomData,
        }
    }

    /// Gets an iterator over the keys of the map, in sorted order.
    pub fn keys(&self) -> Keys<'_, K, V, C> {
        Keys { inner: self.iter() }
    }

    /// Gets an iterator over the values of the map, in order by key.
    pub fn values(&self) -> Values<'_, K, V, C> {
        Values { inner: self.iter() }
    }

    /// Gets a mutable iterator over the values of the map, in order by key.
    ///
    /// # Examples
    ///
    /// ```
    /// use avl_tree_map::AvlTreeMap;
    ///
    /// let mut a = AvlTreeMap::new();
    /// a.insert(1, String::from("hello"));
    /// a.insert(2, String::from("goodbye"));
    ///
    /// for value in a.values_mut() {
    ///     value.push_str("!");
    /// }
    ///
    /// let values: Vec<String> = a.values().cloned().collect();
    /// assert_eq!(values, [String::from("hello!"), String::from("goodbye!")]);
    /// ```
    pub fn values_mut(&mut self) -> ValuesMut<'_, K, V, C> {
        ValuesMut { inner: self.iter_mut() }
    }

    /// Returns a cursor at the first entry, or at the end sentinel when the map is empty.
    ///
    /// # Examples
    ///
    /// ```
    /// use avl_tree_map::AvlTreeMap;
    ///
    /// let map = AvlTreeMap::from([(1, "a"), (2, "b")]);
    /// let mut cursor = map.cursor_front();
    /// assert_eq!(cursor.key_value(), Some((&1, &"a")));
    /// cursor.move_next();
    /// cursor.move_next();
    /// assert_eq!(cursor, map.cursor_end());
    ///
    /// let empty: AvlTreeMap<i32, i32> = AvlTreeMap::new();
    /// assert_eq!(empty.cursor_front(), empty.cursor_end());
    /// ```
    pub fn cursor_front(&self) -> Cursor<'_, K, V, C> {
        Cursor::new(&self.raw, self.raw.first())
    }

    /// Returns a cursor at the end sentinel, one past the last entry.
    pub fn cursor_end(&self) -> Cursor<'_, K, V, C> {
        Cursor::new(&self.raw, None)
    }

    /// Returns a mutable cursor at the first entry, or at the end sentinel when the map is empty.
    pub fn cursor_front_mut(&mut self) -> CursorMut<'_, K, V, C> {
        let first = self.raw.first();
        CursorMut::new(&mut self.raw, first)
    }

    /// Returns a mutable cursor at the end sentinel.
    pub fn cursor_end_mut(&mut self) -> CursorMut<'_, K, V, C> {
        CursorMut::new(&mut self.raw, None)
    }
}

impl<K, V, C: Compare<K>> AvlTreeMap<K, V, C> {
    /// Returns a reference to the value corresponding to the key.
    ///
    /// # Examples
    ///
    /// ```
    /// use avl_tree_map::AvlTreeMap;
    ///
    /// let mut map = AvlTreeMap::new();
    /// map.insert(1, "a");
    /// assert_eq!(map.get(&1), Some(&"a"));
    /// assert_eq!(map.get(&2), None);
    /// ```
    ///
    /// The key may be any borrowed form of the map's key type, but the comparator must order the
    /// borrowed form the same way it orders the key type.
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        C: Compare<Q>,
        Q: ?Sized,
    {
        self.raw.search(key).map(|h| self.raw.value(h))
    }

    /// Returns the key-value pair corresponding to the supplied key.
    pub fn get_key_value<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        C: Compare<Q>,
        Q: ?Sized,
    {
        self.raw.search(key).map(|h| self.raw.key_value(h))
    }

    /// Returns a mutable reference to the value corresponding to the key.
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        C: Compare<Q>,
        Q: ?Sized,
    {
        let handle = self.raw.search(key)?;
        Some(self.raw.value_mut(handle))
    }

    /// Returns the value for `key`, or [`Error::KeyNotFound`] when it is absent.
    ///
    /// # Errors
    ///
    /// [`Error::KeyNotFound`] if the map has no entry for `key`.
    ///
    /// # Examples
    ///
    /// ```
    /// use avl_tree_map::{AvlTreeMap, Error};
    ///
    /// let map = AvlTreeMap::from([(1, "a")]);
    /// assert_eq!(map.try_get(&1), Ok(&"a"));
    /// assert_eq!(map.try_get(&2), Err(Error::KeyNotFound));
    /// ```
    pub fn try_get<Q>(&self, key: &Q) -> Result<&V>
    where
        K: Borrow<Q>,
        C: Compare<Q>,
        Q: ?Sized,
    {
        self.get(key).ok_or(Error::KeyNotFound)
    }

    /// Mutable counterpart of [`try_get`](Self::try_get).
    ///
    /// # Errors
    ///
    /// [`Error::KeyNotFound`] if the map has no entry for `key`.
    pub fn try_get_mut<Q>(&mut self, key: &Q) -> Result<&mut V>
    where
        K: Borrow<Q>,
        C: Compare<Q>,
        Q: ?Sized,
    {
        self.get_mut(key).ok_or(Error::KeyNotFound)
    }

    /// Returns `true` if the map contains a value for the specified key.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        C: Compare<Q>,
        Q: ?Sized,
    {
        self.raw.search(key).is_some()
    }

    /// Returns the number of entries with `key`: 0 or 1.
    pub fn count<Q>(&self, key: &Q) -> usize
    where
        K: Borrow<Q>,
        C: Compare<Q>,
        Q: ?Sized,
    {
        usize::from(self.contains_key(key))
    }

    /// Inserts a key-value pair into the map.
    ///
    /// If the map did not have this key present, `None` is returned.
    ///
    /// If the map did have this key present, the value is updated in place and the old value is
    /// returned. The key is not updated and no rebalancing happens.
    ///
    /// # Examples
    ///
    /// ```
    /// use avl_tree_map::AvlTreeMap;
    ///
    /// let mut map = AvlTreeMap::new();
    /// assert_eq!(map.insert(37, "a"), None);
    /// assert_eq!(map.is_empty(), false);
    ///
    /// map.insert(37, "b");
    /// assert_eq!(map.insert(37, "c"), Some("b"));
    /// assert_eq!(map[&37], "c");
    /// ```
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        self.raw.insert(key, value).1
    }

    /// Inserts a key-value pair and returns a cursor at its entry, plus `true` if the key was
    /// new and `false` if an existing value was overwritten.
    ///
    /// # Examples
    ///
    /// ```
    /// use avl_tree_map::AvlTreeMap;
    ///
    /// let mut map = AvlTreeMap::from([(1, "a"), (3, "c")]);
    /// let (mut cursor, inserted) = map.insert_cursor(2, "b");
    /// assert!(inserted);
    /// cursor.move_next();
    /// assert_eq!(cursor.key(), Some(&3));
    ///
    /// let (cursor, inserted) = map.insert_cursor(1, "z");
    /// assert!(!inserted);
    /// assert_eq!(cursor.key(), Some(&1));
    /// ```
    pub fn insert_cursor(&mut self, key: K, value: V) -> (CursorMut<'_, K, V, C>, bool) {
        let (handle, old) = self.raw.insert(key, value);
        (CursorMut::new(&mut self.raw, Some(handle)), old.is_none())
    }

    /// Returns the value for `key`, inserting `V::default()` first if it is absent.
    ///
    /// # Examples
    ///
    /// ```
    /// use avl_tree_map::AvlTreeMap;
    ///
    /// let mut counts: AvlTreeMap<&str, u32> = AvlTreeMap::new();
    /// for word in ["a", "b", "a"] {
    ///     *counts.get_or_insert_default(word) += 1;
    /// }
    /// assert_eq!(counts[&"a"], 2);
    /// assert_eq!(counts[&"b"], 1);
    /// ```
    pub fn get_or_insert_default(&mut self, key: K) -> &mut V
    where
        V: Default,
    {
        self.entry(key).or_default()
    }

    /// Gets the given key's corresponding entry in the map for in-place manipulation.
    ///
    /// # Examples
    ///
    /// ```
    /// use avl_tree_map::AvlTreeMap;
    ///
    /// let mut count: AvlTreeMap<&str, usize> = AvlTreeMap::new();
    ///
    /// // count the number of occurrences of letters in the vec
    /// for x in ["a", "b", "a", "c", "a", "b"] {
    ///     count.entry(x).and_modify(|curr| *curr += 1).or_insert(1);
    /// }
    ///
    /// assert_eq!(count[&"a"], 3);
    /// assert_eq!(count[&"b"], 2);
    /// assert_eq!(count[&"c"], 1);
    /// ```
    pub fn entry(&mut self, key: K) -> Entry<'_, K, V, C> {
        match self.raw.search(&key) {
            Some(handle) => Entry::Occupied(OccupiedEntry {
                handle,
                tree: &mut self.raw,
            }),
            None => Entry::Vacant(VacantEntry {
                key,
                tree: &mut self.raw,
            }),
        }
    }

    /// Removes a key from the map, returning the value at the key if the key was previously in
    /// the map.
    ///
    /// # Examples
    ///
    /// ```
    /// use avl_tree_map::AvlTreeMap;
    ///
    /// let mut map = AvlTreeMap::new();
    /// map.insert(1, "a");
    /// assert_eq!(map.remove(&1), Some("a"));
    /// assert_eq!(map.remove(&1), None);
    /// ```
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        C: Compare<Q>,
        Q: ?Sized,
    {
        self.remove_entry(key).map(|(_, v)| v)
    }

    /// Removes a key from the map, returning the stored key and value if the key was previously
    /// in the map.
    pub fn remove_entry<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        C: Compare<Q>,
        Q: ?Sized,
    {
        self.raw.remove(key)
    }

    /// Removes every entry with `key` and returns how many were removed.
    ///
    /// Keys are unique, so the result is 0 or 1.
    ///
    /// ```
    /// use avl_tree_map::AvlTreeMap;
    ///
    /// let mut map = AvlTreeMap::from([(1, "a"), (2, "b")]);
    /// assert_eq!(map.erase(&1), 1);
    /// assert_eq!(map.erase(&1), 0);
    /// ```
    pub fn erase<Q>(&mut self, key: &Q) -> usize
    where
        K: Borrow<Q>,
        C: Compare<Q>,
        Q: ?Sized,
    {
        let mut removed = 0;
        while self.raw.remove(key).is_some() {
            removed += 1;
        }
        removed
    }

    /// Returns a cursor at the entry for `key`, or at the end sentinel when it is absent.
    ///
    /// ```
    /// use avl_tree_map::AvlTreeMap;
    ///
    /// let map = AvlTreeMap::from([(1, "a")]);
    /// assert_eq!(map.find(&1).value(), Some(&"a"));
    /// assert_eq!(map.find(&2), map.cursor_end());
    /// ```
    pub fn find<Q>(&self, key: &Q) -> Cursor<'_, K, V, C>
    where
        K: Borrow<Q>,
        C: Compare<Q>,
        Q: ?Sized,
    {
        Cursor::new(&self.raw, self.raw.search(key))
    }

    /// Mutable counterpart of [`find`](Self::find).
    pub fn find_mut<Q>(&mut self, key: &Q) -> CursorMut<'_, K, V, C>
    where
        K: Borrow<Q>,
        C: Compare<Q>,
        Q: ?Sized,
    {
        let handle = self.raw.search(key);
        CursorMut::new(&mut self.raw, handle)
    }

    /// Returns a cursor at the first entry whose key is not less than `key`, or the end sentinel.
    ///
    /// Runs in O(log n) by descending from the root.
    ///
    /// # Examples
    ///
    /// ```
    /// use avl_tree_map::AvlTreeMap;
    ///
    /// let map = AvlTreeMap::from([(10, "a"), (20, "b"), (30, "c")]);
    /// assert_eq!(map.lower_bound(&20).key(), Some(&20));
    /// assert_eq!(map.lower_bound(&21).key(), Some(&30));
    /// assert!(map.lower_bound(&31).is_end());
    /// ```
    pub fn lower_bound<Q>(&self, key: &Q) -> Cursor<'_, K, V, C>
    where
        K: Borrow<Q>,
        C: Compare<Q>,
        Q: ?Sized,
    {
        Cursor::new(&self.raw, self.raw.lower_bound(key))
    }

    /// Returns a cursor at the first entry whose key is greater than `key`, or the end sentinel.
    ///
    /// Runs in O(log n) by descending from the root.
    ///
    /// ```
    /// use avl_tree_map::AvlTreeMap;
    ///
    /// let map = AvlTreeMap::from([(10, "a"), (20, "b"), (30, "c")]);
    /// assert_eq!(map.upper_bound(&20).key(), Some(&30));
    /// assert_eq!(map.upper_bound(&5).key(), Some(&10));
    /// ```
    pub fn upper_bound<Q>(&self, key: &Q) -> Cursor<'_, K, V, C>
    where
        K: Borrow<Q>,
        C: Compare<Q>,
        Q: ?Sized,
    {
        Cursor::new(&self.raw, self.raw.upper_bound(key))
    }

    /// Mutable counterpart of [`lower_bound`](Self::lower_bound).
    pub fn lower_bound_mut<Q>(&mut self, key: &Q) -> CursorMut<'_, K, V, C>
    where
        K: Borrow<Q>,
        C: Compare<Q>,
        Q: ?Sized,
    {
        let handle = self.raw.lower_bound(key);
        CursorMut::new(&mut self.raw, handle)
    }

    /// Mutable counterpart of [`upper_bound`](Self::upper_bound).
    pub fn upper_bound_mut<Q>(&mut self, key: &Q) -> CursorMut<'_, K, V, C>
    where
        K: Borrow<Q>,
        C: Compare<Q>,
        Q: ?Sized,
    {
        let handle = self.raw.upper_bound(key);
        CursorMut::new(&mut self.raw, handle)
    }

    /// [`lower_bound`](Self::lower_bound) computed by scanning from the first entry.
    ///
    /// Always returns the same position as `lower_bound`, in O(n).
    pub fn lower_bound_scan<Q>(&self, key: &Q) -> Cursor<'_, K, V, C>
    where
        K: Borrow<Q>,
        C: Compare<Q>,
        Q: ?Sized,
    {
        Cursor::new(&self.raw, self.raw.lower_bound_scan(key))
    }

    /// [`upper_bound`](Self::upper_bound) computed by scanning from the first entry.
    ///
    /// Always returns the same position as `upper_bound`, in O(n).
    pub fn upper_bound_scan<Q>(&self, key: &Q) -> Cursor<'_, K, V, C>
    where
        K: Borrow<Q>,
        C: Compare<Q>,
        Q: ?Sized,
    {
        Cursor::new(&self.raw, self.raw.upper_bound_scan(key))
    }

    /// Returns `(lower_bound(key), upper_bound(key))`: the cursors delimiting the entries equal
    /// to `key`.
    ///
    /// ```
    /// use avl_tree_map::AvlTreeMap;
    ///
    /// let map = AvlTreeMap::from([(1, "a"), (2, "b"), (3, "c")]);
    /// let (lo, hi) = map.equal_range(&2);
    /// assert_eq!(lo.key(), Some(&2));
    /// assert_eq!(hi.key(), Some(&3));
    ///
    /// let (lo, hi) = map.equal_range(&5);
    /// assert!(lo.is_end() && hi.is_end());
    /// ```
    pub fn equal_range<Q>(&self, key: &Q) -> (Cursor<'_, K, V, C>, Cursor<'_, K, V, C>)
    where
        K: Borrow<Q>,
        C: Compare<Q>,
        Q: ?Sized,
    {
        (self.lower_bound(key), self.upper_bound(key))
    }

    /// Constructs a double-ended iterator over a sub-range of elements in the map.
    ///
    /// # Panics
    ///
    /// Panics if range `start > end`.
    /// Panics if range `start == end` and both bounds are `Excluded`.
    ///
    /// # Examples
    ///
    /// ```
    /// use avl_tree_map::AvlTreeMap;
    /// use std::ops::Bound::Included;
    ///
    /// let mut map = AvlTreeMap::new();
    /// map.insert(3, "a");
    /// map.insert(5, "b");
    /// map.insert(8, "c");
    /// for (&key, &value) in map.range((Included(4), Included(8))) {
    ///     println!("{key}: {value}");
    /// }
    /// assert_eq!(Some((&5, &"b")), map.range(4..).next());
    /// ```
    pub fn range<T, R>(&self, range: R) -> Range<'_, K, V, C>
    where
        T: ?Sized,
        K: Borrow<T>,
        C: Compare<T>,
        R: RangeBounds<T>,
    {
        validate_range_bounds::<T, _, _>(self.raw.comparator(), &range);

        let front = self.raw.front_of(range.start_bound());
        let back = self.raw.back_of(range.end_bound());
        let (front, back) = match (front, back) {
            (Some(f), Some(b))
                if Compare::<K>::compare(self.raw.comparator(), self.raw.key(f), self.raw.key(b)) != Ordering::Greater =>
            {
                (Some(f), Some(b))
            }
            _ => (None, None),
        };

        Range {
            tree: &self.raw,
            front,
            back,
        }
    }
}

impl<K, V, C> AvlTreeMap<K, V, C> {
    /// Removes every entry whose key lies in `range` and returns how many were removed.
    ///
    /// The entries form one consecutive run in key order, which is unlinked front to back.
    ///
    /// # Panics
    ///
    /// Panics if range `start > end`.
    /// Panics if range `start == end` and both bounds are `Excluded`.
    ///
    /// # Examples
    ///
    /// ```
    /// use avl_tree_map::AvlTreeMap;
    ///
    /// let mut map: AvlTreeMap<i32, char> = (1..=6).zip('a'..).collect();
    /// assert_eq!(map.remove_range(2..5), 3);
    /// assert_eq!(map.keys().copied().collect::<Vec<_>>(), [1, 5, 6]);
    /// assert_eq!(map.remove_range(..), 3);
    /// assert!(map.is_empty());
    /// ```
    pub fn remove_range<T, R>(&mut self, range: R) -> usize
    where
        T: ?Sized,
        K: Borrow<T>,
        C: Compare<T>,
        R: RangeBounds<T>,
    {
        validate_range_bounds::<T, _, _>(self.raw.comparator(), &range);

        let front = self.raw.front_of(range.start_bound());
        self.raw.remove_run(front, range.end_bound()).0
    }
}

impl<K: Clone, V: Clone, C: Compare<K> + Clone> Clone for AvlTreeMap<K, V, C> {
    /// Rebuilds the map by inserting every pair in ascending order. The copy holds the same
    /// entries but not necessarily the same internal shape.
    fn clone(&self) -> Self {
        let mut map = AvlTreeMap::with_comparator(self.raw.comparator().clone());
        for (key, value) in self {
            map.insert(key.clone(), value.clone());
        }
        map
    }
}

impl<K: Hash, V: Hash, C> Hash for AvlTreeMap<K, V, C> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_usize(self.len());
        for elt in self.iter() {
            elt.hash(state);
        }
    }
}

impl<K: PartialEq, V: PartialEq, C> PartialEq for AvlTreeMap<K, V, C> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().zip(other.iter()).all(|(a, b)| a == b)
    }
}

impl<K: Eq, V: Eq, C> Eq for AvlTreeMap<K, V, C> {}

impl<K: PartialOrd, V: PartialOrd, C> PartialOrd for AvlTreeMap<K, V, C> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.iter().partial_cmp(other.iter())
    }
}

impl<K: Ord, V: Ord, C> Ord for AvlTreeMap<K, V, C> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.iter().cmp(other.iter())
    }
}

impl<K: fmt::Debug, V: fmt::Debug, C> fmt::Debug for AvlTreeMap<K, V, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K, V, C: Default> Default for AvlTreeMap<K, V, C> {
    /// Creates an empty `AvlTreeMap`.
    fn default() -> Self {
        AvlTreeMap::with_comparator(C::default())
    }
}

impl<K, V, C: Compare<K> + Default> FromIterator<(K, V)> for AvlTreeMap<K, V, C> {
    /// Inserts the pairs one at a time; a later duplicate overwrites an earlier value.
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut map = AvlTreeMap::default();
        map.extend(iter);
        map
    }
}

impl<K, V, C: Compare<K>> Extend<(K, V)> for AvlTreeMap<K, V, C> {
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

impl<'a, K: Copy + 'a, V: Copy + 'a, C: Compare<K>> Extend<(&'a K, &'a V)> for AvlTreeMap<K, V, C> {
    fn extend<T: IntoIterator<Item = (&'a K, &'a V)>>(&mut self, iter: T) {
        self.extend(iter.into_iter().map(|(&k, &v)| (k, v)));
    }
}

impl<'a, K, V, C> IntoIterator for &'a AvlTreeMap<K, V, C> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V, C>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, K, V, C> IntoIterator for &'a mut AvlTreeMap<K, V, C> {
    type Item = (&'a K, &'a mut V);
    type IntoIter = IterMut<'a, K, V, C>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

impl<K, V, C> IntoIterator for AvlTreeMap<K, V, C> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;

    /// Gets an owning iterator over the entries of the map, sorted by key.
    ///
    /// ```
    /// use avl_tree_map::AvlTreeMap;
    ///
    /// let map = AvlTreeMap::from([(3, "c"), (1, "a"), (2, "b")]);
    /// let pairs: Vec<_> = map.into_iter().collect();
    /// assert_eq!(pairs, [(1, "a"), (2, "b"), (3, "c")]);
    /// ```
    fn into_iter(mut self) -> Self::IntoIter {
        IntoIter {
            inner: self.raw.drain_to_vec().into_iter(),
        }
    }
}

impl<K, Q, V, C> Index<&Q> for AvlTreeMap<K, V, C>
where
    K: Borrow<Q>,
    C: Compare<K> + Compare<Q>,
    Q: ?Sized,
{
    type Output = V;

    /// Returns a reference to the value corresponding to the supplied key.
    ///
    /// # Panics
    ///
    /// Panics if the key is not present in the `AvlTreeMap`.
    #[inline]
    fn index(&self, key: &Q) -> &V {
        self.get(key).expect("no entry found for key")
    }
}

impl<K: Ord, V, const N: usize> From<[(K, V); N]> for AvlTreeMap<K, V> {
    /// Converts a `[(K, V); N]` into an `AvlTreeMap<K, V>`.
    fn from(arr: [(K, V); N]) -> Self {
        arr.into_iter().collect()
    }
}

impl<'a, K: 'a, V: 'a, C> Iterator for Iter<'a, K, V, C> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let handle = self.front?;
        self.remaining -= 1;
        self.front = self.tree.next(handle);
        Some(self.tree.key_value(handle))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, K: 'a, V: 'a, C> DoubleEndedIterator for Iter<'a, K, V, C> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let handle = self.back?;
        self.remaining -= 1;
        self.back = self.tree.prev(handle);
        Some(self.tree.key_value(handle))
    }
}

impl<K, V, C> ExactSizeIterator for Iter<'_, K, V, C> {
    fn len(&self) -> usize {
        self.remaining
    }
}

impl<K, V, C> FusedIterator for Iter<'_, K, V, C> {}

impl<K, V, C> Clone for Iter<'_, K, V, C> {
    fn clone(&self) -> Self {
        Iter {
            tree: self.tree,
            front: self.front,
            back: self.back,
            remaining: self.remaining,
        }
    }
}

impl<K: fmt::Debug, V: fmt::Debug, C> fmt::Debug for Iter<'_, K, V, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

impl<'a, K, V, C> Iterator for IterMut<'a, K, V, C> {
    type Item = (&'a K, &'a mut V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let handle = self.front?;
        self.remaining -= 1;

        // SAFETY: `tree` comes from a live `&'a mut` borrow in `iter_mut`, and `remaining`
        // guarantees each node is yielded exactly once across both ends.
        unsafe {
            self.front = (*self.tree).next(handle);
            Some(RawAvlTree::key_value_mut_ptr(self.tree, handle))
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V, C> DoubleEndedIterator for IterMut<'_, K, V, C> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let handle = self.back?;
        self.remaining -= 1;

        // SAFETY: See `next`.
        unsafe {
            self.back = (*self.tree).prev(handle);
            Some(RawAvlTree::key_value_mut_ptr(self.tree, handle))
        }
    }
}

impl<K, V, C> ExactSizeIterator for IterMut<'_, K, V, C> {
    fn len(&self) -> usize {
        self.remaining
    }
}

impl<K, V, C> FusedIterator for IterMut<'_, K, V, C> {}

impl<K, V, C> fmt::Debug for IterMut<'_, K, V, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IterMut").field("remaining", &self.remaining).finish()
    }
}

impl<K, V> Iterator for IntoIter<K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for IntoIter<K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back()
    }
}

impl<K, V> ExactSizeIterator for IntoIter<K, V> {
    fn len(&self) -> usize {
        self.inner.len()
    }
}

impl<K, V> FusedIterator for IntoIter<K, V> {}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for IntoIter<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.inner.as_slice()).finish()
    }
}

impl<K, V> Default for IntoIter<K, V> {
    fn default() -> Self {
        IntoIter {
            inner: Vec::new().into_iter(),
        }
    }
}

impl<'a, K, V, C> Iterator for Keys<'a, K, V, C> {
    type Item = &'a K;

    fn next(&mut self) -> Option<&'a K> {
        self.inner.next().map(|(k, _)| k)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V, C> DoubleEndedIterator for Keys<'_, K, V, C> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(k, _)| k)
    }
}

impl<K, V, C> ExactSizeIterator for Keys<'_, K, V, C> {
    fn len(&self) -> usize {
        self.inner.len()
    }
}

impl<K, V, C> FusedIterator for Keys<'_, K, V, C> {}

impl<K, V, C> Clone for Keys<'_, K, V, C> {
    fn clone(&self) -> Self {
        Keys {
            inner: self.inner.clone(),
        }
    }
}

impl<K: fmt::Debug, V, C> fmt::Debug for Keys<'_, K, V, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

impl<'a, K, V, C> Iterator for Values<'a, K, V, C> {
    type Item = &'a V;

    fn next(&mut self) -> Option<&'a V> {
        self.inner.next().map(|(_, v)| v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V, C> DoubleEndedIterator for Values<'_, K, V, C> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(_, v)| v)
    }
}

impl<K, V, C> ExactSizeIterator for Values<'_, K, V, C> {
    fn len(&self) -> usize {
        self.inner.len()
    }
}

impl<K, V, C> FusedIterator for Values<'_, K, V, C> {}

impl<K, V, C> Clone for Values<'_, K, V, C> {
    fn clone(&self) -> Self {
        Values {
            inner: self.inner.clone(),
        }
    }
}

impl<K, V: fmt::Debug, C> fmt::Debug for Values<'_, K, V, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}

impl<'a, K, V, C> Iterator for ValuesMut<'a, K, V, C> {
    type Item = &'a mut V;

    fn next(&mut self) -> Option<&'a mut V> {
        self.inner.next().map(|(_, v)| v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V, C> DoubleEndedIterator for ValuesMut<'_, K, V, C> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(_, v)| v)
    }
}

impl<K, V, C> ExactSizeIterator for ValuesMut<'_, K, V, C> {
    fn len(&self) -> usize {
        self.inner.len()
    }
}

impl<K, V, C> FusedIterator for ValuesMut<'_, K, V, C> {}

impl<K, V, C> fmt::Debug for ValuesMut<'_, K, V, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValuesMut").field("remaining", &self.inner.remaining).finish()
    }
}

impl<K, V, C> Range<'_, K, V, C> {
    fn finish_if_met(&mut self) {
        if self.front.is_some() && self.front == self.back {
            self.front = None;
            self.back = None;
        }
    }
}

impl<'a, K, V, C> Iterator for Range<'a, K, V, C> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let handle = self.front?;
        if self.front == self.back {
            self.finish_if_met();
        } else {
            self.front = self.tree.next(handle);
        }
        Some(self.tree.key_value(handle))
    }
}

impl<K, V, C> DoubleEndedIterator for Range<'_, K, V, C> {
    fn next_back(&mut self) -> Option<Self::Item> {
        let handle = self.back?;
        if self.front == self.back {
            self.finish_if_met();
        } else {
            self.back = self.tree.prev(handle);
        }
        Some(self.tree.key_value(handle))
    }
}

impl<K, V, C> FusedIterator for Range<'_, K, V, C> {}

impl<K, V, C> Clone for Range<'_, K, V, C> {
    fn clone(&self) -> Self {
        Range {
            tree: self.tree,
            front: self.front,
            back: self.back,
        }
    }
}

impl<K: fmt::Debug, V: fmt::Debug, C> fmt::Debug for Range<'_, K, V, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.clone()).finish()
    }
}
