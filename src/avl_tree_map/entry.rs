use core::fmt;
use core::mem;

use crate::compare::{Compare, Natural};
use crate::raw::{Handle, RawAvlTree};

/// The result of [`AvlTreeMap::entry`](crate::AvlTreeMap::entry): the slot for one key, which
/// either holds an entry already or can receive one without a second descent.
///
/// # Examples
///
/// ```
/// use avl_tree_map::AvlTreeMap;
/// use avl_tree_map::avl_tree_map::Entry;
///
/// let mut stock = AvlTreeMap::from([("pears", 3)]);
/// for fruit in ["pears", "plums"] {
///     match stock.entry(fruit) {
///         Entry::Occupied(mut o) => *o.get_mut() -= 1,
///         Entry::Vacant(v) => {
///             v.insert(10);
///         }
///     }
/// }
/// assert_eq!(stock[&"pears"], 2);
/// assert_eq!(stock[&"plums"], 10);
/// ```
pub enum Entry<'a, K: 'a, V: 'a, C = Natural> {
    /// No entry for the key yet.
    Vacant(VacantEntry<'a, K, V, C>),

    /// The key is present.
    Occupied(OccupiedEntry<'a, K, V, C>),
}

impl<K: fmt::Debug, V: fmt::Debug, C> fmt::Debug for Entry<'_, K, V, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Entry::Vacant(v) => f.debug_tuple("Entry").field(v).finish(),
            Entry::Occupied(o) => f.debug_tuple("Entry").field(o).finish(),
        }
    }
}

/// A key with no entry yet. Holds the key until [`insert`](VacantEntry::insert) links it in.
pub struct VacantEntry<'a, K, V, C = Natural> {
    pub(crate) key: K,
    pub(crate) tree: &'a mut RawAvlTree<K, V, C>,
}

impl<K: fmt::Debug, V, C> fmt::Debug for VacantEntry<'_, K, V, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VacantEntry").field("key", &self.key).finish()
    }
}

/// A present entry, addressed by its node handle. The handle survives other removals, so the
/// entry can be read, overwritten or removed directly.
pub struct OccupiedEntry<'a, K, V, C = Natural> {
    pub(crate) handle: Handle,
    pub(crate) tree: &'a mut RawAvlTree<K, V, C>,
}

impl<K: fmt::Debug, V: fmt::Debug, C> fmt::Debug for OccupiedEntry<'_, K, V, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OccupiedEntry").field("key", self.key()).field("value", self.get()).finish()
    }
}

impl<'a, K, V, C: Compare<K>> Entry<'a, K, V, C> {
    /// Returns the value, inserting `default` first if the key is absent.
    pub fn or_insert(self, default: V) -> &'a mut V {
        match self {
            Entry::Occupied(o) => o.into_mut(),
            Entry::Vacant(v) => v.insert(default),
        }
    }

    /// Like [`or_insert`](Self::or_insert), but only builds the value when it is needed.
    pub fn or_insert_with<F: FnOnce() -> V>(self, default: F) -> &'a mut V {
        match self {
            Entry::Occupied(o) => o.into_mut(),
            Entry::Vacant(v) => v.insert(default()),
        }
    }

    /// Like [`or_insert_with`](Self::or_insert_with), with the pending key passed to `default`.
    ///
    /// ```
    /// use avl_tree_map::AvlTreeMap;
    ///
    /// let mut lengths: AvlTreeMap<&str, usize> = AvlTreeMap::new();
    /// lengths.entry("avl").or_insert_with_key(|key| key.len());
    /// assert_eq!(lengths[&"avl"], 3);
    /// ```
    pub fn or_insert_with_key<F: FnOnce(&K) -> V>(self, default: F) -> &'a mut V {
        match self {
            Entry::Occupied(o) => o.into_mut(),
            Entry::Vacant(v) => {
                let value = default(&v.key);
                v.insert(value)
            }
        }
    }

    #[allow(clippy::must_use_candidate)]
    pub fn key(&self) -> &K {
        match self {
            Entry::Occupied(o) => o.key(),
            Entry::Vacant(v) => v.key(),
        }
    }

    /// Applies `f` to the value if the key is present, then hands the entry back for chaining.
    ///
    /// ```
    /// use avl_tree_map::AvlTreeMap;
    ///
    /// let mut hits: AvlTreeMap<u8, u32> = AvlTreeMap::new();
    /// for code in [7, 7, 3] {
    ///     hits.entry(code).and_modify(|n| *n += 1).or_insert(1);
    /// }
    /// assert_eq!(hits[&7], 2);
    /// assert_eq!(hits[&3], 1);
    /// ```
    #[allow(clippy::return_self_not_must_use)]
    pub fn and_modify<F>(mut self, f: F) -> Self
    where
        F: FnOnce(&mut V),
    {
        if let Entry::Occupied(ref mut o) = self {
            f(o.get_mut());
        }
        self
    }
}

impl<'a, K, V: Default, C: Compare<K>> Entry<'a, K, V, C> {
    /// Returns the value, inserting `V::default()` first if the key is absent.
    #[allow(clippy::must_use_candidate)]
    pub fn or_default(self) -> &'a mut V {
        match self {
            Entry::Occupied(o) => o.into_mut(),
            Entry::Vacant(v) => v.insert(V::default()),
        }
    }
}

impl<'a, K, V, C> VacantEntry<'a, K, V, C> {
    #[allow(clippy::must_use_candidate)]
    pub fn key(&self) -> &K {
        &self.key
    }

    /// Gives the key back without inserting anything.
    #[allow(clippy::must_use_candidate)]
    pub fn into_key(self) -> K {
        self.key
    }
}

impl<'a, K, V, C: Compare<K>> VacantEntry<'a, K, V, C> {
    /// Links the key in with `value`, rebalancing on the way up, and returns the stored value.
    pub fn insert(self, value: V) -> &'a mut V {
        let (handle, _) = self.tree.insert(self.key, value);
        self.tree.value_mut(handle)
    }
}

impl<'a, K, V, C> OccupiedEntry<'a, K, V, C> {
    #[must_use]
    pub fn key(&self) -> &K {
        self.tree.key(self.handle)
    }

    #[must_use]
    pub fn get(&self) -> &V {
        self.tree.value(self.handle)
    }

    pub fn get_mut(&mut self) -> &mut V {
        self.tree.value_mut(self.handle)
    }

    /// Converts the entry into a reference to its value that lives as long as the map borrow.
    #[must_use = "`self` will be dropped if the result is not used"]
    pub fn into_mut(self) -> &'a mut V {
        self.tree.value_mut(self.handle)
    }

    /// Overwrites the value in place and returns the old one. The tree shape does not change.
    pub fn insert(&mut self, value: V) -> V {
        mem::replace(self.get_mut(), value)
    }

    /// Unlinks the entry and returns its value.
    pub fn remove(self) -> V {
        self.remove_entry().1
    }

    /// Unlinks the entry, rebalancing on the way up, and returns its key and value.
    ///
    /// ```
    /// use avl_tree_map::AvlTreeMap;
    /// use avl_tree_map::avl_tree_map::Entry;
    ///
    /// let mut map = AvlTreeMap::from([(1, 'a'), (2, 'b')]);
    /// if let Entry::Occupied(o) = map.entry(1) {
    ///     assert_eq!(o.remove_entry(), (1, 'a'));
    /// }
    /// assert_eq!(map.len(), 1);
    /// ```
    pub fn remove_entry(self) -> (K, V) {
        self.tree.remove_node(self.handle)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use crate::AvlTreeMap;
    use crate::avl_tree_map::Entry;

    #[test]
    fn vacant_insert_rebalances() {
        let mut map = AvlTreeMap::new();
        for key in 0..64 {
            *map.entry(key).or_insert(0) += key;
        }
        map.raw.validate_invariants();
        assert_eq!(map.len(), 64);
        assert_eq!(map[&63], 63);
    }

    #[test]
    fn occupied_remove_rebalances() {
        let mut map: AvlTreeMap<i32, i32> = (0..32).map(|k| (k, k)).collect();
        for key in (0..32).step_by(2) {
            match map.entry(key) {
                Entry::Occupied(o) => assert_eq!(o.remove(), key),
                Entry::Vacant(_) => panic!("{key} should be present"),
            }
            map.raw.validate_invariants();
        }
        assert_eq!(map.len(), 16);
        assert!(map.keys().all(|k| k % 2 == 1));
    }

    #[test]
    fn occupied_insert_overwrites_in_place() {
        let mut map = AvlTreeMap::from([(1, 'a'), (2, 'b'), (3, 'c')]);
        let height = map.height();
        if let Entry::Occupied(mut o) = map.entry(2) {
            assert_eq!(o.insert('z'), 'b');
            assert_eq!(o.get(), &'z');
        }
        assert_eq!(map.height(), height);
        assert_eq!(map[&2], 'z');
    }

    #[test]
    fn entry_key_reports_both_variants() {
        let mut map = AvlTreeMap::from([(1, 'a')]);
        assert_eq!(map.entry(1).key(), &1);
        assert_eq!(map.entry(2).key(), &2);
        if let Entry::Vacant(v) = map.entry(3) {
            assert_eq!(v.into_key(), 3);
        }
        assert_eq!(map.len(), 1);
    }
}
