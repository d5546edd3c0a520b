//! Set algebra over the key space of two maps.
//!
//! Every combinator starts from a copy of the left-hand map and then walks the right-hand map
//! in order, so on a key present in both, the left-hand value is the one kept. Only the public
//! map contract is used here.

use crate::avl_tree_map::{AvlTreeMap, Entry};
use crate::compare::Compare;

impl<K: Clone, V: Clone, C: Compare<K> + Clone> AvlTreeMap<K, V, C> {
    /// Returns every entry of `self` plus the entries of `other` whose key `self` lacks.
    ///
    /// # Examples
    ///
    /// ```
    /// use avl_tree_map::AvlTreeMap;
    ///
    /// let a = AvlTreeMap::from([(1, "x"), (2, "y")]);
    /// let b = AvlTreeMap::from([(2, "z"), (3, "w")]);
    /// assert_eq!(a.union(&b), AvlTreeMap::from([(1, "x"), (2, "y"), (3, "w")]));
    /// ```
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        let mut result = self.clone();
        for (key, value) in other {
            if let Entry::Vacant(entry) = result.entry(key.clone()) {
                entry.insert(value.clone());
            }
        }
        result
    }

    /// Returns the entries of `self` whose key also appears in `other`.
    ///
    /// # Examples
    ///
    /// ```
    /// use avl_tree_map::AvlTreeMap;
    ///
    /// let a = AvlTreeMap::from([(1, "x"), (2, "y")]);
    /// let b = AvlTreeMap::from([(2, "z"), (3, "w")]);
    /// assert_eq!(a.intersection(&b), AvlTreeMap::from([(2, "y")]));
    /// ```
    #[must_use]
    pub fn intersection(&self, other: &Self) -> Self {
        let mut result = self.clone();
        result.retain(|key, _| other.contains_key(key));
        result
    }

    /// Returns the entries whose key appears in exactly one of the two maps.
    ///
    /// Despite the name this is the symmetric difference, not `self` minus `other`: keys found
    /// only in `other` are added with their values.
    ///
    /// # Examples
    ///
    /// ```
    /// use avl_tree_map::AvlTreeMap;
    ///
    /// let a = AvlTreeMap::from([(1, "x"), (2, "y")]);
    /// let b = AvlTreeMap::from([(2, "z"), (3, "w")]);
    /// assert_eq!(a.complement(&b), AvlTreeMap::from([(1, "x"), (3, "w")]));
    /// ```
    #[must_use]
    pub fn complement(&self, other: &Self) -> Self {
        let mut result = self.clone();
        for (key, value) in other {
            match result.entry(key.clone()) {
                Entry::Occupied(entry) => {
                    entry.remove_entry();
                }
                Entry::Vacant(entry) => {
                    entry.insert(value.clone());
                }
            }
        }
        result
    }
}
