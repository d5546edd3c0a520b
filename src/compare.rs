use core::cmp::Ordering;

/// A total order over keys of type `K`.
///
/// [`AvlTreeMap`](crate::AvlTreeMap) is generic over its comparator so that the same key type can
/// be stored under different orders. The order must be total and must not change while a key is
/// in the map.
///
/// # Examples
///
/// ```
/// use core::cmp::Ordering;
/// use avl_tree_map::{AvlTreeMap, Compare};
///
/// #[derive(Clone, Copy, Default)]
/// struct ByLength;
///
/// impl Compare<&str> for ByLength {
///     fn compare(&self, a: &&str, b: &&str) -> Ordering {
///         a.len().cmp(&b.len()).then_with(|| a.cmp(b))
///     }
/// }
///
/// let mut map = AvlTreeMap::with_comparator(ByLength);
/// map.insert("ccc", 3);
/// map.insert("a", 1);
/// map.insert("bb", 2);
/// assert_eq!(map.keys().copied().collect::<Vec<_>>(), ["a", "bb", "ccc"]);
/// ```
pub trait Compare<K: ?Sized> {
    /// Compares `a` with `b`.
    fn compare(&self, a: &K, b: &K) -> Ordering;
}

/// Orders keys by their [`Ord`] implementation. This is the default comparator.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub struct Natural;

impl<K: Ord + ?Sized> Compare<K> for Natural {
    #[inline]
    fn compare(&self, a: &K, b: &K) -> Ordering {
        a.cmp(b)
    }
}

/// Orders keys by the reverse of their [`Ord`] implementation.
///
/// ```
/// use avl_tree_map::{AvlTreeMap, Reversed};
///
/// let mut map = AvlTreeMap::with_comparator(Reversed);
/// map.extend([(1, 'a'), (3, 'c'), (2, 'b')]);
/// assert_eq!(map.first_key_value(), Some((&3, &'c')));
/// ```
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub struct Reversed;

impl<K: Ord + ?Sized> Compare<K> for Reversed {
    #[inline]
    fn compare(&self, a: &K, b: &K) -> Ordering {
        b.cmp(a)
    }
}
