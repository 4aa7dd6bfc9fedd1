use alloc::boxed::Box;
use core::{borrow::Borrow, fmt, marker::PhantomPinned, ptr::NonNull};

use cordyceps::Linked;

use crate::{Links, SplayTree, TreeNode};

/// An ordered map based on a [splay tree].
///
/// Every entry is a separately boxed node, so this is the allocating counterpart of
/// [`SplaySet`](crate::SplaySet).
///
/// [splay tree]: https://en.wikipedia.org/wiki/Splay_tree
pub struct SplayMap<K: Ord + fmt::Debug, V> {
    tree: SplayTree<MapNode<K, V>>,
}

struct MapNode<K, V> {
    links: Links<MapNode<K, V>>,
    key: K,
    value: V,
    _unpin: PhantomPinned,
}

unsafe impl<K, V> Linked<Links<MapNode<K, V>>> for MapNode<K, V> {
    type Handle = Box<Self>;

    fn into_ptr(r: Self::Handle) -> NonNull<Self> {
        Box::leak(r).into()
    }

    unsafe fn from_ptr(ptr: NonNull<Self>) -> Self::Handle {
        unsafe { Box::from_raw(ptr.as_ptr()) }
    }

    unsafe fn links(ptr: NonNull<Self>) -> NonNull<Links<MapNode<K, V>>> {
        let ptr = ptr.as_ptr();
        unsafe { NonNull::new_unchecked(core::ptr::addr_of_mut!((*ptr).links)) }
    }
}

impl<K: Ord + fmt::Debug, V> TreeNode<Links<MapNode<K, V>>> for MapNode<K, V> {
    type Key = K;

    fn key(&self) -> &Self::Key {
        &self.key
    }
}

impl<K: Ord + fmt::Debug, V> SplayMap<K, V> {
    /// Creates a new, empty `SplayMap`.
    pub const fn new() -> Self {
        Self {
            tree: SplayTree::new(),
        }
    }

    /// Returns `true` if the map contains no elements.
    pub const fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// Returns the number of elements in the map.
    pub const fn len(&self) -> usize {
        self.tree.len()
    }

    /// Inserts a key-value pair into the map.
    ///
    /// If the map already had a value for `key`, it is replaced and the old value is returned.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        if let Some(existing) = self.find_mut(&key) {
            return Some(core::mem::replace(existing, value));
        }

        let node = Box::new(MapNode {
            links: Links::new(),
            key,
            value,
            _unpin: PhantomPinned,
        });

        // The key was just looked up, so this insertion cannot collide.
        let inserted = self.tree.insert(node);
        debug_assert!(inserted.is_ok());
        None
    }

    /// Returns `true` if the map contains a value associated with `key`.
    #[inline]
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.tree.get(key).is_some()
    }

    /// Returns a reference to the value associated with `key`.
    ///
    /// This does not restructure the map; see [`find`](Self::find).
    #[inline]
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.tree.get(key).map(|node| &node.get_ref().value)
    }

    /// Returns a reference to the value associated with `key`, splaying it to the root.
    #[inline]
    pub fn find<Q>(&mut self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.tree.find(key).map(|node| &node.get_ref().value)
    }

    /// Returns a mutable reference to the value associated with `key`, splaying it to the root.
    #[inline]
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.find_mut(key)
    }

    fn find_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let root = self.tree.splay_to(key)?;

        // SAFETY: `self` is mutably borrowed, and pinning is not structural for `node.value`.
        unsafe {
            let node = &mut *root.as_ptr();
            (key == <K as Borrow<Q>>::borrow(&node.key)).then_some(&mut node.value)
        }
    }

    /// Returns the first key-value pair in the map.
    ///
    /// The returned key is the minimum key in the map.
    #[inline]
    pub fn first_key_value(&mut self) -> Option<(&K, &V)> {
        self.tree.first().map(|node| {
            let node = node.get_ref();
            (&node.key, &node.value)
        })
    }

    /// Removes and returns the first key-value pair in the map.
    ///
    /// The returned key is the minimum key in the map.
    #[inline]
    pub fn pop_first(&mut self) -> Option<(K, V)> {
        self.tree.pop_first().map(|node| {
            let MapNode { key, value, .. } = *node;
            (key, value)
        })
    }

    /// Returns the last key-value pair in the map.
    ///
    /// The returned key is the maximum key in the map.
    #[inline]
    pub fn last_key_value(&mut self) -> Option<(&K, &V)> {
        self.tree.last().map(|node| {
            let node = node.get_ref();
            (&node.key, &node.value)
        })
    }

    /// Removes and returns the last key-value pair in the map.
    ///
    /// The returned key is the maximum key in the map.
    #[inline]
    pub fn pop_last(&mut self) -> Option<(K, V)> {
        self.tree.pop_last().map(|node| {
            let MapNode { key, value, .. } = *node;
            (key, value)
        })
    }

    /// Removes the value associated with `key` from the map.
    #[inline]
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.tree.remove(key).map(|node| node.value)
    }

    /// Returns an iterator over the key-value pairs of the map in ascending key order.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (&K, &V)> + ExactSizeIterator + '_ {
        self.tree.iter().map(|node| (&node.key, &node.value))
    }

    /// Returns the key-value pairs with keys in `begin..=end` in ascending order.
    pub fn range<Q>(&mut self, begin: &Q, end: &Q) -> impl Iterator<Item = (&K, &V)> + '_
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.tree
            .equal_range(begin, end)
            .map(|node| (&node.key, &node.value))
    }

    /// Clears the map, removing all elements.
    #[inline]
    pub fn clear(&mut self) {
        self.tree.clear();
    }

    #[doc(hidden)]
    pub fn assert_invariants(&self) {
        self.tree.assert_invariants();
    }
}

impl<K: Ord + fmt::Debug, V> Default for SplayMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Ord + fmt::Debug, V> Extend<(K, V)> for SplayMap<K, V> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl<K: Ord + fmt::Debug, V> FromIterator<(K, V)> for SplayMap<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = SplayMap::new();
        map.extend(iter);
        map
    }
}

impl<K: Ord + fmt::Debug, V: fmt::Debug> fmt::Debug for SplayMap<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use std::{prelude::v1::*, vec};

    use super::*;

    #[test]
    fn insert_replaces_values() {
        let mut map = SplayMap::new();

        assert_eq!(map.insert(3, "three"), None);
        assert_eq!(map.insert(1, "one"), None);
        assert_eq!(map.insert(3, "THREE"), Some("three"));

        assert_eq!(map.len(), 2);
        assert_eq!(map.get(&3), Some(&"THREE"));
        assert!(map.contains_key(&1));
        assert!(!map.contains_key(&2));
        map.assert_invariants();
    }

    #[test]
    fn get_mut_and_remove() {
        let mut map: SplayMap<u32, u32> = (0..10).map(|k| (k, k * 10)).collect();

        *map.get_mut(&4).unwrap() += 1;
        assert_eq!(map.find(&4), Some(&41));
        assert_eq!(map.remove(&4), Some(41));
        assert_eq!(map.remove(&4), None);
        assert_eq!(map.len(), 9);
        map.assert_invariants();
    }

    #[test]
    fn ordered_views() {
        let mut map: SplayMap<u32, char> = [(5, 'e'), (1, 'a'), (3, 'c'), (4, 'd'), (2, 'b')]
            .into_iter()
            .collect();

        assert_eq!(map.first_key_value(), Some((&1, &'a')));
        assert_eq!(map.last_key_value(), Some((&5, &'e')));

        let middle: Vec<char> = map.range(&2, &4).map(|(_, v)| *v).collect();
        assert_eq!(middle, vec!['b', 'c', 'd']);

        let backwards: Vec<u32> = map.iter().rev().map(|(k, _)| *k).collect();
        assert_eq!(backwards, vec![5, 4, 3, 2, 1]);

        assert_eq!(map.pop_first(), Some((1, 'a')));
        assert_eq!(map.pop_last(), Some((5, 'e')));
        map.assert_invariants();
    }
}
