use core::{borrow::Borrow, fmt, pin::Pin, ptr::NonNull};

use crate::{Cursor, CursorMut, InsertError, Iter, Links, Range, SplayTree, TreeNode, Violation};

/// An intrusive ordered set with unique keys.
///
/// Inserting an element whose key is already present is refused and the element is handed back.
pub struct SplaySet<T>
where
    T: TreeNode<Links<T>> + ?Sized,
{
    tree: SplayTree<T>,
}

impl<T> SplaySet<T>
where
    T: TreeNode<Links<T>> + ?Sized,
{
    /// Creates a new, empty `SplaySet`.
    pub const fn new() -> Self {
        SplaySet {
            tree: SplayTree::new(),
        }
    }

    /// Returns `true` if the set contains no elements.
    pub const fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// Returns the number of elements in the set.
    pub const fn len(&self) -> usize {
        self.tree.len()
    }

    /// Inserts `item` unless an element with an equal key is present.
    #[inline]
    pub fn insert(&mut self, item: T::Handle) -> Result<NonNull<T>, InsertError<T::Handle>> {
        self.tree.insert(item)
    }

    /// Returns the element with a key equal to `key`, splaying it to the root.
    #[inline]
    pub fn find<Q>(&mut self, key: &Q) -> Option<Pin<&T>>
    where
        T::Key: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.tree.find(key)
    }

    /// Returns `true` if the set contains an element with a key equal to `key`.
    #[inline]
    pub fn contains<Q>(&mut self, key: &Q) -> bool
    where
        T::Key: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.tree.contains(key)
    }

    /// Returns the element with a key equal to `key` without restructuring the set.
    #[inline]
    pub fn get<Q>(&self, key: &Q) -> Option<Pin<&T>>
    where
        T::Key: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.tree.get(key)
    }

    /// Removes the element with a key equal to `key`.
    #[inline]
    pub fn remove<Q>(&mut self, key: &Q) -> Option<T::Handle>
    where
        T::Key: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.tree.remove(key)
    }

    /// Removes an arbitrary element from the set.
    ///
    /// # Safety
    ///
    /// `node` must be an element of `self`.
    #[inline]
    pub unsafe fn remove_node(&mut self, node: NonNull<T>) -> T::Handle {
        unsafe { self.tree.remove_node(node) }
    }

    /// Returns the minimum element.
    #[inline]
    pub fn first(&mut self) -> Option<Pin<&T>> {
        self.tree.first()
    }

    /// Returns the maximum element.
    #[inline]
    pub fn last(&mut self) -> Option<Pin<&T>> {
        self.tree.last()
    }

    /// Removes and returns the minimum element.
    #[inline]
    pub fn pop_first(&mut self) -> Option<T::Handle> {
        self.tree.pop_first()
    }

    /// Removes and returns the maximum element.
    #[inline]
    pub fn pop_last(&mut self) -> Option<T::Handle> {
        self.tree.pop_last()
    }

    /// Returns an iterator over the set in ascending key order.
    #[inline]
    pub fn iter(&self) -> Iter<'_, T> {
        self.tree.iter()
    }

    #[inline]
    pub fn cursor_first(&self) -> Cursor<'_, T> {
        self.tree.cursor_first()
    }

    #[inline]
    pub fn cursor_last(&self) -> Cursor<'_, T> {
        self.tree.cursor_last()
    }

    #[inline]
    pub fn cursor_first_mut(&mut self) -> CursorMut<'_, T> {
        self.tree.cursor_first_mut()
    }

    #[inline]
    pub fn cursor_last_mut(&mut self) -> CursorMut<'_, T> {
        self.tree.cursor_last_mut()
    }

    /// Returns the elements with keys in `begin..=end` in ascending order.
    #[inline]
    pub fn equal_range<Q>(&mut self, begin: &Q, end: &Q) -> Range<'_, T>
    where
        T::Key: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.tree.equal_range(begin, end)
    }

    /// Returns the elements with keys in `rend..=rbegin` in descending order.
    #[inline]
    pub fn equal_rrange<Q>(&mut self, rbegin: &Q, rend: &Q) -> Range<'_, T>
    where
        T::Key: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.tree.equal_rrange(rbegin, rend)
    }

    #[inline]
    pub fn validate(&self) -> bool {
        self.tree.validate()
    }

    #[inline]
    pub fn check(&self) -> Result<(), Violation> {
        self.tree.check()
    }

    /// Clears the set, removing all elements.
    #[inline]
    pub fn clear(&mut self) {
        self.tree.clear();
    }

    /// Clears the set, passing every removed element to `f`.
    #[inline]
    pub fn clear_with(&mut self, f: impl FnMut(T::Handle)) {
        self.tree.clear_with(f);
    }
}

impl<T> Default for SplaySet<T>
where
    T: TreeNode<Links<T>> + ?Sized,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for SplaySet<T>
where
    T: TreeNode<Links<T>> + fmt::Debug + ?Sized,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use std::{prelude::v1::*, vec};

    use super::*;
    use crate::{model::TestNode, ErrorKind};

    #[test]
    fn rejects_equal_keys() {
        let mut set: SplaySet<TestNode> = SplaySet::new();

        set.insert(TestNode::new(4)).unwrap();
        let err = set.insert(TestNode::with_id(4, 7)).unwrap_err();

        assert_eq!(err.kind(), ErrorKind::DuplicateKey);
        assert_eq!(err.into_inner().id, 7);
        assert_eq!(set.len(), 1);
        assert!(set.validate());
    }

    #[test]
    fn first_and_last_track_extremes() {
        let mut set: SplaySet<TestNode> = SplaySet::new();
        for key in [8, 3, 11, 1, 6] {
            set.insert(TestNode::new(key)).unwrap();
        }

        assert_eq!(set.first().map(|n| n.key), Some(1));
        assert_eq!(set.last().map(|n| n.key), Some(11));
        assert_eq!(set.pop_first().map(|n| n.key), Some(1));
        assert_eq!(set.pop_last().map(|n| n.key), Some(11));

        let keys: Vec<u32> = set.iter().map(|n| n.key).collect();
        assert_eq!(keys, vec![3, 6, 8]);
        assert!(set.validate());
    }

    #[test]
    fn cursor_removal_keeps_position() {
        let mut set: SplaySet<TestNode> = SplaySet::new();
        for key in 0..6 {
            set.insert(TestNode::new(key)).unwrap();
        }

        let mut curs = set.cursor_first_mut();
        curs.move_next();
        curs.move_next();
        assert_eq!(curs.remove_current().map(|n| n.key), Some(2));
        assert_eq!(curs.get().map(|n| n.key), Some(3));
        assert_eq!(curs.remove_current_and_move_prev().map(|n| n.key), Some(3));
        assert_eq!(curs.get().map(|n| n.key), Some(1));

        let keys: Vec<u32> = set.iter().map(|n| n.key).collect();
        assert_eq!(keys, vec![0, 1, 4, 5]);
        assert!(set.validate());
    }
}
