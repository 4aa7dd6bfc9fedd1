use core::{iter::FusedIterator, marker::PhantomData, ptr::NonNull};

use crate::{Dir, Link, Links, SplayTree, TreeNode};

/// An iterator over the elements of a [`SplayTree`] in ascending key order.
///
/// Elements with equal keys are yielded in insertion order; iterating from the back yields the
/// exact reverse.
pub struct Iter<'tree, T: TreeNode<Links<T>> + ?Sized> {
    front: Link<T>,
    back: Link<T>,

    len: usize,
    phantom: PhantomData<&'tree SplayTree<T>>,
}

impl<'tree, T: TreeNode<Links<T>> + ?Sized> Iter<'tree, T> {
    pub(crate) fn new(tree: &'tree SplayTree<T>) -> Self {
        Iter {
            front: tree.first_raw(),
            back: tree.last_raw(),
            len: tree.len(),
            phantom: PhantomData,
        }
    }
}

impl<'tree, T: TreeNode<Links<T>> + ?Sized> Iterator for Iter<'tree, T> {
    type Item = &'tree T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.len == 0 {
            return None;
        }

        let cur = self.front?;
        self.front = unsafe { SplayTree::successor_raw(cur) };
        self.len -= 1;

        Some(unsafe { cur.as_ref() })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.len, Some(self.len))
    }
}

impl<'tree, T: TreeNode<Links<T>> + ?Sized> DoubleEndedIterator for Iter<'tree, T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.len == 0 {
            return None;
        }

        let cur = self.back?;
        self.back = unsafe { SplayTree::predecessor_raw(cur) };
        self.len -= 1;

        Some(unsafe { cur.as_ref() })
    }
}

impl<'tree, T: TreeNode<Links<T>> + ?Sized> ExactSizeIterator for Iter<'tree, T> {}

impl<'tree, T: TreeNode<Links<T>> + ?Sized> FusedIterator for Iter<'tree, T> {}

impl<'tree, T: TreeNode<Links<T>> + ?Sized> IntoIterator for &'tree SplayTree<T> {
    type Item = &'tree T;
    type IntoIter = Iter<'tree, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// The elements of a [`SplayTree`] between two keys, produced by
/// [`SplayTree::equal_range`] (ascending) or [`SplayTree::equal_rrange`] (descending).
pub struct Range<'tree, T: TreeNode<Links<T>> + ?Sized> {
    next: Link<T>,
    stop: Link<T>,
    dir: Dir,
    phantom: PhantomData<&'tree SplayTree<T>>,
}

impl<'tree, T: TreeNode<Links<T>> + ?Sized> Range<'tree, T> {
    pub(crate) fn new(next: Link<T>, stop: Link<T>, dir: Dir) -> Self {
        Range {
            next,
            stop,
            dir,
            phantom: PhantomData,
        }
    }

    pub(crate) fn empty(dir: Dir) -> Self {
        Self::new(None, None, dir)
    }

    /// Returns the element the range starts at, if the range is not empty.
    pub fn peek(&self) -> Option<&'tree T> {
        self.next
            .filter(|&next| Some(next) != self.stop)
            .map(|next| unsafe { next.as_ref() })
    }

    fn step(&self, cur: NonNull<T>) -> Link<T> {
        unsafe {
            match self.dir {
                Dir::Right => SplayTree::successor_raw(cur),
                Dir::Left => SplayTree::predecessor_raw(cur),
            }
        }
    }
}

impl<'tree, T: TreeNode<Links<T>> + ?Sized> Iterator for Range<'tree, T> {
    type Item = &'tree T;

    fn next(&mut self) -> Option<Self::Item> {
        let cur = self.next.filter(|&cur| Some(cur) != self.stop)?;
        self.next = self.step(cur);

        Some(unsafe { cur.as_ref() })
    }
}

impl<'tree, T: TreeNode<Links<T>> + ?Sized> FusedIterator for Range<'tree, T> {}
