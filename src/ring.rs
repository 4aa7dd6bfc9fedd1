//! Duplicate rings.
//!
//! A ring is a circular doubly linked list of the elements sharing an occupant's key. The
//! occupant points at the ring head, which is the oldest duplicate, and the head points back at
//! the occupant. New duplicates join at the tail (`head.prev`), so the ring is a FIFO queue.

use core::ptr::NonNull;

use crate::{links, links_mut, Links, RingLinks, Role, SplayTree, TreeLinks, TreeNode};

impl<T> SplayTree<T>
where
    T: TreeNode<Links<T>> + ?Sized,
{
    // Appends the free element `node` to the tail of the duplicate ring of `occupant`.
    pub(crate) unsafe fn push_duplicate(&mut self, occupant: NonNull<T>, node: NonNull<T>) {
        unsafe {
            let Some(head) = links(occupant).dups() else {
                links_mut(node).set_role(Role::Duplicate(RingLinks {
                    next: node,
                    prev: node,
                    occupant: Some(occupant),
                }));
                links_mut(occupant).set_dups(Some(node));
                return;
            };

            let tail = links(head).ring().prev;
            links_mut(node).set_role(Role::Duplicate(RingLinks {
                next: head,
                prev: tail,
                occupant: None,
            }));
            links_mut(tail).ring_mut().next = node;
            links_mut(head).ring_mut().prev = node;
        }
    }

    // Detaches and returns the oldest duplicate of `occupant`. The returned element keeps its
    // stale duplicate role; the caller decides what it becomes.
    pub(crate) unsafe fn pop_front_dup(&mut self, occupant: NonNull<T>) -> Option<NonNull<T>> {
        let head = unsafe { links(occupant).dups()? };
        unsafe { self.unlink_duplicate(head) };
        Some(head)
    }

    // Splices the duplicate `node` out of its ring in O(1). If `node` was the ring head, the next
    // oldest member becomes the head.
    pub(crate) unsafe fn unlink_duplicate(&mut self, node: NonNull<T>) {
        unsafe {
            let RingLinks {
                next,
                prev,
                occupant,
            } = *links(node).ring();

            if next == node {
                // Sole member, necessarily the head.
                let occupant = occupant.expect("a lone duplicate must be the ring head");
                links_mut(occupant).set_dups(None);
                return;
            }

            links_mut(prev).ring_mut().next = next;
            links_mut(next).ring_mut().prev = prev;

            if let Some(occupant) = occupant {
                links_mut(next).ring_mut().occupant = Some(occupant);
                links_mut(occupant).set_dups(Some(next));
            }
        }
    }

    // If `occupant` has duplicates, moves its oldest duplicate into its tree position and
    // returns `true`. `occupant` is left detached with stale links.
    pub(crate) unsafe fn promote_duplicate(&mut self, occupant: NonNull<T>) -> bool {
        unsafe {
            let Some(heir) = self.pop_front_dup(occupant) else {
                return false;
            };

            let TreeLinks {
                parent,
                children,
                dups,
            } = *links(occupant).tree();

            links_mut(heir).set_role(Role::Occupant(TreeLinks {
                parent,
                children,
                dups,
            }));

            self.replace_child_or_set_root(parent, occupant, Some(heir));
            for child in children {
                self.maybe_set_parent(child, Some(heir));
            }

            if let Some(head) = dups {
                links_mut(head).ring_mut().occupant = Some(heir);
            }

            true
        }
    }
}
