use core::fmt;

use thiserror::Error;

/// The reason an element was refused by a container.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Error)]
pub enum ErrorKind {
    /// A unique-key container already holds an element with an equal key.
    #[error("an element with an equal key is already present")]
    DuplicateKey,

    /// The element's links are already in use by some container.
    #[error("the element is already linked into a container")]
    AlreadyLinked,
}

/// An insertion that was refused, carrying the rejected element back to the caller.
#[derive(Error)]
#[error("{kind}")]
pub struct InsertError<H> {
    kind: ErrorKind,
    item: H,
}

impl<H> InsertError<H> {
    pub(crate) fn new(kind: ErrorKind, item: H) -> Self {
        InsertError { kind, item }
    }

    /// Returns why the element was refused.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the refused element.
    pub fn into_inner(self) -> H {
        self.item
    }
}

impl<H> fmt::Debug for InsertError<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InsertError")
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

/// A structural invariant found broken by a `check` walk.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Error)]
pub enum Violation {
    #[error("a node's key is out of order with respect to one of its ancestors")]
    KeyOrder,

    #[error("a child's parent link does not point back at its parent")]
    ParentLink,

    #[error("a node reachable from the root has the wrong link role")]
    Role,

    #[error("a duplicate ring is not a well-formed circular list")]
    DuplicateRing,

    #[error("a sibling ring is not a well-formed circular list")]
    SiblingRing,

    #[error("a child has a higher priority than its parent")]
    HeapOrder,

    #[error("the root has a parent or siblings")]
    Root,

    #[error("tracked length {tracked} does not match the {counted} reachable elements")]
    Length { tracked: usize, counted: usize },
}
