use crate::arena::NIL;

/// Handle to a node of an [`RbTree`](crate::RbTree).
#[repr(transparent)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(u32);

impl NodeId {
    pub(crate) const NIL: Self = Self(NIL);

    #[inline(always)]
    pub(crate) fn new(index: u32) -> Self {
        debug_assert!(index != NIL);
        Self(index)
    }

    #[inline(always)]
    pub(crate) fn is_nil(self) -> bool {
        self.0 == NIL
    }

    #[inline(always)]
    pub(crate) fn idx(self) -> u32 {
        self.0
    }

    #[inline(always)]
    pub(crate) fn some(self) -> Option<Self> {
        if self.is_nil() { None } else { Some(self) }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Color {
    Red,
    Black,
}

/// One element position of the tree.
///
/// `parent` is a non-owning back link; ownership flows root to leaves through
/// `left` and `right`, and the arena is the only owner of the storage.
#[derive(Clone, Debug)]
pub(crate) struct Node<T> {
    pub(crate) value: T,
    pub(crate) color: Color,
    pub(crate) parent: NodeId,
    pub(crate) left: NodeId,
    pub(crate) right: NodeId,
}

impl<T> Node<T> {
    pub(crate) fn new(value: T, color: Color) -> Self {
        Self {
            value,
            color,
            parent: NodeId::NIL,
            left: NodeId::NIL,
            right: NodeId::NIL,
        }
    }
}
