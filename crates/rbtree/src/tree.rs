//! Red-black tree over an arena of nodes.
//!
//! The tree never owns its ordering: every operation that needs one takes it
//! as an argument. Associative containers keep their elements in a separate
//! list and store list positions here, so their comparator has to borrow that
//! list, which a closure stored inside the tree could not do.
//!
//! Ordering arguments come in two shapes:
//!
//! - `less(a, b)`, a strict weak ordering over stored values;
//! - `f(value) -> Ordering`, the ordering of a stored value relative to the
//!   search target, the same convention as [`slice::binary_search_by`].
//!
//! Both are preconditions, not validated input. An inconsistent ordering
//! produces an unspecified traversal order.

use std::cmp::Ordering;
use std::iter::FusedIterator;

use log::trace;

use crate::arena::Arena;
use crate::error::Violation;
use crate::node::{Color, Node, NodeId};

/// Where a descent continues after meeting a value equivalent to the target.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Bias {
    /// Stop at the first match.
    Stop,
    /// Keep going left, ending at the leftmost match.
    Left,
    /// Keep going right, ending at the rightmost match.
    Right,
}

#[derive(Clone, Debug)]
pub struct RbTree<T> {
    nodes: Arena<Node<T>>,
    root: NodeId,
}

fn ordering_by<T, F>(less: &F, value: &T, target: &T) -> Ordering
where
    F: Fn(&T, &T) -> bool,
{
    if less(value, target) {
        Ordering::Less
    } else if less(target, value) {
        Ordering::Greater
    } else {
        Ordering::Equal
    }
}

impl<T> RbTree<T> {
    pub fn new() -> Self {
        Self {
            nodes: Arena::new(),
            root: NodeId::NIL,
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_nil()
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.root = NodeId::NIL;
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root.some()
    }

    #[inline(always)]
    fn node(&self, id: NodeId) -> &Node<T> {
        &self.nodes[id.idx()]
    }

    #[inline(always)]
    fn node_mut(&mut self, id: NodeId) -> &mut Node<T> {
        &mut self.nodes[id.idx()]
    }

    /// # Panics
    ///
    /// Panics if `id` is not a live node of this tree.
    pub fn value(&self, id: NodeId) -> &T {
        &self.node(id).value
    }

    /// Mutable access to a stored value.
    ///
    /// The caller must not change how the value orders against the others.
    pub fn value_mut(&mut self, id: NodeId) -> &mut T {
        &mut self.node_mut(id).value
    }

    pub fn color(&self, id: NodeId) -> Color {
        self.node(id).color
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent.some()
    }

    pub fn left(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).left.some()
    }

    pub fn right(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).right.some()
    }

    pub fn grandparent(&self, id: NodeId) -> Option<NodeId> {
        self.grand_of(id).some()
    }

    pub fn sibling(&self, id: NodeId) -> Option<NodeId> {
        self.sibling_of(id).some()
    }

    pub fn uncle(&self, id: NodeId) -> Option<NodeId> {
        self.uncle_of(id).some()
    }

    // NIL-tolerant link accessors used by the rebalancing code.

    #[inline(always)]
    fn parent_of(&self, id: NodeId) -> NodeId {
        if id.is_nil() { id } else { self.node(id).parent }
    }

    #[inline(always)]
    fn left_of(&self, id: NodeId) -> NodeId {
        if id.is_nil() { id } else { self.node(id).left }
    }

    #[inline(always)]
    fn right_of(&self, id: NodeId) -> NodeId {
        if id.is_nil() { id } else { self.node(id).right }
    }

    fn grand_of(&self, id: NodeId) -> NodeId {
        self.parent_of(self.parent_of(id))
    }

    fn sibling_of(&self, id: NodeId) -> NodeId {
        let parent = self.parent_of(id);
        if parent.is_nil() {
            NodeId::NIL
        } else if id == self.left_of(parent) {
            self.right_of(parent)
        } else {
            self.left_of(parent)
        }
    }

    fn uncle_of(&self, id: NodeId) -> NodeId {
        self.sibling_of(self.parent_of(id))
    }

    /// Absent children are black.
    #[inline(always)]
    fn color_of(&self, id: NodeId) -> Color {
        if id.is_nil() {
            Color::Black
        } else {
            self.node(id).color
        }
    }

    #[inline(always)]
    fn set_color(&mut self, id: NodeId, color: Color) {
        if !id.is_nil() {
            self.node_mut(id).color = color;
        }
    }

    fn fetch_maximum(&self, mut id: NodeId) -> NodeId {
        while !self.right_of(id).is_nil() {
            id = self.right_of(id);
        }
        id
    }

    fn fetch_minimum(&self, mut id: NodeId) -> NodeId {
        while !self.left_of(id).is_nil() {
            id = self.left_of(id);
        }
        id
    }

    pub fn first(&self) -> Option<NodeId> {
        if self.root.is_nil() {
            return None;
        }
        Some(self.fetch_minimum(self.root))
    }

    pub fn last(&self) -> Option<NodeId> {
        if self.root.is_nil() {
            return None;
        }
        Some(self.fetch_maximum(self.root))
    }

    /// In-order successor.
    pub fn successor(&self, id: NodeId) -> Option<NodeId> {
        let right = self.right_of(id);
        if !right.is_nil() {
            return Some(self.fetch_minimum(right));
        }
        let mut child = id;
        let mut parent = self.parent_of(id);
        while !parent.is_nil() && child == self.right_of(parent) {
            child = parent;
            parent = self.parent_of(parent);
        }
        parent.some()
    }

    /// In-order predecessor.
    pub fn predecessor(&self, id: NodeId) -> Option<NodeId> {
        let left = self.left_of(id);
        if !left.is_nil() {
            return Some(self.fetch_maximum(left));
        }
        let mut child = id;
        let mut parent = self.parent_of(id);
        while !parent.is_nil() && child == self.left_of(parent) {
            child = parent;
            parent = self.parent_of(parent);
        }
        parent.some()
    }

    /// Values in order.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            tree: self,
            front: self.first().unwrap_or(NodeId::NIL),
            back: self.last().unwrap_or(NodeId::NIL),
            remaining: self.len(),
        }
    }

    /// Number of nodes on the longest root-to-leaf path.
    pub fn height(&self) -> usize {
        let mut best = 0;
        let mut stack = Vec::new();
        if !self.root.is_nil() {
            stack.push((self.root, 1));
        }
        while let Some((id, depth)) = stack.pop() {
            best = best.max(depth);
            let node = self.node(id);
            for child in [node.left, node.right] {
                if !child.is_nil() {
                    stack.push((child, depth + 1));
                }
            }
        }
        best
    }

    /// Binary-search descent.
    ///
    /// Returns the last matching node if any match was met, otherwise the
    /// node at which the descent fell off the tree. `None` only when empty.
    pub fn descend_by<F>(&self, mut f: F, bias: Bias) -> Option<NodeId>
    where
        F: FnMut(&T) -> Ordering,
    {
        if self.root.is_nil() {
            return None;
        }
        let mut current = self.root;
        let mut matched = NodeId::NIL;
        loop {
            let node = self.node(current);
            let next = match f(&node.value) {
                Ordering::Greater => node.left,
                Ordering::Less => node.right,
                Ordering::Equal => {
                    matched = current;
                    match bias {
                        Bias::Stop => return Some(current),
                        Bias::Left => node.left,
                        Bias::Right => node.right,
                    }
                }
            };
            if next.is_nil() {
                break;
            }
            current = next;
        }
        Some(if matched.is_nil() { current } else { matched })
    }

    /// The node where a descent for `f` stops: an exact match, or the
    /// attachment point of the target when there is none.
    pub fn nearest_by<F>(&self, f: F) -> Option<NodeId>
    where
        F: FnMut(&T) -> Ordering,
    {
        self.descend_by(f, Bias::Stop)
    }

    pub fn nearest<F>(&self, value: &T, less: F) -> Option<NodeId>
    where
        F: Fn(&T, &T) -> bool,
    {
        self.nearest_by(|probe| ordering_by(&less, probe, value))
    }

    /// Exact match through a key projection folded into `f`.
    pub fn get_by_key<F>(&self, mut f: F) -> Option<NodeId>
    where
        F: FnMut(&T) -> Ordering,
    {
        let id = self.nearest_by(&mut f)?;
        (f(self.value(id)) == Ordering::Equal).then_some(id)
    }

    pub fn find<F>(&self, value: &T, less: F) -> Option<NodeId>
    where
        F: Fn(&T, &T) -> bool,
    {
        self.get_by_key(|probe| ordering_by(&less, probe, value))
    }

    /// Inserts `value` as a red leaf and rebalances.
    ///
    /// Duplicates are not rejected: an equivalent value is attached after the
    /// existing ones. Uniqueness is the caller's policy.
    pub fn insert<F>(&mut self, value: T, less: F) -> NodeId
    where
        F: Fn(&T, &T) -> bool,
    {
        let mut parent = NodeId::NIL;
        let mut go_left = false;
        let mut current = self.root;
        while !current.is_nil() {
            parent = current;
            let node = self.node(current);
            go_left = less(&value, &node.value);
            current = if go_left { node.left } else { node.right };
        }

        let id = NodeId::new(self.nodes.insert(Node::new(value, Color::Red)));
        if parent.is_nil() {
            self.root = id;
        } else {
            self.node_mut(id).parent = parent;
            if go_left {
                self.node_mut(parent).left = id;
            } else {
                self.node_mut(parent).right = id;
            }
        }

        self.insert_case1(id);
        id
    }

    fn insert_case1(&mut self, n: NodeId) {
        if self.parent_of(n).is_nil() {
            self.set_color(n, Color::Black);
        } else {
            self.insert_case2(n);
        }
    }

    fn insert_case2(&mut self, n: NodeId) {
        if self.color_of(self.parent_of(n)) == Color::Black {
            return;
        }
        self.insert_case3(n);
    }

    fn insert_case3(&mut self, n: NodeId) {
        let uncle = self.uncle_of(n);
        if self.color_of(uncle) == Color::Red {
            let grand = self.grand_of(n);
            self.set_color(self.parent_of(n), Color::Black);
            self.set_color(uncle, Color::Black);
            self.set_color(grand, Color::Red);
            trace!("insert: recolor at {grand:?}, continuing upwards");
            self.insert_case1(grand);
        } else {
            self.insert_case4(n);
        }
    }

    fn insert_case4(&mut self, mut n: NodeId) {
        let parent = self.parent_of(n);
        let grand = self.parent_of(parent);
        if n == self.right_of(parent) && parent == self.left_of(grand) {
            self.rotate_left(parent);
            n = self.left_of(n);
        } else if n == self.left_of(parent) && parent == self.right_of(grand) {
            self.rotate_right(parent);
            n = self.right_of(n);
        }
        self.insert_case5(n);
    }

    fn insert_case5(&mut self, n: NodeId) {
        let parent = self.parent_of(n);
        let grand = self.parent_of(parent);
        self.set_color(parent, Color::Black);
        self.set_color(grand, Color::Red);
        if n == self.left_of(parent) && parent == self.left_of(grand) {
            self.rotate_right(grand);
        } else {
            self.rotate_left(grand);
        }
    }

    /// Removes the node matching `value` and returns its value, or `None`
    /// without touching the tree when nothing matches.
    pub fn erase<F>(&mut self, value: &T, less: F) -> Option<T>
    where
        F: Fn(&T, &T) -> bool,
    {
        let id = self.find(value, less)?;
        Some(self.erase_node(id))
    }

    /// Removes `id` and returns the value it held.
    ///
    /// When `id` has two children it takes over its in-order predecessor's
    /// value and the predecessor's node is unlinked instead, so other handles
    /// into the tree may now name a different value.
    pub fn erase_node(&mut self, id: NodeId) -> T {
        let mut node = id;
        let left = self.left_of(node);
        if !left.is_nil() && !self.right_of(node).is_nil() {
            let pred = self.fetch_maximum(left);
            let (a, b) = self.nodes.pair_mut(node.idx(), pred.idx());
            std::mem::swap(&mut a.value, &mut b.value);
            node = pred;
        }

        let child = if self.right_of(node).is_nil() {
            self.left_of(node)
        } else {
            self.right_of(node)
        };
        if self.color_of(node) == Color::Black {
            if self.color_of(child) == Color::Red {
                self.set_color(child, Color::Black);
            } else {
                // `node` has no children here and stands in for the NIL that
                // will take its place while the deficit is repaired.
                self.erase_case1(node);
            }
        }
        self.replace_node(node, child);

        if self.color_of(self.root) == Color::Red {
            self.set_color(self.root, Color::Black);
        }

        match self.nodes.remove(node.idx()) {
            Some(removed) => removed.value,
            None => unreachable!("erased node {node:?} was not in the arena"),
        }
    }

    fn erase_case1(&mut self, n: NodeId) {
        if self.parent_of(n).is_nil() {
            return;
        }
        self.erase_case2(n);
    }

    fn erase_case2(&mut self, n: NodeId) {
        let sibling = self.sibling_of(n);
        if self.color_of(sibling) == Color::Red {
            let parent = self.parent_of(n);
            self.set_color(parent, Color::Red);
            self.set_color(sibling, Color::Black);
            if n == self.left_of(parent) {
                self.rotate_left(parent);
            } else {
                self.rotate_right(parent);
            }
        }
        self.erase_case3(n);
    }

    fn erase_case3(&mut self, n: NodeId) {
        let parent = self.parent_of(n);
        let sibling = self.sibling_of(n);
        if self.color_of(parent) == Color::Black
            && self.color_of(sibling) == Color::Black
            && self.color_of(self.left_of(sibling)) == Color::Black
            && self.color_of(self.right_of(sibling)) == Color::Black
        {
            self.set_color(sibling, Color::Red);
            trace!("erase: black deficit moves up to {parent:?}");
            self.erase_case1(parent);
        } else {
            self.erase_case4(n);
        }
    }

    fn erase_case4(&mut self, n: NodeId) {
        let parent = self.parent_of(n);
        let sibling = self.sibling_of(n);
        if self.color_of(parent) == Color::Red
            && !sibling.is_nil()
            && self.color_of(sibling) == Color::Black
            && self.color_of(self.left_of(sibling)) == Color::Black
            && self.color_of(self.right_of(sibling)) == Color::Black
        {
            self.set_color(sibling, Color::Red);
            self.set_color(parent, Color::Black);
        } else {
            self.erase_case5(n);
        }
    }

    fn erase_case5(&mut self, n: NodeId) {
        let parent = self.parent_of(n);
        let sibling = self.sibling_of(n);
        if !sibling.is_nil() && self.color_of(sibling) == Color::Black {
            let near_left = self.left_of(sibling);
            let far_right = self.right_of(sibling);
            if n == self.left_of(parent)
                && self.color_of(near_left) == Color::Red
                && self.color_of(far_right) == Color::Black
            {
                self.set_color(sibling, Color::Red);
                self.set_color(near_left, Color::Black);
                self.rotate_right(sibling);
            } else if n == self.right_of(parent)
                && self.color_of(near_left) == Color::Black
                && self.color_of(far_right) == Color::Red
            {
                self.set_color(sibling, Color::Red);
                self.set_color(far_right, Color::Black);
                self.rotate_left(sibling);
            }
        }
        self.erase_case6(n);
    }

    fn erase_case6(&mut self, n: NodeId) {
        let parent = self.parent_of(n);
        let sibling = self.sibling_of(n);
        self.set_color(sibling, self.color_of(parent));
        self.set_color(parent, Color::Black);
        if n == self.left_of(parent) {
            self.set_color(self.right_of(sibling), Color::Black);
            self.rotate_left(parent);
        } else {
            self.set_color(self.left_of(sibling), Color::Black);
            self.rotate_right(parent);
        }
    }

    fn rotate_left(&mut self, node: NodeId) {
        let right = self.right_of(node);
        debug_assert!(!right.is_nil(), "rotate_left needs a right child");
        trace!("rotate left at {node:?}");
        self.replace_node(node, right);

        let inner = self.left_of(right);
        self.node_mut(node).right = inner;
        if !inner.is_nil() {
            self.node_mut(inner).parent = node;
        }

        self.node_mut(right).left = node;
        self.node_mut(node).parent = right;
    }

    fn rotate_right(&mut self, node: NodeId) {
        let left = self.left_of(node);
        debug_assert!(!left.is_nil(), "rotate_right needs a left child");
        trace!("rotate right at {node:?}");
        self.replace_node(node, left);

        let inner = self.right_of(left);
        self.node_mut(node).left = inner;
        if !inner.is_nil() {
            self.node_mut(inner).parent = node;
        }

        self.node_mut(left).right = node;
        self.node_mut(node).parent = left;
    }

    /// Puts `new` where `old` hangs from its parent (or the root).
    fn replace_node(&mut self, old: NodeId, new: NodeId) {
        let parent = self.parent_of(old);
        if parent.is_nil() {
            self.root = new;
        } else if old == self.left_of(parent) {
            self.node_mut(parent).left = new;
        } else {
            self.node_mut(parent).right = new;
        }
        if !new.is_nil() {
            self.node_mut(new).parent = parent;
        }
    }

    /// Recomputes every red-black property, the parent links and the
    /// in-order sort, returning the black height of the root.
    pub fn validate<F>(&self, less: F) -> Result<usize, Violation>
    where
        F: Fn(&T, &T) -> bool,
    {
        if self.root.is_nil() {
            return match self.len() {
                0 => Ok(0),
                len => Err(Violation::Length { reachable: 0, len }),
            };
        }
        if self.node(self.root).color == Color::Red {
            return Err(Violation::RedRoot);
        }
        if !self.node(self.root).parent.is_nil() {
            return Err(Violation::BrokenLink(self.root));
        }

        // Post-order walk computing black heights bottom-up.
        let mut reachable = 0;
        let mut heights: Vec<usize> = Vec::new();
        let mut stack = vec![(self.root, false)];
        while let Some((id, children_done)) = stack.pop() {
            let node = self.node(id);
            if !children_done {
                reachable += 1;
                stack.push((id, true));
                for child in [node.right, node.left] {
                    if child.is_nil() {
                        continue;
                    }
                    let child_node = self.node(child);
                    if child_node.parent != id {
                        return Err(Violation::BrokenLink(child));
                    }
                    if node.color == Color::Red && child_node.color == Color::Red {
                        return Err(Violation::RedRed(id));
                    }
                    stack.push((child, false));
                }
                continue;
            }

            let right = if node.right.is_nil() { 0 } else { heights.pop().unwrap_or(0) };
            let left = if node.left.is_nil() { 0 } else { heights.pop().unwrap_or(0) };
            if left != right {
                return Err(Violation::BlackHeight { node: id, left, right });
            }
            let own = if node.color == Color::Black { 1 } else { 0 };
            heights.push(left + own);
        }

        if reachable != self.len() {
            return Err(Violation::Length {
                reachable,
                len: self.len(),
            });
        }

        let mut previous = self.fetch_minimum(self.root);
        while let Some(next) = self.successor(previous) {
            if less(self.value(next), self.value(previous)) {
                return Err(Violation::Unordered(next));
            }
            previous = next;
        }

        Ok(heights.pop().unwrap_or(0))
    }
}

impl<T> Default for RbTree<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// In-order iterator over the values of an [`RbTree`].
pub struct Iter<'a, T> {
    tree: &'a RbTree<T>,
    front: NodeId,
    back: NodeId,
    remaining: usize,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let id = self.front;
        self.remaining -= 1;
        self.front = self.tree.successor(id).unwrap_or(NodeId::NIL);
        Some(self.tree.value(id))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> DoubleEndedIterator for Iter<'_, T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let id = self.back;
        self.remaining -= 1;
        self.back = self.tree.predecessor(id).unwrap_or(NodeId::NIL);
        Some(self.tree.value(id))
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

impl<T> FusedIterator for Iter<'_, T> {}

impl<'a, T> IntoIterator for &'a RbTree<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
