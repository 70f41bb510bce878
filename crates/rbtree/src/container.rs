//! Ordered associative containers.
//!
//! Elements live in an [`ElementList`] kept in key order; a [`KeyedTree`]
//! indexes the list positions. Every mutation splices the list first and
//! then indexes or unindexes exactly the positions it touched.

use std::fmt;
use std::iter::FusedIterator;
use std::ptr;

use log::trace;

use crate::cursor::{BidirectionalCursor, Cursor, ReverseCursor};
use crate::error::{Error, Result, Violation};
use crate::keyed::KeyedTree;
use crate::list::{self, ElementList, Position};
use crate::policy::{Compare, KeyOf, MapKey, Multi, Natural, SetKey, Unique, Uniqueness};
use crate::tree::RbTree;

pub struct TreeContainer<E, P, U, C = Natural> {
    list: ElementList<E>,
    index: KeyedTree<E, P, U>,
    comp: C,
}

/// Ordered set of unique keys.
pub type TreeSet<K, C = Natural> = TreeContainer<K, SetKey, Unique, C>;
/// Ordered set keeping equivalent keys in insertion order.
pub type TreeMultiSet<K, C = Natural> = TreeContainer<K, SetKey, Multi, C>;
/// Ordered map with unique keys.
pub type TreeMap<K, V, C = Natural> = TreeContainer<(K, V), MapKey, Unique, C>;
/// Ordered map keeping equivalent keys in insertion order.
pub type TreeMultiMap<K, V, C = Natural> = TreeContainer<(K, V), MapKey, Multi, C>;

impl<E, P, U> TreeContainer<E, P, U, Natural> {
    pub fn new() -> Self {
        Self::with_comparator(Natural)
    }
}

impl<E, P, U, C: Default> Default for TreeContainer<E, P, U, C> {
    fn default() -> Self {
        Self::with_comparator(C::default())
    }
}

impl<E, P, U, C> TreeContainer<E, P, U, C> {
    pub fn with_comparator(comp: C) -> Self {
        Self {
            list: ElementList::new(),
            index: KeyedTree::new(),
            comp,
        }
    }

    pub fn len(&self) -> usize {
        self.list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    pub fn key_comp(&self) -> &C {
        &self.comp
    }

    pub fn clear(&mut self) {
        trace!("clearing {} elements", self.len());
        self.index.clear();
        self.list.clear();
    }

    /// Position of the smallest element, `end` when empty.
    pub fn begin(&self) -> Position {
        self.list.begin()
    }

    pub fn end(&self) -> Position {
        self.list.end()
    }

    pub fn next(&self, pos: Position) -> Position {
        self.list.next(pos)
    }

    pub fn prev(&self, pos: Position) -> Position {
        self.list.prev(pos)
    }

    pub fn get(&self, pos: Position) -> Option<&E> {
        self.list.get(pos)
    }

    /// Elements are keyed, so mutable access is for the map value only.
    pub(crate) fn get_entry_mut(&mut self, pos: Position) -> Option<&mut E> {
        self.list.get_mut(pos)
    }

    pub fn first(&self) -> Option<&E> {
        self.list.front()
    }

    pub fn last(&self) -> Option<&E> {
        self.list.back()
    }

    pub fn iter(&self) -> list::Iter<'_, E> {
        self.list.iter()
    }

    /// Positions in key order.
    pub fn positions(&self) -> Positions<'_, E> {
        Positions {
            list: &self.list,
            pos: self.list.begin(),
        }
    }

    pub fn cursor_front(&self) -> TreeCursor<'_, E, P, U, C> {
        self.cursor_at(self.begin())
    }

    pub fn cursor_end(&self) -> TreeCursor<'_, E, P, U, C> {
        self.cursor_at(self.end())
    }

    pub fn cursor_at(&self, pos: Position) -> TreeCursor<'_, E, P, U, C> {
        TreeCursor {
            container: self,
            pos,
        }
    }

    /// Reverse cursor at the largest element.
    pub fn cursor_rbegin(&self) -> ReverseCursor<TreeCursor<'_, E, P, U, C>> {
        ReverseCursor::new(self.cursor_end())
    }

    pub fn cursor_rend(&self) -> ReverseCursor<TreeCursor<'_, E, P, U, C>> {
        ReverseCursor::new(self.cursor_front())
    }

    /// Exchanges contents. Positions keep naming the same elements, now held
    /// by the other container.
    pub fn swap(&mut self, other: &mut Self) {
        std::mem::swap(self, other);
    }

    /// The balanced index over the element positions.
    pub fn tree(&self) -> &RbTree<Position> {
        self.index.tree()
    }
}

impl<E, P, U, C> TreeContainer<E, P, U, C>
where
    P: KeyOf<E>,
    U: Uniqueness,
    C: Compare<P::Key>,
{
    /// Orders whole elements by their keys.
    pub fn value_comp(&self) -> impl Fn(&E, &E) -> bool + '_ {
        move |a: &E, b: &E| self.comp.less(P::key(a), P::key(b))
    }

    /// Position of the first element equivalent to `key`, or `end`.
    pub fn find(&self, key: &P::Key) -> Position {
        match self.index.get_by_key(&self.list, &self.comp, key) {
            Some(id) => self.index.position_of(id),
            None => self.list.end(),
        }
    }

    pub fn contains(&self, key: &P::Key) -> bool {
        self.index.get_by_key(&self.list, &self.comp, key).is_some()
    }

    pub fn count(&self, key: &P::Key) -> usize {
        self.index.count(&self.list, &self.comp, key)
    }

    pub fn lower_bound(&self, key: &P::Key) -> Position {
        self.index.lower_bound(&self.list, &self.comp, key)
    }

    pub fn upper_bound(&self, key: &P::Key) -> Position {
        self.index.upper_bound(&self.list, &self.comp, key)
    }

    /// `[lower_bound, upper_bound)` of `key`.
    pub fn equal_range(&self, key: &P::Key) -> (Position, Position) {
        self.index.equal_range(&self.list, &self.comp, key)
    }

    /// Removes every element equivalent to `key` and returns how many there
    /// were.
    pub fn erase(&mut self, key: &P::Key) -> usize {
        let (mut pos, upper) = self.equal_range(key);
        let mut removed = 0;
        while pos != upper {
            let Some((_, next)) = self.index.erase_at(&mut self.list, &self.comp, pos) else {
                break;
            };
            removed += 1;
            pos = next;
        }
        removed
    }

    /// Removes the element at `pos` and returns the position after it.
    pub fn erase_at(&mut self, pos: Position) -> Result<Position> {
        self.index
            .erase_at(&mut self.list, &self.comp, pos)
            .map(|(_, next)| next)
            .ok_or(Error::InvalidPosition(pos))
    }

    /// Removes `[first, last)` and returns `last`.
    ///
    /// Both ends must be live positions or `end`, and `last` must be
    /// reachable from `first`; otherwise nothing is removed.
    pub fn erase_range(&mut self, first: Position, last: Position) -> Result<Position> {
        for pos in [first, last] {
            if !pos.is_end() && !self.list.is_valid(pos) {
                return Err(Error::InvalidPosition(pos));
            }
        }
        let mut span = 0;
        let mut pos = first;
        while pos != last {
            if pos.is_end() {
                return Err(Error::InvalidPosition(last));
            }
            span += 1;
            pos = self.list.next(pos);
        }

        trace!("erasing a range of {span} elements");
        let mut pos = first;
        while pos != last {
            pos = self.erase_at(pos)?;
        }
        Ok(last)
    }

    /// Removes and returns the first element equivalent to `key`.
    pub fn extract(&mut self, key: &P::Key) -> Result<E> {
        let pos = self.find(key);
        self.index
            .erase_at(&mut self.list, &self.comp, pos)
            .map(|(elem, _)| elem)
            .ok_or(Error::KeyNotFound)
    }

    /// Checks the tree invariants and that the tree and the list agree.
    /// Returns the black height.
    pub fn validate(&self) -> Result<usize, Violation> {
        let black_height = self.index.validate(&self.list, &self.comp)?;
        if self.index.len() != self.list.len() {
            return Err(Violation::Length {
                reachable: self.list.len(),
                len: self.index.len(),
            });
        }
        for (indexed, stored) in self.index.positions().zip(self.positions()) {
            if indexed != stored {
                return Err(Violation::Unindexed(stored));
            }
        }
        Ok(black_height)
    }

    fn insert_element(&mut self, elem: E) -> (Position, bool) {
        self.index.insert_by_key(&mut self.list, &self.comp, elem)
    }
}

impl<E, P, C> TreeContainer<E, P, Unique, C>
where
    P: KeyOf<E>,
    C: Compare<P::Key>,
{
    /// Inserts `elem` unless an equivalent key is present.
    ///
    /// Returns the position holding the key and whether `elem` was inserted.
    /// A rejected `elem` is dropped and the container is left untouched.
    pub fn insert(&mut self, elem: E) -> (Position, bool) {
        self.insert_element(elem)
    }

    /// Inserts `elem` right before `hint` when that keeps the keys strictly
    /// ordered, otherwise as [`insert`](Self::insert) does. Returns the
    /// position holding the key.
    pub fn insert_hint(&mut self, hint: Position, elem: E) -> Position {
        self.index
            .insert_by_hint(&mut self.list, &self.comp, hint, elem)
            .0
    }

    /// Moves in every element of `other` whose key is absent here. The
    /// elements left behind are the ones whose key collided.
    pub fn merge(&mut self, other: &mut Self) {
        let before = self.len();
        let mut pos = other.begin();
        while let Some(elem) = other.list.get(pos) {
            let next = other.list.next(pos);
            if !self.contains(P::key(elem)) {
                if let Some((elem, _)) = other.index.erase_at(&mut other.list, &other.comp, pos) {
                    self.insert_element(elem);
                }
            }
            pos = next;
        }
        trace!(
            "merged {} elements, {} left behind",
            self.len() - before,
            other.len()
        );
    }
}

impl<E, P, C> TreeContainer<E, P, Multi, C>
where
    P: KeyOf<E>,
    C: Compare<P::Key>,
{
    /// Inserts `elem` after every element with an equivalent key.
    pub fn insert(&mut self, elem: E) -> Position {
        self.insert_element(elem).0
    }

    /// Inserts `elem` right before `hint` when that keeps the keys strictly
    /// ordered, otherwise as [`insert`](Self::insert) does.
    pub fn insert_hint(&mut self, hint: Position, elem: E) -> Position {
        self.index
            .insert_by_hint(&mut self.list, &self.comp, hint, elem)
            .0
    }

    /// Moves every element of `other` in, leaving it empty.
    pub fn merge(&mut self, other: &mut Self) {
        let moved = other.len();
        other.index.clear();
        while let Some(elem) = other.list.pop_front() {
            self.insert_element(elem);
        }
        trace!("merged {moved} elements");
    }
}

impl<E: Clone, P, U, C: Clone> Clone for TreeContainer<E, P, U, C> {
    fn clone(&self) -> Self {
        Self {
            list: self.list.clone(),
            index: self.index.clone(),
            comp: self.comp.clone(),
        }
    }
}

impl<E: PartialEq, P, U, C> PartialEq for TreeContainer<E, P, U, C> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<E: Eq, P, U, C> Eq for TreeContainer<E, P, U, C> {}

impl<K: fmt::Debug, U, C> fmt::Debug for TreeContainer<K, SetKey, U, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<K: fmt::Debug, V: fmt::Debug, U, C> fmt::Debug for TreeContainer<(K, V), MapKey, U, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.iter().map(|(k, v)| (k, v)))
            .finish()
    }
}

impl<E, P, U, C> Extend<E> for TreeContainer<E, P, U, C>
where
    P: KeyOf<E>,
    U: Uniqueness,
    C: Compare<P::Key>,
{
    fn extend<I: IntoIterator<Item = E>>(&mut self, iter: I) {
        for elem in iter {
            self.insert_element(elem);
        }
    }
}

impl<E, P, U, C> FromIterator<E> for TreeContainer<E, P, U, C>
where
    P: KeyOf<E>,
    U: Uniqueness,
    C: Compare<P::Key> + Default,
{
    fn from_iter<I: IntoIterator<Item = E>>(iter: I) -> Self {
        let mut container = Self::default();
        container.extend(iter);
        container
    }
}

impl<E, P, U, C, const N: usize> From<[E; N]> for TreeContainer<E, P, U, C>
where
    P: KeyOf<E>,
    U: Uniqueness,
    C: Compare<P::Key> + Default,
{
    fn from(elems: [E; N]) -> Self {
        elems.into_iter().collect()
    }
}

impl<E, P, U, C> IntoIterator for TreeContainer<E, P, U, C> {
    type Item = E;
    type IntoIter = list::IntoIter<E>;

    fn into_iter(self) -> list::IntoIter<E> {
        self.list.into_iter()
    }
}

impl<'a, E, P, U, C> IntoIterator for &'a TreeContainer<E, P, U, C> {
    type Item = &'a E;
    type IntoIter = list::Iter<'a, E>;

    fn into_iter(self) -> list::Iter<'a, E> {
        self.iter()
    }
}

/// Iterator over positions in key order.
pub struct Positions<'a, E> {
    list: &'a ElementList<E>,
    pos: Position,
}

impl<E> Iterator for Positions<'_, E> {
    type Item = Position;

    fn next(&mut self) -> Option<Position> {
        if self.pos.is_end() {
            return None;
        }
        let pos = self.pos;
        self.pos = self.list.next(pos);
        Some(pos)
    }
}

impl<E> FusedIterator for Positions<'_, E> {}

/// Bidirectional cursor into a tree container.
///
/// Two cursors are equal when they name the same slot of the same
/// container, whatever the values. Stepping past the last element reaches
/// `end`; stepping from `end` wraps to the first element.
pub struct TreeCursor<'a, E, P, U, C> {
    container: &'a TreeContainer<E, P, U, C>,
    pos: Position,
}

impl<E, P, U, C> TreeCursor<'_, E, P, U, C> {
    pub fn position(&self) -> Position {
        self.pos
    }

    pub fn is_end(&self) -> bool {
        self.pos.is_end()
    }
}

impl<'a, K, V, U, C> TreeCursor<'a, (K, V), MapKey, U, C> {
    pub fn first(&self) -> Option<&'a K> {
        self.container.get(self.pos).map(|(k, _)| k)
    }

    pub fn second(&self) -> Option<&'a V> {
        self.container.get(self.pos).map(|(_, v)| v)
    }
}

impl<E, P, U, C> Clone for TreeCursor<'_, E, P, U, C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<E, P, U, C> Copy for TreeCursor<'_, E, P, U, C> {}

impl<E, P, U, C> PartialEq for TreeCursor<'_, E, P, U, C> {
    fn eq(&self, other: &Self) -> bool {
        ptr::eq(self.container, other.container) && self.pos == other.pos
    }
}

impl<E, P, U, C> Eq for TreeCursor<'_, E, P, U, C> {}

impl<E, P, U, C> fmt::Debug for TreeCursor<'_, E, P, U, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TreeCursor").field(&self.pos).finish()
    }
}

impl<E, P, U, C> Cursor for TreeCursor<'_, E, P, U, C> {
    type Value = E;

    fn get(&self) -> Option<&E> {
        self.container.get(self.pos)
    }

    fn move_next(&mut self) {
        self.pos = self.container.next(self.pos);
    }
}

impl<E, P, U, C> BidirectionalCursor for TreeCursor<'_, E, P, U, C> {
    fn move_prev(&mut self) {
        self.pos = self.container.prev(self.pos);
    }
}
