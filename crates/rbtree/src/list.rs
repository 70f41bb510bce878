//! Element storage for the associative containers.
//!
//! A doubly linked list over the arena. The list is circular through a
//! virtual end sentinel: `next(end)` is the first element and `prev(end)` the
//! last, the way a `std::list` iterator behaves.

use std::iter::FusedIterator;
use std::ops::{Index, IndexMut};

use crate::arena::{Arena, NIL};

/// Handle to one element slot.
///
/// Positions compare by slot identity, never by the value they hold. A
/// position stays valid until its own element is removed; inserting or
/// removing other elements does not affect it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Position {
    index: u32,
    generation: u32,
}

impl Position {
    pub(crate) const END: Self = Self {
        index: NIL,
        generation: 0,
    };

    pub fn is_end(self) -> bool {
        self.index == NIL
    }
}

#[derive(Clone, Debug)]
struct Link<E> {
    value: E,
    seq: u64,
    prev: u32,
    next: u32,
}

#[derive(Clone, Debug)]
pub struct ElementList<E> {
    slots: Arena<Link<E>>,
    head: u32,
    tail: u32,
    next_seq: u64,
}

impl<E> ElementList<E> {
    pub fn new() -> Self {
        Self {
            slots: Arena::new(),
            head: NIL,
            tail: NIL,
            next_seq: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.head == NIL
    }

    pub fn clear(&mut self) {
        self.slots.clear();
        self.head = NIL;
        self.tail = NIL;
    }

    fn position(&self, index: u32) -> Position {
        if index == NIL {
            return Position::END;
        }
        Position {
            index,
            generation: self.slots.generation(index),
        }
    }

    pub fn begin(&self) -> Position {
        self.position(self.head)
    }

    pub fn end(&self) -> Position {
        Position::END
    }

    /// `true` if `pos` names an element currently in this list.
    pub fn is_valid(&self, pos: Position) -> bool {
        !pos.is_end() && self.slots.contains(pos.index, pos.generation)
    }

    fn link(&self, pos: Position) -> Option<&Link<E>> {
        if self.is_valid(pos) {
            self.slots.get(pos.index)
        } else {
            None
        }
    }

    pub fn get(&self, pos: Position) -> Option<&E> {
        self.link(pos).map(|link| &link.value)
    }

    pub fn get_mut(&mut self, pos: Position) -> Option<&mut E> {
        if !self.is_valid(pos) {
            return None;
        }
        self.slots.get_mut(pos.index).map(|link| &mut link.value)
    }

    /// Insertion sequence number, increasing over the life of the list.
    pub fn seq(&self, pos: Position) -> Option<u64> {
        self.link(pos).map(|link| link.seq)
    }

    /// The following position; `end` follows the last element and the first
    /// element follows `end`. A stale position is followed by `end`.
    pub fn next(&self, pos: Position) -> Position {
        if pos.is_end() {
            return self.begin();
        }
        match self.link(pos) {
            Some(link) => self.position(link.next),
            None => Position::END,
        }
    }

    /// The preceding position; `end` precedes the first element and the last
    /// element precedes `end`. A stale position is preceded by `end`.
    pub fn prev(&self, pos: Position) -> Position {
        if pos.is_end() {
            return self.position(self.tail);
        }
        match self.link(pos) {
            Some(link) => self.position(link.prev),
            None => Position::END,
        }
    }

    pub fn front(&self) -> Option<&E> {
        self.get(self.begin())
    }

    pub fn back(&self) -> Option<&E> {
        self.get(self.position(self.tail))
    }

    /// Inserts `value` before `pos` (`end` appends) and returns its position.
    ///
    /// A stale `pos` appends as well.
    pub fn insert_before(&mut self, pos: Position, value: E) -> Position {
        let next = if self.is_valid(pos) { pos.index } else { NIL };
        let prev = if next == NIL {
            self.tail
        } else {
            self.slots[next].prev
        };
        let seq = self.next_seq;
        self.next_seq += 1;
        let index = self.slots.insert(Link {
            value,
            seq,
            prev,
            next,
        });

        if prev == NIL {
            self.head = index;
        } else {
            self.slots[prev].next = index;
        }
        if next == NIL {
            self.tail = index;
        } else {
            self.slots[next].prev = index;
        }
        self.position(index)
    }

    pub fn push_back(&mut self, value: E) -> Position {
        self.insert_before(Position::END, value)
    }

    /// Unlinks `pos`, returning its value and the position that followed it.
    pub fn remove(&mut self, pos: Position) -> Option<(E, Position)> {
        if !self.is_valid(pos) {
            return None;
        }
        let link = self.slots.remove(pos.index)?;
        if link.prev == NIL {
            self.head = link.next;
        } else {
            self.slots[link.prev].next = link.next;
        }
        if link.next == NIL {
            self.tail = link.prev;
        } else {
            self.slots[link.next].prev = link.prev;
        }
        let next = self.position(link.next);
        Some((link.value, next))
    }

    pub fn pop_front(&mut self) -> Option<E> {
        self.remove(self.begin()).map(|(value, _)| value)
    }

    pub fn iter(&self) -> Iter<'_, E> {
        Iter {
            list: self,
            front: self.head,
            back: self.tail,
            remaining: self.len(),
        }
    }
}

impl<E> Default for ElementList<E> {
    fn default() -> Self {
        Self::new()
    }
}

/// # Panics
///
/// Panics if `pos` is `end` or stale.
impl<E> Index<Position> for ElementList<E> {
    type Output = E;

    fn index(&self, pos: Position) -> &E {
        match self.get(pos) {
            Some(value) => value,
            None => panic!("position {pos:?} is not in the list"),
        }
    }
}

impl<E> IndexMut<Position> for ElementList<E> {
    fn index_mut(&mut self, pos: Position) -> &mut E {
        match self.get_mut(pos) {
            Some(value) => value,
            None => panic!("position {pos:?} is not in the list"),
        }
    }
}

pub struct Iter<'a, E> {
    list: &'a ElementList<E>,
    front: u32,
    back: u32,
    remaining: usize,
}

impl<'a, E> Iterator for Iter<'a, E> {
    type Item = &'a E;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let link = &self.list.slots[self.front];
        self.remaining -= 1;
        self.front = link.next;
        Some(&link.value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<E> DoubleEndedIterator for Iter<'_, E> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let link = &self.list.slots[self.back];
        self.remaining -= 1;
        self.back = link.prev;
        Some(&link.value)
    }
}

impl<E> ExactSizeIterator for Iter<'_, E> {}

impl<E> FusedIterator for Iter<'_, E> {}

/// Owning iterator, front to back.
pub struct IntoIter<E> {
    list: ElementList<E>,
}

impl<E> Iterator for IntoIter<E> {
    type Item = E;

    fn next(&mut self) -> Option<E> {
        self.list.pop_front()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.list.len(), Some(self.list.len()))
    }
}

impl<E> DoubleEndedIterator for IntoIter<E> {
    fn next_back(&mut self) -> Option<E> {
        let last = self.list.prev(Position::END);
        self.list.remove(last).map(|(value, _)| value)
    }
}

impl<E> ExactSizeIterator for IntoIter<E> {}

impl<E> IntoIterator for ElementList<E> {
    type Item = E;
    type IntoIter = IntoIter<E>;

    fn into_iter(self) -> IntoIter<E> {
        IntoIter { list: self }
    }
}

impl<'a, E> IntoIterator for &'a ElementList<E> {
    type Item = &'a E;
    type IntoIter = Iter<'a, E>;

    fn into_iter(self) -> Iter<'a, E> {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::{ElementList, Position};

    fn contents(list: &ElementList<i32>) -> Vec<i32> {
        list.iter().copied().collect()
    }

    #[test]
    fn insert_and_walk_both_ways() {
        let mut list = ElementList::new();
        let b = list.push_back(2);
        let d = list.push_back(4);
        let a = list.insert_before(b, 1);
        let c = list.insert_before(d, 3);
        assert_eq!(contents(&list), vec![1, 2, 3, 4]);
        assert_eq!(list.begin(), a);
        assert_eq!(list.next(a), b);
        assert_eq!(list.next(c), d);
        assert!(list.next(d).is_end());
        assert_eq!(list.prev(list.end()), d);
        assert_eq!(list.next(list.end()), a);
        assert!(list.prev(a).is_end());
        assert_eq!(list.iter().rev().copied().collect::<Vec<_>>(), vec![4, 3, 2, 1]);
        assert_eq!((list.front(), list.back()), (Some(&1), Some(&4)));
    }

    #[test]
    fn seq_grows_with_insertion_not_placement() {
        let mut list = ElementList::new();
        let first = list.push_back(10);
        let second = list.insert_before(first, 5);
        assert!(list.seq(second) > list.seq(first));
    }

    #[test]
    fn removal_keeps_other_positions() {
        let mut list = ElementList::new();
        let positions = (0..5).map(|i| list.push_back(i)).collect::<Vec<_>>();
        assert_eq!(list.remove(positions[2]), Some((2, positions[3])));
        assert_eq!(list.remove(positions[2]), None);
        assert!(!list.is_valid(positions[2]));
        assert_eq!(list.get(positions[2]), None);
        for &i in &[0_usize, 1, 3, 4] {
            assert_eq!(list[positions[i]], i as i32);
        }
        assert_eq!(list.next(positions[1]), positions[3]);

        // The freed slot is reused, but the old position stays dead.
        let reused = list.push_back(99);
        assert_ne!(reused, positions[2]);
        assert_eq!(list.get(positions[2]), None);
        assert_eq!(contents(&list), vec![0, 1, 3, 4, 99]);
    }

    #[test]
    fn stale_and_end_positions() {
        let mut list = ElementList::new();
        let only = list.push_back(1);
        list[only] = 7;
        assert_eq!(list.pop_front(), Some(7));
        assert!(list.is_empty());
        assert!(list.next(only).is_end());
        assert!(list.prev(only).is_end());
        assert!(list.begin().is_end());
        assert_eq!(list.remove(Position::END), None);
        assert_eq!(list.get_mut(only), None);

        // Inserting before a stale position appends.
        list.push_back(1);
        list.insert_before(only, 2);
        assert_eq!(contents(&list), vec![1, 2]);
    }

    #[test]
    fn owning_iteration_and_clear() {
        let mut list = ElementList::new();
        let kept = list.push_back(1);
        list.push_back(2);
        list.push_back(3);
        let clone = list.clone();
        assert_eq!(clone.get(kept), Some(&1));
        let mut drained = clone.into_iter();
        assert_eq!(drained.next_back(), Some(3));
        assert_eq!(drained.collect::<Vec<_>>(), vec![1, 2]);

        list.clear();
        assert!(list.is_empty());
        assert!(!list.is_valid(kept));
        assert_eq!(list.len(), 0);
    }
}
