//! Cursor contracts shared by every container family.
//!
//! A cursor names a position in a sequence, including the one-past-the-end
//! position, and compares by position identity. Three capability levels
//! exist: [`Cursor`] (forward), [`BidirectionalCursor`] and
//! [`RandomAccessCursor`]. [`CursorMut`] marks cursors that can write the
//! value they point at.
//!
//! Slices provide the array-backed family ([`SliceCursor`],
//! [`SliceCursorMut`]); the tree containers provide the tree-backed one
//! ([`TreeCursor`](crate::TreeCursor)).

use std::ptr;

/// Forward traversal.
pub trait Cursor {
    type Value;

    /// The value at this position, `None` at the end.
    fn get(&self) -> Option<&Self::Value>;

    fn move_next(&mut self);

    fn next(&self) -> Self
    where
        Self: Clone,
    {
        let mut cursor = self.clone();
        cursor.move_next();
        cursor
    }

    /// Number of `move_next` steps from `self` to `last`.
    ///
    /// `last` must be reachable from `self`.
    fn distance_to(&self, last: &Self) -> usize
    where
        Self: Clone + PartialEq,
    {
        let mut cursor = self.clone();
        let mut steps = 0;
        while cursor != *last {
            cursor.move_next();
            steps += 1;
        }
        steps
    }
}

/// Traversal in both directions.
pub trait BidirectionalCursor: Cursor {
    fn move_prev(&mut self);

    fn prev(&self) -> Self
    where
        Self: Clone,
    {
        let mut cursor = self.clone();
        cursor.move_prev();
        cursor
    }

    /// Moves `n` steps, backwards when `n` is negative.
    fn advance_by(&mut self, n: isize) {
        if n >= 0 {
            for _ in 0..n {
                self.move_next();
            }
        } else {
            for _ in 0..n.unsigned_abs() {
                self.move_prev();
            }
        }
    }
}

/// Constant-time jumps and index arithmetic.
///
/// Implementors override [`BidirectionalCursor::advance_by`] and
/// [`Cursor::distance_to`] with constant-time versions.
pub trait RandomAccessCursor: BidirectionalCursor {
    /// Offset from the start of the sequence.
    fn index(&self) -> usize;

    /// Length of the whole sequence this cursor walks.
    fn sequence_len(&self) -> usize;

    /// Signed distance from `self` to `other`.
    fn offset_to(&self, other: &Self) -> isize;
}

/// Write access to the value under the cursor.
pub trait CursorMut: Cursor {
    fn get_mut(&mut self) -> Option<&mut Self::Value>;

    /// Replaces the value under the cursor, returning the old one. `None`
    /// (and `value` is dropped) at the end.
    fn set(&mut self, value: Self::Value) -> Option<Self::Value> {
        self.get_mut().map(|slot| std::mem::replace(slot, value))
    }
}

/// Walks a bidirectional sequence backwards.
///
/// The reverse cursor built from `base` points at `base.prev()`, so the
/// reverse of `end` is the last element and the reverse of `begin` is the
/// reverse end.
#[derive(Clone, Debug)]
pub struct ReverseCursor<C> {
    base: C,
    current: C,
}

impl<C> ReverseCursor<C>
where
    C: BidirectionalCursor + Clone,
{
    pub fn new(base: C) -> Self {
        let current = base.prev();
        Self { base, current }
    }

    pub fn base(&self) -> &C {
        &self.base
    }

    pub fn into_base(self) -> C {
        self.base
    }
}

impl<C: PartialEq> PartialEq for ReverseCursor<C> {
    fn eq(&self, other: &Self) -> bool {
        self.base == other.base
    }
}

impl<C: Eq> Eq for ReverseCursor<C> {}

impl<C> Cursor for ReverseCursor<C>
where
    C: BidirectionalCursor + Clone,
{
    type Value = C::Value;

    fn get(&self) -> Option<&C::Value> {
        self.current.get()
    }

    fn move_next(&mut self) {
        self.base.move_prev();
        self.current.move_prev();
    }
}

impl<C> BidirectionalCursor for ReverseCursor<C>
where
    C: BidirectionalCursor + Clone,
{
    fn move_prev(&mut self) {
        self.base.move_next();
        self.current.move_next();
    }

    fn advance_by(&mut self, n: isize) {
        self.base.advance_by(-n);
        self.current.advance_by(-n);
    }
}

impl<C> RandomAccessCursor for ReverseCursor<C>
where
    C: RandomAccessCursor + Clone,
{
    fn index(&self) -> usize {
        self.base.sequence_len().wrapping_sub(self.base.index())
    }

    fn sequence_len(&self) -> usize {
        self.base.sequence_len()
    }

    fn offset_to(&self, other: &Self) -> isize {
        other.base.offset_to(&self.base)
    }
}

/// Read-only cursor over a slice.
///
/// Indices wrap, so stepping back from the first element yields a
/// before-begin position that reads as `None`, which is what a reverse end
/// points at.
#[derive(Debug)]
pub struct SliceCursor<'a, T> {
    slice: &'a [T],
    index: usize,
}

impl<T> Clone for SliceCursor<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for SliceCursor<'_, T> {}

impl<'a, T> SliceCursor<'a, T> {
    pub fn new(slice: &'a [T], index: usize) -> Self {
        Self { slice, index }
    }

    pub fn begin(slice: &'a [T]) -> Self {
        Self::new(slice, 0)
    }

    pub fn end(slice: &'a [T]) -> Self {
        Self::new(slice, slice.len())
    }
}

impl<T> PartialEq for SliceCursor<'_, T> {
    fn eq(&self, other: &Self) -> bool {
        ptr::eq(self.slice, other.slice) && self.index == other.index
    }
}

impl<T> Eq for SliceCursor<'_, T> {}

impl<T> Cursor for SliceCursor<'_, T> {
    type Value = T;

    fn get(&self) -> Option<&T> {
        self.slice.get(self.index)
    }

    fn move_next(&mut self) {
        self.index = self.index.wrapping_add(1);
    }

    fn distance_to(&self, last: &Self) -> usize {
        last.index.wrapping_sub(self.index)
    }
}

impl<T> BidirectionalCursor for SliceCursor<'_, T> {
    fn move_prev(&mut self) {
        self.index = self.index.wrapping_sub(1);
    }

    fn advance_by(&mut self, n: isize) {
        self.index = self.index.wrapping_add_signed(n);
    }
}

impl<T> RandomAccessCursor for SliceCursor<'_, T> {
    fn index(&self) -> usize {
        self.index
    }

    fn sequence_len(&self) -> usize {
        self.slice.len()
    }

    fn offset_to(&self, other: &Self) -> isize {
        other.index.wrapping_sub(self.index) as isize
    }
}

/// Writable cursor over a slice. Not `Clone`: it holds the only borrow.
#[derive(Debug)]
pub struct SliceCursorMut<'a, T> {
    slice: &'a mut [T],
    index: usize,
}

impl<'a, T> SliceCursorMut<'a, T> {
    pub fn new(slice: &'a mut [T], index: usize) -> Self {
        Self { slice, index }
    }

    pub fn begin(slice: &'a mut [T]) -> Self {
        Self::new(slice, 0)
    }
}

impl<T> PartialEq for SliceCursorMut<'_, T> {
    fn eq(&self, other: &Self) -> bool {
        ptr::eq(&*self.slice, &*other.slice) && self.index == other.index
    }
}

impl<T> Cursor for SliceCursorMut<'_, T> {
    type Value = T;

    fn get(&self) -> Option<&T> {
        self.slice.get(self.index)
    }

    fn move_next(&mut self) {
        self.index = self.index.wrapping_add(1);
    }
}

impl<T> BidirectionalCursor for SliceCursorMut<'_, T> {
    fn move_prev(&mut self) {
        self.index = self.index.wrapping_sub(1);
    }

    fn advance_by(&mut self, n: isize) {
        self.index = self.index.wrapping_add_signed(n);
    }
}

impl<T> RandomAccessCursor for SliceCursorMut<'_, T> {
    fn index(&self) -> usize {
        self.index
    }

    fn sequence_len(&self) -> usize {
        self.slice.len()
    }

    fn offset_to(&self, other: &Self) -> isize {
        other.index.wrapping_sub(self.index) as isize
    }
}

impl<T> CursorMut for SliceCursorMut<'_, T> {
    fn get_mut(&mut self) -> Option<&mut T> {
        self.slice.get_mut(self.index)
    }
}

/// Number of steps from `first` to `last`; constant time for random-access
/// cursors.
pub fn distance<C>(first: &C, last: &C) -> usize
where
    C: Cursor + Clone + PartialEq,
{
    first.distance_to(last)
}

pub fn advance<C: BidirectionalCursor>(cursor: &mut C, n: isize) {
    cursor.advance_by(n);
}

/// First cursor in `[first, last)` whose value satisfies `pred`, or `last`.
pub fn find_if<C, F>(mut first: C, last: &C, mut pred: F) -> C
where
    C: Cursor + PartialEq,
    F: FnMut(&C::Value) -> bool,
{
    while first != *last {
        match first.get() {
            Some(value) if pred(value) => break,
            Some(_) => first.move_next(),
            None => break,
        }
    }
    first
}

/// Writes `value` into `n` consecutive positions starting at `first` and
/// returns the cursor after the last one written.
pub fn fill_n<C>(mut first: C, n: usize, value: &C::Value) -> C
where
    C: CursorMut,
    C::Value: Clone,
{
    for _ in 0..n {
        if let Some(slot) = first.get_mut() {
            slot.clone_from(value);
        }
        first.move_next();
    }
    first
}
