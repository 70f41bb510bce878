//! Tree wrappers binding [`RbTree`] to an [`ElementList`].
//!
//! One generic wrapper covers the four set/map × unique/multi combinations.
//! `P` projects the key out of a stored element and `U` decides whether
//! equivalent keys are rejected. The tree stores list positions; its
//! ordering compares the keys behind them, and for multi trees ties are
//! broken by the list's insertion sequence so every tree value is distinct.

use std::marker::PhantomData;

use crate::error::Violation;
use crate::list::{ElementList, Position};
use crate::node::NodeId;
use crate::policy::{Compare, KeyOf, MapKey, Multi, SetKey, Unique, Uniqueness};
use crate::tree::{Bias, RbTree};

pub struct KeyedTree<E, P, U> {
    tree: RbTree<Position>,
    _marker: PhantomData<fn() -> (E, P, U)>,
}

pub type UniqueSetTree<K> = KeyedTree<K, SetKey, Unique>;
pub type MultiSetTree<K> = KeyedTree<K, SetKey, Multi>;
pub type UniqueMapTree<K, V> = KeyedTree<(K, V), MapKey, Unique>;
pub type MultiMapTree<K, V> = KeyedTree<(K, V), MapKey, Multi>;

impl<E, P, U> Clone for KeyedTree<E, P, U> {
    fn clone(&self) -> Self {
        Self {
            tree: self.tree.clone(),
            _marker: PhantomData,
        }
    }
}

impl<E, P, U> Default for KeyedTree<E, P, U> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E, P, U> KeyedTree<E, P, U> {
    pub fn new() -> Self {
        Self {
            tree: RbTree::new(),
            _marker: PhantomData,
        }
    }

    pub fn len(&self) -> usize {
        self.tree.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    pub fn clear(&mut self) {
        self.tree.clear();
    }

    /// The underlying tree, for inspection.
    pub fn tree(&self) -> &RbTree<Position> {
        &self.tree
    }
}

impl<E, P, U> KeyedTree<E, P, U>
where
    P: KeyOf<E>,
    U: Uniqueness,
{
    /// Tree ordering over positions of `list`.
    fn position_less<C>(list: &ElementList<E>, comp: &C) -> impl Fn(&Position, &Position) -> bool
    where
        C: Compare<P::Key>,
    {
        move |a, b| {
            let (ka, kb) = (P::key(&list[*a]), P::key(&list[*b]));
            if comp.less(ka, kb) {
                true
            } else if U::REJECT_DUPLICATES || comp.less(kb, ka) {
                false
            } else {
                list.seq(*a) < list.seq(*b)
            }
        }
    }

    fn descend<C>(
        &self,
        list: &ElementList<E>,
        comp: &C,
        key: &P::Key,
        bias: Bias,
    ) -> Option<NodeId>
    where
        C: Compare<P::Key>,
    {
        self.tree
            .descend_by(|pos| comp.ordering(P::key(&list[*pos]), key), bias)
    }

    /// Where a search for `key` ends. Unique trees stop at the match; multi
    /// trees walk left through equivalent keys and end at the first one.
    pub fn nearest_by_key<C>(&self, list: &ElementList<E>, comp: &C, key: &P::Key) -> Option<NodeId>
    where
        C: Compare<P::Key>,
    {
        let bias = if U::REJECT_DUPLICATES { Bias::Stop } else { Bias::Left };
        self.descend(list, comp, key, bias)
    }

    /// The node of the first element equivalent to `key`.
    pub fn get_by_key<C>(&self, list: &ElementList<E>, comp: &C, key: &P::Key) -> Option<NodeId>
    where
        C: Compare<P::Key>,
    {
        let id = self.nearest_by_key(list, comp, key)?;
        let found = P::key(&list[*self.tree.value(id)]);
        comp.equivalent(found, key).then_some(id)
    }

    pub fn position_of(&self, id: NodeId) -> Position {
        *self.tree.value(id)
    }

    /// First position whose key is not less than `key`, or `end`.
    pub fn lower_bound<C>(&self, list: &ElementList<E>, comp: &C, key: &P::Key) -> Position
    where
        C: Compare<P::Key>,
    {
        let Some(id) = self.nearest_by_key(list, comp, key) else {
            return list.end();
        };
        let pos = *self.tree.value(id);
        if comp.less(P::key(&list[pos]), key) {
            list.next(pos)
        } else {
            pos
        }
    }

    /// First position whose key is greater than `key`, or `end`.
    pub fn upper_bound<C>(&self, list: &ElementList<E>, comp: &C, key: &P::Key) -> Position
    where
        C: Compare<P::Key>,
    {
        let bias = if U::REJECT_DUPLICATES { Bias::Stop } else { Bias::Right };
        let Some(id) = self.descend(list, comp, key, bias) else {
            return list.end();
        };
        let pos = *self.tree.value(id);
        if comp.less(key, P::key(&list[pos])) {
            pos
        } else {
            list.next(pos)
        }
    }

    pub fn equal_range<C>(
        &self,
        list: &ElementList<E>,
        comp: &C,
        key: &P::Key,
    ) -> (Position, Position)
    where
        C: Compare<P::Key>,
    {
        (
            self.lower_bound(list, comp, key),
            self.upper_bound(list, comp, key),
        )
    }

    /// Number of elements equivalent to `key`; walks the run of duplicates.
    pub fn count<C>(&self, list: &ElementList<E>, comp: &C, key: &P::Key) -> usize
    where
        C: Compare<P::Key>,
    {
        let Some(id) = self.get_by_key(list, comp, key) else {
            return 0;
        };
        if U::REJECT_DUPLICATES {
            return 1;
        }
        let mut count = 0;
        let mut pos = *self.tree.value(id);
        while let Some(elem) = list.get(pos) {
            if !comp.equivalent(P::key(elem), key) {
                break;
            }
            count += 1;
            pos = list.next(pos);
        }
        count
    }

    /// Indexes an element already linked into `list`.
    ///
    /// The caller keeps `list` sorted; the tree does not check it.
    pub fn index<C>(&mut self, list: &ElementList<E>, comp: &C, pos: Position)
    where
        C: Compare<P::Key>,
    {
        self.tree.insert(pos, Self::position_less(list, comp));
    }

    /// Removes the tree node that refers to `pos`. `false` if none does.
    pub fn unindex<C>(&mut self, list: &ElementList<E>, comp: &C, pos: Position) -> bool
    where
        C: Compare<P::Key>,
    {
        if !list.is_valid(pos) {
            return false;
        }
        self.tree.erase(&pos, Self::position_less(list, comp)).is_some()
    }

    /// Inserts `elem` into `list` in key order and indexes it.
    ///
    /// Unique trees refuse an equivalent key, returning the position already
    /// holding it and `false` without touching the list or the tree. Multi
    /// trees place `elem` after its existing equivalents.
    pub fn insert_by_key<C>(
        &mut self,
        list: &mut ElementList<E>,
        comp: &C,
        elem: E,
    ) -> (Position, bool)
    where
        C: Compare<P::Key>,
    {
        let key = P::key(&elem);
        let before = if U::REJECT_DUPLICATES {
            let lower = self.lower_bound(list, comp, key);
            if let Some(found) = list.get(lower) {
                if comp.equivalent(P::key(found), key) {
                    return (lower, false);
                }
            }
            lower
        } else {
            self.upper_bound(list, comp, key)
        };
        let pos = list.insert_before(before, elem);
        self.index(list, comp, pos);
        (pos, true)
    }

    /// Inserts `elem` directly before `hint` when that keeps the order
    /// strict (`prev < elem < hint`), otherwise as [`insert_by_key`] does.
    ///
    /// [`insert_by_key`]: KeyedTree::insert_by_key
    pub fn insert_by_hint<C>(
        &mut self,
        list: &mut ElementList<E>,
        comp: &C,
        hint: Position,
        elem: E,
    ) -> (Position, bool)
    where
        C: Compare<P::Key>,
    {
        if hint.is_end() || list.is_valid(hint) {
            let key = P::key(&elem);
            let prev = list.prev(hint);
            let after_prev = list
                .get(prev)
                .is_none_or(|prev| comp.less(P::key(prev), key));
            let before_hint = list
                .get(hint)
                .is_none_or(|next| comp.less(key, P::key(next)));
            if after_prev && before_hint {
                let pos = list.insert_before(hint, elem);
                self.index(list, comp, pos);
                return (pos, true);
            }
        }
        self.insert_by_key(list, comp, elem)
    }

    /// Unindexes and unlinks `pos`, returning its element and the position
    /// that followed it.
    pub fn erase_at<C>(
        &mut self,
        list: &mut ElementList<E>,
        comp: &C,
        pos: Position,
    ) -> Option<(E, Position)>
    where
        C: Compare<P::Key>,
    {
        if !self.unindex(list, comp, pos) {
            return None;
        }
        list.remove(pos)
    }

    pub fn validate<C>(&self, list: &ElementList<E>, comp: &C) -> Result<usize, Violation>
    where
        C: Compare<P::Key>,
    {
        self.tree.validate(Self::position_less(list, comp))
    }
}

impl<E, P, U> KeyedTree<E, P, U> {
    /// Positions in tree order.
    pub fn positions(&self) -> impl DoubleEndedIterator<Item = Position> + '_ {
        self.tree.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::Natural;

    fn keys<E: Copy, P, U>(tree: &KeyedTree<E, P, U>, list: &ElementList<E>) -> Vec<E> {
        tree.positions().map(|pos| list[pos]).collect()
    }

    fn multiset(values: &[i32]) -> (MultiSetTree<i32>, ElementList<i32>) {
        let mut tree = MultiSetTree::new();
        let mut list = ElementList::new();
        for &v in values {
            tree.insert_by_key(&mut list, &Natural, v);
        }
        (tree, list)
    }

    #[test]
    fn unique_set_rejects_equivalent_keys() {
        let mut tree = UniqueSetTree::new();
        let mut list = ElementList::new();
        let (first, inserted) = tree.insert_by_key(&mut list, &Natural, 5);
        assert!(inserted);
        let (again, inserted) = tree.insert_by_key(&mut list, &Natural, 5);
        assert!(!inserted);
        assert_eq!(first, again);
        assert_eq!(tree.len(), 1);
        assert_eq!(list.len(), 1);
        assert_eq!(tree.count(&list, &Natural, &5), 1);
        tree.validate(&list, &Natural).unwrap();
    }

    #[test]
    fn multi_set_keeps_duplicates_in_insertion_order() {
        let mut tree = MultiMapTree::<i32, &str>::new();
        let mut list = ElementList::new();
        for elem in [(3, "a"), (1, "x"), (3, "b"), (3, "c")] {
            assert!(tree.insert_by_key(&mut list, &Natural, elem).1);
        }
        assert_eq!(keys(&tree, &list), vec![(1, "x"), (3, "a"), (3, "b"), (3, "c")]);
        assert_eq!(list.iter().copied().collect::<Vec<_>>(), keys(&tree, &list));
        assert_eq!(tree.count(&list, &Natural, &3), 3);
        tree.validate(&list, &Natural).unwrap();
    }

    #[test]
    fn bounds_on_multiset() {
        let (tree, list) = multiset(&[7, 3, 1, 5, 3]);
        let (lower, upper) = tree.equal_range(&list, &Natural, &3);
        assert_eq!(list[lower], 3);
        assert_eq!(list[list.prev(lower)], 1);
        assert_eq!(list[upper], 5);
        assert_eq!(list.next(list.next(lower)), upper);

        assert_eq!(list[tree.lower_bound(&list, &Natural, &4)], 5);
        assert_eq!(list[tree.upper_bound(&list, &Natural, &4)], 5);
        assert_eq!(list[tree.lower_bound(&list, &Natural, &0)], 1);
        assert!(tree.lower_bound(&list, &Natural, &8).is_end());
        assert!(tree.upper_bound(&list, &Natural, &7).is_end());
        assert_eq!(tree.get_by_key(&list, &Natural, &4), None);
    }

    #[test]
    fn nearest_by_key_multi_finds_first_duplicate() {
        let (tree, list) = multiset(&[2, 2, 2, 2, 2, 2, 2]);
        let id = tree.nearest_by_key(&list, &Natural, &2).unwrap();
        assert_eq!(tree.position_of(id), list.begin());
        let (lower, upper) = tree.equal_range(&list, &Natural, &2);
        assert_eq!(lower, list.begin());
        assert!(upper.is_end());
    }

    #[test]
    fn hint_is_used_only_when_strictly_between() {
        let mut tree = UniqueSetTree::new();
        let mut list = ElementList::new();
        let ten = tree.insert_by_key(&mut list, &Natural, 10).0;
        let thirty = tree.insert_by_key(&mut list, &Natural, 30).0;

        let (twenty, inserted) = tree.insert_by_hint(&mut list, &Natural, thirty, 20);
        assert!(inserted);
        assert_eq!(list.next(ten), twenty);

        // A wrong hint still lands in order.
        let (forty, inserted) = tree.insert_by_hint(&mut list, &Natural, ten, 40);
        assert!(inserted);
        assert!(list.next(forty).is_end());

        // A hint next to an equal key falls back and is rejected.
        let (same, inserted) = tree.insert_by_hint(&mut list, &Natural, thirty, 20);
        assert!(!inserted);
        assert_eq!(same, twenty);

        assert_eq!(keys(&tree, &list), vec![10, 20, 30, 40]);
        tree.validate(&list, &Natural).unwrap();
    }

    #[test]
    fn erase_at_removes_exact_duplicate() {
        let (mut tree, mut list) = multiset(&[4, 4, 4]);
        let middle = list.next(list.begin());
        let seq = list.seq(middle);
        let (value, next) = tree.erase_at(&mut list, &Natural, middle).unwrap();
        assert_eq!(value, 4);
        assert_eq!(next, list.prev(list.end()));
        assert_eq!(tree.len(), 2);
        assert!(list.iter().count() == 2);
        assert!(tree.positions().all(|pos| list.seq(pos) != seq));
        assert_eq!(tree.erase_at(&mut list, &Natural, middle), None);
        tree.validate(&list, &Natural).unwrap();
    }

    #[test]
    fn custom_comparator_reverses_order() {
        let greater = |a: &i32, b: &i32| a > b;
        let mut tree = UniqueSetTree::new();
        let mut list = ElementList::new();
        for v in [1, 4, 2, 8, 5] {
            tree.insert_by_key(&mut list, &greater, v);
        }
        assert_eq!(keys(&tree, &list), vec![8, 5, 4, 2, 1]);
        assert_eq!(list[tree.lower_bound(&list, &greater, &3)], 2);
        assert!(tree.upper_bound(&list, &greater, &1).is_end());
    }
}
