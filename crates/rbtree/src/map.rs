//! Map-only operations of the tree containers.

use crate::container::{TreeContainer, TreeMap, TreeMultiMap};
use crate::error::{Error, Result};
use crate::list::Position;
use crate::policy::{Compare, MapKey, Uniqueness};

impl<K, V, U, C> TreeContainer<(K, V), MapKey, U, C>
where
    U: Uniqueness,
    C: Compare<K>,
{
    /// The mapped value of the first element with key `key`.
    pub fn get_value(&self, key: &K) -> Option<&V> {
        self.get(self.find(key)).map(|(_, v)| v)
    }

    /// Mutable access to the mapped part of the element at `pos`. The key
    /// stays immutable.
    pub fn value_mut(&mut self, pos: Position) -> Result<&mut V> {
        match self.get_entry_mut(pos) {
            Some((_, v)) => Ok(v),
            None => Err(Error::InvalidPosition(pos)),
        }
    }

    pub fn keys(&self) -> impl DoubleEndedIterator<Item = &K> + '_ {
        self.iter().map(|(k, _)| k)
    }

    pub fn values(&self) -> impl DoubleEndedIterator<Item = &V> + '_ {
        self.iter().map(|(_, v)| v)
    }
}

impl<K, V, C: Compare<K>> TreeMap<K, V, C> {
    /// Inserts `(key, value)` unless `key` is present.
    pub fn emplace(&mut self, key: K, value: V) -> (Position, bool) {
        self.insert((key, value))
    }

    /// Hinted [`emplace`](Self::emplace). Returns the position holding
    /// `key`.
    pub fn emplace_hint(&mut self, hint: Position, key: K, value: V) -> Position {
        self.insert_hint(hint, (key, value))
    }

    pub fn at(&self, key: &K) -> Result<&V> {
        self.get_value(key).ok_or(Error::KeyNotFound)
    }

    pub fn at_mut(&mut self, key: &K) -> Result<&mut V> {
        let pos = self.find(key);
        self.value_mut(pos).map_err(|_| Error::KeyNotFound)
    }

    /// Inserts `(key, value)`, or overwrites the mapped value when `key` is
    /// already present. The `bool` is `true` for an insertion.
    pub fn insert_or_assign(&mut self, key: K, value: V) -> (Position, bool) {
        let pos = self.find(&key);
        match self.value_mut(pos) {
            Ok(slot) => {
                *slot = value;
                (pos, false)
            }
            Err(_) => self.insert((key, value)),
        }
    }

    /// [`insert_or_assign`](Self::insert_or_assign) that tries `hint` first
    /// when `key` is absent.
    pub fn insert_or_assign_hint(&mut self, hint: Position, key: K, value: V) -> Position {
        let pos = self.find(&key);
        match self.value_mut(pos) {
            Ok(slot) => {
                *slot = value;
                pos
            }
            Err(_) => self.insert_hint(hint, (key, value)),
        }
    }
}

impl<K, V, C: Compare<K>> TreeMultiMap<K, V, C> {
    /// Inserts `(key, value)` after every element with key `key`.
    pub fn emplace(&mut self, key: K, value: V) -> Position {
        self.insert((key, value))
    }

    pub fn emplace_hint(&mut self, hint: Position, key: K, value: V) -> Position {
        self.insert_hint(hint, (key, value))
    }
}
