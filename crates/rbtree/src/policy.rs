use std::cmp::Ordering;

/// Strict weak ordering over keys.
///
/// `less` must be irreflexive and transitive, and incomparability must be
/// transitive too. This is not checked: an inconsistent comparator leaves the
/// containers in an unspecified (but memory safe) order.
pub trait Compare<K: ?Sized> {
    fn less(&self, a: &K, b: &K) -> bool;

    fn equivalent(&self, a: &K, b: &K) -> bool {
        !self.less(a, b) && !self.less(b, a)
    }

    fn ordering(&self, a: &K, b: &K) -> Ordering {
        if self.less(a, b) {
            Ordering::Less
        } else if self.less(b, a) {
            Ordering::Greater
        } else {
            Ordering::Equal
        }
    }
}

/// `Ord`-based comparator, the default of every container.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Natural;

impl<K: Ord + ?Sized> Compare<K> for Natural {
    #[inline]
    fn less(&self, a: &K, b: &K) -> bool {
        a < b
    }

    #[inline]
    fn ordering(&self, a: &K, b: &K) -> Ordering {
        a.cmp(b)
    }
}

impl<K: ?Sized, F> Compare<K> for F
where
    F: Fn(&K, &K) -> bool,
{
    #[inline]
    fn less(&self, a: &K, b: &K) -> bool {
        self(a, b)
    }
}

/// Projects the comparison key out of a stored element.
pub trait KeyOf<E> {
    type Key;

    fn key(elem: &E) -> &Self::Key;
}

/// The element is its own key.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SetKey;

/// The element is a `(key, mapped)` pair ordered by `key`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MapKey;

impl<K> KeyOf<K> for SetKey {
    type Key = K;

    #[inline(always)]
    fn key(elem: &K) -> &K {
        elem
    }
}

impl<K, V> KeyOf<(K, V)> for MapKey {
    type Key = K;

    #[inline(always)]
    fn key(elem: &(K, V)) -> &K {
        &elem.0
    }
}

/// Duplicate-key policy.
pub trait Uniqueness {
    const REJECT_DUPLICATES: bool;
}

/// Equivalent keys are rejected on insert.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Unique;

/// Equivalent keys are kept, in insertion order.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Multi;

impl Uniqueness for Unique {
    const REJECT_DUPLICATES: bool = true;
}

impl Uniqueness for Multi {
    const REJECT_DUPLICATES: bool = false;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closures_and_natural_agree() {
        let greater = |a: &i32, b: &i32| a > b;
        assert!(Natural.less(&1, &2));
        assert!(greater.less(&2, &1));
        assert_eq!(greater.ordering(&2, &1), Ordering::Less);
        assert_eq!(Natural.ordering(&2, &1), Ordering::Greater);
        assert!(Natural.equivalent(&3, &3));

        let by_len = |a: &str, b: &str| a.len() < b.len();
        assert!(by_len.equivalent("ab", "cd"));
        assert!(!by_len.equivalent("a", "cd"));
    }

    #[test]
    fn projections() {
        assert_eq!(*SetKey::key(&7), 7);
        assert_eq!(*MapKey::key(&(7, "seven")), 7);
        const { assert!(Unique::REJECT_DUPLICATES) };
        const { assert!(!Multi::REJECT_DUPLICATES) };
    }
}
