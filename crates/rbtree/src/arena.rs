use std::ops::{Index, IndexMut};

pub(crate) const NIL: u32 = u32::MAX;

/// Most slots an arena can hand out. `NIL` is reserved, so slot indices stop
/// one short of `u32::MAX`.
pub(crate) const CAPACITY: usize = NIL as usize;

/// Narrows a slot index to its stored width.
///
/// # Panics
///
/// Panics if `index` reaches [`CAPACITY`].
fn slot_index(index: usize) -> u32 {
    match u32::try_from(index) {
        Ok(slot) if slot != NIL => slot,
        _ => panic!("arena capacity of {CAPACITY} slots exceeded"),
    }
}

/// Slot allocator backing both the tree nodes and the element list.
///
/// Freed slots are chained into a free list and reused. Every slot carries a
/// generation that is bumped whenever its occupant leaves, so a handle that
/// remembers `(index, generation)` can tell whether it is stale.
#[derive(Clone, Debug)]
pub(crate) struct Arena<T> {
    entries: Vec<Entry<T>>,
    free: u32,
    len: usize,
}

#[derive(Clone, Debug)]
enum Entry<T> {
    Occupied { generation: u32, value: T },
    Vacant { generation: u32, next_free: u32 },
}

impl<T> Entry<T> {
    fn generation(&self) -> u32 {
        match self {
            Entry::Occupied { generation, .. } | Entry::Vacant { generation, .. } => *generation,
        }
    }
}

impl<T> Arena<T> {
    pub(crate) fn new() -> Self {
        Self {
            entries: Vec::new(),
            free: NIL,
            len: 0,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.len
    }

    /// Drops every value. Generations survive so old handles stay stale.
    pub(crate) fn clear(&mut self) {
        let mut free = NIL;
        for (index, entry) in self.entries.iter_mut().enumerate().rev() {
            let generation = match entry {
                Entry::Occupied { generation, .. } => generation.wrapping_add(1),
                Entry::Vacant { generation, .. } => *generation,
            };
            *entry = Entry::Vacant {
                generation,
                next_free: free,
            };
            free = slot_index(index);
        }
        self.free = free;
        self.len = 0;
    }

    pub(crate) fn insert(&mut self, value: T) -> u32 {
        self.len += 1;
        if self.free == NIL {
            let index = slot_index(self.entries.len());
            self.entries.push(Entry::Occupied {
                generation: 0,
                value,
            });
            return index;
        }

        let index = self.free;
        let entry = &mut self.entries[index as usize];
        let (generation, next_free) = match *entry {
            Entry::Vacant {
                generation,
                next_free,
            } => (generation, next_free),
            Entry::Occupied { .. } => unreachable!("free list points at an occupied slot"),
        };
        *entry = Entry::Occupied { generation, value };
        self.free = next_free;
        index
    }

    pub(crate) fn remove(&mut self, index: u32) -> Option<T> {
        let entry = self.entries.get_mut(index as usize)?;
        let generation = match entry {
            Entry::Occupied { generation, .. } => generation.wrapping_add(1),
            Entry::Vacant { .. } => return None,
        };
        let old = std::mem::replace(
            entry,
            Entry::Vacant {
                generation,
                next_free: self.free,
            },
        );
        self.free = index;
        self.len -= 1;
        match old {
            Entry::Occupied { value, .. } => Some(value),
            Entry::Vacant { .. } => None,
        }
    }

    pub(crate) fn generation(&self, index: u32) -> u32 {
        self.entries
            .get(index as usize)
            .map(Entry::generation)
            .unwrap_or(0)
    }

    pub(crate) fn contains(&self, index: u32, generation: u32) -> bool {
        matches!(
            self.entries.get(index as usize),
            Some(Entry::Occupied { generation: g, .. }) if *g == generation
        )
    }

    pub(crate) fn get(&self, index: u32) -> Option<&T> {
        match self.entries.get(index as usize)? {
            Entry::Occupied { value, .. } => Some(value),
            Entry::Vacant { .. } => None,
        }
    }

    pub(crate) fn get_mut(&mut self, index: u32) -> Option<&mut T> {
        match self.entries.get_mut(index as usize)? {
            Entry::Occupied { value, .. } => Some(value),
            Entry::Vacant { .. } => None,
        }
    }

    /// Mutable access to two distinct occupied slots at once.
    pub(crate) fn pair_mut(&mut self, a: u32, b: u32) -> (&mut T, &mut T) {
        assert_ne!(a, b, "pair_mut needs two distinct slots");
        let (lo, hi) = if a < b { (a, b) } else { (b, a) };
        let (head, tail) = self.entries.split_at_mut(hi as usize);
        let lo_value = occupied_mut(&mut head[lo as usize]);
        let hi_value = occupied_mut(&mut tail[0]);
        if a < b {
            (lo_value, hi_value)
        } else {
            (hi_value, lo_value)
        }
    }
}

fn occupied_mut<T>(entry: &mut Entry<T>) -> &mut T {
    match entry {
        Entry::Occupied { value, .. } => value,
        Entry::Vacant { .. } => panic!("vacant arena slot"),
    }
}

impl<T> Default for Arena<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Index<u32> for Arena<T> {
    type Output = T;

    fn index(&self, index: u32) -> &T {
        match &self.entries[index as usize] {
            Entry::Occupied { value, .. } => value,
            Entry::Vacant { .. } => panic!("vacant arena slot {index}"),
        }
    }
}

impl<T> IndexMut<u32> for Arena<T> {
    fn index_mut(&mut self, index: u32) -> &mut T {
        occupied_mut(&mut self.entries[index as usize])
    }
}
