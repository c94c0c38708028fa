//! Growable arena with stable indices.
//!
//! The arena owns every node in the map. Indices remain valid until the slot
//! is explicitly removed, which lets the map thread per-level forward links
//! through shared node slots without pointers or aliasing hazards. Removed
//! slots go on a free list and are reused LIFO by later inserts.
//!
//! Indices are plain unsigned integers implementing [`Link`], with the
//! type's maximum value reserved as a "no node" sentinel. That keeps
//! `Option<Idx>` overhead out of every forward slot while still letting a
//! forward link, a front entry, or a search-path slot say "nothing here".

/// An arena index with a reserved sentinel.
///
/// [`Link::NONE`] marks the end of a chain at some level, or a search-path
/// predecessor that is the front vector itself rather than a node. The
/// sentinel is the type's maximum value, which the arena never hands out.
///
/// Implemented for the widths the map supports: `u16` and `u32` for compact
/// towers, `usize` when slot counts may exceed `u32`'s range.
///
/// # Example
///
/// ```
/// use skipmap::{Arena, Link};
///
/// let mut arena: Arena<&str, u16> = Arena::new();
/// let idx = arena.insert("node");
///
/// assert!(idx.is_some());
/// assert!(u16::NONE.is_none());
/// ```
pub trait Link: Copy + Eq {
    /// Sentinel value representing "no node".
    const NONE: Self;

    /// Returns `true` if this is the sentinel value.
    #[inline]
    fn is_none(self) -> bool {
        self == Self::NONE
    }

    /// Returns `true` if this links to a node.
    #[inline]
    fn is_some(self) -> bool {
        !self.is_none()
    }

    /// The arena slot this link designates.
    fn slot(self) -> usize;

    /// A link to the given arena slot.
    fn from_slot(slot: usize) -> Self;
}

impl Link for u16 {
    const NONE: Self = u16::MAX;

    #[inline]
    fn slot(self) -> usize {
        self as usize
    }

    #[inline]
    fn from_slot(slot: usize) -> Self {
        slot as u16
    }
}

impl Link for u32 {
    const NONE: Self = u32::MAX;

    #[inline]
    fn slot(self) -> usize {
        self as usize
    }

    #[inline]
    fn from_slot(slot: usize) -> Self {
        slot as u32
    }
}

impl Link for usize {
    const NONE: Self = usize::MAX;

    #[inline]
    fn slot(self) -> usize {
        self
    }

    #[inline]
    fn from_slot(slot: usize) -> Self {
        slot
    }
}

enum Slot<T, Idx> {
    Occupied(T),
    /// Next entry of the free list, `Idx::NONE` at the end.
    Vacant(Idx),
}

/// Slab-like storage with stable indices and slot reuse.
///
/// # Example
///
/// ```
/// use skipmap::Arena;
///
/// let mut arena: Arena<u64> = Arena::new();
/// let idx = arena.insert(42);
/// assert_eq!(arena.get(idx), Some(&42));
/// assert_eq!(arena.remove(idx), Some(42));
/// assert_eq!(arena.get(idx), None);
/// ```
pub struct Arena<T, Idx: Link = u32> {
    slots: Vec<Slot<T, Idx>>,
    /// Head of the vacant-slot free list.
    free_head: Idx,
    len: usize,
}

impl<T, Idx: Link> Arena<T, Idx> {
    /// Creates an empty arena.
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free_head: Idx::NONE,
            len: 0,
        }
    }

    /// Creates an empty arena with room for `capacity` values before
    /// reallocating.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            free_head: Idx::NONE,
            len: 0,
        }
    }

    /// Returns the number of occupied slots.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if no slots are occupied.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Inserts a value, returning its stable index.
    ///
    /// Reuses the most recently freed slot if one exists, otherwise grows.
    ///
    /// # Panics
    ///
    /// Panics if the number of slots would exceed the index type's sentinel.
    pub fn insert(&mut self, value: T) -> Idx {
        self.len += 1;

        if self.free_head.is_some() {
            let idx = self.free_head;
            match self.slots[idx.slot()] {
                Slot::Vacant(next) => self.free_head = next,
                Slot::Occupied(_) => unreachable!("corrupt free list"),
            }
            self.slots[idx.slot()] = Slot::Occupied(value);
            idx
        } else {
            let i = self.slots.len();
            assert!(i < Idx::NONE.slot(), "arena exceeds index type maximum");
            self.slots.push(Slot::Occupied(value));
            Idx::from_slot(i)
        }
    }

    /// Removes and returns the value at `index`, if present.
    pub fn remove(&mut self, index: Idx) -> Option<T> {
        let i = index.slot();
        if i >= self.slots.len() || matches!(self.slots[i], Slot::Vacant(_)) {
            return None;
        }

        let slot = core::mem::replace(&mut self.slots[i], Slot::Vacant(self.free_head));
        self.free_head = index;
        self.len -= 1;

        match slot {
            Slot::Occupied(value) => Some(value),
            Slot::Vacant(_) => unreachable!(),
        }
    }

    /// Returns a reference to the value at `index`, if present.
    #[inline]
    pub fn get(&self, index: Idx) -> Option<&T> {
        match self.slots.get(index.slot()) {
            Some(Slot::Occupied(value)) => Some(value),
            _ => None,
        }
    }

    /// Returns a mutable reference to the value at `index`, if present.
    #[inline]
    pub fn get_mut(&mut self, index: Idx) -> Option<&mut T> {
        match self.slots.get_mut(index.slot()) {
            Some(Slot::Occupied(value)) => Some(value),
            _ => None,
        }
    }

    /// Removes all values and resets the free list.
    ///
    /// Any indices previously handed out become invalid.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.free_head = Idx::NONE;
        self.len = 0;
    }
}

impl<T, Idx: Link> Default for Arena<T, Idx> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: core::fmt::Debug, Idx: Link> core::fmt::Debug for Arena<T, Idx> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let occupied = self.slots.iter().filter_map(|slot| match slot {
            Slot::Occupied(value) => Some(value),
            Slot::Vacant(_) => None,
        });
        f.debug_list().entries(occupied).finish()
    }
}
