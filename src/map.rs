//! Skip map - a probabilistic sorted map over an index arena.
//!
//! A skip list provides O(log n) expected time for insert, lookup, and
//! removal, with no global rebalancing. Every node carries a tower of
//! forward links; level 0 holds every key, and each higher level holds a
//! randomly thinned subset that acts as an express lane for searches.
//!
//! ```text
//! Level 3:  FRONT ─────────────────────► 50 ──────────────────► NIL
//!              │                          │
//! Level 2:  FRONT ────────► 20 ──────────► 50 ──────────────────► NIL
//! Level 1:  FRONT ──► 10 ──► 20 ──► 30 ──► 50 ──► 60 ──► NIL
//! ```
//!
//! # Design
//!
//! Nodes live in an [`Arena`] and reference each other by index, so
//! unlinking a node at several levels in one operation never creates a
//! dangling reference. There is no synthetic head node: the map's `front`
//! vector holds the per-level entry links, and a `Link::NONE` predecessor
//! in a search path means "the front itself".
//!
//! # Example
//!
//! ```rust
//! use skipmap::SkipMap;
//!
//! let mut map: SkipMap<u64, String> = SkipMap::new();
//!
//! map.insert(100, "first".into());
//! map.insert(50, "second".into());
//!
//! assert_eq!(map.get(&50), Some(&"second".into()));
//! let keys: Vec<_> = map.keys().copied().collect();
//! assert_eq!(keys, vec![50, 100]);
//! ```

use core::cell::Cell;
use core::cmp::Ordering;
use core::fmt;
use std::io;

use rand::rngs::SmallRng;
use rand::SeedableRng;
use rand_core::RngCore;

use crate::arena::{Arena, Link};
use crate::cmp::{Comparator, NaturalOrder};
use crate::error::KeyNotFound;

/// Number of levels a new map starts with.
///
/// The front vector grows past this whenever a node draws a taller height;
/// it never shrinks.
const INITIAL_HEIGHT: usize = 16;

// ============================================================================
// Node
// ============================================================================

/// A node in the skip map: one key/value pair plus its tower of links.
///
/// `forward[level]` is the next node at that level; the tower covers levels
/// `0..height` contiguously, so `forward.len()` is the node's height.
struct Node<K, V, Idx> {
    key: K,
    value: V,
    forward: Vec<Idx>,
}

impl<K, V, Idx> Node<K, V, Idx> {
    #[inline]
    fn height(&self) -> usize {
        self.forward.len()
    }
}

// ============================================================================
// SkipMap
// ============================================================================

/// A probabilistic sorted map (skip list) that owns its nodes.
///
/// The map maintains entries in sorted key order, providing O(log n)
/// expected time for insert, lookup, and removal.
///
/// # Type Parameters
///
/// - `K`: key type
/// - `V`: value type
/// - `C`: comparator supplying the total order over keys, defaults to
///   [`NaturalOrder`] (requires `K: Ord`)
/// - `R`: random number generator implementing [`RngCore`], defaults to
///   [`SmallRng`]; inject a seeded generator for deterministic tests
/// - `Idx`: arena index type implementing [`Link`], defaults to `u32`
///
/// It is a logic error for the comparator's ordering of a key relative to
/// any other key to change while that key is in the map.
pub struct SkipMap<K, V, C = NaturalOrder, R = SmallRng, Idx: Link = u32> {
    /// Owns every node; links are indices into this arena.
    arena: Arena<Node<K, V, Idx>, Idx>,
    /// Per-level entry links. `front[level]` is the first node at that
    /// level; its length is the map's current height.
    front: Vec<Idx>,
    cmp: C,
    rng: R,
    len: usize,
    /// Instrumentation: link traversals and rewires since the last reset.
    steps: Cell<u64>,
}

impl<K: Ord, V> SkipMap<K, V> {
    /// Creates an empty map ordered by `K: Ord`, with an entropy-seeded
    /// generator for node heights.
    pub fn new() -> Self {
        Self::with_comparator_and_rng(NaturalOrder, SmallRng::from_entropy())
    }
}

impl<K: Ord, V> Default for SkipMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Ord, V, R: RngCore> SkipMap<K, V, NaturalOrder, R> {
    /// Creates an empty map ordered by `K: Ord` with the given generator.
    ///
    /// # Example
    ///
    /// ```
    /// use rand::rngs::SmallRng;
    /// use rand::SeedableRng;
    /// use skipmap::SkipMap;
    ///
    /// let mut map: SkipMap<u64, &str, _, SmallRng> =
    ///     SkipMap::with_rng(SmallRng::seed_from_u64(12345));
    /// map.insert(1, "one");
    /// assert_eq!(map.get(&1), Some(&"one"));
    /// ```
    pub fn with_rng(rng: R) -> Self {
        Self::with_comparator_and_rng(NaturalOrder, rng)
    }
}

impl<K, V, C: Comparator<K>> SkipMap<K, V, C> {
    /// Creates an empty map ordered by the given comparator.
    ///
    /// Any `Fn(&K, &K) -> Ordering` closure is a comparator; so is the
    /// opt-in legacy [`DisplayOrder`](crate::DisplayOrder).
    pub fn with_comparator(cmp: C) -> Self {
        Self::with_comparator_and_rng(cmp, SmallRng::from_entropy())
    }
}

impl<K, V, C, R, Idx: Link> SkipMap<K, V, C, R, Idx> {
    /// Creates an empty map from a comparator and a generator.
    pub fn with_comparator_and_rng(cmp: C, rng: R) -> Self {
        Self {
            arena: Arena::new(),
            front: vec![Idx::NONE; INITIAL_HEIGHT],
            cmp,
            rng,
            len: 0,
            steps: Cell::new(0),
        }
    }

    /// Returns the number of entries in the map.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the map contains no entries.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the current number of levels.
    ///
    /// Grows when an inserted node draws a taller tower; never shrinks,
    /// even when the top levels empty out.
    #[inline]
    pub fn height(&self) -> usize {
        self.front.len()
    }

    /// Returns the number of link traversals and rewires performed since
    /// the last [`reset_counter`](Self::reset_counter).
    ///
    /// Purely an instrumentation hook for workload analysis; no operation
    /// depends on it.
    #[inline]
    pub fn counter(&self) -> u64 {
        self.steps.get()
    }

    /// Resets the operation counter to zero.
    #[inline]
    pub fn reset_counter(&self) {
        self.steps.set(0);
    }

    /// Removes all entries and resets the height to its initial value.
    pub fn clear(&mut self) {
        self.arena.clear();
        self.front.clear();
        self.front.resize(INITIAL_HEIGHT, Idx::NONE);
        self.len = 0;
    }

    // ========================================================================
    // Iteration
    // ========================================================================

    /// Returns an iterator over key-value pairs in sorted order.
    ///
    /// The walk follows level-0 links from the front; it is lazy and
    /// one-shot. Call again for a fresh walk.
    #[inline]
    pub fn iter(&self) -> Iter<'_, K, V, Idx> {
        Iter {
            arena: &self.arena,
            current: self.front[0],
        }
    }

    /// Returns a mutable iterator over key-value pairs in sorted order.
    #[inline]
    pub fn iter_mut(&mut self) -> IterMut<'_, K, V, Idx> {
        IterMut {
            current: self.front[0],
            arena: &mut self.arena,
        }
    }

    /// Returns an iterator over keys in sorted order.
    #[inline]
    pub fn keys(&self) -> Keys<'_, K, V, Idx> {
        Keys { inner: self.iter() }
    }

    /// Returns an iterator over values in sorted order by key.
    #[inline]
    pub fn values(&self) -> Values<'_, K, V, Idx> {
        Values { inner: self.iter() }
    }

    /// Calls `visitor` on every key-value pair in sorted order.
    pub fn for_each<F>(&self, mut visitor: F)
    where
        F: FnMut(&K, &V),
    {
        for (key, value) in self.iter() {
            visitor(key, value);
        }
    }

    // ========================================================================
    // Diagnostics
    // ========================================================================

    /// Writes a human-readable rendering of the tower structure.
    ///
    /// One row per node in key order: `-*` marks a level the node links
    /// into, ` |` a level passing over it. No invariant depends on this
    /// output; it exists for debugging.
    pub fn dump<W: io::Write>(&self, w: &mut W) -> io::Result<()>
    where
        K: fmt::Display,
    {
        let lead = " ".repeat(10);
        let height = self.height();

        writeln!(w, "{}{}", lead, " X".repeat(height))?;
        writeln!(w, "{}{}", lead, " |".repeat(height))?;

        let mut current = self.front[0];
        while current.is_some() {
            let node = self.node(current);
            // Truncate on char boundaries; keys may render as multibyte text.
            let label: String = node.key.to_string().chars().take(10).collect();
            writeln!(
                w,
                "{:>10}{}{}",
                label,
                "-*".repeat(node.height()),
                " |".repeat(height - node.height())
            )?;
            writeln!(w, "{}{}", lead, " |".repeat(height))?;
            current = node.forward[0];
        }

        writeln!(w, "{}{}", lead, " O".repeat(height))
    }

    // ========================================================================
    // Internal helpers
    // ========================================================================

    #[inline]
    fn node(&self, idx: Idx) -> &Node<K, V, Idx> {
        self.arena.get(idx).expect("invalid index")
    }

    /// The level-`level` link out of `pred`, where `Idx::NONE` names the
    /// front vector itself.
    #[inline]
    fn successor(&self, pred: Idx, level: usize) -> Idx {
        if pred.is_none() {
            self.front[level]
        } else {
            self.node(pred).forward[level]
        }
    }
}

impl<K, V, C, R, Idx> SkipMap<K, V, C, R, Idx>
where
    C: Comparator<K>,
    Idx: Link,
{
    /// Returns `true` if the map contains the given key.
    ///
    /// Never errors on an absent key, unlike [`try_get`](Self::try_get).
    #[inline]
    pub fn contains_key(&self, key: &K) -> bool {
        self.find(key).is_some()
    }

    /// Returns a reference to the value for the given key, or `None` if
    /// not found.
    #[inline]
    pub fn get(&self, key: &K) -> Option<&V> {
        let idx = self.find(key)?;
        Some(&self.node(idx).value)
    }

    /// Returns a mutable reference to the value for the given key, or
    /// `None` if not found.
    #[inline]
    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        let idx = self.find(key)?;
        Some(&mut self.arena.get_mut(idx).expect("invalid index").value)
    }

    /// Returns a reference to the value for the given key, or
    /// [`KeyNotFound`] if absent.
    ///
    /// # Example
    ///
    /// ```
    /// use skipmap::{KeyNotFound, SkipMap};
    ///
    /// let map: SkipMap<u64, &str> = SkipMap::new();
    /// assert_eq!(map.try_get(&1), Err(KeyNotFound));
    /// ```
    pub fn try_get(&self, key: &K) -> Result<&V, KeyNotFound> {
        self.get(key).ok_or(KeyNotFound)
    }

    /// Removes the entry for the given key and returns the value, or
    /// `None` if not found. Absent keys are a no-op.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let path = self.search_path(key);
        let target = self.successor(path[0], 0);
        if target.is_none() || self.cmp.cmp(&self.node(target).key, key) != Ordering::Equal {
            return None;
        }

        // Unlink at every level whose predecessor designates the target.
        // The tower only occupies levels 0..height, so nothing above the
        // node's own height is touched.
        let height = self.node(target).height();
        for level in 0..height {
            let pred = path[level];
            if self.successor(pred, level) != target {
                continue;
            }
            let next = self.node(target).forward[level];
            if pred.is_none() {
                self.front[level] = next;
            } else {
                self.arena.get_mut(pred).expect("invalid index").forward[level] = next;
            }
            self.steps.set(self.steps.get() + 1);
        }

        self.len -= 1;

        let node = self.arena.remove(target).expect("invalid index");
        Some(node.value)
    }

    /// Finds the index of a key without recording predecessors.
    /// Used by the read-only operations (`get`, `contains_key`).
    fn find(&self, key: &K) -> Option<Idx> {
        let mut cur = Idx::NONE;

        // Scan each level left to right, carrying horizontal progress down.
        for level in (0..self.height()).rev() {
            let mut next = self.successor(cur, level);
            while next.is_some() {
                let node = self.node(next);
                self.steps.set(self.steps.get() + 1);
                if self.cmp.cmp(&node.key, key) != Ordering::Less {
                    break;
                }
                cur = next;
                next = node.forward[level];
            }
        }

        let next = self.successor(cur, 0);
        if next.is_some() && self.cmp.cmp(&self.node(next).key, key) == Ordering::Equal {
            Some(next)
        } else {
            None
        }
    }

    /// Computes the search path for a key: one predecessor slot per level,
    /// `path[level]` being the rightmost node at that level whose key is
    /// strictly less than `key` (`Idx::NONE` for the front itself).
    ///
    /// The comparison must stay strict `<`; a `<=` scan would stop on the
    /// target key itself and corrupt the rewiring that follows.
    fn search_path(&self, key: &K) -> Vec<Idx> {
        let height = self.height();
        let mut path = vec![Idx::NONE; height];
        let mut cur = Idx::NONE;

        for level in (0..height).rev() {
            let mut next = self.successor(cur, level);
            while next.is_some() {
                let node = self.node(next);
                self.steps.set(self.steps.get() + 1);
                if self.cmp.cmp(&node.key, key) != Ordering::Less {
                    break;
                }
                cur = next;
                next = node.forward[level];
            }
            path[level] = cur;
        }

        path
    }
}

impl<K, V, C, R, Idx> SkipMap<K, V, C, R, Idx>
where
    C: Comparator<K>,
    R: RngCore,
    Idx: Link,
{
    /// Inserts a key-value pair.
    ///
    /// If the key already exists, the value is replaced in place and the
    /// old value returned; the structure and size are unchanged. Otherwise
    /// the new node draws a random height, the front vector grows first if
    /// the draw exceeds the current height, and the node is spliced in at
    /// every level of its tower.
    ///
    /// # Example
    ///
    /// ```
    /// use skipmap::SkipMap;
    ///
    /// let mut map: SkipMap<u64, &str> = SkipMap::new();
    /// assert_eq!(map.insert(1, "a"), None);
    /// assert_eq!(map.insert(1, "b"), Some("a"));
    /// assert_eq!(map.len(), 1);
    /// ```
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        let path = self.search_path(&key);

        let at = self.successor(path[0], 0);
        if at.is_some() && self.cmp.cmp(&self.node(at).key, &key) == Ordering::Equal {
            let node = self.arena.get_mut(at).expect("invalid index");
            return Some(core::mem::replace(&mut node.value, value));
        }

        let height = self.random_height();
        if height > self.front.len() {
            // New top levels' predecessor is the front itself; the splice
            // below then proceeds uniformly.
            self.front.resize(height, Idx::NONE);
        }

        let idx = self.arena.insert(Node {
            key,
            value,
            forward: vec![Idx::NONE; height],
        });
        self.link(idx, &path);

        None
    }

    /// Draws a node height: start at 1, add a level per consecutive heads
    /// from a fair coin. `P(height = k) = 0.5^k`, unbounded above.
    fn random_height(&mut self) -> usize {
        let mut height = 1;
        while self.rng.next_u32() & 1 == 1 {
            height += 1;
        }
        height
    }

    /// Splices a freshly allocated node into every level of its tower.
    ///
    /// `path` slots beyond its length (levels added by a front grow) read
    /// as `Idx::NONE`, i.e. the front itself.
    fn link(&mut self, idx: Idx, path: &[Idx]) {
        let height = self.node(idx).height();

        // The node's own links are wired before any predecessor is, so a
        // reader never observes a half-spliced chain.
        let mut forward = vec![Idx::NONE; height];
        for (level, slot) in forward.iter_mut().enumerate() {
            let pred = path.get(level).copied().unwrap_or(Idx::NONE);
            *slot = self.successor(pred, level);
        }
        self.arena.get_mut(idx).expect("invalid index").forward = forward;

        for level in 0..height {
            let pred = path.get(level).copied().unwrap_or(Idx::NONE);
            if pred.is_none() {
                self.front[level] = idx;
            } else {
                self.arena.get_mut(pred).expect("invalid index").forward[level] = idx;
            }
            self.steps.set(self.steps.get() + 1);
        }

        self.len += 1;
    }
}

impl<K: fmt::Debug, V: fmt::Debug, C, R, Idx: Link> fmt::Debug for SkipMap<K, V, C, R, Idx> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<'a, K, V, C, R, Idx: Link> IntoIterator for &'a SkipMap<K, V, C, R, Idx> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V, Idx>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

// ============================================================================
// Iterators
// ============================================================================

/// An iterator over key-value pairs in sorted order.
pub struct Iter<'a, K, V, Idx: Link = u32> {
    arena: &'a Arena<Node<K, V, Idx>, Idx>,
    current: Idx,
}

impl<'a, K, V, Idx: Link> Iterator for Iter<'a, K, V, Idx> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.current.is_none() {
            return None;
        }
        let node = self.arena.get(self.current).expect("invalid index");
        self.current = node.forward[0];
        Some((&node.key, &node.value))
    }
}

/// A mutable iterator over key-value pairs in sorted order.
pub struct IterMut<'a, K, V, Idx: Link = u32> {
    arena: &'a mut Arena<Node<K, V, Idx>, Idx>,
    current: Idx,
}

impl<'a, K, V, Idx: Link> Iterator for IterMut<'a, K, V, Idx> {
    type Item = (&'a K, &'a mut V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.current.is_none() {
            return None;
        }
        let idx = self.current;

        // Safety: each node is visited exactly once (current advances
        // before returning), and the arena lives for 'a, so handing out a
        // 'a borrow per node never aliases.
        let node: &'a mut Node<K, V, Idx> =
            unsafe { &mut *(self.arena.get_mut(idx).expect("invalid index") as *mut _) };

        self.current = node.forward[0];
        Some((&node.key, &mut node.value))
    }
}

/// An iterator over keys in sorted order.
pub struct Keys<'a, K, V, Idx: Link = u32> {
    inner: Iter<'a, K, V, Idx>,
}

impl<'a, K, V, Idx: Link> Iterator for Keys<'a, K, V, Idx> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, _)| k)
    }
}

/// An iterator over values in sorted order by key.
pub struct Values<'a, K, V, Idx: Link = u32> {
    inner: Iter<'a, K, V, Idx>,
}

impl<'a, K, V, Idx: Link> Iterator for Values<'a, K, V, Idx> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, v)| v)
    }
}

#[cfg(test)]
impl<K, V, C, R, Idx> SkipMap<K, V, C, R, Idx>
where
    C: Comparator<K>,
    Idx: Link,
{
    /// Checks the structural invariants: per-level sortedness, the tower
    /// subset property, size accuracy, and the height bound.
    fn check_invariants(&self) {
        let height = self.front.len();
        assert!(height >= 1, "height must stay positive");

        let mut below: Vec<Idx> = Vec::new();
        for level in 0..height {
            let mut chain = Vec::new();
            let mut cur = self.front[level];
            while cur.is_some() {
                let node = self.node(cur);
                assert!(node.height() > level, "node reachable above its height");
                assert!(node.height() <= height, "node taller than the map");
                chain.push(cur);
                cur = node.forward[level];
            }

            for pair in chain.windows(2) {
                let a = &self.node(pair[0]).key;
                let b = &self.node(pair[1]).key;
                assert_eq!(self.cmp.cmp(a, b), Ordering::Less, "level out of order");
            }

            if level == 0 {
                assert_eq!(chain.len(), self.len, "len out of sync with level 0");
                assert_eq!(self.arena.len(), self.len, "arena leaks nodes");
            } else {
                let mut lower = below.iter();
                for idx in &chain {
                    assert!(
                        lower.any(|b| b == idx),
                        "tower property violated: node missing from lower level"
                    );
                }
            }
            below = chain;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cmp::DisplayOrder;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;
    use std::collections::HashMap;

    type TestMap = SkipMap<u64, String, NaturalOrder, SmallRng>;

    fn make_rng() -> SmallRng {
        SmallRng::seed_from_u64(12345)
    }

    fn make_map() -> TestMap {
        SkipMap::with_rng(make_rng())
    }

    /// Emits `flips` heads, then tails forever. Forces one tall tower.
    struct TallRng {
        flips: u32,
    }

    impl RngCore for TallRng {
        fn next_u32(&mut self) -> u32 {
            if self.flips > 0 {
                self.flips -= 1;
                1
            } else {
                0
            }
        }

        fn next_u64(&mut self) -> u64 {
            self.next_u32() as u64
        }

        fn fill_bytes(&mut self, dest: &mut [u8]) {
            for b in dest.iter_mut() {
                *b = 0;
            }
        }

        fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand_core::Error> {
            self.fill_bytes(dest);
            Ok(())
        }
    }

    // ========================================================================
    // Basic operations
    // ========================================================================

    #[test]
    fn new_is_empty() {
        let map = make_map();

        assert!(map.is_empty());
        assert_eq!(map.len(), 0);
        assert_eq!(map.height(), 16);
        assert_eq!(map.iter().count(), 0);
    }

    #[test]
    fn insert_single() {
        let mut map = make_map();

        let old = map.insert(100, "hello".into());
        assert_eq!(old, None);
        assert_eq!(map.len(), 1);
        assert!(!map.is_empty());

        assert_eq!(map.get(&100), Some(&"hello".into()));
        map.check_invariants();
    }

    #[test]
    fn insert_updates_existing_without_growing() {
        let mut map = make_map();

        map.insert(100, "first".into());
        let old = map.insert(100, "second".into());

        assert_eq!(old, Some("first".into()));
        assert_eq!(map.len(), 1);
        assert_eq!(map.get(&100), Some(&"second".into()));
        map.check_invariants();
    }

    #[test]
    fn insert_multiple_maintains_order() {
        let mut map = make_map();

        map.insert(50, "fifty".into());
        map.insert(10, "ten".into());
        map.insert(90, "ninety".into());
        map.insert(30, "thirty".into());

        assert_eq!(map.len(), 4);
        let keys: Vec<_> = map.keys().copied().collect();
        assert_eq!(keys, vec![10, 30, 50, 90]);
        map.check_invariants();
    }

    #[test]
    fn get_and_get_mut() {
        let mut map = make_map();

        map.insert(100, "hello".into());

        assert_eq!(map.get(&100), Some(&"hello".into()));
        assert_eq!(map.get(&999), None);

        if let Some(v) = map.get_mut(&100) {
            *v = "world".into();
        }
        assert_eq!(map.get(&100), Some(&"world".into()));
    }

    #[test]
    fn try_get_reports_missing_keys() {
        let mut map = make_map();
        map.insert(1, "one".into());

        assert_eq!(map.try_get(&1), Ok(&"one".to_string()));
        assert_eq!(map.try_get(&2), Err(KeyNotFound));
    }

    #[test]
    fn try_get_on_empty_map() {
        let map = make_map();
        assert_eq!(map.try_get(&42), Err(KeyNotFound));
    }

    #[test]
    fn contains_key() {
        let mut map = make_map();

        map.insert(100, "hello".into());

        assert!(map.contains_key(&100));
        assert!(!map.contains_key(&999));
    }

    // ========================================================================
    // Remove operations
    // ========================================================================

    #[test]
    fn remove_existing() {
        let mut map = make_map();

        map.insert(100, "hello".into());
        let removed = map.remove(&100);

        assert_eq!(removed, Some("hello".into()));
        assert!(map.is_empty());
        assert!(!map.contains_key(&100));
        map.check_invariants();
    }

    #[test]
    fn remove_nonexistent_is_noop() {
        let mut map = make_map();

        map.insert(100, "hello".into());
        let removed = map.remove(&999);

        assert_eq!(removed, None);
        assert_eq!(map.len(), 1);
        map.check_invariants();
    }

    #[test]
    fn remove_twice_returns_none() {
        let mut map = make_map();

        map.insert(100, "hello".into());
        assert_eq!(map.remove(&100), Some("hello".into()));
        assert_eq!(map.remove(&100), None);
        assert_eq!(map.len(), 0);
    }

    #[test]
    fn remove_middle_preserves_order() {
        let mut map = make_map();

        map.insert(10, "ten".into());
        map.insert(20, "twenty".into());
        map.insert(30, "thirty".into());

        map.remove(&20);

        let keys: Vec<_> = map.keys().copied().collect();
        assert_eq!(keys, vec![10, 30]);
        map.check_invariants();
    }

    #[test]
    fn remove_first_updates_front() {
        let mut map = make_map();

        map.insert(10, "ten".into());
        map.insert(20, "twenty".into());

        map.remove(&10);

        assert_eq!(map.iter().next(), Some((&20, &"twenty".to_string())));
        map.check_invariants();
    }

    #[test]
    fn height_never_shrinks_on_removal() {
        let mut map: SkipMap<u64, u64, NaturalOrder, TallRng> =
            SkipMap::with_comparator_and_rng(NaturalOrder, TallRng { flips: 20 });

        map.insert(1, 1);
        assert_eq!(map.height(), 21);
        map.check_invariants();

        map.remove(&1);
        assert_eq!(map.height(), 21);
        assert!(map.is_empty());
        map.check_invariants();
    }

    // ========================================================================
    // Height growth
    // ========================================================================

    #[test]
    fn tall_draw_grows_front() {
        let mut map: SkipMap<u64, u64, NaturalOrder, TallRng> =
            SkipMap::with_comparator_and_rng(NaturalOrder, TallRng { flips: 20 });

        map.insert(5, 50);
        map.insert(3, 30);
        map.insert(8, 80);

        assert_eq!(map.height(), 21);
        assert_eq!(map.get(&5), Some(&50));
        let keys: Vec<_> = map.keys().copied().collect();
        assert_eq!(keys, vec![3, 5, 8]);
        map.check_invariants();
    }

    // ========================================================================
    // Iteration
    // ========================================================================

    #[test]
    fn iter_sorted() {
        let mut map = make_map();

        map.insert(50, "fifty".into());
        map.insert(10, "ten".into());
        map.insert(90, "ninety".into());

        let pairs: Vec<_> = map.iter().map(|(k, v)| (*k, v.clone())).collect();
        assert_eq!(
            pairs,
            vec![
                (10, "ten".into()),
                (50, "fifty".into()),
                (90, "ninety".into())
            ]
        );
    }

    #[test]
    fn iter_mut() {
        let mut map = make_map();

        map.insert(10, "a".into());
        map.insert(20, "b".into());

        for (_, v) in map.iter_mut() {
            v.push_str("_modified");
        }

        assert_eq!(map.get(&10), Some(&"a_modified".into()));
        assert_eq!(map.get(&20), Some(&"b_modified".into()));
    }

    #[test]
    fn keys_and_values() {
        let mut map = make_map();

        map.insert(10, "ten".into());
        map.insert(20, "twenty".into());

        let keys: Vec<_> = map.keys().copied().collect();
        let values: Vec<_> = map.values().cloned().collect();

        assert_eq!(keys, vec![10, 20]);
        assert_eq!(values, vec!["ten".to_string(), "twenty".to_string()]);
    }

    #[test]
    fn for_each_visits_in_order() {
        let mut map = make_map();

        map.insert(2, "two".into());
        map.insert(1, "one".into());

        let mut seen = Vec::new();
        map.for_each(|k, v| seen.push((*k, v.clone())));

        assert_eq!(seen, vec![(1, "one".into()), (2, "two".into())]);
    }

    #[test]
    fn into_iterator_for_ref() {
        let mut map = make_map();
        map.insert(1, "one".into());

        let mut count = 0;
        for (k, _) in &map {
            assert_eq!(*k, 1);
            count += 1;
        }
        assert_eq!(count, 1);
    }

    // ========================================================================
    // Clear
    // ========================================================================

    #[test]
    fn clear_resets() {
        let mut map = make_map();

        map.insert(10, "ten".into());
        map.insert(20, "twenty".into());

        map.clear();

        assert!(map.is_empty());
        assert_eq!(map.height(), 16);
        assert_eq!(map.iter().count(), 0);
        map.check_invariants();
    }

    // ========================================================================
    // Comparators
    // ========================================================================

    #[test]
    fn display_order_is_lexicographic() {
        let mut map: SkipMap<u32, &str, DisplayOrder, SmallRng> =
            SkipMap::with_comparator_and_rng(DisplayOrder, make_rng());

        map.insert(2, "two");
        map.insert(10, "ten");

        // "10" sorts before "2" as strings
        let keys: Vec<_> = map.keys().copied().collect();
        assert_eq!(keys, vec![10, 2]);
        map.check_invariants();
    }

    #[test]
    fn closure_comparator_reverses_order() {
        let mut map = SkipMap::<u32, u32, _, SmallRng>::with_comparator_and_rng(
            |a: &u32, b: &u32| b.cmp(a),
            make_rng(),
        );

        map.insert(1, 10);
        map.insert(2, 20);
        map.insert(3, 30);

        let keys: Vec<_> = map.keys().copied().collect();
        assert_eq!(keys, vec![3, 2, 1]);
        map.check_invariants();
    }

    // ========================================================================
    // Counter
    // ========================================================================

    #[test]
    fn counter_counts_and_resets() {
        let mut map = make_map();
        for i in 0..64 {
            map.insert(i, format!("val{}", i));
        }

        map.reset_counter();
        assert_eq!(map.counter(), 0);

        let _ = map.get(&63);
        assert!(map.counter() > 0);

        map.reset_counter();
        assert_eq!(map.counter(), 0);
    }

    // ========================================================================
    // Diagnostics
    // ========================================================================

    #[test]
    fn dump_renders_towers() {
        let mut map = make_map();
        map.insert(7, "seven".into());
        map.insert(3, "three".into());

        let mut out = Vec::new();
        map.dump(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.contains(" X"));
        assert!(text.contains("-*"));
        assert!(text.contains('3'));
        assert!(text.contains('7'));
        assert!(text.trim_end().ends_with(" O"));
    }

    #[test]
    fn dump_handles_multibyte_keys() {
        let mut map: SkipMap<String, u32, NaturalOrder, SmallRng> = SkipMap::with_rng(make_rng());
        map.insert("€€€€".to_string(), 1);
        map.insert("日本語のキーです長い".to_string(), 2);

        let mut out = Vec::new();
        map.dump(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.contains('€'));
        assert!(text.contains("-*"));
    }

    #[test]
    fn debug_formats_as_map() {
        let mut map = make_map();
        map.insert(1, "one".into());

        assert_eq!(format!("{:?}", map), "{1: \"one\"}");
    }

    // ========================================================================
    // Scenarios
    // ========================================================================

    #[test]
    fn narrow_link_width_round_trips() {
        let mut map: SkipMap<u64, u64, NaturalOrder, SmallRng, u16> =
            SkipMap::with_comparator_and_rng(NaturalOrder, make_rng());

        for k in 0..200 {
            map.insert(k, k * 2);
        }
        map.remove(&77);

        assert_eq!(map.len(), 199);
        assert_eq!(map.get(&76), Some(&152));
        assert!(!map.contains_key(&77));
        map.check_invariants();
    }

    #[test]
    fn scenario_insert_remove_lookup() {
        let mut map: SkipMap<i32, i32, NaturalOrder, SmallRng> = SkipMap::with_rng(make_rng());

        for k in [5, 3, 8, 1, 4] {
            map.insert(k, k * 10);
        }

        let keys: Vec<_> = map.keys().copied().collect();
        assert_eq!(keys, vec![1, 3, 4, 5, 8]);
        assert_eq!(map.get(&8), Some(&80));

        assert_eq!(map.remove(&3), Some(30));
        assert!(!map.contains_key(&3));
        assert_eq!(map.len(), 4);
        map.check_invariants();
    }

    #[test]
    fn ten_thousand_random_keys_round_trip() {
        let mut key_rng = SmallRng::seed_from_u64(777);
        let mut map: SkipMap<u64, u64, NaturalOrder, SmallRng> = SkipMap::with_rng(make_rng());
        let mut expected = HashMap::new();

        while expected.len() < 10_000 {
            let key = key_rng.next_u64();
            let value = key_rng.next_u64();
            expected.insert(key, value);
            map.insert(key, value);
        }

        assert_eq!(map.len(), expected.len());
        for (key, value) in &expected {
            assert_eq!(map.get(key), Some(value));
        }

        let keys: Vec<_> = map.keys().copied().collect();
        let mut sorted: Vec<_> = expected.keys().copied().collect();
        sorted.sort_unstable();
        assert_eq!(keys, sorted);
    }

    #[test]
    fn invariants_hold_through_mixed_workload() {
        let mut rng = SmallRng::seed_from_u64(42);
        let mut map: SkipMap<u64, u64, NaturalOrder, SmallRng> = SkipMap::with_rng(make_rng());

        for round in 0..500 {
            let key = rng.next_u64() % 128;
            if round % 3 == 0 {
                map.remove(&key);
            } else {
                map.insert(key, round);
            }
            map.check_invariants();
        }
    }
}
