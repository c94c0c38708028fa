//! Probabilistic ordered map (skip list) backed by an index arena.
//!
//! [`SkipMap`] keeps entries in sorted key order with O(log n) expected
//! insert, lookup, and removal, and no rebalancing. Balance comes from
//! randomized node heights drawn from a per-instance generator, so a seeded
//! generator makes the structure fully deterministic in tests.
//!
//! Nodes live in a growable [`Arena`] and reference each other by index
//! rather than by pointer, which keeps multi-level relinking free of
//! aliasing and dangling-reference hazards.
//!
//! # Quick Start
//!
//! ```
//! use skipmap::SkipMap;
//!
//! let mut map: SkipMap<u64, &str> = SkipMap::new();
//!
//! map.insert(5, "five");
//! map.insert(3, "three");
//! map.insert(8, "eight");
//!
//! assert_eq!(map.get(&3), Some(&"three"));
//! assert_eq!(map.len(), 3);
//!
//! // Iteration is always in key order.
//! let keys: Vec<_> = map.keys().copied().collect();
//! assert_eq!(keys, vec![3, 5, 8]);
//!
//! assert_eq!(map.remove(&5), Some("five"));
//! assert!(!map.contains_key(&5));
//! ```
//!
//! # Custom ordering
//!
//! The order is supplied by a [`Comparator`]; the default [`NaturalOrder`]
//! delegates to `Ord`. Any `Fn(&K, &K) -> Ordering` closure works too:
//!
//! ```
//! use skipmap::SkipMap;
//!
//! let mut map = SkipMap::<u32, &str, _>::with_comparator(|a: &u32, b: &u32| b.cmp(a));
//! map.insert(1, "one");
//! map.insert(2, "two");
//!
//! let keys: Vec<_> = map.keys().copied().collect();
//! assert_eq!(keys, vec![2, 1]); // descending
//! ```
//!
//! # Concurrency
//!
//! A map is single-threaded: operations touch several per-level links
//! non-atomically, so concurrent mutation needs external locking around the
//! whole map. Iterators are lazy one-shot walks with no snapshot isolation.

#![warn(missing_docs)]

pub mod arena;
pub mod cmp;
pub mod error;
pub mod map;

pub use arena::{Arena, Link};
pub use cmp::{Comparator, DisplayOrder, NaturalOrder};
pub use error::KeyNotFound;
pub use map::{Iter, IterMut, Keys, SkipMap, Values};
