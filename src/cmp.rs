//! Key ordering for the map.
//!
//! The map is ordered by a [`Comparator`] rather than a hard `K: Ord` bound,
//! so callers can supply a custom total order (any `Fn(&K, &K) -> Ordering`
//! closure works). [`NaturalOrder`] delegates to `Ord` and is the default.

use core::cmp::Ordering;
use core::fmt::Display;

/// A total order over keys of type `K`.
///
/// Implementations must be consistent: for any `a`, `b`, `c`, the order must
/// be antisymmetric and transitive, and must not change while keys are in
/// the map.
pub trait Comparator<K> {
    /// Compares two keys.
    fn cmp(&self, a: &K, b: &K) -> Ordering;
}

/// The default comparator: delegates to `K: Ord`.
#[derive(Debug, Default, Clone, Copy)]
pub struct NaturalOrder;

impl<K: Ord> Comparator<K> for NaturalOrder {
    #[inline]
    fn cmp(&self, a: &K, b: &K) -> Ordering {
        a.cmp(b)
    }
}

/// Orders keys by their `Display` rendering.
///
/// This reproduces a legacy fallback ordering and is kept for compatibility
/// only. It allocates two strings per comparison and orders numbers
/// lexicographically (`10` before `2`), so it is opt-in and not recommended
/// for new code. Prefer [`NaturalOrder`] or a custom closure.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisplayOrder;

impl<K: Display> Comparator<K> for DisplayOrder {
    fn cmp(&self, a: &K, b: &K) -> Ordering {
        a.to_string().cmp(&b.to_string())
    }
}

impl<K, F> Comparator<K> for F
where
    F: Fn(&K, &K) -> Ordering,
{
    #[inline]
    fn cmp(&self, a: &K, b: &K) -> Ordering {
        self(a, b)
    }
}
