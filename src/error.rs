//! Error types for checked map access.

/// Error returned by [`SkipMap::try_get`](crate::SkipMap::try_get) when the
/// key is not in the map.
///
/// `contains_key` and `remove` never produce this error; they report absence
/// through `bool` and `Option` returns instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyNotFound;

impl core::fmt::Display for KeyNotFound {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "key not found")
    }
}

impl std::error::Error for KeyNotFound {}
