//! Order cache maintenance policies.

use std::fmt;

/// How an [`OrderedMap`](super::OrderedMap) keeps its key order in step with
/// its backing store after a mutation.
///
/// Every policy produces the same observable order; they differ only in when
/// the sorting work is paid for. Overwriting the value of an existing key
/// never touches the order under any policy.
///
/// | Policy        | insert (new key) | remove     | next ordered read      |
/// |---------------|------------------|------------|------------------------|
/// | `Incremental` | O(n)             | O(n)       | O(1)                   |
/// | `Rebuild`     | O(n log n)       | O(n log n) | O(1)                   |
/// | `Deferred`    | O(1)             | O(1)       | O(n log n) when stale  |
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Maintenance {
    /// Binary-search the insertion point and shift the positions of every
    /// later key; repair the position index in place on removal.
    #[default]
    Incremental,
    /// Re-sort every key and rebuild the position index after each
    /// structural mutation.
    Rebuild,
    /// Mark the order stale and rebuild it on the next ordered read.
    Deferred,
}

impl Maintenance {
    /// Returns `true` if a structural mutation leaves the order stale.
    #[inline]
    #[must_use]
    pub const fn is_lazy(self) -> bool {
        matches!(self, Self::Deferred)
    }
}

impl fmt::Display for Maintenance {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Incremental => "incremental",
            Self::Rebuild => "rebuild",
            Self::Deferred => "deferred",
        };
        formatter.write_str(name)
    }
}
