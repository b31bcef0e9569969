//! Field-by-field ordering for composite keys.

use super::KeyOrder;
use std::cmp::Ordering;

/// A key made of a primary and a secondary component.
///
/// [`Composite`] compares the primary components first and falls back to the
/// secondary components only when the primaries are equal.
///
/// Two-element tuples implement this trait out of the box.
///
/// # Examples
///
/// ```rust
/// use detmap::order::{Composite, CompositeKey, KeyOrder};
///
/// struct Route {
///     origin: String,
///     destination: String,
/// }
///
/// impl CompositeKey for Route {
///     type Primary = str;
///     type Secondary = str;
///
///     fn primary(&self) -> &str {
///         &self.origin
///     }
///
///     fn secondary(&self) -> &str {
///         &self.destination
///     }
/// }
///
/// let first = Route { origin: "ams".into(), destination: "nrt".into() };
/// let second = Route { origin: "ams".into(), destination: "sfo".into() };
/// assert!(Composite.is_less(&first, &second));
/// ```
pub trait CompositeKey {
    /// The component compared first.
    type Primary: Ord + ?Sized;
    /// The tie-break component.
    type Secondary: Ord + ?Sized;

    /// Returns the primary component.
    fn primary(&self) -> &Self::Primary;

    /// Returns the secondary component.
    fn secondary(&self) -> &Self::Secondary;
}

impl<A: Ord, B: Ord> CompositeKey for (A, B) {
    type Primary = A;
    type Secondary = B;

    #[inline]
    fn primary(&self) -> &A {
        &self.0
    }

    #[inline]
    fn secondary(&self) -> &B {
        &self.1
    }
}

/// Orders [`CompositeKey`]s by primary component, then secondary component.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Composite;

impl<K: CompositeKey + ?Sized> KeyOrder<K> for Composite {
    #[inline]
    fn is_less(&self, left: &K, right: &K) -> bool {
        self.ordering(left, right) == Ordering::Less
    }

    #[inline]
    fn ordering(&self, left: &K, right: &K) -> Ordering {
        left.primary()
            .cmp(right.primary())
            .then_with(|| left.secondary().cmp(right.secondary()))
    }
}
