//! Key ordering strategies.
//!
//! An [`OrderedMap`](crate::map::OrderedMap) never relies on the intrinsic
//! layout of its backing hash table. Instead, every ordered read is driven by
//! a [`KeyOrder`] supplied once at construction. Two maps holding the same
//! entries and using the same strategy always present their keys in the same
//! sequence, on every machine.
//!
//! - [`Lexicographic`]: byte-wise ordering of string-like keys
//! - [`Natural`]: the key type's own [`Ord`] implementation
//! - [`Composite`]: primary field first, secondary field as tie-break
//! - [`Reversed`]: the descending view of another strategy
//! - [`FnOrder`]: an arbitrary strict "less than" closure
//!
//! # Contract
//!
//! A strategy must be a strict total order over the keys it will see:
//! irreflexive, transitive, and with exactly one of `a < b`, `b < a`, `a == b`
//! holding for every pair. Violations are not detected; the resulting order
//! is unspecified and sorting may panic.
//!
//! # Examples
//!
//! ```rust
//! use detmap::order::{KeyOrder, Lexicographic, Reversed};
//! use std::cmp::Ordering;
//!
//! assert!(Lexicographic.is_less("alpha", "beta"));
//! assert_eq!(Reversed(Lexicographic).ordering("alpha", "beta"), Ordering::Greater);
//! ```

mod composite;

pub use composite::{Composite, CompositeKey};

use std::cmp::Ordering;
use std::fmt;

// =============================================================================
// KeyOrder
// =============================================================================

/// A strict ordering over keys of type `K`.
///
/// Only [`is_less`](KeyOrder::is_less) is required. [`ordering`](KeyOrder::ordering)
/// is derived from it and may be overridden when a cheaper three-way
/// comparison exists.
pub trait KeyOrder<K: ?Sized> {
    /// Returns `true` if `left` sorts strictly before `right`.
    fn is_less(&self, left: &K, right: &K) -> bool;

    /// Returns the three-way comparison of `left` and `right`.
    fn ordering(&self, left: &K, right: &K) -> Ordering {
        if self.is_less(left, right) {
            Ordering::Less
        } else if self.is_less(right, left) {
            Ordering::Greater
        } else {
            Ordering::Equal
        }
    }
}

impl<K: ?Sized, O: KeyOrder<K> + ?Sized> KeyOrder<K> for &O {
    #[inline]
    fn is_less(&self, left: &K, right: &K) -> bool {
        (**self).is_less(left, right)
    }

    #[inline]
    fn ordering(&self, left: &K, right: &K) -> Ordering {
        (**self).ordering(left, right)
    }
}

impl<K: ?Sized, O: KeyOrder<K> + ?Sized> KeyOrder<K> for Box<O> {
    #[inline]
    fn is_less(&self, left: &K, right: &K) -> bool {
        (**self).is_less(left, right)
    }

    #[inline]
    fn ordering(&self, left: &K, right: &K) -> Ordering {
        (**self).ordering(left, right)
    }
}

// =============================================================================
// Built-in Strategies
// =============================================================================

/// Byte-wise lexicographic ordering of string-like keys.
///
/// Comparison is performed on the UTF-8 bytes, so it is independent of
/// locale and collation settings.
///
/// # Examples
///
/// ```rust
/// use detmap::order::{KeyOrder, Lexicographic};
///
/// assert!(Lexicographic.is_less(&"B".to_string(), &"a".to_string()));
/// assert!(!Lexicographic.is_less("a", "a"));
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Lexicographic;

impl<K: AsRef<str> + ?Sized> KeyOrder<K> for Lexicographic {
    #[inline]
    fn is_less(&self, left: &K, right: &K) -> bool {
        left.as_ref().as_bytes() < right.as_ref().as_bytes()
    }

    #[inline]
    fn ordering(&self, left: &K, right: &K) -> Ordering {
        left.as_ref().as_bytes().cmp(right.as_ref().as_bytes())
    }
}

/// Orders keys by their own [`Ord`] implementation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Natural;

impl<K: Ord + ?Sized> KeyOrder<K> for Natural {
    #[inline]
    fn is_less(&self, left: &K, right: &K) -> bool {
        left < right
    }

    #[inline]
    fn ordering(&self, left: &K, right: &K) -> Ordering {
        left.cmp(right)
    }
}

/// Reverses another strategy.
///
/// # Examples
///
/// ```rust
/// use detmap::order::{KeyOrder, Natural, Reversed};
///
/// let descending = Reversed(Natural);
/// assert!(descending.is_less(&3, &1));
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Reversed<O>(pub O);

impl<K: ?Sized, O: KeyOrder<K>> KeyOrder<K> for Reversed<O> {
    #[inline]
    fn is_less(&self, left: &K, right: &K) -> bool {
        self.0.is_less(right, left)
    }

    #[inline]
    fn ordering(&self, left: &K, right: &K) -> Ordering {
        self.0.ordering(right, left)
    }
}

/// Adapts a "strictly less than" closure into a [`KeyOrder`].
///
/// # Examples
///
/// ```rust
/// use detmap::order::{FnOrder, KeyOrder};
///
/// let by_length = FnOrder::new(|left: &String, right: &String| {
///     (left.len(), left) < (right.len(), right)
/// });
/// assert!(by_length.is_less(&"zz".to_string(), &"aaa".to_string()));
/// ```
#[derive(Clone, Copy)]
pub struct FnOrder<F> {
    less: F,
}

impl<F> FnOrder<F> {
    /// Wraps `less`, which must implement a strict total order.
    #[inline]
    pub const fn new(less: F) -> Self {
        Self { less }
    }
}

impl<K: ?Sized, F: Fn(&K, &K) -> bool> KeyOrder<K> for FnOrder<F> {
    #[inline]
    fn is_less(&self, left: &K, right: &K) -> bool {
        (self.less)(left, right)
    }
}

impl<F> fmt::Debug for FnOrder<F> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("FnOrder")
    }
}

// =============================================================================
// Tests
// =============================================================================
