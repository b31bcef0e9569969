//! Deterministically ordered hash map.
//!
//! This module provides [`OrderedMap`], a hash map whose keys are always
//! presented in the order defined by a caller-supplied
//! [`KeyOrder`](crate::order::KeyOrder) strategy, independent of hash layout,
//! hasher seed, or insertion history.
//!
//! # Overview
//!
//! The map is made of three parts:
//!
//! - **Backing store**: a `HashMap<K, V, S>`, the source of truth for
//!   membership and values.
//! - **Order cache**: the keys sorted by the strategy, plus an inverse
//!   key-to-position index. A validity flag records whether the cache
//!   reflects the store.
//! - **Strategy**: fixed at construction and never replaced.
//!
//! While the cache is valid:
//!
//! 1. the ordered keys are exactly the keys of the store, each once
//! 2. they are sorted ascending by the strategy
//! 3. the position index maps every key to its slot in the ordered keys
//!
//! Ordered reads (`keys`, `iter`, `entries`, `position`, ...) take
//! `&mut self` because they may have to rebuild a stale cache first.
//! [`OrderedMap::ensure_order`] is the only place that happens.
//!
//! # Time Complexity
//!
//! | Operation      | Complexity                                     |
//! |----------------|------------------------------------------------|
//! | `contains_key` | O(1) expected                                  |
//! | `get`          | O(1) expected                                  |
//! | `len`          | O(1)                                           |
//! | `insert`       | see [`Maintenance`] (O(1) when overwriting)    |
//! | `remove`       | see [`Maintenance`]                            |
//! | `keys`         | O(1), O(n log n) when stale                    |
//! | `position`     | O(1) expected, O(n log n) when stale           |
//!
//! # Examples
//!
//! ```rust
//! use detmap::map::OrderedMap;
//! use detmap::order::Lexicographic;
//!
//! let mut map: OrderedMap<String, u32, Lexicographic> = OrderedMap::new();
//! map.insert("b".to_string(), 2);
//! map.insert("a".to_string(), 1);
//! map.insert("c".to_string(), 3);
//! assert_eq!(map.keys(), ["a", "b", "c"]);
//!
//! map.remove("b");
//! assert_eq!(map.keys(), ["a", "c"]);
//! assert_eq!(map.position("c"), Some(1));
//! ```

mod iter;
mod maintenance;

pub use iter::{Entries, IntoIter, Keys, Values};
pub use maintenance::Maintenance;

use crate::order::{KeyOrder, Lexicographic};
use std::borrow::{Borrow, Cow};
use std::collections::HashMap;
use std::fmt;
use std::hash::{BuildHasher, Hash, Hasher};
use std::mem;

// =============================================================================
// Hasher Selection
// =============================================================================

/// Hasher used by the backing store when none is named.
///
/// The hasher only affects lookup speed; it never influences observable order.
#[cfg(feature = "fxhash")]
pub type DefaultHashBuilder = rustc_hash::FxBuildHasher;

/// Hasher used by the backing store when none is named.
///
/// The hasher only affects lookup speed; it never influences observable order.
#[cfg(all(feature = "ahash", not(feature = "fxhash")))]
pub type DefaultHashBuilder = ahash::RandomState;

/// Hasher used by the backing store when none is named.
///
/// The hasher only affects lookup speed; it never influences observable order.
#[cfg(not(any(feature = "fxhash", feature = "ahash")))]
pub type DefaultHashBuilder = std::collections::hash_map::RandomState;

/// An [`OrderedMap`] over `String` keys in byte-wise lexicographic order.
pub type StringMap<V, S = DefaultHashBuilder> = OrderedMap<String, V, Lexicographic, S>;

// =============================================================================
// OrderedMap Definition
// =============================================================================

/// A hash map that iterates its keys in a deterministic, strategy-defined order.
///
/// # Type Parameters
///
/// * `K` - The key type. Must implement `Clone`, `Eq` and `Hash`.
/// * `V` - The value type.
/// * `O` - The [`KeyOrder`] strategy.
/// * `S` - The hasher of the backing store.
///
/// The map performs no internal locking. Mutations must be serialized by the
/// caller, which the `&mut self` receivers already enforce within safe Rust.
///
/// # Examples
///
/// ```rust
/// use detmap::map::OrderedMap;
/// use detmap::order::Natural;
/// use std::collections::HashMap;
///
/// let data: HashMap<u32, &str> = [(3, "c"), (1, "a"), (2, "b")].into_iter().collect();
/// let mut map = OrderedMap::build_from(data, Natural);
///
/// let keys: Vec<u32> = map.iter().copied().collect();
/// assert_eq!(keys, vec![1, 2, 3]);
/// ```
///
/// Ordered traversal borrows the map, so it cannot be mutated mid-traversal:
///
/// ```compile_fail
/// use detmap::map::StringMap;
///
/// let mut map: StringMap<u32> = StringMap::new();
/// map.insert("a".to_string(), 1);
/// for key in map.iter() {
///     map.remove(key);
/// }
/// ```
#[derive(Clone)]
pub struct OrderedMap<K, V, O, S = DefaultHashBuilder> {
    /// Source of truth for membership and values.
    store: HashMap<K, V, S>,
    /// Keys sorted by `order`. Valid only while `ordered` is set.
    ordered_keys: Vec<K>,
    /// Inverse of `ordered_keys`. Valid only while `ordered` is set.
    key_positions: HashMap<K, usize, S>,
    ordered: bool,
    order: O,
    maintenance: Maintenance,
}

static_assertions::assert_impl_all!(OrderedMap<String, u64, Lexicographic>: Send, Sync, Clone);

impl<K, V, O, S> OrderedMap<K, V, O, S> {
    /// Returns the number of entries in the map.
    ///
    /// # Complexity
    ///
    /// O(1)
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// Returns `true` if the map contains no entries.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Returns the ordering strategy the map was built with.
    ///
    /// There is no way to replace it: a different strategy would silently
    /// reorder every previously observed traversal.
    #[inline]
    #[must_use]
    pub const fn order(&self) -> &O {
        &self.order
    }

    /// Returns the maintenance policy the map was built with.
    #[inline]
    #[must_use]
    pub const fn maintenance(&self) -> Maintenance {
        self.maintenance
    }

    /// Returns `true` if the order cache currently reflects the backing store.
    #[inline]
    #[must_use]
    pub const fn is_ordered(&self) -> bool {
        self.ordered
    }

    /// Consumes the map and returns the backing store.
    #[must_use]
    pub fn into_inner(self) -> HashMap<K, V, S> {
        self.store
    }
}

impl<K, V, O, S: Default> OrderedMap<K, V, O, S> {
    /// Creates an empty map ordered by `order`, using the default
    /// [`Maintenance`] policy.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use detmap::map::OrderedMap;
    /// use detmap::order::{Natural, Reversed};
    ///
    /// let mut map: OrderedMap<i32, (), _> = OrderedMap::with_order(Reversed(Natural));
    /// map.insert(1, ());
    /// map.insert(2, ());
    /// assert_eq!(map.keys(), [2, 1]);
    /// ```
    #[must_use]
    pub fn with_order(order: O) -> Self {
        Self::with_order_and_maintenance(order, Maintenance::default())
    }

    /// Creates an empty map ordered by `order` and maintained by `maintenance`.
    #[must_use]
    pub fn with_order_and_maintenance(order: O, maintenance: Maintenance) -> Self {
        Self {
            store: HashMap::default(),
            ordered_keys: Vec::new(),
            key_positions: HashMap::default(),
            ordered: true,
            order,
            maintenance,
        }
    }
}

impl<K, V, O: Default, S: Default> OrderedMap<K, V, O, S> {
    /// Creates an empty map with the default strategy and policy.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::with_order(O::default())
    }
}

impl<K, V, O, S> OrderedMap<K, V, O, S>
where
    K: Clone + Eq + Hash,
    O: KeyOrder<K>,
    S: BuildHasher,
{
    /// Builds a map from an existing unordered mapping.
    ///
    /// The order is computed eagerly, so the returned map is ready for
    /// ordered reads.
    ///
    /// # Panics
    ///
    /// May panic if `order` is not a strict total order over the keys.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use detmap::map::OrderedMap;
    /// use detmap::order::Lexicographic;
    /// use std::collections::HashMap;
    ///
    /// let mut data = HashMap::new();
    /// data.insert("validator-b".to_string(), 20_u64);
    /// data.insert("validator-a".to_string(), 10_u64);
    ///
    /// let mut map = OrderedMap::build_from(data, Lexicographic);
    /// assert!(map.is_ordered());
    /// assert_eq!(map.keys(), ["validator-a", "validator-b"]);
    /// ```
    #[must_use]
    pub fn build_from(data: HashMap<K, V, S>, order: O) -> Self
    where
        S: Clone,
    {
        Self::build_from_with_maintenance(data, order, Maintenance::default())
    }

    /// Builds a map from an existing unordered mapping with an explicit
    /// maintenance policy.
    ///
    /// The order is computed eagerly under every policy.
    #[must_use]
    pub fn build_from_with_maintenance(
        data: HashMap<K, V, S>,
        order: O,
        maintenance: Maintenance,
    ) -> Self
    where
        S: Clone,
    {
        let key_positions = HashMap::with_capacity_and_hasher(data.len(), data.hasher().clone());
        let mut map = Self {
            store: data,
            ordered_keys: Vec::new(),
            key_positions,
            ordered: false,
            order,
            maintenance,
        };
        map.rebuild();
        map
    }

    /// Returns `true` if the map contains `key`.
    ///
    /// Never touches the order cache.
    #[inline]
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.store.contains_key(key)
    }

    /// Returns a reference to the value stored under `key`.
    #[inline]
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.store.get(key)
    }

    /// Returns a mutable reference to the value stored under `key`.
    ///
    /// Values never influence order, so this leaves the cache untouched.
    #[inline]
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.store.get_mut(key)
    }

    /// Inserts `value` under `key`, returning the previous value if the key
    /// was already present.
    ///
    /// A new key is placed according to the map's [`Maintenance`] policy.
    /// Overwriting an existing key keeps the order untouched.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use detmap::map::StringMap;
    ///
    /// let mut map: StringMap<i32> = StringMap::new();
    /// assert_eq!(map.insert("d".to_string(), 4), None);
    /// assert_eq!(map.insert("d".to_string(), 40), Some(4));
    /// assert_eq!(map.get("d"), Some(&40));
    /// ```
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        if let Some(slot) = self.store.get_mut(&key) {
            return Some(mem::replace(slot, value));
        }
        match self.maintenance {
            Maintenance::Incremental if self.ordered => {
                self.store.insert(key.clone(), value);
                self.insert_ordered(key);
            }
            Maintenance::Rebuild => {
                self.store.insert(key, value);
                self.rebuild();
            }
            Maintenance::Incremental | Maintenance::Deferred => {
                self.store.insert(key, value);
                self.invalidate();
            }
        }
        None
    }

    /// Removes `key` from the map, returning its value.
    ///
    /// Removing an absent key is a no-op and returns `None`.
    ///
    /// Every key that sat after the removed one moves up by one position, and
    /// the position index is kept in step with that shift.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use detmap::map::StringMap;
    ///
    /// let mut map: StringMap<i32> = [("a", 1), ("b", 2), ("c", 3)]
    ///     .into_iter()
    ///     .map(|(key, value)| (key.to_string(), value))
    ///     .collect();
    ///
    /// assert_eq!(map.remove("b"), Some(2));
    /// assert_eq!(map.remove("b"), None);
    /// assert_eq!(map.position("c"), Some(1));
    /// ```
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let value = self.store.remove(key)?;
        match self.maintenance {
            Maintenance::Incremental if self.ordered => self.remove_ordered(key),
            Maintenance::Rebuild => self.rebuild(),
            Maintenance::Incremental | Maintenance::Deferred => self.invalidate(),
        }
        Some(value)
    }

    /// Retains only the entries for which `keep` returns `true`.
    pub fn retain<F>(&mut self, keep: F)
    where
        F: FnMut(&K, &mut V) -> bool,
    {
        let before = self.store.len();
        self.store.retain(keep);
        if self.store.len() != before {
            self.invalidate();
            self.settle();
        }
    }

    /// Removes every entry. The empty order is trivially valid.
    pub fn clear(&mut self) {
        self.store.clear();
        self.ordered_keys.clear();
        self.key_positions.clear();
        self.ordered = true;
    }

    /// Rebuilds the order cache if it is stale.
    ///
    /// Every ordered read goes through here; staleness is never resolved
    /// partially.
    ///
    /// # Panics
    ///
    /// May panic if the strategy is not a strict total order over the keys.
    pub fn ensure_order(&mut self) {
        if !self.ordered {
            self.rebuild();
        }
    }

    /// Returns the keys in ascending order.
    ///
    /// Calling this twice without an intervening mutation returns the same
    /// sequence both times.
    pub fn keys(&mut self) -> &[K] {
        self.ensure_order();
        &self.ordered_keys
    }

    /// Returns the zero-based position of `key` in the ordered keys.
    pub fn position<Q>(&mut self, key: &Q) -> Option<usize>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.ensure_order();
        self.key_positions.get(key).copied()
    }

    /// Returns a lazy, single-pass iterator over the keys in ascending order.
    ///
    /// Keys are produced on demand; stopping early leaves the rest untouched.
    /// Dropping the iterator is all it takes to abandon a traversal. A fresh
    /// call reflects the map's current contents.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use detmap::map::StringMap;
    ///
    /// let mut map: StringMap<u8> = StringMap::new();
    /// for (key, value) in [("b", 2), ("a", 1), ("c", 3)] {
    ///     map.insert(key.to_string(), value);
    /// }
    ///
    /// let first = map.iter().next().cloned();
    /// assert_eq!(first.as_deref(), Some("a"));
    /// ```
    pub fn iter(&mut self) -> Keys<'_, K> {
        self.ensure_order();
        Keys::new(&self.ordered_keys)
    }

    /// Returns a lazy iterator over `(key, value)` pairs in key order.
    pub fn entries(&mut self) -> Entries<'_, K, V, S> {
        self.ensure_order();
        Entries::new(&self.ordered_keys, &self.store)
    }

    /// Returns a lazy iterator over the values in key order.
    pub fn values(&mut self) -> Values<'_, K, V, S> {
        Values::new(self.entries())
    }

    /// Returns the entry at `index` in key order.
    pub fn get_index(&mut self, index: usize) -> Option<(&K, &V)> {
        self.ensure_order();
        let key = self.ordered_keys.get(index)?;
        self.store.get_key_value(key)
    }

    /// Returns the entry with the smallest key.
    pub fn first(&mut self) -> Option<(&K, &V)> {
        self.get_index(0)
    }

    /// Returns the entry with the largest key.
    pub fn last(&mut self) -> Option<(&K, &V)> {
        let index = self.len().checked_sub(1)?;
        self.get_index(index)
    }

    /// Returns the entries in key order, cloned into a `Vec`.
    pub fn to_sorted_vec(&mut self) -> Vec<(K, V)>
    where
        V: Clone,
    {
        self.entries()
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }

    /// Consumes the map and returns its entries in key order.
    pub fn into_sorted_vec(mut self) -> Vec<(K, V)> {
        self.ensure_order();
        let keys = mem::take(&mut self.ordered_keys);
        keys.into_iter()
            .filter_map(|key| self.store.remove(&key).map(|value| (key, value)))
            .collect()
    }

    // =========================================================================
    // Order Cache Maintenance
    // =========================================================================

    fn rebuild(&mut self) {
        let mut keys: Vec<K> = self.store.keys().cloned().collect();
        let order = &self.order;
        keys.sort_by(|left, right| order.ordering(left, right));
        self.install_order(keys);
    }

    fn install_order(&mut self, keys: Vec<K>) {
        self.key_positions.clear();
        self.key_positions.reserve(keys.len());
        for (position, key) in keys.iter().enumerate() {
            self.key_positions.insert(key.clone(), position);
        }
        self.ordered_keys = keys;
        self.ordered = true;
        tracing::trace!(
            entries = self.ordered_keys.len(),
            maintenance = %self.maintenance,
            "rebuilt key order"
        );
    }

    fn insert_ordered(&mut self, key: K) {
        let order = &self.order;
        let position = self
            .ordered_keys
            .partition_point(|existing| order.is_less(existing, &key));
        for shifted in &self.ordered_keys[position..] {
            if let Some(slot) = self.key_positions.get_mut(shifted) {
                *slot += 1;
            }
        }
        self.key_positions.insert(key.clone(), position);
        self.ordered_keys.insert(position, key);
    }

    fn remove_ordered<Q>(&mut self, key: &Q)
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let Some(position) = self.key_positions.remove(key) else {
            self.invalidate();
            return;
        };
        self.ordered_keys.remove(position);
        self.shift_positions_down(position);
    }

    /// Decrements the stored position of every key from `start` onwards.
    fn shift_positions_down(&mut self, start: usize) {
        for shifted in &self.ordered_keys[start..] {
            if let Some(slot) = self.key_positions.get_mut(shifted) {
                *slot -= 1;
            }
        }
    }

    fn invalidate(&mut self) {
        if self.ordered {
            self.ordered = false;
            tracing::trace!(
                entries = self.store.len(),
                maintenance = %self.maintenance,
                "key order marked stale"
            );
        }
    }

    /// Applies the policy after a bulk mutation left the cache stale.
    fn settle(&mut self) {
        if !self.maintenance.is_lazy() {
            self.ensure_order();
        }
    }

    /// Ordered keys for `&self` readers, sorted on the spot when stale.
    fn sorted_snapshot(&self) -> Cow<'_, [K]> {
        if self.ordered {
            Cow::Borrowed(&self.ordered_keys)
        } else {
            let mut keys: Vec<K> = self.store.keys().cloned().collect();
            keys.sort_by(|left, right| self.order.ordering(left, right));
            Cow::Owned(keys)
        }
    }
}

#[cfg(feature = "rayon")]
impl<K, V, O, S> OrderedMap<K, V, O, S>
where
    K: Clone + Eq + Hash + Send,
    O: KeyOrder<K> + Sync,
    S: BuildHasher,
{
    /// Rebuilds a stale order cache, sorting on the rayon thread pool.
    ///
    /// Produces exactly the order [`ensure_order`](Self::ensure_order) would.
    pub fn par_ensure_order(&mut self) {
        use rayon::slice::ParallelSliceMut;

        if self.ordered {
            return;
        }
        let mut keys: Vec<K> = self.store.keys().cloned().collect();
        let order = &self.order;
        keys.par_sort_by(|left, right| order.ordering(left, right));
        self.install_order(keys);
    }
}

// =============================================================================
// Standard Trait Implementations
// =============================================================================

impl<K, V, O: Default, S: Default> Default for OrderedMap<K, V, O, S> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, O, S> FromIterator<(K, V)> for OrderedMap<K, V, O, S>
where
    K: Clone + Eq + Hash,
    O: KeyOrder<K> + Default,
    S: BuildHasher + Default + Clone,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(entries: I) -> Self {
        let store: HashMap<K, V, S> = entries.into_iter().collect();
        Self::build_from(store, O::default())
    }
}

impl<K, V, O, S> Extend<(K, V)> for OrderedMap<K, V, O, S>
where
    K: Clone + Eq + Hash,
    O: KeyOrder<K>,
    S: BuildHasher,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, entries: I) {
        let before = self.store.len();
        self.store.extend(entries);
        if self.store.len() != before {
            self.invalidate();
            self.settle();
        }
    }
}

impl<K, V, O, S> IntoIterator for OrderedMap<K, V, O, S>
where
    K: Clone + Eq + Hash,
    O: KeyOrder<K>,
    S: BuildHasher,
{
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter::new(self.into_sorted_vec())
    }
}

/// Maps are equal when they hold the same entries in the same order. The
/// policy is not compared, so maps whose strategies disagree on these keys
/// are unequal even when their entries match.
impl<K, V, O, S> PartialEq for OrderedMap<K, V, O, S>
where
    K: Clone + Eq + Hash,
    V: PartialEq,
    O: KeyOrder<K>,
    S: BuildHasher,
{
    fn eq(&self, other: &Self) -> bool {
        if self.store != other.store {
            return false;
        }
        let keys = self.sorted_snapshot();
        let other_keys = other.sorted_snapshot();
        keys.iter().eq(other_keys.iter())
    }
}

impl<K, V, O, S> Eq for OrderedMap<K, V, O, S>
where
    K: Clone + Eq + Hash,
    V: Eq,
    O: KeyOrder<K>,
    S: BuildHasher,
{
}

/// Hashes the length, then every entry in key order.
impl<K, V, O, S> Hash for OrderedMap<K, V, O, S>
where
    K: Clone + Eq + Hash,
    V: Hash,
    O: KeyOrder<K>,
    S: BuildHasher,
{
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.len().hash(state);
        for key in self.sorted_snapshot().iter() {
            if let Some(value) = self.store.get(key) {
                key.hash(state);
                value.hash(state);
            }
        }
    }
}

impl<K, V, O, S> fmt::Debug for OrderedMap<K, V, O, S>
where
    K: Clone + Eq + Hash + fmt::Debug,
    V: fmt::Debug,
    O: KeyOrder<K>,
    S: BuildHasher,
{
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let keys = self.sorted_snapshot();
        formatter
            .debug_map()
            .entries(keys.iter().filter_map(|key| self.store.get_key_value(key)))
            .finish()
    }
}

impl<K, V, O, S> fmt::Display for OrderedMap<K, V, O, S>
where
    K: Clone + Eq + Hash + fmt::Display,
    V: fmt::Display,
    O: KeyOrder<K>,
    S: BuildHasher,
{
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "{{")?;
        let mut first = true;
        for key in self.sorted_snapshot().iter() {
            let Some(value) = self.store.get(key) else {
                continue;
            };
            if first {
                first = false;
            } else {
                write!(formatter, ", ")?;
            }
            write!(formatter, "{key}: {value}")?;
        }
        write!(formatter, "}}")
    }
}

// =============================================================================
// Serde Support
// =============================================================================

#[cfg(feature = "serde")]
impl<K, V, O, S> serde::Serialize for OrderedMap<K, V, O, S>
where
    K: serde::Serialize + Clone + Eq + Hash,
    V: serde::Serialize,
    O: KeyOrder<K>,
    S: BuildHasher,
{
    fn serialize<Z>(&self, serializer: Z) -> Result<Z::Ok, Z::Error>
    where
        Z: serde::Serializer,
    {
        use serde::ser::SerializeMap;
        let keys = self.sorted_snapshot();
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for key in keys.iter() {
            if let Some(value) = self.store.get(key) {
                map.serialize_entry(key, value)?;
            }
        }
        map.end()
    }
}

#[cfg(feature = "serde")]
struct OrderedMapVisitor<K, V, O, S> {
    marker: std::marker::PhantomData<fn() -> (K, V, O, S)>,
}

#[cfg(feature = "serde")]
impl<'de, K, V, O, S> serde::de::Visitor<'de> for OrderedMapVisitor<K, V, O, S>
where
    K: serde::Deserialize<'de> + Clone + Eq + Hash,
    V: serde::Deserialize<'de>,
    O: KeyOrder<K> + Default,
    S: BuildHasher + Default + Clone,
{
    type Value = OrderedMap<K, V, O, S>;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a map")
    }

    fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
    where
        A: serde::de::MapAccess<'de>,
    {
        // Cap the preallocation; the hint comes from untrusted input.
        let capacity = access.size_hint().unwrap_or(0).min(4096);
        let mut store = HashMap::with_capacity_and_hasher(capacity, S::default());
        while let Some((key, value)) = access.next_entry()? {
            store.insert(key, value);
        }
        Ok(OrderedMap::build_from(store, O::default()))
    }
}

#[cfg(feature = "serde")]
impl<'de, K, V, O, S> serde::Deserialize<'de> for OrderedMap<K, V, O, S>
where
    K: serde::Deserialize<'de> + Clone + Eq + Hash,
    V: serde::Deserialize<'de>,
    O: KeyOrder<K> + Default,
    S: BuildHasher + Default + Clone,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        deserializer.deserialize_map(OrderedMapVisitor {
            marker: std::marker::PhantomData,
        })
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order::{FnOrder, Natural, Reversed};
    use rstest::rstest;
    use std::hash::DefaultHasher;

    fn assert_cache_consistent<K, V, O, S>(map: &OrderedMap<K, V, O, S>)
    where
        K: Clone + Eq + Hash + fmt::Debug,
        O: KeyOrder<K>,
        S: BuildHasher,
    {
        assert!(map.ordered, "cache should be valid");
        assert_eq!(map.ordered_keys.len(), map.store.len());
        assert_eq!(map.key_positions.len(), map.store.len());
        for (position, key) in map.ordered_keys.iter().enumerate() {
            assert!(map.store.contains_key(key), "stale key {key:?}");
            assert_eq!(map.key_positions.get(key), Some(&position), "{key:?}");
        }
        for window in map.ordered_keys.windows(2) {
            assert!(map.order.is_less(&window[0], &window[1]));
        }
    }

    fn string_map(maintenance: Maintenance) -> StringMap<i32> {
        StringMap::with_order_and_maintenance(Lexicographic, maintenance)
    }

    // =========================================================================
    // Insert Tests
    // =========================================================================

    #[rstest]
    #[case(Maintenance::Incremental)]
    #[case(Maintenance::Rebuild)]
    #[case(Maintenance::Deferred)]
    fn test_insert_sorts_keys(#[case] maintenance: Maintenance) {
        let mut map = string_map(maintenance);
        map.insert("b".to_string(), 2);
        map.insert("a".to_string(), 1);
        map.insert("c".to_string(), 3);

        assert_eq!(map.keys(), ["a", "b", "c"]);
        assert_cache_consistent(&map);
    }

    #[rstest]
    fn test_incremental_insert_shifts_positions() {
        let mut map = string_map(Maintenance::Incremental);
        map.insert("b".to_string(), 2);
        map.insert("d".to_string(), 4);
        map.insert("a".to_string(), 1);
        map.insert("c".to_string(), 3);

        assert!(map.is_ordered());
        assert_cache_consistent(&map);
        assert_eq!(map.position("d"), Some(3));
    }

    #[rstest]
    #[case(Maintenance::Incremental, true)]
    #[case(Maintenance::Rebuild, true)]
    #[case(Maintenance::Deferred, false)]
    fn test_insert_new_key_validity(#[case] maintenance: Maintenance, #[case] ordered: bool) {
        let mut map = string_map(maintenance);
        map.insert("a".to_string(), 1);
        assert_eq!(map.is_ordered(), ordered);
    }

    #[rstest]
    fn test_overwrite_keeps_cache_valid_under_deferred() {
        let mut map = string_map(Maintenance::Deferred);
        map.insert("a".to_string(), 1);
        map.ensure_order();

        assert_eq!(map.insert("a".to_string(), 10), Some(1));
        assert!(map.is_ordered());
        assert_eq!(map.get("a"), Some(&10));
    }

    // =========================================================================
    // Remove Tests
    // =========================================================================

    #[rstest]
    #[case(Maintenance::Incremental)]
    #[case(Maintenance::Rebuild)]
    #[case(Maintenance::Deferred)]
    fn test_remove_repairs_positions(#[case] maintenance: Maintenance) {
        let mut map = string_map(maintenance);
        for (key, value) in [("b", 2), ("a", 1), ("c", 3)] {
            map.insert(key.to_string(), value);
        }

        assert_eq!(map.remove("b"), Some(2));
        assert_eq!(map.keys(), ["a", "c"]);
        assert_eq!(map.position("c"), Some(1));
        assert_eq!(map.position("b"), None);
        assert_cache_consistent(&map);
    }

    #[rstest]
    fn test_consecutive_removes_use_repaired_positions() {
        let mut map: OrderedMap<u32, u32, Natural> = (0..10).map(|key| (key, key)).collect();

        map.remove(&2);
        map.remove(&7);
        map.remove(&0);
        map.remove(&9);

        assert_eq!(map.keys(), [1, 3, 4, 5, 6, 8]);
        assert_cache_consistent(&map);
    }

    #[rstest]
    fn test_remove_absent_key_is_noop() {
        let mut map = string_map(Maintenance::Incremental);
        map.insert("a".to_string(), 1);

        assert_eq!(map.remove("zzz"), None);
        assert!(map.is_ordered());
        assert_eq!(map.len(), 1);
        assert_cache_consistent(&map);
    }

    #[rstest]
    fn test_remove_by_borrowed_key_shifts_every_later_position() {
        let mut map = string_map(Maintenance::Incremental);
        for (value, key) in ["e", "a", "d", "b", "c"].into_iter().enumerate() {
            map.insert(key.to_string(), i32::try_from(value).unwrap());
        }

        let removed: &str = "a";
        map.remove(removed);
        assert_cache_consistent(&map);
        assert_eq!(map.position("b"), Some(0));
        assert_eq!(map.position("e"), Some(3));

        map.remove("c");
        assert_cache_consistent(&map);
        assert_eq!(map.keys(), ["b", "d", "e"]);
    }

    #[rstest]
    fn test_incremental_remove_on_stale_cache_stays_stale() {
        let mut map = string_map(Maintenance::Incremental);
        map.extend([("a".to_string(), 1)]);
        map.ordered = false;

        map.remove("a");
        assert!(!map.is_ordered());
        assert!(map.keys().is_empty());
        assert_cache_consistent(&map);
    }

    // =========================================================================
    // Bulk Mutation Tests
    // =========================================================================

    #[rstest]
    #[case(Maintenance::Incremental, true)]
    #[case(Maintenance::Rebuild, true)]
    #[case(Maintenance::Deferred, false)]
    fn test_extend_settles_per_policy(#[case] maintenance: Maintenance, #[case] ordered: bool) {
        let mut map = string_map(maintenance);
        map.extend([("y".to_string(), 2), ("x".to_string(), 1)]);

        assert_eq!(map.is_ordered(), ordered);
        assert_eq!(map.keys(), ["x", "y"]);
        assert_cache_consistent(&map);
    }

    #[rstest]
    fn test_retain_drops_keys_from_order() {
        let mut map: OrderedMap<u32, u32, Natural> = (0..6).map(|key| (key, key * 10)).collect();
        map.retain(|key, _| key % 2 == 0);

        assert_eq!(map.keys(), [0, 2, 4]);
        assert_cache_consistent(&map);
    }

    #[rstest]
    fn test_clear_leaves_valid_empty_order() {
        let mut map: OrderedMap<u32, u32, Natural> = (0..3).map(|key| (key, key)).collect();
        map.clear();

        assert!(map.is_empty());
        assert!(map.is_ordered());
        assert_cache_consistent(&map);
    }

    // =========================================================================
    // Snapshot Tests
    // =========================================================================

    #[rstest]
    fn test_snapshot_of_stale_map_is_sorted() {
        let mut map = string_map(Maintenance::Deferred);
        map.insert("b".to_string(), 2);
        map.insert("a".to_string(), 1);

        assert!(!map.is_ordered());
        assert_eq!(format!("{map}"), "{a: 1, b: 2}");
        assert_eq!(format!("{map:?}"), r#"{"a": 1, "b": 2}"#);
        assert!(!map.is_ordered());
    }

    #[rstest]
    fn test_custom_strategy_drives_order() {
        let by_length = FnOrder::new(|left: &String, right: &String| {
            (left.len(), left) < (right.len(), right)
        });
        let mut map: OrderedMap<String, (), _> = OrderedMap::with_order(by_length);
        for key in ["ccc", "a", "bb", "aa"] {
            map.insert(key.to_string(), ());
        }

        assert_eq!(map.keys(), ["a", "aa", "bb", "ccc"]);
        assert_cache_consistent(&map);
    }

    // =========================================================================
    // Equality and Hash Tests
    // =========================================================================

    fn hash_of<T: Hash>(value: &T) -> u64 {
        let mut hasher = DefaultHasher::new();
        value.hash(&mut hasher);
        hasher.finish()
    }

    fn boxed_map(
        order: Box<dyn KeyOrder<u32>>,
        maintenance: Maintenance,
    ) -> OrderedMap<u32, u32, Box<dyn KeyOrder<u32>>> {
        let mut map = OrderedMap::with_order_and_maintenance(order, maintenance);
        map.extend((0..4).map(|key| (key, key * 10)));
        map
    }

    #[rstest]
    fn test_maps_ordered_differently_are_not_equal() {
        let ascending = boxed_map(Box::new(Natural), Maintenance::Incremental);
        let descending = boxed_map(Box::new(Reversed(Natural)), Maintenance::Incremental);

        assert_ne!(ascending, descending);
    }

    #[rstest]
    fn test_equal_maps_hash_equally_across_policies() {
        let eager = boxed_map(Box::new(Reversed(Natural)), Maintenance::Incremental);
        let lazy = boxed_map(Box::new(Reversed(Natural)), Maintenance::Deferred);

        assert!(!lazy.is_ordered());
        assert_eq!(eager, lazy);
        assert_eq!(hash_of(&eager), hash_of(&lazy));
    }

    #[cfg(feature = "rayon")]
    #[rstest]
    fn test_par_ensure_order_matches_sequential() {
        let mut parallel: OrderedMap<u32, u32, Natural> =
            OrderedMap::with_order_and_maintenance(Natural, Maintenance::Deferred);
        parallel.extend((0..1000).rev().map(|key| (key, key)));
        let mut sequential = parallel.clone();

        parallel.par_ensure_order();
        sequential.ensure_order();

        assert_eq!(parallel.keys(), sequential.keys());
        assert_cache_consistent(&parallel);
    }
}
