//! Lazy traversal of an [`OrderedMap`](super::OrderedMap).
//!
//! Each iterator walks the validated order cache one element at a time. The
//! consumer pulls, nothing is produced ahead of demand, and there is no
//! producer task to park: dropping an iterator abandons the traversal.
//!
//! Traversals are single pass. Calling
//! [`OrderedMap::iter`](super::OrderedMap::iter) again starts a fresh
//! traversal over the map's current contents.

#[cfg(feature = "async")]
use super::OrderedMap;
use std::collections::HashMap;
use std::fmt;
use std::hash::{BuildHasher, Hash};
use std::iter::FusedIterator;
use std::slice;

// =============================================================================
// Keys
// =============================================================================

/// Keys of an [`OrderedMap`](super::OrderedMap) in ascending order.
///
/// Created by [`OrderedMap::iter`](super::OrderedMap::iter).
#[derive(Debug, Clone)]
pub struct Keys<'a, K> {
    remaining: slice::Iter<'a, K>,
}

impl<'a, K> Keys<'a, K> {
    pub(super) fn new(ordered_keys: &'a [K]) -> Self {
        Self {
            remaining: ordered_keys.iter(),
        }
    }
}

impl<'a, K> Iterator for Keys<'a, K> {
    type Item = &'a K;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.remaining.next()
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.remaining.size_hint()
    }
}

impl<K> DoubleEndedIterator for Keys<'_, K> {
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        self.remaining.next_back()
    }
}

impl<K> ExactSizeIterator for Keys<'_, K> {
    #[inline]
    fn len(&self) -> usize {
        self.remaining.len()
    }
}

impl<K> FusedIterator for Keys<'_, K> {}

// =============================================================================
// Entries
// =============================================================================

/// `(key, value)` pairs of an [`OrderedMap`](super::OrderedMap) in key order.
///
/// Values are looked up in the backing store as each key is reached.
///
/// Created by [`OrderedMap::entries`](super::OrderedMap::entries).
pub struct Entries<'a, K, V, S> {
    keys: Keys<'a, K>,
    store: &'a HashMap<K, V, S>,
}

impl<'a, K, V, S> Entries<'a, K, V, S> {
    pub(super) fn new(ordered_keys: &'a [K], store: &'a HashMap<K, V, S>) -> Self {
        Self {
            keys: Keys::new(ordered_keys),
            store,
        }
    }
}

impl<'a, K, V, S> Iterator for Entries<'a, K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let key = self.keys.next()?;
        self.store.get(key).map(|value| (key, value))
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.keys.size_hint()
    }
}

impl<K, V, S> DoubleEndedIterator for Entries<'_, K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    fn next_back(&mut self) -> Option<Self::Item> {
        let key = self.keys.next_back()?;
        self.store.get(key).map(|value| (key, value))
    }
}

impl<K, V, S> ExactSizeIterator for Entries<'_, K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    #[inline]
    fn len(&self) -> usize {
        self.keys.len()
    }
}

impl<K, V, S> FusedIterator for Entries<'_, K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
}

impl<K: fmt::Debug, V, S> fmt::Debug for Entries<'_, K, V, S> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Entries")
            .field("keys", &self.keys)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Values
// =============================================================================

/// Values of an [`OrderedMap`](super::OrderedMap) in key order.
///
/// Created by [`OrderedMap::values`](super::OrderedMap::values).
pub struct Values<'a, K, V, S> {
    entries: Entries<'a, K, V, S>,
}

impl<'a, K, V, S> Values<'a, K, V, S> {
    pub(super) const fn new(entries: Entries<'a, K, V, S>) -> Self {
        Self { entries }
    }
}

impl<'a, K, V, S> Iterator for Values<'a, K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    type Item = &'a V;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.entries.next().map(|(_, value)| value)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.entries.size_hint()
    }
}

impl<K, V, S> ExactSizeIterator for Values<'_, K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    #[inline]
    fn len(&self) -> usize {
        self.entries.len()
    }
}

impl<K, V, S> FusedIterator for Values<'_, K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
}

impl<K: fmt::Debug, V, S> fmt::Debug for Values<'_, K, V, S> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Values")
            .field("keys", &self.entries.keys)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// IntoIter
// =============================================================================

/// An owning iterator over the entries of an [`OrderedMap`](super::OrderedMap) in key order.
#[derive(Debug)]
pub struct IntoIter<K, V> {
    entries: std::vec::IntoIter<(K, V)>,
}

impl<K, V> IntoIter<K, V> {
    pub(super) fn new(entries: Vec<(K, V)>) -> Self {
        Self {
            entries: entries.into_iter(),
        }
    }
}

impl<K, V> Iterator for IntoIter<K, V> {
    type Item = (K, V);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.entries.next()
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.entries.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for IntoIter<K, V> {
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        self.entries.next_back()
    }
}

impl<K, V> ExactSizeIterator for IntoIter<K, V> {
    #[inline]
    fn len(&self) -> usize {
        self.entries.len()
    }
}

impl<K, V> FusedIterator for IntoIter<K, V> {}

// =============================================================================
// Async Stream
// =============================================================================

#[cfg(feature = "async")]
impl<K, V, O, S> OrderedMap<K, V, O, S>
where
    K: Clone + Eq + Hash,
    O: crate::order::KeyOrder<K>,
    S: BuildHasher,
{
    /// Returns the ordered keys as a [`futures::Stream`].
    ///
    /// Every poll yields the next key immediately. No background task is
    /// spawned, so dropping the stream is a complete cancellation.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use detmap::map::StringMap;
    /// use futures::StreamExt;
    ///
    /// let mut map: StringMap<u8> = StringMap::new();
    /// map.insert("b".to_string(), 2);
    /// map.insert("a".to_string(), 1);
    ///
    /// let keys: Vec<String> = futures::executor::block_on(map.stream().map(String::clone).collect());
    /// assert_eq!(keys, vec!["a", "b"]);
    /// ```
    pub fn stream(&mut self) -> futures::stream::Iter<Keys<'_, K>> {
        futures::stream::iter(self.iter())
    }
}
