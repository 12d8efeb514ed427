//! Hash map with a fixed number of chained buckets.
//!
//! This module provides [`BucketMap`], a mutable hash map whose entries live
//! in `BUCKETS` chains. A key's chain is `hash(key) % BUCKETS`; within a
//! chain entries keep the order in which their keys were first inserted.
//!
//! # Overview
//!
//! - O(1 + chain length) `get_or_insert`, `value_of`, `find`, `remove`
//! - O(1) `remove_at`, `len` and `is_empty`
//! - O(1) amortized cursor movement (skipping empty buckets is bounded by
//!   `BUCKETS`)
//!
//! The bucket count never changes: there is no rehashing, so chains grow
//! without bound and lookups degrade to O(N) when every key collides.
//!
//! # Iteration Order
//!
//! Iteration visits buckets in ascending index, and each chain in append
//! order. It is *not* sorted by key. Use
//! [`OrderedMap`](super::OrderedMap) when key order matters.
//!
//! # Examples
//!
//! ```rust
//! use twinmap::collections::BucketMap;
//! use twinmap::hash::BuildIdentityHasher;
//!
//! // With an identity hash, small integer keys land in bucket `key % 20`.
//! let mut map: BucketMap<i32, &str, BuildIdentityHasher> = BucketMap::default();
//! for key in [5, 3, 8, 1, 4] {
//!     *map.get_or_insert(key) = "value";
//! }
//!
//! let keys: Vec<i32> = map.keys().copied().collect();
//! assert_eq!(keys, vec![1, 3, 4, 5, 8]);
//! ```
//!
//! # Internal Structure
//!
//! Every entry is a node in one [`Arena`] and is linked to its chain
//! neighbours in both directions by handle. Each bucket records its chain's
//! head, tail and length.

use std::borrow::Borrow;
use std::fmt;
use std::hash::{BuildHasher, Hash};
use std::iter::{FromIterator, FusedIterator};
use std::mem;
use std::ops::Index;

use super::arena::{Arena, NodeHandle};
use super::cursor::{Cursor, CursorStamp};
use crate::error::{CursorFault, MapError, Result};
use crate::hash::{DEFAULT_BUCKET_COUNT, DefaultHashBuilder, bucket_index};
use crate::mapping::Mapping;

// =============================================================================
// Node Definition
// =============================================================================

/// One entry of a chain.
#[derive(Clone)]
struct ChainNode<K, V> {
    key: K,
    value: V,
    /// Bucket this node is chained into.
    bucket: usize,
    prev: Option<NodeHandle>,
    next: Option<NodeHandle>,
}

/// Head, tail and length of one bucket's chain.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct Chain {
    head: Option<NodeHandle>,
    tail: Option<NodeHandle>,
    length: usize,
}

impl Chain {
    const EMPTY: Self = Self {
        head: None,
        tail: None,
        length: 0,
    };
}

/// First entry at or after bucket `from`.
fn first_from(buckets: &[Chain], from: usize) -> Option<NodeHandle> {
    buckets.get(from..)?.iter().find_map(|chain| chain.head)
}

/// Last entry strictly before bucket `before`.
fn last_before(buckets: &[Chain], before: usize) -> Option<NodeHandle> {
    buckets[..before].iter().rev().find_map(|chain| chain.tail)
}

fn successor<K, V>(
    buckets: &[Chain],
    nodes: &Arena<ChainNode<K, V>>,
    handle: NodeHandle,
) -> Option<NodeHandle> {
    let node = &nodes[handle];
    node.next.or_else(|| first_from(buckets, node.bucket + 1))
}

fn predecessor<K, V>(
    buckets: &[Chain],
    nodes: &Arena<ChainNode<K, V>>,
    handle: NodeHandle,
) -> Option<NodeHandle> {
    let node = &nodes[handle];
    node.prev.or_else(|| last_before(buckets, node.bucket))
}

// =============================================================================
// BucketMap Definition
// =============================================================================

/// A hash map with `BUCKETS` fixed chains.
///
/// Keys must implement [`Hash`] and [`Eq`]. The hash builder `S` defaults to
/// [`DefaultHashBuilder`] and the bucket count to
/// [`DEFAULT_BUCKET_COUNT`](crate::hash::DEFAULT_BUCKET_COUNT).
///
/// `BucketMap` is a single-threaded structure with no internal locking.
///
/// # Time Complexity
///
/// | Operation        | Complexity            |
/// |------------------|-----------------------|
/// | `new`            | O(BUCKETS)            |
/// | `get_or_insert`  | O(1 + chain length)   |
/// | `value_of`       | O(1 + chain length)   |
/// | `find`           | O(1 + chain length)   |
/// | `remove`         | O(1 + chain length)   |
/// | `remove_at`      | O(1)                  |
/// | `begin`          | O(BUCKETS)            |
/// | `len`            | O(1)                  |
///
/// # Examples
///
/// ```rust
/// use twinmap::collections::BucketMap;
/// use twinmap::error::MapError;
///
/// let mut map = BucketMap::new();
/// *map.get_or_insert("apples") = 3;
/// *map.get_or_insert("apples") += 2;
///
/// assert_eq!(map.value_of("apples"), Ok(&5));
/// assert_eq!(map.value_of("pears"), Err(MapError::NotFound));
/// ```
pub struct BucketMap<K, V, S = DefaultHashBuilder, const BUCKETS: usize = DEFAULT_BUCKET_COUNT> {
    /// Chain bookkeeping per bucket.
    buckets: [Chain; BUCKETS],
    /// Storage for every entry.
    nodes: Arena<ChainNode<K, V>>,
    /// Number of entries.
    length: usize,
    hash_builder: S,
    stamp: CursorStamp,
}

impl<K, V> BucketMap<K, V> {
    /// Creates an empty map with the default hasher and bucket count.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use twinmap::collections::BucketMap;
    ///
    /// let map: BucketMap<String, i32> = BucketMap::new();
    /// assert!(map.is_empty());
    /// ```
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::with_hasher(DefaultHashBuilder::default())
    }
}

impl<K, V, S, const BUCKETS: usize> BucketMap<K, V, S, BUCKETS> {
    /// Creates an empty map that hashes keys with `hash_builder`.
    ///
    /// A zero bucket count is rejected at compile time.
    #[must_use]
    pub fn with_hasher(hash_builder: S) -> Self {
        const { assert!(BUCKETS > 0, "a BucketMap needs at least one bucket") };
        Self {
            buckets: [Chain::EMPTY; BUCKETS],
            nodes: Arena::new(),
            length: 0,
            hash_builder,
            stamp: CursorStamp::fresh(),
        }
    }

    /// Returns the number of entries.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.length
    }

    /// Returns `true` if the map contains no entries.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Returns the fixed number of buckets.
    #[inline]
    #[must_use]
    pub const fn bucket_count(&self) -> usize {
        BUCKETS
    }

    /// Returns the number of entries chained in bucket `index`, or `None`
    /// if `index` is out of range.
    #[must_use]
    pub fn bucket_len(&self, index: usize) -> Option<usize> {
        self.buckets.get(index).map(|chain| chain.length)
    }

    /// Returns the map's hash builder.
    #[inline]
    pub const fn hasher(&self) -> &S {
        &self.hash_builder
    }

    /// Removes every entry. Invalidates all cursors.
    pub fn clear(&mut self) {
        tracing::trace!(entries = self.length, "clearing bucket map");
        self.buckets = [Chain::EMPTY; BUCKETS];
        self.nodes.clear();
        self.length = 0;
        self.stamp.bump();
    }

    // -------------------------------------------------------------------------
    // Cursors
    // -------------------------------------------------------------------------

    /// Returns a cursor at the first entry of the lowest non-empty bucket,
    /// or [`end`](Self::end) if the map is empty.
    #[must_use]
    pub fn begin(&self) -> Cursor {
        self.stamp.cursor(first_from(&self.buckets, 0))
    }

    /// Returns the end cursor.
    #[must_use]
    pub const fn end(&self) -> Cursor {
        self.stamp.cursor(None)
    }

    /// Moves `cursor` one entry forward, crossing into the next non-empty
    /// bucket at the end of a chain.
    ///
    /// # Errors
    ///
    /// `InvalidCursor(End)` when `cursor` is the end cursor, and
    /// `InvalidCursor(Stale | ForeignMap)` when it is not a current cursor
    /// of this map.
    pub fn advance(&self, cursor: Cursor) -> Result<Cursor> {
        let handle = self.stamp.check_entry(cursor)?;
        Ok(self
            .stamp
            .cursor(successor(&self.buckets, &self.nodes, handle)))
    }

    /// Moves `cursor` one entry back, crossing into the tail of the previous
    /// non-empty bucket at the head of a chain. Retreating from the end
    /// cursor lands on the last entry.
    ///
    /// # Errors
    ///
    /// `InvalidCursor(BeforeBegin)` when there is no previous entry, and
    /// `InvalidCursor(Stale | ForeignMap)` when `cursor` is not a current
    /// cursor of this map.
    pub fn retreat(&self, cursor: Cursor) -> Result<Cursor> {
        let previous = match self.stamp.check(cursor)? {
            Some(handle) => predecessor(&self.buckets, &self.nodes, handle),
            None => last_before(&self.buckets, BUCKETS),
        };
        previous
            .map(|handle| self.stamp.cursor(Some(handle)))
            .ok_or_else(|| self.stamp.reject(cursor, CursorFault::BeforeBegin))
    }

    /// Returns the entry under `cursor`.
    ///
    /// # Errors
    ///
    /// `InvalidCursor` when `cursor` is the end cursor, stale, or foreign.
    pub fn entry_at(&self, cursor: Cursor) -> Result<(&K, &V)> {
        let node = &self.nodes[self.stamp.check_entry(cursor)?];
        Ok((&node.key, &node.value))
    }

    /// Returns the value under `cursor` for modification.
    ///
    /// Assigning through the returned reference does not invalidate cursors.
    ///
    /// # Errors
    ///
    /// `InvalidCursor` when `cursor` is the end cursor, stale, or foreign.
    pub fn value_at_mut(&mut self, cursor: Cursor) -> Result<&mut V> {
        let handle = self.stamp.check_entry(cursor)?;
        Ok(&mut self.nodes[handle].value)
    }

    /// Removes the entry under `cursor` and returns it.
    ///
    /// # Errors
    ///
    /// `EmptyMap` when the map is empty, `InvalidCursor(End)` for the end
    /// cursor of a non-empty map, and `InvalidCursor(Stale | ForeignMap)` for
    /// a cursor that is not current. The map is unchanged on error.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use twinmap::collections::BucketMap;
    ///
    /// let mut map = BucketMap::from([(1, "one"), (2, "two")]);
    /// while !map.is_empty() {
    ///     map.remove_at(map.begin()).unwrap();
    /// }
    /// assert_eq!(map.len(), 0);
    /// ```
    pub fn remove_at(&mut self, cursor: Cursor) -> Result<(K, V)> {
        let handle = self.stamp.check_removal(cursor, self.is_empty())?;
        Ok(self.unlink(handle))
    }

    /// Detaches `handle` from its chain and frees its slot.
    fn unlink(&mut self, handle: NodeHandle) -> (K, V) {
        let ChainNode {
            key,
            value,
            bucket,
            prev,
            next,
        } = match self.nodes.release(handle) {
            Some(node) => node,
            None => unreachable!("validated cursor points at a live slot"),
        };

        let chain = &mut self.buckets[bucket];
        match prev {
            Some(prev) => self.nodes[prev].next = next,
            None => chain.head = next,
        }
        match next {
            Some(next) => self.nodes[next].prev = prev,
            None => chain.tail = prev,
        }
        chain.length -= 1;
        self.length -= 1;
        self.stamp.bump();
        debug_assert_eq!(self.nodes.len(), self.length);

        tracing::trace!(bucket, chain_length = chain.length, "unlinked entry");
        (key, value)
    }

    // -------------------------------------------------------------------------
    // Iterators
    // -------------------------------------------------------------------------

    /// Returns an iterator over the entries in bucket order.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use twinmap::collections::BucketMap;
    ///
    /// let map = BucketMap::from([(1, 10), (2, 20)]);
    /// let total: i32 = map.iter().map(|(_, value)| value).sum();
    /// assert_eq!(total, 30);
    /// ```
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            buckets: &self.buckets,
            nodes: &self.nodes,
            front: first_from(&self.buckets, 0),
            back: last_before(&self.buckets, BUCKETS),
            remaining: self.length,
        }
    }

    /// Returns an iterator over the entries in bucket order, with mutable
    /// values.
    ///
    /// Unlike [`iter`](Self::iter), this allocates: the entries are
    /// collected into a `Vec` of borrows (plus a slot table of the same
    /// size) before the first one is yielded.
    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        let order: Vec<NodeHandle> = self.handles().collect();
        let mut table = self.nodes.slots_mut();
        let entries: Vec<(&K, &mut V)> = order
            .into_iter()
            .filter_map(|handle| table[handle.index()].take())
            .map(|node| (&node.key, &mut node.value))
            .collect();
        IterMut {
            entries: entries.into_iter(),
        }
    }

    /// Returns an iterator over the keys in bucket order.
    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys { inner: self.iter() }
    }

    /// Returns an iterator over the values in bucket order.
    pub fn values(&self) -> Values<'_, K, V> {
        Values { inner: self.iter() }
    }

    /// Returns an iterator over mutable values in bucket order.
    ///
    /// Allocates like [`iter_mut`](Self::iter_mut).
    pub fn values_mut(&mut self) -> ValuesMut<'_, K, V> {
        ValuesMut {
            inner: self.iter_mut(),
        }
    }

    /// Node handles in iteration order.
    fn handles(&self) -> impl Iterator<Item = NodeHandle> + '_ {
        std::iter::successors(first_from(&self.buckets, 0), |&handle| {
            successor(&self.buckets, &self.nodes, handle)
        })
    }
}

impl<K, V, S, const BUCKETS: usize> BucketMap<K, V, S, BUCKETS>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    /// Returns the bucket index `key` hashes to.
    #[must_use]
    pub fn bucket_of<Q>(&self, key: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        bucket_index(self.hash_builder.hash_one(key), BUCKETS)
    }

    /// Scans `key`'s whole chain. Returns the bucket and the matching node.
    fn locate<Q>(&self, key: &Q) -> (usize, Option<NodeHandle>)
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let bucket = self.bucket_of(key);
        let mut current = self.buckets[bucket].head;
        while let Some(handle) = current {
            let node = &self.nodes[handle];
            if node.key.borrow() == key {
                return (bucket, Some(handle));
            }
            current = node.next;
        }
        (bucket, None)
    }

    /// Appends a new entry to the tail of `bucket`'s chain.
    fn append(&mut self, bucket: usize, key: K, value: V) -> NodeHandle {
        let tail = self.buckets[bucket].tail;
        let handle = self.nodes.allocate(ChainNode {
            key,
            value,
            bucket,
            prev: tail,
            next: None,
        });

        let chain = &mut self.buckets[bucket];
        match tail {
            Some(tail) => self.nodes[tail].next = Some(handle),
            None => chain.head = Some(handle),
        }
        chain.tail = Some(handle);
        chain.length += 1;
        self.length += 1;
        self.stamp.bump();

        tracing::trace!(bucket, chain_length = chain.length, "appended entry");
        handle
    }

    /// Returns the value under `key`, appending a default-valued entry to
    /// the key's chain first if the key is absent.
    ///
    /// References to other entries stay valid in the sense that their
    /// entries are never moved or rebuilt; cursors are invalidated only if a
    /// new entry was created.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use twinmap::collections::BucketMap;
    ///
    /// let mut map: BucketMap<&str, Vec<i32>> = BucketMap::new();
    /// map.get_or_insert("evens").push(2);
    /// map.get_or_insert("evens").push(4);
    /// assert_eq!(map.value_of("evens"), Ok(&vec![2, 4]));
    /// assert_eq!(map.len(), 1);
    /// ```
    pub fn get_or_insert(&mut self, key: K) -> &mut V
    where
        V: Default,
    {
        let handle = match self.locate(&key) {
            (_, Some(handle)) => handle,
            (bucket, None) => self.append(bucket, key, V::default()),
        };
        &mut self.nodes[handle].value
    }

    /// Stores `value` under `key`, returning the value it replaced.
    ///
    /// Replacing the value of an existing key keeps its chain position.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        match self.locate(&key) {
            (_, Some(handle)) => Some(mem::replace(&mut self.nodes[handle].value, value)),
            (bucket, None) => {
                self.append(bucket, key, value);
                None
            }
        }
    }

    /// Returns the value stored under `key`.
    ///
    /// # Errors
    ///
    /// `NotFound` if the key is absent.
    pub fn value_of<Q>(&self, key: &Q) -> Result<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        match self.locate(key) {
            (_, Some(handle)) => Ok(&self.nodes[handle].value),
            (_, None) => Err(MapError::NotFound),
        }
    }

    /// Returns the value stored under `key` for modification.
    ///
    /// # Errors
    ///
    /// `NotFound` if the key is absent.
    pub fn value_of_mut<Q>(&mut self, key: &Q) -> Result<&mut V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        match self.locate(key) {
            (_, Some(handle)) => Ok(&mut self.nodes[handle].value),
            (_, None) => Err(MapError::NotFound),
        }
    }

    /// Returns `true` if `key` is present.
    #[must_use]
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.locate(key).1.is_some()
    }

    /// Returns a cursor at `key`, or the end cursor if it is absent.
    #[must_use]
    pub fn find<Q>(&self, key: &Q) -> Cursor
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.stamp.cursor(self.locate(key).1)
    }

    /// Removes `key` and returns its value.
    ///
    /// # Errors
    ///
    /// `NotFound` if the key is absent; the map is unchanged.
    pub fn remove<Q>(&mut self, key: &Q) -> Result<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let handle = self.locate(key).1.ok_or(MapError::NotFound)?;
        Ok(self.unlink(handle).1)
    }

    /// Compares two maps entry by entry in iteration order.
    ///
    /// Unlike `==`, which compares key-value sets, this is sensitive to the
    /// bucket layout and chain order, so two maps holding the same entries
    /// can differ when colliding keys were inserted in a different order.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use twinmap::collections::BucketMap;
    /// use twinmap::hash::BuildIdentityHasher;
    ///
    /// type Map = BucketMap<u32, (), BuildIdentityHasher>;
    ///
    /// // 1 and 21 share bucket 1.
    /// let first: Map = [(1, ()), (21, ())].into_iter().collect();
    /// let second: Map = [(21, ()), (1, ())].into_iter().collect();
    ///
    /// assert!(first == second);
    /// assert!(!first.sequence_eq(&second));
    /// ```
    #[must_use]
    pub fn sequence_eq<S2, const OTHER: usize>(&self, other: &BucketMap<K, V, S2, OTHER>) -> bool
    where
        V: PartialEq,
    {
        self.length == other.length && self.iter().eq(other.iter())
    }
}

// =============================================================================
// Iterator Implementation
// =============================================================================

/// An iterator over the entries of a [`BucketMap`] in bucket order.
pub struct Iter<'a, K, V> {
    buckets: &'a [Chain],
    nodes: &'a Arena<ChainNode<K, V>>,
    front: Option<NodeHandle>,
    back: Option<NodeHandle>,
    remaining: usize,
}

impl<K, V> Clone for Iter<'_, K, V> {
    fn clone(&self) -> Self {
        Self { ..*self }
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let handle = self.front?;
        let node = &self.nodes[handle];
        self.front = successor(self.buckets, self.nodes, handle);
        self.remaining -= 1;
        Some((&node.key, &node.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> DoubleEndedIterator for Iter<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let handle = self.back?;
        let node = &self.nodes[handle];
        self.back = predecessor(self.buckets, self.nodes, handle);
        self.remaining -= 1;
        Some((&node.key, &node.value))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {
    fn len(&self) -> usize {
        self.remaining
    }
}

impl<K, V> FusedIterator for Iter<'_, K, V> {}

/// A mutable iterator over the entries of a [`BucketMap`] in bucket order.
pub struct IterMut<'a, K, V> {
    entries: std::vec::IntoIter<(&'a K, &'a mut V)>,
}

impl<'a, K, V> Iterator for IterMut<'a, K, V> {
    type Item = (&'a K, &'a mut V);

    fn next(&mut self) -> Option<Self::Item> {
        self.entries.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.entries.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for IterMut<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.entries.next_back()
    }
}

impl<K, V> ExactSizeIterator for IterMut<'_, K, V> {}

impl<K, V> FusedIterator for IterMut<'_, K, V> {}

/// An iterator over the keys of a [`BucketMap`].
pub struct Keys<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Keys<'a, K, V> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(key, _)| key)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for Keys<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(key, _)| key)
    }
}

impl<K, V> ExactSizeIterator for Keys<'_, K, V> {}

/// An iterator over the values of a [`BucketMap`].
pub struct Values<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Values<'a, K, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, value)| value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for Values<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(_, value)| value)
    }
}

impl<K, V> ExactSizeIterator for Values<'_, K, V> {}

/// An iterator over mutable values of a [`BucketMap`].
pub struct ValuesMut<'a, K, V> {
    inner: IterMut<'a, K, V>,
}

impl<'a, K, V> Iterator for ValuesMut<'a, K, V> {
    type Item = &'a mut V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, value)| value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for ValuesMut<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(_, value)| value)
    }
}

impl<K, V> ExactSizeIterator for ValuesMut<'_, K, V> {}

/// An owning iterator over the entries of a [`BucketMap`] in bucket order.
pub struct IntoIter<K, V> {
    entries: std::vec::IntoIter<(K, V)>,
}

impl<K, V> Iterator for IntoIter<K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        self.entries.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.entries.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for IntoIter<K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.entries.next_back()
    }
}

impl<K, V> ExactSizeIterator for IntoIter<K, V> {}

impl<K, V> FusedIterator for IntoIter<K, V> {}

// =============================================================================
// Standard Trait Implementations
// =============================================================================

impl<K, V, S: Default, const BUCKETS: usize> Default for BucketMap<K, V, S, BUCKETS> {
    #[inline]
    fn default() -> Self {
        Self::with_hasher(S::default())
    }
}

/// Deep copy with the same layout and hasher. The copy is a new map: cursors
/// of the original are foreign to it.
impl<K: Clone, V: Clone, S: Clone, const BUCKETS: usize> Clone for BucketMap<K, V, S, BUCKETS> {
    fn clone(&self) -> Self {
        Self {
            buckets: self.buckets,
            nodes: self.nodes.clone(),
            length: self.length,
            hash_builder: self.hash_builder.clone(),
            stamp: CursorStamp::fresh(),
        }
    }
}

impl<K, V, S, const BUCKETS: usize> FromIterator<(K, V)> for BucketMap<K, V, S, BUCKETS>
where
    K: Hash + Eq,
    S: BuildHasher + Default,
{
    /// Builds a map from pairs in sequence order; for duplicate keys the
    /// last value wins.
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::default();
        map.extend(iter);
        map
    }
}

impl<K, V, S, const BUCKETS: usize> Extend<(K, V)> for BucketMap<K, V, S, BUCKETS>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl<K: Hash + Eq, V, const N: usize> From<[(K, V); N]> for BucketMap<K, V> {
    fn from(entries: [(K, V); N]) -> Self {
        entries.into_iter().collect()
    }
}

impl<K, V, S, const BUCKETS: usize> IntoIterator for BucketMap<K, V, S, BUCKETS> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;

    fn into_iter(self) -> Self::IntoIter {
        let order: Vec<NodeHandle> = self.handles().collect();
        let mut slots = self.nodes.into_slots();
        let entries: Vec<(K, V)> = order
            .into_iter()
            .filter_map(|handle| slots[handle.index()].take())
            .map(|node| (node.key, node.value))
            .collect();
        IntoIter {
            entries: entries.into_iter(),
        }
    }
}

impl<'a, K, V, S, const BUCKETS: usize> IntoIterator for &'a BucketMap<K, V, S, BUCKETS> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, K, V, S, const BUCKETS: usize> IntoIterator for &'a mut BucketMap<K, V, S, BUCKETS> {
    type Item = (&'a K, &'a mut V);
    type IntoIter = IterMut<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

/// Key-value set equality: same length, and every entry of `self` is present
/// with an equal value in `other`. Bucket layout and chain order are ignored;
/// see [`BucketMap::sequence_eq`] for the order-sensitive comparison.
impl<K, V, S, const BUCKETS: usize> PartialEq for BucketMap<K, V, S, BUCKETS>
where
    K: Hash + Eq,
    V: PartialEq,
    S: BuildHasher,
{
    fn eq(&self, other: &Self) -> bool {
        self.length == other.length
            && self
                .iter()
                .all(|(key, value)| other.value_of(key).is_ok_and(|other_value| other_value == value))
    }
}

impl<K, V, S, const BUCKETS: usize> Eq for BucketMap<K, V, S, BUCKETS>
where
    K: Hash + Eq,
    V: Eq,
    S: BuildHasher,
{
}

impl<K: fmt::Debug, V: fmt::Debug, S, const BUCKETS: usize> fmt::Debug
    for BucketMap<K, V, S, BUCKETS>
{
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_map().entries(self.iter()).finish()
    }
}

impl<K, Q, V, S, const BUCKETS: usize> Index<&Q> for BucketMap<K, V, S, BUCKETS>
where
    K: Hash + Eq + Borrow<Q>,
    Q: Hash + Eq + ?Sized,
    S: BuildHasher,
{
    type Output = V;

    /// # Panics
    ///
    /// Panics if the key is not present. Use
    /// [`value_of`](BucketMap::value_of) for a checked lookup.
    fn index(&self, key: &Q) -> &V {
        match self.value_of(key) {
            Ok(value) => value,
            Err(error) => panic!("BucketMap index: {error}"),
        }
    }
}

// =============================================================================
// Mapping Implementation
// =============================================================================

impl<K, V, S, const BUCKETS: usize> Mapping<K, V> for BucketMap<K, V, S, BUCKETS>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    type Cursor = Cursor;

    fn len(&self) -> usize {
        self.length
    }

    fn get_or_insert(&mut self, key: K) -> &mut V
    where
        V: Default,
    {
        Self::get_or_insert(self, key)
    }

    fn insert(&mut self, key: K, value: V) -> Option<V> {
        Self::insert(self, key, value)
    }

    fn value_of(&self, key: &K) -> Result<&V> {
        Self::value_of(self, key)
    }

    fn value_of_mut(&mut self, key: &K) -> Result<&mut V> {
        Self::value_of_mut(self, key)
    }

    fn contains_key(&self, key: &K) -> bool {
        Self::contains_key(self, key)
    }

    fn find(&self, key: &K) -> Cursor {
        Self::find(self, key)
    }

    fn remove(&mut self, key: &K) -> Result<V> {
        Self::remove(self, key)
    }

    fn remove_at(&mut self, cursor: Cursor) -> Result<(K, V)> {
        Self::remove_at(self, cursor)
    }

    fn begin(&self) -> Cursor {
        Self::begin(self)
    }

    fn end(&self) -> Cursor {
        Self::end(self)
    }

    fn advance(&self, cursor: Cursor) -> Result<Cursor> {
        Self::advance(self, cursor)
    }

    fn retreat(&self, cursor: Cursor) -> Result<Cursor> {
        Self::retreat(self, cursor)
    }

    fn entry_at(&self, cursor: Cursor) -> Result<(&K, &V)> {
        Self::entry_at(self, cursor)
    }

    fn value_at_mut(&mut self, cursor: Cursor) -> Result<&mut V> {
        Self::value_at_mut(self, cursor)
    }
}

static_assertions::assert_impl_all!(BucketMap<i32, String>: Send, Sync, Clone, Default);

// =============================================================================
// Tests
// =============================================================================
