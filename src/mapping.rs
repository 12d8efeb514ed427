//! The contract shared by every map in this crate.
//!
//! [`BucketMap`](crate::collections::BucketMap) and
//! [`OrderedMap`](crate::collections::OrderedMap) are independent
//! implementations, but client code that only needs "a mapping with
//! checked cursors" can be written once against [`Mapping`].
//!
//! # Laws
//!
//! For every implementation:
//!
//! - **Uniqueness**: after any sequence of `get_or_insert` calls, `len()`
//!   equals the number of distinct keys used.
//! - **Round-trip**: a value written through `get_or_insert(k)` is read back
//!   by `value_of(&k)`.
//! - **Removal**: after `remove(&k)` succeeds, `find(&k)` is the end cursor,
//!   `value_of(&k)` fails with `NotFound`, and `len()` dropped by one.
//! - **Completeness**: walking from `begin()` with `advance` reaches `end()`
//!   after exactly `len()` steps, visiting every key once.
//! - **Atomic failure**: an operation that returns `Err` leaves the map
//!   unchanged.
//!
//! # Examples
//!
//! ```rust
//! use twinmap::collections::{BucketMap, OrderedMap};
//! use twinmap::mapping::Mapping;
//!
//! fn count_words<M: Mapping<String, usize>>(map: &mut M, text: &str) {
//!     for word in text.split_whitespace() {
//!         *map.get_or_insert(word.to_string()) += 1;
//!     }
//! }
//!
//! let mut bucket: BucketMap<String, usize> = BucketMap::new();
//! let mut ordered: OrderedMap<String, usize> = OrderedMap::new();
//! count_words(&mut bucket, "to be or not to be");
//! count_words(&mut ordered, "to be or not to be");
//!
//! assert_eq!(bucket.value_of("to"), Ok(&2));
//! assert_eq!(ordered.value_of("to"), Ok(&2));
//! assert_eq!(Mapping::len(&bucket), Mapping::len(&ordered));
//! ```

use std::fmt;

use crate::error::Result;

/// A key-value map with checked, bidirectional cursors.
///
/// Implementations are single-threaded data structures with no internal
/// locking. Sharing one across threads requires external synchronization.
pub trait Mapping<K, V> {
    /// A position in the map. See [`Cursor`](crate::collections::Cursor).
    type Cursor: Copy + Eq + fmt::Debug;

    /// Returns the number of entries.
    fn len(&self) -> usize;

    /// Returns `true` if the map contains no entries.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the value stored under `key`, inserting `V::default()` first
    /// if the key is absent.
    fn get_or_insert(&mut self, key: K) -> &mut V
    where
        V: Default;

    /// Stores `value` under `key`, returning the value it replaced.
    fn insert(&mut self, key: K, value: V) -> Option<V>;

    /// Returns the value stored under `key`.
    ///
    /// # Errors
    ///
    /// [`MapError::NotFound`](crate::error::MapError::NotFound) if the key is absent.
    fn value_of(&self, key: &K) -> Result<&V>;

    /// Returns the value stored under `key` for modification.
    ///
    /// # Errors
    ///
    /// [`MapError::NotFound`](crate::error::MapError::NotFound) if the key is absent.
    fn value_of_mut(&mut self, key: &K) -> Result<&mut V>;

    /// Returns `true` if `key` is present.
    fn contains_key(&self, key: &K) -> bool {
        self.value_of(key).is_ok()
    }

    /// Returns a cursor at `key`, or the end cursor if it is absent.
    fn find(&self, key: &K) -> Self::Cursor;

    /// Removes `key`, returning its value.
    ///
    /// # Errors
    ///
    /// [`MapError::NotFound`](crate::error::MapError::NotFound) if the key is absent.
    fn remove(&mut self, key: &K) -> Result<V>;

    /// Removes the entry under `cursor`, returning it.
    ///
    /// # Errors
    ///
    /// [`MapError::EmptyMap`](crate::error::MapError::EmptyMap) if the map is
    /// empty, or [`MapError::InvalidCursor`](crate::error::MapError::InvalidCursor)
    /// if the cursor is at the end, stale, or from another map.
    fn remove_at(&mut self, cursor: Self::Cursor) -> Result<(K, V)>;

    /// Returns a cursor at the first entry in iteration order, or the end
    /// cursor if the map is empty.
    fn begin(&self) -> Self::Cursor;

    /// Returns the end cursor (one past the last entry).
    fn end(&self) -> Self::Cursor;

    /// Returns the cursor following `cursor`.
    ///
    /// # Errors
    ///
    /// [`MapError::InvalidCursor`](crate::error::MapError::InvalidCursor) if
    /// `cursor` is the end cursor, stale, or from another map.
    fn advance(&self, cursor: Self::Cursor) -> Result<Self::Cursor>;

    /// Returns the cursor preceding `cursor`. Retreating from `end()` lands
    /// on the last entry.
    ///
    /// # Errors
    ///
    /// [`MapError::InvalidCursor`](crate::error::MapError::InvalidCursor) if
    /// `cursor` is the first position, stale, or from another map.
    fn retreat(&self, cursor: Self::Cursor) -> Result<Self::Cursor>;

    /// Returns the entry under `cursor`.
    ///
    /// # Errors
    ///
    /// [`MapError::InvalidCursor`](crate::error::MapError::InvalidCursor) if
    /// `cursor` is the end cursor, stale, or from another map.
    fn entry_at(&self, cursor: Self::Cursor) -> Result<(&K, &V)>;

    /// Returns the value under `cursor` for modification.
    ///
    /// # Errors
    ///
    /// Same as [`entry_at`](Self::entry_at).
    fn value_at_mut(&mut self, cursor: Self::Cursor) -> Result<&mut V>;
}
