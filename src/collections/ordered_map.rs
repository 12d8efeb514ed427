//! Ordered map backed by an unbalanced binary search tree.
//!
//! This module provides [`OrderedMap`], a mutable ordered map. Every entry is
//! one node of a plain binary search tree: smaller keys to the left, greater
//! keys to the right, no duplicates.
//!
//! # Overview
//!
//! - O(h) `get_or_insert`, `value_of`, `find`, `remove`, where h is the tree
//!   height
//! - O(1) amortized cursor movement, O(h) worst case
//! - O(1) `len` and `is_empty`
//!
//! The tree is never rebalanced. Inserting keys in sorted order builds a
//! degenerate chain of height N, and every operation is then O(N). Balancing
//! would be a separate structure built on the same node model.
//!
//! # Examples
//!
//! ```rust
//! use twinmap::collections::OrderedMap;
//!
//! let mut map = OrderedMap::new();
//! for key in [5, 3, 8, 1, 4] {
//!     *map.get_or_insert(key) = key * 10;
//! }
//!
//! // Always ascending, whatever the insertion order.
//! let keys: Vec<&i32> = map.keys().collect();
//! assert_eq!(keys, vec![&1, &3, &4, &5, &8]);
//! ```
//!
//! # Internal Structure
//!
//! Nodes live in an [`Arena`]. Child links own their subtree in the sense
//! that the tree shape decides which nodes are live; the parent link is a
//! back-reference used only to walk upwards during iteration and removal.

use std::borrow::Borrow;
use std::cmp::Ordering;
use std::fmt;
use std::iter::{FromIterator, FusedIterator};
use std::mem;
use std::ops::Index;

use super::arena::{Arena, NodeHandle};
use super::cursor::{Cursor, CursorStamp};
use crate::error::{CursorFault, MapError, Result};
use crate::mapping::Mapping;

// =============================================================================
// Node Definition
// =============================================================================

#[derive(Clone)]
struct TreeNode<K, V> {
    key: K,
    value: V,
    parent: Option<NodeHandle>,
    left: Option<NodeHandle>,
    right: Option<NodeHandle>,
}

/// Which child slot of a parent a node occupies.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Side {
    Left,
    Right,
}

/// Outcome of a search descent.
enum Search {
    Found(NodeHandle),
    /// The key belongs in the empty `side` slot of `parent` (or at the root
    /// when `parent` is `None`).
    Vacant {
        parent: Option<NodeHandle>,
        side: Side,
    },
}

fn leftmost<K, V>(nodes: &Arena<TreeNode<K, V>>, mut handle: NodeHandle) -> NodeHandle {
    while let Some(left) = nodes[handle].left {
        handle = left;
    }
    handle
}

fn rightmost<K, V>(nodes: &Arena<TreeNode<K, V>>, mut handle: NodeHandle) -> NodeHandle {
    while let Some(right) = nodes[handle].right {
        handle = right;
    }
    handle
}

/// In-order successor: the leftmost node of the right subtree, or else the
/// first ancestor reached through a left-child edge.
fn successor<K, V>(nodes: &Arena<TreeNode<K, V>>, handle: NodeHandle) -> Option<NodeHandle> {
    if let Some(right) = nodes[handle].right {
        return Some(leftmost(nodes, right));
    }
    let mut child = handle;
    let mut parent = nodes[handle].parent;
    while let Some(ancestor) = parent {
        if nodes[ancestor].left == Some(child) {
            return Some(ancestor);
        }
        child = ancestor;
        parent = nodes[ancestor].parent;
    }
    None
}

/// In-order predecessor, the mirror image of [`successor`].
fn predecessor<K, V>(nodes: &Arena<TreeNode<K, V>>, handle: NodeHandle) -> Option<NodeHandle> {
    if let Some(left) = nodes[handle].left {
        return Some(rightmost(nodes, left));
    }
    let mut child = handle;
    let mut parent = nodes[handle].parent;
    while let Some(ancestor) = parent {
        if nodes[ancestor].right == Some(child) {
            return Some(ancestor);
        }
        child = ancestor;
        parent = nodes[ancestor].parent;
    }
    None
}

// =============================================================================
// OrderedMap Definition
// =============================================================================

/// An ordered map backed by an unbalanced binary search tree.
///
/// Keys must implement [`Ord`]. Iteration is always in ascending key order.
///
/// `OrderedMap` is a single-threaded structure with no internal locking.
///
/// # Time Complexity
///
/// | Operation        | Average   | Worst (degenerate tree) |
/// |------------------|-----------|-------------------------|
/// | `get_or_insert`  | O(log N)  | O(N)                    |
/// | `value_of`       | O(log N)  | O(N)                    |
/// | `find`           | O(log N)  | O(N)                    |
/// | `remove`         | O(log N)  | O(N)                    |
/// | `begin`          | O(log N)  | O(N)                    |
/// | `len`            | O(1)      | O(1)                    |
///
/// # Examples
///
/// ```rust
/// use twinmap::collections::OrderedMap;
///
/// let mut map = OrderedMap::from([(2, "two"), (1, "one"), (3, "three")]);
/// assert_eq!(map.remove(&2), Ok("two"));
///
/// let entries: Vec<(&i32, &&str)> = map.iter().collect();
/// assert_eq!(entries, vec![(&1, &"one"), (&3, &"three")]);
/// ```
pub struct OrderedMap<K, V> {
    root: Option<NodeHandle>,
    nodes: Arena<TreeNode<K, V>>,
    length: usize,
    stamp: CursorStamp,
}

impl<K, V> OrderedMap<K, V> {
    /// Creates an empty map.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use twinmap::collections::OrderedMap;
    ///
    /// let map: OrderedMap<i32, String> = OrderedMap::new();
    /// assert!(map.is_empty());
    /// assert_eq!(map.height(), 0);
    /// ```
    #[must_use]
    pub fn new() -> Self {
        Self {
            root: None,
            nodes: Arena::new(),
            length: 0,
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

    /// Returns the number of nodes on the longest root-to-leaf path.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use twinmap::collections::OrderedMap;
    ///
    /// // Sorted insertion builds a right-leaning chain.
    /// let chain: OrderedMap<i32, ()> = (1..=5).map(|key| (key, ())).collect();
    /// assert_eq!(chain.height(), 5);
    ///
    /// let bushy: OrderedMap<i32, ()> = [2, 1, 3].into_iter().map(|key| (key, ())).collect();
    /// assert_eq!(bushy.height(), 2);
    /// ```
    #[must_use]
    pub fn height(&self) -> usize {
        let mut height = 0;
        let mut pending: Vec<(NodeHandle, usize)> = self.root.map(|root| (root, 1)).into_iter().collect();
        while let Some((handle, depth)) = pending.pop() {
            height = height.max(depth);
            let node = &self.nodes[handle];
            pending.extend(node.left.map(|left| (left, depth + 1)));
            pending.extend(node.right.map(|right| (right, depth + 1)));
        }
        height
    }

    /// Removes every entry. Invalidates all cursors.
    pub fn clear(&mut self) {
        tracing::trace!(entries = self.length, "clearing ordered map");
        self.root = None;
        self.nodes.clear();
        self.length = 0;
        self.stamp.bump();
    }

    /// Returns the entry with the smallest key.
    ///
    /// # Errors
    ///
    /// `EmptyMap` if the map is empty.
    pub fn first(&self) -> Result<(&K, &V)> {
        let node = &self.nodes[self.first_handle().ok_or(MapError::EmptyMap)?];
        Ok((&node.key, &node.value))
    }

    /// Returns the entry with the greatest key.
    ///
    /// # Errors
    ///
    /// `EmptyMap` if the map is empty.
    pub fn last(&self) -> Result<(&K, &V)> {
        let node = &self.nodes[self.last_handle().ok_or(MapError::EmptyMap)?];
        Ok((&node.key, &node.value))
    }

    /// Removes and returns the entry with the smallest key.
    ///
    /// # Errors
    ///
    /// `EmptyMap` if the map is empty.
    pub fn pop_first(&mut self) -> Result<(K, V)> {
        let handle = self.first_handle().ok_or(MapError::EmptyMap)?;
        Ok(self.detach(handle))
    }

    /// Removes and returns the entry with the greatest key.
    ///
    /// # Errors
    ///
    /// `EmptyMap` if the map is empty.
    pub fn pop_last(&mut self) -> Result<(K, V)> {
        let handle = self.last_handle().ok_or(MapError::EmptyMap)?;
        Ok(self.detach(handle))
    }

    fn first_handle(&self) -> Option<NodeHandle> {
        self.root.map(|root| leftmost(&self.nodes, root))
    }

    fn last_handle(&self) -> Option<NodeHandle> {
        self.root.map(|root| rightmost(&self.nodes, root))
    }

    // -------------------------------------------------------------------------
    // Cursors
    // -------------------------------------------------------------------------

    /// Returns a cursor at the smallest key, or [`end`](Self::end) if the
    /// map is empty.
    #[must_use]
    pub fn begin(&self) -> Cursor {
        self.stamp.cursor(self.first_handle())
    }

    /// Returns the end cursor.
    #[must_use]
    pub const fn end(&self) -> Cursor {
        self.stamp.cursor(None)
    }

    /// Moves `cursor` to the next greater key, or to the end cursor from the
    /// greatest key.
    ///
    /// # Errors
    ///
    /// `InvalidCursor(End)` when `cursor` is the end cursor, and
    /// `InvalidCursor(Stale | ForeignMap)` when it is not a current cursor
    /// of this map.
    pub fn advance(&self, cursor: Cursor) -> Result<Cursor> {
        let handle = self.stamp.check_entry(cursor)?;
        Ok(self.stamp.cursor(successor(&self.nodes, handle)))
    }

    /// Moves `cursor` to the next smaller key. Retreating from the end
    /// cursor lands on the greatest key.
    ///
    /// # Errors
    ///
    /// `InvalidCursor(BeforeBegin)` when there is no smaller key, and
    /// `InvalidCursor(Stale | ForeignMap)` when `cursor` is not a current
    /// cursor of this map.
    pub fn retreat(&self, cursor: Cursor) -> Result<Cursor> {
        let previous = match self.stamp.check(cursor)? {
            Some(handle) => predecessor(&self.nodes, handle),
            None => self.last_handle(),
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
    pub fn remove_at(&mut self, cursor: Cursor) -> Result<(K, V)> {
        let handle = self.stamp.check_removal(cursor, self.is_empty())?;
        Ok(self.detach(handle))
    }

    // -------------------------------------------------------------------------
    // Structural Changes
    // -------------------------------------------------------------------------

    /// Links a new node into the vacant slot found by a search descent.
    fn attach(&mut self, parent: Option<NodeHandle>, side: Side, key: K, value: V) -> NodeHandle {
        let handle = self.nodes.allocate(TreeNode {
            key,
            value,
            parent,
            left: None,
            right: None,
        });
        match (parent, side) {
            (None, _) => self.root = Some(handle),
            (Some(parent), Side::Left) => self.nodes[parent].left = Some(handle),
            (Some(parent), Side::Right) => self.nodes[parent].right = Some(handle),
        }
        self.length += 1;
        self.stamp.bump();

        tracing::trace!(node = ?handle, ?parent, ?side, "attached node");
        handle
    }

    /// Removes the entry held by `handle` from the tree.
    ///
    /// A node with two children keeps its place: the entry of its in-order
    /// successor is swapped into it and the successor node, which has no
    /// left child, is unlinked instead.
    fn detach(&mut self, handle: NodeHandle) -> (K, V) {
        let node = &self.nodes[handle];
        let target = match (node.left, node.right) {
            (Some(_), Some(right)) => {
                let heir = leftmost(&self.nodes, right);
                if let Some((node, heir_node)) = self.nodes.pair_mut(handle, heir) {
                    mem::swap(&mut node.key, &mut heir_node.key);
                    mem::swap(&mut node.value, &mut heir_node.value);
                }
                tracing::trace!(node = ?handle, successor = ?heir, "spliced in-order successor");
                heir
            }
            _ => handle,
        };

        let TreeNode {
            key,
            value,
            parent,
            left,
            right,
        } = match self.nodes.release(target) {
            Some(node) => node,
            None => unreachable!("detached node is reachable from the root"),
        };

        let child = left.or(right);
        if let Some(child) = child {
            self.nodes[child].parent = parent;
        }
        match parent {
            None => self.root = child,
            Some(parent) => {
                let parent_node = &mut self.nodes[parent];
                if parent_node.left == Some(target) {
                    parent_node.left = child;
                } else {
                    parent_node.right = child;
                }
            }
        }
        self.length -= 1;
        self.stamp.bump();
        debug_assert_eq!(self.nodes.len(), self.length);

        tracing::trace!(node = ?target, ?parent, relinked = ?child, "unlinked node");
        (key, value)
    }

    // -------------------------------------------------------------------------
    // Iterators
    // -------------------------------------------------------------------------

    /// Returns an iterator over the entries in ascending key order.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            nodes: &self.nodes,
            front: self.first_handle(),
            back: self.last_handle(),
            remaining: self.length,
        }
    }

    /// Returns an iterator over the entries in ascending key order, with
    /// mutable values.
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

    /// Returns an iterator over the keys in ascending order.
    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys { inner: self.iter() }
    }

    /// Returns an iterator over the values in ascending key order.
    pub fn values(&self) -> Values<'_, K, V> {
        Values { inner: self.iter() }
    }

    /// Returns an iterator over mutable values in ascending key order.
    ///
    /// Allocates like [`iter_mut`](Self::iter_mut).
    pub fn values_mut(&mut self) -> ValuesMut<'_, K, V> {
        ValuesMut {
            inner: self.iter_mut(),
        }
    }

    fn handles(&self) -> impl Iterator<Item = NodeHandle> + '_ {
        std::iter::successors(self.first_handle(), |&handle| successor(&self.nodes, handle))
    }
}

impl<K: Ord, V> OrderedMap<K, V> {
    /// Descends from the root comparing keys.
    fn search<Q>(&self, key: &Q) -> Search
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut parent = None;
        let mut side = Side::Left;
        let mut current = self.root;
        while let Some(handle) = current {
            let node = &self.nodes[handle];
            match key.cmp(node.key.borrow()) {
                Ordering::Less => {
                    side = Side::Left;
                    current = node.left;
                }
                Ordering::Greater => {
                    side = Side::Right;
                    current = node.right;
                }
                Ordering::Equal => return Search::Found(handle),
            }
            parent = Some(handle);
        }
        Search::Vacant { parent, side }
    }

    fn lookup<Q>(&self, key: &Q) -> Option<NodeHandle>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        match self.search(key) {
            Search::Found(handle) => Some(handle),
            Search::Vacant { .. } => None,
        }
    }

    /// Returns the value under `key`, attaching a default-valued leaf first
    /// if the key is absent.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use twinmap::collections::OrderedMap;
    ///
    /// let mut counts: OrderedMap<char, usize> = OrderedMap::new();
    /// for letter in "hello".chars() {
    ///     *counts.get_or_insert(letter) += 1;
    /// }
    /// assert_eq!(counts.value_of(&'l'), Ok(&2));
    /// assert_eq!(counts.len(), 4);
    /// ```
    pub fn get_or_insert(&mut self, key: K) -> &mut V
    where
        V: Default,
    {
        let handle = match self.search(&key) {
            Search::Found(handle) => handle,
            Search::Vacant { parent, side } => self.attach(parent, side, key, V::default()),
        };
        &mut self.nodes[handle].value
    }

    /// Stores `value` under `key`, returning the value it replaced.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        match self.search(&key) {
            Search::Found(handle) => Some(mem::replace(&mut self.nodes[handle].value, value)),
            Search::Vacant { parent, side } => {
                self.attach(parent, side, key, value);
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
        Q: Ord + ?Sized,
    {
        let handle = self.lookup(key).ok_or(MapError::NotFound)?;
        Ok(&self.nodes[handle].value)
    }

    /// Returns the value stored under `key` for modification.
    ///
    /// # Errors
    ///
    /// `NotFound` if the key is absent.
    pub fn value_of_mut<Q>(&mut self, key: &Q) -> Result<&mut V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let handle = self.lookup(key).ok_or(MapError::NotFound)?;
        Ok(&mut self.nodes[handle].value)
    }

    /// Returns `true` if `key` is present.
    #[must_use]
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.lookup(key).is_some()
    }

    /// Returns a cursor at `key`, or the end cursor if it is absent.
    #[must_use]
    pub fn find<Q>(&self, key: &Q) -> Cursor
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.stamp.cursor(self.lookup(key))
    }

    /// Removes `key` and returns its value.
    ///
    /// # Errors
    ///
    /// `NotFound` if the key is absent; the map is unchanged.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use twinmap::collections::OrderedMap;
    ///
    /// // 1 -> 2 -> 3 -> 4 -> 5, each node the right child of the previous.
    /// let mut map: OrderedMap<i32, ()> = (1..=5).map(|key| (key, ())).collect();
    /// map.remove(&3).unwrap();
    ///
    /// let keys: Vec<&i32> = map.keys().collect();
    /// assert_eq!(keys, vec![&1, &2, &4, &5]);
    /// assert_eq!(map.height(), 4);
    /// ```
    pub fn remove<Q>(&mut self, key: &Q) -> Result<V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let handle = self.lookup(key).ok_or(MapError::NotFound)?;
        Ok(self.detach(handle).1)
    }
}

// =============================================================================
// Iterator Implementation
// =============================================================================

/// An iterator over the entries of an [`OrderedMap`] in ascending key order.
pub struct Iter<'a, K, V> {
    nodes: &'a Arena<TreeNode<K, V>>,
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
        self.front = successor(self.nodes, handle);
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
        self.back = predecessor(self.nodes, handle);
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

/// A mutable iterator over the entries of an [`OrderedMap`].
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

/// An iterator over the keys of an [`OrderedMap`] in ascending order.
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

/// An iterator over the values of an [`OrderedMap`] in ascending key order.
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

/// An iterator over mutable values of an [`OrderedMap`].
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

/// An owning iterator over the entries of an [`OrderedMap`].
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

impl<K, V> Default for OrderedMap<K, V> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

/// Deep copy with the same tree shape. The copy is a new map: cursors of the
/// original are foreign to it.
impl<K: Clone, V: Clone> Clone for OrderedMap<K, V> {
    fn clone(&self) -> Self {
        Self {
            root: self.root,
            nodes: self.nodes.clone(),
            length: self.length,
            stamp: CursorStamp::fresh(),
        }
    }
}

impl<K: Ord, V> FromIterator<(K, V)> for OrderedMap<K, V> {
    /// Builds a map from pairs in sequence order; for duplicate keys the
    /// last value wins. The tree shape follows the sequence order.
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        map.extend(iter);
        map
    }
}

impl<K: Ord, V> Extend<(K, V)> for OrderedMap<K, V> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl<K: Ord, V, const N: usize> From<[(K, V); N]> for OrderedMap<K, V> {
    fn from(entries: [(K, V); N]) -> Self {
        entries.into_iter().collect()
    }
}

impl<K, V> IntoIterator for OrderedMap<K, V> {
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

impl<'a, K, V> IntoIterator for &'a OrderedMap<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, K, V> IntoIterator for &'a mut OrderedMap<K, V> {
    type Item = (&'a K, &'a mut V);
    type IntoIter = IterMut<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

/// Two maps are equal when they hold the same key-value pairs. Because both
/// iterate in ascending key order this is a pairwise walk; tree shape is
/// ignored.
impl<K: PartialEq, V: PartialEq> PartialEq for OrderedMap<K, V> {
    fn eq(&self, other: &Self) -> bool {
        self.length == other.length && self.iter().eq(other.iter())
    }
}

impl<K: Eq, V: Eq> Eq for OrderedMap<K, V> {}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for OrderedMap<K, V> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.debug_map().entries(self.iter()).finish()
    }
}

impl<K, Q, V> Index<&Q> for OrderedMap<K, V>
where
    K: Ord + Borrow<Q>,
    Q: Ord + ?Sized,
{
    type Output = V;

    /// # Panics
    ///
    /// Panics if the key is not present. Use
    /// [`value_of`](OrderedMap::value_of) for a checked lookup.
    fn index(&self, key: &Q) -> &V {
        match self.value_of(key) {
            Ok(value) => value,
            Err(error) => panic!("OrderedMap index: {error}"),
        }
    }
}

// =============================================================================
// Mapping Implementation
// =============================================================================

impl<K: Ord, V> Mapping<K, V> for OrderedMap<K, V> {
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

static_assertions::assert_impl_all!(OrderedMap<i32, String>: Send, Sync, Clone, Default);

// =============================================================================
// Tests
// =============================================================================
