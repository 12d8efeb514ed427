//! Slot storage shared by the map implementations.
//!
//! Nodes live in a single `Vec` and refer to each other by [`NodeHandle`]
//! (their position in that `Vec`). Removed slots go on a free list and are
//! reused by later insertions, so handles stay small and the nodes stay
//! close together in memory. There is no compaction.
//!
//! The arena is the sole owner of every node. Links between nodes are plain
//! handles: they never keep a node alive, and dropping the arena drops every
//! node in one pass with no recursion.

use std::fmt;

/// Position of a node in an [`Arena`].
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct NodeHandle(usize);

impl NodeHandle {
    /// The slot index this handle points at.
    #[inline]
    pub(crate) const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Debug for NodeHandle {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, "#{}", self.0)
    }
}

/// A slot-reusing node store.
#[derive(Clone)]
pub(crate) struct Arena<T> {
    /// Node storage. `None` marks a free slot.
    slots: Vec<Option<T>>,

    /// Slots that can be reused by the next allocation.
    free: Vec<NodeHandle>,
}

impl<T> Arena<T> {
    pub(crate) const fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
        }
    }

    /// Number of live nodes.
    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    /// Stores `node` and returns its handle.
    pub(crate) fn allocate(&mut self, node: T) -> NodeHandle {
        match self.free.pop() {
            Some(handle) => {
                self.slots[handle.0] = Some(node);
                handle
            }
            None => {
                self.slots.push(Some(node));
                NodeHandle(self.slots.len() - 1)
            }
        }
    }

    /// Takes the node out of its slot and freelists the slot.
    pub(crate) fn release(&mut self, handle: NodeHandle) -> Option<T> {
        let node = self.slots.get_mut(handle.0)?.take()?;
        self.free.push(handle);
        Some(node)
    }

    #[inline]
    pub(crate) fn get(&self, handle: NodeHandle) -> Option<&T> {
        self.slots.get(handle.0).and_then(Option::as_ref)
    }

    #[inline]
    pub(crate) fn get_mut(&mut self, handle: NodeHandle) -> Option<&mut T> {
        self.slots.get_mut(handle.0).and_then(Option::as_mut)
    }

    /// Borrows two distinct live nodes mutably at once.
    ///
    /// Returns `None` if the handles are equal or either slot is free.
    pub(crate) fn pair_mut(
        &mut self,
        first: NodeHandle,
        second: NodeHandle,
    ) -> Option<(&mut T, &mut T)> {
        let [first, second] = self.slots.get_disjoint_mut([first.0, second.0]).ok()?;
        Some((first.as_mut()?, second.as_mut()?))
    }

    /// Drops every node.
    pub(crate) fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
    }

    /// Returns a slot-indexed table of mutable node references.
    ///
    /// Callers take entries out of the table in whatever order they need,
    /// which hands out disjoint `&mut` borrows without any aliasing.
    pub(crate) fn slots_mut(&mut self) -> Vec<Option<&mut T>> {
        self.slots.iter_mut().map(Option::as_mut).collect()
    }

    /// Consumes the arena, returning a slot-indexed table of owned nodes.
    pub(crate) fn into_slots(self) -> Vec<Option<T>> {
        self.slots
    }
}

impl<T> std::ops::Index<NodeHandle> for Arena<T> {
    type Output = T;

    /// # Panics
    ///
    /// Panics if `handle` refers to a free slot. Map code only indexes with
    /// handles reachable from its own links, which are always live.
    fn index(&self, handle: NodeHandle) -> &T {
        match self.get(handle) {
            Some(node) => node,
            None => panic!("arena slot {handle:?} is not live"),
        }
    }
}

impl<T> std::ops::IndexMut<NodeHandle> for Arena<T> {
    fn index_mut(&mut self, handle: NodeHandle) -> &mut T {
        match self.get_mut(handle) {
            Some(node) => node,
            None => panic!("arena slot {handle:?} is not live"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn test_allocate_and_get() {
        let mut arena = Arena::new();
        let first = arena.allocate("first");
        let second = arena.allocate("second");

        assert_eq!(arena.len(), 2);
        assert_eq!(arena.get(first), Some(&"first"));
        assert_eq!(arena[second], "second");
    }

    #[rstest]
    fn test_release_freelists_slot_for_reuse() {
        let mut arena = Arena::new();
        let first = arena.allocate(1);
        let _second = arena.allocate(2);

        assert_eq!(arena.release(first), Some(1));
        assert_eq!(arena.len(), 1);
        assert_eq!(arena.get(first), None);

        let third = arena.allocate(3);
        assert_eq!(third, first);
        assert_eq!(arena[third], 3);
        assert_eq!(arena.len(), 2);
    }

    #[rstest]
    fn test_release_twice_returns_none() {
        let mut arena = Arena::new();
        let handle = arena.allocate(1);
        assert_eq!(arena.release(handle), Some(1));
        assert_eq!(arena.release(handle), None);
        assert_eq!(arena.len(), 0);
    }

    #[rstest]
    fn test_slots_mut_hands_out_disjoint_borrows() {
        let mut arena = Arena::new();
        let first = arena.allocate(1);
        let second = arena.allocate(2);

        let mut table = arena.slots_mut();
        let second_ref = table[second.index()].take();
        let first_ref = table[first.index()].take();
        if let (Some(first_ref), Some(second_ref)) = (first_ref, second_ref) {
            std::mem::swap(first_ref, second_ref);
        }

        assert_eq!(arena[first], 2);
        assert_eq!(arena[second], 1);
    }

    #[rstest]
    fn test_pair_mut_borrows_two_nodes() {
        let mut arena = Arena::new();
        let first = arena.allocate(1);
        let second = arena.allocate(2);

        if let Some((first_node, second_node)) = arena.pair_mut(first, second) {
            std::mem::swap(first_node, second_node);
        }
        assert_eq!(arena[first], 2);
        assert_eq!(arena[second], 1);
    }

    #[rstest]
    fn test_pair_mut_rejects_same_or_free_handle() {
        let mut arena = Arena::new();
        let first = arena.allocate(1);
        let second = arena.allocate(2);
        assert!(arena.pair_mut(first, first).is_none());

        arena.release(second);
        assert!(arena.pair_mut(first, second).is_none());
    }

    #[rstest]
    fn test_clear_empties_arena() {
        let mut arena = Arena::new();
        arena.allocate(1);
        arena.allocate(2);
        arena.clear();
        assert_eq!(arena.len(), 0);
    }

    #[rstest]
    #[should_panic(expected = "is not live")]
    fn test_index_on_free_slot_panics() {
        let mut arena = Arena::new();
        let handle = arena.allocate(1);
        arena.release(handle);
        let _value = arena[handle];
    }
}
