//! Mutable binary min-heap with stable handles
//!
//! A binary min-heap stored implicitly in a dense sequence (children of slot
//! `i` at `2i + 1` and `2i + 2`, parent at `(i - 1) / 2`), where every element
//! lives in an arena node that remembers its current slot. `push` hands back a
//! [`MutableHandle`] to that node, which stays valid while the element moves
//! around the tree, so callers can change or remove an interior element in
//! O(log n) without searching for it.
//!
//! # Time Complexity
//!
//! | Operation                      | Complexity |
//! |--------------------------------|------------|
//! | `push`                         | O(log n)   |
//! | `pop`                          | O(log n)   |
//! | `top` / `peek`                 | O(1)       |
//! | `swap_top` / `emplace_top`     | O(log n)   |
//! | `update` / `ensure_priority`   | O(log n)   |
//! | `erase`                        | O(log n)   |
//! | `maintain_*`                   | O(log n)   |
//! | `clear`                        | O(n)       |
//!
//! # Handles
//!
//! A handle is valid from the moment `push` returns it until its element is
//! removed by `pop`, `erase` or `clear`. Validity is checked at runtime: every
//! handle-addressed operation returns [`HeapError::InvalidHandle`] for a
//! removed element or for a handle issued by a different heap, and leaves the
//! heap untouched.
//!
//! # Ordering of equal elements
//!
//! The comparator is the only source of ordering. Elements that compare equal
//! may come out of `pop` in any order; the heap is not stable.
//!
//! # Example
//!
//! ```rust
//! use mutable_heap::MutableMinHeap;
//!
//! let mut heap = MutableMinHeap::new();
//! let one = heap.push(1);
//! heap.push(2);
//! let ten = heap.push(10);
//! heap.push(5);
//!
//! assert_eq!(heap.top(), Ok(&1));
//! assert!(heap.ensure_priority(ten, 0).unwrap());
//! assert_eq!(heap.peek_handle(), Some(ten));
//!
//! heap.update(ten, 10).unwrap();
//! assert_eq!(heap.peek_handle(), Some(one));
//!
//! assert_eq!(heap.into_sorted_vec(), vec![1, 2, 5, 10]);
//! ```

use std::fmt;
use std::iter::FusedIterator;
use std::mem;
use std::slice;

use crate::compare::{Comparator, NaturalOrder};
use crate::storage::{HandleSequence, HeapId, NodeArena, NodeKey};
use crate::traits::{DecreaseKeyHeap, Handle, Heap, HeapError};

/// Handle to an element in a [`MutableMinHeap`]
///
/// Handles are cheap to copy and compare. Two handles are equal exactly when
/// they address the same element of the same heap.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct MutableHandle {
    key: NodeKey,
    heap: HeapId,
}

impl Handle for MutableHandle {}

/// Binary min-heap whose elements can be changed or removed through handles
///
/// # Type Parameters
/// - `T`: the element type
/// - `C`: the [`Comparator`] ordering elements, [`NaturalOrder`] by default
/// - `S`: the [`HandleSequence`] backing the implicit tree, `Vec` by default
///
/// # Cloning
///
/// Cloning deep-copies every element into a heap with its own identity. The
/// clone rejects every handle issued by the original, including handles taken
/// before the clone; use [`MutableMinHeap::handles`] on the clone to address
/// its elements.
///
/// # Equality
///
/// Two heaps are equal when they hold the same multiset of elements,
/// regardless of how those elements are laid out internally. Elements are
/// grouped by the comparator of the left-hand heap and then matched with
/// `PartialEq`.
pub struct MutableMinHeap<T, C = NaturalOrder, S = Vec<NodeKey>> {
    nodes: NodeArena<T>,
    sequence: S,
    comparator: C,
    id: HeapId,
}

// Both arenas mint the same keys after a clone, so the copy needs its own id
impl<T: Clone, C: Clone, S: Clone> Clone for MutableMinHeap<T, C, S> {
    fn clone(&self) -> Self {
        MutableMinHeap {
            nodes: self.nodes.clone(),
            sequence: self.sequence.clone(),
            comparator: self.comparator.clone(),
            id: HeapId::fresh(),
        }
    }
}

impl<T: Ord> MutableMinHeap<T> {
    /// Creates an empty heap ordered by `T`'s natural order
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Creates an empty heap with room for `capacity` elements
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_comparator(capacity, NaturalOrder)
    }
}

impl<T, C> MutableMinHeap<T, C> {
    /// Creates an empty heap ordered by `comparator`
    pub fn with_comparator(comparator: C) -> Self {
        Self::with_capacity_and_comparator(0, comparator)
    }

    /// Creates an empty heap ordered by `comparator` with room for `capacity`
    /// elements
    pub fn with_capacity_and_comparator(capacity: usize, comparator: C) -> Self {
        Self::with_sequence_capacity(capacity, comparator)
    }
}

impl<T, C, S: HandleSequence> MutableMinHeap<T, C, S> {
    /// Creates an empty heap over a custom backing sequence
    ///
    /// ```rust
    /// # #[cfg(feature = "smallvec")] {
    /// use mutable_heap::compare::NaturalOrder;
    /// use mutable_heap::storage::NodeKey;
    /// use mutable_heap::MutableMinHeap;
    /// use smallvec::SmallVec;
    ///
    /// let mut heap: MutableMinHeap<u8, NaturalOrder, SmallVec<[NodeKey; 8]>> =
    ///     MutableMinHeap::with_sequence_capacity(8, NaturalOrder);
    /// heap.push(3);
    /// heap.push(1);
    /// assert_eq!(heap.pop(), Ok(1));
    /// # }
    /// ```
    pub fn with_sequence_capacity(capacity: usize, comparator: C) -> Self {
        MutableMinHeap {
            nodes: NodeArena::with_capacity(capacity),
            sequence: S::with_capacity(capacity),
            comparator,
            id: HeapId::fresh(),
        }
    }

    /// Returns the number of elements in the heap
    #[inline]
    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    /// Returns true if the heap is empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }

    /// Returns the number of elements the backing sequence can hold without
    /// reallocating
    pub fn capacity(&self) -> usize {
        self.sequence.capacity()
    }

    /// Reserves room for at least `additional` more elements
    pub fn reserve(&mut self, additional: usize) {
        tracing::trace!(len = self.len(), additional, "reserving heap capacity");
        self.sequence.reserve(additional);
        self.nodes.reserve(additional);
    }

    /// Releases unused capacity of the backing sequence
    pub fn shrink_to_fit(&mut self) {
        self.sequence.shrink_to_fit();
    }

    /// Returns the comparator ordering this heap
    pub fn comparator(&self) -> &C {
        &self.comparator
    }

    /// Removes every element, invalidating all outstanding handles
    pub fn clear(&mut self) {
        tracing::trace!(len = self.len(), "clearing heap");
        self.sequence.clear();
        self.nodes.clear();
    }

    /// Returns the minimum element, or `None` if the heap is empty
    #[inline]
    pub fn peek(&self) -> Option<&T> {
        self.sequence
            .as_slice()
            .first()
            .map(|&key| self.nodes.value(key))
    }

    /// Returns the minimum element
    ///
    /// # Errors
    /// `HeapError::EmptyHeap` if the heap holds no elements.
    #[inline]
    pub fn top(&self) -> Result<&T, HeapError> {
        self.peek().ok_or(HeapError::EmptyHeap)
    }

    /// Returns the handle of the minimum element, or `None` if empty
    pub fn peek_handle(&self) -> Option<MutableHandle> {
        self.sequence
            .as_slice()
            .first()
            .map(|&key| self.handle_for(key))
    }

    /// Returns true if `handle` addresses a live element of this heap
    pub fn contains(&self, handle: MutableHandle) -> bool {
        handle.heap == self.id && self.nodes.contains(handle.key)
    }

    /// Borrows the element addressed by `handle`
    pub fn get(&self, handle: MutableHandle) -> Result<&T, HeapError> {
        let key = self.resolve(handle)?;
        Ok(self.nodes.value(key))
    }

    /// Mutably borrows the element addressed by `handle`
    ///
    /// Changing the element's ordering through this reference leaves the heap
    /// unordered until one of [`maintain_towards_top`](Self::maintain_towards_top),
    /// [`maintain_towards_bottom`](Self::maintain_towards_bottom) or
    /// [`maintain_update`](Self::maintain_update) is called for the same handle.
    pub fn get_mut(&mut self, handle: MutableHandle) -> Result<&mut T, HeapError> {
        let key = self.resolve(handle)?;
        Ok(self.nodes.value_mut(key))
    }

    /// Returns the slot currently occupied by the element addressed by `handle`
    ///
    /// Slot 0 is the root. Slots change as other elements come and go.
    pub fn position(&self, handle: MutableHandle) -> Result<usize, HeapError> {
        let key = self.resolve(handle)?;
        Ok(self.nodes.slot(key))
    }

    /// Iterates over `(handle, element)` pairs in heap-array order
    ///
    /// The root comes first; the order of the remaining elements is
    /// unspecified and is never sorted order.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            keys: self.sequence.as_slice().iter(),
            nodes: &self.nodes,
            heap: self.id,
        }
    }

    /// Iterates over the handles of all elements in heap-array order
    pub fn handles(&self) -> Handles<'_> {
        Handles {
            keys: self.sequence.as_slice().iter(),
            heap: self.id,
        }
    }

    /// Iterates over all elements in heap-array order
    pub fn values(&self) -> Values<'_, T> {
        Values {
            keys: self.sequence.as_slice().iter(),
            nodes: &self.nodes,
        }
    }

    /// Consumes the heap, returning its elements in heap-array order
    pub fn into_vec(mut self) -> Vec<T> {
        let keys = mem::take(&mut self.sequence);
        keys.as_slice()
            .iter()
            .map(|&key| self.take_node(key))
            .collect()
    }

    /// Borrows the comparator alongside the element addressed by `handle`
    pub(crate) fn comparator_and_value_mut(
        &mut self,
        handle: MutableHandle,
    ) -> Result<(&C, &mut T), HeapError> {
        let key = self.resolve(handle)?;
        Ok((&self.comparator, self.nodes.value_mut(key)))
    }

    fn handle_for(&self, key: NodeKey) -> MutableHandle {
        MutableHandle { key, heap: self.id }
    }

    fn resolve(&self, handle: MutableHandle) -> Result<NodeKey, HeapError> {
        if self.contains(handle) {
            Ok(handle.key)
        } else {
            tracing::debug!(?handle, heap = ?self.id, "rejected invalid heap handle");
            Err(HeapError::InvalidHandle)
        }
    }

    fn root_key(&self) -> Result<NodeKey, HeapError> {
        self.sequence
            .as_slice()
            .first()
            .copied()
            .ok_or(HeapError::EmptyHeap)
    }

    /// Removes a node known to be live and returns its element
    fn take_node(&mut self, key: NodeKey) -> T {
        match self.nodes.remove(key) {
            Some(node) => node.value,
            None => unreachable!("heap sequence referenced a key missing from the arena"),
        }
    }

    /// Exchanges the keys in slots `a` and `b` and rewrites both nodes' slots
    ///
    /// Every movement of a key within the sequence goes through here, which
    /// keeps `sequence[node.slot] == key` for every node.
    #[inline]
    fn swap_slots(&mut self, a: usize, b: usize) {
        let seq = self.sequence.as_mut_slice();
        seq.swap(a, b);
        let (key_a, key_b) = (seq[a], seq[b]);
        self.nodes.set_slot(key_a, a);
        self.nodes.set_slot(key_b, b);
    }
}

impl<T, C: Comparator<T>, S: HandleSequence> MutableMinHeap<T, C, S> {
    /// Inserts an element, returning a handle to it
    ///
    /// # Time Complexity
    /// O(log n)
    pub fn push(&mut self, value: T) -> MutableHandle {
        let slot = self.sequence.len();
        let key = self.nodes.insert(value, slot);
        self.sequence.push(key);
        self.bubble_up(key);
        self.handle_for(key)
    }

    /// Removes and returns the minimum element
    ///
    /// The handle of the removed element becomes invalid.
    ///
    /// # Errors
    /// `HeapError::EmptyHeap` if the heap holds no elements.
    pub fn pop(&mut self) -> Result<T, HeapError> {
        let last = self
            .sequence
            .len()
            .checked_sub(1)
            .ok_or(HeapError::EmptyHeap)?;
        self.swap_slots(0, last);
        let key = self.sequence.pop().ok_or(HeapError::EmptyHeap)?;
        let value = self.take_node(key);

        if let Some(&root) = self.sequence.as_slice().first() {
            self.bubble_down(root);
        }
        Ok(value)
    }

    /// Exchanges the minimum element with `other`, then restores heap order
    ///
    /// Afterwards `other` holds the old minimum. The element swapped in may end
    /// up anywhere in the heap. This replaces a `pop` followed by a `push`, as
    /// in a k-way merge, with a single O(log n) pass.
    ///
    /// # Errors
    /// `HeapError::EmptyHeap` if the heap holds no elements; `other` is left
    /// untouched.
    pub fn swap_top(&mut self, other: &mut T) -> Result<(), HeapError> {
        let root = self.root_key()?;
        mem::swap(self.nodes.value_mut(root), other);
        self.bubble_down(root);
        Ok(())
    }

    /// Replaces the minimum element with `value`, returning the old minimum
    ///
    /// # Errors
    /// `HeapError::EmptyHeap` if the heap holds no elements.
    pub fn replace_top(&mut self, mut value: T) -> Result<T, HeapError> {
        self.swap_top(&mut value)?;
        Ok(value)
    }

    /// Overwrites the minimum element with `value`, dropping the old one
    ///
    /// # Errors
    /// `HeapError::EmptyHeap` if the heap holds no elements.
    pub fn emplace_top(&mut self, value: T) -> Result<(), HeapError> {
        self.emplace_top_with(|| value)
    }

    /// Overwrites the minimum element with the value built by `make`
    ///
    /// `make` is not called when the heap is empty.
    pub fn emplace_top_with<F: FnOnce() -> T>(&mut self, make: F) -> Result<(), HeapError> {
        let root = self.root_key()?;
        *self.nodes.value_mut(root) = make();
        self.bubble_down(root);
        Ok(())
    }

    /// Assigns `value` to the element addressed by `handle`, then moves it
    /// toward the root if it became smaller or toward the leaves if it became
    /// larger
    ///
    /// Only one direction is ever attempted.
    pub fn update(&mut self, handle: MutableHandle, value: T) -> Result<(), HeapError> {
        let key = self.resolve(handle)?;
        let current = self.nodes.value(key);
        let decreased = self.comparator.less(&value, current);
        let increased = !decreased && self.comparator.less(current, &value);

        *self.nodes.value_mut(key) = value;
        if decreased {
            self.bubble_up(key);
        } else if increased {
            self.bubble_down(key);
        }
        Ok(())
    }

    /// Lowers the element addressed by `handle` to `candidate` if `candidate`
    /// orders strictly before it
    ///
    /// Returns `Ok(true)` if the element changed and `Ok(false)` if it was left
    /// as is. This is the decrease-key primitive; use [`update`](Self::update)
    /// to raise an element.
    pub fn ensure_priority(&mut self, handle: MutableHandle, candidate: T) -> Result<bool, HeapError> {
        let key = self.resolve(handle)?;
        if !self.comparator.less(&candidate, self.nodes.value(key)) {
            return Ok(false);
        }
        *self.nodes.value_mut(key) = candidate;
        self.bubble_up(key);
        Ok(true)
    }

    /// Removes the element addressed by `handle` and returns it
    ///
    /// The last element of the sequence is moved into the vacated slot and
    /// then re-positioned in whichever direction it violates heap order.
    pub fn erase(&mut self, handle: MutableHandle) -> Result<T, HeapError> {
        let key = self.resolve(handle)?;
        let slot = self.nodes.slot(key);
        let last = self.sequence.len() - 1;
        if slot != last {
            self.swap_slots(slot, last);
        }
        self.sequence.pop();
        let value = self.take_node(key);

        if let Some(&moved) = self.sequence.as_slice().get(slot) {
            self.maintain(moved);
        }
        Ok(value)
    }

    /// Moves the element addressed by `handle` toward the root while it orders
    /// before its parent
    ///
    /// Returns whether the element moved.
    pub fn maintain_towards_top(&mut self, handle: MutableHandle) -> Result<bool, HeapError> {
        let key = self.resolve(handle)?;
        Ok(self.bubble_up(key))
    }

    /// Moves the element addressed by `handle` toward the leaves while one of
    /// its children orders before it
    ///
    /// Returns whether the element moved.
    pub fn maintain_towards_bottom(&mut self, handle: MutableHandle) -> Result<bool, HeapError> {
        let key = self.resolve(handle)?;
        Ok(self.bubble_down(key))
    }

    /// Moves the element addressed by `handle` toward the root if it can,
    /// otherwise toward the leaves
    ///
    /// Returns whether the element moved.
    pub fn maintain_update(&mut self, handle: MutableHandle) -> Result<bool, HeapError> {
        let key = self.resolve(handle)?;
        Ok(self.maintain(key))
    }

    /// Consumes the heap, returning its elements in ascending order
    pub fn into_sorted_vec(mut self) -> Vec<T> {
        let mut sorted = Vec::with_capacity(self.len());
        while let Ok(value) = self.pop() {
            sorted.push(value);
        }
        sorted
    }

    /// Checks heap order and slot bookkeeping for every element
    ///
    /// Returns false if any element orders before its parent, if a node's
    /// recorded slot disagrees with where its key sits in the sequence, or if
    /// the arena holds nodes the sequence does not reference.
    pub fn is_valid(&self) -> bool {
        let keys = self.sequence.as_slice();
        if keys.len() != self.nodes.len() {
            return false;
        }
        keys.iter().enumerate().all(|(slot, &key)| {
            let in_place = self.nodes.get(key).is_some_and(|node| node.slot == slot);
            in_place && (slot == 0 || !self.less_at(slot, (slot - 1) / 2))
        })
    }

    #[inline]
    fn less_at(&self, a: usize, b: usize) -> bool {
        let keys = self.sequence.as_slice();
        self.comparator
            .less(self.nodes.value(keys[a]), self.nodes.value(keys[b]))
    }

    /// Moves `key` up while it orders before its parent
    fn bubble_up(&mut self, key: NodeKey) -> bool {
        let mut index = self.nodes.slot(key);
        let mut moved = false;
        while index > 0 {
            let parent = (index - 1) / 2;
            if self.less_at(index, parent) {
                self.swap_slots(index, parent);
                index = parent;
                moved = true;
            } else {
                break;
            }
        }
        moved
    }

    /// Moves `key` down toward the smaller child while that child orders
    /// before it
    fn bubble_down(&mut self, key: NodeKey) -> bool {
        let mut index = self.nodes.slot(key);
        let len = self.sequence.len();
        let mut moved = false;
        loop {
            let left = 2 * index + 1;
            let right = 2 * index + 2;
            let mut smallest = index;

            if left < len && self.less_at(left, smallest) {
                smallest = left;
            }
            if right < len && self.less_at(right, smallest) {
                smallest = right;
            }

            if smallest != index {
                self.swap_slots(index, smallest);
                index = smallest;
                moved = true;
            } else {
                break;
            }
        }
        moved
    }

    fn maintain(&mut self, key: NodeKey) -> bool {
        self.bubble_up(key) || self.bubble_down(key)
    }

    fn ordering(&self, a: &T, b: &T) -> std::cmp::Ordering {
        if self.comparator.less(a, b) {
            std::cmp::Ordering::Less
        } else if self.comparator.less(b, a) {
            std::cmp::Ordering::Greater
        } else {
            std::cmp::Ordering::Equal
        }
    }
}

impl<T, C, S> MutableMinHeap<T, C, S>
where
    T: PartialEq,
    C: Comparator<T>,
    S: HandleSequence,
{
    /// Returns true if both heaps hold the same multiset of elements
    pub fn same_elements<S2: HandleSequence>(&self, other: &MutableMinHeap<T, C, S2>) -> bool {
        if self.len() != other.len() {
            return false;
        }

        let mut ours: Vec<&T> = self.values().collect();
        let mut theirs: Vec<&T> = other.values().collect();
        ours.sort_by(|a, b| self.ordering(a, b));
        theirs.sort_by(|a, b| self.ordering(a, b));

        // Walk runs of equivalent elements; within a run, match by equality
        let mut start = 0;
        while start < ours.len() {
            let head = ours[start];
            let mut end = start + 1;
            while end < ours.len() && self.ordering(head, ours[end]).is_eq() {
                end += 1;
            }
            if !theirs[start..end]
                .iter()
                .all(|t| self.ordering(head, t).is_eq())
            {
                return false;
            }
            if end < theirs.len() && self.ordering(head, theirs[end]).is_eq() {
                return false;
            }

            let mut matched = vec![false; end - start];
            for value in &ours[start..end] {
                let found = theirs[start..end]
                    .iter()
                    .zip(matched.iter_mut())
                    .find(|(t, used)| !**used && **t == *value);
                match found {
                    Some((_, used)) => *used = true,
                    None => return false,
                }
            }
            start = end;
        }
        true
    }
}

impl<T, C, S> PartialEq for MutableMinHeap<T, C, S>
where
    T: PartialEq,
    C: Comparator<T>,
    S: HandleSequence,
{
    fn eq(&self, other: &Self) -> bool {
        self.same_elements(other)
    }
}

impl<T, C, S> Eq for MutableMinHeap<T, C, S>
where
    T: Eq,
    C: Comparator<T>,
    S: HandleSequence,
{
}

impl<T: fmt::Debug, C, S: HandleSequence> fmt::Debug for MutableMinHeap<T, C, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.values()).finish()
    }
}

impl<T, C: Default, S: HandleSequence> Default for MutableMinHeap<T, C, S> {
    fn default() -> Self {
        Self::with_sequence_capacity(0, C::default())
    }
}

impl<T, C: Comparator<T>, S: HandleSequence> Extend<T> for MutableMinHeap<T, C, S> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        let iter = iter.into_iter();
        self.reserve(iter.size_hint().0);
        for value in iter {
            self.push(value);
        }
    }
}

impl<T, C, S> FromIterator<T> for MutableMinHeap<T, C, S>
where
    C: Comparator<T> + Default,
    S: HandleSequence,
{
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut heap = Self::default();
        heap.extend(iter);
        heap
    }
}

impl<'a, T, C, S: HandleSequence> IntoIterator for &'a MutableMinHeap<T, C, S> {
    type Item = (MutableHandle, &'a T);
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<T, C: Comparator<T>, S: HandleSequence> IntoIterator for MutableMinHeap<T, C, S> {
    type Item = T;
    type IntoIter = IntoIterSorted<T, C, S>;

    /// Consumes the heap, yielding elements in ascending order
    fn into_iter(self) -> Self::IntoIter {
        IntoIterSorted { heap: self }
    }
}

impl<T, C, S> Heap<T> for MutableMinHeap<T, C, S>
where
    C: Comparator<T> + Default,
    S: HandleSequence,
{
    fn new() -> Self {
        Self::default()
    }

    fn is_empty(&self) -> bool {
        MutableMinHeap::is_empty(self)
    }

    fn len(&self) -> usize {
        MutableMinHeap::len(self)
    }

    fn push(&mut self, item: T) {
        MutableMinHeap::push(self, item);
    }

    fn peek(&self) -> Option<&T> {
        MutableMinHeap::peek(self)
    }

    fn pop(&mut self) -> Option<T> {
        MutableMinHeap::pop(self).ok()
    }

    fn merge(&mut self, other: Self) {
        self.extend(other.into_vec());
    }
}

impl<T, C, S> DecreaseKeyHeap<T> for MutableMinHeap<T, C, S>
where
    C: Comparator<T> + Default,
    S: HandleSequence,
{
    type Handle = MutableHandle;

    fn push_with_handle(&mut self, item: T) -> Self::Handle {
        MutableMinHeap::push(self, item)
    }

    fn decrease_key(&mut self, handle: &Self::Handle, new_value: T) -> Result<(), HeapError> {
        if self.ensure_priority(*handle, new_value)? {
            Ok(())
        } else {
            Err(HeapError::PriorityNotDecreased)
        }
    }
}

/// Iterator over `(handle, element)` pairs in heap-array order
pub struct Iter<'a, T> {
    keys: slice::Iter<'a, NodeKey>,
    nodes: &'a NodeArena<T>,
    heap: HeapId,
}

impl<T> Clone for Iter<'_, T> {
    fn clone(&self) -> Self {
        Iter {
            keys: self.keys.clone(),
            nodes: self.nodes,
            heap: self.heap,
        }
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = (MutableHandle, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        let key = *self.keys.next()?;
        let handle = MutableHandle { key, heap: self.heap };
        Some((handle, self.nodes.value(key)))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.keys.size_hint()
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}
impl<T> FusedIterator for Iter<'_, T> {}

/// Iterator over element handles in heap-array order
#[derive(Clone)]
pub struct Handles<'a> {
    keys: slice::Iter<'a, NodeKey>,
    heap: HeapId,
}

impl Iterator for Handles<'_> {
    type Item = MutableHandle;

    fn next(&mut self) -> Option<MutableHandle> {
        let key = *self.keys.next()?;
        Some(MutableHandle { key, heap: self.heap })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.keys.size_hint()
    }
}

impl ExactSizeIterator for Handles<'_> {}
impl FusedIterator for Handles<'_> {}

/// Iterator over elements in heap-array order
pub struct Values<'a, T> {
    keys: slice::Iter<'a, NodeKey>,
    nodes: &'a NodeArena<T>,
}

impl<T> Clone for Values<'_, T> {
    fn clone(&self) -> Self {
        Values {
            keys: self.keys.clone(),
            nodes: self.nodes,
        }
    }
}

impl<'a, T> Iterator for Values<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<&'a T> {
        let key = *self.keys.next()?;
        Some(self.nodes.value(key))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.keys.size_hint()
    }
}

impl<T> ExactSizeIterator for Values<'_, T> {}
impl<T> FusedIterator for Values<'_, T> {}

/// Owning iterator yielding elements in ascending order
pub struct IntoIterSorted<T, C = NaturalOrder, S = Vec<NodeKey>> {
    heap: MutableMinHeap<T, C, S>,
}

impl<T, C: Comparator<T>, S: HandleSequence> Iterator for IntoIterSorted<T, C, S> {
    type Item = T;

    fn next(&mut self) -> Option<T> {
        self.heap.pop().ok()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.heap.len();
        (len, Some(len))
    }
}

impl<T, C: Comparator<T>, S: HandleSequence> ExactSizeIterator for IntoIterSorted<T, C, S> {}
impl<T, C: Comparator<T>, S: HandleSequence> FusedIterator for IntoIterSorted<T, C, S> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compare::{FnComparator, ReverseOrder};

    fn heap_of(values: &[i32]) -> (MutableMinHeap<i32>, Vec<MutableHandle>) {
        let mut heap = MutableMinHeap::new();
        let handles = values.iter().map(|&v| heap.push(v)).collect();
        (heap, handles)
    }

    #[test]
    fn test_basic_operations() {
        let mut heap = MutableMinHeap::new();

        assert!(heap.is_empty());
        assert_eq!(heap.len(), 0);
        assert_eq!(heap.top(), Err(HeapError::EmptyHeap));

        heap.push(3);
        heap.push(1);
        heap.push(2);

        assert!(!heap.is_empty());
        assert_eq!(heap.len(), 3);
        assert_eq!(heap.top(), Ok(&1));

        assert_eq!(heap.pop(), Ok(1));
        assert_eq!(heap.pop(), Ok(2));
        assert_eq!(heap.pop(), Ok(3));
        assert_eq!(heap.pop(), Err(HeapError::EmptyHeap));
        assert!(heap.is_valid());
    }

    #[test]
    fn test_swap_and_emplace_top_scenario() {
        let (mut heap, _) = heap_of(&[1, 2, 10, 5]);
        assert_eq!(heap.top(), Ok(&1));
        assert_eq!(heap.len(), 4);

        let mut other = 0;
        heap.swap_top(&mut other).unwrap();
        assert_eq!(heap.len(), 4);
        assert_eq!(heap.top(), Ok(&0));
        assert_eq!(other, 1);

        heap.emplace_top(other).unwrap();
        assert_eq!(heap.len(), 4);
        assert_eq!(heap.top(), Ok(&1));

        assert_eq!(heap.pop(), Ok(1));
        assert_eq!(heap.top(), Ok(&2));
        assert_eq!(heap.pop(), Ok(2));
        assert_eq!(heap.top(), Ok(&5));
        assert_eq!(heap.pop(), Ok(5));
        assert_eq!(heap.top(), Ok(&10));
        assert_eq!(heap.pop(), Ok(10));
        assert!(heap.is_empty());
    }

    #[test]
    fn test_maintain_primitives_scenario() {
        let (mut heap, handles) = heap_of(&[1, 2, 10, 5]);
        let (x1, x10, x5) = (handles[0], handles[2], handles[3]);
        assert_eq!(heap.get(x10), Ok(&10));
        assert_eq!(heap.peek_handle(), Some(x1));

        *heap.get_mut(x10).unwrap() = 0;
        assert_eq!(heap.maintain_towards_top(x10), Ok(true));
        assert_eq!(heap.peek_handle(), Some(x10));
        assert_eq!(heap.top(), heap.get(x10));

        *heap.get_mut(x10).unwrap() = 10;
        assert_eq!(heap.maintain_towards_bottom(x10), Ok(true));
        assert_eq!(heap.peek_handle(), Some(x1));

        *heap.get_mut(x5).unwrap() = 0;
        assert_eq!(heap.maintain_update(x5), Ok(true));
        assert_eq!(heap.peek_handle(), Some(x5));
        assert!(heap.is_valid());
    }

    #[test]
    fn test_maintain_reports_no_movement() {
        let (mut heap, handles) = heap_of(&[1, 2, 3]);
        assert_eq!(heap.maintain_towards_top(handles[0]), Ok(false));
        assert_eq!(heap.maintain_towards_bottom(handles[2]), Ok(false));
        assert_eq!(heap.maintain_update(handles[1]), Ok(false));
    }

    #[test]
    fn test_update_both_directions() {
        let (mut heap, handles) = heap_of(&[10, 20, 30, 40, 50]);

        heap.update(handles[4], 5).unwrap();
        assert_eq!(heap.get(handles[4]), Ok(&5));
        assert_eq!(heap.peek_handle(), Some(handles[4]));

        heap.update(handles[4], 45).unwrap();
        assert_eq!(heap.get(handles[4]), Ok(&45));
        assert_eq!(heap.top(), Ok(&10));

        // Equal value leaves the element in place
        let slot = heap.position(handles[1]).unwrap();
        heap.update(handles[1], 20).unwrap();
        assert_eq!(heap.position(handles[1]), Ok(slot));

        assert!(heap.is_valid());
        assert_eq!(heap.into_sorted_vec(), vec![10, 20, 30, 40, 45]);
    }

    #[test]
    fn test_ensure_priority() {
        let (mut heap, handles) = heap_of(&[1, 2, 10, 5]);

        assert_eq!(heap.ensure_priority(handles[2], 0), Ok(true));
        assert_eq!(heap.get(handles[2]), Ok(&0));
        assert_eq!(heap.peek_handle(), Some(handles[2]));

        assert_eq!(heap.ensure_priority(handles[3], 5), Ok(false));
        assert_eq!(heap.ensure_priority(handles[3], 7), Ok(false));
        assert_eq!(heap.get(handles[3]), Ok(&5));
        assert!(heap.is_valid());
    }

    #[test]
    fn test_erase_interior_and_last() {
        let (mut heap, handles) = heap_of(&[4, 8, 6, 9, 12, 7, 11]);

        assert_eq!(heap.erase(handles[1]), Ok(8));
        assert_eq!(heap.len(), 6);
        assert!(heap.is_valid());
        assert!(!heap.contains(handles[1]));

        // The most recent push sits at the end unless it moved
        let last = heap.handles().last().unwrap();
        let value = *heap.get(last).unwrap();
        assert_eq!(heap.erase(last), Ok(value));
        assert!(heap.is_valid());

        let rest: Vec<i32> = heap.into_sorted_vec();
        let mut expected = vec![4, 6, 9, 12, 7, 11];
        expected.retain(|&v| v != value);
        expected.sort();
        assert_eq!(rest, expected);
    }

    #[test]
    fn test_erase_needs_upward_move() {
        // Moving the last leaf into a deep slot of the other subtree must
        // bubble it up
        let (mut heap, handles) = heap_of(&[0, 100, 1, 101, 102, 2, 3]);
        assert_eq!(heap.erase(handles[4]), Ok(102));
        assert!(heap.is_valid());
        assert_eq!(heap.into_sorted_vec(), vec![0, 1, 2, 3, 100, 101]);
    }

    #[test]
    fn test_invalid_handles() {
        let (mut heap, handles) = heap_of(&[3, 1, 2]);
        let popped = heap.peek_handle().unwrap();
        assert_eq!(heap.pop(), Ok(1));

        assert_eq!(heap.get(popped), Err(HeapError::InvalidHandle));
        assert_eq!(heap.update(popped, 0), Err(HeapError::InvalidHandle));
        assert_eq!(heap.ensure_priority(popped, 0), Err(HeapError::InvalidHandle));
        assert_eq!(heap.erase(popped), Err(HeapError::InvalidHandle));
        assert_eq!(heap.maintain_update(popped), Err(HeapError::InvalidHandle));
        assert_eq!(heap.len(), 2);

        // Reused arena slot still rejects the stale handle
        let fresh = heap.push(7);
        assert_ne!(fresh, popped);
        assert_eq!(heap.get(popped), Err(HeapError::InvalidHandle));

        let (other, _) = heap_of(&[3, 1, 2]);
        assert_eq!(other.get(handles[0]), Err(HeapError::InvalidHandle));
        assert!(!other.contains(handles[0]));

        heap.clear();
        assert!(heap.is_empty());
        assert_eq!(heap.get(handles[0]), Err(HeapError::InvalidHandle));
    }

    #[test]
    fn test_empty_heap_errors() {
        let mut heap: MutableMinHeap<i32> = MutableMinHeap::new();
        let mut other = 5;
        assert_eq!(heap.swap_top(&mut other), Err(HeapError::EmptyHeap));
        assert_eq!(other, 5);
        assert_eq!(heap.emplace_top(1), Err(HeapError::EmptyHeap));
        assert_eq!(heap.replace_top(1), Err(HeapError::EmptyHeap));
        assert_eq!(heap.peek_handle(), None);
    }

    #[test]
    fn test_replace_top_k_way_merge() {
        let runs = [vec![1, 4, 7], vec![2, 5, 8], vec![3, 6, 9]];
        let mut heap = MutableMinHeap::new();
        for (run, values) in runs.iter().enumerate() {
            heap.push((values[0], run, 0usize));
        }

        let mut merged = Vec::new();
        while let Ok(&(value, run, idx)) = heap.top() {
            merged.push(value);
            match runs[run].get(idx + 1) {
                Some(&next) => {
                    heap.replace_top((next, run, idx + 1)).unwrap();
                }
                None => {
                    heap.pop().unwrap();
                }
            }
        }
        assert_eq!(merged, (1..=9).collect::<Vec<_>>());
    }

    #[test]
    fn test_iteration_heap_order() {
        let (heap, handles) = heap_of(&[5, 3, 8, 1]);
        let (first, value) = heap.iter().next().unwrap();
        assert_eq!(*value, 1);
        assert_eq!(Some(first), heap.peek_handle());

        let mut seen: Vec<i32> = heap.values().copied().collect();
        seen.sort();
        assert_eq!(seen, vec![1, 3, 5, 8]);

        let mut from_handles: Vec<MutableHandle> = heap.handles().collect();
        let mut expected = handles.clone();
        from_handles.sort_by_key(|h| heap.get(*h).copied().unwrap());
        expected.sort_by_key(|h| heap.get(*h).copied().unwrap());
        assert_eq!(from_handles, expected);

        // Restartable
        let iter = heap.iter();
        assert_eq!(iter.clone().count(), 4);
        assert_eq!(iter.len(), 4);
        assert_eq!((&heap).into_iter().count(), 4);
    }

    #[test]
    fn test_scan_then_update() {
        let mut heap: MutableMinHeap<i32> = (1..=10).rev().collect();
        let evens: Vec<MutableHandle> = heap
            .iter()
            .filter(|(_, v)| **v % 2 == 0)
            .map(|(h, _)| h)
            .collect();
        for h in evens {
            let v = *heap.get(h).unwrap();
            heap.update(h, v + 2).unwrap();
        }
        assert!(heap.is_valid());
        assert_eq!(
            heap.into_sorted_vec(),
            vec![1, 3, 4, 5, 6, 7, 8, 9, 10, 12]
        );
    }

    #[test]
    fn test_reverse_order_is_max_heap() {
        let mut heap = MutableMinHeap::with_comparator(ReverseOrder(NaturalOrder));
        for v in [1, 2, 10, 5] {
            heap.push(v);
        }
        assert_eq!(heap.top(), Ok(&10));
        let mut other = 12;
        heap.swap_top(&mut other).unwrap();
        assert_eq!(heap.top(), Ok(&12));
        assert_eq!(other, 10);
        assert_eq!(heap.into_sorted_vec(), vec![12, 5, 2, 1]);
    }

    #[test]
    fn test_closure_comparator_without_ord() {
        #[derive(Debug, PartialEq)]
        struct Job {
            cost: f64,
        }
        let by_cost = FnComparator::new(|a: &Job, b: &Job| a.cost < b.cost);
        let mut heap = MutableMinHeap::with_comparator(by_cost);
        heap.push(Job { cost: 2.5 });
        heap.push(Job { cost: 0.5 });
        heap.push(Job { cost: 1.5 });
        assert_eq!(heap.pop(), Ok(Job { cost: 0.5 }));
        assert_eq!(heap.pop(), Ok(Job { cost: 1.5 }));
    }

    #[test]
    fn test_clone_is_independent() {
        let (mut heap, handles) = heap_of(&[4, 2, 9]);
        let mut copy = heap.clone();
        assert_eq!(copy, heap);

        let copy_nine = copy
            .handles()
            .find(|&h| copy.get(h) == Ok(&9))
            .unwrap();
        copy.update(copy_nine, 0).unwrap();
        assert_eq!(copy.top(), Ok(&0));
        assert_eq!(heap.get(handles[2]), Ok(&9));
        assert_eq!(heap.top(), Ok(&2));

        heap.erase(handles[0]).unwrap();
        assert_eq!(copy.len(), 3);
        assert!(heap.is_valid());
        assert!(copy.is_valid());
    }

    #[test]
    fn test_clone_rejects_original_handles() {
        let mut heap = MutableMinHeap::new();
        let before = heap.push(5);
        let mut copy = heap.clone();

        let after = heap.push(1);
        copy.push(99);

        assert_eq!(copy.get(before), Err(HeapError::InvalidHandle));
        assert_eq!(copy.get(after), Err(HeapError::InvalidHandle));
        assert_eq!(copy.update(after, 0), Err(HeapError::InvalidHandle));
        assert_eq!(copy.erase(after), Err(HeapError::InvalidHandle));
        assert_eq!(copy.into_sorted_vec(), vec![5, 99]);

        assert_eq!(heap.get(after), Ok(&1));
        assert_eq!(heap.get(before), Ok(&5));
    }

    #[test]
    fn test_equality_ignores_layout() {
        let a: MutableMinHeap<i32> = [1, 2, 3, 4, 5].into_iter().collect();
        let b: MutableMinHeap<i32> = [5, 4, 3, 2, 1].into_iter().collect();
        let a_layout: Vec<i32> = a.values().copied().collect();
        let b_layout: Vec<i32> = b.values().copied().collect();
        assert_ne!(a_layout, b_layout);
        assert_eq!(a, b);

        let c: MutableMinHeap<i32> = [1, 2, 3, 4, 6].into_iter().collect();
        assert_ne!(a, c);
        let d: MutableMinHeap<i32> = [1, 2, 3, 4].into_iter().collect();
        assert_ne!(a, d);
    }

    #[test]
    fn test_equality_within_equivalent_run() {
        let by_len = |a: &&str, b: &&str| a.len() < b.len();
        let mut a = MutableMinHeap::with_comparator(FnComparator::new(by_len));
        let mut b = MutableMinHeap::with_comparator(FnComparator::new(by_len));
        for s in ["ab", "cd", "x"] {
            a.push(s);
        }
        for s in ["x", "cd", "ab"] {
            b.push(s);
        }
        assert!(a.same_elements(&b));

        let mut c = MutableMinHeap::with_comparator(FnComparator::new(by_len));
        for s in ["ab", "ab", "x"] {
            c.push(s);
        }
        assert!(!a.same_elements(&c));
    }

    #[test]
    fn test_into_vec_and_into_iter() {
        let heap: MutableMinHeap<i32> = [7, 3, 5].into_iter().collect();
        let mut raw = heap.clone().into_vec();
        assert_eq!(raw[0], 3);
        raw.sort();
        assert_eq!(raw, vec![3, 5, 7]);

        let sorted: Vec<i32> = heap.into_iter().collect();
        assert_eq!(sorted, vec![3, 5, 7]);
    }

    #[test]
    fn test_capacity_and_debug() {
        let mut heap = MutableMinHeap::with_capacity(16);
        assert!(heap.capacity() >= 16);
        heap.push(2);
        heap.push(1);
        heap.reserve(32);
        assert!(heap.capacity() >= 34);
        heap.shrink_to_fit();
        assert_eq!(format!("{:?}", heap), "[1, 2]");
    }

    #[test]
    fn test_trait_decrease_key() {
        let mut heap: MutableMinHeap<i32> = Heap::new();
        let h = heap.push_with_handle(10);
        Heap::push(&mut heap, 7);
        assert_eq!(heap.decrease_key(&h, 12), Err(HeapError::PriorityNotDecreased));
        assert_eq!(heap.decrease_key(&h, 3), Ok(()));
        assert_eq!(Heap::peek(&heap), Some(&3));
        assert_eq!(Heap::pop(&mut heap), Some(3));
        assert_eq!(Heap::len(&heap), 1);
    }

    #[cfg(feature = "smallvec")]
    #[test]
    fn test_smallvec_backing_sequence() {
        let mut heap: MutableMinHeap<i32, NaturalOrder, smallvec::SmallVec<[NodeKey; 4]>> =
            MutableMinHeap::default();
        let handles: Vec<MutableHandle> = (0..10).rev().map(|v| heap.push(v)).collect();
        heap.erase(handles[3]).unwrap();
        heap.ensure_priority(handles[0], -1).unwrap();
        assert!(heap.is_valid());
        assert_eq!(heap.into_sorted_vec(), vec![-1, 0, 1, 2, 3, 4, 5, 7, 8]);
    }
}
