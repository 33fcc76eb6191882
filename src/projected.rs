//! Fixed-priority heap with a priority extractor
//!
//! [`ProjectedHeap`] stores whole values but orders them by a priority
//! *projected* out of each value by a [`PriorityProjection`]. Callers change a
//! queued value's priority through its handle with
//! [`update`](ProjectedHeap::update) or [`ensure_priority`](ProjectedHeap::ensure_priority);
//! the rest of the value is never touched by the heap.
//!
//! This is a thin layer over [`MutableMinHeap`] using the [`ByProjection`]
//! comparator, so it shares the same sift logic and handle checking.
//!
//! # Example
//!
//! ```rust
//! use mutable_heap::compare::{FnProjection, NaturalOrder};
//! use mutable_heap::projected::ProjectedHeap;
//!
//! #[derive(Debug)]
//! struct Vertex { dist: u32, id: usize }
//!
//! let by_dist: FnProjection<Vertex, u32> = FnProjection::new(|v| &v.dist, |v| &mut v.dist);
//! let mut heap = ProjectedHeap::with_projection(by_dist, NaturalOrder);
//! let a = heap.push(Vertex { dist: 9, id: 0 });
//! heap.push(Vertex { dist: 4, id: 1 });
//!
//! assert_eq!(heap.ensure_priority(a, 2), Ok(true));
//! assert_eq!(heap.top().map(|v| v.id), Ok(0));
//! ```

use std::fmt;

use crate::compare::{ByProjection, Comparator, Identity, NaturalOrder, PriorityProjection};
use crate::mutable::{Iter, MutableHandle, MutableMinHeap};
use crate::traits::{Heap, HeapError};

/// Min-heap ordered by a priority projected out of each value
#[derive(Clone)]
pub struct ProjectedHeap<T, X = Identity, C = NaturalOrder> {
    inner: MutableMinHeap<T, ByProjection<X, C>>,
}

impl<T: Ord> ProjectedHeap<T> {
    /// Creates an empty heap whose values are their own priorities
    pub fn new() -> Self {
        Self::with_projection(Identity, NaturalOrder)
    }
}

impl<T, X, C> ProjectedHeap<T, X, C> {
    /// Creates an empty heap ordering values by `comparator` applied to the
    /// priorities extracted by `projection`
    pub fn with_projection(projection: X, comparator: C) -> Self {
        ProjectedHeap {
            inner: MutableMinHeap::with_comparator(ByProjection::new(projection, comparator)),
        }
    }

    /// Returns the number of values in the heap
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns true if the heap is empty
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Removes every value, invalidating all outstanding handles
    pub fn clear(&mut self) {
        self.inner.clear()
    }

    /// Returns the value with the minimum priority, or `None` if empty
    pub fn peek(&self) -> Option<&T> {
        self.inner.peek()
    }

    /// Returns the value with the minimum priority
    pub fn top(&self) -> Result<&T, HeapError> {
        self.inner.top()
    }

    /// Returns true if `handle` addresses a value still in this heap
    pub fn contains(&self, handle: MutableHandle) -> bool {
        self.inner.contains(handle)
    }

    /// Borrows the value addressed by `handle`
    pub fn value(&self, handle: MutableHandle) -> Result<&T, HeapError> {
        self.inner.get(handle)
    }

    /// Iterates over `(handle, value)` pairs in heap-array order
    pub fn iter(&self) -> Iter<'_, T> {
        self.inner.iter()
    }
}

impl<T, X, C> ProjectedHeap<T, X, C>
where
    X: PriorityProjection<T>,
    C: Comparator<X::Priority>,
{
    /// Inserts a value, returning a handle to it
    pub fn push(&mut self, value: T) -> MutableHandle {
        self.inner.push(value)
    }

    /// Removes and returns the value with the minimum priority
    pub fn pop(&mut self) -> Result<T, HeapError> {
        self.inner.pop()
    }

    /// Borrows the priority of the value addressed by `handle`
    pub fn priority(&self, handle: MutableHandle) -> Result<&X::Priority, HeapError> {
        let value = self.inner.get(handle)?;
        Ok(self.inner.comparator().projection().priority(value))
    }

    /// Writes `priority` into the value addressed by `handle`, moving it
    /// toward the root if the priority decreased or toward the leaves if it
    /// increased
    pub fn update(&mut self, handle: MutableHandle, priority: X::Priority) -> Result<(), HeapError> {
        let (by, value) = self.inner.comparator_and_value_mut(handle)?;
        let current = by.projection().priority_mut(value);
        let decreased = by.comparator().less(&priority, current);
        let increased = !decreased && by.comparator().less(current, &priority);
        *current = priority;

        if decreased {
            self.inner.maintain_towards_top(handle)?;
        } else if increased {
            self.inner.maintain_towards_bottom(handle)?;
        }
        Ok(())
    }

    /// Lowers the priority of the value addressed by `handle` to `candidate`
    /// if `candidate` orders strictly before the current priority
    ///
    /// Returns whether the priority changed.
    pub fn ensure_priority(
        &mut self,
        handle: MutableHandle,
        candidate: X::Priority,
    ) -> Result<bool, HeapError> {
        let (by, value) = self.inner.comparator_and_value_mut(handle)?;
        let current = by.projection().priority_mut(value);
        if !by.comparator().less(&candidate, current) {
            return Ok(false);
        }
        *current = candidate;
        self.inner.maintain_towards_top(handle)?;
        Ok(true)
    }

    /// Removes the value addressed by `handle` and returns it
    pub fn erase(&mut self, handle: MutableHandle) -> Result<T, HeapError> {
        self.inner.erase(handle)
    }

    /// Consumes the heap, returning its values in ascending priority order
    pub fn into_sorted_vec(self) -> Vec<T> {
        self.inner.into_sorted_vec()
    }

    /// Checks heap order and slot bookkeeping, see [`MutableMinHeap::is_valid`]
    pub fn is_valid(&self) -> bool {
        self.inner.is_valid()
    }
}

impl<T: fmt::Debug, X, C> fmt::Debug for ProjectedHeap<T, X, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProjectedHeap")
            .field("values", &self.inner)
            .finish()
    }
}

impl<T, X: Default, C: Default> Default for ProjectedHeap<T, X, C> {
    fn default() -> Self {
        Self::with_projection(X::default(), C::default())
    }
}

impl<T, X, C> Heap<T> for ProjectedHeap<T, X, C>
where
    X: PriorityProjection<T> + Default,
    C: Comparator<X::Priority> + Default,
{
    fn new() -> Self {
        Self::default()
    }

    fn is_empty(&self) -> bool {
        ProjectedHeap::is_empty(self)
    }

    fn len(&self) -> usize {
        ProjectedHeap::len(self)
    }

    fn push(&mut self, item: T) {
        ProjectedHeap::push(self, item);
    }

    fn peek(&self) -> Option<&T> {
        ProjectedHeap::peek(self)
    }

    fn pop(&mut self) -> Option<T> {
        ProjectedHeap::pop(self).ok()
    }

    fn merge(&mut self, other: Self) {
        for value in other.inner.into_vec() {
            self.inner.push(value);
        }
    }
}
