//! Common traits for heap data structures
//!
//! This module provides a two-tier trait hierarchy over the heaps in this crate:
//!
//! - [`Heap`]: Base trait for a min-priority queue of elements
//! - [`DecreaseKeyHeap`]: Extended trait adding handle-based `decrease_key`
//!
//! The heaps here order whole elements through a
//! [`Comparator`](crate::compare::Comparator) rather than storing separate
//! `(priority, item)` pairs, so the traits are parameterised over the element
//! type only.

use std::fmt;

/// Error type for heap operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HeapError {
    /// The heap holds no elements, so there is no minimum to read or replace
    EmptyHeap,
    /// The handle is no longer valid (element was removed) or belongs to
    /// another heap instance
    InvalidHandle,
    /// The new priority is not less than the current priority
    PriorityNotDecreased,
}

impl fmt::Display for HeapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HeapError::EmptyHeap => write!(f, "heap is empty"),
            HeapError::InvalidHandle => {
                write!(f, "handle is no longer valid or belongs to another heap")
            }
            HeapError::PriorityNotDecreased => {
                write!(f, "new priority is not less than current priority")
            }
        }
    }
}

impl std::error::Error for HeapError {}

/// A handle to an element in the heap, used for priority mutation and removal
///
/// This is an opaque type that identifies a specific element in the heap.
pub trait Handle: Copy + PartialEq + Eq + fmt::Debug {}

/// Base trait for min-priority queues
///
/// This trait provides a simple API similar to Rust's `BinaryHeap`:
/// - `push` inserts an element
/// - `pop` removes and returns the minimum
/// - `peek` returns the minimum without removing it
///
/// # Example
///
/// ```rust
/// use mutable_heap::Heap;
/// use mutable_heap::MutableMinHeap;
///
/// fn drain<H: Heap<i32>>(mut heap: H) -> Vec<i32> {
///     let mut out = Vec::new();
///     while let Some(x) = heap.pop() {
///         out.push(x);
///     }
///     out
/// }
///
/// let mut heap: MutableMinHeap<i32> = Heap::new();
/// Heap::push(&mut heap, 3);
/// Heap::push(&mut heap, 1);
/// Heap::push(&mut heap, 2);
/// assert_eq!(drain(heap), vec![1, 2, 3]);
/// ```
pub trait Heap<T> {
    /// Creates a new empty heap
    fn new() -> Self;

    /// Returns true if the heap is empty
    fn is_empty(&self) -> bool;

    /// Returns the number of elements in the heap
    fn len(&self) -> usize;

    /// Inserts an element
    ///
    /// # Time Complexity
    /// O(log n)
    fn push(&mut self, item: T);

    /// Returns the minimum element without removing it
    ///
    /// Note that `BinaryHeap` is a max-heap, while these heaps are min-heaps.
    fn peek(&self) -> Option<&T>;

    /// Removes and returns the minimum element
    ///
    /// # Time Complexity
    /// O(log n)
    fn pop(&mut self) -> Option<T>;

    /// Merges another heap into this one, consuming the other heap
    ///
    /// # Time Complexity
    /// O(m log(n + m)) where m is the size of `other`.
    fn merge(&mut self, other: Self);
}

/// Extended heap trait with `decrease_key` support
///
/// These operations are essential for algorithms like Dijkstra's shortest path
/// that need to lower the priority of elements already in the heap.
///
/// # Example
///
/// ```rust
/// use mutable_heap::{DecreaseKeyHeap, Heap, MutableMinHeap};
///
/// let mut heap: MutableMinHeap<i32> = Heap::new();
/// let handle = heap.push_with_handle(10);
/// heap.push_with_handle(7);
/// heap.decrease_key(&handle, 5).unwrap();
/// assert_eq!(Heap::peek(&heap), Some(&5));
/// ```
pub trait DecreaseKeyHeap<T>: Heap<T> {
    /// The handle type for this heap
    type Handle: Handle;

    /// Inserts an element, returning a handle
    fn push_with_handle(&mut self, item: T) -> Self::Handle;

    /// Lowers the element identified by the handle to `new_value`
    ///
    /// # Errors
    /// - `HeapError::InvalidHandle` if the handle does not address a live element
    /// - `HeapError::PriorityNotDecreased` if `new_value` is not strictly less
    ///   than the current element
    ///
    /// # Time Complexity
    /// O(log n)
    fn decrease_key(&mut self, handle: &Self::Handle, new_value: T) -> Result<(), HeapError>;
}
