//! Mutable binary heaps with stable handles
//!
//! This crate provides an array-backed binary min-heap whose elements can be
//! addressed after insertion. Every push returns a handle that stays valid
//! while the element is in the heap, no matter how far it moves, so callers
//! can change priorities in place or remove arbitrary elements.
//!
//! # Features
//!
//! - **MutableMinHeap**: O(log n) push, pop, update, ensure_priority and erase;
//!   O(1) top. Ordering comes from an injected comparator.
//! - **ProjectedHeap**: orders values by a priority extracted from each value,
//!   leaving the rest of the value untouched on update
//! - **Pluggable storage**: the key sequence can be a `Vec` (default) or a
//!   `SmallVec` (`smallvec` feature)
//! - **Pathfinding**: shortest paths over any [`DecreaseKeyHeap`], lowering
//!   frontier entries in place
//!
//! Handles are checked: a handle whose element was removed, or that came
//! from a different heap, is rejected with [`HeapError::InvalidHandle`].
//!
//! # Example
//!
//! ```rust
//! use mutable_heap::MutableMinHeap;
//!
//! let mut heap = MutableMinHeap::new();
//! let a = heap.push(5);
//! heap.push(3);
//! heap.push(8);
//!
//! heap.update(a, 1).unwrap();
//! assert_eq!(heap.top(), Ok(&1));
//!
//! assert_eq!(heap.erase(a), Ok(1));
//! assert_eq!(heap.pop(), Ok(3));
//! assert!(heap.get(a).is_err());
//! ```

pub mod compare;
pub mod mutable;
pub mod pathfinding;
pub mod projected;
pub mod storage;
pub mod traits;

pub use compare::{Comparator, NaturalOrder, ReverseOrder};
pub use mutable::{MutableHandle, MutableMinHeap};
pub use projected::ProjectedHeap;
pub use traits::{DecreaseKeyHeap, Handle, Heap, HeapError};
