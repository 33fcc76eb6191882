//! Node arena and pluggable backing sequences
//!
//! A mutable heap keeps two structures in lockstep:
//!
//! - `NodeArena`: owns every node (element plus current slot index), keyed by
//!   a generational [`NodeKey`] from `slotmap`
//! - a [`HandleSequence`]: the dense, implicitly-tree-shaped array of keys
//!
//! # Design
//!
//! Slotmap keys carry a generation, so a key whose node has been removed is
//! rejected by the arena even if its slot has since been reused. Together with
//! a per-instance [`HeapId`] this gives checked handle validity instead of
//! dangling pointers.
//!
//! The [`HandleSequence`] trait abstracts over the container that stores keys.
//! `Vec<NodeKey>` is the default; `SmallVec` is available behind the
//! `smallvec` feature for heaps that are usually tiny.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use slotmap::{new_key_type, SlotMap};

new_key_type! {
    /// Generational arena key for a heap node
    pub struct NodeKey;
}

/// Identity of one heap instance, stamped into every handle it issues
///
/// Ids are process-unique. A cloned heap mints a new one.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct HeapId(u64);

static NEXT_HEAP_ID: AtomicU64 = AtomicU64::new(1);

impl HeapId {
    /// Mints an id not shared with any other freshly constructed heap
    pub fn fresh() -> Self {
        HeapId(NEXT_HEAP_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Debug for HeapId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HeapId({})", self.0)
    }
}

/// A stored element and the slot its key currently occupies
#[derive(Debug, Clone)]
pub(crate) struct Node<T> {
    pub(crate) value: T,
    pub(crate) slot: usize,
}

/// Arena owning every node of one heap
#[derive(Debug, Clone)]
pub(crate) struct NodeArena<T> {
    nodes: SlotMap<NodeKey, Node<T>>,
}

impl<T> NodeArena<T> {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        NodeArena {
            nodes: SlotMap::with_capacity_and_key(capacity),
        }
    }

    #[inline]
    pub(crate) fn insert(&mut self, value: T, slot: usize) -> NodeKey {
        self.nodes.insert(Node { value, slot })
    }

    #[inline]
    pub(crate) fn remove(&mut self, key: NodeKey) -> Option<Node<T>> {
        self.nodes.remove(key)
    }

    #[inline]
    pub(crate) fn get(&self, key: NodeKey) -> Option<&Node<T>> {
        self.nodes.get(key)
    }

    #[inline]
    pub(crate) fn contains(&self, key: NodeKey) -> bool {
        self.nodes.contains_key(key)
    }

    pub(crate) fn len(&self) -> usize {
        self.nodes.len()
    }

    pub(crate) fn clear(&mut self) {
        self.nodes.clear();
    }

    pub(crate) fn reserve(&mut self, additional: usize) {
        self.nodes.reserve(additional);
    }

    /// Value of a key known to be live
    ///
    /// Keys read out of the backing sequence are always live, so a miss here
    /// is a broken internal invariant.
    #[inline]
    pub(crate) fn value(&self, key: NodeKey) -> &T {
        &self.nodes[key].value
    }

    #[inline]
    pub(crate) fn value_mut(&mut self, key: NodeKey) -> &mut T {
        &mut self.nodes[key].value
    }

    #[inline]
    pub(crate) fn slot(&self, key: NodeKey) -> usize {
        self.nodes[key].slot
    }

    #[inline]
    pub(crate) fn set_slot(&mut self, key: NodeKey, slot: usize) {
        self.nodes[key].slot = slot;
    }
}

/// Backing sequence of node keys
///
/// Any container with O(1) amortized append and remove-at-end, O(1) random
/// access and forward iteration can back a heap. Swapping providers keeps
/// every complexity bound of the heap.
pub trait HandleSequence: Default {
    /// Creates an empty sequence with room for `capacity` keys
    fn with_capacity(capacity: usize) -> Self;

    /// Appends a key at the end
    fn push(&mut self, key: NodeKey);

    /// Removes and returns the last key
    fn pop(&mut self) -> Option<NodeKey>;

    /// Views the keys as a slice, root first
    fn as_slice(&self) -> &[NodeKey];

    /// Views the keys as a mutable slice
    fn as_mut_slice(&mut self) -> &mut [NodeKey];

    /// Removes every key
    fn clear(&mut self);

    /// Number of keys the sequence can hold without reallocating
    fn capacity(&self) -> usize;

    /// Reserves room for at least `additional` more keys
    fn reserve(&mut self, additional: usize);

    /// Releases unused capacity where the container supports it
    fn shrink_to_fit(&mut self);

    /// Number of keys in the sequence
    #[inline]
    fn len(&self) -> usize {
        self.as_slice().len()
    }

    /// Returns true if the sequence holds no keys
    #[inline]
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl HandleSequence for Vec<NodeKey> {
    fn with_capacity(capacity: usize) -> Self {
        Vec::with_capacity(capacity)
    }

    #[inline]
    fn push(&mut self, key: NodeKey) {
        Vec::push(self, key)
    }

    #[inline]
    fn pop(&mut self) -> Option<NodeKey> {
        Vec::pop(self)
    }

    #[inline]
    fn as_slice(&self) -> &[NodeKey] {
        self
    }

    #[inline]
    fn as_mut_slice(&mut self) -> &mut [NodeKey] {
        self
    }

    fn clear(&mut self) {
        Vec::clear(self)
    }

    fn capacity(&self) -> usize {
        Vec::capacity(self)
    }

    fn reserve(&mut self, additional: usize) {
        Vec::reserve(self, additional)
    }

    fn shrink_to_fit(&mut self) {
        Vec::shrink_to_fit(self)
    }
}

#[cfg(feature = "smallvec")]
impl<A> HandleSequence for smallvec::SmallVec<A>
where
    A: smallvec::Array<Item = NodeKey>,
{
    fn with_capacity(capacity: usize) -> Self {
        smallvec::SmallVec::with_capacity(capacity)
    }

    #[inline]
    fn push(&mut self, key: NodeKey) {
        smallvec::SmallVec::push(self, key)
    }

    #[inline]
    fn pop(&mut self) -> Option<NodeKey> {
        smallvec::SmallVec::pop(self)
    }

    #[inline]
    fn as_slice(&self) -> &[NodeKey] {
        smallvec::SmallVec::as_slice(self)
    }

    #[inline]
    fn as_mut_slice(&mut self) -> &mut [NodeKey] {
        smallvec::SmallVec::as_mut_slice(self)
    }

    fn clear(&mut self) {
        smallvec::SmallVec::clear(self)
    }

    fn capacity(&self) -> usize {
        smallvec::SmallVec::capacity(self)
    }

    fn reserve(&mut self, additional: usize) {
        smallvec::SmallVec::reserve(self, additional)
    }

    fn shrink_to_fit(&mut self) {
        smallvec::SmallVec::shrink_to_fit(self)
    }
}
