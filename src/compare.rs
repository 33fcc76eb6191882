//! Ordering capabilities injected into the heaps at construction time
//!
//! - [`Comparator`]: a strict weak ordering ("less-than") over elements
//! - [`PriorityProjection`]: maps an element to the priority it is ordered by
//!
//! The default comparator is [`NaturalOrder`], the `<` of an `Ord` type.
//! [`ReverseOrder`] turns any min-heap in this crate into a max-heap.
//!
//! # Example
//!
//! ```rust
//! use mutable_heap::compare::{FnComparator, NaturalOrder, ReverseOrder};
//! use mutable_heap::MutableMinHeap;
//!
//! let mut max_heap = MutableMinHeap::with_comparator(ReverseOrder(NaturalOrder));
//! max_heap.push(1);
//! max_heap.push(10);
//! assert_eq!(max_heap.top(), Ok(&10));
//!
//! let by_len = FnComparator::new(|a: &&str, b: &&str| a.len() < b.len());
//! let mut heap = MutableMinHeap::with_comparator(by_len);
//! heap.push("three");
//! heap.push("one");
//! assert_eq!(heap.top(), Ok(&"one"));
//! ```

use std::fmt;

/// A strict weak ordering over `T`
///
/// `less(a, b)` must be irreflexive, asymmetric and transitive, and
/// incomparability must be transitive. Elements for which neither
/// `less(a, b)` nor `less(b, a)` holds are treated as equal priorities.
pub trait Comparator<T: ?Sized> {
    /// Returns true if `a` orders strictly before `b`
    fn less(&self, a: &T, b: &T) -> bool;
}

/// The natural `<` ordering of an `Ord` type
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct NaturalOrder;

impl<T: Ord + ?Sized> Comparator<T> for NaturalOrder {
    #[inline]
    fn less(&self, a: &T, b: &T) -> bool {
        a < b
    }
}

/// Reverses an inner comparator, turning a min-heap into a max-heap
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ReverseOrder<C = NaturalOrder>(pub C);

impl<T: ?Sized, C: Comparator<T>> Comparator<T> for ReverseOrder<C> {
    #[inline]
    fn less(&self, a: &T, b: &T) -> bool {
        self.0.less(b, a)
    }
}

/// Adapts a closure `Fn(&T, &T) -> bool` into a [`Comparator`]
#[derive(Clone, Copy)]
pub struct FnComparator<F>(F);

impl<F> FnComparator<F> {
    /// Wraps a less-than closure
    pub fn new(less: F) -> Self {
        FnComparator(less)
    }
}

impl<F> fmt::Debug for FnComparator<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnComparator").finish_non_exhaustive()
    }
}

impl<T: ?Sized, F: Fn(&T, &T) -> bool> Comparator<T> for FnComparator<F> {
    #[inline]
    fn less(&self, a: &T, b: &T) -> bool {
        (self.0)(a, b)
    }
}

/// Maps an element to the priority it is ordered by
///
/// The projection must return a reference into the element so that the
/// priority can be rewritten in place by
/// [`ProjectedHeap::update`](crate::projected::ProjectedHeap::update).
pub trait PriorityProjection<T> {
    /// The priority type extracted from each element
    type Priority;

    /// Borrows the priority of `value`
    fn priority<'a>(&self, value: &'a T) -> &'a Self::Priority;

    /// Mutably borrows the priority of `value`
    fn priority_mut<'a>(&self, value: &'a mut T) -> &'a mut Self::Priority;
}

/// The identity projection: an element is its own priority
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Identity;

impl<T> PriorityProjection<T> for Identity {
    type Priority = T;

    #[inline]
    fn priority<'a>(&self, value: &'a T) -> &'a T {
        value
    }

    #[inline]
    fn priority_mut<'a>(&self, value: &'a mut T) -> &'a mut T {
        value
    }
}

/// A projection built from a pair of field accessors
///
/// Accessors are plain function pointers, so non-capturing closures coerce
/// directly.
///
/// # Example
///
/// ```rust
/// use mutable_heap::compare::{FnProjection, PriorityProjection};
///
/// struct Task { deadline: u32 }
///
/// let by_deadline: FnProjection<Task, u32> =
///     FnProjection::new(|t| &t.deadline, |t| &mut t.deadline);
/// let task = Task { deadline: 7 };
/// assert_eq!(*by_deadline.priority(&task), 7);
/// ```
pub struct FnProjection<T, P> {
    get: fn(&T) -> &P,
    get_mut: fn(&mut T) -> &mut P,
}

impl<T, P> FnProjection<T, P> {
    /// Builds a projection from a shared and a mutable accessor
    pub fn new(get: fn(&T) -> &P, get_mut: fn(&mut T) -> &mut P) -> Self {
        FnProjection { get, get_mut }
    }
}

impl<T, P> Clone for FnProjection<T, P> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T, P> Copy for FnProjection<T, P> {}

impl<T, P> fmt::Debug for FnProjection<T, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnProjection").finish_non_exhaustive()
    }
}

impl<T, P> PriorityProjection<T> for FnProjection<T, P> {
    type Priority = P;

    #[inline]
    fn priority<'a>(&self, value: &'a T) -> &'a P {
        (self.get)(value)
    }

    #[inline]
    fn priority_mut<'a>(&self, value: &'a mut T) -> &'a mut P {
        (self.get_mut)(value)
    }
}

/// Orders whole elements by comparing their projected priorities
///
/// This is the comparator a [`ProjectedHeap`](crate::projected::ProjectedHeap)
/// hands to its inner [`MutableMinHeap`](crate::MutableMinHeap).
#[derive(Debug, Clone, Copy, Default)]
pub struct ByProjection<X, C = NaturalOrder> {
    projection: X,
    comparator: C,
}

impl<X, C> ByProjection<X, C> {
    /// Combines a projection with a comparator over its priorities
    pub fn new(projection: X, comparator: C) -> Self {
        ByProjection {
            projection,
            comparator,
        }
    }

    /// The priority projection
    pub fn projection(&self) -> &X {
        &self.projection
    }

    /// The comparator over projected priorities
    pub fn comparator(&self) -> &C {
        &self.comparator
    }
}

impl<T, X, C> Comparator<T> for ByProjection<X, C>
where
    X: PriorityProjection<T>,
    C: Comparator<X::Priority>,
{
    #[inline]
    fn less(&self, a: &T, b: &T) -> bool {
        self.comparator
            .less(self.projection.priority(a), self.projection.priority(b))
    }
}
