//! Shortest paths driven by a decrease-key heap
//!
//! Every discovered node gets exactly one frontier entry. When a cheaper route
//! to it turns up, the entry is lowered in place through its handle instead of
//! pushing a duplicate, so a pop never yields a stale entry.
//!
//! Frontier entries are `(priority, index)` pairs. Node states live in a
//! dense table indexed by [`NodeIndex`], with an `FxHashMap` from state to
//! index. The index doubles as a deterministic tie-break.
//!
//! ```rust
//! use mutable_heap::pathfinding::{shortest_path, FrontierEntry, SearchSpace};
//! use mutable_heap::MutableMinHeap;
//!
//! // Cities on a line, with a toll road that skips one
//! struct Road;
//!
//! impl SearchSpace for Road {
//!     type Node = u32;
//!     type Cost = u32;
//!
//!     fn neighbors(&self, city: &u32) -> Vec<(u32, u32)> {
//!         vec![(city + 1, 3), (city + 2, 5)]
//!     }
//! }
//!
//! let route = shortest_path::<_, MutableMinHeap<FrontierEntry<u32>>>(&Road, 0, |&c| c == 4)
//!     .unwrap();
//! assert_eq!(route.cost, 10);
//! assert_eq!(route.nodes, vec![0, 2, 4]);
//! ```

use std::hash::Hash;
use std::ops::Add;

use rustc_hash::FxHashMap;
use tracing::{debug, trace};

use crate::traits::DecreaseKeyHeap;

/// Path costs: ordered, copyable, summable, with `Default` as zero
pub trait Cost: Ord + Copy + Add<Output = Self> + Default {}

impl<T> Cost for T where T: Ord + Copy + Add<Output = Self> + Default {}

/// A graph explored lazily from a start node
pub trait SearchSpace {
    /// Node state
    type Node: Clone + Eq + Hash;
    /// Edge weight
    type Cost: Cost;

    /// Returns every neighbour of `node` with the weight of the edge to it
    fn neighbors(&self, node: &Self::Node) -> Vec<(Self::Node, Self::Cost)>;

    /// Lower bound on the remaining cost from `node` to the goal
    ///
    /// Zero by default, which turns [`shortest_path`] into Dijkstra's
    /// algorithm. A non-zero estimate must be consistent (never drop by more
    /// than an edge's weight along that edge) for the result to stay optimal.
    fn estimate(&self, _node: &Self::Node) -> Self::Cost {
        Self::Cost::default()
    }
}

/// Dense index of a discovered node
pub type NodeIndex = usize;

/// Element type held by the frontier heap
pub type FrontierEntry<C> = (C, NodeIndex);

/// A cheapest route, start first
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route<N, C> {
    pub nodes: Vec<N>,
    pub cost: C,
}

struct Discovered<N, C, H> {
    node: N,
    cost: C,
    parent: Option<NodeIndex>,
    /// Set while the node waits in the frontier
    handle: Option<H>,
    settled: bool,
}

/// Finds a cheapest route from `start` to the first node satisfying `is_goal`
///
/// `H` is the frontier, any [`DecreaseKeyHeap`] over [`FrontierEntry`]s.
pub fn shortest_path<S, H>(
    space: &S,
    start: S::Node,
    is_goal: impl Fn(&S::Node) -> bool,
) -> Option<Route<S::Node, S::Cost>>
where
    S: SearchSpace,
    H: DecreaseKeyHeap<FrontierEntry<S::Cost>>,
{
    search::<S, H, _, _>(space, start, |n| space.estimate(n), None, |n, _| is_goal(n))
}

/// Returns every node at distance at most `max_cost` from `start`, in
/// nondecreasing distance order
pub fn distances_within<S, H>(
    space: &S,
    start: S::Node,
    max_cost: S::Cost,
) -> Vec<(S::Node, S::Cost)>
where
    S: SearchSpace,
    H: DecreaseKeyHeap<FrontierEntry<S::Cost>>,
{
    let mut reached = Vec::new();
    search::<S, H, _, _>(
        space,
        start,
        |_| S::Cost::default(),
        Some(max_cost),
        |node, cost| {
            reached.push((node.clone(), cost));
            false
        },
    );
    reached
}

/// Best-first loop shared by both entry points
///
/// `settle` sees each node once, in nondecreasing priority order; returning
/// true ends the search with the route to that node.
fn search<S, H, E, F>(
    space: &S,
    start: S::Node,
    estimate: E,
    max_cost: Option<S::Cost>,
    mut settle: F,
) -> Option<Route<S::Node, S::Cost>>
where
    S: SearchSpace,
    H: DecreaseKeyHeap<FrontierEntry<S::Cost>>,
    E: Fn(&S::Node) -> S::Cost,
    F: FnMut(&S::Node, S::Cost) -> bool,
{
    let mut frontier = H::new();
    let mut table: Vec<Discovered<S::Node, S::Cost, H::Handle>> = Vec::new();
    let mut index_of: FxHashMap<S::Node, NodeIndex> = FxHashMap::default();

    let handle = frontier.push_with_handle((estimate(&start), 0));
    index_of.insert(start.clone(), 0);
    table.push(Discovered {
        node: start,
        cost: S::Cost::default(),
        parent: None,
        handle: Some(handle),
        settled: false,
    });
    debug!(bounded = max_cost.is_some(), "search started");

    let mut settled = 0usize;
    while let Some((_, current)) = frontier.pop() {
        let entry = &mut table[current];
        entry.settled = true;
        entry.handle = None;
        settled += 1;

        let cost = entry.cost;
        if settle(&entry.node, cost) {
            debug!(settled, discovered = table.len(), "search reached goal");
            return Some(route(&table, current));
        }

        for (next, weight) in space.neighbors(&table[current].node) {
            let tentative = cost + weight;
            if max_cost.is_some_and(|max| tentative > max) {
                continue;
            }
            let priority = tentative + estimate(&next);

            let Some(&index) = index_of.get(&next) else {
                let index = table.len();
                let handle = frontier.push_with_handle((priority, index));
                index_of.insert(next.clone(), index);
                table.push(Discovered {
                    node: next,
                    cost: tentative,
                    parent: Some(current),
                    handle: Some(handle),
                    settled: false,
                });
                continue;
            };

            let known = &mut table[index];
            if known.settled || tentative >= known.cost {
                continue;
            }
            known.cost = tentative;
            known.parent = Some(current);
            if let Some(handle) = &known.handle {
                if let Err(err) = frontier.decrease_key(handle, (priority, index)) {
                    trace!(%err, index, "frontier entry not lowered");
                }
            }
        }
    }

    debug!(settled, discovered = table.len(), "search exhausted");
    None
}

fn route<N: Clone, C: Copy, H>(table: &[Discovered<N, C, H>], goal: NodeIndex) -> Route<N, C> {
    let mut nodes = Vec::new();
    let mut at = Some(goal);
    while let Some(index) = at {
        nodes.push(table[index].node.clone());
        at = table[index].parent;
    }
    nodes.reverse();
    Route {
        nodes,
        cost: table[goal].cost,
    }
}
