//! Dijkstra internals over a [`ModeWeighting`] view.
//!
//! Costs are weighted milliseconds (`u64`).  The heap is keyed on
//! `(cost, NodeId)` so equal-cost frontiers pop in node order and every run
//! over the same inputs produces the same tree.
//!
//! Every search carries a budget: the maximum number of nodes it may settle.
//! Exceeding it yields [`SpatialError::SearchBudgetExceeded`], which callers
//! treat like an unreachable target.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use tt_core::{EdgeId, NodeId};

use crate::network::TransportGraph;
use crate::weighting::ModeWeighting;
use crate::{SpatialError, SpatialResult};

/// Direction a search tree grows in.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Direction {
    /// Costs *from* the root, following edges forward.
    Forward,
    /// Costs *to* the root, following edges backward.
    Backward,
}

/// An edge sequence in travel order and its weighted cost.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Path {
    pub edges: Vec<EdgeId>,
    pub weighted_ms: u64,
}

/// A one-to-all (or all-to-one) shortest-path tree.
pub struct SearchTree {
    root: NodeId,
    direction: Direction,
    dist: Vec<u64>,
    /// Tree edge through which each node was reached; `INVALID` for the root
    /// and unreached nodes.
    via: Vec<EdgeId>,
}

impl SearchTree {
    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Weighted cost between the root and `node`, if reached.
    #[inline]
    pub fn cost(&self, node: NodeId) -> Option<u64> {
        self.dist.get(node.index()).copied().filter(|&d| d != u64::MAX)
    }

    /// Tree path between the root and `node`, in travel order.
    ///
    /// Forward trees give root → node; backward trees give node → root.
    pub fn path_edges(&self, graph: &TransportGraph, node: NodeId) -> Option<Vec<EdgeId>> {
        self.cost(node)?;
        let mut edges = Vec::new();
        let mut cur = node;
        while cur != self.root {
            let e = self.via[cur.index()];
            if e == EdgeId::INVALID {
                return None;
            }
            edges.push(e);
            cur = match self.direction {
                Direction::Forward => graph.edge_from[e.index()],
                Direction::Backward => graph.edge_to[e.index()],
            };
        }
        if self.direction == Direction::Forward {
            edges.reverse();
        }
        Some(edges)
    }
}

/// Point-to-point shortest path from `from` to `to`.
pub fn shortest_path(
    weighting: &ModeWeighting<'_>,
    from: NodeId,
    to: NodeId,
    budget: usize,
) -> SpatialResult<Path> {
    let graph = weighting.graph();
    if from.index() >= graph.node_count() {
        return Err(SpatialError::NodeNotFound(from));
    }
    if to.index() >= graph.node_count() {
        return Err(SpatialError::NodeNotFound(to));
    }
    if from == to {
        return Ok(Path { edges: vec![], weighted_ms: 0 });
    }

    let tree = dijkstra(weighting, from, Direction::Forward, Some(to), budget)?;
    match (tree.cost(to), tree.path_edges(graph, to)) {
        (Some(weighted_ms), Some(edges)) => Ok(Path { edges, weighted_ms }),
        _ => Err(SpatialError::NoRoute { mode: graph.mode, from, to }),
    }
}

/// Full shortest-path tree rooted at `root`.
pub fn search_tree(
    weighting: &ModeWeighting<'_>,
    root: NodeId,
    direction: Direction,
    budget: usize,
) -> SpatialResult<SearchTree> {
    if root.index() >= weighting.graph().node_count() {
        return Err(SpatialError::NodeNotFound(root));
    }
    dijkstra(weighting, root, direction, None, budget)
}

fn dijkstra(
    weighting: &ModeWeighting<'_>,
    root: NodeId,
    direction: Direction,
    target: Option<NodeId>,
    budget: usize,
) -> SpatialResult<SearchTree> {
    let graph = weighting.graph();
    let n = graph.node_count();
    let mut dist = vec![u64::MAX; n];
    let mut via = vec![EdgeId::INVALID; n];
    dist[root.index()] = 0;

    // Reverse makes the max-heap a min-heap; NodeId breaks cost ties.
    let mut heap: BinaryHeap<Reverse<(u64, NodeId)>> = BinaryHeap::new();
    heap.push(Reverse((0, root)));
    let mut settled = 0usize;

    while let Some(Reverse((cost, node))) = heap.pop() {
        if cost > dist[node.index()] {
            continue;
        }
        if Some(node) == target {
            break;
        }
        settled += 1;
        if settled > budget {
            return Err(SpatialError::SearchBudgetExceeded { budget });
        }

        let mut relax = |edge: EdgeId, next: NodeId| {
            let new_cost = cost.saturating_add(weighting.weight_ms(edge));
            if new_cost < dist[next.index()] {
                dist[next.index()] = new_cost;
                via[next.index()] = edge;
                heap.push(Reverse((new_cost, next)));
            }
        };
        match direction {
            Direction::Forward => {
                for edge in graph.out_edges(node) {
                    relax(edge, graph.edge_to[edge.index()]);
                }
            }
            Direction::Backward => {
                for edge in graph.in_edges(node) {
                    relax(edge, graph.edge_from[edge.index()]);
                }
            }
        }
    }

    Ok(SearchTree { root, direction, dist, via })
}
