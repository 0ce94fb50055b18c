//! Best single-transfer journey across the road and rail graphs.
//!
//! For a fixed orientation (first graph A, second graph B) the cheapest
//! journey through transfer T costs `dist_A(origin → T) + dist_B(T → dest)`.
//! One forward tree in A and one backward tree in B give both terms for every
//! transfer at once, so the scan is two Dijkstra runs plus a linear pass over
//! the transfer table regardless of how many transfers exist.
//!
//! Both legs are weighted by the traveller's preferred mode, so a rail-averse
//! traveller pays the rail multiplier on the rail leg and picks transfers
//! accordingly.
//!
//! Candidates are ranked by `(cost, transfer stop id, orientation)`, with
//! road→rail ranked before rail→road. An orientation whose search runs out of
//! budget is skipped; the budget error surfaces only if no other orientation
//! produced a journey.

use tracing::debug;
use tt_core::{EdgeId, GeoPoint, StopId, TransportMode};

use crate::context::{NetworkAccess, NetworkContext};
use crate::search::{Direction, search_tree};
use crate::weighting::{ModeWeighting, WeightingPolicy};
use crate::{SpatialError, SpatialResult};

/// Orientations in tie-break order.
pub const ORIENTATIONS: [(TransportMode, TransportMode); 2] = [
    (TransportMode::Road, TransportMode::Rail),
    (TransportMode::Rail, TransportMode::Road),
];

/// The winning transfer journey.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransferRoute {
    pub transfer: StopId,
    pub first_mode: TransportMode,
    pub second_mode: TransportMode,
    /// Edges in the first graph, origin → transfer.
    pub first: Vec<EdgeId>,
    /// Edges in the second graph, transfer → destination.
    pub second: Vec<EdgeId>,
    pub weighted_ms: u64,
}

/// Location plus precomputed access used by the multi-modal search.
#[derive(Copy, Clone, Debug)]
pub struct Anchor<'a> {
    pub pos: GeoPoint,
    pub access: &'a NetworkAccess,
}

/// Search both orientations and return the cheapest transfer journey.
///
/// Fails with `NoAccess` if neither orientation has access nodes on both
/// graphs, with `SearchBudgetExceeded` if every searchable orientation ran out
/// of budget, and with `NoTransfer` if no transfer links a reachable part of A
/// with a part of B that reaches the destination.
pub fn best_transfer(
    ctx: &NetworkContext,
    policy: &WeightingPolicy,
    preference: TransportMode,
    origin: Anchor<'_>,
    destination: Anchor<'_>,
    budget: usize,
) -> SpatialResult<TransferRoute> {
    let mut best: Option<(u64, &StopId, usize, TransferRoute)> = None;
    let mut any_access = false;
    let mut budget_hit = None;

    for (rank, &(mode_a, mode_b)) in ORIENTATIONS.iter().enumerate() {
        let (Some(graph_a), Some(graph_b)) = (ctx.graph(mode_a), ctx.graph(mode_b)) else {
            continue;
        };
        let (Some(start), Some(end)) = (
            ctx.access_node(mode_a, origin.pos, origin.access),
            ctx.access_node(mode_b, destination.pos, destination.access),
        ) else {
            continue;
        };
        any_access = true;

        let view_a = ModeWeighting::new(graph_a, policy, preference);
        let view_b = ModeWeighting::new(graph_b, policy, preference);
        let trees = search_tree(&view_a, start, Direction::Forward, budget).and_then(|tree_a| {
            search_tree(&view_b, end, Direction::Backward, budget).map(|tree_b| (tree_a, tree_b))
        });
        let (tree_a, tree_b) = match trees {
            Ok(trees) => trees,
            Err(err @ SpatialError::SearchBudgetExceeded { .. }) => {
                debug!(first = %mode_a, second = %mode_b, %err, "orientation skipped");
                budget_hit = Some(err);
                continue;
            }
            Err(err) => return Err(err),
        };

        for t in ctx.transfers() {
            let (Some(node_a), Some(node_b)) = (t.node_in(mode_a), t.node_in(mode_b)) else {
                continue;
            };
            let (Some(ca), Some(cb)) = (tree_a.cost(node_a), tree_b.cost(node_b)) else {
                continue;
            };
            let cost = ca.saturating_add(cb);
            let better = match &best {
                None => true,
                Some((bc, bs, br, _)) => (cost, &t.stop, rank) < (*bc, *bs, *br),
            };
            if !better {
                continue;
            }
            let (Some(first), Some(second)) =
                (tree_a.path_edges(graph_a, node_a), tree_b.path_edges(graph_b, node_b))
            else {
                continue;
            };
            best = Some((
                cost,
                &t.stop,
                rank,
                TransferRoute {
                    transfer: t.stop.clone(),
                    first_mode: mode_a,
                    second_mode: mode_b,
                    first,
                    second,
                    weighted_ms: cost,
                },
            ));
        }
    }

    match (best, budget_hit) {
        (Some((_, _, _, route)), _) => Ok(route),
        (None, Some(err)) => Err(err),
        (None, None) if !any_access => Err(SpatialError::NoAccess { mode: TransportMode::Mixed }),
        (None, None) => Err(SpatialError::NoTransfer),
    }
}
