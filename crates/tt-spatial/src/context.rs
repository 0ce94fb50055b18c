//! Shared read-only routing context: both graphs plus the transfer table.

use tracing::info;

use tt_core::{GeoPoint, NodeId, StopId, TransportMode};

use crate::network::TransportGraph;

/// A stop present in both networks, with its node in each.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transfer {
    pub stop: StopId,
    pub road: NodeId,
    pub rail: NodeId,
}

impl Transfer {
    /// The transfer's node in the `mode` network (`Road` or `Rail`).
    #[inline]
    pub fn node_in(&self, mode: TransportMode) -> Option<NodeId> {
        match mode {
            TransportMode::Road => Some(self.road),
            TransportMode::Rail => Some(self.rail),
            _ => None,
        }
    }
}

/// Precomputed network access of a location (a building).
///
/// `None` means "snap with the R-tree at routing time".
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct NetworkAccess {
    pub road: Option<NodeId>,
    pub rail: Option<NodeId>,
}

impl NetworkAccess {
    #[inline]
    pub fn node_for(&self, mode: TransportMode) -> Option<NodeId> {
        match mode {
            TransportMode::Road => self.road,
            TransportMode::Rail => self.rail,
            _ => None,
        }
    }
}

/// Road graph, rail graph, and the transfer table derived from them.
///
/// Built once at startup and shared by reference (it is `Sync`) across all
/// routing workers.  Nothing mutates it afterwards.
pub struct NetworkContext {
    pub road: TransportGraph,
    pub rail: TransportGraph,
    /// Sorted ascending by stop id.
    transfers: Vec<Transfer>,
}

impl NetworkContext {
    pub fn new(road: TransportGraph, rail: TransportGraph) -> Self {
        let mut transfers: Vec<Transfer> = road
            .node_stop
            .iter()
            .enumerate()
            .filter_map(|(i, stop)| {
                rail.node_of(stop).map(|rail_node| Transfer {
                    stop: stop.clone(),
                    road: NodeId(i as u32),
                    rail: rail_node,
                })
            })
            .collect();
        transfers.sort_by(|a, b| a.stop.cmp(&b.stop));

        info!(
            road_nodes = road.node_count(),
            rail_nodes = rail.node_count(),
            transfers = transfers.len(),
            "network context ready"
        );
        Self { road, rail, transfers }
    }

    /// The graph serving `mode`; `None` for `Walk` and `Mixed`.
    pub fn graph(&self, mode: TransportMode) -> Option<&TransportGraph> {
        match mode {
            TransportMode::Road => Some(&self.road),
            TransportMode::Rail => Some(&self.rail),
            _ => None,
        }
    }

    pub fn transfers(&self) -> &[Transfer] {
        &self.transfers
    }

    /// Precompute access nodes for a location.  Named stops are looked up by
    /// id; a missing or unknown name falls back to the nearest stop.
    pub fn resolve_access(
        &self,
        pos: GeoPoint,
        road_stop: Option<&StopId>,
        rail_stop: Option<&StopId>,
    ) -> NetworkAccess {
        let pick = |graph: &TransportGraph, stop: Option<&StopId>| {
            stop.and_then(|s| graph.node_of(s)).or_else(|| graph.snap_to_node(pos))
        };
        NetworkAccess { road: pick(&self.road, road_stop), rail: pick(&self.rail, rail_stop) }
    }

    /// Access node of `pos` on the `mode` network, snapping if not given.
    pub fn access_node(
        &self,
        mode: TransportMode,
        pos: GeoPoint,
        access: &NetworkAccess,
    ) -> Option<NodeId> {
        let graph = self.graph(mode)?;
        access.node_for(mode).or_else(|| graph.snap_to_node(pos))
    }
}
