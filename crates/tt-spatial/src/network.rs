//! Transport graph representation and builder.
//!
//! # Data layout
//!
//! Each network (road, rail) is one directed graph in **Compressed Sparse
//! Row (CSR)** format.  Given a `NodeId n`, its outgoing edges occupy the
//! EdgeId range:
//!
//! ```text
//! node_out_start[n] .. node_out_start[n+1]
//! ```
//!
//! A second CSR index (`node_in_start` + `in_edges`) lists incoming edges so
//! backward search trees (used by the multi-modal router) scan contiguous
//! memory too.
//!
//! Nodes are transit stops.  The external stop id is kept per node and
//! looked up through `stop_index`; a stop id present in both graphs is a
//! transfer point (see [`NetworkContext`](crate::NetworkContext)).
//!
//! # Spatial index
//!
//! An R-tree (via `rstar`) maps `(lat, lon)` to the nearest `NodeId`.  Used
//! when a building has no precomputed nearest stop.

use std::collections::{BTreeMap, BTreeSet};

use rstar::{AABB, PointDistance, RTree, RTreeObject};
use rustc_hash::FxHashMap;
use serde::Deserialize;
use tracing::{debug, info, warn};

use tt_core::{CoreError, CoreResult, EdgeId, GeoPoint, NodeId, StopId, TransportMode};

// ── R-tree node entry ─────────────────────────────────────────────────────────

#[derive(Clone)]
struct NodeEntry {
    point: [f32; 2], // [lat, lon]
    id: NodeId,
}

impl RTreeObject for NodeEntry {
    type Envelope = AABB<[f32; 2]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl PointDistance for NodeEntry {
    /// Squared Euclidean distance in lat/lon space.  Good enough for
    /// nearest-stop queries within one metro area.
    fn distance_2(&self, point: &[f32; 2]) -> f32 {
        let dlat = self.point[0] - point[0];
        let dlon = self.point[1] - point[1];
        dlat * dlat + dlon * dlon
    }
}

// ── NetworkProfile ────────────────────────────────────────────────────────────

/// Per-network conversion from distance to base time and cost.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct NetworkProfile {
    /// Mode tag stamped on every edge of the network (`road` or `rail`).
    pub mode: TransportMode,
    /// Average in-vehicle speed.
    pub speed_kmh: f64,
    /// Fare-like cost per kilometre travelled.
    #[serde(default)]
    pub cost_per_km: f64,
}

impl NetworkProfile {
    /// Road-based transit: 20 km/h.
    pub fn road() -> Self {
        Self { mode: TransportMode::Road, speed_kmh: 20.0, cost_per_km: 1.0 }
    }

    /// Rail transit: 30 km/h.
    pub fn rail() -> Self {
        Self { mode: TransportMode::Rail, speed_kmh: 30.0, cost_per_km: 1.5 }
    }

    pub fn validate(&self) -> CoreResult<()> {
        if !matches!(self.mode, TransportMode::Road | TransportMode::Rail) {
            return Err(CoreError::Config(format!(
                "network mode must be road or rail, got {}",
                self.mode
            )));
        }
        if !(self.speed_kmh.is_finite() && self.speed_kmh > 0.0) {
            return Err(CoreError::Config(format!(
                "{} speed_kmh must be a positive number, got {}",
                self.mode, self.speed_kmh
            )));
        }
        if !(self.cost_per_km.is_finite() && self.cost_per_km >= 0.0) {
            return Err(CoreError::Config(format!(
                "{} cost_per_km must be >= 0, got {}",
                self.mode, self.cost_per_km
            )));
        }
        Ok(())
    }

    /// Base travel time in milliseconds for `length_m`; never below 1 ms so
    /// every edge carries a strictly positive weight.
    #[inline]
    pub fn travel_ms(&self, length_m: f32) -> u32 {
        let metres_per_ms = self.speed_kmh / 3_600.0;
        let ms = (length_m as f64 / metres_per_ms).round();
        ms.clamp(1.0, u32::MAX as f64) as u32
    }

    #[inline]
    pub fn cost(&self, length_m: f32) -> f32 {
        (length_m as f64 / 1_000.0 * self.cost_per_km) as f32
    }
}

// ── TransportGraph ────────────────────────────────────────────────────────────

/// Directed transit graph in CSR format plus a spatial index for snapping.
///
/// All per-node and per-edge arrays are `pub` for direct indexed access on
/// hot paths.  Do not construct directly; use [`GraphBuilder`].
pub struct TransportGraph {
    /// Network tag; equal to the mode of every edge.
    pub mode: TransportMode,

    // ── Node data ─────────────────────────────────────────────────────────
    /// Geographic position of each stop.  Indexed by `NodeId`.
    pub node_pos: Vec<GeoPoint>,
    /// External stop id of each node.
    pub node_stop: Vec<StopId>,
    stop_index: FxHashMap<StopId, NodeId>,

    // ── CSR adjacency ─────────────────────────────────────────────────────
    /// Outgoing edges of node `n` are EdgeIds
    /// `node_out_start[n] .. node_out_start[n+1]`.  Length = `node_count + 1`.
    pub node_out_start: Vec<u32>,
    /// Incoming edges of node `n` are `in_edges[node_in_start[n] ..
    /// node_in_start[n+1]]`.
    pub node_in_start: Vec<u32>,
    pub in_edges: Vec<EdgeId>,

    // ── Edge data (indexed by EdgeId = position in sorted order) ──────────
    pub edge_from: Vec<NodeId>,
    pub edge_to: Vec<NodeId>,
    /// Great-circle length between the endpoint stops.
    pub edge_length_m: Vec<f32>,
    /// Base travel time, milliseconds, always ≥ 1.
    pub edge_travel_ms: Vec<u32>,
    /// Base travel cost.
    pub edge_cost: Vec<f32>,
    pub edge_mode: Vec<TransportMode>,

    spatial_idx: RTree<NodeEntry>,
}

impl TransportGraph {
    /// A graph with no stops.  Every search against it fails with
    /// [`SpatialError::NoAccess`](crate::SpatialError::NoAccess).
    pub fn empty(mode: TransportMode) -> Self {
        let profile = NetworkProfile { mode, speed_kmh: 1.0, cost_per_km: 0.0 };
        GraphBuilder::new(profile).build()
    }

    // ── Graph dimensions ──────────────────────────────────────────────────

    pub fn node_count(&self) -> usize {
        self.node_pos.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_to.len()
    }

    pub fn is_empty(&self) -> bool {
        self.node_pos.is_empty()
    }

    // ── Graph traversal ───────────────────────────────────────────────────

    #[inline]
    pub fn out_edges(&self, node: NodeId) -> impl Iterator<Item = EdgeId> + '_ {
        let start = self.node_out_start[node.index()] as usize;
        let end = self.node_out_start[node.index() + 1] as usize;
        (start..end).map(|i| EdgeId(i as u32))
    }

    #[inline]
    pub fn in_edges(&self, node: NodeId) -> impl Iterator<Item = EdgeId> + '_ {
        let start = self.node_in_start[node.index()] as usize;
        let end = self.node_in_start[node.index() + 1] as usize;
        self.in_edges[start..end].iter().copied()
    }

    /// Straight-line geometry of `edge` (its two endpoint stops).
    pub fn edge_geometry(&self, edge: EdgeId) -> [GeoPoint; 2] {
        [
            self.node_pos[self.edge_from[edge.index()].index()],
            self.node_pos[self.edge_to[edge.index()].index()],
        ]
    }

    // ── Stop lookup ───────────────────────────────────────────────────────

    pub fn node_of(&self, stop: &StopId) -> Option<NodeId> {
        self.stop_index.get(stop).copied()
    }

    #[inline]
    pub fn stop(&self, node: NodeId) -> &StopId {
        &self.node_stop[node.index()]
    }

    // ── Spatial queries ───────────────────────────────────────────────────

    /// Nearest stop to `pos`.  `None` only if the graph has no nodes.
    pub fn snap_to_node(&self, pos: GeoPoint) -> Option<NodeId> {
        self.spatial_idx.nearest_neighbor(&[pos.lat, pos.lon]).map(|e| e.id)
    }

    // ── Structure ─────────────────────────────────────────────────────────

    /// Weakly-connected component label of every node (edge direction
    /// ignored).  Labels are dense, assigned in ascending `NodeId` order of
    /// each component's smallest node.
    pub fn component_labels(&self) -> Vec<u32> {
        let n = self.node_count();
        let mut parent: Vec<u32> = (0..n as u32).collect();

        fn find(parent: &mut [u32], mut x: u32) -> u32 {
            while parent[x as usize] != x {
                let grand = parent[parent[x as usize] as usize];
                parent[x as usize] = grand;
                x = grand;
            }
            x
        }

        for (from, to) in self.edge_from.iter().zip(&self.edge_to) {
            let a = find(&mut parent, from.0);
            let b = find(&mut parent, to.0);
            if a != b {
                // Smaller root wins so labels are stable across runs.
                let (lo, hi) = if a < b { (a, b) } else { (b, a) };
                parent[hi as usize] = lo;
            }
        }

        let mut label_of_root: FxHashMap<u32, u32> = FxHashMap::default();
        (0..n as u32)
            .map(|v| {
                let root = find(&mut parent, v);
                let next = label_of_root.len() as u32;
                *label_of_root.entry(root).or_insert(next)
            })
            .collect()
    }
}

// ── GraphBuilder ──────────────────────────────────────────────────────────────

/// Construct a [`TransportGraph`] from stops and service runs, then call
/// [`build`](Self::build).
///
/// Each run is an ordered list of stop visits.  Consecutive visits become a
/// directed edge weighted by great-circle distance; when the same ordered
/// pair is produced by several runs the shortest observed distance is kept.
///
/// ```
/// use tt_core::{GeoPoint, StopId};
/// use tt_spatial::{GraphBuilder, NetworkProfile};
///
/// let mut b = GraphBuilder::new(NetworkProfile::rail());
/// b.add_stop(StopId::from("A"), GeoPoint::new(14.60, 121.00));
/// b.add_stop(StopId::from("B"), GeoPoint::new(14.61, 121.00));
/// b.add_run(&[StopId::from("A"), StopId::from("B")]);
/// let g = b.build();
/// assert_eq!(g.node_count(), 2);
/// assert_eq!(g.edge_count(), 1); // runs are directed
/// ```
pub struct GraphBuilder {
    profile: NetworkProfile,
    nodes: Vec<GeoPoint>,
    stops: Vec<StopId>,
    stop_index: FxHashMap<StopId, NodeId>,
    /// Shortest observed distance per ordered stop pair.  Ordered map so the
    /// CSR edge order does not depend on hashing.
    links: BTreeMap<(NodeId, NodeId), f32>,
    unknown_stops: BTreeSet<StopId>,
}

impl GraphBuilder {
    pub fn new(profile: NetworkProfile) -> Self {
        Self {
            profile,
            nodes: Vec::new(),
            stops: Vec::new(),
            stop_index: FxHashMap::default(),
            links: BTreeMap::new(),
            unknown_stops: BTreeSet::new(),
        }
    }

    pub fn profile(&self) -> &NetworkProfile {
        &self.profile
    }

    /// Register a stop and return its `NodeId` (sequential from 0).  A stop
    /// id registered twice keeps its first coordinate.
    pub fn add_stop(&mut self, stop: StopId, pos: GeoPoint) -> NodeId {
        if let Some(&id) = self.stop_index.get(&stop) {
            debug!(network = %self.profile.mode, stop = %stop, "duplicate stop ignored");
            return id;
        }
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(pos);
        self.stop_index.insert(stop.clone(), id);
        self.stops.push(stop);
        id
    }

    /// Add one service run whose visits are already in travel order.
    /// Returns the number of consecutive pairs that produced an edge.
    pub fn add_run(&mut self, stops: &[StopId]) -> usize {
        let mut linked = 0;
        for pair in stops.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            if a == b {
                continue;
            }
            let (Some(from), Some(to)) = (self.lookup(a), self.lookup(b)) else {
                continue;
            };
            let d = self.nodes[from.index()].distance_m(self.nodes[to.index()]);
            self.links
                .entry((from, to))
                .and_modify(|best| *best = best.min(d))
                .or_insert(d);
            linked += 1;
        }
        linked
    }

    /// Add one run given as `(stop, sequence index)` visits in any order.
    pub fn add_visits(&mut self, mut visits: Vec<(StopId, u32)>) -> usize {
        visits.sort_by_key(|(_, seq)| *seq);
        let stops: Vec<StopId> = visits.into_iter().map(|(s, _)| s).collect();
        self.add_run(&stops)
    }

    fn lookup(&mut self, stop: &StopId) -> Option<NodeId> {
        let id = self.stop_index.get(stop).copied();
        if id.is_none() {
            self.unknown_stops.insert(stop.clone());
        }
        id
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.links.len()
    }

    /// Consume the builder and produce a [`TransportGraph`].
    ///
    /// Logs a warning for runs that referenced unknown stops and for graphs
    /// with more than one weakly-connected component.  Neither is fatal.
    pub fn build(self) -> TransportGraph {
        let node_count = self.nodes.len();
        let mode = self.profile.mode;

        if !self.unknown_stops.is_empty() {
            let sample: Vec<&str> =
                self.unknown_stops.iter().take(5).map(StopId::as_str).collect();
            warn!(
                network = %mode,
                count = self.unknown_stops.len(),
                ?sample,
                "stop visits reference unknown stops; affected pairs skipped"
            );
        }

        // `links` iterates in (from, to) order, which is exactly CSR order.
        let edge_count = self.links.len();
        let mut edge_from = Vec::with_capacity(edge_count);
        let mut edge_to = Vec::with_capacity(edge_count);
        let mut edge_length_m = Vec::with_capacity(edge_count);
        let mut edge_travel_ms = Vec::with_capacity(edge_count);
        let mut edge_cost = Vec::with_capacity(edge_count);
        for (&(from, to), &length_m) in &self.links {
            edge_from.push(from);
            edge_to.push(to);
            edge_length_m.push(length_m);
            edge_travel_ms.push(self.profile.travel_ms(length_m));
            edge_cost.push(self.profile.cost(length_m));
        }
        let edge_mode = vec![mode; edge_count];

        let mut node_out_start = vec![0u32; node_count + 1];
        for e in &edge_from {
            node_out_start[e.index() + 1] += 1;
        }
        for i in 1..=node_count {
            node_out_start[i] += node_out_start[i - 1];
        }
        debug_assert_eq!(node_out_start[node_count] as usize, edge_count);

        // Reverse CSR by counting sort on the target node.  Edges are visited
        // in EdgeId order so each node's incoming list is ascending.
        let mut node_in_start = vec![0u32; node_count + 1];
        for e in &edge_to {
            node_in_start[e.index() + 1] += 1;
        }
        for i in 1..=node_count {
            node_in_start[i] += node_in_start[i - 1];
        }
        let mut cursor: Vec<u32> = node_in_start[..node_count].to_vec();
        let mut in_edges = vec![EdgeId::INVALID; edge_count];
        for (i, to) in edge_to.iter().enumerate() {
            let slot = &mut cursor[to.index()];
            in_edges[*slot as usize] = EdgeId(i as u32);
            *slot += 1;
        }

        let entries: Vec<NodeEntry> = self
            .nodes
            .iter()
            .enumerate()
            .map(|(i, &pos)| NodeEntry { point: [pos.lat, pos.lon], id: NodeId(i as u32) })
            .collect();
        let spatial_idx = RTree::bulk_load(entries);

        let graph = TransportGraph {
            mode,
            node_pos: self.nodes,
            node_stop: self.stops,
            stop_index: self.stop_index,
            node_out_start,
            node_in_start,
            in_edges,
            edge_from,
            edge_to,
            edge_length_m,
            edge_travel_ms,
            edge_cost,
            edge_mode,
            spatial_idx,
        };

        info!(
            network = %mode,
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            "transport graph built"
        );
        warn_if_disconnected(&graph);
        graph
    }
}

/// Log the component count and a few stop pairs that cannot reach each other.
fn warn_if_disconnected(graph: &TransportGraph) {
    let labels = graph.component_labels();
    let components = labels.iter().max().map_or(0, |&m| m as usize + 1);
    if components <= 1 {
        return;
    }

    // First stop of each component, in label order.
    let mut representative: Vec<Option<NodeId>> = vec![None; components];
    for (i, &label) in labels.iter().enumerate() {
        representative[label as usize].get_or_insert(NodeId(i as u32));
    }
    let anchor = representative[0];
    let sample_pairs: Vec<String> = representative[1..]
        .iter()
        .flatten()
        .take(5)
        .filter_map(|&other| {
            anchor.map(|a| format!("{}<->{}", graph.stop(a), graph.stop(other)))
        })
        .collect();

    warn!(
        network = %graph.mode,
        components,
        ?sample_pairs,
        "transport graph is not connected; some stop pairs have no path"
    );
}
