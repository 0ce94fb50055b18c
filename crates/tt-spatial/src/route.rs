//! Routing results.

use std::fmt;

use tt_core::{BuildingId, EdgeId, GeoPoint, StopId, TransportMode};

use crate::network::TransportGraph;

/// Either end of a route segment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Waypoint {
    Building(BuildingId),
    Stop(StopId),
}

impl fmt::Display for Waypoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Waypoint::Building(b) => write!(f, "building:{}", b.0),
            Waypoint::Stop(s) => write!(f, "stop:{s}"),
        }
    }
}

/// One leg of a resolved route.
///
/// `time_min` and `cost` are *base* values (unweighted); weighting only
/// steers path choice.
#[derive(Clone, Debug, PartialEq)]
pub struct RouteSegment {
    pub from: Waypoint,
    pub to: Waypoint,
    pub mode: TransportMode,
    pub time_min: f64,
    pub cost: f64,
    pub geometry: Vec<GeoPoint>,
}

impl RouteSegment {
    /// One segment per graph edge, in the given order.
    pub fn from_edges(graph: &TransportGraph, edges: &[EdgeId]) -> Vec<RouteSegment> {
        edges
            .iter()
            .map(|&e| {
                let i = e.index();
                RouteSegment {
                    from: Waypoint::Stop(graph.stop(graph.edge_from[i]).clone()),
                    to: Waypoint::Stop(graph.stop(graph.edge_to[i]).clone()),
                    mode: graph.edge_mode[i],
                    time_min: graph.edge_travel_ms[i] as f64 / 60_000.0,
                    cost: graph.edge_cost[i] as f64,
                    geometry: graph.edge_geometry(e).to_vec(),
                }
            })
            .collect()
    }
}

/// A complete route with totals and the mode that produced it.
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedRoute {
    pub segments: Vec<RouteSegment>,
    pub total_time_min: f64,
    pub total_cost: f64,
    pub mode_used: TransportMode,
}

impl ResolvedRoute {
    /// Totals are the sums over `segments`.
    pub fn new(segments: Vec<RouteSegment>, mode_used: TransportMode) -> Self {
        let total_time_min = segments.iter().map(|s| s.time_min).sum();
        let total_cost = segments.iter().map(|s| s.cost).sum();
        Self { segments, total_time_min, total_cost, mode_used }
    }

    /// Single building-to-building walk leg.
    pub fn walk(
        origin: (BuildingId, GeoPoint),
        destination: (BuildingId, GeoPoint),
        walk_speed_kmh: f64,
    ) -> Self {
        let distance_m = origin.1.distance_m(destination.1) as f64;
        let metres_per_min = walk_speed_kmh * 1_000.0 / 60.0;
        let segment = RouteSegment {
            from: Waypoint::Building(origin.0),
            to: Waypoint::Building(destination.0),
            mode: TransportMode::Walk,
            time_min: distance_m / metres_per_min,
            cost: 0.0,
            geometry: vec![origin.1, destination.1],
        };
        Self::new(vec![segment], TransportMode::Walk)
    }

    /// Concatenated segment geometry, endpoints shared between consecutive
    /// segments listed once.
    pub fn geometry(&self) -> Vec<GeoPoint> {
        let mut out: Vec<GeoPoint> = Vec::new();
        for seg in &self.segments {
            for &p in &seg.geometry {
                if out.last() != Some(&p) {
                    out.push(p);
                }
            }
        }
        out
    }
}

/// How a trip's route was obtained.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Resolution {
    /// Endpoints within walking distance; no search ran.
    Walk,
    /// Preferred mode succeeded.
    Preferred,
    /// A fallback mode succeeded.
    Fallback,
    /// Every attempted mode failed.
    Unroutable,
}

impl Resolution {
    pub fn as_str(self) -> &'static str {
        match self {
            Resolution::Walk => "walk",
            Resolution::Preferred => "preferred",
            Resolution::Fallback => "fallback",
            Resolution::Unroutable => "unroutable",
        }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of a routing request: the route (or none) plus the modes tried.
#[derive(Clone, Debug, PartialEq)]
pub struct RouteOutcome {
    pub route: Option<ResolvedRoute>,
    /// Modes searched, in order.  Empty for walk short-circuits.
    pub attempted: Vec<TransportMode>,
}

impl RouteOutcome {
    pub fn resolution(&self) -> Resolution {
        match &self.route {
            None => Resolution::Unroutable,
            Some(_) if self.attempted.is_empty() => Resolution::Walk,
            Some(r) if self.attempted.first() == Some(&r.mode_used) => Resolution::Preferred,
            Some(_) => Resolution::Fallback,
        }
    }

    /// `(segments, total_time_min, total_cost, mode_used)`, all `None` when
    /// unroutable.
    pub fn into_parts(
        self,
    ) -> (Option<Vec<RouteSegment>>, Option<f64>, Option<f64>, Option<TransportMode>) {
        match self.route {
            Some(r) => (Some(r.segments), Some(r.total_time_min), Some(r.total_cost), Some(r.mode_used)),
            None => (None, None, None, None),
        }
    }
}
