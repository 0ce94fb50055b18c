//! Routing trait and the default Dijkstra-based router with mode fallback.
//!
//! # Pluggability
//!
//! The routing pass in `tt-schedule` calls routing via the [`Router`] trait,
//! so applications can swap in other engines without touching the rest of
//! the pipeline.
//!
//! # Resolution order
//!
//! 1. Walk short-circuit: endpoints within `walk_threshold_m` get a single
//!    walk segment, whatever the preference.  No graph is searched.
//! 2. The preferred mode.
//! 3. Up to `max_fallbacks` modes from `fallback_order`, skipping the
//!    preferred one.
//!
//! Failures at every step are absorbed; the caller gets a [`RouteOutcome`]
//! whose route is `None` when nothing worked.
//!
//! Every search, fallbacks included, is weighted by the *preferred* mode, so
//! edges of other modes carry the preference's multiplier.  On a single-mode
//! graph that scales every edge alike; in the mixed search it shifts which
//! transfer wins.

use serde::Deserialize;
use tracing::debug;

use tt_core::{BuildingId, CoreError, CoreResult, GeoPoint, TransportMode};

use crate::context::{NetworkAccess, NetworkContext};
use crate::multimodal::{Anchor, best_transfer};
use crate::route::{ResolvedRoute, RouteOutcome, RouteSegment};
use crate::search::shortest_path;
use crate::weighting::{ModeWeighting, WeightingPolicy};
use crate::{SpatialError, SpatialResult};

// ── RoutingConfig ─────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct RoutingConfig {
    /// Straight-line distance under which trips are walked.  Default: 500 m.
    pub walk_threshold_m: f32,
    /// Walking speed.  Default: 5 km/h.
    pub walk_speed_kmh: f64,
    /// Fallback candidates, in order.  Default: rail, road, mixed.
    pub fallback_order: Vec<TransportMode>,
    /// Maximum number of fallback modes tried after the preferred one.
    pub max_fallbacks: usize,
    pub weighting: WeightingPolicy,
    /// Maximum nodes any single Dijkstra run may settle.
    pub search_budget: usize,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            walk_threshold_m: 500.0,
            walk_speed_kmh:   5.0,
            fallback_order:   vec![TransportMode::Rail, TransportMode::Road, TransportMode::Mixed],
            max_fallbacks:    2,
            weighting:        WeightingPolicy::default(),
            search_budget:    1_000_000,
        }
    }
}

impl RoutingConfig {
    pub fn validate(&self) -> CoreResult<()> {
        if !(self.walk_threshold_m.is_finite() && self.walk_threshold_m >= 0.0) {
            return Err(CoreError::Config(format!(
                "walk_threshold_m must be >= 0, got {}",
                self.walk_threshold_m
            )));
        }
        if !(self.walk_speed_kmh.is_finite() && self.walk_speed_kmh > 0.0) {
            return Err(CoreError::Config(format!(
                "walk_speed_kmh must be > 0, got {}",
                self.walk_speed_kmh
            )));
        }
        if self.search_budget == 0 {
            return Err(CoreError::Config("search_budget must be > 0".into()));
        }
        for (i, mode) in self.fallback_order.iter().enumerate() {
            if self.fallback_order[..i].contains(mode) {
                return Err(CoreError::Config(format!("fallback_order lists {mode} twice")));
            }
        }
        self.weighting.validate()
    }

    /// Preferred mode followed by the fallbacks that will be tried.
    pub fn attempt_order(&self, preferred: TransportMode) -> Vec<TransportMode> {
        std::iter::once(preferred)
            .chain(
                self.fallback_order
                    .iter()
                    .copied()
                    .filter(|&m| m != preferred)
                    .take(self.max_fallbacks),
            )
            .collect()
    }
}

// ── Requests ──────────────────────────────────────────────────────────────────

/// A building endpoint with its precomputed network access.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Endpoint {
    pub building: BuildingId,
    pub pos: GeoPoint,
    pub access: NetworkAccess,
}

impl Endpoint {
    fn anchor(&self) -> Anchor<'_> {
        Anchor { pos: self.pos, access: &self.access }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct RouteRequest {
    pub origin: Endpoint,
    pub destination: Endpoint,
    pub preferred: TransportMode,
}

// ── Router trait ──────────────────────────────────────────────────────────────

/// Pluggable routing engine.
///
/// Implementations must be `Send + Sync`: the routing pass shares one router
/// and one [`NetworkContext`] across Rayon workers.
pub trait Router: Send + Sync {
    /// Resolve `request`.  Never fails; an unroutable request yields an
    /// outcome with `route: None`.
    fn route(&self, ctx: &NetworkContext, request: &RouteRequest) -> RouteOutcome;
}

// ── DijkstraRouter ────────────────────────────────────────────────────────────

pub struct DijkstraRouter {
    config: RoutingConfig,
}

impl DijkstraRouter {
    /// Validates `config` and refuses to construct on error.
    pub fn new(config: RoutingConfig) -> CoreResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &RoutingConfig {
        &self.config
    }

    /// Walk leg if the endpoints are close enough.
    pub fn try_walk(&self, request: &RouteRequest) -> Option<ResolvedRoute> {
        let distance = request.origin.pos.distance_m(request.destination.pos);
        (distance <= self.config.walk_threshold_m).then(|| {
            ResolvedRoute::walk(
                (request.origin.building, request.origin.pos),
                (request.destination.building, request.destination.pos),
                self.config.walk_speed_kmh,
            )
        })
    }

    /// Route with exactly one mode, no fallback.
    pub fn route_mode(
        &self,
        ctx: &NetworkContext,
        request: &RouteRequest,
        mode: TransportMode,
    ) -> SpatialResult<ResolvedRoute> {
        match mode {
            TransportMode::Walk => {
                let distance_m = request.origin.pos.distance_m(request.destination.pos);
                self.try_walk(request).ok_or(SpatialError::WalkOutOfRange { distance_m })
            }
            TransportMode::Road | TransportMode::Rail => self.single_network(ctx, request, mode),
            TransportMode::Mixed => self.multimodal(ctx, request),
        }
    }

    fn single_network(
        &self,
        ctx: &NetworkContext,
        request: &RouteRequest,
        mode: TransportMode,
    ) -> SpatialResult<ResolvedRoute> {
        let graph = ctx.graph(mode).ok_or(SpatialError::NoAccess { mode })?;
        let from = ctx
            .access_node(mode, request.origin.pos, &request.origin.access)
            .ok_or(SpatialError::NoAccess { mode })?;
        let to = ctx
            .access_node(mode, request.destination.pos, &request.destination.access)
            .ok_or(SpatialError::NoAccess { mode })?;

        let view = ModeWeighting::new(graph, &self.config.weighting, request.preferred);
        let path = shortest_path(&view, from, to, self.config.search_budget)?;
        Ok(ResolvedRoute::new(RouteSegment::from_edges(graph, &path.edges), mode))
    }

    fn multimodal(&self, ctx: &NetworkContext, request: &RouteRequest) -> SpatialResult<ResolvedRoute> {
        let best = best_transfer(
            ctx,
            &self.config.weighting,
            request.preferred,
            request.origin.anchor(),
            request.destination.anchor(),
            self.config.search_budget,
        )?;
        let (Some(first), Some(second)) = (ctx.graph(best.first_mode), ctx.graph(best.second_mode))
        else {
            return Err(SpatialError::NoTransfer);
        };
        let mut segments = RouteSegment::from_edges(first, &best.first);
        segments.extend(RouteSegment::from_edges(second, &best.second));
        debug!(transfer = %best.transfer, first = %best.first_mode, "multi-modal route");
        Ok(ResolvedRoute::new(segments, TransportMode::Mixed))
    }
}

impl Router for DijkstraRouter {
    fn route(&self, ctx: &NetworkContext, request: &RouteRequest) -> RouteOutcome {
        if let Some(walk) = self.try_walk(request) {
            return RouteOutcome { route: Some(walk), attempted: Vec::new() };
        }

        let mut attempted = Vec::new();
        for mode in self.config.attempt_order(request.preferred) {
            attempted.push(mode);
            match self.route_mode(ctx, request, mode) {
                Ok(route) => return RouteOutcome { route: Some(route), attempted },
                Err(err) => debug!(
                    origin = request.origin.building.0,
                    destination = request.destination.building.0,
                    %mode,
                    %err,
                    "routing attempt failed"
                ),
            }
        }
        RouteOutcome { route: None, attempted }
    }
}
