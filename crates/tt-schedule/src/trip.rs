//! Trip requests and routed trips.

use tt_core::{ActivityId, AgentId, BuildingId, Polyline, TransportMode};
use tt_spatial::{Resolution, ResolvedRoute, RouteOutcome, RouteSegment};

use crate::roster::BuildingTable;

/// One planned trip as read from the roster.
#[derive(Clone, Debug, PartialEq)]
pub struct TripRequest {
    pub agent: AgentId,
    pub seq: u32,
    pub origin: BuildingId,
    pub destination: BuildingId,
    pub preferred: TransportMode,
    pub purpose: ActivityId,
    /// Departure as written in the input; parsed by the dispatch table.
    pub departure: String,
}

/// Routing result attached to a trip.  All fields are present together.
#[derive(Clone, Debug, PartialEq)]
pub struct TripRouting {
    pub route: ResolvedRoute,
    pub resolution: Resolution,
    /// Travel path: origin building, segment geometry, destination building.
    pub path: Polyline,
}

/// A trip after the routing pass.  Immutable once built.
#[derive(Clone, Debug, PartialEq)]
pub struct Trip {
    pub request: TripRequest,
    routing: Option<TripRouting>,
    attempted: Vec<TransportMode>,
}

impl Trip {
    /// Attach a router outcome to `request`.
    pub fn resolve(request: TripRequest, outcome: RouteOutcome, buildings: &BuildingTable) -> Self {
        let resolution = outcome.resolution();
        let RouteOutcome { route, attempted } = outcome;
        let routing = route.map(|route| {
            let origin = buildings.pos(request.origin);
            let destination = buildings.pos(request.destination);
            let path = Polyline::new(
                std::iter::once(origin)
                    .chain(route.geometry())
                    .chain(std::iter::once(destination)),
            );
            TripRouting { route, resolution, path }
        });
        Self { request, routing, attempted }
    }

    /// A trip that was never routed.
    pub fn unrouted(request: TripRequest) -> Self {
        Self { request, routing: None, attempted: Vec::new() }
    }

    pub fn routing(&self) -> Option<&TripRouting> {
        self.routing.as_ref()
    }

    pub fn is_routable(&self) -> bool {
        self.routing.is_some()
    }

    pub fn resolution(&self) -> Resolution {
        self.routing.as_ref().map_or(Resolution::Unroutable, |r| r.resolution)
    }

    pub fn attempted(&self) -> &[TransportMode] {
        &self.attempted
    }

    pub fn segments(&self) -> Option<&[RouteSegment]> {
        self.routing.as_ref().map(|r| r.route.segments.as_slice())
    }

    pub fn total_time_min(&self) -> Option<f64> {
        self.routing.as_ref().map(|r| r.route.total_time_min)
    }

    pub fn total_cost(&self) -> Option<f64> {
        self.routing.as_ref().map(|r| r.route.total_cost)
    }

    pub fn mode_used(&self) -> Option<TransportMode> {
        self.routing.as_ref().map(|r| r.route.mode_used)
    }

    pub fn path(&self) -> Option<&Polyline> {
        self.routing.as_ref().map(|r| &r.path)
    }
}
