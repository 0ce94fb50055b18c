//! Routing pass: turn every `TripRequest` into a `Trip`.
//!
//! The network context and router are shared read-only.  With the `parallel`
//! feature agents are routed on the Rayon pool; results keep agent order.

use tracing::{info, warn};

use tt_spatial::{NetworkContext, Resolution, RouteRequest, Router};

use crate::roster::{BuildingTable, Roster};
use crate::trip::{Trip, TripRequest};

/// How the routing pass resolved the roster's trips.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct RoutingSummary {
    pub preferred: usize,
    pub walk: usize,
    pub fallback: usize,
    pub unroutable: usize,
}

impl RoutingSummary {
    pub fn record(&mut self, resolution: Resolution) {
        match resolution {
            Resolution::Preferred => self.preferred += 1,
            Resolution::Walk => self.walk += 1,
            Resolution::Fallback => self.fallback += 1,
            Resolution::Unroutable => self.unroutable += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.preferred + self.walk + self.fallback + self.unroutable
    }
}

/// Route every trip in `roster`.  Returns trips indexed by `AgentId`.
///
/// Unroutable trips are kept (without routing) and logged; they never abort
/// the pass.
pub fn route_roster<R: Router + ?Sized>(
    ctx: &NetworkContext,
    router: &R,
    buildings: &BuildingTable,
    roster: &Roster,
) -> (Vec<Vec<Trip>>, RoutingSummary) {
    let route_one = |req: &TripRequest| {
        let request = RouteRequest {
            origin: buildings.endpoint(req.origin),
            destination: buildings.endpoint(req.destination),
            preferred: req.preferred,
        };
        Trip::resolve(req.clone(), router.route(ctx, &request), buildings)
    };
    let route_agent = |reqs: &Vec<TripRequest>| reqs.iter().map(&route_one).collect::<Vec<_>>();

    #[cfg(feature = "parallel")]
    let trips: Vec<Vec<Trip>> = {
        use rayon::prelude::*;
        roster.trips.par_iter().map(route_agent).collect()
    };
    #[cfg(not(feature = "parallel"))]
    let trips: Vec<Vec<Trip>> = roster.trips.iter().map(route_agent).collect();

    let mut summary = RoutingSummary::default();
    for trip in trips.iter().flatten() {
        summary.record(trip.resolution());
        if !trip.is_routable() {
            let attempted: Vec<&str> = trip.attempted().iter().map(|m| m.as_str()).collect();
            warn!(
                agent = trip.request.agent.0,
                seq = trip.request.seq,
                preferred = %trip.request.preferred,
                ?attempted,
                "trip is unroutable in every attempted mode"
            );
        }
    }
    info!(
        preferred = summary.preferred,
        walk = summary.walk,
        fallback = summary.fallback,
        unroutable = summary.unroutable,
        "routing pass complete"
    );
    (trips, summary)
}
