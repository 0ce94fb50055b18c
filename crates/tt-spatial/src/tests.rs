//! Unit tests for tt-spatial.
//!
//! All tests use hand-built networks; no files are read.

#[cfg(test)]
mod helpers {
    use tt_core::{EdgeId, GeoPoint, NodeId, StopId, TransportMode};

    use crate::{GraphBuilder, NetworkProfile, TransportGraph};

    pub fn s(id: &str) -> StopId {
        StopId::from(id)
    }

    /// Build a graph from `(stop, lat, lon)` stops and runs of stop ids.
    pub fn graph(
        profile: NetworkProfile,
        stops: &[(&str, f32, f32)],
        runs: &[&[&str]],
    ) -> TransportGraph {
        let mut b = GraphBuilder::new(profile);
        for &(id, lat, lon) in stops {
            b.add_stop(s(id), GeoPoint::new(lat, lon));
        }
        for run in runs {
            let ids: Vec<StopId> = run.iter().map(|id| s(id)).collect();
            b.add_run(&ids);
        }
        b.build()
    }

    /// Road line R0..R3 northwards along lon 121.0, 0.01° apart, both ways.
    pub fn road_line() -> TransportGraph {
        graph(
            NetworkProfile::road(),
            &[
                ("R0", 14.50, 121.0),
                ("R1", 14.51, 121.0),
                ("R2", 14.52, 121.0),
                ("R3", 14.53, 121.0),
            ],
            &[&["R0", "R1", "R2", "R3"], &["R3", "R2", "R1", "R0"]],
        )
    }

    pub fn empty(mode: TransportMode) -> TransportGraph {
        TransportGraph::empty(mode)
    }

    /// The edge `from → to`, if one exists.
    pub fn find_edge(g: &TransportGraph, from: NodeId, to: NodeId) -> Option<EdgeId> {
        g.out_edges(from).find(|e| g.edge_to[e.index()] == to)
    }
}

// ── Builder & network structure ───────────────────────────────────────────────

#[cfg(test)]
mod builder {
    use tt_core::{GeoPoint, NodeId, TransportMode};

    use super::helpers::{find_edge, graph, road_line, s};
    use crate::{GraphBuilder, NetworkProfile};

    #[test]
    fn empty_build() {
        let g = GraphBuilder::new(NetworkProfile::road()).build();
        assert_eq!(g.node_count(), 0);
        assert_eq!(g.edge_count(), 0);
        assert!(g.is_empty());
        assert!(g.component_labels().is_empty());
        assert!(g.snap_to_node(GeoPoint::new(0.0, 0.0)).is_none());
    }

    #[test]
    fn runs_are_directed_and_deduplicated() {
        let g = graph(
            NetworkProfile::rail(),
            &[("A", 14.50, 121.0), ("B", 14.51, 121.0)],
            &[&["A", "B"], &["A", "B"], &["A", "A", "B"]],
        );
        assert_eq!(g.edge_count(), 1);
        let a = g.node_of(&s("A")).unwrap();
        let b = g.node_of(&s("B")).unwrap();
        assert!(find_edge(&g, a, b).is_some());
        assert!(find_edge(&g, b, a).is_none());
        assert_eq!(g.edge_mode[0], TransportMode::Rail);
    }

    #[test]
    fn short_runs_and_self_loops_add_nothing() {
        let g = graph(
            NetworkProfile::road(),
            &[("A", 14.50, 121.0)],
            &[&[], &["A"], &["A", "A"]],
        );
        assert_eq!(g.edge_count(), 0);
    }

    #[test]
    fn unknown_stop_breaks_only_its_pairs() {
        let g = graph(
            NetworkProfile::road(),
            &[("A", 14.50, 121.0), ("B", 14.51, 121.0), ("C", 14.52, 121.0)],
            &[&["A", "B", "GHOST", "C"]],
        );
        // A→B survives; B→GHOST and GHOST→C are skipped.
        assert_eq!(g.edge_count(), 1);
    }

    #[test]
    fn visits_sorted_by_sequence() {
        let mut b = GraphBuilder::new(NetworkProfile::road());
        b.add_stop(s("A"), GeoPoint::new(14.50, 121.0));
        b.add_stop(s("B"), GeoPoint::new(14.51, 121.0));
        b.add_stop(s("C"), GeoPoint::new(14.52, 121.0));
        assert_eq!(b.add_visits(vec![(s("C"), 30), (s("A"), 10), (s("B"), 20)]), 2);
        let g = b.build();
        let [a, bb, c] = [s("A"), s("B"), s("C")].map(|id| g.node_of(&id).unwrap());
        assert!(find_edge(&g, a, bb).is_some());
        assert!(find_edge(&g, bb, c).is_some());
        assert!(find_edge(&g, c, bb).is_none());
    }

    #[test]
    fn duplicate_stop_keeps_first_coordinate() {
        let mut b = GraphBuilder::new(NetworkProfile::road());
        let first = b.add_stop(s("A"), GeoPoint::new(1.0, 1.0));
        let again = b.add_stop(s("A"), GeoPoint::new(2.0, 2.0));
        assert_eq!(first, again);
        let g = b.build();
        assert_eq!(g.node_pos[first.index()], GeoPoint::new(1.0, 1.0));
    }

    #[test]
    fn csr_in_and_out_edges_agree() {
        let g = road_line();
        assert_eq!(g.edge_count(), 6);
        for n in 0..g.node_count() as u32 {
            let node = NodeId(n);
            for e in g.out_edges(node) {
                assert_eq!(g.edge_from[e.index()], node);
                let to = g.edge_to[e.index()];
                assert!(g.in_edges(to).any(|i| i == e));
            }
            for e in g.in_edges(node) {
                assert_eq!(g.edge_to[e.index()], node);
            }
        }
        let r1 = g.node_of(&s("R1")).unwrap();
        assert_eq!(g.out_edges(r1).count(), 2);
    }

    #[test]
    fn edge_times_follow_profile_speed() {
        let g = road_line();
        for e in 0..g.edge_count() {
            let expected = NetworkProfile::road().travel_ms(g.edge_length_m[e]);
            assert_eq!(g.edge_travel_ms[e], expected);
            assert!(g.edge_travel_ms[e] > 0);
            // ~1.1 km at 20 km/h ≈ 200 s
            assert!((190_000..210_000).contains(&g.edge_travel_ms[e]), "{}", g.edge_travel_ms[e]);
        }
    }

    #[test]
    fn profile_conversions() {
        let road = NetworkProfile::road();
        assert_eq!(road.travel_ms(1_000.0), 180_000);
        assert_eq!(road.travel_ms(0.0), 1);
        assert!((road.cost(2_000.0) - 2.0).abs() < 1e-6);
        assert!(road.validate().is_ok());

        let bad_speed = NetworkProfile { speed_kmh: 0.0, ..NetworkProfile::rail() };
        assert!(bad_speed.validate().is_err());
        let bad_mode = NetworkProfile { mode: TransportMode::Walk, ..NetworkProfile::road() };
        assert!(bad_mode.validate().is_err());
    }

    #[test]
    fn components_counted_weakly() {
        let g = graph(
            NetworkProfile::road(),
            &[
                ("A", 14.50, 121.0),
                ("B", 14.51, 121.0),
                ("C", 14.70, 121.0),
                ("D", 14.71, 121.0),
                ("E", 14.90, 121.0),
            ],
            // One-way links still join their endpoints.
            &[&["A", "B"], &["D", "C"]],
        );
        let labels = g.component_labels();
        assert_eq!(labels, vec![0, 0, 1, 1, 2]);
    }

    #[test]
    fn snapping_finds_nearest_stop() {
        let g = road_line();
        let near_r2 = GeoPoint::new(14.521, 121.001);
        assert_eq!(g.snap_to_node(near_r2), g.node_of(&s("R2")));
        let before_r0 = GeoPoint::new(14.40, 121.0);
        assert_eq!(g.snap_to_node(before_r0), g.node_of(&s("R0")));
    }
}

// ── GTFS loader ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod gtfs {
    use super::helpers::{find_edge, s};
    use crate::{NetworkProfile, load_network_readers};

    const STOPS: &str = "\
stop_id,stop_lat,stop_lon,stop_name
A,14.50,121.00,Alpha
B,14.51,121.00,Bravo
C,14.52,121.00,Charlie
";

    const STOP_TIMES: &str = "\
trip_id,stop_id,stop_sequence,arrival_time
t2,C,3,08:10:00
t1,A,1,08:00:00
t1,B,2,08:05:00
t2,B,2,08:05:00
t1,C,3,08:10:00
";

    #[test]
    fn loads_stops_and_runs() {
        let g = load_network_readers(STOPS.as_bytes(), STOP_TIMES.as_bytes(), NetworkProfile::rail())
            .unwrap();
        assert_eq!(g.node_count(), 3);
        // t1: A→B, B→C; t2: B→C again (deduplicated).
        assert_eq!(g.edge_count(), 2);
        let a = g.node_of(&s("A")).unwrap();
        let b = g.node_of(&s("B")).unwrap();
        assert!(find_edge(&g, a, b).is_some());
    }

    #[test]
    fn malformed_rows_are_errors() {
        let bad = "stop_id,stop_lat,stop_lon\nA,not-a-number,121.0\n";
        let res = load_network_readers(bad.as_bytes(), STOP_TIMES.as_bytes(), NetworkProfile::road());
        assert!(res.is_err());
    }

    #[test]
    fn invalid_profile_rejected() {
        let profile = NetworkProfile { speed_kmh: -1.0, ..NetworkProfile::road() };
        assert!(load_network_readers(STOPS.as_bytes(), STOP_TIMES.as_bytes(), profile).is_err());
    }
}

// ── Weighting ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod weighting {
    use tt_core::{EdgeId, TransportMode};

    use super::helpers::road_line;
    use crate::{ModeWeighting, WeightingPolicy};

    #[test]
    fn matching_edges_keep_base_time() {
        let g = road_line();
        let policy = WeightingPolicy::default();
        let view = ModeWeighting::new(&g, &policy, TransportMode::Road);
        let e = EdgeId(0);
        assert_eq!(view.weight_ms(e), g.edge_travel_ms[0] as u64);
        let mixed = ModeWeighting::new(&g, &policy, TransportMode::Mixed);
        assert_eq!(mixed.weight_ms(e), g.edge_travel_ms[0] as u64);
    }

    #[test]
    fn non_matching_edges_are_scaled() {
        let g = road_line();
        let policy = WeightingPolicy::default();
        let rail_pref = ModeWeighting::new(&g, &policy, TransportMode::Rail);
        let base = g.edge_travel_ms[0] as f64;
        assert_eq!(rail_pref.weight_ms(EdgeId(0)), (base * 2.0).round() as u64);
        let walk_pref = ModeWeighting::new(&g, &policy, TransportMode::Walk);
        assert_eq!(walk_pref.weight_ms(EdgeId(0)), (base * 3.0).round() as u64);
        // The view never touches the graph.
        assert_eq!(g.edge_travel_ms[0] as f64, base);
    }

    #[test]
    fn policy_table() {
        let p = WeightingPolicy::default();
        assert_eq!(p.multiplier(TransportMode::Rail, TransportMode::Rail), 1.0);
        assert_eq!(p.multiplier(TransportMode::Road, TransportMode::Rail), 2.0);
        assert_eq!(p.multiplier(TransportMode::Rail, TransportMode::Mixed), 1.0);
        assert_eq!(p.multiplier(TransportMode::Walk, TransportMode::Mixed), 1.2);
        assert!(p.validate().is_ok());
    }

    #[test]
    fn out_of_range_multipliers_rejected() {
        for bad in [0.5, 10.5, f64::NAN, f64::INFINITY] {
            let p = WeightingPolicy { road: bad, ..WeightingPolicy::default() };
            assert!(p.validate().is_err(), "{bad} accepted");
        }
        let edge = WeightingPolicy { walk: 10.0, mixed: 1.0, ..WeightingPolicy::default() };
        assert!(edge.validate().is_ok());
    }
}

// ── Search ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod search {
    use tt_core::{NodeId, TransportMode};

    use super::helpers::{graph, road_line, s};
    use crate::search::{Direction, search_tree, shortest_path};
    use crate::{ModeWeighting, NetworkProfile, SpatialError, WeightingPolicy};

    #[test]
    fn same_node_is_trivial() {
        let g = road_line();
        let view = ModeWeighting::new(&g, &WeightingPolicy::default(), TransportMode::Road);
        let p = shortest_path(&view, NodeId(1), NodeId(1), 10).unwrap();
        assert!(p.edges.is_empty());
        assert_eq!(p.weighted_ms, 0);
    }

    #[test]
    fn prefers_cheaper_detour() {
        // A→D direct is long; A→B→C→D hugs the straight line and is shorter.
        let g = graph(
            NetworkProfile::road(),
            &[
                ("A", 14.50, 121.00),
                ("B", 14.51, 121.00),
                ("C", 14.52, 121.00),
                ("D", 14.53, 121.00),
                ("X", 14.515, 121.05),
            ],
            &[&["A", "B", "C", "D"], &["A", "X", "D"]],
        );
        let view = ModeWeighting::new(&g, &WeightingPolicy::default(), TransportMode::Road);
        let a = g.node_of(&s("A")).unwrap();
        let d = g.node_of(&s("D")).unwrap();
        let p = shortest_path(&view, a, d, 100).unwrap();
        assert_eq!(p.edges.len(), 3);
        let total: u64 = p.edges.iter().map(|&e| view.weight_ms(e)).sum();
        assert_eq!(total, p.weighted_ms);
    }

    #[test]
    fn disconnected_is_no_route() {
        let g = graph(
            NetworkProfile::rail(),
            &[("A", 14.50, 121.0), ("B", 14.51, 121.0)],
            &[&["B", "A"]],
        );
        let view = ModeWeighting::new(&g, &WeightingPolicy::default(), TransportMode::Rail);
        let err = shortest_path(&view, NodeId(0), NodeId(1), 100).unwrap_err();
        assert!(matches!(err, SpatialError::NoRoute { mode: TransportMode::Rail, .. }));
    }

    #[test]
    fn budget_exhaustion_is_reported() {
        let g = road_line();
        let view = ModeWeighting::new(&g, &WeightingPolicy::default(), TransportMode::Road);
        let r0 = g.node_of(&s("R0")).unwrap();
        let r3 = g.node_of(&s("R3")).unwrap();
        let err = shortest_path(&view, r0, r3, 1).unwrap_err();
        assert!(matches!(err, SpatialError::SearchBudgetExceeded { budget: 1 }));
        assert!(shortest_path(&view, r0, r3, 3).is_ok());
    }

    #[test]
    fn unknown_node_rejected() {
        let g = road_line();
        let view = ModeWeighting::new(&g, &WeightingPolicy::default(), TransportMode::Road);
        assert!(matches!(
            shortest_path(&view, NodeId(99), NodeId(0), 10),
            Err(SpatialError::NodeNotFound(NodeId(99)))
        ));
    }

    #[test]
    fn backward_tree_paths_run_towards_root() {
        let g = road_line();
        let view = ModeWeighting::new(&g, &WeightingPolicy::default(), TransportMode::Road);
        let r0 = g.node_of(&s("R0")).unwrap();
        let r3 = g.node_of(&s("R3")).unwrap();

        let back = search_tree(&view, r3, Direction::Backward, 100).unwrap();
        let edges = back.path_edges(&g, r0).unwrap();
        assert_eq!(edges.len(), 3);
        assert_eq!(g.edge_from[edges[0].index()], r0);
        assert_eq!(g.edge_to[edges[2].index()], r3);

        let fwd = shortest_path(&view, r0, r3, 100).unwrap();
        assert_eq!(back.cost(r0), Some(fwd.weighted_ms));
        assert_eq!(edges, fwd.edges);
    }
}

// ── Router ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod router {
    use tt_core::{BuildingId, GeoPoint, TransportMode};

    use super::helpers::{empty, find_edge, graph, road_line, s};
    use crate::{
        DijkstraRouter, Endpoint, NetworkAccess, NetworkContext, NetworkProfile, Resolution,
        ResolvedRoute, RouteRequest, Router, RoutingConfig, Waypoint, WeightingPolicy,
    };

    fn endpoint(id: u32, lat: f32, lon: f32) -> Endpoint {
        Endpoint {
            building: BuildingId(id),
            pos: GeoPoint::new(lat, lon),
            access: NetworkAccess::default(),
        }
    }

    fn request(origin: Endpoint, destination: Endpoint, preferred: TransportMode) -> RouteRequest {
        RouteRequest { origin, destination, preferred }
    }

    fn router() -> DijkstraRouter {
        DijkstraRouter::new(RoutingConfig::default()).unwrap()
    }

    /// Road: R0 → T.  Rail: T → K.  An isolated road stop sits next to K so
    /// the rail-then-road orientation has nothing to offer.
    fn mixed_context() -> NetworkContext {
        let road = graph(
            NetworkProfile::road(),
            &[("R0", 14.50, 121.0), ("T", 14.51, 121.0), ("R9", 14.605, 121.0)],
            &[&["R0", "T"]],
        );
        let rail = graph(
            NetworkProfile::rail(),
            &[("T", 14.51, 121.0), ("K", 14.60, 121.0)],
            &[&["T", "K"]],
        );
        NetworkContext::new(road, rail)
    }

    #[test]
    fn close_endpoints_walk_regardless_of_preference() {
        // Two buildings ~300 m apart; no graph is needed at all.
        let ctx = NetworkContext::new(empty(TransportMode::Road), empty(TransportMode::Rail));
        let a = endpoint(1, 14.5000, 121.0);
        let b = endpoint(2, 14.5027, 121.0);
        for pref in TransportMode::ALL {
            let out = router().route(&ctx, &request(a, b, pref));
            assert_eq!(out.resolution(), Resolution::Walk, "{pref}");
            assert!(out.attempted.is_empty());
            let route = out.route.unwrap();
            assert_eq!(route.mode_used, TransportMode::Walk);
            assert_eq!(route.segments.len(), 1);
            let seg = &route.segments[0];
            assert_eq!(seg.from, Waypoint::Building(BuildingId(1)));
            assert_eq!(seg.to, Waypoint::Building(BuildingId(2)));
            assert_eq!(seg.cost, 0.0);
            // 300 m at 5 km/h = 3.6 min
            assert!((seg.time_min - 3.6).abs() < 0.05, "{}", seg.time_min);
        }
    }

    #[test]
    fn road_route_uses_base_times() {
        let ctx = NetworkContext::new(road_line(), empty(TransportMode::Rail));
        let out = router().route(
            &ctx,
            &request(endpoint(1, 14.50, 121.0), endpoint(2, 14.53, 121.0), TransportMode::Road),
        );
        assert_eq!(out.resolution(), Resolution::Preferred);
        assert_eq!(out.attempted, vec![TransportMode::Road]);
        let route = out.route.unwrap();
        assert_eq!(route.segments.len(), 3);
        let hops = [("R0", "R1"), ("R1", "R2"), ("R2", "R3")];
        let expected: f64 = hops
            .iter()
            .map(|(a, b)| {
                let (from, to) = (ctx.road.node_of(&s(a)).unwrap(), ctx.road.node_of(&s(b)).unwrap());
                let e = find_edge(&ctx.road, from, to).unwrap();
                ctx.road.edge_travel_ms[e.index()] as f64 / 60_000.0
            })
            .sum();
        assert!((route.total_time_min - expected).abs() < 1e-6);
        assert_eq!(route.segments[0].from, Waypoint::Stop(s("R0")));
        assert_eq!(route.segments[2].to, Waypoint::Stop(s("R3")));
        let geometry = route.geometry();
        assert_eq!(geometry.len(), 4);
    }

    #[test]
    fn fallback_follows_configured_order() {
        // Rail is empty, so a rail preference falls back to road.
        let ctx = NetworkContext::new(road_line(), empty(TransportMode::Rail));
        let out = router().route(
            &ctx,
            &request(endpoint(1, 14.50, 121.0), endpoint(2, 14.53, 121.0), TransportMode::Rail),
        );
        assert_eq!(out.attempted, vec![TransportMode::Rail, TransportMode::Road]);
        assert_eq!(out.resolution(), Resolution::Fallback);
        assert_eq!(out.route.unwrap().mode_used, TransportMode::Road);
    }

    #[test]
    fn walk_preference_beyond_threshold_falls_back() {
        let ctx = NetworkContext::new(road_line(), empty(TransportMode::Rail));
        let out = router().route(
            &ctx,
            &request(endpoint(1, 14.50, 121.0), endpoint(2, 14.53, 121.0), TransportMode::Walk),
        );
        assert_eq!(
            out.attempted,
            vec![TransportMode::Walk, TransportMode::Rail, TransportMode::Road]
        );
        assert_eq!(out.route.unwrap().mode_used, TransportMode::Road);
    }

    #[test]
    fn all_modes_failing_gives_null_outcome() {
        let ctx = NetworkContext::new(empty(TransportMode::Road), empty(TransportMode::Rail));
        let out = router().route(
            &ctx,
            &request(endpoint(1, 14.50, 121.0), endpoint(2, 14.60, 121.0), TransportMode::Road),
        );
        assert_eq!(out.resolution(), Resolution::Unroutable);
        assert_eq!(
            out.attempted,
            vec![TransportMode::Road, TransportMode::Rail, TransportMode::Mixed]
        );
        assert_eq!(out.into_parts(), (None, None, None, None));
    }

    #[test]
    fn attempt_order_respects_max_fallbacks() {
        let cfg = RoutingConfig::default();
        assert_eq!(
            cfg.attempt_order(TransportMode::Mixed),
            vec![TransportMode::Mixed, TransportMode::Rail, TransportMode::Road]
        );
        let none = RoutingConfig { max_fallbacks: 0, ..RoutingConfig::default() };
        assert_eq!(none.attempt_order(TransportMode::Road), vec![TransportMode::Road]);
    }

    #[test]
    fn invalid_config_rejected() {
        let dup = RoutingConfig {
            fallback_order: vec![TransportMode::Rail, TransportMode::Rail],
            ..RoutingConfig::default()
        };
        assert!(DijkstraRouter::new(dup).is_err());
        let zero = RoutingConfig { search_budget: 0, ..RoutingConfig::default() };
        assert!(DijkstraRouter::new(zero).is_err());
        let slow = RoutingConfig { walk_speed_kmh: 0.0, ..RoutingConfig::default() };
        assert!(slow.validate().is_err());
    }

    #[test]
    fn mixed_route_transfers_once() {
        let ctx = mixed_context();
        assert_eq!(ctx.transfers().len(), 1);
        assert_eq!(ctx.transfers()[0].stop, s("T"));

        let out = router().route(
            &ctx,
            &request(endpoint(1, 14.50, 121.0), endpoint(2, 14.60, 121.0), TransportMode::Mixed),
        );
        assert_eq!(out.resolution(), Resolution::Preferred);
        let route = out.route.unwrap();
        assert_eq!(route.mode_used, TransportMode::Mixed);
        let modes: Vec<_> = route.segments.iter().map(|s| s.mode).collect();
        assert_eq!(modes, vec![TransportMode::Road, TransportMode::Rail]);
        assert_eq!(route.segments[0].to, Waypoint::Stop(s("T")));
        assert_eq!(route.segments[1].from, Waypoint::Stop(s("T")));
    }

    /// Road: O → T1 → T2 (one way).  Rail: T1 → T2 → D.  Isolated stops QO
    /// (rail, next to O) and RD (road, next to D) make the single-network
    /// attempts and the rail-then-road orientation dead ends.
    fn two_transfer_context() -> NetworkContext {
        let road = graph(
            NetworkProfile::road(),
            &[("O", 0.0, 0.0), ("T1", 0.02, 0.0), ("T2", 0.06, 0.0), ("RD", 0.10, 0.005)],
            &[&["O", "T1", "T2"]],
        );
        let rail = graph(
            NetworkProfile::rail(),
            &[("QO", 0.0, 0.005), ("T1", 0.02, 0.0), ("T2", 0.06, 0.0), ("D", 0.10, 0.0)],
            &[&["T1", "T2", "D"]],
        );
        NetworkContext::new(road, rail)
    }

    fn transfer_stop(route: &ResolvedRoute) -> Waypoint {
        let rail = route.segments.iter().find(|seg| seg.mode == TransportMode::Rail).unwrap();
        rail.from.clone()
    }

    #[test]
    fn preference_multiplier_moves_the_mixed_transfer() {
        let ctx = two_transfer_context();
        let req = request(endpoint(1, 0.0, 0.0), endpoint(2, 0.10, 0.0), TransportMode::Road);

        // Rail edges cost double for a road-preferring traveller: ride the
        // road as far as T2 (≈ 20.0 + 2 × 8.9 min) rather than switch at T1
        // (≈ 6.7 + 2 × 17.8 min).
        let out = router().route(&ctx, &req);
        assert_eq!(
            out.attempted,
            vec![TransportMode::Road, TransportMode::Rail, TransportMode::Mixed]
        );
        assert_eq!(out.resolution(), Resolution::Fallback);
        let route = out.route.unwrap();
        assert_eq!(route.mode_used, TransportMode::Mixed);
        assert_eq!(transfer_stop(&route), Waypoint::Stop(s("T2")));

        // Without the penalty the faster rail wins from T1.
        let flat = RoutingConfig {
            weighting: WeightingPolicy { road: 1.0, ..WeightingPolicy::default() },
            ..RoutingConfig::default()
        };
        let route = DijkstraRouter::new(flat).unwrap().route(&ctx, &req).route.unwrap();
        assert_eq!(transfer_stop(&route), Waypoint::Stop(s("T1")));
    }

    #[test]
    fn tight_budget_counts_as_failure() {
        let cfg = RoutingConfig { search_budget: 1, ..RoutingConfig::default() };
        let r = DijkstraRouter::new(cfg).unwrap();
        let ctx = NetworkContext::new(road_line(), empty(TransportMode::Rail));
        let out = r.route(
            &ctx,
            &request(endpoint(1, 14.50, 121.0), endpoint(2, 14.53, 121.0), TransportMode::Road),
        );
        assert!(out.route.is_none());
    }

    #[test]
    fn explicit_access_overrides_snapping() {
        let ctx = NetworkContext::new(road_line(), empty(TransportMode::Rail));
        let access = ctx.resolve_access(GeoPoint::new(14.50, 121.0), Some(&s("R1")), None);
        assert_eq!(access.road, ctx.road.node_of(&s("R1")));
        assert_eq!(access.rail, None);
        let fallback = ctx.resolve_access(GeoPoint::new(14.50, 121.0), Some(&s("NOPE")), None);
        assert_eq!(fallback.road, ctx.road.node_of(&s("R0")));
    }
}

// ── Multi-modal ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod multimodal {
    use proptest::prelude::*;
    use tt_core::{GeoPoint, StopId, TransportMode};

    use super::helpers::{graph, s};
    use crate::multimodal::{Anchor, ORIENTATIONS, TransferRoute, best_transfer};
    use crate::search::shortest_path;
    use crate::{
        ModeWeighting, NetworkAccess, NetworkContext, NetworkProfile, SpatialError,
        WeightingPolicy,
    };

    const BUDGET: usize = 10_000;

    /// Road line S0..S5 (both ways) and a rail line through S1, S3, S5 with
    /// intermediate stops plus a one-way express S5 → S1.
    fn corridor(road_kmh: f64, rail_kmh: f64) -> NetworkContext {
        let road_stops: Vec<(String, f32, f32)> =
            (0..6).map(|i| (format!("S{i}"), 0.01 * i as f32, 0.0)).collect();
        let road_refs: Vec<(&str, f32, f32)> =
            road_stops.iter().map(|(id, la, lo)| (id.as_str(), *la, *lo)).collect();
        let road = graph(
            NetworkProfile { speed_kmh: road_kmh, ..NetworkProfile::road() },
            &road_refs,
            &[&["S0", "S1", "S2", "S3", "S4", "S5"], &["S5", "S4", "S3", "S2", "S1", "S0"]],
        );
        let rail = graph(
            NetworkProfile { speed_kmh: rail_kmh, ..NetworkProfile::rail() },
            &[
                ("S1", 0.01, 0.0),
                ("Q0", 0.02, 0.01),
                ("S3", 0.03, 0.0),
                ("Q1", 0.04, 0.01),
                ("S5", 0.05, 0.0),
            ],
            &[
                &["S1", "Q0", "S3", "Q1", "S5"],
                &["S5", "Q1", "S3", "Q0", "S1"],
                &["S5", "S1"],
            ],
        );
        NetworkContext::new(road, rail)
    }

    /// Point searches through every transfer; returns the best
    /// `(cost, stop, orientation rank)`.
    fn brute_force(
        ctx: &NetworkContext,
        preference: TransportMode,
        origin: Anchor<'_>,
        destination: Anchor<'_>,
    ) -> Option<(u64, StopId, usize)> {
        let policy = WeightingPolicy::default();
        let mut best: Option<(u64, StopId, usize)> = None;
        for (rank, &(ma, mb)) in ORIENTATIONS.iter().enumerate() {
            let ga = ctx.graph(ma).unwrap();
            let gb = ctx.graph(mb).unwrap();
            let va = ModeWeighting::new(ga, &policy, preference);
            let vb = ModeWeighting::new(gb, &policy, preference);
            let (Some(start), Some(end)) = (
                ctx.access_node(ma, origin.pos, origin.access),
                ctx.access_node(mb, destination.pos, destination.access),
            ) else {
                continue;
            };
            for t in ctx.transfers() {
                let a = shortest_path(&va, start, t.node_in(ma).unwrap(), BUDGET);
                let b = shortest_path(&vb, t.node_in(mb).unwrap(), end, BUDGET);
                if let (Ok(a), Ok(b)) = (a, b) {
                    let key = (a.weighted_ms + b.weighted_ms, t.stop.clone(), rank);
                    if best.as_ref().is_none_or(|cur| key < *cur) {
                        best = Some(key);
                    }
                }
            }
        }
        best
    }

    fn solve(ctx: &NetworkContext, o: Anchor<'_>, d: Anchor<'_>) -> Result<TransferRoute, SpatialError> {
        solve_as(ctx, TransportMode::Mixed, o, d, BUDGET)
    }

    fn solve_as(
        ctx: &NetworkContext,
        preference: TransportMode,
        o: Anchor<'_>,
        d: Anchor<'_>,
        budget: usize,
    ) -> Result<TransferRoute, SpatialError> {
        best_transfer(ctx, &WeightingPolicy::default(), preference, o, d, budget)
    }

    #[test]
    fn ties_go_to_lowest_transfer_id() {
        // O → TA and O → TB are mirror images about the equator, as are
        // TA → D and TB → D, so both transfers cost exactly the same.
        let h = 0.015_625_f32;
        let road = graph(
            NetworkProfile::road(),
            &[("O", 0.0, 0.0), ("TA", h, 0.0), ("TB", -h, 0.0)],
            &[&["O", "TA"], &["O", "TB"]],
        );
        let rail = graph(
            NetworkProfile::rail(),
            &[("TA", h, 0.0), ("TB", -h, 0.0), ("D", 0.0, 2.0 * h)],
            &[&["TA", "D"], &["TB", "D"]],
        );
        let ctx = NetworkContext::new(road, rail);
        let none = NetworkAccess::default();
        let o = Anchor { pos: GeoPoint::new(0.0, 0.0), access: &none };
        let d = Anchor { pos: GeoPoint::new(0.0, 2.0 * h), access: &none };

        let best = solve(&ctx, o, d).unwrap();
        assert_eq!(best.transfer, s("TA"));
        assert_eq!(best.first_mode, TransportMode::Road);
        assert_eq!(best.first.len(), 1);
        assert_eq!(best.second.len(), 1);

        // Same answer every time.
        assert_eq!(solve(&ctx, o, d).unwrap(), best);
    }

    #[test]
    fn no_transfer_reachable() {
        let road = graph(NetworkProfile::road(), &[("A", 0.0, 0.0), ("B", 0.01, 0.0)], &[&["A", "B"]]);
        let rail = graph(NetworkProfile::rail(), &[("C", 0.5, 0.0), ("D", 0.51, 0.0)], &[&["C", "D"]]);
        let ctx = NetworkContext::new(road, rail);
        let none = NetworkAccess::default();
        let o = Anchor { pos: GeoPoint::new(0.0, 0.0), access: &none };
        let d = Anchor { pos: GeoPoint::new(0.51, 0.0), access: &none };
        assert!(matches!(solve(&ctx, o, d), Err(SpatialError::NoTransfer)));
    }

    #[test]
    fn corridor_transfer_edges_chain() {
        let ctx = corridor(20.0, 30.0);
        let o_access = ctx.resolve_access(GeoPoint::new(0.0, 0.0), Some(&s("S0")), None);
        let d_access = NetworkAccess { road: None, rail: ctx.rail.node_of(&s("S5")) };
        let o = Anchor { pos: GeoPoint::new(0.0, 0.0), access: &o_access };
        let d = Anchor { pos: GeoPoint::new(0.05, 0.0), access: &d_access };
        let best = solve(&ctx, o, d).unwrap();

        let (ga, gb) = (ctx.graph(best.first_mode).unwrap(), ctx.graph(best.second_mode).unwrap());
        for pair in best.first.windows(2) {
            assert_eq!(ga.edge_to[pair[0].index()], ga.edge_from[pair[1].index()]);
        }
        for pair in best.second.windows(2) {
            assert_eq!(gb.edge_to[pair[0].index()], gb.edge_from[pair[1].index()]);
        }
        if let (Some(&last), Some(&first)) = (best.first.last(), best.second.first()) {
            assert_eq!(ga.stop(ga.edge_to[last.index()]), gb.stop(gb.edge_from[first.index()]));
        }
    }

    /// Road: O → A → B → C → X and T → RD.  Rail: QO → T.  The road-first
    /// search has to settle five nodes, the rail-first one only two per tree.
    fn lopsided() -> NetworkContext {
        let road = graph(
            NetworkProfile::road(),
            &[
                ("O", 0.0, 0.0),
                ("A", 0.01, 0.0),
                ("B", 0.02, 0.0),
                ("C", 0.03, 0.0),
                ("X", 0.04, 0.0),
                ("T", 0.05, 0.01),
                ("RD", 0.06, 0.01),
            ],
            &[&["O", "A", "B", "C", "X"], &["T", "RD"]],
        );
        let rail = graph(
            NetworkProfile::rail(),
            &[("QO", 0.0, 0.01), ("T", 0.05, 0.01)],
            &[&["QO", "T"]],
        );
        NetworkContext::new(road, rail)
    }

    #[test]
    fn exhausted_orientation_does_not_hide_the_other() {
        let ctx = lopsided();
        let o_access =
            NetworkAccess { road: ctx.road.node_of(&s("O")), rail: ctx.rail.node_of(&s("QO")) };
        let d_access =
            NetworkAccess { road: ctx.road.node_of(&s("RD")), rail: ctx.rail.node_of(&s("T")) };
        let o = Anchor { pos: GeoPoint::new(0.0, 0.0), access: &o_access };
        let d = Anchor { pos: GeoPoint::new(0.06, 0.01), access: &d_access };

        let best = solve_as(&ctx, TransportMode::Mixed, o, d, 3).unwrap();
        assert_eq!(best.transfer, s("T"));
        assert_eq!(best.first_mode, TransportMode::Rail);
        assert_eq!(best.second_mode, TransportMode::Road);

        // Both orientations run dry: the budget error is reported.
        assert!(matches!(
            solve_as(&ctx, TransportMode::Mixed, o, d, 1),
            Err(SpatialError::SearchBudgetExceeded { budget: 1 })
        ));
    }

    proptest! {
        #[test]
        fn tree_scan_matches_brute_force(
            road_kmh in 5u32..40,
            rail_kmh in 10u32..80,
            from in 0usize..6,
            to in 0usize..6,
            pref in 0usize..4,
        ) {
            let preference = TransportMode::ALL[pref];
            let ctx = corridor(road_kmh as f64, rail_kmh as f64);
            let o_pos = GeoPoint::new(0.01 * from as f32, 0.002);
            let d_pos = GeoPoint::new(0.01 * to as f32, 0.002);
            let o_access = ctx.resolve_access(o_pos, None, None);
            let d_access = ctx.resolve_access(d_pos, None, None);
            let o = Anchor { pos: o_pos, access: &o_access };
            let d = Anchor { pos: d_pos, access: &d_access };

            let expected = brute_force(&ctx, preference, o, d);
            match (solve_as(&ctx, preference, o, d, BUDGET), expected) {
                (Ok(found), Some((cost, stop, rank))) => {
                    prop_assert_eq!(found.weighted_ms, cost);
                    prop_assert_eq!(found.transfer, stop);
                    prop_assert_eq!(found.first_mode, ORIENTATIONS[rank].0);
                }
                (Err(_), None) => {}
                (got, want) => prop_assert!(false, "tree scan {:?} vs brute force {:?}", got, want),
            }
        }
    }
}
