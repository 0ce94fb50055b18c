//! load → route → schedule → simulate → write.

use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result, anyhow};
use tracing::{info, warn};

use tt_core::TransportMode;
use tt_output::{CsvWriter, Labels, RunManifest, SimOutputObserver, write_manifest, write_routes};
use tt_schedule::{DispatchTable, load_buildings_csv, load_roster_csv, route_roster};
use tt_sim::{MetricsCollector, SimBuilder};
use tt_spatial::{DijkstraRouter, NetworkContext, NetworkProfile, TransportGraph, load_network_dir};

use crate::config::RunConfig;

/// Execute a full run.  Outputs land in `config.output_dir`.
pub fn run(config: &RunConfig) -> Result<RunManifest> {
    let t0 = Instant::now();

    // ── 1. Networks ───────────────────────────────────────────────────────
    let road = load_network(&config.inputs.road_dir, &config.road)?;
    let rail = load_network(&config.inputs.rail_dir, &config.rail)?;
    let ctx = NetworkContext::new(road, rail);

    // ── 2. Buildings and roster ───────────────────────────────────────────
    let mut buildings = load_buildings_csv(&config.inputs.buildings)
        .with_context(|| format!("loading {}", config.inputs.buildings.display()))?;
    buildings.resolve_access(&ctx);
    let roster = load_roster_csv(&config.inputs.agents, &config.inputs.trips, &buildings)
        .context("loading agents and trips")?;
    info!(
        buildings = buildings.len(),
        agents = roster.agent_count(),
        trips = roster.trip_count(),
        activities = roster.activities.len(),
        "inputs loaded"
    );

    // ── 3. Route ──────────────────────────────────────────────────────────
    let router = DijkstraRouter::new(config.routing.clone()).context("routing")?;
    let (trips, routing) = route_roster(&ctx, &router, &buildings, &roster);

    // ── 4. Schedule ───────────────────────────────────────────────────────
    let total_ticks = config.sim.total_ticks();
    let (dispatch, issues) = DispatchTable::build(&trips, &config.sim.make_clock(), total_ticks);

    // ── 5. Route tables ───────────────────────────────────────────────────
    std::fs::create_dir_all(&config.output_dir)
        .with_context(|| format!("creating {}", config.output_dir.display()))?;
    let labels = Labels::new(&buildings, &roster.activities);
    write_routes(&config.output_dir, &trips, &labels)?;

    // ── 6. Simulate ───────────────────────────────────────────────────────
    let mut sim = SimBuilder::with_roster(config.sim.clone(), trips, &roster, &buildings)
        .dispatch(dispatch)
        .build()?;
    let writer = CsvWriter::new(&config.output_dir)?;
    let mut obs = SimOutputObserver::new(
        writer,
        &config.sim,
        labels,
        MetricsCollector::from_buildings(&buildings),
    );
    let stats = sim.run(&mut obs)?;
    if let Some(e) = obs.take_error() {
        return Err(anyhow!(e).context("writing simulation output"));
    }

    // ── 7. Manifest ───────────────────────────────────────────────────────
    let manifest = RunManifest::new(&config.sim, sim.trips(), &routing, &issues, &stats);
    write_manifest(&config.output_dir, &manifest)?;

    let (_, metrics) = obs.into_parts();
    let modal = metrics.modal_totals();
    info!(
        walk_min = modal.get(TransportMode::Walk),
        road_min = modal.get(TransportMode::Road),
        rail_min = modal.get(TransportMode::Rail),
        elapsed_s = t0.elapsed().as_secs_f64(),
        output = %config.output_dir.display(),
        "run complete"
    );
    Ok(manifest)
}

/// Load one network; a missing directory yields an empty graph.
fn load_network(dir: &Path, profile: &NetworkProfile) -> Result<TransportGraph> {
    if !dir.is_dir() {
        warn!(mode = %profile.mode, dir = %dir.display(), "network directory missing; using an empty network");
        return Ok(TransportGraph::empty(profile.mode));
    }
    load_network_dir(dir, profile.clone())
        .with_context(|| format!("loading {} network from {}", profile.mode, dir.display()))
}
