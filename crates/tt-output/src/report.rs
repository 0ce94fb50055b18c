//! One-shot reports: routing results before the run, manifest after it.
//!
//! - `trips.csv`: one row per trip with its resolution and totals.
//! - `route_segments.csv`: one row per segment of every routed trip, with
//!   WKT geometry.
//! - `manifest.json`: run completion summary.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use csv::Writer;
use serde::Serialize;
use tracing::info;

use tt_core::SimConfig;
use tt_core::geo::wkt_linestring;
use tt_schedule::{RoutingSummary, ScheduleIssue, Trip};
use tt_sim::RunStats;

use crate::row::{Labels, fmt_f64};
use crate::OutputResult;

pub const TRIP_HEADER: [&str; 12] = [
    "agent_id", "trip_seq", "origin_building", "destination_building", "preferred_mode",
    "mode_used", "resolution", "attempted_modes", "departure_time", "purpose",
    "total_time_min", "total_cost",
];
pub const SEGMENT_HEADER: [&str; 9] = [
    "agent_id", "trip_seq", "segment", "mode", "from", "to", "time_min", "cost", "geometry_wkt",
];

/// Write `trips.csv` and `route_segments.csv` into `dir`.
///
/// Unroutable trips get a `trips.csv` row with empty routing columns and no
/// segment rows.
pub fn write_routes(dir: &Path, trips: &[Vec<Trip>], labels: &Labels) -> OutputResult<()> {
    let mut trip_w = Writer::from_path(dir.join("trips.csv"))?;
    trip_w.write_record(TRIP_HEADER)?;
    let mut seg_w = Writer::from_path(dir.join("route_segments.csv"))?;
    seg_w.write_record(SEGMENT_HEADER)?;

    let mut segments = 0usize;
    for trip in trips.iter().flatten() {
        let req = &trip.request;
        let attempted: Vec<&str> = trip.attempted().iter().map(|m| m.as_str()).collect();
        trip_w.write_record(&[
            req.agent.0.to_string(),
            req.seq.to_string(),
            labels.building(req.origin).to_string(),
            labels.building(req.destination).to_string(),
            req.preferred.as_str().to_owned(),
            trip.mode_used().map(|m| m.as_str()).unwrap_or_default().to_owned(),
            trip.resolution().as_str().to_owned(),
            attempted.join("|"),
            req.departure.clone(),
            labels.activity(req.purpose).to_owned(),
            trip.total_time_min().map(fmt_f64).unwrap_or_default(),
            trip.total_cost().map(fmt_f64).unwrap_or_default(),
        ])?;

        for (i, seg) in trip.segments().unwrap_or_default().iter().enumerate() {
            seg_w.write_record(&[
                req.agent.0.to_string(),
                req.seq.to_string(),
                i.to_string(),
                seg.mode.as_str().to_owned(),
                seg.from.to_string(),
                seg.to.to_string(),
                fmt_f64(seg.time_min),
                fmt_f64(seg.cost),
                wkt_linestring(&seg.geometry),
            ])?;
            segments += 1;
        }
    }
    trip_w.flush()?;
    seg_w.flush()?;
    info!(dir = %dir.display(), segments, "route tables written");
    Ok(())
}

// ── Manifest ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoutingCounts {
    pub preferred:  usize,
    pub walk:       usize,
    pub fallback:   usize,
    pub unroutable: usize,
}

impl From<&RoutingSummary> for RoutingCounts {
    fn from(s: &RoutingSummary) -> Self {
        Self { preferred: s.preferred, walk: s.walk, fallback: s.fallback, unroutable: s.unroutable }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DroppedTrip {
    pub agent_id:  u32,
    pub trip_seq:  u32,
    pub departure: String,
    pub reason:    String,
}

impl From<&ScheduleIssue> for DroppedTrip {
    fn from(i: &ScheduleIssue) -> Self {
        Self {
            agent_id:  i.agent.0,
            trip_seq:  i.seq,
            departure: i.departure.clone(),
            reason:    i.reason.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimCounts {
    pub ticks:              u64,
    pub departures:         u64,
    pub arrivals:           u64,
    pub deferred:           u64,
    pub skipped_unroutable: u64,
    pub pending_at_end:     u64,
    pub traveling_at_end:   u64,
}

impl From<&RunStats> for SimCounts {
    fn from(s: &RunStats) -> Self {
        Self {
            ticks:              s.ticks,
            departures:         s.departures,
            arrivals:           s.arrivals,
            deferred:           s.deferred,
            skipped_unroutable: s.skipped_unroutable,
            pending_at_end:     s.pending_at_end,
            traveling_at_end:   s.traveling_at_end,
        }
    }
}

/// Completion record written as `manifest.json`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunManifest {
    pub agents:        usize,
    pub trips:         usize,
    pub tick_minutes:  u32,
    pub total_ticks:   u64,
    pub routing:       RoutingCounts,
    pub dropped_trips: Vec<DroppedTrip>,
    pub simulation:    SimCounts,
    /// Output files, relative to the output directory.
    pub files:         Vec<String>,
}

impl RunManifest {
    pub fn new(
        config:   &SimConfig,
        trips:    &[Vec<Trip>],
        routing:  &RoutingSummary,
        issues:   &[ScheduleIssue],
        stats:    &RunStats,
    ) -> Self {
        Self {
            agents:        trips.len(),
            trips:         trips.iter().map(Vec::len).sum(),
            tick_minutes:  config.tick_minutes,
            total_ticks:   config.total_ticks(),
            routing:       routing.into(),
            dropped_trips: issues.iter().map(DroppedTrip::from).collect(),
            simulation:    stats.into(),
            files:         OUTPUT_FILES.iter().map(|f| (*f).to_owned()).collect(),
        }
    }
}

/// Every file a complete run leaves in the output directory.
pub const OUTPUT_FILES: [&str; 6] = [
    "trips.csv",
    "route_segments.csv",
    "agent_snapshots.csv",
    "events.csv",
    "tick_metrics.csv",
    "modal_time.csv",
];

/// Write `manifest.json` (pretty-printed) into `dir`.
pub fn write_manifest(dir: &Path, manifest: &RunManifest) -> OutputResult<()> {
    let mut file = BufWriter::new(File::create(dir.join("manifest.json"))?);
    serde_json::to_writer_pretty(&mut file, manifest)?;
    file.flush()?;
    Ok(())
}
