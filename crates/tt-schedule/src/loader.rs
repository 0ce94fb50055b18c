//! CSV loaders for buildings and the agent roster.
//!
//! # CSV formats
//!
//! ```csv
//! building_id,lat,lon,zone,nearest_road_stop,nearest_rail_stop
//! 1001,14.6507,121.0494,12,R-017,
//! 1002,14.6533,121.0512,,,
//! ```
//!
//! `zone` and the nearest-stop columns may be empty or absent; a missing
//! nearest stop is snapped with the network's R-tree later.
//!
//! ```csv
//! agent_id,home_building
//! 0,1001
//! 1,1002
//! ```
//!
//! Agent ids must be exactly `0..n` (any order).
//!
//! ```csv
//! agent_id,trip_seq,origin_building,destination_building,preferred_mode,departure_time,purpose
//! 0,1,1001,1002,rail,07:30,work
//! 0,2,1002,1001,2,1730,home
//! ```
//!
//! `preferred_mode` is a mode name or a numeric survey code (see
//! `TransportMode`'s `FromStr`).  `departure_time` is kept verbatim and
//! parsed when the dispatch table is built, so a bad time drops one trip
//! instead of failing the load.

use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

use serde::Deserialize;
use tracing::info;

use tt_core::{AgentId, GeoPoint, StopId, TransportMode, ZoneId};

use crate::roster::{ActivityRegistry, BuildingTable, Roster};
use crate::trip::TripRequest;
use crate::{ScheduleError, ScheduleResult};

// ── CSV records ───────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct BuildingRecord {
    building_id: u64,
    lat: f32,
    lon: f32,
    #[serde(default)]
    zone: Option<u32>,
    #[serde(default)]
    nearest_road_stop: Option<String>,
    #[serde(default)]
    nearest_rail_stop: Option<String>,
}

#[derive(Deserialize)]
struct AgentRecord {
    agent_id: u64,
    home_building: u64,
}

#[derive(Deserialize)]
struct TripRecord {
    agent_id: u64,
    trip_seq: u32,
    origin_building: u64,
    destination_building: u64,
    preferred_mode: String,
    departure_time: String,
    #[serde(default)]
    purpose: Option<String>,
}

fn reader<R: Read>(r: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(r)
}

fn non_empty(s: Option<String>) -> Option<StopId> {
    s.filter(|v| !v.trim().is_empty()).map(StopId::new)
}

// ── Buildings ─────────────────────────────────────────────────────────────────

pub fn load_buildings_csv(path: &Path) -> ScheduleResult<BuildingTable> {
    let file = std::fs::File::open(path)?;
    load_buildings_reader(file)
}

pub fn load_buildings_reader<R: Read>(r: R) -> ScheduleResult<BuildingTable> {
    let mut table = BuildingTable::new();
    for row in reader(r).deserialize::<BuildingRecord>() {
        let rec = row?;
        table.insert(
            rec.building_id,
            GeoPoint::new(rec.lat, rec.lon),
            rec.zone.map(ZoneId),
            non_empty(rec.nearest_road_stop),
            non_empty(rec.nearest_rail_stop),
        )?;
    }
    info!(buildings = table.len(), "buildings loaded");
    Ok(table)
}

// ── Roster ────────────────────────────────────────────────────────────────────

pub fn load_roster_csv(
    agents: &Path,
    trips: &Path,
    buildings: &BuildingTable,
) -> ScheduleResult<Roster> {
    let agents = std::fs::File::open(agents)?;
    let trips = std::fs::File::open(trips)?;
    load_roster_reader(agents, trips, buildings)
}

/// Like [`load_roster_csv`] but accepts any `Read` sources.
pub fn load_roster_reader<A: Read, T: Read>(
    agents: A,
    trips: T,
    buildings: &BuildingTable,
) -> ScheduleResult<Roster> {
    // ── Agents ────────────────────────────────────────────────────────────
    let mut homes_by_id: BTreeMap<u64, u64> = BTreeMap::new();
    for row in reader(agents).deserialize::<AgentRecord>() {
        let rec = row?;
        if homes_by_id.insert(rec.agent_id, rec.home_building).is_some() {
            return Err(ScheduleError::Parse(format!("agent {} listed twice", rec.agent_id)));
        }
    }
    let mut homes = Vec::with_capacity(homes_by_id.len());
    for (expected, (&id, &home)) in homes_by_id.iter().enumerate() {
        if id != expected as u64 {
            return Err(ScheduleError::AgentIdsNotDense { expected: expected as u64, found: id });
        }
        homes.push(buildings.lookup(home)?);
    }

    // ── Trips ─────────────────────────────────────────────────────────────
    let agent_count = homes.len();
    let mut activities = ActivityRegistry::new();
    let mut by_agent: Vec<BTreeMap<u32, TripRequest>> = vec![BTreeMap::new(); agent_count];

    for row in reader(trips).deserialize::<TripRecord>() {
        let rec = row?;
        let slot = usize::try_from(rec.agent_id)
            .ok()
            .and_then(|i| by_agent.get_mut(i))
            .ok_or(ScheduleError::UnknownAgent { agent: rec.agent_id })?;

        let preferred: TransportMode = rec.preferred_mode.parse().map_err(|source| {
            ScheduleError::Mode { agent: rec.agent_id, seq: rec.trip_seq, source }
        })?;
        let label = rec.purpose.as_deref().map(str::trim).filter(|p| !p.is_empty());
        let purpose = activities.intern(label.unwrap_or("other"));

        let request = TripRequest {
            agent: AgentId(rec.agent_id as u32),
            seq: rec.trip_seq,
            origin: buildings.lookup(rec.origin_building)?,
            destination: buildings.lookup(rec.destination_building)?,
            preferred,
            purpose,
            departure: rec.departure_time,
        };
        if slot.insert(rec.trip_seq, request).is_some() {
            return Err(ScheduleError::DuplicateTrip { agent: rec.agent_id, seq: rec.trip_seq });
        }
    }

    let trips: Vec<Vec<TripRequest>> =
        by_agent.into_iter().map(|m| m.into_values().collect()).collect();
    let roster = Roster { homes, trips, activities };
    info!(
        agents = roster.agent_count(),
        trips = roster.trip_count(),
        purposes = roster.activities.len(),
        "roster loaded"
    );
    Ok(roster)
}
