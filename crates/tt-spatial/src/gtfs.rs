//! GTFS-style network loader.
//!
//! A network directory holds two CSV files (GTFS `.txt` names are accepted
//! too):
//!
//! ```text
//! stops.csv        stop_id,stop_lat,stop_lon[,stop_name,…]
//! stop_times.csv   trip_id,stop_id,stop_sequence[,…]
//! ```
//!
//! Extra columns are ignored.  Rows of `stop_times` are grouped by `trip_id`
//! into service runs and ordered by `stop_sequence` before being handed to
//! [`GraphBuilder::add_visits`].

use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::info;

use tt_core::{GeoPoint, StopId};

use crate::network::{GraphBuilder, NetworkProfile, TransportGraph};
use crate::{SpatialError, SpatialResult};

#[derive(Debug, Deserialize)]
struct StopRecord {
    stop_id: String,
    stop_lat: f32,
    stop_lon: f32,
}

#[derive(Debug, Deserialize)]
struct StopTimeRecord {
    trip_id: String,
    stop_id: String,
    stop_sequence: u32,
}

/// Load the network in `dir` using `profile` for times and costs.
pub fn load_network_dir(dir: &Path, profile: NetworkProfile) -> SpatialResult<TransportGraph> {
    let stops = File::open(find_table(dir, "stops")?)?;
    let stop_times = File::open(find_table(dir, "stop_times")?)?;
    let graph = load_network_readers(stops, stop_times, profile)?;
    info!(network = %graph.mode, dir = %dir.display(), "network loaded");
    Ok(graph)
}

/// Load a network from already-open `stops` and `stop_times` tables.
pub fn load_network_readers<S: Read, T: Read>(
    stops: S,
    stop_times: T,
    profile: NetworkProfile,
) -> SpatialResult<TransportGraph> {
    profile.validate()?;
    let mut builder = GraphBuilder::new(profile);

    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(stops);
    for row in rdr.deserialize::<StopRecord>() {
        let rec = row?;
        builder.add_stop(StopId::new(rec.stop_id), GeoPoint::new(rec.stop_lat, rec.stop_lon));
    }

    // BTreeMap keeps run order independent of file order quirks.
    let mut runs: BTreeMap<String, Vec<(StopId, u32)>> = BTreeMap::new();
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(stop_times);
    for row in rdr.deserialize::<StopTimeRecord>() {
        let rec = row?;
        runs.entry(rec.trip_id)
            .or_default()
            .push((StopId::new(rec.stop_id), rec.stop_sequence));
    }

    let run_count = runs.len();
    for (_, visits) in runs {
        builder.add_visits(visits);
    }
    info!(
        network = %builder.profile().mode,
        stops = builder.node_count(),
        runs = run_count,
        links = builder.edge_count(),
        "service runs ingested"
    );

    Ok(builder.build())
}

/// `dir/<name>.csv`, falling back to the GTFS spelling `dir/<name>.txt`.
fn find_table(dir: &Path, name: &str) -> SpatialResult<PathBuf> {
    let csv = dir.join(format!("{name}.csv"));
    if csv.is_file() {
        return Ok(csv);
    }
    let txt = dir.join(format!("{name}.txt"));
    if txt.is_file() {
        return Ok(txt);
    }
    Err(SpatialError::Io(std::io::Error::new(
        std::io::ErrorKind::NotFound,
        format!("{} has neither {name}.csv nor {name}.txt", dir.display()),
    )))
}
