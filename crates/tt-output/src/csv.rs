//! CSV output backend.
//!
//! Creates four files in the configured output directory:
//! - `agent_snapshots.csv`
//! - `events.csv`
//! - `tick_metrics.csv`
//! - `modal_time.csv`

use std::fs::File;
use std::path::Path;

use csv::Writer;

use crate::row::{AgentSnapshotRow, EventRow, MetricRow, ModalTimeRow, fmt_f64};
use crate::writer::OutputWriter;
use crate::OutputResult;

pub const SNAPSHOT_HEADER: [&str; 9] = [
    "tick", "agent_id", "status", "lat", "lon", "building_id", "activity", "mode", "remaining_ticks",
];
pub const EVENT_HEADER: [&str; 8] = [
    "tick", "agent_id", "event", "trip_seq", "mode", "purpose", "departure_tick", "duration_min",
];
pub const METRIC_HEADER: [&str; 4] = ["tick", "metric", "key", "value"];
pub const MODAL_HEADER: [&str; 5] = ["agent_id", "walk_min", "road_min", "rail_min", "total_min"];

/// Writes simulation output to four CSV files.
pub struct CsvWriter {
    snapshots: Writer<File>,
    events:    Writer<File>,
    metrics:   Writer<File>,
    modal:     Writer<File>,
    finished:  bool,
}

impl CsvWriter {
    /// Create the CSV files in `dir` (which must exist) and write the header
    /// rows.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        let open = |name: &str, header: &[&str]| -> OutputResult<Writer<File>> {
            let mut w = Writer::from_path(dir.join(name))?;
            w.write_record(header)?;
            Ok(w)
        };
        Ok(Self {
            snapshots: open("agent_snapshots.csv", &SNAPSHOT_HEADER)?,
            events:    open("events.csv", &EVENT_HEADER)?,
            metrics:   open("tick_metrics.csv", &METRIC_HEADER)?,
            modal:     open("modal_time.csv", &MODAL_HEADER)?,
            finished:  false,
        })
    }
}

impl OutputWriter for CsvWriter {
    fn write_snapshots(&mut self, rows: &[AgentSnapshotRow]) -> OutputResult<()> {
        for row in rows {
            self.snapshots.write_record(&[
                row.tick.to_string(),
                row.agent_id.to_string(),
                row.status.to_owned(),
                fmt_f64(row.lat as f64),
                fmt_f64(row.lon as f64),
                row.building.to_string(),
                row.activity.clone(),
                row.mode.map(|m| m.as_str()).unwrap_or_default().to_owned(),
                row.remaining_ticks.to_string(),
            ])?;
        }
        Ok(())
    }

    fn write_events(&mut self, rows: &[EventRow]) -> OutputResult<()> {
        for row in rows {
            self.events.write_record(&[
                row.tick.to_string(),
                row.agent_id.to_string(),
                row.event.to_owned(),
                row.trip_seq.to_string(),
                row.mode.as_str().to_owned(),
                row.purpose.clone(),
                row.departure_tick.to_string(),
                fmt_f64(row.duration_min),
            ])?;
        }
        Ok(())
    }

    fn write_metrics(&mut self, rows: &[MetricRow]) -> OutputResult<()> {
        for row in rows {
            self.metrics.write_record(&[
                row.tick.to_string(),
                row.metric.to_owned(),
                row.key.clone(),
                fmt_f64(row.value),
            ])?;
        }
        Ok(())
    }

    fn write_modal_time(&mut self, rows: &[ModalTimeRow]) -> OutputResult<()> {
        for row in rows {
            self.modal.write_record(&[
                row.agent_id.to_string(),
                fmt_f64(row.walk_min),
                fmt_f64(row.road_min),
                fmt_f64(row.rail_min),
                fmt_f64(row.total_min()),
            ])?;
        }
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.snapshots.flush()?;
        self.events.flush()?;
        self.metrics.flush()?;
        self.modal.flush()?;
        Ok(())
    }
}
