//! `tt-output` — simulation output writers for the transit_twin day simulator.
//!
//! | Source                  | Writer                         | Files                                   |
//! |-------------------------|--------------------------------|-----------------------------------------|
//! | routing pass            | [`write_routes`]               | `trips.csv`, `route_segments.csv`       |
//! | tick loop (streaming)   | [`CsvWriter`] via [`SimOutputObserver`] | `agent_snapshots.csv`, `events.csv`, `tick_metrics.csv`, `modal_time.csv` |
//! | run summary             | [`write_manifest`]             | `manifest.json`                         |
//!
//! Float columns are written with six decimals; geometries as WKT
//! `LINESTRING`s in lon/lat order.
//!
//! # Usage
//!
//! ```rust,ignore
//! use tt_output::{CsvWriter, Labels, SimOutputObserver};
//! use tt_sim::MetricsCollector;
//!
//! let labels = Labels::new(&buildings, &roster.activities);
//! write_routes(out_dir, sim.trips(), &labels)?;
//! let writer = CsvWriter::new(out_dir)?;
//! let mut obs = SimOutputObserver::new(writer, &config, labels, MetricsCollector::from_buildings(&buildings));
//! let stats = sim.run(&mut obs)?;
//! if let Some(e) = obs.take_error() { return Err(e.into()); }
//! ```

pub mod csv;
pub mod error;
pub mod observer;
pub mod report;
pub mod row;
pub mod writer;


pub use csv::CsvWriter;
pub use error::{OutputError, OutputResult};
pub use observer::SimOutputObserver;
pub use report::{OUTPUT_FILES, RunManifest, write_manifest, write_routes};
pub use row::{AgentSnapshotRow, EventRow, Labels, MetricRow, ModalTimeRow, metric_rows};
pub use writer::OutputWriter;
