//! `tt-sim` — tick loop orchestrator for the transit_twin day simulator.
//!
//! # Tick loop
//!
//! ```text
//! for tick in 0..config.total_ticks():
//!   ① Dispatch — each idle agent starts its next trip in list order once
//!                that trip is due (unroutable ones are skipped and
//!                counted).
//!   ② Advance  — agents traveling at tick start move one tick along their
//!                path and credit minutes to the segment modes
//!                (parallel with the `parallel` feature).
//!   ③ Arrive   — agents at 0 remaining ticks land on the destination.
//!   ④ Snapshot — the new state vector is frozen and passed to observers.
//!   ⑤ Events   — DEPART / ARRIVE records, ascending agent id.
//! ```
//!
//! An agent dispatched in tick `t` is first advanced in tick `t + 1`, so a
//! 35-minute trip departing at tick 60 with 5-minute ticks is traveling in
//! ticks 60–66 and arrives in tick 67.
//!
//! # Cargo features
//!
//! | Feature    | Effect                                                     |
//! |------------|------------------------------------------------------------|
//! | `parallel` | Per-agent steps and metric folds run on Rayon's pool.      |
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use tt_sim::{MetricsCollector, SimBuilder};
//!
//! let mut sim = SimBuilder::with_roster(config, trips, &roster, &buildings).build()?;
//! let mut metrics = MetricsCollector::from_buildings(&buildings);
//! let stats = sim.run(&mut metrics)?;
//! ```

pub mod builder;
pub mod error;
pub mod metrics;
pub mod observer;
pub mod sim;
pub mod snapshot;


pub use builder::SimBuilder;
pub use error::{SimError, SimResult};
pub use metrics::{MetricsCollector, TickMetrics, aggregate};
pub use observer::{HistoryRecorder, NoopObserver, SimObserver};
pub use sim::{RunStats, Sim};
pub use snapshot::{EventKind, SimEvent, Snapshot};
