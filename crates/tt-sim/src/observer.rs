//! Hooks into the tick loop: progress, recording, output.

use tt_core::Tick;

use crate::{RunStats, SimEvent, Snapshot};

/// Tick-loop callbacks driven by [`Sim::run`][crate::Sim::run].
///
/// Every hook defaults to a no-op.  Hooks are infallible; observers that can
/// fail (file writers) keep their first error and expose it after the run.
///
/// # Example
///
/// ```rust,ignore
/// struct ProgressPrinter { interval: u64 }
///
/// impl SimObserver for ProgressPrinter {
///     fn on_tick_end(&mut self, tick: Tick, traveling: usize) {
///         if tick.0 % self.interval == 0 {
///             println!("tick {tick}: {traveling} agents traveling");
///         }
///     }
/// }
/// ```
pub trait SimObserver {
    /// Called at the very start of each tick, before dispatch.
    fn on_tick_start(&mut self, _tick: Tick) {}

    /// Called once per tick with the post-arrival state of every agent.
    fn on_snapshot(&mut self, _snapshot: &Snapshot) {}

    /// Called after the snapshot with the tick's events in ascending agent
    /// order.  Not called for ticks without events.
    fn on_events(&mut self, _tick: Tick, _events: &[SimEvent]) {}

    /// Called at the end of each tick with the number of traveling agents.
    fn on_tick_end(&mut self, _tick: Tick, _traveling: usize) {}

    /// Called once after the last tick, with the run totals.
    fn on_sim_end(&mut self, _final_tick: Tick, _stats: &RunStats) {}
}

/// Observer with every hook left at its no-op default.
pub struct NoopObserver;

impl SimObserver for NoopObserver {}

/// Fan out every hook to two observers, first `.0` then `.1`.
impl<A: SimObserver, B: SimObserver> SimObserver for (A, B) {
    fn on_tick_start(&mut self, tick: Tick) {
        self.0.on_tick_start(tick);
        self.1.on_tick_start(tick);
    }

    fn on_snapshot(&mut self, snapshot: &Snapshot) {
        self.0.on_snapshot(snapshot);
        self.1.on_snapshot(snapshot);
    }

    fn on_events(&mut self, tick: Tick, events: &[SimEvent]) {
        self.0.on_events(tick, events);
        self.1.on_events(tick, events);
    }

    fn on_tick_end(&mut self, tick: Tick, traveling: usize) {
        self.0.on_tick_end(tick, traveling);
        self.1.on_tick_end(tick, traveling);
    }

    fn on_sim_end(&mut self, final_tick: Tick, stats: &RunStats) {
        self.0.on_sim_end(final_tick, stats);
        self.1.on_sim_end(final_tick, stats);
    }
}

/// Keeps every snapshot and event of the run in memory.
///
/// Snapshots share their state slices with the engine, so the history costs
/// one state vector per tick.
#[derive(Default)]
pub struct HistoryRecorder {
    pub snapshots: Vec<Snapshot>,
    pub events:    Vec<SimEvent>,
}

impl SimObserver for HistoryRecorder {
    fn on_snapshot(&mut self, snapshot: &Snapshot) {
        self.snapshots.push(snapshot.clone());
    }

    fn on_events(&mut self, _tick: Tick, events: &[SimEvent]) {
        self.events.extend_from_slice(events);
    }
}
