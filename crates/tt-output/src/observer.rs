//! Streams simulation output through an `OutputWriter` while the sim runs.

use tt_core::{SimConfig, Tick};
use tt_sim::{MetricsCollector, RunStats, SimEvent, SimObserver, Snapshot};

use crate::row::{AgentSnapshotRow, EventRow, Labels, ModalTimeRow, metric_rows};
use crate::writer::OutputWriter;
use crate::{OutputError, OutputResult};

/// A [`SimObserver`] that writes snapshots, events, tick metrics, and modal
/// time to any [`OutputWriter`] backend.
///
/// Tick metrics come from an owned [`MetricsCollector`], which is handed
/// back by [`into_parts`][Self::into_parts] for the run summary.  Agent
/// snapshots are written every `output_interval_ticks` ticks; everything else
/// every tick.
///
/// The first writer error is kept and later calls keep going; collect it with
/// [`take_error`][Self::take_error] once `run` returns.
pub struct SimOutputObserver<W: OutputWriter> {
    writer:     W,
    labels:     Labels,
    metrics:    MetricsCollector,
    interval:   u64,
    last_error: Option<OutputError>,
}

impl<W: OutputWriter> SimOutputObserver<W> {
    pub fn new(writer: W, config: &SimConfig, labels: Labels, metrics: MetricsCollector) -> Self {
        Self {
            writer,
            labels,
            metrics,
            interval:   config.output_interval_ticks.max(1),
            last_error: None,
        }
    }

    /// First write error of the run, if any.
    pub fn take_error(&mut self) -> Option<OutputError> {
        self.last_error.take()
    }

    pub fn metrics(&self) -> &MetricsCollector {
        &self.metrics
    }

    /// Unwrap the writer and the metrics collector.
    pub fn into_parts(self) -> (W, MetricsCollector) {
        (self.writer, self.metrics)
    }

    fn store_err(&mut self, result: OutputResult<()>) {
        if let Err(e) = result {
            self.last_error.get_or_insert(e);
        }
    }
}

impl<W: OutputWriter> SimObserver for SimOutputObserver<W> {
    fn on_snapshot(&mut self, snapshot: &Snapshot) {
        self.metrics.on_snapshot(snapshot);
        if let Some(m) = self.metrics.latest() {
            let rows = metric_rows(m, &self.labels);
            let result = self.writer.write_metrics(&rows);
            self.store_err(result);
        }

        if snapshot.tick.0.is_multiple_of(self.interval) && !snapshot.is_empty() {
            let rows: Vec<AgentSnapshotRow> = snapshot
                .agents
                .iter()
                .map(|s| AgentSnapshotRow::from_state(snapshot.tick.0, s, &self.labels))
                .collect();
            let result = self.writer.write_snapshots(&rows);
            self.store_err(result);
        }
    }

    fn on_events(&mut self, _tick: Tick, events: &[SimEvent]) {
        let rows: Vec<EventRow> = events.iter().map(|e| EventRow::from_event(e, &self.labels)).collect();
        let result = self.writer.write_events(&rows);
        self.store_err(result);
    }

    fn on_sim_end(&mut self, _final_tick: Tick, _stats: &RunStats) {
        let rows: Vec<ModalTimeRow> = self
            .metrics
            .modal_time()
            .iter()
            .map(|(agent, modal)| ModalTimeRow::new(*agent, modal))
            .collect();
        let result = self.writer.write_modal_time(&rows);
        self.store_err(result);

        let result = self.writer.finish();
        self.store_err(result);
    }
}
