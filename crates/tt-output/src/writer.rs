//! The `OutputWriter` trait implemented by backend writers.

use crate::row::{AgentSnapshotRow, EventRow, MetricRow, ModalTimeRow};
use crate::OutputResult;

/// Streaming sink for per-tick simulation output.
///
/// All methods are infallible from the observer's perspective; errors are
/// stored internally and retrieved with
/// [`SimOutputObserver::take_error`][crate::SimOutputObserver::take_error].
pub trait OutputWriter {
    /// Write a batch of agent snapshots.
    fn write_snapshots(&mut self, rows: &[AgentSnapshotRow]) -> OutputResult<()>;

    /// Write the DEPART / ARRIVE records of one tick.
    fn write_events(&mut self, rows: &[EventRow]) -> OutputResult<()>;

    /// Write one tick's long-format metric rows.
    fn write_metrics(&mut self, rows: &[MetricRow]) -> OutputResult<()>;

    /// Write the day's per-agent modal time.  Called once, at the end.
    fn write_modal_time(&mut self, rows: &[ModalTimeRow]) -> OutputResult<()>;

    /// Flush and close all underlying file handles.
    ///
    /// Idempotent.
    fn finish(&mut self) -> OutputResult<()>;
}
