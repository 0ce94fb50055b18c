//! Per-tick aggregates and day-long modal time.
//!
//! Aggregation is a pure fold over a snapshot.  With the `parallel` feature
//! each Rayon worker folds its share of agents into a partial and the
//! partials are merged afterwards.

use std::collections::BTreeMap;

use tt_core::{ActivityId, AgentId, ModalMinutes, Tick, TransportMode, ZoneId};
use tt_mobility::AgentState;
use tt_schedule::BuildingTable;

use crate::{SimObserver, Snapshot};

// ── TickMetrics ───────────────────────────────────────────────────────────────

/// Aggregate counts for one tick.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TickMetrics {
    pub tick:         Tick,
    pub total_agents: usize,
    pub traveling:    usize,
    /// Travelers by the mode of the segment they are on.
    pub modes:        BTreeMap<TransportMode, usize>,
    /// Non-traveling agents by current activity.
    pub activities:   BTreeMap<ActivityId, usize>,
    /// Agents per zone: idle agents by their building, travelers by their
    /// destination.  Buildings without a zone are not counted.
    pub zones:        BTreeMap<ZoneId, usize>,
}

impl TickMetrics {
    /// Share of travelers on `mode`; 0 when nobody travels.
    pub fn mode_share(&self, mode: TransportMode) -> f64 {
        if self.traveling == 0 {
            return 0.0;
        }
        self.modes.get(&mode).copied().unwrap_or(0) as f64 / self.traveling as f64
    }
}

#[derive(Default)]
struct Partial {
    total:      usize,
    traveling:  usize,
    modes:      BTreeMap<TransportMode, usize>,
    activities: BTreeMap<ActivityId, usize>,
    zones:      BTreeMap<ZoneId, usize>,
}

impl Partial {
    fn add(mut self, state: &AgentState, zones: &[Option<ZoneId>]) -> Self {
        self.total += 1;
        if state.is_traveling() {
            self.traveling += 1;
            if let Some(mode) = state.current_mode {
                *self.modes.entry(mode).or_default() += 1;
            }
        } else {
            *self.activities.entry(state.activity).or_default() += 1;
        }
        if let Some(zone) = zones.get(state.target_building().index()).copied().flatten() {
            *self.zones.entry(zone).or_default() += 1;
        }
        self
    }

    fn merge(mut self, other: Partial) -> Self {
        self.total += other.total;
        self.traveling += other.traveling;
        merge_counts(&mut self.modes, other.modes);
        merge_counts(&mut self.activities, other.activities);
        merge_counts(&mut self.zones, other.zones);
        self
    }
}

fn merge_counts<K: Ord>(into: &mut BTreeMap<K, usize>, from: BTreeMap<K, usize>) {
    for (k, v) in from {
        *into.entry(k).or_default() += v;
    }
}

/// Aggregate one snapshot.  `zones` is indexed by `BuildingId`.
pub fn aggregate(snapshot: &Snapshot, zones: &[Option<ZoneId>]) -> TickMetrics {
    #[cfg(not(feature = "parallel"))]
    let partial = snapshot
        .agents
        .iter()
        .fold(Partial::default(), |acc, s| acc.add(s, zones));

    #[cfg(feature = "parallel")]
    let partial = {
        use rayon::prelude::*;
        snapshot
            .agents
            .par_iter()
            .fold(Partial::default, |acc, s| acc.add(s, zones))
            .reduce(Partial::default, Partial::merge)
    };

    TickMetrics {
        tick:         snapshot.tick,
        total_agents: partial.total,
        traveling:    partial.traveling,
        modes:        partial.modes,
        activities:   partial.activities,
        zones:        partial.zones,
    }
}

// ── MetricsCollector ──────────────────────────────────────────────────────────

/// [`SimObserver`] that aggregates every snapshot and keeps the last one for
/// the day's modal time.
pub struct MetricsCollector {
    zones: Vec<Option<ZoneId>>,
    ticks: Vec<TickMetrics>,
    last:  Option<Snapshot>,
}

impl MetricsCollector {
    /// `zones[b]` is the zone of building `b`.
    pub fn new(zones: Vec<Option<ZoneId>>) -> Self {
        Self { zones, ticks: Vec::new(), last: None }
    }

    pub fn from_buildings(buildings: &BuildingTable) -> Self {
        Self::new(buildings.iter().map(|(_, b)| b.zone).collect())
    }

    /// One entry per observed tick, in tick order.
    pub fn ticks(&self) -> &[TickMetrics] {
        &self.ticks
    }

    pub fn latest(&self) -> Option<&TickMetrics> {
        self.ticks.last()
    }

    /// Cumulative minutes per leg mode for every agent, from the last
    /// snapshot.  Empty before the first tick.
    pub fn modal_time(&self) -> Vec<(AgentId, ModalMinutes)> {
        self.last
            .iter()
            .flat_map(|s| s.agents.iter())
            .map(|s| (s.agent, s.modal))
            .collect()
    }

    /// Minutes per leg mode summed over all agents.
    pub fn modal_totals(&self) -> ModalMinutes {
        let mut total = ModalMinutes::default();
        for (_, modal) in self.modal_time() {
            for (mode, minutes) in modal.iter() {
                total.add(mode, minutes);
            }
        }
        total
    }
}

impl SimObserver for MetricsCollector {
    fn on_snapshot(&mut self, snapshot: &Snapshot) {
        self.ticks.push(aggregate(snapshot, &self.zones));
        self.last = Some(snapshot.clone());
    }
}
