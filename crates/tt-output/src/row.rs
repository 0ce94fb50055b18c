//! Plain data row types written by output backends, and their conversions
//! from simulation records.

use tt_core::{ActivityId, AgentId, BuildingId, ModalMinutes, TransportMode};
use tt_mobility::AgentState;
use tt_schedule::{ActivityRegistry, BuildingTable};
use tt_sim::{SimEvent, TickMetrics};

// ── Labels ────────────────────────────────────────────────────────────────────

/// External names for dense ids: input building ids and activity labels.
#[derive(Clone, Debug, Default)]
pub struct Labels {
    buildings:  Vec<u64>,
    activities: Vec<String>,
}

impl Labels {
    pub fn new(buildings: &BuildingTable, activities: &ActivityRegistry) -> Self {
        Self {
            buildings:  buildings.iter().map(|(_, b)| b.external_id).collect(),
            activities: activities.iter().map(|(_, name)| name.to_owned()).collect(),
        }
    }

    /// External id of `b`; the dense index if the table did not know it.
    pub fn building(&self, b: BuildingId) -> u64 {
        self.buildings.get(b.index()).copied().unwrap_or(b.0 as u64)
    }

    pub fn activity(&self, a: ActivityId) -> &str {
        self.activities.get(a.index()).map_or("unknown", String::as_str)
    }
}

// ── Rows ──────────────────────────────────────────────────────────────────────

/// One agent's state at a given tick.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentSnapshotRow {
    pub tick:            u64,
    pub agent_id:        u32,
    pub status:          &'static str,
    pub lat:             f32,
    pub lon:             f32,
    /// External id of the current building (the origin while traveling).
    pub building:        u64,
    pub activity:        String,
    /// Mode of the current segment; `None` unless traveling.
    pub mode:            Option<TransportMode>,
    pub remaining_ticks: u32,
}

impl AgentSnapshotRow {
    pub fn from_state(tick: u64, state: &AgentState, labels: &Labels) -> Self {
        Self {
            tick,
            agent_id:        state.agent.0,
            status:          state.status.as_str(),
            lat:             state.position.lat,
            lon:             state.position.lon,
            building:        labels.building(state.building),
            activity:        labels.activity(state.activity).to_owned(),
            mode:            state.current_mode,
            remaining_ticks: state.remaining_ticks,
        }
    }
}

/// A DEPART or ARRIVE record.
#[derive(Debug, Clone, PartialEq)]
pub struct EventRow {
    pub tick:           u64,
    pub agent_id:       u32,
    pub event:          &'static str,
    pub trip_seq:       u32,
    pub mode:           TransportMode,
    pub purpose:        String,
    pub departure_tick: u64,
    pub duration_min:   f64,
}

impl EventRow {
    pub fn from_event(event: &SimEvent, labels: &Labels) -> Self {
        Self {
            tick:           event.tick.0,
            agent_id:       event.agent.0,
            event:          event.kind.as_str(),
            trip_seq:       event.trip_seq,
            mode:           event.mode,
            purpose:        labels.activity(event.purpose).to_owned(),
            departure_tick: event.departure_tick.0,
            duration_min:   event.duration_min,
        }
    }
}

/// One value of the long-format tick metrics table.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricRow {
    pub tick:   u64,
    pub metric: &'static str,
    /// Mode, activity, or zone the value belongs to; empty for totals.
    pub key:    String,
    pub value:  f64,
}

/// Flatten one tick's aggregates into long-format rows:
/// `total_agents`, `traveling`, `mode_share` per leg mode,
/// `activity_count` per activity, `zone_occupancy` per zone.
pub fn metric_rows(m: &TickMetrics, labels: &Labels) -> Vec<MetricRow> {
    let tick = m.tick.0;
    let row = |metric, key: String, value| MetricRow { tick, metric, key, value };

    let mut rows = vec![
        row("total_agents", String::new(), m.total_agents as f64),
        row("traveling", String::new(), m.traveling as f64),
    ];
    rows.extend(
        TransportMode::LEG_MODES
            .iter()
            .map(|&mode| row("mode_share", mode.as_str().to_owned(), m.mode_share(mode))),
    );
    rows.extend(
        m.activities
            .iter()
            .map(|(&a, &n)| row("activity_count", labels.activity(a).to_owned(), n as f64)),
    );
    rows.extend(m.zones.iter().map(|(z, &n)| row("zone_occupancy", z.0.to_string(), n as f64)));
    rows
}

/// Day total per leg mode for one agent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModalTimeRow {
    pub agent_id: u32,
    pub walk_min: f64,
    pub road_min: f64,
    pub rail_min: f64,
}

impl ModalTimeRow {
    pub fn new(agent: AgentId, modal: &ModalMinutes) -> Self {
        Self {
            agent_id: agent.0,
            walk_min: modal.get(TransportMode::Walk),
            road_min: modal.get(TransportMode::Road),
            rail_min: modal.get(TransportMode::Rail),
        }
    }

    pub fn total_min(&self) -> f64 {
        self.walk_min + self.road_min + self.rail_min
    }
}

/// Fixed six-decimal rendering for float columns.
pub(crate) fn fmt_f64(v: f64) -> String {
    format!("{v:.6}")
}
