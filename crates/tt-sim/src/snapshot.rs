//! Per-tick records handed to observers: agent snapshots and travel events.

use std::fmt;
use std::sync::Arc;

use tt_core::{ActivityId, AgentId, Tick, TransportMode};
use tt_mobility::AgentState;

// ── Snapshot ──────────────────────────────────────────────────────────────────

/// Every agent's state at the end of one tick.
///
/// The state slice is shared, so cloning a snapshot is O(1) and keeping the
/// whole day's history costs one state vector per tick.
#[derive(Clone, Debug)]
pub struct Snapshot {
    pub tick:   Tick,
    pub agents: Arc<[AgentState]>,
}

impl Snapshot {
    pub fn new(tick: Tick, agents: Vec<AgentState>) -> Self {
        Self { tick, agents: agents.into() }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.agents.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    #[inline]
    pub fn get(&self, agent: AgentId) -> Option<&AgentState> {
        self.agents.get(agent.index())
    }

    pub fn traveling(&self) -> usize {
        self.agents.iter().filter(|s| s.is_traveling()).count()
    }
}

// ── Events ────────────────────────────────────────────────────────────────────

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum EventKind {
    Depart,
    Arrive,
}

impl EventKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EventKind::Depart => "DEPART",
            EventKind::Arrive => "ARRIVE",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A departure or arrival.  An agent produces at most one event per tick.
#[derive(Clone, Debug, PartialEq)]
pub struct SimEvent {
    pub tick:           Tick,
    pub agent:          AgentId,
    pub kind:           EventKind,
    pub trip_seq:       u32,
    /// Mode the route actually used.
    pub mode:           TransportMode,
    pub purpose:        ActivityId,
    pub departure_tick: Tick,
    /// Routed travel time of the trip.
    pub duration_min:   f64,
}
