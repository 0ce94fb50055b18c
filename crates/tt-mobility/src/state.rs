//! Per-agent runtime state.

use std::fmt;

use tt_core::{ActivityId, AgentId, BuildingId, GeoPoint, ModalMinutes, Tick, TransportMode};
use tt_schedule::TripRef;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum AgentStatus {
    /// At home, no trip taken yet.
    Idle,
    Traveling,
    /// Arrived at the destination of the last trip.
    AtActivity,
}

impl AgentStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            AgentStatus::Idle => "idle",
            AgentStatus::Traveling => "traveling",
            AgentStatus::AtActivity => "at_activity",
        }
    }
}

impl fmt::Display for AgentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The trip an agent is currently making.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ActiveTrip {
    pub trip: TripRef,
    pub seq: u32,
    pub destination: BuildingId,
    pub purpose: ActivityId,
    /// Tick in which the agent departed.
    pub departure_tick: Tick,
    /// Ticks the trip occupies; `remaining_ticks` counts down from here.
    pub total_ticks: u32,
    pub total_minutes: f64,
}

/// One agent at one tick.  Replaced, never mutated in place, by the
/// simulation loop.
#[derive(Clone, Debug, PartialEq)]
pub struct AgentState {
    pub agent: AgentId,
    pub status: AgentStatus,
    pub position: GeoPoint,
    /// Building the agent is at; while traveling, the building it left.
    pub building: BuildingId,
    pub activity: ActivityId,
    pub active: Option<ActiveTrip>,
    pub remaining_ticks: u32,
    /// Mode of the segment the agent is on; `None` unless traveling.
    pub current_mode: Option<TransportMode>,
    /// Trips completed so far.
    pub trips_completed: u32,
    /// Cumulative minutes per leg mode.
    pub modal: ModalMinutes,
}

impl AgentState {
    /// Tick-0 state: idle at home.
    pub fn at_home(agent: AgentId, home: BuildingId, pos: GeoPoint) -> Self {
        Self {
            agent,
            status: AgentStatus::Idle,
            position: pos,
            building: home,
            activity: ActivityId::HOME,
            active: None,
            remaining_ticks: 0,
            current_mode: None,
            trips_completed: 0,
            modal: ModalMinutes::default(),
        }
    }

    #[inline]
    pub fn is_traveling(&self) -> bool {
        self.status == AgentStatus::Traveling
    }

    /// Building the agent is at or heading to.
    #[inline]
    pub fn target_building(&self) -> BuildingId {
        self.active.map_or(self.building, |a| a.destination)
    }
}
