//! Travel transitions: departure, per-tick advance, arrival.

use tt_core::{SimClock, Tick, TransportMode};
use tt_schedule::{Trip, TripRef};
use tt_spatial::RouteSegment;

use crate::{ActiveTrip, AgentState, AgentStatus, MobilityError, MobilityResult};

/// Applies travel transitions for a fixed tick length.
///
/// Holds no per-agent data; share one instance across workers.
#[derive(Clone, Debug)]
pub struct MobilityEngine {
    clock: SimClock,
}

impl MobilityEngine {
    pub fn new(tick_minutes: u32) -> Self {
        Self { clock: SimClock::new(tick_minutes) }
    }

    pub fn tick_minutes(&self) -> u32 {
        self.clock.tick_minutes
    }

    /// Ticks a trip of `minutes` occupies; at least 1 so even a zero-length
    /// trip is visible as traveling for one tick.
    pub fn trip_ticks(&self, minutes: f64) -> u32 {
        self.clock.ticks_for_minutes(minutes).max(1) as u32
    }

    /// Start `trip` for `state`'s agent in the tick `trip_ref.tick` or later.
    ///
    /// The agent is placed on the start of the trip path and is first
    /// advanced in the following tick.
    pub fn depart(
        &self,
        state: &AgentState,
        trip: &Trip,
        trip_ref: TripRef,
        now: Tick,
    ) -> MobilityResult<AgentState> {
        if state.is_traveling() {
            return Err(MobilityError::AlreadyTraveling(state.agent));
        }
        let unroutable = || MobilityError::Unroutable { agent: state.agent, seq: trip.request.seq };
        let routing = trip.routing().ok_or_else(unroutable)?;
        let start = routing.path.start().ok_or_else(unroutable)?;

        let total_minutes = routing.route.total_time_min;
        let total_ticks = self.trip_ticks(total_minutes);
        let first_mode = routing.route.segments.first().map_or(routing.route.mode_used, |s| s.mode);

        Ok(AgentState {
            status: AgentStatus::Traveling,
            position: start,
            active: Some(ActiveTrip {
                trip: trip_ref,
                seq: trip.request.seq,
                destination: trip.request.destination,
                purpose: trip.request.purpose,
                departure_tick: now,
                total_ticks,
                total_minutes,
            }),
            remaining_ticks: total_ticks,
            current_mode: Some(first_mode),
            ..state.clone()
        })
    }

    /// One tick of travel.  `trip` must be the agent's active trip.
    ///
    /// Arrival happens inside this call when the countdown hits 0.
    pub fn advance(&self, state: &AgentState, trip: &Trip) -> MobilityResult<AgentState> {
        let (Some(active), true) = (state.active, state.is_traveling()) else {
            return Err(MobilityError::NotTraveling(state.agent));
        };
        let routing = trip
            .routing()
            .ok_or(MobilityError::Unroutable { agent: state.agent, seq: active.seq })?;

        let remaining = state.remaining_ticks.saturating_sub(1);
        let elapsed_ticks = active.total_ticks - remaining;
        let tick = self.clock.tick_minutes as f64;
        let total = active.total_minutes;

        let window_start = ((elapsed_ticks - 1) as f64 * tick).min(total);
        // The last window always closes on the exact total so the per-mode
        // minutes of a finished trip add up to its travel time.
        let window_end = if remaining == 0 { total } else { (elapsed_ticks as f64 * tick).min(total) };

        let mut modal = state.modal;
        credit_segments(&routing.route.segments, window_start, window_end, |mode, minutes| {
            modal.add(mode, minutes)
        });

        if remaining == 0 {
            let destination = routing.path.end().unwrap_or(state.position);
            return Ok(AgentState {
                status: AgentStatus::AtActivity,
                position: destination,
                building: active.destination,
                activity: active.purpose,
                active: None,
                remaining_ticks: 0,
                current_mode: None,
                trips_completed: state.trips_completed + 1,
                modal,
                ..state.clone()
            });
        }

        let fraction = if total > 0.0 { (window_end / total) as f32 } else { 1.0 };
        let position = routing.path.point_at_fraction(fraction).unwrap_or(state.position);
        let current_mode = segment_mode_at(&routing.route.segments, window_end)
            .or(state.current_mode);

        Ok(AgentState {
            position,
            remaining_ticks: remaining,
            current_mode,
            modal,
            ..state.clone()
        })
    }
}

/// Call `credit(mode, minutes)` for each segment overlapping `[from, to)`
/// on the trip's time axis.
fn credit_segments(
    segments: &[RouteSegment],
    from: f64,
    to: f64,
    mut credit: impl FnMut(TransportMode, f64),
) {
    if to <= from {
        return;
    }
    let mut seg_start = 0.0;
    for seg in segments {
        let seg_end = seg_start + seg.time_min;
        let overlap = seg_end.min(to) - seg_start.max(from);
        if overlap > 0.0 {
            credit(seg.mode, overlap);
        }
        if seg_end >= to {
            break;
        }
        seg_start = seg_end;
    }
}

/// Mode of the segment in progress at `minute` into the trip.
fn segment_mode_at(segments: &[RouteSegment], minute: f64) -> Option<TransportMode> {
    let mut seg_start = 0.0;
    for seg in segments {
        let seg_end = seg_start + seg.time_min;
        if minute < seg_end {
            return Some(seg.mode);
        }
        seg_start = seg_end;
    }
    segments.last().map(|s| s.mode)
}
