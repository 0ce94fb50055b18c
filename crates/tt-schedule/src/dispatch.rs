//! `DispatchTable` — per-tick list of trips that come due.
//!
//! Built once before the run from every agent's departure times.  Each tick
//! the engine reads only that tick's slot, so dispatch cost is O(due trips)
//! rather than O(agents).
//!
//! Within a slot, entries are ordered by agent id and then by the agent's
//! trip order.  With the `parallel` feature departures are parsed per agent
//! on the Rayon pool and the per-agent results merged in agent order, so the
//! table is identical either way.

use std::fmt;

use tracing::{info, warn};

use tt_core::{AgentId, SimClock, Tick};

use crate::departure::parse_departure;
use crate::trip::Trip;

/// Reference to trip `trip` (index into the agent's trip list) of `agent`,
/// due at `tick`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct TripRef {
    pub agent: AgentId,
    pub trip: u32,
    pub tick: Tick,
}

/// Why a trip was left out of the table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum IssueReason {
    /// The departure time could not be parsed.
    Unparsable,
    /// The departure falls on or after the last simulated tick.
    BeyondHorizon { tick: Tick },
}

impl fmt::Display for IssueReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IssueReason::Unparsable => f.write_str("unparsable departure time"),
            IssueReason::BeyondHorizon { tick } => write!(f, "departure tick {tick} beyond horizon"),
        }
    }
}

/// A trip dropped while building the table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScheduleIssue {
    pub agent: AgentId,
    pub seq: u32,
    pub departure: String,
    pub reason: IssueReason,
}

#[derive(Clone, Debug, Default)]
pub struct DispatchTable {
    slots: Vec<Vec<TripRef>>,
    total: usize,
}

impl DispatchTable {
    /// Build the table for a run of `total_ticks` ticks.
    ///
    /// `trips` is indexed by `AgentId`.  Trips whose departure cannot be
    /// placed are returned as [`ScheduleIssue`]s and logged.
    pub fn build(trips: &[Vec<Trip>], clock: &SimClock, total_ticks: u64) -> (Self, Vec<ScheduleIssue>) {
        let per_agent = |(i, agent_trips): (usize, &Vec<Trip>)| {
            place_agent(AgentId(i as u32), agent_trips, clock, total_ticks)
        };

        #[cfg(feature = "parallel")]
        let placed: Vec<(Vec<TripRef>, Vec<ScheduleIssue>)> = {
            use rayon::prelude::*;
            trips.par_iter().enumerate().map(per_agent).collect()
        };
        #[cfg(not(feature = "parallel"))]
        let placed: Vec<(Vec<TripRef>, Vec<ScheduleIssue>)> =
            trips.iter().enumerate().map(per_agent).collect();

        // Single writer: merge in agent order.
        let mut table = DispatchTable { slots: vec![Vec::new(); total_ticks as usize], total: 0 };
        let mut issues = Vec::new();
        for (refs, agent_issues) in placed {
            for r in refs {
                table.slots[r.tick.0 as usize].push(r);
                table.total += 1;
            }
            issues.extend(agent_issues);
        }

        for issue in &issues {
            warn!(
                agent = issue.agent.0,
                seq = issue.seq,
                departure = %issue.departure,
                reason = %issue.reason,
                "trip dropped from schedule"
            );
        }
        info!(scheduled = table.total, dropped = issues.len(), "dispatch table built");
        (table, issues)
    }

    /// Trips due at `tick`; empty past the horizon.
    pub fn due(&self, tick: Tick) -> &[TripRef] {
        self.slots.get(tick.0 as usize).map_or(&[], Vec::as_slice)
    }

    pub fn total_ticks(&self) -> u64 {
        self.slots.len() as u64
    }

    /// Total number of scheduled trips.
    pub fn len(&self) -> usize {
        self.total
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    /// `(tick, due trips)` for every non-empty slot, ascending.
    pub fn iter(&self) -> impl Iterator<Item = (Tick, &[TripRef])> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, s)| !s.is_empty())
            .map(|(t, s)| (Tick(t as u64), s.as_slice()))
    }
}

fn place_agent(
    agent: AgentId,
    trips: &[Trip],
    clock: &SimClock,
    total_ticks: u64,
) -> (Vec<TripRef>, Vec<ScheduleIssue>) {
    let mut refs = Vec::with_capacity(trips.len());
    let mut issues = Vec::new();
    for (i, trip) in trips.iter().enumerate() {
        let departure = &trip.request.departure;
        let issue = |reason| ScheduleIssue {
            agent,
            seq: trip.request.seq,
            departure: departure.clone(),
            reason,
        };
        let Some(minutes) = parse_departure(departure) else {
            issues.push(issue(IssueReason::Unparsable));
            continue;
        };
        let tick = clock.tick_for_minutes(minutes);
        if tick.0 >= total_ticks {
            issues.push(issue(IssueReason::BeyondHorizon { tick }));
            continue;
        }
        refs.push(TripRef { agent, trip: i as u32, tick });
    }
    (refs, issues)
}
