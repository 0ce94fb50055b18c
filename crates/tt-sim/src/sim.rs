//! The `Sim` struct and its tick loop.

use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::{debug, info};

use tt_core::{AgentId, SimClock, SimConfig, Tick};
use tt_mobility::{ActiveTrip, AgentState, MobilityEngine};
use tt_schedule::{DispatchTable, Trip, TripRef};

use crate::{EventKind, SimEvent, SimObserver, SimResult, Snapshot};

// ── RunStats ──────────────────────────────────────────────────────────────────

/// Counters accumulated over a run.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct RunStats {
    pub ticks:              u64,
    pub departures:         u64,
    pub arrivals:           u64,
    /// Departures that happened after their due tick, because the agent was
    /// still traveling or an earlier trip in its list had not started yet.
    pub deferred:           u64,
    /// Due trips without a route; the agent stayed where it was.
    pub skipped_unroutable: u64,
    /// Scheduled trips not yet started when the run ended.
    pub pending_at_end:     u64,
    pub traveling_at_end:   u64,
}

// ── Sim ───────────────────────────────────────────────────────────────────────

/// The main simulation runner.
///
/// Each tick runs five steps in a fixed order:
///
/// 1. **Dispatch**: every non-traveling agent whose next trip (in trip-list
///    order) is due departs on it.  A trip that comes due before an earlier
///    one in the list waits for that one to complete.
/// 2. **Advance** (optionally parallel with the `parallel` feature): every
///    agent traveling at tick start moves one tick along its path.
/// 3. **Arrive**: agents whose countdown reached 0 land on the destination.
/// 4. **Snapshot**: the new state vector is frozen and handed to observers.
/// 5. **Events**: DEPART/ARRIVE records in ascending agent order.
///
/// Steps 2 and 3 read only the previous snapshot, so per-agent work is
/// independent; the collect into the new state vector is the barrier.
///
/// Create via [`SimBuilder`][crate::SimBuilder].
pub struct Sim {
    pub config: SimConfig,

    /// Simulation clock; `current_tick` is the next tick to process.
    pub clock: SimClock,

    pub(crate) engine:   MobilityEngine,
    pub(crate) trips:    Vec<Vec<Trip>>,
    pub(crate) dispatch: DispatchTable,

    /// State at the end of the last processed tick (tick-0 homes before the
    /// first one).
    pub(crate) current: Snapshot,

    /// Due tick of every trip, per agent in trip-list order; `None` for
    /// trips the dispatch table left out.
    pub(crate) plan:      Vec<Vec<Option<Tick>>>,
    /// Index of each agent's next trip to start.
    pub(crate) next_trip: Vec<u32>,
    /// Idle agents whose next trip may be due: woken by the dispatch table
    /// or by arriving.
    pub(crate) ready:     BTreeSet<AgentId>,

    pub(crate) stats: RunStats,
}

impl Sim {
    // ── Public API ────────────────────────────────────────────────────────

    /// Run the simulation from the current tick to `config.end_tick()`.
    ///
    /// Calls observer hooks at every tick boundary.  Use
    /// [`NoopObserver`][crate::NoopObserver] if you don't need callbacks.
    pub fn run<O: SimObserver>(&mut self, observer: &mut O) -> SimResult<RunStats> {
        let end = self.config.end_tick();
        while self.clock.current_tick < end {
            self.step(observer)?;
        }
        Ok(self.finish(observer))
    }

    /// Run at most `n` ticks from the current position, stopping at
    /// `config.end_tick()`.
    ///
    /// Useful for tests and incremental stepping; does not call
    /// `on_sim_end`.
    pub fn run_ticks<O: SimObserver>(&mut self, n: u64, observer: &mut O) -> SimResult<()> {
        let end = self.config.end_tick();
        for _ in 0..n {
            if self.clock.current_tick >= end {
                break;
            }
            self.step(observer)?;
        }
        Ok(())
    }

    /// State at the end of the last processed tick.
    pub fn snapshot(&self) -> &Snapshot {
        &self.current
    }

    pub fn stats(&self) -> &RunStats {
        &self.stats
    }

    pub fn agent_count(&self) -> usize {
        self.trips.len()
    }

    /// Routed trips, indexed by `AgentId`.
    pub fn trips(&self) -> &[Vec<Trip>] {
        &self.trips
    }

    // ── Core tick processing ──────────────────────────────────────────────

    fn step<O: SimObserver>(&mut self, observer: &mut O) -> SimResult<()> {
        let now = self.clock.current_tick;
        observer.on_tick_start(now);

        let (snapshot, events) = self.process_tick(now)?;
        observer.on_snapshot(&snapshot);
        if !events.is_empty() {
            observer.on_events(now, &events);
        }

        let traveling = snapshot.traveling();
        observer.on_tick_end(now, traveling);
        debug!(clock = %self.clock, traveling, events = events.len(), "tick complete");

        self.stats.ticks += 1;
        self.clock.advance();
        Ok(())
    }

    fn process_tick(&mut self, now: Tick) -> SimResult<(Snapshot, Vec<SimEvent>)> {
        // ── ① Dispatch ────────────────────────────────────────────────────
        let prev = Arc::clone(&self.current.agents);
        let departures = self.dispatch_due(now, &prev);

        // ── ②③ Advance and arrive (produce) ──────────────────────────────
        let engine = &self.engine;
        let trips = self.trips.as_slice();
        let step = |(state, depart): (&AgentState, &Option<TripRef>)| {
            step_agent(engine, trips, state, *depart, now)
        };

        #[cfg(not(feature = "parallel"))]
        let stepped: Vec<(AgentState, Option<SimEvent>)> = prev
            .iter()
            .zip(departures.iter())
            .map(step)
            .collect::<SimResult<_>>()?;

        #[cfg(feature = "parallel")]
        let stepped: Vec<(AgentState, Option<SimEvent>)> = {
            use rayon::prelude::*;
            prev.par_iter()
                .zip(departures.par_iter())
                .map(step)
                .collect::<SimResult<_>>()?
        };

        // ── ④⑤ Snapshot and events (consume, agent order) ────────────────
        let (states, events): (Vec<AgentState>, Vec<Option<SimEvent>>) =
            stepped.into_iter().unzip();
        let events: Vec<SimEvent> = events.into_iter().flatten().collect();
        for e in &events {
            match e.kind {
                EventKind::Depart => self.stats.departures += 1,
                EventKind::Arrive => {
                    self.stats.arrivals += 1;
                    self.ready.insert(e.agent);
                }
            }
        }

        let snapshot = Snapshot::new(now, states);
        self.current = snapshot.clone();
        Ok((snapshot, events))
    }

    /// Pick the trip each idle agent starts this tick.
    ///
    /// Returns one slot per agent.  Agents still traveling are dropped from
    /// the ready set; arriving puts them back.
    fn dispatch_due(&mut self, now: Tick, prev: &[AgentState]) -> Vec<Option<TripRef>> {
        self.ready.extend(self.dispatch.due(now).iter().map(|r| r.agent));

        let mut departures = vec![None; prev.len()];
        for agent in std::mem::take(&mut self.ready) {
            if prev[agent.index()].is_traveling() {
                continue;
            }
            departures[agent.index()] = self.next_departure(agent, now);
        }
        departures
    }

    /// Advance `agent` through its trip list up to the first routable trip
    /// due by `now`.  Unroutable trips on the way are skipped; a trip not yet
    /// due stops the walk.
    fn next_departure(&mut self, agent: AgentId, now: Tick) -> Option<TripRef> {
        let a = agent.index();
        loop {
            let index = self.next_trip[a];
            let slot = *self.plan[a].get(index as usize)?;
            let Some(tick) = slot else {
                self.next_trip[a] += 1;
                continue;
            };
            if tick > now {
                return None;
            }
            self.next_trip[a] += 1;

            let r = TripRef { agent, trip: index, tick };
            let trip = trip_at(&self.trips, r);
            if trip.is_routable() {
                if tick < now {
                    self.stats.deferred += 1;
                }
                return Some(r);
            }
            self.stats.skipped_unroutable += 1;
            debug!(
                agent = agent.0,
                seq = trip.request.seq,
                tick = now.0,
                "skipping dispatch of unroutable trip"
            );
        }
    }

    fn finish<O: SimObserver>(&mut self, observer: &mut O) -> RunStats {
        self.stats.pending_at_end = self
            .plan
            .iter()
            .zip(&self.next_trip)
            .map(|(ticks, &next)| ticks.iter().skip(next as usize).flatten().count() as u64)
            .sum();
        self.stats.traveling_at_end = self.current.traveling() as u64;
        info!(
            ticks = self.stats.ticks,
            departures = self.stats.departures,
            arrivals = self.stats.arrivals,
            deferred = self.stats.deferred,
            skipped_unroutable = self.stats.skipped_unroutable,
            pending_at_end = self.stats.pending_at_end,
            traveling_at_end = self.stats.traveling_at_end,
            "simulation complete"
        );
        observer.on_sim_end(self.clock.current_tick, &self.stats);
        self.stats
    }
}

// ── Per-agent step ────────────────────────────────────────────────────────────

/// Trip referenced by `r`.  The builder checks every dispatch entry against
/// the trip lists, so the index is in range.
#[inline]
fn trip_at(trips: &[Vec<Trip>], r: TripRef) -> &Trip {
    &trips[r.agent.index()][r.trip as usize]
}

/// One agent's transition for tick `now`: advance if traveling at tick
/// start, otherwise depart if dispatched, otherwise unchanged.
fn step_agent(
    engine: &MobilityEngine,
    trips:  &[Vec<Trip>],
    state:  &AgentState,
    depart: Option<TripRef>,
    now:    Tick,
) -> SimResult<(AgentState, Option<SimEvent>)> {
    if let (true, Some(active)) = (state.is_traveling(), state.active) {
        let trip = trip_at(trips, active.trip);
        let next = engine.advance(state, trip)?;
        let event = (!next.is_traveling())
            .then(|| make_event(now, state.agent, EventKind::Arrive, trip, &active));
        return Ok((next, event));
    }

    match depart {
        Some(r) => {
            let trip = trip_at(trips, r);
            let next = engine.depart(state, trip, r, now)?;
            let event = next
                .active
                .map(|active| make_event(now, state.agent, EventKind::Depart, trip, &active));
            Ok((next, event))
        }
        None => Ok((state.clone(), None)),
    }
}

fn make_event(
    tick:   Tick,
    agent:  AgentId,
    kind:   EventKind,
    trip:   &Trip,
    active: &ActiveTrip,
) -> SimEvent {
    SimEvent {
        tick,
        agent,
        kind,
        trip_seq:       active.seq,
        mode:           trip.mode_used().unwrap_or(trip.request.preferred),
        purpose:        active.purpose,
        departure_tick: active.departure_tick,
        duration_min:   active.total_minutes,
    }
}
