//! Fluent builder for constructing a [`Sim`].

use std::collections::BTreeSet;

use tt_core::{AgentId, BuildingId, GeoPoint, SimConfig, Tick};
use tt_mobility::{AgentState, MobilityEngine};
use tt_schedule::{BuildingTable, DispatchTable, Roster, Trip};

use crate::{RunStats, Sim, SimError, SimResult, Snapshot};

/// Fluent builder for [`Sim`].
///
/// # Required inputs
///
/// - [`SimConfig`] — tick length, duration, output interval, …
/// - routed trips per agent, from [`tt_schedule::route_roster`]
/// - each agent's home building and its coordinate
///
/// # Optional inputs (have defaults)
///
/// | Method          | Default                                           |
/// |-----------------|---------------------------------------------------|
/// | `.dispatch(t)`  | `DispatchTable::build` over the trips and config  |
///
/// # Example
///
/// ```rust,ignore
/// let (trips, _) = route_roster(&ctx, &router, &buildings, &roster);
/// let mut sim = SimBuilder::with_roster(config, trips, &roster, &buildings)
///     .build()?;
/// sim.run(&mut NoopObserver)?;
/// ```
pub struct SimBuilder {
    config:   SimConfig,
    trips:    Vec<Vec<Trip>>,
    homes:    Vec<(BuildingId, GeoPoint)>,
    dispatch: Option<DispatchTable>,
}

impl SimBuilder {
    /// Create a builder with all required inputs.
    pub fn new(config: SimConfig, trips: Vec<Vec<Trip>>, homes: Vec<(BuildingId, GeoPoint)>) -> Self {
        Self { config, trips, homes, dispatch: None }
    }

    /// Take homes from `roster`, placed at their building coordinates.
    pub fn with_roster(
        config:    SimConfig,
        trips:     Vec<Vec<Trip>>,
        roster:    &Roster,
        buildings: &BuildingTable,
    ) -> Self {
        let homes = roster.homes.iter().map(|&b| (b, buildings.pos(b))).collect();
        Self::new(config, trips, homes)
    }

    /// Supply a prebuilt dispatch table (must cover the configured horizon).
    pub fn dispatch(mut self, table: DispatchTable) -> Self {
        self.dispatch = Some(table);
        self
    }

    /// Validate inputs, build the dispatch table, and return a ready-to-run
    /// [`Sim`] with every agent idle at home.
    pub fn build(self) -> SimResult<Sim> {
        self.config.validate()?;
        let agent_count = self.homes.len();
        let total_ticks = self.config.total_ticks();

        // ── Validate and resolve optional inputs ──────────────────────────
        if self.trips.len() != agent_count {
            return Err(SimError::AgentCountMismatch {
                expected: agent_count,
                got:      self.trips.len(),
                what:     "trip lists",
            });
        }

        let dispatch = match self.dispatch {
            Some(table) => {
                if table.total_ticks() != total_ticks {
                    return Err(SimError::HorizonMismatch {
                        table:  table.total_ticks(),
                        config: total_ticks,
                    });
                }
                check_refs(&table, &self.trips)?;
                table
            }
            None => DispatchTable::build(&self.trips, &self.config.make_clock(), total_ticks).0,
        };

        // ── Per-agent trip plan ───────────────────────────────────────────
        let mut plan: Vec<Vec<Option<Tick>>> =
            self.trips.iter().map(|agent_trips| vec![None; agent_trips.len()]).collect();
        for (tick, refs) in dispatch.iter() {
            for r in refs {
                plan[r.agent.index()][r.trip as usize] = Some(tick);
            }
        }

        // ── Place agents at home ──────────────────────────────────────────
        let states: Vec<AgentState> = self
            .homes
            .iter()
            .enumerate()
            .map(|(i, &(home, pos))| AgentState::at_home(AgentId(i as u32), home, pos))
            .collect();

        Ok(Sim {
            clock:          self.config.make_clock(),
            engine:         MobilityEngine::new(self.config.tick_minutes),
            config:         self.config,
            trips:          self.trips,
            dispatch,
            current:        Snapshot::new(Tick::ZERO, states),
            plan,
            next_trip:      vec![0; agent_count],
            ready:          BTreeSet::new(),
            stats:          RunStats::default(),
        })
    }
}

/// Every dispatch entry must name an existing trip.
fn check_refs(table: &DispatchTable, trips: &[Vec<Trip>]) -> SimResult<()> {
    for (_, refs) in table.iter() {
        for r in refs {
            let known = trips
                .get(r.agent.index())
                .is_some_and(|agent_trips| (r.trip as usize) < agent_trips.len());
            if !known {
                return Err(SimError::UnknownTrip { agent: r.agent, trip: r.trip });
            }
        }
    }
    Ok(())
}
