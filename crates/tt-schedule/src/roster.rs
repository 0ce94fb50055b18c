//! Buildings, activity labels, and the agent roster.

use rustc_hash::FxHashMap;

use tt_core::{ActivityId, AgentId, BuildingId, GeoPoint, StopId, ZoneId};
use tt_spatial::{Endpoint, NetworkAccess, NetworkContext};

use crate::trip::TripRequest;
use crate::{ScheduleError, ScheduleResult};

// ── Buildings ─────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
pub struct Building {
    /// Id used in the input files.
    pub external_id: u64,
    pub pos: GeoPoint,
    pub zone: Option<ZoneId>,
    /// Nearest stops as supplied upstream; resolved into `access`.
    pub road_stop: Option<StopId>,
    pub rail_stop: Option<StopId>,
    pub access: NetworkAccess,
}

/// Dense building storage with an external-id lookup.
#[derive(Default)]
pub struct BuildingTable {
    buildings: Vec<Building>,
    by_external: FxHashMap<u64, BuildingId>,
}

impl BuildingTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(
        &mut self,
        external_id: u64,
        pos: GeoPoint,
        zone: Option<ZoneId>,
        road_stop: Option<StopId>,
        rail_stop: Option<StopId>,
    ) -> ScheduleResult<BuildingId> {
        if self.by_external.contains_key(&external_id) {
            return Err(ScheduleError::DuplicateBuilding { building: external_id });
        }
        let id = BuildingId(self.buildings.len() as u32);
        self.buildings.push(Building {
            external_id,
            pos,
            zone,
            road_stop,
            rail_stop,
            access: NetworkAccess::default(),
        });
        self.by_external.insert(external_id, id);
        Ok(id)
    }

    pub fn lookup(&self, external_id: u64) -> ScheduleResult<BuildingId> {
        self.by_external
            .get(&external_id)
            .copied()
            .ok_or(ScheduleError::UnknownBuilding { building: external_id })
    }

    #[inline]
    pub fn get(&self, id: BuildingId) -> &Building {
        &self.buildings[id.index()]
    }

    #[inline]
    pub fn pos(&self, id: BuildingId) -> GeoPoint {
        self.buildings[id.index()].pos
    }

    #[inline]
    pub fn zone(&self, id: BuildingId) -> Option<ZoneId> {
        self.buildings.get(id.index()).and_then(|b| b.zone)
    }

    pub fn len(&self) -> usize {
        self.buildings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buildings.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (BuildingId, &Building)> {
        self.buildings.iter().enumerate().map(|(i, b)| (BuildingId(i as u32), b))
    }

    /// Fix every building's road and rail access node once, so routing never
    /// snaps the same building twice.
    pub fn resolve_access(&mut self, ctx: &NetworkContext) {
        for b in &mut self.buildings {
            b.access = ctx.resolve_access(b.pos, b.road_stop.as_ref(), b.rail_stop.as_ref());
        }
    }

    pub fn endpoint(&self, id: BuildingId) -> Endpoint {
        let b = self.get(id);
        Endpoint { building: id, pos: b.pos, access: b.access }
    }
}

// ── Activities ────────────────────────────────────────────────────────────────

/// Interned trip-purpose labels.  `ActivityId::HOME` is always `"home"`.
#[derive(Clone, Debug)]
pub struct ActivityRegistry {
    names: Vec<String>,
    index: FxHashMap<String, ActivityId>,
}

impl Default for ActivityRegistry {
    fn default() -> Self {
        let mut reg = Self { names: Vec::new(), index: FxHashMap::default() };
        reg.intern("home");
        reg
    }
}

impl ActivityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Id for `label` (trimmed, lower-cased), allocating one if new.
    pub fn intern(&mut self, label: &str) -> ActivityId {
        let key = label.trim().to_ascii_lowercase();
        if let Some(&id) = self.index.get(&key) {
            return id;
        }
        let id = ActivityId(self.names.len() as u16);
        self.names.push(key.clone());
        self.index.insert(key, id);
        id
    }

    pub fn name(&self, id: ActivityId) -> &str {
        self.names.get(id.index()).map_or("unknown", String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ActivityId, &str)> {
        self.names.iter().enumerate().map(|(i, n)| (ActivityId(i as u16), n.as_str()))
    }
}

// ── Roster ────────────────────────────────────────────────────────────────────

/// Every agent's home and ordered trip requests.  Indexed by `AgentId`.
#[derive(Clone, Debug, Default)]
pub struct Roster {
    pub homes: Vec<BuildingId>,
    /// Trips per agent, ascending by sequence number.
    pub trips: Vec<Vec<TripRequest>>,
    pub activities: ActivityRegistry,
}

impl Roster {
    pub fn agent_count(&self) -> usize {
        self.homes.len()
    }

    pub fn trip_count(&self) -> usize {
        self.trips.iter().map(Vec::len).sum()
    }

    pub fn home(&self, agent: AgentId) -> BuildingId {
        self.homes[agent.index()]
    }
}
