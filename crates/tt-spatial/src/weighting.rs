//! Preference-weighted views over a transport graph.
//!
//! A traveller preferring mode `p` sees every edge whose mode does not match
//! `p` as `multiplier(p)` times slower.  Matching edges keep their base time.
//! The graph itself is never touched; [`ModeWeighting`] is a borrowed view.

use serde::Deserialize;

use tt_core::{CoreError, CoreResult, EdgeId, TransportMode};

use crate::network::TransportGraph;

/// Non-matching multiplier per preferred mode.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct WeightingPolicy {
    pub walk: f64,
    pub road: f64,
    pub rail: f64,
    pub mixed: f64,
}

impl Default for WeightingPolicy {
    fn default() -> Self {
        Self { walk: 3.0, road: 2.0, rail: 2.0, mixed: 1.2 }
    }
}

impl WeightingPolicy {
    pub const MIN_MULTIPLIER: f64 = 1.0;
    pub const MAX_MULTIPLIER: f64 = 10.0;

    /// Multiplier applied to non-matching edges under `preference`.
    #[inline]
    pub fn non_matching(&self, preference: TransportMode) -> f64 {
        match preference {
            TransportMode::Walk => self.walk,
            TransportMode::Road => self.road,
            TransportMode::Rail => self.rail,
            TransportMode::Mixed => self.mixed,
        }
    }

    /// Multiplier for one edge mode under one preference.
    #[inline]
    pub fn multiplier(&self, edge_mode: TransportMode, preference: TransportMode) -> f64 {
        if preference.matches(edge_mode) { 1.0 } else { self.non_matching(preference) }
    }

    pub fn validate(&self) -> CoreResult<()> {
        for mode in TransportMode::ALL {
            let m = self.non_matching(mode);
            if !m.is_finite() || !(Self::MIN_MULTIPLIER..=Self::MAX_MULTIPLIER).contains(&m) {
                return Err(CoreError::Config(format!(
                    "weighting multiplier for {mode} must be within [{}, {}], got {m}",
                    Self::MIN_MULTIPLIER,
                    Self::MAX_MULTIPLIER
                )));
            }
        }
        Ok(())
    }
}

/// Effective edge weights of one graph for one preferred mode.
#[derive(Clone, Copy)]
pub struct ModeWeighting<'g> {
    graph: &'g TransportGraph,
    preference: TransportMode,
    non_matching: f64,
}

impl<'g> ModeWeighting<'g> {
    pub fn new(graph: &'g TransportGraph, policy: &WeightingPolicy, preference: TransportMode) -> Self {
        Self { graph, preference, non_matching: policy.non_matching(preference) }
    }

    pub fn graph(&self) -> &'g TransportGraph {
        self.graph
    }

    pub fn preference(&self) -> TransportMode {
        self.preference
    }

    #[inline]
    pub fn multiplier(&self, edge: EdgeId) -> f64 {
        if self.preference.matches(self.graph.edge_mode[edge.index()]) {
            1.0
        } else {
            self.non_matching
        }
    }

    /// Weighted travel time of `edge` in integer milliseconds.
    #[inline]
    pub fn weight_ms(&self, edge: EdgeId) -> u64 {
        let base = self.graph.edge_travel_ms[edge.index()] as f64;
        (base * self.multiplier(edge)).round() as u64
    }
}
