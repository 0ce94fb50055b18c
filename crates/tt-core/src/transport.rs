//! Transportation modes shared across the routing and mobility crates.
//!
//! `Walk`, `Road` and `Rail` are *leg modes*: every route segment and graph
//! edge carries one of them.  `Mixed` is a preference only: it asks the
//! router for a road+rail journey with one transfer and never tags an edge.

use std::str::FromStr;

use crate::CoreError;

/// A traveller's preferred (or actually used) way of moving.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum TransportMode {
    /// On foot, building to building.
    Walk,
    /// Road-based public transport (jeepney, bus, UV express…).
    Road,
    /// Rail transit.
    Rail,
    /// Road and rail combined through one transfer stop.
    Mixed,
}

impl TransportMode {
    /// All modes in declaration order.
    pub const ALL: [TransportMode; 4] = [
        TransportMode::Walk,
        TransportMode::Road,
        TransportMode::Rail,
        TransportMode::Mixed,
    ];

    /// Modes that tag edges and segments.
    pub const LEG_MODES: [TransportMode; 3] =
        [TransportMode::Walk, TransportMode::Road, TransportMode::Rail];

    /// Human-readable label, used for CSV column values.
    pub fn as_str(self) -> &'static str {
        match self {
            TransportMode::Walk  => "walk",
            TransportMode::Road  => "road",
            TransportMode::Rail  => "rail",
            TransportMode::Mixed => "mixed",
        }
    }

    /// Slot in [`ModalMinutes`], `None` for `Mixed`.
    #[inline]
    pub fn leg_index(self) -> Option<usize> {
        match self {
            TransportMode::Walk  => Some(0),
            TransportMode::Road  => Some(1),
            TransportMode::Rail  => Some(2),
            TransportMode::Mixed => None,
        }
    }

    /// `true` if an edge tagged `edge_mode` suits a traveller preferring
    /// `self`.  A mixed preference accepts any transit edge.
    #[inline]
    pub fn matches(self, edge_mode: TransportMode) -> bool {
        self == edge_mode
            || (self == TransportMode::Mixed
                && matches!(edge_mode, TransportMode::Road | TransportMode::Rail))
    }
}

impl std::fmt::Display for TransportMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parses mode names (`walk`, `road`, `rail`, `mixed`, case-insensitive) and
/// the numeric survey codes produced by the upstream mode-choice model:
///
/// | Code | Survey mode | Mode    |
/// |------|-------------|---------|
/// | 1    | walk        | `Walk`  |
/// | 2    | jeepney     | `Road`  |
/// | 3    | bus         | `Road`  |
/// | 4    | rail        | `Rail`  |
/// | 5    | other       | `Mixed` |
impl FromStr for TransportMode {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "walk" | "1"                  => Ok(TransportMode::Walk),
            "road" | "jeep" | "bus" | "2" | "3" => Ok(TransportMode::Road),
            "rail" | "train" | "4"        => Ok(TransportMode::Rail),
            "mixed" | "5"                 => Ok(TransportMode::Mixed),
            other => Err(CoreError::UnknownMode(other.to_owned())),
        }
    }
}

// ── ModalMinutes ──────────────────────────────────────────────────────────────

/// Cumulative minutes spent per leg mode.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ModalMinutes([f64; 3]);

impl ModalMinutes {
    /// Add `minutes` to `mode`.  `Mixed` has no slot and is ignored.
    #[inline]
    pub fn add(&mut self, mode: TransportMode, minutes: f64) {
        if let Some(i) = mode.leg_index() {
            self.0[i] += minutes;
        }
    }

    #[inline]
    pub fn get(&self, mode: TransportMode) -> f64 {
        mode.leg_index().map_or(0.0, |i| self.0[i])
    }

    pub fn total(&self) -> f64 {
        self.0.iter().sum()
    }

    /// `(mode, minutes)` for each leg mode, in `LEG_MODES` order.
    pub fn iter(&self) -> impl Iterator<Item = (TransportMode, f64)> + '_ {
        TransportMode::LEG_MODES.iter().zip(self.0.iter()).map(|(&m, &v)| (m, v))
    }
}
