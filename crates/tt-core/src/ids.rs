//! Strongly typed identifier wrappers.
//!
//! Dense ids are `Copy + Ord + Hash` integers usable as `Vec` indices via
//! `.index()`.  Transit stops keep their external string id ([`StopId`])
//! because the same stop id appearing in two networks is what makes it a
//! transfer point.

use std::fmt;

/// Generate a typed ID wrapper around a primitive integer.
macro_rules! typed_id {
    ($(#[$attr:meta])* $vis:vis struct $name:ident($inner:ty);) => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        $vis struct $name(pub $inner);

        impl $name {
            /// Sentinel meaning "no valid ID".
            pub const INVALID: $name = $name(<$inner>::MAX);

            /// Cast to `usize` for direct use as a `Vec` index.
            #[inline(always)]
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl Default for $name {
            /// Returns the `INVALID` sentinel so uninitialized IDs are visibly invalid.
            #[inline(always)]
            fn default() -> Self {
                Self::INVALID
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl From<$name> for usize {
            #[inline(always)]
            fn from(id: $name) -> usize {
                id.0 as usize
            }
        }

        impl TryFrom<usize> for $name {
            type Error = std::num::TryFromIntError;
            fn try_from(n: usize) -> Result<$name, Self::Error> {
                <$inner>::try_from(n).map($name)
            }
        }
    };
}

typed_id! {
    /// Index of an agent in the roster.  Agent ids are dense `0..n`.
    pub struct AgentId(u32);
}

typed_id! {
    /// Index of a node inside one transport graph.  Only meaningful together
    /// with the graph that issued it.
    pub struct NodeId(u32);
}

typed_id! {
    /// Index of a directed edge inside one transport graph.
    pub struct EdgeId(u32);
}

typed_id! {
    /// Dense index of a building in the building table.
    pub struct BuildingId(u32);
}

typed_id! {
    /// Analysis zone a building belongs to (supplied upstream).
    pub struct ZoneId(u32);
}

typed_id! {
    /// Index of an activity label (trip purpose) in the activity registry.
    /// `ActivityId(0)` is always `home`.
    pub struct ActivityId(u16);
}

impl ActivityId {
    pub const HOME: ActivityId = ActivityId(0);
}

// ── StopId ────────────────────────────────────────────────────────────────────

/// External identifier of a transit stop (e.g. a GTFS `stop_id`).
///
/// Ordered lexicographically; the ordering is used for deterministic
/// transfer-node tie-breaking.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StopId(pub String);

impl StopId {
    pub fn new(id: impl Into<String>) -> Self {
        StopId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for StopId {
    fn from(s: &str) -> Self {
        StopId(s.to_owned())
    }
}

impl fmt::Display for StopId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
