//! `tt-core` — foundational types for the `transit_twin` day simulator.
//!
//! This crate is a dependency of every other `tt-*` crate.  It intentionally
//! has no `tt-*` dependencies and minimal external ones (only `thiserror`,
//! plus optional `serde`).
//!
//! # What lives here
//!
//! | Module          | Contents                                                   |
//! |-----------------|------------------------------------------------------------|
//! | [`ids`]         | `AgentId`, `NodeId`, `EdgeId`, `BuildingId`, `ZoneId`, `ActivityId`, `StopId` |
//! | [`geo`]         | `GeoPoint`, haversine distance, `Polyline`                 |
//! | [`time`]        | `Tick`, `SimClock`, `SimConfig`                            |
//! | [`transport`]   | `TransportMode`, `ModalMinutes`                            |
//! | [`error`]       | `CoreError`, `CoreResult`                                  |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |
//!           | Required to read run configuration from JSON.              |

pub mod error;
pub mod geo;
pub mod ids;
pub mod time;
pub mod transport;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use error::{CoreError, CoreResult};
pub use geo::{GeoPoint, Polyline};
pub use ids::{ActivityId, AgentId, BuildingId, EdgeId, NodeId, StopId, ZoneId};
pub use time::{SimClock, SimConfig, Tick};
pub use transport::{ModalMinutes, TransportMode};
