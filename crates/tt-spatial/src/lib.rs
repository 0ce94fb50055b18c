//! `tt-spatial` — transport graphs, mode weighting, and multi-modal routing.
//!
//! # Crate layout
//!
//! | Module         | Contents                                                     |
//! |----------------|--------------------------------------------------------------|
//! | [`network`]    | `TransportGraph` (CSR + R-tree), `GraphBuilder`, `NetworkProfile` |
//! | [`gtfs`]       | `stops.csv` / `stop_times.csv` loader                        |
//! | [`context`]    | `NetworkContext` (road + rail + transfer table), `NetworkAccess` |
//! | [`weighting`]  | `WeightingPolicy`, `ModeWeighting` (preference-weighted view) |
//! | [`search`]     | Dijkstra internals: point search and search trees           |
//! | [`multimodal`] | best single-transfer road/rail journey                      |
//! | [`route`]      | `RouteSegment`, `ResolvedRoute`, `RouteOutcome`             |
//! | [`router`]     | `Router` trait, `DijkstraRouter`, `RoutingConfig`           |
//! | [`error`]      | `SpatialError`, `SpatialResult<T>`                          |
//!
//! Configuration types (`NetworkProfile`, `WeightingPolicy`, `RoutingConfig`)
//! implement `serde::Deserialize` so applications can embed them in a run
//! config file.

pub mod context;
pub mod error;
pub mod gtfs;
pub mod multimodal;
pub mod network;
pub mod route;
pub mod router;
pub mod search;
pub mod weighting;

#[cfg(test)]
mod tests;

pub use context::{NetworkAccess, NetworkContext, Transfer};
pub use error::{SpatialError, SpatialResult};
pub use gtfs::{load_network_dir, load_network_readers};
pub use network::{GraphBuilder, NetworkProfile, TransportGraph};
pub use route::{Resolution, ResolvedRoute, RouteOutcome, RouteSegment, Waypoint};
pub use router::{DijkstraRouter, Endpoint, RouteRequest, Router, RoutingConfig};
pub use search::{Direction, Path, SearchTree};
pub use weighting::{ModeWeighting, WeightingPolicy};
