//! `tt-schedule` — buildings, roster, routing pass, and trip dispatch.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                   |
//! |---------------|------------------------------------------------------------|
//! | [`roster`]    | `Building`, `BuildingTable`, `ActivityRegistry`, `Roster`  |
//! | [`trip`]      | `TripRequest`, `Trip`, `TripRouting`                       |
//! | [`loader`]    | `buildings.csv`, `agents.csv`, `trips.csv` loaders         |
//! | [`resolve`]   | `route_roster`, `RoutingSummary`                           |
//! | [`departure`] | `parse_departure` (`HH:MM`, `HH:MM:SS`, `HHMM`)            |
//! | [`dispatch`]  | `DispatchTable`, `TripRef`, `ScheduleIssue`                |
//! | [`error`]     | `ScheduleError`, `ScheduleResult<T>`                       |
//!
//! # Pipeline
//!
//! ```text
//! load buildings → resolve access nodes → load roster
//!     → route_roster (Vec<Vec<Trip>>) → DispatchTable::build
//! ```
//!
//! # Feature flags
//!
//! | Flag       | Effect                                                  |
//! |------------|---------------------------------------------------------|
//! | `parallel` | Routing pass and departure parsing run on Rayon.        |

pub mod departure;
pub mod dispatch;
pub mod error;
pub mod loader;
pub mod resolve;
pub mod roster;
pub mod trip;


pub use departure::parse_departure;
pub use dispatch::{DispatchTable, IssueReason, ScheduleIssue, TripRef};
pub use error::{ScheduleError, ScheduleResult};
pub use loader::{load_buildings_csv, load_buildings_reader, load_roster_csv, load_roster_reader};
pub use resolve::{RoutingSummary, route_roster};
pub use roster::{ActivityRegistry, Building, BuildingTable, Roster};
pub use trip::{Trip, TripRequest, TripRouting};
