//! `tt-mobility` — per-agent runtime state and travel transitions.
//!
//! # Crate layout
//!
//! | Module     | Contents                                                   |
//! |------------|------------------------------------------------------------|
//! | [`state`]  | `AgentState`, `AgentStatus`, `ActiveTrip`                  |
//! | [`engine`] | `MobilityEngine` — `depart` / `advance` transitions        |
//! | [`error`]  | `MobilityError`, `MobilityResult<T>`                       |
//!
//! # Movement model
//!
//! A departing agent gets `remaining_ticks = max(1, ceil(total / tick))`.
//! Each subsequent tick removes one tick, moves the agent to the point at
//! `elapsed / total` of its path length, and credits the minutes of the
//! window to the segments they fall in.  When `remaining_ticks` reaches 0 the
//! agent sits exactly on the destination building.
//!
//! Transitions are pure: they take a state by reference and return the
//! successor, so the simulation can run them in parallel over an immutable
//! snapshot.

pub mod engine;
pub mod error;
pub mod state;


pub use engine::MobilityEngine;
pub use error::{MobilityError, MobilityResult};
pub use state::{ActiveTrip, AgentState, AgentStatus};
