//! Spatial-subsystem error type.

use thiserror::Error;

use tt_core::{CoreError, NodeId, TransportMode};

/// Errors produced by `tt-spatial`.
///
/// Routing failures (`NoRoute`, `NoAccess`, `NoTransfer`, `WalkOutOfRange`,
/// `SearchBudgetExceeded`) are consumed by the fallback chain and never
/// escape [`Router::route`](crate::Router::route); the remaining variants are
/// load-time errors.
#[derive(Debug, Error)]
pub enum SpatialError {
    #[error("no {mode} route from {from} to {to}")]
    NoRoute { mode: TransportMode, from: NodeId, to: NodeId },

    #[error("endpoint has no access node on the {mode} network")]
    NoAccess { mode: TransportMode },

    #[error("no transfer stop connects origin and destination")]
    NoTransfer,

    #[error("walk of {distance_m:.0} m exceeds the walk threshold")]
    WalkOutOfRange { distance_m: f32 },

    #[error("shortest-path search settled more than {budget} nodes")]
    SearchBudgetExceeded { budget: usize },

    #[error("node {0} not found in network")]
    NodeNotFound(NodeId),

    #[error("invalid configuration: {0}")]
    Config(#[from] CoreError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

pub type SpatialResult<T> = Result<T, SpatialError>;
