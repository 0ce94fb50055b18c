//! Framework error type.
//!
//! Sub-crates define their own error enums and wrap `CoreError` as one
//! variant where configuration or parsing failures can surface.

use thiserror::Error;

/// The top-level error type for `tt-core` and a common base for sub-crates.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Invalid tick length, duration, weighting table, …  Fatal at startup.
    #[error("configuration error: {0}")]
    Config(String),

    #[error("unknown transport mode {0:?}")]
    UnknownMode(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Shorthand result type for all `tt-*` crates.
pub type CoreResult<T> = Result<T, CoreError>;
