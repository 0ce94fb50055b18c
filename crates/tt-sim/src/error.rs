use thiserror::Error;
use tt_core::{AgentId, CoreError};
use tt_mobility::MobilityError;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("simulation configuration error: {0}")]
    Config(#[from] CoreError),

    #[error("{what} length {got} does not match agent count {expected}")]
    AgentCountMismatch {
        expected: usize,
        got:      usize,
        what:     &'static str,
    },

    #[error("dispatch table covers {table} ticks but the run has {config}")]
    HorizonMismatch { table: u64, config: u64 },

    #[error("dispatch table references trip {trip} of agent {agent:?}, which does not exist")]
    UnknownTrip { agent: AgentId, trip: u32 },

    #[error("mobility error: {0}")]
    Mobility(#[from] MobilityError),
}

pub type SimResult<T> = Result<T, SimError>;
