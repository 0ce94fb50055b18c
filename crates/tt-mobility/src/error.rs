use thiserror::Error;

use tt_core::AgentId;

#[derive(Debug, Error)]
pub enum MobilityError {
    #[error("{0} is already traveling")]
    AlreadyTraveling(AgentId),

    #[error("{0} is not traveling")]
    NotTraveling(AgentId),

    #[error("{agent} trip {seq} has no route")]
    Unroutable { agent: AgentId, seq: u32 },
}

pub type MobilityResult<T> = Result<T, MobilityError>;
