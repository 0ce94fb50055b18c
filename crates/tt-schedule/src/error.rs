use thiserror::Error;

use tt_core::CoreError;

#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error("schedule parse error: {0}")]
    Parse(String),

    #[error("building {building} is referenced but not defined")]
    UnknownBuilding { building: u64 },

    #[error("building {building} is defined twice")]
    DuplicateBuilding { building: u64 },

    #[error("agent {agent} is referenced but not defined")]
    UnknownAgent { agent: u64 },

    #[error("agent ids must be dense 0..n: expected {expected}, found {found}")]
    AgentIdsNotDense { expected: u64, found: u64 },

    #[error("agent {agent} has two trips with sequence number {seq}")]
    DuplicateTrip { agent: u64, seq: u32 },

    #[error("agent {agent} trip {seq}: {source}")]
    Mode {
        agent: u64,
        seq: u32,
        #[source]
        source: CoreError,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

pub type ScheduleResult<T> = Result<T, ScheduleError>;
