use thiserror::Error;

#[derive(Error, Debug)]
pub enum SieveError {
    #[error("Invalid worker count: {0} (must be >= 1)")]
    InvalidWorkerCount(usize),

    #[error("Invalid minimum number of observations: {0} (must be >= 1)")]
    InvalidMinObs(usize),

    #[error("Invalid minimum number of nights: {0} (must be >= 1)")]
    InvalidMinNights(usize),

    #[error("Invalid tracklet filter parameter: {0}")]
    InvalidFilterParameter(String),

    #[error("Invalid detection window parameter: {0}")]
    InvalidWindowParameter(String),

    #[error("Invalid calendar date: {0}")]
    InvalidCalendarDate(String),

    #[error("Unable to build the worker pool: {0}")]
    ThreadPoolBuild(String),

    #[error("Worker failed on partition {partition}: {reason}")]
    WorkerFailed { partition: usize, reason: String },

    #[error("Observation table is not in canonical (object, time) order at row {row}")]
    UnsortedTable { row: usize },
}

impl From<rayon::ThreadPoolBuildError> for SieveError {
    fn from(err: rayon::ThreadPoolBuildError) -> Self {
        SieveError::ThreadPoolBuild(err.to_string())
    }
}

impl PartialEq for SieveError {
    fn eq(&self, other: &Self) -> bool {
        use SieveError::*;
        match (self, other) {
            (InvalidWorkerCount(a), InvalidWorkerCount(b)) => a == b,
            (InvalidMinObs(a), InvalidMinObs(b)) => a == b,
            (InvalidMinNights(a), InvalidMinNights(b)) => a == b,
            (InvalidFilterParameter(a), InvalidFilterParameter(b)) => a == b,
            (InvalidWindowParameter(a), InvalidWindowParameter(b)) => a == b,
            (InvalidCalendarDate(a), InvalidCalendarDate(b)) => a == b,

            // Pool errors carry an opaque message: same variant is enough
            (ThreadPoolBuild(_), ThreadPoolBuild(_)) => true,

            (
                WorkerFailed {
                    partition: pa,
                    reason: ra,
                },
                WorkerFailed {
                    partition: pb,
                    reason: rb,
                },
            ) => pa == pb && ra == rb,
            (UnsortedTable { row: a }, UnsortedTable { row: b }) => a == b,

            _ => false,
        }
    }
}
