//! Scheduler error types.

use thiserror::Error;

/// Errors that can occur during a placement tick.
#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("state store error: {0}")]
    State(#[from] orbit_state::StateError),
}

pub type SchedulerResult<T> = Result<T, SchedulerError>;
