//! Node agent error types.

use thiserror::Error;

use orbit_state::StateError;

/// Errors that can occur in the node agent.
#[derive(Debug, Error)]
pub enum AgentError {
    /// Registration failed on both the create and the update path.
    /// Fatal to the owning process.
    #[error("node registration failed: {0}")]
    Registration(#[source] StateError),

    #[error("state store error: {0}")]
    State(#[from] StateError),
}

pub type AgentResult<T> = Result<T, AgentError>;
