//! orbit-agent — the per-node reconciliation loop.
//!
//! One `NodeAgent` runs per worker node. On startup it registers its node
//! record (idempotently, so a restarted agent self-heals), then polls the
//! store for pods assigned to it, advancing each through simulated
//! execution and termination phases. It never talks to the placement
//! loop directly; all coordination is through the store.

pub mod agent;
pub mod error;

pub use agent::NodeAgent;
pub use error::{AgentError, AgentResult};
