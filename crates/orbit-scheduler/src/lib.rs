//! orbit-scheduler — the placement loop.
//!
//! Polls the state store for pending pods and ready nodes, assigns nodes
//! round-robin, and writes the assignment back. Coordination with the
//! node agents happens only through the store: a rejected write is logged
//! and skipped, and convergence relies on the next tick re-observing
//! current state.
//!
//! # Architecture
//!
//! ```text
//! Scheduler
//!   ├── Arc<dyn Store> (read Pending pods + Ready nodes, write assignments)
//!   └── RoundRobinCursor (instance-scoped placement cursor)
//! ```

pub mod cursor;
pub mod error;
pub mod scheduler;

pub use cursor::RoundRobinCursor;
pub use error::{SchedulerError, SchedulerResult};
pub use scheduler::Scheduler;
