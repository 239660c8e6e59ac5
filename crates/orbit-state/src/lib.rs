//! orbit-state — authoritative state store for the Orbit control plane.
//!
//! Holds the cluster's pod and node records and enforces every lifecycle
//! invariant, so that no caller can corrupt state regardless of write
//! ordering. The placement loop and the node agents coordinate purely
//! through reads and writes against this store.
//!
//! # Architecture
//!
//! ```text
//! Store (capability trait)
//!   └── MemoryStore
//!       ├── pods:  BTreeMap<"{namespace}/{name}", Pod>
//!       └── nodes: BTreeMap<name, Node>
//! ```
//!
//! A single `RwLock` guards the whole store: reads proceed concurrently
//! with other reads, every write is exclusive. Listing order is the
//! `BTreeMap` key order (lexicographic), which keeps round-robin placement
//! and per-tick processing deterministic across ticks.

pub mod error;
pub mod memory;
pub mod store;
pub mod types;

pub use error::{StateError, StateResult};
pub use memory::MemoryStore;
pub use store::Store;
pub use types::*;
