//! Domain types for the Orbit state store.
//!
//! These are the wire types of the control plane: every component — the
//! placement loop, the node agents, and any gateway exposing the store —
//! exchanges whole `Pod` and `Node` records. Field names follow the JSON
//! contract (`nodeName`, `deletionTimestamp`, …).

use serde::{Deserialize, Serialize};

/// Namespace used when a caller does not care about isolation.
pub const DEFAULT_NAMESPACE: &str = "default";

/// Lifecycle phase of a pod.
///
/// `Succeeded`, `Failed`, and `Deleted` are terminal: once reached, the
/// store accepts no further phase change. `Deleting` is a legacy alternate
/// terminating phase still recognized by the node agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PodPhase {
    /// Accepted by the system, not yet assigned to a node.
    Pending,
    /// Assigned to a node, not yet running.
    Scheduled,
    /// Simulated containers are up on the assigned node.
    Running,
    /// Marked for deletion; moving toward closure.
    Terminating,
    /// Legacy alternate terminating phase.
    Deleting,
    Succeeded,
    Failed,
    /// Resources reclaimed by the node agent.
    Deleted,
}

impl PodPhase {
    /// True for phases that accept no further phase change.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed | Self::Deleted)
    }
}

/// Readiness of a worker node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeStatus {
    Ready,
    NotReady,
}

/// Minimal workload unit, identified by `(namespace, name)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pod {
    pub name: String,
    pub namespace: String,
    /// Opaque image reference; never interpreted by the control plane.
    pub image: String,
    /// Empty until the placement loop assigns a node.
    #[serde(default)]
    pub node_name: String,
    pub phase: PodPhase,
    /// Soft-delete marker (unix seconds). Immutable once set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deletion_timestamp: Option<u64>,
}

impl Pod {
    /// Composite key for the pod table.
    pub fn key(&self) -> String {
        pod_key(&self.namespace, &self.name)
    }
}

/// Build the composite pod key from its identity parts.
pub fn pod_key(namespace: &str, name: &str) -> String {
    format!("{namespace}/{name}")
}

/// A worker unit capable of hosting pods, identified by name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub name: String,
    /// Opaque address string (ip:port or hostname).
    pub address: String,
    pub status: NodeStatus,
}
