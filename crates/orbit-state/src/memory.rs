//! In-memory `Store` backend.
//!
//! A single `RwLock` over both record maps serializes every
//! read-modify-write sequence across the whole store; plain reads may
//! proceed concurrently with other reads but never with an in-flight
//! write. There is no per-resource locking and no version token: two
//! loops racing to update the same pod resolve by whichever write lands
//! last, subject only to the transition validator.

use std::collections::BTreeMap;
use std::sync::RwLock;
use std::time::{SystemTime, UNIX_EPOCH};

use tracing::debug;

use crate::error::{StateError, StateResult};
use crate::store::Store;
use crate::types::{Node, Pod, PodPhase, pod_key};

#[derive(Default)]
struct Inner {
    /// Pods keyed by `{namespace}/{name}`.
    pods: BTreeMap<String, Pod>,
    /// Nodes keyed by name.
    nodes: BTreeMap<String, Node>,
}

/// Thread-safe in-memory state store.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Inner> {
        // A panicked writer cannot leave the maps inconsistent; recover
        // the guard instead of propagating the poison.
        self.inner.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Inner> {
        self.inner.write().unwrap_or_else(|e| e.into_inner())
    }
}

impl Store for MemoryStore {
    fn create_pod(&self, mut pod: Pod) -> StateResult<Pod> {
        if pod.name.is_empty() || pod.namespace.is_empty() {
            return Err(StateError::Validation(
                "pod name and namespace must be provided".to_string(),
            ));
        }

        let mut inner = self.write();
        let key = pod.key();
        if inner.pods.contains_key(&key) {
            return Err(StateError::AlreadyExists(format!("pod {key}")));
        }

        // A new pod always enters the lifecycle at the start, whatever
        // the caller put in these fields.
        pod.phase = PodPhase::Pending;
        pod.node_name.clear();
        pod.deletion_timestamp = None;

        inner.pods.insert(key.clone(), pod.clone());
        debug!(pod = %key, "pod created");
        Ok(pod)
    }

    fn get_pod(&self, namespace: &str, name: &str) -> StateResult<Pod> {
        let inner = self.read();
        let key = pod_key(namespace, name);
        inner
            .pods
            .get(&key)
            .cloned()
            .ok_or_else(|| StateError::NotFound(format!("pod {key}")))
    }

    fn list_pods(&self, namespace: &str) -> StateResult<Vec<Pod>> {
        let inner = self.read();
        Ok(inner
            .pods
            .values()
            .filter(|pod| pod.namespace == namespace)
            .cloned()
            .collect())
    }

    fn update_pod(&self, pod: Pod) -> StateResult<()> {
        let mut inner = self.write();
        let key = pod.key();
        let existing = inner
            .pods
            .get(&key)
            .ok_or_else(|| StateError::NotFound(format!("pod {key}")))?;

        if let Some(marker) = existing.deletion_timestamp {
            // The marker is immutable once set: an update that drops or
            // rewrites it would revive a pod already slated for removal.
            if pod.deletion_timestamp != Some(marker) {
                return Err(StateError::InvalidTransition(format!(
                    "pod {key}: update does not carry the deletion marker of a terminating pod"
                )));
            }
            // A terminating pod may only move toward closure.
            if !matches!(
                pod.phase,
                PodPhase::Succeeded | PodPhase::Failed | PodPhase::Terminating | PodPhase::Deleted
            ) {
                return Err(StateError::InvalidTransition(format!(
                    "pod {key}: cannot move a terminating pod to {:?}; only Succeeded, Failed, Terminating, or Deleted are allowed",
                    pod.phase
                )));
            }
        } else if pod.deletion_timestamp.is_some() {
            // Deletion has a single entry point.
            return Err(StateError::InvalidTransition(format!(
                "pod {key}: to mark a pod for deletion, use delete_pod"
            )));
        }

        if existing.phase.is_terminal() && pod.phase != existing.phase {
            return Err(StateError::InvalidTransition(format!(
                "pod {key}: phase {:?} is terminal",
                existing.phase
            )));
        }

        // Whole-record replace, last writer wins.
        inner.pods.insert(key.clone(), pod);
        debug!(pod = %key, "pod updated");
        Ok(())
    }

    fn delete_pod(&self, namespace: &str, name: &str) -> StateResult<()> {
        let mut inner = self.write();
        let key = pod_key(namespace, name);
        let pod = inner
            .pods
            .get_mut(&key)
            .ok_or_else(|| StateError::NotFound(format!("pod {key}")))?;

        if pod.deletion_timestamp.is_some() {
            return Err(StateError::AlreadyTerminating(format!("pod {key}")));
        }

        pod.deletion_timestamp = Some(epoch_secs());
        pod.phase = PodPhase::Terminating;
        debug!(pod = %key, "pod marked for deletion");
        Ok(())
    }

    fn create_node(&self, node: Node) -> StateResult<Node> {
        if node.name.is_empty() {
            return Err(StateError::Validation(
                "node name must be provided".to_string(),
            ));
        }

        let mut inner = self.write();
        if inner.nodes.contains_key(&node.name) {
            return Err(StateError::AlreadyExists(format!("node {}", node.name)));
        }
        inner.nodes.insert(node.name.clone(), node.clone());
        debug!(node = %node.name, "node created");
        Ok(node)
    }

    fn get_node(&self, name: &str) -> StateResult<Node> {
        let inner = self.read();
        inner
            .nodes
            .get(name)
            .cloned()
            .ok_or_else(|| StateError::NotFound(format!("node {name}")))
    }

    fn list_nodes(&self) -> StateResult<Vec<Node>> {
        let inner = self.read();
        Ok(inner.nodes.values().cloned().collect())
    }

    fn update_node(&self, node: Node) -> StateResult<()> {
        let mut inner = self.write();
        if !inner.nodes.contains_key(&node.name) {
            return Err(StateError::NotFound(format!("node {}", node.name)));
        }
        inner.nodes.insert(node.name.clone(), node);
        Ok(())
    }

    fn delete_node(&self, name: &str) -> StateResult<()> {
        let mut inner = self.write();
        inner
            .nodes
            .remove(name)
            .map(|_| debug!(node = %name, "node deleted"))
            .ok_or_else(|| StateError::NotFound(format!("node {name}")))
    }
}

/// Current unix epoch in seconds.
fn epoch_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
