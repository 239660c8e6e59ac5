//! Node agent — registers a node and reconciles its assigned pods.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, info, warn};

use orbit_state::{Node, NodeStatus, Pod, PodPhase, StateError, Store};

use crate::error::{AgentError, AgentResult};

/// The per-node reconciliation loop.
///
/// Identified by a node name/address pair fixed at startup. The agent is
/// otherwise stateless: everything it needs is re-read from the store on
/// each tick.
pub struct NodeAgent {
    store: Arc<dyn Store>,
    name: String,
    address: String,
    /// Namespace the agent reconciles in.
    namespace: String,
}

impl NodeAgent {
    /// Create a new agent for the node `name` at `address`.
    pub fn new(
        store: Arc<dyn Store>,
        name: impl Into<String>,
        address: impl Into<String>,
        namespace: impl Into<String>,
    ) -> Self {
        Self {
            store,
            name: name.into(),
            address: address.into(),
            namespace: namespace.into(),
        }
    }

    /// This agent's node name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Register this agent's node, idempotently.
    ///
    /// Attempts a create; if the node already exists (the agent restarted
    /// and its record survived), falls back to an update that forces
    /// status back to `Ready`. A failure on both paths is returned and
    /// should be treated as fatal by the caller.
    pub fn register(&self) -> AgentResult<()> {
        let node = Node {
            name: self.name.clone(),
            address: self.address.clone(),
            status: NodeStatus::Ready,
        };

        match self.store.create_node(node.clone()) {
            Ok(created) => {
                info!(node = %created.name, address = %created.address, "node registered");
                Ok(())
            }
            Err(StateError::AlreadyExists(_)) => {
                self.store
                    .update_node(node)
                    .map_err(AgentError::Registration)?;
                info!(node = %self.name, "existing node updated to ready");
                Ok(())
            }
            Err(e) => Err(AgentError::Registration(e)),
        }
    }

    /// Run one reconciliation tick over the pods assigned to this node.
    ///
    /// A per-pod write failure is logged and the tick proceeds to the
    /// next pod; convergence relies on the next tick.
    pub fn sync_once(&self) -> AgentResult<()> {
        let pods = self.store.list_pods(&self.namespace)?;
        for pod in pods {
            if pod.node_name == self.name {
                self.sync_pod(pod);
            }
        }
        Ok(())
    }

    /// Advance a single assigned pod one lifecycle step.
    fn sync_pod(&self, mut pod: Pod) {
        let key = pod.key();

        // A deletion marker overrides the phase dispatch: whatever the pod
        // was doing, it is now logically "to be torn down".
        if pod.deletion_timestamp.is_some() {
            if pod.phase.is_terminal() {
                debug!(node = %self.name, pod = %key, phase = ?pod.phase, "terminating pod already closed");
                return;
            }
            info!(node = %self.name, pod = %key, "tearing down terminating pod");
            pod.phase = PodPhase::Deleted;
            if let Err(e) = self.store.update_pod(pod) {
                warn!(node = %self.name, pod = %key, error = %e, "failed to mark pod deleted");
            }
            return;
        }

        match pod.phase {
            PodPhase::Scheduled => {
                // Container creation is simulated as an instantaneous
                // transition.
                info!(node = %self.name, pod = %key, image = %pod.image, "starting pod");
                pod.phase = PodPhase::Running;
                if let Err(e) = self.store.update_pod(pod) {
                    warn!(node = %self.name, pod = %key, error = %e, "failed to mark pod running");
                }
            }
            PodPhase::Running => {}
            PodPhase::Terminating => {
                info!(node = %self.name, pod = %key, "closing pod in terminating phase");
                pod.phase = PodPhase::Deleted;
                if let Err(e) = self.store.update_pod(pod) {
                    warn!(node = %self.name, pod = %key, error = %e, "failed to mark pod deleted");
                }
            }
            // Legacy alternate terminating phase.
            PodPhase::Deleting => {
                info!(node = %self.name, pod = %key, "closing pod in legacy deleting phase");
                pod.phase = PodPhase::Succeeded;
                if let Err(e) = self.store.update_pod(pod) {
                    warn!(node = %self.name, pod = %key, error = %e, "failed to mark pod succeeded");
                }
            }
            other if !other.is_terminal() => {
                warn!(node = %self.name, pod = %key, phase = ?other, "pod in unhandled phase");
            }
            _ => {}
        }
    }

    /// Run the reconciliation loop until `shutdown` flips.
    pub async fn run(&self, interval: Duration, mut shutdown: watch::Receiver<bool>) {
        info!(node = %self.name, namespace = %self.namespace, ?interval, "node agent loop started");

        loop {
            tokio::select! {
                _ = tokio::time::sleep(interval) => {
                    if let Err(e) = self.sync_once() {
                        warn!(node = %self.name, error = %e, "sync tick failed");
                    }
                }
                _ = shutdown.changed() => {
                    info!(node = %self.name, "node agent loop shutting down");
                    break;
                }
            }
        }
    }
}
