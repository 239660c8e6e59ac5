//! Placement loop — assigns pending pods to ready nodes.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, info, warn};

use orbit_state::{NodeStatus, PodPhase, Store};

use crate::cursor::RoundRobinCursor;
use crate::error::SchedulerResult;

/// The placement loop.
///
/// Each tick takes two independent snapshots — pending pods and ready
/// nodes — and assigns a node to every eligible pod, round-robin over the
/// tick-start node snapshot. Node-readiness changes that occur mid-tick
/// are not honored until the following tick.
pub struct Scheduler {
    store: Arc<dyn Store>,
    /// Namespace the loop schedules in.
    namespace: String,
    /// Placement cursor, owned by this instance.
    cursor: RoundRobinCursor,
}

impl Scheduler {
    /// Create a new placement loop over the given store.
    pub fn new(store: Arc<dyn Store>, namespace: impl Into<String>) -> Self {
        Self {
            store,
            namespace: namespace.into(),
            cursor: RoundRobinCursor::new(),
        }
    }

    /// Run one placement tick. Returns the number of pods assigned.
    ///
    /// A write rejected by the store (e.g. the pod was concurrently
    /// deleted) is logged and skipped — no intra-tick retry.
    pub fn schedule_once(&self) -> SchedulerResult<usize> {
        let pending: Vec<_> = self
            .store
            .list_pods(&self.namespace)?
            .into_iter()
            .filter(|pod| pod.phase == PodPhase::Pending)
            .collect();
        if pending.is_empty() {
            debug!(namespace = %self.namespace, "no pending pods");
            return Ok(0);
        }

        let ready: Vec<_> = self
            .store
            .list_nodes()?
            .into_iter()
            .filter(|node| node.status == NodeStatus::Ready)
            .collect();
        if ready.is_empty() {
            debug!(pending = pending.len(), "no ready nodes to schedule onto");
            return Ok(0);
        }

        let mut assigned = 0;
        for mut pod in pending {
            if pod.deletion_timestamp.is_some() {
                debug!(pod = %pod.key(), "pending pod is marked for deletion, skipping");
                continue;
            }

            let Some(idx) = self.cursor.next(ready.len()) else {
                break;
            };
            let node = &ready[idx];

            let key = pod.key();
            pod.node_name = node.name.clone();
            pod.phase = PodPhase::Scheduled;
            match self.store.update_pod(pod) {
                Ok(()) => {
                    info!(pod = %key, node = %node.name, "pod scheduled");
                    assigned += 1;
                }
                Err(e) => {
                    warn!(pod = %key, node = %node.name, error = %e, "failed to schedule pod");
                }
            }
        }
        Ok(assigned)
    }

    /// Run the placement loop until `shutdown` flips.
    pub async fn run(&self, interval: Duration, mut shutdown: watch::Receiver<bool>) {
        info!(namespace = %self.namespace, ?interval, "placement loop started");

        loop {
            tokio::select! {
                _ = tokio::time::sleep(interval) => {
                    match self.schedule_once() {
                        Ok(0) => {}
                        Ok(n) => debug!(assigned = n, "placement tick complete"),
                        Err(e) => warn!(error = %e, "placement tick failed"),
                    }
                }
                _ = shutdown.changed() => {
                    info!("placement loop shutting down");
                    break;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use orbit_state::{MemoryStore, Node, Pod};

    fn test_store() -> Arc<MemoryStore> {
        Arc::new(MemoryStore::new())
    }

    fn test_pod(name: &str) -> Pod {
        Pod {
            name: name.to_string(),
            namespace: "default".to_string(),
            image: "nginx".to_string(),
            node_name: String::new(),
            phase: PodPhase::Pending,
            deletion_timestamp: None,
        }
    }

    fn test_node(name: &str, status: NodeStatus) -> Node {
        Node {
            name: name.to_string(),
            address: "10.0.0.1:10250".to_string(),
            status,
        }
    }

    #[test]
    fn assigns_round_robin_in_submission_order() {
        let store = test_store();
        store.create_node(test_node("n0", NodeStatus::Ready)).unwrap();
        store.create_node(test_node("n1", NodeStatus::Ready)).unwrap();
        store.create_pod(test_pod("pod-a")).unwrap();
        store.create_pod(test_pod("pod-b")).unwrap();
        store.create_pod(test_pod("pod-c")).unwrap();

        let scheduler = Scheduler::new(store.clone(), "default");
        assert_eq!(scheduler.schedule_once().unwrap(), 3);

        // Listing order is lexicographic by name, so assignment alternates
        // n0, n1, n0 across pod-a, pod-b, pod-c.
        let pods = store.list_pods("default").unwrap();
        let assigned: Vec<(&str, &str)> = pods
            .iter()
            .map(|p| (p.name.as_str(), p.node_name.as_str()))
            .collect();
        assert_eq!(
            assigned,
            [("pod-a", "n0"), ("pod-b", "n1"), ("pod-c", "n0")]
        );
        assert!(pods.iter().all(|p| p.phase == PodPhase::Scheduled));
    }

    #[test]
    fn cursor_carries_across_ticks() {
        let store = test_store();
        store.create_node(test_node("n0", NodeStatus::Ready)).unwrap();
        store.create_node(test_node("n1", NodeStatus::Ready)).unwrap();
        store.create_pod(test_pod("pod-a")).unwrap();

        let scheduler = Scheduler::new(store.clone(), "default");
        scheduler.schedule_once().unwrap();
        assert_eq!(store.get_pod("default", "pod-a").unwrap().node_name, "n0");

        // The next tick continues from the cursor, not from zero.
        store.create_pod(test_pod("pod-b")).unwrap();
        scheduler.schedule_once().unwrap();
        assert_eq!(store.get_pod("default", "pod-b").unwrap().node_name, "n1");
    }

    #[test]
    fn no_pending_pods_is_a_noop() {
        let store = test_store();
        store.create_node(test_node("n0", NodeStatus::Ready)).unwrap();

        let scheduler = Scheduler::new(store, "default");
        assert_eq!(scheduler.schedule_once().unwrap(), 0);
    }

    #[test]
    fn no_ready_nodes_leaves_pods_pending() {
        let store = test_store();
        store
            .create_node(test_node("n0", NodeStatus::NotReady))
            .unwrap();
        store.create_pod(test_pod("pod-a")).unwrap();

        let scheduler = Scheduler::new(store.clone(), "default");
        assert_eq!(scheduler.schedule_once().unwrap(), 0);
        assert_eq!(
            store.get_pod("default", "pod-a").unwrap().phase,
            PodPhase::Pending
        );
    }

    #[test]
    fn not_ready_nodes_are_excluded_from_the_snapshot() {
        let store = test_store();
        store.create_node(test_node("n0", NodeStatus::NotReady)).unwrap();
        store.create_node(test_node("n1", NodeStatus::Ready)).unwrap();
        store.create_pod(test_pod("pod-a")).unwrap();
        store.create_pod(test_pod("pod-b")).unwrap();

        let scheduler = Scheduler::new(store.clone(), "default");
        scheduler.schedule_once().unwrap();

        for pod in store.list_pods("default").unwrap() {
            assert_eq!(pod.node_name, "n1");
        }
    }

    #[test]
    fn pods_marked_for_deletion_are_skipped() {
        let store = test_store();
        store.create_node(test_node("n0", NodeStatus::Ready)).unwrap();
        store.create_pod(test_pod("doomed")).unwrap();
        store.create_pod(test_pod("healthy")).unwrap();
        store.delete_pod("default", "doomed").unwrap();

        let scheduler = Scheduler::new(store.clone(), "default");
        assert_eq!(scheduler.schedule_once().unwrap(), 1);

        let doomed = store.get_pod("default", "doomed").unwrap();
        assert_eq!(doomed.phase, PodPhase::Terminating);
        assert!(doomed.node_name.is_empty());
        assert_eq!(
            store.get_pod("default", "healthy").unwrap().phase,
            PodPhase::Scheduled
        );
    }

    #[test]
    fn scheduler_ignores_other_namespaces() {
        let store = test_store();
        store.create_node(test_node("n0", NodeStatus::Ready)).unwrap();
        store
            .create_pod(Pod {
                namespace: "prod".to_string(),
                ..test_pod("api")
            })
            .unwrap();

        let scheduler = Scheduler::new(store.clone(), "default");
        assert_eq!(scheduler.schedule_once().unwrap(), 0);
        assert_eq!(
            store.get_pod("prod", "api").unwrap().phase,
            PodPhase::Pending
        );
    }
}
