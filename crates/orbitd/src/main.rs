//! orbitd — the Orbit daemon.
//!
//! Single binary that assembles the control plane:
//! - In-memory state store
//! - Placement loop
//! - One node agent per `--node`
//!
//! # Usage
//!
//! ```text
//! orbitd standalone --node n1=10.0.0.1:10250 --node n2=10.0.0.2:10250
//! ```

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use tokio::sync::watch;
use tracing::info;

use orbit_agent::NodeAgent;
use orbit_scheduler::Scheduler;
use orbit_state::{DEFAULT_NAMESPACE, MemoryStore, Store};

/// Address a node advertises when the spec does not name one.
const DEFAULT_NODE_ADDRESS: &str = "localhost:10250";

#[derive(Parser)]
#[command(name = "orbitd", about = "Orbit control plane daemon")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the control plane and a set of node agents in one process.
    Standalone {
        /// Node agent to run, as `name=address` (repeatable).
        #[arg(long = "node", value_name = "NAME=ADDRESS", required = true)]
        nodes: Vec<String>,

        /// Namespace the loops operate in.
        #[arg(long, default_value = DEFAULT_NAMESPACE)]
        namespace: String,

        /// Placement loop interval in seconds.
        #[arg(long, default_value = "5")]
        schedule_interval: u64,

        /// Node agent sync interval in seconds.
        #[arg(long, default_value = "10")]
        sync_interval: u64,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,orbitd=debug".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Standalone {
            nodes,
            namespace,
            schedule_interval,
            sync_interval,
        } => {
            run_standalone(
                nodes,
                namespace,
                Duration::from_secs(schedule_interval),
                Duration::from_secs(sync_interval),
            )
            .await
        }
    }
}

/// Parse a `name=address` node spec; a bare name gets the default address.
fn parse_node_spec(spec: &str) -> anyhow::Result<(String, String)> {
    let (name, address) = match spec.split_once('=') {
        Some((name, address)) => (name, address),
        None => (spec, DEFAULT_NODE_ADDRESS),
    };
    if name.is_empty() {
        bail!("node name must be specified in --node {spec:?}");
    }
    Ok((name.to_string(), address.to_string()))
}

async fn run_standalone(
    node_specs: Vec<String>,
    namespace: String,
    schedule_interval: Duration,
    sync_interval: Duration,
) -> anyhow::Result<()> {
    info!("orbit daemon starting in standalone mode");

    let store: Arc<dyn Store> = Arc::new(MemoryStore::new());

    let scheduler = Scheduler::new(store.clone(), namespace.clone());

    let mut agents = Vec::new();
    for spec in &node_specs {
        let (name, address) = parse_node_spec(spec)?;
        let agent = NodeAgent::new(store.clone(), name, address, namespace.clone());
        agent
            .register()
            .with_context(|| format!("registering node {}", agent.name()))?;
        agents.push(agent);
    }
    info!(nodes = agents.len(), namespace = %namespace, "node agents registered");

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let mut handles = Vec::new();
    let scheduler_shutdown = shutdown_rx.clone();
    handles.push(tokio::spawn(async move {
        scheduler.run(schedule_interval, scheduler_shutdown).await;
    }));
    for agent in agents {
        let agent_shutdown = shutdown_rx.clone();
        handles.push(tokio::spawn(async move {
            agent.run(sync_interval, agent_shutdown).await;
        }));
    }

    tokio::signal::ctrl_c()
        .await
        .context("waiting for shutdown signal")?;
    info!("shutdown signal received");

    let _ = shutdown_tx.send(true);
    for handle in handles {
        let _ = handle.await;
    }

    info!("orbit daemon stopped");
    Ok(())
}
