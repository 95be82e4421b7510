//! Muster Node binary
//!
//! Roster ingestion, team formation commands and organizer tooling for one event.

use muster_node::{MusterNode, NodeConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "muster_node=info,muster_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Muster Node");

    let config = NodeConfig::from_env()?;

    // Create and run node
    let node = MusterNode::new(config).await?;
    node.run().await?;

    Ok(())
}
