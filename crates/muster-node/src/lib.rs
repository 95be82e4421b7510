//! Muster Node - the daemon around the formation engine.
//!
//! Binds [`muster_core::FormationEngine`] to the outside world.
//!
//! # Architecture
//!
//! - **Storage**: RocksDB-backed engine persistence
//! - **API**: Registration push, chat command endpoint and team listing
//! - **Roster CSV**: Registration export import and participant export
//! - **Admin Socket**: Unix socket for local organizer commands (muster-admin CLI)
//!
//! # Example
//!
//! ```no_run
//! use muster_node::{MusterNode, NodeConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = NodeConfig::from_env()?;
//!     let node = MusterNode::new(config).await?;
//!     node.run().await?;
//!     Ok(())
//! }
//! ```

pub mod admin_socket;
pub mod api;
pub mod error;
pub mod node;
pub mod roster_csv;
pub mod storage;

pub use error::{Error, Result};
pub use node::{MusterNode, NodeConfig, NodeState};
pub use roster_csv::RosterColumns;
pub use storage::Storage;
