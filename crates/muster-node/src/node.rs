//! Muster Node - the main application entry point.
//!
//! Architecture:
//! - Single daemon process owning one [`FormationEngine`] backed by RocksDB
//! - HTTP API for the registration push and the chat command dispatcher
//! - Unix admin socket for local organizer ops (muster-admin CLI)

use crate::admin_socket::AdminSocket;
use crate::api;
use crate::error::{Error, Result};
use crate::roster_csv::{self, RosterColumns};
use crate::storage::Storage;
use muster_core::{EngineConfig, FormationEngine};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Configuration for a Muster node.
#[derive(Debug, Clone)]
pub struct NodeConfig {
    /// Data directory for storage
    pub data_dir: PathBuf,

    /// HTTP API listen address
    pub api_addr: SocketAddr,

    /// Pre-shared key for `/api/v1`; every request is refused when unset
    pub api_key: Option<String>,

    /// Admin socket path (for muster-admin CLI)
    pub admin_socket: PathBuf,

    /// Registration export loaded when the roster is empty
    pub roster_csv: Option<PathBuf>,

    /// Column names in registration exports
    pub roster_columns: RosterColumns,

    /// Formation rules
    pub engine: EngineConfig,
}

impl NodeConfig {
    /// Create config from environment variables with sensible defaults.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create config from any key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let data_dir = PathBuf::from(var("MUSTER_DATA_DIR").unwrap_or_else(|| "./muster-data".to_string()));

        let api_addr = var("MUSTER_API_ADDR")
            .unwrap_or_else(|| "0.0.0.0:8080".to_string())
            .parse()
            .map_err(|e| Error::Config(format!("Invalid MUSTER_API_ADDR: {}", e)))?;

        let admin_socket = var("MUSTER_ADMIN_SOCKET")
            .map(PathBuf::from)
            .unwrap_or_else(|| data_dir.join("admin.sock"));

        let mut engine = EngineConfig::default();
        if let Some(size) = var("MUSTER_MAX_TEAM_SIZE") {
            engine.max_team_size = size
                .trim()
                .parse()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| Error::Config(format!("Invalid MUSTER_MAX_TEAM_SIZE: {}", size)))?;
        }

        let defaults = RosterColumns::default();
        let roster_columns = RosterColumns {
            email: var("MUSTER_ROSTER_EMAIL_COLUMN").unwrap_or(defaults.email),
            handle: var("MUSTER_ROSTER_HANDLE_COLUMN").unwrap_or(defaults.handle),
        };

        Ok(Self {
            api_key: var("MUSTER_API_KEY"),
            roster_csv: var("MUSTER_ROSTER_CSV").map(PathBuf::from),
            data_dir,
            api_addr,
            admin_socket,
            roster_columns,
            engine,
        })
    }
}

/// Shared state for the HTTP API and admin socket.
pub struct NodeState {
    pub engine: Arc<FormationEngine>,
    pub api_key: Option<String>,
    pub roster_columns: RosterColumns,
}

/// A Muster node instance.
pub struct MusterNode {
    state: Arc<NodeState>,
    config: NodeConfig,
}

impl MusterNode {
    /// Open storage, restore the engine and seed an empty roster.
    pub async fn new(config: NodeConfig) -> Result<Self> {
        std::fs::create_dir_all(&config.data_dir)?;

        let storage = Arc::new(Storage::open(config.data_dir.join("db"))?);
        let engine = Arc::new(FormationEngine::new(config.engine.clone(), storage)?);

        if let Some(path) = &config.roster_csv {
            if engine.registrant_count().await == 0 {
                let loaded = roster_csv::import_roster(&engine, path, &config.roster_columns).await?;
                tracing::info!("[Participant Records] seeded {} records from {:?}", loaded, path);
            }
        }

        if config.api_key.is_none() {
            tracing::warn!("MUSTER_API_KEY is not set; API requests will be refused");
        }

        let state = Arc::new(NodeState {
            engine,
            api_key: config.api_key.clone(),
            roster_columns: config.roster_columns.clone(),
        });

        Ok(Self { state, config })
    }

    /// Get the shared state (for API handlers).
    pub fn state(&self) -> Arc<NodeState> {
        Arc::clone(&self.state)
    }

    /// Run the node (starts admin socket and HTTP server).
    pub async fn run(self) -> Result<()> {
        tracing::info!("Muster node starting");
        tracing::info!("  API: http://{}", self.config.api_addr);
        tracing::info!("  Admin: {:?}", self.config.admin_socket);
        tracing::info!("  Data: {:?}", self.config.data_dir);

        let admin_socket = AdminSocket::new(self.state(), &self.config.admin_socket);
        tokio::spawn(async move {
            if let Err(e) = admin_socket.run().await {
                tracing::error!("Admin socket error: {}", e);
            }
        });

        let app = api::build_router(self.state()).layer(TraceLayer::new_for_http());

        let listener = tokio::net::TcpListener::bind(self.config.api_addr).await?;
        tracing::info!("HTTP server listening on {}", self.config.api_addr);

        axum::serve(listener, app).await?;

        Ok(())
    }
}
