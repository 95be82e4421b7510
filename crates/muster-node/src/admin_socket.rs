//! Unix socket server for admin commands.
//!
//! Provides a local IPC interface for organizers: roster lookups and
//! imports, team listings and the participant export.

use crate::error::Result;
use crate::node::NodeState;
use crate::roster_csv::{self, RosterColumns};
use muster_core::{Email, TeamSpace, UserId};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{UnixListener, UnixStream};

/// Admin command sent over the socket.
#[derive(Debug, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum AdminCommand {
    /// List active teams
    ListTeams,
    /// Team of a platform user
    TeamOf { user: String },
    /// Registrant by email
    Lookup { email: String },
    /// Load a registration export (later rows win)
    ImportRoster {
        path: PathBuf,
        #[serde(default)]
        email_column: Option<String>,
        #[serde(default)]
        handle_column: Option<String>,
    },
    /// Write the participant export to a file
    Export { path: PathBuf },
    /// Ping (health check)
    Ping,
}

/// Response from admin command.
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AdminResponse {
    Ok { message: String },
    Error { error: String },
    List { items: Vec<String> },
    Pong,
}

/// Admin socket server.
pub struct AdminSocket {
    state: Arc<NodeState>,
    socket_path: PathBuf,
}

impl AdminSocket {
    /// Create a new admin socket server.
    pub fn new(state: Arc<NodeState>, socket_path: impl AsRef<Path>) -> Self {
        Self {
            state,
            socket_path: socket_path.as_ref().to_path_buf(),
        }
    }

    /// Run the admin socket server.
    pub async fn run(&self) -> Result<()> {
        // Remove existing socket file if present
        let _ = std::fs::remove_file(&self.socket_path);

        let listener = UnixListener::bind(&self.socket_path)?;
        tracing::info!("Admin socket listening on {:?}", self.socket_path);

        loop {
            match listener.accept().await {
                Ok((stream, _)) => {
                    let state = Arc::clone(&self.state);
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(stream, state).await {
                            tracing::error!("Admin connection error: {}", e);
                        }
                    });
                }
                Err(e) => {
                    tracing::error!("Failed to accept admin connection: {}", e);
                }
            }
        }
    }

    /// Get the socket path.
    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }
}

async fn handle_connection(stream: UnixStream, state: Arc<NodeState>) -> Result<()> {
    let (reader, mut writer) = stream.into_split();
    let mut reader = BufReader::new(reader);
    let mut line = String::new();

    while reader.read_line(&mut line).await? > 0 {
        let response = match serde_json::from_str::<AdminCommand>(&line) {
            Ok(cmd) => execute_command(cmd, &state).await,
            Err(e) => AdminResponse::Error {
                error: format!("Invalid command: {}", e),
            },
        };

        let response_json = serde_json::to_string(&response)? + "\n";
        writer.write_all(response_json.as_bytes()).await?;
        line.clear();
    }

    Ok(())
}

async fn execute_command(cmd: AdminCommand, state: &NodeState) -> AdminResponse {
    let engine = &state.engine;
    match cmd {
        AdminCommand::ListTeams => {
            let items = engine
                .teams()
                .await
                .iter()
                .map(|team| {
                    format!(
                        "{}\t{}\t{}",
                        TeamSpace::for_team(team).category,
                        team.size(),
                        team.members
                            .iter()
                            .map(UserId::as_str)
                            .collect::<Vec<_>>()
                            .join(",")
                    )
                })
                .collect();
            AdminResponse::List { items }
        }

        AdminCommand::TeamOf { user } => match engine.team_of(&UserId::new(user.clone())).await {
            Some(team) => AdminResponse::Ok {
                message: format!("{} is in {}", user, TeamSpace::for_team(&team).category),
            },
            None => AdminResponse::Error {
                error: format!("{} is not in a team", user),
            },
        },

        AdminCommand::Lookup { email } => {
            let email = Email::new(&email);
            match engine.lookup_registrant(&email).await {
                Some(record) => AdminResponse::Ok {
                    message: format!("{} <{}>", record.handle, record.email),
                },
                None => AdminResponse::Error {
                    error: format!("No registrant with email {}", email),
                },
            }
        }

        AdminCommand::ImportRoster {
            path,
            email_column,
            handle_column,
        } => {
            let columns = RosterColumns {
                email: email_column.unwrap_or_else(|| state.roster_columns.email.clone()),
                handle: handle_column.unwrap_or_else(|| state.roster_columns.handle.clone()),
            };
            match roster_csv::import_roster(engine, &path, &columns).await {
                Ok(loaded) => {
                    tracing::info!("[Participant Records] imported {} records from {:?}", loaded, path);
                    AdminResponse::Ok {
                        message: format!("Imported {} records from {}", loaded, path.display()),
                    }
                }
                Err(e) => AdminResponse::Error {
                    error: e.to_string(),
                },
            }
        }

        AdminCommand::Export { path } => {
            let rows = engine.export_participants().await;
            match roster_csv::write_export(&path, &rows) {
                Ok(written) => {
                    tracing::info!("[Export Data] wrote {} participants to {:?}", written, path);
                    AdminResponse::Ok {
                        message: format!("Exported {} participants to {}", written, path.display()),
                    }
                }
                Err(e) => AdminResponse::Error {
                    error: e.to_string(),
                },
            }
        }

        AdminCommand::Ping => AdminResponse::Pong,
    }
}
