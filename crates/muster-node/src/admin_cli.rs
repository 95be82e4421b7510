//! muster-admin CLI tool
//!
//! Organizer operations against a running muster-node.
//!
//! Usage:
//!   muster-admin list-teams
//!   muster-admin team-of <user_id>
//!   muster-admin lookup <email>
//!   muster-admin import-roster <csv> [email_column handle_column]
//!   muster-admin export <csv>
//!   muster-admin ping

use serde::{Deserialize, Serialize};
use std::io::{BufRead, BufReader, Write};
use std::os::unix::net::UnixStream;
use std::path::PathBuf;

/// Admin command sent over the socket.
#[derive(Debug, Serialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
enum AdminCommand {
    ListTeams,
    TeamOf {
        user: String,
    },
    Lookup {
        email: String,
    },
    ImportRoster {
        path: PathBuf,
        #[serde(skip_serializing_if = "Option::is_none")]
        email_column: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        handle_column: Option<String>,
    },
    Export {
        path: PathBuf,
    },
    Ping,
}

/// Response from admin command.
#[derive(Debug, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
enum AdminResponse {
    Ok { message: String },
    Error { error: String },
    List { items: Vec<String> },
    Pong,
}

fn print_usage() {
    eprintln!("muster-admin - Organizer tools for a Muster node");
    eprintln!();
    eprintln!("Usage:");
    eprintln!("  muster-admin list-teams                      List active teams");
    eprintln!("  muster-admin team-of <user_id>               Show a user's team");
    eprintln!("  muster-admin lookup <email>                  Show a registrant");
    eprintln!("  muster-admin import-roster <csv> [email_col handle_col]");
    eprintln!("                                               Load a registration export");
    eprintln!("  muster-admin export <csv>                    Write the participant export");
    eprintln!("  muster-admin ping                            Check if daemon is running");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  MUSTER_SOCKET  Path to admin socket (default: ./muster-data/admin.sock)");
}

fn get_socket_path() -> PathBuf {
    std::env::var("MUSTER_SOCKET")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("./muster-data/admin.sock"))
}

fn send_command(cmd: AdminCommand) -> Result<AdminResponse, String> {
    let socket_path = get_socket_path();

    let mut stream = UnixStream::connect(&socket_path).map_err(|e| {
        format!(
            "Failed to connect to muster-node at {:?}: {}\n\
             Is the muster-node running?",
            socket_path, e
        )
    })?;

    // Send command
    let cmd_json = serde_json::to_string(&cmd).map_err(|e| e.to_string())?;
    writeln!(stream, "{}", cmd_json).map_err(|e| e.to_string())?;

    // Read response
    let mut reader = BufReader::new(&stream);
    let mut response_line = String::new();
    reader
        .read_line(&mut response_line)
        .map_err(|e| e.to_string())?;

    serde_json::from_str(&response_line).map_err(|e| format!("Invalid response: {}", e))
}

/// Resolve a path argument against the current directory; the daemon may run elsewhere.
fn absolute(arg: &str) -> PathBuf {
    let path = PathBuf::from(arg);
    if path.is_absolute() {
        return path;
    }
    std::env::current_dir()
        .map(|dir| dir.join(&path))
        .unwrap_or(path)
}

fn required<'a>(args: &'a [String], command: &str, what: &str) -> &'a str {
    match args.get(2) {
        Some(value) => value,
        None => {
            eprintln!("Error: {} requires a {} argument", command, what);
            std::process::exit(1);
        }
    }
}

fn main() {
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        std::process::exit(1);
    }

    let cmd = match args[1].as_str() {
        "list-teams" => AdminCommand::ListTeams,
        "team-of" => AdminCommand::TeamOf {
            user: required(&args, "team-of", "user_id").to_string(),
        },
        "lookup" => AdminCommand::Lookup {
            email: required(&args, "lookup", "email").to_string(),
        },
        "import-roster" => {
            let path = absolute(required(&args, "import-roster", "csv path"));
            let (email_column, handle_column) = match (args.get(3), args.get(4)) {
                (Some(email), Some(handle)) => (Some(email.clone()), Some(handle.clone())),
                (None, None) => (None, None),
                _ => {
                    eprintln!("Error: import-roster takes both column names or neither");
                    std::process::exit(1);
                }
            };
            AdminCommand::ImportRoster {
                path,
                email_column,
                handle_column,
            }
        }
        "export" => AdminCommand::Export {
            path: absolute(required(&args, "export", "csv path")),
        },
        "ping" => AdminCommand::Ping,
        "-h" | "--help" | "help" => {
            print_usage();
            std::process::exit(0);
        }
        other => {
            eprintln!("Unknown command: {}", other);
            print_usage();
            std::process::exit(1);
        }
    };

    match send_command(cmd) {
        Ok(response) => match response {
            AdminResponse::Ok { message } => {
                println!("{}", message);
            }
            AdminResponse::Error { error } => {
                eprintln!("Error: {}", error);
                std::process::exit(1);
            }
            AdminResponse::List { items } => {
                if items.is_empty() {
                    println!("(none)");
                } else {
                    for item in items {
                        println!("{}", item);
                    }
                }
            }
            AdminResponse::Pong => {
                println!("pong - muster-node is running");
            }
        },
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    }
}
