//! CLI command definitions for the `skynet` binary.
//!
//! Uses clap derive macros for argument parsing.

pub mod chats;
pub mod personas;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

/// Themed persona chat backend.
#[derive(Parser)]
#[command(name = "skynet", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all log output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for debug, -vv for trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Export spans through OpenTelemetry (stdout exporter).
    #[arg(long, global = true)]
    pub otel: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP API server.
    Serve {
        /// Address to bind (defaults to config.toml, then 0.0.0.0).
        #[arg(long, env = "SKYNET_HOST")]
        host: Option<String>,

        /// Port to listen on (defaults to config.toml, then 8000).
        #[arg(short, long, env = "SKYNET_PORT")]
        port: Option<u16>,
    },

    /// List the available personas.
    Personas,

    /// Inspect and manage durable chats.
    Chats {
        #[command(subcommand)]
        action: ChatsCommand,
    },

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}

#[derive(Subcommand)]
pub enum ChatsCommand {
    /// List chats, most recently active first.
    #[command(alias = "ls")]
    List,

    /// Show a chat and its transcript.
    Show {
        /// Chat id.
        id: i64,
    },

    /// Delete a chat and its messages.
    #[command(alias = "rm")]
    Delete {
        /// Chat id.
        id: i64,

        /// Skip the confirmation prompt.
        #[arg(long, short)]
        force: bool,
    },
}
