//! # Mergington CLI Module
//!
//! This module implements the CLI interface for the activities service.
//!
//! ## Available Commands
//!
//! - `server` - Start the HTTP server
//! - `activities` - Show the seed catalog the server would start with
//! - `staff` - Show the staff directory (never passwords)
//! - `issue-token` - Log in offline and print a bearer token
//! - `inspect-token` - Validate a bearer token and print its identity

mod commands;

use crate::config::ServerConfig;
use clap::{Parser, Subcommand};
use mergington_core::MergingtonError;
use std::path::PathBuf;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// Mergington High School activities service.
///
/// Lists extracurricular activities, signs students up, and lets staff
/// manage rosters with bearer tokens.
#[derive(Parser, Debug)]
#[command(name = "mergington")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Suppress banner output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to a TOML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json_mode: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start HTTP server
    Server {
        /// Host to bind to (overrides the config file)
        #[arg(short = 'H', long)]
        host: Option<String>,

        /// Port to bind to (overrides the config file)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Show the activity catalog
    Activities,

    /// Show the staff directory
    Staff,

    /// Log in with staff credentials and print a bearer token
    IssueToken {
        /// Staff email
        #[arg(short, long)]
        email: String,

        /// Staff password
        #[arg(short = 'P', long)]
        password: String,
    },

    /// Validate a bearer token and print the identity it carries
    InspectToken {
        /// The token to check
        token: String,
    },
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments.
pub async fn execute(cli: Cli) -> Result<(), MergingtonError> {
    let config = ServerConfig::load(cli.config.as_deref())?;
    let json_mode = cli.json_mode;

    match cli.command {
        Some(Commands::Server { host, port }) => cmd_server(config, host, port).await,
        Some(Commands::Activities) => cmd_activities(&config, json_mode),
        Some(Commands::Staff) => cmd_staff(&config, json_mode),
        Some(Commands::IssueToken { email, password }) => {
            cmd_issue_token(&config, json_mode, &email, &password)
        }
        Some(Commands::InspectToken { token }) => cmd_inspect_token(&config, json_mode, &token),
        None => {
            // No subcommand - show the catalog by default
            cmd_activities(&config, json_mode)
        }
    }
}
