//! Command-line interface for strictly_ultimate.

use clap::{Parser, Subcommand};

/// Strictly Ultimate - terminal client for networked super tic-tac-toe
#[derive(Parser, Debug)]
#[command(name = "strictly_ultimate")]
#[command(about = "Play super tic-tac-toe against a remote game server", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Path to the client config file (defaults apply when missing)
    #[arg(short, long, global = true, default_value = "strictly_ultimate.toml")]
    pub config: std::path::PathBuf,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Open a game and play it in the terminal
    Play {
        /// Game server URL, overriding config and environment
        #[arg(long)]
        server_url: Option<String>,
    },

    /// Print the effective configuration and exit
    CheckConfig {
        /// Game server URL, overriding config and environment
        #[arg(long)]
        server_url: Option<String>,
    },
}
