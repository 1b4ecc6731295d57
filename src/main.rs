//! Strictly Ultimate - terminal client
//!
//! Plays super tic-tac-toe against a remote game server.

#![warn(missing_docs)]

mod cli;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Command};
use strictly_ultimate::{ClientConfig, run_tui};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Command::Play { server_url } => {
            let config = ClientConfig::load_or_default(&cli.config)?.with_overrides(server_url);
            run_tui(config).await
        }
        Command::CheckConfig { server_url } => {
            let config = ClientConfig::load_or_default(&cli.config)?.with_overrides(server_url);
            println!("{}", toml::to_string_pretty(&config)?);
            Ok(())
        }
    }
}
