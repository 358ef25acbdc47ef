mod cli;
mod commands;
mod print;

use crate::cli::{Cli, Commands};
use clap::{CommandFactory, Parser};
use clap_complete::generate;
use sensor_edge::config;
use std::io;
use tracing_subscriber::{EnvFilter, prelude::*};

fn init_tracing() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();
}

async fn load_config(server: Option<String>) -> anyhow::Result<config::Config> {
    let mut config = config::Config::load().await?;
    if let Some(server) = server {
        config.set_server_override(server);
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    match cli.command {
        Commands::Profile { profile } => {
            let mut config = load_config(cli.server).await?;
            match profile {
                Some(profile) => {
                    println!("Changing profile to {}", profile);
                    config.change_profile(profile).await?;
                    println!("new: {}", config);
                }
                None => {
                    println!("current: {}", config);
                    let profiles = config.profiles().collect::<Vec<_>>().join(", ");
                    println!("available: {}", profiles);
                }
            }
        }
        Commands::Devices { command } => command.handle(load_config(cli.server).await?).await?,
        Commands::Completion { shell } => {
            let mut cmd = Cli::command();
            let name = env!("CARGO_BIN_NAME");
            generate(shell, &mut cmd, name, &mut io::stdout());
        }
    }

    Ok(())
}
