use clap::{Parser, Subcommand, value_parser};
use clap_complete::Shell;

use crate::commands::devices::DevicesCommands;

#[derive(Parser)]
#[command(name = "se", version, about = "Sensor Edge CLI - gateway device management", long_about = None)]
pub struct Cli {
    /// Gateway base URL, overrides the profile and SENSOR_EDGE_SERVER
    #[arg(long, global = true, value_name = "URL")]
    pub server: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show or change the current profile
    Profile { profile: Option<String> },

    /// Manage the devices registered on the gateway
    #[command(visible_alias = "device")]
    Devices {
        #[clap(subcommand)]
        command: DevicesCommands,
    },

    /// Generate shell completion scripts
    Completion {
        /// The shell to generate the completions for
        #[arg(value_parser = value_parser!(Shell))]
        shell: Shell,
    },
}
