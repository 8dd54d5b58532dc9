use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::commands;

#[derive(Parser)]
#[command(name = "tixwatch")]
#[command(about = "Ticket resale price monitor", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Watch the configured event page and alert on price movement
    Monitor {
        /// Path to the TOML config file
        #[arg(short, long, default_value = "tixwatch.toml")]
        config: PathBuf,

        /// Run exactly one check cycle and exit
        #[arg(long)]
        once: bool,
    },
    /// Show a summary of the recorded price history
    Status,
}

pub async fn run() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Monitor { config, once } => {
            commands::monitor::run(config, once).await;
        }
        Commands::Status => {
            commands::status::run();
        }
    }
}
