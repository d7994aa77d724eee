use clap::{Parser, Subcommand};
use std::{path::PathBuf, process::ExitCode};

mod commands;
use commands::{
    handle_config_command, list_perspectives, run_coordination, utils::print_error,
    ConfigCommands,
};

#[derive(Parser)]
#[command(name = "mpic-cli")]
#[command(about = "MPIC CLI - run and inspect multi-perspective validation coordinations")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to the configuration file
    #[arg(long, global = true, env = "MPIC_CONFIG", default_value = "config/config.toml")]
    config: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one coordination from a JSON request file and print the result
    Coordinate {
        /// Path to the MPIC request JSON
        #[arg(short, long)]
        request: PathBuf,

        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,
    },

    /// List registry perspectives and which configured codes resolve
    Perspectives,

    /// Configuration Management
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Coordinate { request, pretty } => {
            run_coordination(&cli.config, &request, pretty).await
        }
        Commands::Perspectives => list_perspectives(&cli.config).map(|()| ExitCode::SUCCESS),
        Commands::Config(config_command) => {
            handle_config_command(config_command, &cli.config).map(|()| ExitCode::SUCCESS)
        }
    };

    result.unwrap_or_else(|e| {
        print_error(&e.to_string());
        ExitCode::FAILURE
    })
}
