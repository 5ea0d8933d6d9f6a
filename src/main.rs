// ABOUTME: Entry point for the pairrun CLI application.
// ABOUTME: Parses arguments and dispatches to appropriate command handlers.

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};
use pairrun::config::{self, Config};
use pairrun::error::Result;
use pairrun::output::Output;
use std::env;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize tracing subscriber based on verbose flag
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let mut output = Output::new(cli.output_mode());
    output.start_timer();

    if let Err(e) = run(cli, &output).await {
        output.error(&e.to_string());
        std::process::exit(1);
    }
}

async fn run(cli: Cli, output: &Output) -> Result<()> {
    let cwd = env::current_dir()?;
    let config_path = cli.config;

    match cli.command {
        Commands::Run {
            local_addr,
            remote_addr,
        } => {
            let config = Config::resolve(config_path.as_deref(), &cwd)?;
            commands::run_pair(config, local_addr, remote_addr, output).await
        }
        Commands::Init { force } => {
            let path = config::init_config(&cwd, force)?;
            output.success(&format!("Created {}", path.display()));
            Ok(())
        }
        Commands::Show => {
            let config = Config::resolve(config_path.as_deref(), &cwd)?;
            commands::show(&config, output);
            Ok(())
        }
    }
}
