//! venvup CLI - create and provision Python virtual environments

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use venvup::ProvisionError;

mod cli;
mod commands;

use cli::Cli;

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {:#}", e);
        let code = e
            .downcast_ref::<ProvisionError>()
            .map_or(1, ProvisionError::exit_code);
        std::process::exit(code);
    }
}

fn run() -> Result<()> {
    // Parse CLI
    let cli = Cli::parse();

    // Set up logging
    let filter = if cli.verbose {
        EnvFilter::new("venvup=debug")
    } else {
        EnvFilter::new("venvup=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    commands::provision::execute(cli)
}
