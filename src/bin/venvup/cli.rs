//! CLI definitions using clap.

use std::path::PathBuf;

use clap::Parser;

use venvup::core::environment::validate_name;

/// venvup - create a Python virtual environment and install a requirements manifest
#[derive(Parser)]
#[command(name = "venvup")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Environment directory name [default: venv]
    #[arg(value_parser = parse_env_name)]
    pub env_name: Option<String>,

    /// Requirements manifest [default: requirements.txt]
    #[arg(short, long, value_name = "PATH")]
    pub manifest: Option<PathBuf>,

    /// Python interpreter used to create the environment
    #[arg(long, env = "VENVUP_PYTHON", value_name = "PATH")]
    pub python: Option<PathBuf>,

    /// Don't offer to activate the environment when done
    #[arg(long)]
    pub no_activate: bool,

    /// Don't write failed requirements to failed_packages.txt
    #[arg(long)]
    pub no_failed_log: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Only print warnings and errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,
}

fn parse_env_name(s: &str) -> Result<String, String> {
    validate_name(s).map_err(|e| e.to_string())?;
    Ok(s.to_string())
}
