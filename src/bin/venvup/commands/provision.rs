//! `venvup [ENV_NAME]` - the provisioning run

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::cli::Cli;
use venvup::core::{DEFAULT_ENV_NAME, DEFAULT_MANIFEST};
use venvup::ops::{provision, ProvisionOptions, ProvisionOutcome};
use venvup::runtime::PythonRuntime;
use venvup::util::config::{global_config_path, load_config, project_config_path, Config};
use venvup::util::fs::absolutize;
use venvup::util::process::find_python;
use venvup::util::{ColorChoice, LinePrompter, Shell};

pub fn execute(cli: Cli) -> Result<()> {
    let cwd = std::env::current_dir().context("failed to determine the current directory")?;

    let config = load_config(global_config_path().as_deref(), &project_config_path(&cwd));
    tracing::debug!("effective config: {:?}", config);

    let color = if cli.no_color {
        ColorChoice::Never
    } else {
        ColorChoice::Auto
    };
    let shell = Shell::from_flags(cli.quiet, cli.verbose, color);

    let python = interpreter(&cli, &config);
    tracing::debug!("base interpreter: {}", python.display());
    let runtime = PythonRuntime::new(python);

    let opts = options(&cli, &config, &cwd);
    let mut prompter = LinePrompter::stdio();

    match provision(&opts, &runtime, &mut prompter, &shell)? {
        ProvisionOutcome::Verified(report) => {
            tracing::debug!("verification finished: {:?}", report);
        }
        ProvisionOutcome::Provisioned { report, activation } => {
            tracing::debug!(
                "provisioned with {} failure(s), activation {:?}",
                report.failed_count(),
                activation
            );
        }
    }

    Ok(())
}

/// Resolve options with precedence CLI > config > defaults.
fn options(cli: &Cli, config: &Config, cwd: &Path) -> ProvisionOptions {
    let env_name = cli
        .env_name
        .clone()
        .or_else(|| config.env.name.clone())
        .unwrap_or_else(|| DEFAULT_ENV_NAME.to_string());

    let manifest = cli
        .manifest
        .clone()
        .or_else(|| config.manifest.path.clone())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_MANIFEST));
    let manifest_path = absolutize(&manifest, cwd);

    let failed_log = if cli.no_failed_log || !config.install.record_failures {
        None
    } else {
        let manifest_dir = manifest_path.parent().unwrap_or(cwd);
        Some(absolutize(config.failed_log(), manifest_dir))
    };

    ProvisionOptions {
        env_name,
        base_dir: cwd.to_path_buf(),
        manifest_path,
        failed_log,
        offer_activation: !cli.no_activate && config.prompts.activate,
    }
}

/// Pick the base interpreter: CLI/env var, then config, then PATH lookup.
///
/// When nothing is found, `python3` is used as-is and environment creation
/// reports the failure; verification never needs the base interpreter.
fn interpreter(cli: &Cli, config: &Config) -> PathBuf {
    cli.python
        .clone()
        .or_else(|| config.env.python.clone())
        .or_else(find_python)
        .unwrap_or_else(|| PathBuf::from("python3"))
}
