//! The provisioning lifecycle.
//!
//! ```text
//! resolve environment ──┬─ fresh ─────────────────────────┐
//!                       └─ exists ─ overwrite? ─ yes ─────┤
//!                                        └─ no ─ verify? ─┼─ yes ─> verification (exit 0)
//!                                                         │   └ no ─> abort (exit 1)
//!                                                         v
//!               prepare manifest ─> upgrade pip ─> install with fallback ─> activate?
//! ```
//!
//! Only environment creation, the pip upgrade and the manifest check can end
//! the run early. Individual install failures are recorded and reported.

use std::path::{Path, PathBuf};

use crate::core::{Environment, Manifest, DEFAULT_MANIFEST};
use crate::ops::activate::{offer_activation, Activation};
use crate::ops::error::ProvisionError;
use crate::ops::install::{install_manifest, write_failed_log, InstallReport};
use crate::ops::verify::{verify_environment, VerifyReport};
use crate::runtime::Runtime;
use crate::util::config::DEFAULT_FAILED_LOG;
use crate::util::fs::remove_dir_all_if_exists;
use crate::util::{Prompt, Prompter, Shell, Status};

/// Options for a provisioning run.
///
/// Paths are expected to be absolute; the CLI resolves them against the
/// invocation directory once, at startup.
#[derive(Debug, Clone)]
pub struct ProvisionOptions {
    /// Environment directory name.
    pub env_name: String,
    /// Directory the environment lives in.
    pub base_dir: PathBuf,
    /// Requirements manifest.
    pub manifest_path: PathBuf,
    /// Where to record requirements that failed to install (`None` disables).
    pub failed_log: Option<PathBuf>,
    /// Offer to activate the environment at the end.
    pub offer_activation: bool,
}

impl ProvisionOptions {
    /// Defaults for an environment `env_name` inside `base_dir`, with the
    /// manifest and failed-packages log next to it.
    pub fn new(env_name: impl Into<String>, base_dir: impl Into<PathBuf>) -> Self {
        let base_dir = base_dir.into();
        ProvisionOptions {
            env_name: env_name.into(),
            manifest_path: base_dir.join(DEFAULT_MANIFEST),
            failed_log: Some(base_dir.join(DEFAULT_FAILED_LOG)),
            base_dir,
            offer_activation: true,
        }
    }
}

/// How a successful run ended.
#[derive(Debug, Clone)]
pub enum ProvisionOutcome {
    /// The user chose to verify an existing environment.
    Verified(VerifyReport),
    /// The environment was (re)created and the manifest installed.
    Provisioned {
        report: InstallReport,
        activation: Activation,
    },
}

/// Where environment resolution leads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// A fresh environment is ready for installation.
    Created,
    /// Leave the environment alone and verify it.
    Verify,
}

/// Run the whole lifecycle.
pub fn provision<R: Runtime, P: Prompter>(
    opts: &ProvisionOptions,
    runtime: &R,
    prompter: &mut P,
    shell: &Shell,
) -> Result<ProvisionOutcome, ProvisionError> {
    let env = Environment::new(&opts.env_name, &opts.base_dir)?;
    tracing::debug!(
        "provisioning {} from {}",
        env.path().display(),
        opts.manifest_path.display()
    );

    if resolve_environment(runtime, &env, prompter, shell)? == Resolution::Verify {
        let report = verify_environment(runtime, &env, &opts.manifest_path, shell);
        return Ok(ProvisionOutcome::Verified(report));
    }

    let manifest = prepare_manifest(&opts.manifest_path)?;
    upgrade_installer(runtime, &env, shell)?;

    let report = install_manifest(runtime, &env, &manifest, shell);
    summarize(&report, shell);

    if let Some(log) = &opts.failed_log {
        match write_failed_log(&report, log) {
            Ok(true) => shell.note(format!("failed requirements listed in {}", log.display())),
            Ok(false) => {}
            Err(e) => shell.warn(format!("could not record failed packages: {:#}", e)),
        }
    }

    let activation = if opts.offer_activation {
        offer_activation(runtime, &env, prompter, shell)?
    } else {
        Activation::Skipped
    };

    Ok(ProvisionOutcome::Provisioned { report, activation })
}

/// Create the environment, or decide what to do with an existing one.
///
/// The overwrite and verify prompts accept a single answer; anything other
/// than yes/no aborts.
pub fn resolve_environment<R: Runtime, P: Prompter>(
    runtime: &R,
    env: &Environment,
    prompter: &mut P,
    shell: &Shell,
) -> Result<Resolution, ProvisionError> {
    if env.exists() {
        let subject = format!("Environment '{}' already exists.", env.name());
        if prompter.ask(&subject, &Prompt::OVERWRITE)?.is_yes() {
            remove_dir_all_if_exists(env.path()).map_err(|source| {
                ProvisionError::RemoveEnvironment {
                    name: env.name().to_string(),
                    source,
                }
            })?;
            shell.status(Status::Removed, format!("existing environment `{}`", env.name()));
        } else if prompter.ask("", &Prompt::VERIFY)?.is_yes() {
            return Ok(Resolution::Verify);
        } else {
            return Err(ProvisionError::Aborted {
                name: env.name().to_string(),
            });
        }
    }

    create_environment(runtime, env, shell)?;
    Ok(Resolution::Created)
}

fn create_environment<R: Runtime>(
    runtime: &R,
    env: &Environment,
    shell: &Shell,
) -> Result<(), ProvisionError> {
    shell.status(Status::Creating, format!("virtual environment `{}`", env.name()));
    runtime
        .create_env(env)
        .map_err(|source| ProvisionError::CreateEnvironment {
            name: env.name().to_string(),
            source,
        })?;
    shell.status(Status::Created, env.path().display());
    Ok(())
}

/// Load the manifest. A missing or unreadable manifest ends the run.
pub fn prepare_manifest(path: &Path) -> Result<Manifest, ProvisionError> {
    Ok(Manifest::load(path)?)
}

/// Upgrade pip inside the environment. Failure ends the run.
pub fn upgrade_installer<R: Runtime>(
    runtime: &R,
    env: &Environment,
    shell: &Shell,
) -> Result<(), ProvisionError> {
    shell.status(Status::Upgrading, "pip");
    runtime
        .upgrade_installer(env)
        .map_err(|source| ProvisionError::UpgradeInstaller {
            name: env.name().to_string(),
            source,
        })
}

fn summarize(report: &InstallReport, shell: &Shell) {
    let mut summary = format!("{} installed", report.installed_count());
    if report.fallback_count() > 0 {
        summary.push_str(&format!(", {} with a relaxed version", report.fallback_count()));
    }
    if report.failed_count() > 0 {
        summary.push_str(&format!(", {} failed", report.failed_count()));
    }
    shell.status(Status::Finished, summary);
}
