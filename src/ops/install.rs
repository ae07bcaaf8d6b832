//! Installing manifest requirements with one fallback attempt each.
//!
//! For every requirement, in manifest order:
//!
//! 1. Install the requirement exactly as written.
//! 2. On failure, install its [`Fallback`]: the pinned major as a range
//!    (`foo==9` becomes `foo>=9.0.0,<10.0.0`) or the bare name.
//! 3. Record the outcome and move on. A failure never stops the loop.

use std::path::Path;

use anyhow::{Context, Result};

use crate::core::{Environment, Fallback, Manifest, ManifestEntry};
use crate::runtime::Runtime;
use crate::util::fs::{remove_file_if_exists, write_string};
use crate::util::{Shell, Status};

/// Result of installing one requirement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallOutcome {
    /// The requirement installed as written.
    Installed,
    /// The direct install failed and the fallback succeeded.
    InstalledFallback(Fallback),
    /// Both the direct install and the fallback failed.
    Failed(Fallback),
}

impl InstallOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, InstallOutcome::Failed(_))
    }
}

/// Outcomes for a whole manifest, in manifest order.
#[derive(Debug, Clone, Default)]
pub struct InstallReport {
    pub results: Vec<(ManifestEntry, InstallOutcome)>,
}

impl InstallReport {
    pub fn installed_count(&self) -> usize {
        self.count(|o| matches!(o, InstallOutcome::Installed))
    }

    pub fn fallback_count(&self) -> usize {
        self.count(|o| matches!(o, InstallOutcome::InstalledFallback(_)))
    }

    pub fn failed_count(&self) -> usize {
        self.count(InstallOutcome::is_failed)
    }

    /// Entries that could not be installed at all.
    pub fn failed(&self) -> impl Iterator<Item = &ManifestEntry> {
        self.results
            .iter()
            .filter(|(_, outcome)| outcome.is_failed())
            .map(|(entry, _)| entry)
    }

    fn count(&self, pred: impl Fn(&InstallOutcome) -> bool) -> usize {
        self.results.iter().filter(|(_, o)| pred(o)).count()
    }
}

/// Install one manifest entry, falling back once on failure.
pub fn install_entry<R: Runtime>(
    runtime: &R,
    env: &Environment,
    entry: &ManifestEntry,
) -> InstallOutcome {
    let first = match runtime.install(env, &entry.raw) {
        Ok(()) => return InstallOutcome::Installed,
        Err(e) => e,
    };
    tracing::debug!("direct install of `{}` failed: {}", entry.raw, first);

    let fallback = entry.fallback();
    let spec = entry.fallback_spec(&fallback);
    tracing::debug!("retrying `{}` as `{}`", entry.raw, spec);

    match runtime.install(env, &spec) {
        Ok(()) => InstallOutcome::InstalledFallback(fallback),
        Err(e) => {
            tracing::debug!("fallback install of `{}` failed: {}", spec, e);
            InstallOutcome::Failed(fallback)
        }
    }
}

/// Install every entry in the manifest.
pub fn install_manifest<R: Runtime>(
    runtime: &R,
    env: &Environment,
    manifest: &Manifest,
    shell: &Shell,
) -> InstallReport {
    let mut report = InstallReport::default();
    let mut progress = shell.progress(manifest.len() as u64, "Installing");

    for entry in manifest.entries() {
        if let Err(e) = &entry.requirement {
            progress.warn(format!(
                "{}:{}: {}; passing `{}` to pip as written",
                manifest.path().display(),
                entry.line,
                e,
                entry.raw
            ));
        }
        progress.status(Status::Installing, &entry.raw);

        let outcome = install_entry(runtime, env, entry);
        match &outcome {
            InstallOutcome::Installed => {
                progress.status(Status::Installed, &entry.raw);
            }
            InstallOutcome::InstalledFallback(fallback) => {
                progress.warn(format!(
                    "could not install `{}`, installed `{}` instead",
                    entry.raw,
                    entry.fallback_spec(fallback)
                ));
            }
            InstallOutcome::Failed(fallback) => {
                progress.warn(format!(
                    "failed to install `{}` (also tried `{}`)",
                    entry.raw,
                    entry.fallback_spec(fallback)
                ));
            }
        }

        report.results.push((entry.clone(), outcome));
        progress.inc(1);
    }

    progress.finish();
    report
}

/// Record the raw lines of failed entries at `path`, one per line.
///
/// The log always describes the latest run: when nothing failed, a log left
/// by an earlier run is removed. Returns whether a log was written.
pub fn write_failed_log(report: &InstallReport, path: &Path) -> Result<bool> {
    let failed: Vec<&str> = report.failed().map(|e| e.raw.as_str()).collect();
    if failed.is_empty() {
        remove_file_if_exists(path)
            .with_context(|| format!("failed to remove stale {}", path.display()))?;
        return Ok(false);
    }

    let mut contents = failed.join("\n");
    contents.push('\n');
    write_string(path, &contents)?;
    Ok(true)
}
