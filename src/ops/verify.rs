//! Verification mode: check an existing environment against the manifest.
//!
//! Verification is read-only and never fails the run. Every problem, from a
//! missing manifest to a package that is not installed, is reported as a
//! warning.

use std::collections::HashSet;
use std::path::Path;

use crate::core::requirement::normalize_name;
use crate::core::{Environment, Manifest};
use crate::runtime::Runtime;
use crate::util::{Shell, Status};

/// Result of verifying an environment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VerifyReport {
    /// Number of requirements checked.
    pub checked: usize,
    /// Names of requirements not present in the environment, in manifest order.
    pub missing: Vec<String>,
    /// Manifest lines that could not be checked because they did not parse.
    pub unchecked: Vec<String>,
    /// Whether verification could not run at all (unreadable manifest, failed listing).
    pub incomplete: bool,
}

impl VerifyReport {
    /// Whether every requirement was found.
    pub fn is_complete(&self) -> bool {
        !self.incomplete && self.missing.is_empty() && self.unchecked.is_empty()
    }
}

/// Verify that every package named in the manifest is installed in `env`.
pub fn verify_environment<R: Runtime>(
    runtime: &R,
    env: &Environment,
    manifest_path: &Path,
    shell: &Shell,
) -> VerifyReport {
    shell.status(
        Status::Verifying,
        format!("`{}` against {}", env.name(), manifest_path.display()),
    );

    let manifest = match Manifest::load(manifest_path) {
        Ok(manifest) => manifest,
        Err(e) => {
            shell.warn(format!("cannot verify packages: {}", e));
            return VerifyReport {
                incomplete: true,
                ..VerifyReport::default()
            };
        }
    };

    let installed: HashSet<String> = match runtime.installed_packages(env) {
        Ok(packages) => packages.iter().map(|p| normalize_name(&p.name)).collect(),
        Err(e) => {
            shell.warn(format!("cannot list packages in `{}`: {}", env.name(), e));
            return VerifyReport {
                incomplete: true,
                ..VerifyReport::default()
            };
        }
    };
    tracing::debug!("{} package(s) installed in {}", installed.len(), env.name());

    let mut report = VerifyReport::default();
    for entry in manifest.entries() {
        let requirement = match &entry.requirement {
            Ok(requirement) => requirement,
            Err(e) => {
                shell.warn(format!(
                    "{}:{}: cannot check `{}`: {}",
                    manifest.path().display(),
                    entry.line,
                    entry.raw,
                    e
                ));
                report.unchecked.push(entry.raw.clone());
                continue;
            }
        };

        report.checked += 1;
        if !installed.contains(&normalize_name(&requirement.name)) {
            shell.warn(format!(
                "Package '{}' is not installed in `{}`",
                requirement.name,
                env.name()
            ));
            report.missing.push(requirement.name.clone());
        }
    }

    shell.status(
        Status::Finished,
        format!(
            "verified {} package(s), {} missing",
            report.checked,
            report.missing.len()
        ),
    );

    report
}
