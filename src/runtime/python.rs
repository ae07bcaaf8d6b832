//! CPython runtime: `venv` for environments and `pip` for packages.

use std::path::PathBuf;
use std::process::Output;

use crate::core::Environment;
use crate::runtime::{InstalledPackage, Runtime, RuntimeError};
use crate::util::process::ProcessBuilder;

/// Runtime backed by a base Python interpreter.
///
/// Environment creation uses the base interpreter; every package-manager call
/// goes through the environment's own interpreter (`<env>/bin/python -m pip`).
#[derive(Debug, Clone)]
pub struct PythonRuntime {
    python: PathBuf,
    shell: Option<PathBuf>,
}

impl PythonRuntime {
    /// Create a runtime around the given base interpreter.
    pub fn new(python: impl Into<PathBuf>) -> Self {
        PythonRuntime {
            python: python.into(),
            shell: None,
        }
    }

    /// Use `shell` for activation instead of `$SHELL`.
    pub fn with_shell(mut self, shell: impl Into<PathBuf>) -> Self {
        self.shell = Some(shell.into());
        self
    }

    fn pip(env: &Environment) -> ProcessBuilder {
        ProcessBuilder::new(env.python())
            .args(["-m", "pip"])
            .env("PIP_DISABLE_PIP_VERSION_CHECK", "1")
            .env_remove("PYTHONHOME")
    }

    fn user_shell(&self) -> PathBuf {
        if let Some(shell) = &self.shell {
            return shell.clone();
        }
        if cfg!(windows) {
            std::env::var_os("COMSPEC")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("cmd.exe"))
        } else {
            std::env::var_os("SHELL")
                .filter(|s| !s.is_empty())
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("sh"))
        }
    }
}

/// Split a manifest line into pip arguments.
///
/// Option lines such as `-r base.txt` become separate arguments; anything else,
/// markers with spaces included, stays a single requirement argument.
fn install_args(spec: &str) -> Vec<&str> {
    if spec.starts_with('-') {
        spec.split_whitespace().collect()
    } else {
        vec![spec]
    }
}

/// Run `cmd`, turning spawn errors and non-zero exits into [`RuntimeError`].
fn run_checked(cmd: &ProcessBuilder) -> Result<Output, RuntimeError> {
    let output = cmd.exec().map_err(|e| RuntimeError::Spawn {
        command: cmd.display_command(),
        message: format!("{:#}", e),
    })?;

    log_output(&output);

    if !output.status.success() {
        return Err(RuntimeError::Failed {
            command: cmd.display_command(),
            code: output.status.code(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        });
    }

    Ok(output)
}

fn log_output(output: &Output) {
    for line in String::from_utf8_lossy(&output.stdout).lines() {
        tracing::debug!("  | {}", line);
    }
    for line in String::from_utf8_lossy(&output.stderr).lines() {
        tracing::debug!("  ! {}", line);
    }
}

impl Runtime for PythonRuntime {
    fn create_env(&self, env: &Environment) -> Result<(), RuntimeError> {
        let cmd = ProcessBuilder::new(&self.python)
            .args(["-m", "venv"])
            .arg(env.path());
        run_checked(&cmd).map(drop)
    }

    fn upgrade_installer(&self, env: &Environment) -> Result<(), RuntimeError> {
        let cmd = Self::pip(env).args(["install", "--upgrade", "pip"]);
        run_checked(&cmd).map(drop)
    }

    fn install(&self, env: &Environment, spec: &str) -> Result<(), RuntimeError> {
        let cmd = Self::pip(env).arg("install").args(install_args(spec));
        run_checked(&cmd).map(drop)
    }

    fn installed_packages(&self, env: &Environment) -> Result<Vec<InstalledPackage>, RuntimeError> {
        let cmd = Self::pip(env).args(["list", "--format=json"]);
        let output = run_checked(&cmd)?;

        serde_json::from_slice(&output.stdout).map_err(|source| RuntimeError::Output {
            command: cmd.display_command(),
            source,
        })
    }

    fn activate(&self, env: &Environment) -> Result<(), RuntimeError> {
        let bin_dir = env.bin_dir();
        let mut paths = vec![bin_dir.clone()];
        if let Some(existing) = std::env::var_os("PATH") {
            paths.extend(std::env::split_paths(&existing));
        }
        let path = std::env::join_paths(paths).unwrap_or_else(|_| bin_dir.into_os_string());

        let cmd = ProcessBuilder::new(self.user_shell())
            .env("VIRTUAL_ENV", env.path())
            .env("VIRTUAL_ENV_PROMPT", env.name())
            .env("PATH", path)
            .env_remove("PYTHONHOME");

        let status = cmd.status().map_err(|e| RuntimeError::Spawn {
            command: cmd.display_command(),
            message: format!("{:#}", e),
        })?;

        // The subshell's own exit status reflects the user's last command,
        // not whether activation worked.
        tracing::debug!("activation shell exited with {}", status);
        Ok(())
    }
}
