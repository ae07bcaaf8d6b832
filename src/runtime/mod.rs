//! The interpreter and package manager behind an environment.
//!
//! Provisioning logic talks to a [`Runtime`] rather than spawning processes
//! directly, so the lifecycle can be exercised against a mock.

pub mod python;

use serde::Deserialize;
use thiserror::Error;

use crate::core::Environment;

pub use python::PythonRuntime;

/// Error from a runtime operation.
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("could not run `{command}`: {message}")]
    Spawn { command: String, message: String },

    #[error("`{command}` failed with exit code {}{}", display_code(.code), display_stderr(.stderr))]
    Failed {
        command: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("unexpected output from `{command}`")]
    Output {
        command: String,
        #[source]
        source: serde_json::Error,
    },
}

impl RuntimeError {
    /// Exit code of the failed child process, if it exited normally.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            RuntimeError::Failed { code, .. } => *code,
            _ => None,
        }
    }
}

fn display_code(code: &Option<i32>) -> String {
    code.map_or_else(|| "none (terminated by signal)".to_string(), |c| c.to_string())
}

fn display_stderr(stderr: &str) -> String {
    let stderr = stderr.trim();
    if stderr.is_empty() {
        String::new()
    } else {
        format!("\n{}", stderr)
    }
}

/// A package reported as installed in an environment.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct InstalledPackage {
    pub name: String,
    pub version: String,
}

/// Operations the provisioner needs from a language runtime.
pub trait Runtime {
    /// Create a fresh environment at `env.path()`.
    fn create_env(&self, env: &Environment) -> Result<(), RuntimeError>;

    /// Upgrade the environment's package manager.
    fn upgrade_installer(&self, env: &Environment) -> Result<(), RuntimeError>;

    /// Install a single requirement string into the environment.
    fn install(&self, env: &Environment, spec: &str) -> Result<(), RuntimeError>;

    /// List the packages installed in the environment.
    fn installed_packages(&self, env: &Environment) -> Result<Vec<InstalledPackage>, RuntimeError>;

    /// Activate the environment for the user's session.
    fn activate(&self, env: &Environment) -> Result<(), RuntimeError>;
}
