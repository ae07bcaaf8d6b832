//! Test utilities and mocks for venvup unit tests.
//!
//! [`MockRuntime`] stands in for a real interpreter: it records every call,
//! creates the environment directory on `create_env`, and fails exactly the
//! operations it was told to fail.

pub mod fixtures;

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Mutex;

use crate::core::Environment;
use crate::runtime::{InstalledPackage, Runtime, RuntimeError};

pub use fixtures::*;

/// A call made against the [`MockRuntime`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuntimeCall {
    Create(PathBuf),
    Upgrade,
    Install(String),
    List,
    Activate,
}

/// Mock runtime for testing the provisioning lifecycle without Python.
#[derive(Debug, Default)]
pub struct MockRuntime {
    failing_installs: HashSet<String>,
    create_failure: Option<i32>,
    upgrade_failure: Option<i32>,
    list_fails: bool,
    installed: Vec<InstalledPackage>,
    calls: Mutex<Vec<RuntimeCall>>,
}

impl MockRuntime {
    /// Create a mock where every operation succeeds.
    pub fn new() -> Self {
        MockRuntime::default()
    }

    /// Make installing exactly `spec` fail.
    pub fn fail_install(mut self, spec: &str) -> Self {
        self.failing_installs.insert(spec.to_string());
        self
    }

    /// Make environment creation exit with `code`.
    pub fn fail_create(mut self, code: i32) -> Self {
        self.create_failure = Some(code);
        self
    }

    /// Make the pip upgrade exit with `code`.
    pub fn fail_upgrade(mut self, code: i32) -> Self {
        self.upgrade_failure = Some(code);
        self
    }

    /// Make listing installed packages fail.
    pub fn fail_list(mut self) -> Self {
        self.list_fails = true;
        self
    }

    /// Report `name` as installed.
    pub fn with_installed(mut self, name: &str, version: &str) -> Self {
        self.installed.push(InstalledPackage {
            name: name.to_string(),
            version: version.to_string(),
        });
        self
    }

    /// Get all calls, in order.
    pub fn calls(&self) -> Vec<RuntimeCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Get the requirement strings passed to `install`, in order.
    pub fn install_specs(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                RuntimeCall::Install(spec) => Some(spec),
                _ => None,
            })
            .collect()
    }

    /// Whether any package-manager operation (upgrade, install, list) ran.
    pub fn touched_installer(&self) -> bool {
        self.calls().iter().any(|c| {
            matches!(
                c,
                RuntimeCall::Upgrade | RuntimeCall::Install(_) | RuntimeCall::List
            )
        })
    }

    fn record(&self, call: RuntimeCall) {
        self.calls.lock().unwrap().push(call);
    }
}

fn failure(command: &str, code: i32) -> RuntimeError {
    RuntimeError::Failed {
        command: command.to_string(),
        code: Some(code),
        stderr: "mock failure".to_string(),
    }
}

impl Runtime for MockRuntime {
    fn create_env(&self, env: &Environment) -> Result<(), RuntimeError> {
        self.record(RuntimeCall::Create(env.path().to_path_buf()));
        if let Some(code) = self.create_failure {
            return Err(failure("python -m venv", code));
        }
        std::fs::create_dir_all(env.bin_dir()).map_err(|e| RuntimeError::Spawn {
            command: "python -m venv".to_string(),
            message: e.to_string(),
        })
    }

    fn upgrade_installer(&self, _env: &Environment) -> Result<(), RuntimeError> {
        self.record(RuntimeCall::Upgrade);
        match self.upgrade_failure {
            Some(code) => Err(failure("pip install --upgrade pip", code)),
            None => Ok(()),
        }
    }

    fn install(&self, _env: &Environment, spec: &str) -> Result<(), RuntimeError> {
        self.record(RuntimeCall::Install(spec.to_string()));
        if self.failing_installs.contains(spec) {
            Err(failure(&format!("pip install {}", spec), 1))
        } else {
            Ok(())
        }
    }

    fn installed_packages(&self, _env: &Environment) -> Result<Vec<InstalledPackage>, RuntimeError> {
        self.record(RuntimeCall::List);
        if self.list_fails {
            Err(failure("pip list", 2))
        } else {
            Ok(self.installed.clone())
        }
    }

    fn activate(&self, _env: &Environment) -> Result<(), RuntimeError> {
        self.record(RuntimeCall::Activate);
        Ok(())
    }
}
