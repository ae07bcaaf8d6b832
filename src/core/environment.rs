//! A named virtual environment directory.

use std::path::{Component, Path, PathBuf};

use thiserror::Error;

/// Environment name used when none is given.
pub const DEFAULT_ENV_NAME: &str = "venv";

/// Error constructing an [`Environment`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EnvironmentError {
    #[error("environment name is empty")]
    EmptyName,

    #[error("invalid environment name `{0}`: must be a single path segment")]
    InvalidName(String),
}

/// A virtual environment rooted at `<base>/<name>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Environment {
    name: String,
    path: PathBuf,
}

impl Environment {
    /// Create an environment handle for `name` inside `base`.
    ///
    /// `base` should be absolute; the provisioner resolves it once at startup.
    pub fn new(name: &str, base: &Path) -> Result<Self, EnvironmentError> {
        validate_name(name)?;
        Ok(Environment {
            name: name.to_string(),
            path: base.join(name),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Root directory of the environment.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the environment directory currently exists.
    pub fn exists(&self) -> bool {
        self.path.is_dir()
    }

    /// Directory holding the environment's executables.
    pub fn bin_dir(&self) -> PathBuf {
        if cfg!(windows) {
            self.path.join("Scripts")
        } else {
            self.path.join("bin")
        }
    }

    /// The environment's interpreter. Every package-manager call goes through it.
    pub fn python(&self) -> PathBuf {
        if cfg!(windows) {
            self.bin_dir().join("python.exe")
        } else {
            self.bin_dir().join("python")
        }
    }

    /// Shell command a user runs to activate the environment by hand.
    pub fn activation_hint(&self) -> String {
        if cfg!(windows) {
            format!("{}\\Scripts\\activate", self.name)
        } else {
            format!("source {}/bin/activate", self.name)
        }
    }
}

/// Check that `name` is usable as a single directory name.
pub fn validate_name(name: &str) -> Result<(), EnvironmentError> {
    if name.is_empty() {
        return Err(EnvironmentError::EmptyName);
    }

    let invalid = || EnvironmentError::InvalidName(name.to_string());

    if name.contains('\0') || name.contains('/') || name.contains('\\') {
        return Err(invalid());
    }

    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Ok(()),
        _ => Err(invalid()),
    }
}
