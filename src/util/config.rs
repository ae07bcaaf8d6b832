//! Configuration file support for venvup.
//!
//! Two configuration file locations are read:
//! - Global: `~/.venvup/config.toml` - User-wide defaults
//! - Project: `venvup.toml` in the invocation directory
//!
//! Project config takes precedence over global config; command-line flags
//! take precedence over both.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Project config file name.
pub const PROJECT_CONFIG: &str = "venvup.toml";

/// Default failed-packages log name, relative to the manifest directory.
pub const DEFAULT_FAILED_LOG: &str = "failed_packages.txt";

/// venvup configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Environment settings
    pub env: EnvConfig,

    /// Manifest settings
    pub manifest: ManifestConfig,

    /// Installation settings
    pub install: InstallConfig,

    /// Prompt settings
    pub prompts: PromptConfig,
}

/// Environment-related configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvConfig {
    /// Environment directory name (default: `venv`)
    pub name: Option<String>,

    /// Interpreter used to create environments (default: first of python3/python on PATH)
    pub python: Option<PathBuf>,
}

/// Manifest-related configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManifestConfig {
    /// Manifest path, relative to the invocation directory (default: `requirements.txt`)
    pub path: Option<PathBuf>,
}

/// Installation-related configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InstallConfig {
    /// Write requirements that failed to install to `failed_log`
    #[serde(default = "default_true")]
    pub record_failures: bool,

    /// Failed-packages log, relative to the manifest directory
    pub failed_log: Option<PathBuf>,
}

impl Default for InstallConfig {
    fn default() -> Self {
        InstallConfig {
            record_failures: true,
            failed_log: None,
        }
    }
}

/// Prompt-related configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptConfig {
    /// Offer to activate the environment once provisioning finishes
    #[serde(default = "default_true")]
    pub activate: bool,
}

impl Default for PromptConfig {
    fn default() -> Self {
        PromptConfig { activate: true }
    }
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Load configuration with fallback to defaults if the file is missing or broken.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config from {}: {:#}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: Config) {
        if other.env.name.is_some() {
            self.env.name = other.env.name;
        }
        if other.env.python.is_some() {
            self.env.python = other.env.python;
        }

        if other.manifest.path.is_some() {
            self.manifest.path = other.manifest.path;
        }

        // Booleans default to true, so only an explicit `false` overrides.
        if !other.install.record_failures {
            self.install.record_failures = false;
        }
        if other.install.failed_log.is_some() {
            self.install.failed_log = other.install.failed_log;
        }

        if !other.prompts.activate {
            self.prompts.activate = false;
        }
    }

    /// Failed-packages log name, falling back to the default.
    pub fn failed_log(&self) -> &Path {
        self.install
            .failed_log
            .as_deref()
            .unwrap_or_else(|| Path::new(DEFAULT_FAILED_LOG))
    }
}

/// Load merged configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (venvup.toml)
/// 2. Global config (~/.venvup/config.toml)
/// 3. Defaults
pub fn load_config(global_path: Option<&Path>, project_path: &Path) -> Config {
    let mut config = Config::default();

    if let Some(global_path) = global_path {
        if global_path.exists() {
            config.merge(Config::load_or_default(global_path));
        }
    }

    if project_path.exists() {
        config.merge(Config::load_or_default(project_path));
    }

    config
}

/// Get the global venvup config directory (~/.venvup).
pub fn global_config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".venvup"))
}

/// Get the global config path (~/.venvup/config.toml).
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("config.toml"))
}

/// Get the project config path (<dir>/venvup.toml).
pub fn project_config_path(project_root: &Path) -> PathBuf {
    project_root.join(PROJECT_CONFIG)
}
