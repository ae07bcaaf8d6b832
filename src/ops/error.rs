//! Provisioning errors and their exit codes.

use thiserror::Error;

use crate::core::{EnvironmentError, ManifestError};
use crate::runtime::RuntimeError;
use crate::util::PromptError;

/// Error that ends a provisioning run.
///
/// Per-requirement install failures are not errors; they are recorded in the
/// [`InstallReport`](crate::ops::InstallReport) and the run continues.
#[derive(Debug, Error)]
pub enum ProvisionError {
    #[error(transparent)]
    InvalidEnvironment(#[from] EnvironmentError),

    #[error("failed to create environment `{name}`")]
    CreateEnvironment {
        name: String,
        #[source]
        source: RuntimeError,
    },

    #[error("failed to remove existing environment `{name}`")]
    RemoveEnvironment {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to upgrade pip in `{name}`")]
    UpgradeInstaller {
        name: String,
        #[source]
        source: RuntimeError,
    },

    #[error(transparent)]
    Manifest(#[from] ManifestError),

    #[error("aborted: environment `{name}` left untouched")]
    Aborted { name: String },

    #[error("aborted")]
    Prompt(#[source] PromptError),

    #[error("failed to talk to the terminal")]
    Terminal {
        #[source]
        source: std::io::Error,
    },
}

impl From<PromptError> for ProvisionError {
    fn from(err: PromptError) -> Self {
        match err {
            PromptError::Io(source) => ProvisionError::Terminal { source },
            other => ProvisionError::Prompt(other),
        }
    }
}

impl ProvisionError {
    /// Process exit code for this error.
    ///
    /// Failed creation or upgrade propagates the child's own exit code; every
    /// other error, including user aborts, exits with 1.
    pub fn exit_code(&self) -> i32 {
        match self {
            ProvisionError::CreateEnvironment { source, .. }
            | ProvisionError::UpgradeInstaller { source, .. } => {
                source.exit_code().filter(|c| *c != 0).unwrap_or(1)
            }
            _ => 1,
        }
    }

    /// Whether the run ended because of the user's answer.
    pub fn is_user_abort(&self) -> bool {
        matches!(
            self,
            ProvisionError::Aborted { .. }
                | ProvisionError::Prompt(PromptError::Invalid(_) | PromptError::Closed)
        )
    }
}
