//! Core data model: environments, manifests, requirements.

pub mod environment;
pub mod manifest;
pub mod requirement;

pub use environment::{Environment, EnvironmentError, DEFAULT_ENV_NAME};
pub use manifest::{Manifest, ManifestEntry, ManifestError, DEFAULT_MANIFEST};
pub use requirement::{Constraint, Fallback, Requirement, RequirementError, VersionOp};
