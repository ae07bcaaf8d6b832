//! venvup - create and provision Python virtual environments
//!
//! This crate provides the library behind the `venvup` binary: the
//! requirement grammar and fallback rules, the runtime abstraction over
//! `venv`/`pip`, and the provisioning lifecycle.

pub mod core;
pub mod ops;
pub mod runtime;
pub mod util;

/// Test utilities and mocks for venvup unit tests.
#[cfg(test)]
pub mod test_support;

pub use crate::core::{Environment, Manifest, Requirement};
pub use ops::{provision, ProvisionError, ProvisionOptions, ProvisionOutcome};
pub use runtime::{PythonRuntime, Runtime};
