//! High-level operations.
//!
//! This module contains the provisioning lifecycle and its steps.

pub mod activate;
pub mod error;
pub mod install;
pub mod provision;
pub mod verify;

pub use activate::{offer_activation, Activation};
pub use error::ProvisionError;
pub use install::{install_entry, install_manifest, InstallOutcome, InstallReport};
pub use provision::{provision, ProvisionOptions, ProvisionOutcome, Resolution};
pub use verify::{verify_environment, VerifyReport};
