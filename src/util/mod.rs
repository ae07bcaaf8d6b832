//! Shared utilities

pub mod config;
pub mod fs;
pub mod process;
pub mod prompt;
pub mod shell;

pub use config::Config;
pub use prompt::{Answer, LinePrompter, Prompt, PromptError, Prompter};
pub use shell::{ColorChoice, Shell, Status, Verbosity};
