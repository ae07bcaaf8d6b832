//! Activation epilogue.

use crate::core::Environment;
use crate::runtime::Runtime;
use crate::util::{Answer, Prompt, PromptError, Prompter, Shell, Status};

/// How the activation prompt ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activation {
    /// The user accepted and the activation shell ran.
    Activated,
    /// The user declined; manual instructions were printed.
    Declined,
    /// The prompt was not offered.
    Skipped,
}

/// Offer to activate `env`, re-asking until the answer is yes or no.
///
/// A closed stdin counts as "no". A failing activation shell is reported as a
/// warning and falls back to the manual instructions.
pub fn offer_activation<R: Runtime, P: Prompter>(
    runtime: &R,
    env: &Environment,
    prompter: &mut P,
    shell: &Shell,
) -> Result<Activation, PromptError> {
    let answer = match prompter.ask("", &Prompt::ACTIVATE) {
        Ok(answer) => answer,
        Err(PromptError::Closed) => Answer::No,
        Err(e) => return Err(e),
    };

    if answer.is_yes() {
        shell.status(
            Status::Activated,
            format!("`{}` (type `exit` to leave the environment)", env.name()),
        );
        match runtime.activate(env) {
            Ok(()) => return Ok(Activation::Activated),
            Err(e) => shell.warn(format!("could not activate `{}`: {}", env.name(), e)),
        }
    }

    prompter.tell(&format!(
        "To activate the environment, run: {}",
        env.activation_hint()
    ))?;
    Ok(Activation::Declined)
}
