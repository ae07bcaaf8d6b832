//! Interactive yes/no prompts.
//!
//! Each [`Prompt`] carries its own policy for unrecognized input: either
//! abort immediately or ask again. Answers are matched case-insensitively on
//! their first character, so `y`, `Yes` and `yep` are all "yes".

use std::io::{self, BufRead, Write};

use thiserror::Error;

/// A recognized answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Answer {
    Yes,
    No,
}

impl Answer {
    /// Interpret a line of user input.
    pub fn parse(input: &str) -> Option<Answer> {
        match input.trim().chars().next().map(|c| c.to_ascii_lowercase()) {
            Some('y') => Some(Answer::Yes),
            Some('n') => Some(Answer::No),
            _ => None,
        }
    }

    pub fn is_yes(self) -> bool {
        self == Answer::Yes
    }
}

/// A yes/no question and what to do with input that is neither.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Prompt {
    pub question: &'static str,
    pub retry_on_invalid: bool,
}

impl Prompt {
    /// Asked when the environment directory already exists.
    pub const OVERWRITE: Prompt = Prompt {
        question: "Overwrite it?",
        retry_on_invalid: false,
    };

    /// Asked after the user declines to overwrite.
    pub const VERIFY: Prompt = Prompt {
        question: "Verify installed packages against the manifest instead?",
        retry_on_invalid: false,
    };

    /// Asked once provisioning is complete.
    pub const ACTIVATE: Prompt = Prompt {
        question: "Activate the environment now?",
        retry_on_invalid: true,
    };
}

/// Error obtaining an answer.
#[derive(Debug, Error)]
pub enum PromptError {
    #[error("invalid answer `{0}`: expected yes or no")]
    Invalid(String),

    #[error("no answer given (end of input)")]
    Closed,

    #[error("failed to read answer")]
    Io(#[from] io::Error),
}

/// Source of answers to prompts, and sink for messages addressed to the user.
pub trait Prompter {
    /// Ask `prompt`, prefixed with `subject` when non-empty.
    fn ask(&mut self, subject: &str, prompt: &Prompt) -> Result<Answer, PromptError>;

    /// Print a line to the user.
    fn tell(&mut self, line: &str) -> io::Result<()>;
}

/// Prompter over a line-based reader and a writer (stdin/stdout in the binary).
#[derive(Debug)]
pub struct LinePrompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> LinePrompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        LinePrompter { input, output }
    }

    /// Consume the prompter, returning the writer.
    pub fn into_output(self) -> W {
        self.output
    }
}

impl LinePrompter<io::StdinLock<'static>, io::Stdout> {
    /// Prompter bound to the process's stdin and stdout.
    pub fn stdio() -> Self {
        LinePrompter::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> Prompter for LinePrompter<R, W> {
    fn ask(&mut self, subject: &str, prompt: &Prompt) -> Result<Answer, PromptError> {
        loop {
            if subject.is_empty() {
                write!(self.output, "{} [y/n]: ", prompt.question)?;
            } else {
                write!(self.output, "{} {} [y/n]: ", subject, prompt.question)?;
            }
            self.output.flush()?;

            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 {
                // A closed stdin can never produce a valid answer.
                writeln!(self.output)?;
                return Err(PromptError::Closed);
            }

            if let Some(answer) = Answer::parse(&line) {
                tracing::debug!("prompt {:?} answered {:?}", prompt.question, answer);
                return Ok(answer);
            }

            let given = line.trim().to_string();
            if !prompt.retry_on_invalid {
                return Err(PromptError::Invalid(given));
            }
            writeln!(self.output, "Please answer y or n.")?;
        }
    }

    fn tell(&mut self, line: &str) -> io::Result<()> {
        writeln!(self.output, "{}", line)?;
        self.output.flush()
    }
}
