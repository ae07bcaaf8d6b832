//! Centralized status output and progress management.
//!
//! Every human-facing status line goes through [`Shell`], which handles
//! alignment, colours and verbosity. Status lines are written to stderr so
//! that prompts and activation hints on stdout stay clean.
//!
//! Format: `{status:>12} {message}`.

use std::fmt::Display;
use std::io::{self, IsTerminal};

use indicatif::{ProgressBar, ProgressStyle};

/// Output verbosity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// --quiet: warnings and errors only, no progress
    Quiet,
    /// Default: status messages + progress bars
    #[default]
    Normal,
    /// --verbose: status lines only, no progress bars
    Verbose,
}

/// Color output mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorChoice {
    /// Detect TTY and use colors if available.
    #[default]
    Auto,
    /// Always use ANSI colors.
    Always,
    /// Never use ANSI colors.
    Never,
}

impl std::str::FromStr for ColorChoice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "auto" => Ok(ColorChoice::Auto),
            "always" => Ok(ColorChoice::Always),
            "never" => Ok(ColorChoice::Never),
            _ => Err(format!(
                "invalid color choice '{}'; expected 'auto', 'always', or 'never'",
                s
            )),
        }
    }
}

/// Status types for output messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    // Success statuses (green)
    Created,
    Installed,
    Activated,
    Finished,

    // In-progress statuses (cyan)
    Creating,
    Upgrading,
    Installing,
    Verifying,

    // Info statuses (blue)
    Info,
    Removed,

    // Warning status (yellow)
    Warning,
}

impl Status {
    fn as_str(&self) -> &'static str {
        match self {
            Status::Created => "Created",
            Status::Installed => "Installed",
            Status::Activated => "Activated",
            Status::Finished => "Finished",
            Status::Creating => "Creating",
            Status::Upgrading => "Upgrading",
            Status::Installing => "Installing",
            Status::Verifying => "Verifying",
            Status::Info => "Info",
            Status::Removed => "Removed",
            Status::Warning => "WARNING:",
        }
    }

    fn color_code(&self) -> &'static str {
        match self {
            Status::Created | Status::Installed | Status::Activated | Status::Finished => {
                "\x1b[1;32m"
            }
            Status::Creating | Status::Upgrading | Status::Installing | Status::Verifying => {
                "\x1b[1;36m"
            }
            Status::Info | Status::Removed => "\x1b[1;34m",
            Status::Warning => "\x1b[1;33m",
        }
    }

    /// Whether the status survives `--quiet`.
    fn is_problem(&self) -> bool {
        matches!(self, Status::Warning)
    }
}

const STATUS_WIDTH: usize = 12;

/// Central shell for all CLI status output.
#[derive(Debug)]
pub struct Shell {
    verbosity: Verbosity,
    use_color: bool,
}

impl Shell {
    /// Create a new shell.
    pub fn new(verbosity: Verbosity, color: ColorChoice) -> Self {
        let use_color = match color {
            ColorChoice::Auto => io::stderr().is_terminal(),
            ColorChoice::Always => true,
            ColorChoice::Never => false,
        };

        Shell {
            verbosity,
            use_color,
        }
    }

    /// Create a shell from CLI flags. Quiet wins over verbose.
    pub fn from_flags(quiet: bool, verbose: bool, color: ColorChoice) -> Self {
        let verbosity = if quiet {
            Verbosity::Quiet
        } else if verbose {
            Verbosity::Verbose
        } else {
            Verbosity::Normal
        };

        Shell::new(verbosity, color)
    }

    /// A shell that prints nothing but warnings and errors, without colour.
    pub fn quiet() -> Self {
        Shell::new(Verbosity::Quiet, ColorChoice::Never)
    }

    pub fn verbosity(&self) -> Verbosity {
        self.verbosity
    }

    pub fn is_quiet(&self) -> bool {
        self.verbosity == Verbosity::Quiet
    }

    pub fn is_verbose(&self) -> bool {
        self.verbosity == Verbosity::Verbose
    }

    /// Print a status message.
    ///
    /// In quiet mode, only warnings and errors are printed.
    pub fn status(&self, status: Status, msg: impl Display) {
        if let Some(line) = self.format_line(status, msg) {
            eprintln!("{}", line);
        }
    }

    /// Print an info message.
    pub fn note(&self, msg: impl Display) {
        self.status(Status::Info, msg);
    }

    /// Print a warning message.
    pub fn warn(&self, msg: impl Display) {
        self.status(Status::Warning, msg);
    }

    /// Render a full status line, or `None` if the verbosity suppresses it.
    fn format_line(&self, status: Status, msg: impl Display) -> Option<String> {
        if self.is_quiet() && !status.is_problem() {
            return None;
        }
        Some(format!("{} {}", self.format_status(status), msg))
    }

    fn format_status(&self, status: Status) -> String {
        let text = status.as_str();

        if self.use_color {
            let color = status.color_code();
            format!("{}{:>width$}\x1b[0m", color, text, width = STATUS_WIDTH)
        } else {
            format!("{:>width$}", text, width = STATUS_WIDTH)
        }
    }

    /// Create a progress bar over `total` items.
    ///
    /// In quiet or verbose mode, or for a single item, no bar is drawn and
    /// status lines are printed directly.
    pub fn progress(&self, total: u64, msg: impl Display) -> Progress<'_> {
        Progress::new(self, total, msg.to_string())
    }
}

/// Progress bar wrapper that respects shell verbosity.
///
/// Status lines printed through the progress are drawn above the bar.
pub struct Progress<'a> {
    shell: &'a Shell,
    pb: Option<ProgressBar>,
}

impl<'a> Progress<'a> {
    fn new(shell: &'a Shell, total: u64, message: String) -> Self {
        let pb = if shell.is_quiet() || shell.is_verbose() || total <= 1 {
            None
        } else {
            let pb = ProgressBar::new(total);
            if let Ok(style) =
                ProgressStyle::default_bar().template("{spinner:.green} {msg} [{bar:40.cyan/blue}] {pos}/{len}")
            {
                pb.set_style(style.progress_chars("#>-"));
            }
            pb.set_message(message);
            Some(pb)
        };

        Progress { shell, pb }
    }

    /// Print a status line without tearing the bar.
    pub fn status(&self, status: Status, msg: impl Display) {
        let Some(line) = self.shell.format_line(status, msg) else {
            return;
        };
        match &self.pb {
            Some(pb) => pb.suspend(|| eprintln!("{}", line)),
            None => eprintln!("{}", line),
        }
    }

    /// Print a warning without tearing the bar.
    pub fn warn(&self, msg: impl Display) {
        self.status(Status::Warning, msg);
    }

    /// Advance the bar.
    pub fn inc(&mut self, delta: u64) {
        if let Some(pb) = &self.pb {
            pb.inc(delta);
        }
    }

    /// Clear the bar.
    pub fn finish(&self) {
        if let Some(pb) = &self.pb {
            pb.finish_and_clear();
        }
    }
}

impl Drop for Progress<'_> {
    fn drop(&mut self) {
        if let Some(pb) = &self.pb {
            if !pb.is_finished() {
                pb.finish_and_clear();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_choice_parse() {
        assert_eq!("auto".parse::<ColorChoice>().unwrap(), ColorChoice::Auto);
        assert_eq!("ALWAYS".parse::<ColorChoice>().unwrap(), ColorChoice::Always);
        assert_eq!("never".parse::<ColorChoice>().unwrap(), ColorChoice::Never);
        assert!("sometimes".parse::<ColorChoice>().is_err());
    }

    #[test]
    fn test_status_formatting() {
        let shell = Shell::new(Verbosity::Normal, ColorChoice::Never);

        let formatted = shell.format_status(Status::Installed);
        assert_eq!(formatted.trim(), "Installed");
        assert_eq!(formatted.len(), STATUS_WIDTH);
    }

    #[test]
    fn test_warning_prefix() {
        let shell = Shell::new(Verbosity::Normal, ColorChoice::Never);
        let line = shell.format_line(Status::Warning, "missing").unwrap();
        assert_eq!(line.trim_start(), "WARNING: missing");
    }

    #[test]
    fn test_quiet_keeps_only_problems() {
        let shell = Shell::quiet();
        assert!(shell.format_line(Status::Installed, "x").is_none());
        assert!(shell.format_line(Status::Warning, "x").is_some());
    }

    #[test]
    fn test_from_flags() {
        assert_eq!(
            Shell::from_flags(false, false, ColorChoice::Never).verbosity(),
            Verbosity::Normal
        );
        assert!(Shell::from_flags(false, true, ColorChoice::Never).is_verbose());
        // quiet takes precedence
        assert!(Shell::from_flags(true, true, ColorChoice::Never).is_quiet());
    }

    #[test]
    fn test_progress_bar_only_in_normal_mode() {
        let quiet = Shell::quiet();
        let mut progress = quiet.progress(3, "Installing");
        assert!(progress.pb.is_none());
        progress.inc(1);
        progress.finish();

        let verbose = Shell::new(Verbosity::Verbose, ColorChoice::Never);
        assert!(verbose.progress(3, "Installing").pb.is_none());

        let normal = Shell::new(Verbosity::Normal, ColorChoice::Never);
        assert!(normal.progress(1, "Installing").pb.is_none());
        assert!(normal.progress(3, "Installing").pb.is_some());
    }
}
