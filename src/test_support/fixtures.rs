//! Test fixtures for common test scenarios.

use std::io::Cursor;
use std::path::Path;

use tempfile::TempDir;

use crate::core::Manifest;
use crate::util::LinePrompter;

/// Parse manifest contents held in memory.
pub fn manifest_from(contents: &str) -> Manifest {
    Manifest::parse(Path::new("requirements.txt"), contents)
}

/// A project directory with a `requirements.txt` holding `contents`.
pub fn project_with_manifest(contents: &str) -> TempDir {
    let tmp = TempDir::new().unwrap();
    std::fs::write(tmp.path().join("requirements.txt"), contents).unwrap();
    tmp
}

/// A prompter that answers from `input` and captures everything it prints.
pub type ScriptedPrompter = LinePrompter<Cursor<Vec<u8>>, Vec<u8>>;

/// Create a [`ScriptedPrompter`] fed with `input` (one answer per line).
pub fn scripted(input: &str) -> ScriptedPrompter {
    LinePrompter::new(Cursor::new(input.as_bytes().to_vec()), Vec::new())
}

/// Everything a [`ScriptedPrompter`] printed.
pub fn transcript(prompter: ScriptedPrompter) -> String {
    String::from_utf8(prompter.into_output()).unwrap()
}
