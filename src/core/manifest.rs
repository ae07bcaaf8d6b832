//! Requirements manifest (`requirements.txt`).
//!
//! One requirement per line. Blank lines and lines starting with `#` are
//! ignored and never reach the installer or the verifier.
//!
//! A line outside the requirement grammar (`-r base.txt`, `pkg @ https://...`,
//! a local wheel path) does not invalidate the manifest. It is kept as an
//! entry whose requirement failed to parse; the installer passes it to pip as
//! written and the verifier reports it and moves on.

use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::core::requirement::{Fallback, Requirement, RequirementError};

/// Default manifest file name, relative to the invocation directory.
pub const DEFAULT_MANIFEST: &str = "requirements.txt";

/// Error loading a manifest.
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("manifest not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("failed to read manifest {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// One non-blank, non-comment manifest line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
    /// 1-based line number.
    pub line: usize,
    /// The line as handed to the installer.
    pub raw: String,
    /// The parsed requirement, or why the line is outside the grammar.
    pub requirement: Result<Requirement, RequirementError>,
}

impl ManifestEntry {
    /// Build the entry for manifest line `line` with contents `text`.
    pub fn parse(line: usize, text: &str) -> Self {
        let requirement = Requirement::parse(text);
        let raw = match &requirement {
            Ok(req) => req.raw.clone(),
            Err(_) => text.trim().to_string(),
        };
        ManifestEntry {
            line,
            raw,
            requirement,
        }
    }

    /// Relaxed requirement for the second install attempt.
    pub fn fallback(&self) -> Fallback {
        match &self.requirement {
            Ok(req) => req.fallback(),
            Err(_) => Fallback::Unpinned,
        }
    }

    /// Installer argument for the fallback attempt.
    ///
    /// An unparsed line falls back to the text before its first `=`.
    pub fn fallback_spec(&self, fallback: &Fallback) -> String {
        match &self.requirement {
            Ok(req) => req.fallback_spec(fallback),
            Err(_) => match self.raw.split_once('=') {
                Some((head, _)) if !head.trim().is_empty() => head.trim().to_string(),
                _ => self.raw.clone(),
            },
        }
    }
}

/// A parsed requirements manifest.
#[derive(Debug, Clone)]
pub struct Manifest {
    path: PathBuf,
    entries: Vec<ManifestEntry>,
}

impl Manifest {
    /// Load and parse a manifest from disk.
    pub fn load(path: &Path) -> Result<Self, ManifestError> {
        let contents = std::fs::read_to_string(path).map_err(|source| {
            if source.kind() == io::ErrorKind::NotFound {
                ManifestError::NotFound {
                    path: path.to_path_buf(),
                }
            } else {
                ManifestError::Read {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })?;

        Ok(Self::parse(path, &contents))
    }

    /// Parse manifest contents. `path` is only used for messages.
    pub fn parse(path: &Path, contents: &str) -> Self {
        let entries: Vec<ManifestEntry> = contents
            .lines()
            .enumerate()
            .filter(|(_, line)| !is_ignored(line))
            .map(|(idx, line)| ManifestEntry::parse(idx + 1, line))
            .collect();

        for entry in &entries {
            if let Err(e) = &entry.requirement {
                tracing::debug!("{}:{}: {}", path.display(), entry.line, e);
            }
        }
        tracing::debug!(
            "parsed {} requirement(s) from {}",
            entries.len(),
            path.display()
        );

        Manifest {
            path: path.to_path_buf(),
            entries,
        }
    }

    /// Path the manifest was loaded from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Entries in file order.
    pub fn entries(&self) -> &[ManifestEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Whether a manifest line carries no requirement.
pub fn is_ignored(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.is_empty() || trimmed.starts_with('#')
}
