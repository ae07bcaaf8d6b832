//! Requirement strings as they appear in a manifest.
//!
//! A requirement line has the shape:
//!
//! ```text
//! name [ "[" extras "]" ] [ op version ] [ ";" marker ]
//! op := "==" | ">=" | "<=" | "!=" | "~=" | ">" | "<" | "="
//! ```
//!
//! A single `=` is accepted as a legacy separator. The line is kept verbatim
//! in [`Requirement::raw`] so the first install attempt passes exactly what
//! the user wrote; everything else (the name used for verification and the
//! fallback range) is derived from the parsed structure.

use std::fmt;
use std::str::FromStr;

use semver::Version;
use thiserror::Error;

/// Error parsing a requirement line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequirementError {
    #[error("requirement is empty")]
    Empty,

    #[error("missing package name in `{0}`")]
    MissingName(String),

    #[error("invalid package name `{name}` in `{raw}`")]
    InvalidName { name: String, raw: String },

    #[error("unterminated extras in `{0}`")]
    UnterminatedExtras(String),

    #[error("missing version after `{op}` in `{raw}`")]
    MissingVersion { op: VersionOp, raw: String },

    #[error("unexpected text `{rest}` after package name in `{raw}`")]
    UnexpectedText { rest: String, raw: String },
}

/// Comparison operator of a version constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VersionOp {
    /// `==`
    Exact,
    /// `>=`
    GreaterEq,
    /// `<=`
    LessEq,
    /// `!=`
    NotEq,
    /// `~=`
    Compatible,
    /// `>`
    Greater,
    /// `<`
    Less,
    /// Single `=`, tolerated for hand-written manifests.
    Legacy,
}

impl VersionOp {
    /// Operators ordered so that two-character forms match first.
    const ALL: [(&'static str, VersionOp); 8] = [
        ("==", VersionOp::Exact),
        (">=", VersionOp::GreaterEq),
        ("<=", VersionOp::LessEq),
        ("!=", VersionOp::NotEq),
        ("~=", VersionOp::Compatible),
        (">", VersionOp::Greater),
        ("<", VersionOp::Less),
        ("=", VersionOp::Legacy),
    ];

    /// The operator as written.
    pub fn as_str(&self) -> &'static str {
        match self {
            VersionOp::Exact => "==",
            VersionOp::GreaterEq => ">=",
            VersionOp::LessEq => "<=",
            VersionOp::NotEq => "!=",
            VersionOp::Compatible => "~=",
            VersionOp::Greater => ">",
            VersionOp::Less => "<",
            VersionOp::Legacy => "=",
        }
    }

    /// Match an operator at the start of `s`, returning it and its length.
    fn strip_from(s: &str) -> Option<(VersionOp, usize)> {
        Self::ALL
            .iter()
            .find(|(text, _)| s.starts_with(text))
            .map(|(text, op)| (*op, text.len()))
    }
}

impl fmt::Display for VersionOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A version constraint such as `==2.31.0`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Constraint {
    pub op: VersionOp,
    pub version: String,
}

impl Constraint {
    /// Leading major component of the version, if it is numeric.
    ///
    /// `2.31.0` gives `2`, `10` gives `10`, `v1` and `*` give `None`.
    pub fn major(&self) -> Option<u64> {
        let end = self
            .version
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(self.version.len());
        let digits = &self.version[..end];
        if digits.is_empty() {
            return None;
        }
        digits.parse().ok()
    }
}

/// A parsed manifest requirement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requirement {
    /// The requirement exactly as written (trimmed, inline comment removed).
    pub raw: String,
    /// Distribution name.
    pub name: String,
    /// Requested extras, e.g. `security` in `requests[security]`.
    pub extras: Vec<String>,
    /// Optional version constraint.
    pub constraint: Option<Constraint>,
    /// Environment marker after `;`.
    pub marker: Option<String>,
}

/// Relaxed requirement used for the second install attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fallback {
    /// Any release of the pinned major: `>=M.0.0,<M+1.0.0`.
    MajorRange { lower: Version, upper: Version },
    /// The bare package name with no constraint.
    Unpinned,
}

impl fmt::Display for Fallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Fallback::MajorRange { lower, upper } => write!(f, ">={},<{}", lower, upper),
            Fallback::Unpinned => write!(f, "any version"),
        }
    }
}

impl Requirement {
    /// Parse a single requirement line.
    pub fn parse(line: &str) -> Result<Self, RequirementError> {
        let raw = strip_inline_comment(line).trim();
        if raw.is_empty() {
            return Err(RequirementError::Empty);
        }

        let (spec, marker) = match raw.split_once(';') {
            Some((spec, marker)) => {
                let marker = marker.trim();
                (spec.trim(), (!marker.is_empty()).then(|| marker.to_string()))
            }
            None => (raw, None),
        };

        let name_end = spec
            .find(|c: char| matches!(c, '[' | '=' | '<' | '>' | '!' | '~'))
            .unwrap_or(spec.len());
        let name = spec[..name_end].trim();
        if name.is_empty() {
            return Err(RequirementError::MissingName(raw.to_string()));
        }
        if !is_valid_name(name) {
            return Err(RequirementError::InvalidName {
                name: name.to_string(),
                raw: raw.to_string(),
            });
        }

        let mut rest = spec[name_end..].trim_start();

        let mut extras = Vec::new();
        if let Some(after) = rest.strip_prefix('[') {
            let close = after
                .find(']')
                .ok_or_else(|| RequirementError::UnterminatedExtras(raw.to_string()))?;
            extras = after[..close]
                .split(',')
                .map(str::trim)
                .filter(|e| !e.is_empty())
                .map(String::from)
                .collect();
            rest = after[close + 1..].trim_start();
        }

        let constraint = if rest.is_empty() {
            None
        } else {
            let (op, len) = VersionOp::strip_from(rest).ok_or_else(|| {
                RequirementError::UnexpectedText {
                    rest: rest.to_string(),
                    raw: raw.to_string(),
                }
            })?;
            let version = rest[len..].trim();
            if version.is_empty() {
                return Err(RequirementError::MissingVersion {
                    op,
                    raw: raw.to_string(),
                });
            }
            Some(Constraint {
                op,
                version: version.to_string(),
            })
        };

        Ok(Requirement {
            raw: raw.to_string(),
            name: name.to_string(),
            extras,
            constraint,
            marker,
        })
    }

    /// Compute the relaxed requirement to try after the direct install fails.
    ///
    /// Only an exact `==` pin with a numeric major widens to a major range;
    /// everything else falls back to the bare name.
    pub fn fallback(&self) -> Fallback {
        let major = self
            .constraint
            .as_ref()
            .filter(|c| c.op == VersionOp::Exact)
            .and_then(Constraint::major);

        match major.and_then(|m| m.checked_add(1).map(|next| (m, next))) {
            Some((m, next)) => Fallback::MajorRange {
                lower: Version::new(m, 0, 0),
                upper: Version::new(next, 0, 0),
            },
            None => Fallback::Unpinned,
        }
    }

    /// The requirement string to hand to the installer for a fallback attempt.
    ///
    /// Extras are carried over, so `requests[socks]==2.31.0` relaxes to
    /// `requests[socks]>=2.0.0,<3.0.0`.
    pub fn fallback_spec(&self, fallback: &Fallback) -> String {
        let base = self.name_with_extras();
        match fallback {
            Fallback::MajorRange { lower, upper } => format!("{}>={},<{}", base, lower, upper),
            Fallback::Unpinned => base,
        }
    }

    /// `name[extra,...]`, or just the name when there are no extras.
    pub fn name_with_extras(&self) -> String {
        if self.extras.is_empty() {
            self.name.clone()
        } else {
            format!("{}[{}]", self.name, self.extras.join(","))
        }
    }
}

impl FromStr for Requirement {
    type Err = RequirementError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Requirement::parse(s)
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Normalize a distribution name for comparison.
///
/// Lower-cases and collapses runs of `-`, `_` and `.` into a single `-`, so
/// `Typing_Extensions` and `typing-extensions` compare equal.
pub fn normalize_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut in_separator = false;
    for c in name.trim().chars() {
        if matches!(c, '-' | '_' | '.') {
            if !in_separator {
                out.push('-');
            }
            in_separator = true;
        } else {
            out.extend(c.to_lowercase());
            in_separator = false;
        }
    }
    out
}

/// Remove a trailing ` # comment`. A `#` without preceding whitespace is kept,
/// it may be part of a URL fragment.
fn strip_inline_comment(line: &str) -> &str {
    let bytes = line.as_bytes();
    for (i, b) in bytes.iter().enumerate() {
        if *b == b'#' && (i == 0 || bytes[i - 1].is_ascii_whitespace()) {
            return &line[..i];
        }
    }
    line
}

fn is_valid_name(name: &str) -> bool {
    let starts_alnum = name.chars().next().is_some_and(|c| c.is_ascii_alphanumeric());
    starts_alnum
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}
