//! Chart version arithmetic.
//!
//! Chart versions are `MAJOR.MINOR.PATCH`, optionally preceded by a single
//! marker letter (usually `v`). Only the patch component is ever bumped and
//! the marker is carried through unchanged.

use crate::error::{Error, Result};
use std::fmt;
use std::str::FromStr;

/// A parsed three-component chart version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChartVersion {
    pub prefix: Option<char>,
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

impl ChartVersion {
    /// Next patch release; major, minor and prefix are untouched.
    pub fn next_patch(&self) -> Result<ChartVersion> {
        let patch = self
            .patch
            .checked_add(1)
            .ok_or_else(|| Error::format(self.to_string(), "patch version overflow"))?;
        Ok(ChartVersion { patch, ..*self })
    }
}

impl FromStr for ChartVersion {
    type Err = Error;

    fn from_str(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        let (prefix, body) = match trimmed.chars().next() {
            Some(c) if c.is_ascii_alphabetic() => (Some(c), &trimmed[c.len_utf8()..]),
            _ => (None, trimmed),
        };

        let parts: Vec<&str> = body.split('.').collect();
        if parts.len() != 3 {
            return Err(Error::format(
                trimmed,
                "invalid semantic version format (expected X.Y.Z)",
            ));
        }

        Ok(ChartVersion {
            prefix,
            major: parse_component(trimmed, "major", parts[0])?,
            minor: parse_component(trimmed, "minor", parts[1])?,
            patch: parse_component(trimmed, "patch", parts[2])?,
        })
    }
}

impl fmt::Display for ChartVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(p) = self.prefix {
            write!(f, "{}", p)?;
        }
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

fn parse_component(version: &str, name: &str, part: &str) -> Result<u64> {
    if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Error::format(
            version,
            format!("invalid {} version: '{}'", name, part),
        ));
    }
    part.parse::<u64>()
        .map_err(|e| Error::format(version, format!("invalid {} version: {}", name, e)))
}

/// Increment the patch component of `version`.
///
/// `"0.1.2"` becomes `"0.1.3"` and `"v1.2.9"` becomes `"v1.2.10"`.
pub fn bump_patch(version: &str) -> Result<String> {
    let parsed: ChartVersion = version.parse()?;
    Ok(parsed.next_patch()?.to_string())
}
