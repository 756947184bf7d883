//! Error kinds surfaced by the manifest editor, version arithmetic,
//! external tool wrappers, and the bump workflows.

use std::path::PathBuf;

/// Result type used across chartbump.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while bumping a chart.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Chart manifest could not be read or written.
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Chart manifest is not a well-formed YAML mapping.
    #[error("failed to parse {}: {message}", .path.display())]
    Parse { path: PathBuf, message: String },

    /// Manifest parsed but declares no (or an empty) `version`.
    #[error("{} does not contain a version field", .path.display())]
    MissingField { path: PathBuf },

    /// No top-level `version` key to rewrite.
    #[error("version field not found in {}", .path.display())]
    FieldNotFound { path: PathBuf },

    /// Chart directory has no `Chart.yaml`.
    #[error("Chart.yaml not found in directory: {}", .dir.display())]
    ManifestNotFound { dir: PathBuf },

    /// Version string is not `X.Y.Z` (optionally `v`-prefixed).
    #[error("invalid version '{version}': {reason}")]
    Format { version: String, reason: String },

    /// External tool exited non-zero.
    #[error("{tool} failed (exit code {code}): {output}")]
    Tool {
        tool: String,
        code: i32,
        output: String,
    },

    /// External tool could not be started at all.
    #[error("failed to run {tool}: {source}")]
    Spawn {
        tool: String,
        #[source]
        source: std::io::Error,
    },

    /// Lint failed for reasons that are not a missing version bump.
    #[error("ct lint failed with non-version issues")]
    ClassificationMismatch { output: String },

    /// Lint asked for a version bump, but reading, bumping or writing the
    /// manifest failed.
    #[error("{source}")]
    BumpFailed {
        lint_output: String,
        #[source]
        source: Box<Error>,
    },

    /// Config file exists but cannot be used.
    #[error("invalid config {}: {message}", .path.display())]
    Config { path: PathBuf, message: String },

    /// Invalid combination of command-line arguments.
    #[error("{0}")]
    Usage(String),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn format(version: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Format {
            version: version.into(),
            reason: reason.into(),
        }
    }

    /// Process exit code for this error: 2 for usage/config problems,
    /// 1 for everything that went wrong during a run.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::Usage(_) | Error::Config { .. } => 2,
            Error::BumpFailed { source, .. } => source.exit_code(),
            _ => 1,
        }
    }

    /// Lint text the error was raised on, if any.
    pub fn lint_output(&self) -> Option<&str> {
        match self {
            Error::ClassificationMismatch { output } => Some(output),
            Error::BumpFailed { lint_output, .. } => Some(lint_output),
            _ => None,
        }
    }
}
