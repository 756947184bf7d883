//! Wrappers around the external `helm` and `ct` (chart-testing) binaries.
//!
//! The workflows only talk to [`ChartTools`], so tests can script lint
//! output without either binary installed.

use crate::error::{Error, Result};
use std::path::{Path, PathBuf};
use std::process::Command;

/// Captured result of one `ct lint` invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LintRun {
    pub success: bool,
    /// stdout followed by stderr
    pub output: String,
}

/// External collaborators used by the bump workflows.
pub trait ChartTools {
    /// Refresh chart dependencies (`helm dep update`).
    fn dep_update(&self, chart_dir: &Path) -> Result<()>;

    /// Lint one chart, or let `ct` detect changed charts when `chart` is `None`.
    ///
    /// A failing lint is not an error; only failing to run the tool is.
    fn lint(&self, chart: Option<&Path>, target_branch: Option<&str>) -> Result<LintRun>;
}

/// Runs the real binaries from `PATH` (or configured locations).
#[derive(Debug, Clone)]
pub struct HelmCli {
    pub helm_bin: String,
    pub ct_bin: String,
    pub ct_args: Vec<String>,
    /// Working directory for every invocation
    pub work_dir: PathBuf,
}

impl HelmCli {
    pub fn new(work_dir: impl Into<PathBuf>) -> Self {
        Self {
            helm_bin: "helm".to_string(),
            ct_bin: "ct".to_string(),
            ct_args: Vec::new(),
            work_dir: work_dir.into(),
        }
    }

    fn lint_args(&self, chart: Option<&Path>, target_branch: Option<&str>) -> Vec<String> {
        let mut args = vec!["lint".to_string()];
        if let Some(branch) = target_branch {
            args.push("--target-branch".to_string());
            args.push(branch.to_string());
        }
        if let Some(chart) = chart {
            args.push("--charts".to_string());
            args.push(chart.to_string_lossy().to_string());
        }
        args.extend(self.ct_args.iter().cloned());
        args
    }
}

impl ChartTools for HelmCli {
    fn dep_update(&self, chart_dir: &Path) -> Result<()> {
        tracing::debug!(bin = %self.helm_bin, chart = %chart_dir.display(), "helm dep update");
        let output = Command::new(&self.helm_bin)
            .args(["dep", "update"])
            .arg(chart_dir)
            .current_dir(&self.work_dir)
            .output()
            .map_err(|source| Error::Spawn {
                tool: self.helm_bin.clone(),
                source,
            })?;
        if output.status.success() {
            Ok(())
        } else {
            Err(Error::Tool {
                tool: "helm dep update".to_string(),
                code: output.status.code().unwrap_or(-1),
                output: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            })
        }
    }

    fn lint(&self, chart: Option<&Path>, target_branch: Option<&str>) -> Result<LintRun> {
        let args = self.lint_args(chart, target_branch);
        tracing::debug!(bin = %self.ct_bin, ?args, "ct lint");
        let output = Command::new(&self.ct_bin)
            .args(&args)
            .current_dir(&self.work_dir)
            .output()
            .map_err(|source| Error::Spawn {
                tool: self.ct_bin.clone(),
                source,
            })?;
        let mut text = String::from_utf8_lossy(&output.stdout).to_string();
        text.push_str(&String::from_utf8_lossy(&output.stderr));
        tracing::debug!(status = ?output.status.code(), "ct lint finished");
        Ok(LintRun {
            success: output.status.success(),
            output: text,
        })
    }
}
