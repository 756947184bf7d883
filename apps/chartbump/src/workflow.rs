//! Bump workflows.
//!
//! Single-chart mode: dependency update, lint, classify, bump, write,
//! re-lint. Batch mode: one auto-detect lint over the repository, then the
//! read/bump/write steps for every chart the report attributes a version
//! failure to. Nothing here prints; results are returned as reports.

use crate::config::Effective;
use crate::detect::{charts_needing_bump, needs_version_bump};
use crate::error::{Error, Result};
use crate::manifest::{manifest_path, read_manifest, update_version};
use crate::models::{
    BatchReport, BumpStatus, ChartBumpResult, ChartReport, DepUpdate, Outcome, Summary,
};
use crate::tools::ChartTools;
use crate::version::bump_patch;
use std::path::{Path, PathBuf};

/// Settings threaded through one workflow run.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub dry_run: bool,
    pub target_branch: Option<String>,
    /// Re-lint after writing (single-chart mode only)
    pub verify: bool,
    pub dep_update: bool,
    /// Base for chart paths reported by `ct` in batch mode
    pub repo_root: PathBuf,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            dry_run: false,
            target_branch: None,
            verify: true,
            dep_update: true,
            repo_root: PathBuf::from("."),
        }
    }
}

impl From<&Effective> for RunOptions {
    fn from(eff: &Effective) -> Self {
        Self {
            dry_run: eff.dry_run,
            target_branch: eff.target_branch.clone(),
            verify: eff.verify,
            dep_update: eff.dep_update,
            repo_root: eff.repo_root.clone(),
        }
    }
}

/// Read the chart version, compute the next patch and, unless `dry_run`,
/// write it back. Returns `(from, to)`.
fn bump_chart(chart_dir: &Path, dry_run: bool) -> Result<(String, String)> {
    let manifest = read_manifest(chart_dir)?;
    let from = manifest.version.trim().to_string();
    let to = bump_patch(&from)?;
    tracing::info!(chart = %chart_dir.display(), %from, %to, dry_run, "bumping chart version");
    if !dry_run {
        update_version(chart_dir, &to)?;
    }
    Ok((from, to))
}

/// Run the single-chart workflow on `chart_dir`.
///
/// Errors abort the run: a missing manifest, a lint failure that is not a
/// version problem (`ClassificationMismatch`), and any read, format or
/// write error. The last kind comes wrapped in `BumpFailed` together with
/// the lint output that called for the bump. A bump that does not fix the lint is reported as
/// [`Outcome::Unverified`] rather than an error, and is not rolled back.
pub fn run_single(
    chart_dir: &Path,
    opts: &RunOptions,
    tools: &dyn ChartTools,
) -> Result<ChartReport> {
    if !manifest_path(chart_dir).is_file() {
        return Err(Error::ManifestNotFound {
            dir: chart_dir.to_path_buf(),
        });
    }

    let dep_update = if opts.dep_update {
        match tools.dep_update(chart_dir) {
            Ok(()) => DepUpdate::Updated,
            Err(e) => {
                // charts without dependencies legitimately fail here
                tracing::warn!(chart = %chart_dir.display(), error = %e, "dependency update failed");
                DepUpdate::Failed {
                    reason: e.to_string(),
                }
            }
        }
    } else {
        DepUpdate::Skipped
    };

    let branch = opts.target_branch.as_deref();
    let lint = tools.lint(Some(chart_dir), branch)?;
    let chart = chart_dir.to_string_lossy().to_string();
    if lint.success {
        return Ok(ChartReport {
            chart,
            dep_update,
            lint_output: None,
            outcome: Outcome::Clean,
        });
    }

    if !needs_version_bump(&lint.output) {
        return Err(Error::ClassificationMismatch {
            output: lint.output,
        });
    }

    let (from, to) = bump_chart(chart_dir, opts.dry_run).map_err(|source| Error::BumpFailed {
        lint_output: lint.output.clone(),
        source: Box::new(source),
    })?;
    let outcome = if opts.dry_run {
        Outcome::DryRun { from, to }
    } else if !opts.verify {
        Outcome::Bumped {
            from,
            to,
            verified: false,
        }
    } else {
        let recheck = tools.lint(Some(chart_dir), branch)?;
        if recheck.success {
            Outcome::Bumped {
                from,
                to,
                verified: true,
            }
        } else {
            tracing::warn!(chart = %chart, "version bumped but ct lint still fails");
            Outcome::Unverified {
                from,
                to,
                lint_output: recheck.output,
            }
        }
    };

    Ok(ChartReport {
        chart,
        dep_update,
        lint_output: Some(lint.output),
        outcome,
    })
}

/// Run the batch workflow: let `ct` detect changed charts against the
/// target branch and bump every chart whose block reports a version issue.
///
/// One chart failing does not stop the others; failures are counted in the
/// summary.
pub fn run_batch(opts: &RunOptions, tools: &dyn ChartTools) -> Result<BatchReport> {
    let branch = opts.target_branch.as_deref().ok_or_else(|| {
        Error::Usage("--target-branch is required when no chart directory is specified".into())
    })?;

    let lint = tools.lint(None, Some(branch))?;
    if lint.success {
        return Ok(BatchReport {
            clean: true,
            lint_output: None,
            charts: Vec::new(),
            summary: Summary::default(),
        });
    }

    let targets = charts_needing_bump(&lint.output);
    if targets.is_empty() {
        return Err(Error::ClassificationMismatch {
            output: lint.output,
        });
    }
    tracing::info!(count = targets.len(), "charts requiring version bumps");

    let mut summary = Summary::default();
    let mut charts = Vec::with_capacity(targets.len());
    for chart in targets {
        let dir = opts.repo_root.join(&chart);
        let status = match bump_chart(&dir, opts.dry_run) {
            Ok((from, to)) => {
                summary.succeeded += 1;
                BumpStatus::Succeeded {
                    from,
                    to,
                    dry_run: opts.dry_run,
                }
            }
            Err(e) => {
                tracing::warn!(%chart, error = %e, "failed to bump chart");
                summary.failed += 1;
                BumpStatus::Failed {
                    reason: e.to_string(),
                }
            }
        };
        charts.push(ChartBumpResult { chart, status });
    }

    Ok(BatchReport {
        clean: false,
        lint_output: Some(lint.output),
        charts,
        summary,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::LintRun;
    use std::cell::RefCell;
    use std::fs;
    use tempfile::tempdir;

    /// Returns queued lint results in order and records invocations.
    struct Scripted {
        lints: RefCell<Vec<LintRun>>,
        calls: RefCell<Vec<String>>,
    }

    impl Scripted {
        fn new(lints: &[(bool, &str)]) -> Self {
            Self {
                lints: RefCell::new(
                    lints
                        .iter()
                        .rev()
                        .map(|(success, out)| LintRun {
                            success: *success,
                            output: out.to_string(),
                        })
                        .collect(),
                ),
                calls: RefCell::new(Vec::new()),
            }
        }
    }

    impl ChartTools for Scripted {
        fn dep_update(&self, _chart_dir: &Path) -> Result<()> {
            self.calls.borrow_mut().push("dep".into());
            Err(Error::Tool {
                tool: "helm dep update".into(),
                code: 1,
                output: "no repository definition".into(),
            })
        }

        fn lint(&self, chart: Option<&Path>, branch: Option<&str>) -> Result<LintRun> {
            self.calls.borrow_mut().push(format!(
                "lint {} {}",
                chart.map(|c| c.display().to_string()).unwrap_or_default(),
                branch.unwrap_or("")
            ));
            Ok(self.lints.borrow_mut().pop().expect("unexpected lint call"))
        }
    }

    fn chart_dir(version: &str) -> tempfile::TempDir {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("Chart.yaml"),
            format!("apiVersion: v2\nname: demo\nversion: {}\n", version),
        )
        .unwrap();
        dir
    }

    #[test]
    fn test_dep_update_failure_does_not_halt() {
        let dir = chart_dir("0.1.0");
        let tools = Scripted::new(&[(true, "")]);
        let report = run_single(dir.path(), &RunOptions::default(), &tools).unwrap();
        assert!(matches!(report.dep_update, DepUpdate::Failed { .. }));
        assert_eq!(report.outcome, Outcome::Clean);
        assert_eq!(tools.calls.borrow().len(), 2);
    }

    #[test]
    fn test_dep_update_can_be_skipped() {
        let dir = chart_dir("0.1.0");
        let tools = Scripted::new(&[(true, "")]);
        let opts = RunOptions {
            dep_update: false,
            ..RunOptions::default()
        };
        let report = run_single(dir.path(), &opts, &tools).unwrap();
        assert_eq!(report.dep_update, DepUpdate::Skipped);
        assert!(tools.calls.borrow().iter().all(|c| c != "dep"));
    }

    #[test]
    fn test_format_error_aborts_without_write() {
        let dir = chart_dir("1.2");
        let tools = Scripted::new(&[(false, "chart version not ok")]);
        let err = run_single(dir.path(), &RunOptions::default(), &tools).unwrap_err();
        match &err {
            Error::BumpFailed {
                lint_output,
                source,
            } => {
                assert_eq!(lint_output, "chart version not ok");
                assert!(matches!(**source, Error::Format { .. }));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(err.lint_output(), Some("chart version not ok"));
        assert!(err.to_string().starts_with("invalid version '1.2'"));
        let after = fs::read_to_string(dir.path().join("Chart.yaml")).unwrap();
        assert!(after.contains("version: 1.2\n"));
    }

    #[test]
    fn test_no_verify_skips_relint() {
        let dir = chart_dir("0.1.0");
        let tools = Scripted::new(&[(false, "needs a version bump")]);
        let opts = RunOptions {
            verify: false,
            ..RunOptions::default()
        };
        let report = run_single(dir.path(), &opts, &tools).unwrap();
        assert_eq!(
            report.outcome,
            Outcome::Bumped {
                from: "0.1.0".into(),
                to: "0.1.1".into(),
                verified: false
            }
        );
    }

    #[test]
    fn test_batch_requires_target_branch() {
        let tools = Scripted::new(&[]);
        let err = run_batch(&RunOptions::default(), &tools).unwrap_err();
        assert!(matches!(err, Error::Usage(_)));
        assert!(tools.calls.borrow().is_empty());
    }
}
