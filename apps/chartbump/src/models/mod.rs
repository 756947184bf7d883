//! Shared data models: the chart manifest and per-run reports consumed by
//! the output printers.

pub mod chart;

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
/// What happened to `helm dep update` before linting.
pub enum DepUpdate {
    Updated,
    /// Failure is reported but never stops the workflow.
    Failed { reason: String },
    Skipped,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
/// Terminal state of the single-chart workflow.
pub enum Outcome {
    /// Lint passed; nothing to do.
    Clean,
    /// Bump computed but not written.
    DryRun { from: String, to: String },
    /// Manifest written. `verified` is false when re-linting was disabled.
    Bumped {
        from: String,
        to: String,
        verified: bool,
    },
    /// Manifest written but lint still fails. The write is not rolled back.
    Unverified {
        from: String,
        to: String,
        #[serde(rename = "lintOutput")]
        lint_output: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
/// Result of the single-chart workflow.
pub struct ChartReport {
    pub chart: String,
    pub dep_update: DepUpdate,
    /// Output of the first lint run when it failed
    pub lint_output: Option<String>,
    pub outcome: Outcome,
}

impl ChartReport {
    pub fn is_success(&self) -> bool {
        !matches!(self.outcome, Outcome::Unverified { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
/// Per-chart result in batch mode.
pub enum BumpStatus {
    Succeeded {
        from: String,
        to: String,
        #[serde(rename = "dryRun")]
        dry_run: bool,
    },
    Failed {
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
/// One chart processed by the batch workflow.
pub struct ChartBumpResult {
    pub chart: String,
    #[serde(flatten)]
    pub status: BumpStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
/// Success/failure counts of a batch run.
pub struct Summary {
    pub succeeded: usize,
    pub failed: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
/// Result of the batch (auto-detect) workflow.
pub struct BatchReport {
    /// True when lint passed for every changed chart.
    pub clean: bool,
    pub lint_output: Option<String>,
    pub charts: Vec<ChartBumpResult>,
    pub summary: Summary,
}

impl BatchReport {
    pub fn is_success(&self) -> bool {
        self.summary.failed == 0
    }
}
