//! CLI argument parsing via `clap`.

use crate::config::CliOverrides;
use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "chartbump",
    version,
    about = "Automatically bump Helm chart versions based on ct lint output",
    long_about = "chartbump runs ct lint (chart-testing) on a chart directory and bumps the patch version in Chart.yaml when the lint reports that the chart version was not incremented.\n\nIf no chart directory is given, ct lint runs against --target-branch to auto-detect changed charts, and every chart reported as needing a version bump is bumped.\n\nConfiguration precedence: CLI > chartbump.toml > defaults.",
    after_help = "Examples:\n  chartbump charts/mychart\n  chartbump charts/mychart --dry-run\n  chartbump --target-branch main\n  chartbump --target-branch main --output json"
)]
/// Top-level CLI options.
pub struct Cli {
    #[arg(help = "Chart directory containing Chart.yaml (omit for auto-detect mode)")]
    pub chart_dir: Option<String>,
    #[arg(long, action = clap::ArgAction::SetTrue, help = "Show what would change without modifying files")]
    pub dry_run: bool,
    #[arg(long, help = "Git branch to compare against (required without a chart directory)")]
    pub target_branch: Option<String>,
    #[arg(long, help = "Repository root (default: current dir)")]
    pub repo_root: Option<String>,
    #[arg(long, help = "Output mode: human|json (default: human)")]
    pub output: Option<String>,
    #[arg(long, action = clap::ArgAction::SetTrue, help = "Do not re-run ct lint after writing Chart.yaml")]
    pub no_verify: bool,
    #[arg(short, long, action = clap::ArgAction::SetTrue, help = "Enable debug logging")]
    pub verbose: bool,
}

impl Cli {
    /// Flags that take precedence over the config file.
    pub fn overrides(&self) -> CliOverrides {
        CliOverrides {
            repo_root: self.repo_root.clone(),
            target_branch: self.target_branch.clone(),
            output: self.output.clone(),
            dry_run: self.dry_run.then_some(true),
            verify: self.no_verify.then_some(false),
        }
    }
}
