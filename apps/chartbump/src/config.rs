//! Configuration discovery and effective settings resolution.
//!
//! chartbump reads `chartbump.toml|yaml|yml` from the repository root (or
//! closest ancestor) and merges it with CLI flags to produce an `Effective`
//! config.
//! Defaults:
//! - `targetBranch`: none (required for batch mode)
//! - `dryRun`: false
//! - `output`: `human`
//! - `verify`: true
//! - `tools.helm` / `tools.ct`: `helm` / `ct` from `PATH`
//! - `tools.depUpdate`: true
//!
//! Overrides precedence: CLI > config file > defaults.

use crate::error::{Error, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_FILES: [&str; 3] = ["chartbump.toml", "chartbump.yaml", "chartbump.yml"];

#[derive(Debug, Default, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
/// External tool settings under `[tools]`.
pub struct ToolsCfg {
    pub helm: Option<String>,
    pub ct: Option<String>,
    /// Extra arguments appended to every `ct lint` call
    #[serde(default)]
    pub ct_args: Option<Vec<String>>,
    pub dep_update: Option<bool>,
}

#[derive(Debug, Default, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
/// Root configuration loaded from `chartbump.toml|yaml`.
pub struct ChartbumpConfig {
    pub target_branch: Option<String>,
    pub dry_run: Option<bool>,
    pub output: Option<String>,
    pub verify: Option<bool>,
    #[serde(default)]
    pub tools: Option<ToolsCfg>,
}

/// CLI-provided overrides; `None` means "not given on the command line".
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    pub repo_root: Option<String>,
    pub target_branch: Option<String>,
    pub output: Option<String>,
    pub dry_run: Option<bool>,
    pub verify: Option<bool>,
}

#[derive(Debug, Clone)]
/// Fully-resolved configuration used by the workflows after applying precedence.
pub struct Effective {
    pub repo_root: PathBuf,
    pub config_file: Option<PathBuf>,
    pub target_branch: Option<String>,
    pub dry_run: bool,
    pub output: String,
    pub verify: bool,
    pub helm_bin: String,
    pub ct_bin: String,
    pub ct_args: Vec<String>,
    pub dep_update: bool,
}

/// Walk upward from `start` to detect the repository root.
///
/// Stops when a `chartbump.toml|yaml|yml` or a `.git` entry is found.
pub fn detect_repo_root(start: &Path) -> PathBuf {
    let mut cur = start;
    loop {
        if CONFIG_FILES.iter().any(|f| cur.join(f).exists()) || cur.join(".git").exists() {
            return cur.to_path_buf();
        }
        match cur.parent() {
            Some(p) => cur = p,
            None => return start.to_path_buf(),
        }
    }
}

/// Load `ChartbumpConfig` from the first config file present under `root`.
///
/// Returns `Ok(None)` when there is no config file; a file that exists but
/// cannot be read or parsed is an error.
pub fn load_config(root: &Path) -> Result<Option<(PathBuf, ChartbumpConfig)>> {
    for name in CONFIG_FILES {
        let path = root.join(name);
        if !path.is_file() {
            continue;
        }
        let s = fs::read_to_string(&path).map_err(|e| Error::Config {
            path: path.clone(),
            message: e.to_string(),
        })?;
        let cfg: std::result::Result<ChartbumpConfig, String> = if name.ends_with(".toml") {
            toml::from_str(&s).map_err(|e| e.to_string())
        } else {
            serde_yaml::from_str(&s).map_err(|e| e.to_string())
        };
        return match cfg {
            Ok(cfg) => Ok(Some((path, cfg))),
            Err(message) => Err(Error::Config { path, message }),
        };
    }
    Ok(None)
}

/// Absolute directory the repo root search starts from: `repo_root`
/// (default `.`) resolved against `cwd`. A relative start has no real
/// ancestors to walk.
pub fn search_start(repo_root: Option<&str>, cwd: &Path) -> PathBuf {
    let joined = cwd.join(repo_root.unwrap_or("."));
    std::path::absolute(&joined).unwrap_or(joined)
}

/// Resolve `Effective` by merging CLI flags, discovered config, and defaults.
pub fn resolve_effective(cli: &CliOverrides) -> Result<Effective> {
    let cwd = std::env::current_dir().map_err(|e| Error::io(".", e))?;
    let start = search_start(cli.repo_root.as_deref(), &cwd);
    let repo_root = detect_repo_root(&start);
    let (config_file, cfg) = match load_config(&repo_root)? {
        Some((path, cfg)) => (Some(path), cfg),
        None => (None, ChartbumpConfig::default()),
    };
    let tools = cfg.tools.unwrap_or_default();

    let target_branch = cli
        .target_branch
        .clone()
        .or(cfg.target_branch)
        .filter(|b| !b.trim().is_empty());

    let output = cli
        .output
        .clone()
        .or(cfg.output)
        .unwrap_or_else(|| "human".to_string());
    if output != "human" && output != "json" {
        return Err(Error::Usage(format!(
            "unknown output mode '{}' (expected human|json)",
            output
        )));
    }

    Ok(Effective {
        repo_root,
        config_file,
        target_branch,
        dry_run: cli.dry_run.or(cfg.dry_run).unwrap_or(false),
        output,
        verify: cli.verify.or(cfg.verify).unwrap_or(true),
        helm_bin: tools.helm.unwrap_or_else(|| "helm".to_string()),
        ct_bin: tools.ct.unwrap_or_else(|| "ct".to_string()),
        ct_args: tools.ct_args.unwrap_or_default(),
        dep_update: tools.dep_update.unwrap_or(true),
    })
}
