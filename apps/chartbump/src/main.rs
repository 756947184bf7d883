//! chartbump CLI binary entry point.
//! Resolves configuration, runs the single-chart or batch workflow and
//! prints the result.

use chartbump::cli::Cli;
use chartbump::tools::HelmCli;
use chartbump::workflow::{run_batch, run_single, RunOptions};
use chartbump::{config, output, utils};
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

fn init_tracing(verbose: bool) {
    // RUST_LOG wins; otherwise only errors unless --verbose
    let default = if verbose { "debug" } else { "error" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(verbose)
        .try_init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let eff = match config::resolve_effective(&cli.overrides()) {
        Ok(eff) => eff,
        Err(e) => {
            eprintln!("{} {}", utils::error_prefix(), e);
            std::process::exit(e.exit_code());
        }
    };
    match &eff.config_file {
        Some(p) => tracing::debug!(config = %p.display(), "loaded config"),
        None => tracing::debug!("no chartbump config found; using defaults"),
    }

    let tools = HelmCli {
        helm_bin: eff.helm_bin.clone(),
        ct_bin: eff.ct_bin.clone(),
        ct_args: eff.ct_args.clone(),
        work_dir: eff.repo_root.clone(),
    };
    let opts = RunOptions::from(&eff);
    let out = eff.output.as_str();

    let success = match cli.chart_dir {
        Some(dir) => {
            // ct runs from the repository root, so hand it an absolute path
            let path = std::path::absolute(&dir).unwrap_or_else(|_| PathBuf::from(&dir));
            let shown = utils::rel_to_wd(&path);
            output::print_start(Some(&shown), opts.target_branch.as_deref(), out);
            match run_single(&path, &opts, &tools) {
                Ok(mut report) => {
                    report.chart = shown;
                    output::print_single(&report, out);
                    report.is_success()
                }
                Err(e) => {
                    output::print_error(&e, out);
                    std::process::exit(e.exit_code());
                }
            }
        }
        None => {
            if opts.target_branch.is_some() {
                output::print_start(None, opts.target_branch.as_deref(), out);
            }
            match run_batch(&opts, &tools) {
                Ok(report) => {
                    output::print_batch(&report, out);
                    report.is_success()
                }
                Err(e) => {
                    output::print_error(&e, out);
                    std::process::exit(e.exit_code());
                }
            }
        }
    };

    if !success {
        std::process::exit(1);
    }
}
