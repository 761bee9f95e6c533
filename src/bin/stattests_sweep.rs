//! stattests-sweep — run a preset parameter grid into a result cache.
//!
//! Every configuration already present under `--root` is skipped, so an
//! interrupted run is resumed by invoking the same command again.
use std::{error::Error, path::PathBuf, process::ExitCode};

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use rust_stattests::prelude::*;

#[derive(Debug, Parser)]
#[command(name = "stattests-sweep", version, about)]
struct Args {
    /// Cache root directory.
    #[arg(long, env = "STATTESTS_ROOT", default_value = "data")]
    root: PathBuf,

    /// Grid preset: beta, skew, success_rate or reference.
    #[arg(long, default_value = "reference")]
    preset: GridPreset,

    /// Repetitions per experiment (NN).
    #[arg(long, default_value_t = 2000)]
    nn: usize,

    /// Users per variant (N).
    #[arg(long, default_value_t = 5000)]
    n: usize,

    /// Base seed; omitted means fresh entropy for every generation.
    #[arg(long)]
    seed: Option<u64>,

    /// Reuse the AB seed for the AA generation of each point.
    #[arg(long, requires = "seed")]
    shared_seed: bool,

    /// Restrict the sweep to these codenames (comma-separated).
    #[arg(long = "estimators", value_delimiter = ',')]
    estimators: Vec<String>,

    #[arg(long, default_value_t = 2000)]
    n_bootstrap: usize,

    #[arg(long, default_value_t = 200)]
    n_buckets: usize,

    #[arg(long, default_value_t = 2000)]
    n_permutations: usize,

    #[arg(long, default_value_t = 200.0)]
    smoothing_factor: f64,

    /// Generate every point even when all of its entries are cached.
    #[arg(long)]
    no_skip: bool,
}

fn main() -> ExitCode {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "sweep aborted");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<(), Box<dyn Error>> {
    let registry = select_registry(&args.estimators)?;
    let options = EstimatorOptions::new(
        args.n_bootstrap,
        args.n_buckets,
        args.n_permutations,
        args.smoothing_factor,
        args.seed,
    )?;
    let seed_policy = match (args.seed, args.shared_seed) {
        (Some(seed), true) => SeedPolicy::Shared(seed),
        (Some(seed), false) => SeedPolicy::Independent(seed),
        (None, _) => SeedPolicy::Entropy,
    };

    let grid = SweepGrid::preset(args.preset, args.nn, args.n);
    info!(
        root = %args.root.display(),
        preset = ?args.preset,
        points = grid.len(),
        configurations = registry.len(),
        "starting sweep"
    );

    let mut sweep = SweepOrchestrator::new(
        ResultCache::new(&args.root),
        ClickGenerator::new(),
        StandardEstimators::new(options),
        registry,
        SweepOptions::new(seed_policy, !args.no_skip),
    );
    let report = sweep.run_points(&grid)?;
    info!(computed = report.computed(), skipped = report.skipped(), "sweep finished");
    Ok(())
}

/// The standard registry, or the subset named on the command line in
/// standard order.
fn select_registry(names: &[String]) -> Result<Vec<EstimatorConfig>, String> {
    let registry = standard_registry();
    if names.is_empty() {
        return Ok(registry);
    }
    let is_selected = |codename: &str| names.iter().any(|name| name.as_str() == codename);
    if let Some(unknown) =
        names.iter().find(|name| !registry.iter().any(|c| c.codename == name.as_str()))
    {
        return Err(format!("unknown estimator codename {unknown:?}"));
    }
    Ok(registry.into_iter().filter(|c| is_selected(c.codename)).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn select_registry_keeps_standard_order() {
        let names = vec!["permutation_test".to_string(), "delta".to_string()];
        let selected = select_registry(&names).unwrap();
        let codenames: Vec<&str> = selected.iter().map(|c| c.codename).collect();
        assert_eq!(codenames, vec!["delta", "permutation_test"]);
    }

    #[test]
    fn select_registry_rejects_unknown_codename() {
        let names = vec!["delta".to_string(), "z_test".to_string()];
        assert!(select_registry(&names).unwrap_err().contains("z_test"));
        assert_eq!(select_registry(&[]).unwrap().len(), 21);
    }

    #[test]
    fn args_parse_seed_and_subset() {
        let args = Args::try_parse_from([
            "stattests-sweep",
            "--root",
            "/tmp/cache",
            "--preset",
            "skew",
            "--seed",
            "7",
            "--estimators",
            "delta,buckets",
        ])
        .unwrap();
        assert_eq!(args.preset, GridPreset::Skew);
        assert_eq!(args.seed, Some(7));
        assert_eq!(args.estimators, vec!["delta", "buckets"]);
        assert!(Args::try_parse_from(["stattests-sweep", "--shared-seed"]).is_err());
    }
}
