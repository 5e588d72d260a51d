use anyhow::{Context, Result};
use avenue_algo::synthesize_mst;
use avenue_cli::cli::GridArgs;
use avenue_cli::AvenueConfig;
use avenue_core::Grid;
use rand::{rngs::StdRng, Rng, SeedableRng};
use rayon::ThreadPoolBuilder;
use tracing::{info, warn};

/// Resolve a thread spec ("auto", "0" or a count) to a worker count.
pub fn thread_count(spec: &str) -> usize {
    if spec.eq_ignore_ascii_case("auto") {
        return num_cpus::get();
    }
    match spec.parse::<usize>() {
        Ok(0) | Err(_) => num_cpus::get(),
        Ok(n) => n,
    }
}

pub fn configure_threads(spec: &str) {
    let count = thread_count(spec);
    if ThreadPoolBuilder::new().num_threads(count).build_global().is_err() {
        warn!(count, "global thread pool already initialised");
    }
}

/// Apply command-line overrides to the loaded configuration.
pub fn apply_grid_args(config: &mut AvenueConfig, args: &GridArgs) {
    if let Some(sites) = args.sites {
        config.layout.count = sites;
    }
    if let Some(group_by) = args.group_by {
        config.layout.group_by = group_by;
    }
    if let Some(seed) = args.seed {
        config.runtime.seed = Some(seed);
    }
}

/// Synthesize the grid described by `config`. Returns the grid and the seed used.
pub fn build_grid(config: &AvenueConfig) -> Result<(Grid, u64)> {
    let seed = config
        .runtime
        .seed
        .unwrap_or_else(|| rand::thread_rng().gen());
    info!(
        seed,
        sites = config.layout.count,
        width = config.area.width,
        height = config.area.height,
        "synthesizing grid"
    );
    let mut rng = StdRng::seed_from_u64(seed);
    let grid = synthesize_mst(&config.layout, &config.area, config.model.clone(), &mut rng)
        .context("synthesizing grid")?;
    Ok((grid, seed))
}
