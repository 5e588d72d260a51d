use anyhow::{Context, Result};
use avenue_cli::cli::{Cli, Commands};
use avenue_cli::AvenueConfig;
use clap::Parser;
use tracing::{debug, error};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

mod commands;

use commands::reduce::ReduceArgs;
use commands::util::configure_threads;
use commands::{reduce, synth};

fn load_config(cli: &Cli) -> Result<AvenueConfig> {
    let config = match &cli.config {
        Some(path) => AvenueConfig::load_from(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => AvenueConfig::load().context("loading ~/.avenue/config.toml")?,
    };
    debug!(?config, "configuration loaded");
    Ok(config)
}

fn run(cli: Cli) -> Result<()> {
    let config = load_config(&cli)?;
    let threads = cli
        .threads
        .clone()
        .unwrap_or_else(|| config.runtime.worker_threads.to_string());
    configure_threads(&threads);

    match &cli.command {
        Commands::Synth { grid, format } => synth::handle(config, grid, *format),
        Commands::Reduce {
            grid,
            edge_limit,
            max_trials,
            near_distance,
            isolation,
            top,
            select,
            format,
        } => {
            let args = ReduceArgs {
                edge_limit: *edge_limit,
                max_trials: *max_trials,
                near_distance: *near_distance,
                isolation: isolation.map(Into::into),
                top: *top,
                select: *select,
            };
            reduce::handle(config, grid, &args, *format)
        }
    }
}

fn main() {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cli.log_level.to_string()));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        eprintln!("warning: a tracing subscriber is already installed");
    }

    if let Err(err) = run(cli) {
        error!("{err:#}");
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}
