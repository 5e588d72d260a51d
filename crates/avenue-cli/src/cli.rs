use avenue_algo::TrialIsolation;
use clap::{CommandFactory, Parser, Subcommand, ValueEnum, ValueHint};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "Synthetic transmission grid planner", long_about = None)]
pub struct Cli {
    /// Set the logging level (overridden by RUST_LOG)
    #[arg(long, default_value = "info", global = true)]
    pub log_level: tracing::Level,

    /// Configuration file (defaults to ~/.avenue/config.toml)
    #[arg(long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Worker threads ("auto" or a number); overrides runtime.worker_threads
    #[arg(long, global = true)]
    pub threads: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Synthesize a minimum spanning grid and print its status
    Synth {
        #[command(flatten)]
        grid: GridArgs,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Plain)]
        format: OutputFormat,
    },
    /// Rank candidate lines that reduce transmission loss on a synthesized grid
    Reduce {
        #[command(flatten)]
        grid: GridArgs,

        /// Largest number of lines added together in one trial
        #[arg(long)]
        edge_limit: Option<usize>,

        /// Refuse searches that would evaluate more trials than this
        /// (overrides search.max_trials)
        #[arg(long)]
        max_trials: Option<usize>,

        /// Near-miss search radius (defaults to three quarters of the area scale)
        #[arg(long)]
        near_distance: Option<f64>,

        /// How trials are isolated from each other
        #[arg(long, value_enum)]
        isolation: Option<IsolationArg>,

        /// Number of ranked rows to print
        #[arg(long, default_value_t = 10)]
        top: usize,

        /// Apply the row at this rank and report the resulting grid status
        #[arg(long)]
        select: Option<usize>,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Plain)]
        format: OutputFormat,
    },
}

/// Grid synthesis overrides shared by every subcommand.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct GridArgs {
    /// Number of sites (overrides layout.count)
    #[arg(long)]
    pub sites: Option<usize>,

    /// Sites served by each generator (overrides layout.group_by)
    #[arg(long)]
    pub group_by: Option<usize>,

    /// RNG seed for site placement (overrides runtime.seed)
    #[arg(long)]
    pub seed: Option<u64>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Plain,
    Json,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum IsolationArg {
    Cloned,
    Serialized,
}

impl From<IsolationArg> for TrialIsolation {
    fn from(arg: IsolationArg) -> Self {
        match arg {
            IsolationArg::Cloned => TrialIsolation::Cloned,
            IsolationArg::Serialized => TrialIsolation::Serialized,
        }
    }
}

pub fn build_cli_command() -> clap::Command {
    Cli::command()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_cli() {
        build_cli_command().debug_assert();
    }

    #[test]
    fn parses_reduce_flags() {
        let cli = Cli::parse_from([
            "avenue",
            "reduce",
            "--sites",
            "50",
            "--edge-limit",
            "2",
            "--select",
            "0",
            "--isolation",
            "serialized",
            "--format",
            "json",
        ]);
        match cli.command {
            Commands::Reduce {
                grid,
                edge_limit,
                select,
                isolation,
                format,
                ..
            } => {
                assert_eq!(grid.sites, Some(50));
                assert_eq!(edge_limit, Some(2));
                assert_eq!(select, Some(0));
                assert_eq!(isolation, Some(IsolationArg::Serialized));
                assert_eq!(format, OutputFormat::Json);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}
