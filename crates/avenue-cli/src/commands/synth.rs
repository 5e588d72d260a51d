//! `avenue synth`: build a minimum spanning grid and report its status.

use anyhow::{Context, Result};
use avenue_cli::cli::{GridArgs, OutputFormat};
use avenue_cli::AvenueConfig;
use avenue_core::GridSummary;
use serde::Serialize;

use crate::commands::util::{apply_grid_args, build_grid};

#[derive(Debug, Serialize)]
struct SynthOutput {
    seed: u64,
    generators: usize,
    summary: GridSummary,
}

pub fn handle(mut config: AvenueConfig, grid_args: &GridArgs, format: OutputFormat) -> Result<()> {
    apply_grid_args(&mut config, grid_args);
    let (mut grid, seed) = build_grid(&config)?;
    let summary = grid.summary().context("solving load flow")?;

    match format {
        OutputFormat::Plain => {
            println!("Seed:\t\t{seed}");
            println!("Generators:\t{}", grid.generators().len());
            println!("{summary}");
        }
        OutputFormat::Json => {
            let output = SynthOutput {
                seed,
                generators: grid.generators().len(),
                summary,
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }
    Ok(())
}
