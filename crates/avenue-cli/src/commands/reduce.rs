//! `avenue reduce`: rank candidate lines for a synthesized grid and
//! optionally apply one of them.

use anyhow::{Context, Result};
use avenue_algo::{CandidatePolicy, CongestionPlanner, ResultRow, TrialIsolation};
use avenue_cli::cli::{GridArgs, OutputFormat};
use avenue_cli::AvenueConfig;
use avenue_core::GridSummary;
use serde::Serialize;
use std::io::{self, Write};
use tabwriter::TabWriter;
use tracing::info;

use crate::commands::util::{apply_grid_args, build_grid};

/// Search overrides taken from the command line.
#[derive(Debug, Clone, Default)]
pub struct ReduceArgs {
    pub edge_limit: Option<usize>,
    pub max_trials: Option<usize>,
    pub near_distance: Option<f64>,
    pub isolation: Option<TrialIsolation>,
    pub top: usize,
    pub select: Option<usize>,
}

#[derive(Debug, Serialize)]
struct ReduceOutput<'a> {
    seed: u64,
    baseline: GridSummary,
    candidates: usize,
    trials: usize,
    failed: usize,
    rows: &'a [ResultRow],
    applied: Option<AppliedOutput<'a>>,
}

#[derive(Debug, Serialize)]
struct AppliedOutput<'a> {
    rank: usize,
    row: &'a ResultRow,
    summary: GridSummary,
}

pub fn handle(
    mut config: AvenueConfig,
    grid_args: &GridArgs,
    args: &ReduceArgs,
    format: OutputFormat,
) -> Result<()> {
    apply_grid_args(&mut config, grid_args);
    if let Some(edge_limit) = args.edge_limit {
        config.search.edge_limit = edge_limit;
    }
    if let Some(max_trials) = args.max_trials {
        config.search.max_trials = max_trials;
    }
    if let Some(isolation) = args.isolation {
        config.search.isolation = isolation;
    }
    let mut policy = CandidatePolicy::for_area(&config.area);
    if let Some(near_distance) = args.near_distance {
        policy.near_distance = near_distance;
    }

    let (grid, seed) = build_grid(&config)?;
    let mut planner = CongestionPlanner::new(grid, policy, config.search)
        .context("solving baseline load flow")?;
    let baseline = GridSummary::new(planner.network(), planner.flow_state());

    planner.search().context(
        "running congestion search (lower --edge-limit or --near-distance, \
         or raise --max-trials / search.max_trials)",
    )?;
    info!(rows = planner.rows().len(), "search finished");

    let applied_summary = match args.select {
        Some(rank) => {
            planner
                .select(Some(rank))
                .with_context(|| format!("applying row {rank}"))?;
            Some(GridSummary::new(planner.network(), planner.flow_state()))
        }
        None => None,
    };

    let report = planner.report();
    let shown = &report.rows[..args.top.min(report.rows.len())];
    let applied = args
        .select
        .zip(applied_summary)
        .zip(planner.applied_row())
        .map(|((rank, summary), row)| AppliedOutput { rank, row, summary });

    match format {
        OutputFormat::Plain => {
            println!("Seed:\t\t{seed}");
            println!("{baseline}");
            println!();
            println!(
                "{} candidates, {} trials ({} failed)",
                report.pool.len(),
                report.trials,
                report.failed
            );
            print_rows(shown)?;
            if let Some(applied) = &applied {
                println!();
                println!("Applied row {}:", applied.rank);
                println!("{}", applied.summary);
            }
        }
        OutputFormat::Json => {
            let output = ReduceOutput {
                seed,
                baseline,
                candidates: report.pool.len(),
                trials: report.trials,
                failed: report.failed,
                rows: shown,
                applied,
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }
    Ok(())
}

fn print_rows(rows: &[ResultRow]) -> Result<()> {
    let mut writer = TabWriter::new(io::stdout());
    writeln!(writer, "RANK\tEDGES\tLENGTH\tTX LOSS (%)\tSCORE\tLINES")?;
    for (rank, row) in rows.iter().enumerate() {
        let pairs: Vec<String> = row.candidates.iter().map(|c| c.pair.to_string()).collect();
        writeln!(
            writer,
            "{}\t{}\t{:.2}\t{:.2}\t{:.3}\t{}",
            rank,
            row.edges,
            row.length,
            row.loss,
            row.score,
            pairs.join(" ")
        )?;
    }
    writer.flush()?;
    Ok(())
}
