//! Exhaustive, parallel what-if search over candidate subsets.
//!
//! Every subset of the candidate pool with 1..=`edge_limit` members is one
//! trial. A trial attaches its lines, recomputes the load flow, records the
//! loss and detaches the lines again. Trials never see each other's lines:
//!
//! - [`TrialIsolation::Cloned`] gives every rayon worker a private deep copy
//!   of the network, so trials run fully in parallel.
//! - [`TrialIsolation::Serialized`] shares the caller's network behind a
//!   single lock. Only enumeration and scoring stay parallel; the load flow
//!   runs one trial at a time.
//!
//! A trial whose load flow fails is skipped, counted in
//! [`SearchReport::failed`] and left out of the ranking.
//!
//! Trials are enumerated lazily and evaluated in chunks of
//! [`TRIAL_CHUNK`]. A search whose trial count exceeds
//! [`SearchConfig::max_trials`] is rejected before any trial runs.

use super::trial::{enumerate_trials, trial_count, ResultRow, DEFAULT_EDGE_LIMIT};
use crate::candidates::{generate_candidates, Candidate, CandidatePolicy, CandidatePool};
use crate::error::{AlgoError, AlgoResult};
use avenue_core::{AvenueResult, LineId, NetworkModel};
use parking_lot::Mutex;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Default ceiling on the number of trials one search may enumerate.
pub const DEFAULT_MAX_TRIALS: usize = 1_000_000;

/// Trials materialised and evaluated together.
pub const TRIAL_CHUNK: usize = 16_384;

/// How trials are kept from observing each other's attached lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrialIsolation {
    /// One deep copy of the network per worker thread
    #[default]
    Cloned,
    /// One shared network, attach/recompute/detach under an exclusive lock
    Serialized,
}

/// Search parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Largest subset evaluated
    pub edge_limit: usize,
    pub isolation: TrialIsolation,
    /// Searches enumerating more trials than this fail with
    /// [`AlgoError::TooManyTrials`]
    pub max_trials: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            edge_limit: DEFAULT_EDGE_LIMIT,
            isolation: TrialIsolation::default(),
            max_trials: DEFAULT_MAX_TRIALS,
        }
    }
}

impl SearchConfig {
    pub fn with_edge_limit(mut self, edge_limit: usize) -> Self {
        self.edge_limit = edge_limit;
        self
    }

    pub fn with_isolation(mut self, isolation: TrialIsolation) -> Self {
        self.isolation = isolation;
        self
    }

    pub fn with_max_trials(mut self, max_trials: usize) -> Self {
        self.max_trials = max_trials;
        self
    }
}

/// Outcome of one search.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SearchReport {
    /// Successful trials, ascending by score
    pub rows: Vec<ResultRow>,
    /// The candidate pool the trials were drawn from
    pub pool: CandidatePool,
    /// Trials enumerated
    pub trials: usize,
    /// Trials skipped because the model failed to evaluate them
    pub failed: usize,
}

/// Discover candidates on `network` and rank every subset of at most
/// `config.edge_limit` of them.
///
/// On return the network's active lines are exactly what they were on entry.
/// Lines registered by the near-miss scan stay registered (inactive).
pub fn run_search<M>(
    network: &mut M,
    policy: &CandidatePolicy,
    config: &SearchConfig,
) -> AlgoResult<SearchReport>
where
    M: NetworkModel + Clone + Send + Sync,
{
    let pool = generate_candidates(network, policy);
    let total = trial_count(pool.len(), config.edge_limit);
    if total > config.max_trials {
        warn!(
            candidates = pool.len(),
            trials = total,
            max_trials = config.max_trials,
            "search rejected, too many trials"
        );
        return Err(AlgoError::TooManyTrials {
            candidates: pool.len(),
            edge_limit: config.edge_limit,
            trials: total,
            max_trials: config.max_trials,
        });
    }

    info!(
        candidates = pool.len(),
        trials = total,
        edge_limit = config.edge_limit,
        isolation = ?config.isolation,
        "starting congestion search"
    );

    let mut rows = Vec::new();
    let mut failed = 0;
    let mut trials = enumerate_trials(pool.len(), config.edge_limit);
    let mut chunk: Vec<Vec<usize>> = Vec::with_capacity(TRIAL_CHUNK.min(total));
    loop {
        chunk.clear();
        chunk.extend(trials.by_ref().take(TRIAL_CHUNK));
        if chunk.is_empty() {
            break;
        }

        let outcomes = match config.isolation {
            TrialIsolation::Cloned => evaluate_cloned(network, &pool, &chunk),
            TrialIsolation::Serialized => evaluate_serialized(network, &pool, &chunk),
        };
        for (trial, outcome) in chunk.iter().zip(outcomes) {
            match outcome {
                Ok(row) => rows.push(row),
                Err(err) => {
                    failed += 1;
                    debug!(?trial, error = %err, "trial skipped");
                }
            }
        }
    }
    if config.isolation == TrialIsolation::Serialized {
        network.recompute()?;
    }
    if failed > 0 {
        warn!(failed, total, "some trials failed and were excluded");
    }

    // Stable: equal scores keep enumeration order.
    rows.sort_by(|a, b| a.score.total_cmp(&b.score));

    info!(
        rows = rows.len(),
        best_score = rows.first().map(|r| r.score),
        "congestion search complete"
    );

    Ok(SearchReport {
        rows,
        pool,
        trials: total,
        failed,
    })
}

/// Rank candidate augmentations for `network`, returning only the rows.
pub fn search_congestion_reduction<M>(
    network: &mut M,
    policy: &CandidatePolicy,
    edge_limit: usize,
) -> AlgoResult<Vec<ResultRow>>
where
    M: NetworkModel + Clone + Send + Sync,
{
    let config = SearchConfig::default().with_edge_limit(edge_limit);
    Ok(run_search(network, policy, &config)?.rows)
}

fn evaluate_cloned<M>(
    network: &M,
    pool: &CandidatePool,
    trials: &[Vec<usize>],
) -> Vec<AvenueResult<ResultRow>>
where
    M: NetworkModel + Clone + Send + Sync,
{
    trials
        .par_iter()
        .map_init(|| network.clone(), |local, trial| evaluate_trial(local, pool, trial))
        .collect()
}

fn evaluate_serialized<M>(
    network: &mut M,
    pool: &CandidatePool,
    trials: &[Vec<usize>],
) -> Vec<AvenueResult<ResultRow>>
where
    M: NetworkModel + Send,
{
    let shared = Mutex::new(network);
    trials
        .par_iter()
        .map(|trial| {
            let mut guard = shared.lock();
            evaluate_trial(&mut **guard, pool, trial)
        })
        .collect()
}

/// Attach, recompute, detach. The network's active set is restored whether
/// or not the load flow succeeds.
pub(crate) fn evaluate_trial<M>(
    network: &mut M,
    pool: &CandidatePool,
    trial: &[usize],
) -> AvenueResult<ResultRow>
where
    M: NetworkModel + ?Sized,
{
    let candidates: Vec<Candidate> = trial.iter().filter_map(|&i| pool.get(i).cloned()).collect();
    let lines: Vec<LineId> = candidates.iter().map(|c| c.line).collect();

    let mut attached = Vec::with_capacity(lines.len());
    let outcome = attach_lines(network, &lines, &mut attached).and_then(|()| network.recompute());
    detach_lines(network, &attached)?;

    let state = outcome?;
    Ok(ResultRow::new(candidates, state.loss_percent))
}

/// Attach every line, recording the ones that were not already active.
pub(crate) fn attach_lines<M>(
    network: &mut M,
    lines: &[LineId],
    attached: &mut Vec<LineId>,
) -> AvenueResult<()>
where
    M: NetworkModel + ?Sized,
{
    for &line in lines {
        if network.is_active(line) {
            continue;
        }
        network.attach(line)?;
        attached.push(line);
    }
    Ok(())
}

pub(crate) fn detach_lines<M>(network: &mut M, lines: &[LineId]) -> AvenueResult<()>
where
    M: NetworkModel + ?Sized,
{
    for &line in lines.iter().rev() {
        network.detach(line)?;
    }
    Ok(())
}
