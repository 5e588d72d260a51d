//! Trial enumeration, scoring, and ranked result rows.

use crate::candidates::Candidate;
use avenue_core::LineId;
use serde::Serialize;

/// Largest augmentation evaluated by default.
pub const DEFAULT_EDGE_LIMIT: usize = 4;

/// Superlinear weight on loss in the ranking score.
pub const LOSS_EXPONENT: f64 = 1.35;

/// Cost/benefit score of an augmentation; lower is better.
///
/// ```text
/// score = loss^1.35 + loss · total_length
/// ```
pub fn score(loss: f64, total_length: f64) -> f64 {
    let loss = loss.max(0.0);
    loss.powf(LOSS_EXPONENT) + loss * total_length
}

/// Number of trials for a pool of `m` candidates and subset limit `k`:
/// Σ_{i=1..min(k,m)} C(m, i). Saturates at `usize::MAX`.
pub fn trial_count(m: usize, k: usize) -> usize {
    let mut total: u128 = 0;
    let mut c: u128 = 1;
    for i in 1..=k.min(m) {
        c = c * (m - i + 1) as u128 / i as u128;
        total = total.saturating_add(c);
    }
    usize::try_from(total).unwrap_or(usize::MAX)
}

/// Index subsets of size `r` from `0..n` in lexicographic order.
#[derive(Debug, Clone)]
pub struct Combinations {
    n: usize,
    indices: Vec<usize>,
    started: bool,
    exhausted: bool,
}

impl Combinations {
    pub fn new(n: usize, r: usize) -> Self {
        Self {
            n,
            indices: (0..r).collect(),
            started: false,
            exhausted: r == 0 || r > n,
        }
    }
}

impl Iterator for Combinations {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.exhausted {
            return None;
        }
        if !self.started {
            self.started = true;
            return Some(self.indices.clone());
        }
        let r = self.indices.len();
        let pivot = (0..r).rev().find(|&i| self.indices[i] != i + self.n - r);
        match pivot {
            Some(i) => {
                self.indices[i] += 1;
                for j in i + 1..r {
                    self.indices[j] = self.indices[j - 1] + 1;
                }
                Some(self.indices.clone())
            }
            None => {
                self.exhausted = true;
                None
            }
        }
    }
}

/// Every subset of `0..pool_len` with 1..=`edge_limit` members: all singles
/// first, then all pairs, and so on.
pub fn enumerate_trials(pool_len: usize, edge_limit: usize) -> impl Iterator<Item = Vec<usize>> {
    (1..=edge_limit.min(pool_len)).flat_map(move |r| Combinations::new(pool_len, r))
}

/// The evaluated, ranked outcome of one trial. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultRow {
    /// Number of lines in the augmentation
    pub edges: usize,
    /// Total added length, rounded to 2 decimals
    pub length: f64,
    /// Resulting transmission loss (percent), rounded to 2 decimals
    pub loss: f64,
    /// Ranking score. Length enters unrounded; loss is the model's
    /// `loss_percent`, which is already rounded to 2 decimals
    pub score: f64,
    pub candidates: Vec<Candidate>,
}

impl ResultRow {
    pub fn new(candidates: Vec<Candidate>, loss: f64) -> Self {
        let length: f64 = candidates.iter().map(|c| c.length).sum();
        Self {
            edges: candidates.len(),
            length: round2(length),
            loss: round2(loss),
            score: score(loss, length),
            candidates,
        }
    }

    pub fn lines(&self) -> impl Iterator<Item = LineId> + '_ {
        self.candidates.iter().map(|c| c.line)
    }

    /// Same set of lines, regardless of order or row position.
    pub fn same_candidates(&self, other: &ResultRow) -> bool {
        let mut mine: Vec<LineId> = self.lines().collect();
        let mut theirs: Vec<LineId> = other.lines().collect();
        mine.sort_unstable();
        theirs.sort_unstable();
        mine == theirs
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
