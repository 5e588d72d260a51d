//! Candidate line discovery.
//!
//! Candidates are prospective lines between sites that are close to each
//! other but not yet directly connected. The model's near-miss scan supplies
//! them; this module applies the local policy:
//!
//! - a hard length ceiling of `0.5 · scale` (longer lines are never worth it)
//! - deduplication by unordered site pair, keeping the first occurrence
//!
//! An empty scan or an empty pool is not an error; the search simply has
//! nothing to evaluate.

use avenue_core::{LineId, NetworkModel, SitePair};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::debug;

/// Distance policy for candidate discovery.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CandidatePolicy {
    /// Near-miss search radius
    pub near_distance: f64,
    /// Normalisation of network extent; the length ceiling is half of it
    pub scale: f64,
}

impl CandidatePolicy {
    pub fn new(near_distance: f64, scale: f64) -> Self {
        Self {
            near_distance,
            scale,
        }
    }

    /// Policy derived from the synthesis area the grid was built on.
    pub fn for_area(area: &crate::synthesis::Area) -> Self {
        Self::new(area.near_distance(), area.scale())
    }

    /// Longest admissible candidate, or `None` when the scale is degenerate
    /// (zero, negative or non-finite), meaning "no candidates".
    pub fn length_ceiling(&self) -> Option<f64> {
        if self.scale.is_finite() && self.scale > 0.0 {
            Some(0.5 * self.scale)
        } else {
            None
        }
    }
}

/// An inactive line eligible for addition.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Candidate {
    pub line: LineId,
    pub pair: SitePair,
    pub length: f64,
}

/// Deduplicated candidates, in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CandidatePool {
    candidates: Vec<Candidate>,
}

impl CandidatePool {
    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn as_slice(&self) -> &[Candidate] {
        &self.candidates
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Candidate> {
        self.candidates.iter()
    }

    pub fn get(&self, index: usize) -> Option<&Candidate> {
        self.candidates.get(index)
    }
}

impl FromIterator<Candidate> for CandidatePool {
    /// Collect candidates, keeping the first occurrence of each site pair.
    fn from_iter<I: IntoIterator<Item = Candidate>>(iter: I) -> Self {
        let mut seen = HashSet::new();
        let candidates = iter
            .into_iter()
            .filter(|c| seen.insert(c.pair))
            .collect();
        Self { candidates }
    }
}

impl<'a> IntoIterator for &'a CandidatePool {
    type Item = &'a Candidate;
    type IntoIter = std::slice::Iter<'a, Candidate>;

    fn into_iter(self) -> Self::IntoIter {
        self.candidates.iter()
    }
}

/// Build the candidate pool for the network's current topology.
pub fn generate_candidates<M>(network: &mut M, policy: &CandidatePolicy) -> CandidatePool
where
    M: NetworkModel + ?Sized,
{
    let Some(ceiling) = policy.length_ceiling() else {
        debug!(scale = policy.scale, "degenerate scale, no candidates");
        return CandidatePool::default();
    };

    let hits = network.near_miss_pairs(policy.near_distance);
    let scanned = hits.len();
    let pool: CandidatePool = hits
        .into_iter()
        .filter(|hit| hit.from != hit.to && !network.is_active(hit.line))
        .filter_map(|hit| {
            let line = network.line(hit.line)?;
            (line.length <= ceiling).then(|| Candidate {
                line: hit.line,
                pair: SitePair::new(hit.from, hit.to),
                length: line.length,
            })
        })
        .collect();

    debug!(scanned, kept = pool.len(), ceiling, "candidate pool built");
    pool
}
