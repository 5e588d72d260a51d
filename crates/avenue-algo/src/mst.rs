//! Minimum spanning tree by filter-Kruskal.
//!
//! The candidate set is every unordered site pair, so it grows quadratically
//! with the site count. Filter-Kruskal avoids sorting all of it:
//!
//! ```text
//! solve(E):
//!   if |E| small:  sort E, scan with union-find
//!   else:
//!     pick pivot p
//!     E≤ = { e ∈ E | key(e) ≤ key(p) },  E> = the rest
//!     solve(E≤)
//!     E> ← { (u,v) ∈ E> | find(u) ≠ find(v) }      (filter)
//!     solve(E>)
//! ```
//!
//! Most long edges are discarded by the filter before they are ever sorted.
//! Partitioning and filtering are data-parallel and run on the rayon pool
//! once a bucket is large enough to pay for it.
//!
//! Keys are `(length, candidate index)`, so equal-length edges are accepted
//! in candidate order and the resulting tree is deterministic.
//!
//! Reference: Osipov, Sanders, Singler (2009), "The Filter-Kruskal Minimum
//! Spanning Tree Algorithm".

use crate::union_find::UnionFind;
use avenue_core::{Site, SiteId};
use rayon::prelude::*;
use std::cmp::Ordering;
use tracing::debug;

/// Buckets at or below this size are sorted and scanned directly.
const BASE_CASE: usize = 256;
/// Buckets at or above this size are partitioned/filtered in parallel.
const PARALLEL_CUTOFF: usize = 16_384;

/// A weighted candidate edge for tree construction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpanEdge {
    /// Position in the original candidate list (tie-breaker)
    pub index: usize,
    pub a: SiteId,
    pub b: SiteId,
    pub length: f64,
}

fn key_cmp(x: &SpanEdge, y: &SpanEdge) -> Ordering {
    x.length
        .total_cmp(&y.length)
        .then_with(|| x.index.cmp(&y.index))
}

/// Every unordered site pair in combination order: (0,1), (0,2), ..., (1,2), ...
pub fn complete_edges(sites: &[Site]) -> Vec<SpanEdge> {
    let n = sites.len();
    let mut edges = Vec::with_capacity(n * n.saturating_sub(1) / 2);
    for i in 0..n {
        for j in (i + 1)..n {
            edges.push(SpanEdge {
                index: edges.len(),
                a: sites[i].id,
                b: sites[j].id,
                length: sites[i].distance_to(&sites[j]),
            });
        }
    }
    edges
}

/// Minimum-total-length spanning tree over the complete graph of `sites`.
///
/// Returns `sites.len() - 1` edges in acceptance (ascending key) order;
/// empty for zero or one site.
pub fn minimum_spanning_edges(sites: &[Site]) -> Vec<SpanEdge> {
    filter_kruskal(sites.len(), complete_edges(sites))
}

/// Filter-Kruskal over an arbitrary edge list whose endpoints are ids
/// `0..site_count`. Returns a minimum spanning forest.
pub fn filter_kruskal(site_count: usize, edges: Vec<SpanEdge>) -> Vec<SpanEdge> {
    let mut state = Kruskal {
        uf: UnionFind::new(site_count),
        tree: Vec::with_capacity(site_count.saturating_sub(1)),
        target: site_count.saturating_sub(1),
    };
    debug!(sites = site_count, edges = edges.len(), "filter-kruskal start");
    state.solve(edges);
    state.tree
}

struct Kruskal {
    uf: UnionFind,
    tree: Vec<SpanEdge>,
    target: usize,
}

impl Kruskal {
    fn done(&self) -> bool {
        self.tree.len() >= self.target
    }

    fn solve(&mut self, mut edges: Vec<SpanEdge>) {
        if edges.is_empty() || self.done() {
            return;
        }

        if edges.len() <= BASE_CASE {
            edges.sort_unstable_by(key_cmp);
            for edge in edges {
                if self.done() {
                    break;
                }
                if self.uf.union(edge.a.value(), edge.b.value()) {
                    self.tree.push(edge);
                }
            }
            return;
        }

        let pivot = median_of_three(&edges);
        let (small, large) = partition(edges, &pivot);
        self.solve(small);
        if self.done() {
            return;
        }
        let large = self.filter(large);
        self.solve(large);
    }

    /// Drop edges whose endpoints are already joined.
    fn filter(&mut self, mut edges: Vec<SpanEdge>) -> Vec<SpanEdge> {
        if edges.len() >= PARALLEL_CUTOFF {
            let uf = &self.uf;
            edges
                .into_par_iter()
                .filter(|e| !uf.connected(e.a.value(), e.b.value()))
                .collect()
        } else {
            edges.retain(|e| self.uf.find(e.a.value()) != self.uf.find(e.b.value()));
            edges
        }
    }
}

/// Keys are unique, so with more than two edges the median of three
/// distinct samples leaves both partitions non-empty.
fn median_of_three(edges: &[SpanEdge]) -> SpanEdge {
    let mut samples = [edges[0], edges[edges.len() / 2], edges[edges.len() - 1]];
    samples.sort_unstable_by(key_cmp);
    samples[1]
}

fn partition(edges: Vec<SpanEdge>, pivot: &SpanEdge) -> (Vec<SpanEdge>, Vec<SpanEdge>) {
    let at_or_below = |e: &SpanEdge| key_cmp(e, pivot) != Ordering::Greater;
    if edges.len() >= PARALLEL_CUTOFF {
        edges.into_par_iter().partition(at_or_below)
    } else {
        edges.into_iter().partition(at_or_below)
    }
}
