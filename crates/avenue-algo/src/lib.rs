//! # avenue-algo: Grid Synthesis and Congestion Reduction
//!
//! Algorithms that build a synthetic transmission grid and then recommend
//! which new lines buy the most loss reduction per unit of construction.
//!
//! ## Pipeline
//!
//! ```text
//! SiteLayout ──place_sites──▶ [Site] ──filter-Kruskal──▶ Grid (spanning tree)
//!                                                          │
//!                       CandidatePolicy ──near misses──▶ CandidatePool
//!                                                          │
//!                  subsets of size 1..=K, evaluated in parallel on grid copies
//!                                                          │
//!                                          ranked ResultRows ──▶ CongestionPlanner
//! ```
//!
//! - [`union_find`]: disjoint sets with path compression and union by rank
//! - [`mst`]: filter-Kruskal minimum spanning tree over all site pairs
//! - [`synthesis`]: seeded site placement, MST grid construction, generator placement
//! - [`candidates`]: near-miss line discovery, length ceiling and dedup
//! - [`congestion`]: trial enumeration, parallel evaluation, ranking, and the
//!   selection state machine that applies a ranked row to the live grid
//!
//! ## Example
//!
//! ```no_run
//! use avenue_algo::congestion::{CongestionPlanner, SearchConfig};
//! use avenue_algo::synthesis::{synthesize_mst, Area, SiteLayout};
//! use avenue_algo::CandidatePolicy;
//! use avenue_core::ElectricalParams;
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! let area = Area::new(980.0, 480.0);
//! let mut rng = StdRng::seed_from_u64(7);
//! let grid = synthesize_mst(&SiteLayout::default(), &area, ElectricalParams::default(), &mut rng)?;
//!
//! // A full-size pool with the default edge limit of 4 exceeds the trial cap.
//! let config = SearchConfig::default().with_edge_limit(2);
//! let mut planner = CongestionPlanner::new(grid, CandidatePolicy::for_area(&area), config)?;
//! planner.search()?;
//! planner.select(Some(0))?;
//! println!("loss now {}%", planner.flow_state().loss_percent);
//! # Ok::<(), avenue_algo::AlgoError>(())
//! ```

pub mod candidates;
pub mod congestion;
pub mod error;
pub mod mst;
pub mod synthesis;
pub mod union_find;

pub use candidates::{generate_candidates, Candidate, CandidatePolicy, CandidatePool};
pub use congestion::{
    run_search, search_congestion_reduction, CongestionPlanner, ResultRow, SearchConfig,
    SearchReport, SelectionState, TrialIsolation,
};
pub use error::{AlgoError, AlgoResult};
pub use mst::{minimum_spanning_edges, SpanEdge};
pub use synthesis::{build_mst_grid, place_sites, synthesize_mst, Area, SiteLayout};
pub use union_find::UnionFind;
