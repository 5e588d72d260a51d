//! # avenue-core: Synthetic Transmission Grid Primitives
//!
//! Provides the data model shared by the planning algorithms in `avenue-algo`.
//!
//! ## Design Philosophy
//!
//! A grid is an **arena** of immutable [`Site`]s and [`Line`]s keyed by dense
//! integer ids, plus a per-line active flag:
//! - **Sites**: fixed points of demand with planar coordinates and a load
//! - **Lines**: unordered site pairs whose length is fixed when registered
//! - **Active flags**: owned by the grid and only toggled through
//!   [`NetworkModel::attach`] / [`NetworkModel::detach`]
//!
//! Because ids are plain indices, a grid is cheap to deep-copy. Parallel
//! what-if evaluation gives every worker its own copy instead of sharing one
//! mutable network.
//!
//! ## Quick Start
//!
//! ```rust
//! use avenue_core::*;
//!
//! let sites = vec![
//!     Site::new(SiteId::new(0), 0.0, 0.0, Megawatts(10.0)),
//!     Site::new(SiteId::new(1), 0.0, 10.0, Megawatts(10.0)),
//!     Site::new(SiteId::new(2), 10.0, 0.0, Megawatts(10.0)),
//! ];
//! let mut grid = Grid::new(sites, ElectricalParams::default())?;
//! grid.connect(SiteId::new(0), SiteId::new(1))?;
//! grid.connect(SiteId::new(0), SiteId::new(2))?;
//! grid.add_generator(SiteId::new(0), Megawatts(40.0))?;
//!
//! let state = grid.recompute()?;
//! assert!(state.loss.value() > 0.0);
//! # Ok::<(), AvenueError>(())
//! ```
//!
//! ## Modules
//!
//! - [`grid`] - The reference [`NetworkModel`] implementation and its load flow
//! - [`model`] - The network-model call contract and derived [`FlowState`]
//! - [`graph_utils`] - Topological queries over the active lines (petgraph)
//! - [`solver`] - Dense linear-system backends
//! - [`units`] - `Megawatts` / `Hertz` newtypes

use serde::{Deserialize, Serialize};
use std::fmt;

pub mod error;
pub mod graph_utils;
pub mod grid;
pub mod model;
pub mod solver;
pub mod units;

pub use error::{AvenueError, AvenueResult};
pub use grid::{ElectricalParams, GeneratorHost, Grid, GridSummary};
pub use model::{FlowState, NetworkModel};
pub use solver::{FaerSolver, GaussSolver, LinearSystemBackend, SolverKind};
pub use units::{Hertz, Megawatts, BASE_FREQUENCY};

// Newtype wrappers for IDs for type safety
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SiteId(usize);
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LineId(usize);

impl SiteId {
    #[inline]
    pub fn new(value: usize) -> Self {
        SiteId(value)
    }
    #[inline]
    pub fn value(&self) -> usize {
        self.0
    }
}

impl LineId {
    #[inline]
    pub fn new(value: usize) -> Self {
        LineId(value)
    }
    #[inline]
    pub fn value(&self) -> usize {
        self.0
    }
}

impl fmt::Display for SiteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "S{}", self.0)
    }
}

impl fmt::Display for LineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "L{}", self.0)
    }
}

/// A fixed point of demand. Created once per synthesis run and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Site {
    pub id: SiteId,
    pub x: f64,
    pub y: f64,
    pub load: Megawatts,
}

impl Site {
    pub fn new(id: SiteId, x: f64, y: f64, load: Megawatts) -> Self {
        Self { id, x, y, load }
    }

    /// Euclidean distance to another site.
    pub fn distance_to(&self, other: &Site) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Unordered site pair. `SitePair::new(a, b) == SitePair::new(b, a)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SitePair(SiteId, SiteId);

impl SitePair {
    pub fn new(a: SiteId, b: SiteId) -> Self {
        if a <= b {
            SitePair(a, b)
        } else {
            SitePair(b, a)
        }
    }

    /// The smaller of the two ids.
    pub fn low(&self) -> SiteId {
        self.0
    }

    /// The larger of the two ids.
    pub fn high(&self) -> SiteId {
        self.1
    }
}

impl fmt::Display for SitePair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.0 .0, self.1 .0)
    }
}

/// A transmission line between two distinct sites.
///
/// The length is the Euclidean distance of the endpoints when the line was
/// registered. Whether the line is energised is tracked by the grid, not here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Line {
    pub id: LineId,
    pub from: SiteId,
    pub to: SiteId,
    pub length: f64,
}

impl Line {
    pub fn pair(&self) -> SitePair {
        SitePair::new(self.from, self.to)
    }
}

/// One near-miss hit: two sites within range that have no active line.
///
/// `line` is the prospective (inactive) line joining them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NearMiss {
    pub from: SiteId,
    pub to: SiteId,
    pub line: LineId,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn site_pair_is_unordered() {
        let a = SiteId::new(4);
        let b = SiteId::new(1);
        assert_eq!(SitePair::new(a, b), SitePair::new(b, a));
        assert_eq!(SitePair::new(a, b).low(), b);
        assert_eq!(SitePair::new(a, b).to_string(), "1-4");
    }

    #[test]
    fn site_distance_is_euclidean() {
        let a = Site::new(SiteId::new(0), 0.0, 0.0, Megawatts(1.0));
        let b = Site::new(SiteId::new(1), 3.0, 4.0, Megawatts(1.0));
        assert!((a.distance_to(&b) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn ids_serialize_transparently() {
        let json = serde_json::to_string(&LineId::new(12)).unwrap();
        assert_eq!(json, "12");
    }
}
