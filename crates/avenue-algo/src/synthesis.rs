//! Synthetic grid construction.
//!
//! Sites are scattered uniformly over an [`Area`] with a caller-supplied RNG,
//! joined by a minimum spanning tree, and then given generators: the tree is
//! walked breadth-first from site 0, the visit order is cut into groups of
//! `group_by` sites, and each group gets one generator at the site nearest
//! the group's centroid, sized to the group's load plus a reserve margin.

use crate::error::{AlgoError, AlgoResult};
use crate::mst::minimum_spanning_edges;
use avenue_core::graph_utils::bfs_order;
use avenue_core::{ElectricalParams, Grid, Megawatts, Site, SiteId};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Planar extent sites are scattered over.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Area {
    pub width: f64,
    pub height: f64,
}

impl Default for Area {
    fn default() -> Self {
        Self {
            width: 980.0,
            height: 480.0,
        }
    }
}

impl Area {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Normalisation of network extent: a twelfth of the mean side length.
    pub fn scale(&self) -> f64 {
        (self.width + self.height) / 2.0 / 12.0
    }

    /// Default near-miss search radius, three quarters of [`scale`](Self::scale).
    pub fn near_distance(&self) -> f64 {
        0.75 * self.scale()
    }

    fn validate(&self) -> AlgoResult<()> {
        if !self.width.is_finite() || !self.height.is_finite() || self.width < 0.0 || self.height < 0.0
        {
            return Err(AlgoError::InvalidLayout(format!(
                "area {} x {} must be finite and non-negative",
                self.width, self.height
            )));
        }
        Ok(())
    }
}

/// How many sites to place and how to provision them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteLayout {
    /// Number of sites
    pub count: usize,
    /// Sites served by each generator
    pub group_by: usize,
    /// Load demanded at every site
    pub load_mw: f64,
    /// Generator capacity headroom over the load it serves
    pub reserve_margin: f64,
}

impl Default for SiteLayout {
    fn default() -> Self {
        Self {
            count: 800,
            group_by: 80,
            load_mw: 10.0,
            reserve_margin: 0.1,
        }
    }
}

impl SiteLayout {
    fn validate(&self) -> AlgoResult<()> {
        if self.group_by == 0 {
            return Err(AlgoError::InvalidLayout("group_by must be at least 1".into()));
        }
        if !self.load_mw.is_finite() || self.load_mw < 0.0 {
            return Err(AlgoError::InvalidLayout(format!(
                "load_mw must be finite and non-negative, got {}",
                self.load_mw
            )));
        }
        if !self.reserve_margin.is_finite() || self.reserve_margin < 0.0 {
            return Err(AlgoError::InvalidLayout(format!(
                "reserve_margin must be finite and non-negative, got {}",
                self.reserve_margin
            )));
        }
        Ok(())
    }
}

/// Scatter `layout.count` sites uniformly over `area`.
pub fn place_sites<R: Rng + ?Sized>(layout: &SiteLayout, area: &Area, rng: &mut R) -> Vec<Site> {
    (0..layout.count)
        .map(|i| {
            Site::new(
                SiteId::new(i),
                area.width * rng.gen::<f64>(),
                area.height * rng.gen::<f64>(),
                Megawatts(layout.load_mw),
            )
        })
        .collect()
}

/// Place sites with `rng` and build the minimum spanning grid over them.
pub fn synthesize_mst<R: Rng + ?Sized>(
    layout: &SiteLayout,
    area: &Area,
    params: ElectricalParams,
    rng: &mut R,
) -> AlgoResult<Grid> {
    area.validate()?;
    layout.validate()?;
    let sites = place_sites(layout, area, rng);
    build_mst_grid(sites, layout, params)
}

/// Build a grid whose active lines are exactly the minimum spanning tree of
/// `sites`, then provision generators per `layout.group_by`.
pub fn build_mst_grid(
    sites: Vec<Site>,
    layout: &SiteLayout,
    params: ElectricalParams,
) -> AlgoResult<Grid> {
    layout.validate()?;
    // Grid::new checks that ids match positions, which the tree relies on.
    let mut grid = Grid::new(sites, params)?;
    let tree = minimum_spanning_edges(grid.sites());
    for edge in &tree {
        grid.connect(edge.a, edge.b)?;
    }
    place_generators(&mut grid, layout)?;

    info!(
        sites = grid.sites().len(),
        lines = grid.active_line_count(),
        generators = grid.generators().len(),
        "synthesized spanning grid"
    );
    Ok(grid)
}

fn place_generators(grid: &mut Grid, layout: &SiteLayout) -> AlgoResult<()> {
    if grid.sites().is_empty() {
        return Ok(());
    }
    let order = bfs_order(grid, SiteId::new(0));
    let mut hosts = Vec::new();
    for group in order.chunks(layout.group_by) {
        let members: Vec<&Site> = group.iter().filter_map(|&id| grid.site(id)).collect();
        let count = members.len() as f64;
        let cx = members.iter().map(|s| s.x).sum::<f64>() / count;
        let cy = members.iter().map(|s| s.y).sum::<f64>() / count;
        let host = members
            .iter()
            .min_by(|a, b| {
                let da = (a.x - cx).hypot(a.y - cy);
                let db = (b.x - cx).hypot(b.y - cy);
                da.total_cmp(&db)
            })
            .map(|s| s.id);
        let load: Megawatts = members.iter().map(|s| s.load).sum();
        let capacity = load * (1.0 + layout.reserve_margin);
        if let Some(site) = host {
            if capacity.value() > 0.0 {
                hosts.push((site, capacity));
            }
        }
    }
    for (site, capacity) in hosts {
        debug!(%site, capacity_mw = capacity.value(), "placing generator");
        grid.add_generator(site, capacity)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use avenue_core::graph_utils::{is_spanning_tree, total_active_length};
    use rand::{rngs::StdRng, SeedableRng};

    fn layout(count: usize, group_by: usize) -> SiteLayout {
        SiteLayout {
            count,
            group_by,
            ..SiteLayout::default()
        }
    }

    #[test]
    fn test_area_scale() {
        let area = Area::new(120.0, 120.0);
        assert!((area.scale() - 10.0).abs() < 1e-12);
        assert!((area.near_distance() - 7.5).abs() < 1e-12);
    }

    #[test]
    fn test_sites_fall_inside_area() {
        let area = Area::new(50.0, 20.0);
        let mut rng = StdRng::seed_from_u64(3);
        let sites = place_sites(&layout(200, 10), &area, &mut rng);
        assert_eq!(sites.len(), 200);
        assert!(sites
            .iter()
            .all(|s| (0.0..=50.0).contains(&s.x) && (0.0..=20.0).contains(&s.y)));
    }

    #[test]
    fn test_synthesized_grid_is_a_spanning_tree() {
        let mut rng = StdRng::seed_from_u64(11);
        let grid = synthesize_mst(
            &layout(60, 15),
            &Area::new(100.0, 100.0),
            ElectricalParams::default(),
            &mut rng,
        )
        .unwrap();
        assert!(is_spanning_tree(&grid));
        assert_eq!(grid.generators().len(), 4);
        assert!((grid.total_capacity().value() - 60.0 * 10.0 * 1.1).abs() < 1e-9);
    }

    #[test]
    fn test_same_seed_same_grid() {
        let build = || {
            let mut rng = StdRng::seed_from_u64(42);
            synthesize_mst(
                &layout(40, 10),
                &Area::default(),
                ElectricalParams::default(),
                &mut rng,
            )
            .unwrap()
        };
        let (a, b) = (build(), build());
        let pairs = |g: &Grid| g.active_lines().map(|l| l.pair()).collect::<Vec<_>>();
        assert_eq!(pairs(&a), pairs(&b));
        assert_eq!(total_active_length(&a), total_active_length(&b));
    }

    #[test]
    fn test_empty_and_single_site_layouts() {
        let mut rng = StdRng::seed_from_u64(0);
        let empty = synthesize_mst(
            &layout(0, 5),
            &Area::default(),
            ElectricalParams::default(),
            &mut rng,
        )
        .unwrap();
        assert_eq!(empty.active_line_count(), 0);

        let single = synthesize_mst(
            &layout(1, 5),
            &Area::default(),
            ElectricalParams::default(),
            &mut rng,
        )
        .unwrap();
        assert_eq!(single.active_line_count(), 0);
        assert_eq!(single.generators().len(), 1);
    }

    #[test]
    fn test_misnumbered_sites_rejected() {
        let sites = vec![
            Site::new(SiteId::new(5), 0.0, 0.0, Megawatts(1.0)),
            Site::new(SiteId::new(6), 3.0, 4.0, Megawatts(1.0)),
        ];
        let err = build_mst_grid(sites, &layout(2, 1), ElectricalParams::default()).unwrap_err();
        assert!(matches!(
            err,
            AlgoError::Model(avenue_core::AvenueError::Validation(_))
        ));
    }

    #[test]
    fn test_invalid_layout_rejected() {
        let mut rng = StdRng::seed_from_u64(0);
        let err = synthesize_mst(
            &layout(10, 0),
            &Area::default(),
            ElectricalParams::default(),
            &mut rng,
        )
        .unwrap_err();
        assert!(matches!(err, AlgoError::InvalidLayout(_)));

        let err = synthesize_mst(
            &layout(10, 2),
            &Area::new(f64::NAN, 1.0),
            ElectricalParams::default(),
            &mut rng,
        )
        .unwrap_err();
        assert!(matches!(err, AlgoError::InvalidLayout(_)));
    }
}
