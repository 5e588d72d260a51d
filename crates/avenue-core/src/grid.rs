//! Reference network model.
//!
//! [`Grid`] stores sites and lines in flat arenas and runs a simplified DC
//! load flow to produce the derived [`FlowState`]:
//!
//! ```text
//! x_l = reactance_per_unit · length_l        r_l = resistance_per_unit · length_l
//!
//! B θ = P          (reduced susceptance Laplacian, slack = first generator)
//! f_l = (θ_from − θ_to) / x_l
//! loss = Σ_l r_l · f_l²
//! ```
//!
//! Generation covers load plus loss and is shared between generator hosts in
//! proportion to capacity. Because loss feeds back into dispatch, the solve
//! is iterated until the loss settles.

use crate::graph_utils;
use crate::model::{FlowState, NetworkModel};
use crate::{
    AvenueError, AvenueResult, Hertz, Line, LineId, Megawatts, NearMiss, Site, SiteId, SitePair,
    SolverKind, BASE_FREQUENCY,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use tracing::debug;

/// Floor on per-line impedance so coincident sites cannot produce an
/// infinite susceptance.
const MIN_IMPEDANCE_PU: f64 = 1e-6;

/// Electrical constants and load-flow controls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ElectricalParams {
    /// Series reactance per unit of line length (per-unit on `base_mva`)
    pub reactance_per_unit: f64,
    /// Series resistance per unit of line length (per-unit on `base_mva`)
    pub resistance_per_unit: f64,
    /// System base for per-unit conversion
    pub base_mva: f64,
    /// Frequency sag per unit of loss-to-capacity ratio
    pub droop_hz: f64,
    /// Relative convergence tolerance on the loss fixed point
    pub tolerance: f64,
    pub max_iterations: usize,
    pub solver: SolverKind,
}

impl Default for ElectricalParams {
    fn default() -> Self {
        Self {
            reactance_per_unit: 5e-4,
            resistance_per_unit: 1e-4,
            base_mva: 100.0,
            droop_hz: 0.5,
            tolerance: 1e-10,
            max_iterations: 100,
            solver: SolverKind::default(),
        }
    }
}

/// A site that injects power into the grid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeneratorHost {
    pub site: SiteId,
    pub capacity: Megawatts,
}

/// Arena-backed grid: sites, registered lines, active flags and generators.
///
/// Cloning produces an independent deep copy (topology and cached state).
#[derive(Debug, Clone)]
pub struct Grid {
    sites: Vec<Site>,
    lines: Vec<Line>,
    active: Vec<bool>,
    by_pair: HashMap<SitePair, LineId>,
    generators: Vec<GeneratorHost>,
    params: ElectricalParams,
    state: Option<FlowState>,
}

impl Grid {
    /// Create a grid with no lines. Site ids must equal their position.
    pub fn new(sites: Vec<Site>, params: ElectricalParams) -> AvenueResult<Self> {
        for (index, site) in sites.iter().enumerate() {
            if site.id.value() != index {
                return Err(AvenueError::Validation(format!(
                    "site at position {} has id {}",
                    index, site.id
                )));
            }
            if !site.x.is_finite() || !site.y.is_finite() {
                return Err(AvenueError::Validation(format!(
                    "site {} has non-finite coordinates",
                    site.id
                )));
            }
            if !site.load.is_finite() || site.load.value() < 0.0 {
                return Err(AvenueError::Validation(format!(
                    "site {} has invalid load {}",
                    site.id, site.load
                )));
            }
        }
        Ok(Self {
            sites,
            lines: Vec::new(),
            active: Vec::new(),
            by_pair: HashMap::new(),
            generators: Vec::new(),
            params,
            state: None,
        })
    }

    /// Register the (inactive) line between two sites, or return the existing one.
    pub fn add_line(&mut self, a: SiteId, b: SiteId) -> AvenueResult<LineId> {
        let length = self.site_ref(a)?.distance_to(self.site_ref(b)?);
        if a == b {
            return Err(AvenueError::Validation(format!(
                "line endpoints must differ (got {a} twice)"
            )));
        }
        let pair = SitePair::new(a, b);
        if let Some(&id) = self.by_pair.get(&pair) {
            return Ok(id);
        }
        let id = LineId::new(self.lines.len());
        self.lines.push(Line {
            id,
            from: pair.low(),
            to: pair.high(),
            length,
        });
        self.active.push(false);
        self.by_pair.insert(pair, id);
        Ok(id)
    }

    /// Register and activate the line between two sites.
    pub fn connect(&mut self, a: SiteId, b: SiteId) -> AvenueResult<LineId> {
        let id = self.add_line(a, b)?;
        self.attach(id)?;
        Ok(id)
    }

    /// Host a generator at `site`. Capacity accumulates if the site already hosts one.
    pub fn add_generator(&mut self, site: SiteId, capacity: Megawatts) -> AvenueResult<()> {
        self.site_ref(site)?;
        if !capacity.is_finite() || capacity.value() <= 0.0 {
            return Err(AvenueError::Validation(format!(
                "generator at {site} needs positive capacity, got {capacity}"
            )));
        }
        match self.generators.iter_mut().find(|g| g.site == site) {
            Some(host) => host.capacity = host.capacity + capacity,
            None => self.generators.push(GeneratorHost { site, capacity }),
        }
        self.state = None;
        Ok(())
    }

    pub fn sites(&self) -> &[Site] {
        &self.sites
    }

    pub fn site(&self, id: SiteId) -> Option<&Site> {
        self.sites.get(id.value())
    }

    /// Every registered line, active or not.
    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    pub fn active_lines(&self) -> impl Iterator<Item = &Line> + '_ {
        self.lines.iter().filter(|line| self.active[line.id.value()])
    }

    pub fn active_line_count(&self) -> usize {
        self.active.iter().filter(|&&a| a).count()
    }

    /// The line joining two sites, if one has been registered.
    pub fn line_between(&self, a: SiteId, b: SiteId) -> Option<LineId> {
        self.by_pair.get(&SitePair::new(a, b)).copied()
    }

    pub fn generators(&self) -> &[GeneratorHost] {
        &self.generators
    }

    pub fn params(&self) -> &ElectricalParams {
        &self.params
    }

    pub fn total_load(&self) -> Megawatts {
        self.sites.iter().map(|s| s.load).sum()
    }

    pub fn total_capacity(&self) -> Megawatts {
        self.generators.iter().map(|g| g.capacity).sum()
    }

    /// Width and height of the sites' bounding box.
    pub fn extent(&self) -> (f64, f64) {
        if self.sites.is_empty() {
            return (0.0, 0.0);
        }
        let (mut min_x, mut min_y) = (f64::INFINITY, f64::INFINITY);
        let (mut max_x, mut max_y) = (f64::NEG_INFINITY, f64::NEG_INFINITY);
        for site in &self.sites {
            min_x = min_x.min(site.x);
            max_x = max_x.max(site.x);
            min_y = min_y.min(site.y);
            max_y = max_y.max(site.y);
        }
        (max_x - min_x, max_y - min_y)
    }

    /// Cached derived state, `None` when a topology change has not been
    /// followed by a recompute.
    pub fn flow_state(&self) -> Option<&FlowState> {
        self.state.as_ref()
    }

    /// Summary of the current state, recomputing first if it is stale.
    pub fn summary(&mut self) -> AvenueResult<GridSummary> {
        let state = match self.state.clone() {
            Some(state) => state,
            None => self.recompute()?,
        };
        Ok(GridSummary::new(self, &state))
    }

    fn site_ref(&self, id: SiteId) -> AvenueResult<&Site> {
        self.sites
            .get(id.value())
            .ok_or(AvenueError::UnknownSite(id))
    }

    fn check_line(&self, id: LineId) -> AvenueResult<usize> {
        if id.value() < self.lines.len() {
            Ok(id.value())
        } else {
            Err(AvenueError::UnknownLine(id))
        }
    }

    fn reactance_pu(&self, line: &Line) -> f64 {
        (self.params.reactance_per_unit * line.length).max(MIN_IMPEDANCE_PU)
    }

    fn resistance_pu(&self, line: &Line) -> f64 {
        self.params.resistance_per_unit * line.length
    }

    /// Net injection per site in per-unit for a given loss estimate.
    fn injections_pu(&self, loss: f64, load: f64, capacity: f64) -> Vec<f64> {
        let base = self.params.base_mva;
        let mut injections: Vec<f64> = self.sites.iter().map(|s| -s.load.value() / base).collect();
        let demand = load + loss;
        for host in &self.generators {
            injections[host.site.value()] += demand * host.capacity.value() / capacity / base;
        }
        injections
    }

    fn zero_state(&self) -> FlowState {
        FlowState {
            flows: self.active_lines().map(|line| (line.id, 0.0)).collect(),
            ..FlowState::default()
        }
    }

    fn solve_load_flow(&self) -> AvenueResult<FlowState> {
        let n = self.sites.len();
        if n <= 1 {
            return Ok(self.zero_state());
        }

        let load = self.total_load().value();
        let capacity = self.total_capacity().value();
        if self.generators.is_empty() {
            if load > 0.0 {
                return Err(AvenueError::NoGeneration { load_mw: load });
            }
            return Ok(self.zero_state());
        }

        let components = graph_utils::component_count(self);
        if components > 1 {
            return Err(AvenueError::Islanded { components });
        }

        // Reduced indexing drops the slack bus.
        let slack = self.generators[0].site.value();
        let reduced: Vec<Option<usize>> = (0..n)
            .map(|i| match i.cmp(&slack) {
                std::cmp::Ordering::Less => Some(i),
                std::cmp::Ordering::Equal => None,
                std::cmp::Ordering::Greater => Some(i - 1),
            })
            .collect();

        let active: Vec<&Line> = self.active_lines().collect();
        let mut susceptance = vec![vec![0.0; n - 1]; n - 1];
        for line in &active {
            let y = 1.0 / self.reactance_pu(line);
            let (i, j) = (reduced[line.from.value()], reduced[line.to.value()]);
            if let Some(i) = i {
                susceptance[i][i] += y;
            }
            if let Some(j) = j {
                susceptance[j][j] += y;
            }
            if let (Some(i), Some(j)) = (i, j) {
                susceptance[i][j] -= y;
                susceptance[j][i] -= y;
            }
        }

        let solver = self.params.solver.build_solver();
        let base = self.params.base_mva;
        let mut loss = 0.0;
        let mut residual = f64::INFINITY;

        for iteration in 1..=self.params.max_iterations {
            let injections = self.injections_pu(loss, load, capacity);
            let rhs: Vec<f64> = (0..n)
                .filter(|&i| i != slack)
                .map(|i| injections[i])
                .collect();
            let reduced_theta = solver.solve(&susceptance, &rhs)?;
            let theta: Vec<f64> = reduced
                .iter()
                .map(|r| r.map_or(0.0, |k| reduced_theta[k]))
                .collect();

            let mut flows = BTreeMap::new();
            let mut loss_pu = 0.0;
            for line in &active {
                let flow = (theta[line.from.value()] - theta[line.to.value()]) / self.reactance_pu(line);
                loss_pu += self.resistance_pu(line) * flow * flow;
                flows.insert(line.id, flow * base);
            }

            let next_loss = loss_pu * base;
            residual = (next_loss - loss).abs();
            loss = next_loss;

            if residual <= self.params.tolerance * loss.max(1.0) {
                debug!(iteration, loss_mw = loss, "load flow converged");
                let loss_percent = if load + loss > 0.0 {
                    round2(100.0 * loss / (load + loss))
                } else {
                    0.0
                };
                return Ok(FlowState {
                    loss: Megawatts(loss),
                    loss_percent,
                    flows,
                    frequency_deviation: Hertz(-self.params.droop_hz * loss / capacity),
                });
            }
        }

        Err(AvenueError::NonConvergence {
            iterations: self.params.max_iterations,
            residual,
        })
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

impl NetworkModel for Grid {
    fn near_miss_pairs(&mut self, distance: f64) -> Vec<NearMiss> {
        if !distance.is_finite() || distance <= 0.0 {
            return Vec::new();
        }

        // Sweep over sites sorted by x; anything further than `distance`
        // along x cannot be within range.
        let mut order: Vec<usize> = (0..self.sites.len()).collect();
        order.sort_by(|&a, &b| self.sites[a].x.total_cmp(&self.sites[b].x));

        let mut in_range = Vec::new();
        for (pos, &a) in order.iter().enumerate() {
            for &b in &order[pos + 1..] {
                if self.sites[b].x - self.sites[a].x > distance {
                    break;
                }
                if self.sites[a].distance_to(&self.sites[b]) <= distance {
                    in_range.push((SiteId::new(a), SiteId::new(b)));
                }
            }
        }

        let mut hits = Vec::new();
        for (a, b) in in_range {
            let line = match self.by_pair.get(&SitePair::new(a, b)) {
                Some(&id) if self.active[id.value()] => continue,
                Some(&id) => id,
                None => match self.add_line(a, b) {
                    Ok(id) => id,
                    Err(_) => continue,
                },
            };
            hits.push(NearMiss { from: a, to: b, line });
            hits.push(NearMiss { from: b, to: a, line });
        }
        debug!(distance, hits = hits.len(), "near-miss scan");
        hits
    }

    fn line(&self, id: LineId) -> Option<&Line> {
        self.lines.get(id.value())
    }

    fn is_active(&self, id: LineId) -> bool {
        self.active.get(id.value()).copied().unwrap_or(false)
    }

    fn attach(&mut self, id: LineId) -> AvenueResult<()> {
        let index = self.check_line(id)?;
        if !self.active[index] {
            self.active[index] = true;
            self.state = None;
        }
        Ok(())
    }

    fn detach(&mut self, id: LineId) -> AvenueResult<()> {
        let index = self.check_line(id)?;
        if self.active[index] {
            self.active[index] = false;
            self.state = None;
        }
        Ok(())
    }

    fn recompute(&mut self) -> AvenueResult<FlowState> {
        self.state = None;
        let state = self.solve_load_flow()?;
        self.state = Some(state.clone());
        Ok(state)
    }
}

/// Operator-facing status of a grid.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GridSummary {
    pub extent: (f64, f64),
    pub sites: usize,
    pub lines: usize,
    /// Load plus transmission loss
    pub total_load: Megawatts,
    pub transmission_loss: Megawatts,
    pub loss_percent: f64,
    pub frequency: Hertz,
    pub frequency_deviation: Hertz,
}

impl GridSummary {
    pub fn new(grid: &Grid, state: &FlowState) -> Self {
        Self {
            extent: grid.extent(),
            sites: grid.sites().len(),
            lines: grid.active_line_count(),
            total_load: grid.total_load() + state.loss,
            transmission_loss: state.loss,
            loss_percent: state.loss_percent,
            frequency: BASE_FREQUENCY + state.frequency_deviation,
            frequency_deviation: state.frequency_deviation,
        }
    }
}

impl fmt::Display for GridSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Grid extent:\t{:.0} x {:.0}", self.extent.0, self.extent.1)?;
        writeln!(f, "Sites:\t\t{}", self.sites)?;
        writeln!(f, "Lines:\t\t{}", self.lines)?;
        writeln!(f, "Total load:\t{:.2}", self.total_load.value())?;
        writeln!(
            f,
            "Tx loss:\t{:.2} ({}%)",
            self.transmission_loss.value(),
            self.loss_percent
        )?;
        write!(
            f,
            "Freq:\t\t{:.2} Hz ({:.2} Hz)",
            self.frequency.value(),
            self.frequency_deviation.value()
        )
    }
}
