//! Operator-driven application of ranked augmentations.
//!
//! [`CongestionPlanner`] is the single owner of the live network. It runs
//! searches and lets an operator apply at most one ranked row at a time:
//!
//! ```text
//!            select(Some(i))                select(Some(j))
//!   Idle ─────────────────────▶ Applied(i) ─────────────────▶ Applied(j)
//!    ▲                              │
//!    └──────── select(None) ────────┘
//! ```
//!
//! Every transition ends with a recompute, so [`CongestionPlanner::flow_state`]
//! always reflects the active topology.

use super::search::{attach_lines, detach_lines, run_search, SearchConfig, SearchReport};
use super::trial::ResultRow;
use crate::candidates::{CandidatePolicy, CandidatePool};
use crate::error::{AlgoError, AlgoResult};
use avenue_core::{FlowState, LineId, NetworkModel};
use serde::Serialize;
use tracing::{debug, info, warn};

/// Which ranked row, if any, is currently attached to the network.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum SelectionState {
    #[default]
    Idle,
    Applied { row: usize },
}

/// Owns a network and drives search plus selection on it.
#[derive(Debug)]
pub struct CongestionPlanner<M> {
    network: M,
    policy: CandidatePolicy,
    config: SearchConfig,
    report: SearchReport,
    state: SelectionState,
    flow: FlowState,
}

impl<M> CongestionPlanner<M>
where
    M: NetworkModel + Clone + Send + Sync,
{
    /// Take ownership of `network` and compute its baseline state.
    pub fn new(mut network: M, policy: CandidatePolicy, config: SearchConfig) -> AlgoResult<Self> {
        let flow = network.recompute()?;
        Ok(Self {
            network,
            policy,
            config,
            report: SearchReport::default(),
            state: SelectionState::Idle,
            flow,
        })
    }

    /// Rebuild the candidate pool and ranked rows from the unaugmented network.
    ///
    /// Any applied row is detached first; previous rows are discarded.
    pub fn search(&mut self) -> AlgoResult<&[ResultRow]> {
        self.select(None)?;
        self.report = SearchReport::default();

        let report = run_search(&mut self.network, &self.policy, &self.config)?;
        self.report = report;
        self.state = SelectionState::Idle;
        self.flow = self.network.recompute()?;
        Ok(&self.report.rows)
    }

    /// Apply row `index`, or return to the unaugmented network with `None`.
    ///
    /// Selecting a row whose lines equal the applied row's lines changes
    /// nothing but the recorded index.
    pub fn select(&mut self, index: Option<usize>) -> AlgoResult<&FlowState> {
        let len = self.report.rows.len();
        if let Some(index) = index {
            if index >= len {
                return Err(AlgoError::RowOutOfRange { index, len });
            }
        }

        let (unchanged, detach, attach) = {
            let current = self.applied_row();
            let target = index.map(|i| &self.report.rows[i]);
            let unchanged = match (current, target) {
                (None, None) => true,
                (Some(current), Some(target)) => current.same_candidates(target),
                _ => false,
            };
            let lines = |row: Option<&ResultRow>| -> Vec<LineId> {
                row.map(|r| r.lines().collect()).unwrap_or_default()
            };
            (unchanged, lines(current), lines(target))
        };

        if unchanged {
            if let Some(row) = index {
                self.state = SelectionState::Applied { row };
            }
            debug!(state = ?self.state, "selection unchanged");
            self.flow = self.network.recompute()?;
            return Ok(&self.flow);
        }

        detach_lines(&mut self.network, &detach)?;
        self.state = SelectionState::Idle;

        if let Some(row) = index {
            let mut attached = Vec::with_capacity(attach.len());
            if let Err(err) = attach_lines(&mut self.network, &attach, &mut attached) {
                warn!(row, error = %err, "could not apply row, reverting");
                detach_lines(&mut self.network, &attached)?;
                self.flow = self.network.recompute()?;
                return Err(err.into());
            }
            self.state = SelectionState::Applied { row };
        }

        self.flow = self.network.recompute()?;
        info!(
            state = ?self.state,
            loss_percent = self.flow.loss_percent,
            "selection applied"
        );
        Ok(&self.flow)
    }

    /// Ranked rows of the latest search.
    pub fn rows(&self) -> &[ResultRow] {
        &self.report.rows
    }

    /// Full report of the latest search.
    pub fn report(&self) -> &SearchReport {
        &self.report
    }

    pub fn candidate_pool(&self) -> &CandidatePool {
        &self.report.pool
    }

    pub fn state(&self) -> SelectionState {
        self.state
    }

    pub fn applied_row(&self) -> Option<&ResultRow> {
        match self.state {
            SelectionState::Idle => None,
            SelectionState::Applied { row } => self.report.rows.get(row),
        }
    }

    /// Derived state as of the last transition.
    pub fn flow_state(&self) -> &FlowState {
        &self.flow
    }

    pub fn network(&self) -> &M {
        &self.network
    }

    pub fn policy(&self) -> &CandidatePolicy {
        &self.policy
    }

    /// Change the candidate policy. Detaches any applied row and discards
    /// the rows, which were ranked under the old policy.
    pub fn set_policy(&mut self, policy: CandidatePolicy) -> AlgoResult<()> {
        self.select(None)?;
        self.policy = policy;
        self.report = SearchReport::default();
        Ok(())
    }

    /// Hand the network back, keeping whatever row is applied.
    pub fn into_network(self) -> M {
        self.network
    }
}
