//! The network-model call contract.
//!
//! Planning algorithms never touch grid internals. They discover prospective
//! lines, toggle them, and read back the authoritative derived state through
//! [`NetworkModel`]. After any `attach`/`detach` the derived state is stale
//! until `recompute` (or `reset`) runs.

use crate::{AvenueResult, Hertz, Line, LineId, Megawatts, NearMiss};
use serde::Serialize;
use std::collections::BTreeMap;

/// Derived electrical state of the active topology.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FlowState {
    /// Total transmission loss
    pub loss: Megawatts,
    /// Loss as a percentage of total generation, rounded to 2 decimals
    pub loss_percent: f64,
    /// Per-line flow in MW, signed from `Line::from` to `Line::to`
    pub flows: BTreeMap<LineId, f64>,
    /// Deviation from nominal frequency
    pub frequency_deviation: Hertz,
}

impl FlowState {
    /// Compare two states within an absolute tolerance on every quantity.
    pub fn approx_eq(&self, other: &FlowState, tolerance: f64) -> bool {
        if self.flows.len() != other.flows.len() {
            return false;
        }
        let flows_match = self
            .flows
            .iter()
            .zip(other.flows.iter())
            .all(|((id_a, a), (id_b, b))| id_a == id_b && (a - b).abs() <= tolerance);

        flows_match
            && (self.loss.value() - other.loss.value()).abs() <= tolerance
            && (self.loss_percent - other.loss_percent).abs() <= tolerance
            && (self.frequency_deviation.value() - other.frequency_deviation.value()).abs()
                <= tolerance
    }
}

/// Operations the planning core consumes from the network model.
///
/// Implementations must make `attach`/`detach` idempotent: attaching an
/// already-active line (or detaching an inactive one) is a no-op.
pub trait NetworkModel {
    /// Site pairs within `distance` of each other that have no active line,
    /// each with the prospective line that would join them. No ordering or
    /// uniqueness is promised; the same pair may appear in both orientations.
    fn near_miss_pairs(&mut self, distance: f64) -> Vec<NearMiss>;

    /// Look up a registered line.
    fn line(&self, id: LineId) -> Option<&Line>;

    /// Whether the line currently participates in the topology.
    fn is_active(&self, id: LineId) -> bool;

    fn attach(&mut self, id: LineId) -> AvenueResult<()>;

    fn detach(&mut self, id: LineId) -> AvenueResult<()>;

    /// Recompute derived state for the current topology.
    fn recompute(&mut self) -> AvenueResult<FlowState>;

    /// Force a full recomputation. Behaves exactly like [`recompute`](Self::recompute).
    fn reset(&mut self) -> AvenueResult<FlowState> {
        self.recompute()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(loss: f64, flow: f64) -> FlowState {
        let mut flows = BTreeMap::new();
        flows.insert(LineId::new(0), flow);
        FlowState {
            loss: Megawatts(loss),
            loss_percent: 1.0,
            flows,
            frequency_deviation: Hertz(-0.01),
        }
    }

    #[test]
    fn approx_eq_respects_tolerance() {
        assert!(state(1.0, 5.0).approx_eq(&state(1.0 + 1e-12, 5.0), 1e-9));
        assert!(!state(1.0, 5.0).approx_eq(&state(1.0, 5.1), 1e-9));
    }

    #[test]
    fn approx_eq_detects_topology_change() {
        let mut other = state(1.0, 5.0);
        other.flows.insert(LineId::new(1), 0.0);
        assert!(!state(1.0, 5.0).approx_eq(&other, 1e-9));
    }
}
