//! GO/CAUTION decisions against a threshold triple ("bars").
//!
//! A batch passes when its median risk-adjusted ROI clears the floor, its
//! median loss probability stays under the ceiling, and its median CVaR5 is
//! strictly above the tail floor. The first two comparisons are inclusive.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::simulator::DealSimulationResult;
use crate::tail::median;

/// Threshold triple, in percent units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DecisionBars {
    /// Minimum median risk-adjusted ROI.
    pub risk_adj: f64,
    /// Maximum median probability of loss.
    pub ploss: f64,
    /// Median CVaR5 must be strictly above this.
    pub cvar: f64,
}

impl Default for DecisionBars {
    fn default() -> Self {
        Self {
            risk_adj: 8.5,
            ploss: 15.0,
            cvar: -10.0,
        }
    }
}

impl DecisionBars {
    /// The three-condition test on raw statistics.
    pub fn admits(&self, risk_adj: f64, ploss: f64, cvar: f64) -> bool {
        risk_adj >= self.risk_adj && ploss <= self.ploss && cvar > self.cvar
    }

    /// The three-condition test on a single result row.
    pub fn passes(&self, row: &DealSimulationResult) -> bool {
        self.admits(row.risk_adj_roi, row.p_loss, row.cvar5_roi)
    }

    pub fn status(&self, risk_adj: f64, ploss: f64, cvar: f64) -> DecisionStatus {
        if self.admits(risk_adj, ploss, cvar) {
            DecisionStatus::Go
        } else {
            DecisionStatus::Caution
        }
    }
}

/// Verdict. `Go` orders before `Caution`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DecisionStatus {
    #[serde(rename = "GO")]
    Go,
    #[serde(rename = "CAUTION")]
    Caution,
}

impl DecisionStatus {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Go => "GO",
            Self::Caution => "CAUTION",
        }
    }
}

impl fmt::Display for DecisionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Batch medians and the resulting verdict.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DecisionSummary {
    pub risk_adj: f64,
    pub ploss: f64,
    pub cvar5: f64,
    pub status: DecisionStatus,
}

/// Evaluate a batch of results (one lens) against `bars`.
///
/// An empty batch has NaN medians and is always `Caution`.
pub fn evaluate(batch: &[DealSimulationResult], bars: &DecisionBars) -> DecisionSummary {
    let risk_adj = median(&batch.iter().map(|r| r.risk_adj_roi).collect::<Vec<_>>());
    let ploss = median(&batch.iter().map(|r| r.p_loss).collect::<Vec<_>>());
    let cvar5 = median(&batch.iter().map(|r| r.cvar5_roi).collect::<Vec<_>>());

    DecisionSummary {
        risk_adj,
        ploss,
        cvar5,
        status: bars.status(risk_adj, ploss, cvar5),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RegionRing;
    use crate::lens::Lens;

    fn row(risk_adj: f64, p_loss: f64, cvar: f64) -> DealSimulationResult {
        DealSimulationResult {
            address: "test".into(),
            region_ring: RegionRing::UrbanCore,
            lens: Lens::Consumer,
            friction: 30.0,
            p10_roi: 0.0,
            p50_roi: 0.0,
            p90_roi: 0.0,
            var5_roi: cvar + 2.0,
            cvar5_roi: cvar,
            p_loss,
            risk_adj_roi: risk_adj,
        }
    }

    #[test]
    fn comfortable_batch_is_go() {
        let s = evaluate(&[row(12.0, 5.0, -4.0)], &DecisionBars::default());
        assert_eq!(s.status, DecisionStatus::Go);
    }

    #[test]
    fn each_condition_can_fail() {
        let bars = DecisionBars::default();
        assert_eq!(evaluate(&[row(8.0, 5.0, -4.0)], &bars).status, DecisionStatus::Caution);
        assert_eq!(evaluate(&[row(12.0, 16.0, -4.0)], &bars).status, DecisionStatus::Caution);
        assert_eq!(evaluate(&[row(12.0, 5.0, -11.0)], &bars).status, DecisionStatus::Caution);
    }

    #[test]
    fn boundaries_inclusive_except_cvar() {
        let bars = DecisionBars {
            risk_adj: 9.25,
            ploss: 12.5,
            cvar: -15.0,
        };
        // Equal on risk_adj and ploss, cvar just above.
        assert_eq!(
            evaluate(&[row(9.25, 12.5, -14.99)], &bars).status,
            DecisionStatus::Go
        );
        // Equal on cvar is not enough.
        assert_eq!(
            evaluate(&[row(9.25, 12.5, -15.0)], &bars).status,
            DecisionStatus::Caution
        );
    }

    #[test]
    fn uses_batch_medians() {
        let batch = [row(20.0, 2.0, -3.0), row(1.0, 40.0, -30.0), row(10.0, 10.0, -8.0)];
        let s = evaluate(&batch, &DecisionBars::default());
        assert_eq!(s.risk_adj, 10.0);
        assert_eq!(s.ploss, 10.0);
        assert_eq!(s.cvar5, -8.0);
        assert_eq!(s.status, DecisionStatus::Go);
    }

    #[test]
    fn even_batch_averages_middle_pair() {
        let batch = [row(8.0, 14.0, -9.0), row(10.0, 16.0, -11.0)];
        let s = evaluate(&batch, &DecisionBars::default());
        assert_eq!(s.risk_adj, 9.0);
        assert_eq!(s.ploss, 15.0);
        assert_eq!(s.cvar5, -10.0);
        assert_eq!(s.status, DecisionStatus::Caution);
    }

    #[test]
    fn empty_batch_is_caution() {
        let s = evaluate(&[], &DecisionBars::default());
        assert!(s.risk_adj.is_nan());
        assert_eq!(s.status, DecisionStatus::Caution);
    }

    #[test]
    fn deterministic_for_identical_inputs() {
        let batch = [row(9.0, 14.0, -9.5), row(7.0, 18.0, -12.0), row(11.0, 11.0, -7.0)];
        let bars = DecisionBars::default();
        assert_eq!(evaluate(&batch, &bars), evaluate(&batch, &bars));
    }

    #[test]
    fn go_orders_before_caution() {
        assert!(DecisionStatus::Go < DecisionStatus::Caution);
        assert_eq!(serde_json::to_string(&DecisionStatus::Go).unwrap(), "\"GO\"");
    }
}
