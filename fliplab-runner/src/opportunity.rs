//! Opportunity table: per (region, lens) verdicts with an action nudge.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use fliplab_core::tail::median;
use fliplab_core::{DealSimulationResult, DecisionBars, DecisionStatus, Lens, RegionRing};

pub const GO_NUDGE: &str = "Pursue comps & financing quotes now";
pub const CAUTION_NUDGE: &str = "Renegotiate price 5–10% or trim rehab 10–15%";

/// Next step suggested for a verdict.
pub fn nudge(status: DecisionStatus) -> &'static str {
    match status {
        DecisionStatus::Go => GO_NUDGE,
        DecisionStatus::Caution => CAUTION_NUDGE,
    }
}

/// One row of the ranked opportunity table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Opportunity {
    pub region: RegionRing,
    pub lens: Lens,
    /// Median risk-adjusted ROI, percent.
    pub risk_adj: f64,
    /// Median probability of loss, percent.
    pub ploss: f64,
    /// Median CVaR5, percent.
    pub cvar5: f64,
    pub status: DecisionStatus,
    pub nudge: String,
}

/// Group rows by (region, lens), judge each group's medians against `bars`,
/// and rank GO before CAUTION, then by risk-adjusted ROI descending.
///
/// Groups are formed in ring order then lens order; the sort is stable, so
/// that order breaks remaining ties.
pub fn rank_opportunities(rows: &[DealSimulationResult], bars: &DecisionBars) -> Vec<Opportunity> {
    let mut groups: BTreeMap<(RegionRing, Lens), Vec<&DealSimulationResult>> = BTreeMap::new();
    for row in rows {
        groups.entry((row.region_ring, row.lens)).or_default().push(row);
    }

    let mut table: Vec<Opportunity> = groups
        .into_iter()
        .map(|((region, lens), members)| {
            let col = |f: fn(&DealSimulationResult) -> f64| {
                median(&members.iter().map(|r| f(r)).collect::<Vec<_>>())
            };
            let risk_adj = col(|r| r.risk_adj_roi);
            let ploss = col(|r| r.p_loss);
            let cvar5 = col(|r| r.cvar5_roi);
            let status = bars.status(risk_adj, ploss, cvar5);
            Opportunity {
                region,
                lens,
                risk_adj,
                ploss,
                cvar5,
                status,
                nudge: nudge(status).to_string(),
            }
        })
        .collect();

    table.sort_by(|a, b| {
        a.status
            .cmp(&b.status)
            .then_with(|| b.risk_adj.total_cmp(&a.risk_adj))
    });
    table
}
