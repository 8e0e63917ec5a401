//! Deal Monte Carlo simulator: ROI distribution of a flip under one lens.
//!
//! Every trial combines three correlated shocks with a sampled market regime:
//!
//! 1. rehab  = exp(ln(max(rehab, 1)) + σ_rehab·z_rehab)
//! 2. sale   = max(arv·(1 + σ_sale·z_sale + regime sale shift), purchase / 2)
//! 3. hold   = max(hold + permit/30 + σ_hold·z_hold + regime hold shift, 1)
//! 4. interest = ltv·purchase·rate·hold/12
//! 5. selling  = clamp(selling_pct, 0, 0.12)·sale
//! 6. carry    = (carry / max(1, stated hold))·hold
//! 7. tax      = tax_drag·purchase·hold/12
//! 8. total    = purchase + rehab + carry + interest + tax + selling
//! 9. roi      = (sale − total) / total
//!
//! Each step is evaluated as a column over all trials. The sale floor keeps
//! totals away from zero; an all-zero-cost deal is outside the input contract.

use rand::Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::domain::deal::MAX_SELLING_PCT;
use crate::domain::{DealInput, ProfileError, RegionRing, RegionTable};
use crate::factors::{CorrelatedFactorGenerator, FactorDraws};
use crate::friction::friction_index;
use crate::lens::{Lens, LensParams, Regime};
use crate::tail::{percentile_sorted, sorted, tail_risk_sorted, TailRisk};

/// Fraction of purchase price the simulated sale can never drop below.
pub const SALE_FLOOR_FRACTION: f64 = 0.5;

/// Shortest simulated hold, in months.
pub const MIN_HOLD_MONTHS: f64 = 1.0;

/// Summary statistics for one (deal, lens) simulation.
///
/// ROI fields are percentages rounded to two decimals; the friction index is
/// rounded to one decimal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DealSimulationResult {
    pub address: String,
    pub region_ring: RegionRing,
    pub lens: Lens,
    pub friction: f64,
    pub p10_roi: f64,
    pub p50_roi: f64,
    pub p90_roi: f64,
    pub var5_roi: f64,
    pub cvar5_roi: f64,
    pub p_loss: f64,
    pub risk_adj_roi: f64,
}

/// Per-trial random inputs shared by every deal in one simulation call.
#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioDraws {
    pub factors: FactorDraws,
    pub regimes: Vec<Regime>,
}

impl ScenarioDraws {
    pub fn len(&self) -> usize {
        self.regimes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regimes.is_empty()
    }
}

/// Monte Carlo simulator bound to one lens.
#[derive(Debug, Clone)]
pub struct DealMonteCarloSimulator {
    lens: Lens,
    params: LensParams,
    factors: CorrelatedFactorGenerator,
}

impl DealMonteCarloSimulator {
    pub fn new(lens: Lens) -> Self {
        Self {
            lens,
            params: lens.params(),
            factors: CorrelatedFactorGenerator::deal_shocks(),
        }
    }

    /// Use a custom factor generator (e.g. a different correlation structure).
    pub fn with_factors(mut self, factors: CorrelatedFactorGenerator) -> Self {
        self.factors = factors;
        self
    }

    pub fn lens(&self) -> Lens {
        self.lens
    }

    pub fn params(&self) -> &LensParams {
        &self.params
    }

    /// Draw correlated shocks, then one regime per trial, from `rng`.
    pub fn draw<R: Rng + ?Sized>(&self, rng: &mut R, trials: usize) -> ScenarioDraws {
        let factors = self.factors.draw(rng, trials);
        let regimes = self.params.sample_regimes(rng, trials);
        ScenarioDraws { factors, regimes }
    }

    /// Per-trial ROI (as a fraction) for one deal.
    pub fn roi_samples(&self, deal: &DealInput, draws: &ScenarioDraws) -> Vec<f64> {
        let p = &self.params;
        let f = &draws.factors;

        let ln_rehab = deal.rehab.max(1.0).ln();
        let rehab_draw: Vec<f64> = f
            .rehab
            .iter()
            .map(|z| (ln_rehab + p.rehab_sigma * z).exp())
            .collect();

        let sale_floor = SALE_FLOOR_FRACTION * deal.purchase;
        let sale_draw: Vec<f64> = f
            .sale
            .iter()
            .zip(&draws.regimes)
            .map(|(z, r)| {
                (deal.projected_sale * (1.0 + p.sale_sigma * z + r.sale_shift())).max(sale_floor)
            })
            .collect();

        let base_hold = deal.baseline_hold_months();
        let hold_draw: Vec<f64> = f
            .hold
            .iter()
            .zip(&draws.regimes)
            .map(|(z, r)| (base_hold + p.hold_sigma * z + r.hold_shift()).max(MIN_HOLD_MONTHS))
            .collect();

        let annual_interest = deal.loan_amount() * deal.loan_rate_annual;
        let annual_tax = deal.tax_drag * deal.purchase;
        let monthly_carry = deal.monthly_carry();
        let selling_pct = deal.selling_pct.clamp(0.0, MAX_SELLING_PCT);

        sale_draw
            .iter()
            .zip(&hold_draw)
            .zip(&rehab_draw)
            .map(|((&sale, &hold), &rehab)| {
                let years = hold / 12.0;
                let interest = annual_interest * years;
                let selling = selling_pct * sale;
                let carry = monthly_carry * hold;
                let tax = annual_tax * years;
                let total = deal.purchase + rehab + carry + interest + tax + selling;
                (sale - total) / total
            })
            .collect()
    }

    /// Simulate one deal against pre-drawn scenarios.
    pub fn simulate_deal(
        &self,
        deal: &DealInput,
        friction: f64,
        draws: &ScenarioDraws,
    ) -> DealSimulationResult {
        let roi = self.roi_samples(deal, draws);
        self.summarize(deal, friction, &roi)
    }

    /// Simulate a batch of `(deal, friction)` pairs against one shared draw set.
    ///
    /// Output order matches input order in both modes.
    pub fn simulate_batch(
        &self,
        deals: &[(DealInput, f64)],
        draws: &ScenarioDraws,
        parallel: bool,
    ) -> Vec<DealSimulationResult> {
        if parallel {
            deals
                .par_iter()
                .map(|(deal, friction)| self.simulate_deal(deal, *friction, draws))
                .collect()
        } else {
            deals
                .iter()
                .map(|(deal, friction)| self.simulate_deal(deal, *friction, draws))
                .collect()
        }
    }

    fn summarize(&self, deal: &DealInput, friction: f64, roi: &[f64]) -> DealSimulationResult {
        let n = roi.len();
        let losses = roi.iter().filter(|&&r| r < 0.0).count();
        let p_loss = if n == 0 { f64::NAN } else { losses as f64 / n as f64 };

        let sorted_roi = sorted(roi);
        let p10 = percentile_sorted(&sorted_roi, 10.0);
        let p50 = percentile_sorted(&sorted_roi, 50.0);
        let p90 = percentile_sorted(&sorted_roi, 90.0);
        let TailRisk { var5, cvar5 } = tail_risk_sorted(&sorted_roi).unwrap_or(TailRisk {
            var5: f64::NAN,
            cvar5: f64::NAN,
        });

        let risk_adj = (1.0 - friction / 100.0) * p50;

        DealSimulationResult {
            address: deal.address.clone(),
            region_ring: deal.region_ring,
            lens: self.lens,
            friction: round_to(friction, 1),
            p10_roi: pct(p10),
            p50_roi: pct(p50),
            p90_roi: pct(p90),
            var5_roi: pct(var5),
            cvar5_roi: pct(cvar5),
            p_loss: pct(p_loss),
            risk_adj_roi: pct(risk_adj),
        }
    }
}

/// Resolve frictions, draw scenarios and simulate every deal under `lens`.
pub fn simulate_lens<R: Rng + ?Sized>(
    deals: &[DealInput],
    table: &RegionTable,
    lens: Lens,
    trials: usize,
    rng: &mut R,
    parallel: bool,
) -> Result<Vec<DealSimulationResult>, ProfileError> {
    let inputs = deals
        .iter()
        .map(|deal| friction_index(deal.region_ring, table).map(|hi| (deal.clone(), hi)))
        .collect::<Result<Vec<_>, ProfileError>>()?;

    let simulator = DealMonteCarloSimulator::new(lens);
    let draws = simulator.draw(rng, trials);
    tracing::debug!(lens = %lens, trials, deals = deals.len(), "simulating lens");
    Ok(simulator.simulate_batch(&inputs, &draws, parallel))
}

/// Fraction → percent, rounded to two decimals.
fn pct(x: f64) -> f64 {
    round_to(100.0 * x, 2)
}

fn round_to(x: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (x * scale).round() / scale
}
