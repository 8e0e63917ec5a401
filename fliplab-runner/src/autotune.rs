//! Bar autotuning: grid search over decision thresholds.
//!
//! Every candidate triple is scored on how the two lens batches respond to it:
//!
//! - **reward**: `1 − |consumer GO-rate − 0.33|`, aiming for roughly a third of
//!   deals looking actionable to a consumer
//! - **safety**: `(cvar + 20) / 10`, favoring tighter tail floors
//! - **penalty**: `−5 · (engineer GO-rate − 0.15)` once more than 15% of deals
//!   pass under the engineer lens
//!
//! The search keeps the first candidate with the highest score. The running
//! best starts at the supplied defaults with a score of −1, so defaults
//! survive unless some candidate strictly beats that.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use fliplab_core::{DealSimulationResult, DecisionBars};

/// Score the running best starts from.
pub const SCORE_SENTINEL: f64 = -1.0;

/// Consumer GO-rate the reward term aims for.
pub const TARGET_CONSUMER_GO_RATE: f64 = 0.33;

/// Engineer GO-rate above which the penalty applies.
pub const ENGINEER_GO_RATE_CAP: f64 = 0.15;

const PENALTY_SLOPE: f64 = 5.0;

/// Candidate values for each bar. Enumerated risk_adj outer, ploss middle, cvar inner.
#[derive(Debug, Clone, PartialEq)]
pub struct BarGrid {
    pub risk_adj: Vec<f64>,
    pub ploss: Vec<f64>,
    pub cvar: Vec<f64>,
}

impl Default for BarGrid {
    fn default() -> Self {
        Self::standard()
    }
}

impl BarGrid {
    /// risk_adj 6.0..=12.0 step 0.5, ploss 10.0..=25.0 step 0.5, cvar −20..=−6 step 1.
    pub fn standard() -> Self {
        Self {
            risk_adj: (0..=12).map(|i| 6.0 + 0.5 * f64::from(i)).collect(),
            ploss: (0..=30).map(|j| 10.0 + 0.5 * f64::from(j)).collect(),
            cvar: (0..=14).map(|k| -20.0 + f64::from(k)).collect(),
        }
    }

    /// Total number of candidate triples.
    pub fn size(&self) -> usize {
        self.risk_adj.len() * self.ploss.len() * self.cvar.len()
    }

    /// Whether `bars` is one of the grid's triples.
    pub fn contains(&self, bars: &DecisionBars) -> bool {
        self.risk_adj.contains(&bars.risk_adj)
            && self.ploss.contains(&bars.ploss)
            && self.cvar.contains(&bars.cvar)
    }

    /// All candidate triples in enumeration order.
    pub fn candidates(&self) -> Vec<DecisionBars> {
        let mut out = Vec::with_capacity(self.size());
        for &risk_adj in &self.risk_adj {
            for &ploss in &self.ploss {
                for &cvar in &self.cvar {
                    out.push(DecisionBars {
                        risk_adj,
                        ploss,
                        cvar,
                    });
                }
            }
        }
        out
    }
}

/// Result of a tuning pass.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TuneOutcome {
    pub bars: DecisionBars,
    pub score: f64,
    /// Candidates scored. Zero when either batch was empty.
    pub evaluated: usize,
}

/// Fraction of rows that pass `bars`. NaN for an empty batch.
pub fn go_rate(batch: &[DealSimulationResult], bars: &DecisionBars) -> f64 {
    if batch.is_empty() {
        return f64::NAN;
    }
    let passing = batch.iter().filter(|row| bars.passes(row)).count();
    passing as f64 / batch.len() as f64
}

/// Objective for one candidate given both lens GO-rates.
pub fn score(engineer_go: f64, consumer_go: f64, cvar_bar: f64) -> f64 {
    let reward = 1.0 - (consumer_go - TARGET_CONSUMER_GO_RATE).abs();
    let safety = (cvar_bar + 20.0) / 10.0;
    let penalty = if engineer_go <= ENGINEER_GO_RATE_CAP {
        0.0
    } else {
        -PENALTY_SLOPE * (engineer_go - ENGINEER_GO_RATE_CAP)
    };
    reward + safety + penalty
}

/// Grid search over decision bars.
#[derive(Debug, Clone)]
pub struct BarAutotuner {
    grid: BarGrid,
    parallel: bool,
}

impl Default for BarAutotuner {
    fn default() -> Self {
        Self::new(BarGrid::standard())
    }
}

impl BarAutotuner {
    pub fn new(grid: BarGrid) -> Self {
        Self {
            grid,
            parallel: true,
        }
    }

    /// Enables or disables parallel candidate scoring.
    pub fn with_parallelism(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn grid(&self) -> &BarGrid {
        &self.grid
    }

    /// Pick the best bars for the given Engineer and Consumer batches.
    ///
    /// Scores may be computed in parallel; the winner is always chosen by a
    /// sequential scan in enumeration order so ties keep the first candidate.
    pub fn tune(
        &self,
        engineer: &[DealSimulationResult],
        consumer: &[DealSimulationResult],
        defaults: DecisionBars,
    ) -> TuneOutcome {
        if engineer.is_empty() || consumer.is_empty() {
            tracing::debug!("empty lens batch, keeping default bars");
            return TuneOutcome {
                bars: defaults,
                score: SCORE_SENTINEL,
                evaluated: 0,
            };
        }

        let candidates = self.grid.candidates();
        let score_one = |b: &DecisionBars| score(go_rate(engineer, b), go_rate(consumer, b), b.cvar);
        let scores: Vec<f64> = if self.parallel {
            candidates.par_iter().map(score_one).collect()
        } else {
            candidates.iter().map(score_one).collect()
        };

        let mut best = defaults;
        let mut best_score = SCORE_SENTINEL;
        for (bars, &s) in candidates.iter().zip(&scores) {
            if s > best_score {
                best_score = s;
                best = *bars;
            }
        }

        tracing::info!(
            risk_adj = best.risk_adj,
            ploss = best.ploss,
            cvar = best.cvar,
            score = best_score,
            candidates = candidates.len(),
            "autotuned bars"
        );

        TuneOutcome {
            bars: best,
            score: best_score,
            evaluated: candidates.len(),
        }
    }
}

/// Tune over the standard grid.
pub fn autotune(
    engineer: &[DealSimulationResult],
    consumer: &[DealSimulationResult],
    defaults: DecisionBars,
) -> TuneOutcome {
    BarAutotuner::default().tune(engineer, consumer, defaults)
}
