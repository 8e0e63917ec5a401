//! Evaluation orchestrator: one full run over a deal batch.
//!
//! Pipeline:
//! 1. Resolve each deal's regional friction
//! 2. Simulate the batch under both lenses (in parallel, one RNG stream per lens)
//! 3. Judge each lens batch against the active bars
//! 4. Optionally autotune the bars, re-judge, and persist the tuned triple
//! 5. Build the ranked opportunity table

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use fliplab_core::{
    evaluate, simulate_lens, DealInput, DealSimulationResult, DecisionBars, DecisionSummary, Lens,
    ProfileError, RegionTable, RngHierarchy,
};

use crate::autotune::{BarAutotuner, TuneOutcome};
use crate::bars_store::BarsStore;
use crate::config::{ConfigError, EvaluationConfig};
use crate::opportunity::{rank_opportunities, Opportunity};

/// Errors from an evaluation run.
#[derive(Debug, Error)]
pub enum EvaluationError {
    #[error("no deals to evaluate")]
    EmptyBatch,
    #[error("profile error: {0}")]
    Profile(#[from] ProfileError),
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
}

/// Per-lens verdicts and the bars they were judged against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub lenses: BTreeMap<Lens, DecisionSummary>,
    /// Bars in force for the verdicts and the opportunity table.
    pub bars: DecisionBars,
    /// Present when autotuning ran, for comparison with `bars`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub defaults: Option<DecisionBars>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tune: Option<TuneOutcome>,
    pub trials: usize,
    pub seed: u64,
}

impl RunSummary {
    pub fn lens(&self, lens: Lens) -> Option<&DecisionSummary> {
        self.lenses.get(&lens)
    }
}

/// Complete output of one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    /// Engineer rows followed by Consumer rows, each in deal order.
    pub results: Vec<DealSimulationResult>,
    pub summary: RunSummary,
    pub opportunities: Vec<Opportunity>,
}

/// Run the full pipeline over `deals`.
///
/// The store is consulted for seed bars only when `seed_from_store` is set
/// and no bars were supplied. It is written only when autotuning ran; a
/// failed write is logged and does not fail the run.
pub fn run_evaluation(
    deals: &[DealInput],
    table: &RegionTable,
    config: &EvaluationConfig,
    store: &dyn BarsStore,
) -> Result<Evaluation, EvaluationError> {
    if deals.is_empty() {
        return Err(EvaluationError::EmptyBatch);
    }
    config.validate()?;

    let trials = config.effective_trials();
    tracing::info!(deals = deals.len(), trials, seed = config.seed, "starting evaluation");

    let rngs = RngHierarchy::new(config.seed);
    let simulate = |lens: Lens| {
        let mut rng = rngs.rng_for(lens.name(), 0);
        simulate_lens(deals, table, lens, trials, &mut rng, config.parallel)
    };
    let (engineer, consumer) = if config.parallel {
        rayon::join(|| simulate(Lens::Engineer), || simulate(Lens::Consumer))
    } else {
        (simulate(Lens::Engineer), simulate(Lens::Consumer))
    };
    let (engineer, consumer) = (engineer?, consumer?);

    let defaults = DecisionBars::default();
    let mut bars = match config.bars {
        Some(bars) => bars,
        None if config.seed_from_store => store.load().unwrap_or(defaults),
        None => defaults,
    };

    let mut tune = None;
    if config.autotune {
        let outcome = BarAutotuner::default()
            .with_parallelism(config.parallel)
            .tune(&engineer, &consumer, defaults);
        bars = outcome.bars;
        tune = Some(outcome);
        if let Err(e) = store.save(&bars) {
            tracing::warn!(error = %e, "failed to persist tuned bars");
        }
    }

    let mut lenses = BTreeMap::new();
    lenses.insert(Lens::Engineer, evaluate(&engineer, &bars));
    lenses.insert(Lens::Consumer, evaluate(&consumer, &bars));
    for (lens, s) in &lenses {
        tracing::info!(
            lens = %lens,
            status = %s.status,
            risk_adj = s.risk_adj,
            ploss = s.ploss,
            cvar5 = s.cvar5,
            "lens verdict"
        );
    }

    let mut results = engineer;
    results.extend(consumer);
    let opportunities = rank_opportunities(&results, &bars);

    Ok(Evaluation {
        results,
        summary: RunSummary {
            lenses,
            bars,
            defaults: tune.map(|_| defaults),
            tune,
            trials,
            seed: config.seed,
        },
        opportunities,
    })
}
