//! Criterion benchmarks for the runner hot loops.
//!
//! Run with: `cargo bench -p fliplab-runner`
//!
//! - Bar grid search over synthetic lens batches
//! - Opportunity grouping and ranking
//! - A quick-mode evaluation end to end

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use fliplab_core::{DealInput, DealSimulationResult, DecisionBars, Lens, RegionRing, RegionTable};
use fliplab_runner::autotune::BarAutotuner;
use fliplab_runner::bars_store::NullBarsStore;
use fliplab_runner::config::EvaluationConfig;
use fliplab_runner::opportunity::rank_opportunities;
use fliplab_runner::orchestrator::run_evaluation;

/// Synthetic result rows spread over rings and outcomes.
fn generate_rows(lens: Lens, count: usize) -> Vec<DealSimulationResult> {
    (0..count)
        .map(|i| {
            let x = (i % 37) as f64;
            DealSimulationResult {
                address: format!("{i} S Halsted St"),
                region_ring: RegionRing::ALL[i % 3],
                lens,
                friction: 45.0,
                p10_roi: -10.0 + x * 0.2,
                p50_roi: 2.0 + x * 0.5,
                p90_roi: 18.0 + x,
                var5_roi: -20.0 + x * 0.3,
                cvar5_roi: -26.0 + x * 0.4,
                p_loss: 45.0 - x,
                risk_adj_roi: 1.0 + x * 0.3,
            }
        })
        .collect()
}

fn bench_grid_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("bar_grid_search");

    for size in [5usize, 50, 500] {
        let engineer = generate_rows(Lens::Engineer, size);
        let consumer = generate_rows(Lens::Consumer, size);

        for (label, parallel) in [("sequential", false), ("parallel", true)] {
            let tuner = BarAutotuner::default().with_parallelism(parallel);
            group.bench_with_input(BenchmarkId::new(label, size), &size, |b, _| {
                b.iter(|| tuner.tune(black_box(&engineer), black_box(&consumer), DecisionBars::default()));
            });
        }
    }

    group.finish();
}

fn bench_ranking(c: &mut Criterion) {
    let mut rows = generate_rows(Lens::Engineer, 1_000);
    rows.extend(generate_rows(Lens::Consumer, 1_000));

    c.bench_function("rank_opportunities_2000_rows", |b| {
        b.iter(|| rank_opportunities(black_box(&rows), &DecisionBars::default()));
    });
}

fn bench_quick_evaluation(c: &mut Criterion) {
    let deals: Vec<DealInput> = (0..5)
        .map(|i| DealInput {
            address: format!("{} N Clark St", 100 + i),
            region_ring: RegionRing::ALL[i % 3],
            purchase: 250_000.0 + 10_000.0 * i as f64,
            rehab: 45_000.0,
            carry: 6_500.0,
            projected_sale: 360_000.0 + 12_000.0 * i as f64,
            hold_months: 4.0,
            permit_delay_days: 21,
            tax_drag: 0.02,
            selling_pct: 0.05,
            ltv: 0.8,
            loan_rate_annual: 0.085,
        })
        .collect();
    let table = RegionTable::chicagoland();
    let config = EvaluationConfig {
        bars_cache: None,
        ..EvaluationConfig::default()
    };

    let mut group = c.benchmark_group("evaluation");
    group.sample_size(10);
    group.bench_function("quick_5_deals", |b| {
        b.iter(|| run_evaluation(black_box(&deals), &table, &config, &NullBarsStore));
    });
    group.finish();
}

criterion_group!(benches, bench_grid_search, bench_ranking, bench_quick_evaluation);
criterion_main!(benches);
