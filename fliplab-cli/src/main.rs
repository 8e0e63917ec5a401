//! FlipLab CLI: evaluate flip deals, inspect regional friction, build prompts.
//!
//! Commands:
//! - `evaluate`: simulate a deal batch under both lenses and rank opportunities
//! - `friction`: print the regional friction index per ring
//! - `prompt`: print the assistant hand-off prompt for one deal

use std::path::{Path, PathBuf};
use std::sync::Once;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use fliplab_core::{friction_index, DealInput, DecisionBars, RegionRing, RegionTable};
use fliplab_runner::{
    handoff_prompt, load_region_table, run_evaluation, save_artifacts, BarsStore, Evaluation,
    EvaluationConfig, JsonFileBarsStore, NullBarsStore, SimulationMode,
};

const DEFAULT_PROFILES: &str = "data/regional_headwinds.json";

#[derive(Parser)]
#[command(name = "fliplab", about = "FlipLab CLI: flip-deal risk engine")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Simulate a deal batch under both lenses and rank opportunities.
    Evaluate {
        /// Deal JSON: an array of deals or a single deal object.
        #[arg(long)]
        deals: PathBuf,

        /// Path to a TOML run config. Flags below override it.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Regional profile JSON. Falls back to the built-in Chicagoland table.
        #[arg(long)]
        profiles: Option<PathBuf>,

        /// Trial budget: quick (10k), full (100k) or max (200k).
        #[arg(long)]
        mode: Option<SimulationMode>,

        /// Explicit trial count. Overrides --mode.
        #[arg(long)]
        trials: Option<usize>,

        /// Master seed.
        #[arg(long)]
        seed: Option<u64>,

        /// Decision bars as RISK_ADJ,PLOSS,CVAR (percent units).
        #[arg(long, value_parser = parse_bars)]
        bars: Option<DecisionBars>,

        /// Skip the bar grid search.
        #[arg(long, default_value_t = false)]
        no_autotune: bool,

        /// Where tuned bars are persisted.
        #[arg(long)]
        bars_cache: Option<PathBuf>,

        /// Do not read or write the bars cache.
        #[arg(long, default_value_t = false)]
        no_cache: bool,

        /// Seed the active bars from the cache when --bars is not given.
        #[arg(long, default_value_t = false)]
        seed_from_store: bool,

        /// Run everything on the calling thread.
        #[arg(long, default_value_t = false)]
        sequential: bool,

        /// Write flip_results.csv, monetization_opportunities.csv and summary.json here.
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// Print the full evaluation as JSON instead of tables.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Print the regional friction index for each ring.
    Friction {
        /// Regional profile JSON. Falls back to the built-in Chicagoland table.
        #[arg(long)]
        profiles: Option<PathBuf>,
    },
    /// Print the assistant hand-off prompt for one deal.
    Prompt {
        /// Deal JSON: an array of deals or a single deal object.
        #[arg(long)]
        deals: PathBuf,

        /// Zero-based index of the deal in the file.
        #[arg(long, default_value_t = 0)]
        index: usize,

        /// Optional question placed before the prompt.
        #[arg(long)]
        question: Option<String>,
    },
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Evaluate {
            deals,
            config,
            profiles,
            mode,
            trials,
            seed,
            bars,
            no_autotune,
            bars_cache,
            no_cache,
            seed_from_store,
            sequential,
            output_dir,
            json,
        } => {
            let mut cfg = match config {
                Some(path) => EvaluationConfig::from_file(&path)
                    .with_context(|| format!("failed to load config {}", path.display()))?,
                None => EvaluationConfig::default(),
            };
            if let Some(mode) = mode {
                cfg.mode = mode;
                cfg.trials = None;
            }
            if trials.is_some() {
                cfg.trials = trials;
            }
            if let Some(seed) = seed {
                cfg.seed = seed;
            }
            if bars.is_some() {
                cfg.bars = bars;
            }
            if profiles.is_some() {
                cfg.profiles = profiles;
            }
            if bars_cache.is_some() {
                cfg.bars_cache = bars_cache;
            }
            if no_cache {
                cfg.persist_bars = false;
            }
            cfg.autotune &= !no_autotune;
            cfg.seed_from_store |= seed_from_store;
            cfg.parallel &= !sequential;
            cfg.validate()?;

            run_evaluate_cmd(&deals, &cfg, output_dir.as_deref(), json)
        }
        Commands::Friction { profiles } => run_friction_cmd(profiles.as_deref()),
        Commands::Prompt {
            deals,
            index,
            question,
        } => run_prompt_cmd(&deals, index, question.as_deref()),
    }
}

/// Install the fmt subscriber once. Filter from `FLIPLAB_LOG`, default `fliplab=info`.
fn init_tracing() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_env("FLIPLAB_LOG")
            .unwrap_or_else(|_| EnvFilter::new("fliplab=info"));

        tracing_subscriber::registry()
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .with(filter)
            .init();
    });
}

fn parse_bars(s: &str) -> Result<DecisionBars, String> {
    let parts: Vec<f64> = s
        .split(',')
        .map(|p| p.trim().parse::<f64>().map_err(|e| format!("invalid number '{p}': {e}")))
        .collect::<Result<_, _>>()?;
    match parts.as_slice() {
        &[risk_adj, ploss, cvar] => Ok(DecisionBars {
            risk_adj,
            ploss,
            cvar,
        }),
        _ => Err(format!("expected RISK_ADJ,PLOSS,CVAR, got {} values", parts.len())),
    }
}

fn read_deals(path: &Path) -> Result<Vec<DealInput>> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read deals {}", path.display()))?;
    let value: serde_json::Value =
        serde_json::from_str(&json).with_context(|| format!("invalid JSON in {}", path.display()))?;
    let deals = if value.is_array() {
        serde_json::from_value::<Vec<DealInput>>(value)
    } else {
        serde_json::from_value::<DealInput>(value).map(|d| vec![d])
    }
    .with_context(|| format!("invalid deal record in {}", path.display()))?;

    for (i, deal) in deals.iter().enumerate() {
        deal.validate()
            .with_context(|| format!("deal #{i} ({}) failed validation", deal.address))?;
    }
    tracing::debug!(path = %path.display(), deals = deals.len(), "loaded deals");
    Ok(deals)
}

fn region_table(profiles: Option<&Path>) -> RegionTable {
    let path = profiles.unwrap_or_else(|| Path::new(DEFAULT_PROFILES));
    load_region_table(path, RegionTable::chicagoland())
}

fn run_evaluate_cmd(
    deals_path: &Path,
    cfg: &EvaluationConfig,
    output_dir: Option<&Path>,
    json: bool,
) -> Result<()> {
    let deals = read_deals(deals_path)?;
    if deals.is_empty() {
        bail!("no deals in {}", deals_path.display());
    }
    let table = region_table(cfg.profiles.as_deref());

    let store: Box<dyn BarsStore> = match cfg.bars_cache_path() {
        Some(path) => Box::new(JsonFileBarsStore::new(path)),
        None => Box::new(NullBarsStore),
    };

    let eval = run_evaluation(&deals, &table, cfg, store.as_ref())?;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&eval).context("failed to serialize evaluation")?
        );
    } else {
        print_evaluation(&eval);
    }

    if let Some(dir) = output_dir {
        let run_dir = save_artifacts(&eval, dir)?;
        println!("Artifacts saved to: {}", run_dir.display());
    }
    Ok(())
}

fn run_friction_cmd(profiles: Option<&Path>) -> Result<()> {
    let table = region_table(profiles);
    println!("{:<14} {:>8}", "Ring", "Friction");
    for ring in RegionRing::ALL {
        let hi = friction_index(ring, &table)?;
        let note = if table.get(ring).is_none() { "  (fallback)" } else { "" };
        println!("{:<14} {:>8.1}{note}", ring.name(), hi);
    }
    Ok(())
}

fn run_prompt_cmd(deals_path: &Path, index: usize, question: Option<&str>) -> Result<()> {
    let deals = read_deals(deals_path)?;
    let Some(deal) = deals.get(index) else {
        bail!("deal index {index} out of range ({} deals)", deals.len());
    };
    println!("{}", handoff_prompt(deal, question));
    Ok(())
}

fn print_evaluation(eval: &Evaluation) {
    let s = &eval.summary;
    println!();
    println!("=== Evaluation ===");
    println!("Trials:         {}", s.trials);
    println!("Seed:           {}", s.seed);
    println!(
        "Bars:           risk_adj >= {:.1}%, P(loss) <= {:.1}%, CVaR5 > {:.1}%",
        s.bars.risk_adj, s.bars.ploss, s.bars.cvar
    );
    if let (Some(d), Some(t)) = (s.defaults, s.tune) {
        println!(
            "Defaults:       risk_adj >= {:.1}%, P(loss) <= {:.1}%, CVaR5 > {:.1}% (tune score {:.3})",
            d.risk_adj, d.ploss, d.cvar, t.score
        );
    }
    println!();
    println!("--- Lens verdicts ---");
    for (lens, v) in &s.lenses {
        println!(
            "{:<10} {:<8} risk_adj {:>7.2}%  P(loss) {:>6.2}%  CVaR5 {:>7.2}%",
            lens.name(),
            v.status.label(),
            v.risk_adj,
            v.ploss,
            v.cvar5
        );
    }
    println!();
    println!("--- Deals ---");
    for r in &eval.results {
        println!(
            "{:<28} {:<13} {:<9} HI {:>5.1}  P50 {:>7.2}%  P(loss) {:>6.2}%  CVaR5 {:>7.2}%  risk_adj {:>7.2}%",
            r.address,
            r.region_ring.name(),
            r.lens.name(),
            r.friction,
            r.p50_roi,
            r.p_loss,
            r.cvar5_roi,
            r.risk_adj_roi
        );
    }
    println!();
    println!("--- Opportunities ---");
    for o in &eval.opportunities {
        println!(
            "{:<8} {:<13} {:<9} risk_adj {:>7.2}%  {}",
            o.status.label(),
            o.region.name(),
            o.lens.name(),
            o.risk_adj,
            o.nudge
        );
    }
    println!();
}
