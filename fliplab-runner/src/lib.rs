//! FlipLab Runner: evaluation orchestration, bar autotuning, exports.
//!
//! This crate builds on `fliplab-core` to provide:
//! - Run configuration (TOML) and simulation modes
//! - Regional profile loading with a built-in fallback
//! - Full evaluation runs over both lenses
//! - Decision bar autotuning and best-effort persistence
//! - Ranked (region, lens) opportunity tables
//! - CSV/JSON artifacts and an assistant hand-off prompt

pub mod autotune;
pub mod bars_store;
pub mod config;
pub mod export;
pub mod handoff;
pub mod opportunity;
pub mod orchestrator;
pub mod profiles;

pub use autotune::{autotune, BarAutotuner, BarGrid, TuneOutcome};
pub use bars_store::{BarsStore, JsonFileBarsStore, NullBarsStore, StoreError};
pub use config::{ConfigError, EvaluationConfig, SimulationMode};
pub use export::{opportunities_csv, results_csv, save_artifacts, summary_json};
pub use handoff::handoff_prompt;
pub use opportunity::{rank_opportunities, Opportunity};
pub use orchestrator::{run_evaluation, Evaluation, EvaluationError, RunSummary};
pub use profiles::{load_region_table, read_region_table};
