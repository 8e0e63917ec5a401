//! Serializable evaluation configuration.
//!
//! Loaded from TOML; every field has a default so an empty file is valid.
//! CLI flags override file values after loading.

use std::path::{Path, PathBuf};

use fliplab_core::DecisionBars;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default location of the persisted bars cache.
pub const DEFAULT_BARS_CACHE: &str = "data/auto_tune.json";

/// Default master seed.
pub const DEFAULT_SEED: u64 = 42;

/// Errors from configuration loading and validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("trial count must be positive")]
    ZeroTrials,
    #[error("bars must be finite, got {0:?}")]
    NonFiniteBars(DecisionBars),
}

/// Named trial budgets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SimulationMode {
    #[default]
    Quick,
    Full,
    Max,
}

impl SimulationMode {
    pub fn trials(self) -> usize {
        match self {
            Self::Quick => 10_000,
            Self::Full => 100_000,
            Self::Max => 200_000,
        }
    }
}

impl std::str::FromStr for SimulationMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "quick" => Ok(Self::Quick),
            "full" => Ok(Self::Full),
            "max" => Ok(Self::Max),
            other => Err(format!("unknown mode '{other}' (expected quick, full or max)")),
        }
    }
}

/// Everything needed to reproduce one evaluation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluationConfig {
    /// Trial budget; ignored when `trials` is set.
    pub mode: SimulationMode,

    /// Explicit trial count.
    pub trials: Option<usize>,

    /// Master seed for every lens stream.
    pub seed: u64,

    /// Search the bar grid after simulating.
    pub autotune: bool,

    /// Caller-supplied bars. Defaults apply when absent.
    pub bars: Option<DecisionBars>,

    /// Where tuned bars are persisted. `None` disables persistence.
    pub bars_cache: Option<PathBuf>,

    /// Read and write `bars_cache`. `false` turns the cache off from TOML.
    pub persist_bars: bool,

    /// Seed the active bars from the cache when no bars are supplied.
    pub seed_from_store: bool,

    /// Regional profile JSON. The built-in table is used when absent.
    pub profiles: Option<PathBuf>,

    /// Simulate deals within a lens on the rayon pool.
    pub parallel: bool,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            mode: SimulationMode::default(),
            trials: None,
            seed: DEFAULT_SEED,
            autotune: true,
            bars: None,
            bars_cache: Some(PathBuf::from(DEFAULT_BARS_CACHE)),
            persist_bars: true,
            seed_from_store: false,
            profiles: None,
            parallel: true,
        }
    }
}

impl EvaluationConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Trial count after resolving `mode` against `trials`.
    pub fn effective_trials(&self) -> usize {
        self.trials.unwrap_or_else(|| self.mode.trials())
    }

    /// The cache path in force, if persistence is on.
    pub fn bars_cache_path(&self) -> Option<&Path> {
        self.bars_cache.as_deref().filter(|_| self.persist_bars)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.effective_trials() == 0 {
            return Err(ConfigError::ZeroTrials);
        }
        if let Some(bars) = self.bars {
            if !(bars.risk_adj.is_finite() && bars.ploss.is_finite() && bars.cvar.is_finite()) {
                return Err(ConfigError::NonFiniteBars(bars));
            }
        }
        Ok(())
    }
}
