//! Persistence for tuned decision bars.
//!
//! The store is best-effort: a missing or unreadable cache loads as `None`,
//! and the orchestrator logs and discards write failures.

use std::path::{Path, PathBuf};

use fliplab_core::DecisionBars;
use thiserror::Error;

/// Errors writing the bars cache.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to write bars cache {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to serialize bars: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Somewhere tuned bars can be read from and written to.
pub trait BarsStore: Send + Sync {
    fn load(&self) -> Option<DecisionBars>;
    fn save(&self, bars: &DecisionBars) -> Result<(), StoreError>;
}

/// Flat JSON triple `{"risk_adj": .., "ploss": .., "cvar": ..}` at a fixed path.
#[derive(Debug, Clone)]
pub struct JsonFileBarsStore {
    path: PathBuf,
}

impl JsonFileBarsStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl BarsStore for JsonFileBarsStore {
    fn load(&self) -> Option<DecisionBars> {
        let json = std::fs::read_to_string(&self.path).ok()?;
        match serde_json::from_str::<DecisionBars>(&json) {
            Ok(bars) if bars.risk_adj.is_finite() && bars.ploss.is_finite() && bars.cvar.is_finite() => {
                Some(bars)
            }
            Ok(bars) => {
                tracing::warn!(path = %self.path.display(), ?bars, "ignoring non-finite cached bars");
                None
            }
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "ignoring unreadable bars cache");
                None
            }
        }
    }

    fn save(&self, bars: &DecisionBars) -> Result<(), StoreError> {
        let io_err = |source| StoreError::Io {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
        let json = serde_json::to_string_pretty(bars)?;
        std::fs::write(&self.path, json).map_err(io_err)?;
        tracing::debug!(path = %self.path.display(), "saved tuned bars");
        Ok(())
    }
}

/// Store that never holds anything and accepts every write.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullBarsStore;

impl BarsStore for NullBarsStore {
    fn load(&self) -> Option<DecisionBars> {
        None
    }

    fn save(&self, _bars: &DecisionBars) -> Result<(), StoreError> {
        Ok(())
    }
}

/// In-memory store that records every write.
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct MemoryBarsStore {
    initial: Option<DecisionBars>,
    saved: std::sync::Mutex<Vec<DecisionBars>>,
}

#[cfg(test)]
impl MemoryBarsStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose `load` returns `bars`.
    pub fn with_bars(bars: DecisionBars) -> Self {
        Self {
            initial: Some(bars),
            saved: std::sync::Mutex::new(Vec::new()),
        }
    }

    /// Every triple written so far, oldest first.
    pub fn saved(&self) -> Vec<DecisionBars> {
        self.saved.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

#[cfg(test)]
impl BarsStore for MemoryBarsStore {
    fn load(&self) -> Option<DecisionBars> {
        self.saved().last().copied().or(self.initial)
    }

    fn save(&self, bars: &DecisionBars) -> Result<(), StoreError> {
        if let Ok(mut saved) = self.saved.lock() {
            saved.push(*bars);
        }
        Ok(())
    }
}
