//! Regional profile loading.
//!
//! Profiles are best-effort input: a missing or malformed file logs a warning
//! and the caller's default table is used instead.

use std::path::Path;

use anyhow::{Context, Result};
use fliplab_core::RegionTable;

/// Read a `{"rings": {...}}` profile file.
pub fn read_region_table(path: &Path) -> Result<RegionTable> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read profiles {}", path.display()))?;
    serde_json::from_str(&json)
        .with_context(|| format!("failed to parse profiles {}", path.display()))
}

/// Read a profile file, falling back to `default` on any failure.
pub fn load_region_table(path: &Path, default: RegionTable) -> RegionTable {
    match read_region_table(path) {
        Ok(table) => {
            if table.is_empty() {
                tracing::warn!(path = %path.display(), "profile file has no rings");
            }
            tracing::debug!(path = %path.display(), rings = table.len(), "loaded regional profiles");
            table
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %format!("{e:#}"), "using default regional profiles");
            default
        }
    }
}
