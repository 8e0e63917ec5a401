//! Tail risk estimation: empirical percentiles, VaR and CVaR.
//!
//! All functions are pure: sample in, scalar out. Percentiles use linear
//! interpolation between order statistics at rank `p/100 · (n − 1)`.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

/// Tail quantile used for VaR/CVaR, in percent.
pub const TAIL_PERCENTILE: f64 = 5.0;

/// Empirical tail statistics of a return sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TailRisk {
    /// 5th-percentile return.
    pub var5: f64,
    /// Mean of returns at or below `var5`.
    pub cvar5: f64,
}

/// Sort a sample ascending. NaNs compare equal and keep their position.
pub fn sorted(values: &[f64]) -> Vec<f64> {
    let mut out = values.to_vec();
    out.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    out
}

/// Percentile of a sorted slice using linear interpolation.
///
/// `p` is clamped to [0, 100]. The result never leaves the bracketing
/// order statistics, and equal neighbours return that value exactly.
pub fn percentile_sorted(sorted: &[f64], p: f64) -> f64 {
    let n = sorted.len();
    if n == 0 {
        return f64::NAN;
    }
    if n == 1 {
        return sorted[0];
    }
    let rank = (p.clamp(0.0, 100.0) / 100.0) * (n - 1) as f64;
    let lo = (rank.floor() as usize).min(n - 1);
    let hi = (lo + 1).min(n - 1);
    let frac = rank - lo as f64;
    let (a, b) = (sorted[lo], sorted[hi]);
    if a == b {
        return a;
    }
    (a + (b - a) * frac).max(a.min(b)).min(a.max(b))
}

/// Median of an unsorted sample; the mean of the two middle values for even counts.
///
/// Returns NaN for an empty sample.
pub fn median(values: &[f64]) -> f64 {
    percentile_sorted(&sorted(values), 50.0)
}

/// VaR5 and CVaR5 of a sorted sample. `None` when the sample is empty.
///
/// CVaR averages every observation at or below the interpolated 5th
/// percentile. If that set is empty the percentile itself is returned.
/// The tail is averaged as offsets below VaR5, so CVaR5 never exceeds VaR5
/// and a flat tail returns VaR5 exactly.
pub fn tail_risk_sorted(sorted: &[f64]) -> Option<TailRisk> {
    if sorted.is_empty() {
        return None;
    }
    let var5 = percentile_sorted(sorted, TAIL_PERCENTILE);
    let tail_len = sorted.partition_point(|&x| x <= var5);
    let cvar5 = if tail_len == 0 {
        var5
    } else {
        let shortfall = sorted[..tail_len].iter().map(|&x| x - var5).sum::<f64>();
        var5 + (shortfall / tail_len as f64).min(0.0)
    };
    Some(TailRisk { var5, cvar5 })
}

/// VaR5 and CVaR5 of an unsorted sample.
pub fn tail_risk(values: &[f64]) -> Option<TailRisk> {
    tail_risk_sorted(&sorted(values))
}

// ─── Tests ───────────────────────────────────────────────────────────
