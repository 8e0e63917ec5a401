//! Lenses: named risk postures applied to the same deal.
//!
//! A lens is a bundle of market-regime probabilities and volatility
//! parameters. Two postures exist:
//! - **Engineer**: pessimistic, wide variance, more weight on the down regime.
//! - **Consumer**: realistic, narrower variance, more weight on the up regime.

use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Market regime for a single trial.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Regime {
    Down,
    Base,
    Up,
}

impl Regime {
    pub const ALL: [Regime; 3] = [Self::Down, Self::Base, Self::Up];

    /// Mean shift applied to the relative sale-price shock.
    pub fn sale_shift(&self) -> f64 {
        match self {
            Self::Down => -0.03,
            Self::Base => 0.0,
            Self::Up => 0.02,
        }
    }

    /// Mean shift applied to the hold duration, in months.
    pub fn hold_shift(&self) -> f64 {
        match self {
            Self::Down => 0.6,
            Self::Base => 0.0,
            Self::Up => -0.3,
        }
    }
}

/// Risk posture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Lens {
    Engineer,
    Consumer,
}

/// Regime mixture and volatilities for one lens.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LensParams {
    /// Probabilities of (down, base, up); sums to 1.
    pub regime_probs: [f64; 3],
    /// Log-normal sigma on the rehab estimate.
    pub rehab_sigma: f64,
    /// Relative sigma on the projected sale price.
    pub sale_sigma: f64,
    /// Absolute sigma on hold duration, in months.
    pub hold_sigma: f64,
}

impl Lens {
    pub const ALL: [Lens; 2] = [Self::Engineer, Self::Consumer];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Engineer => "Engineer",
            Self::Consumer => "Consumer",
        }
    }

    pub fn params(&self) -> LensParams {
        match self {
            Self::Engineer => LensParams {
                regime_probs: [0.20, 0.60, 0.20],
                rehab_sigma: 0.30,
                sale_sigma: 0.15,
                hold_sigma: 1.40,
            },
            Self::Consumer => LensParams {
                regime_probs: [0.15, 0.60, 0.25],
                rehab_sigma: 0.15,
                sale_sigma: 0.08,
                hold_sigma: 0.70,
            },
        }
    }
}

impl fmt::Display for Lens {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl LensParams {
    /// Map a uniform draw in [0, 1) onto a regime via the cumulative mixture.
    pub fn regime_for(&self, u: f64) -> Regime {
        let [down, base, _] = self.regime_probs;
        if u < down {
            Regime::Down
        } else if u < down + base {
            Regime::Base
        } else {
            Regime::Up
        }
    }

    /// Sample one regime per trial, independently.
    pub fn sample_regimes<R: Rng + ?Sized>(&self, rng: &mut R, trials: usize) -> Vec<Regime> {
        (0..trials)
            .map(|_| self.regime_for(rng.gen::<f64>()))
            .collect()
    }
}
