//! Correlated factor generation: Gaussian copula over three deal shocks.
//!
//! Each trial gets three standard-normal shocks (sale price, hold duration,
//! rehab cost) with a fixed correlation structure:
//! - sale ↔ hold: −0.35 (slow sales come with soft prices)
//! - sale ↔ rehab: 0.20
//! - hold ↔ rehab: 0.15
//!
//! Independent normals `z` are drawn row by row and mapped through the lower
//! Cholesky factor `L` of the correlation matrix, `x = L·z`.

use rand::Rng;
use rand_distr::StandardNormal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of correlated factors per trial.
pub const FACTOR_COUNT: usize = 3;

/// Diagonal jitter added before decomposition.
pub const CHOLESKY_JITTER: f64 = 1e-12;

/// Factor order inside the correlation matrix.
pub const SALE: usize = 0;
pub const HOLD: usize = 1;
pub const REHAB: usize = 2;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum FactorError {
    #[error("correlation matrix is not symmetric at ({row}, {col})")]
    NotSymmetric { row: usize, col: usize },
    #[error("correlation matrix is not positive definite (pivot {pivot} = {value})")]
    NotPositiveDefinite { pivot: usize, value: f64 },
}

/// Symmetric 3×3 correlation matrix over (sale, hold, rehab).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CorrelationMatrix(pub [[f64; FACTOR_COUNT]; FACTOR_COUNT]);

impl Default for CorrelationMatrix {
    fn default() -> Self {
        Self::deal_shocks()
    }
}

impl CorrelationMatrix {
    /// The fixed deal-shock correlation structure.
    pub fn deal_shocks() -> Self {
        Self([
            [1.0, -0.35, 0.20],
            [-0.35, 1.0, 0.15],
            [0.20, 0.15, 1.0],
        ])
    }

    pub fn identity() -> Self {
        Self([[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]])
    }

    /// Lower-triangular Cholesky factor of `self + jitter·I`.
    pub fn cholesky(&self) -> Result<[[f64; FACTOR_COUNT]; FACTOR_COUNT], FactorError> {
        let m = &self.0;
        for row in 0..FACTOR_COUNT {
            for col in 0..row {
                if (m[row][col] - m[col][row]).abs() > 1e-12 {
                    return Err(FactorError::NotSymmetric { row, col });
                }
            }
        }

        let mut l = [[0.0; FACTOR_COUNT]; FACTOR_COUNT];
        for i in 0..FACTOR_COUNT {
            for j in 0..=i {
                let dot: f64 = (0..j).map(|k| l[i][k] * l[j][k]).sum();
                if i == j {
                    let pivot = m[i][i] + CHOLESKY_JITTER - dot;
                    if pivot <= 0.0 || !pivot.is_finite() {
                        return Err(FactorError::NotPositiveDefinite { pivot: i, value: pivot });
                    }
                    l[i][j] = pivot.sqrt();
                } else {
                    l[i][j] = (m[i][j] - dot) / l[j][j];
                }
            }
        }
        Ok(l)
    }
}

/// Correlated shocks for N trials, stored column-wise.
#[derive(Debug, Clone, PartialEq)]
pub struct FactorDraws {
    pub sale: Vec<f64>,
    pub hold: Vec<f64>,
    pub rehab: Vec<f64>,
}

impl FactorDraws {
    pub fn len(&self) -> usize {
        self.sale.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sale.is_empty()
    }

    /// The three shocks of trial `i` in (sale, hold, rehab) order.
    pub fn trial(&self, i: usize) -> [f64; FACTOR_COUNT] {
        [self.sale[i], self.hold[i], self.rehab[i]]
    }
}

/// Draws correlated standard-normal shocks through a fixed Cholesky factor.
#[derive(Debug, Clone)]
pub struct CorrelatedFactorGenerator {
    lower: [[f64; FACTOR_COUNT]; FACTOR_COUNT],
}

impl CorrelatedFactorGenerator {
    pub fn new(correlation: &CorrelationMatrix) -> Result<Self, FactorError> {
        Ok(Self {
            lower: correlation.cholesky()?,
        })
    }

    /// Generator for the fixed deal-shock correlation structure.
    pub fn deal_shocks() -> Self {
        let lower = CorrelationMatrix::deal_shocks()
            .cholesky()
            .unwrap_or_else(|_| unreachable!("deal-shock matrix is positive definite"));
        Self { lower }
    }

    pub fn lower(&self) -> &[[f64; FACTOR_COUNT]; FACTOR_COUNT] {
        &self.lower
    }

    /// Draw `trials` correlated shock vectors from `rng`.
    ///
    /// Consumes exactly `3 × trials` standard normals, trial by trial.
    pub fn draw<R: Rng + ?Sized>(&self, rng: &mut R, trials: usize) -> FactorDraws {
        let mut sale = Vec::with_capacity(trials);
        let mut hold = Vec::with_capacity(trials);
        let mut rehab = Vec::with_capacity(trials);

        let l = &self.lower;
        for _ in 0..trials {
            let z: [f64; FACTOR_COUNT] = [
                rng.sample(StandardNormal),
                rng.sample(StandardNormal),
                rng.sample(StandardNormal),
            ];
            sale.push(l[SALE][0] * z[0]);
            hold.push(l[HOLD][0] * z[0] + l[HOLD][1] * z[1]);
            rehab.push(l[REHAB][0] * z[0] + l[REHAB][1] * z[1] + l[REHAB][2] * z[2]);
        }

        FactorDraws { sale, hold, rehab }
    }
}

impl Default for CorrelatedFactorGenerator {
    fn default() -> Self {
        Self::deal_shocks()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::seeded;

    fn sample_correlation(a: &[f64], b: &[f64]) -> f64 {
        let n = a.len() as f64;
        let ma = a.iter().sum::<f64>() / n;
        let mb = b.iter().sum::<f64>() / n;
        let cov: f64 = a.iter().zip(b).map(|(x, y)| (x - ma) * (y - mb)).sum::<f64>() / n;
        let va: f64 = a.iter().map(|x| (x - ma).powi(2)).sum::<f64>() / n;
        let vb: f64 = b.iter().map(|y| (y - mb).powi(2)).sum::<f64>() / n;
        cov / (va.sqrt() * vb.sqrt())
    }

    #[test]
    fn cholesky_reconstructs_matrix() {
        let m = CorrelationMatrix::deal_shocks();
        let l = m.cholesky().unwrap();
        for i in 0..FACTOR_COUNT {
            for j in 0..FACTOR_COUNT {
                let v: f64 = (0..FACTOR_COUNT).map(|k| l[i][k] * l[j][k]).sum();
                let expected = m.0[i][j] + if i == j { CHOLESKY_JITTER } else { 0.0 };
                assert!((v - expected).abs() < 1e-12, "({i},{j}): {v} vs {expected}");
            }
        }
        // Lower triangular
        assert_eq!(l[0][1], 0.0);
        assert_eq!(l[0][2], 0.0);
        assert_eq!(l[1][2], 0.0);
    }

    #[test]
    fn non_positive_definite_rejected() {
        let bad = CorrelationMatrix([[1.0, 0.99, -0.99], [0.99, 1.0, 0.99], [-0.99, 0.99, 1.0]]);
        assert!(matches!(
            bad.cholesky(),
            Err(FactorError::NotPositiveDefinite { .. })
        ));
    }

    #[test]
    fn asymmetric_rejected() {
        let bad = CorrelationMatrix([[1.0, 0.5, 0.0], [0.1, 1.0, 0.0], [0.0, 0.0, 1.0]]);
        assert_eq!(
            bad.cholesky().unwrap_err(),
            FactorError::NotSymmetric { row: 1, col: 0 }
        );
    }

    #[test]
    fn identity_passes_normals_through() {
        let gen = CorrelatedFactorGenerator::new(&CorrelationMatrix::identity()).unwrap();
        let draws = gen.draw(&mut seeded(1), 4);
        let mut rng = seeded(1);
        for i in 0..4 {
            let z: [f64; 3] = [
                rng.sample(StandardNormal),
                rng.sample(StandardNormal),
                rng.sample(StandardNormal),
            ];
            let t = draws.trial(i);
            for k in 0..3 {
                assert!((t[k] - z[k]).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn draws_have_target_correlation() {
        let gen = CorrelatedFactorGenerator::deal_shocks();
        let draws = gen.draw(&mut seeded(42), 50_000);
        assert_eq!(draws.len(), 50_000);

        let sh = sample_correlation(&draws.sale, &draws.hold);
        let sr = sample_correlation(&draws.sale, &draws.rehab);
        let hr = sample_correlation(&draws.hold, &draws.rehab);
        assert!((sh + 0.35).abs() < 0.03, "sale/hold {sh}");
        assert!((sr - 0.20).abs() < 0.03, "sale/rehab {sr}");
        assert!((hr - 0.15).abs() < 0.03, "hold/rehab {hr}");
    }

    #[test]
    fn same_seed_same_draws() {
        let gen = CorrelatedFactorGenerator::deal_shocks();
        let a = gen.draw(&mut seeded(9), 1_000);
        let b = gen.draw(&mut seeded(9), 1_000);
        assert_eq!(a, b);
    }

    #[test]
    fn zero_trials_is_empty() {
        let draws = CorrelatedFactorGenerator::deal_shocks().draw(&mut seeded(0), 0);
        assert!(draws.is_empty());
    }
}
