//! FlipLab Core: the flip-deal risk engine.
//!
//! This crate contains the simulation and decision engine:
//! - Domain types (deal inputs, region rings, regional profiles)
//! - Regional friction index
//! - Correlated factor generation (Gaussian copula via Cholesky)
//! - Risk lenses (Engineer / Consumer parameter bundles)
//! - Per-deal Monte Carlo simulator
//! - Tail risk estimation (percentiles, VaR5, CVaR5)
//! - GO/CAUTION decision evaluation against threshold bars
//! - Deterministic, hash-derived RNG streams

pub mod decision;
pub mod domain;
pub mod factors;
pub mod friction;
pub mod lens;
pub mod rng;
pub mod simulator;
pub mod tail;

pub use decision::{evaluate, DecisionBars, DecisionStatus, DecisionSummary};
pub use domain::{DealInput, ProfileError, RegionRing, RegionTable, RegionalProfile, ValidationError};
pub use factors::{CorrelatedFactorGenerator, CorrelationMatrix, FactorDraws, FactorError};
pub use friction::{friction_index, profile_friction};
pub use lens::{Lens, LensParams, Regime};
pub use rng::{RngHierarchy, SimRng};
pub use simulator::{simulate_lens, DealMonteCarloSimulator, DealSimulationResult, ScenarioDraws};
pub use tail::TailRisk;
