//! Domain types for FlipLab.

pub mod deal;
pub mod region;

pub use deal::{DealInput, ValidationError};
pub use region::{ProfileError, RegionRing, RegionTable, RegionalProfile};
