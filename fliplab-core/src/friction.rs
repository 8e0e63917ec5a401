//! Regional friction index: a 0–100 composite of market headwinds.
//!
//! Five sub-scores, each normalized to [0, 1] against a fixed reference:
//! - **inventory**: months of inventory / 6
//! - **days on market**: DOM / 60
//! - **list/sale gap**: 1 − list-to-sale ratio (used directly)
//! - **tax**: tax rate / 0.025
//! - **permit**: permit delay / 60 days
//!
//! Weighted 0.30 / 0.25 / 0.20 / 0.15 / 0.10, scaled by 100, clamped to [0, 100].

use crate::domain::{ProfileError, RegionRing, RegionTable, RegionalProfile};

const INVENTORY_REF_MONTHS: f64 = 6.0;
const DOM_REF_DAYS: f64 = 60.0;
const TAX_REF_RATE: f64 = 0.025;
const PERMIT_REF_DAYS: f64 = 60.0;

const W_INVENTORY: f64 = 0.30;
const W_DOM: f64 = 0.25;
const W_LIST_SALE_GAP: f64 = 0.20;
const W_TAX: f64 = 0.15;
const W_PERMIT: f64 = 0.10;

/// Friction index for a single profile.
pub fn profile_friction(profile: &RegionalProfile) -> f64 {
    let inv = (profile.inventory_months / INVENTORY_REF_MONTHS).min(1.0);
    let dom = (profile.dom_days / DOM_REF_DAYS).min(1.0);
    let gap = 1.0 - profile.list_sale_ratio;
    let tax = (profile.tax_rate / TAX_REF_RATE).min(1.0);
    let permit = (profile.permit_delay_days / PERMIT_REF_DAYS).min(1.0);

    let hi = 100.0
        * (W_INVENTORY * inv + W_DOM * dom + W_LIST_SALE_GAP * gap + W_TAX * tax + W_PERMIT * permit);
    hi.clamp(0.0, 100.0)
}

/// Friction index for `ring`, using the table's fallback entry when the ring is absent.
pub fn friction_index(ring: RegionRing, table: &RegionTable) -> Result<f64, ProfileError> {
    let (_, profile) = table.resolve(ring)?;
    Ok(profile_friction(profile))
}
