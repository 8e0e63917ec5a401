//! Deal record: the deterministic inputs of a single flip.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::region::RegionRing;

/// Deterministic inputs for one flip deal.
///
/// Monetary fields are in dollars; ratios are fractions (0.05 = 5%).
/// The engine assumes these values were range-checked with [`DealInput::validate`]
/// (or an equivalent upstream schema) and does not re-check them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DealInput {
    pub address: String,
    pub region_ring: RegionRing,
    pub purchase: f64,
    pub rehab: f64,
    /// Total carrying cost over the stated hold, not per month.
    pub carry: f64,
    /// After-repair value.
    pub projected_sale: f64,
    #[serde(default = "default_hold_months")]
    pub hold_months: f64,
    #[serde(default)]
    pub permit_delay_days: u32,
    /// Annual tax drag as a fraction of purchase price.
    #[serde(default = "default_tax_drag")]
    pub tax_drag: f64,
    pub selling_pct: f64,
    #[serde(default = "default_ltv")]
    pub ltv: f64,
    #[serde(default = "default_loan_rate")]
    pub loan_rate_annual: f64,
}

fn default_hold_months() -> f64 {
    4.0
}

fn default_tax_drag() -> f64 {
    0.02
}

fn default_ltv() -> f64 {
    0.80
}

fn default_loan_rate() -> f64 {
    0.085
}

/// Schema bounds for deal inputs.
pub const MIN_PURCHASE: f64 = 10_000.0;
pub const MIN_PROJECTED_SALE: f64 = 10_000.0;
pub const MAX_SELLING_PCT: f64 = 0.12;
pub const MAX_TAX_DRAG: f64 = 0.05;
pub const MAX_PERMIT_DELAY_DAYS: u32 = 180;
pub const MAX_LOAN_RATE: f64 = 0.25;

/// A deal field outside the accepted input schema.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("{field} must be a finite number, got {value}")]
    NotFinite { field: &'static str, value: f64 },
    #[error("{field} = {value} is below the minimum {min}")]
    BelowMinimum {
        field: &'static str,
        value: f64,
        min: f64,
    },
    #[error("{field} = {value} is above the maximum {max}")]
    AboveMaximum {
        field: &'static str,
        value: f64,
        max: f64,
    },
    #[error("address must not be empty")]
    EmptyAddress,
}

impl DealInput {
    /// Check every field against the input schema and return the first violation.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.address.trim().is_empty() {
            return Err(ValidationError::EmptyAddress);
        }

        check_range("purchase", self.purchase, MIN_PURCHASE, None)?;
        check_range("rehab", self.rehab, 0.0, None)?;
        check_range("carry", self.carry, 0.0, None)?;
        check_range("selling_pct", self.selling_pct, 0.0, Some(MAX_SELLING_PCT))?;
        check_range("projected_sale", self.projected_sale, MIN_PROJECTED_SALE, None)?;
        check_range("hold_months", self.hold_months, 1.0, None)?;
        check_range(
            "permit_delay_days",
            f64::from(self.permit_delay_days),
            0.0,
            Some(f64::from(MAX_PERMIT_DELAY_DAYS)),
        )?;
        check_range("tax_drag", self.tax_drag, 0.0, Some(MAX_TAX_DRAG))?;
        check_range("ltv", self.ltv, 0.0, Some(1.0))?;
        check_range(
            "loan_rate_annual",
            self.loan_rate_annual,
            0.0,
            Some(MAX_LOAN_RATE),
        )?;
        Ok(())
    }

    /// Amount financed at purchase.
    pub fn loan_amount(&self) -> f64 {
        self.ltv * self.purchase
    }

    /// Carrying cost per month, derived from the stated total over the stated hold.
    pub fn monthly_carry(&self) -> f64 {
        self.carry / self.hold_months.max(1.0)
    }

    /// Baseline hold before any simulated shock: stated months plus permit delay.
    pub fn baseline_hold_months(&self) -> f64 {
        self.hold_months + f64::from(self.permit_delay_days) / 30.0
    }
}

fn check_range(
    field: &'static str,
    value: f64,
    min: f64,
    max: Option<f64>,
) -> Result<(), ValidationError> {
    if !value.is_finite() {
        return Err(ValidationError::NotFinite { field, value });
    }
    if value < min {
        return Err(ValidationError::BelowMinimum { field, value, min });
    }
    if let Some(max) = max {
        if value > max {
            return Err(ValidationError::AboveMaximum { field, value, max });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn belmont() -> DealInput {
        DealInput {
            address: "1234 W Belmont Ave".into(),
            region_ring: RegionRing::UrbanCore,
            purchase: 310_000.0,
            rehab: 50_000.0,
            carry: 8_450.0,
            projected_sale: 410_000.0,
            hold_months: 4.0,
            permit_delay_days: 45,
            tax_drag: 0.022,
            selling_pct: 0.05,
            ltv: 0.80,
            loan_rate_annual: 0.085,
        }
    }

    #[test]
    fn valid_deal_passes() {
        assert_eq!(belmont().validate(), Ok(()));
    }

    #[test]
    fn low_purchase_rejected() {
        let mut deal = belmont();
        deal.purchase = 5_000.0;
        assert!(matches!(
            deal.validate(),
            Err(ValidationError::BelowMinimum { field: "purchase", .. })
        ));
    }

    #[test]
    fn selling_pct_above_cap_rejected() {
        let mut deal = belmont();
        deal.selling_pct = 0.13;
        assert!(matches!(
            deal.validate(),
            Err(ValidationError::AboveMaximum { field: "selling_pct", .. })
        ));
    }

    #[test]
    fn permit_delay_above_cap_rejected() {
        let mut deal = belmont();
        deal.permit_delay_days = 181;
        assert!(matches!(
            deal.validate(),
            Err(ValidationError::AboveMaximum { field: "permit_delay_days", .. })
        ));
    }

    #[test]
    fn nan_rejected() {
        let mut deal = belmont();
        deal.rehab = f64::NAN;
        assert!(matches!(
            deal.validate(),
            Err(ValidationError::NotFinite { field: "rehab", .. })
        ));
    }

    #[test]
    fn blank_address_rejected() {
        let mut deal = belmont();
        deal.address = "   ".into();
        assert_eq!(deal.validate(), Err(ValidationError::EmptyAddress));
    }

    #[test]
    fn optional_fields_default_on_deserialize() {
        let json = r#"{
            "address": "1 N State St",
            "region_ring": "Inner Collar",
            "purchase": 200000,
            "rehab": 30000,
            "carry": 6000,
            "projected_sale": 270000,
            "selling_pct": 0.05
        }"#;
        let deal: DealInput = serde_json::from_str(json).unwrap();
        assert_eq!(deal.region_ring, RegionRing::InnerCollar);
        assert_eq!(deal.hold_months, 4.0);
        assert_eq!(deal.permit_delay_days, 0);
        assert_eq!(deal.tax_drag, 0.02);
        assert_eq!(deal.ltv, 0.80);
        assert_eq!(deal.loan_rate_annual, 0.085);
    }

    #[test]
    fn derived_amounts() {
        let deal = belmont();
        assert!((deal.loan_amount() - 248_000.0).abs() < 1e-9);
        assert!((deal.monthly_carry() - 2_112.5).abs() < 1e-9);
        assert!((deal.baseline_hold_months() - 5.5).abs() < 1e-9);
    }
}
