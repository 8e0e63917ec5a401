//! Regional reference data: market statistics per Chicagoland ring.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The fixed set of region rings a deal can belong to.
///
/// Declaration order is the table iteration order, which also decides the
/// fallback entry for a ring missing from a [`RegionTable`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RegionRing {
    #[serde(rename = "Urban Core")]
    UrbanCore,
    #[serde(rename = "Inner Collar")]
    InnerCollar,
    #[serde(rename = "Outer Collar")]
    OuterCollar,
}

impl RegionRing {
    pub const ALL: [RegionRing; 3] = [Self::UrbanCore, Self::InnerCollar, Self::OuterCollar];

    pub fn name(&self) -> &'static str {
        match self {
            Self::UrbanCore => "Urban Core",
            Self::InnerCollar => "Inner Collar",
            Self::OuterCollar => "Outer Collar",
        }
    }
}

impl fmt::Display for RegionRing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for RegionRing {
    type Err = ProfileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|ring| ring.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ProfileError::UnknownRing(s.to_string()))
    }
}

/// Market statistics for one ring.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegionalProfile {
    /// Months of housing inventory on the market.
    pub inventory_months: f64,
    /// Median days on market.
    pub dom_days: f64,
    /// Sale price as a fraction of list price, in [0, 1].
    pub list_sale_ratio: f64,
    /// Effective property tax rate.
    pub tax_rate: f64,
    /// Typical municipal permit delay.
    pub permit_delay_days: f64,
}

/// Errors resolving regional reference data.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProfileError {
    #[error("regional profile table is empty")]
    EmptyTable,
    #[error("unknown region ring '{0}'. Valid: Urban Core, Inner Collar, Outer Collar")]
    UnknownRing(String),
}

/// Ring → profile mapping, loaded once and read-only afterwards.
///
/// Serialized as `{"rings": {"Urban Core": {...}, ...}}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegionTable {
    #[serde(default)]
    pub rings: BTreeMap<RegionRing, RegionalProfile>,
}

impl RegionTable {
    pub fn new(rings: BTreeMap<RegionRing, RegionalProfile>) -> Self {
        Self { rings }
    }

    pub fn is_empty(&self) -> bool {
        self.rings.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rings.len()
    }

    pub fn get(&self, ring: RegionRing) -> Option<&RegionalProfile> {
        self.rings.get(&ring)
    }

    /// Profile for `ring`, falling back to the first entry when the ring is absent.
    ///
    /// Returns the ring actually used alongside its profile. Fails only when
    /// the table has no entries at all.
    pub fn resolve(&self, ring: RegionRing) -> Result<(RegionRing, &RegionalProfile), ProfileError> {
        if let Some(profile) = self.rings.get(&ring) {
            return Ok((ring, profile));
        }
        let (&fallback, profile) = self.rings.iter().next().ok_or(ProfileError::EmptyTable)?;
        tracing::debug!(requested = %ring, fallback = %fallback, "region missing from table, using fallback");
        Ok((fallback, profile))
    }

    /// Built-in Chicagoland reference table.
    pub fn chicagoland() -> Self {
        let mut rings = BTreeMap::new();
        rings.insert(
            RegionRing::UrbanCore,
            RegionalProfile {
                inventory_months: 3.1,
                dom_days: 34.0,
                list_sale_ratio: 0.975,
                tax_rate: 0.0210,
                permit_delay_days: 45.0,
            },
        );
        rings.insert(
            RegionRing::InnerCollar,
            RegionalProfile {
                inventory_months: 2.6,
                dom_days: 28.0,
                list_sale_ratio: 0.985,
                tax_rate: 0.0235,
                permit_delay_days: 30.0,
            },
        );
        rings.insert(
            RegionRing::OuterCollar,
            RegionalProfile {
                inventory_months: 3.8,
                dom_days: 41.0,
                list_sale_ratio: 0.970,
                tax_rate: 0.0260,
                permit_delay_days: 21.0,
            },
        );
        Self { rings }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(inventory_months: f64) -> RegionalProfile {
        RegionalProfile {
            inventory_months,
            dom_days: 30.0,
            list_sale_ratio: 0.98,
            tax_rate: 0.02,
            permit_delay_days: 30.0,
        }
    }

    #[test]
    fn ring_names_round_trip() {
        for ring in RegionRing::ALL {
            assert_eq!(ring.name().parse::<RegionRing>().unwrap(), ring);
        }
        assert_eq!("inner collar".parse::<RegionRing>().unwrap(), RegionRing::InnerCollar);
        assert!("Suburbia".parse::<RegionRing>().is_err());
    }

    #[test]
    fn resolve_exact_ring() {
        let table = RegionTable::chicagoland();
        let (ring, p) = table.resolve(RegionRing::InnerCollar).unwrap();
        assert_eq!(ring, RegionRing::InnerCollar);
        assert_eq!(p.dom_days, 28.0);
    }

    #[test]
    fn absent_ring_falls_back_to_first_entry() {
        let mut rings = BTreeMap::new();
        rings.insert(RegionRing::OuterCollar, profile(5.0));
        rings.insert(RegionRing::InnerCollar, profile(2.0));
        let table = RegionTable::new(rings);

        let (ring, p) = table.resolve(RegionRing::UrbanCore).unwrap();
        assert_eq!(ring, RegionRing::InnerCollar);
        assert_eq!(p.inventory_months, 2.0);

        // Same answer every time.
        let (again, _) = table.resolve(RegionRing::UrbanCore).unwrap();
        assert_eq!(again, ring);
    }

    #[test]
    fn empty_table_fails_fast() {
        let table = RegionTable::default();
        assert_eq!(
            table.resolve(RegionRing::UrbanCore).unwrap_err(),
            ProfileError::EmptyTable
        );
    }

    #[test]
    fn json_shape_uses_ring_names() {
        let json = r#"{"rings": {"Outer Collar": {
            "inventory_months": 4.0, "dom_days": 45, "list_sale_ratio": 0.96,
            "tax_rate": 0.026, "permit_delay_days": 20}}}"#;
        let table: RegionTable = serde_json::from_str(json).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.get(RegionRing::OuterCollar).unwrap().dom_days, 45.0);
    }
}
