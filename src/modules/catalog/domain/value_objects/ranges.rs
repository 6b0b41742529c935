use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Guest capacity bounds. Either side may be unknown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapacityRange {
    pub min: Option<i32>,
    pub max: Option<i32>,
}

impl CapacityRange {
    pub fn new(min: Option<i32>, max: Option<i32>) -> Self {
        Self { min, max }
    }

    /// Both bounds present with min above max. A missing side never counts
    /// as inverted.
    pub fn is_inverted(&self) -> bool {
        matches!((self.min, self.max), (Some(min), Some(max)) if min > max)
    }

    pub fn is_empty(&self) -> bool {
        self.min.is_none() && self.max.is_none()
    }
}

/// What a quoted price covers. Venues list either a flat event fee or a
/// per-guest rate; listings imported without a unit leave it unset.
#[derive(
    diesel_derive_enum::DbEnum, Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
#[ExistingTypePath = "crate::schema::sql_types::PriceUnit"]
pub enum PriceUnit {
    PerEvent,
    PerPerson,
}

impl PriceUnit {
    pub fn display_name(&self) -> &'static str {
        match self {
            PriceUnit::PerEvent => "per_event",
            PriceUnit::PerPerson => "per_person",
        }
    }
}

impl fmt::Display for PriceUnit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl FromStr for PriceUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "per_event" => Ok(PriceUnit::PerEvent),
            "per_person" => Ok(PriceUnit::PerPerson),
            other => Err(format!("Unknown price unit: {}", other)),
        }
    }
}

/// Price bounds in the catalog's base currency.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceRange {
    pub min: Option<i32>,
    pub max: Option<i32>,
    pub unit: Option<PriceUnit>,
}

impl PriceRange {
    pub fn new(min: Option<i32>, max: Option<i32>) -> Self {
        Self {
            min,
            max,
            unit: None,
        }
    }

    pub fn with_unit(mut self, unit: PriceUnit) -> Self {
        self.unit = Some(unit);
        self
    }

    pub fn is_inverted(&self) -> bool {
        matches!((self.min, self.max), (Some(min), Some(max)) if min > max)
    }

    pub fn is_empty(&self) -> bool {
        self.min.is_none() && self.max.is_none()
    }
}
