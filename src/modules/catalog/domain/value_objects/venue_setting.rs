use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(
    diesel_derive_enum::DbEnum, Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
#[ExistingTypePath = "crate::schema::sql_types::VenueSetting"]
pub enum VenueSetting {
    Indoor,
    Outdoor,
}

impl VenueSetting {
    pub fn display_name(&self) -> &'static str {
        match self {
            VenueSetting::Indoor => "indoor",
            VenueSetting::Outdoor => "outdoor",
        }
    }
}

impl fmt::Display for VenueSetting {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl FromStr for VenueSetting {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "indoor" => Ok(VenueSetting::Indoor),
            "outdoor" => Ok(VenueSetting::Outdoor),
            other => Err(format!("Unknown venue setting: {}", other)),
        }
    }
}
