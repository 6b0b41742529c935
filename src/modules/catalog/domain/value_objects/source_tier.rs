use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Provenance tier of an attribute or image, most trusted first.
///
/// Tier ordering is the heart of the write policy: an enrichment result may
/// overwrite existing data only when its tier strictly outranks what is
/// already recorded, and nothing outranks `Authoritative`.
#[derive(
    diesel_derive_enum::DbEnum, Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
#[ExistingTypePath = "crate::schema::sql_types::SourceTier"]
pub enum SourceTier {
    Authoritative,
    Official,
    Curated,
    Allowlisted,
    General,
    VideoDerived,
    Stock,
}

impl SourceTier {
    /// Trust rank, 1 = most trusted.
    pub fn rank(&self) -> u8 {
        match self {
            SourceTier::Authoritative => 1,
            SourceTier::Official => 2,
            SourceTier::Curated => 3,
            SourceTier::Allowlisted => 4,
            SourceTier::General => 5,
            SourceTier::VideoDerived => 6,
            SourceTier::Stock => 7,
        }
    }

    /// True when `self` is strictly more trusted than `other`.
    pub fn outranks(&self, other: &SourceTier) -> bool {
        self.rank() < other.rank()
    }

    /// Stock imagery is a placeholder and never counts toward sufficiency.
    pub fn is_placeholder(&self) -> bool {
        matches!(self, SourceTier::Stock)
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            SourceTier::Authoritative => "authoritative",
            SourceTier::Official => "official",
            SourceTier::Curated => "curated",
            SourceTier::Allowlisted => "allowlisted",
            SourceTier::General => "general",
            SourceTier::VideoDerived => "video_derived",
            SourceTier::Stock => "stock",
        }
    }
}

impl fmt::Display for SourceTier {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl FromStr for SourceTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "authoritative" => Ok(SourceTier::Authoritative),
            "official" => Ok(SourceTier::Official),
            "curated" => Ok(SourceTier::Curated),
            "allowlisted" => Ok(SourceTier::Allowlisted),
            "general" => Ok(SourceTier::General),
            "video_derived" | "video-derived" => Ok(SourceTier::VideoDerived),
            "stock" => Ok(SourceTier::Stock),
            other => Err(format!("Unknown source tier: {}", other)),
        }
    }
}
