//! Rarity tiers

use serde::{Deserialize, Serialize};

/// Ordered reward rarity
///
/// The declaration order is the sampling order: the weighted sampler walks
/// tiers from `Common` to `Legendary`, so an exact cumulative boundary
/// resolves to the earlier tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RarityTier {
    Common,
    Uncommon,
    Rare,
    Epic,
    Legendary,
}

impl Default for RarityTier {
    fn default() -> Self {
        Self::Common
    }
}

impl RarityTier {
    /// All tiers in sampling order
    pub const ALL: [RarityTier; 5] = [
        RarityTier::Common,
        RarityTier::Uncommon,
        RarityTier::Rare,
        RarityTier::Epic,
        RarityTier::Legendary,
    ];

    /// Lowest tier
    pub fn lowest() -> Self {
        Self::Common
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Common => "common",
            Self::Uncommon => "uncommon",
            Self::Rare => "rare",
            Self::Epic => "epic",
            Self::Legendary => "legendary",
        }
    }

    /// Parse from a config name (case-insensitive)
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "common" => Some(Self::Common),
            "uncommon" => Some(Self::Uncommon),
            "rare" => Some(Self::Rare),
            "epic" => Some(Self::Epic),
            "legendary" => Some(Self::Legendary),
            _ => None,
        }
    }

    /// Display label
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Common => "Common",
            Self::Uncommon => "Uncommon",
            Self::Rare => "Rare",
            Self::Epic => "Epic",
            Self::Legendary => "Legendary",
        }
    }

    /// Accent color used for result highlights
    pub fn accent_color(&self) -> &'static str {
        match self {
            Self::Common => "#b0c3d9",
            Self::Uncommon => "#5e98d9",
            Self::Rare => "#4b69ff",
            Self::Epic => "#8847ff",
            Self::Legendary => "#eb4b4b",
        }
    }
}

impl std::fmt::Display for RarityTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
