//! Roulette engine configuration

use serde::{Deserialize, Serialize};

use crate::error::{RouletteError, RouletteResult};
use crate::geometry::ReelGeometry;
use crate::rarity::RarityTier;
use crate::timing::SpinTiming;

/// Entries on an idle/browsing reel
pub const DEFAULT_PREVIEW_LENGTH: usize = 15;

/// Entries on a spin reel
pub const DEFAULT_SPIN_LENGTH: usize = 50;

/// Which tiers decoys are drawn from on a spin reel
///
/// Decoys before the winner use `lead_tiers`; decoys after it use the
/// narrower `trail_tiers`, so the entries that scroll past right after the
/// landing spot never flash a top-tier reward. The case's own weight table
/// plays no part in either.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecoyPolicy {
    pub lead_tiers: Vec<RarityTier>,
    pub trail_tiers: Vec<RarityTier>,
}

impl DecoyPolicy {
    /// Draw every decoy from all tiers
    pub fn uniform() -> Self {
        Self {
            lead_tiers: RarityTier::ALL.to_vec(),
            trail_tiers: RarityTier::ALL.to_vec(),
        }
    }
}

impl Default for DecoyPolicy {
    fn default() -> Self {
        Self {
            lead_tiers: RarityTier::ALL.to_vec(),
            trail_tiers: vec![RarityTier::Common, RarityTier::Uncommon, RarityTier::Rare],
        }
    }
}

/// How preview reels tag entries when the case's own tiers have no stock
/// and the whole catalog is used instead
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PreviewFallback {
    /// Tag every fallback entry with the lowest tier, whatever its real tier
    TagLowestTier,
    /// Keep each entry's catalog tier
    TrueTier,
}

impl Default for PreviewFallback {
    fn default() -> Self {
        Self::TagLowestTier
    }
}

/// Complete engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouletteConfig {
    #[serde(default)]
    pub geometry: ReelGeometry,
    #[serde(default)]
    pub timing: SpinTiming,
    #[serde(default = "default_preview_length")]
    pub preview_length: usize,
    #[serde(default = "default_spin_length")]
    pub spin_length: usize,
    #[serde(default)]
    pub decoys: DecoyPolicy,
    #[serde(default)]
    pub preview_fallback: PreviewFallback,
}

fn default_preview_length() -> usize {
    DEFAULT_PREVIEW_LENGTH
}

fn default_spin_length() -> usize {
    DEFAULT_SPIN_LENGTH
}

impl RouletteConfig {
    /// Fast fixed-length config for tests and tools
    pub fn studio() -> Self {
        Self {
            timing: SpinTiming::studio(),
            ..Self::default()
        }
    }

    pub fn with_geometry(mut self, geometry: ReelGeometry) -> Self {
        self.geometry = geometry;
        self
    }

    pub fn with_timing(mut self, timing: SpinTiming) -> Self {
        self.timing = timing;
        self
    }

    pub fn with_spin_length(mut self, len: usize) -> Self {
        self.spin_length = len;
        self
    }

    pub fn validate(&self) -> RouletteResult<()> {
        self.geometry.validate()?;
        self.timing.validate()?;
        if self.preview_length == 0 {
            return Err(RouletteError::config("preview length must be at least 1"));
        }
        if self.spin_length == 0 {
            return Err(RouletteError::config("spin length must be at least 1"));
        }
        if self.decoys.lead_tiers.is_empty() || self.decoys.trail_tiers.is_empty() {
            return Err(RouletteError::config("decoy tier sets must not be empty"));
        }
        Ok(())
    }
}

impl Default for RouletteConfig {
    fn default() -> Self {
        Self {
            geometry: ReelGeometry::default(),
            timing: SpinTiming::default(),
            preview_length: DEFAULT_PREVIEW_LENGTH,
            spin_length: DEFAULT_SPIN_LENGTH,
            decoys: DecoyPolicy::default(),
            preview_fallback: PreviewFallback::default(),
        }
    }
}
