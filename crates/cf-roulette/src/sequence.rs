//! Sequence Builder — reel layouts for previews and spins

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::case::WeightTable;
use crate::catalog::{RewardCatalog, RewardCatalogEntry, RolledItem};
use crate::config::{DecoyPolicy, PreviewFallback};
use crate::error::{RouletteError, RouletteResult};
use crate::rarity::RarityTier;
use crate::sampler::pick_from_pool;

/// Position of the guaranteed winner on a spin reel of `len` entries
pub fn winning_index_for(len: usize) -> usize {
    len / 2
}

/// Ordered reel entries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReelSequence {
    entries: Vec<RolledItem>,
    /// Set on spin reels only
    winning_index: Option<usize>,
}

impl ReelSequence {
    pub fn entries(&self) -> &[RolledItem] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&RolledItem> {
        self.entries.get(index)
    }

    pub fn winning_index(&self) -> Option<usize> {
        self.winning_index
    }

    /// Entry at the winning index
    pub fn winner(&self) -> Option<&RolledItem> {
        self.winning_index.and_then(|i| self.entries.get(i))
    }

    pub fn is_spin(&self) -> bool {
        self.winning_index.is_some()
    }

    /// Number of entries per tier
    pub fn tier_histogram(&self) -> [usize; 5] {
        let mut counts = [0usize; 5];
        for entry in &self.entries {
            counts[entry.tier as usize] += 1;
        }
        counts
    }
}

/// Builds preview and spin reels from a catalog
#[derive(Debug, Clone, Copy)]
pub struct SequenceBuilder<'a> {
    catalog: &'a RewardCatalog,
    decoys: &'a DecoyPolicy,
    fallback: PreviewFallback,
}

impl<'a> SequenceBuilder<'a> {
    pub fn new(
        catalog: &'a RewardCatalog,
        decoys: &'a DecoyPolicy,
        fallback: PreviewFallback,
    ) -> Self {
        Self {
            catalog,
            decoys,
            fallback,
        }
    }

    /// Browsing reel: `len` entries sampled uniformly, with replacement,
    /// from every entry of every positively weighted tier. No winner.
    ///
    /// When that union is empty the whole catalog is used and entries are
    /// tagged according to the [`PreviewFallback`] policy.
    pub fn build_preview<R: Rng + ?Sized>(
        &self,
        weights: &WeightTable,
        len: usize,
        rng: &mut R,
    ) -> RouletteResult<ReelSequence> {
        if len == 0 {
            return Err(RouletteError::config("preview length must be at least 1"));
        }

        let mut pool: Vec<(RarityTier, &RewardCatalogEntry)> = weights
            .positive_tiers()
            .into_iter()
            .flat_map(|tier| self.catalog.pool(tier).iter().map(move |e| (tier, e)))
            .collect();

        if pool.is_empty() {
            log::debug!(
                "Preview pool empty for weights {:?}, falling back to full catalog",
                weights
            );
            pool = self
                .catalog
                .entries()
                .map(|(tier, e)| match self.fallback {
                    PreviewFallback::TagLowestTier => (RarityTier::lowest(), e),
                    PreviewFallback::TrueTier => (tier, e),
                })
                .collect();
        }

        if pool.is_empty() {
            return Err(RouletteError::config("catalog has no entries"));
        }

        let entries = (0..len)
            .map(|_| {
                let (tier, entry) = pool[rng.random_range(0..pool.len())];
                RolledItem::new(entry.clone(), tier)
            })
            .collect();

        Ok(ReelSequence {
            entries,
            winning_index: None,
        })
    }

    /// Spin reel: the authoritative item copied to `len / 2`, decoys elsewhere
    ///
    /// Decoys are drawn position by position from index 0 upward, so a
    /// seeded RNG reproduces the reel exactly.
    pub fn build_spin<R: Rng + ?Sized>(
        &self,
        winner: &RolledItem,
        len: usize,
        rng: &mut R,
    ) -> RouletteResult<ReelSequence> {
        if len == 0 {
            return Err(RouletteError::config("spin length must be at least 1"));
        }
        let winning_index = winning_index_for(len);

        let mut entries = Vec::with_capacity(len);
        for index in 0..len {
            let entry = if index == winning_index {
                winner.clone()
            } else if index < winning_index {
                self.draw_decoy(&self.decoys.lead_tiers, rng)?
            } else {
                self.draw_decoy(&self.decoys.trail_tiers, rng)?
            };
            entries.push(entry);
        }

        log::debug!(
            "Built spin reel: {} entries, winner '{}' ({}) at {}",
            len,
            winner.name(),
            winner.tier,
            winning_index
        );

        Ok(ReelSequence {
            entries,
            winning_index: Some(winning_index),
        })
    }

    /// Up to `count` distinct entries from the case's weighted tiers, shuffled
    /// (the case card thumbnail strip)
    pub fn preview_icons<R: Rng + ?Sized>(
        &self,
        weights: &WeightTable,
        count: usize,
        rng: &mut R,
    ) -> Vec<RolledItem> {
        let mut distinct: Vec<RolledItem> = Vec::new();
        for tier in weights.positive_tiers() {
            for entry in self.catalog.pool(tier) {
                if !distinct.iter().any(|d| d.entry.name == entry.name) {
                    distinct.push(RolledItem::new(entry.clone(), tier));
                }
            }
        }
        distinct.shuffle(rng);
        distinct.truncate(count);
        distinct
    }

    /// Uniform tier among the stocked tiers of `tiers`, then a uniform entry.
    /// Falls back to every stocked tier when none of `tiers` has entries.
    fn draw_decoy<R: Rng + ?Sized>(
        &self,
        tiers: &[RarityTier],
        rng: &mut R,
    ) -> RouletteResult<RolledItem> {
        let mut candidates: Vec<RarityTier> = tiers
            .iter()
            .copied()
            .filter(|t| !self.catalog.pool(*t).is_empty())
            .collect();
        if candidates.is_empty() {
            candidates = self.catalog.stocked_tiers();
        }
        if candidates.is_empty() {
            return Err(RouletteError::config("catalog has no entries for decoys"));
        }

        let tier = candidates[rng.random_range(0..candidates.len())];
        pick_from_pool(self.catalog.pool(tier), tier, rng)
    }
}
