//! Weighted Sampler — WeightTable × RewardCatalog → RolledItem

use rand::Rng;

use crate::case::WeightTable;
use crate::catalog::{RewardCatalog, RewardCatalogEntry, RolledItem};
use crate::error::{RouletteError, RouletteResult};
use crate::rarity::RarityTier;

/// Samples rewards for one weight table and catalog
///
/// Construction validates both, so `sample` cannot fail afterwards.
#[derive(Debug, Clone, Copy)]
pub struct WeightedSampler<'a> {
    weights: &'a WeightTable,
    catalog: &'a RewardCatalog,
    total: f64,
}

impl<'a> WeightedSampler<'a> {
    pub fn new(weights: &'a WeightTable, catalog: &'a RewardCatalog) -> RouletteResult<Self> {
        weights.validate_against(catalog)?;
        Ok(Self {
            weights,
            catalog,
            total: weights.total(),
        })
    }

    /// Sample a tier: P(t) = weight(t) / Σweights
    ///
    /// Draws `u` from `[0, Σweights)` and walks tiers in [`RarityTier::ALL`]
    /// order, subtracting each weight; the first tier that brings the
    /// remainder to ≤ 0 wins. Zero-weight tiers are skipped outright.
    pub fn sample_tier<R: Rng + ?Sized>(&self, rng: &mut R) -> RarityTier {
        let mut remainder = rng.random::<f64>() * self.total;
        let mut last_positive = RarityTier::lowest();

        for tier in RarityTier::ALL {
            let weight = self.weights.weight(tier);
            if weight <= 0.0 {
                continue;
            }
            last_positive = tier;
            remainder -= weight;
            if remainder <= 0.0 {
                return tier;
            }
        }

        // Rounding can leave a sliver of remainder after the last tier
        last_positive
    }

    /// Sample a tier, then an entry uniformly within it
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> RolledItem {
        let tier = self.sample_tier(rng);
        let pool = self.catalog.pool(tier);
        // validate_against guarantees a non-empty pool for any positive tier
        let entry = &pool[rng.random_range(0..pool.len())];
        RolledItem::new(entry.clone(), tier)
    }

    pub fn weights(&self) -> &WeightTable {
        self.weights
    }

    pub fn catalog(&self) -> &RewardCatalog {
        self.catalog
    }
}

/// One-shot sample
pub fn sample_reward<R: Rng + ?Sized>(
    weights: &WeightTable,
    catalog: &RewardCatalog,
    rng: &mut R,
) -> RouletteResult<RolledItem> {
    Ok(WeightedSampler::new(weights, catalog)?.sample(rng))
}

/// Pick an entry uniformly from a pool and tag it
pub fn pick_from_pool<R: Rng + ?Sized>(
    pool: &[RewardCatalogEntry],
    tier: RarityTier,
    rng: &mut R,
) -> RouletteResult<RolledItem> {
    if pool.is_empty() {
        return Err(RouletteError::config(format!("tier {} has no catalog entries", tier)));
    }
    let entry = &pool[rng.random_range(0..pool.len())];
    Ok(RolledItem::new(entry.clone(), tier))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{RngCore, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    /// Returns the same word forever
    struct FixedRng(u64);

    impl RngCore for FixedRng {
        fn next_u32(&mut self) -> u32 {
            (self.0 >> 32) as u32
        }

        fn next_u64(&mut self) -> u64 {
            self.0
        }

        fn fill_bytes(&mut self, dst: &mut [u8]) {
            dst.fill(self.0 as u8);
        }
    }

    fn catalog() -> RewardCatalog {
        RewardCatalog::new()
            .with_entry(RarityTier::Common, RewardCatalogEntry::new("Coal", "⚫", 30))
            .with_entry(RarityTier::Common, RewardCatalogEntry::new("Apple", "🍎", 40))
            .with_entry(RarityTier::Uncommon, RewardCatalogEntry::new("Diamond", "💎", 150))
            .with_entry(RarityTier::Rare, RewardCatalogEntry::new("Elytra", "🧥", 800))
            .with_entry(RarityTier::Legendary, RewardCatalogEntry::new("Crown", "👑", 10000))
    }

    #[test]
    fn test_distribution_70_30() {
        let catalog = catalog();
        let weights = WeightTable::new()
            .with(RarityTier::Common, 70.0)
            .with(RarityTier::Uncommon, 30.0);
        let sampler = WeightedSampler::new(&weights, &catalog).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(42);

        let n = 100_000;
        let commons = (0..n)
            .filter(|_| sampler.sample_tier(&mut rng) == RarityTier::Common)
            .count();
        let freq = commons as f64 / n as f64;
        // 4σ for p = 0.7, n = 100k is ≈ 0.0058
        assert!((freq - 0.7).abs() < 0.01, "common frequency {}", freq);
    }

    #[test]
    fn test_zero_weight_never_sampled() {
        let catalog = catalog();
        let weights = WeightTable::new()
            .with(RarityTier::Common, 1.0)
            .with(RarityTier::Rare, 0.0)
            .with(RarityTier::Legendary, 1.0);
        let sampler = WeightedSampler::new(&weights, &catalog).unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        for _ in 0..20_000 {
            let item = sampler.sample(&mut rng);
            assert_ne!(item.tier, RarityTier::Rare);
            assert_ne!(item.tier, RarityTier::Uncommon);
        }
    }

    #[test]
    fn test_lowest_draw_picks_first_positive_tier() {
        let catalog = catalog();
        let weights = WeightTable::new()
            .with(RarityTier::Common, 0.0)
            .with(RarityTier::Uncommon, 5.0)
            .with(RarityTier::Rare, 5.0);
        let sampler = WeightedSampler::new(&weights, &catalog).unwrap();
        // u = 0.0
        let mut rng = FixedRng(0);
        assert_eq!(sampler.sample_tier(&mut rng), RarityTier::Uncommon);
    }

    #[test]
    fn test_highest_draw_picks_last_positive_tier() {
        let catalog = catalog();
        let weights = WeightTable::new()
            .with(RarityTier::Common, 5.0)
            .with(RarityTier::Rare, 5.0)
            .with(RarityTier::Legendary, 0.0);
        let sampler = WeightedSampler::new(&weights, &catalog).unwrap();
        let mut rng = FixedRng(u64::MAX);
        assert_eq!(sampler.sample_tier(&mut rng), RarityTier::Rare);
    }

    #[test]
    fn test_items_come_from_sampled_tier() {
        let catalog = catalog();
        let weights = WeightTable::new().with(RarityTier::Common, 1.0);
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        for _ in 0..200 {
            let item = sample_reward(&weights, &catalog, &mut rng).unwrap();
            assert_eq!(item.tier, RarityTier::Common);
            assert!(catalog.pool(RarityTier::Common).contains(&item.entry));
        }
    }

    #[test]
    fn test_invalid_configuration() {
        let catalog = catalog();
        let mut rng = ChaCha8Rng::seed_from_u64(0);

        let empty = WeightTable::new();
        assert!(matches!(
            sample_reward(&empty, &catalog, &mut rng),
            Err(RouletteError::InvalidConfiguration(_))
        ));

        let zeros = WeightTable::new().with(RarityTier::Common, 0.0);
        assert!(sample_reward(&zeros, &catalog, &mut rng).is_err());

        let unstocked = WeightTable::new().with(RarityTier::Epic, 10.0);
        assert!(sample_reward(&unstocked, &catalog, &mut rng).is_err());

        let overflowing = WeightTable::new()
            .with(RarityTier::Common, f64::MAX)
            .with(RarityTier::Uncommon, f64::MAX);
        assert!(WeightedSampler::new(&overflowing, &catalog).is_err());
    }

    #[test]
    fn test_seeded_determinism() {
        let catalog = catalog();
        let weights = WeightTable::new()
            .with(RarityTier::Common, 50.0)
            .with(RarityTier::Uncommon, 30.0)
            .with(RarityTier::Legendary, 20.0);
        let sampler = WeightedSampler::new(&weights, &catalog).unwrap();

        let run = |seed| {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            (0..50).map(|_| sampler.sample(&mut rng)).collect::<Vec<_>>()
        };
        assert_eq!(run(9), run(9));
    }

    #[test]
    fn test_pick_from_empty_pool() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        assert!(pick_from_pool(&[], RarityTier::Epic, &mut rng).is_err());
    }
}
