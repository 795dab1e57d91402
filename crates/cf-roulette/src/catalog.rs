//! Reward catalog and rolled items

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::rarity::RarityTier;

/// A static catalog entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardCatalogEntry {
    /// Display name, also the item identity within a tier
    pub name: String,
    /// Icon glyph or asset key
    #[serde(default)]
    pub icon: String,
    /// Nominal value
    pub base_price: u64,
    /// Price paid when selling back (defaults to half the base price)
    #[serde(default)]
    pub sell_price: Option<u64>,
    #[serde(default)]
    pub description: String,
}

impl RewardCatalogEntry {
    pub fn new(name: impl Into<String>, icon: impl Into<String>, base_price: u64) -> Self {
        Self {
            name: name.into(),
            icon: icon.into(),
            base_price,
            sell_price: None,
            description: String::new(),
        }
    }

    pub fn with_sell_price(mut self, sell_price: u64) -> Self {
        self.sell_price = Some(sell_price);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Effective sell-back value
    pub fn sell_value(&self) -> u64 {
        self.sell_price.unwrap_or(self.base_price / 2)
    }
}

/// Catalog entries grouped by tier
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RewardCatalog {
    pools: BTreeMap<RarityTier, Vec<RewardCatalogEntry>>,
}

impl RewardCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry (builder)
    pub fn with_entry(mut self, tier: RarityTier, entry: RewardCatalogEntry) -> Self {
        self.insert(tier, entry);
        self
    }

    pub fn insert(&mut self, tier: RarityTier, entry: RewardCatalogEntry) {
        self.pools.entry(tier).or_default().push(entry);
    }

    /// Entries of one tier (empty slice if the tier has none)
    pub fn pool(&self, tier: RarityTier) -> &[RewardCatalogEntry] {
        self.pools.get(&tier).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Tiers that have at least one entry, in tier order
    pub fn stocked_tiers(&self) -> Vec<RarityTier> {
        RarityTier::ALL
            .into_iter()
            .filter(|tier| !self.pool(*tier).is_empty())
            .collect()
    }

    /// Total number of entries
    pub fn len(&self) -> usize {
        self.pools.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All entries with their tier, in tier order
    pub fn entries(&self) -> impl Iterator<Item = (RarityTier, &RewardCatalogEntry)> {
        RarityTier::ALL
            .into_iter()
            .flat_map(move |tier| self.pool(tier).iter().map(move |entry| (tier, entry)))
    }

    /// Find an entry by name
    pub fn find(&self, name: &str) -> Option<(RarityTier, &RewardCatalogEntry)> {
        self.entries().find(|(_, entry)| entry.name == name)
    }
}

/// A catalog entry resolved to a tier, produced fresh per roll
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RolledItem {
    #[serde(flatten)]
    pub entry: RewardCatalogEntry,
    pub tier: RarityTier,
}

impl RolledItem {
    pub fn new(entry: RewardCatalogEntry, tier: RarityTier) -> Self {
        Self { entry, tier }
    }

    pub fn name(&self) -> &str {
        &self.entry.name
    }

    /// Identity used to compare reel entries with the sampled reward
    pub fn identity(&self) -> (&str, RarityTier) {
        (self.entry.name.as_str(), self.tier)
    }

    pub fn same_identity(&self, other: &RolledItem) -> bool {
        self.identity() == other.identity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> RewardCatalog {
        RewardCatalog::new()
            .with_entry(RarityTier::Common, RewardCatalogEntry::new("Coal", "⚫", 30))
            .with_entry(RarityTier::Common, RewardCatalogEntry::new("Apple", "🍎", 40))
            .with_entry(
                RarityTier::Epic,
                RewardCatalogEntry::new("Totem", "🐦", 1000).with_sell_price(500),
            )
    }

    #[test]
    fn test_pools_and_tiers() {
        let catalog = catalog();
        assert_eq!(catalog.len(), 3);
        assert_eq!(catalog.pool(RarityTier::Common).len(), 2);
        assert!(catalog.pool(RarityTier::Rare).is_empty());
        assert_eq!(
            catalog.stocked_tiers(),
            vec![RarityTier::Common, RarityTier::Epic]
        );
    }

    #[test]
    fn test_find_and_sell_value() {
        let catalog = catalog();
        let (tier, totem) = catalog.find("Totem").unwrap();
        assert_eq!(tier, RarityTier::Epic);
        assert_eq!(totem.sell_value(), 500);

        let (_, coal) = catalog.find("Coal").unwrap();
        assert_eq!(coal.sell_value(), 15);
        assert!(catalog.find("Crown").is_none());
    }

    #[test]
    fn test_identity() {
        let coal = RolledItem::new(RewardCatalogEntry::new("Coal", "⚫", 30), RarityTier::Common);
        let mislabeled =
            RolledItem::new(RewardCatalogEntry::new("Coal", "⚫", 30), RarityTier::Rare);
        assert!(coal.same_identity(&coal.clone()));
        assert!(!coal.same_identity(&mislabeled));
    }

    #[test]
    fn test_catalog_json_is_tier_map() {
        let json = serde_json::to_value(catalog()).unwrap();
        assert_eq!(json["common"][0]["name"], "Coal");
        assert_eq!(json["epic"][0]["sell_price"], 500);
    }
}
