//! Case book — a catalog plus the cases that draw from it

use serde::{Deserialize, Serialize};

use crate::case::{CaseDefinition, WeightTable};
use crate::catalog::{RewardCatalog, RewardCatalogEntry};
use crate::error::{RouletteError, RouletteResult};
use crate::rarity::RarityTier;

/// Everything a storefront needs to offer cases
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CaseBook {
    /// Shared reward catalog
    pub catalog: RewardCatalog,
    /// Cases in display order
    #[serde(default)]
    pub cases: Vec<CaseDefinition>,
}

impl CaseBook {
    pub fn new(catalog: RewardCatalog) -> Self {
        Self {
            catalog,
            cases: Vec::new(),
        }
    }

    pub fn with_case(mut self, case: CaseDefinition) -> Self {
        self.cases.push(case);
        self
    }

    /// Built-in demo book: block-game loot in five tiers, six cases
    pub fn standard() -> Self {
        Self::new(standard_catalog())
            .with_case(
                CaseDefinition::new(
                    "food",
                    "Food Case",
                    100,
                    weights(&[(RarityTier::Common, 70.0), (RarityTier::Uncommon, 30.0)]),
                )
                    .with_icon("🍎")
                    .with_description("A little bit of everything edible"),
            )
            .with_case(
                CaseDefinition::new(
                    "resources",
                    "Resource Case",
                    250,
                    weights(&[
                        (RarityTier::Common, 50.0),
                        (RarityTier::Uncommon, 40.0),
                        (RarityTier::Rare, 10.0),
                    ]),
                )
                .with_icon("⛏️")
                .with_description("Ores, minerals and basic materials"),
            )
            .with_case(
                CaseDefinition::new(
                    "weapons",
                    "Weapon Case",
                    500,
                    weights(&[
                        (RarityTier::Uncommon, 40.0),
                        (RarityTier::Rare, 50.0),
                        (RarityTier::Epic, 10.0),
                    ]),
                )
                .with_icon("⚔️")
                .with_description("Weapons, armor and tools"),
            )
            .with_case(
                CaseDefinition::new(
                    "legendary",
                    "Legendary Case",
                    1000,
                    weights(&[
                        (RarityTier::Rare, 30.0),
                        (RarityTier::Epic, 50.0),
                        (RarityTier::Legendary, 20.0),
                    ]),
                )
                .with_icon("🌟")
                .with_description("One-of-a-kind items"),
            )
            .with_case(
                CaseDefinition::new(
                    "donate",
                    "Patron Case",
                    5000,
                    weights(&[(RarityTier::Epic, 40.0), (RarityTier::Legendary, 60.0)]),
                )
                .with_icon("👑")
                .with_description("Exclusive patron items"),
            )
            .with_case(
                CaseDefinition::new(
                    "random",
                    "Mystery Case",
                    750,
                    weights(&[
                        (RarityTier::Common, 30.0),
                        (RarityTier::Uncommon, 40.0),
                        (RarityTier::Rare, 20.0),
                        (RarityTier::Epic, 10.0),
                    ]),
                )
                .with_icon("🧰")
                .with_description("A mix of every category"),
            )
    }

    /// Find a case by id
    pub fn case(&self, id: &str) -> Option<&CaseDefinition> {
        self.cases.iter().find(|c| c.id == id)
    }

    /// Find a case by id, failing with [`RouletteError::UnknownCase`]
    pub fn require(&self, id: &str) -> RouletteResult<&CaseDefinition> {
        self.case(id)
            .ok_or_else(|| RouletteError::UnknownCase(id.to_string()))
    }

    pub fn case_ids(&self) -> Vec<&str> {
        self.cases.iter().map(|c| c.id.as_str()).collect()
    }

    /// Every case must be openable and ids must be unique
    pub fn validate(&self) -> RouletteResult<()> {
        for (i, case) in self.cases.iter().enumerate() {
            if self.cases[..i].iter().any(|other| other.id == case.id) {
                return Err(RouletteError::config(format!("duplicate case id '{}'", case.id)));
            }
            case.validate(&self.catalog)?;
        }
        Ok(())
    }
}

fn weights(pairs: &[(RarityTier, f64)]) -> WeightTable {
    pairs
        .iter()
        .fold(WeightTable::new(), |table, (tier, weight)| table.with(*tier, *weight))
}

fn standard_catalog() -> RewardCatalog {
    let items: [(&str, &str, RarityTier, u64, u64, &str); 26] = [
        ("Apple", "🍎", RarityTier::Common, 40, 20, "Restores 2 hunger"),
        ("Bread", "🍞", RarityTier::Common, 45, 22, "Restores 5 hunger"),
        ("Steak", "🍖", RarityTier::Common, 50, 25, "Restores 8 hunger"),
        ("Pumpkin Pie", "🥧", RarityTier::Common, 60, 30, "Restores 8 hunger"),
        ("Coal", "⚫", RarityTier::Common, 30, 15, "Fuel and dye"),
        ("Iron Ingot", "⛓️", RarityTier::Common, 50, 25, "Basic crafting material"),
        ("Gold Ingot", "🟨", RarityTier::Common, 80, 40, "Scarce material"),
        ("Redstone Dust", "🔴", RarityTier::Common, 40, 20, "For circuits and potions"),
        ("Golden Apple", "🍏", RarityTier::Uncommon, 400, 200, "Grants regeneration"),
        ("Diamond", "💎", RarityTier::Uncommon, 150, 75, "Valuable gem"),
        ("Emerald", "🟩", RarityTier::Uncommon, 200, 100, "Trading currency"),
        ("Lapis Lazuli", "🔵", RarityTier::Uncommon, 100, 50, "For enchanting"),
        ("Iron Sword", "⚔️", RarityTier::Uncommon, 180, 90, "Basic weapon"),
        ("Bow", "🏹", RarityTier::Uncommon, 120, 60, "Ranged weapon"),
        ("Shield", "🛡️", RarityTier::Uncommon, 150, 75, "Blocks attacks"),
        ("Diamond Sword", "⚔️💎", RarityTier::Rare, 250, 125, "Powerful weapon"),
        ("Diamond Pickaxe", "⛏️💎", RarityTier::Rare, 300, 150, "Fast mining"),
        ("Netherite Ingot", "🔱", RarityTier::Rare, 500, 250, "Elite material"),
        ("Elytra", "🧥", RarityTier::Rare, 800, 400, "Lets you glide"),
        ("Totem of Undying", "🐦", RarityTier::Epic, 1000, 500, "Cheats death once"),
        ("Heart of the Sea", "💙", RarityTier::Epic, 1200, 600, "Rare relic"),
        ("Dragon Head", "🐲", RarityTier::Epic, 1500, 750, "Dragon trophy"),
        ("Command Block", "🟪", RarityTier::Legendary, 5000, 2500, "Godlike item"),
        ("Netherite Sword", "🗡️", RarityTier::Legendary, 3000, 1500, "Legendary weapon"),
        ("Crown of Power", "👑", RarityTier::Legendary, 10000, 5000, "Mark of absolute power"),
        ("Netherite Armor", "🛡️🔥", RarityTier::Legendary, 4000, 2000, "Near-invulnerable"),
    ];

    items
        .into_iter()
        .fold(RewardCatalog::new(), |catalog, (name, icon, tier, price, sell, description)| {
            catalog.with_entry(
                tier,
                RewardCatalogEntry::new(name, icon, price)
                    .with_sell_price(sell)
                    .with_description(description),
            )
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_book_is_valid() {
        let book = CaseBook::standard();
        assert!(book.validate().is_ok());
        assert_eq!(book.cases.len(), 6);
        assert_eq!(book.catalog.len(), 26);
        for tier in RarityTier::ALL {
            assert!(!book.catalog.pool(tier).is_empty(), "{} unstocked", tier);
        }
    }

    #[test]
    fn test_case_lookup() {
        let book = CaseBook::standard();
        let food = book.case("food").unwrap();
        assert_eq!(food.price, 100);
        assert_eq!(food.weights.weight(RarityTier::Common), 70.0);
        assert!(book.case("missing").is_none());
        assert_eq!(
            book.require("missing"),
            Err(RouletteError::UnknownCase("missing".into()))
        );
        assert_eq!(book.require("food").map(|c| c.price), Ok(100));
        assert_eq!(book.case_ids()[0], "food");
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let book = CaseBook::standard();
        let dup = book.cases[0].clone();
        assert!(book.with_case(dup).validate().is_err());
    }

    #[test]
    fn test_sell_prices_carried() {
        let book = CaseBook::standard();
        let (tier, crown) = book.catalog.find("Crown of Power").unwrap();
        assert_eq!(tier, RarityTier::Legendary);
        assert_eq!(crown.sell_value(), 5000);
    }
}
