//! Case book parser — load catalogs and cases from JSON or YAML
//!
//! ## Document shape
//!
//! ```yaml
//! items:
//!   - { name: Apple, icon: "🍎", rarity: common, price: 40, sell_price: 20 }
//!   - { name: Diamond, icon: "💎", rarity: uncommon, price: 150 }
//! cases:
//!   - id: food
//!     name: Food Case
//!     price: 100
//!     rarity_weights: { common: 70, uncommon: 30 }
//!     items: [Apple, Diamond]   # optional: case-specific pool
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! let parser = CaseBookParser::new();
//! let book = parser.parse_yaml(yaml_string)?;
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::book::CaseBook;
use crate::case::{CaseDefinition, WeightTable};
use crate::catalog::{RewardCatalog, RewardCatalogEntry};
use crate::rarity::RarityTier;

/// Case book parser
pub struct CaseBookParser {
    /// Validation limits
    pub limits: CaseBookLimits,
}

/// Parsing limits
#[derive(Debug, Clone)]
pub struct CaseBookLimits {
    pub max_name_length: usize,
    pub max_items: usize,
    pub max_cases: usize,
    pub max_price: u64,
}

impl Default for CaseBookLimits {
    fn default() -> Self {
        Self {
            max_name_length: 128,
            max_items: 1_000,
            max_cases: 200,
            max_price: 10_000_000,
        }
    }
}

impl CaseBookParser {
    pub fn new() -> Self {
        Self {
            limits: CaseBookLimits::default(),
        }
    }

    /// Create parser with custom limits
    pub fn with_limits(limits: CaseBookLimits) -> Self {
        Self { limits }
    }

    /// Parse a JSON case book
    pub fn parse_json(&self, json: &str) -> Result<CaseBook, CaseBookParseError> {
        let doc: CaseBookDocument =
            serde_json::from_str(json).map_err(|e| CaseBookParseError::JsonError(e.to_string()))?;
        self.load(doc)
    }

    /// Parse a YAML case book
    pub fn parse_yaml(&self, yaml: &str) -> Result<CaseBook, CaseBookParseError> {
        let doc: CaseBookDocument =
            serde_yml::from_str(yaml).map_err(|e| CaseBookParseError::YamlError(e.to_string()))?;
        self.load(doc)
    }

    /// Pick the format from a file extension (`json`, `yaml`, `yml`)
    pub fn parse_with_extension(
        &self,
        extension: &str,
        source: &str,
    ) -> Result<CaseBook, CaseBookParseError> {
        match extension.to_ascii_lowercase().as_str() {
            "json" => self.parse_json(source),
            "yaml" | "yml" => self.parse_yaml(source),
            other => Err(CaseBookParseError::UnsupportedFormat(other.to_string())),
        }
    }

    fn load(&self, doc: CaseBookDocument) -> Result<CaseBook, CaseBookParseError> {
        self.validate(&doc)?;
        let book = self.to_case_book(doc)?;
        book.validate()
            .map_err(|e| CaseBookParseError::ValidationError(e.to_string()))?;
        log::debug!(
            "Loaded case book: {} items, {} cases",
            book.catalog.len(),
            book.cases.len()
        );
        Ok(book)
    }

    /// Check document limits
    pub fn validate(&self, doc: &CaseBookDocument) -> Result<(), CaseBookParseError> {
        if doc.items.len() > self.limits.max_items {
            return Err(CaseBookParseError::ValidationError(format!(
                "Too many items: {} > {}",
                doc.items.len(),
                self.limits.max_items
            )));
        }
        if doc.cases.len() > self.limits.max_cases {
            return Err(CaseBookParseError::ValidationError(format!(
                "Too many cases: {} > {}",
                doc.cases.len(),
                self.limits.max_cases
            )));
        }

        let names = doc
            .items
            .iter()
            .map(|i| (&i.name, i.price))
            .chain(doc.cases.iter().map(|c| (&c.name, c.price)));
        for (name, price) in names {
            if name.trim().is_empty() {
                return Err(CaseBookParseError::MissingField("name".into()));
            }
            if name.len() > self.limits.max_name_length {
                return Err(CaseBookParseError::ValidationError(format!(
                    "Name too long: {} > {}",
                    name.len(),
                    self.limits.max_name_length
                )));
            }
            if price > self.limits.max_price {
                return Err(CaseBookParseError::ValidationError(format!(
                    "Price of '{}' too high: {} > {}",
                    name, price, self.limits.max_price
                )));
            }
        }

        for (i, item) in doc.items.iter().enumerate() {
            if doc.items[..i].iter().any(|other| other.name == item.name) {
                return Err(CaseBookParseError::ValidationError(format!(
                    "Duplicate item name: {}",
                    item.name
                )));
            }
        }

        Ok(())
    }

    fn to_case_book(&self, doc: CaseBookDocument) -> Result<CaseBook, CaseBookParseError> {
        let mut catalog = RewardCatalog::new();
        for item in doc.items {
            let tier = parse_tier(&item.rarity)?;
            let mut entry = RewardCatalogEntry::new(item.name, item.icon, item.price)
                .with_description(item.description);
            entry.sell_price = item.sell_price;
            catalog.insert(tier, entry);
        }

        let mut book = CaseBook::new(catalog);
        for case in doc.cases {
            let mut weights = WeightTable::new();
            for (tier_name, weight) in &case.rarity_weights {
                weights.set(parse_tier(tier_name)?, *weight);
            }

            let mut definition = CaseDefinition::new(case.id, case.name, case.price, weights)
                .with_icon(case.icon)
                .with_description(case.description);

            if let Some(names) = case.items {
                let mut pools = RewardCatalog::new();
                for name in names {
                    let (tier, entry) = book.catalog.find(&name).ok_or_else(|| {
                        CaseBookParseError::InvalidValue(format!(
                            "Unknown item in case '{}': {}",
                            definition.id, name
                        ))
                    })?;
                    pools.insert(tier, entry.clone());
                }
                definition = definition.with_pools(pools);
            }

            book.cases.push(definition);
        }

        Ok(book)
    }
}

impl Default for CaseBookParser {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_tier(name: &str) -> Result<RarityTier, CaseBookParseError> {
    RarityTier::from_name(name)
        .ok_or_else(|| CaseBookParseError::InvalidValue(format!("Unknown rarity: {}", name)))
}

/// Case book document structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseBookDocument {
    #[serde(default)]
    pub items: Vec<ItemDocument>,
    #[serde(default)]
    pub cases: Vec<CaseDocument>,
}

/// Catalog item in a document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemDocument {
    pub name: String,
    #[serde(default)]
    pub icon: String,
    pub rarity: String,
    pub price: u64,
    #[serde(default)]
    pub sell_price: Option<u64>,
    #[serde(default)]
    pub description: String,
}

/// Case in a document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseDocument {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub icon: String,
    pub price: u64,
    #[serde(default)]
    pub description: String,
    #[serde(alias = "weights")]
    pub rarity_weights: BTreeMap<String, f64>,
    /// Case-specific pool by item name
    #[serde(default)]
    pub items: Option<Vec<String>>,
}

/// Case book parsing errors
#[derive(Debug, thiserror::Error)]
pub enum CaseBookParseError {
    #[error("JSON parse error: {0}")]
    JsonError(String),

    #[error("YAML parse error: {0}")]
    YamlError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value: {0}")]
    InvalidValue(String),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    const YAML: &str = r#"
items:
  - { name: Apple, icon: "🍎", rarity: common, price: 40, sell_price: 20 }
  - { name: Bread, icon: "🍞", rarity: Common, price: 45 }
  - { name: Diamond, icon: "💎", rarity: uncommon, price: 150, sell_price: 75 }
cases:
  - id: food
    name: Food Case
    price: 100
    rarity_weights: { common: 70, uncommon: 30 }
  - id: bakery
    name: Bakery Case
    price: 10
    rarity_weights: { common: 1 }
    items: [Bread]
"#;

    #[test]
    fn test_parse_yaml_book() {
        let book = CaseBookParser::new().parse_yaml(YAML).unwrap();
        assert_eq!(book.catalog.len(), 3);
        assert_eq!(book.catalog.pool(RarityTier::Common).len(), 2);

        let food = book.case("food").unwrap();
        assert_eq!(food.weights.weight(RarityTier::Uncommon), 30.0);
        assert!(food.reward_pools.is_none());

        let bakery = book.case("bakery").unwrap();
        let pools = bakery.reward_pools.as_ref().unwrap();
        assert_eq!(pools.len(), 1);
        assert_eq!(pools.pool(RarityTier::Common)[0].name, "Bread");
        // Default sell price is half the base price
        assert_eq!(pools.pool(RarityTier::Common)[0].sell_value(), 22);
    }

    #[test]
    fn test_parse_json_book() {
        let json = r#"{
            "items": [
                { "name": "Coal", "rarity": "common", "price": 30 },
                { "name": "Crown", "rarity": "legendary", "price": 10000 }
            ],
            "cases": [
                { "id": "mixed", "name": "Mixed", "price": 500,
                  "weights": { "common": 90, "legendary": 10 } }
            ]
        }"#;
        let book = CaseBookParser::new().parse_json(json).unwrap();
        assert_eq!(book.cases[0].weights.total(), 100.0);
    }

    #[test]
    fn test_unknown_rarity() {
        let json = r#"{ "items": [ { "name": "X", "rarity": "mythic", "price": 1 } ] }"#;
        assert!(matches!(
            CaseBookParser::new().parse_json(json),
            Err(CaseBookParseError::InvalidValue(_))
        ));
    }

    #[test]
    fn test_case_needs_stocked_tiers() {
        let json = r#"{
            "items": [ { "name": "Coal", "rarity": "common", "price": 30 } ],
            "cases": [
                { "id": "epic", "name": "Epic", "price": 1, "rarity_weights": { "epic": 1 } }
            ]
        }"#;
        match CaseBookParser::new().parse_json(json) {
            Err(CaseBookParseError::ValidationError(msg)) => assert!(msg.contains("epic")),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_validation_limits() {
        let parser = CaseBookParser::with_limits(CaseBookLimits {
            max_items: 2,
            ..CaseBookLimits::default()
        });
        assert!(matches!(
            parser.parse_yaml(YAML),
            Err(CaseBookParseError::ValidationError(_))
        ));
    }

    #[test]
    fn test_unknown_case_item_and_format() {
        let json = r#"{
            "items": [ { "name": "Coal", "rarity": "common", "price": 30 } ],
            "cases": [
                { "id": "c", "name": "C", "price": 1,
                  "rarity_weights": { "common": 1 }, "items": ["Gold"] }
            ]
        }"#;
        assert!(matches!(
            CaseBookParser::new().parse_json(json),
            Err(CaseBookParseError::InvalidValue(_))
        ));
        assert!(matches!(
            CaseBookParser::new().parse_with_extension("toml", ""),
            Err(CaseBookParseError::UnsupportedFormat(_))
        ));
        assert!(CaseBookParser::new().parse_json("{ not json").is_err());
    }
}
