//! Case definitions and weight tables

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::catalog::RewardCatalog;
use crate::error::{RouletteError, RouletteResult};
use crate::rarity::RarityTier;

/// Relative weight per rarity tier
///
/// Tiers that are absent or weighted 0 are never sampled.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WeightTable {
    weights: BTreeMap<RarityTier, f64>,
}

impl WeightTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a weight (builder)
    pub fn with(mut self, tier: RarityTier, weight: f64) -> Self {
        self.set(tier, weight);
        self
    }

    pub fn set(&mut self, tier: RarityTier, weight: f64) {
        self.weights.insert(tier, weight);
    }

    /// Weight of a tier (0 when absent)
    pub fn weight(&self, tier: RarityTier) -> f64 {
        self.weights.get(&tier).copied().unwrap_or(0.0)
    }

    /// Sum of all weights
    pub fn total(&self) -> f64 {
        RarityTier::ALL.iter().map(|t| self.weight(*t).max(0.0)).sum()
    }

    /// Tiers with a positive weight, in sampling order
    pub fn positive_tiers(&self) -> Vec<RarityTier> {
        RarityTier::ALL
            .into_iter()
            .filter(|t| self.weight(*t) > 0.0)
            .collect()
    }

    /// Probability of a tier under this table
    pub fn probability(&self, tier: RarityTier) -> f64 {
        let total = self.total();
        if total <= 0.0 {
            return 0.0;
        }
        self.weight(tier).max(0.0) / total
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    /// Check the table on its own: weights finite and non-negative, sum positive
    pub fn validate(&self) -> RouletteResult<()> {
        if self.weights.is_empty() {
            return Err(RouletteError::config("weight table is empty"));
        }
        for (tier, weight) in &self.weights {
            if !weight.is_finite() || *weight < 0.0 {
                return Err(RouletteError::config(format!(
                    "weight for {} must be a finite non-negative number, got {}",
                    tier, weight
                )));
            }
        }
        let total = self.total();
        if !total.is_finite() {
            return Err(RouletteError::config("sum of weights overflows"));
        }
        if total <= 0.0 {
            return Err(RouletteError::config("all weights are zero"));
        }
        Ok(())
    }

    /// Check the table and that every positively weighted tier has entries
    pub fn validate_against(&self, catalog: &RewardCatalog) -> RouletteResult<()> {
        self.validate()?;
        for tier in self.positive_tiers() {
            if catalog.pool(tier).is_empty() {
                return Err(RouletteError::config(format!(
                    "tier {} has weight {} but no catalog entries",
                    tier,
                    self.weight(tier)
                )));
            }
        }
        Ok(())
    }
}

/// A purchasable case
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseDefinition {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub icon: String,
    pub price: u64,
    #[serde(default)]
    pub description: String,
    /// Rarity weights for the reward roll
    #[serde(alias = "rarity_weights")]
    pub weights: WeightTable,
    /// Case-specific reward pools (the shared catalog is used when absent)
    #[serde(default)]
    pub reward_pools: Option<RewardCatalog>,
}

impl CaseDefinition {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        price: u64,
        weights: WeightTable,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            icon: String::new(),
            price,
            description: String::new(),
            weights,
            reward_pools: None,
        }
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = icon.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_pools(mut self, pools: RewardCatalog) -> Self {
        self.reward_pools = Some(pools);
        self
    }

    /// Pools this case draws from
    pub fn pools<'a>(&'a self, shared: &'a RewardCatalog) -> &'a RewardCatalog {
        self.reward_pools.as_ref().unwrap_or(shared)
    }

    pub fn validate(&self, shared: &RewardCatalog) -> RouletteResult<()> {
        self.weights
            .validate_against(self.pools(shared))
            .map_err(|e| match e {
                RouletteError::InvalidConfiguration(msg) => {
                    RouletteError::config(format!("case '{}': {}", self.id, msg))
                }
                other => other,
            })
    }
}
