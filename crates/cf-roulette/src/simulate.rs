//! Distribution simulation — sample a case many times and tally tiers

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::case::CaseDefinition;
use crate::catalog::RewardCatalog;
use crate::error::RouletteResult;
use crate::rarity::RarityTier;
use crate::sampler::WeightedSampler;

/// Observed vs configured share of one tier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierStats {
    pub tier: RarityTier,
    pub count: u64,
    pub frequency: f64,
    pub expected: f64,
}

impl TierStats {
    /// Observed minus expected frequency
    pub fn deviation(&self) -> f64 {
        self.frequency - self.expected
    }
}

/// Simulation report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationReport {
    pub case_id: String,
    pub draws: u64,
    pub seed: u64,
    /// One row per tier, in tier order
    pub tiers: Vec<TierStats>,
    /// Mean base price of drawn items
    pub mean_value: f64,
    /// Mean value over case price
    pub return_ratio: f64,
}

impl SimulationReport {
    pub fn tier(&self, tier: RarityTier) -> Option<&TierStats> {
        self.tiers.iter().find(|t| t.tier == tier)
    }

    /// Largest absolute deviation across tiers
    pub fn max_deviation(&self) -> f64 {
        self.tiers
            .iter()
            .map(|t| t.deviation().abs())
            .fold(0.0, f64::max)
    }
}

/// Sample `draws` rewards from a case with a seeded RNG
pub fn simulate_tiers(
    case: &CaseDefinition,
    shared: &RewardCatalog,
    draws: u64,
    seed: u64,
) -> RouletteResult<SimulationReport> {
    case.validate(shared)?;
    let sampler = WeightedSampler::new(&case.weights, case.pools(shared))?;
    let mut rng = ChaCha8Rng::seed_from_u64(seed);

    let mut counts = [0u64; 5];
    let mut total_value = 0u128;
    for _ in 0..draws {
        let item = sampler.sample(&mut rng);
        counts[item.tier as usize] += 1;
        total_value += u128::from(item.entry.base_price);
    }

    let n = draws.max(1) as f64;
    let tiers = RarityTier::ALL
        .into_iter()
        .map(|tier| TierStats {
            tier,
            count: counts[tier as usize],
            frequency: counts[tier as usize] as f64 / n,
            expected: case.weights.probability(tier),
        })
        .collect();

    let mean_value = total_value as f64 / n;
    let return_ratio = if case.price > 0 {
        mean_value / case.price as f64
    } else {
        0.0
    };

    log::debug!(
        "Simulated {} draws of '{}' (seed {}): mean value {:.1}",
        draws,
        case.id,
        seed,
        mean_value
    );

    Ok(SimulationReport {
        case_id: case.id.clone(),
        draws,
        seed,
        tiers,
        mean_value,
        return_ratio,
    })
}
