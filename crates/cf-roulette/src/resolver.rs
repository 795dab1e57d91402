//! Outcome Resolver — the centered reel entry is the delivered reward

use serde::{Deserialize, Serialize};

use crate::catalog::RolledItem;
use crate::driver::DriverReport;
use crate::error::RouletteError;
use crate::sequence::ReelSequence;

/// How the emitted item was chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Resolution {
    /// Read back from the reel entry under the viewport center
    Centered { index: usize },
    /// Nothing was centered at settle; the authoritative item was delivered
    Fallback,
    /// The spin view was closed mid-animation; the authoritative item was delivered
    Abandoned,
}

impl Resolution {
    pub fn index(&self) -> Option<usize> {
        match self {
            Self::Centered { index } => Some(*index),
            _ => None,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback)
    }

    pub fn is_abandoned(&self) -> bool {
        matches!(self, Self::Abandoned)
    }
}

/// Final result of one spin session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpinOutcome {
    /// The user-visible, inventory-affecting item
    pub item: RolledItem,
    pub resolution: Resolution,
    /// What the sampler drew before the reel was built
    pub authoritative: RolledItem,
    pub sequence_len: usize,
    /// Scroll duration drawn for this spin
    pub duration_ms: f64,
}

impl SpinOutcome {
    /// Whether the delivered item matches the sampled one
    pub fn is_consistent(&self) -> bool {
        self.item.same_identity(&self.authoritative)
    }
}

/// Turns a settled reel into a [`SpinOutcome`]
#[derive(Debug, Clone, Copy, Default)]
pub struct OutcomeResolver;

impl OutcomeResolver {
    /// Emit the entry at the reported centered index. When nothing was
    /// centered, log the desync and emit the authoritative item instead.
    pub fn resolve(
        &self,
        sequence: &ReelSequence,
        report: &DriverReport,
        authoritative: &RolledItem,
        duration_ms: f64,
    ) -> SpinOutcome {
        let centered = report
            .centered
            .and_then(|index| sequence.get(index).map(|entry| (index, entry)));

        let (item, resolution) = match centered {
            Some((index, entry)) => {
                if !entry.same_identity(authoritative) {
                    log::warn!(
                        "Centered entry {} '{}' ({}) differs from sampled '{}' ({}); \
                         delivering the centered entry",
                        index,
                        entry.name(),
                        entry.tier,
                        authoritative.name(),
                        authoritative.tier
                    );
                }
                (entry.clone(), Resolution::Centered { index })
            }
            None => {
                let desync = RouletteError::AnimationDesync {
                    offset: report.final_offset,
                };
                log::warn!("{}; delivering sampled '{}'", desync, authoritative.name());
                (authoritative.clone(), Resolution::Fallback)
            }
        };

        SpinOutcome {
            item,
            resolution,
            authoritative: authoritative.clone(),
            sequence_len: sequence.len(),
            duration_ms,
        }
    }

    /// Outcome for a spin closed before it settled
    pub fn abandon(
        &self,
        sequence: &ReelSequence,
        authoritative: &RolledItem,
        duration_ms: f64,
    ) -> SpinOutcome {
        SpinOutcome {
            item: authoritative.clone(),
            resolution: Resolution::Abandoned,
            authoritative: authoritative.clone(),
            sequence_len: sequence.len(),
            duration_ms,
        }
    }
}
