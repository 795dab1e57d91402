//! SpinPhase — The lifecycle of a single roulette spin
//!
//! A phase is NOT an animation frame. It is the semantic position of the
//! spin inside its lifecycle.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Lifecycle phase of a roulette spin
///
/// ```text
/// Idle → Starting → Running → Settling → Done
///   ↑        │          │          │
///   └────────┴──────────┴──────────┘  (abandoned)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpinPhase {
    /// No spin in progress
    Idle,
    /// Sequence built and laid out, waiting for layout to settle
    Starting,
    /// Reel is scrolling along the eased curve
    Running,
    /// Motion finished, grace delay before the outcome is read back
    Settling,
    /// Outcome reported, terminal
    Done,
}

impl Default for SpinPhase {
    fn default() -> Self {
        Self::Idle
    }
}

impl SpinPhase {
    /// All phases in lifecycle order
    pub const ALL: [SpinPhase; 5] = [
        SpinPhase::Idle,
        SpinPhase::Starting,
        SpinPhase::Running,
        SpinPhase::Settling,
        SpinPhase::Done,
    ];

    /// Stable snake_case name
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Starting => "starting",
            Self::Running => "running",
            Self::Settling => "settling",
            Self::Done => "done",
        }
    }

    /// Phase that follows this one on the normal path
    pub fn next(&self) -> Option<SpinPhase> {
        match self {
            Self::Idle => Some(Self::Starting),
            Self::Starting => Some(Self::Running),
            Self::Running => Some(Self::Settling),
            Self::Settling => Some(Self::Done),
            Self::Done => None,
        }
    }

    /// Is the reel visibly in motion or about to be?
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Starting | Self::Running | Self::Settling)
    }

    /// Is this the terminal phase?
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done)
    }

    /// Can the spin legally move from `self` to `to`?
    ///
    /// Only single forward steps are legal, plus abandoning an active spin
    /// straight back to Idle.
    pub fn can_transition_to(&self, to: SpinPhase) -> bool {
        if self.next() == Some(to) {
            return true;
        }
        self.is_active() && to == SpinPhase::Idle
    }

    /// Checked transition
    pub fn transition(self, to: SpinPhase) -> Result<SpinPhase, PhaseError> {
        if self.can_transition_to(to) {
            Ok(to)
        } else {
            Err(PhaseError::IllegalTransition { from: self, to })
        }
    }
}

impl std::fmt::Display for SpinPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.type_name())
    }
}

/// Phase transition errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PhaseError {
    #[error("Illegal phase transition: {from} -> {to}")]
    IllegalTransition { from: SpinPhase, to: SpinPhase },
}
