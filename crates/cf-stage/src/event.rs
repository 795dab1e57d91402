//! SpinEvent — A moment in a spin with timing metadata
//!
//! Events are index based: they reference reel positions, never catalog
//! items, so this crate stays independent of any item model.

use serde::{Deserialize, Serialize};

use crate::stage::SpinPhase;

/// What happened
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SpinEventKind {
    /// Reel entries were laid out
    SequenceBuilt {
        /// Number of entries on the reel
        len: usize,
        /// Guaranteed winner position (None for preview reels)
        #[serde(default)]
        winning_index: Option<usize>,
    },

    /// The spin moved to another phase
    PhaseChanged { from: SpinPhase, to: SpinPhase },

    /// One rendered animation step
    Frame {
        /// Reel scroll offset in pixels
        offset: f64,
        /// Linear time progress (0.0 - 1.0)
        progress: f64,
        /// Entry currently inside the highlight zone
        #[serde(default)]
        highlighted: Option<usize>,
    },

    /// Settle grace period ended, centered entry read back
    Settled {
        #[serde(default)]
        centered: Option<usize>,
    },

    /// Final result emitted
    Resolved {
        /// Reel index the result was taken from (None on fallback)
        #[serde(default)]
        index: Option<usize>,
        /// Item name of the emitted result
        item: String,
        /// True when no centered entry existed and the authoritative item was used
        #[serde(default)]
        fallback: bool,
    },

    /// Spin view closed by the user before the reel settled
    Abandoned,
}

impl SpinEventKind {
    /// Stable snake_case name
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::SequenceBuilt { .. } => "sequence_built",
            Self::PhaseChanged { .. } => "phase_changed",
            Self::Frame { .. } => "frame",
            Self::Settled { .. } => "settled",
            Self::Resolved { .. } => "resolved",
            Self::Abandoned => "abandoned",
        }
    }
}

/// An event with its timestamp
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpinEvent {
    pub kind: SpinEventKind,

    /// Clock time in milliseconds
    pub timestamp_ms: f64,

    /// Custom tags for filtering/routing
    #[serde(default)]
    pub tags: Vec<String>,
}

impl SpinEvent {
    pub fn new(kind: SpinEventKind, timestamp_ms: f64) -> Self {
        Self {
            kind,
            timestamp_ms,
            tags: Vec::new(),
        }
    }

    /// Add a tag
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    pub fn type_name(&self) -> &'static str {
        self.kind.type_name()
    }
}
