//! Error types for the roulette engine

use thiserror::Error;

/// Engine error type
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RouletteError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("A spin is already in progress")]
    ConcurrentSpinRejected,

    /// Settle found no highlighted entry. Recovered internally, never returned.
    #[error("Animation desync: no entry centered at offset {offset:.2}")]
    AnimationDesync { offset: f64 },

    #[error("Unknown case: {0}")]
    UnknownCase(String),

    #[error("No spin in progress")]
    NoActiveSpin,

    #[error("Spin session dropped before it resolved")]
    SessionAbandoned,

    #[error("Spin did not settle within {ticks} ticks")]
    Stalled { ticks: u64 },
}

impl RouletteError {
    /// Shorthand for configuration errors
    pub fn config(msg: impl Into<String>) -> Self {
        Self::InvalidConfiguration(msg.into())
    }
}

/// Result type alias
pub type RouletteResult<T> = Result<T, RouletteError>;
