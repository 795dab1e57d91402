//! # cf-roulette — Weighted-Reward Roulette Engine for CaseForge
//!
//! Opens cases: samples a reward from a rarity-weighted distribution, lays
//! out a reel with the winner at a fixed position, drives an eased scroll
//! animation onto it and reads the centered entry back as the result.
//!
//! ## Features
//!
//! - **Weighted Sampler**: inverse-CDF tier sampling with a fixed tier order
//! - **Sequence Builder**: preview reels and spin reels with an embedded winner
//! - **Animation Driver**: four-phase eased scroll, Idle → Done state machine
//! - **Outcome Resolver**: the centered reel entry is the delivered reward
//! - **Profiles**: balance, inventory, selling and operation history
//!
//! ## Architecture
//!
//! ```text
//! SpinController
//!     │
//!     ├── WeightedSampler (WeightTable × RewardCatalog → RolledItem)
//!     ├── SequenceBuilder (RolledItem → ReelSequence)
//!     ├── AnimationDriver (Clock + TickScheduler → ReelFrame → RenderSink)
//!     └── OutcomeResolver (DriverReport → SpinOutcome)
//!           │
//!           v
//!     SpinTicket (Future<Output = SpinOutcome>)
//! ```

pub mod book;
pub mod case;
pub mod catalog;
pub mod config;
pub mod controller;
pub mod driver;
pub mod easing;
pub mod error;
pub mod geometry;
pub mod headless;
pub mod host;
pub mod parser;
pub mod profile;
pub mod rarity;
pub mod resolver;
pub mod sampler;
pub mod sequence;
pub mod simulate;
pub mod timing;

pub use book::*;
pub use case::*;
pub use catalog::*;
pub use config::*;
pub use controller::*;
pub use driver::*;
pub use easing::*;
pub use error::*;
pub use geometry::*;
pub use headless::*;
pub use host::*;
pub use parser::{CaseBookLimits, CaseBookParseError, CaseBookParser};
pub use profile::*;
pub use rarity::*;
pub use resolver::*;
pub use sampler::*;
pub use sequence::*;
pub use simulate::*;
pub use timing::*;
