//! # cf-stage — CaseForge Spin Phase System
//!
//! Defines the phases every roulette spin passes through and the events a
//! spin emits while it moves between them.
//!
//! ## Philosophy
//!
//! A spin is a short, strictly ordered life:
//! - Idle → Starting → Running → Settling → Done
//!
//! Renderers, audio and analytics react to these phases and events, never
//! to the internals of the driver that produced them.

pub mod event;
pub mod stage;
pub mod trace;

pub use event::*;
pub use stage::*;
pub use trace::*;
