//! Animation Driver — eased reel scroll as an explicit state machine
//!
//! ```text
//! Idle ──start──► Starting ──delay──► Running ──progress=1──► Settling ──grace──► Done
//!                    │                   │                       │
//!                    └───────────────────┴─────── abandon ───────┴──► Idle
//! ```
//!
//! The driver owns no clock and no timer. The host calls [`AnimationDriver::step`]
//! with the current time whenever the previously returned [`Wake`] fires.

use cf_stage::SpinPhase;
use serde::{Deserialize, Serialize};

use crate::easing::phased_progress;
use crate::geometry::ReelGeometry;
use crate::host::{ReelFrame, RenderSink, Wake};
use crate::timing::SpinTiming;

/// Slack for timer callbacks that fire a hair early
const TIME_EPSILON_MS: f64 = 1e-6;

/// Scroll state of one spin
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnimationState {
    pub start_offset: f64,
    pub end_offset: f64,
    /// Set when Running begins
    pub start_timestamp: Option<f64>,
    pub duration_ms: f64,
    pub progress: f64,
    pub eased_progress: f64,
    pub current_offset: f64,
    pub highlighted: Option<usize>,
}

impl AnimationState {
    fn new(start_offset: f64, end_offset: f64, duration_ms: f64) -> Self {
        Self {
            start_offset,
            end_offset,
            start_timestamp: None,
            duration_ms,
            progress: 0.0,
            eased_progress: 0.0,
            current_offset: start_offset,
            highlighted: None,
        }
    }

    /// Offset at a given eased distance fraction
    pub fn offset_at(&self, eased: f64) -> f64 {
        self.start_offset + (self.end_offset - self.start_offset) * eased
    }
}

/// What the driver read back when it settled
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DriverReport {
    /// Highlighted entry at settle time
    pub centered: Option<usize>,
    pub final_offset: f64,
    /// Steps taken, Done included
    pub ticks: u64,
}

/// Result of one driver step
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DriverStep {
    /// Nothing to do; schedule nothing
    Idle,
    /// Schedule another step
    Wait(Wake),
    /// Reached Done; schedule nothing
    Done(DriverReport),
}

/// Drives one reel from its start offset onto the winning entry
#[derive(Debug, Clone)]
pub struct AnimationDriver {
    geometry: ReelGeometry,
    start_delay_ms: f64,
    settle_delay_ms: f64,
    len: usize,
    phase: SpinPhase,
    /// When the current phase was entered
    phase_entered_ms: f64,
    state: AnimationState,
    ticks: u64,
}

impl AnimationDriver {
    pub fn new(
        geometry: ReelGeometry,
        timing: &SpinTiming,
        len: usize,
        winning_index: usize,
        duration_ms: f64,
    ) -> Self {
        Self {
            geometry,
            start_delay_ms: timing.start_delay_ms,
            settle_delay_ms: timing.settle_delay_ms,
            len,
            phase: SpinPhase::Idle,
            phase_entered_ms: 0.0,
            state: AnimationState::new(
                geometry.start_offset(),
                geometry.offset_for(winning_index),
                duration_ms,
            ),
            ticks: 0,
        }
    }

    pub fn phase(&self) -> SpinPhase {
        self.phase
    }

    pub fn state(&self) -> &AnimationState {
        &self.state
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // LIFECYCLE
    // ═══════════════════════════════════════════════════════════════════════════

    /// Idle → Starting. Renders the reel at its start offset and asks to be
    /// woken once the layout delay has passed.
    pub fn start(&mut self, now_ms: f64, sink: &mut dyn RenderSink) -> DriverStep {
        if self.phase != SpinPhase::Idle {
            return DriverStep::Idle;
        }
        self.enter(SpinPhase::Starting, now_ms, sink);
        self.render(now_ms, sink);
        DriverStep::Wait(Wake::After(self.start_delay_ms))
    }

    /// Advance to `now_ms`
    pub fn step(&mut self, now_ms: f64, sink: &mut dyn RenderSink) -> DriverStep {
        match self.phase {
            SpinPhase::Idle | SpinPhase::Done => DriverStep::Idle,
            SpinPhase::Starting => {
                let remaining = self.start_delay_ms - (now_ms - self.phase_entered_ms);
                if remaining > TIME_EPSILON_MS {
                    return DriverStep::Wait(Wake::After(remaining));
                }
                self.ticks += 1;
                self.state.start_timestamp = Some(now_ms);
                self.enter(SpinPhase::Running, now_ms, sink);
                self.run(now_ms, sink)
            }
            SpinPhase::Running => {
                self.ticks += 1;
                self.run(now_ms, sink)
            }
            SpinPhase::Settling => {
                let remaining = self.settle_delay_ms - (now_ms - self.phase_entered_ms);
                if remaining > TIME_EPSILON_MS {
                    return DriverStep::Wait(Wake::After(remaining));
                }
                self.ticks += 1;
                let centered = self
                    .geometry
                    .highlighted_index(self.state.current_offset, self.len);
                sink.settled(centered, now_ms);
                self.enter(SpinPhase::Done, now_ms, sink);
                DriverStep::Done(DriverReport {
                    centered,
                    final_offset: self.state.current_offset,
                    ticks: self.ticks,
                })
            }
        }
    }

    /// Stop wherever the reel is and return to Idle
    pub fn abandon(&mut self, now_ms: f64, sink: &mut dyn RenderSink) -> bool {
        if !self.phase.is_active() {
            return false;
        }
        self.enter(SpinPhase::Idle, now_ms, sink);
        true
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // INTERNALS
    // ═══════════════════════════════════════════════════════════════════════════

    /// One Running tick
    fn run(&mut self, now_ms: f64, sink: &mut dyn RenderSink) -> DriverStep {
        let started = self.state.start_timestamp.unwrap_or(now_ms);
        let elapsed = (now_ms - started).max(0.0);
        let progress = if self.state.duration_ms > 0.0 {
            (elapsed / self.state.duration_ms).min(1.0)
        } else {
            1.0
        };

        self.state.progress = progress;
        self.state.eased_progress = phased_progress(progress);
        self.state.current_offset = self.state.offset_at(self.state.eased_progress);
        self.render(now_ms, sink);

        if progress >= 1.0 {
            self.enter(SpinPhase::Settling, now_ms, sink);
            DriverStep::Wait(Wake::After(self.settle_delay_ms))
        } else {
            DriverStep::Wait(Wake::NextFrame)
        }
    }

    fn render(&mut self, now_ms: f64, sink: &mut dyn RenderSink) {
        self.state.highlighted = self
            .geometry
            .highlighted_index(self.state.current_offset, self.len);
        sink.frame(
            &ReelFrame {
                offset: self.state.current_offset,
                progress: self.state.progress,
                eased: self.state.eased_progress,
                highlighted: self.state.highlighted,
            },
            now_ms,
        );
    }

    fn enter(&mut self, to: SpinPhase, now_ms: f64, sink: &mut dyn RenderSink) {
        let from = self.phase;
        debug_assert!(from.can_transition_to(to), "{} -> {}", from, to);
        log::debug!("Spin phase {} -> {} at {:.1}ms", from, to, now_ms);
        self.phase = to;
        self.phase_entered_ms = now_ms;
        sink.phase_changed(from, to, now_ms);
    }
}
